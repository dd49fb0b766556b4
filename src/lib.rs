//! Read and write short text on NFC tags as NDEF text records
//!
//! The platform owns discovery, foreground dispatch and the raw tag I/O. This
//! crate decides what to do with a discovered tag and what goes on it.

pub(crate) mod logging;
pub(crate) mod unblock;

pub mod arbiter;
pub mod config;
pub mod ingress;
pub mod manager;
pub mod session;
pub mod tag;

pub use tagtext_ndef as ndef;

uniffi::setup_scaffolding!();
