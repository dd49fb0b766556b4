//! The I/O boundary to a physical tag, implemented by the platform

use std::{fmt::Debug, sync::Arc};

/// How the tag can take an NDEF message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum, derive_more::Display)]
pub enum TagTechnology {
    /// Already NDEF formatted, the message can be written directly
    Ndef,
    /// Blank tag, formatting it writes the first message
    NdefFormatable,
    Unsupported,
}

#[uniffi::export(callback_interface)]
pub trait TagTransport: Send + Sync + Debug + 'static {
    /// Hardware identifier of the tag, only used for logging
    fn id(&self) -> Vec<u8>;

    fn technology(&self) -> TagTechnology;

    fn connect(&self) -> Result<(), TagIoError>;

    fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TagIoError>;

    fn format(&self, message: Vec<u8>) -> Result<(), TagIoError>;

    fn close(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum TagIoError {
    /// Tag left the field or the transceive failed
    #[error("tag I/O error: {0}")]
    Io(String),

    /// Message rejected by the tag, usually too large for its capacity
    #[error("tag format error: {0}")]
    Format(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for TagIoError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Io(error.reason)
    }
}

/// A tag seen in a discovery event
///
/// Only valid while the tag stays in the field, a newer discovery supersedes it.
#[derive(Debug, Clone)]
pub struct TagHandle(Arc<Box<dyn TagTransport>>);

impl TagHandle {
    pub fn new(transport: Box<dyn TagTransport>) -> Self {
        Self(Arc::new(transport))
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.0.id())
    }

    pub fn technology(&self) -> TagTechnology {
        self.0.technology()
    }

    /// Open the tag, the returned connection closes it when dropped
    pub fn connect(&self) -> Result<Connection<'_>, TagIoError> {
        self.0.connect()?;
        Ok(Connection(&**self.0))
    }

    pub fn same_tag(&self, other: &TagHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Box<dyn TagTransport>> for TagHandle {
    fn from(transport: Box<dyn TagTransport>) -> Self {
        Self::new(transport)
    }
}

/// An open tag connection
#[derive(Debug)]
pub struct Connection<'a>(&'a dyn TagTransport);

impl Connection<'_> {
    pub fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TagIoError> {
        self.0.write_ndef_message(message)
    }

    pub fn format(&self, message: Vec<u8>) -> Result<(), TagIoError> {
        self.0.format(message)
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

#[cfg(test)]
pub mod mock {
    //! Scripted transport that records every call

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Connect,
        WriteNdefMessage(Vec<u8>),
        Format(Vec<u8>),
        Close,
    }

    #[derive(Debug, Default)]
    pub struct Script {
        pub connect: Option<TagIoError>,
        pub write: Option<TagIoError>,
        pub format: Option<TagIoError>,
    }

    #[derive(Debug, Clone)]
    pub struct MockTransport {
        pub technology: TagTechnology,
        pub calls: Arc<Mutex<Vec<Call>>>,
        pub script: Arc<Script>,
    }

    impl MockTransport {
        pub fn new(technology: TagTechnology) -> Self {
            Self::scripted(technology, Script::default())
        }

        pub fn scripted(technology: TagTechnology, script: Script) -> Self {
            Self {
                technology,
                calls: Arc::new(Mutex::new(Vec::new())),
                script: Arc::new(script),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        pub fn handle(&self) -> TagHandle {
            TagHandle::new(Box::new(self.clone()))
        }

        fn scripted_result(&self, error: &Option<TagIoError>) -> Result<(), TagIoError> {
            match error {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    impl TagTransport for MockTransport {
        fn id(&self) -> Vec<u8> {
            vec![0x04, 0xA2, 0x5B, 0x1C]
        }

        fn technology(&self) -> TagTechnology {
            self.technology
        }

        fn connect(&self) -> Result<(), TagIoError> {
            self.calls.lock().push(Call::Connect);
            self.scripted_result(&self.script.connect)
        }

        fn write_ndef_message(&self, message: Vec<u8>) -> Result<(), TagIoError> {
            self.calls.lock().push(Call::WriteNdefMessage(message));
            self.scripted_result(&self.script.write)
        }

        fn format(&self, message: Vec<u8>) -> Result<(), TagIoError> {
            self.calls.lock().push(Call::Format(message));
            self.scripted_result(&self.script.format)
        }

        fn close(&self) {
            self.calls.lock().push(Call::Close);
        }
    }
}
