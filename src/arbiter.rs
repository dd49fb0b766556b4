//! Exclusive routing of tag discovery events while in the foreground
//!
//! While `Active` the platform delivers discovery events to this process
//! instead of launching whatever app its default routing picks. Both
//! transitions are idempotent, the lifecycle hooks driving them alternate but
//! are not guaranteed to be balanced across restarts.

use std::{fmt::Debug, sync::Arc};

use tracing::{debug, warn};

use crate::ingress::DiscoveryAction;

#[uniffi::export(callback_interface)]
pub trait ForegroundDispatch: Send + Sync + Debug + 'static {
    /// False when the device has no NFC adapter
    fn has_nfc(&self) -> bool;

    /// Route discovery events matching `filters` to this process
    fn enable(&self, filters: Vec<DiscoveryAction>);

    fn disable(&self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, uniffi::Enum, derive_more::Display)]
pub enum DispatchState {
    #[default]
    Inactive,
    Active,
}

#[derive(Debug, Clone)]
pub struct DispatchArbiter {
    state: DispatchState,
    filters: Vec<DiscoveryAction>,
    dispatch: Arc<Box<dyn ForegroundDispatch>>,
}

impl DispatchArbiter {
    pub fn new(dispatch: Box<dyn ForegroundDispatch>, filters: Vec<DiscoveryAction>) -> Self {
        Self {
            state: DispatchState::Inactive,
            filters,
            dispatch: Arc::new(dispatch),
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == DispatchState::Active
    }

    /// Returns true if the state changed
    pub fn enter_foreground(&mut self) -> bool {
        if self.is_active() {
            debug!("foreground dispatch already active");
            return false;
        }

        if !self.dispatch.has_nfc() {
            warn!("this device doesn't support NFC, not enabling foreground dispatch");
            return false;
        }

        self.dispatch.enable(self.filters.clone());
        self.state = DispatchState::Active;
        debug!("foreground dispatch enabled for {:?}", self.filters);

        true
    }

    /// Returns true if the state changed
    pub fn leave_foreground(&mut self) -> bool {
        if !self.is_active() {
            debug!("foreground dispatch already inactive");
            return false;
        }

        self.dispatch.disable();
        self.state = DispatchState::Inactive;
        debug!("foreground dispatch disabled");

        true
    }
}
