//! Entry point for the frontend
//!
//! The frontend forwards lifecycle hooks, discovery events and write requests
//! here, and listens for [`TagTextManagerReconcileMessage`] updates.

use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tagtext_ndef::NdefMessage;
use tap::TapFallible as _;
use tracing::{debug, error, warn};

use crate::{
    arbiter::{DispatchArbiter, DispatchState, ForegroundDispatch},
    config::{ConfigError, TagTextConfig},
    ingress::{DiscoveryAction, DiscoveryEvent, EventIngress, IngressOutcome},
    session::{SessionState, TagSession, WRITE_SUCCESS, WriteError},
    tag::TagTransport,
    unblock,
};

type Message = TagTextManagerReconcileMessage;

/// Updates queued for the frontend before new ones are dropped
const RECONCILE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Hash, Eq, PartialEq, uniffi::Enum)]
pub enum TagTextManagerReconcileMessage {
    TagDetected { tag_id: String },
    MessageRead(String),
    /// The tag carried a message that could not be decoded, display is unchanged
    UnreadableMessage(String),
    WriteSucceeded(String),
    WriteFailed { reason: String, message: String },
    DispatchChanged(DispatchState),
}

#[uniffi::export(callback_interface)]
pub trait TagTextManagerReconciler: Send + Sync + std::fmt::Debug + 'static {
    /// Tells the frontend to reconcile the manager changes
    fn reconcile(&self, message: TagTextManagerReconcileMessage);
}

#[derive(Debug)]
struct Inner {
    session: TagSession,
    arbiter: DispatchArbiter,
    ingress: EventIngress,
    displayed_text: Option<String>,
}

#[derive(Clone, Debug, uniffi::Object)]
pub struct RustTagTextManager {
    inner: Arc<Mutex<Inner>>,
    config: TagTextConfig,
    reconciler: Sender<Message>,
    reconcile_receiver: Arc<Receiver<Message>>,
}

#[uniffi::export]
impl RustTagTextManager {
    #[uniffi::constructor]
    pub fn new(
        dispatch: Box<dyn ForegroundDispatch>,
        config: TagTextConfig,
    ) -> Result<Arc<Self>, ConfigError> {
        crate::logging::init();
        config.validate()?;

        let (sender, receiver) = flume::bounded(RECONCILE_CAPACITY);

        let inner = Inner {
            session: TagSession::with_record_format(
                config.language_code.clone(),
                config.text_encoding,
            ),
            arbiter: DispatchArbiter::new(dispatch, config.dispatch_filters.clone()),
            ingress: EventIngress::new(config.language_code_mask),
            displayed_text: None,
        };

        Ok(Arc::new(Self {
            inner: Arc::new(Mutex::new(inner)),
            config,
            reconciler: sender,
            reconcile_receiver: Arc::new(receiver),
        }))
    }

    /// Call once, every call starts another consumer of the same queue
    #[uniffi::method]
    pub fn listen_for_updates(&self, reconciler: Box<dyn TagTextManagerReconciler>) {
        let reconcile_receiver = self.reconcile_receiver.clone();

        std::thread::spawn(move || {
            while let Ok(message) = reconcile_receiver.recv() {
                // call the reconcile method on the frontend
                reconciler.reconcile(message);
            }
        });
    }

    /// Window became visible
    pub fn on_resume(&self) {
        let changed = self.inner.lock().arbiter.enter_foreground();
        if changed {
            self.send(Message::DispatchChanged(DispatchState::Active));
        }
    }

    /// Window is about to become invisible
    pub fn on_pause(&self) {
        let changed = self.inner.lock().arbiter.leave_foreground();
        if changed {
            self.send(Message::DispatchChanged(DispatchState::Inactive));
        }
    }

    /// Discovery event with messages already parsed by the platform
    pub fn on_tag_discovered(
        &self,
        action: String,
        tag: Box<dyn TagTransport>,
        messages: Vec<NdefMessage>,
    ) {
        self.handle_event(DiscoveryEvent {
            action: DiscoveryAction::from_intent_action(&action),
            tag: tag.into(),
            messages,
        });
    }

    /// Discovery event carrying raw message bytes, only the first message is parsed
    pub fn on_raw_tag_discovered(
        &self,
        action: String,
        tag: Box<dyn TagTransport>,
        raw_messages: Vec<Vec<u8>>,
    ) {
        let messages = raw_messages
            .first()
            .and_then(|bytes| {
                NdefMessage::parse(bytes)
                    .tap_err(|error| warn!("unable to parse NDEF message: {error}"))
                    .ok()
            })
            .into_iter()
            .collect();

        self.on_tag_discovered(action, tag, messages);
    }

    /// Write on the calling thread, prefer [`Self::write`] from a UI thread
    pub fn write_blocking(&self, text: String) -> Result<(), WriteError> {
        let result = self.inner.lock().session.prepare_write(&text);
        let result = result.and_then(|pending| pending.execute());

        self.finish_write(result)
    }

    /// Last text read from a tag, with the display prefix
    pub fn displayed_text(&self) -> Option<String> {
        self.inner.lock().displayed_text.clone()
    }

    pub fn has_tag(&self) -> bool {
        self.inner.lock().session.has_tag()
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.inner.lock().arbiter.state()
    }

    pub fn config(&self) -> TagTextConfig {
        self.config.clone()
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl RustTagTextManager {
    /// Write `text` to the current tag
    ///
    /// The tag transaction runs on a blocking worker, there is no cancellation
    /// once it started.
    pub async fn write(&self, text: String) -> Result<(), WriteError> {
        let pending = self.inner.lock().session.prepare_write(&text);

        let result = match pending {
            Ok(pending) => unblock::run_blocking(move || pending.execute())
                .await
                .unwrap_or_else(|error| Err(WriteError::Io(format!("write task failed: {error}")))),
            Err(error) => Err(error),
        };

        self.finish_write(result)
    }
}

impl RustTagTextManager {
    pub fn session_state(&self) -> SessionState {
        let inner = self.inner.lock();
        inner.session.state(inner.arbiter.is_active())
    }

    // private
    fn handle_event(&self, event: DiscoveryEvent) {
        let tag_id = event.tag.id_hex();

        let outcome = {
            let mut inner = self.inner.lock();
            let ingress = inner.ingress;
            let outcome = ingress.handle(&mut inner.session, event);

            if let Some(text) = outcome.display_text() {
                inner.displayed_text = Some(text);
            }

            outcome
        };

        match outcome {
            IngressOutcome::Ignored => {}
            IngressOutcome::TagUpdated => {
                self.send(Message::TagDetected { tag_id });
            }
            IngressOutcome::TextRead(record) => {
                debug!("read {} bytes of text from tag {tag_id}", record.text.len());
                self.send(Message::TagDetected { tag_id });
                self.send(Message::MessageRead(record.text));
            }
            IngressOutcome::Unreadable(reason) => {
                self.send(Message::TagDetected { tag_id });
                self.send(Message::UnreadableMessage(reason));
            }
        }
    }

    fn finish_write(&self, result: Result<(), WriteError>) -> Result<(), WriteError> {
        match &result {
            Ok(()) => self.send(Message::WriteSucceeded(WRITE_SUCCESS.to_string())),
            Err(error) => {
                error!("unable to write to tag: {error}");
                self.send(Message::WriteFailed {
                    reason: error.to_string(),
                    message: error.user_message().to_string(),
                });
            }
        }

        result
    }

    fn send(&self, message: Message) {
        debug!("send: {message:?}");
        match self.reconciler.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                warn!("reconcile queue is full, dropping {message:?}");
            }
            Err(TrySendError::Disconnected(message)) => {
                error!("unable to send reconcile message {message:?}, receiver is gone");
            }
        }
    }
}
