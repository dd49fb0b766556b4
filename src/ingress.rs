//! Turns a platform discovery event into session and display updates

use serde::{Deserialize, Serialize};
use tagtext_ndef::{LanguageCodeMask, NdefMessage, TextRecord};
use tracing::{debug, warn};

use crate::{session::TagSession, tag::TagHandle};

pub const ACTION_TAG_DISCOVERED: &str = "android.nfc.action.TAG_DISCOVERED";
pub const ACTION_TECH_DISCOVERED: &str = "android.nfc.action.TECH_DISCOVERED";
pub const ACTION_NDEF_DISCOVERED: &str = "android.nfc.action.NDEF_DISCOVERED";

const DISPLAY_PREFIX: &str = "Message read from NFC Tag:\n ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryAction {
    TagDiscovered,
    TechDiscovered,
    NdefDiscovered,
    Other(String),
}

impl DiscoveryAction {
    pub fn from_intent_action(action: &str) -> Self {
        match action {
            ACTION_TAG_DISCOVERED => Self::TagDiscovered,
            ACTION_TECH_DISCOVERED => Self::TechDiscovered,
            ACTION_NDEF_DISCOVERED => Self::NdefDiscovered,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn intent_action(&self) -> &str {
        match self {
            Self::TagDiscovered => ACTION_TAG_DISCOVERED,
            Self::TechDiscovered => ACTION_TECH_DISCOVERED,
            Self::NdefDiscovered => ACTION_NDEF_DISCOVERED,
            Self::Other(action) => action.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryEvent {
    pub action: DiscoveryAction,
    pub tag: TagHandle,
    pub messages: Vec<NdefMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngressOutcome {
    /// Not a tag discovery action, nothing changed
    Ignored,

    /// The tag was stored, it carried no messages
    TagUpdated,

    /// The tag was stored and its first record decoded
    TextRead(TextRecord),

    /// The tag was stored, its first record could not be decoded
    Unreadable(String),
}

impl IngressOutcome {
    /// Text to show the user, if the display should change
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::TextRead(record) => Some(format!("{DISPLAY_PREFIX}{}", record.text)),
            Self::Ignored | Self::TagUpdated | Self::Unreadable(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventIngress {
    mask: LanguageCodeMask,
}

impl EventIngress {
    pub fn new(mask: LanguageCodeMask) -> Self {
        Self { mask }
    }

    pub fn handle(&self, session: &mut TagSession, event: DiscoveryEvent) -> IngressOutcome {
        let DiscoveryEvent {
            action,
            tag,
            messages,
        } = event;

        if !action.is_recognized() {
            debug!("ignoring discovery event with action {}", action.intent_action());
            return IngressOutcome::Ignored;
        }

        session.set_current_tag(tag);

        match tagtext_ndef::first_text(&messages, self.mask) {
            None => IngressOutcome::TagUpdated,
            Some(Ok(record)) => IngressOutcome::TextRead(record),
            Some(Err(error)) => {
                warn!("unable to decode text record, keeping previous display: {error}");
                IngressOutcome::Unreadable(error.to_string())
            }
        }
    }
}
