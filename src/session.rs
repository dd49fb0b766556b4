//! The tag currently in range and writing text to it

use tagtext_ndef::{NdefMessage, NdefMessageError, TextEncoding, TextRecord, TextRecordError, text};
use tracing::{debug, info};

use crate::tag::{TagHandle, TagIoError, TagTechnology};

pub const WRITE_SUCCESS: &str = "Text written to the NFC tag successfully!";
pub const NO_TAG_DETECTED: &str = "No NFC tag detected!";
pub const WRONG_TAG_TYPE: &str = "Wrong type of Tag!";
pub const WRITE_ERROR: &str = "Error during writing, is the NFC tag close enough to your device?";

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, uniffi::Error)]
pub enum WriteError {
    #[error("no NFC tag detected")]
    NoTagPresent,

    #[error("tag supports neither NDEF nor NDEF formatting")]
    UnsupportedTagType,

    /// Transient, the whole write can be retried
    #[error("tag I/O failed: {0}")]
    Io(String),

    #[error("tag rejected the NDEF message: {0}")]
    Format(String),

    #[error("unable to encode text record: {0}")]
    Encoding(String),
}

impl WriteError {
    /// Message to show the user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoTagPresent => NO_TAG_DETECTED,
            Self::UnsupportedTagType => WRONG_TAG_TYPE,
            Self::Io(_) | Self::Format(_) | Self::Encoding(_) => WRITE_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoTagPresent | Self::Io(_))
    }
}

impl From<TagIoError> for WriteError {
    fn from(error: TagIoError) -> Self {
        match error {
            TagIoError::Io(reason) => Self::Io(reason),
            TagIoError::Format(reason) => Self::Format(reason),
        }
    }
}

impl From<TextRecordError> for WriteError {
    fn from(error: TextRecordError) -> Self {
        Self::Encoding(error.to_string())
    }
}

impl From<NdefMessageError> for WriteError {
    fn from(error: NdefMessageError) -> Self {
        Self::Encoding(error.to_string())
    }
}

type Error = WriteError;
type Result<T, E = Error> = std::result::Result<T, E>;

/// What this process knows about the tag and the foreground dispatch
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current_tag: Option<TagHandle>,
    pub dispatch_active: bool,
}

/// Owns the most recently discovered tag
///
/// Not internally synchronized, callers serialize access.
#[derive(Debug, Clone)]
pub struct TagSession {
    current_tag: Option<TagHandle>,
    language_code: String,
    encoding: TextEncoding,
}

impl Default for TagSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TagSession {
    pub fn new() -> Self {
        Self::with_record_format(text::DEFAULT_LANGUAGE_CODE, TextEncoding::Utf8)
    }

    pub fn with_record_format(language_code: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            current_tag: None,
            language_code: language_code.into(),
            encoding,
        }
    }

    /// Most recent wins, the previous handle is dropped
    pub fn set_current_tag(&mut self, tag: TagHandle) {
        debug!("current tag is now {}", tag.id_hex());
        self.current_tag = Some(tag);
    }

    pub fn current_tag(&self) -> Option<&TagHandle> {
        self.current_tag.as_ref()
    }

    pub fn has_tag(&self) -> bool {
        self.current_tag.is_some()
    }

    pub fn state(&self, dispatch_active: bool) -> SessionState {
        SessionState {
            current_tag: self.current_tag.clone(),
            dispatch_active,
        }
    }

    /// Encode `text` for the current tag without touching the tag yet
    pub fn prepare_write(&self, text: &str) -> Result<PendingWrite> {
        let Some(tag) = self.current_tag.clone() else {
            return Err(Error::NoTagPresent);
        };

        let record = TextRecord {
            language_code: self.language_code.clone(),
            encoding: self.encoding,
            text: text.to_string(),
        }
        .to_record()?;

        let message = NdefMessage::single(record).to_bytes()?;
        Ok(PendingWrite { tag, message })
    }

    /// Blocking, runs the whole tag transaction on the calling thread
    pub fn write(&self, text: &str) -> Result<()> {
        self.prepare_write(text)?.execute()
    }
}

/// An encoded message bound to the tag it will be written to
#[derive(Debug, Clone)]
pub struct PendingWrite {
    tag: TagHandle,
    message: Vec<u8>,
}

impl PendingWrite {
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Connect, write or format, close
    ///
    /// The connection is closed on every path once `connect` succeeded.
    pub fn execute(self) -> Result<()> {
        let Self { tag, message } = self;

        match tag.technology() {
            TagTechnology::Ndef => {
                let connection = tag.connect()?;
                connection.write_ndef_message(message)?;
            }

            TagTechnology::NdefFormatable => {
                let connection = tag.connect()?;
                connection.format(message)?;
            }

            TagTechnology::Unsupported => return Err(Error::UnsupportedTagType),
        }

        info!("wrote NDEF message to tag {}", tag.id_hex());
        Ok(())
    }
}
