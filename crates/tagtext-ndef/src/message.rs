use tracing::debug;
use winnow::{
    error::{ErrMode, Needed},
    stream::Stream as _,
};

use crate::{parser, record::NdefRecord};

/// An NDEF message, one or more records
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct NdefMessage {
    pub records: Vec<NdefRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum NdefMessageError {
    #[error("message has no records")]
    Empty,

    #[error("message is incomplete, needed {needed:?} more bytes")]
    Incomplete { needed: Option<u32> },

    #[error("error parsing the NDEF message: {0}")]
    Parse(String),

    #[error("record {field} is {length} bytes, too long for its length field")]
    FieldTooLong { field: String, length: u64 },
}

pub type Error = NdefMessageError;
type Result<T, E = Error> = std::result::Result<T, E>;

impl NdefMessage {
    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    pub fn first_record(&self) -> Option<&NdefRecord> {
        self.records.first()
    }

    /// Serialize, setting message begin on the first record and message end on the last
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let last = self.records.len().saturating_sub(1);

        let mut bytes = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            bytes.extend(record.to_bytes(index == 0, index == last)?);
        }

        Ok(bytes)
    }

    /// Parse a complete raw message, bytes after the message end record are ignored
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Empty);
        }

        let mut stream = parser::stream::new(bytes);
        let records = match parser::parse_ndef_message(&mut stream) {
            Ok(records) => records,
            Err(ErrMode::Incomplete(Needed::Size(needed))) => {
                return Err(Error::Incomplete {
                    needed: Some(needed.get() as u32),
                });
            }
            Err(ErrMode::Incomplete(Needed::Unknown)) => {
                return Err(Error::Incomplete { needed: None });
            }
            Err(error) => return Err(Error::Parse(error.to_string())),
        };

        let trailing = stream.eof_offset();
        if trailing > 0 {
            debug!("ignoring {trailing} bytes after the message end record");
        }

        Ok(Self { records })
    }
}
