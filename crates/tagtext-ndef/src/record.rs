use crate::{header::NdefHeader, message::NdefMessageError, ndef_type::NdefType};

/// Record type of the well-known "Text" record
pub const TEXT_RECORD_TYPE: &[u8] = b"T";

/// A single NDEF record, as the platform hands it over on the read path
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct NdefRecord {
    pub tnf: NdefType,
    pub type_: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    /// Well-known "T" record around an already encoded text payload, no id
    pub fn text(payload: Vec<u8>) -> Self {
        Self {
            tnf: NdefType::WellKnown,
            type_: TEXT_RECORD_TYPE.to_vec(),
            id: Vec::new(),
            payload,
        }
    }

    pub fn is_text(&self) -> bool {
        self.tnf == NdefType::WellKnown && self.type_ == TEXT_RECORD_TYPE
    }

    /// Header for this record at a given position in its message
    ///
    /// Fails when the type or id is over 255 bytes, or the payload over 4 GiB.
    pub fn header(
        &self,
        message_begin: bool,
        message_end: bool,
    ) -> Result<NdefHeader, NdefMessageError> {
        let type_length = field_length::<u8>("type", &self.type_)?;
        let payload_length = field_length::<u32>("payload", &self.payload)?;
        let id_length = if self.id.is_empty() {
            None
        } else {
            Some(field_length::<u8>("id", &self.id)?)
        };

        Ok(NdefHeader {
            message_begin,
            message_end,
            chunked: false,
            short_record: payload_length <= u8::MAX as u32,
            has_id_length: id_length.is_some(),
            type_name_format: self.tnf,
            type_length,
            payload_length,
            id_length,
        })
    }

    pub fn to_bytes(
        &self,
        message_begin: bool,
        message_end: bool,
    ) -> Result<Vec<u8>, NdefMessageError> {
        let header = self.header(message_begin, message_end)?;

        let mut bytes = header.to_bytes();
        bytes.reserve(self.type_.len() + self.id.len() + self.payload.len());
        bytes.extend_from_slice(&self.type_);
        bytes.extend_from_slice(&self.id);
        bytes.extend_from_slice(&self.payload);

        Ok(bytes)
    }
}

fn field_length<T: TryFrom<usize>>(field: &str, bytes: &[u8]) -> Result<T, NdefMessageError> {
    T::try_from(bytes.len()).map_err(|_| NdefMessageError::FieldTooLong {
        field: field.to_string(),
        length: bytes.len() as u64,
    })
}

// only used for uniffi
mod ffi {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, uniffi::Object)]
    pub struct NdefRecordReader {
        record: NdefRecord,
    }

    #[uniffi::export]
    impl NdefRecordReader {
        #[uniffi::constructor]
        pub fn new(record: NdefRecord) -> Self {
            Self { record }
        }

        pub fn type_(&self) -> Option<String> {
            String::from_utf8(self.record.type_.clone()).ok()
        }

        pub fn id(&self) -> Option<String> {
            if self.record.id.is_empty() {
                return None;
            }

            String::from_utf8(self.record.id.clone()).ok()
        }

        pub fn is_text(&self) -> bool {
            self.record.is_text()
        }
    }
}
