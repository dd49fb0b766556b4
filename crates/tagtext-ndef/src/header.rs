use crate::ndef_type::NdefType;

const MESSAGE_BEGIN: u8 = 0b1000_0000;
const MESSAGE_END: u8 = 0b0100_0000;
const CHUNKED: u8 = 0b0010_0000;
const SHORT_RECORD: u8 = 0b0001_0000;
const ID_LENGTH_PRESENT: u8 = 0b0000_1000;

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NdefHeader {
    pub message_begin: bool,
    pub message_end: bool,
    pub chunked: bool,
    pub short_record: bool,
    pub has_id_length: bool,
    pub type_name_format: NdefType,
    pub type_length: u8,
    pub payload_length: u32,
    pub id_length: Option<u8>,
}

impl NdefHeader {
    /// The flags + TNF byte that starts every record
    pub fn flags_byte(&self) -> u8 {
        let mut byte = self.type_name_format.bits();

        for (set, flag) in [
            (self.message_begin, MESSAGE_BEGIN),
            (self.message_end, MESSAGE_END),
            (self.chunked, CHUNKED),
            (self.short_record, SHORT_RECORD),
            (self.has_id_length, ID_LENGTH_PRESENT),
        ] {
            if set {
                byte |= flag;
            }
        }

        byte
    }

    /// Serialize the header, everything up to (not including) the type field
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8);
        bytes.push(self.flags_byte());
        bytes.push(self.type_length);

        if self.short_record {
            bytes.push(self.payload_length as u8);
        } else {
            bytes.extend_from_slice(&self.payload_length.to_be_bytes());
        }

        if let Some(id_length) = self.id_length {
            bytes.push(id_length);
        }

        bytes
    }
}
