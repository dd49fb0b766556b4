//! NDEF wire model and the well-known "Text" record codec
//!
//! Pure byte handling, nothing in here talks to a tag.

uniffi::setup_scaffolding!();

pub mod header;
pub mod message;
pub mod ndef_type;
pub mod parser;
pub mod record;
pub mod text;

pub use message::{NdefMessage, NdefMessageError};
pub use ndef_type::NdefType;
pub use record::NdefRecord;
pub use text::{LanguageCodeMask, TextEncoding, TextRecord, TextRecordError};

/// Decode the text of the first record of the first message
///
/// Any further records or messages are ignored.
pub fn first_text(
    messages: &[NdefMessage],
    mask: LanguageCodeMask,
) -> Option<Result<TextRecord, TextRecordError>> {
    let record = messages.first()?.first_record()?;
    Some(text::decode_with_mask(&record.payload, mask))
}

#[uniffi::export]
fn encode_text_payload(text: String) -> Result<Vec<u8>, TextRecordError> {
    text::encode(&text)
}

#[uniffi::export]
fn decode_text_payload(
    payload: Vec<u8>,
    mask: LanguageCodeMask,
) -> Result<TextRecord, TextRecordError> {
    text::decode_with_mask(&payload, mask)
}

#[uniffi::export]
fn parse_ndef_message(bytes: Vec<u8>) -> Result<NdefMessage, NdefMessageError> {
    NdefMessage::parse(&bytes)
}
