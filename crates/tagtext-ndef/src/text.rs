//! Encode and decode the payload of a well-known "Text" record
//!
//! Payload layout:
//!
//! ```text
//! [status] [language code bytes] [text bytes]
//!
//! status bit 7     text encoding, 0 = UTF-8, 1 = UTF-16
//! status bit 6     reserved, always 0
//! status bits 5..0 length of the language code
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::record::NdefRecord;

/// Language code used when none is configured
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Longest language code the 6 bit length field can describe
pub const MAX_LANGUAGE_CODE_LENGTH: usize = 0b0011_1111;

const UTF16_FLAG: u8 = 0b1000_0000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16,
}

/// Mask applied to the status byte to read the language code length
///
/// `Legacy` keeps bits 0, 1, 4 and 5 only. That is what existing readers in
/// the field do, so it is the default for byte-for-byte compatibility.
/// `Full` reads the whole 6 bit field as written by [`encode_with`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageCodeMask {
    #[default]
    Legacy,
    Full,
}

impl LanguageCodeMask {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Legacy => 0b0011_0011,
            Self::Full => 0b0011_1111,
        }
    }

    pub const fn language_code_length(self, status: u8) -> usize {
        (status & self.bits()) as usize
    }
}

/// Logical form of a text record
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct TextRecord {
    pub language_code: String,
    pub encoding: TextEncoding,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum TextRecordError {
    #[error("unable to encode language code {0:?}, must be ASCII and at most 63 bytes")]
    EncodingError(String),

    #[error("malformed text payload: {0}")]
    MalformedPayload(String),

    #[error("text is not valid {0:?}")]
    UnsupportedEncoding(TextEncoding),
}

pub type Error = TextRecordError;
type Result<T, E = Error> = std::result::Result<T, E>;

impl TextRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            encoding: TextEncoding::Utf8,
            text: text.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_with(&self.language_code, self.encoding, &self.text)
    }

    /// Encoded payload wrapped in a well-known "T" record
    pub fn to_record(&self) -> Result<NdefRecord> {
        Ok(NdefRecord::text(self.encode()?))
    }
}

/// Encode `text` as UTF-8 with the `"en"` language code
pub fn encode(text: &str) -> Result<Vec<u8>> {
    encode_with(DEFAULT_LANGUAGE_CODE, TextEncoding::Utf8, text)
}

/// UTF-16 text is written big-endian without a byte order mark
pub fn encode_with(language_code: &str, encoding: TextEncoding, text: &str) -> Result<Vec<u8>> {
    let language = language_code_bytes(language_code)?;

    let mut status = language.len() as u8;
    if encoding == TextEncoding::Utf16 {
        status |= UTF16_FLAG;
    }

    let mut payload = Vec::with_capacity(1 + language.len() + text.len());
    payload.push(status);
    payload.extend_from_slice(language);

    match encoding {
        TextEncoding::Utf8 => payload.extend_from_slice(text.as_bytes()),
        TextEncoding::Utf16 => {
            payload.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
        }
    }

    Ok(payload)
}

/// Decode with the default [`LanguageCodeMask::Legacy`] mask
pub fn decode(payload: &[u8]) -> Result<TextRecord> {
    decode_with_mask(payload, LanguageCodeMask::default())
}

pub fn decode_with_mask(payload: &[u8], mask: LanguageCodeMask) -> Result<TextRecord> {
    let Some(&status) = payload.first() else {
        return Err(Error::MalformedPayload("payload is empty".into()));
    };

    let encoding = if status & UTF16_FLAG == 0 {
        TextEncoding::Utf8
    } else {
        TextEncoding::Utf16
    };

    let language_code_length = mask.language_code_length(status);
    if mask == LanguageCodeMask::Legacy {
        let full_length = LanguageCodeMask::Full.language_code_length(status);
        if full_length != language_code_length {
            warn!(
                "legacy mask reads language code length {language_code_length}, status byte declares {full_length}"
            );
        }
    }

    let text_start = 1 + language_code_length;
    if text_start > payload.len() {
        return Err(Error::MalformedPayload(format!(
            "language code length {language_code_length} exceeds payload of {} bytes",
            payload.len()
        )));
    }

    // only informational, a bad language code never hides the text
    let language_code = String::from_utf8_lossy(&payload[1..text_start]).into_owned();

    let text = decode_text(&payload[text_start..], encoding)?;

    Ok(TextRecord {
        language_code,
        encoding,
        text,
    })
}

// private
fn language_code_bytes(language_code: &str) -> Result<&[u8]> {
    if !language_code.is_ascii() || language_code.len() > MAX_LANGUAGE_CODE_LENGTH {
        return Err(Error::EncodingError(language_code.to_string()));
    }

    Ok(language_code.as_bytes())
}

fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::UnsupportedEncoding(TextEncoding::Utf8)),
        TextEncoding::Utf16 => decode_utf16(bytes),
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::UnsupportedEncoding(TextEncoding::Utf16));
    }

    // a byte order mark picks the endianness, big-endian otherwise
    let (little_endian, bytes) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };

    let units = bytes.chunks_exact(2).map(|chunk| {
        let pair = [chunk[0], chunk[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::UnsupportedEncoding(TextEncoding::Utf16))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encode_hello() {
        let payload = encode("Hello").unwrap();
        assert_eq!(payload, b"\x02enHello".to_vec());
    }

    #[test]
    fn status_byte_is_language_length_with_high_bit_clear() {
        for text in ["", "a", "héllo wörld", "日本語のテキスト", "emoji 🦀"] {
            let payload = encode(text).unwrap();
            assert_eq!(payload[0], 0x02);
            assert_eq!(payload[0] & UTF16_FLAG, 0);
        }
    }

    #[test]
    fn decode_returns_what_encode_wrote() {
        for text in ["", "Hello", "héllo wörld", "日本語のテキスト", "emoji 🦀", "line\nbreak"] {
            let record = decode(&encode(text).unwrap()).unwrap();

            assert_eq!(
                record,
                TextRecord {
                    language_code: "en".into(),
                    encoding: TextEncoding::Utf8,
                    text: text.into(),
                }
            );
        }
    }

    #[test]
    fn decode_empty_payload_is_malformed() {
        assert!(matches!(decode(&[]), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn decode_language_only_yields_empty_text() {
        let record = decode(&[0x02, b'e', b'n']).unwrap();
        assert_eq!(record.language_code, "en");
        assert_eq!(record.text, "");
    }

    #[test]
    fn decode_language_length_past_end_is_malformed() {
        assert!(matches!(
            decode(&[0x03, b'e', b'n']),
            Err(Error::MalformedPayload(_))
        ));
        assert!(matches!(decode(&[0x02]), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn decode_invalid_utf8_is_unsupported_encoding() {
        let result = decode(&[0x02, b'e', b'n', 0xC3, 0x28]);
        assert_eq!(result, Err(Error::UnsupportedEncoding(TextEncoding::Utf8)));
    }

    #[test]
    fn decode_non_ascii_language_code_keeps_text() {
        let record = decode(&[0x02, 0xC3, 0xA9, b'h', b'i']).unwrap();
        assert_eq!(record.language_code, "é");
        assert_eq!(record.text, "hi");

        let record = decode(&[0x02, 0xFF, b'e', b'h', b'i']).unwrap();
        assert_eq!(record.language_code, "\u{FFFD}e");
        assert_eq!(record.text, "hi");
    }

    #[test]
    fn legacy_mask_ignores_bits_two_and_three() {
        // 0x06 declares a 6 byte language code, legacy reads 2
        let payload = b"\x06en-GBxhi";

        let legacy = decode_with_mask(payload, LanguageCodeMask::Legacy).unwrap();
        assert_eq!(legacy.language_code, "en");
        assert_eq!(legacy.text, "-GBxhi");

        let full = decode_with_mask(payload, LanguageCodeMask::Full).unwrap();
        assert_eq!(full.language_code, "en-GBx");
        assert_eq!(full.text, "hi");
    }

    #[test]
    fn utf16_round_trip() {
        let payload = encode_with("en", TextEncoding::Utf16, "héllo 🦀").unwrap();
        assert_eq!(payload[0], 0x82);

        let record = decode(&payload).unwrap();
        assert_eq!(record.encoding, TextEncoding::Utf16);
        assert_eq!(record.text, "héllo 🦀");
    }

    #[test]
    fn utf16_byte_order_mark() {
        let little = [0x82, b'e', b'n', 0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode(&little).unwrap().text, "hi");

        let big = [0x82, b'e', b'n', 0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(decode(&big).unwrap().text, "hi");
    }

    #[test]
    fn utf16_odd_length_or_lone_surrogate_fails() {
        let odd = [0x82, b'e', b'n', 0x00, b'h', 0x00];
        assert_eq!(
            decode(&odd),
            Err(Error::UnsupportedEncoding(TextEncoding::Utf16))
        );

        let lone_surrogate = [0x82, b'e', b'n', 0xD8, 0x3D];
        assert_eq!(
            decode(&lone_surrogate),
            Err(Error::UnsupportedEncoding(TextEncoding::Utf16))
        );
    }

    #[test]
    fn language_code_must_be_short_ascii() {
        assert!(matches!(
            encode_with("日本", TextEncoding::Utf8, "hi"),
            Err(Error::EncodingError(_))
        ));

        let too_long = "x".repeat(MAX_LANGUAGE_CODE_LENGTH + 1);
        assert!(matches!(
            encode_with(&too_long, TextEncoding::Utf8, "hi"),
            Err(Error::EncodingError(_))
        ));

        let longest = "x".repeat(MAX_LANGUAGE_CODE_LENGTH);
        let payload = encode_with(&longest, TextEncoding::Utf8, "hi").unwrap();
        assert_eq!(payload[0], 0x3F);
    }

    #[test]
    fn text_record_to_record() {
        let record = TextRecord::new("Hello").to_record().unwrap();
        assert!(record.is_text());
        assert_eq!(record.payload, b"\x02enHello".to_vec());
    }
}
