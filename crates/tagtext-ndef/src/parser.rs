pub mod stream;

use stream::Stream;
use winnow::{
    ModalResult, Parser,
    binary::{
        be_u8, be_u32,
        bits::{bits, bool as take_bool, take as take_bits},
    },
    error::{ContextError, ErrMode},
    token::take,
};

use crate::{header::NdefHeader, ndef_type::NdefType, record::NdefRecord};

/// Parse records until one with the message end flag set
pub fn parse_ndef_message(input: &mut Stream<'_>) -> ModalResult<Vec<NdefRecord>> {
    let mut records = Vec::new();

    loop {
        let (header, record) = parse_ndef_record.parse_next(input)?;
        records.push(record);

        if header.message_end {
            break;
        }
    }

    Ok(records)
}

pub fn parse_ndef_record(input: &mut Stream<'_>) -> ModalResult<(NdefHeader, NdefRecord)> {
    let header = parse_header.parse_next(input)?;

    // chunked payloads would need reassembly across records, not supported
    if header.chunked {
        return Err(ErrMode::Cut(ContextError::new()));
    }

    let type_ = parse_bytes(input, header.type_length as usize)?;
    let id = parse_bytes(input, header.id_length.unwrap_or(0) as usize)?;
    let payload = parse_bytes(input, header.payload_length as usize)?;

    let record = NdefRecord {
        tnf: header.type_name_format,
        type_,
        id,
        payload,
    };

    Ok((header, record))
}

// private
fn parse_header_byte(input: &mut Stream<'_>) -> ModalResult<(bool, bool, bool, bool, bool, u8)> {
    bits::<_, _, ErrMode<ContextError>, _, _>((
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bool,
        take_bits(3_u8),
    ))
    .parse_next(input)
}

fn parse_header(input: &mut Stream<'_>) -> ModalResult<NdefHeader> {
    let (message_begin, message_end, chunked, short_record, has_id_length, type_name_format) =
        parse_header_byte(input)?;

    let type_length = parse_u8(input)?;

    let payload_length = if short_record {
        u32::from(parse_u8(input)?)
    } else {
        parse_u32(input)?
    };

    let id_length = if has_id_length {
        Some(parse_u8(input)?)
    } else {
        None
    };

    Ok(NdefHeader {
        message_begin,
        message_end,
        chunked,
        short_record,
        has_id_length,
        type_name_format: NdefType::from_bits(type_name_format),
        type_length,
        payload_length,
        id_length,
    })
}

fn parse_u8(input: &mut Stream<'_>) -> ModalResult<u8> {
    be_u8.parse_next(input)
}

fn parse_u32(input: &mut Stream<'_>) -> ModalResult<u32> {
    be_u32.parse_next(input)
}

fn parse_bytes(input: &mut Stream<'_>, length: usize) -> ModalResult<Vec<u8>> {
    take(length).map(|s: &[u8]| s.to_vec()).parse_next(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::error::Needed;

    use super::*;

    // "en" + "Hello, world!" as a single short well-known text record
    fn hello_message() -> Vec<u8> {
        let mut bytes = vec![0xD1, 0x01, 0x10, b'T', 0x02, b'e', b'n'];
        bytes.extend_from_slice(b"Hello, world!");
        bytes
    }

    #[test]
    fn known_header_parse() {
        let mut header_bytes = stream::new(&[0xD1, 0x01, 0x0D, 0x55, 0x02]);
        let header: NdefHeader = parse_header(&mut header_bytes).unwrap();

        assert!(header.message_begin);
        assert!(header.message_end);
        assert!(!header.chunked);
        assert!(header.short_record);
        assert!(!header.has_id_length);
        assert_eq!(header.type_name_format, NdefType::WellKnown);
        assert_eq!(header.type_length, 1);
        assert_eq!(header.payload_length, 13);
    }

    #[test]
    fn long_header_parse() {
        let mut header_bytes = stream::new(&[0x8A, 0x10, 0x00, 0x00, 0x0B, 0xC1, 0x02]);
        let header = parse_header(&mut header_bytes).unwrap();

        assert!(header.message_begin);
        assert!(!header.message_end);
        assert!(!header.short_record);
        assert!(header.has_id_length);
        assert_eq!(header.type_name_format, NdefType::Mime);
        assert_eq!(header.type_length, 16);
        assert_eq!(header.payload_length, 3009);
        assert_eq!(header.id_length, Some(2));
    }

    #[test]
    fn parse_single_text_record() {
        let bytes = hello_message();
        let records = parse_ndef_message(&mut stream::new(&bytes)).unwrap();

        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert!(record.is_text());
        assert!(record.id.is_empty());
        assert_eq!(&record.payload[..3], &[0x02, b'e', b'n']);
        assert_eq!(&record.payload[3..], b"Hello, world!");
    }

    #[test]
    fn parse_stops_at_message_end() {
        let first = crate::record::NdefRecord::text(vec![0x02, b'e', b'n', b'a']);
        let second = crate::record::NdefRecord::text(vec![0x02, b'e', b'n', b'b']);

        let mut bytes = first.to_bytes(true, false).unwrap();
        bytes.extend(second.to_bytes(false, true).unwrap());

        let records = parse_ndef_message(&mut stream::new(&bytes)).unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn truncated_message_is_incomplete() {
        let bytes = hello_message();
        let result = parse_ndef_message(&mut stream::new(&bytes[..10]));

        assert!(matches!(result, Err(ErrMode::Incomplete(Needed::Size(_)))));
    }

    #[test]
    fn missing_message_end_is_incomplete() {
        let record = crate::record::NdefRecord::text(vec![0x02, b'e', b'n']);
        let bytes = record.to_bytes(true, false).unwrap();

        let result = parse_ndef_message(&mut stream::new(&bytes));
        assert!(matches!(result, Err(ErrMode::Incomplete(_))));
    }

    #[test]
    fn chunked_record_is_rejected() {
        let mut bytes = hello_message();
        bytes[0] |= 0b0010_0000;

        let result = parse_ndef_message(&mut stream::new(&bytes));
        assert!(matches!(result, Err(ErrMode::Cut(_))));
    }
}
