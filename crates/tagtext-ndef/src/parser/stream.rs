use winnow::{Bytes, Partial};

/// Partial so running out of bytes is reported as incomplete, not as a parse failure
pub type Stream<'i> = Partial<&'i Bytes>;

pub fn new(b: &[u8]) -> Stream<'_> {
    Partial::new(Bytes::new(b))
}
