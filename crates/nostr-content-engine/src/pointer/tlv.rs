use super::{DecodeError, EncodeError};

/// TLV record types used by `nprofile`, `nevent` and `naddr`.
pub struct Tlv;

impl Tlv {
    /// Pubkey, event id or address identifier depending on the prefix.
    pub const SPECIAL: u8 = 0;
    pub const RELAY: u8 = 1;
    pub const AUTHOR: u8 = 2;
    /// Big-endian u32.
    pub const KIND: u8 = 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

/// Splits a payload into records. Trailing bytes that do not form a
/// complete record are an error.
pub fn parse(mut data: &[u8]) -> Result<Vec<Record<'_>>, DecodeError> {
    let mut records = Vec::new();
    while !data.is_empty() {
        let [tag, len, rest @ ..] = data else {
            return Err(DecodeError::TruncatedTlv);
        };
        let len = usize::from(*len);
        if rest.len() < len {
            return Err(DecodeError::TruncatedTlv);
        }
        let (value, tail) = rest.split_at(len);
        records.push(Record { tag: *tag, value });
        data = tail;
    }
    Ok(records)
}

pub fn write(out: &mut Vec<u8>, tag: u8, value: &[u8], field: &'static str) -> Result<(), EncodeError> {
    let len = u8::try_from(value.len()).map_err(|_| EncodeError::ValueTooLong(field))?;
    out.push(tag);
    out.push(len);
    out.extend_from_slice(value);
    Ok(())
}
