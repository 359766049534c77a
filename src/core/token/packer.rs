//! Little-endian packing primitives for the token wire format
//!
//! The platform's binary token layout uses little-endian integers and
//! u16-length-prefixed byte strings throughout. Packing and unpacking must
//! stay exact inverses of each other: the signature covers the packed bytes,
//! so a single byte of drift makes the remote verifier reject the token.

use crate::errors::{AppError, AppResult};

pub fn pack_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn pack_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Packs a byte string as a u16 length prefix followed by the raw bytes.
///
/// Fails with `Encoding` if the value does not fit a u16 length prefix.
pub fn pack_bytes(buf: &mut Vec<u8>, value: &[u8]) -> AppResult<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| AppError::Encoding(format!("field of {} bytes exceeds u16 length", value.len())))?;
    pack_u16(buf, len);
    buf.extend_from_slice(value);
    Ok(())
}

pub fn pack_string(buf: &mut Vec<u8>, value: &str) -> AppResult<()> {
    pack_bytes(buf, value.as_bytes())
}

/// Cursor over a packed byte sequence
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> AppResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| AppError::Encoding("truncated token payload".to_string()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u16(&mut self) -> AppResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> AppResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_bytes(&mut self) -> AppResult<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.take(len)
    }

    pub fn read_string(&mut self) -> AppResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Encoding("non-UTF-8 string in token payload".to_string()))
    }

    /// Bytes remaining past the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_pack_little_endian() {
        let mut buf = Vec::new();
        pack_u16(&mut buf, 0x0102);
        pack_u32(&mut buf, 0x0A0B0C0D);
        assert_eq!(hex::encode(&buf), "02010d0c0b0a");
    }

    #[test]
    fn strings_pack_with_u16_length_prefix() {
        let mut buf = Vec::new();
        pack_string(&mut buf, "room").unwrap();
        assert_eq!(hex::encode(&buf), "0400726f6f6d");

        let mut empty = Vec::new();
        pack_string(&mut empty, "").unwrap();
        assert_eq!(hex::encode(&empty), "0000");
    }

    #[test]
    fn reader_inverts_packing() {
        let mut buf = Vec::new();
        pack_string(&mut buf, "channel-7").unwrap();
        pack_u32(&mut buf, 1_111_111);
        pack_u16(&mut buf, 2);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), "channel-7");
        assert_eq!(reader.read_u32().unwrap(), 1_111_111);
        assert_eq!(reader.read_u16().unwrap(), 2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reader_rejects_truncated_input() {
        let mut buf = Vec::new();
        pack_string(&mut buf, "abcdef").unwrap();
        let mut reader = Reader::new(&buf[..4]);
        assert!(reader.read_string().is_err());
    }

    #[test]
    fn oversized_field_is_an_encoding_error() {
        let mut buf = Vec::new();
        let huge = vec![0u8; usize::from(u16::MAX) + 1];
        assert!(pack_bytes(&mut buf, &huge).is_err());
    }
}
