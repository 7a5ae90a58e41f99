//! The string table section: `count: u16` then `count` entries of
//! `{length: u16, bytes[length]}`. IDs are implicit — position in
//! insertion order. Entries are immutable once written; lookups borrow
//! directly from the underlying module buffer.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone)]
pub struct StringTable<'a> {
    offsets: Vec<(usize, usize)>,
    buf: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Parse a string table from `section`, a byte slice borrowed from the
    /// module buffer's string section.
    pub fn parse(section: &'a [u8]) -> Result<StringTable<'a>> {
        if section.len() < 2 {
            return Err(Error::UnexpectedEof);
        }
        let count = LittleEndian::read_u16(&section[0..2]);
        let mut offsets = Vec::with_capacity(count as usize);
        let mut pos = 2usize;
        for _ in 0..count {
            if pos + 2 > section.len() {
                return Err(Error::UnexpectedEof);
            }
            let length = LittleEndian::read_u16(&section[pos..pos + 2]) as usize;
            pos += 2;
            if pos + length > section.len() {
                return Err(Error::UnexpectedEof);
            }
            offsets.push((pos, length));
            pos += length;
        }
        Ok(StringTable {
            offsets,
            buf: section,
        })
    }

    pub fn len(&self) -> u16 {
        self.offsets.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Look up string `id`, validating UTF-8 on access rather than at parse
    /// time, so a table carrying one malformed entry doesn't poison reads
    /// of every other entry.
    pub fn get(&self, id: u16) -> Result<&'a str> {
        let (start, length) = *self
            .offsets
            .get(id as usize)
            .ok_or(Error::StringIdOutOfRange(id, self.len()))?;
        std::str::from_utf8(&self.buf[start..start + length]).map_err(|_| Error::InvalidUtf8(id))
    }
}

/// Serialize `strings` (in ID order) into the string table section layout.
pub fn write_string_table(out: &mut Vec<u8>, strings: &[&str]) -> Result<()> {
    let count: u16 = strings
        .len()
        .try_into()
        .map_err(|_| Error::InvalidModule("more than 65535 strings"))?;
    out.extend_from_slice(&count.to_le_bytes());
    for s in strings {
        let length: u16 = s
            .len()
            .try_into()
            .map_err(|_| Error::InvalidModule("string entry longer than 65535 bytes"))?;
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }
    Ok(())
}
