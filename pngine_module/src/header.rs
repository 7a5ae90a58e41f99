//! The fixed PNGB header: magic, version, flags, and four `{offset, length}`
//! section records (bytecode, strings, data, uniforms), all little-endian.
//!
//! `magic(4) + version(4) + flags(4) + 4 * {offset(4), length(4)}` totals 44
//! bytes; this is the byte-exact layout the field list implies and is what
//! `write`/`parse` are round-trip tested against.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

pub const MAGIC: [u8; 4] = *b"PNGB";
pub const CURRENT_VERSION: u32 = 5;
pub const HEADER_LEN: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRecord {
    pub offset: u32,
    pub length: u32,
}

impl SectionRecord {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..(self.offset as usize + self.length as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub flags: u32,
    pub bytecode: SectionRecord,
    pub strings: SectionRecord,
    pub data: SectionRecord,
    pub uniforms: SectionRecord,
}

impl Header {
    /// Parse the fixed header from the start of a module buffer.
    /// Self-validating: checks the magic and the version before returning.
    pub fn parse(buf: &[u8]) -> Result<Header> {
        if buf.len() < HEADER_LEN {
            return Err(Error::UnexpectedEof);
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        let version = LittleEndian::read_u32(&buf[4..8]);
        if version != CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let flags = LittleEndian::read_u32(&buf[8..12]);

        let record_at = |start: usize| SectionRecord {
            offset: LittleEndian::read_u32(&buf[start..start + 4]),
            length: LittleEndian::read_u32(&buf[start + 4..start + 8]),
        };
        Ok(Header {
            version,
            flags,
            bytecode: record_at(12),
            strings: record_at(20),
            data: record_at(28),
            uniforms: record_at(36),
        })
    }

    /// Serialize the header back to its fixed byte layout.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        for record in [&self.bytecode, &self.strings, &self.data, &self.uniforms] {
            out.extend_from_slice(&record.offset.to_le_bytes());
            out.extend_from_slice(&record.length.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            version: CURRENT_VERSION,
            flags: 0,
            bytecode: SectionRecord {
                offset: HEADER_LEN as u32,
                length: 16,
            },
            strings: SectionRecord {
                offset: HEADER_LEN as u32 + 16,
                length: 8,
            },
            data: SectionRecord {
                offset: HEADER_LEN as u32 + 24,
                length: 20,
            },
            uniforms: SectionRecord {
                offset: HEADER_LEN as u32 + 44,
                length: 12,
            },
        }
    }

    #[test]
    fn round_trips_through_write_and_parse() {
        let header = sample();
        let mut buf = Vec::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(Header::parse(&buf).unwrap(), header);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(b"XXXX");
        assert_eq!(
            Header::parse(&buf).unwrap_err(),
            Error::InvalidMagic(*b"XXXX")
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut buf = Vec::new();
        sample().write(&mut buf);
        LittleEndian::write_u32(&mut buf[4..8], 99);
        assert_eq!(Header::parse(&buf).unwrap_err(), Error::UnsupportedVersion(99));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let buf = vec![0u8; HEADER_LEN - 1];
        assert_eq!(Header::parse(&buf).unwrap_err(), Error::UnexpectedEof);
    }
}
