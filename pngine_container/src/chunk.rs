//! Zero-copy PNG chunk framing: an iterator that borrows the source buffer
//! for its lifetime (no per-chunk copies), and a writer that appends a framed
//! chunk to an output buffer.

use crate::crc::crc32_chunk;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk data is rejected above this size; the PNG spec has no hard cap, but
/// PNGine bounds it defensively (§3.1).
pub const MAX_CHUNK_DATA_LEN: u32 = 16 * 1024 * 1024;

const LEN_FIELD: usize = 4;
const TYPE_FIELD: usize = 4;
const CRC_FIELD: usize = 4;
const FRAME_OVERHEAD: usize = LEN_FIELD + TYPE_FIELD + CRC_FIELD;

/// A single PNG chunk, borrowing its `data` from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub chunk_type: [u8; 4],
    pub data: &'a [u8],
    /// Byte offset of this chunk's length field within the source buffer.
    pub offset: usize,
    /// Total framed size of this chunk: `12 + data.len()`.
    pub total_size: usize,
}

impl<'a> Chunk<'a> {
    /// Bit 5 of byte 0: ancillary (1) vs critical (0).
    pub fn is_ancillary(&self) -> bool {
        self.chunk_type[0] & 0x20 != 0
    }

    /// Bit 5 of byte 1: public (1) vs private (0).
    pub fn is_public(&self) -> bool {
        self.chunk_type[1] & 0x20 != 0
    }

    /// Bit 5 of byte 3: safe-to-copy (1) vs not (0).
    pub fn is_safe_to_copy(&self) -> bool {
        self.chunk_type[3] & 0x20 != 0
    }

    pub fn type_str(&self) -> &str {
        std::str::from_utf8(&self.chunk_type).unwrap_or("????")
    }
}

/// Iterator over the chunks of a PNG byte buffer.
///
/// Validates the 8-byte signature on construction. Each call to `next`
/// borrows directly from `png_data`; no chunk data is copied.
pub struct ChunkIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkIter<'a> {
    pub fn new(png_data: &'a [u8]) -> Result<Self> {
        if png_data.len() < PNG_SIGNATURE.len() || png_data[..8] != PNG_SIGNATURE {
            return Err(Error::InvalidSignature);
        }
        Ok(ChunkIter {
            data: png_data,
            pos: PNG_SIGNATURE.len(),
        })
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.data.len().saturating_sub(self.pos);
        if remaining < FRAME_OVERHEAD {
            return None;
        }

        let rest = &self.data[self.pos..];
        let length = BigEndian::read_u32(&rest[0..4]);
        if length > MAX_CHUNK_DATA_LEN {
            return Some(Err(Error::ChunkTooLarge(length)));
        }

        let data_start = self.pos + LEN_FIELD + TYPE_FIELD;
        let data_end = data_start + length as usize;
        let crc_end = data_end + CRC_FIELD;
        if crc_end > self.data.len() {
            return Some(Err(Error::UnexpectedEof));
        }

        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&rest[4..8]);
        let data = &self.data[data_start..data_end];
        let stored_crc = BigEndian::read_u32(&self.data[data_end..crc_end]);
        let computed_crc = crc32_chunk(&chunk_type, data);
        if stored_crc != computed_crc {
            return Some(Err(Error::InvalidCrc {
                chunk_type,
                stored: stored_crc,
                computed: computed_crc,
            }));
        }

        let chunk = Chunk {
            chunk_type,
            data,
            offset: self.pos,
            total_size: FRAME_OVERHEAD + length as usize,
        };
        self.pos = crc_end;
        Some(Ok(chunk))
    }
}

/// Parse all chunks of `png_data` into a `Vec`, short-circuiting on the first
/// error (a corrupt chunk CRC or an oversized chunk).
pub fn parse_chunks(png_data: &[u8]) -> Result<Vec<Chunk<'_>>> {
    ChunkIter::new(png_data)?.collect()
}

/// The framed size of a chunk carrying `data_len` bytes of payload.
pub fn chunk_size(data_len: usize) -> usize {
    FRAME_OVERHEAD + data_len
}

/// Append a framed chunk (`length ‖ type ‖ data ‖ crc`, all big-endian) to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    let mut len_buf = [0u8; 4];
    BigEndian::write_u32(&mut len_buf, data.len() as u32);
    out.extend_from_slice(&len_buf);
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let crc = crc32_chunk(chunk_type, data);
    let mut crc_buf = [0u8; 4];
    BigEndian::write_u32(&mut crc_buf, crc);
    out.extend_from_slice(&crc_buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_png() -> Vec<u8> {
        let mut buf = PNG_SIGNATURE.to_vec();
        let ihdr: [u8; 13] = [
            0, 0, 0, 1, // width = 1
            0, 0, 0, 1, // height = 1
            8, 6, 0, 0, 0, // bit depth, color type, compression, filter, interlace
        ];
        write_chunk(&mut buf, b"IHDR", &ihdr);
        write_chunk(&mut buf, b"IDAT", &[0u8; 12]);
        write_chunk(&mut buf, b"IEND", &[]);
        buf
    }

    #[test]
    fn rejects_bad_signature() {
        assert_eq!(
            ChunkIter::new(b"not a png").err(),
            Some(Error::InvalidSignature)
        );
        assert_eq!(ChunkIter::new(b"short").err(), Some(Error::InvalidSignature));
    }

    #[test]
    fn s1_minimal_png_chunk_sequence() {
        let png = minimal_png();
        let chunks = parse_chunks(&png).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(&chunks[0].chunk_type, b"IHDR");
        assert_eq!(chunks[0].data.len(), 13);
        assert_eq!(&chunks[1].chunk_type, b"IDAT");
        assert_eq!(chunks[1].data.len(), 12);
        assert_eq!(&chunks[2].chunk_type, b"IEND");
        assert_eq!(chunks[2].data.len(), 0);
    }

    #[test]
    fn write_then_parse_round_trips() {
        let mut buf = PNG_SIGNATURE.to_vec();
        write_chunk(&mut buf, b"tEXt", b"hello world");
        let chunks = parse_chunks(&buf).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(&chunks[0].chunk_type, b"tEXt");
        assert_eq!(chunks[0].data, b"hello world");
    }

    #[test]
    fn flipped_crc_byte_is_detected() {
        let mut buf = PNG_SIGNATURE.to_vec();
        write_chunk(&mut buf, b"tEXt", b"hello world");
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;
        let err = parse_chunks(&buf).unwrap_err();
        assert!(matches!(err, Error::InvalidCrc { .. }));
    }

    #[test]
    fn s3_crc_corruption_advances_to_iend() {
        let mut png = minimal_png();
        let last = png.len() - 1;
        png[last] ^= 0xFF;
        let mut iter = ChunkIter::new(&png).unwrap();
        assert!(matches!(iter.next(), Some(Ok(c)) if &c.chunk_type == b"IHDR"));
        assert!(matches!(iter.next(), Some(Ok(c)) if &c.chunk_type == b"IDAT"));
        assert!(matches!(iter.next(), Some(Err(Error::InvalidCrc { .. }))));
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let mut buf = PNG_SIGNATURE.to_vec();
        let mut len_buf = [0u8; 4];
        BigEndian::write_u32(&mut len_buf, MAX_CHUNK_DATA_LEN + 1);
        buf.extend_from_slice(&len_buf);
        buf.extend_from_slice(b"IDAT");
        let err = ChunkIter::new(&buf).unwrap().next().unwrap().unwrap_err();
        assert_eq!(err, Error::ChunkTooLarge(MAX_CHUNK_DATA_LEN + 1));
    }

    #[test]
    fn chunk_properties() {
        let buf = {
            let mut b = PNG_SIGNATURE.to_vec();
            write_chunk(&mut b, b"pNGb", b"x");
            b
        };
        let chunk = parse_chunks(&buf).unwrap().remove(0);
        assert!(chunk.is_ancillary());
        assert!(chunk.is_public());
        assert!(chunk.is_safe_to_copy());
        assert_eq!(chunk.total_size, chunk_size(1));
    }
}
