//! DEFLATE facades over `miniz_oxide`: a raw stream for ancillary payload
//! compression (no zlib header, suitable for `DecompressionStream('deflate-raw')`
//! on the consuming side) and a zlib-wrapped stream for PNG `IDAT`.

use crate::error::{Error, Result};
use miniz_oxide::deflate::{compress_to_vec, compress_to_vec_zlib};
use miniz_oxide::inflate::{decompress_to_vec, decompress_to_vec_zlib, TINFLStatus};

/// Compression level used for both facades: balanced, roughly zlib level 6.
const COMPRESSION_LEVEL: u8 = 6;

/// Produce a raw DEFLATE stream (no zlib header or Adler-32 trailer).
///
/// Empty input is rejected: a zero-length payload has no defined DEFLATE
/// encoding in this facade's contract.
pub fn deflate_raw_compress(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(Error::CompressionFailed(
            "refusing to compress empty input".into(),
        ));
    }
    Ok(compress_to_vec(data, COMPRESSION_LEVEL))
}

/// Decode a raw DEFLATE stream produced by `deflate_raw_compress`, or by any
/// conforming encoder. All three BTYPE values (stored, fixed Huffman, dynamic
/// Huffman) are supported, since older embedded payloads may have been
/// written with a stored-block-only encoder.
pub fn deflate_raw_decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(Error::DecompressionFailed("empty input".into()));
    }
    decompress_to_vec(data).map_err(|err| Error::DecompressionFailed(describe(err.status)))
}

/// Compress `data` into a zlib container (CMF/FLG header, Adler-32 trailer)
/// suitable for a PNG `IDAT` chunk.
pub fn zlib_compress(data: &[u8]) -> Result<Vec<u8>> {
    let out = compress_to_vec_zlib(data, COMPRESSION_LEVEL);
    debug_assert_eq!(out.first().copied(), Some(0x78));
    debug_assert!(out.len() >= 2 && (u16::from_be_bytes([out[0], out[1]]) % 31) == 0);
    Ok(out)
}

/// Decode a zlib-wrapped DEFLATE stream, as produced by `zlib_compress`.
pub fn zlib_decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_to_vec_zlib(data).map_err(|err| Error::DecompressionFailed(describe(err.status)))
}

fn describe(status: TINFLStatus) -> String {
    format!("{status:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = deflate_raw_compress(&data).unwrap();
        let decompressed = deflate_raw_decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn raw_compress_rejects_empty() {
        assert_eq!(
            deflate_raw_compress(&[]).unwrap_err(),
            Error::CompressionFailed("refusing to compress empty input".into())
        );
    }

    #[test]
    fn raw_decompress_rejects_empty() {
        assert!(matches!(
            deflate_raw_decompress(&[]),
            Err(Error::DecompressionFailed(_))
        ));
    }

    #[test]
    fn zlib_header_is_well_formed() {
        let compressed = zlib_compress(b"hello pngine").unwrap();
        assert_eq!(compressed[0], 0x78);
        let header = u16::from_be_bytes([compressed[0], compressed[1]]);
        assert_eq!(header % 31, 0);
    }

    #[test]
    fn zlib_round_trip() {
        let data = b"round trip through a zlib container".to_vec();
        let compressed = zlib_compress(&data).unwrap();
        let decompressed = zlib_decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }
}
