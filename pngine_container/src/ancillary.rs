//! Embed and extract ancillary `pNGb` (bytecode) and `pNGr` (runtime) chunks.
//!
//! Payload layout (identical for both chunk types):
//!
//! ```text
//! byte 0      version  (current = 0x01)
//! byte 1      flags    (bit 0: compressed with raw DEFLATE)
//! byte 2..N   payload  (compressed iff flag set)
//! ```

use crate::chunk::{parse_chunks, write_chunk, PNG_SIGNATURE};
use crate::deflate::{deflate_raw_compress, deflate_raw_decompress};
use crate::error::{Error, Result};

pub const PNGB_CHUNK_TYPE: [u8; 4] = *b"pNGb";
pub const PNGR_CHUNK_TYPE: [u8; 4] = *b"pNGr";

const PAYLOAD_VERSION: u8 = 0x01;
const FLAG_COMPRESSED: u8 = 0x01;

const PNGB_MIN_LEN: usize = 16;
const PNGR_MIN_LEN: usize = 8;
const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// Metadata about an embedded payload without decompressing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadInfo {
    pub version: u8,
    pub compressed: bool,
    pub payload_bytes: usize,
}

/// Embed compiled bytecode as a `pNGb` chunk. `bytecode` must be at least 16
/// bytes (the caller is responsible for it beginning with the PNGB magic).
pub fn embed_pngb(png: &[u8], bytecode: &[u8]) -> Result<Vec<u8>> {
    if bytecode.len() < PNGB_MIN_LEN {
        return Err(Error::BytecodeTooSmall);
    }
    embed(png, &PNGB_CHUNK_TYPE, bytecode)
}

/// Embed a WASM or native runtime binary as a `pNGr` chunk. If `runtime`
/// looks like WASM-length input it must start with the `\0asm` magic.
pub fn embed_pngr(png: &[u8], runtime: &[u8]) -> Result<Vec<u8>> {
    if runtime.len() < PNGR_MIN_LEN {
        return Err(Error::RuntimeTooSmall);
    }
    if runtime.len() >= WASM_MAGIC.len() && runtime[..4] != WASM_MAGIC {
        return Err(Error::InvalidWasm);
    }
    embed(png, &PNGR_CHUNK_TYPE, runtime)
}

fn embed(png: &[u8], chunk_type: &[u8; 4], payload: &[u8]) -> Result<Vec<u8>> {
    let iend_offset = find_iend(png)?;
    let compressed = deflate_raw_compress(payload)?;

    let mut chunk_payload = Vec::with_capacity(2 + compressed.len());
    chunk_payload.push(PAYLOAD_VERSION);
    chunk_payload.push(FLAG_COMPRESSED);
    chunk_payload.extend_from_slice(&compressed);

    let mut out = Vec::with_capacity(png.len() + chunk_payload.len() + 12);
    out.extend_from_slice(&png[..iend_offset]);
    write_chunk(&mut out, chunk_type, &chunk_payload);
    out.extend_from_slice(&png[iend_offset..]);
    Ok(out)
}

/// Extract and decompress (if flagged) the `pNGb` payload.
pub fn extract_pngb(png: &[u8]) -> Result<Vec<u8>> {
    extract(png, &PNGB_CHUNK_TYPE, Error::NoPngbChunk, |v| {
        Error::InvalidPngbVersion(v)
    })
}

/// Extract and decompress (if flagged) the `pNGr` payload.
pub fn extract_pngr(png: &[u8]) -> Result<Vec<u8>> {
    extract(png, &PNGR_CHUNK_TYPE, Error::NoPngrChunk, |v| {
        Error::InvalidPngrVersion(v)
    })
}

fn extract(
    png: &[u8],
    chunk_type: &[u8; 4],
    missing: Error,
    bad_version: impl FnOnce(u8) -> Error,
) -> Result<Vec<u8>> {
    let chunk_data = find_chunk_data(png, chunk_type)?.ok_or(missing)?;
    let (version, flags, payload) = split_payload(chunk_data)?;
    if version != PAYLOAD_VERSION {
        return Err(bad_version(version));
    }
    if flags & FLAG_COMPRESSED != 0 {
        deflate_raw_decompress(payload)
    } else {
        Ok(payload.to_vec())
    }
}

/// Cheap boolean probe: does `png` contain a `pNGb` chunk? Never allocates.
pub fn has_pngb(png: &[u8]) -> bool {
    find_chunk_data(png, &PNGB_CHUNK_TYPE)
        .ok()
        .flatten()
        .is_some()
}

/// Cheap boolean probe: does `png` contain a `pNGr` chunk? Never allocates.
pub fn has_pngr(png: &[u8]) -> bool {
    find_chunk_data(png, &PNGR_CHUNK_TYPE)
        .ok()
        .flatten()
        .is_some()
}

/// Metadata about the embedded `pNGb` payload without decompressing it.
pub fn get_pngb_info(png: &[u8]) -> Result<PayloadInfo> {
    info(png, &PNGB_CHUNK_TYPE, Error::NoPngbChunk)
}

/// Metadata about the embedded `pNGr` payload without decompressing it.
pub fn get_pngr_info(png: &[u8]) -> Result<PayloadInfo> {
    info(png, &PNGR_CHUNK_TYPE, Error::NoPngrChunk)
}

fn info(png: &[u8], chunk_type: &[u8; 4], missing: Error) -> Result<PayloadInfo> {
    let chunk_data = find_chunk_data(png, chunk_type)?.ok_or(missing)?;
    let (version, flags, payload) = split_payload(chunk_data)?;
    Ok(PayloadInfo {
        version,
        compressed: flags & FLAG_COMPRESSED != 0,
        payload_bytes: payload.len(),
    })
}

fn split_payload(chunk_data: &[u8]) -> Result<(u8, u8, &[u8])> {
    if chunk_data.len() < 2 {
        return Err(Error::InvalidPngbFormat);
    }
    Ok((chunk_data[0], chunk_data[1], &chunk_data[2..]))
}

fn find_chunk_data<'a>(png: &'a [u8], chunk_type: &[u8; 4]) -> Result<Option<&'a [u8]>> {
    for chunk in parse_chunks(png)? {
        if chunk.chunk_type == *chunk_type {
            return Ok(Some(chunk.data));
        }
    }
    Ok(None)
}

/// Locate the byte offset of the start of the `IEND` chunk's length field.
///
/// Per `spec.md` §9, two variants exist in PNGine's history: a backward scan
/// from the end of the buffer with a forward-scan fallback (authoritative),
/// and a stricter backward-only form (a simplification that must agree with
/// the authoritative variant on any valid PNG). This implements the
/// authoritative variant.
fn find_iend(png: &[u8]) -> Result<usize> {
    if png.len() < PNG_SIGNATURE.len() || png[..8] != PNG_SIGNATURE {
        return Err(Error::InvalidSignature);
    }

    const IEND_PATTERN: [u8; 8] = [0, 0, 0, 0, b'I', b'E', b'N', b'D'];
    if png.len() >= IEND_PATTERN.len() {
        for start in (0..=png.len() - IEND_PATTERN.len()).rev() {
            if png[start..start + IEND_PATTERN.len()] == IEND_PATTERN {
                return Ok(start);
            }
        }
    }

    // Forward-scan fallback: walk the chunk stream and trust chunk framing
    // rather than a raw byte pattern.
    for chunk in crate::chunk::ChunkIter::new(png)? {
        let chunk = chunk?;
        if chunk.chunk_type == *b"IEND" {
            return Ok(chunk.offset);
        }
    }
    Err(Error::MissingIend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::write_chunk;

    fn minimal_png() -> Vec<u8> {
        let mut buf = PNG_SIGNATURE.to_vec();
        write_chunk(&mut buf, b"IHDR", &[0u8; 13]);
        write_chunk(&mut buf, b"IDAT", &[0u8; 12]);
        write_chunk(&mut buf, b"IEND", &[]);
        buf
    }

    #[test]
    fn s2_embed_pngb_inserts_before_iend() {
        let png = minimal_png();
        let bytecode = {
            let mut b = b"PNGB".to_vec();
            b.extend_from_slice(&[0u8; 12]);
            b
        };
        let embedded = embed_pngb(&png, &bytecode).unwrap();
        let chunks = parse_chunks(&embedded).unwrap();
        let types: Vec<&[u8; 4]> = chunks.iter().map(|c| &c.chunk_type).collect();
        assert_eq!(types, vec![b"IHDR", b"IDAT", b"pNGb", b"IEND"]);
        assert_eq!(extract_pngb(&embedded).unwrap(), bytecode);
    }

    #[test]
    fn embed_rejects_undersized_bytecode() {
        let png = minimal_png();
        assert_eq!(
            embed_pngb(&png, &[0u8; 15]).unwrap_err(),
            Error::BytecodeTooSmall
        );
    }

    #[test]
    fn embed_pngr_requires_wasm_magic() {
        let png = minimal_png();
        assert_eq!(
            embed_pngr(&png, b"notwasm!").unwrap_err(),
            Error::InvalidWasm
        );
        let wasm = {
            let mut w = WASM_MAGIC.to_vec();
            w.extend_from_slice(&[1, 0, 0, 0]);
            w
        };
        let embedded = embed_pngr(&png, &wasm).unwrap();
        assert_eq!(extract_pngr(&embedded).unwrap(), wasm);
    }

    #[test]
    fn round_trip_for_arbitrary_payload_length() {
        let png = minimal_png();
        for len in [16, 17, 64, 1024] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let embedded = embed_pngb(&png, &payload).unwrap();
            assert_eq!(extract_pngb(&embedded).unwrap(), payload);
        }
    }

    #[test]
    fn has_pngb_is_deterministic() {
        let png = minimal_png();
        assert!(!has_pngb(&png));
        assert!(!has_pngr(&png));
        let embedded = embed_pngb(&png, &[0u8; 16]).unwrap();
        assert!(has_pngb(&embedded));
        assert!(!has_pngr(&embedded));
        assert_eq!(has_pngb(&embedded), has_pngb(&embedded));
    }

    #[test]
    fn info_does_not_decompress() {
        let png = minimal_png();
        let payload = vec![7u8; 64];
        let embedded = embed_pngb(&png, &payload).unwrap();
        let info = get_pngb_info(&embedded).unwrap();
        assert_eq!(info.version, PAYLOAD_VERSION);
        assert!(info.compressed);
        assert!(info.payload_bytes > 0);
    }

    #[test]
    fn missing_chunk_is_reported() {
        let png = minimal_png();
        assert_eq!(extract_pngb(&png).unwrap_err(), Error::NoPngbChunk);
        assert_eq!(extract_pngr(&png).unwrap_err(), Error::NoPngrChunk);
    }

    #[test]
    fn embed_output_is_strictly_larger_and_starts_with_signature() {
        let png = minimal_png();
        let embedded = embed_pngb(&png, &[0u8; 32]).unwrap();
        assert!(embedded.len() > png.len());
        assert_eq!(&embedded[..8], &PNG_SIGNATURE);
    }
}
