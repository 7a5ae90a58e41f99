//! Minimal RGBA8 PNG encoder: `IHDR`/`IDAT`/`IEND`, filter mode `None` only.
//! This crate never decodes general PNGs (§1 Non-goals); it only produces
//! them and reads back ancillary chunks it itself defines.

use crate::chunk::write_chunk;
use crate::crc::crc32_chunk;
use crate::deflate::zlib_compress;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

const COLOR_TYPE_RGBA: u8 = 6;
const BIT_DEPTH: u8 = 8;
const BYTES_PER_PIXEL: usize = 4;

/// Encode an RGBA8 raster (`width * height * 4` bytes, row-major, no padding)
/// as a standalone PNG.
pub fn encode(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidPixelDataSize);
    }
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(Error::InvalidPixelDataSize)?;
    if pixels.len() != expected_len {
        return Err(Error::InvalidPixelDataSize);
    }

    let mut out = crate::chunk::PNG_SIGNATURE.to_vec();
    write_chunk(&mut out, b"IHDR", &ihdr_payload(width, height));

    let filtered = filter_none_scanlines(pixels, width as usize, height as usize);
    let compressed = zlib_compress(&filtered)?;
    write_chunk(&mut out, b"IDAT", &compressed);

    write_iend(&mut out);
    Ok(out)
}

/// Encode a BGRA8 raster by swapping B and R into a scratch buffer, then
/// delegating to [`encode`].
pub fn encode_bgra(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if pixels.len() % BYTES_PER_PIXEL != 0 {
        return Err(Error::InvalidPixelDataSize);
    }
    let mut rgba = pixels.to_vec();
    for px in rgba.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
    encode(&rgba, width, height)
}

fn ihdr_payload(width: u32, height: u32) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    BigEndian::write_u32(&mut ihdr[0..4], width);
    BigEndian::write_u32(&mut ihdr[4..8], height);
    ihdr[8] = BIT_DEPTH;
    ihdr[9] = COLOR_TYPE_RGBA;
    ihdr[10] = 0; // compression method
    ihdr[11] = 0; // filter method
    ihdr[12] = 0; // interlace method
    ihdr
}

/// Prepend a filter-type byte (`0x00`, None) to every scanline. No per-row
/// filter heuristic is applied, per §4.3.
fn filter_none_scanlines(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let stride = width * BYTES_PER_PIXEL;
    let mut out = Vec::with_capacity(height * (stride + 1));
    for row in pixels.chunks_exact(stride).take(height) {
        out.push(0u8);
        out.extend_from_slice(row);
    }
    out
}

fn write_iend(out: &mut Vec<u8>) {
    // IEND always has empty data, so its CRC is a fixed value over `b"IEND"`.
    let mut len_buf = [0u8; 4];
    BigEndian::write_u32(&mut len_buf, 0);
    out.extend_from_slice(&len_buf);
    out.extend_from_slice(b"IEND");
    let crc = crc32_chunk(b"IEND", &[]);
    let mut crc_buf = [0u8; 4];
    BigEndian::write_u32(&mut crc_buf, crc);
    out.extend_from_slice(&crc_buf);
}
