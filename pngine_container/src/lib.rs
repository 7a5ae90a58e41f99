//! PNG container I/O for PNGine: chunk framing, CRC-32, DEFLATE, an RGBA
//! encoder, and embed/extract of the `pNGb`/`pNGr` ancillary chunks that
//! carry compiled bytecode and an optional embedded runtime.
//!
//! This crate only ever produces PNGs (via [`encoder::encode`]) and reads
//! back its own ancillary chunks; it is not a general-purpose PNG decoder.

pub mod ancillary;
pub mod chunk;
pub mod crc;
pub mod deflate;
pub mod encoder;
mod error;

pub use ancillary::{
    embed_pngb, embed_pngr, extract_pngb, extract_pngr, get_pngb_info, get_pngr_info, has_pngb,
    has_pngr, PayloadInfo, PNGB_CHUNK_TYPE, PNGR_CHUNK_TYPE,
};
pub use chunk::{chunk_size, parse_chunks, write_chunk, Chunk, ChunkIter, PNG_SIGNATURE};
pub use crc::{crc32, crc32_chunk, Crc32};
pub use deflate::{deflate_raw_compress, deflate_raw_decompress, zlib_compress, zlib_decompress};
pub use encoder::{encode, encode_bgra};
pub use error::{Error, Result};
