use thiserror::Error;

/// The closed error taxonomy for PNG container I/O: chunk framing, the DEFLATE
/// facades, the RGBA encoder, and ancillary `pNGb`/`pNGr` embed/extract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("input is not a valid PNG: missing or malformed 8-byte signature")]
    InvalidSignature,

    #[error("chunk length {0} exceeds the 16 MiB limit")]
    ChunkTooLarge(u32),

    #[error(
        "crc mismatch for chunk {chunk_type:?}: stored {stored:#010x}, computed {computed:#010x}"
    )]
    InvalidCrc {
        chunk_type: [u8; 4],
        stored: u32,
        computed: u32,
    },

    #[error("unexpected end of input while reading a chunk")]
    UnexpectedEof,

    #[error("pixel buffer length does not match width * height * 4")]
    InvalidPixelDataSize,

    #[error("DEFLATE compression failed: {0}")]
    CompressionFailed(String),

    #[error("DEFLATE decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("input PNG has no IEND chunk")]
    MissingIend,

    #[error("bytecode payload is below the minimum size of 16 bytes")]
    BytecodeTooSmall,

    #[error("runtime payload is below the minimum size of 8 bytes")]
    RuntimeTooSmall,

    #[error("runtime payload does not start with the WASM magic `\\0asm`")]
    InvalidWasm,

    #[error("input does not contain a pNGb chunk")]
    NoPngbChunk,

    #[error("input does not contain a pNGr chunk")]
    NoPngrChunk,

    #[error("pNGb payload version {0} is not supported")]
    InvalidPngbVersion(u8),

    #[error("pNGr payload version {0} is not supported")]
    InvalidPngrVersion(u8),

    #[error("pNGb payload is malformed")]
    InvalidPngbFormat,

    #[error("pNGr payload is malformed")]
    InvalidPngrFormat,

    #[error("out of memory while allocating {0} bytes")]
    OutOfMemory(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
