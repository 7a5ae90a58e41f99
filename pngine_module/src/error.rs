use thiserror::Error;

/// The closed error taxonomy for decoding and validating a PNGB module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("module is below the 40-byte header size")]
    UnexpectedEof,

    #[error("bad magic bytes: expected `PNGB`, found {0:?}")]
    InvalidMagic([u8; 4]),

    #[error("unsupported module version {0}, expected 5")]
    UnsupportedVersion(u32),

    #[error("section {section} offset/length {offset}+{length} exceeds module size {module_len}")]
    SectionOutOfBounds {
        section: &'static str,
        offset: u32,
        length: u32,
        module_len: usize,
    },

    #[error("varint overflows target width")]
    VarintOverflow,

    #[error("varint is truncated (missing continuation terminator)")]
    VarintTruncated,

    #[error("string table entry {0} is not valid UTF-8")]
    InvalidUtf8(u16),

    #[error("string id {0} is out of range (table has {1} entries)")]
    StringIdOutOfRange(u16, u16),

    #[error("data blob id {0} is out of range (table has {1} entries)")]
    DataIdOutOfRange(u16, u16),

    #[error("uniform field offset+size ({offset}+{size}) exceeds binding total_size {total_size}")]
    UniformFieldOutOfRange {
        offset: u32,
        size: u32,
        total_size: u32,
    },

    #[error("descriptor blob is malformed: {0}")]
    InvalidDescriptor(&'static str),

    #[error("opcode byte {0:#04x} is not a recognized opcode")]
    UnknownOpcode(u8),

    #[error("optional-operand presence flag {0} is neither 0 (absent) nor 1 (present)")]
    InvalidPresenceFlag(u8),

    #[error("module is not replayable: {0}")]
    InvalidModule(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
