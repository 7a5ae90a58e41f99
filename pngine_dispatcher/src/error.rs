use thiserror::Error;

/// Dispatcher and resource errors: wrong pass context, malformed operands,
/// and backend failures surfaced through `last_error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("opcode {opcode:#04x} is not legal in pass state {state}")]
    InvalidState { opcode: u8, state: &'static str },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("resource id {id} not found in the {class} table (len {len})")]
    ResourceNotFound {
        class: &'static str,
        id: u32,
        len: usize,
    },

    #[error("backend failed to create a pipeline: {0}")]
    PipelineCreate(String),

    #[error("backend failed to compile a shader module: {0}")]
    ShaderCompile(String),

    #[error("surface acquisition failed: {0}")]
    SurfaceFailed(String),

    #[error("no texture available for this frame")]
    TextureUnavailable,

    #[error("render pass failed: {0}")]
    RenderFailed(String),

    #[error("compute pass failed: {0}")]
    ComputeFailed(String),

    #[error("out of memory while allocating {0} bytes")]
    OutOfMemory(u64),

    #[error(transparent)]
    Module(#[from] pngine_module::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
