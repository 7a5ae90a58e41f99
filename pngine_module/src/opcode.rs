//! Stable opcode byte IDs. These are part of the on-wire contract and must
//! never be renumbered once shipped — the dispatcher's decode table is keyed
//! directly by this byte.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // Creation
    CreateBuffer = 0x01,
    CreateTexture = 0x02,
    CreateTextureView = 0x03,
    CreateSampler = 0x04,
    CreateShaderModule = 0x05,
    CreateBindGroupLayout = 0x06,
    CreatePipelineLayout = 0x07,
    CreateBindGroup = 0x08,
    CreateRenderPipeline = 0x09,
    CreateComputePipeline = 0x0A,
    CreateQuerySet = 0x0B,
    CreateRenderBundle = 0x0C,
    CreateImageBitmap = 0x0D,

    // Queue / transfer
    WriteBuffer = 0x20,
    WriteTimeUniform = 0x21,
    CopyExternalImageToTexture = 0x22,

    // Render pass
    BeginRenderPass = 0x30,
    SetPipeline = 0x31,
    SetBindGroup = 0x32,
    SetBindGroupPool = 0x33,
    SetVertexBuffer = 0x34,
    SetVertexBufferPool = 0x35,
    SetIndexBuffer = 0x36,
    Draw = 0x37,
    DrawIndexed = 0x38,
    ExecuteBundles = 0x39,
    EndPass = 0x3A,

    // Compute pass
    BeginComputePass = 0x40,
    Dispatch = 0x41,
    // EndPass (0x3A) is the shared terminator for both pass kinds.

    // Frame control
    DefineFrame = 0x50,
    EndFrame = 0x51,
    Submit = 0x52,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Result<Opcode> {
        use Opcode::*;
        Ok(match byte {
            0x01 => CreateBuffer,
            0x02 => CreateTexture,
            0x03 => CreateTextureView,
            0x04 => CreateSampler,
            0x05 => CreateShaderModule,
            0x06 => CreateBindGroupLayout,
            0x07 => CreatePipelineLayout,
            0x08 => CreateBindGroup,
            0x09 => CreateRenderPipeline,
            0x0A => CreateComputePipeline,
            0x0B => CreateQuerySet,
            0x0C => CreateRenderBundle,
            0x0D => CreateImageBitmap,
            0x20 => WriteBuffer,
            0x21 => WriteTimeUniform,
            0x22 => CopyExternalImageToTexture,
            0x30 => BeginRenderPass,
            0x31 => SetPipeline,
            0x32 => SetBindGroup,
            0x33 => SetBindGroupPool,
            0x34 => SetVertexBuffer,
            0x35 => SetVertexBufferPool,
            0x36 => SetIndexBuffer,
            0x37 => Draw,
            0x38 => DrawIndexed,
            0x39 => ExecuteBundles,
            0x3A => EndPass,
            0x40 => BeginComputePass,
            0x41 => Dispatch,
            0x50 => DefineFrame,
            0x51 => EndFrame,
            0x52 => Submit,
            other => return Err(Error::UnknownOpcode(other)),
        })
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// True for the thirteen `create_*` opcodes, legal only in the `idle`
    /// pass state.
    pub fn is_creation(self) -> bool {
        matches!(self.as_byte(), 0x01..=0x0D)
    }

    /// True for opcodes legal only inside an active render pass.
    pub fn is_render_pass_only(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            SetVertexBuffer | SetVertexBufferPool | SetIndexBuffer | Draw | DrawIndexed | ExecuteBundles
        )
    }

    /// True for opcodes legal only inside an active compute pass.
    pub fn is_compute_pass_only(self) -> bool {
        matches!(self, Opcode::Dispatch)
    }

    /// True for opcodes legal inside either an active render or an active
    /// compute pass, but not while idle: `set_pipeline` and the bind-group
    /// setters are shared between both pass kinds (compute passes bind
    /// storage buffers the same way render passes bind uniform buffers).
    pub fn is_any_pass_only(self) -> bool {
        matches!(
            self,
            Opcode::SetPipeline | Opcode::SetBindGroup | Opcode::SetBindGroupPool
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_ids_round_trip() {
        for byte in [
            0x01u8, 0x0D, 0x20, 0x22, 0x30, 0x3A, 0x40, 0x41, 0x50, 0x52,
        ] {
            let op = Opcode::from_byte(byte).unwrap();
            assert_eq!(op.as_byte(), byte);
        }
    }

    #[test]
    fn unknown_byte_is_rejected() {
        assert_eq!(Opcode::from_byte(0xFF).unwrap_err(), Error::UnknownOpcode(0xFF));
    }

    #[test]
    fn pass_classification_is_disjoint() {
        assert!(Opcode::CreateBuffer.is_creation());
        assert!(!Opcode::Draw.is_creation());
        assert!(Opcode::Draw.is_render_pass_only());
        assert!(!Opcode::Dispatch.is_render_pass_only());
        assert!(Opcode::Dispatch.is_compute_pass_only());
    }
}
