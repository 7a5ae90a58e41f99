//! Shape-aware decode of the opcode stream: for each opcode, the operand
//! list it carries (plain varints, or varints that are really string/data
//! table IDs). Shared by [`crate::module::Module::validate`] (range-checks
//! IDs eagerly at load time) and by the dispatcher (executes the same
//! instructions against a `GpuBackend`), so the two never drift apart on
//! what an opcode's operands mean.

use crate::error::{Error, Result};
use crate::opcode::Opcode;
use crate::varint::read_uleb128_u32;

/// One decoded operand. `StringId`/`DataId` are the two operand shapes that
/// reference another section and so need a range check against its length;
/// `Int` is an opaque count/size/index the opcode interprets itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Int(u32),
    StringId(u16),
    DataId(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    /// Byte offset of this instruction's opcode byte within the bytecode
    /// section, useful for error messages and for `define_frame` resolution.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Id,
    StrId,
    IntInt,
    IdId,
    IntIdOpt,
    IdInt,
    SlotId,
    SlotIdId,
    IntIntOpt,
    Single,
    None,
    IntIntInt,
    StrIntInt,
    IntIntIntOpt,
}

fn shape_for(opcode: Opcode) -> Shape {
    use Opcode::*;
    use Shape::*;
    match opcode {
        CreateBuffer => IntIntIntOpt,
        CreateTexture | CreateTextureView | CreateSampler | CreateShaderModule
        | CreateBindGroupLayout | CreatePipelineLayout | CreateBindGroup
        | CreateRenderPipeline | CreateComputePipeline | CreateQuerySet | CreateRenderBundle => {
            Id
        }
        CreateImageBitmap => StrId,
        WriteBuffer => IdId,
        WriteTimeUniform => IntIntInt,
        CopyExternalImageToTexture => IntInt,
        BeginRenderPass => Id,
        SetPipeline => Single,
        SetBindGroup => SlotId,
        SetBindGroupPool => SlotIdId,
        SetVertexBuffer => SlotId,
        SetVertexBufferPool => SlotIdId,
        SetIndexBuffer => Single,
        Draw => IntIntOpt,
        DrawIndexed => IntIntOpt,
        ExecuteBundles => Single,
        EndPass => None,
        BeginComputePass => None,
        Dispatch => IntIntInt,
        DefineFrame => StrIntInt,
        EndFrame => None,
        Submit => None,
    }
}

/// Reads instructions sequentially from a bytecode section.
pub struct BytecodeCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BytecodeCursor<'a> {
    pub fn new(data: &'a [u8]) -> BytecodeCursor<'a> {
        BytecodeCursor { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_varint(&mut self) -> Result<u32> {
        let (value, consumed) = read_uleb128_u32(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or(Error::VarintTruncated)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a trailing optional operand, disambiguated by an explicit
    /// one-byte presence flag (`0` = absent, use `default`; `1` = present,
    /// followed by the varint) rather than by how much of the buffer
    /// happens to be left — a frame's bytecode slice almost always has more
    /// instructions after this one, so "end of buffer" is not a reliable
    /// signal that an operand was omitted. This is the same explicit-tag-
    /// before-value idiom the descriptor mini-format uses for its
    /// `{key, value_tag, value_bytes}` encoding (the spec's "missing
    /// optional operand -> domain default" tie-break).
    fn read_optional_varint(&mut self, default: u32) -> Result<u32> {
        match self.read_u8()? {
            0 => Ok(default),
            1 => self.read_varint(),
            other => Err(Error::InvalidPresenceFlag(other)),
        }
    }

    fn next_u16(&mut self) -> Result<u16> {
        self.read_varint()?
            .try_into()
            .map_err(|_| Error::VarintOverflow)
    }

    pub fn next_instruction(&mut self) -> Result<Option<Instruction>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let offset = self.pos;
        let byte = self.data[self.pos];
        self.pos += 1;
        let opcode = Opcode::from_byte(byte)?;

        let operands = match shape_for(opcode) {
            Shape::None => vec![],
            Shape::Single => vec![Operand::Int(self.read_varint()?)],
            Shape::Id => vec![Operand::DataId(self.next_u16()?)],
            Shape::StrId => vec![Operand::StringId(self.next_u16()?)],
            Shape::IntInt => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::IntIntInt => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::IdId => vec![
                Operand::Int(self.read_varint()?),
                Operand::DataId(self.next_u16()?),
            ],
            Shape::IdInt => vec![
                Operand::DataId(self.next_u16()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::IntIdOpt => vec![
                Operand::Int(self.read_varint()?),
                Operand::DataId(self.next_u16()?),
            ],
            Shape::SlotId => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::SlotIdId => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::IntIntOpt => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_optional_varint(1)?),
            ],
            Shape::StrIntInt => vec![
                Operand::StringId(self.next_u16()?),
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
            ],
            Shape::IntIntIntOpt => vec![
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_varint()?),
                Operand::Int(self.read_optional_varint(1)?),
            ],
        };

        Ok(Some(Instruction {
            opcode,
            operands,
            offset,
        }))
    }
}

impl<'a> Iterator for BytecodeCursor<'a> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_instruction().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::write_uleb128;

    fn encode_draw(vertex_count: u32, instance_count: Option<u32>) -> Vec<u8> {
        let mut buf = vec![Opcode::Draw.as_byte()];
        write_uleb128(&mut buf, vertex_count as u64);
        match instance_count {
            Some(count) => {
                buf.push(1);
                write_uleb128(&mut buf, count as u64);
            }
            None => buf.push(0),
        }
        buf
    }

    #[test]
    fn draw_with_explicit_instance_count() {
        let buf = encode_draw(3, Some(2));
        let mut cursor = BytecodeCursor::new(&buf);
        let instr = cursor.next_instruction().unwrap().unwrap();
        assert_eq!(instr.opcode, Opcode::Draw);
        assert_eq!(
            instr.operands,
            vec![Operand::Int(3), Operand::Int(2)]
        );
        assert!(cursor.next_instruction().unwrap().is_none());
    }

    #[test]
    fn draw_missing_instance_count_defaults_to_one() {
        let buf = encode_draw(3, None);
        let mut cursor = BytecodeCursor::new(&buf);
        let instr = cursor.next_instruction().unwrap().unwrap();
        assert_eq!(instr.operands, vec![Operand::Int(3), Operand::Int(1)]);
    }

    /// The presence flag must disambiguate "omitted" from "end of buffer":
    /// an omitted `instance_count` followed by another instruction must not
    /// consume that instruction's opcode byte as the operand.
    #[test]
    fn draw_missing_instance_count_does_not_eat_the_next_opcode() {
        let mut buf = encode_draw(3, None);
        buf.push(Opcode::EndPass.as_byte());

        let mut cursor = BytecodeCursor::new(&buf);
        let draw = cursor.next_instruction().unwrap().unwrap();
        assert_eq!(draw.operands, vec![Operand::Int(3), Operand::Int(1)]);
        let end_pass = cursor.next_instruction().unwrap().unwrap();
        assert_eq!(end_pass.opcode, Opcode::EndPass);
        assert!(cursor.next_instruction().unwrap().is_none());
    }

    #[test]
    fn sequence_of_instructions_decodes_in_order() {
        let mut buf = Vec::new();
        buf.push(Opcode::BeginRenderPass.as_byte());
        write_uleb128(&mut buf, 0);
        buf.push(Opcode::SetPipeline.as_byte());
        write_uleb128(&mut buf, 0);
        buf.extend_from_slice(&encode_draw(3, Some(1)));
        buf.push(Opcode::EndPass.as_byte());

        let cursor = BytecodeCursor::new(&buf);
        let instructions: Result<Vec<_>> = cursor.collect();
        let instructions = instructions.unwrap();
        assert_eq!(instructions.len(), 4);
        assert_eq!(instructions[0].opcode, Opcode::BeginRenderPass);
        assert_eq!(instructions[3].opcode, Opcode::EndPass);
    }

    #[test]
    fn unknown_opcode_byte_is_rejected() {
        let buf = [0xFFu8];
        let mut cursor = BytecodeCursor::new(&buf);
        assert!(cursor.next_instruction().is_err());
    }

    #[test]
    fn presence_flag_other_than_zero_or_one_is_rejected() {
        let mut buf = vec![Opcode::Draw.as_byte()];
        write_uleb128(&mut buf, 3);
        buf.push(2); // not a valid presence flag
        let mut cursor = BytecodeCursor::new(&buf);
        assert_eq!(
            cursor.next_instruction().unwrap_err(),
            Error::InvalidPresenceFlag(2)
        );
    }
}
