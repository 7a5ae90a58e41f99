//! Ties the header and four sections together into a single `Module`, and
//! performs the eager range-check pass `spec.md` §9 calls for ("validate at
//! load time that every ID is in range").

use crate::bytecode::{BytecodeCursor, Operand};
use crate::data::DataTable;
use crate::error::{Error, Result};
use crate::header::{Header, SectionRecord, HEADER_LEN};
use crate::strings::StringTable;
use crate::uniforms::UniformTable;

/// An owned, validated PNGB module. Sections are re-parsed into borrowing
/// views on demand (`strings()`, `data()`) rather than stored alongside the
/// buffer, avoiding a self-referential struct while still avoiding copies.
#[derive(Debug, Clone)]
pub struct Module {
    buf: Vec<u8>,
    header: Header,
}

impl Module {
    /// Parse and eagerly validate a module from its serialized bytes.
    pub fn parse(buf: Vec<u8>) -> Result<Module> {
        let header = Header::parse(&buf)?;
        let module = Module { buf, header };
        module.check_sections_in_bounds()?;
        module.validate()?;
        Ok(module)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    fn section(&self, name: &'static str, record: &SectionRecord) -> Result<&[u8]> {
        let range = record.range();
        self.buf.get(range).ok_or(Error::SectionOutOfBounds {
            section: name,
            offset: record.offset,
            length: record.length,
            module_len: self.buf.len(),
        })
    }

    fn check_sections_in_bounds(&self) -> Result<()> {
        self.section("bytecode", &self.header.bytecode)?;
        self.section("strings", &self.header.strings)?;
        self.section("data", &self.header.data)?;
        self.section("uniforms", &self.header.uniforms)?;
        Ok(())
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.buf[self.header.bytecode.range()]
    }

    pub fn strings(&self) -> Result<StringTable<'_>> {
        StringTable::parse(self.section("strings", &self.header.strings)?)
    }

    pub fn data(&self) -> Result<DataTable<'_>> {
        DataTable::parse(self.section("data", &self.header.data)?)
    }

    pub fn uniforms(&self) -> Result<UniformTable> {
        UniformTable::parse(self.section("uniforms", &self.header.uniforms)?)
    }

    /// Walk every instruction in the bytecode section once, checking that
    /// every `StringId`/`DataId` operand is in range. The bytecode itself
    /// never mutates the module, so this pass is the only place range
    /// checking happens — the dispatcher can then decode trustingly.
    pub fn validate(&self) -> Result<()> {
        let strings = self.strings()?;
        let data = self.data()?;
        let uniforms = self.uniforms()?;

        for binding in uniforms.bindings() {
            for field in &binding.fields {
                if field.name_id >= strings.len() {
                    return Err(Error::StringIdOutOfRange(field.name_id, strings.len()));
                }
            }
        }

        let cursor = BytecodeCursor::new(self.bytecode());
        for instruction in cursor {
            let instruction = instruction?;
            for operand in &instruction.operands {
                match operand {
                    Operand::StringId(id) if *id >= strings.len() => {
                        return Err(Error::StringIdOutOfRange(*id, strings.len()));
                    }
                    Operand::DataId(id) if *id >= data.len() => {
                        return Err(Error::DataIdOutOfRange(*id, data.len()));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Assemble a module from its parts and serialize it, skipping the
    /// validation pass (the caller is constructing, not trusting untrusted
    /// input).
    pub fn build(
        version: u32,
        flags: u32,
        bytecode: &[u8],
        string_section: &[u8],
        data_section: &[u8],
        uniform_section: &[u8],
    ) -> Module {
        let mut offset = HEADER_LEN as u32;
        let bytecode_record = SectionRecord {
            offset,
            length: bytecode.len() as u32,
        };
        offset += bytecode_record.length;
        let strings_record = SectionRecord {
            offset,
            length: string_section.len() as u32,
        };
        offset += strings_record.length;
        let data_record = SectionRecord {
            offset,
            length: data_section.len() as u32,
        };
        offset += data_record.length;
        let uniforms_record = SectionRecord {
            offset,
            length: uniform_section.len() as u32,
        };

        let header = Header {
            version,
            flags,
            bytecode: bytecode_record,
            strings: strings_record,
            data: data_record,
            uniforms: uniforms_record,
        };

        let mut buf = Vec::with_capacity(HEADER_LEN + bytecode.len() + string_section.len()
            + data_section.len()
            + uniform_section.len());
        header.write(&mut buf);
        buf.extend_from_slice(bytecode);
        buf.extend_from_slice(string_section);
        buf.extend_from_slice(data_section);
        buf.extend_from_slice(uniform_section);

        Module { buf, header }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
