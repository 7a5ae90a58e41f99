//! The uniform table section: a module-level directory of named fields
//! inside uniform buffers, used for reflection-based host writes
//! (`pngine::Animation::set_uniform`). Layout: `count: u16` then per
//! binding `{group: u8, binding: u8, total_size: u32, field_count: u16,
//! fields[]}`, each field `{name_id: u16, offset: u32, size: u32,
//! component_type: u8}`.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub name_id: u16,
    pub offset: u32,
    pub size: u32,
    pub component_type: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBinding {
    pub group: u8,
    pub binding: u8,
    pub total_size: u32,
    pub fields: Vec<UniformField>,
}

impl UniformBinding {
    /// Find the field named `name_id`, if any.
    pub fn field(&self, name_id: u16) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name_id == name_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    bindings: Vec<UniformBinding>,
}

impl UniformTable {
    pub fn parse(section: &[u8]) -> Result<UniformTable> {
        if section.len() < 2 {
            return Err(Error::UnexpectedEof);
        }
        let count = LittleEndian::read_u16(&section[0..2]);
        let mut pos = 2usize;
        let mut bindings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if pos + 8 > section.len() {
                return Err(Error::UnexpectedEof);
            }
            let group = section[pos];
            let binding = section[pos + 1];
            let total_size = LittleEndian::read_u32(&section[pos + 2..pos + 6]);
            let field_count = LittleEndian::read_u16(&section[pos + 6..pos + 8]);
            pos += 8;

            let mut fields = Vec::with_capacity(field_count as usize);
            for _ in 0..field_count {
                if pos + 11 > section.len() {
                    return Err(Error::UnexpectedEof);
                }
                let name_id = LittleEndian::read_u16(&section[pos..pos + 2]);
                let offset = LittleEndian::read_u32(&section[pos + 2..pos + 6]);
                let size = LittleEndian::read_u32(&section[pos + 6..pos + 10]);
                let component_type = section[pos + 10];
                pos += 11;

                if offset.checked_add(size).map(|end| end > total_size).unwrap_or(true) {
                    return Err(Error::UniformFieldOutOfRange {
                        offset,
                        size,
                        total_size,
                    });
                }
                fields.push(UniformField {
                    name_id,
                    offset,
                    size,
                    component_type,
                });
            }
            bindings.push(UniformBinding {
                group,
                binding,
                total_size,
                fields,
            });
        }
        Ok(UniformTable { bindings })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[UniformBinding] {
        &self.bindings
    }

    pub fn find(&self, group: u8, binding: u8) -> Option<&UniformBinding> {
        self.bindings
            .iter()
            .find(|b| b.group == group && b.binding == binding)
    }
}

/// Serialize `bindings` into the uniform table section layout.
pub fn write_uniform_table(out: &mut Vec<u8>, bindings: &[UniformBinding]) -> Result<()> {
    let count: u16 = bindings
        .len()
        .try_into()
        .map_err(|_| Error::InvalidModule("more than 65535 uniform bindings"))?;
    out.extend_from_slice(&count.to_le_bytes());
    for binding in bindings {
        out.push(binding.group);
        out.push(binding.binding);
        out.extend_from_slice(&binding.total_size.to_le_bytes());
        let field_count: u16 = binding
            .fields
            .len()
            .try_into()
            .map_err(|_| Error::InvalidModule("more than 65535 fields in one binding"))?;
        out.extend_from_slice(&field_count.to_le_bytes());
        for field in &binding.fields {
            out.extend_from_slice(&field.name_id.to_le_bytes());
            out.extend_from_slice(&field.offset.to_le_bytes());
            out.extend_from_slice(&field.size.to_le_bytes());
            out.push(field.component_type);
        }
    }
    Ok(())
}
