//! The typed descriptor mini-format used for complex creation calls
//! (textures, pipelines, bind groups): `{descriptor_type: u8, field_count: u8,
//! fields[]}`, each field `{key: u8, value_tag: u8, value_bytes}`. Key space
//! is fixed per descriptor type (see the descriptor key catalogue).
//!
//! Some data blobs predate this format and carry the same information as a
//! JSON object instead. New code should always emit the typed encoding;
//! [`Descriptor::parse`] falls back to the JSON form only when the blob's
//! first byte is `{`, per the legacy-transport note this format replaces.

use crate::error::{Error, Result};

/// A decoded field value. The tag determines how `value_bytes` is
/// interpreted; unknown tags are preserved as raw bytes so a decoder that
/// doesn't recognize a key can still skip it cleanly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U32(u32),
    F32(f32),
    Bool(bool),
    StringId(u16),
    Raw(Vec<u8>),
}

const TAG_U32: u8 = 0;
const TAG_F32: u8 = 1;
const TAG_BOOL: u8 = 2;
const TAG_STRING_ID: u8 = 3;
const TAG_RAW: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: u8,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub descriptor_type: u8,
    pub fields: Vec<Field>,
}

impl Descriptor {
    pub fn field(&self, key: u8) -> Option<&Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Decode a descriptor blob. Blobs beginning with `{` are treated as the
    /// legacy JSON transport and rejected here with a pointer to the caller
    /// that such blobs should be handled by a JSON fallback path, not this
    /// decoder — see `is_legacy_json`.
    pub fn parse(blob: &[u8]) -> Result<Descriptor> {
        if is_legacy_json(blob) {
            return Err(Error::InvalidDescriptor(
                "legacy JSON descriptor; use the JSON fallback path",
            ));
        }
        if blob.len() < 2 {
            return Err(Error::InvalidDescriptor("blob shorter than 2 bytes"));
        }
        let descriptor_type = blob[0];
        let field_count = blob[1];
        let mut pos = 2usize;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            if pos + 2 > blob.len() {
                return Err(Error::InvalidDescriptor("truncated field header"));
            }
            let key = blob[pos];
            let value_tag = blob[pos + 1];
            pos += 2;
            let (value, consumed) = decode_value(value_tag, &blob[pos..])?;
            pos += consumed;
            fields.push(Field { key, value });
        }
        Ok(Descriptor {
            descriptor_type,
            fields,
        })
    }

    /// Serialize back to the typed mini-format.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.descriptor_type);
        let field_count: u8 = self
            .fields
            .len()
            .try_into()
            .map_err(|_| Error::InvalidDescriptor("more than 255 fields"))?;
        out.push(field_count);
        for field in &self.fields {
            out.push(field.key);
            write_value(out, &field.value)?;
        }
        Ok(())
    }
}

fn decode_value(tag: u8, rest: &[u8]) -> Result<(Value, usize)> {
    match tag {
        TAG_U32 => {
            let bytes: [u8; 4] = rest
                .get(0..4)
                .ok_or(Error::InvalidDescriptor("truncated u32 value"))?
                .try_into()
                .unwrap();
            Ok((Value::U32(u32::from_le_bytes(bytes)), 4))
        }
        TAG_F32 => {
            let bytes: [u8; 4] = rest
                .get(0..4)
                .ok_or(Error::InvalidDescriptor("truncated f32 value"))?
                .try_into()
                .unwrap();
            Ok((Value::F32(f32::from_le_bytes(bytes)), 4))
        }
        TAG_BOOL => {
            let byte = *rest.first().ok_or(Error::InvalidDescriptor("truncated bool value"))?;
            Ok((Value::Bool(byte != 0), 1))
        }
        TAG_STRING_ID => {
            let bytes: [u8; 2] = rest
                .get(0..2)
                .ok_or(Error::InvalidDescriptor("truncated string id value"))?
                .try_into()
                .unwrap();
            Ok((Value::StringId(u16::from_le_bytes(bytes)), 2))
        }
        TAG_RAW => {
            let len_bytes: [u8; 2] = rest
                .get(0..2)
                .ok_or(Error::InvalidDescriptor("truncated raw value length"))?
                .try_into()
                .unwrap();
            let len = u16::from_le_bytes(len_bytes) as usize;
            let payload = rest
                .get(2..2 + len)
                .ok_or(Error::InvalidDescriptor("truncated raw value payload"))?;
            Ok((Value::Raw(payload.to_vec()), 2 + len))
        }
        _ => Err(Error::InvalidDescriptor("unknown value tag")),
    }
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::U32(v) => {
            out.push(TAG_U32);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Value::F32(v) => {
            out.push(TAG_F32);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Value::Bool(v) => {
            out.push(TAG_BOOL);
            out.push(*v as u8);
        }
        Value::StringId(v) => {
            out.push(TAG_STRING_ID);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Value::Raw(bytes) => {
            out.push(TAG_RAW);
            let len: u16 = bytes
                .len()
                .try_into()
                .map_err(|_| Error::InvalidDescriptor("raw value longer than 65535 bytes"))?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(bytes);
        }
    }
    Ok(())
}

/// True if `blob` looks like the legacy JSON descriptor transport.
pub fn is_legacy_json(blob: &[u8]) -> bool {
    blob.first() == Some(&b'{')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_field_types() {
        let descriptor = Descriptor {
            descriptor_type: 3,
            fields: vec![
                Field {
                    key: 0,
                    value: Value::U32(1920),
                },
                Field {
                    key: 1,
                    value: Value::F32(0.5),
                },
                Field {
                    key: 2,
                    value: Value::Bool(true),
                },
                Field {
                    key: 3,
                    value: Value::StringId(7),
                },
                Field {
                    key: 4,
                    value: Value::Raw(vec![9, 8, 7]),
                },
            ],
        };
        let mut buf = Vec::new();
        descriptor.write(&mut buf).unwrap();
        let decoded = Descriptor::parse(&buf).unwrap();
        assert_eq!(decoded, descriptor);
        assert_eq!(decoded.field(0), Some(&Value::U32(1920)));
    }

    #[test]
    fn legacy_json_blob_is_detected_and_rejected_by_parse() {
        let blob = br#"{"width":256}"#;
        assert!(is_legacy_json(blob));
        assert!(Descriptor::parse(blob).is_err());
    }

    #[test]
    fn unknown_key_is_preserved_for_the_caller_to_skip() {
        let descriptor = Descriptor {
            descriptor_type: 9,
            fields: vec![Field {
                key: 255,
                value: Value::U32(0),
            }],
        };
        let mut buf = Vec::new();
        descriptor.write(&mut buf).unwrap();
        let decoded = Descriptor::parse(&buf).unwrap();
        assert!(decoded.field(254).is_none());
        assert!(decoded.field(255).is_some());
    }
}
