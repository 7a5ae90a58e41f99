//! Black-box test for invariant #8: serialize/deserialize preserves every
//! opcode byte, string, data blob, and uniform field offset.

use pngine_module::data::write_data_table;
use pngine_module::header::CURRENT_VERSION;
use pngine_module::opcode::Opcode;
use pngine_module::strings::write_string_table;
use pngine_module::uniforms::{write_uniform_table, UniformBinding, UniformField};
use pngine_module::varint::write_uleb128;
use pngine_module::{BytecodeCursor, Module};

fn build_module() -> Vec<u8> {
    let mut bytecode = Vec::new();
    bytecode.push(Opcode::DefineFrame.as_byte());
    write_uleb128(&mut bytecode, 0); // name string id
    write_uleb128(&mut bytecode, 0); // start
    write_uleb128(&mut bytecode, 6); // length
    bytecode.push(Opcode::BeginRenderPass.as_byte());
    write_uleb128(&mut bytecode, 0);
    bytecode.push(Opcode::SetPipeline.as_byte());
    write_uleb128(&mut bytecode, 0);
    bytecode.push(Opcode::Draw.as_byte());
    write_uleb128(&mut bytecode, 3); // vertex_count
    bytecode.push(1); // instance_count present
    write_uleb128(&mut bytecode, 1);
    bytecode.push(Opcode::EndPass.as_byte());
    bytecode.push(Opcode::EndFrame.as_byte());

    let strings = {
        let mut buf = Vec::new();
        write_string_table(&mut buf, &["main"]).unwrap();
        buf
    };
    let data = {
        let mut buf = Vec::new();
        write_data_table(&mut buf, &[b"render pass descriptor"]).unwrap();
        buf
    };
    let uniforms = {
        let mut buf = Vec::new();
        write_uniform_table(
            &mut buf,
            &[UniformBinding {
                group: 0,
                binding: 0,
                total_size: 16,
                fields: vec![UniformField {
                    name_id: 0,
                    offset: 4,
                    size: 12,
                    component_type: 1,
                }],
            }],
        )
        .unwrap();
        buf
    };

    Module::build(CURRENT_VERSION, 0, &bytecode, &strings, &data, &uniforms).into_bytes()
}

#[test]
fn round_trip_preserves_every_opcode_byte() {
    let bytes = build_module();
    let module = Module::parse(bytes).unwrap();

    let instructions: Result<Vec<_>, _> = BytecodeCursor::new(module.bytecode()).collect();
    let instructions = instructions.unwrap();
    let opcodes: Vec<_> = instructions.iter().map(|i| i.opcode).collect();
    assert_eq!(
        opcodes,
        vec![
            Opcode::DefineFrame,
            Opcode::BeginRenderPass,
            Opcode::SetPipeline,
            Opcode::Draw,
            Opcode::EndPass,
            Opcode::EndFrame,
        ]
    );
}

#[test]
fn round_trip_preserves_strings_and_data_blobs() {
    let bytes = build_module();
    let module = Module::parse(bytes).unwrap();
    assert_eq!(module.strings().unwrap().get(0).unwrap(), "main");
    assert_eq!(
        module.data().unwrap().get(0).unwrap(),
        b"render pass descriptor" as &[u8]
    );
}

#[test]
fn round_trip_preserves_uniform_field_offsets() {
    let bytes = build_module();
    let module = Module::parse(bytes).unwrap();
    let uniforms = module.uniforms().unwrap();
    let binding = uniforms.find(0, 0).unwrap();
    let field = binding.field(0).unwrap();
    assert_eq!(field.offset, 4);
    assert_eq!(field.size, 12);
}

#[test]
fn re_serializing_an_identical_module_is_byte_identical() {
    let bytes = build_module();
    let module = Module::parse(bytes.clone()).unwrap();
    assert_eq!(module.as_bytes(), bytes.as_slice());
}
