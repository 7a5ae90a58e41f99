//! End-to-end host-API tests: a real `create`/`render`/`set_uniform`/
//! `destroy` cycle against a hand-built module, plus the null-safety and
//! init-idempotence invariants from `spec.md` §8 (#10, #11, #12).

use pngine::{host_api, Runtime, RuntimeConfig};
use pngine_module::{
    data::write_data_table, header::CURRENT_VERSION, opcode::Opcode, strings::write_string_table,
    uniforms::{write_uniform_table, UniformBinding, UniformField},
    varint::write_uleb128, Descriptor, Field, Module, Value,
};

fn descriptor_blob(descriptor_type: u8, fields: Vec<Field>) -> Vec<u8> {
    let descriptor = Descriptor {
        descriptor_type,
        fields,
    };
    let mut buf = Vec::new();
    descriptor.write(&mut buf).unwrap();
    buf
}

/// A module with one buffer (carrying a `time` uniform field), one render
/// pipeline, and a `"main"` frame that draws once.
fn sample_module_bytes() -> Vec<u8> {
    let render_pass_blob = descriptor_blob(0, vec![]);
    let pipeline_blob = descriptor_blob(
        0,
        vec![
            Field {
                key: 1,
                value: Value::U32(0),
            },
            Field {
                key: 2,
                value: Value::StringId(0),
            },
        ],
    );

    let mut bytecode = Vec::new();
    bytecode.push(Opcode::CreateBuffer.as_byte());
    write_uleb128(&mut bytecode, 16); // size
    write_uleb128(&mut bytecode, 0); // usage bits
    bytecode.push(1); // pool present
    write_uleb128(&mut bytecode, 1); // pool = 1

    bytecode.push(Opcode::CreateRenderPipeline.as_byte());
    write_uleb128(&mut bytecode, 1); // data id 1: pipeline descriptor

    bytecode.push(Opcode::DefineFrame.as_byte());
    write_uleb128(&mut bytecode, 0); // name_id: "main"
    write_uleb128(&mut bytecode, 0); // start: patched below
    write_uleb128(&mut bytecode, 0); // length: patched below
    let patch_at = bytecode.len() - 2;

    let mut frame_body = Vec::new();
    frame_body.push(Opcode::BeginRenderPass.as_byte());
    write_uleb128(&mut frame_body, 0); // data id 0: render pass descriptor
    frame_body.push(Opcode::SetPipeline.as_byte());
    write_uleb128(&mut frame_body, 0);
    frame_body.push(Opcode::Draw.as_byte());
    write_uleb128(&mut frame_body, 3);
    frame_body.push(1); // instance_count present
    write_uleb128(&mut frame_body, 1);
    frame_body.push(Opcode::EndPass.as_byte());
    frame_body.push(Opcode::EndFrame.as_byte());

    let start = bytecode.len();
    bytecode.extend_from_slice(&frame_body);
    let length = frame_body.len();
    bytecode[patch_at] = start as u8;
    bytecode[patch_at + 1] = length as u8;

    let mut strings = Vec::new();
    write_string_table(&mut strings, &["main", "vs_main", "time"]).unwrap();

    let blob_refs: Vec<&[u8]> = vec![render_pass_blob.as_slice(), pipeline_blob.as_slice()];
    let mut data = Vec::new();
    write_data_table(&mut data, &blob_refs).unwrap();

    let mut uniforms = Vec::new();
    write_uniform_table(
        &mut uniforms,
        &[UniformBinding {
            group: 0,
            binding: 0,
            total_size: 16,
            fields: vec![UniformField {
                name_id: 2, // "time"
                offset: 0,
                size: 4,
                component_type: 1,
            }],
        }],
    )
    .unwrap();

    Module::build(CURRENT_VERSION, 0, &bytecode, &strings, &data, &uniforms).into_bytes()
}

#[test]
fn create_render_set_uniform_destroy_cycle() {
    let runtime = Runtime::new(RuntimeConfig::default());
    runtime.init();

    let bytecode = sample_module_bytes();
    let mut anim = host_api::create(&runtime, &bytecode, 640, 480).expect("module should parse");

    assert_eq!(host_api::get_width(Some(&anim)), 640);
    assert_eq!(host_api::get_height(Some(&anim)), 480);

    assert_eq!(host_api::render(Some(&mut anim), 0.0, 0.0), 0);
    assert_eq!(host_api::frame_count(Some(&anim)), 1);
    assert_eq!(host_api::render_counters(Some(&anim)), (1u32 << 16) | 1);
    assert_eq!(host_api::last_draw_info(Some(&anim)), (3u32 << 16) | 1);
    assert_eq!(host_api::get_last_error(Some(&anim)), 0);

    assert_eq!(
        host_api::set_uniform(Some(&mut anim), "time", &1.5f32.to_le_bytes()),
        0
    );
    assert_eq!(
        host_api::set_uniform(Some(&mut anim), "does_not_exist", &[0u8; 4]),
        3
    );

    host_api::resize(Some(&mut anim), 1280, 720);
    assert_eq!(host_api::get_width(Some(&anim)), 1280);

    host_api::memory_warning(Some(&mut anim));
    host_api::destroy(Some(anim));
}

#[test]
fn create_before_init_returns_none() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let bytecode = sample_module_bytes();
    assert!(host_api::create(&runtime, &bytecode, 1, 1).is_none());
}

#[test]
fn create_with_garbage_bytes_returns_none() {
    let runtime = Runtime::new(RuntimeConfig::default());
    runtime.init();
    assert!(host_api::create(&runtime, b"not a pngb module", 1, 1).is_none());
}

#[test]
fn null_safety_never_panics() {
    host_api::destroy(None);
    assert_eq!(host_api::render(None, 0.0, 0.0), 1);
    host_api::resize(None, 1, 1);
    assert_eq!(host_api::get_width(None), 0);
    assert_eq!(host_api::get_height(None), 0);
}

#[test]
fn runtime_init_is_idempotent() {
    let runtime = Runtime::new(RuntimeConfig::default());
    runtime.init();
    runtime.init();
    assert!(runtime.is_initialized());
}

#[test]
fn negative_target_frame_rate_clamps_to_zero() {
    let config = RuntimeConfig {
        target_frame_rate: -144,
        ..RuntimeConfig::default()
    };
    assert_eq!(config.effective_frame_rate(), 0);
}
