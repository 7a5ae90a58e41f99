//! Decodes a data-blob-addressed [`pngine_module::Descriptor`] into the
//! concrete descriptor structs `GpuBackend::create_*` expects. Keys follow
//! the catalogue in `spec.md` §6.3; unknown keys are skipped (the
//! catalogue is explicitly an excerpt, and per §6.3 "unknown keys are
//! skipped by decoders").

use crate::backend::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, BufferDescriptor, ComputePipelineDescriptor,
    PipelineLayoutDescriptor, QuerySetDescriptor, RenderBundleDescriptor, RenderPassDescriptor,
    RenderPipelineDescriptor, SamplerDescriptor, ShaderModuleDescriptor, TextureDescriptor,
    TextureViewDescriptor,
};
use crate::error::{Error, Result};
use pngine_module::{Descriptor, StringTable, Value};

pub mod texture_keys {
    pub const WIDTH: u8 = 0;
    pub const HEIGHT: u8 = 1;
    pub const DEPTH_OR_ARRAY_LAYERS: u8 = 2;
    pub const MIP_LEVEL_COUNT: u8 = 3;
    pub const SAMPLE_COUNT: u8 = 4;
    pub const FORMAT: u8 = 5;
    pub const USAGE: u8 = 6;
    pub const CANVAS_SIZED: u8 = 7;
    pub const TEXTURE_ID: u8 = 8;
}

pub mod sampler_keys {
    pub const ADDRESS_MODE_U: u8 = 0;
    pub const ADDRESS_MODE_V: u8 = 1;
    pub const ADDRESS_MODE_W: u8 = 2;
    pub const MAG_FILTER: u8 = 3;
    pub const MIN_FILTER: u8 = 4;
    pub const MIPMAP_FILTER: u8 = 5;
    pub const LOD_MIN_CLAMP: u8 = 6;
    pub const LOD_MAX_CLAMP: u8 = 7;
}

pub mod pipeline_keys {
    pub const LAYOUT: u8 = 0;
    pub const VERTEX_MODULE: u8 = 1;
    pub const VERTEX_ENTRY_POINT: u8 = 2;
    pub const FRAGMENT_MODULE: u8 = 3;
    pub const FRAGMENT_ENTRY_POINT: u8 = 4;
    pub const TOPOLOGY: u8 = 5;
    pub const COMPUTE_MODULE: u8 = 1;
    pub const COMPUTE_ENTRY_POINT: u8 = 2;
}

fn field_u32(descriptor: &Descriptor, key: u8, default: u32) -> u32 {
    match descriptor.field(key) {
        Some(Value::U32(v)) => *v,
        _ => default,
    }
}

fn field_bool(descriptor: &Descriptor, key: u8, default: bool) -> bool {
    match descriptor.field(key) {
        Some(Value::Bool(v)) => *v,
        _ => default,
    }
}

fn field_string<'a>(
    descriptor: &Descriptor,
    key: u8,
    strings: &StringTable<'a>,
    default: &'a str,
) -> Result<&'a str> {
    match descriptor.field(key) {
        Some(Value::StringId(id)) => Ok(strings.get(*id)?),
        _ => Ok(default),
    }
}

pub fn decode_buffer_descriptor(size: u32, usage: u32, pool: u32) -> BufferDescriptor {
    BufferDescriptor {
        size: size as u64,
        usage: wgpu_types::BufferUsages::from_bits_truncate(usage),
        pool: pool.max(1),
    }
}

pub fn decode_texture_descriptor(blob: &[u8]) -> Result<TextureDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("texture descriptor blob is malformed".to_string())
    })?;
    use texture_keys::*;
    Ok(TextureDescriptor {
        width: field_u32(&descriptor, WIDTH, 1),
        height: field_u32(&descriptor, HEIGHT, 1),
        depth_or_array_layers: field_u32(&descriptor, DEPTH_OR_ARRAY_LAYERS, 1),
        mip_level_count: field_u32(&descriptor, MIP_LEVEL_COUNT, 1),
        sample_count: field_u32(&descriptor, SAMPLE_COUNT, 1),
        dimension: wgpu_types::TextureDimension::D2,
        format: texture_format_from_u32(field_u32(
            &descriptor,
            FORMAT,
            texture_format_to_u32(wgpu_types::TextureFormat::Rgba8Unorm),
        )),
        usage: wgpu_types::TextureUsages::from_bits_truncate(field_u32(&descriptor, USAGE, 0)),
        canvas_sized: field_bool(&descriptor, CANVAS_SIZED, false),
    })
}

/// A small fixed mapping between the handful of texture formats PNGine
/// actually declares in descriptors and their on-wire `u32` tag, since
/// `wgpu_types::TextureFormat` itself has no stable numeric representation
/// to round-trip through a descriptor field.
fn texture_format_to_u32(format: wgpu_types::TextureFormat) -> u32 {
    use wgpu_types::TextureFormat::*;
    match format {
        Rgba8Unorm => 0,
        Rgba8UnormSrgb => 1,
        Bgra8Unorm => 2,
        Bgra8UnormSrgb => 3,
        Depth32Float => 4,
        _ => 0,
    }
}

fn texture_format_from_u32(tag: u32) -> wgpu_types::TextureFormat {
    use wgpu_types::TextureFormat::*;
    match tag {
        1 => Rgba8UnormSrgb,
        2 => Bgra8Unorm,
        3 => Bgra8UnormSrgb,
        4 => Depth32Float,
        _ => Rgba8Unorm,
    }
}

pub fn decode_texture_view_descriptor(blob: &[u8]) -> Result<TextureViewDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("texture view descriptor blob is malformed".to_string())
    })?;
    Ok(TextureViewDescriptor {
        texture_id: field_u32(&descriptor, texture_keys::TEXTURE_ID, 0),
        format: descriptor
            .field(texture_keys::FORMAT)
            .and_then(|v| match v {
                Value::U32(tag) => Some(texture_format_from_u32(*tag)),
                _ => None,
            }),
        dimension: None,
    })
}

pub fn decode_sampler_descriptor(blob: &[u8]) -> Result<SamplerDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("sampler descriptor blob is malformed".to_string())
    })?;
    use sampler_keys::*;
    let address_mode = |key| match field_u32(&descriptor, key, 0) {
        1 => wgpu_types::AddressMode::Repeat,
        2 => wgpu_types::AddressMode::MirrorRepeat,
        _ => wgpu_types::AddressMode::ClampToEdge,
    };
    let filter = |key| match field_u32(&descriptor, key, 0) {
        1 => wgpu_types::FilterMode::Linear,
        _ => wgpu_types::FilterMode::Nearest,
    };
    Ok(SamplerDescriptor {
        address_mode_u: address_mode(ADDRESS_MODE_U),
        address_mode_v: address_mode(ADDRESS_MODE_V),
        address_mode_w: address_mode(ADDRESS_MODE_W),
        mag_filter: filter(MAG_FILTER),
        min_filter: filter(MIN_FILTER),
        mipmap_filter: filter(MIPMAP_FILTER),
        compare: None,
        lod_min_clamp: f32::from_bits(field_u32(&descriptor, LOD_MIN_CLAMP, 0f32.to_bits())),
        lod_max_clamp: f32::from_bits(field_u32(&descriptor, LOD_MAX_CLAMP, 32f32.to_bits())),
    })
}

pub fn decode_shader_module_descriptor(blob: &[u8]) -> Result<ShaderModuleDescriptor> {
    let source = shader_source_bytes(blob);
    let source = std::str::from_utf8(source)
        .map_err(|_| Error::ShaderCompile("shader source blob is not valid UTF-8".to_string()))?;
    Ok(ShaderModuleDescriptor {
        source: source.to_string(),
    })
}

/// A pre-reflected shader module's struct-layout hint for one uniform
/// binding: `nannou_isf::pipeline::IsfPipeline` precedent for cross-checking
/// a shader's expected bind layout ahead of pipeline creation, reworked
/// here as a best-effort blob-level convention (`SPEC_FULL.md` §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionHint {
    pub group: u8,
    pub binding: u8,
    pub total_size: u32,
}

const REFLECTION_TAG: u8 = 0x01;

/// A shader module blob is either ordinary source (any leading byte other
/// than [`REFLECTION_TAG`] — the common case, since WGSL/SPIR-V source never
/// starts with that byte) or tagged pre-reflected: `[0x01][hint_count:u8]
/// [{group:u8, binding:u8, total_size:u32 LE}; hint_count][source...]`.
/// Returns `None` for untagged blobs.
pub fn parse_reflection_hints(blob: &[u8]) -> Option<Vec<ReflectionHint>> {
    if blob.first() != Some(&REFLECTION_TAG) {
        return None;
    }
    let count = *blob.get(1)? as usize;
    let mut hints = Vec::with_capacity(count);
    let mut pos = 2usize;
    for _ in 0..count {
        let group = *blob.get(pos)?;
        let binding = *blob.get(pos + 1)?;
        let size_bytes: [u8; 4] = blob.get(pos + 2..pos + 6)?.try_into().ok()?;
        hints.push(ReflectionHint {
            group,
            binding,
            total_size: u32::from_le_bytes(size_bytes),
        });
        pos += 6;
    }
    Some(hints)
}

/// The raw source bytes of a shader module blob, with the reflection tag
/// and hint block (if any) stripped off.
fn shader_source_bytes(blob: &[u8]) -> &[u8] {
    if blob.first() != Some(&REFLECTION_TAG) {
        return blob;
    }
    let count = blob.get(1).copied().unwrap_or(0) as usize;
    let hints_end = 2 + count * 6;
    blob.get(hints_end..).unwrap_or(&[])
}

pub fn decode_bind_group_layout_descriptor(blob: &[u8]) -> BindGroupLayoutDescriptor {
    BindGroupLayoutDescriptor {
        entries: blob.to_vec(),
    }
}

pub fn decode_pipeline_layout_descriptor(blob: &[u8]) -> Result<PipelineLayoutDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("pipeline layout descriptor blob is malformed".to_string())
    })?;
    let bind_group_layout_ids = descriptor
        .fields
        .iter()
        .filter_map(|f| match f.value {
            Value::U32(id) => Some(id),
            _ => None,
        })
        .collect();
    Ok(PipelineLayoutDescriptor {
        bind_group_layout_ids,
    })
}

pub fn decode_bind_group_descriptor(blob: &[u8]) -> Result<BindGroupDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("bind group descriptor blob is malformed".to_string())
    })?;
    let layout_id = field_u32(&descriptor, 0, 0);
    let entries = descriptor
        .fields
        .iter()
        .skip(1)
        .filter_map(|f| match f.value {
            Value::U32(id) => Some(id),
            _ => None,
        })
        .collect();
    Ok(BindGroupDescriptor { layout_id, entries })
}

pub fn decode_render_pipeline_descriptor<'a>(
    blob: &[u8],
    strings: &StringTable<'a>,
) -> Result<RenderPipelineDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::PipelineCreate("render pipeline descriptor blob is malformed".to_string())
    })?;
    use pipeline_keys::*;
    let layout_id = descriptor.field(LAYOUT).and_then(|v| match v {
        Value::U32(id) => Some(*id),
        _ => None,
    });
    let fragment_module_id = descriptor.field(FRAGMENT_MODULE).and_then(|v| match v {
        Value::U32(id) => Some(*id),
        _ => None,
    });
    Ok(RenderPipelineDescriptor {
        layout_id,
        vertex_module_id: field_u32(&descriptor, VERTEX_MODULE, 0),
        vertex_entry_point: field_string(&descriptor, VERTEX_ENTRY_POINT, strings, "vs_main")?
            .to_string(),
        fragment_module_id,
        fragment_entry_point: if fragment_module_id.is_some() {
            Some(field_string(&descriptor, FRAGMENT_ENTRY_POINT, strings, "fs_main")?.to_string())
        } else {
            None
        },
        topology: wgpu_types::PrimitiveTopology::TriangleList,
    })
}

pub fn decode_compute_pipeline_descriptor<'a>(
    blob: &[u8],
    strings: &StringTable<'a>,
) -> Result<ComputePipelineDescriptor> {
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::PipelineCreate("compute pipeline descriptor blob is malformed".to_string())
    })?;
    use pipeline_keys::*;
    let layout_id = descriptor.field(LAYOUT).and_then(|v| match v {
        Value::U32(id) => Some(*id),
        _ => None,
    });
    Ok(ComputePipelineDescriptor {
        layout_id,
        module_id: field_u32(&descriptor, COMPUTE_MODULE, 0),
        entry_point: field_string(&descriptor, COMPUTE_ENTRY_POINT, strings, "main")?.to_string(),
    })
}

pub fn decode_query_set_descriptor(blob: &[u8]) -> Result<QuerySetDescriptor> {
    let descriptor = Descriptor::parse(blob)
        .map_err(|_| Error::InvalidArgument("query set descriptor blob is malformed".to_string()))?;
    Ok(QuerySetDescriptor {
        count: field_u32(&descriptor, 0, 1),
    })
}

pub fn decode_render_bundle_descriptor(blob: &[u8]) -> RenderBundleDescriptor {
    RenderBundleDescriptor {
        encoded: blob.to_vec(),
    }
}

/// Decodes a `begin_render_pass` data-blob argument. Key 0 holds the color
/// attachment's texture-view resource ID, if the pass renders to a texture
/// rather than the default surface.
pub fn decode_render_pass_descriptor(blob: &[u8]) -> Result<RenderPassDescriptor> {
    if blob.is_empty() {
        return Ok(RenderPassDescriptor {
            color_attachment_texture_view_id: None,
        });
    }
    let descriptor = Descriptor::parse(blob).map_err(|_| {
        Error::InvalidArgument("render pass descriptor blob is malformed".to_string())
    })?;
    Ok(RenderPassDescriptor {
        color_attachment_texture_view_id: descriptor.field(0).and_then(|v| match v {
            Value::U32(id) => Some(*id),
            _ => None,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pngine_module::{Field, Value};

    #[test]
    fn texture_descriptor_applies_domain_defaults_for_missing_fields() {
        let blob = Descriptor {
            descriptor_type: 1,
            fields: vec![Field {
                key: texture_keys::WIDTH,
                value: Value::U32(256),
            }],
        };
        let mut buf = Vec::new();
        blob.write(&mut buf).unwrap();
        let decoded = decode_texture_descriptor(&buf).unwrap();
        assert_eq!(decoded.width, 256);
        assert_eq!(decoded.height, 1);
        assert_eq!(decoded.format, wgpu_types::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn buffer_descriptor_from_plain_operands() {
        let descriptor = decode_buffer_descriptor(1024, 0b0010_0000, 2);
        assert_eq!(descriptor.size, 1024);
        assert_eq!(descriptor.pool, 2);
    }

    #[test]
    fn untagged_shader_blob_has_no_reflection_hints() {
        let blob = b"fn vs_main() {}";
        assert_eq!(parse_reflection_hints(blob), None);
        let decoded = decode_shader_module_descriptor(blob).unwrap();
        assert_eq!(decoded.source, "fn vs_main() {}");
    }

    #[test]
    fn tagged_shader_blob_yields_hints_and_strips_them_from_source() {
        let mut blob = vec![REFLECTION_TAG, 1, 0, 0];
        blob.extend_from_slice(&16u32.to_le_bytes());
        blob.extend_from_slice(b"fn vs_main() {}");

        let hints = parse_reflection_hints(&blob).unwrap();
        assert_eq!(
            hints,
            vec![ReflectionHint {
                group: 0,
                binding: 0,
                total_size: 16,
            }]
        );
        let decoded = decode_shader_module_descriptor(&blob).unwrap();
        assert_eq!(decoded.source, "fn vs_main() {}");
    }
}
