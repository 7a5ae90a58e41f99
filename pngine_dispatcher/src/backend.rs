//! The `GpuBackend` trait: the pluggable collaborator that actually owns a
//! GPU device/queue. PNGine core depends only on this trait and on
//! `wgpu-types` for descriptor/enum value types — never on a concrete
//! `wgpu::Device`/`Queue`/`Instance`, matching `spec.md`'s treatment of the
//! "concrete GPU backend" as an external collaborator. Mirrors
//! `nannou_wgpu`'s builder-then-descriptor style: every `create_*` method
//! takes a descriptor struct built from decoded PNGB bytes.

use std::fmt::Debug;

#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    pub size: u64,
    pub usage: wgpu_types::BufferUsages,
    pub pool: u32,
}

#[derive(Debug, Clone)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub depth_or_array_layers: u32,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub dimension: wgpu_types::TextureDimension,
    pub format: wgpu_types::TextureFormat,
    pub usage: wgpu_types::TextureUsages,
    /// Canvas-sized textures substitute `width`/`height` from the host
    /// surface at bind time instead of the descriptor's own values.
    pub canvas_sized: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TextureViewDescriptor {
    /// The texture this view is created from, carried as a field in the
    /// descriptor blob alongside format/dimension overrides.
    pub texture_id: u32,
    pub format: Option<wgpu_types::TextureFormat>,
    pub dimension: Option<wgpu_types::TextureViewDimension>,
}

#[derive(Debug, Clone)]
pub struct SamplerDescriptor {
    pub address_mode_u: wgpu_types::AddressMode,
    pub address_mode_v: wgpu_types::AddressMode,
    pub address_mode_w: wgpu_types::AddressMode,
    pub mag_filter: wgpu_types::FilterMode,
    pub min_filter: wgpu_types::FilterMode,
    pub mipmap_filter: wgpu_types::FilterMode,
    pub compare: Option<wgpu_types::CompareFunction>,
    pub lod_min_clamp: f32,
    pub lod_max_clamp: f32,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        SamplerDescriptor {
            address_mode_u: wgpu_types::AddressMode::ClampToEdge,
            address_mode_v: wgpu_types::AddressMode::ClampToEdge,
            address_mode_w: wgpu_types::AddressMode::ClampToEdge,
            mag_filter: wgpu_types::FilterMode::Nearest,
            min_filter: wgpu_types::FilterMode::Nearest,
            mipmap_filter: wgpu_types::FilterMode::Nearest,
            compare: None,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor {
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct BindGroupLayoutDescriptor {
    pub entries: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PipelineLayoutDescriptor {
    pub bind_group_layout_ids: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct BindGroupDescriptor {
    pub layout_id: u32,
    pub entries: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor {
    pub layout_id: Option<u32>,
    pub vertex_module_id: u32,
    pub vertex_entry_point: String,
    pub fragment_module_id: Option<u32>,
    pub fragment_entry_point: Option<String>,
    pub topology: wgpu_types::PrimitiveTopology,
}

#[derive(Debug, Clone)]
pub struct ComputePipelineDescriptor {
    pub layout_id: Option<u32>,
    pub module_id: u32,
    pub entry_point: String,
}

#[derive(Debug, Clone, Default)]
pub struct QuerySetDescriptor {
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RenderBundleDescriptor {
    pub encoded: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RenderPassDescriptor {
    pub color_attachment_texture_view_id: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ComputePassDescriptor;

/// The host/backend collaborator: owns a real GPU device and executes the
/// commands the dispatcher decodes. A `GpuBackend` implementation is
/// expected to be infallible about bookkeeping (handle identity) but can
/// fail resource creation and pass submission, surfaced as `Self::Error`.
pub trait GpuBackend {
    type BufferHandle: Copy + Eq + Debug;
    type TextureHandle: Copy + Eq + Debug;
    type TextureViewHandle: Copy + Eq + Debug;
    type SamplerHandle: Copy + Eq + Debug;
    type ShaderModuleHandle: Copy + Eq + Debug;
    type BindGroupLayoutHandle: Copy + Eq + Debug;
    type PipelineLayoutHandle: Copy + Eq + Debug;
    type BindGroupHandle: Copy + Eq + Debug;
    type RenderPipelineHandle: Copy + Eq + Debug;
    type ComputePipelineHandle: Copy + Eq + Debug;
    type QuerySetHandle: Copy + Eq + Debug;
    type RenderBundleHandle: Copy + Eq + Debug;
    type ImageBitmapHandle: Copy + Eq + Debug;
    type Error: std::fmt::Display;

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<Self::BufferHandle, Self::Error>;
    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::TextureHandle, Self::Error>;
    fn create_texture_view(
        &mut self,
        texture: Self::TextureHandle,
        desc: &TextureViewDescriptor,
    ) -> Result<Self::TextureViewHandle, Self::Error>;
    fn create_sampler(&mut self, desc: &SamplerDescriptor) -> Result<Self::SamplerHandle, Self::Error>;
    fn create_shader_module(
        &mut self,
        desc: &ShaderModuleDescriptor,
    ) -> Result<Self::ShaderModuleHandle, Self::Error>;
    fn create_bind_group_layout(
        &mut self,
        desc: &BindGroupLayoutDescriptor,
    ) -> Result<Self::BindGroupLayoutHandle, Self::Error>;
    fn create_pipeline_layout(
        &mut self,
        desc: &PipelineLayoutDescriptor,
    ) -> Result<Self::PipelineLayoutHandle, Self::Error>;
    fn create_bind_group(&mut self, desc: &BindGroupDescriptor) -> Result<Self::BindGroupHandle, Self::Error>;
    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> Result<Self::RenderPipelineHandle, Self::Error>;
    fn create_compute_pipeline(
        &mut self,
        desc: &ComputePipelineDescriptor,
    ) -> Result<Self::ComputePipelineHandle, Self::Error>;
    fn create_query_set(&mut self, desc: &QuerySetDescriptor) -> Result<Self::QuerySetHandle, Self::Error>;
    fn create_render_bundle(
        &mut self,
        desc: &RenderBundleDescriptor,
    ) -> Result<Self::RenderBundleHandle, Self::Error>;
    fn create_image_bitmap(&mut self, source: &str) -> Result<Self::ImageBitmapHandle, Self::Error>;

    fn write_buffer(&mut self, buffer: Self::BufferHandle, offset: u64, data: &[u8]) -> Result<(), Self::Error>;
    fn copy_external_image_to_texture(
        &mut self,
        bitmap: Self::ImageBitmapHandle,
        texture: Self::TextureHandle,
    ) -> Result<(), Self::Error>;

    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) -> Result<(), Self::Error>;
    fn set_pipeline(&mut self, pipeline: Self::RenderPipelineHandle) -> Result<(), Self::Error>;
    fn set_bind_group(&mut self, slot: u32, bind_group: Self::BindGroupHandle) -> Result<(), Self::Error>;
    fn set_vertex_buffer(&mut self, slot: u32, buffer: Self::BufferHandle) -> Result<(), Self::Error>;
    fn set_index_buffer(&mut self, buffer: Self::BufferHandle) -> Result<(), Self::Error>;
    fn draw(&mut self, vertex_count: u32, instance_count: u32) -> Result<(), Self::Error>;
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) -> Result<(), Self::Error>;
    fn execute_bundles(&mut self, bundles: &[Self::RenderBundleHandle]) -> Result<(), Self::Error>;
    fn end_render_pass(&mut self) -> Result<(), Self::Error>;

    fn begin_compute_pass(&mut self, desc: &ComputePassDescriptor) -> Result<(), Self::Error>;
    fn set_compute_pipeline(&mut self, pipeline: Self::ComputePipelineHandle) -> Result<(), Self::Error>;
    fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<(), Self::Error>;
    fn end_compute_pass(&mut self) -> Result<(), Self::Error>;

    fn submit(&mut self) -> Result<(), Self::Error>;

    fn destroy_buffer(&mut self, handle: Self::BufferHandle);
    fn destroy_texture(&mut self, handle: Self::TextureHandle);
    fn destroy_texture_view(&mut self, handle: Self::TextureViewHandle);
    fn destroy_sampler(&mut self, handle: Self::SamplerHandle);
    fn destroy_shader_module(&mut self, handle: Self::ShaderModuleHandle);
    fn destroy_bind_group_layout(&mut self, handle: Self::BindGroupLayoutHandle);
    fn destroy_pipeline_layout(&mut self, handle: Self::PipelineLayoutHandle);
    fn destroy_bind_group(&mut self, handle: Self::BindGroupHandle);
    fn destroy_render_pipeline(&mut self, handle: Self::RenderPipelineHandle);
    fn destroy_compute_pipeline(&mut self, handle: Self::ComputePipelineHandle);
    fn destroy_query_set(&mut self, handle: Self::QuerySetHandle);
    fn destroy_render_bundle(&mut self, handle: Self::RenderBundleHandle);
    fn destroy_image_bitmap(&mut self, handle: Self::ImageBitmapHandle);
}
