//! A reference `GpuBackend` that allocates dense `u32` handles and records
//! every call instead of touching a real GPU. Used by the dispatcher's own
//! test suite in place of a `wgpu::Device`, the way `nannou_wgpu`'s test
//! helpers stand in for a window-backed surface.

use std::fmt;

use crate::backend::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, BufferDescriptor, ComputePassDescriptor,
    ComputePipelineDescriptor, GpuBackend, PipelineLayoutDescriptor, QuerySetDescriptor,
    RenderBundleDescriptor, RenderPassDescriptor, RenderPipelineDescriptor, SamplerDescriptor,
    ShaderModuleDescriptor, TextureDescriptor, TextureViewDescriptor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Records every backend call in order, for assertion in a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateBuffer(u64),
    CreateTexture(u32, u32),
    BeginRenderPass,
    SetPipeline(u32),
    SetComputePipeline(u32),
    SetBindGroup(u32, u32),
    SetVertexBuffer(u32, u32),
    Draw(u32, u32),
    DrawIndexed(u32, u32),
    EndRenderPass,
    BeginComputePass,
    Dispatch(u32, u32, u32),
    EndComputePass,
    Submit,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    next_id: u32,
    pub calls: Vec<Call>,
    /// If set, the next `create_*` call returns this error instead of a
    /// handle, then clears itself.
    pub fail_next_create: Option<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        MockBackend::default()
    }

    fn next(&mut self) -> Result<MockHandle, MockError> {
        if let Some(message) = self.fail_next_create.take() {
            return Err(MockError(message));
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(MockHandle(id))
    }
}

impl GpuBackend for MockBackend {
    type BufferHandle = MockHandle;
    type TextureHandle = MockHandle;
    type TextureViewHandle = MockHandle;
    type SamplerHandle = MockHandle;
    type ShaderModuleHandle = MockHandle;
    type BindGroupLayoutHandle = MockHandle;
    type PipelineLayoutHandle = MockHandle;
    type BindGroupHandle = MockHandle;
    type RenderPipelineHandle = MockHandle;
    type ComputePipelineHandle = MockHandle;
    type QuerySetHandle = MockHandle;
    type RenderBundleHandle = MockHandle;
    type ImageBitmapHandle = MockHandle;
    type Error = MockError;

    fn create_buffer(&mut self, desc: &BufferDescriptor) -> Result<Self::BufferHandle, Self::Error> {
        self.calls.push(Call::CreateBuffer(desc.size));
        self.next()
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::TextureHandle, Self::Error> {
        self.calls.push(Call::CreateTexture(desc.width, desc.height));
        self.next()
    }

    fn create_texture_view(
        &mut self,
        _texture: Self::TextureHandle,
        _desc: &TextureViewDescriptor,
    ) -> Result<Self::TextureViewHandle, Self::Error> {
        self.next()
    }

    fn create_sampler(&mut self, _desc: &SamplerDescriptor) -> Result<Self::SamplerHandle, Self::Error> {
        self.next()
    }

    fn create_shader_module(
        &mut self,
        _desc: &ShaderModuleDescriptor,
    ) -> Result<Self::ShaderModuleHandle, Self::Error> {
        self.next()
    }

    fn create_bind_group_layout(
        &mut self,
        _desc: &BindGroupLayoutDescriptor,
    ) -> Result<Self::BindGroupLayoutHandle, Self::Error> {
        self.next()
    }

    fn create_pipeline_layout(
        &mut self,
        _desc: &PipelineLayoutDescriptor,
    ) -> Result<Self::PipelineLayoutHandle, Self::Error> {
        self.next()
    }

    fn create_bind_group(&mut self, _desc: &BindGroupDescriptor) -> Result<Self::BindGroupHandle, Self::Error> {
        self.next()
    }

    fn create_render_pipeline(
        &mut self,
        _desc: &RenderPipelineDescriptor,
    ) -> Result<Self::RenderPipelineHandle, Self::Error> {
        self.next()
    }

    fn create_compute_pipeline(
        &mut self,
        _desc: &ComputePipelineDescriptor,
    ) -> Result<Self::ComputePipelineHandle, Self::Error> {
        self.next()
    }

    fn create_query_set(&mut self, _desc: &QuerySetDescriptor) -> Result<Self::QuerySetHandle, Self::Error> {
        self.next()
    }

    fn create_render_bundle(
        &mut self,
        _desc: &RenderBundleDescriptor,
    ) -> Result<Self::RenderBundleHandle, Self::Error> {
        self.next()
    }

    fn create_image_bitmap(&mut self, _source: &str) -> Result<Self::ImageBitmapHandle, Self::Error> {
        self.next()
    }

    fn write_buffer(&mut self, _buffer: Self::BufferHandle, _offset: u64, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn copy_external_image_to_texture(
        &mut self,
        _bitmap: Self::ImageBitmapHandle,
        _texture: Self::TextureHandle,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn begin_render_pass(&mut self, _desc: &RenderPassDescriptor) -> Result<(), Self::Error> {
        self.calls.push(Call::BeginRenderPass);
        Ok(())
    }

    fn set_pipeline(&mut self, pipeline: Self::RenderPipelineHandle) -> Result<(), Self::Error> {
        self.calls.push(Call::SetPipeline(pipeline.0));
        Ok(())
    }

    fn set_bind_group(&mut self, slot: u32, bind_group: Self::BindGroupHandle) -> Result<(), Self::Error> {
        self.calls.push(Call::SetBindGroup(slot, bind_group.0));
        Ok(())
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: Self::BufferHandle) -> Result<(), Self::Error> {
        self.calls.push(Call::SetVertexBuffer(slot, buffer.0));
        Ok(())
    }

    fn set_index_buffer(&mut self, _buffer: Self::BufferHandle) -> Result<(), Self::Error> {
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) -> Result<(), Self::Error> {
        self.calls.push(Call::Draw(vertex_count, instance_count));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) -> Result<(), Self::Error> {
        self.calls.push(Call::DrawIndexed(index_count, instance_count));
        Ok(())
    }

    fn execute_bundles(&mut self, _bundles: &[Self::RenderBundleHandle]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::EndRenderPass);
        Ok(())
    }

    fn begin_compute_pass(&mut self, _desc: &ComputePassDescriptor) -> Result<(), Self::Error> {
        self.calls.push(Call::BeginComputePass);
        Ok(())
    }

    fn set_compute_pipeline(&mut self, pipeline: Self::ComputePipelineHandle) -> Result<(), Self::Error> {
        self.calls.push(Call::SetComputePipeline(pipeline.0));
        Ok(())
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<(), Self::Error> {
        self.calls.push(Call::Dispatch(x, y, z));
        Ok(())
    }

    fn end_compute_pass(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::EndComputePass);
        Ok(())
    }

    fn submit(&mut self) -> Result<(), Self::Error> {
        self.calls.push(Call::Submit);
        Ok(())
    }

    fn destroy_buffer(&mut self, _handle: Self::BufferHandle) {}
    fn destroy_texture(&mut self, _handle: Self::TextureHandle) {}
    fn destroy_texture_view(&mut self, _handle: Self::TextureViewHandle) {}
    fn destroy_sampler(&mut self, _handle: Self::SamplerHandle) {}
    fn destroy_shader_module(&mut self, _handle: Self::ShaderModuleHandle) {}
    fn destroy_bind_group_layout(&mut self, _handle: Self::BindGroupLayoutHandle) {}
    fn destroy_pipeline_layout(&mut self, _handle: Self::PipelineLayoutHandle) {}
    fn destroy_bind_group(&mut self, _handle: Self::BindGroupHandle) {}
    fn destroy_render_pipeline(&mut self, _handle: Self::RenderPipelineHandle) {}
    fn destroy_compute_pipeline(&mut self, _handle: Self::ComputePipelineHandle) {}
    fn destroy_query_set(&mut self, _handle: Self::QuerySetHandle) {}
    fn destroy_render_bundle(&mut self, _handle: Self::RenderBundleHandle) {}
    fn destroy_image_bitmap(&mut self, _handle: Self::ImageBitmapHandle) {}
}
