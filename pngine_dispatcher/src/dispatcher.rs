//! The opcode executor: decodes a named frame's instruction range against a
//! `GpuBackend`, enforcing the pass-state discipline from `spec.md` §4.7 and
//! updating diagnostics. Grounded on `nannou_isf::pipeline::IsfPipeline`'s
//! role as the thing that walks a compiled representation and drives `wgpu`
//! calls frame by frame.

use std::collections::HashMap;
use std::sync::Arc;

use pngine_module::{BytecodeCursor, Module, Opcode, Operand};

use crate::backend::{BindGroupLayoutDescriptor, ComputePassDescriptor, GpuBackend};
use crate::descriptors;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::pass::PassContext;
use crate::resources::ResourceTable;
use crate::scene_time::SceneTime;

struct Tables<B: GpuBackend> {
    buffers: ResourceTable<B::BufferHandle>,
    textures: ResourceTable<B::TextureHandle>,
    texture_views: ResourceTable<B::TextureViewHandle>,
    samplers: ResourceTable<B::SamplerHandle>,
    shader_modules: ResourceTable<B::ShaderModuleHandle>,
    bind_group_layouts: ResourceTable<B::BindGroupLayoutHandle>,
    pipeline_layouts: ResourceTable<B::PipelineLayoutHandle>,
    bind_groups: ResourceTable<B::BindGroupHandle>,
    render_pipelines: ResourceTable<B::RenderPipelineHandle>,
    compute_pipelines: ResourceTable<B::ComputePipelineHandle>,
    query_sets: ResourceTable<B::QuerySetHandle>,
    render_bundles: ResourceTable<B::RenderBundleHandle>,
    image_bitmaps: ResourceTable<B::ImageBitmapHandle>,
}

impl<B: GpuBackend> Tables<B> {
    fn new() -> Self {
        Tables {
            buffers: ResourceTable::new("buffer"),
            textures: ResourceTable::new("texture"),
            texture_views: ResourceTable::new("texture_view"),
            samplers: ResourceTable::new("sampler"),
            shader_modules: ResourceTable::new("shader_module"),
            bind_group_layouts: ResourceTable::new("bind_group_layout"),
            pipeline_layouts: ResourceTable::new("pipeline_layout"),
            bind_groups: ResourceTable::new("bind_group"),
            render_pipelines: ResourceTable::new("render_pipeline"),
            compute_pipelines: ResourceTable::new("compute_pipeline"),
            query_sets: ResourceTable::new("query_set"),
            render_bundles: ResourceTable::new("render_bundle"),
            image_bitmaps: ResourceTable::new("image_bitmap"),
        }
    }
}

/// A dispatcher instance: a shared, immutable `Module`, per-class resource
/// tables, a mutable pass context, diagnostics, and a last-error slot, per
/// `spec.md` §3.3. The module is held behind an `Arc` rather than borrowed
/// so a single parsed module can back more than one dispatcher (`spec.md`
/// §5: "may be shared read-only across threads and dispatchers") and so a
/// host embedding like `pngine::Animation` can own a dispatcher outright
/// instead of juggling a lifetime.
pub struct Dispatcher<B: GpuBackend> {
    module: Arc<Module>,
    backend: B,
    tables: Tables<B>,
    pass: PassContext,
    diagnostics: Diagnostics,
    last_error: Option<Error>,
    frames: HashMap<String, (usize, usize)>,
    current_scene_time: SceneTime,
}

impl<B: GpuBackend> Dispatcher<B> {
    /// Build a dispatcher over `module`: resolve the frame index table by
    /// scanning the bytecode once for `define_frame` markers (`spec.md`
    /// §4.7: "resolved via an index table at module load"), then run every
    /// instruction that falls outside all frame ranges exactly once — this
    /// is where `create_*`/`write_buffer` calls live, since a frame replays
    /// per animation tick but resource creation must happen only at load.
    pub fn new(module: Arc<Module>, backend: B) -> Result<Self> {
        let strings = module.strings()?;
        let mut instructions = Vec::new();
        let mut frames = HashMap::new();
        let mut cursor = BytecodeCursor::new(module.bytecode());
        while let Some(instruction) = cursor.next_instruction()? {
            if instruction.opcode == Opcode::DefineFrame {
                if let [Operand::StringId(name_id), Operand::Int(start), Operand::Int(length)] =
                    instruction.operands[..]
                {
                    let name = strings.get(name_id)?.to_string();
                    frames.insert(name, (start as usize, length as usize));
                }
            }
            instructions.push(instruction);
        }

        let mut dispatcher = Dispatcher {
            module,
            backend,
            tables: Tables::new(),
            pass: PassContext::default(),
            diagnostics: Diagnostics::default(),
            last_error: None,
            frames,
            current_scene_time: SceneTime {
                elapsed_seconds: 0.0,
                delta_seconds: 0.0,
                frame_count: 0,
            },
        };

        for instruction in &instructions {
            let in_any_frame = dispatcher
                .frames
                .values()
                .any(|&(start, length)| instruction.offset >= start && instruction.offset < start + length);
            if instruction.opcode == Opcode::DefineFrame || in_any_frame {
                continue;
            }
            dispatcher.execute_one(instruction.opcode, &instruction.operands)?;
        }
        dispatcher.pass.reset();

        Ok(dispatcher)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The module this dispatcher was built from, for hosts that need to
    /// resolve a uniform field by name before calling [`Self::set_uniform`].
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn get_last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn reset_counters(&mut self) {
        self.diagnostics.reset_counters();
    }

    pub fn set_scene_time(&mut self, time: SceneTime) {
        self.current_scene_time = time;
    }

    /// Run the named frame's opcode range to completion, or until the first
    /// opcode fails. On failure the pass context is reset to `idle` and
    /// `last_error` is set; the frame counter is only advanced on success.
    pub fn execute_frame(&mut self, name: &str) -> Result<()> {
        let (start, length) = *self
            .frames
            .get(name)
            .ok_or_else(|| Error::InvalidArgument(format!("no frame named {name:?}")))?;
        let bytecode = self.module.bytecode();
        let end = start
            .checked_add(length)
            .filter(|&e| e <= bytecode.len())
            .ok_or_else(|| Error::InvalidArgument("frame range out of bounds".to_string()))?;
        let slice = bytecode[start..end].to_vec();

        let result = self.run_instructions(&slice);
        if let Err(err) = &result {
            log::error!("frame {name:?} aborted: {err}");
            self.last_error = Some(err.clone());
            self.pass.reset();
            return result;
        }
        self.pass.reset();
        self.diagnostics.record_frame_success();
        log::debug!("frame {name:?} complete ({} bytes)", slice.len());
        Ok(())
    }

    fn run_instructions(&mut self, slice: &[u8]) -> Result<()> {
        let mut cursor = BytecodeCursor::new(slice);
        while let Some(instruction) = cursor.next_instruction()? {
            self.execute_one(instruction.opcode, &instruction.operands)?;
        }
        Ok(())
    }

    fn execute_one(&mut self, opcode: Opcode, operands: &[Operand]) -> Result<()> {
        let byte = opcode.as_byte();
        if opcode.is_creation() {
            self.pass.require_idle(byte)?;
        }
        if opcode.is_render_pass_only() {
            self.pass.require_render(byte)?;
        }
        if opcode.is_compute_pass_only() {
            self.pass.require_compute(byte)?;
        }
        if opcode.is_any_pass_only() {
            self.pass.require_any_pass(byte)?;
        }

        match opcode {
            Opcode::CreateBuffer => {
                let (size, usage, pool) = as_int3(operands);
                let desc = descriptors::decode_buffer_descriptor(size, usage, pool);
                let handles: Result<Vec<_>> = (0..desc.pool)
                    .map(|_| self.backend.create_buffer(&desc).map_err(backend_err))
                    .collect();
                let id = self.tables.buffers.push_pool(handles?, desc.pool);
                self.diagnostics.record_buffer_0_size(id, desc.size);
            }
            Opcode::CreateTexture => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_texture_descriptor(blob)?;
                let handle = self.backend.create_texture(&desc).map_err(backend_err)?;
                self.tables.textures.push(handle);
            }
            Opcode::CreateTextureView => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_texture_view_descriptor(blob)?;
                let texture = self.tables.textures.get(desc.texture_id)?;
                let handle = self
                    .backend
                    .create_texture_view(texture, &desc)
                    .map_err(backend_err)?;
                self.tables.texture_views.push(handle);
            }
            Opcode::CreateSampler => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_sampler_descriptor(blob)?;
                let handle = self.backend.create_sampler(&desc).map_err(backend_err)?;
                self.tables.samplers.push(handle);
            }
            Opcode::CreateShaderModule => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                self.check_uniform_layout(blob)?;
                let desc = descriptors::decode_shader_module_descriptor(blob)?;
                let handle = self
                    .backend
                    .create_shader_module(&desc)
                    .map_err(|e| Error::ShaderCompile(e.to_string()))?;
                self.tables.shader_modules.push(handle);
            }
            Opcode::CreateBindGroupLayout => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc: BindGroupLayoutDescriptor =
                    descriptors::decode_bind_group_layout_descriptor(blob);
                let handle = self
                    .backend
                    .create_bind_group_layout(&desc)
                    .map_err(backend_err)?;
                self.tables.bind_group_layouts.push(handle);
            }
            Opcode::CreatePipelineLayout => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_pipeline_layout_descriptor(blob)?;
                let handle = self
                    .backend
                    .create_pipeline_layout(&desc)
                    .map_err(backend_err)?;
                self.tables.pipeline_layouts.push(handle);
            }
            Opcode::CreateBindGroup => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_bind_group_descriptor(blob)?;
                let handle = self.backend.create_bind_group(&desc).map_err(backend_err)?;
                self.tables.bind_groups.push(handle);
            }
            Opcode::CreateRenderPipeline => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc =
                    descriptors::decode_render_pipeline_descriptor(blob, &self.module.strings()?)?;
                let handle = self
                    .backend
                    .create_render_pipeline(&desc)
                    .map_err(|e| Error::PipelineCreate(e.to_string()))?;
                self.tables.render_pipelines.push(handle);
            }
            Opcode::CreateComputePipeline => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_compute_pipeline_descriptor(
                    blob,
                    &self.module.strings()?,
                )?;
                let handle = self
                    .backend
                    .create_compute_pipeline(&desc)
                    .map_err(|e| Error::PipelineCreate(e.to_string()))?;
                self.tables.compute_pipelines.push(handle);
            }
            Opcode::CreateQuerySet => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_query_set_descriptor(blob)?;
                let handle = self.backend.create_query_set(&desc).map_err(backend_err)?;
                self.tables.query_sets.push(handle);
            }
            Opcode::CreateRenderBundle => {
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_render_bundle_descriptor(blob);
                let handle = self
                    .backend
                    .create_render_bundle(&desc)
                    .map_err(backend_err)?;
                self.tables.render_bundles.push(handle);
            }
            Opcode::CreateImageBitmap => {
                let source = self.module.strings()?.get(as_string_id(operands)?)?.to_string();
                let handle = self
                    .backend
                    .create_image_bitmap(&source)
                    .map_err(backend_err)?;
                self.tables.image_bitmaps.push(handle);
            }
            Opcode::WriteBuffer => {
                let (buffer_id, data_id) = as_int_data(operands)?;
                let buffer = self.tables.buffers.get(buffer_id)?;
                let bytes = self.module.data()?.get(data_id)?;
                self.backend
                    .write_buffer(buffer, 0, bytes)
                    .map_err(backend_err)?;
            }
            Opcode::WriteTimeUniform => {
                let (buffer_id, offset, size) = as_int3(operands);
                let buffer = self.tables.buffers.get(buffer_id)?;
                let bytes = self.current_scene_time.to_bytes();
                let size = (size as usize).min(bytes.len());
                self.backend
                    .write_buffer(buffer, offset as u64, &bytes[..size])
                    .map_err(backend_err)?;
            }
            Opcode::CopyExternalImageToTexture => {
                let (bitmap_id, texture_id) = as_int_int(operands);
                let bitmap = self.tables.image_bitmaps.get(bitmap_id)?;
                let texture = self.tables.textures.get(texture_id)?;
                self.backend
                    .copy_external_image_to_texture(bitmap, texture)
                    .map_err(backend_err)?;
            }
            Opcode::BeginRenderPass => {
                self.pass.begin_render(byte)?;
                let blob = self.module.data()?.get(as_data_id(operands)?)?;
                let desc = descriptors::decode_render_pass_descriptor(blob)?;
                self.backend
                    .begin_render_pass(&desc)
                    .map_err(|e| Error::RenderFailed(e.to_string()))?;
                self.diagnostics.record_render_pass_begin();
            }
            Opcode::SetPipeline => {
                let pipeline_id = as_single(operands);
                match self.pass.kind() {
                    crate::pass::PassKind::Compute => {
                        let pipeline = self.tables.compute_pipelines.get(pipeline_id)?;
                        self.backend
                            .set_compute_pipeline(pipeline)
                            .map_err(backend_err)?;
                        self.diagnostics.record_compute_pipeline_set();
                    }
                    _ => {
                        let pipeline = self.tables.render_pipelines.get(pipeline_id)?;
                        self.backend.set_pipeline(pipeline).map_err(backend_err)?;
                    }
                }
                self.pass.set_pipeline(pipeline_id);
            }
            Opcode::SetBindGroup => {
                let (slot, bind_group_id) = as_int_int(operands);
                let bind_group = self.tables.bind_groups.get(bind_group_id)?;
                self.backend
                    .set_bind_group(slot, bind_group)
                    .map_err(backend_err)?;
                self.pass.set_bind_group(slot, bind_group_id);
                self.diagnostics
                    .record_bind_group_set(self.pass.kind() == crate::pass::PassKind::Compute, bind_group_id);
            }
            Opcode::SetBindGroupPool => {
                let (slot, base_id, offset) = as_int3(operands);
                let bind_group = self.tables.bind_groups.resolve(base_id, offset)?;
                self.backend
                    .set_bind_group(slot, bind_group)
                    .map_err(backend_err)?;
                self.pass.set_bind_group(slot, base_id);
            }
            Opcode::SetVertexBuffer => {
                let (slot, buffer_id) = as_int_int(operands);
                let buffer = self.tables.buffers.get(buffer_id)?;
                self.backend
                    .set_vertex_buffer(slot, buffer)
                    .map_err(backend_err)?;
                self.pass.set_vertex_buffer(slot, buffer_id);
                self.diagnostics.record_vertex_buffer_set(buffer_id);
            }
            Opcode::SetVertexBufferPool => {
                let (slot, base_id, offset) = as_int3(operands);
                let buffer = self.tables.buffers.resolve(base_id, offset)?;
                self.backend
                    .set_vertex_buffer(slot, buffer)
                    .map_err(backend_err)?;
                self.pass.set_vertex_buffer(slot, base_id);
                self.diagnostics.record_vertex_buffer_set(base_id);
            }
            Opcode::SetIndexBuffer => {
                let buffer_id = as_single(operands);
                let buffer = self.tables.buffers.get(buffer_id)?;
                self.backend.set_index_buffer(buffer).map_err(backend_err)?;
                self.pass.set_index_buffer(buffer_id);
            }
            Opcode::Draw => {
                let (vertex_count, instance_count) = as_int_int(operands);
                self.backend
                    .draw(vertex_count, instance_count)
                    .map_err(|e| Error::RenderFailed(e.to_string()))?;
                self.diagnostics.record_draw(vertex_count, instance_count);
            }
            Opcode::DrawIndexed => {
                let (index_count, instance_count) = as_int_int(operands);
                self.backend
                    .draw_indexed(index_count, instance_count)
                    .map_err(|e| Error::RenderFailed(e.to_string()))?;
                self.diagnostics.record_draw(index_count, instance_count);
            }
            Opcode::ExecuteBundles => {
                let bundle_id = as_single(operands);
                let bundle = self.tables.render_bundles.get(bundle_id)?;
                self.backend
                    .execute_bundles(&[bundle])
                    .map_err(|e| Error::RenderFailed(e.to_string()))?;
            }
            Opcode::EndPass => {
                let was_compute = self.pass.kind() == crate::pass::PassKind::Compute;
                self.pass.end_pass(byte)?;
                if was_compute {
                    self.backend.end_compute_pass().map_err(backend_err)?;
                } else {
                    self.backend.end_render_pass().map_err(backend_err)?;
                }
            }
            Opcode::BeginComputePass => {
                self.pass.begin_compute(byte)?;
                self.backend
                    .begin_compute_pass(&ComputePassDescriptor)
                    .map_err(|e| Error::ComputeFailed(e.to_string()))?;
                self.diagnostics.record_compute_pass_begin();
            }
            Opcode::Dispatch => {
                let (x, y, z) = as_int3(operands);
                self.backend
                    .dispatch(x, y, z)
                    .map_err(|e| Error::ComputeFailed(e.to_string()))?;
                self.diagnostics.record_dispatch(x);
            }
            Opcode::DefineFrame => {
                // Resolved into `self.frames` at construction; a no-op during
                // replay other than as a position marker.
            }
            Opcode::EndFrame => {}
            Opcode::Submit => {
                self.backend.submit().map_err(backend_err)?;
            }
        }
        Ok(())
    }

    /// Best-effort, non-authoritative cross-check: if `blob` is a
    /// pre-reflected shader module (`SPEC_FULL.md` §4.9), every
    /// `{group, binding, total_size}` hint it carries is checked against
    /// the module's uniform table, failing fast with `InvalidArgument`
    /// rather than deferring to a cryptic backend `ShaderCompile`/
    /// `PipelineCreate` failure later. Blobs with no hints pass trivially —
    /// this never blocks a module that doesn't use the convention.
    pub fn check_uniform_layout(&self, blob: &[u8]) -> Result<()> {
        let Some(hints) = descriptors::parse_reflection_hints(blob) else {
            return Ok(());
        };
        let uniforms = self.module.uniforms()?;
        for hint in hints {
            if let Some(binding) = uniforms.find(hint.group, hint.binding) {
                if binding.total_size != hint.total_size {
                    return Err(Error::InvalidArgument(format!(
                        "shader module declares uniform binding (group={}, binding={}) of size {} bytes, but the module's uniform table has {} bytes",
                        hint.group, hint.binding, hint.total_size, binding.total_size
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up `name` in the module's uniform table and write `bytes` into
    /// the associated buffer at the field's offset, if the size matches
    /// (`spec.md` §6.5 `set_uniform`).
    pub fn set_uniform(&mut self, group: u8, binding: u8, name_id: u16, bytes: &[u8]) -> Result<()> {
        let uniforms = self.module.uniforms()?;
        let table_binding = uniforms
            .find(group, binding)
            .ok_or(Error::ResourceNotFound {
                class: "uniform_binding",
                id: binding as u32,
                len: uniforms.len(),
            })?;
        let field = table_binding
            .field(name_id)
            .ok_or(Error::ResourceNotFound {
                class: "uniform_field",
                id: name_id as u32,
                len: table_binding.fields.len(),
            })?;
        if field.size as usize != bytes.len() {
            return Err(Error::InvalidArgument(format!(
                "uniform field size {} does not match write of {} bytes",
                field.size,
                bytes.len()
            )));
        }
        let buffer = self.tables.buffers.get(binding as u32)?;
        self.backend
            .write_buffer(buffer, field.offset as u64, bytes)
            .map_err(backend_err)
    }

    /// Release every created backend handle in reverse creation order per
    /// class (`spec.md` §3.3 ownership note).
    pub fn destroy(mut self) {
        macro_rules! destroy_all {
            ($table:expr, $method:ident) => {
                for handle in $table.handles_in_creation_order().iter().rev() {
                    self.backend.$method(*handle);
                }
            };
        }
        destroy_all!(self.tables.render_bundles, destroy_render_bundle);
        destroy_all!(self.tables.compute_pipelines, destroy_compute_pipeline);
        destroy_all!(self.tables.render_pipelines, destroy_render_pipeline);
        destroy_all!(self.tables.bind_groups, destroy_bind_group);
        destroy_all!(self.tables.pipeline_layouts, destroy_pipeline_layout);
        destroy_all!(self.tables.bind_group_layouts, destroy_bind_group_layout);
        destroy_all!(self.tables.query_sets, destroy_query_set);
        destroy_all!(self.tables.image_bitmaps, destroy_image_bitmap);
        destroy_all!(self.tables.samplers, destroy_sampler);
        destroy_all!(self.tables.shader_modules, destroy_shader_module);
        destroy_all!(self.tables.texture_views, destroy_texture_view);
        destroy_all!(self.tables.textures, destroy_texture);
        destroy_all!(self.tables.buffers, destroy_buffer);
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> Error {
    Error::InvalidArgument(e.to_string())
}

fn as_single(operands: &[Operand]) -> u32 {
    match operands.first() {
        Some(Operand::Int(v)) => *v,
        _ => 0,
    }
}

fn as_int_int(operands: &[Operand]) -> (u32, u32) {
    let a = match operands.first() {
        Some(Operand::Int(v)) => *v,
        _ => 0,
    };
    let b = match operands.get(1) {
        Some(Operand::Int(v)) => *v,
        _ => 0,
    };
    (a, b)
}

fn as_int3(operands: &[Operand]) -> (u32, u32, u32) {
    let (a, b) = as_int_int(operands);
    let c = match operands.get(2) {
        Some(Operand::Int(v)) => *v,
        _ => 1,
    };
    (a, b, c)
}

fn as_int_data(operands: &[Operand]) -> Result<(u32, u16)> {
    let a = match operands.first() {
        Some(Operand::Int(v)) => *v,
        _ => 0,
    };
    let b = as_data_id(&operands[1..])?;
    Ok((a, b))
}

fn as_data_id(operands: &[Operand]) -> Result<u16> {
    match operands.first() {
        Some(Operand::DataId(id)) => Ok(*id),
        _ => Err(Error::InvalidArgument("expected a data-blob operand".to_string())),
    }
}

fn as_string_id(operands: &[Operand]) -> Result<u16> {
    match operands.first() {
        Some(Operand::StringId(id)) => Ok(*id),
        _ => Err(Error::InvalidArgument("expected a string operand".to_string())),
    }
}
