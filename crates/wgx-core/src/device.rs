//! The `Device`: owns one backend's open HAL device, its resource
//! registries, and its error-scope stack (§4.2).

use crate::error::{Error, ErrorFilter, Result};
use crate::hub::Registry;
use crate::id::Id;
use crate::resource::{
    BindGroup, BindGroupLayout, Buffer, CommandBuffer, ComputePipeline, Guarded, PipelineLayout,
    QuerySet, RenderBundle, RenderPipeline, Sampler, ShaderModule, Texture, TextureView,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use wgx_hal::buffer::BufferDescriptor;
use wgx_hal::image::{SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::pso::{
    BindGroupDescriptor as HalBindGroupDescriptor, BindGroupEntry as HalBindGroupEntry,
    BindGroupLayoutDescriptor, BoundResource, ColorTargetState, ComputePipelineDescriptor as HalComputePipelineDescriptor,
    DepthStencilState, PipelineLayoutDescriptor, PrimitiveState,
    ProgrammableStage, RenderPipelineDescriptor as HalRenderPipelineDescriptor, ShaderModuleDescriptor,
    VertexBufferLayout,
};
use wgx_hal::query::QuerySetDescriptor;

/// One level of the error-scope stack. `captured` fills in lazily on the
/// first error of its matching kind; later errors of the same filter are
/// dropped (only the first is reported, matching the WebGPU error-scope
/// contract).
struct ErrorScope {
    filter: ErrorFilter,
    captured: Option<Error>,
}

/// An open logical device for one backend instance.
pub struct Device<A: wgx_hal::Api> {
    pub label: String,
    pub features: Features,
    pub downlevel: DownlevelFlags,
    pub limits: Limits,
    pub(crate) hal: A::Device,
    lost: AtomicBool,
    scopes: Mutex<Vec<ErrorScope>>,

    pub(crate) buffers: Registry<Buffer<A>>,
    pub(crate) textures: Registry<Texture<A>>,
    pub(crate) texture_views: Registry<TextureView<A>>,
    pub(crate) samplers: Registry<Sampler<A>>,
    pub(crate) shader_modules: Registry<ShaderModule<A>>,
    pub(crate) bind_group_layouts: Registry<BindGroupLayout<A>>,
    pub(crate) bind_groups: Registry<BindGroup<A>>,
    pub(crate) pipeline_layouts: Registry<PipelineLayout<A>>,
    pub(crate) render_pipelines: Registry<RenderPipeline<A>>,
    pub(crate) compute_pipelines: Registry<ComputePipeline<A>>,
    pub(crate) query_sets: Registry<QuerySet<A>>,
    pub(crate) command_buffers: Registry<CommandBuffer<A>>,
    pub(crate) render_bundles: Registry<RenderBundle<A>>,
}

/// One entry passed to `Device::create_bind_group`, referencing its bound
/// resource by `Id` rather than by raw handle.
pub enum BindGroupEntryDesc<A: wgx_hal::Api> {
    Buffer {
        binding: u32,
        buffer: Id<Buffer<A>>,
        offset: u64,
        size: Option<u64>,
    },
    TextureView {
        binding: u32,
        view: Id<TextureView<A>>,
    },
    Sampler {
        binding: u32,
        sampler: Id<Sampler<A>>,
    },
}

/// A shader stage's entry point, naming its module by `Id`.
pub struct ProgrammableStageDesc<A: wgx_hal::Api> {
    pub module: Id<ShaderModule<A>>,
    pub entry_point: String,
}

/// Descriptor passed to `Device::create_render_pipeline`, naming its
/// layout and shader modules by `Id` rather than by raw handle.
pub struct RenderPipelineDesc<'a, A: wgx_hal::Api> {
    pub label: Option<&'a str>,
    pub layout: Id<PipelineLayout<A>>,
    pub vertex: ProgrammableStageDesc<A>,
    pub vertex_buffers: &'a [VertexBufferLayout<'a>],
    pub fragment: Option<ProgrammableStageDesc<A>>,
    pub color_targets: &'a [ColorTargetState],
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
    pub sample_count: u32,
}

/// Descriptor passed to `Device::create_compute_pipeline`, naming its
/// layout and shader module by `Id`.
pub struct ComputePipelineDesc<'a, A: wgx_hal::Api> {
    pub label: Option<&'a str>,
    pub layout: Id<PipelineLayout<A>>,
    pub compute: ProgrammableStageDesc<A>,
}

impl<A: wgx_hal::Api> Device<A> {
    pub(crate) fn new(
        label: String,
        hal: A::Device,
        features: Features,
        downlevel: DownlevelFlags,
        limits: Limits,
    ) -> Self {
        Device {
            label,
            features,
            downlevel,
            limits,
            hal,
            lost: AtomicBool::new(false),
            scopes: Mutex::new(Vec::new()),
            buffers: Registry::new(),
            textures: Registry::new(),
            texture_views: Registry::new(),
            samplers: Registry::new(),
            shader_modules: Registry::new(),
            bind_group_layouts: Registry::new(),
            bind_groups: Registry::new(),
            pipeline_layouts: Registry::new(),
            render_pipelines: Registry::new(),
            compute_pipelines: Registry::new(),
            query_sets: Registry::new(),
            command_buffers: Registry::new(),
            render_bundles: Registry::new(),
        }
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    pub(crate) fn mark_lost(&self) {
        self.lost.store(true, Ordering::Release);
    }

    /// Push a new error scope matching `filter` onto this device's stack.
    pub fn push_error_scope(&self, filter: ErrorFilter) {
        self.scopes.lock().push(ErrorScope {
            filter,
            captured: None,
        });
    }

    /// Pop the innermost error scope, returning whatever error it captured
    /// (or `None` if the scope ran clean).
    ///
    /// Popping a scope that does not exist is a validation error per the
    /// spec's own framing, not a panic: callers may race a `push`/`pop`
    /// pair against `lost()`.
    pub fn pop_error_scope(&self) -> Result<Option<Error>> {
        match self.scopes.lock().pop() {
            Some(scope) => Ok(scope.captured),
            None => Err(Error::Validation("no error scope is open".into())),
        }
    }

    /// Route `err` through the scope stack: the innermost scope whose
    /// filter matches captures it (first match wins, first error per scope
    /// wins); if no open scope matches, the error is handed back to the
    /// caller unchanged.
    fn report(&self, err: Error) -> Error {
        if let Some(filter) = err.filter() {
            let mut scopes = self.scopes.lock();
            for scope in scopes.iter_mut().rev() {
                if scope.filter == filter {
                    if scope.captured.is_none() {
                        scope.captured = Some(err.clone());
                    }
                    return err;
                }
            }
        }
        err
    }

    fn check_live(&self) -> Result<()> {
        if self.is_lost() {
            Err(Error::DeviceLost)
        } else {
            Ok(())
        }
    }

    pub fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<Id<Buffer<A>>> {
        self.check_live()?;
        let hal_buffer = unsafe { self.hal.create_buffer(desc) }.map_err(|e| self.report(e.into()))?;
        let buffer = Buffer {
            label: desc.label.map(String::from).unwrap_or_default(),
            size: desc.size,
            usage: desc.usage,
            raw: Guarded::new(hal_buffer),
        };
        Ok(self.buffers.insert(buffer))
    }

    pub fn destroy_buffer(&self, id: Id<Buffer<A>>) -> Result<()> {
        let buffer = self.buffers.release(id)?;
        if let Some(raw) = buffer.raw.take() {
            unsafe { self.hal.destroy_buffer(raw) };
        }
        Ok(())
    }

    pub fn create_texture(&self, desc: &TextureDescriptor<'_>) -> Result<Id<Texture<A>>> {
        self.check_live()?;
        let hal_texture = unsafe { self.hal.create_texture(desc) }.map_err(|e| self.report(e.into()))?;
        let texture = Texture {
            label: desc.label.map(String::from).unwrap_or_default(),
            size: desc.size,
            mip_level_count: desc.mip_level_count,
            sample_count: desc.sample_count,
            dimension: desc.dimension,
            format: desc.format,
            usage: desc.usage,
            raw: Guarded::new(hal_texture),
        };
        Ok(self.textures.insert(texture))
    }

    pub fn destroy_texture(&self, id: Id<Texture<A>>) -> Result<()> {
        let texture = self.textures.release(id)?;
        if let Some(raw) = texture.raw.take() {
            unsafe { self.hal.destroy_texture(raw) };
        }
        Ok(())
    }

    pub fn create_texture_view(
        &self,
        parent: Id<Texture<A>>,
        desc: &TextureViewDescriptor<'_>,
    ) -> Result<Id<TextureView<A>>> {
        self.check_live()?;
        let texture = self.textures.get(parent)?;
        if !desc.range.within(texture.mip_level_count, texture.size.depth_or_array_layers) {
            return Err(self.report(Error::Validation(
                "texture view subresource range exceeds the parent texture's extent".into(),
            )));
        }
        let texture_raw = texture.raw.get()?;
        let hal_view = unsafe { self.hal.create_texture_view(&texture_raw, desc) }
            .map_err(|e| self.report(e.into()))?;
        drop(texture_raw);
        let view = TextureView {
            label: desc.label.map(String::from).unwrap_or_default(),
            parent,
            range: desc.range,
            raw: Guarded::new(hal_view),
        };
        Ok(self.texture_views.insert(view))
    }

    pub fn destroy_texture_view(&self, id: Id<TextureView<A>>) -> Result<()> {
        let view = self.texture_views.release(id)?;
        if let Some(raw) = view.raw.take() {
            unsafe { self.hal.destroy_texture_view(raw) };
        }
        Ok(())
    }

    pub fn create_sampler(&self, desc: &SamplerDescriptor<'_>) -> Result<Id<Sampler<A>>> {
        self.check_live()?;
        let hal_sampler = unsafe { self.hal.create_sampler(desc) }.map_err(|e| self.report(e.into()))?;
        let sampler = Sampler {
            label: desc.label.map(String::from).unwrap_or_default(),
            raw: Guarded::new(hal_sampler),
        };
        Ok(self.samplers.insert(sampler))
    }

    pub fn destroy_sampler(&self, id: Id<Sampler<A>>) -> Result<()> {
        let sampler = self.samplers.release(id)?;
        if let Some(raw) = sampler.raw.take() {
            unsafe { self.hal.destroy_sampler(raw) };
        }
        Ok(())
    }

    pub fn create_shader_module(&self, desc: &ShaderModuleDescriptor<'_>) -> Result<Id<ShaderModule<A>>> {
        self.check_live()?;
        let hal_module = unsafe { self.hal.create_shader_module(desc) }.map_err(|e| self.report(e.into()))?;
        let module = ShaderModule {
            label: desc.label.map(String::from).unwrap_or_default(),
            raw: Guarded::new(hal_module),
        };
        Ok(self.shader_modules.insert(module))
    }

    pub fn destroy_shader_module(&self, id: Id<ShaderModule<A>>) -> Result<()> {
        let module = self.shader_modules.release(id)?;
        if let Some(raw) = module.raw.take() {
            unsafe { self.hal.destroy_shader_module(raw) };
        }
        Ok(())
    }

    pub fn create_bind_group_layout(
        &self,
        desc: &BindGroupLayoutDescriptor<'_>,
    ) -> Result<Id<BindGroupLayout<A>>> {
        self.check_live()?;
        let hal_layout =
            unsafe { self.hal.create_bind_group_layout(desc) }.map_err(|e| self.report(e.into()))?;
        let layout = BindGroupLayout {
            label: desc.label.map(String::from).unwrap_or_default(),
            entries: desc.entries.to_vec(),
            raw: Guarded::new(hal_layout),
        };
        Ok(self.bind_group_layouts.insert(layout))
    }

    pub fn destroy_bind_group_layout(&self, id: Id<BindGroupLayout<A>>) -> Result<()> {
        let layout = self.bind_group_layouts.release(id)?;
        if let Some(raw) = layout.raw.take() {
            unsafe { self.hal.destroy_bind_group_layout(raw) };
        }
        Ok(())
    }

    pub fn create_pipeline_layout(
        &self,
        label: Option<&str>,
        layout_ids: &[Id<BindGroupLayout<A>>],
    ) -> Result<Id<PipelineLayout<A>>> {
        self.check_live()?;
        let layouts = layout_ids
            .iter()
            .map(|&id| self.bind_group_layouts.get(id))
            .collect::<Result<Vec<_>>>()?;
        let guards = layouts
            .iter()
            .map(|l| l.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&A::BindGroupLayout> = guards.iter().map(|g| &**g).collect();
        let desc = PipelineLayoutDescriptor {
            label: label.map(std::borrow::Cow::Borrowed),
            bind_group_layouts: std::borrow::Cow::Borrowed(refs.as_slice()),
        };
        let hal_layout =
            unsafe { self.hal.create_pipeline_layout(&desc) }.map_err(|e| self.report(e.into()))?;
        drop(guards);
        let layout = PipelineLayout {
            label: label.map(String::from).unwrap_or_default(),
            bind_group_layouts: layout_ids.to_vec(),
            raw: Guarded::new(hal_layout),
        };
        Ok(self.pipeline_layouts.insert(layout))
    }

    pub fn destroy_pipeline_layout(&self, id: Id<PipelineLayout<A>>) -> Result<()> {
        let layout = self.pipeline_layouts.release(id)?;
        if let Some(raw) = layout.raw.take() {
            unsafe { self.hal.destroy_pipeline_layout(raw) };
        }
        Ok(())
    }

    pub fn create_render_pipeline(&self, desc: &RenderPipelineDesc<'_, A>) -> Result<Id<RenderPipeline<A>>> {
        self.check_live()?;
        if desc.fragment.is_none() && !desc.color_targets.is_empty() {
            return Err(self.report(Error::Validation(
                "color targets given without a fragment stage".into(),
            )));
        }
        let layout = self.pipeline_layouts.get(desc.layout)?;
        let vertex_module = self.shader_modules.get(desc.vertex.module)?;
        let fragment_module = desc.fragment.as_ref().map(|f| self.shader_modules.get(f.module)).transpose()?;

        let layout_raw = layout.raw.get()?;
        let vertex_raw = vertex_module.raw.get()?;
        let fragment_raw = fragment_module.as_ref().map(|m| m.raw.get()).transpose()?;

        let hal_desc = HalRenderPipelineDescriptor {
            label: desc.label.map(std::borrow::Cow::Borrowed),
            layout: &*layout_raw,
            vertex: ProgrammableStage {
                module: &*vertex_raw,
                entry_point: std::borrow::Cow::Borrowed(desc.vertex.entry_point.as_str()),
            },
            vertex_buffers: std::borrow::Cow::Borrowed(desc.vertex_buffers),
            fragment: desc.fragment.as_ref().map(|f| ProgrammableStage {
                module: &**fragment_raw.as_ref().expect("resolved alongside desc.fragment"),
                entry_point: std::borrow::Cow::Borrowed(f.entry_point.as_str()),
            }),
            color_targets: std::borrow::Cow::Borrowed(desc.color_targets),
            depth_stencil: desc.depth_stencil,
            primitive: desc.primitive,
            sample_count: desc.sample_count,
        };
        let hal_pipeline =
            unsafe { self.hal.create_render_pipeline(&hal_desc) }.map_err(|e| self.report(e.into()))?;
        drop((layout_raw, vertex_raw, fragment_raw));
        let pipeline = RenderPipeline {
            label: desc.label.map(String::from).unwrap_or_default(),
            layout: desc.layout,
            raw: Guarded::new(hal_pipeline),
        };
        Ok(self.render_pipelines.insert(pipeline))
    }

    pub fn destroy_render_pipeline(&self, id: Id<RenderPipeline<A>>) -> Result<()> {
        let pipeline = self.render_pipelines.release(id)?;
        if let Some(raw) = pipeline.raw.take() {
            unsafe { self.hal.destroy_render_pipeline(raw) };
        }
        Ok(())
    }

    pub fn create_compute_pipeline(&self, desc: &ComputePipelineDesc<'_, A>) -> Result<Id<ComputePipeline<A>>> {
        self.check_live()?;
        if !self.downlevel.contains(DownlevelFlags::COMPUTE_SHADERS) {
            return Err(self.report(Error::Validation(
                "this backend does not support compute pipelines".into(),
            )));
        }
        let layout = self.pipeline_layouts.get(desc.layout)?;
        let module = self.shader_modules.get(desc.compute.module)?;
        let layout_raw = layout.raw.get()?;
        let module_raw = module.raw.get()?;

        let hal_desc = HalComputePipelineDescriptor {
            label: desc.label.map(std::borrow::Cow::Borrowed),
            layout: &*layout_raw,
            compute: ProgrammableStage {
                module: &*module_raw,
                entry_point: std::borrow::Cow::Borrowed(desc.compute.entry_point.as_str()),
            },
        };
        let hal_pipeline =
            unsafe { self.hal.create_compute_pipeline(&hal_desc) }.map_err(|e| self.report(e.into()))?;
        drop((layout_raw, module_raw));
        let pipeline = ComputePipeline {
            label: desc.label.map(String::from).unwrap_or_default(),
            layout: desc.layout,
            raw: Guarded::new(hal_pipeline),
        };
        Ok(self.compute_pipelines.insert(pipeline))
    }

    pub fn destroy_compute_pipeline(&self, id: Id<ComputePipeline<A>>) -> Result<()> {
        let pipeline = self.compute_pipelines.release(id)?;
        if let Some(raw) = pipeline.raw.take() {
            unsafe { self.hal.destroy_compute_pipeline(raw) };
        }
        Ok(())
    }

    pub fn create_query_set(&self, desc: &QuerySetDescriptor<'_>) -> Result<Id<QuerySet<A>>> {
        self.check_live()?;
        let hal_set = unsafe { self.hal.create_query_set(desc) }.map_err(|e| self.report(e.into()))?;
        let set = QuerySet {
            label: desc.label.map(String::from).unwrap_or_default(),
            ty: desc.ty,
            count: desc.count,
            raw: Guarded::new(hal_set),
        };
        Ok(self.query_sets.insert(set))
    }

    pub fn destroy_query_set(&self, id: Id<QuerySet<A>>) -> Result<()> {
        let set = self.query_sets.release(id)?;
        if let Some(raw) = set.raw.take() {
            unsafe { self.hal.destroy_query_set(raw) };
        }
        Ok(())
    }

    /// Resolve `entries` by `Id`, retain an `Arc` to every bound resource
    /// (so the bind group keeps each one alive for as long as it lives),
    /// and hand the HAL borrowed references to the live handles.
    pub fn create_bind_group(
        &self,
        label: Option<&str>,
        layout_id: Id<BindGroupLayout<A>>,
        entries: &[BindGroupEntryDesc<A>],
    ) -> Result<Id<BindGroup<A>>> {
        self.check_live()?;
        let layout = self.bind_group_layouts.get(layout_id)?;
        let layout_raw = layout.raw.get()?;

        enum Slot {
            Buffer { binding: u32, idx: usize, offset: u64, size: Option<u64> },
            View { binding: u32, idx: usize },
            Sampler { binding: u32, idx: usize },
        }

        let mut used_buffers = Vec::new();
        let mut used_views = Vec::new();
        let mut used_samplers = Vec::new();
        let mut slots = Vec::with_capacity(entries.len());

        for entry in entries {
            match *entry {
                BindGroupEntryDesc::Buffer { binding, buffer, offset, size } => {
                    let arc = self.buffers.get(buffer)?;
                    used_buffers.push(arc);
                    slots.push(Slot::Buffer {
                        binding,
                        idx: used_buffers.len() - 1,
                        offset,
                        size,
                    });
                }
                BindGroupEntryDesc::TextureView { binding, view } => {
                    let arc = self.texture_views.get(view)?;
                    used_views.push(arc);
                    slots.push(Slot::View {
                        binding,
                        idx: used_views.len() - 1,
                    });
                }
                BindGroupEntryDesc::Sampler { binding, sampler } => {
                    let arc = self.samplers.get(sampler)?;
                    used_samplers.push(arc);
                    slots.push(Slot::Sampler {
                        binding,
                        idx: used_samplers.len() - 1,
                    });
                }
            }
        }

        // `used_*` no longer grow past this point, so guards borrowed from
        // their elements stay valid for the rest of this call.
        let buffer_guards = used_buffers
            .iter()
            .map(|b| b.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let view_guards = used_views
            .iter()
            .map(|v| v.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let sampler_guards = used_samplers
            .iter()
            .map(|s| s.raw.get())
            .collect::<Result<Vec<_>>>()?;

        let hal_entries: Vec<HalBindGroupEntry<&A::Buffer, &A::TextureView, &A::Sampler>> = slots
            .iter()
            .map(|slot| match *slot {
                Slot::Buffer { binding, idx, offset, size } => HalBindGroupEntry {
                    binding,
                    resource: BoundResource::Buffer {
                        buffer: &*buffer_guards[idx],
                        offset,
                        size,
                    },
                },
                Slot::View { binding, idx } => HalBindGroupEntry {
                    binding,
                    resource: BoundResource::TextureView(&*view_guards[idx]),
                },
                Slot::Sampler { binding, idx } => HalBindGroupEntry {
                    binding,
                    resource: BoundResource::Sampler(&*sampler_guards[idx]),
                },
            })
            .collect();

        let hal_desc = HalBindGroupDescriptor {
            label: label.map(std::borrow::Cow::Borrowed),
            layout: &*layout_raw,
            entries: std::borrow::Cow::Borrowed(hal_entries.as_slice()),
        };
        let hal_group =
            unsafe { self.hal.create_bind_group(&hal_desc) }.map_err(|e| self.report(e.into()))?;
        drop(hal_entries);
        drop((buffer_guards, view_guards, sampler_guards, layout_raw));

        let group = BindGroup {
            label: label.map(String::from).unwrap_or_default(),
            layout: layout_id,
            used_buffers,
            used_views,
            used_samplers,
            raw: Guarded::new(hal_group),
        };
        Ok(self.bind_groups.insert(group))
    }

    pub fn destroy_bind_group(&self, id: Id<BindGroup<A>>) -> Result<()> {
        let group = self.bind_groups.release(id)?;
        if let Some(raw) = group.raw.take() {
            unsafe { self.hal.destroy_bind_group(raw) };
        }
        Ok(())
    }

    /// Register a finished command buffer produced by `CommandEncoder::finish`.
    pub(crate) fn register_command_buffer(&self, label: String, raw: A::CommandBuffer) -> Id<CommandBuffer<A>> {
        self.command_buffers.insert(CommandBuffer {
            label,
            raw: Guarded::new(raw),
        })
    }

    /// Recycle a command buffer whose submission has already signaled, per
    /// `Device::free_command_buffer`. Called by `Queue::submit` once it has
    /// handed the raw buffers to the HAL.
    pub(crate) fn reclaim_command_buffer(&self, id: Id<CommandBuffer<A>>) -> Result<()> {
        let buffer = self.command_buffers.release(id)?;
        if let Some(raw) = buffer.raw.take() {
            unsafe { self.hal.free_command_buffer(raw) };
        }
        Ok(())
    }

    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.hal.wait_idle() }.map_err(|e| e.into())
    }

    /// Open a new recorder targeting `queue`'s command buffers.
    pub fn create_command_encoder(
        self: &std::sync::Arc<Self>,
        queue: &crate::queue::Queue<A>,
        label: impl Into<String>,
    ) -> Result<crate::command::CommandEncoder<A>> {
        self.check_live()?;
        let label = label.into();
        let queue_guard = queue.lock_hal();
        let desc = wgx_hal::command::CommandEncoderDescriptor {
            label: Some(std::borrow::Cow::Borrowed(label.as_str())),
            queue: &*queue_guard,
        };
        let hal_encoder =
            unsafe { self.hal.create_command_encoder(&desc) }.map_err(|e| self.report(e.into()))?;
        drop(queue_guard);
        crate::command::CommandEncoder::new(std::sync::Arc::clone(self), hal_encoder, label)
    }

    /// Open a new render bundle recorder, independent of any particular
    /// render pass.
    pub fn create_render_bundle_encoder(
        self: &std::sync::Arc<Self>,
        desc: &crate::bundle::RenderBundleEncoderDescriptor<'_>,
    ) -> Result<crate::bundle::RenderBundleEncoder<A>> {
        self.check_live()?;
        Ok(crate::bundle::RenderBundleEncoder::new(std::sync::Arc::clone(self), desc))
    }

    pub fn destroy_render_bundle(&self, id: Id<RenderBundle<A>>) -> Result<()> {
        self.render_bundles.release(id)?;
        Ok(())
    }
}

