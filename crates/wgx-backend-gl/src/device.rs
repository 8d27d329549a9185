//! `Device` and `Queue`: direct, immediate `glow` calls for every resource
//! creation method. Unlike `CommandEncoder` (which records an op list and
//! replays it at submission time, since GL has no command buffer object of
//! its own), resource creation has no reason to defer — the GL object names
//! `glCreate*` hands back are valid for the context's lifetime regardless of
//! when the resulting resource is first used.

use crate::instance::Surface;
use crate::resource::*;
use crate::GlApi;
use glow::HasContext;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use wgx_hal::buffer::{BufferDescriptor, BufferUses};
use wgx_hal::command::CommandEncoderDescriptor;
use wgx_hal::device::FenceValue;
use wgx_hal::error::{DeviceError, Result, SurfaceError, TimeoutError};
use wgx_hal::image::{Extent3d, ImageDataLayout, SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, BoundResource as HalBoundResource, ComputePipelineDescriptor,
    PipelineLayoutDescriptor, RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages,
};
use wgx_hal::query::QuerySetDescriptor;
use wgx_hal::window::AcquiredSurfaceTexture;

fn buffer_target(usage: BufferUses) -> u32 {
    if usage.contains(BufferUses::INDEX) {
        glow::ELEMENT_ARRAY_BUFFER
    } else if usage.contains(BufferUses::UNIFORM) {
        glow::UNIFORM_BUFFER
    } else {
        glow::ARRAY_BUFFER
    }
}

fn buffer_usage_hint(usage: BufferUses) -> u32 {
    if usage.intersects(BufferUses::MAP_WRITE | BufferUses::MAP_READ) {
        glow::DYNAMIC_DRAW
    } else {
        glow::STATIC_DRAW
    }
}

fn shader_stage_enum(stage: ShaderStages) -> Result<u32> {
    if stage.contains(ShaderStages::VERTEX) {
        Ok(glow::VERTEX_SHADER)
    } else if stage.contains(ShaderStages::FRAGMENT) {
        Ok(glow::FRAGMENT_SHADER)
    } else {
        Err(DeviceError::Other("GLSL shader source must declare exactly one of vertex/fragment".into()))
    }
}

pub struct Device {
    context: Arc<glow::Context>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish()
    }
}
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    pub(crate) fn new(context: Arc<glow::Context>) -> Self {
        Device { context }
    }
}

impl wgx_hal::device::Device<GlApi> for Device {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let gl = &self.context;
        let raw = gl.create_buffer().map_err(DeviceError::Other)?;
        let target = buffer_target(desc.usage);
        gl.bind_buffer(target, Some(raw));
        gl.buffer_data_size(target, desc.size as i32, buffer_usage_hint(desc.usage));
        gl.bind_buffer(target, None);
        Ok(Buffer { raw, target, size: desc.size })
    }
    unsafe fn destroy_buffer(&self, buffer: Buffer) {
        self.context.delete_buffer(buffer.raw);
    }

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture> {
        let gl = &self.context;
        let raw = gl.create_texture().map_err(DeviceError::Other)?;
        let target = glow::TEXTURE_2D;
        gl.bind_texture(target, Some(raw));
        let (internal_format, format, ty) = crate::conv::texture_format(desc.format);
        for level in 0..desc.mip_level_count {
            let w = (desc.size.width >> level).max(1) as i32;
            let h = (desc.size.height >> level).max(1) as i32;
            gl.tex_image_2d(target, level as i32, internal_format, w, h, 0, format, ty, None);
        }
        gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, desc.mip_level_count as i32 - 1);
        gl.bind_texture(target, None);
        Ok(Texture { raw: Some(raw), target, format: desc.format, size: desc.size, mip_level_count: desc.mip_level_count })
    }
    unsafe fn destroy_texture(&self, texture: Texture) {
        if let Some(raw) = texture.raw {
            self.context.delete_texture(raw);
        }
    }

    unsafe fn create_texture_view(&self, texture: &Texture, desc: &TextureViewDescriptor) -> Result<TextureView> {
        Ok(TextureView {
            texture: texture.raw,
            target: texture.target,
            format: desc.format,
            base_mip_level: desc.range.base_mip_level,
            mip_level_count: desc.range.mip_level_count,
            default_framebuffer: texture.raw.is_none(),
        })
    }
    unsafe fn destroy_texture_view(&self, _view: TextureView) {}

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Sampler> {
        let gl = &self.context;
        let raw = gl.create_sampler().map_err(DeviceError::Other)?;
        let (min_filter, mag_filter) = crate::conv::filter(desc.min_filter, desc.mag_filter, desc.mipmap_filter);
        gl.sampler_parameter_i32(raw, glow::TEXTURE_MIN_FILTER, min_filter);
        gl.sampler_parameter_i32(raw, glow::TEXTURE_MAG_FILTER, mag_filter);
        gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_S, crate::conv::address_mode(desc.address_mode_u));
        gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_T, crate::conv::address_mode(desc.address_mode_v));
        gl.sampler_parameter_i32(raw, glow::TEXTURE_WRAP_R, crate::conv::address_mode(desc.address_mode_w));
        if let Some(compare) = desc.compare {
            gl.sampler_parameter_i32(raw, glow::TEXTURE_COMPARE_MODE, glow::COMPARE_REF_TO_TEXTURE as i32);
            gl.sampler_parameter_i32(raw, glow::TEXTURE_COMPARE_FUNC, crate::conv::compare_function(compare) as i32);
        }
        Ok(Sampler { raw })
    }
    unsafe fn destroy_sampler(&self, sampler: Sampler) {
        self.context.delete_sampler(sampler.raw);
    }

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<ShaderModule> {
        match &desc.source {
            ShaderSource::Glsl { source, stage } => {
                Ok(ShaderModule { source: source.to_string(), stage: shader_stage_enum(*stage)? })
            }
            ShaderSource::Wgsl(_) | ShaderSource::SpirV(_) => {
                Err(DeviceError::Other("shader module was not pre-translated to GLSL".into()))
            }
        }
    }
    unsafe fn destroy_shader_module(&self, _module: ShaderModule) {}

    unsafe fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> Result<BindGroupLayout> {
        Ok(BindGroupLayout { entries: desc.entries.to_vec() })
    }
    unsafe fn destroy_bind_group_layout(&self, _layout: BindGroupLayout) {}

    unsafe fn create_pipeline_layout(&self, desc: &PipelineLayoutDescriptor<&BindGroupLayout>) -> Result<PipelineLayout> {
        Ok(PipelineLayout { bind_group_layout_count: desc.bind_group_layouts.len() as u32 })
    }
    unsafe fn destroy_pipeline_layout(&self, _layout: PipelineLayout) {}

    unsafe fn create_bind_group(
        &self,
        desc: &BindGroupDescriptor<&BindGroupLayout, &Buffer, &TextureView, &Sampler>,
    ) -> Result<BindGroup> {
        let bindings = desc
            .entries
            .iter()
            .map(|entry| {
                let resource = match entry.resource {
                    HalBoundResource::Buffer { buffer, offset, .. } => BoundResource::Buffer { raw: buffer.raw, offset },
                    HalBoundResource::TextureView(view) => BoundResource::Texture(*view),
                    HalBoundResource::Sampler(sampler) => BoundResource::Sampler(*sampler),
                };
                (entry.binding, resource)
            })
            .collect();
        Ok(BindGroup { bindings })
    }
    unsafe fn destroy_bind_group(&self, _group: BindGroup) {}

    unsafe fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDescriptor<&PipelineLayout, &ShaderModule>,
    ) -> Result<RenderPipeline> {
        let gl = &self.context;
        let program = gl.create_program().map_err(DeviceError::Other)?;

        let vs = crate::conv::compile_shader(gl, desc.vertex.module.stage, &desc.vertex.module.source)
            .map_err(DeviceError::Other)?;
        gl.attach_shader(program, vs);

        let fs = if let Some(fragment) = &desc.fragment {
            let fs = crate::conv::compile_shader(gl, fragment.module.stage, &fragment.module.source)
                .map_err(DeviceError::Other)?;
            gl.attach_shader(program, fs);
            Some(fs)
        } else {
            None
        };

        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        let log = gl.get_program_info_log(program);

        gl.detach_shader(program, vs);
        gl.delete_shader(vs);
        if let Some(fs) = fs {
            gl.detach_shader(program, fs);
            gl.delete_shader(fs);
        }

        if !linked {
            gl.delete_program(program);
            return Err(DeviceError::Other(format!("program link failed: {log}")));
        }

        Ok(RenderPipeline {
            program,
            vertex_buffers: desc.vertex_buffers.iter().map(OwnedVertexBufferLayout::from).collect(),
            color_targets: desc.color_targets.to_vec(),
            depth_stencil: desc.depth_stencil,
            primitive: desc.primitive,
            sample_count: desc.sample_count,
        })
    }
    unsafe fn destroy_render_pipeline(&self, pipeline: RenderPipeline) {
        self.context.delete_program(pipeline.program);
    }

    unsafe fn create_compute_pipeline(
        &self,
        _desc: &ComputePipelineDescriptor<&PipelineLayout, &ShaderModule>,
    ) -> Result<ComputePipeline> {
        // This backend targets GL 3.3 / GLES 3.0, neither of which has
        // compute shaders; `DownlevelFlags::COMPUTE_SHADERS` is left unset
        // so the core crate never routes a real call down to this.
        Err(DeviceError::Other("compute pipelines are not supported by the GL backend".into()))
    }
    unsafe fn destroy_compute_pipeline(&self, pipeline: ComputePipeline) {
        self.context.delete_program(pipeline.program);
    }

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<QuerySet> {
        let gl = &self.context;
        let mut queries = Vec::with_capacity(desc.count as usize);
        for _ in 0..desc.count {
            queries.push(gl.create_query().map_err(DeviceError::Other)?);
        }
        Ok(QuerySet { queries, ty: desc.ty, count: desc.count })
    }
    unsafe fn destroy_query_set(&self, set: QuerySet) {
        for query in set.queries {
            self.context.delete_query(query);
        }
    }

    unsafe fn create_command_encoder(
        &self,
        _desc: &CommandEncoderDescriptor<&Queue>,
    ) -> Result<crate::command::CommandEncoder> {
        crate::command::CommandEncoder::new(self.context.clone())
    }
    unsafe fn destroy_command_encoder(&self, _encoder: crate::command::CommandEncoder) {}

    unsafe fn free_command_buffer(&self, _buffer: crate::command::CommandBuffer) {}

    unsafe fn create_fence(&self) -> Result<Fence> {
        Ok(Fence::default())
    }
    unsafe fn destroy_fence(&self, _fence: Fence) {}

    unsafe fn wait(&self, fence: &Fence, value: FenceValue, _timeout: Duration) -> Result<(), TimeoutError> {
        if fence.completed.load(Ordering::Acquire) >= value {
            Ok(())
        } else {
            Err(TimeoutError)
        }
    }

    unsafe fn get_fence_value(&self, fence: &Fence) -> Result<FenceValue> {
        Ok(fence.completed.load(Ordering::Acquire))
    }

    unsafe fn wait_idle(&self) -> Result<()> {
        self.context.finish();
        Ok(())
    }
}

pub struct Queue {
    context: Arc<glow::Context>,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").finish()
    }
}
unsafe impl Send for Queue {}
unsafe impl Sync for Queue {}

impl Queue {
    pub(crate) fn new(context: Arc<glow::Context>) -> Self {
        Queue { context }
    }
}

impl wgx_hal::queue::Queue<GlApi> for Queue {
    unsafe fn submit(&mut self, command_buffers: &[&crate::command::CommandBuffer], fence: &Fence, value: FenceValue) -> Result<()> {
        for cb in command_buffers {
            crate::command::execute(&self.context, cb);
        }
        fence.completed.store(value, Ordering::Release);
        Ok(())
    }

    unsafe fn write_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let gl = &self.context;
        gl.bind_buffer(buffer.target, Some(buffer.raw));
        gl.buffer_sub_data_u8_slice(buffer.target, offset as i32, data);
        gl.bind_buffer(buffer.target, None);
        Ok(())
    }

    unsafe fn write_texture(&mut self, texture: &Texture, data: &[u8], layout: ImageDataLayout, extent: Extent3d) -> Result<()> {
        let raw = texture.raw.ok_or_else(|| DeviceError::Other("cannot write to the surface's default framebuffer".into()))?;
        let gl = &self.context;
        let (_, format, ty) = crate::conv::texture_format(texture.format);
        gl.bind_texture(texture.target, Some(raw));
        let offset = layout.offset as usize;
        let row_bytes = (layout.bytes_per_row as usize).max(1);
        // GL has no separate row-pitch parameter for a tightly packed upload,
        // so a non-default pitch requires re-packing into a contiguous buffer.
        let packed = extent.width as usize * texture.format.block_size() as usize;
        let pixels = if row_bytes == packed {
            &data[offset..]
        } else {
            return Err(DeviceError::Other("non-tightly-packed texture uploads are not supported by the GL backend".into()));
        };
        gl.tex_sub_image_2d(
            texture.target,
            0,
            0,
            0,
            extent.width as i32,
            extent.height as i32,
            format,
            ty,
            glow::PixelUnpackData::Slice(pixels),
        );
        gl.bind_texture(texture.target, None);
        Ok(())
    }

    unsafe fn read_buffer(&mut self, buffer: &Buffer, offset: u64, output: &mut [u8]) -> Result<()> {
        let gl = &self.context;
        gl.bind_buffer(buffer.target, Some(buffer.raw));
        gl.get_buffer_sub_data(buffer.target, offset as i32, output);
        gl.bind_buffer(buffer.target, None);
        Ok(())
    }

    unsafe fn present(&mut self, surface: &mut Surface, _texture: AcquiredSurfaceTexture<GlApi>) -> Result<(), SurfaceError> {
        // The acquired texture already *is* the default framebuffer; nothing
        // to blit or select before presenting.
        surface.swap_buffers().map_err(SurfaceError::Device)?;
        Ok(())
    }

    fn timestamp_period(&self) -> f32 {
        1.0
    }
}
