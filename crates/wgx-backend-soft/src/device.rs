//! `SoftDevice` and `SoftQueue`: resource creation plus fence bookkeeping.
//!
//! Everything here runs synchronously on the calling thread, so by the time
//! `Queue::submit` returns, the fence has already reached `value` — there is
//! no device timeline distinct from the caller's.

use crate::instance::{SoftSurface, SoftSurfaceTexture};
use crate::resource::*;
use crate::SoftApi;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use wgx_hal::buffer::BufferDescriptor;
use wgx_hal::command::CommandEncoderDescriptor;
use wgx_hal::device::FenceValue;
use wgx_hal::error::{Result, SurfaceError, TimeoutError};
use wgx_hal::image::{Extent3d, ImageDataLayout, SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, BoundResource, ComputePipelineDescriptor,
    PipelineLayoutDescriptor, RenderPipelineDescriptor, ShaderModuleDescriptor,
};
use wgx_hal::query::QuerySetDescriptor;
use wgx_hal::window::AcquiredSurfaceTexture;

#[derive(Debug)]
pub struct SoftDevice;

impl wgx_hal::device::Device<SoftApi> for SoftDevice {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        Ok(Buffer::new(desc.size, desc.usage))
    }
    unsafe fn destroy_buffer(&self, _buffer: Buffer) {}

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture> {
        Ok(Texture::new(desc.format, desc.size, desc.mip_level_count, desc.usage))
    }
    unsafe fn destroy_texture(&self, _texture: Texture) {}

    unsafe fn create_texture_view(&self, texture: &Texture, desc: &TextureViewDescriptor) -> Result<TextureView> {
        Ok(TextureView {
            format: desc.format,
            size: texture.size,
            range: desc.range,
            data: Arc::clone(&texture.data),
            stencil_data: texture.stencil_data.as_ref().map(Arc::clone),
        })
    }
    unsafe fn destroy_texture_view(&self, _view: TextureView) {}

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Sampler> {
        Ok(Sampler {
            mag_filter: desc.mag_filter,
            min_filter: desc.min_filter,
            address_mode_u: desc.address_mode_u,
            address_mode_v: desc.address_mode_v,
        })
    }
    unsafe fn destroy_sampler(&self, _sampler: Sampler) {}

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<ShaderModule> {
        Ok(ShaderModule { label: desc.label.as_deref().unwrap_or("").to_owned() })
    }
    unsafe fn destroy_shader_module(&self, _module: ShaderModule) {}

    unsafe fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> Result<BindGroupLayout> {
        Ok(BindGroupLayout { entries: desc.entries.to_vec() })
    }
    unsafe fn destroy_bind_group_layout(&self, _layout: BindGroupLayout) {}

    unsafe fn create_pipeline_layout(&self, desc: &PipelineLayoutDescriptor<&BindGroupLayout>) -> Result<PipelineLayout> {
        Ok(PipelineLayout { bind_group_layout_count: desc.bind_group_layouts.len() })
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
                let resolved = match &entry.resource {
                    BoundResource::Buffer { buffer, offset, size } => ResolvedBinding::Buffer {
                        offset: *offset,
                        size: *size,
                        data: Arc::clone(&buffer.data),
                    },
                    BoundResource::TextureView(view) => ResolvedBinding::TextureView(Arc::clone(&view.data)),
                    BoundResource::Sampler(sampler) => ResolvedBinding::Sampler((*sampler).clone()),
                };
                (entry.binding, resolved)
            })
            .collect();
        Ok(BindGroup { bindings })
    }
    unsafe fn destroy_bind_group(&self, _group: BindGroup) {}

    unsafe fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDescriptor<&PipelineLayout, &ShaderModule>,
    ) -> Result<RenderPipeline> {
        Ok(RenderPipeline {
            vertex_buffers: desc.vertex_buffers.iter().map(OwnedVertexBufferLayout::from).collect(),
            color_targets: desc.color_targets.to_vec(),
            depth_stencil: desc.depth_stencil,
            primitive: desc.primitive,
            sample_count: desc.sample_count,
        })
    }
    unsafe fn destroy_render_pipeline(&self, _pipeline: RenderPipeline) {}

    unsafe fn create_compute_pipeline(
        &self,
        _desc: &ComputePipelineDescriptor<&PipelineLayout, &ShaderModule>,
    ) -> Result<ComputePipeline> {
        Ok(ComputePipeline)
    }
    unsafe fn destroy_compute_pipeline(&self, _pipeline: ComputePipeline) {}

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<QuerySet> {
        Ok(QuerySet::new(desc.ty, desc.count))
    }
    unsafe fn destroy_query_set(&self, _set: QuerySet) {}

    unsafe fn create_command_encoder(
        &self,
        _desc: &CommandEncoderDescriptor<&SoftQueue>,
    ) -> Result<crate::encoder::SoftCommandEncoder> {
        Ok(crate::encoder::SoftCommandEncoder::new())
    }
    unsafe fn destroy_command_encoder(&self, _encoder: crate::encoder::SoftCommandEncoder) {}

    unsafe fn free_command_buffer(&self, _buffer: crate::encoder::SoftCommandBuffer) {}

    unsafe fn create_fence(&self) -> Result<Fence> {
        Ok(Fence::new())
    }
    unsafe fn destroy_fence(&self, _fence: Fence) {}

    unsafe fn wait(&self, fence: &Fence, value: FenceValue, _timeout: Duration) -> Result<(), TimeoutError> {
        if fence.value.load(Ordering::Acquire) >= value {
            Ok(())
        } else {
            Err(TimeoutError)
        }
    }

    unsafe fn get_fence_value(&self, fence: &Fence) -> Result<FenceValue> {
        Ok(fence.value.load(Ordering::Acquire))
    }

    unsafe fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct SoftQueue;

impl wgx_hal::queue::Queue<SoftApi> for SoftQueue {
    unsafe fn submit(
        &mut self,
        command_buffers: &[&crate::encoder::SoftCommandBuffer],
        fence: &Fence,
        value: FenceValue,
    ) -> Result<()> {
        for cb in command_buffers {
            crate::encoder::execute(cb);
        }
        fence.value.store(value, Ordering::Release);
        Ok(())
    }

    unsafe fn write_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let mut guard = buffer.data.lock();
        let start = offset as usize;
        guard[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    unsafe fn write_texture(
        &mut self,
        texture: &Texture,
        data: &[u8],
        layout: ImageDataLayout,
        extent: Extent3d,
    ) -> Result<()> {
        let block = texture.format.block_size() as usize;
        let tex_width = texture.size.width as usize;
        let mut guard = texture.data.lock();
        for row in 0..extent.height as usize {
            let src_start = layout.offset as usize + row * layout.bytes_per_row as usize;
            let row_bytes = extent.width as usize * block;
            let src = &data[src_start..src_start + row_bytes];
            let dst_start = row * tex_width * block;
            guard[dst_start..dst_start + row_bytes].copy_from_slice(src);
        }
        Ok(())
    }

    unsafe fn read_buffer(&mut self, buffer: &Buffer, offset: u64, output: &mut [u8]) -> Result<()> {
        let guard = buffer.data.lock();
        let start = offset as usize;
        output.copy_from_slice(&guard[start..start + output.len()]);
        Ok(())
    }

    unsafe fn present(
        &mut self,
        surface: &mut SoftSurface,
        texture: AcquiredSurfaceTexture<SoftApi>,
    ) -> Result<(), SurfaceError> {
        surface.present(texture.texture);
        Ok(())
    }

    fn timestamp_period(&self) -> f32 {
        1.0
    }
}
