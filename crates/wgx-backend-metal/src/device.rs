//! `Device` and `Queue`.

use crate::resource::*;
use crate::MetalApi;
use metal::MTLResourceOptions;
use std::time::Duration;
use wgx_hal::buffer::BufferDescriptor;
use wgx_hal::command::CommandEncoderDescriptor;
use wgx_hal::device::FenceValue;
use wgx_hal::error::{DeviceError, Result, SurfaceError, TimeoutError};
use wgx_hal::image::{Extent3d, ImageDataLayout, SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, ComputePipelineDescriptor, PipelineLayoutDescriptor,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource,
};
use wgx_hal::query::QuerySetDescriptor;
use wgx_hal::window::AcquiredSurfaceTexture;

pub struct Device {
    pub(crate) raw: metal::Device,
    pub(crate) queue: metal::CommandQueue,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish()
    }
}
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl wgx_hal::device::Device<MetalApi> for Device {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let raw = self.raw.new_buffer(desc.size.max(1), MTLResourceOptions::StorageModeShared);
        if let Some(label) = desc.label {
            raw.set_label(label);
        }
        Ok(Buffer(raw))
    }

    unsafe fn destroy_buffer(&self, _buffer: Buffer) {}

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture> {
        let descriptor = metal::TextureDescriptor::new();
        descriptor.set_texture_type(if desc.size.depth_or_array_layers > 1 {
            metal::MTLTextureType::D3
        } else {
            metal::MTLTextureType::D2
        });
        descriptor.set_pixel_format(crate::conv::texture_format(desc.format));
        descriptor.set_width(desc.size.width as u64);
        descriptor.set_height(desc.size.height as u64);
        descriptor.set_depth(desc.size.depth_or_array_layers.max(1) as u64);
        descriptor.set_mipmap_level_count(desc.mip_level_count as u64);
        descriptor.set_sample_count(desc.sample_count as u64);
        descriptor.set_storage_mode(metal::MTLStorageMode::Private);
        descriptor.set_usage(texture_usage(desc.usage));
        let raw = self.raw.new_texture(&descriptor);
        Ok(Texture { raw, format: desc.format, size: desc.size, mip_level_count: desc.mip_level_count })
    }

    unsafe fn destroy_texture(&self, _texture: Texture) {}

    unsafe fn create_texture_view(&self, texture: &Texture, desc: &TextureViewDescriptor) -> Result<TextureView> {
        let raw = texture.raw.new_texture_view_from_slice(
            crate::conv::texture_format(desc.format),
            texture.raw.texture_type(),
            metal::NSRange { location: desc.range.base_mip_level as u64, length: desc.range.mip_level_count.max(1) as u64 },
            metal::NSRange { location: desc.range.base_array_layer as u64, length: desc.range.array_layer_count.max(1) as u64 },
        );
        Ok(TextureView { raw, format: desc.format })
    }

    unsafe fn destroy_texture_view(&self, _view: TextureView) {}

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Sampler> {
        let descriptor = metal::SamplerDescriptor::new();
        descriptor.set_min_filter(crate::conv::filter_mode(desc.min_filter));
        descriptor.set_mag_filter(crate::conv::filter_mode(desc.mag_filter));
        descriptor.set_mip_filter(crate::conv::mip_filter(desc.mipmap_filter));
        descriptor.set_address_mode_s(crate::conv::address_mode(desc.address_mode_u));
        descriptor.set_address_mode_t(crate::conv::address_mode(desc.address_mode_v));
        descriptor.set_address_mode_r(crate::conv::address_mode(desc.address_mode_w));
        descriptor.set_lod_min_clamp(desc.lod_min_clamp);
        descriptor.set_lod_max_clamp(desc.lod_max_clamp);
        if let Some(compare) = desc.compare {
            descriptor.set_compare_function(crate::conv::compare_function(compare));
        }
        if desc.anisotropy_clamp > 1 {
            descriptor.set_max_anisotropy(desc.anisotropy_clamp as u64);
        }
        let raw = self.raw.new_sampler(&descriptor);
        Ok(Sampler(raw))
    }

    unsafe fn destroy_sampler(&self, _sampler: Sampler) {}

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<ShaderModule> {
        // No WGSL/GLSL-to-MSL translator is wired up in this backend; the
        // `Wgsl` variant is used as a carrier for pre-translated MSL source,
        // matching the Vulkan backend's equivalent pre-translated-SPIR-V
        // requirement.
        let source = match &desc.source {
            ShaderSource::Wgsl(source) => source.as_ref(),
            ShaderSource::SpirV(_) | ShaderSource::Glsl { .. } => {
                return Err(DeviceError::Other("shader module was not pre-translated to MSL".into()))
            }
        };
        let options = metal::CompileOptions::new();
        let library = self
            .raw
            .new_library_with_source(source, &options)
            .map_err(DeviceError::Other)?;
        Ok(ShaderModule { library: ShaderLibrary(library) })
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
        use wgx_hal::pso::BoundResource;
        let slots = desc
            .entries
            .iter()
            .map(|entry| {
                let slot = match &entry.resource {
                    BoundResource::Buffer { buffer, offset, .. } => BoundSlot::Buffer { buffer: buffer.0.clone(), offset: *offset },
                    BoundResource::TextureView(view) => BoundSlot::Texture(view.raw.clone()),
                    BoundResource::Sampler(sampler) => BoundSlot::Sampler(sampler.0.clone()),
                };
                (entry.binding, slot)
            })
            .collect();
        Ok(BindGroup { slots })
    }

    unsafe fn destroy_bind_group(&self, _group: BindGroup) {}

    unsafe fn create_render_pipeline(&self, desc: &RenderPipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<RenderPipeline> {
        let descriptor = metal::RenderPipelineDescriptor::new();
        let vertex_fn = desc
            .vertex
            .module
            .library
            .0
            .get_function(desc.vertex.entry_point, None)
            .map_err(DeviceError::Other)?;
        descriptor.set_vertex_function(Some(&vertex_fn));
        if let Some(fragment) = &desc.fragment {
            let fragment_fn = fragment.module.library.0.get_function(fragment.entry_point, None).map_err(DeviceError::Other)?;
            descriptor.set_fragment_function(Some(&fragment_fn));
        }
        for (i, target) in desc.color_targets.iter().enumerate() {
            let attachment = descriptor.color_attachments().object_at(i as u64).unwrap();
            attachment.set_pixel_format(crate::conv::texture_format(target.format));
            attachment.set_write_mask(metal::MTLColorWriteMask::from_bits_truncate(target.write_mask.bits() as u64));
            if let Some(blend) = target.blend {
                attachment.set_blending_enabled(true);
                attachment.set_source_rgb_blend_factor(crate::conv::blend_factor(blend.color.src_factor));
                attachment.set_destination_rgb_blend_factor(crate::conv::blend_factor(blend.color.dst_factor));
                attachment.set_rgb_blend_operation(crate::conv::blend_operation(blend.color.operation));
                attachment.set_source_alpha_blend_factor(crate::conv::blend_factor(blend.alpha.src_factor));
                attachment.set_destination_alpha_blend_factor(crate::conv::blend_factor(blend.alpha.dst_factor));
                attachment.set_alpha_blend_operation(crate::conv::blend_operation(blend.alpha.operation));
            }
        }
        let mut depth_stencil_state = None;
        if let Some(ds) = desc.depth_stencil {
            descriptor.set_depth_attachment_pixel_format(crate::conv::texture_format(ds.format));
            if ds.format.has_stencil() {
                descriptor.set_stencil_attachment_pixel_format(crate::conv::texture_format(ds.format));
            }
            let ds_descriptor = metal::DepthStencilDescriptor::new();
            ds_descriptor.set_depth_compare_function(crate::conv::compare_function(ds.depth_compare));
            ds_descriptor.set_depth_write_enabled(ds.depth_write_enabled);
            if ds.stencil.is_enabled() {
                let front = metal::StencilDescriptor::new();
                front.set_stencil_compare_function(crate::conv::compare_function(ds.stencil.front.compare));
                front.set_stencil_failure_operation(crate::conv::stencil_operation(ds.stencil.front.fail_op));
                front.set_depth_failure_operation(crate::conv::stencil_operation(ds.stencil.front.depth_fail_op));
                front.set_depth_stencil_pass_operation(crate::conv::stencil_operation(ds.stencil.front.pass_op));
                front.set_read_mask(ds.stencil.read_mask);
                front.set_write_mask(ds.stencil.write_mask);
                ds_descriptor.set_front_face_stencil(Some(&front));
            }
            depth_stencil_state = Some(self.raw.new_depth_stencil_state(&ds_descriptor));
        }
        let raw = self.raw.new_render_pipeline_state(&descriptor).map_err(DeviceError::Other)?;
        Ok(RenderPipeline {
            raw,
            depth_stencil: depth_stencil_state,
            depth_stencil_desc: desc.depth_stencil,
            primitive: desc.primitive,
            color_targets: desc.color_targets.to_vec(),
        })
    }

    unsafe fn destroy_render_pipeline(&self, _pipeline: RenderPipeline) {}

    unsafe fn create_compute_pipeline(&self, desc: &ComputePipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<ComputePipeline> {
        let function = desc.compute.module.library.0.get_function(desc.compute.entry_point, None).map_err(DeviceError::Other)?;
        let raw = self.raw.new_compute_pipeline_state_with_function(&function).map_err(DeviceError::Other)?;
        Ok(ComputePipeline { raw })
    }

    unsafe fn destroy_compute_pipeline(&self, _pipeline: ComputePipeline) {}

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<QuerySet> {
        let raw = match desc.ty {
            wgx_hal::query::QueryType::Occlusion => {
                Some(self.raw.new_buffer((desc.count as u64) * 8, MTLResourceOptions::StorageModeShared))
            }
            // Timestamp queries need `MTLCounterSampleBuffer`, not wired up
            // in this simplified backend.
            wgx_hal::query::QueryType::Timestamp => None,
        };
        Ok(QuerySet { raw, ty: desc.ty, count: desc.count })
    }

    unsafe fn destroy_query_set(&self, _set: QuerySet) {}

    unsafe fn create_command_encoder(&self, _desc: &CommandEncoderDescriptor<&Queue>) -> Result<crate::command::CommandEncoder> {
        Ok(crate::command::CommandEncoder::new(self.queue.clone()))
    }

    unsafe fn destroy_command_encoder(&self, _encoder: crate::command::CommandEncoder) {}

    unsafe fn free_command_buffer(&self, _buffer: crate::command::CommandBuffer) {}

    unsafe fn create_fence(&self) -> Result<Fence> {
        Ok(Fence { value: std::sync::atomic::AtomicU64::new(0) })
    }

    unsafe fn destroy_fence(&self, _fence: Fence) {}

    unsafe fn wait(&self, fence: &Fence, value: FenceValue, _timeout: Duration) -> Result<(), TimeoutError> {
        // Submission is synchronous (see `Queue::submit`); by the time this
        // is called the command buffer has already completed.
        if fence.value.load(std::sync::atomic::Ordering::Acquire) >= value {
            Ok(())
        } else {
            Err(TimeoutError)
        }
    }

    unsafe fn get_fence_value(&self, fence: &Fence) -> Result<FenceValue> {
        Ok(fence.value.load(std::sync::atomic::Ordering::Acquire))
    }

    unsafe fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

fn texture_usage(uses: wgx_hal::image::TextureUses) -> metal::MTLTextureUsage {
    use wgx_hal::image::TextureUses;
    let mut usage = metal::MTLTextureUsage::Unknown;
    if uses.contains(TextureUses::SAMPLED) {
        usage |= metal::MTLTextureUsage::ShaderRead;
    }
    if uses.contains(TextureUses::STORAGE) {
        usage |= metal::MTLTextureUsage::ShaderWrite;
    }
    if uses.intersects(TextureUses::COLOR_TARGET | TextureUses::DEPTH_STENCIL_TARGET) {
        usage |= metal::MTLTextureUsage::RenderTarget;
    }
    usage
}

pub struct Queue {
    pub(crate) raw: metal::CommandQueue,
    pub(crate) device: metal::Device,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").finish()
    }
}
unsafe impl Send for Queue {}
unsafe impl Sync for Queue {}

impl wgx_hal::queue::Queue<MetalApi> for Queue {
    unsafe fn submit(&mut self, command_buffers: &[&crate::command::CommandBuffer], fence: &Fence, value: FenceValue) -> Result<()> {
        for cb in command_buffers {
            cb.raw.commit();
            cb.raw.wait_until_completed();
        }
        fence.value.store(value, std::sync::atomic::Ordering::Release);
        Ok(())
    }

    unsafe fn write_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let ptr = buffer.0.contents() as *mut u8;
        std::ptr::copy_nonoverlapping(data.as_ptr(), ptr.add(offset as usize), data.len());
        Ok(())
    }

    unsafe fn write_texture(&mut self, texture: &Texture, data: &[u8], layout: ImageDataLayout, extent: Extent3d) -> Result<()> {
        let bytes_per_row = layout.bytes_per_row.unwrap_or(extent.width * texture.format.block_size());
        let region = metal::MTLRegion {
            origin: metal::MTLOrigin { x: 0, y: 0, z: 0 },
            size: metal::MTLSize { width: extent.width as u64, height: extent.height as u64, depth: 1 },
        };
        texture.raw.replace_region(region, 0, bytes_per_row as u64, data[layout.offset as usize..].as_ptr() as *const _);
        Ok(())
    }

    unsafe fn read_buffer(&mut self, buffer: &Buffer, offset: u64, output: &mut [u8]) -> Result<()> {
        let ptr = buffer.0.contents() as *const u8;
        std::ptr::copy_nonoverlapping(ptr.add(offset as usize), output.as_mut_ptr(), output.len());
        Ok(())
    }

    unsafe fn present(&mut self, _surface: &mut crate::instance::Surface, texture: AcquiredSurfaceTexture<MetalApi>) -> Result<(), SurfaceError> {
        let command_buffer = self.raw.new_command_buffer();
        command_buffer.present_drawable(crate::instance::Surface::present_drawable(&texture.texture));
        command_buffer.commit();
        Ok(())
    }

    fn timestamp_period(&self) -> f32 {
        1.0
    }
}
