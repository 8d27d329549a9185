//! `CommandEncoder`/`CommandBuffer`: unlike the software backend's
//! record-then-replay `Op` list, encoder calls here translate straight into
//! `vkCmd*` calls against a real `VkCommandBuffer` as they're made. Vulkan's
//! command buffers already give you the deferred-execution semantics the
//! software backend had to build by hand.

use crate::resource::*;
use crate::VulkanApi;
use ash::vk;
use std::ops::Range;
use wgx_hal::buffer::BufferCopy;
use wgx_hal::command::{
    BufferBarrier, ClearColor, ComputePassDescriptor, IndexFormat, RenderPassDescriptor, Rect, Viewport,
};
use wgx_hal::error::Result;
use wgx_hal::image::{BufferTextureCopy, TextureCopy};

pub struct CommandBuffer {
    pub(crate) raw: vk::CommandBuffer,
    pub(crate) pool: vk::CommandPool,
    pub(crate) device: ash::Device,
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer").finish()
    }
}

pub struct CommandEncoder {
    device: ash::Device,
    pool: vk::CommandPool,
    active: Option<vk::CommandBuffer>,
}

impl std::fmt::Debug for CommandEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEncoder").finish()
    }
}

impl CommandEncoder {
    pub(crate) fn new(device: ash::Device, pool: vk::CommandPool) -> Self {
        CommandEncoder { device, pool, active: None }
    }

    pub(crate) fn destroy(self, device: &ash::Device) {
        unsafe { device.destroy_command_pool(self.pool, None) };
    }

    fn cb(&self) -> vk::CommandBuffer {
        self.active.expect("command encoder has no buffer being recorded")
    }
}

impl wgx_hal::command::CommandEncoder<VulkanApi> for CommandEncoder {
    unsafe fn begin_encoding(&mut self, _label: Option<&str>) -> Result<()> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let buffers = self.device.allocate_command_buffers(&alloc_info).map_err(|e| {
            wgx_hal::error::DeviceError::Other(e.to_string())
        })?;
        let cb = buffers[0];
        let begin_info = vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        self.device
            .begin_command_buffer(cb, &begin_info)
            .map_err(|e| wgx_hal::error::DeviceError::Other(e.to_string()))?;
        self.active = Some(cb);
        Ok(())
    }

    unsafe fn end_encoding(&mut self) -> Result<CommandBuffer> {
        let cb = self.cb();
        self.device.end_command_buffer(cb).map_err(|e| wgx_hal::error::DeviceError::Other(e.to_string()))?;
        self.active = None;
        Ok(CommandBuffer { raw: cb, pool: self.pool, device: self.device.clone() })
    }

    unsafe fn discard_encoding(&mut self) {
        if let Some(cb) = self.active.take() {
            let _ = self.device.free_command_buffers(self.pool, &[cb]);
        }
    }

    unsafe fn transition_buffers(&mut self, _barriers: &[BufferBarrier<&Buffer>]) {
        // A full implementation threads buffer usage state through the
        // resource tracker and emits a matching `VkBufferMemoryBarrier`.
        // Lacking that tracker, a conservative global barrier covers every
        // hazard the HAL promises to cover.
        self.device.cmd_pipeline_barrier(
            self.cb(),
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::DependencyFlags::empty(),
            &[vk::MemoryBarrier::builder()
                .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
                .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
                .build()],
            &[],
            &[],
        );
    }

    unsafe fn transition_textures(&mut self, _barriers: &[wgx_hal::command::TextureBarrier<&Texture>]) {
        self.device.cmd_pipeline_barrier(
            self.cb(),
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::DependencyFlags::empty(),
            &[vk::MemoryBarrier::builder()
                .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
                .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
                .build()],
            &[],
            &[],
        );
    }

    unsafe fn clear_buffer(&mut self, buffer: &Buffer, range: Range<u64>) {
        let size = if range.end == u64::MAX { vk::WHOLE_SIZE } else { range.end - range.start };
        self.device.cmd_fill_buffer(self.cb(), buffer.raw, range.start, size, 0);
    }

    unsafe fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, regions: &[BufferCopy]) {
        let regions: Vec<vk::BufferCopy> = regions
            .iter()
            .map(|r| vk::BufferCopy { src_offset: r.src_offset, dst_offset: r.dst_offset, size: r.size })
            .collect();
        self.device.cmd_copy_buffer(self.cb(), src.raw, dst.raw, &regions);
    }

    unsafe fn copy_buffer_to_texture(&mut self, src: &Buffer, dst: &Texture, regions: &[BufferTextureCopy]) {
        let regions: Vec<vk::BufferImageCopy> = regions.iter().map(|r| buffer_image_copy(r, dst)).collect();
        self.device.cmd_copy_buffer_to_image(self.cb(), src.raw, dst.raw, vk::ImageLayout::TRANSFER_DST_OPTIMAL, &regions);
    }

    unsafe fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer, regions: &[BufferTextureCopy]) {
        let regions: Vec<vk::BufferImageCopy> = regions.iter().map(|r| buffer_image_copy(r, src)).collect();
        self.device.cmd_copy_image_to_buffer(self.cb(), src.raw, vk::ImageLayout::TRANSFER_SRC_OPTIMAL, dst.raw, &regions);
    }

    unsafe fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, regions: &[TextureCopy]) {
        let regions: Vec<vk::ImageCopy> = regions
            .iter()
            .map(|r| vk::ImageCopy {
                src_subresource: vk::ImageSubresourceLayers {
                    aspect_mask: crate::conv::aspect_mask(src.format),
                    mip_level: r.src.mip_level,
                    base_array_layer: 0,
                    layer_count: 1,
                },
                src_offset: vk::Offset3D { x: r.src.origin.x as i32, y: r.src.origin.y as i32, z: r.src.origin.z as i32 },
                dst_subresource: vk::ImageSubresourceLayers {
                    aspect_mask: crate::conv::aspect_mask(dst.format),
                    mip_level: r.dst.mip_level,
                    base_array_layer: 0,
                    layer_count: 1,
                },
                dst_offset: vk::Offset3D { x: r.dst.origin.x as i32, y: r.dst.origin.y as i32, z: r.dst.origin.z as i32 },
                extent: vk::Extent3D { width: r.size.width, height: r.size.height, depth: r.size.depth_or_array_layers },
            })
            .collect();
        self.device.cmd_copy_image(
            self.cb(),
            src.raw,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            dst.raw,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &regions,
        );
    }

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&TextureView>) {
        let mut color_attachments = Vec::new();
        for attachment in desc.color_attachments.iter() {
            let info = match attachment {
                Some(a) => vk::RenderingAttachmentInfo::builder()
                    .image_view(a.target.raw)
                    .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                    .load_op(crate::conv::attachment_load_op(a.load_op))
                    .store_op(crate::conv::attachment_store_op(a.store_op))
                    .clear_value(match a.load_op {
                        wgx_hal::command::LoadOp::Clear(c) => vk::ClearValue { color: crate::conv::clear_color_value(c) },
                        wgx_hal::command::LoadOp::Load => vk::ClearValue::default(),
                    })
                    .build(),
                None => vk::RenderingAttachmentInfo::default(),
            };
            color_attachments.push(info);
        }

        let depth_attachment = desc.depth_stencil_attachment.as_ref().map(|ds| {
            vk::RenderingAttachmentInfo::builder()
                .image_view(ds.target.raw)
                .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
                .load_op(crate::conv::attachment_load_op(ds.depth_load_op))
                .store_op(crate::conv::attachment_store_op(ds.depth_store_op))
                .clear_value(match ds.depth_load_op {
                    wgx_hal::command::LoadOp::Clear(d) => vk::ClearValue { depth_stencil: vk::ClearDepthStencilValue { depth: d, stencil: 0 } },
                    wgx_hal::command::LoadOp::Load => vk::ClearValue::default(),
                })
                .build()
        });

        let mut rendering_info = vk::RenderingInfo::builder().render_area(vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: vk::Extent2D { width: desc.extent.width, height: desc.extent.height },
        });
        rendering_info = rendering_info.layer_count(1).color_attachments(&color_attachments);
        if let Some(depth) = &depth_attachment {
            rendering_info = rendering_info.depth_attachment(depth);
        }
        self.device.cmd_begin_rendering(self.cb(), &rendering_info);
    }

    unsafe fn end_render_pass(&mut self) {
        self.device.cmd_end_rendering(self.cb());
    }

    unsafe fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        self.device.cmd_bind_pipeline(self.cb(), vk::PipelineBindPoint::GRAPHICS, pipeline.raw);
    }

    unsafe fn set_bind_group(&mut self, layout: &PipelineLayout, index: u32, group: &BindGroup) {
        self.device.cmd_bind_descriptor_sets(
            self.cb(),
            vk::PipelineBindPoint::GRAPHICS,
            layout.raw,
            index,
            &[group.raw],
            &[],
        );
    }

    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: u64) {
        self.device.cmd_bind_vertex_buffers(self.cb(), slot, &[buffer.raw], &[offset]);
    }

    unsafe fn set_index_buffer(&mut self, buffer: &Buffer, format: IndexFormat, offset: u64) {
        self.device.cmd_bind_index_buffer(self.cb(), buffer.raw, offset, crate::conv::index_type(format));
    }

    unsafe fn set_viewport(&mut self, viewport: &Viewport) {
        let vp = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.w,
            height: viewport.h,
            min_depth: viewport.depth.start,
            max_depth: viewport.depth.end,
        };
        self.device.cmd_set_viewport(self.cb(), 0, &[vp]);
    }

    unsafe fn set_scissor_rect(&mut self, rect: &Rect) {
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: rect.x as i32, y: rect.y as i32 },
            extent: vk::Extent2D { width: rect.w, height: rect.h },
        };
        self.device.cmd_set_scissor(self.cb(), 0, &[scissor]);
    }

    unsafe fn set_blend_constant(&mut self, color: ClearColor) {
        self.device.cmd_set_blend_constants(self.cb(), &[color.r as f32, color.g as f32, color.b as f32, color.a as f32]);
    }

    unsafe fn set_stencil_reference(&mut self, reference: u32) {
        self.device.cmd_set_stencil_reference(self.cb(), vk::StencilFaceFlags::FRONT_AND_BACK, reference);
    }

    unsafe fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.device.cmd_draw(self.cb(), vertices.end - vertices.start, instances.end - instances.start, vertices.start, instances.start);
    }

    unsafe fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.device.cmd_draw_indexed(
            self.cb(),
            indices.end - indices.start,
            instances.end - instances.start,
            indices.start,
            base_vertex,
            instances.start,
        );
    }

    unsafe fn draw_indirect(&mut self, buffer: &Buffer, offset: u64, draw_count: u32) {
        self.device.cmd_draw_indirect(self.cb(), buffer.raw, offset, draw_count, std::mem::size_of::<vk::DrawIndirectCommand>() as u32);
    }

    unsafe fn draw_indexed_indirect(&mut self, buffer: &Buffer, offset: u64, draw_count: u32) {
        self.device.cmd_draw_indexed_indirect(
            self.cb(),
            buffer.raw,
            offset,
            draw_count,
            std::mem::size_of::<vk::DrawIndexedIndirectCommand>() as u32,
        );
    }

    unsafe fn begin_compute_pass(&mut self, _desc: &ComputePassDescriptor) {}

    unsafe fn end_compute_pass(&mut self) {}

    unsafe fn set_compute_pipeline(&mut self, pipeline: &ComputePipeline) {
        self.device.cmd_bind_pipeline(self.cb(), vk::PipelineBindPoint::COMPUTE, pipeline.raw);
    }

    unsafe fn dispatch(&mut self, count: [u32; 3]) {
        self.device.cmd_dispatch(self.cb(), count[0], count[1], count[2]);
    }

    unsafe fn dispatch_indirect(&mut self, buffer: &Buffer, offset: u64) {
        self.device.cmd_dispatch_indirect(self.cb(), buffer.raw, offset);
    }

    unsafe fn resolve_query_set(&mut self, set: &QuerySet, range: Range<u32>, dst: &Buffer, dst_offset: u64) {
        self.device.cmd_copy_query_pool_results(
            self.cb(),
            set.raw,
            range.start,
            range.end - range.start,
            dst.raw,
            dst_offset,
            8,
            vk::QueryResultFlags::WAIT,
        );
    }
}

fn buffer_image_copy(r: &BufferTextureCopy, texture: &Texture) -> vk::BufferImageCopy {
    vk::BufferImageCopy {
        buffer_offset: r.buffer_layout.offset,
        buffer_row_length: r.buffer_layout.bytes_per_row.map(|b| b / texture.format.block_size()).unwrap_or(0),
        buffer_image_height: r.buffer_layout.rows_per_image.unwrap_or(0),
        image_subresource: vk::ImageSubresourceLayers {
            aspect_mask: crate::conv::aspect_mask(texture.format),
            mip_level: r.texture.mip_level,
            base_array_layer: 0,
            layer_count: 1,
        },
        image_offset: vk::Offset3D { x: r.texture.origin.x as i32, y: r.texture.origin.y as i32, z: r.texture.origin.z as i32 },
        image_extent: vk::Extent3D { width: r.size.width, height: r.size.height, depth: r.size.depth_or_array_layers },
    }
}
