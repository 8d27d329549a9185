//! `CommandEncoder`/`CommandBuffer`: records directly into a
//! `MTLCommandBuffer`, same direct-record model as the Vulkan backend.

use crate::resource::*;
use crate::MetalApi;
use metal::foreign_types::ForeignType;
use std::ops::Range;
use wgx_hal::buffer::BufferCopy;
use wgx_hal::command::{
    ClearColor, ComputePassDescriptor, IndexFormat, RenderPassDescriptor, Rect, Viewport,
};
use wgx_hal::error::Result;
use wgx_hal::image::{BufferTextureCopy, TextureCopy};

pub struct CommandBuffer {
    pub(crate) raw: metal::CommandBuffer,
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer").finish()
    }
}
unsafe impl Send for CommandBuffer {}
unsafe impl Sync for CommandBuffer {}

enum ActiveEncoder {
    None,
    Render(metal::RenderCommandEncoder, Option<DepthStencilState>, PrimitiveState),
    Compute(metal::ComputeCommandEncoder),
    Blit(metal::BlitCommandEncoder),
}

use wgx_hal::pso::{DepthStencilState, PrimitiveState};

pub struct CommandEncoder {
    queue: metal::CommandQueue,
    command_buffer: Option<metal::CommandBuffer>,
    active: ActiveEncoder,
    index_buffer: Option<(metal::Buffer, IndexFormat, u64)>,
    bound_pipeline_primitive: PrimitiveState,
}

impl std::fmt::Debug for CommandEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEncoder").finish()
    }
}

impl CommandEncoder {
    pub(crate) fn new(queue: metal::CommandQueue) -> Self {
        CommandEncoder {
            queue,
            command_buffer: None,
            active: ActiveEncoder::None,
            index_buffer: None,
            bound_pipeline_primitive: PrimitiveState::default(),
        }
    }

    fn end_active(&mut self) {
        match std::mem::replace(&mut self.active, ActiveEncoder::None) {
            ActiveEncoder::None => {}
            ActiveEncoder::Render(e, ..) => e.end_encoding(),
            ActiveEncoder::Compute(e) => e.end_encoding(),
            ActiveEncoder::Blit(e) => e.end_encoding(),
        }
    }

    fn blit_encoder(&mut self) -> &metal::BlitCommandEncoderRef {
        if !matches!(self.active, ActiveEncoder::Blit(_)) {
            self.end_active();
            let encoder = self.command_buffer.as_ref().unwrap().new_blit_command_encoder().to_owned();
            self.active = ActiveEncoder::Blit(encoder);
        }
        match &self.active {
            ActiveEncoder::Blit(e) => e,
            _ => unreachable!(),
        }
    }
}

impl wgx_hal::command::CommandEncoder<MetalApi> for CommandEncoder {
    unsafe fn begin_encoding(&mut self, label: Option<&str>) -> Result<()> {
        let cb = self.queue.new_command_buffer().to_owned();
        if let Some(label) = label {
            cb.set_label(label);
        }
        self.command_buffer = Some(cb);
        Ok(())
    }

    unsafe fn end_encoding(&mut self) -> Result<CommandBuffer> {
        self.end_active();
        Ok(CommandBuffer { raw: self.command_buffer.take().unwrap() })
    }

    unsafe fn discard_encoding(&mut self) {
        self.end_active();
        self.command_buffer = None;
    }

    unsafe fn transition_buffers(&mut self, _barriers: &[wgx_hal::command::BufferBarrier<&Buffer>]) {
        // Metal tracks hazards on shared-storage resources automatically
        // via command-buffer dependencies; no explicit barrier API exists.
    }

    unsafe fn transition_textures(&mut self, _barriers: &[wgx_hal::command::TextureBarrier<&Texture>]) {}

    unsafe fn clear_buffer(&mut self, buffer: &Buffer, range: Range<u64>) {
        let size = if range.end == u64::MAX { buffer.0.length() - range.start } else { range.end - range.start };
        self.blit_encoder().fill_buffer(&buffer.0, metal::NSRange { location: range.start, length: size }, 0);
    }

    unsafe fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, regions: &[BufferCopy]) {
        for r in regions {
            self.blit_encoder().copy_from_buffer(&src.0, r.src_offset, &dst.0, r.dst_offset, r.size);
        }
    }

    unsafe fn copy_buffer_to_texture(&mut self, src: &Buffer, dst: &Texture, regions: &[BufferTextureCopy]) {
        for r in regions {
            let bytes_per_row = r.buffer_layout.bytes_per_row.unwrap_or(r.size.width * dst.format.block_size());
            self.blit_encoder().copy_from_buffer_to_texture(
                &src.0,
                r.buffer_layout.offset,
                bytes_per_row as u64,
                r.buffer_layout.rows_per_image.unwrap_or(r.size.height) as u64 * bytes_per_row as u64,
                metal::MTLSize { width: r.size.width as u64, height: r.size.height as u64, depth: r.size.depth_or_array_layers as u64 },
                &dst.raw,
                0,
                r.texture.mip_level as u64,
                metal::MTLOrigin { x: r.texture.origin.x as u64, y: r.texture.origin.y as u64, z: r.texture.origin.z as u64 },
                metal::MTLBlitOption::empty(),
            );
        }
    }

    unsafe fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer, regions: &[BufferTextureCopy]) {
        for r in regions {
            let bytes_per_row = r.buffer_layout.bytes_per_row.unwrap_or(r.size.width * src.format.block_size());
            self.blit_encoder().copy_from_texture_to_buffer(
                &src.raw,
                0,
                r.texture.mip_level as u64,
                metal::MTLOrigin { x: r.texture.origin.x as u64, y: r.texture.origin.y as u64, z: r.texture.origin.z as u64 },
                metal::MTLSize { width: r.size.width as u64, height: r.size.height as u64, depth: r.size.depth_or_array_layers as u64 },
                &dst.0,
                r.buffer_layout.offset,
                bytes_per_row as u64,
                r.buffer_layout.rows_per_image.unwrap_or(r.size.height) as u64 * bytes_per_row as u64,
                metal::MTLBlitOption::empty(),
            );
        }
    }

    unsafe fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, regions: &[TextureCopy]) {
        for r in regions {
            self.blit_encoder().copy_from_texture(
                &src.raw,
                0,
                r.src.mip_level as u64,
                metal::MTLOrigin { x: r.src.origin.x as u64, y: r.src.origin.y as u64, z: r.src.origin.z as u64 },
                metal::MTLSize { width: r.size.width as u64, height: r.size.height as u64, depth: r.size.depth_or_array_layers as u64 },
                &dst.raw,
                0,
                r.dst.mip_level as u64,
                metal::MTLOrigin { x: r.dst.origin.x as u64, y: r.dst.origin.y as u64, z: r.dst.origin.z as u64 },
            );
        }
    }

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&TextureView>) {
        self.end_active();
        let pass_descriptor = metal::RenderPassDescriptor::new();
        for (i, attachment) in desc.color_attachments.iter().enumerate() {
            if let Some(a) = attachment {
                let color = pass_descriptor.color_attachments().object_at(i as u64).unwrap();
                color.set_texture(Some(&a.target.raw));
                color.set_load_action(crate::conv::load_action(a.load_op));
                color.set_store_action(crate::conv::store_action(a.store_op));
                if let wgx_hal::command::LoadOp::Clear(c) = a.load_op {
                    color.set_clear_color(crate::conv::clear_color(c));
                }
            }
        }
        if let Some(ds) = &desc.depth_stencil_attachment {
            let depth = pass_descriptor.depth_attachment().unwrap();
            depth.set_texture(Some(&ds.target.raw));
            depth.set_load_action(crate::conv::load_action(ds.depth_load_op));
            depth.set_store_action(crate::conv::store_action(ds.depth_store_op));
            if let wgx_hal::command::LoadOp::Clear(d) = ds.depth_load_op {
                depth.set_clear_depth(d as f64);
            }
            if ds.target.format.has_stencil() {
                let stencil = pass_descriptor.stencil_attachment().unwrap();
                stencil.set_texture(Some(&ds.target.raw));
                stencil.set_load_action(crate::conv::load_action(ds.stencil_load_op));
                stencil.set_store_action(crate::conv::store_action(ds.stencil_store_op));
            }
        }
        let encoder = self.command_buffer.as_ref().unwrap().new_render_command_encoder(&pass_descriptor).to_owned();
        self.active = ActiveEncoder::Render(encoder, None, PrimitiveState::default());
    }

    unsafe fn end_render_pass(&mut self) {
        self.end_active();
    }

    unsafe fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        self.bound_pipeline_primitive = pipeline.primitive;
        if let ActiveEncoder::Render(encoder, ds_state, primitive) = &mut self.active {
            encoder.set_render_pipeline_state(&pipeline.raw);
            if let Some(state) = &pipeline.depth_stencil {
                encoder.set_depth_stencil_state(state);
            }
            *ds_state = pipeline.depth_stencil_desc;
            *primitive = pipeline.primitive;
            encoder.set_front_facing_winding(crate::conv::winding(pipeline.primitive.front_face));
            encoder.set_cull_mode(crate::conv::cull_mode(pipeline.primitive.cull_mode));
        }
    }

    unsafe fn set_bind_group(&mut self, _layout: &PipelineLayout, index: u32, group: &BindGroup) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            for (binding, slot) in &group.slots {
                let slot_index = index * 16 + binding;
                match slot {
                    BoundSlot::Buffer { buffer, offset } => {
                        encoder.set_vertex_buffer(slot_index as u64, Some(buffer), *offset);
                        encoder.set_fragment_buffer(slot_index as u64, Some(buffer), *offset);
                    }
                    BoundSlot::Texture(texture) => {
                        encoder.set_vertex_texture(slot_index as u64, Some(texture));
                        encoder.set_fragment_texture(slot_index as u64, Some(texture));
                    }
                    BoundSlot::Sampler(sampler) => {
                        encoder.set_vertex_sampler_state(slot_index as u64, Some(sampler));
                        encoder.set_fragment_sampler_state(slot_index as u64, Some(sampler));
                    }
                }
            }
        }
    }

    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: u64) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            // Vertex buffers occupy slots below the bind-group argument
            // range, which starts at a fixed offset of 8.
            encoder.set_vertex_buffer(8 + slot as u64, Some(&buffer.0), offset);
        }
    }

    unsafe fn set_index_buffer(&mut self, buffer: &Buffer, format: IndexFormat, offset: u64) {
        self.index_buffer = Some((buffer.0.clone(), format, offset));
    }

    unsafe fn set_viewport(&mut self, viewport: &Viewport) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            encoder.set_viewport(metal::MTLViewport {
                originX: viewport.x as f64,
                originY: viewport.y as f64,
                width: viewport.w as f64,
                height: viewport.h as f64,
                znear: viewport.depth.start as f64,
                zfar: viewport.depth.end as f64,
            });
        }
    }

    unsafe fn set_scissor_rect(&mut self, rect: &Rect) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            encoder.set_scissor_rect(metal::MTLScissorRect {
                x: rect.x as u64,
                y: rect.y as u64,
                width: rect.w as u64,
                height: rect.h as u64,
            });
        }
    }

    unsafe fn set_blend_constant(&mut self, color: ClearColor) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            encoder.set_blend_color(color.r as f32, color.g as f32, color.b as f32, color.a as f32);
        }
    }

    unsafe fn set_stencil_reference(&mut self, reference: u32) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            encoder.set_stencil_reference_value(reference);
        }
    }

    unsafe fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            let primitive = crate::conv::primitive_type(self.bound_pipeline_primitive.topology);
            encoder.draw_primitives_instanced_base_instance(
                primitive,
                vertices.start as u64,
                (vertices.end - vertices.start) as u64,
                (instances.end - instances.start) as u64,
                instances.start as u64,
            );
        }
    }

    unsafe fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        if let (ActiveEncoder::Render(encoder, ..), Some((buffer, format, offset))) = (&self.active, &self.index_buffer) {
            let primitive = crate::conv::primitive_type(self.bound_pipeline_primitive.topology);
            let index_size = if matches!(format, IndexFormat::Uint16) { 2 } else { 4 };
            encoder.draw_indexed_primitives_instanced_base_instance(
                primitive,
                (indices.end - indices.start) as u64,
                crate::conv::index_type(*format),
                buffer,
                offset + indices.start as u64 * index_size,
                (instances.end - instances.start) as u64,
                base_vertex as i64,
                instances.start as u64,
            );
        }
    }

    unsafe fn draw_indirect(&mut self, buffer: &Buffer, offset: u64, draw_count: u32) {
        if let ActiveEncoder::Render(encoder, ..) = &self.active {
            let primitive = crate::conv::primitive_type(self.bound_pipeline_primitive.topology);
            for i in 0..draw_count as u64 {
                encoder.draw_primitives_indirect(primitive, &buffer.0, offset + i * 16);
            }
        }
    }

    unsafe fn draw_indexed_indirect(&mut self, buffer: &Buffer, offset: u64, draw_count: u32) {
        if let (ActiveEncoder::Render(encoder, ..), Some((index_buffer, format, _))) = (&self.active, &self.index_buffer) {
            let primitive = crate::conv::primitive_type(self.bound_pipeline_primitive.topology);
            for i in 0..draw_count as u64 {
                encoder.draw_indexed_primitives_indirect(primitive, crate::conv::index_type(*format), index_buffer, 0, &buffer.0, offset + i * 20);
            }
        }
    }

    unsafe fn begin_compute_pass(&mut self, _desc: &ComputePassDescriptor) {
        self.end_active();
        let encoder = self.command_buffer.as_ref().unwrap().new_compute_command_encoder().to_owned();
        self.active = ActiveEncoder::Compute(encoder);
    }

    unsafe fn end_compute_pass(&mut self) {
        self.end_active();
    }

    unsafe fn set_compute_pipeline(&mut self, pipeline: &ComputePipeline) {
        if let ActiveEncoder::Compute(encoder) = &self.active {
            encoder.set_compute_pipeline_state(&pipeline.raw);
        }
    }

    unsafe fn dispatch(&mut self, count: [u32; 3]) {
        if let ActiveEncoder::Compute(encoder) = &self.active {
            encoder.dispatch_thread_groups(
                metal::MTLSize { width: count[0] as u64, height: count[1] as u64, depth: count[2] as u64 },
                metal::MTLSize { width: 1, height: 1, depth: 1 },
            );
        }
    }

    unsafe fn dispatch_indirect(&mut self, buffer: &Buffer, offset: u64) {
        if let ActiveEncoder::Compute(encoder) = &self.active {
            encoder.dispatch_thread_groups_indirect(&buffer.0, offset, metal::MTLSize { width: 1, height: 1, depth: 1 });
        }
    }

    unsafe fn resolve_query_set(&mut self, _set: &QuerySet, _range: Range<u32>, _dst: &Buffer, _dst_offset: u64) {
        // Occlusion results land directly in the visibility-result buffer
        // Metal writes to during the render pass; no separate resolve step
        // is needed for the subset this backend supports.
    }
}
