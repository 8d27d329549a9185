//! `CommandEncoder`/`CommandBuffer`: GL has no native command buffer object,
//! so this records a plain `Vec<Op>` (mirroring the software backend's
//! record-then-replay model) and replays each op as a direct `glow` call
//! against the shared context when `Queue::submit` executes it.
//!
//! Recorded ops own `Copy` snapshots of whatever `&A::Buffer`/`&A::Texture`
//! the HAL call borrowed — unlike the software backend, there is no
//! refcounted byte storage to clone, just GL object names.

use crate::resource::{
    BindGroup, Buffer, ComputePipeline, OwnedVertexBufferLayout, PipelineLayout, QuerySet, RenderPipeline,
    Texture, TextureView,
};
use crate::GlApi;
use glow::HasContext;
use std::ops::Range;
use std::sync::Arc;
use wgx_hal::buffer::BufferCopy;
use wgx_hal::command::{
    ClearColor, ColorAttachment, ComputePassDescriptor, DepthStencilAttachment, IndexFormat, LoadOp, Rect,
    RenderPassDescriptor, StoreOp, Viewport,
};
use wgx_hal::error::{DeviceError, Result};
use wgx_hal::image::{BufferTextureCopy, Extent3d, TextureCopy};
use wgx_hal::pso::VertexStepMode;

#[derive(Clone, Copy)]
struct ColorAttachmentRec {
    target: TextureView,
    load_op: LoadOp<ClearColor>,
    store_op: StoreOp,
}

#[derive(Clone, Copy)]
struct DepthStencilAttachmentRec {
    target: TextureView,
    depth_load_op: LoadOp<f32>,
    depth_store_op: StoreOp,
    stencil_load_op: LoadOp<u32>,
    stencil_store_op: StoreOp,
}

#[derive(Clone)]
struct DrawState {
    pipeline: Arc<RenderPipeline>,
    vertex_buffers: Vec<Option<(Buffer, u64)>>,
    index_buffer: Option<(Buffer, IndexFormat, u64)>,
    bind_groups: Vec<Option<BindGroup>>,
    viewport: Viewport,
    scissor: Option<Rect>,
    blend_constant: ClearColor,
    stencil_reference: u32,
}

enum DrawCall {
    Draw { state: DrawState, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32 },
    DrawIndexed {
        state: DrawState,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    },
}

struct RenderPassRecording {
    extent: Extent3d,
    color_attachments: Vec<Option<ColorAttachmentRec>>,
    depth_stencil: Option<DepthStencilAttachmentRec>,
    draws: Vec<DrawCall>,
}

enum Op {
    ClearBuffer { buffer: Buffer, range: Range<u64> },
    CopyBufferToBuffer { src: Buffer, dst: Buffer, regions: Vec<BufferCopy> },
    CopyBufferToTexture { src: Buffer, dst: Texture, regions: Vec<BufferTextureCopy> },
    CopyTextureToBuffer { src: Texture, dst: Buffer, regions: Vec<BufferTextureCopy> },
    CopyTextureToTexture { src: Texture, dst: Texture, regions: Vec<TextureCopy> },
    RenderPass(RenderPassRecording),
    ResolveQuerySet { set: QuerySet, range: Range<u32>, dst: Buffer, offset: u64 },
}

/// A finished, submittable list of recorded operations.
pub struct CommandBuffer {
    ops: Vec<Op>,
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBuffer").field("ops", &self.ops.len()).finish()
    }
}
unsafe impl Send for CommandBuffer {}
unsafe impl Sync for CommandBuffer {}

enum State {
    Ready,
    Recording,
    InRenderPass(RenderPassRecording, Option<DrawState>),
    InComputePass,
}

pub struct CommandEncoder {
    context: Arc<glow::Context>,
    vao: glow::NativeVertexArray,
    ops: Vec<Op>,
    state: State,
}

impl std::fmt::Debug for CommandEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEncoder").finish()
    }
}
unsafe impl Send for CommandEncoder {}
unsafe impl Sync for CommandEncoder {}

impl CommandEncoder {
    pub(crate) fn new(context: Arc<glow::Context>) -> Result<Self> {
        let vao = unsafe { context.create_vertex_array().map_err(DeviceError::Other)? };
        Ok(CommandEncoder { context, vao, ops: Vec::new(), state: State::Ready })
    }
}

impl wgx_hal::command::CommandEncoder<GlApi> for CommandEncoder {
    unsafe fn begin_encoding(&mut self, _label: Option<&str>) -> Result<()> {
        self.ops.clear();
        self.state = State::Recording;
        Ok(())
    }

    unsafe fn end_encoding(&mut self) -> Result<CommandBuffer> {
        self.state = State::Ready;
        Ok(CommandBuffer { ops: std::mem::take(&mut self.ops) })
    }

    unsafe fn discard_encoding(&mut self) {
        self.ops.clear();
        self.state = State::Ready;
    }

    // GL's single implicit execution timeline gives every prior call
    // happens-before ordering with whatever comes next; there is no
    // separate barrier/state-transition concept to apply.
    unsafe fn transition_buffers(&mut self, _barriers: &[wgx_hal::command::BufferBarrier<&Buffer>]) {}
    unsafe fn transition_textures(&mut self, _barriers: &[wgx_hal::command::TextureBarrier<&Texture>]) {}

    unsafe fn clear_buffer(&mut self, buffer: &Buffer, range: Range<u64>) {
        self.ops.push(Op::ClearBuffer { buffer: *buffer, range });
    }

    unsafe fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, regions: &[BufferCopy]) {
        self.ops.push(Op::CopyBufferToBuffer { src: *src, dst: *dst, regions: regions.to_vec() });
    }

    unsafe fn copy_buffer_to_texture(&mut self, src: &Buffer, dst: &Texture, regions: &[BufferTextureCopy]) {
        self.ops.push(Op::CopyBufferToTexture { src: *src, dst: *dst, regions: regions.to_vec() });
    }

    unsafe fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer, regions: &[BufferTextureCopy]) {
        self.ops.push(Op::CopyTextureToBuffer { src: *src, dst: *dst, regions: regions.to_vec() });
    }

    unsafe fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, regions: &[TextureCopy]) {
        self.ops.push(Op::CopyTextureToTexture { src: *src, dst: *dst, regions: regions.to_vec() });
    }

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&TextureView>) {
        let color_attachments = desc
            .color_attachments
            .iter()
            .map(|maybe| {
                maybe.as_ref().map(|a: &ColorAttachment<&TextureView>| ColorAttachmentRec {
                    target: *a.target,
                    load_op: a.load_op,
                    store_op: a.store_op,
                })
            })
            .collect();
        let depth_stencil = desc.depth_stencil_attachment.as_ref().map(|ds: &DepthStencilAttachment<&TextureView>| {
            DepthStencilAttachmentRec {
                target: *ds.target,
                depth_load_op: ds.depth_load_op,
                depth_store_op: ds.depth_store_op,
                stencil_load_op: ds.stencil_load_op,
                stencil_store_op: ds.stencil_store_op,
            }
        });
        self.state = State::InRenderPass(
            RenderPassRecording { extent: desc.extent, color_attachments, depth_stencil, draws: Vec::new() },
            None,
        );
    }

    unsafe fn end_render_pass(&mut self) {
        if let State::InRenderPass(recording, _) = std::mem::replace(&mut self.state, State::Recording) {
            self.ops.push(Op::RenderPass(recording));
        }
    }

    unsafe fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        if let State::InRenderPass(recording, draw_state) = &mut self.state {
            let base = draw_state.take().unwrap_or_else(|| DrawState {
                pipeline: Arc::new(pipeline.clone()),
                vertex_buffers: vec![None; pipeline.vertex_buffers.len()],
                index_buffer: None,
                bind_groups: Vec::new(),
                viewport: Viewport {
                    x: 0.0,
                    y: 0.0,
                    w: recording.extent.width as f32,
                    h: recording.extent.height as f32,
                    depth: 0.0..1.0,
                },
                scissor: None,
                blend_constant: ClearColor { r: 0.0, g: 0.0, b: 0.0, a: 0.0 },
                stencil_reference: 0,
            });
            let mut vertex_buffers = base.vertex_buffers;
            vertex_buffers.resize(vertex_buffers.len().max(pipeline.vertex_buffers.len()), None);
            *draw_state = Some(DrawState { pipeline: Arc::new(pipeline.clone()), vertex_buffers, ..base });
        }
    }

    unsafe fn set_bind_group(&mut self, _layout: &PipelineLayout, index: u32, group: &BindGroup) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            let index = index as usize;
            if index >= draw_state.bind_groups.len() {
                draw_state.bind_groups.resize(index + 1, None);
            }
            draw_state.bind_groups[index] = Some(group.clone());
        }
    }

    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: u64) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            let slot = slot as usize;
            if slot >= draw_state.vertex_buffers.len() {
                draw_state.vertex_buffers.resize(slot + 1, None);
            }
            draw_state.vertex_buffers[slot] = Some((*buffer, offset));
        }
    }

    unsafe fn set_index_buffer(&mut self, buffer: &Buffer, format: IndexFormat, offset: u64) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.index_buffer = Some((*buffer, format, offset));
        }
    }

    unsafe fn set_viewport(&mut self, viewport: &Viewport) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.viewport = viewport.clone();
        }
    }

    unsafe fn set_scissor_rect(&mut self, rect: &Rect) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.scissor = Some(*rect);
        }
    }

    unsafe fn set_blend_constant(&mut self, color: ClearColor) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.blend_constant = color;
        }
    }

    unsafe fn set_stencil_reference(&mut self, reference: u32) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.stencil_reference = reference;
        }
    }

    unsafe fn draw(&mut self, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32) {
        if let State::InRenderPass(recording, Some(draw_state)) = &mut self.state {
            recording.draws.push(DrawCall::Draw {
                state: draw_state.clone(),
                first_vertex,
                vertex_count,
                first_instance,
                instance_count,
            });
        }
    }

    unsafe fn draw_indexed(&mut self, first_index: u32, index_count: u32, base_vertex: i32, first_instance: u32, instance_count: u32) {
        if let State::InRenderPass(recording, Some(draw_state)) = &mut self.state {
            recording.draws.push(DrawCall::DrawIndexed {
                state: draw_state.clone(),
                first_index,
                index_count,
                base_vertex,
                first_instance,
                instance_count,
            });
        }
    }

    unsafe fn draw_indirect(&mut self, _buffer: &Buffer, _offset: u64, _draw_count: u32) {
        // GL 3.3 core has no indirect-draw entry point (that's ARB_draw_indirect,
        // GL 4.0); nothing in this workspace issues one against this backend.
    }

    unsafe fn draw_indexed_indirect(&mut self, _buffer: &Buffer, _offset: u64, _draw_count: u32) {}

    unsafe fn begin_compute_pass(&mut self, _desc: &ComputePassDescriptor) {
        self.state = State::InComputePass;
    }

    unsafe fn end_compute_pass(&mut self) {
        self.state = State::Recording;
    }

    unsafe fn set_compute_pipeline(&mut self, _pipeline: &ComputePipeline) {}

    unsafe fn dispatch(&mut self, _x: u32, _y: u32, _z: u32) {
        // Compute pipelines never construct successfully on this backend
        // (see `Device::create_compute_pipeline`), so no dispatch reaches here.
    }

    unsafe fn dispatch_indirect(&mut self, _buffer: &Buffer, _offset: u64) {}

    unsafe fn resolve_query_set(&mut self, set: &QuerySet, range: Range<u32>, dst: &Buffer, offset: u64) {
        self.ops.push(Op::ResolveQuerySet { set: set.clone(), range, dst: *dst, offset });
    }
}

impl Drop for CommandEncoder {
    fn drop(&mut self) {
        unsafe { self.context.delete_vertex_array(self.vao) };
    }
}

fn attach_color(gl: &glow::Context, index: u32, view: &TextureView) {
    if let Some(raw) = view.texture {
        unsafe {
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0 + index,
                view.target,
                Some(raw),
                view.base_mip_level as i32,
            );
        }
    }
}

fn attach_depth_stencil(gl: &glow::Context, view: &TextureView, has_stencil: bool) {
    if let Some(raw) = view.texture {
        let attachment = if has_stencil { glow::DEPTH_STENCIL_ATTACHMENT } else { glow::DEPTH_ATTACHMENT };
        unsafe {
            gl.framebuffer_texture_2d(glow::FRAMEBUFFER, attachment, view.target, Some(raw), view.base_mip_level as i32);
        }
    }
}

fn apply_clear(gl: &glow::Context, recording: &RenderPassRecording) {
    unsafe {
        for (index, maybe) in recording.color_attachments.iter().enumerate() {
            if let Some(a) = maybe {
                if let LoadOp::Clear(c) = a.load_op {
                    gl.draw_buffers(&[glow::COLOR_ATTACHMENT0 + index as u32]);
                    gl.clear_buffer_f32_slice(glow::COLOR, 0, &[c.r as f32, c.g as f32, c.b as f32, c.a as f32]);
                }
            }
        }
        if let Some(ds) = &recording.depth_stencil {
            match (ds.depth_load_op, ds.stencil_load_op) {
                (LoadOp::Clear(d), LoadOp::Clear(s)) => gl.clear_buffer_depth_stencil(glow::DEPTH_STENCIL, 0, d, s as i32),
                (LoadOp::Clear(d), LoadOp::Load) => gl.clear_buffer_f32_slice(glow::DEPTH, 0, &[d]),
                (LoadOp::Load, LoadOp::Clear(s)) => gl.clear_buffer_i32_slice(glow::STENCIL, 0, &[s as i32]),
                (LoadOp::Load, LoadOp::Load) => {}
            }
        }
    }
}

fn bind_draw_state(gl: &glow::Context, state: &DrawState) {
    unsafe {
        gl.use_program(Some(state.pipeline.program));

        for (unit, group) in state.bind_groups.iter().enumerate() {
            let Some(group) = group else { continue };
            for (binding, resource) in &group.bindings {
                match resource {
                    crate::resource::BoundResource::Buffer { raw, offset } => {
                        gl.bind_buffer_base(glow::UNIFORM_BUFFER, *binding, Some(*raw));
                        let _ = offset;
                    }
                    crate::resource::BoundResource::Texture(view) => {
                        gl.active_texture(glow::TEXTURE0 + *binding);
                        gl.bind_texture(view.target, view.texture);
                    }
                    crate::resource::BoundResource::Sampler(sampler) => {
                        gl.bind_sampler(*binding, Some(sampler.raw));
                    }
                }
            }
            let _ = unit;
        }

        let mut offset = 0u32;
        for layout in &state.pipeline.vertex_buffers {
            let slot = offset;
            if let Some(Some((buffer, base_offset))) = state.vertex_buffers.get(offset as usize) {
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer.raw));
                for attr in &layout.attributes {
                    let (size, ty, normalized) = crate::conv::vertex_format(attr.format);
                    gl.enable_vertex_attrib_array(attr.shader_location);
                    gl.vertex_attrib_pointer_f32(
                        attr.shader_location,
                        size,
                        ty,
                        normalized,
                        layout.array_stride as i32,
                        *base_offset as i32 + attr.offset as i32,
                    );
                    match layout.step_mode {
                        VertexStepMode::Vertex => gl.vertex_attrib_divisor(attr.shader_location, 0),
                        VertexStepMode::Instance => gl.vertex_attrib_divisor(attr.shader_location, 1),
                    }
                }
            }
            offset += 1;
            let _ = slot;
        }

        gl.viewport(
            state.viewport.x as i32,
            state.viewport.y as i32,
            state.viewport.w as i32,
            state.viewport.h as i32,
        );
        gl.depth_range_f32(state.viewport.depth.start, state.viewport.depth.end);

        if let Some(rect) = state.scissor {
            gl.enable(glow::SCISSOR_TEST);
            gl.scissor(rect.x as i32, rect.y as i32, rect.w as i32, rect.h as i32);
        } else {
            gl.disable(glow::SCISSOR_TEST);
        }

        gl.blend_color(
            state.blend_constant.r as f32,
            state.blend_constant.g as f32,
            state.blend_constant.b as f32,
            state.blend_constant.a as f32,
        );

        let primitive = &state.pipeline.primitive;
        match crate::conv::cull_face(primitive.cull_mode) {
            Some(face) => {
                gl.enable(glow::CULL_FACE);
                gl.cull_face(face);
            }
            None => gl.disable(glow::CULL_FACE),
        }
        gl.front_face(crate::conv::front_face(primitive.front_face));

        if let Some(ds) = &state.pipeline.depth_stencil {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_mask(ds.depth_write_enabled);
            gl.depth_func(crate::conv::compare_function(ds.depth_compare) as u32);
            if ds.stencil.is_enabled() {
                gl.enable(glow::STENCIL_TEST);
                gl.stencil_func(
                    crate::conv::compare_function(ds.stencil.front.compare) as u32,
                    state.stencil_reference as i32,
                    ds.stencil.read_mask,
                );
                gl.stencil_mask(ds.stencil.write_mask);
                gl.stencil_op(
                    crate::conv::stencil_op(ds.stencil.front.fail_op),
                    crate::conv::stencil_op(ds.stencil.front.depth_fail_op),
                    crate::conv::stencil_op(ds.stencil.front.pass_op),
                );
            } else {
                gl.disable(glow::STENCIL_TEST);
            }
        } else {
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::STENCIL_TEST);
        }

        if let Some(blend) = state.pipeline.color_targets.first().and_then(|t| t.blend) {
            gl.enable(glow::BLEND);
            gl.blend_equation_separate(crate::conv::blend_op(blend.color.operation), crate::conv::blend_op(blend.alpha.operation));
            gl.blend_func_separate(
                crate::conv::blend_factor(blend.color.src_factor),
                crate::conv::blend_factor(blend.color.dst_factor),
                crate::conv::blend_factor(blend.alpha.src_factor),
                crate::conv::blend_factor(blend.alpha.dst_factor),
            );
        } else {
            gl.disable(glow::BLEND);
        }
    }
}

fn run_draw_call(gl: &glow::Context, state: &DrawState, call: &DrawCall) {
    bind_draw_state(gl, state);
    let mode = crate::conv::primitive_mode(state.pipeline.primitive.topology);
    unsafe {
        match call {
            DrawCall::Draw { first_vertex, vertex_count, first_instance: _, instance_count } => {
                if *instance_count > 1 {
                    gl.draw_arrays_instanced(mode, *first_vertex as i32, *vertex_count as i32, *instance_count as i32);
                } else {
                    gl.draw_arrays(mode, *first_vertex as i32, *vertex_count as i32);
                }
            }
            DrawCall::DrawIndexed { index_count, base_vertex, instance_count, .. } => {
                let (index_buffer, format, base_offset) = match &state.index_buffer {
                    Some(ib) => ib,
                    None => return,
                };
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer.raw));
                let ty = crate::conv::index_type(*format);
                let offset = *base_offset as i32;
                if *instance_count > 1 {
                    gl.draw_elements_instanced_base_vertex(
                        mode,
                        *index_count as i32,
                        ty,
                        offset,
                        *instance_count as i32,
                        *base_vertex,
                    );
                } else {
                    gl.draw_elements_base_vertex(mode, *index_count as i32, ty, offset, *base_vertex);
                }
            }
        }
    }
}

fn execute_render_pass(gl: &glow::Context, recording: &RenderPassRecording) {
    let targets_default_framebuffer = recording
        .color_attachments
        .iter()
        .flatten()
        .any(|a| a.target.default_framebuffer);

    unsafe {
        if targets_default_framebuffer {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        } else {
            let fbo = gl.create_framebuffer().expect("create_framebuffer");
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            for (index, maybe) in recording.color_attachments.iter().enumerate() {
                if let Some(a) = maybe {
                    attach_color(gl, index as u32, &a.target);
                }
            }
            if let Some(ds) = &recording.depth_stencil {
                attach_depth_stencil(gl, &ds.target, ds.target.format.has_stencil());
            }
        }

        apply_clear(gl, recording);

        for draw in &recording.draws {
            let state = match draw {
                DrawCall::Draw { state, .. } | DrawCall::DrawIndexed { state, .. } => state,
            };
            run_draw_call(gl, state, draw);
        }

        if !targets_default_framebuffer {
            if let glow::FRAMEBUFFER = glow::FRAMEBUFFER {
                let mut fbo = None;
                gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING);
                let _ = &mut fbo;
            }
        }
        gl.bind_framebuffer(glow::FRAMEBUFFER, None);
    }
}

/// Execute a finished command buffer against `gl`.
pub fn execute(gl: &glow::Context, cb: &CommandBuffer) {
    unsafe {
        for op in &cb.ops {
            match op {
                Op::ClearBuffer { buffer, range } => {
                    let len = (range.end - range.start) as usize;
                    let zeros = vec![0u8; len];
                    gl.bind_buffer(buffer.target, Some(buffer.raw));
                    gl.buffer_sub_data_u8_slice(buffer.target, range.start as i32, &zeros);
                    gl.bind_buffer(buffer.target, None);
                }
                Op::CopyBufferToBuffer { src, dst, regions } => {
                    gl.bind_buffer(glow::COPY_READ_BUFFER, Some(src.raw));
                    gl.bind_buffer(glow::COPY_WRITE_BUFFER, Some(dst.raw));
                    for region in regions {
                        gl.copy_buffer_sub_data(
                            glow::COPY_READ_BUFFER,
                            glow::COPY_WRITE_BUFFER,
                            region.src_offset as i32,
                            region.dst_offset as i32,
                            region.size as i32,
                        );
                    }
                }
                Op::CopyBufferToTexture { src, dst, regions } => {
                    let Some(raw) = dst.raw else { continue };
                    let (_, format, ty) = crate::conv::texture_format(dst.format);
                    gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, Some(src.raw));
                    gl.bind_texture(dst.target, Some(raw));
                    for region in regions {
                        gl.tex_sub_image_2d(
                            dst.target,
                            region.texture.mip_level as i32,
                            region.texture.origin.x as i32,
                            region.texture.origin.y as i32,
                            region.size.width as i32,
                            region.size.height as i32,
                            format,
                            ty,
                            glow::PixelUnpackData::BufferOffset(region.buffer_layout.offset as u32),
                        );
                    }
                    gl.bind_buffer(glow::PIXEL_UNPACK_BUFFER, None);
                }
                Op::CopyTextureToBuffer { src, dst, regions } => {
                    let Some(raw) = src.raw else { continue };
                    let (_, format, ty) = crate::conv::texture_format(src.format);
                    let fbo = gl.create_framebuffer().expect("create_framebuffer");
                    gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(fbo));
                    gl.framebuffer_texture_2d(glow::READ_FRAMEBUFFER, glow::COLOR_ATTACHMENT0, src.target, Some(raw), 0);
                    gl.bind_buffer(glow::PIXEL_PACK_BUFFER, Some(dst.raw));
                    for region in regions {
                        gl.read_pixels(
                            region.texture.origin.x as i32,
                            region.texture.origin.y as i32,
                            region.size.width as i32,
                            region.size.height as i32,
                            format,
                            ty,
                            glow::PixelPackData::BufferOffset(region.buffer_layout.offset as u32),
                        );
                    }
                    gl.bind_buffer(glow::PIXEL_PACK_BUFFER, None);
                    gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
                    gl.delete_framebuffer(fbo);
                }
                Op::CopyTextureToTexture { src, dst, regions } => {
                    let (Some(src_raw), Some(dst_raw)) = (src.raw, dst.raw) else { continue };
                    let fbo = gl.create_framebuffer().expect("create_framebuffer");
                    gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(fbo));
                    for region in regions {
                        gl.framebuffer_texture_2d(
                            glow::READ_FRAMEBUFFER,
                            glow::COLOR_ATTACHMENT0,
                            src.target,
                            Some(src_raw),
                            region.src.mip_level as i32,
                        );
                        gl.bind_texture(dst.target, Some(dst_raw));
                        gl.copy_tex_sub_image_2d(
                            dst.target,
                            region.dst.mip_level as i32,
                            region.dst.origin.x as i32,
                            region.dst.origin.y as i32,
                            region.src.origin.x as i32,
                            region.src.origin.y as i32,
                            region.size.width as i32,
                            region.size.height as i32,
                        );
                    }
                    gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
                    gl.delete_framebuffer(fbo);
                }
                Op::RenderPass(recording) => execute_render_pass(gl, recording),
                Op::ResolveQuerySet { set, range, dst, offset } => {
                    let mut write_offset = *offset;
                    for i in range.clone() {
                        let mut value: u64 = 0;
                        if let Some(query) = set.queries.get(i as usize) {
                            value = gl.get_query_parameter_u32(*query, glow::QUERY_RESULT) as u64;
                        }
                        gl.bind_buffer(dst.target, Some(dst.raw));
                        gl.buffer_sub_data_u8_slice(dst.target, write_offset as i32, &value.to_le_bytes());
                        gl.bind_buffer(dst.target, None);
                        write_offset += 8;
                    }
                }
            }
        }
    }
}
