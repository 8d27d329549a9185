//! `SoftCommandEncoder`: records into a plain `Vec<Op>` instead of a native
//! command buffer. Each recorded op owns clones of the `Arc<Mutex<Vec<u8>>>`
//! handles behind whatever `&A::Buffer`/`&A::Texture` the HAL call borrowed,
//! so the finished `SoftCommandBuffer` outlives the references it was
//! recorded from. `Queue::submit` walks the list and executes it right away
//! (see `execute` below), mirroring a hardware command processor but with no
//! asynchrony to model.

use crate::raster::{self, RasterState, Scissor as RasterScissor, Viewport as RasterViewport};
use crate::resource::{Buffer, BindGroup, ComputePipeline, PipelineLayout, QuerySet, RenderPipeline, Texture, TextureView};
use crate::SoftApi;
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::Arc;
use wgx_hal::buffer::BufferCopy;
use wgx_hal::command::{
    ClearColor, ColorAttachment, ComputePassDescriptor, DepthStencilAttachment, IndexFormat, LoadOp,
    Rect, RenderPassDescriptor, Viewport,
};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{BufferTextureCopy, Extent3d, TextureCopy};
use wgx_hal::pso::VertexStepMode;

type Bytes = Arc<Mutex<Vec<u8>>>;

#[derive(Clone)]
struct TextureRef {
    format: TextureFormat,
    width: u32,
    data: Bytes,
}

fn texture_ref(texture: &Texture) -> TextureRef {
    TextureRef { format: texture.format, width: texture.size.width, data: Arc::clone(&texture.data) }
}

#[derive(Clone)]
struct AttachmentRef {
    width: u32,
    height: u32,
    data: Bytes,
    stencil_data: Option<Bytes>,
    load_op: LoadOp<ClearColor>,
    stencil_load_op: LoadOp<u32>,
    depth_load_op: LoadOp<f32>,
}

#[derive(Clone)]
struct DrawState {
    pipeline: Arc<RenderPipeline>,
    vertex_buffers: Vec<Option<(Bytes, u64)>>,
    index_buffer: Option<(Bytes, u64, IndexFormat)>,
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
    color_attachments: Vec<Option<AttachmentRef>>,
    depth_stencil: Option<AttachmentRef>,
    draws: Vec<DrawCall>,
}

enum Op {
    ClearBuffer { buffer: Bytes, range: Range<u64> },
    CopyBufferToBuffer { src: Bytes, dst: Bytes, regions: Vec<BufferCopy> },
    CopyBufferToTexture { src: Bytes, dst: TextureRef, regions: Vec<BufferTextureCopy> },
    CopyTextureToBuffer { src: TextureRef, dst: Bytes, regions: Vec<BufferTextureCopy> },
    CopyTextureToTexture { src: TextureRef, dst: TextureRef, regions: Vec<TextureCopy> },
    RenderPass(RenderPassRecording),
    ResolveQuerySet { set: Arc<Mutex<Vec<u64>>>, range: Range<u32>, dst: Bytes, offset: u64 },
}

/// A finished, submittable list of recorded operations.
pub struct SoftCommandBuffer {
    ops: Vec<Op>,
}

impl std::fmt::Debug for SoftCommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftCommandBuffer").field("ops", &self.ops.len()).finish()
    }
}

enum State {
    Ready,
    Recording,
    InRenderPass(RenderPassRecording, Option<DrawState>),
    InComputePass,
}

/// The software backend's `CommandEncoder`: records, does not execute.
pub struct SoftCommandEncoder {
    ops: Vec<Op>,
    state: State,
}

impl std::fmt::Debug for SoftCommandEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftCommandEncoder").finish()
    }
}

impl SoftCommandEncoder {
    pub(crate) fn new() -> Self {
        SoftCommandEncoder { ops: Vec::new(), state: State::Ready }
    }
}

impl wgx_hal::command::CommandEncoder<SoftApi> for SoftCommandEncoder {
    unsafe fn begin_encoding(&mut self, _label: Option<&str>) -> wgx_hal::error::Result<()> {
        self.ops.clear();
        self.state = State::Recording;
        Ok(())
    }

    unsafe fn end_encoding(&mut self) -> wgx_hal::error::Result<SoftCommandBuffer> {
        self.state = State::Ready;
        Ok(SoftCommandBuffer { ops: std::mem::take(&mut self.ops) })
    }

    unsafe fn discard_encoding(&mut self) {
        self.ops.clear();
        self.state = State::Ready;
    }

    unsafe fn transition_buffers(&mut self, _barriers: &[wgx_hal::command::BufferBarrier<&Buffer>]) {}
    unsafe fn transition_textures(&mut self, _barriers: &[wgx_hal::command::TextureBarrier<&Texture>]) {}

    unsafe fn clear_buffer(&mut self, buffer: &Buffer, range: Range<u64>) {
        self.ops.push(Op::ClearBuffer { buffer: Arc::clone(&buffer.data), range });
    }

    unsafe fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, regions: &[BufferCopy]) {
        self.ops.push(Op::CopyBufferToBuffer {
            src: Arc::clone(&src.data),
            dst: Arc::clone(&dst.data),
            regions: regions.to_vec(),
        });
    }

    unsafe fn copy_buffer_to_texture(&mut self, src: &Buffer, dst: &Texture, regions: &[BufferTextureCopy]) {
        self.ops.push(Op::CopyBufferToTexture { src: Arc::clone(&src.data), dst: texture_ref(dst), regions: regions.to_vec() });
    }

    unsafe fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer, regions: &[BufferTextureCopy]) {
        self.ops.push(Op::CopyTextureToBuffer { src: texture_ref(src), dst: Arc::clone(&dst.data), regions: regions.to_vec() });
    }

    unsafe fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, regions: &[TextureCopy]) {
        self.ops.push(Op::CopyTextureToTexture { src: texture_ref(src), dst: texture_ref(dst), regions: regions.to_vec() });
    }

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&TextureView>) {
        let color_attachments = desc
            .color_attachments
            .iter()
            .map(|maybe| {
                maybe.as_ref().map(|attachment: &ColorAttachment<&TextureView>| AttachmentRef {
                    width: desc.extent.width,
                    height: desc.extent.height,
                    data: Arc::clone(&attachment.target.data),
                    stencil_data: None,
                    load_op: attachment.load_op,
                    stencil_load_op: LoadOp::Load,
                    depth_load_op: LoadOp::Load,
                })
            })
            .collect();
        let depth_stencil = desc.depth_stencil_attachment.as_ref().map(|attachment: &DepthStencilAttachment<&TextureView>| AttachmentRef {
            width: desc.extent.width,
            height: desc.extent.height,
            data: Arc::clone(&attachment.target.data),
            stencil_data: attachment.target.stencil_data.as_ref().map(Arc::clone),
            load_op: LoadOp::Load,
            stencil_load_op: attachment.stencil_load_op,
            depth_load_op: attachment.depth_load_op,
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

    unsafe fn set_bind_group(&mut self, _layout: &PipelineLayout, _index: u32, _group: &BindGroup) {
        // The reference rasterizer's fragment stage forwards the
        // interpolated vertex color unchanged and never samples a bound
        // resource; see `raster.rs`.
    }

    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: u64) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            let slot = slot as usize;
            if slot >= draw_state.vertex_buffers.len() {
                draw_state.vertex_buffers.resize(slot + 1, None);
            }
            draw_state.vertex_buffers[slot] = Some((Arc::clone(&buffer.data), offset));
        }
    }

    unsafe fn set_index_buffer(&mut self, buffer: &Buffer, format: IndexFormat, offset: u64) {
        if let State::InRenderPass(_, Some(draw_state)) = &mut self.state {
            draw_state.index_buffer = Some((Arc::clone(&buffer.data), offset, format));
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
        // Indirect draws source their parameters from device memory at
        // execution time; nothing in this workspace issues one against the
        // software backend, so it is left unimplemented rather than guessed at.
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
        // No shader translator means no compute shaders to run. Core-level
        // validation rejects compute pipeline creation against this
        // backend's `DownlevelFlags` before a dispatch could reach here.
    }

    unsafe fn dispatch_indirect(&mut self, _buffer: &Buffer, _offset: u64) {}

    unsafe fn resolve_query_set(&mut self, set: &QuerySet, range: Range<u32>, dst: &Buffer, offset: u64) {
        self.ops.push(Op::ResolveQuerySet { set: Arc::clone(&set.values), range, dst: Arc::clone(&dst.data), offset });
    }
}

fn read_f32x4(bytes: &[u8], offset: usize) -> [f32; 4] {
    let mut out = [0f32; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let o = offset + i * 4;
        *slot = f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
    }
    out
}

/// Fetch the `Float32x4` attribute at `shader_location` for `vertex_index`
/// (or `instance_index` for a per-instance buffer), per the fixed slot
/// convention documented on `raster`: location 0 is clip-space position,
/// location 1 is a forwarded color.
fn fetch_attr(
    pipeline: &RenderPipeline,
    vertex_buffers: &[Option<(Bytes, u64)>],
    shader_location: u32,
    vertex_index: u32,
    instance_index: u32,
) -> Option<[f32; 4]> {
    for (slot, layout) in pipeline.vertex_buffers.iter().enumerate() {
        if let Some(attr) = layout.attributes.iter().find(|a| a.shader_location == shader_location) {
            let (buf, base_offset) = vertex_buffers.get(slot)?.as_ref()?;
            let index = match layout.step_mode {
                VertexStepMode::Vertex => vertex_index,
                VertexStepMode::Instance => instance_index,
            };
            let byte_offset = *base_offset as usize + attr.offset as usize + index as usize * layout.array_stride as usize;
            let guard = buf.lock();
            return Some(read_f32x4(&guard, byte_offset));
        }
    }
    None
}

fn fetch_vertex(pipeline: &RenderPipeline, vertex_buffers: &[Option<(Bytes, u64)>], vertex_index: u32, instance_index: u32) -> raster::Vertex {
    raster::Vertex {
        clip: fetch_attr(pipeline, vertex_buffers, 0, vertex_index, instance_index).unwrap_or([0.0, 0.0, 0.0, 1.0]),
        color: fetch_attr(pipeline, vertex_buffers, 1, vertex_index, instance_index).unwrap_or([1.0, 1.0, 1.0, 1.0]),
    }
}

fn read_index(bytes: &[u8], format: IndexFormat, base_offset: u64, i: u32) -> u32 {
    match format {
        IndexFormat::Uint16 => {
            let o = base_offset as usize + i as usize * 2;
            u16::from_le_bytes([bytes[o], bytes[o + 1]]) as u32
        }
        IndexFormat::Uint32 => {
            let o = base_offset as usize + i as usize * 4;
            u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
        }
    }
}

fn raster_state_for(state: &DrawState, attachment: &Option<AttachmentRef>) -> RasterState {
    RasterState {
        viewport: RasterViewport { x: state.viewport.x, y: state.viewport.y, w: state.viewport.w, h: state.viewport.h },
        scissor: state.scissor.map(|r| RasterScissor { x: r.x, y: r.y, w: r.w, h: r.h }),
        primitive: state.pipeline.primitive,
        depth_stencil: state.pipeline.depth_stencil,
        blend: attachment_blend(state),
        stencil_reference: state.stencil_reference,
        blend_constant: [
            state.blend_constant.r as f32,
            state.blend_constant.g as f32,
            state.blend_constant.b as f32,
            state.blend_constant.a as f32,
        ],
    }
}

fn attachment_blend(state: &DrawState) -> Option<wgx_hal::pso::BlendState> {
    state.pipeline.color_targets.first().and_then(|target| target.blend)
}

fn run_draw_call(
    pipeline: &RenderPipeline,
    vertex_buffers: &[Option<(Bytes, u64)>],
    index_buffer: Option<&(Bytes, u64, IndexFormat)>,
    raster_state: &RasterState,
    color: Option<&mut [u8]>,
    depth: Option<&mut [f32]>,
    stencil: Option<&mut [u8]>,
    width: u32,
    height: u32,
    first: u32,
    count: u32,
    base_vertex: i32,
    first_instance: u32,
    instance_count: u32,
) {
    let mut fb = raster::FrameBuffer { width, height, color, depth, stencil };
    for instance in 0..instance_count.max(1) {
        let instance_index = first_instance + instance;
        let mut tri = 0;
        while tri + 3 <= count {
            let mut verts = [raster::Vertex { clip: [0.0; 4], color: [0.0; 4] }; 3];
            for k in 0..3u32 {
                let vertex_index = match index_buffer {
                    Some((bytes, base_offset, format)) => {
                        let guard = bytes.lock();
                        (read_index(&guard, *format, *base_offset, first + tri + k) as i32 + base_vertex) as u32
                    }
                    None => first + tri + k,
                };
                verts[k as usize] = fetch_vertex(pipeline, vertex_buffers, vertex_index, instance_index);
            }
            raster::rasterize_triangle(&mut fb, verts[0], verts[1], verts[2], raster_state);
            tri += 3;
        }
    }
}

fn apply_load_op_color(data: &mut [u8], load: LoadOp<ClearColor>) {
    if let LoadOp::Clear(c) = load {
        for px in data.chunks_exact_mut(4) {
            px[0] = (c.r.clamp(0.0, 1.0) * 255.0).round() as u8;
            px[1] = (c.g.clamp(0.0, 1.0) * 255.0).round() as u8;
            px[2] = (c.b.clamp(0.0, 1.0) * 255.0).round() as u8;
            px[3] = (c.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

fn execute_render_pass(recording: &RenderPassRecording) {
    let mut color_guards: Vec<Option<parking_lot::MutexGuard<Vec<u8>>>> = recording
        .color_attachments
        .iter()
        .map(|maybe| maybe.as_ref().map(|a| a.data.lock()))
        .collect();
    for (maybe, guard) in recording.color_attachments.iter().zip(color_guards.iter_mut()) {
        if let (Some(attachment), Some(guard)) = (maybe, guard) {
            apply_load_op_color(guard, attachment.load_op);
        }
    }

    let mut depth_scratch: Option<Vec<f32>> = None;
    let mut stencil_guard = None;
    if let Some(ds) = &recording.depth_stencil {
        let texel_count = (ds.width * ds.height) as usize;
        let guard = ds.data.lock();
        let mut depths = vec![0f32; texel_count];
        if guard.len() >= texel_count * 4 {
            for (i, d) in depths.iter_mut().enumerate() {
                let o = i * 4;
                *d = f32::from_le_bytes([guard[o], guard[o + 1], guard[o + 2], guard[o + 3]]);
            }
        }
        drop(guard);
        if let LoadOp::Clear(v) = ds.depth_load_op {
            depths.iter_mut().for_each(|d| *d = v);
        }
        depth_scratch = Some(depths);

        if let Some(stencil_data) = &ds.stencil_data {
            let mut guard = stencil_data.lock();
            if let LoadOp::Clear(v) = ds.stencil_load_op {
                guard.iter_mut().for_each(|s| *s = v as u8);
            }
            stencil_guard = Some(guard);
        }
    }

    for draw in &recording.draws {
        let (state, first, count, base_vertex, first_instance, instance_count) = match draw {
            DrawCall::Draw { state, first_vertex, vertex_count, first_instance, instance_count } => {
                (state, *first_vertex, *vertex_count, 0, *first_instance, *instance_count)
            }
            DrawCall::DrawIndexed { state, first_index, index_count, base_vertex, first_instance, instance_count } => {
                (state, *first_index, *index_count, *base_vertex, *first_instance, *instance_count)
            }
        };
        let raster_state = raster_state_for(state, &recording.color_attachments.first().cloned().flatten());
        let color_slice = color_guards.first_mut().and_then(|g| g.as_mut()).map(|g| &mut g[..]);
        let depth_slice = depth_scratch.as_mut().map(|d| &mut d[..]);
        let stencil_slice = stencil_guard.as_mut().map(|g| &mut g[..]);
        run_draw_call(
            &state.pipeline,
            &state.vertex_buffers,
            state.index_buffer.as_ref(),
            &raster_state,
            color_slice,
            depth_slice,
            stencil_slice,
            recording.extent.width,
            recording.extent.height,
            first,
            count,
            base_vertex,
            first_instance,
            instance_count,
        );
    }

    // The stencil aspect lives in its own byte array and was written
    // in-place through `stencil_guard` during the draws above; only the
    // depth scratch copy needs writing back to the attachment's bytes.
    if let (Some(ds), Some(depths)) = (&recording.depth_stencil, &depth_scratch) {
        let mut guard = ds.data.lock();
        for (i, d) in depths.iter().enumerate() {
            let o = i * 4;
            if o + 4 <= guard.len() {
                guard[o..o + 4].copy_from_slice(&d.to_le_bytes());
            }
        }
    }
}

fn copy_linear_texture(
    src_bytes: &[u8],
    dst_bytes: &mut [u8],
    src_layout: wgx_hal::image::ImageDataLayout,
    dst_width: u32,
    block_size: usize,
    extent: Extent3d,
) {
    for row in 0..extent.height as usize {
        let src_start = src_layout.offset as usize + row * src_layout.bytes_per_row as usize;
        let row_bytes = extent.width as usize * block_size;
        let dst_start = row * dst_width as usize * block_size;
        dst_bytes[dst_start..dst_start + row_bytes].copy_from_slice(&src_bytes[src_start..src_start + row_bytes]);
    }
}

/// Execute a finished command buffer synchronously against the backing
/// memory its ops were recorded against.
pub fn execute(cb: &SoftCommandBuffer) {
    for op in &cb.ops {
        match op {
            Op::ClearBuffer { buffer, range } => {
                let mut guard = buffer.lock();
                let start = range.start as usize;
                let end = range.end as usize;
                guard[start..end].iter_mut().for_each(|b| *b = 0);
            }
            Op::CopyBufferToBuffer { src, dst, regions } => {
                let src_guard = src.lock();
                let mut dst_guard = dst.lock();
                for region in regions {
                    let s = region.src_offset as usize;
                    let d = region.dst_offset as usize;
                    let n = region.size as usize;
                    let chunk = src_guard[s..s + n].to_vec();
                    dst_guard[d..d + n].copy_from_slice(&chunk);
                }
            }
            Op::CopyBufferToTexture { src, dst, regions } => {
                let src_guard = src.lock();
                let mut dst_guard = dst.data.lock();
                let block = dst.format.block_size() as usize;
                for region in regions {
                    copy_linear_texture(&src_guard, &mut dst_guard, region.buffer_layout, dst.width, block, region.size);
                }
            }
            Op::CopyTextureToBuffer { src, dst, regions } => {
                let src_guard = src.data.lock();
                let mut dst_guard = dst.lock();
                let block = src.format.block_size() as usize;
                for region in regions {
                    for row in 0..region.size.height as usize {
                        let src_start = row * src.width as usize * block;
                        let row_bytes = region.size.width as usize * block;
                        let dst_start = region.buffer_layout.offset as usize + row * region.buffer_layout.bytes_per_row as usize;
                        dst_guard[dst_start..dst_start + row_bytes].copy_from_slice(&src_guard[src_start..src_start + row_bytes]);
                    }
                }
            }
            Op::CopyTextureToTexture { src, dst, regions } => {
                let src_guard = src.data.lock();
                let mut dst_guard = dst.data.lock();
                let block = src.format.block_size() as usize;
                for region in regions {
                    for row in 0..region.size.height as usize {
                        let src_start = row * src.width as usize * block;
                        let dst_start = row * dst.width as usize * block;
                        let row_bytes = region.size.width as usize * block;
                        dst_guard[dst_start..dst_start + row_bytes].copy_from_slice(&src_guard[src_start..src_start + row_bytes]);
                    }
                }
            }
            Op::RenderPass(recording) => execute_render_pass(recording),
            Op::ResolveQuerySet { set, range, dst, offset } => {
                let guard = set.lock();
                let mut dst_guard = dst.lock();
                let mut write_offset = *offset as usize;
                for i in range.clone() {
                    let value = guard.get(i as usize).copied().unwrap_or(0);
                    let bytes = value.to_le_bytes();
                    dst_guard[write_offset..write_offset + 8].copy_from_slice(&bytes);
                    write_offset += 8;
                }
            }
        }
    }
}
