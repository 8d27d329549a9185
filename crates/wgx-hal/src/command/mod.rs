//! The raw command encoder contract (§4.1, §4.3).
//!
//! A backend's `CommandEncoder` is a linear recorder with the state machine
//! `Ready → Recording → Finished | Discarded`. Pass-nesting validity (at
//! most one pass open at a time, draws requiring a bound pipeline, …) is
//! enforced one layer up in `wgx-core::command`; the HAL trusts its caller
//! and only reports backend-level failures.

use crate::buffer::{BufferCopy, BufferUses};
use crate::image::{BufferTextureCopy, TextureCopy, TextureUses};
use crate::Api;
use std::ops::Range;

/// Descriptor passed to `Device::create_command_encoder`.
#[derive(Clone, Debug)]
pub struct CommandEncoderDescriptor<'a, Q> {
    pub label: Option<std::borrow::Cow<'a, str>>,
    /// The queue this encoder's command buffers will be submitted to.
    pub queue: Q,
}

/// A state transition for a single buffer, translated by the backend into
/// its native resource-state / memory-barrier model.
#[derive(Clone, Copy, Debug)]
pub struct BufferBarrier<R> {
    pub buffer: R,
    pub usage: Range<BufferUses>,
}

/// A state transition for a single texture subresource range.
#[derive(Clone, Copy, Debug)]
pub struct TextureBarrier<R> {
    pub texture: R,
    pub range: crate::image::SubresourceRange,
    pub usage: Range<TextureUses>,
}

/// A 2D viewport in framebuffer pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub depth: Range<f32>,
}

/// An axis-aligned scissor rectangle, in framebuffer pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// Clamp `self` so it lies entirely within `bounds`.
    pub fn clamped_to(self, bounds: Rect) -> Rect {
        let x = self.x.max(bounds.x).min(bounds.x + bounds.w);
        let y = self.y.max(bounds.y).min(bounds.y + bounds.h);
        let x_end = (self.x + self.w).max(bounds.x).min(bounds.x + bounds.w);
        let y_end = (self.y + self.h).max(bounds.y).min(bounds.y + bounds.h);
        Rect {
            x,
            y,
            w: x_end.saturating_sub(x),
            h: y_end.saturating_sub(y),
        }
    }
}

/// An RGBA clear color, always specified in linear space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// How a render-pass attachment's prior contents are treated on pass entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadOp<C> {
    /// Discard whatever is present and fill with `C`.
    Clear(C),
    /// Preserve whatever is present.
    Load,
}

/// How a render-pass attachment's contents are treated on pass exit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreOp {
    /// Commit the rendered contents.
    Store,
    /// Release the contents; their value after the pass is undefined.
    Discard,
}

/// One color render-pass attachment.
#[derive(Clone, Copy, Debug)]
pub struct ColorAttachment<R> {
    pub target: R,
    /// A single-sampled view the `target` resolves into at pass end, if any.
    /// Must share `target`'s format and must itself be single-sampled.
    pub resolve_target: Option<R>,
    pub load_op: LoadOp<ClearColor>,
    pub store_op: StoreOp,
}

/// The depth/stencil render-pass attachment.
#[derive(Clone, Copy, Debug)]
pub struct DepthStencilAttachment<R> {
    pub target: R,
    pub depth_load_op: LoadOp<f32>,
    pub depth_store_op: StoreOp,
    pub stencil_load_op: LoadOp<u32>,
    pub stencil_store_op: StoreOp,
}

/// Describes a render pass opened by `CommandEncoder::begin_render_pass`.
#[derive(Clone, Debug)]
pub struct RenderPassDescriptor<'a, R> {
    pub label: Option<std::borrow::Cow<'a, str>>,
    pub extent: crate::image::Extent3d,
    pub color_attachments: std::borrow::Cow<'a, [Option<ColorAttachment<R>>]>,
    pub depth_stencil_attachment: Option<DepthStencilAttachment<R>>,
}

/// Describes a compute pass opened by `CommandEncoder::begin_compute_pass`.
#[derive(Clone, Debug, Default)]
pub struct ComputePassDescriptor<'a> {
    pub label: Option<std::borrow::Cow<'a, str>>,
}

/// The scalar type of an index buffer's elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

/// The raw command encoder trait every backend implements.
///
/// Methods that can fail only for out-of-memory / device-lost reasons
/// return `crate::error::Result`; methods whose only failure mode is a
/// contract violation the core crate has already validated are infallible.
pub trait CommandEncoder<A: Api>: std::fmt::Debug + Send + Sync {
    /// `Ready -> Recording`.
    unsafe fn begin_encoding(&mut self, label: Option<&str>) -> crate::error::Result<()>;
    /// `Recording -> Finished`, producing an owned command buffer.
    unsafe fn end_encoding(&mut self) -> crate::error::Result<A::CommandBuffer>;
    /// Valid from any state; returns the encoder to `Ready` without
    /// producing a command buffer.
    unsafe fn discard_encoding(&mut self);

    unsafe fn transition_buffers(&mut self, barriers: &[BufferBarrier<&A::Buffer>]);
    unsafe fn transition_textures(&mut self, barriers: &[TextureBarrier<&A::Texture>]);

    unsafe fn clear_buffer(&mut self, buffer: &A::Buffer, range: Range<u64>);
    unsafe fn copy_buffer_to_buffer(&mut self, src: &A::Buffer, dst: &A::Buffer, regions: &[BufferCopy]);
    unsafe fn copy_buffer_to_texture(&mut self, src: &A::Buffer, dst: &A::Texture, regions: &[BufferTextureCopy]);
    unsafe fn copy_texture_to_buffer(&mut self, src: &A::Texture, dst: &A::Buffer, regions: &[BufferTextureCopy]);
    unsafe fn copy_texture_to_texture(&mut self, src: &A::Texture, dst: &A::Texture, regions: &[TextureCopy]);

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&A::TextureView>);
    unsafe fn end_render_pass(&mut self);
    unsafe fn set_render_pipeline(&mut self, pipeline: &A::RenderPipeline);
    unsafe fn set_bind_group(&mut self, layout: &A::PipelineLayout, index: u32, group: &A::BindGroup);
    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &A::Buffer, offset: u64);
    unsafe fn set_index_buffer(&mut self, buffer: &A::Buffer, format: IndexFormat, offset: u64);
    unsafe fn set_viewport(&mut self, viewport: &Viewport);
    unsafe fn set_scissor_rect(&mut self, rect: &Rect);
    unsafe fn set_blend_constant(&mut self, color: ClearColor);
    unsafe fn set_stencil_reference(&mut self, reference: u32);
    unsafe fn draw(&mut self, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32);
    unsafe fn draw_indexed(
        &mut self,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    );
    unsafe fn draw_indirect(&mut self, buffer: &A::Buffer, offset: u64, draw_count: u32);
    unsafe fn draw_indexed_indirect(&mut self, buffer: &A::Buffer, offset: u64, draw_count: u32);

    unsafe fn begin_compute_pass(&mut self, desc: &ComputePassDescriptor);
    unsafe fn end_compute_pass(&mut self);
    unsafe fn set_compute_pipeline(&mut self, pipeline: &A::ComputePipeline);
    unsafe fn dispatch(&mut self, x: u32, y: u32, z: u32);
    unsafe fn dispatch_indirect(&mut self, buffer: &A::Buffer, offset: u64);

    unsafe fn resolve_query_set(&mut self, set: &A::QuerySet, range: Range<u32>, dst: &A::Buffer, offset: u64);
}
