//! The recording-side command encoder state machine (§4.3).
//!
//! Wraps one backend's raw `wgx_hal::command::CommandEncoder`, resolving
//! `Id`s to live resources and enforcing the invariants the HAL trusts its
//! caller to have already checked: at most one pass open at a time, no draw
//! without a bound pipeline, index/vertex buffers set before use.

use crate::bundle::BundleCommand;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::resource::{
    BindGroup, Buffer, CommandBuffer, ComputePipeline, PipelineLayout, QuerySet, RenderBundle,
    RenderPipeline, Texture, TextureView,
};
use std::sync::Arc;
use wgx_hal::buffer::BufferCopy;
use wgx_hal::command as hal;
use wgx_hal::command::{ClearColor, IndexFormat, Rect, Viewport};
use wgx_hal::image::{BufferTextureCopy, TextureCopy};
use wgx_hal::CommandEncoder as _;

/// What pass, if any, is currently open.
enum Pass<A: wgx_hal::Api> {
    /// No pass open; copies, clears and barriers are valid.
    None,
    Render {
        pipeline: Option<Arc<RenderPipeline<A>>>,
        /// Highest vertex count declared compatible by the bound pipeline's
        /// vertex state; tracked for future validation hooks.
        index_buffer_set: bool,
    },
    Compute {
        pipeline: Option<Arc<ComputePipeline<A>>>,
    },
}

enum State<A: wgx_hal::Api> {
    Recording(Pass<A>),
    Finished,
    Discarded,
}

/// One color attachment passed to `CommandEncoder::begin_render_pass`,
/// naming its target (and optional MSAA resolve target) by `Id`.
pub struct ColorAttachmentDesc<A: wgx_hal::Api> {
    pub target: Id<TextureView<A>>,
    pub resolve_target: Option<Id<TextureView<A>>>,
    pub load_op: hal::LoadOp<ClearColor>,
    pub store_op: hal::StoreOp,
}

/// The depth/stencil attachment passed to `CommandEncoder::begin_render_pass`.
pub struct DepthStencilAttachmentDesc<A: wgx_hal::Api> {
    pub target: Id<TextureView<A>>,
    pub depth_load_op: hal::LoadOp<f32>,
    pub depth_store_op: hal::StoreOp,
    pub stencil_load_op: hal::LoadOp<u32>,
    pub stencil_store_op: hal::StoreOp,
}

/// A linear command recorder. One `CommandEncoder` produces at most one
/// `CommandBuffer`, via `finish`.
pub struct CommandEncoder<A: wgx_hal::Api> {
    device: Arc<Device<A>>,
    hal: A::CommandEncoder,
    state: State<A>,
    label: String,
    /// Resources this encoder has referenced, kept alive until the command
    /// buffer is reclaimed after submission.
    keep_alive: Vec<Arc<dyn std::any::Any + Send + Sync>>,
}

impl<A: wgx_hal::Api> CommandEncoder<A> {
    /// `Ready -> Recording`.
    pub(crate) fn new(device: Arc<Device<A>>, mut hal: A::CommandEncoder, label: String) -> Result<Self> {
        unsafe { hal.begin_encoding(Some(&label)) }.map_err(Error::from)?;
        Ok(CommandEncoder {
            device,
            hal,
            state: State::Recording(Pass::None),
            label,
            keep_alive: Vec::new(),
        })
    }

    fn recording_no_pass(&mut self) -> Result<()> {
        match &self.state {
            State::Recording(Pass::None) => Ok(()),
            State::Recording(_) => Err(Error::Validation("a pass is already open".into())),
            State::Finished => Err(Error::Validation("command encoder has already finished".into())),
            State::Discarded => Err(Error::Validation("command encoder has been discarded".into())),
        }
    }

    fn anchor<T: Send + Sync + 'static>(&mut self, arc: Arc<T>) {
        self.keep_alive.push(arc);
    }

    pub fn clear_buffer(&mut self, id: Id<Buffer<A>>, range: std::ops::Range<u64>) -> Result<()> {
        self.recording_no_pass()?;
        let buffer = self.device.buffers.get(id)?;
        let raw = buffer.raw.get()?;
        unsafe { self.hal.clear_buffer(&raw, range) };
        drop(raw);
        self.anchor(buffer);
        Ok(())
    }

    pub fn copy_buffer_to_buffer(
        &mut self,
        src: Id<Buffer<A>>,
        dst: Id<Buffer<A>>,
        regions: &[BufferCopy],
    ) -> Result<()> {
        self.recording_no_pass()?;
        let src_buf = self.device.buffers.get(src)?;
        let dst_buf = self.device.buffers.get(dst)?;
        let src_raw = src_buf.raw.get()?;
        let dst_raw = dst_buf.raw.get()?;
        unsafe { self.hal.copy_buffer_to_buffer(&src_raw, &dst_raw, regions) };
        drop((src_raw, dst_raw));
        self.anchor(src_buf);
        self.anchor(dst_buf);
        Ok(())
    }

    pub fn copy_buffer_to_texture(
        &mut self,
        src: Id<Buffer<A>>,
        dst: Id<Texture<A>>,
        regions: &[BufferTextureCopy],
    ) -> Result<()> {
        self.recording_no_pass()?;
        let src_buf = self.device.buffers.get(src)?;
        let dst_tex = self.device.textures.get(dst)?;
        let src_raw = src_buf.raw.get()?;
        let dst_raw = dst_tex.raw.get()?;
        unsafe { self.hal.copy_buffer_to_texture(&src_raw, &dst_raw, regions) };
        drop((src_raw, dst_raw));
        self.anchor(src_buf);
        self.anchor(dst_tex);
        Ok(())
    }

    pub fn copy_texture_to_buffer(
        &mut self,
        src: Id<Texture<A>>,
        dst: Id<Buffer<A>>,
        regions: &[BufferTextureCopy],
    ) -> Result<()> {
        self.recording_no_pass()?;
        let src_tex = self.device.textures.get(src)?;
        let dst_buf = self.device.buffers.get(dst)?;
        let src_raw = src_tex.raw.get()?;
        let dst_raw = dst_buf.raw.get()?;
        unsafe { self.hal.copy_texture_to_buffer(&src_raw, &dst_raw, regions) };
        drop((src_raw, dst_raw));
        self.anchor(src_tex);
        self.anchor(dst_buf);
        Ok(())
    }

    pub fn copy_texture_to_texture(
        &mut self,
        src: Id<Texture<A>>,
        dst: Id<Texture<A>>,
        regions: &[TextureCopy],
    ) -> Result<()> {
        self.recording_no_pass()?;
        let src_tex = self.device.textures.get(src)?;
        let dst_tex = self.device.textures.get(dst)?;
        let src_raw = src_tex.raw.get()?;
        let dst_raw = dst_tex.raw.get()?;
        unsafe { self.hal.copy_texture_to_texture(&src_raw, &dst_raw, regions) };
        drop((src_raw, dst_raw));
        self.anchor(src_tex);
        self.anchor(dst_tex);
        Ok(())
    }

    /// A buffer usage transition, naming the buffer by `Id`.
    pub fn transition_buffers(&mut self, barriers: &[(Id<Buffer<A>>, std::ops::Range<wgx_hal::buffer::BufferUses>)]) -> Result<()> {
        self.recording_no_pass()?;
        let resolved = barriers
            .iter()
            .map(|(id, usage)| Ok((self.device.buffers.get(*id)?, usage.clone())))
            .collect::<Result<Vec<_>>>()?;
        let guards = resolved
            .iter()
            .map(|(b, _)| b.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let hal_barriers: Vec<hal::BufferBarrier<&A::Buffer>> = resolved
            .iter()
            .zip(guards.iter())
            .map(|((_, usage), guard)| hal::BufferBarrier { buffer: &**guard, usage: usage.clone() })
            .collect();
        unsafe { self.hal.transition_buffers(&hal_barriers) };
        drop(hal_barriers);
        drop(guards);
        for (buffer, _) in resolved {
            self.anchor(buffer);
        }
        Ok(())
    }

    /// A texture subresource usage transition, naming the texture by `Id`.
    pub fn transition_textures(
        &mut self,
        barriers: &[(Id<Texture<A>>, wgx_hal::image::SubresourceRange, std::ops::Range<wgx_hal::image::TextureUses>)],
    ) -> Result<()> {
        self.recording_no_pass()?;
        let resolved = barriers
            .iter()
            .map(|(id, range, usage)| Ok((self.device.textures.get(*id)?, range.clone(), usage.clone())))
            .collect::<Result<Vec<_>>>()?;
        let guards = resolved
            .iter()
            .map(|(t, _, _)| t.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let hal_barriers: Vec<hal::TextureBarrier<&A::Texture>> = resolved
            .iter()
            .zip(guards.iter())
            .map(|((_, range, usage), guard)| hal::TextureBarrier {
                texture: &**guard,
                range: range.clone(),
                usage: usage.clone(),
            })
            .collect();
        unsafe { self.hal.transition_textures(&hal_barriers) };
        drop(hal_barriers);
        drop(guards);
        for (texture, _, _) in resolved {
            self.anchor(texture);
        }
        Ok(())
    }

    /// Descriptor for `begin_render_pass`, naming attachments by `Id`.
    pub fn begin_render_pass(
        &mut self,
        label: Option<&str>,
        extent: wgx_hal::image::Extent3d,
        color_attachments: &[Option<ColorAttachmentDesc<A>>],
        depth_stencil: Option<DepthStencilAttachmentDesc<A>>,
    ) -> Result<()> {
        self.recording_no_pass()?;

        struct ResolvedColor<A: wgx_hal::Api> {
            target: Arc<TextureView<A>>,
            resolve: Option<Arc<TextureView<A>>>,
            load_op: hal::LoadOp<ClearColor>,
            store_op: hal::StoreOp,
        }

        let mut resolved_color = Vec::with_capacity(color_attachments.len());
        for attachment in color_attachments {
            resolved_color.push(match attachment {
                Some(a) => {
                    let target = self.device.texture_views.get(a.target)?;
                    let resolve = match a.resolve_target {
                        Some(id) => Some(self.device.texture_views.get(id)?),
                        None => None,
                    };
                    Some(ResolvedColor {
                        target,
                        resolve,
                        load_op: a.load_op,
                        store_op: a.store_op,
                    })
                }
                None => None,
            });
        }
        let resolved_depth = match &depth_stencil {
            Some(d) => Some(self.device.texture_views.get(d.target)?),
            None => None,
        };

        let mut target_guards = Vec::with_capacity(resolved_color.len());
        let mut resolve_guards = Vec::with_capacity(resolved_color.len());
        for slot in &resolved_color {
            match slot {
                Some(r) => {
                    target_guards.push(Some(r.target.raw.get()?));
                    resolve_guards.push(match &r.resolve {
                        Some(res) => Some(res.raw.get()?),
                        None => None,
                    });
                }
                None => {
                    target_guards.push(None);
                    resolve_guards.push(None);
                }
            }
        }
        let depth_guard = match &resolved_depth {
            Some(v) => Some(v.raw.get()?),
            None => None,
        };

        let mut hal_color = Vec::with_capacity(resolved_color.len());
        for (slot, (target_g, resolve_g)) in resolved_color.iter().zip(target_guards.iter().zip(resolve_guards.iter())) {
            hal_color.push(match slot {
                Some(r) => Some(hal::ColorAttachment {
                    target: &**target_g.as_ref().expect("resolved alongside slot"),
                    resolve_target: resolve_g.as_ref().map(|g| &**g),
                    load_op: r.load_op,
                    store_op: r.store_op,
                }),
                None => None,
            });
        }

        let hal_depth = match (&depth_stencil, &depth_guard) {
            (Some(d), Some(guard)) => Some(hal::DepthStencilAttachment {
                target: &**guard,
                depth_load_op: d.depth_load_op,
                depth_store_op: d.depth_store_op,
                stencil_load_op: d.stencil_load_op,
                stencil_store_op: d.stencil_store_op,
            }),
            _ => None,
        };

        let desc = hal::RenderPassDescriptor {
            label: label.map(std::borrow::Cow::Borrowed),
            extent,
            color_attachments: std::borrow::Cow::Borrowed(&hal_color),
            depth_stencil_attachment: hal_depth,
        };
        unsafe { self.hal.begin_render_pass(&desc) };

        drop(hal_color);
        drop(hal_depth);
        drop(target_guards);
        drop(resolve_guards);
        drop(depth_guard);
        for slot in resolved_color.into_iter().flatten() {
            self.anchor(slot.target);
            if let Some(r) = slot.resolve {
                self.anchor(r);
            }
        }
        if let Some(v) = resolved_depth {
            self.anchor(v);
        }

        self.state = State::Recording(Pass::Render {
            pipeline: None,
            index_buffer_set: false,
        });
        Ok(())
    }

    pub fn end_render_pass(&mut self) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Render { .. }) => {
                unsafe { self.hal.end_render_pass() };
                self.state = State::Recording(Pass::None);
                Ok(())
            }
            _ => Err(Error::Validation("no render pass is open".into())),
        }
    }

    pub fn set_render_pipeline(&mut self, id: Id<RenderPipeline<A>>) -> Result<()> {
        let pipeline = self.device.render_pipelines.get(id)?;
        match &mut self.state {
            State::Recording(Pass::Render { pipeline: slot, .. }) => {
                let raw = pipeline.raw.get()?;
                unsafe { self.hal.set_render_pipeline(&raw) };
                drop(raw);
                *slot = Some(pipeline);
                Ok(())
            }
            _ => Err(Error::Validation("no render pass is open".into())),
        }
    }

    pub fn set_bind_group(&mut self, layout: Id<PipelineLayout<A>>, index: u32, group: Id<BindGroup<A>>) -> Result<()> {
        self.in_any_pass()?;
        let layout = self.device.pipeline_layouts.get(layout)?;
        let group = self.device.bind_groups.get(group)?;
        let layout_raw = layout.raw.get()?;
        let group_raw = group.raw.get()?;
        unsafe { self.hal.set_bind_group(&layout_raw, index, &group_raw) };
        drop((layout_raw, group_raw));
        self.anchor(layout);
        self.anchor(group);
        Ok(())
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, id: Id<Buffer<A>>, offset: u64) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Render { .. }) => {
                let buffer = self.device.buffers.get(id)?;
                let raw = buffer.raw.get()?;
                unsafe { self.hal.set_vertex_buffer(slot, &raw, offset) };
                drop(raw);
                self.anchor(buffer);
                Ok(())
            }
            _ => Err(Error::Validation("no render pass is open".into())),
        }
    }

    pub fn set_index_buffer(&mut self, id: Id<Buffer<A>>, format: IndexFormat, offset: u64) -> Result<()> {
        match &mut self.state {
            State::Recording(Pass::Render { index_buffer_set, .. }) => {
                let buffer = self.device.buffers.get(id)?;
                let raw = buffer.raw.get()?;
                unsafe { self.hal.set_index_buffer(&raw, format, offset) };
                drop(raw);
                *index_buffer_set = true;
                self.anchor(buffer);
                Ok(())
            }
            _ => Err(Error::Validation("no render pass is open".into())),
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.in_render_pass()?;
        unsafe { self.hal.set_viewport(&viewport) };
        Ok(())
    }

    pub fn set_scissor_rect(&mut self, rect: Rect) -> Result<()> {
        self.in_render_pass()?;
        unsafe { self.hal.set_scissor_rect(&rect) };
        Ok(())
    }

    pub fn set_blend_constant(&mut self, color: ClearColor) -> Result<()> {
        self.in_render_pass()?;
        unsafe { self.hal.set_blend_constant(color) };
        Ok(())
    }

    pub fn set_stencil_reference(&mut self, reference: u32) -> Result<()> {
        self.in_render_pass()?;
        unsafe { self.hal.set_stencil_reference(reference) };
        Ok(())
    }

    fn in_render_pass(&self) -> Result<&Arc<RenderPipeline<A>>> {
        match &self.state {
            State::Recording(Pass::Render { pipeline: Some(p), .. }) => Ok(p),
            State::Recording(Pass::Render { pipeline: None, .. }) => {
                Err(Error::Validation("draw call issued with no bound render pipeline".into()))
            }
            _ => Err(Error::Validation("no render pass is open".into())),
        }
    }

    fn in_any_pass(&self) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Render { .. }) | State::Recording(Pass::Compute { .. }) => Ok(()),
            _ => Err(Error::Validation("no pass is open".into())),
        }
    }

    pub fn draw(&mut self, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32) -> Result<()> {
        self.in_render_pass()?;
        unsafe { self.hal.draw(first_vertex, vertex_count, first_instance, instance_count) };
        Ok(())
    }

    pub fn draw_indexed(
        &mut self,
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    ) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Render { pipeline: Some(_), index_buffer_set: true, .. }) => {
                unsafe {
                    self.hal
                        .draw_indexed(first_index, index_count, base_vertex, first_instance, instance_count)
                };
                Ok(())
            }
            State::Recording(Pass::Render { index_buffer_set: false, .. }) => {
                Err(Error::Validation("indexed draw issued with no bound index buffer".into()))
            }
            _ => self.in_render_pass().map(|_| ()),
        }
    }

    pub fn draw_indirect(&mut self, id: Id<Buffer<A>>, offset: u64, draw_count: u32) -> Result<()> {
        self.in_render_pass()?;
        let buffer = self.device.buffers.get(id)?;
        let raw = buffer.raw.get()?;
        unsafe { self.hal.draw_indirect(&raw, offset, draw_count) };
        drop(raw);
        self.anchor(buffer);
        Ok(())
    }

    pub fn draw_indexed_indirect(&mut self, id: Id<Buffer<A>>, offset: u64, draw_count: u32) -> Result<()> {
        self.in_render_pass()?;
        let buffer = self.device.buffers.get(id)?;
        let raw = buffer.raw.get()?;
        unsafe { self.hal.draw_indexed_indirect(&raw, offset, draw_count) };
        drop(raw);
        self.anchor(buffer);
        Ok(())
    }

    /// Replay a previously finished bundle's recorded pipeline/bind-group/
    /// vertex/index-buffer state and draw calls into the currently open
    /// render pass, as `Draw`/`DrawIndexed`/etc. do for one call each.
    pub fn execute_bundle(&mut self, id: Id<RenderBundle<A>>) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Render { .. }) => {}
            _ => return Err(Error::Validation("no render pass is open".into())),
        }
        let bundle = self.device.render_bundles.get(id)?;
        for command in &bundle.commands {
            match command {
                BundleCommand::SetPipeline(pipeline) => {
                    let raw = pipeline.raw.get()?;
                    unsafe { self.hal.set_render_pipeline(&raw) };
                }
                BundleCommand::SetBindGroup { layout, index, group } => {
                    let layout_raw = layout.raw.get()?;
                    let group_raw = group.raw.get()?;
                    unsafe { self.hal.set_bind_group(&layout_raw, *index, &group_raw) };
                }
                BundleCommand::SetVertexBuffer { slot, buffer, offset } => {
                    let raw = buffer.raw.get()?;
                    unsafe { self.hal.set_vertex_buffer(*slot, &raw, *offset) };
                }
                BundleCommand::SetIndexBuffer { buffer, format, offset } => {
                    let raw = buffer.raw.get()?;
                    unsafe { self.hal.set_index_buffer(&raw, *format, *offset) };
                }
                BundleCommand::Draw { first_vertex, vertex_count, first_instance, instance_count } => {
                    unsafe { self.hal.draw(*first_vertex, *vertex_count, *first_instance, *instance_count) };
                }
                BundleCommand::DrawIndexed { first_index, index_count, base_vertex, first_instance, instance_count } => {
                    unsafe {
                        self.hal
                            .draw_indexed(*first_index, *index_count, *base_vertex, *first_instance, *instance_count)
                    };
                }
                BundleCommand::DrawIndirect { buffer, offset, draw_count } => {
                    let raw = buffer.raw.get()?;
                    unsafe { self.hal.draw_indirect(&raw, *offset, *draw_count) };
                }
                BundleCommand::DrawIndexedIndirect { buffer, offset, draw_count } => {
                    let raw = buffer.raw.get()?;
                    unsafe { self.hal.draw_indexed_indirect(&raw, *offset, *draw_count) };
                }
            }
        }

        // A bundle's own pipeline/index-buffer bindings stick for whatever
        // comes after it in the pass, matching the last command the bundle
        // itself issued.
        if let State::Recording(Pass::Render { pipeline, index_buffer_set }) = &mut self.state {
            for command in &bundle.commands {
                match command {
                    BundleCommand::SetPipeline(p) => *pipeline = Some(Arc::clone(p)),
                    BundleCommand::SetIndexBuffer { .. } => *index_buffer_set = true,
                    _ => {}
                }
            }
        }
        self.anchor(bundle);
        Ok(())
    }

    pub fn begin_compute_pass(&mut self, label: Option<&str>) -> Result<()> {
        self.recording_no_pass()?;
        if !self.device.downlevel.contains(wgx_hal::limits::DownlevelFlags::COMPUTE_SHADERS) {
            return Err(Error::Validation("this backend does not support compute pipelines".into()));
        }
        let desc = hal::ComputePassDescriptor {
            label: label.map(std::borrow::Cow::Borrowed),
        };
        unsafe { self.hal.begin_compute_pass(&desc) };
        self.state = State::Recording(Pass::Compute { pipeline: None });
        Ok(())
    }

    pub fn end_compute_pass(&mut self) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Compute { .. }) => {
                unsafe { self.hal.end_compute_pass() };
                self.state = State::Recording(Pass::None);
                Ok(())
            }
            _ => Err(Error::Validation("no compute pass is open".into())),
        }
    }

    pub fn set_compute_pipeline(&mut self, id: Id<ComputePipeline<A>>) -> Result<()> {
        let pipeline = self.device.compute_pipelines.get(id)?;
        match &mut self.state {
            State::Recording(Pass::Compute { pipeline: slot }) => {
                let raw = pipeline.raw.get()?;
                unsafe { self.hal.set_compute_pipeline(&raw) };
                drop(raw);
                *slot = Some(pipeline);
                Ok(())
            }
            _ => Err(Error::Validation("no compute pass is open".into())),
        }
    }

    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Compute { pipeline: Some(_) }) => {
                unsafe { self.hal.dispatch(x, y, z) };
                Ok(())
            }
            State::Recording(Pass::Compute { pipeline: None }) => {
                Err(Error::Validation("dispatch issued with no bound compute pipeline".into()))
            }
            _ => Err(Error::Validation("no compute pass is open".into())),
        }
    }

    pub fn dispatch_indirect(&mut self, id: Id<Buffer<A>>, offset: u64) -> Result<()> {
        match &self.state {
            State::Recording(Pass::Compute { pipeline: Some(_) }) => {
                let buffer = self.device.buffers.get(id)?;
                let raw = buffer.raw.get()?;
                unsafe { self.hal.dispatch_indirect(&raw, offset) };
                drop(raw);
                self.anchor(buffer);
                Ok(())
            }
            _ => Err(Error::Validation("dispatch_indirect issued with no bound compute pipeline".into())),
        }
    }

    pub fn resolve_query_set(
        &mut self,
        id: Id<QuerySet<A>>,
        range: std::ops::Range<u32>,
        dst: Id<Buffer<A>>,
        offset: u64,
    ) -> Result<()> {
        self.recording_no_pass()?;
        let set = self.device.query_sets.get(id)?;
        let buffer = self.device.buffers.get(dst)?;
        let set_raw = set.raw.get()?;
        let buf_raw = buffer.raw.get()?;
        unsafe { self.hal.resolve_query_set(&set_raw, range, &buf_raw, offset) };
        drop((set_raw, buf_raw));
        self.anchor(set);
        self.anchor(buffer);
        Ok(())
    }

    /// `Recording -> Finished`, registering the resulting command buffer in
    /// the device's hub and returning its `Id`.
    pub fn finish(mut self) -> Result<Id<CommandBuffer<A>>> {
        match self.state {
            State::Recording(Pass::None) => {}
            State::Recording(_) => return Err(Error::Validation("a pass is still open".into())),
            State::Finished => return Err(Error::Validation("command encoder has already finished".into())),
            State::Discarded => return Err(Error::Validation("command encoder has been discarded".into())),
        }
        let raw = unsafe { self.hal.end_encoding() }.map_err(Error::from)?;
        self.state = State::Finished;
        Ok(self.device.register_command_buffer(self.label.clone(), raw))
    }

    /// Valid from any state; returns without producing a command buffer.
    pub fn discard(mut self) {
        unsafe { self.hal.discard_encoding() };
        self.state = State::Discarded;
    }
}
