//! `RenderBundleEncoder`: records a pass-independent sequence of draw state
//! and draw calls, later replayed into an open render pass in one shot via
//! `CommandEncoder::execute_bundle`.
//!
//! A bundle encoder does not touch the HAL at all while recording: it just
//! resolves each `Id` to an `Arc` (so the resource can't be destroyed out
//! from under a bundle that outlives the call that created it) and appends
//! a `BundleCommand`. The HAL calls happen later, when the bundle is
//! replayed against whichever render pass executes it.

use crate::device::Device;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::resource::{BindGroup, Buffer, PipelineLayout, RenderBundle, RenderPipeline};
use std::sync::Arc;
use wgx_hal::command::IndexFormat;
use wgx_hal::format::TextureFormat;

/// One recorded step of a bundle, holding an `Arc` to every resource it
/// touches so the bundle keeps them alive independent of their own `Id`s.
pub(crate) enum BundleCommand<A: wgx_hal::Api> {
    SetPipeline(Arc<RenderPipeline<A>>),
    SetBindGroup {
        layout: Arc<PipelineLayout<A>>,
        index: u32,
        group: Arc<BindGroup<A>>,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: Arc<Buffer<A>>,
        offset: u64,
    },
    SetIndexBuffer {
        buffer: Arc<Buffer<A>>,
        format: IndexFormat,
        offset: u64,
    },
    Draw {
        first_vertex: u32,
        vertex_count: u32,
        first_instance: u32,
        instance_count: u32,
    },
    DrawIndexed {
        first_index: u32,
        index_count: u32,
        base_vertex: i32,
        first_instance: u32,
        instance_count: u32,
    },
    DrawIndirect {
        buffer: Arc<Buffer<A>>,
        offset: u64,
        draw_count: u32,
    },
    DrawIndexedIndirect {
        buffer: Arc<Buffer<A>>,
        offset: u64,
        draw_count: u32,
    },
}

impl<A: wgx_hal::Api> std::fmt::Debug for BundleCommand<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BundleCommand::SetPipeline(_) => "SetPipeline",
            BundleCommand::SetBindGroup { .. } => "SetBindGroup",
            BundleCommand::SetVertexBuffer { .. } => "SetVertexBuffer",
            BundleCommand::SetIndexBuffer { .. } => "SetIndexBuffer",
            BundleCommand::Draw { .. } => "Draw",
            BundleCommand::DrawIndexed { .. } => "DrawIndexed",
            BundleCommand::DrawIndirect { .. } => "DrawIndirect",
            BundleCommand::DrawIndexedIndirect { .. } => "DrawIndexedIndirect",
        };
        f.write_str(name)
    }
}

/// Compatibility descriptor for a `RenderBundleEncoder`: the attachment
/// formats any pass it is later executed into must match, mirroring the
/// compatibility a pipeline declares against the pass it is bound in.
pub struct RenderBundleEncoderDescriptor<'a> {
    pub label: Option<&'a str>,
    pub color_formats: &'a [Option<TextureFormat>],
    pub depth_stencil_format: Option<TextureFormat>,
    pub sample_count: u32,
}

/// Records draw state and draw calls independent of any particular render
/// pass. `finish` registers the recorded `RenderBundle` in the device's hub.
pub struct RenderBundleEncoder<A: wgx_hal::Api> {
    device: Arc<Device<A>>,
    label: String,
    commands: Vec<BundleCommand<A>>,
    pipeline_bound: bool,
    index_buffer_set: bool,
    finished: bool,
}

impl<A: wgx_hal::Api> RenderBundleEncoder<A> {
    pub(crate) fn new(device: Arc<Device<A>>, desc: &RenderBundleEncoderDescriptor<'_>) -> Self {
        RenderBundleEncoder {
            device,
            label: desc.label.map(String::from).unwrap_or_default(),
            commands: Vec::new(),
            pipeline_bound: false,
            index_buffer_set: false,
            finished: false,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            Err(Error::Validation("render bundle encoder has already finished".into()))
        } else {
            Ok(())
        }
    }

    pub fn set_pipeline(&mut self, id: Id<RenderPipeline<A>>) -> Result<()> {
        self.check_open()?;
        let pipeline = self.device.render_pipelines.get(id)?;
        self.pipeline_bound = true;
        self.commands.push(BundleCommand::SetPipeline(pipeline));
        Ok(())
    }

    pub fn set_bind_group(&mut self, layout: Id<PipelineLayout<A>>, index: u32, group: Id<BindGroup<A>>) -> Result<()> {
        self.check_open()?;
        let layout = self.device.pipeline_layouts.get(layout)?;
        let group = self.device.bind_groups.get(group)?;
        self.commands.push(BundleCommand::SetBindGroup { layout, index, group });
        Ok(())
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, id: Id<Buffer<A>>, offset: u64) -> Result<()> {
        self.check_open()?;
        let buffer = self.device.buffers.get(id)?;
        self.commands.push(BundleCommand::SetVertexBuffer { slot, buffer, offset });
        Ok(())
    }

    pub fn set_index_buffer(&mut self, id: Id<Buffer<A>>, format: IndexFormat, offset: u64) -> Result<()> {
        self.check_open()?;
        let buffer = self.device.buffers.get(id)?;
        self.index_buffer_set = true;
        self.commands.push(BundleCommand::SetIndexBuffer { buffer, format, offset });
        Ok(())
    }

    fn require_pipeline(&self) -> Result<()> {
        if self.pipeline_bound {
            Ok(())
        } else {
            Err(Error::Validation("draw call issued with no bound render pipeline".into()))
        }
    }

    pub fn draw(&mut self, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32) -> Result<()> {
        self.check_open()?;
        self.require_pipeline()?;
        self.commands.push(BundleCommand::Draw {
            first_vertex,
            vertex_count,
            first_instance,
            instance_count,
        });
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
        self.check_open()?;
        self.require_pipeline()?;
        if !self.index_buffer_set {
            return Err(Error::Validation("indexed draw issued with no bound index buffer".into()));
        }
        self.commands.push(BundleCommand::DrawIndexed {
            first_index,
            index_count,
            base_vertex,
            first_instance,
            instance_count,
        });
        Ok(())
    }

    pub fn draw_indirect(&mut self, id: Id<Buffer<A>>, offset: u64, draw_count: u32) -> Result<()> {
        self.check_open()?;
        self.require_pipeline()?;
        let buffer = self.device.buffers.get(id)?;
        self.commands.push(BundleCommand::DrawIndirect { buffer, offset, draw_count });
        Ok(())
    }

    pub fn draw_indexed_indirect(&mut self, id: Id<Buffer<A>>, offset: u64, draw_count: u32) -> Result<()> {
        self.check_open()?;
        self.require_pipeline()?;
        if !self.index_buffer_set {
            return Err(Error::Validation("indexed draw issued with no bound index buffer".into()));
        }
        let buffer = self.device.buffers.get(id)?;
        self.commands.push(BundleCommand::DrawIndexedIndirect { buffer, offset, draw_count });
        Ok(())
    }

    /// Register the recorded bundle in the device's hub.
    pub fn finish(mut self) -> Result<Id<RenderBundle<A>>> {
        self.check_open()?;
        self.finished = true;
        Ok(self.device.render_bundles.insert(RenderBundle {
            label: std::mem::take(&mut self.label),
            commands: std::mem::take(&mut self.commands),
        }))
    }
}
