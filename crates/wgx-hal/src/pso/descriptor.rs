//! Top-level pipeline descriptors.

use super::{ColorTargetState, DepthStencilState, PrimitiveState, VertexBufferLayout};
use std::borrow::Cow;

/// One shader stage's entry point within a module.
#[derive(Clone, Debug)]
pub struct ProgrammableStage<'a, R> {
    pub module: R,
    pub entry_point: Cow<'a, str>,
}

/// Descriptor passed to `Device::create_render_pipeline`.
///
/// `L` is the pipeline layout's reference type, `M` the shader module's —
/// kept distinct since a backend's layout and module handles are unrelated
/// types.
///
/// `shader entry points must exist in their modules` is checked by the core
/// crate against the module's reflected entry-point list before this
/// descriptor reaches the HAL.
#[derive(Clone, Debug)]
pub struct RenderPipelineDescriptor<'a, L, M> {
    pub label: Option<Cow<'a, str>>,
    pub layout: L,
    pub vertex: ProgrammableStage<'a, M>,
    pub vertex_buffers: Cow<'a, [VertexBufferLayout<'a>]>,
    pub fragment: Option<ProgrammableStage<'a, M>>,
    pub color_targets: Cow<'a, [ColorTargetState]>,
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
    pub sample_count: u32,
}

/// Descriptor passed to `Device::create_compute_pipeline`.
#[derive(Clone, Debug)]
pub struct ComputePipelineDescriptor<'a, L, M> {
    pub label: Option<Cow<'a, str>>,
    pub layout: L,
    pub compute: ProgrammableStage<'a, M>,
}
