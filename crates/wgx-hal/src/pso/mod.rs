//! Pipeline state objects: shader modules, bind group layouts, pipeline
//! layouts, and the graphics/compute pipeline descriptors built from them.

mod blend;
mod descriptor;
mod vertex;

pub use blend::*;
pub use descriptor::*;
pub use vertex::*;

use crate::format::TextureFormat;
use crate::image::CompareFunction;
use std::borrow::Cow;

bitflags::bitflags! {
    /// Which shader stages a binding or push-constant range is visible to.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ShaderStages: u8 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

/// Provenance of a shader module's source.
///
/// Translation from WGSL to a backend's native form (SPIR-V/MSL/HLSL/GLSL)
/// is an external collaborator (see `crate::shader`); this enum carries
/// either the original WGSL text for the translator to consume, or an
/// already-translated payload a backend accepts directly.
#[derive(Clone, Debug)]
pub enum ShaderSource<'a> {
    /// WGSL source text, to be translated by the external shader translator
    /// before a backend can consume it.
    Wgsl(Cow<'a, str>),
    /// A pre-translated SPIR-V module, as 32-bit words.
    SpirV(Cow<'a, [u32]>),
    /// Pre-translated GLSL source with an explicit pipeline stage.
    Glsl {
        source: Cow<'a, str>,
        stage: ShaderStages,
    },
}

/// Descriptor passed to `Device::create_shader_module`.
#[derive(Clone, Debug)]
pub struct ShaderModuleDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub source: ShaderSource<'a>,
}

/// The kind of resource a single bind group layout entry declares.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindingType {
    UniformBuffer { has_dynamic_offset: bool },
    StorageBuffer { has_dynamic_offset: bool, read_only: bool },
    SampledTexture,
    StorageTexture { read_only: bool },
    Sampler,
}

/// One binding slot in a `BindGroupLayout`.
#[derive(Clone, Copy, Debug)]
pub struct BindGroupLayoutEntry {
    pub binding: u32,
    pub visibility: ShaderStages,
    pub ty: BindingType,
}

/// Descriptor passed to `Device::create_bind_group_layout`.
#[derive(Clone, Debug)]
pub struct BindGroupLayoutDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub entries: Cow<'a, [BindGroupLayoutEntry]>,
}

/// A resource bound at one `BindGroupEntry`, generic over the reference
/// type used for each resource kind so the core crate can pass typed `Id`s
/// while backends see raw handle references.
#[derive(Clone, Copy, Debug)]
pub enum BoundResource<B, V, S> {
    Buffer { buffer: B, offset: u64, size: Option<u64> },
    TextureView(V),
    Sampler(S),
}

/// One resource bound at a slot declared by a `BindGroupLayout`.
#[derive(Clone, Copy, Debug)]
pub struct BindGroupEntry<B, V, S> {
    pub binding: u32,
    pub resource: BoundResource<B, V, S>,
}

/// Descriptor passed to `Device::create_bind_group`.
#[derive(Clone, Debug)]
pub struct BindGroupDescriptor<'a, L, B, V, S> {
    pub label: Option<Cow<'a, str>>,
    pub layout: L,
    pub entries: Cow<'a, [BindGroupEntry<B, V, S>]>,
}

/// Descriptor passed to `Device::create_pipeline_layout`.
#[derive(Clone, Debug)]
pub struct PipelineLayoutDescriptor<'a, R> {
    pub label: Option<Cow<'a, str>>,
    pub bind_group_layouts: Cow<'a, [R]>,
}

/// The primitive topology a graphics pipeline assembles vertices into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

/// Winding order considered "front-facing".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrontFace {
    Ccw,
    Cw,
}

/// Which triangle faces, if any, are discarded before rasterization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Fixed-function primitive assembly and rasterizer state.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveState {
    pub topology: PrimitiveTopology,
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
}

impl Default for PrimitiveState {
    fn default() -> Self {
        PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
        }
    }
}

bitflags::bitflags! {
    /// Which color channels a render-pass write affects.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ColorWrites: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits | Self::GREEN.bits | Self::BLUE.bits | Self::ALPHA.bits;
    }
}

/// A single color attachment's output format, optional blending, and write
/// mask.
#[derive(Clone, Copy, Debug)]
pub struct ColorTargetState {
    pub format: TextureFormat,
    pub blend: Option<BlendState>,
    pub write_mask: ColorWrites,
}

/// Depth/stencil state attached to a render pipeline.
#[derive(Clone, Copy, Debug)]
pub struct DepthStencilState {
    pub format: TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
    pub stencil: StencilState,
}
