//! Resource wrappers around `metal-rs` objects.
//!
//! Metal's Objective-C objects aren't `Send`/`Sync` by default in the
//! `metal` crate's bindings, but the Metal API itself is documented as safe
//! to call from any thread as long as a single object isn't mutated
//! concurrently — which the HAL's `&self`/`&mut self` split on `Device`
//! already guarantees. So each wrapper gets an explicit unsafe impl rather
//! than threading everything through a lock.

use metal::{MTLPixelFormat, MTLStorageMode};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::Extent3d;
use wgx_hal::pso::{ColorTargetState, DepthStencilState, PrimitiveState};

macro_rules! send_sync_wrapper {
    ($name:ident, $inner:ty) => {
        #[derive(Debug)]
        pub struct $name(pub $inner);
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}
    };
}

send_sync_wrapper!(Buffer, metal::Buffer);
send_sync_wrapper!(Sampler, metal::SamplerState);
send_sync_wrapper!(ShaderLibrary, metal::Library);

#[derive(Debug)]
pub struct Texture {
    pub raw: metal::Texture,
    pub format: TextureFormat,
    pub size: Extent3d,
    pub mip_level_count: u32,
}
unsafe impl Send for Texture {}
unsafe impl Sync for Texture {}

#[derive(Debug)]
pub struct TextureView {
    pub raw: metal::Texture,
    pub format: TextureFormat,
}
unsafe impl Send for TextureView {}
unsafe impl Sync for TextureView {}

#[derive(Debug)]
pub struct ShaderModule {
    pub library: ShaderLibrary,
}

/// Metal has no descriptor-set object: resources are bound directly to
/// numbered argument slots on an encoder. A `BindGroupLayout` just records
/// which HAL binding numbers exist so `create_bind_group` can validate
/// against it and pick the Metal slot (binding number == slot index).
#[derive(Debug, Clone)]
pub struct BindGroupLayout {
    pub entries: Vec<wgx_hal::pso::BindGroupLayoutEntry>,
}

#[derive(Debug, Clone)]
pub enum BoundSlot {
    Buffer { buffer: metal::Buffer, offset: u64 },
    Texture(metal::Texture),
    Sampler(metal::SamplerState),
}
unsafe impl Send for BoundSlot {}
unsafe impl Sync for BoundSlot {}

#[derive(Debug)]
pub struct BindGroup {
    pub slots: Vec<(u32, BoundSlot)>,
}

/// Metal pipelines carry argument slot layout implicitly in the shader;
/// a pipeline layout in this backend is bookkeeping only, used to know how
/// many bind-group slot ranges to reserve per group index.
#[derive(Debug, Clone)]
pub struct PipelineLayout {
    pub bind_group_layout_count: u32,
}

#[derive(Debug)]
pub struct RenderPipeline {
    pub raw: metal::RenderPipelineState,
    pub depth_stencil: Option<metal::DepthStencilState>,
    pub depth_stencil_desc: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
    pub color_targets: Vec<ColorTargetState>,
}
unsafe impl Send for RenderPipeline {}
unsafe impl Sync for RenderPipeline {}

#[derive(Debug)]
pub struct ComputePipeline {
    pub raw: metal::ComputePipelineState,
}
unsafe impl Send for ComputePipeline {}
unsafe impl Sync for ComputePipeline {}

#[derive(Debug)]
pub struct QuerySet {
    pub raw: Option<metal::Buffer>,
    pub ty: wgx_hal::query::QueryType,
    pub count: u32,
}
unsafe impl Send for QuerySet {}
unsafe impl Sync for QuerySet {}

#[derive(Debug)]
pub struct Fence {
    pub value: std::sync::atomic::AtomicU64,
}

pub fn pixel_format_is_depth(format: MTLPixelFormat) -> bool {
    matches!(
        format,
        MTLPixelFormat::Depth16Unorm | MTLPixelFormat::Depth32Float | MTLPixelFormat::Depth32Float_Stencil8
    )
}

pub const DEFAULT_STORAGE_MODE: MTLStorageMode = MTLStorageMode::Shared;
