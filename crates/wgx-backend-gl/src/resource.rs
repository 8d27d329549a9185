//! Resource types: GL object handles plus the metadata needed to rebuild
//! GL state (targets, attribute layouts, program stages) at draw time.
//!
//! `glow`'s native handles (`NativeBuffer`, `NativeTexture`, …) are plain
//! `Copy` wrappers around a non-zero `u32`, so unlike the software backend's
//! `Arc<Mutex<Vec<u8>>>` byte storage, resources here carry no shared
//! ownership at all — the GL driver owns the data, we just hold its name.

use wgx_hal::format::TextureFormat;
use wgx_hal::image::Extent3d;
use wgx_hal::pso::{ColorTargetState, DepthStencilState, PrimitiveState, VertexBufferLayout};

#[derive(Clone, Copy, Debug)]
pub struct Buffer {
    pub raw: glow::NativeBuffer,
    pub target: u32,
    pub size: u64,
}
unsafe impl Send for Buffer {}
unsafe impl Sync for Buffer {}

/// `raw` is `None` for the surface-acquired texture standing in for the
/// window's default framebuffer, which isn't a real GL texture object.
#[derive(Clone, Copy, Debug)]
pub struct Texture {
    pub raw: Option<glow::NativeTexture>,
    pub target: u32,
    pub format: TextureFormat,
    pub size: Extent3d,
    pub mip_level_count: u32,
}
unsafe impl Send for Texture {}
unsafe impl Sync for Texture {}

/// GL has no first-class texture view object for the 2D case this backend
/// targets; a view is just the parent texture plus the subresource range it
/// exposes.
///
/// `default_framebuffer` marks a view produced by `Surface::acquire_texture`:
/// the window's backbuffer isn't a texture at all in GL, so `texture` is
/// `None` and render passes bind FBO 0 instead of constructing one.
#[derive(Clone, Copy, Debug)]
pub struct TextureView {
    pub texture: Option<glow::NativeTexture>,
    pub target: u32,
    pub format: TextureFormat,
    pub base_mip_level: u32,
    pub mip_level_count: u32,
    pub default_framebuffer: bool,
}
unsafe impl Send for TextureView {}
unsafe impl Sync for TextureView {}

#[derive(Clone, Copy, Debug)]
pub struct Sampler {
    pub raw: glow::NativeSampler,
}
unsafe impl Send for Sampler {}
unsafe impl Sync for Sampler {}

/// GLSL source text, carried unmodified until `create_render_pipeline` /
/// `create_compute_pipeline` compile and link it into a program — GL links
/// whole programs from stage shaders rather than consuming standalone
/// modules the way SPIR-V/MSL/DXIL backends do.
#[derive(Clone, Debug)]
pub struct ShaderModule {
    pub source: String,
    pub stage: u32,
}

#[derive(Clone, Debug)]
pub struct BindGroupLayout {
    pub entries: Vec<wgx_hal::pso::BindGroupLayoutEntry>,
}

#[derive(Clone, Copy, Debug)]
pub enum BoundResource {
    Buffer { raw: glow::NativeBuffer, offset: u64 },
    Texture(TextureView),
    Sampler(Sampler),
}
unsafe impl Send for BoundResource {}
unsafe impl Sync for BoundResource {}

#[derive(Clone, Debug)]
pub struct BindGroup {
    pub bindings: Vec<(u32, BoundResource)>,
}

/// No GL object backs a pipeline layout; bind group index/binding pairs are
/// resolved directly to uniform/sampler/block locations on the linked
/// program at `set_bind_group` time.
#[derive(Clone, Copy, Debug)]
pub struct PipelineLayout {
    pub bind_group_layout_count: u32,
}

#[derive(Clone, Debug)]
pub struct OwnedVertexBufferLayout {
    pub array_stride: u64,
    pub step_mode: wgx_hal::pso::VertexStepMode,
    pub attributes: Vec<wgx_hal::pso::VertexAttribute>,
}

impl<'a> From<&VertexBufferLayout<'a>> for OwnedVertexBufferLayout {
    fn from(layout: &VertexBufferLayout<'a>) -> Self {
        OwnedVertexBufferLayout {
            array_stride: layout.array_stride,
            step_mode: layout.step_mode,
            attributes: layout.attributes.to_vec(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderPipeline {
    pub program: glow::NativeProgram,
    pub vertex_buffers: Vec<OwnedVertexBufferLayout>,
    pub color_targets: Vec<ColorTargetState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
    pub sample_count: u32,
}
unsafe impl Send for RenderPipeline {}
unsafe impl Sync for RenderPipeline {}

#[derive(Clone, Copy, Debug)]
pub struct ComputePipeline {
    pub program: glow::NativeProgram,
}
unsafe impl Send for ComputePipeline {}
unsafe impl Sync for ComputePipeline {}

#[derive(Clone, Debug)]
pub struct QuerySet {
    pub queries: Vec<glow::NativeQuery>,
    pub ty: wgx_hal::query::QueryType,
    pub count: u32,
}
unsafe impl Send for QuerySet {}
unsafe impl Sync for QuerySet {}

/// `Queue::submit` replays its command buffers synchronously against the
/// shared context before returning, so by the time `submit` signals `value`
/// every effect is already visible — there is no device timeline distinct
/// from the caller's, same as the software backend's fence.
#[derive(Debug, Default)]
pub struct Fence {
    pub completed: std::sync::atomic::AtomicU64,
}
unsafe impl Send for Fence {}
unsafe impl Sync for Fence {}
