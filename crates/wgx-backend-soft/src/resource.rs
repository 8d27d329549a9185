//! The software backend's resource types.
//!
//! Every resource that owns host memory (buffers, texture storage) keeps it
//! behind an `Arc<Mutex<Vec<u8>>>` rather than owning it outright. That is
//! what lets `create_texture_view` hand back an independent object that
//! shares its parent's bytes instead of borrowing them: a HAL texture view
//! has no borrow-checker-visible relationship to the texture it was made
//! from, so sharing the backing allocation is the only way a view stays
//! usable for as long as the application holds it.

use parking_lot::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use wgx_hal::buffer::BufferUses;
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{Extent3d, SubresourceRange, TextureDimension, TextureUses};
use wgx_hal::pso::{BindGroupLayoutEntry, ColorTargetState, DepthStencilState, PrimitiveState, VertexBufferLayout};
use wgx_hal::query::QueryType;

#[derive(Debug)]
pub struct Buffer {
    pub usage: BufferUses,
    pub data: Arc<Mutex<Vec<u8>>>,
}

impl Buffer {
    pub fn new(size: u64, usage: BufferUses) -> Self {
        Buffer {
            usage,
            data: Arc::new(Mutex::new(vec![0u8; size as usize])),
        }
    }
}

#[derive(Debug)]
pub struct Texture {
    pub format: TextureFormat,
    pub size: Extent3d,
    pub mip_level_count: u32,
    pub usage: TextureUses,
    pub data: Arc<Mutex<Vec<u8>>>,
    /// One byte per texel, allocated only for formats with a stencil aspect.
    /// Kept apart from `data` since the depth aspect is read by this backend
    /// as a plain `f32` array rather than a real packed D24S8 layout.
    pub stencil_data: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Texture {
    pub fn new(format: TextureFormat, size: Extent3d, mip_level_count: u32, usage: TextureUses) -> Self {
        let texel_count = size.width as usize * size.height as usize * size.depth_or_array_layers as usize;
        let bytes = texel_count * format.block_size() as usize;
        Texture {
            format,
            size,
            mip_level_count,
            usage,
            data: Arc::new(Mutex::new(vec![0u8; bytes])),
            stencil_data: format.has_stencil().then(|| Arc::new(Mutex::new(vec![0u8; texel_count]))),
        }
    }

    pub fn dimension(&self) -> TextureDimension {
        TextureDimension::D2
    }
}

#[derive(Debug)]
pub struct TextureView {
    pub format: TextureFormat,
    pub size: Extent3d,
    pub range: SubresourceRange,
    pub data: Arc<Mutex<Vec<u8>>>,
    pub stencil_data: Option<Arc<Mutex<Vec<u8>>>>,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    pub mag_filter: wgx_hal::image::FilterMode,
    pub min_filter: wgx_hal::image::FilterMode,
    pub address_mode_u: wgx_hal::image::AddressMode,
    pub address_mode_v: wgx_hal::image::AddressMode,
}

#[derive(Debug)]
pub struct ShaderModule {
    pub label: String,
}

#[derive(Debug)]
pub struct BindGroupLayout {
    pub entries: Vec<BindGroupLayoutEntry>,
}

/// A resolved binding, kept only for introspection: the reference
/// rasterizer's fragment stage does not sample bound textures (see
/// `DESIGN.md`), so nothing downstream reads these at draw time.
#[derive(Debug)]
pub enum ResolvedBinding {
    Buffer { offset: u64, size: Option<u64>, data: Arc<Mutex<Vec<u8>>> },
    TextureView(Arc<Mutex<Vec<u8>>>),
    Sampler(Sampler),
}

#[derive(Debug)]
pub struct BindGroup {
    pub bindings: Vec<(u32, ResolvedBinding)>,
}

#[derive(Debug)]
pub struct PipelineLayout {
    pub bind_group_layout_count: usize,
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pub vertex_buffers: Vec<OwnedVertexBufferLayout>,
    pub color_targets: Vec<ColorTargetState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
    pub sample_count: u32,
}

#[derive(Debug, Clone)]
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

#[derive(Debug)]
pub struct ComputePipeline;

#[derive(Debug)]
pub struct QuerySet {
    pub ty: QueryType,
    pub values: Arc<Mutex<Vec<u64>>>,
}

impl QuerySet {
    pub fn new(ty: QueryType, count: u32) -> Self {
        QuerySet {
            ty,
            values: Arc::new(Mutex::new(vec![0; count as usize])),
        }
    }
}

#[derive(Debug)]
pub struct Fence {
    pub value: AtomicU64,
}

impl Fence {
    pub fn new() -> Self {
        Fence {
            value: AtomicU64::new(0),
        }
    }
}
