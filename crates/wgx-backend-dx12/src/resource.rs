//! Resource types: thin wrappers around D3D12 COM interfaces plus whatever
//! metadata a later HAL call needs back.
//!
//! Every texture and buffer is created as its own "committed" resource
//! (`ID3D12Device::CreateCommittedResource`) rather than suballocated from a
//! placed heap — matches the Vulkan backend's no-suballocator simplification
//! for the same reason. See `DESIGN.md`.

use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;
use wgx_hal::format::TextureFormat;
use wgx_hal::image::Extent3d;
use wgx_hal::pso::{ColorTargetState, DepthStencilState, PrimitiveState, VertexBufferLayout};

#[derive(Debug, Clone)]
pub struct Buffer {
    pub raw: ID3D12Resource,
    pub size: u64,
}
unsafe impl Send for Buffer {}
unsafe impl Sync for Buffer {}

#[derive(Debug, Clone)]
pub struct Texture {
    pub raw: ID3D12Resource,
    pub format: TextureFormat,
    pub size: Extent3d,
    pub mip_level_count: u32,
}
unsafe impl Send for Texture {}
unsafe impl Sync for Texture {}

#[derive(Debug, Clone)]
pub struct TextureView {
    pub texture: ID3D12Resource,
    pub format: TextureFormat,
    pub dxgi_format: DXGI_FORMAT,
    pub base_mip_level: u32,
    pub mip_level_count: u32,
}
unsafe impl Send for TextureView {}
unsafe impl Sync for TextureView {}

#[derive(Debug, Clone)]
pub struct Sampler {
    pub desc: D3D12_SAMPLER_DESC,
}
unsafe impl Send for Sampler {}
unsafe impl Sync for Sampler {}

#[derive(Debug, Clone)]
pub struct ShaderModule {
    pub bytecode: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BindGroupLayout {
    pub entries: Vec<wgx_hal::pso::BindGroupLayoutEntry>,
}

#[derive(Debug, Clone)]
pub enum BoundResource {
    Buffer { raw: ID3D12Resource, offset: u64 },
    Texture(TextureView),
    Sampler(Sampler),
}
unsafe impl Send for BoundResource {}
unsafe impl Sync for BoundResource {}

#[derive(Debug, Clone)]
pub struct BindGroup {
    pub bindings: Vec<(u32, BoundResource)>,
}

/// Root signature with one root CBV/table entry per bind group index,
/// matching the fixed-layout root signature a real backend derives from the
/// pipeline layout's binding types.
#[derive(Debug, Clone)]
pub struct PipelineLayout {
    pub raw: ID3D12RootSignature,
    pub bind_group_layout_count: u32,
}
unsafe impl Send for PipelineLayout {}
unsafe impl Sync for PipelineLayout {}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pub raw: ID3D12PipelineState,
    pub root_signature: ID3D12RootSignature,
    pub topology: wgx_hal::pso::PrimitiveTopology,
    pub vertex_buffers: Vec<OwnedVertexBufferLayout>,
    pub color_targets: Vec<ColorTargetState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
}
unsafe impl Send for RenderPipeline {}
unsafe impl Sync for RenderPipeline {}

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

#[derive(Debug, Clone)]
pub struct ComputePipeline {
    pub raw: ID3D12PipelineState,
    pub root_signature: ID3D12RootSignature,
}
unsafe impl Send for ComputePipeline {}
unsafe impl Sync for ComputePipeline {}

#[derive(Debug, Clone)]
pub struct QuerySet {
    pub raw: ID3D12QueryHeap,
    pub ty: wgx_hal::query::QueryType,
    pub count: u32,
}
unsafe impl Send for QuerySet {}
unsafe impl Sync for QuerySet {}

#[derive(Debug, Clone)]
pub struct Fence {
    pub raw: ID3D12Fence,
}
unsafe impl Send for Fence {}
unsafe impl Sync for Fence {}
