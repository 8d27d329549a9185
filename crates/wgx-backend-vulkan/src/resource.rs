//! Resource types: thin wrappers around `ash::vk` handles plus whatever
//! metadata a later HAL call needs (format, size, aspect mask) that Vulkan
//! itself does not let you query back off the handle.
//!
//! Every resource owns its backing `VkDeviceMemory` outright rather than
//! suballocating from a shared heap — no allocator crate is pulled in.
//! Fine for a conformance backend; a product backend would want `gpu-alloc`
//! or similar. See `DESIGN.md`.

use ash::vk;
use wgx_hal::format::TextureFormat;
use wgx_hal::image::Extent3d;
use wgx_hal::pso::{ColorTargetState, DepthStencilState, PrimitiveState, VertexBufferLayout};
use wgx_hal::query::QueryType;

#[derive(Debug)]
pub struct Buffer {
    pub raw: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: u64,
}

#[derive(Debug)]
pub struct Texture {
    pub raw: vk::Image,
    pub memory: Option<vk::DeviceMemory>,
    /// `None` for a swapchain image, which Vulkan owns the memory of.
    pub format: TextureFormat,
    pub size: Extent3d,
    pub mip_level_count: u32,
}

#[derive(Debug)]
pub struct TextureView {
    pub raw: vk::ImageView,
    pub format: TextureFormat,
}

#[derive(Debug)]
pub struct Sampler {
    pub raw: vk::Sampler,
}

#[derive(Debug)]
pub struct ShaderModule {
    pub raw: vk::ShaderModule,
}

#[derive(Debug, Clone)]
pub struct BindGroupLayout {
    pub raw: vk::DescriptorSetLayout,
}

#[derive(Debug)]
pub struct BindGroup {
    pub raw: vk::DescriptorSet,
    pub pool: vk::DescriptorPool,
}

#[derive(Debug, Clone)]
pub struct PipelineLayout {
    pub raw: vk::PipelineLayout,
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pub raw: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    pub vertex_buffers: Vec<OwnedVertexBufferLayout>,
    pub color_targets: Vec<ColorTargetState>,
    pub depth_stencil: Option<DepthStencilState>,
    pub primitive: PrimitiveState,
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

#[derive(Debug, Clone)]
pub struct ComputePipeline {
    pub raw: vk::Pipeline,
    pub layout: vk::PipelineLayout,
}

#[derive(Debug)]
pub struct QuerySet {
    pub raw: vk::QueryPool,
    pub ty: QueryType,
    pub count: u32,
}

#[derive(Debug)]
pub struct Fence {
    /// One binary `VkFence` per submission still in flight, each tagged
    /// with the `FenceValue` it signals. `get_fence_value` walks the list
    /// and reaps any that have already been signaled.
    pub pending: parking_lot::Mutex<Vec<(u64, vk::Fence)>>,
}
