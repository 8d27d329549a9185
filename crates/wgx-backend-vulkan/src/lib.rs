//! Vulkan backend: a `wgx_hal::Api` implementation on top of `ash`.

#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]

pub mod command;
pub mod conv;
pub mod device;
pub mod instance;
pub mod resource;

use wgx_hal::backend::Backend;

#[derive(Clone, Copy, Debug)]
pub struct VulkanApi;

impl wgx_hal::Api for VulkanApi {
    const BACKEND: Backend = Backend::Vulkan;

    type Instance = instance::Instance;
    type Surface = instance::Surface;
    type Adapter = instance::Adapter;
    type Device = device::Device;
    type Queue = device::Queue;

    type CommandEncoder = command::CommandEncoder;
    type CommandBuffer = command::CommandBuffer;

    type Buffer = resource::Buffer;
    type Texture = resource::Texture;
    type SurfaceTexture = instance::SurfaceTexture;
    type TextureView = resource::TextureView;
    type Sampler = resource::Sampler;

    type ShaderModule = resource::ShaderModule;
    type BindGroupLayout = resource::BindGroupLayout;
    type BindGroup = resource::BindGroup;
    type PipelineLayout = resource::PipelineLayout;
    type RenderPipeline = resource::RenderPipeline;
    type ComputePipeline = resource::ComputePipeline;

    type QuerySet = resource::QuerySet;
    type Fence = resource::Fence;
}
