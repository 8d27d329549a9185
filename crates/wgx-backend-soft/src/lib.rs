//! CPU reference rasterizer backend: a `wgx_hal::Api` implementation with no
//! native driver underneath. It exists so the rest of the workspace has a
//! backend that runs anywhere, and so its fixed-function rasterizer
//! (`raster.rs`) can serve as a conformance oracle for the hardware
//! backends' output.

#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]

pub mod device;
pub mod encoder;
pub mod instance;
pub mod raster;
pub mod resource;

use wgx_hal::backend::Backend;

/// The zero-sized type tying every resource type in this crate to the one
/// `wgx_hal::Api` implementation it provides.
#[derive(Clone, Copy, Debug)]
pub struct SoftApi;

impl wgx_hal::Api for SoftApi {
    const BACKEND: Backend = Backend::Software;

    type Instance = instance::SoftInstance;
    type Surface = instance::SoftSurface;
    type Adapter = instance::SoftAdapter;
    type Device = device::SoftDevice;
    type Queue = device::SoftQueue;

    type CommandEncoder = encoder::SoftCommandEncoder;
    type CommandBuffer = encoder::SoftCommandBuffer;

    type Buffer = resource::Buffer;
    type Texture = resource::Texture;
    type SurfaceTexture = instance::SoftSurfaceTexture;
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
