//! The `Device` trait: the widest contract in the HAL, with a create and a
//! destroy for every resource kind, plus idle/fence bookkeeping.

use crate::buffer::BufferDescriptor;
use crate::command::CommandEncoderDescriptor;
use crate::error::{Result, TimeoutError};
use crate::image::{SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use crate::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, ComputePipelineDescriptor,
    PipelineLayoutDescriptor, RenderPipelineDescriptor, ShaderModuleDescriptor,
};
use crate::query::QuerySetDescriptor;
use crate::Api;
use std::time::Duration;

/// A monotonically increasing value a `Fence` can be waited on or queried
/// against. Produced by a `Queue::submit` call.
pub type FenceValue = u64;

/// The device-wide operations every backend implements.
pub trait Device<A: Api>: std::fmt::Debug + Send + Sync {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<A::Buffer>;
    unsafe fn destroy_buffer(&self, buffer: A::Buffer);

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<A::Texture>;
    unsafe fn destroy_texture(&self, texture: A::Texture);

    unsafe fn create_texture_view(
        &self,
        texture: &A::Texture,
        desc: &TextureViewDescriptor,
    ) -> Result<A::TextureView>;
    unsafe fn destroy_texture_view(&self, view: A::TextureView);

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<A::Sampler>;
    unsafe fn destroy_sampler(&self, sampler: A::Sampler);

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<A::ShaderModule>;
    unsafe fn destroy_shader_module(&self, module: A::ShaderModule);

    unsafe fn create_bind_group_layout(
        &self,
        desc: &BindGroupLayoutDescriptor,
    ) -> Result<A::BindGroupLayout>;
    unsafe fn destroy_bind_group_layout(&self, layout: A::BindGroupLayout);

    unsafe fn create_pipeline_layout(
        &self,
        desc: &PipelineLayoutDescriptor<&A::BindGroupLayout>,
    ) -> Result<A::PipelineLayout>;
    unsafe fn destroy_pipeline_layout(&self, layout: A::PipelineLayout);

    unsafe fn create_bind_group(
        &self,
        desc: &BindGroupDescriptor<&A::BindGroupLayout, &A::Buffer, &A::TextureView, &A::Sampler>,
    ) -> Result<A::BindGroup>;
    unsafe fn destroy_bind_group(&self, group: A::BindGroup);

    unsafe fn create_render_pipeline(
        &self,
        desc: &RenderPipelineDescriptor<&A::PipelineLayout, &A::ShaderModule>,
    ) -> Result<A::RenderPipeline>;
    unsafe fn destroy_render_pipeline(&self, pipeline: A::RenderPipeline);

    unsafe fn create_compute_pipeline(
        &self,
        desc: &ComputePipelineDescriptor<&A::PipelineLayout, &A::ShaderModule>,
    ) -> Result<A::ComputePipeline>;
    unsafe fn destroy_compute_pipeline(&self, pipeline: A::ComputePipeline);

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<A::QuerySet>;
    unsafe fn destroy_query_set(&self, set: A::QuerySet);

    unsafe fn create_command_encoder(
        &self,
        desc: &CommandEncoderDescriptor<&A::Queue>,
    ) -> Result<A::CommandEncoder>;
    unsafe fn destroy_command_encoder(&self, encoder: A::CommandEncoder);

    /// Recycle a command buffer whose submission has already been signaled.
    unsafe fn free_command_buffer(&self, buffer: A::CommandBuffer);

    unsafe fn create_fence(&self) -> Result<A::Fence>;
    unsafe fn destroy_fence(&self, fence: A::Fence);
    /// Block until `fence` reaches `value`, or until `timeout` elapses.
    unsafe fn wait(&self, fence: &A::Fence, value: FenceValue, timeout: Duration) -> Result<(), TimeoutError>;
    unsafe fn get_fence_value(&self, fence: &A::Fence) -> Result<FenceValue>;

    /// Block until every submission on every queue of this device has
    /// completed.
    unsafe fn wait_idle(&self) -> Result<()>;
}
