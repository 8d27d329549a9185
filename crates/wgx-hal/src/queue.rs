//! The `Queue` trait: submission, host-visible upload/readback, and
//! presentation (§4.1 "Queue operations").

use crate::device::FenceValue;
use crate::error::Result;
use crate::image::{BufferTextureCopy, Extent3d};
use crate::window::AcquiredSurfaceTexture;
use crate::Api;

/// Submission and upload/readback/present surface every backend implements.
pub trait Queue<A: Api>: std::fmt::Debug + Send + Sync {
    /// Submit `command_buffers` for execution; on completion the device
    /// signals `fence` to `value`, which must strictly exceed any value
    /// previously submitted against the same fence.
    unsafe fn submit(
        &mut self,
        command_buffers: &[&A::CommandBuffer],
        fence: &A::Fence,
        value: FenceValue,
    ) -> Result<()>;

    /// Asynchronous upload, visible to any command buffer submitted after
    /// this call returns.
    unsafe fn write_buffer(&mut self, buffer: &A::Buffer, offset: u64, data: &[u8]) -> Result<()>;

    /// Asynchronous upload, visible to any command buffer submitted after
    /// this call returns.
    unsafe fn write_texture(
        &mut self,
        texture: &A::Texture,
        data: &[u8],
        layout: crate::image::ImageDataLayout,
        extent: Extent3d,
    ) -> Result<()>;

    /// Blocking readback; returns once the device is idle with respect to
    /// every writer of `buffer`.
    unsafe fn read_buffer(&mut self, buffer: &A::Buffer, offset: u64, output: &mut [u8]) -> Result<()>;

    /// Schedule presentation of a previously acquired surface texture,
    /// once this queue has signaled the submission index that wrote it.
    unsafe fn present(
        &mut self,
        surface: &mut A::Surface,
        texture: AcquiredSurfaceTexture<A>,
    ) -> Result<(), crate::error::SurfaceError>;

    /// Nanoseconds per device timestamp tick, for interpreting timestamp
    /// query results.
    fn timestamp_period(&self) -> f32;
}
