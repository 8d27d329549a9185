//! The `Queue`: submission, host-visible upload/readback, and present
//! (§4.1 "Queue operations", §4.4).

use crate::device::Device;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::present::Surface;
use crate::resource::{Buffer, CommandBuffer, Texture};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use wgx_hal::device::FenceValue;
use wgx_hal::image::{Extent3d, ImageDataLayout};
use wgx_hal::window::AcquiredSurfaceTexture;

/// The monotonically increasing submission counter a fence tracks.
pub type SubmissionIndex = FenceValue;

/// A device's single queue: command submission plus direct upload/readback
/// and present.
pub struct Queue<A: wgx_hal::Api> {
    hal: Mutex<A::Queue>,
    fence: Mutex<Option<A::Fence>>,
    next_value: AtomicU64,
}

impl<A: wgx_hal::Api> Queue<A> {
    pub(crate) fn new(hal: A::Queue) -> Self {
        Queue {
            hal: Mutex::new(hal),
            fence: Mutex::new(None),
            next_value: AtomicU64::new(1),
        }
    }

    pub(crate) fn lock_hal(&self) -> MutexGuard<'_, A::Queue> {
        self.hal.lock()
    }

    fn fence_value(&self, device: &Device<A>) -> Result<FenceValue> {
        let value = self.next_value.fetch_add(1, Ordering::SeqCst);
        let mut fence = self.fence.lock();
        if fence.is_none() {
            *fence = Some(unsafe { device.hal.create_fence() }.map_err(Error::from)?);
        }
        Ok(value)
    }

    /// Submit `buffers` (each the output of one `CommandEncoder::finish`)
    /// for execution, block until the submission's fence value is signaled
    /// (30s default timeout), then reclaim them: by the time this call
    /// returns, the `Id`s are no longer valid.
    pub fn submit(&self, device: &Device<A>, buffers: &[Id<CommandBuffer<A>>]) -> Result<SubmissionIndex> {
        let value = self.fence_value(device)?;
        let resolved = buffers
            .iter()
            .map(|&id| device.command_buffers.get(id))
            .collect::<Result<Vec<_>>>()?;
        let guards = resolved
            .iter()
            .map(|b| b.raw.get())
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&A::CommandBuffer> = guards.iter().map(|g| &**g).collect();
        {
            let fence = self.fence.lock();
            let fence = fence.as_ref().expect("fence_value always creates the fence first");
            unsafe { self.hal.lock().submit(&refs, fence, value) }.map_err(Error::from)?;
        }
        drop(guards);
        drop(refs);
        self.wait(device, value, std::time::Duration::from_secs(30))?;
        for &id in buffers {
            device.reclaim_command_buffer(id)?;
        }
        Ok(value)
    }

    /// Block until `device`'s fence reaches `value`, or until `timeout`
    /// elapses.
    pub fn wait(&self, device: &Device<A>, value: SubmissionIndex, timeout: std::time::Duration) -> Result<()> {
        let fence = self.fence.lock();
        match fence.as_ref() {
            Some(fence) => unsafe { device.hal.wait(fence, value, timeout) }.map_err(Error::from),
            None => Ok(()),
        }
    }

    pub fn write_buffer(&self, id: Id<Buffer<A>>, device: &Device<A>, offset: u64, data: &[u8]) -> Result<()> {
        let buffer = device.buffers.get(id)?;
        let raw = buffer.raw.get()?;
        unsafe { self.hal.lock().write_buffer(&raw, offset, data) }.map_err(Error::from)
    }

    pub fn write_texture(
        &self,
        id: Id<Texture<A>>,
        device: &Device<A>,
        data: &[u8],
        layout: ImageDataLayout,
        extent: Extent3d,
    ) -> Result<()> {
        let texture = device.textures.get(id)?;
        let raw = texture.raw.get()?;
        unsafe { self.hal.lock().write_texture(&raw, data, layout, extent) }.map_err(Error::from)
    }

    /// Blocking readback: returns once the device is idle with respect to
    /// every prior writer of `id`.
    pub fn read_buffer(&self, id: Id<Buffer<A>>, device: &Device<A>, offset: u64, output: &mut [u8]) -> Result<()> {
        let buffer = device.buffers.get(id)?;
        let raw = buffer.raw.get()?;
        unsafe { self.hal.lock().read_buffer(&raw, offset, output) }.map_err(Error::from)
    }

    /// Present a texture acquired from `surface`.
    pub fn present(&self, surface: &Surface<A>, texture: AcquiredSurfaceTexture<A>) -> Result<()> {
        let mut hal_surface = surface.lock_hal();
        unsafe { self.hal.lock().present(&mut hal_surface, texture) }.map_err(Error::from)
    }

    pub fn timestamp_period(&self) -> f32 {
        self.hal.lock().timestamp_period()
    }
}
