//! The `Surface` acquire/present state machine (§4.4).
//!
//! A surface starts `Unconfigured`. `configure` drains any prior swapchain
//! to idle and moves it to `Configured`; `acquire_texture` is only valid in
//! that state. This mirrors the teacher's own render-pass state-machine
//! style: the state is a tagged enum, not a handful of nullable fields.

use crate::device::Device;
use crate::error::{Error, Result};
use parking_lot::{Mutex, MutexGuard};
use wgx_hal::window::{AcquiredSurfaceTexture, SurfaceConfiguration};

enum State {
    Unconfigured,
    Configured(SurfaceConfiguration),
}

/// One platform window's presentation target.
pub struct Surface<A: wgx_hal::Api> {
    hal: Mutex<A::Surface>,
    state: Mutex<State>,
}

impl<A: wgx_hal::Api> Surface<A> {
    pub(crate) fn new(hal: A::Surface) -> Self {
        Surface {
            hal: Mutex::new(hal),
            state: Mutex::new(State::Unconfigured),
        }
    }

    pub(crate) fn lock_hal(&self) -> MutexGuard<'_, A::Surface> {
        self.hal.lock()
    }

    /// The configuration currently in effect, if any.
    pub fn configuration(&self) -> Option<SurfaceConfiguration> {
        match *self.state.lock() {
            State::Configured(config) => Some(config),
            State::Unconfigured => None,
        }
    }

    /// `Unconfigured -> Configured`, or reconfigure if already configured.
    pub fn configure(&self, device: &Device<A>, config: SurfaceConfiguration) -> Result<()> {
        if config.has_zero_area() {
            return Err(Error::ZeroArea);
        }
        unsafe { self.hal.lock().configure(&device.hal, &config) }?;
        *self.state.lock() = State::Configured(config);
        Ok(())
    }

    /// `Configured -> Unconfigured`. A no-op if already unconfigured.
    pub fn unconfigure(&self, device: &Device<A>) {
        let mut state = self.state.lock();
        if matches!(*state, State::Configured(_)) {
            unsafe { self.hal.lock().unconfigure(&device.hal) };
            *state = State::Unconfigured;
        }
    }

    /// Block until the presentation engine hands over an image, or until
    /// `timeout_ns` elapses. Fails with `Validation` if the surface has not
    /// been configured.
    pub fn acquire_texture(
        &self,
        timeout_ns: Option<u64>,
    ) -> Result<Option<AcquiredSurfaceTexture<A>>> {
        if !matches!(*self.state.lock(), State::Configured(_)) {
            return Err(Error::Validation("surface has not been configured".into()));
        }
        let acquired = unsafe { self.hal.lock().acquire_texture(timeout_ns) }?;
        Ok(acquired)
    }

    /// Release a texture obtained from `acquire_texture` without presenting
    /// it (e.g. because the frame was abandoned).
    pub fn discard_texture(&self, texture: A::SurfaceTexture) {
        unsafe { self.hal.lock().discard_texture(texture) };
    }
}
