//! `Instance`, `Surface`, and `Adapter`.
//!
//! Unlike the other backends, a GL context is tied to the surface it was
//! created against from the moment it exists — `Adapter::open` takes no
//! surface parameter, so the raw context and the `glow` function-pointer
//! table are both built eagerly in `enumerate_adapters`, using whichever
//! surface the caller passed as `compatible_surface`. An adapter exposed
//! with no surface is not meaningful for this backend, so `enumerate_adapters`
//! returns an empty list when none is given.

use crate::device::{Device, Queue};
use crate::resource::Texture;
use crate::GlApi;
use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::sync::Arc;
use wgx_hal::adapter::{AdapterInfo, ExposedAdapter, OpenDevice};
use wgx_hal::error::{DeviceError, Result, SurfaceError};
use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
use wgx_hal::image::{Extent3d, TextureUses};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{
    AcquiredSurfaceTexture, CompositeAlphaMode, InstanceDescriptor, PresentMode, SurfaceCapabilities,
    SurfaceConfiguration,
};

#[cfg(target_os = "windows")]
use glutin::platform::windows::RawContextExt;
#[cfg(all(unix, not(any(target_os = "macos", target_os = "android"))))]
use glutin::platform::unix::RawContextExt;

pub struct Instance {
    flags: wgx_hal::window::InstanceFlags,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").finish()
    }
}
unsafe impl Send for Instance {}
unsafe impl Sync for Instance {}

impl wgx_hal::window::Instance<GlApi> for Instance {
    unsafe fn new(desc: &InstanceDescriptor) -> Result<Self> {
        Ok(Instance { flags: desc.flags })
    }

    unsafe fn create_surface(&self, _display_handle: RawDisplayHandle, window_handle: RawWindowHandle) -> Result<Surface> {
        let debug = self.flags.contains(wgx_hal::window::InstanceFlags::DEBUG);
        let builder = glutin::ContextBuilder::new()
            .with_gl_debug_flag(debug)
            .with_vsync(true);

        let raw = match window_handle {
            #[cfg(target_os = "windows")]
            RawWindowHandle::Win32(handle) => builder
                .build_raw_context(handle.hwnd)
                .map_err(|e| DeviceError::Other(e.to_string()))?,
            #[cfg(all(unix, not(any(target_os = "macos", target_os = "android"))))]
            RawWindowHandle::Xlib(handle) => builder
                .build_raw_context(handle.window as *mut std::ffi::c_void)
                .map_err(|e| DeviceError::Other(e.to_string()))?,
            _ => return Err(DeviceError::Other("unsupported window handle for GL surface".into())),
        };
        let raw = raw.make_current().map_err(|(_, e)| DeviceError::Other(e.to_string()))?;

        Ok(Surface { raw: Mutex::new(raw), config: Mutex::new(None) })
    }

    unsafe fn destroy_surface(&self, _surface: Surface) {}

    unsafe fn enumerate_adapters(&self, compatible_surface: Option<&Surface>) -> Vec<ExposedAdapter<GlApi>> {
        let Some(surface) = compatible_surface else {
            // A GL context can't be created independently of the surface
            // that owns its drawable, so this backend has no adapters to
            // offer without one.
            return Vec::new();
        };

        let context = {
            let raw = surface.raw.lock();
            glow::Context::from_loader_function(|name| raw.get_proc_address(name) as *const _)
        };
        let context = Arc::new(context);

        vec![ExposedAdapter {
            adapter: Adapter { context },
            info: AdapterInfo {
                name: "OpenGL".to_string(),
                vendor: 0,
                device: 0,
                software_rendering: false,
            },
            features: Features::NON_FILL_POLYGON_MODE | Features::SAMPLER_ANISOTROPY,
            downlevel: DownlevelFlags::ANISOTROPIC_FILTERING,
            limits: Limits { max_texture_dimension_2d: 4096, max_texture_dimension_3d: 1024, ..Limits::default() },
        }]
    }
}

pub struct Adapter {
    pub(crate) context: Arc<glow::Context>,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").finish()
    }
}
unsafe impl Send for Adapter {}
unsafe impl Sync for Adapter {}

impl wgx_hal::adapter::Adapter<GlApi> for Adapter {
    unsafe fn open(&self, _features: Features, _limits: &Limits) -> Result<OpenDevice<GlApi>> {
        Ok(OpenDevice {
            device: Device::new(self.context.clone()),
            queue: Queue::new(self.context.clone()),
        })
    }

    fn texture_format_capabilities(&self, _format: TextureFormat) -> TextureFormatCapabilities {
        TextureFormatCapabilities::SAMPLED | TextureFormatCapabilities::RENDER_TARGET | TextureFormatCapabilities::BLENDABLE
    }

    unsafe fn surface_capabilities(&self, _surface: &Surface) -> Option<SurfaceCapabilities> {
        Some(SurfaceCapabilities {
            formats: vec![TextureFormat::Rgba8Unorm],
            present_modes: vec![PresentMode::Fifo],
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            usages: TextureUses::COLOR_TARGET | TextureUses::COPY_SRC | TextureUses::COPY_DST | TextureUses::PRESENT,
        })
    }
}

pub struct SurfaceTexture {
    pub(crate) texture: Texture,
}

impl std::fmt::Debug for SurfaceTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTexture").finish()
    }
}
unsafe impl Send for SurfaceTexture {}
unsafe impl Sync for SurfaceTexture {}

impl std::borrow::Borrow<Texture> for SurfaceTexture {
    fn borrow(&self) -> &Texture {
        &self.texture
    }
}

pub struct Surface {
    raw: Mutex<glutin::RawContext<glutin::PossiblyCurrent>>,
    config: Mutex<Option<SurfaceConfiguration>>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").finish()
    }
}
unsafe impl Send for Surface {}
unsafe impl Sync for Surface {}

impl wgx_hal::window::Surface<GlApi> for Surface {
    unsafe fn configure(&mut self, _device: &Device, config: &SurfaceConfiguration) -> Result<(), SurfaceError> {
        if config.has_zero_area() {
            return Err(SurfaceError::ZeroArea);
        }
        self.raw
            .lock()
            .resize(glutin::dpi::PhysicalSize::new(config.width, config.height));
        *self.config.lock() = Some(*config);
        Ok(())
    }

    unsafe fn unconfigure(&mut self, _device: &Device) {
        *self.config.lock() = None;
    }

    unsafe fn acquire_texture(&mut self, _timeout_ns: Option<u64>) -> Result<Option<AcquiredSurfaceTexture<GlApi>>, SurfaceError> {
        let config = self.config.lock().as_ref().copied().ok_or(SurfaceError::Outdated)?;
        Ok(Some(AcquiredSurfaceTexture {
            texture: SurfaceTexture {
                texture: Texture {
                    raw: None,
                    target: glow::TEXTURE_2D,
                    format: config.format,
                    size: Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
                    mip_level_count: 1,
                },
            },
            suboptimal: false,
        }))
    }

    unsafe fn discard_texture(&mut self, _texture: SurfaceTexture) {}
}

impl Surface {
    pub(crate) fn swap_buffers(&self) -> Result<()> {
        self.raw.lock().swap_buffers().map_err(|e| DeviceError::Other(e.to_string()))
    }
}
