//! Instance, surface, and adapter. The software backend has no native
//! driver to open, so these just stand up in-process CPU resources.

use crate::device::{SoftDevice, SoftQueue};
use crate::resource::Texture;
use crate::SoftApi;
use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::sync::Arc;
use wgx_hal::adapter::{AdapterInfo, ExposedAdapter, OpenDevice};
use wgx_hal::error::{Result, SurfaceError};
use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
use wgx_hal::image::{Extent3d, TextureUses};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{
    AcquiredSurfaceTexture, CompositeAlphaMode, InstanceDescriptor, PresentMode,
    SurfaceCapabilities, SurfaceConfiguration,
};

#[derive(Debug)]
pub struct SoftInstance;

impl wgx_hal::window::Instance<SoftApi> for SoftInstance {
    unsafe fn new(_desc: &InstanceDescriptor) -> Result<Self> {
        Ok(SoftInstance)
    }

    unsafe fn create_surface(
        &self,
        _display_handle: RawDisplayHandle,
        _window_handle: RawWindowHandle,
    ) -> Result<SoftSurface> {
        Ok(SoftSurface::new())
    }

    unsafe fn destroy_surface(&self, _surface: SoftSurface) {}

    unsafe fn enumerate_adapters(&self, _compatible_surface: Option<&SoftSurface>) -> Vec<ExposedAdapter<SoftApi>> {
        vec![ExposedAdapter {
            adapter: SoftAdapter,
            info: AdapterInfo {
                name: "CPU reference rasterizer".to_owned(),
                vendor: 0,
                device: 0,
                software_rendering: true,
            },
            features: Features::empty(),
            // No shader translation means no compute pipelines: COMPUTE_SHADERS
            // is deliberately left unset. See DESIGN.md.
            downlevel: DownlevelFlags::INDIRECT_DRAW
                | DownlevelFlags::ANISOTROPIC_FILTERING
                | DownlevelFlags::CUBE_ARRAY_TEXTURES,
            limits: Limits::default(),
        }]
    }
}

#[derive(Debug)]
pub struct SoftAdapter;

impl wgx_hal::adapter::Adapter<SoftApi> for SoftAdapter {
    unsafe fn open(&self, _features: Features, _limits: &Limits) -> Result<OpenDevice<SoftApi>> {
        Ok(OpenDevice { device: SoftDevice, queue: SoftQueue })
    }

    fn texture_format_capabilities(&self, format: TextureFormat) -> TextureFormatCapabilities {
        let mut caps = TextureFormatCapabilities::RENDER_TARGET | TextureFormatCapabilities::MULTISAMPLE;
        if format.is_color() {
            caps |= TextureFormatCapabilities::SAMPLED | TextureFormatCapabilities::BLENDABLE;
        }
        caps
    }

    unsafe fn surface_capabilities(&self, _surface: &SoftSurface) -> Option<SurfaceCapabilities> {
        Some(SurfaceCapabilities {
            formats: vec![TextureFormat::Rgba8Unorm, TextureFormat::Bgra8Unorm],
            present_modes: vec![PresentMode::Fifo, PresentMode::Immediate],
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            usages: TextureUses::COLOR_TARGET | TextureUses::COPY_SRC | TextureUses::PRESENT,
        })
    }
}

/// A [`Texture`] acquired from a surface, owned by the surface until
/// presented or discarded, per the `Borrow<Texture>` contract on
/// `Api::SurfaceTexture`.
#[derive(Debug)]
pub struct SoftSurfaceTexture(pub Texture);

impl std::borrow::Borrow<Texture> for SoftSurfaceTexture {
    fn borrow(&self) -> &Texture {
        &self.0
    }
}

#[derive(Debug)]
pub struct SoftSurface {
    config: Mutex<Option<SurfaceConfiguration>>,
    image: Mutex<Option<Arc<Texture>>>,
}

impl SoftSurface {
    pub(crate) fn new() -> Self {
        SoftSurface {
            config: Mutex::new(None),
            image: Mutex::new(None),
        }
    }

    /// There is no presentation engine to flush to: the acquired texture's
    /// bytes already hold the rendered frame.
    pub(crate) fn present(&mut self, _texture: SoftSurfaceTexture) {}
}

fn share_texture(texture: &Texture) -> Texture {
    Texture {
        format: texture.format,
        size: texture.size,
        mip_level_count: texture.mip_level_count,
        usage: texture.usage,
        data: Arc::clone(&texture.data),
        stencil_data: texture.stencil_data.as_ref().map(Arc::clone),
    }
}

impl wgx_hal::window::Surface<SoftApi> for SoftSurface {
    unsafe fn configure(&mut self, _device: &SoftDevice, config: &SurfaceConfiguration) -> Result<(), SurfaceError> {
        if config.has_zero_area() {
            return Err(SurfaceError::ZeroArea);
        }
        *self.config.lock() = Some(*config);
        let texture = Texture::new(
            config.format,
            Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
            1,
            config.usage | TextureUses::PRESENT,
        );
        *self.image.lock() = Some(Arc::new(texture));
        Ok(())
    }

    unsafe fn unconfigure(&mut self, _device: &SoftDevice) {
        *self.config.lock() = None;
        *self.image.lock() = None;
    }

    unsafe fn acquire_texture(
        &mut self,
        _timeout_ns: Option<u64>,
    ) -> Result<Option<AcquiredSurfaceTexture<SoftApi>>, SurfaceError> {
        match &*self.image.lock() {
            Some(texture) => Ok(Some(AcquiredSurfaceTexture {
                texture: SoftSurfaceTexture(share_texture(texture)),
                suboptimal: false,
            })),
            None => Err(SurfaceError::Outdated),
        }
    }

    unsafe fn discard_texture(&mut self, _texture: SoftSurfaceTexture) {}
}
