//! `Instance`, `Surface`, and `Adapter`: a `CAMetalLayer` wrapped per
//! window, and `MTLCreateSystemDefaultDevice` for adapter enumeration.

use crate::device::{Device, Queue};
use crate::resource::Texture;
use crate::MetalApi;
use metal::foreign_types::ForeignType;
use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use wgx_hal::adapter::{AdapterInfo, ExposedAdapter, OpenDevice};
use wgx_hal::error::{DeviceError, Result, SurfaceError};
use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
use wgx_hal::image::{Extent3d, TextureUses};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{
    AcquiredSurfaceTexture, CompositeAlphaMode, InstanceDescriptor, PresentMode, SurfaceCapabilities,
    SurfaceConfiguration,
};

pub struct Instance;

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").finish()
    }
}

impl wgx_hal::window::Instance<MetalApi> for Instance {
    unsafe fn new(_desc: &InstanceDescriptor) -> Result<Self> {
        Ok(Instance)
    }

    unsafe fn create_surface(&self, _display_handle: RawDisplayHandle, window_handle: RawWindowHandle) -> Result<Surface> {
        let layer = match window_handle {
            RawWindowHandle::AppKit(handle) => {
                let view = handle.ns_view as *mut objc::runtime::Object;
                create_metal_layer_for_view(view)
            }
            _ => return Err(DeviceError::Other("unsupported window handle for Metal surface".into())),
        };
        Ok(Surface { layer: Mutex::new(layer), config: Mutex::new(None) })
    }

    unsafe fn destroy_surface(&self, _surface: Surface) {}

    unsafe fn enumerate_adapters(&self, _compatible_surface: Option<&Surface>) -> Vec<ExposedAdapter<MetalApi>> {
        let Some(device) = metal::Device::system_default() else { return Vec::new() };
        let name = device.name().to_string();
        let low_power = device.is_low_power();
        vec![ExposedAdapter {
            adapter: Adapter { raw: device },
            info: AdapterInfo { name, vendor: 0, device: 0, software_rendering: false },
            features: Features::DEPTH_CLAMPING
                | Features::NON_FILL_POLYGON_MODE
                | Features::INDIRECT_EXECUTION
                | Features::INDIRECT_FIRST_INSTANCE
                | Features::SAMPLER_ANISOTROPY
                | Features::TIMESTAMP_QUERY,
            downlevel: DownlevelFlags::COMPUTE_SHADERS
                | DownlevelFlags::INDIRECT_DRAW
                | DownlevelFlags::ANISOTROPIC_FILTERING
                | DownlevelFlags::CUBE_ARRAY_TEXTURES,
            limits: Limits {
                max_texture_dimension_2d: 16384,
                max_texture_dimension_3d: if low_power { 2048 } else { 2048 },
                ..Limits::default()
            },
        }]
    }
}

pub struct Adapter {
    pub(crate) raw: metal::Device,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").finish()
    }
}
unsafe impl Send for Adapter {}
unsafe impl Sync for Adapter {}

impl wgx_hal::adapter::Adapter<MetalApi> for Adapter {
    unsafe fn open(&self, _features: Features, _limits: &Limits) -> Result<OpenDevice<MetalApi>> {
        let queue = self.raw.new_command_queue();
        Ok(OpenDevice {
            device: Device { raw: self.raw.clone(), queue: queue.clone() },
            queue: Queue { raw: queue, device: self.raw.clone() },
        })
    }

    fn texture_format_capabilities(&self, format: TextureFormat) -> TextureFormatCapabilities {
        let mut caps = TextureFormatCapabilities::SAMPLED
            | TextureFormatCapabilities::RENDER_TARGET
            | TextureFormatCapabilities::MULTISAMPLE
            | TextureFormatCapabilities::MULTISAMPLE_RESOLVE;
        if format.is_color() {
            caps |= TextureFormatCapabilities::STORAGE | TextureFormatCapabilities::BLENDABLE;
        }
        caps
    }

    unsafe fn surface_capabilities(&self, _surface: &Surface) -> Option<SurfaceCapabilities> {
        Some(SurfaceCapabilities {
            formats: vec![TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb],
            present_modes: vec![PresentMode::Fifo, PresentMode::Immediate],
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            usages: TextureUses::COLOR_TARGET | TextureUses::COPY_SRC | TextureUses::COPY_DST | TextureUses::PRESENT,
        })
    }
}

pub struct SurfaceTexture {
    pub(crate) texture: Texture,
    pub(crate) drawable: metal::MetalDrawable,
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
    layer: Mutex<metal::MetalLayer>,
    config: Mutex<Option<SurfaceConfiguration>>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").finish()
    }
}
unsafe impl Send for Surface {}
unsafe impl Sync for Surface {}

impl wgx_hal::window::Surface<MetalApi> for Surface {
    unsafe fn configure(&mut self, device: &Device, config: &SurfaceConfiguration) -> Result<(), SurfaceError> {
        if config.has_zero_area() {
            return Err(SurfaceError::ZeroArea);
        }
        let layer = self.layer.lock();
        layer.set_device(&device.raw);
        layer.set_pixel_format(crate::conv::texture_format(config.format));
        layer.set_drawable_size(metal::core_graphics_types::geometry::CGSize::new(config.width as f64, config.height as f64));
        layer.set_presents_with_transaction(false);
        layer.set_display_sync_enabled(!matches!(config.present_mode, PresentMode::Immediate));
        drop(layer);
        *self.config.lock() = Some(*config);
        Ok(())
    }

    unsafe fn unconfigure(&mut self, _device: &Device) {
        *self.config.lock() = None;
    }

    unsafe fn acquire_texture(&mut self, _timeout_ns: Option<u64>) -> Result<Option<AcquiredSurfaceTexture<MetalApi>>, SurfaceError> {
        let config = self.config.lock().clone().ok_or(SurfaceError::Outdated)?;
        let layer = self.layer.lock();
        let Some(drawable) = layer.next_drawable() else { return Ok(None) };
        let raw_texture = drawable.texture().to_owned();
        Ok(Some(AcquiredSurfaceTexture {
            texture: SurfaceTexture {
                texture: Texture {
                    raw: raw_texture,
                    format: config.format,
                    size: Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
                    mip_level_count: 1,
                },
                drawable: drawable.to_owned(),
            },
            suboptimal: false,
        }))
    }

    unsafe fn discard_texture(&mut self, _texture: SurfaceTexture) {}
}

impl Surface {
    pub(crate) fn present_drawable(texture: &SurfaceTexture) -> &metal::MetalDrawableRef {
        &texture.drawable
    }
}

/// Creates a `CAMetalLayer`, installs it as the view's backing layer, and
/// returns it. Mirrors what `metal-rs`'s own `MetalLayer::new` + manual
/// AppKit plumbing does for a raw `NSView` pointer.
unsafe fn create_metal_layer_for_view(view: *mut objc::runtime::Object) -> metal::MetalLayer {
    use objc::{msg_send, sel, sel_impl};
    let layer = metal::MetalLayer::new();
    layer.set_opaque(true);
    let _: () = msg_send![view, setWantsLayer: true];
    let _: () = msg_send![view, setLayer: layer.as_ptr()];
    layer
}
