//! `Instance`, `Surface`, and `Adapter`: the `ash::Instance` layer and the
//! `VK_KHR_surface`/`VK_KHR_swapchain` presentation protocol.

use crate::device::{Device, Queue};
use crate::resource::Texture;
use crate::VulkanApi;
use ash::extensions::khr;
use ash::vk;
use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::CStr;
use wgx_hal::adapter::{AdapterInfo, ExposedAdapter, OpenDevice};
use wgx_hal::error::{DeviceError, Result, SurfaceError};
use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
use wgx_hal::image::{Extent3d, TextureUses};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{
    AcquiredSurfaceTexture, CompositeAlphaMode, InstanceDescriptor, PresentMode,
    SurfaceCapabilities, SurfaceConfiguration,
};

pub struct Instance {
    pub(crate) entry: ash::Entry,
    pub(crate) raw: ash::Instance,
    pub(crate) surface_loader: khr::Surface,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").finish()
    }
}

fn map_vk_result<T>(result: std::result::Result<T, vk::Result>) -> Result<T> {
    result.map_err(|e| match e {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            DeviceError::OutOfMemory
        }
        vk::Result::ERROR_DEVICE_LOST => DeviceError::Lost,
        other => DeviceError::Other(other.to_string()),
    })
}

impl wgx_hal::window::Instance<VulkanApi> for Instance {
    unsafe fn new(desc: &InstanceDescriptor) -> Result<Self> {
        let entry = ash::Entry::linked();
        let app_name = std::ffi::CString::new(desc.name).unwrap_or_default();
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .api_version(vk::API_VERSION_1_1);

        let mut extension_names = ash_window_extension_names();
        if desc.flags.contains(wgx_hal::window::InstanceFlags::DEBUG) {
            extension_names.push(ash::extensions::ext::DebugUtils::name().as_ptr());
        }

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_names);

        let raw = map_vk_result(entry.create_instance(&create_info, None))?;
        let surface_loader = khr::Surface::new(&entry, &raw);
        Ok(Instance { entry, raw, surface_loader })
    }

    unsafe fn create_surface(
        &self,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<Surface> {
        let raw = ash_window_create_surface(&self.entry, &self.raw, display_handle, window_handle)
            .map_err(|e| DeviceError::Other(e.to_string()))?;
        Ok(Surface {
            raw,
            surface_loader: self.surface_loader.clone(),
            swapchain_loader: None,
            swapchain: Mutex::new(None),
        })
    }

    unsafe fn destroy_surface(&self, surface: Surface) {
        self.surface_loader.destroy_surface(surface.raw, None);
    }

    unsafe fn enumerate_adapters(&self, _compatible_surface: Option<&Surface>) -> Vec<ExposedAdapter<VulkanApi>> {
        let physical_devices = match self.raw.enumerate_physical_devices() {
            Ok(devices) => devices,
            Err(_) => return Vec::new(),
        };
        physical_devices
            .into_iter()
            .filter_map(|physical_device| {
                let props = self.raw.get_physical_device_properties(physical_device);
                let name = CStr::from_ptr(props.device_name.as_ptr()).to_string_lossy().into_owned();
                let queue_family_index = self
                    .raw
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))?
                    as u32;
                Some(ExposedAdapter {
                    adapter: Adapter {
                        raw: physical_device,
                        instance_raw: self.raw.clone(),
                        queue_family_index,
                    },
                    info: AdapterInfo {
                        name,
                        vendor: props.vendor_id,
                        device: props.device_id,
                        software_rendering: props.device_type == vk::PhysicalDeviceType::CPU,
                    },
                    features: Features::DEPTH_CLAMPING
                        | Features::INDIRECT_EXECUTION
                        | Features::INDIRECT_FIRST_INSTANCE
                        | Features::SAMPLER_ANISOTROPY
                        | Features::TIMESTAMP_QUERY,
                    downlevel: DownlevelFlags::COMPUTE_SHADERS
                        | DownlevelFlags::INDIRECT_DRAW
                        | DownlevelFlags::ANISOTROPIC_FILTERING
                        | DownlevelFlags::CUBE_ARRAY_TEXTURES,
                    limits: Limits {
                        max_texture_dimension_2d: props.limits.max_image_dimension2_d,
                        max_texture_dimension_3d: props.limits.max_image_dimension3_d,
                        max_buffer_size: props.limits.max_storage_buffer_range as u64,
                        min_buffer_copy_offset_alignment: 4,
                        min_buffer_copy_pitch_alignment: props.limits.optimal_buffer_copy_row_pitch_alignment.max(1) as u32,
                        min_uniform_buffer_offset_alignment: props.limits.min_uniform_buffer_offset_alignment as u32,
                        max_compute_workgroup_size: props.limits.max_compute_work_group_size,
                        ..Limits::default()
                    },
                })
            })
            .collect()
    }
}

pub struct Adapter {
    pub(crate) raw: vk::PhysicalDevice,
    pub(crate) instance_raw: ash::Instance,
    pub(crate) queue_family_index: u32,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").finish()
    }
}

impl wgx_hal::adapter::Adapter<VulkanApi> for Adapter {
    unsafe fn open(&self, _features: Features, _limits: &Limits) -> Result<OpenDevice<VulkanApi>> {
        let priorities = [1.0f32];
        let queue_info = vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(self.queue_family_index)
            .queue_priorities(&priorities);
        let extension_names = [ash::extensions::khr::Swapchain::name().as_ptr()];
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(std::slice::from_ref(&queue_info))
            .enabled_extension_names(&extension_names);
        let raw = map_vk_result(self.instance_raw.create_device(self.raw, &create_info, None))?;
        let raw_queue = raw.get_device_queue(self.queue_family_index, 0);
        let memory_properties = self.instance_raw.get_physical_device_memory_properties(self.raw);
        Ok(OpenDevice {
            device: Device {
                raw: raw.clone(),
                instance: self.instance_raw.clone(),
                physical_device: self.raw,
                memory_properties,
                queue_family_index: self.queue_family_index,
            },
            queue: Queue { raw: raw_queue, device: raw },
        })
    }

    fn texture_format_capabilities(&self, format: TextureFormat) -> TextureFormatCapabilities {
        let props = unsafe {
            self.instance_raw
                .get_physical_device_format_properties(self.raw, crate::conv::texture_format(format))
        };
        let tiling = props.optimal_tiling_features;
        let mut caps = TextureFormatCapabilities::empty();
        if tiling.contains(vk::FormatFeatureFlags::SAMPLED_IMAGE) {
            caps |= TextureFormatCapabilities::SAMPLED;
        }
        if tiling.contains(vk::FormatFeatureFlags::STORAGE_IMAGE) {
            caps |= TextureFormatCapabilities::STORAGE;
        }
        if tiling.contains(vk::FormatFeatureFlags::COLOR_ATTACHMENT)
            || tiling.contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
        {
            caps |= TextureFormatCapabilities::RENDER_TARGET;
        }
        if tiling.contains(vk::FormatFeatureFlags::COLOR_ATTACHMENT_BLEND) {
            caps |= TextureFormatCapabilities::BLENDABLE;
        }
        caps |= TextureFormatCapabilities::MULTISAMPLE | TextureFormatCapabilities::MULTISAMPLE_RESOLVE;
        caps
    }

    unsafe fn surface_capabilities(&self, surface: &Surface) -> Option<SurfaceCapabilities> {
        let caps = surface
            .surface_loader
            .get_physical_device_surface_capabilities(self.raw, surface.raw)
            .ok()?;
        let formats = surface
            .surface_loader
            .get_physical_device_surface_formats(self.raw, surface.raw)
            .ok()?;
        let present_modes = surface
            .surface_loader
            .get_physical_device_surface_present_modes(self.raw, surface.raw)
            .ok()?;
        let _ = caps;
        Some(SurfaceCapabilities {
            formats: formats
                .iter()
                .filter_map(|f| match f.format {
                    vk::Format::B8G8R8A8_UNORM => Some(TextureFormat::Bgra8Unorm),
                    vk::Format::R8G8B8A8_UNORM => Some(TextureFormat::Rgba8Unorm),
                    _ => None,
                })
                .collect(),
            present_modes: present_modes
                .iter()
                .filter_map(|m| match *m {
                    vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
                    vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
                    vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
                    vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
                    _ => None,
                })
                .collect(),
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            usages: TextureUses::COLOR_TARGET | TextureUses::COPY_SRC | TextureUses::COPY_DST | TextureUses::PRESENT,
        })
    }
}

pub struct SurfaceTexture {
    pub(crate) texture: Texture,
    pub(crate) index: u32,
}

impl std::fmt::Debug for SurfaceTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTexture").field("index", &self.index).finish()
    }
}

impl std::borrow::Borrow<Texture> for SurfaceTexture {
    fn borrow(&self) -> &Texture {
        &self.texture
    }
}

struct SwapchainState {
    loader: khr::Swapchain,
    raw: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: TextureFormat,
    extent: Extent3d,
    acquire_semaphore: vk::Semaphore,
}

pub struct Surface {
    pub(crate) raw: vk::SurfaceKHR,
    pub(crate) surface_loader: khr::Surface,
    swapchain_loader: Option<khr::Swapchain>,
    swapchain: Mutex<Option<SwapchainState>>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").finish()
    }
}

impl wgx_hal::window::Surface<VulkanApi> for Surface {
    unsafe fn configure(&mut self, device: &Device, config: &SurfaceConfiguration) -> Result<(), SurfaceError> {
        if config.has_zero_area() {
            return Err(SurfaceError::ZeroArea);
        }
        let loader = self
            .swapchain_loader
            .get_or_insert_with(|| khr::Swapchain::new(device.instance_handle(), &device.raw));

        let old_swapchain = self.swapchain.lock().take().map(|s| s.raw).unwrap_or_default();
        let present_mode = match config.present_mode {
            PresentMode::Fifo => vk::PresentModeKHR::FIFO,
            PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
            PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
            PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        };
        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(self.raw)
            .min_image_count(3)
            .image_format(crate::conv::texture_format(config.format))
            .image_color_space(vk::ColorSpaceKHR::SRGB_NONLINEAR)
            .image_extent(vk::Extent2D { width: config.width, height: config.height })
            .image_array_layers(1)
            .image_usage(crate::conv::image_usage(config.usage, config.format))
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(vk::SurfaceTransformFlagsKHR::IDENTITY)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let raw = map_vk_result(loader.create_swapchain(&create_info, None)).map_err(SurfaceError::Device)?;
        if old_swapchain != vk::SwapchainKHR::null() {
            loader.destroy_swapchain(old_swapchain, None);
        }
        let images = map_vk_result(loader.get_swapchain_images(raw)).map_err(SurfaceError::Device)?;
        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        let acquire_semaphore =
            map_vk_result(device.raw.create_semaphore(&semaphore_info, None)).map_err(SurfaceError::Device)?;

        *self.swapchain.lock() = Some(SwapchainState {
            loader: loader.clone(),
            raw,
            images,
            format: config.format,
            extent: Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
            acquire_semaphore,
        });
        Ok(())
    }

    unsafe fn unconfigure(&mut self, device: &Device) {
        if let Some(state) = self.swapchain.lock().take() {
            device.raw.destroy_semaphore(state.acquire_semaphore, None);
            state.loader.destroy_swapchain(state.raw, None);
        }
    }

    unsafe fn acquire_texture(&mut self, timeout_ns: Option<u64>) -> Result<Option<AcquiredSurfaceTexture<VulkanApi>>, SurfaceError> {
        let guard = self.swapchain.lock();
        let state = guard.as_ref().ok_or(SurfaceError::Outdated)?;
        let timeout = timeout_ns.unwrap_or(u64::MAX);
        let (index, suboptimal) = state
            .loader
            .acquire_next_image(state.raw, timeout, state.acquire_semaphore, vk::Fence::null())
            .map_err(|e| match e {
                vk::Result::ERROR_OUT_OF_DATE_KHR => SurfaceError::Outdated,
                vk::Result::ERROR_SURFACE_LOST_KHR => SurfaceError::Lost,
                other => SurfaceError::Device(DeviceError::Other(other.to_string())),
            })?;
        let image = state.images[index as usize];
        Ok(Some(AcquiredSurfaceTexture {
            texture: SurfaceTexture {
                texture: Texture {
                    raw: image,
                    memory: None,
                    format: state.format,
                    size: state.extent,
                    mip_level_count: 1,
                },
                index,
            },
            suboptimal,
        }))
    }

    unsafe fn discard_texture(&mut self, _texture: SurfaceTexture) {}
}

impl Surface {
    pub(crate) fn present_info(&self, index: u32) -> Option<(vk::SwapchainKHR, u32)> {
        self.swapchain.lock().as_ref().map(|s| (s.raw, index))
    }

    pub(crate) fn swapchain_loader(&self) -> Option<khr::Swapchain> {
        self.swapchain.lock().as_ref().map(|s| s.loader.clone())
    }
}

/// Platform-specific instance extensions needed to create a `VkSurfaceKHR`.
/// A product backend enumerates these per-platform via `ash-window`; this
/// backend supports the common desktop surface extensions directly.
unsafe fn ash_window_extension_names() -> Vec<*const i8> {
    let mut names = vec![khr::Surface::name().as_ptr()];
    #[cfg(target_os = "windows")]
    names.push(ash::extensions::khr::Win32Surface::name().as_ptr());
    #[cfg(all(unix, not(target_os = "macos"), not(target_os = "android")))]
    names.push(ash::extensions::khr::XlibSurface::name().as_ptr());
    #[cfg(target_os = "android")]
    names.push(ash::extensions::khr::AndroidSurface::name().as_ptr());
    #[cfg(target_os = "macos")]
    names.push(ash::extensions::ext::MetalSurface::name().as_ptr());
    names
}

/// Create a `VkSurfaceKHR` for the given platform handle pair. Mirrors what
/// the `ash-window` crate does; inlined here to avoid an extra dependency
/// for five platform branches.
unsafe fn ash_window_create_surface(
    entry: &ash::Entry,
    instance: &ash::Instance,
    _display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,
) -> std::result::Result<vk::SurfaceKHR, vk::Result> {
    match window_handle {
        #[cfg(target_os = "windows")]
        RawWindowHandle::Win32(handle) => {
            let loader = ash::extensions::khr::Win32Surface::new(entry, instance);
            let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                .hinstance(handle.hinstance)
                .hwnd(handle.hwnd);
            loader.create_win32_surface(&create_info, None)
        }
        #[cfg(all(unix, not(target_os = "macos"), not(target_os = "android")))]
        RawWindowHandle::Xlib(handle) => {
            let display = match _display_handle {
                RawDisplayHandle::Xlib(d) => d.display,
                _ => std::ptr::null_mut(),
            };
            let loader = ash::extensions::khr::XlibSurface::new(entry, instance);
            let create_info = vk::XlibSurfaceCreateInfoKHR::builder().dpy(display as *mut _).window(handle.window);
            loader.create_xlib_surface(&create_info, None)
        }
        _ => Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT),
    }
}
