//! `Instance`, `Surface`, and `Adapter`: `IDXGIFactory` enumeration and
//! `IDXGISwapChain` presentation.

use crate::device::{Device, Queue};
use crate::resource::Texture;
use crate::Dx12Api;
use parking_lot::Mutex;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use windows::core::Interface;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use wgx_hal::adapter::{AdapterInfo, ExposedAdapter, OpenDevice};
use wgx_hal::error::{DeviceError, Result, SurfaceError};
use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
use wgx_hal::image::{Extent3d, TextureUses};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{
    AcquiredSurfaceTexture, CompositeAlphaMode, InstanceDescriptor, PresentMode, SurfaceCapabilities,
    SurfaceConfiguration,
};

pub struct Instance {
    pub(crate) factory: IDXGIFactory4,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").finish()
    }
}
unsafe impl Send for Instance {}
unsafe impl Sync for Instance {}

impl wgx_hal::window::Instance<Dx12Api> for Instance {
    unsafe fn new(desc: &InstanceDescriptor) -> Result<Self> {
        let flags = if desc.flags.contains(wgx_hal::window::InstanceFlags::DEBUG) {
            if let Ok(debug) = windows::Win32::Graphics::Direct3D12::D3D12GetDebugInterface::<ID3D12Debug>() {
                debug.EnableDebugLayer();
            }
            DXGI_CREATE_FACTORY_DEBUG
        } else {
            0
        };
        let factory: IDXGIFactory4 = CreateDXGIFactory2(flags).map_err(|e| DeviceError::Other(e.to_string()))?;
        Ok(Instance { factory })
    }

    unsafe fn create_surface(&self, _display_handle: RawDisplayHandle, window_handle: RawWindowHandle) -> Result<Surface> {
        let hwnd = match window_handle {
            RawWindowHandle::Win32(handle) => HWND(handle.hwnd as isize),
            _ => return Err(DeviceError::Other("unsupported window handle for DX12 surface".into())),
        };
        Ok(Surface { factory: self.factory.clone(), hwnd, swapchain: Mutex::new(None) })
    }

    unsafe fn destroy_surface(&self, _surface: Surface) {}

    unsafe fn enumerate_adapters(&self, _compatible_surface: Option<&Surface>) -> Vec<ExposedAdapter<Dx12Api>> {
        let mut adapters = Vec::new();
        let mut index = 0;
        loop {
            let Ok(adapter) = self.factory.EnumAdapters1(index) else { break };
            index += 1;
            let Ok(desc) = adapter.GetDesc1() else { continue };
            if (desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0 {
                continue;
            }
            let name = String::from_utf16_lossy(&desc.Description).trim_end_matches('\0').to_string();
            adapters.push(ExposedAdapter {
                adapter: Adapter { raw: adapter },
                info: AdapterInfo {
                    name,
                    vendor: desc.VendorId,
                    device: desc.DeviceId,
                    software_rendering: false,
                },
                features: Features::DEPTH_CLAMPING
                    | Features::NON_FILL_POLYGON_MODE
                    | Features::INDIRECT_EXECUTION
                    | Features::INDIRECT_FIRST_INSTANCE
                    | Features::SAMPLER_ANISOTROPY
                    | Features::TIMESTAMP_QUERY
                    | Features::PIPELINE_STATISTICS_QUERY,
                downlevel: DownlevelFlags::COMPUTE_SHADERS
                    | DownlevelFlags::INDIRECT_DRAW
                    | DownlevelFlags::ANISOTROPIC_FILTERING
                    | DownlevelFlags::CUBE_ARRAY_TEXTURES,
                limits: Limits { max_texture_dimension_2d: 16384, max_texture_dimension_3d: 2048, ..Limits::default() },
            });
        }
        adapters
    }
}

pub struct Adapter {
    pub(crate) raw: IDXGIAdapter1,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").finish()
    }
}
unsafe impl Send for Adapter {}
unsafe impl Sync for Adapter {}

impl wgx_hal::adapter::Adapter<Dx12Api> for Adapter {
    unsafe fn open(&self, _features: Features, _limits: &Limits) -> Result<OpenDevice<Dx12Api>> {
        let mut device: Option<ID3D12Device> = None;
        D3D12CreateDevice(&self.raw, D3D_FEATURE_LEVEL_11_0, &mut device).map_err(|e| DeviceError::Other(e.to_string()))?;
        let device = device.ok_or_else(|| DeviceError::Other("D3D12CreateDevice returned no device".into()))?;

        let queue_desc = D3D12_COMMAND_QUEUE_DESC {
            Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
            Priority: 0,
            Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
            NodeMask: 0,
        };
        let raw_queue: ID3D12CommandQueue = device.CreateCommandQueue(&queue_desc).map_err(|e| DeviceError::Other(e.to_string()))?;

        Ok(OpenDevice {
            device: Device::new(device.clone(), raw_queue.clone()),
            queue: Queue { raw: raw_queue, device },
        })
    }

    fn texture_format_capabilities(&self, _format: TextureFormat) -> TextureFormatCapabilities {
        TextureFormatCapabilities::SAMPLED
            | TextureFormatCapabilities::STORAGE
            | TextureFormatCapabilities::RENDER_TARGET
            | TextureFormatCapabilities::BLENDABLE
            | TextureFormatCapabilities::MULTISAMPLE
            | TextureFormatCapabilities::MULTISAMPLE_RESOLVE
    }

    unsafe fn surface_capabilities(&self, _surface: &Surface) -> Option<SurfaceCapabilities> {
        Some(SurfaceCapabilities {
            formats: vec![TextureFormat::Bgra8Unorm, TextureFormat::Rgba8Unorm],
            present_modes: vec![PresentMode::Fifo, PresentMode::Immediate],
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
unsafe impl Send for SurfaceTexture {}
unsafe impl Sync for SurfaceTexture {}

impl std::borrow::Borrow<Texture> for SurfaceTexture {
    fn borrow(&self) -> &Texture {
        &self.texture
    }
}

struct SwapchainState {
    raw: IDXGISwapChain3,
    format: TextureFormat,
    extent: Extent3d,
}

pub struct Surface {
    factory: IDXGIFactory4,
    hwnd: HWND,
    swapchain: Mutex<Option<SwapchainState>>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").finish()
    }
}
unsafe impl Send for Surface {}
unsafe impl Sync for Surface {}

impl wgx_hal::window::Surface<Dx12Api> for Surface {
    unsafe fn configure(&mut self, device: &Device, config: &SurfaceConfiguration) -> Result<(), SurfaceError> {
        if config.has_zero_area() {
            return Err(SurfaceError::ZeroArea);
        }
        let desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: config.width,
            Height: config.height,
            Format: crate::conv::texture_format(config.format),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: 3,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            ..Default::default()
        };
        let swapchain = self
            .factory
            .CreateSwapChainForHwnd(&device.queue_for_swapchain(), self.hwnd, &desc, None, None)
            .map_err(|e| SurfaceError::Device(DeviceError::Other(e.to_string())))?;
        let swapchain: IDXGISwapChain3 = swapchain.cast().map_err(|e| SurfaceError::Device(DeviceError::Other(e.to_string())))?;
        *self.swapchain.lock() = Some(SwapchainState {
            raw: swapchain,
            format: config.format,
            extent: Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
        });
        Ok(())
    }

    unsafe fn unconfigure(&mut self, _device: &Device) {
        *self.swapchain.lock() = None;
    }

    unsafe fn acquire_texture(&mut self, _timeout_ns: Option<u64>) -> Result<Option<AcquiredSurfaceTexture<Dx12Api>>, SurfaceError> {
        let guard = self.swapchain.lock();
        let state = guard.as_ref().ok_or(SurfaceError::Outdated)?;
        let index = state.raw.GetCurrentBackBufferIndex();
        let raw: ID3D12Resource = state
            .raw
            .GetBuffer(index)
            .map_err(|e| SurfaceError::Device(DeviceError::Other(e.to_string())))?;
        Ok(Some(AcquiredSurfaceTexture {
            texture: SurfaceTexture {
                texture: Texture { raw, format: state.format, size: state.extent, mip_level_count: 1 },
                index,
            },
            suboptimal: false,
        }))
    }

    unsafe fn discard_texture(&mut self, _texture: SurfaceTexture) {}
}

impl Surface {
    pub(crate) fn present_swapchain(&self) -> Option<IDXGISwapChain3> {
        self.swapchain.lock().as_ref().map(|s| s.raw.clone())
    }
}
