//! Instance creation and the surface/swapchain acquisition-present protocol
//! (§4.1 "Instance operations", §4.4).

use crate::adapter::ExposedAdapter;
use crate::format::TextureFormat;
use crate::image::TextureUses;
use crate::Api;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

bitflags::bitflags! {
    /// Which registered backends an `Instance` should activate.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Backends: u8 {
        const VULKAN = 1 << 0;
        const METAL = 1 << 1;
        const DX12 = 1 << 2;
        const GL = 1 << 3;
        const SOFTWARE = 1 << 4;
        const PRIMARY = Self::VULKAN.bits | Self::METAL.bits | Self::DX12.bits;
        const ALL = Self::PRIMARY.bits | Self::GL.bits | Self::SOFTWARE.bits;
    }
}

bitflags::bitflags! {
    /// Cross-cutting instance flags, orthogonal to which backends are active.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InstanceFlags: u8 {
        /// Enable the backend's own validation layers, where available.
        const DEBUG = 1 << 0;
    }
}

/// Descriptor passed to `Instance::new`.
#[derive(Clone, Debug)]
pub struct InstanceDescriptor<'a> {
    pub name: &'a str,
    pub flags: InstanceFlags,
}

/// The swapchain queueing discipline (classic Vulkan present-mode
/// semantics).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresentMode {
    Fifo,
    FifoRelaxed,
    Mailbox,
    Immediate,
}

/// How a presented surface texture's alpha channel composites with what is
/// behind the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompositeAlphaMode {
    Opaque,
    PreMultiplied,
    PostMultiplied,
    Inherit,
}

/// What a surface can be configured with, queried via
/// `Adapter::surface_capabilities`.
#[derive(Clone, Debug)]
pub struct SurfaceCapabilities {
    pub formats: Vec<TextureFormat>,
    pub present_modes: Vec<PresentMode>,
    pub alpha_modes: Vec<CompositeAlphaMode>,
    pub usages: TextureUses,
}

/// The surface's current configuration, set by `Surface::configure`.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceConfiguration {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUses,
    pub present_mode: PresentMode,
    pub alpha_mode: CompositeAlphaMode,
}

impl SurfaceConfiguration {
    /// `Configure` with zero width or height is rejected with `ZeroArea`.
    pub fn has_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A texture handed to the application by `Surface::acquire_texture`,
/// owned by the surface (not the device) until presented or discarded.
pub struct AcquiredSurfaceTexture<A: Api> {
    pub texture: A::SurfaceTexture,
    /// The swapchain still presents, but no longer matches the surface's
    /// preferred settings; the application should reconfigure soon.
    pub suboptimal: bool,
}

/// The host abstraction of the native screen: one platform window's
/// presentation target.
pub trait Surface<A: Api>: std::fmt::Debug + Send + Sync {
    /// `Unconfigured -> Configured`, or reconfiguration if already
    /// configured (draining the old swapchain to idle first).
    unsafe fn configure(
        &mut self,
        device: &A::Device,
        config: &SurfaceConfiguration,
    ) -> Result<(), crate::error::SurfaceError>;

    /// `Configured -> Unconfigured`.
    unsafe fn unconfigure(&mut self, device: &A::Device);

    /// Block until the presentation engine hands over an image, bounded by
    /// the configured present mode, or until `timeout_ns` elapses.
    unsafe fn acquire_texture(
        &mut self,
        timeout_ns: Option<u64>,
    ) -> Result<Option<AcquiredSurfaceTexture<A>>, crate::error::SurfaceError>;

    /// Release a texture obtained from `acquire_texture` without presenting
    /// it.
    unsafe fn discard_texture(&mut self, texture: A::SurfaceTexture);
}

/// The per-backend entry point: owns the backend's native instance handle
/// and mints `Surface`/`Adapter` objects from it.
pub trait Instance<A: Api>: Sized + Send + Sync {
    unsafe fn new(desc: &InstanceDescriptor) -> crate::error::Result<Self>;

    /// Create a `Surface` from a pair of platform handles. Handle semantics
    /// are platform-dependent (e.g. on Windows the window handle is an
    /// `HWND` and the display handle is unused).
    unsafe fn create_surface(
        &self,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> crate::error::Result<A::Surface>;

    unsafe fn destroy_surface(&self, surface: A::Surface);

    /// Enumerate adapters, optionally filtered to only those that can
    /// present to `compatible_surface`.
    unsafe fn enumerate_adapters(&self, compatible_surface: Option<&A::Surface>) -> Vec<ExposedAdapter<A>>;
}
