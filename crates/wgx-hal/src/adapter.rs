//! Physical-device enumeration and capability queries (§4.1 "Adapter
//! operations").

use crate::format::{TextureFormat, TextureFormatCapabilities};
use crate::limits::{DownlevelFlags, Features, Limits};
use crate::window::SurfaceCapabilities;
use crate::Api;

/// Read-only information about a physical adapter, stable after `open`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    /// True for the CPU reference rasterizer.
    pub software_rendering: bool,
}

/// The `(adapter, info, features, capabilities)` record returned by
/// `Instance::enumerate_adapters`.
pub struct ExposedAdapter<A: Api> {
    pub adapter: A::Adapter,
    pub info: AdapterInfo,
    /// The adapter's maximum supported feature set; `Adapter::open` may
    /// request any subset.
    pub features: Features,
    pub downlevel: DownlevelFlags,
    /// The adapter's maximum supported limits; `Adapter::open` may request
    /// any limits no looser than these.
    pub limits: Limits,
}

/// A successfully opened `(Device, Queue)` pair, as returned by
/// `Adapter::open`.
pub struct OpenDevice<A: Api> {
    pub device: A::Device,
    pub queue: A::Queue,
}

/// Physical-device capability and logical-device-creation surface.
pub trait Adapter<A: Api>: std::fmt::Debug + Send + Sync {
    /// Negotiate a logical device with the given feature/limit request.
    /// `features` must be a subset of what this adapter exposed; `limits`
    /// must be no looser than what this adapter exposed.
    unsafe fn open(&self, features: Features, limits: &Limits) -> crate::error::Result<OpenDevice<A>>;

    /// Whether `format` supports each of the usages in `wanted`.
    fn texture_format_capabilities(&self, format: TextureFormat) -> TextureFormatCapabilities;

    /// Formats, present modes, and alpha-composite modes this adapter can
    /// use to present to `surface`, or `None` if it cannot present to it
    /// at all.
    unsafe fn surface_capabilities(&self, surface: &A::Surface) -> Option<SurfaceCapabilities>;
}
