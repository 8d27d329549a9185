//! `Instance` and `Adapter`: backend startup and physical-device
//! enumeration (§4.1).

use crate::device::Device;
use crate::error::{Error, Result};
use crate::queue::Queue;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::sync::Arc;
use wgx_hal::adapter::{Adapter as HalAdapter, AdapterInfo};
use wgx_hal::limits::{DownlevelFlags, Features, Limits};
use wgx_hal::window::{Instance as HalInstance, InstanceDescriptor, InstanceFlags};

/// A physical device, with the capabilities it advertised at enumeration
/// time. Immutable; `request_device` negotiates a logical `Device` from it.
pub struct Adapter<A: wgx_hal::Api> {
    pub info: AdapterInfo,
    pub features: Features,
    pub downlevel: DownlevelFlags,
    pub limits: Limits,
    pub(crate) hal: A::Adapter,
}

impl<A: wgx_hal::Api> Adapter<A> {
    /// Negotiate a `(Device, Queue)` pair. `features` must be a subset of,
    /// and `limits` no looser than, what this adapter advertised.
    pub fn request_device(
        &self,
        label: impl Into<String>,
        features: Features,
        limits: Limits,
    ) -> Result<(Arc<Device<A>>, Queue<A>)> {
        if !self.features.contains(features) {
            return Err(Error::Validation(
                "requested features exceed what this adapter supports".into(),
            ));
        }
        let opened = unsafe { self.hal.open(features, &limits) }.map_err(Error::from)?;
        let device = Arc::new(Device::new(label.into(), opened.device, features, self.downlevel, limits));
        let queue = Queue::new(opened.queue);
        Ok((device, queue))
    }

    pub fn texture_format_capabilities(
        &self,
        format: wgx_hal::format::TextureFormat,
    ) -> wgx_hal::format::TextureFormatCapabilities {
        self.hal.texture_format_capabilities(format)
    }
}

/// One backend's entry point: owns the native instance handle and mints
/// `Surface`s and `Adapter`s.
pub struct Instance<A: wgx_hal::Api> {
    hal: A::Instance,
}

impl<A: wgx_hal::Api> Instance<A> {
    pub fn new(name: &str, flags: InstanceFlags) -> Result<Self> {
        let desc = InstanceDescriptor { name, flags };
        let hal = unsafe { A::Instance::new(&desc) }.map_err(Error::from)?;
        Ok(Instance { hal })
    }

    /// Enumerate adapters, optionally restricted to ones that can present
    /// to `compatible_surface`.
    pub fn enumerate_adapters(
        &self,
        compatible_surface: Option<&crate::present::Surface<A>>,
    ) -> Vec<Adapter<A>> {
        let exposed = match compatible_surface {
            Some(surface) => {
                let guard = surface.lock_hal();
                unsafe { self.hal.enumerate_adapters(Some(&*guard)) }
            }
            None => unsafe { self.hal.enumerate_adapters(None) },
        };
        exposed
            .into_iter()
            .map(|exposed| Adapter {
                info: exposed.info,
                features: exposed.features,
                downlevel: exposed.downlevel,
                limits: exposed.limits,
                hal: exposed.adapter,
            })
            .collect()
    }

    /// Create a `Surface` targeting a platform window.
    ///
    /// # Safety
    /// `display_handle`/`window_handle` must refer to a live window for as
    /// long as the returned `Surface` exists.
    pub unsafe fn create_surface(
        &self,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<crate::present::Surface<A>> {
        let hal_surface = self
            .hal
            .create_surface(display_handle, window_handle)
            .map_err(Error::from)?;
        Ok(crate::present::Surface::new(hal_surface))
    }
}
