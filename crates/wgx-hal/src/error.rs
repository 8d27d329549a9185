//! Error kinds a HAL backend is allowed to raise.
//!
//! Every fallible HAL call returns one of these. The core crate (`wgx-core`)
//! maps them onto the public error taxonomy; a backend must never invent a
//! new kind.

use std::fmt;

/// An error returned by a HAL call.
///
/// Mirrors the closed set from the specification: a backend may only ever
/// produce one of these six kinds, optionally carrying a backend-specific
/// message in `Other`.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device encountered a fatal, asynchronous failure (TDR, driver
    /// crash, physical removal). Every subsequent call on the device must
    /// also return this.
    #[error("device lost")]
    Lost,
    /// Host or device memory was exhausted while satisfying the request.
    #[error("out of memory")]
    OutOfMemory,
    /// A backend-specific failure that doesn't fit the other kinds.
    #[error("backend error: {0}")]
    Other(String),
}

/// Errors specific to the surface/swapchain protocol (`wgx_hal::window`).
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The surface is no longer valid; the application must recreate it.
    #[error("surface lost")]
    Lost,
    /// The swapchain configuration no longer matches the surface; the
    /// application must call `configure` again before acquiring.
    #[error("surface outdated, needs reconfiguration")]
    Outdated,
    /// `configure` was called with a zero-area extent. Not a hard error:
    /// legitimate for minimized windows.
    #[error("surface has zero area")]
    ZeroArea,
    /// A device error occurred while servicing the surface.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A fence wait exceeded its deadline. Not fatal: the submission it was
/// waiting on remains in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out waiting for the fence")]
pub struct TimeoutError;

/// Result type used throughout the HAL contract.
pub type Result<T, E = DeviceError> = std::result::Result<T, E>;

impl fmt::Display for crate::Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            crate::Backend::Vulkan => "Vulkan",
            crate::Backend::Metal => "Metal",
            crate::Backend::Dx12 => "DirectX 12",
            crate::Backend::Gl => "OpenGL ES",
            crate::Backend::Software => "Software",
        };
        f.write_str(name)
    }
}
