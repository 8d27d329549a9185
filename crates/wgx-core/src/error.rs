//! The public error taxonomy (§7).
//!
//! Kinds, not type hierarchies: every fallible public call returns one of
//! these. `Validation`, `OutOfMemory`, and `Internal` are additionally
//! capturable by a device's error-scope stack (`crate::device::ErrorScope`).

/// The filter an error scope matches against. A scope only captures an
/// error whose kind maps onto one of these three.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorFilter {
    Validation,
    OutOfMemory,
    Internal,
}

/// An error surfaced to the application.
#[derive(Debug, thiserror::Error, Clone)]
pub enum Error {
    /// An operation was attempted on a resource that has already been
    /// released. No backend call is made.
    #[error("resource has been released")]
    Released,
    /// `Instance::new` was called with an empty, or entirely unavailable,
    /// backend set.
    #[error("no backends are available")]
    NoBackends,
    /// Adapter enumeration found none.
    #[error("no adapters were found")]
    NoAdapters,
    /// `Surface::configure` was called with zero width or height.
    #[error("surface configuration has zero area")]
    ZeroArea,
    /// The device has failed asynchronously; it and every resource it owns
    /// are now unusable.
    #[error("device lost")]
    DeviceLost,
    /// Resource creation failed for memory reasons.
    #[error("device out of memory")]
    DeviceOutOfMemory,
    /// The surface is no longer valid and must be recreated.
    #[error("surface lost")]
    SurfaceLost,
    /// The surface configuration is stale and must be refreshed before the
    /// next acquire.
    #[error("surface outdated, call configure again")]
    SurfaceOutdated,
    /// A fence wait exceeded its deadline; the submission remains in
    /// flight.
    #[error("operation timed out")]
    Timeout,
    /// A contract violation: an unbound pipeline at draw time, a stale ID,
    /// mismatched pass nesting, a missed alignment requirement, and so on.
    #[error("validation error: {0}")]
    Validation(String),
    /// A backend-reported failure that doesn't fit any other kind.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The error-scope filter this error matches, if any. Errors outside
    /// {Validation, OutOfMemory, Internal} are never captured by a scope;
    /// they always surface directly to the call site.
    pub fn filter(&self) -> Option<ErrorFilter> {
        match self {
            Error::Validation(_) => Some(ErrorFilter::Validation),
            Error::DeviceOutOfMemory => Some(ErrorFilter::OutOfMemory),
            Error::Internal(_) => Some(ErrorFilter::Internal),
            _ => None,
        }
    }
}

impl From<wgx_hal::error::DeviceError> for Error {
    fn from(e: wgx_hal::error::DeviceError) -> Self {
        match e {
            wgx_hal::error::DeviceError::Lost => Error::DeviceLost,
            wgx_hal::error::DeviceError::OutOfMemory => Error::DeviceOutOfMemory,
            wgx_hal::error::DeviceError::Other(msg) => Error::Internal(msg),
        }
    }
}

impl From<wgx_hal::error::SurfaceError> for Error {
    fn from(e: wgx_hal::error::SurfaceError) -> Self {
        match e {
            wgx_hal::error::SurfaceError::Lost => Error::SurfaceLost,
            wgx_hal::error::SurfaceError::Outdated => Error::SurfaceOutdated,
            wgx_hal::error::SurfaceError::ZeroArea => Error::ZeroArea,
            wgx_hal::error::SurfaceError::Device(inner) => inner.into(),
        }
    }
}

impl From<wgx_hal::error::TimeoutError> for Error {
    fn from(_: wgx_hal::error::TimeoutError) -> Self {
        Error::Timeout
    }
}

/// Result type used throughout the public façade.
pub type Result<T> = std::result::Result<T, Error>;
