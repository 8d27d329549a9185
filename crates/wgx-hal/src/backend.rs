//! The backend registry (§9 "Global registries").
//!
//! Two process-wide structures are specified: this registry (appended to at
//! startup, frozen after first use) and an optional debug-tracing sink
//! (left to the application's `log` subscriber). Neither requires runtime
//! mutation once the first `Instance` is created.

/// Identifies which native API a `wgx_hal::Api` implementation targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Backend {
    Vulkan,
    Metal,
    Dx12,
    Gl,
    Software,
}

impl Backend {
    /// The single bit of `crate::window::Backends` this backend occupies.
    pub fn bit(self) -> crate::window::Backends {
        use crate::window::Backends;
        match self {
            Backend::Vulkan => Backends::VULKAN,
            Backend::Metal => Backends::METAL,
            Backend::Dx12 => Backends::DX12,
            Backend::Gl => Backends::GL,
            Backend::Software => Backends::SOFTWARE,
        }
    }
}

/// A process-wide mapping from `Backend` identifier to a constructor
/// capable of opening that backend's HAL `Instance`.
///
/// Populated once, during the owning application's startup (each backend
/// crate's `register` function appends its entry), and treated as
/// read-only from the first `wgx::Instance::new` call onward.
pub struct BackendRegistry<F> {
    entries: Vec<(Backend, F)>,
}

impl<F> BackendRegistry<F> {
    pub const fn new() -> Self {
        BackendRegistry { entries: Vec::new() }
    }

    /// Append a backend's constructor. Intended to be called only during
    /// process startup, before any `Instance` is created.
    pub fn register(&mut self, backend: Backend, constructor: F) {
        log::debug!("registering HAL backend {:?}", backend);
        self.entries.push((backend, constructor));
    }

    /// Every backend registered so far whose bit is set in `mask`.
    pub fn matching(&self, mask: crate::window::Backends) -> impl Iterator<Item = (Backend, &F)> {
        self.entries
            .iter()
            .filter(move |(backend, _)| mask.contains(backend.bit()))
            .map(|(backend, f)| (*backend, f))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F> Default for BackendRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}
