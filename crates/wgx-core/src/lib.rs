//! Backend-agnostic resource tracking, validation, and command recording.
//!
//! `wgx-core` sits between the public façade and a `wgx-hal` backend: it
//! hands out generational `Id`s in place of raw handles, enforces the
//! contract the HAL trusts its caller to have already checked, and routes
//! errors through a device's error-scope stack. It is generic over any
//! `A: wgx_hal::Api`, so one copy of this crate serves every backend.

pub mod bundle;
pub mod command;
pub mod device;
pub mod error;
pub mod hub;
pub mod id;
pub mod instance;
pub mod present;
pub mod queue;
pub mod resource;

pub use bundle::{RenderBundleEncoder, RenderBundleEncoderDescriptor};
pub use command::CommandEncoder;
pub use device::Device;
pub use error::{Error, ErrorFilter, Result};
pub use id::Id;
pub use instance::{Adapter, Instance};
pub use present::Surface;
pub use queue::{Queue, SubmissionIndex};
