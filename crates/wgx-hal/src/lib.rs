//! The hardware abstraction layer: the minimum polymorphic surface area a
//! native driver backend (Vulkan, Metal, DirectX 12, OpenGL ES, or the CPU
//! software rasterizer) must satisfy.
//!
//! `wgx-core` is generic over [`Api`] and never names a concrete backend;
//! each backend crate (`wgx-backend-vulkan`, `wgx-backend-metal`, …)
//! provides one zero-sized `Api` implementation plus the resource types it
//! names.

#![warn(missing_docs)]
#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]
//!
//! HAL calls that touch the native driver are marked `unsafe`: the caller
//! (always `wgx-core`) guarantees the ordering and lifetime invariants the
//! backend relies on (no two passes open at once, no use of a destroyed
//! handle, …). A backend must never panic on a *well-formed* call; it
//! reports failure through [`error::DeviceError`] instead.

pub mod adapter;
pub mod backend;
pub mod buffer;
pub mod command;
pub mod device;
pub mod error;
pub mod format;
pub mod image;
pub mod limits;
pub mod pso;
pub mod query;
pub mod queue;
pub mod shader;
pub mod window;

use std::fmt::Debug;

pub use backend::Backend;
pub use device::FenceValue;

/// Commonly imported traits and types.
pub mod prelude {
    pub use crate::adapter::Adapter;
    pub use crate::command::CommandEncoder;
    pub use crate::device::Device;
    pub use crate::queue::Queue;
    pub use crate::window::{Instance, Surface};
    pub use crate::Api;
}

/// The associated-type family every backend implements once.
///
/// This is the one place a backend's resource types are named together;
/// everywhere else in the crate only refers to `A::Buffer`, `A::Texture`,
/// and so on, generic over `A: Api`.
pub trait Api: Clone + Sized + Debug + Send + Sync + 'static {
    /// This backend's identifier, for the registry and for error messages.
    const BACKEND: Backend;

    type Instance: window::Instance<Self>;
    type Surface: window::Surface<Self>;
    type Adapter: adapter::Adapter<Self>;
    type Device: device::Device<Self>;
    type Queue: queue::Queue<Self>;

    type CommandEncoder: command::CommandEncoder<Self>;
    /// An owned, finished command buffer, submittable once.
    type CommandBuffer: Debug + Send + Sync;

    type Buffer: Debug + Send + Sync;
    type Texture: Debug + Send + Sync;
    /// A texture acquired from a `Surface`, owned by the surface until
    /// presented or discarded.
    type SurfaceTexture: Debug + Send + Sync + std::borrow::Borrow<Self::Texture>;
    type TextureView: Debug + Send + Sync;
    type Sampler: Debug + Send + Sync;

    type ShaderModule: Debug + Send + Sync;
    type BindGroupLayout: Debug + Send + Sync;
    type BindGroup: Debug + Send + Sync;
    type PipelineLayout: Debug + Send + Sync;
    type RenderPipeline: Debug + Send + Sync;
    type ComputePipeline: Debug + Send + Sync;

    type QuerySet: Debug + Send + Sync;
    type Fence: Debug + Send + Sync;
}
