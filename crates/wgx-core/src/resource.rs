//! Resource wrapper types stored in the hub's registries.
//!
//! Each wrapper pairs the immutable descriptor data the public API needs to
//! answer queries about a resource with a guarded slot for the raw HAL
//! handle. The guard lets `release` take the handle exactly once (handing
//! it to the backend's `destroy_*` call) even though the registry may still
//! be holding other `Arc` clones briefly in flight from concurrent lookups;
//! any such lookup that arrives after release sees an empty slot and
//! returns `Error::Released` without touching the backend.

use crate::error::Error;
use crate::id::Id;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use wgx_hal::buffer::BufferUses;
use wgx_hal::image::{Extent3d, SubresourceRange, TextureDimension, TextureUses};
use wgx_hal::format::TextureFormat;

/// A guarded slot for one resource's raw HAL handle.
pub(crate) struct Guarded<H> {
    slot: RwLock<Option<H>>,
}

impl<H> Guarded<H> {
    pub(crate) fn new(handle: H) -> Self {
        Guarded {
            slot: RwLock::new(Some(handle)),
        }
    }

    /// Borrow the live handle, or fail with `Error::Released` if it has
    /// already been taken. The returned guard keeps the handle alive (and
    /// blocks a concurrent `take`) for as long as it is held, which is what
    /// lets callers assemble a batch of borrowed handles (e.g. a pipeline
    /// layout's bind group layouts) before making one HAL call.
    pub(crate) fn get(&self) -> Result<MappedRwLockReadGuard<'_, H>, Error> {
        let guard = self.slot.read();
        if guard.is_none() {
            return Err(Error::Released);
        }
        Ok(RwLockReadGuard::map(guard, |opt| {
            opt.as_ref().expect("checked Some above")
        }))
    }

    /// Take the handle, if still present. Called exactly once, by the
    /// resource's owning `Device` during release.
    pub(crate) fn take(&self) -> Option<H> {
        self.slot.write().take()
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for Guarded<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.slot.read().fmt(f)
    }
}

/// A GPU buffer.
#[derive(Debug)]
pub struct Buffer<A: wgx_hal::Api> {
    pub label: String,
    pub size: u64,
    pub usage: BufferUses,
    pub(crate) raw: Guarded<A::Buffer>,
}

/// A GPU texture.
#[derive(Debug)]
pub struct Texture<A: wgx_hal::Api> {
    pub label: String,
    pub size: Extent3d,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub dimension: TextureDimension,
    pub format: TextureFormat,
    pub usage: TextureUses,
    pub(crate) raw: Guarded<A::Texture>,
}

/// A view into a subresource range of a parent texture.
///
/// Holds the parent's `Id`, not the parent itself: a view never owns its
/// texture, only references it, so a texture may outlive or be outlived by
/// any of its views independently.
#[derive(Debug)]
pub struct TextureView<A: wgx_hal::Api> {
    pub label: String,
    pub parent: Id<Texture<A>>,
    pub range: SubresourceRange,
    pub(crate) raw: Guarded<A::TextureView>,
}

/// A texture sampler.
#[derive(Debug)]
pub struct Sampler<A: wgx_hal::Api> {
    pub label: String,
    pub(crate) raw: Guarded<A::Sampler>,
}

/// A compiled (or translation-pending) shader module.
#[derive(Debug)]
pub struct ShaderModule<A: wgx_hal::Api> {
    pub label: String,
    pub(crate) raw: Guarded<A::ShaderModule>,
}

/// The declared bindings of a bind group layout.
#[derive(Debug)]
pub struct BindGroupLayout<A: wgx_hal::Api> {
    pub label: String,
    pub entries: Vec<wgx_hal::pso::BindGroupLayoutEntry>,
    pub(crate) raw: Guarded<A::BindGroupLayout>,
}

/// A concrete set of resources bound against a `BindGroupLayout`.
///
/// Keeps an `Arc` (not just an `Id`) to every resource it binds, which is
/// what makes "each bound resource outlives the bind group" hold without an
/// extra liveness pass: the bind group's own drop releases those `Arc`s.
#[derive(Debug)]
pub struct BindGroup<A: wgx_hal::Api> {
    pub label: String,
    pub layout: Id<BindGroupLayout<A>>,
    pub(crate) used_buffers: Vec<std::sync::Arc<Buffer<A>>>,
    pub(crate) used_views: Vec<std::sync::Arc<TextureView<A>>>,
    pub(crate) used_samplers: Vec<std::sync::Arc<Sampler<A>>>,
    pub(crate) raw: Guarded<A::BindGroup>,
}

/// A set of bind group layouts assembled for a pipeline.
#[derive(Debug)]
pub struct PipelineLayout<A: wgx_hal::Api> {
    pub label: String,
    pub bind_group_layouts: Vec<Id<BindGroupLayout<A>>>,
    pub(crate) raw: Guarded<A::PipelineLayout>,
}

/// A graphics pipeline.
#[derive(Debug)]
pub struct RenderPipeline<A: wgx_hal::Api> {
    pub label: String,
    pub layout: Id<PipelineLayout<A>>,
    pub(crate) raw: Guarded<A::RenderPipeline>,
}

/// A compute pipeline.
#[derive(Debug)]
pub struct ComputePipeline<A: wgx_hal::Api> {
    pub label: String,
    pub layout: Id<PipelineLayout<A>>,
    pub(crate) raw: Guarded<A::ComputePipeline>,
}

/// An occlusion or timestamp query set.
#[derive(Debug)]
pub struct QuerySet<A: wgx_hal::Api> {
    pub label: String,
    pub ty: wgx_hal::query::QueryType,
    pub count: u32,
    pub(crate) raw: Guarded<A::QuerySet>,
}

/// A finished, immutable command buffer, submittable once.
#[derive(Debug)]
pub struct CommandBuffer<A: wgx_hal::Api> {
    pub label: String,
    pub(crate) raw: Guarded<A::CommandBuffer>,
}

/// A finished, replayable sequence of render-pass-only commands, recorded
/// once by a `RenderBundleEncoder` independent of any particular pass and
/// later replayed into any compatible pass via `CommandEncoder::execute_bundle`.
///
/// Unlike the other resource kinds, a bundle has no backend handle of its
/// own: it is purely a `wgx-core` replay list, so `ExecuteBundle` costs
/// exactly what re-issuing its recorded commands costs and nothing more.
#[derive(Debug)]
pub struct RenderBundle<A: wgx_hal::Api> {
    pub label: String,
    pub(crate) commands: Vec<crate::bundle::BundleCommand<A>>,
}
