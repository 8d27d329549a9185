// Copyright 2017 The Gfx-rs Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The `wgx` façade: one backend, selected at compile time by Cargo
//! feature, monomorphizing `wgx-core`'s backend-generic types.
//!
//! Picking the backend this way (rather than a `dyn Api` trait object) is
//! the same trick the hal example binaries use to pick one of
//! `gfx_backend_dx12`/`gfx_backend_vulkan`/`gfx_backend_metal`/`gfx_backend_gl`
//! at a time — `#[cfg(feature = "...")] use ... as back;` — generalized so a
//! build can enable more than one backend and reach each by name under its
//! own module (`wgx::vulkan`, `wgx::gl`, …), while the unqualified
//! re-exports at the crate root resolve to whichever single backend wins
//! priority among the ones enabled.
//!
//! Priority, highest first, when more than one backend feature is active:
//! Dx12, Vulkan, Metal, Gl, Software. Enabling exactly one backend feature
//! is the common case and makes the root re-exports unambiguous.

#![warn(missing_debug_implementations)]

pub use wgx_hal::backend::Backend as BackendKind;
pub use wgx_hal::format::{TextureFormat, TextureFormatCapabilities};
pub use wgx_hal::limits::{DownlevelFlags, Features, Limits};
pub use wgx_hal::window::{Backends, CompositeAlphaMode, InstanceFlags, PresentMode, SurfaceConfiguration};
pub use wgx_core::error::{Error, ErrorFilter, Result};
pub use wgx_core::id::Id;

/// Instantiate every `wgx-core` type generic over one backend's `Api`,
/// under a module named after it. Used once per backend feature below.
macro_rules! backend_module {
    ($(#[$meta:meta])* $name:ident, $api:ty) => {
        $(#[$meta])*
        pub mod $name {
            //! Types monomorphized against this module's backend.
            pub use $api as Api;
            pub type Instance = wgx_core::instance::Instance<$api>;
            pub type Adapter = wgx_core::instance::Adapter<$api>;
            pub type Device = wgx_core::device::Device<$api>;
            pub type Queue = wgx_core::queue::Queue<$api>;
            pub type Surface = wgx_core::present::Surface<$api>;
            pub type CommandEncoder = wgx_core::command::CommandEncoder<$api>;
            pub type Buffer = wgx_core::resource::Buffer<$api>;
            pub type Texture = wgx_core::resource::Texture<$api>;
            pub type TextureView = wgx_core::resource::TextureView<$api>;
            pub type Sampler = wgx_core::resource::Sampler<$api>;
            pub type ShaderModule = wgx_core::resource::ShaderModule<$api>;
            pub type BindGroupLayout = wgx_core::resource::BindGroupLayout<$api>;
            pub type BindGroup = wgx_core::resource::BindGroup<$api>;
            pub type PipelineLayout = wgx_core::resource::PipelineLayout<$api>;
            pub type RenderPipeline = wgx_core::resource::RenderPipeline<$api>;
            pub type ComputePipeline = wgx_core::resource::ComputePipeline<$api>;
            pub type QuerySet = wgx_core::resource::QuerySet<$api>;
            pub type RenderBundle = wgx_core::resource::RenderBundle<$api>;
            pub type RenderBundleEncoder = wgx_core::bundle::RenderBundleEncoder<$api>;
        }
    };
}

#[cfg(feature = "dx12")]
backend_module!(dx12, wgx_backend_dx12::Dx12Api);
#[cfg(feature = "vulkan")]
backend_module!(vulkan, wgx_backend_vulkan::VulkanApi);
#[cfg(feature = "metal")]
backend_module!(metal, wgx_backend_metal::MetalApi);
#[cfg(feature = "gl")]
backend_module!(gl, wgx_backend_gl::GlApi);
#[cfg(feature = "software")]
backend_module!(software, wgx_backend_soft::SoftApi);

#[cfg(feature = "dx12")]
pub use dx12::*;
#[cfg(all(feature = "vulkan", not(feature = "dx12")))]
pub use vulkan::*;
#[cfg(all(feature = "metal", not(any(feature = "dx12", feature = "vulkan"))))]
pub use metal::*;
#[cfg(all(feature = "gl", not(any(feature = "dx12", feature = "vulkan", feature = "metal"))))]
pub use gl::*;
#[cfg(all(
    feature = "software",
    not(any(feature = "dx12", feature = "vulkan", feature = "metal", feature = "gl"))
))]
pub use software::*;

#[cfg(not(any(
    feature = "dx12",
    feature = "vulkan",
    feature = "metal",
    feature = "gl",
    feature = "software"
)))]
compile_error!("wgx requires at least one backend feature: \"dx12\", \"vulkan\", \"metal\", \"gl\", or \"software\"");
