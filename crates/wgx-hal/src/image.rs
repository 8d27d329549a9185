//! Texture, texture-view and sampler descriptors.

use crate::format::TextureFormat;
use std::borrow::Cow;

bitflags::bitflags! {
    /// How a texture will be used. Immutable once the texture is created.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TextureUses: u16 {
        /// Source of a copy.
        const COPY_SRC = 1 << 0;
        /// Destination of a copy or `WriteTexture`.
        const COPY_DST = 1 << 1;
        /// Bound for shader sampling.
        const SAMPLED = 1 << 2;
        /// Bound as a read-write storage texture.
        const STORAGE = 1 << 3;
        /// Used as a color render-pass attachment.
        const COLOR_TARGET = 1 << 4;
        /// Used as a depth/stencil render-pass attachment.
        const DEPTH_STENCIL_TARGET = 1 << 5;
        /// Presentable to a `Surface`.
        const PRESENT = 1 << 6;
    }
}

/// The dimensionality of a texture.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TextureDimension {
    D1,
    D2,
    D3,
}

/// Width/height/depth-or-array-layers of a texture or a copy region.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Extent3d {
    pub width: u32,
    pub height: u32,
    pub depth_or_array_layers: u32,
}

/// Descriptor passed to `Device::create_texture`.
#[derive(Clone, Debug)]
pub struct TextureDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub size: Extent3d,
    pub mip_level_count: u32,
    pub sample_count: u32,
    pub dimension: TextureDimension,
    pub format: TextureFormat,
    pub usage: TextureUses,
}

/// A mip level / array layer range a `TextureView` exposes from its parent
/// texture.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubresourceRange {
    pub base_mip_level: u32,
    pub mip_level_count: u32,
    pub base_array_layer: u32,
    pub array_layer_count: u32,
}

impl SubresourceRange {
    /// Whether `self` lies entirely within `parent`'s mip/layer extent.
    pub fn within(&self, mip_level_count: u32, array_layer_count: u32) -> bool {
        self.base_mip_level + self.mip_level_count <= mip_level_count
            && self.base_array_layer + self.array_layer_count <= array_layer_count
    }
}

/// Descriptor passed to `Device::create_texture_view`.
#[derive(Clone, Debug)]
pub struct TextureViewDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub format: TextureFormat,
    pub range: SubresourceRange,
}

/// Filtering mode used for minification, magnification and mip selection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture coordinate wrapping mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Comparison function used by depth/stencil tests and comparison samplers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Descriptor passed to `Device::create_sampler`.
#[derive(Clone, Debug)]
pub struct SamplerDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub address_mode_w: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: FilterMode,
    pub lod_min_clamp: f32,
    pub lod_max_clamp: f32,
    pub compare: Option<CompareFunction>,
    /// One of {1, 2, 4, 8, 16}.
    pub anisotropy_clamp: u8,
}

/// The layout of texel data as it sits in a linear buffer, used by
/// buffer<->texture copies.
#[derive(Clone, Copy, Debug)]
pub struct ImageDataLayout {
    pub offset: u64,
    pub bytes_per_row: u32,
    pub rows_per_image: u32,
}

/// A single texel/array-layer origin for a copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Origin3d {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// One mip level / array layer slice addressed by a copy.
#[derive(Clone, Copy, Debug)]
pub struct TextureCopyView {
    pub mip_level: u32,
    pub origin: Origin3d,
}

/// A region copied between a buffer and a texture.
#[derive(Clone, Copy, Debug)]
pub struct BufferTextureCopy {
    pub buffer_layout: ImageDataLayout,
    pub texture: TextureCopyView,
    pub size: Extent3d,
}

/// A region copied between two textures.
#[derive(Clone, Copy, Debug)]
pub struct TextureCopy {
    pub src: TextureCopyView,
    pub dst: TextureCopyView,
    pub size: Extent3d,
}
