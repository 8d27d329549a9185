//! Texture format catalogue.
//!
//! The full WebGPU format enum (~100 variants) is treated as an external
//! type catalogue the HAL consumes, not a surface this crate owns; we keep
//! here only the subset a backend needs to answer capability queries and to
//! size copies. Extending this list is additive and backend-agnostic.

/// A texture or buffer view format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TextureFormat {
    R8Unorm,
    R8Snorm,
    R8Uint,
    R8Sint,
    Rg8Unorm,
    Rg8Snorm,
    Rg8Uint,
    Rg8Sint,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba8Sint,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    R16Float,
    Rg16Float,
    Rgba16Float,
    R32Float,
    Rg32Float,
    Rgba32Float,
    R32Uint,
    R32Sint,
    Rgba32Uint,
    Rgba32Sint,
    Depth32Float,
    Depth24PlusStencil8,
    Depth16Unorm,
}

impl TextureFormat {
    /// Bytes occupied by a single uncompressed texel of this format, or
    /// `None` for block-compressed formats (none of which are in this
    /// subset).
    pub fn block_size(self) -> u32 {
        use TextureFormat::*;
        match self {
            R8Unorm | R8Snorm | R8Uint | R8Sint => 1,
            Rg8Unorm | Rg8Snorm | Rg8Uint | Rg8Sint | R16Float | Depth16Unorm => 2,
            Rgba8Unorm
            | Rgba8UnormSrgb
            | Rgba8Snorm
            | Rgba8Uint
            | Rgba8Sint
            | Bgra8Unorm
            | Bgra8UnormSrgb
            | Rg16Float
            | R32Float
            | R32Uint
            | R32Sint
            | Depth32Float
            | Depth24PlusStencil8 => 4,
            Rgba16Float | Rg32Float => 8,
            Rgba32Float | Rgba32Uint | Rgba32Sint => 16,
        }
    }

    /// Whether this format carries a depth aspect.
    pub fn has_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth16Unorm
        )
    }

    /// Whether this format carries a stencil aspect.
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::Depth24PlusStencil8)
    }

    /// Whether this format is a valid color render target / sample target
    /// (as opposed to depth-stencil only).
    pub fn is_color(self) -> bool {
        !self.has_depth() && !self.has_stencil()
    }
}

bitflags::bitflags! {
    /// Per-format capabilities an adapter may support, queried via
    /// `Adapter::texture_format_capabilities`.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TextureFormatCapabilities: u16 {
        /// The format can be bound for texture sampling.
        const SAMPLED = 1 << 0;
        /// The format can be bound as a storage texture.
        const STORAGE = 1 << 1;
        /// The format can be used as a color or depth-stencil render target.
        const RENDER_TARGET = 1 << 2;
        /// The format supports blending when used as a render target.
        const BLENDABLE = 1 << 3;
        /// The format supports multisampling.
        const MULTISAMPLE = 1 << 4;
        /// A multisampled texture of this format can be resolved.
        const MULTISAMPLE_RESOLVE = 1 << 5;
    }
}
