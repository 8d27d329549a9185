//! Feature and limit records negotiated between an `Adapter` and a `Device`.

bitflags::bitflags! {
    /// Optional capabilities an adapter may expose. A subset is requested
    /// when opening a `Device`; the agreed-upon set becomes immutable for
    /// the device's lifetime.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Features: u64 {
        /// Depth clamping instead of clipping.
        const DEPTH_CLAMPING = 1 << 0;
        /// Non-fill (line/point) polygon modes.
        const NON_FILL_POLYGON_MODE = 1 << 1;
        /// Indirect draw/dispatch calls.
        const INDIRECT_EXECUTION = 1 << 2;
        /// `first_instance` other than zero in indirect/indexed draws.
        const INDIRECT_FIRST_INSTANCE = 1 << 3;
        /// Anisotropic texture filtering.
        const SAMPLER_ANISOTROPY = 1 << 4;
        /// Timestamp queries.
        const TIMESTAMP_QUERY = 1 << 5;
        /// Pipeline statistics queries.
        const PIPELINE_STATISTICS_QUERY = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Capabilities a "downlevel" backend (one that cannot fully satisfy the
    /// WebGPU contract) advertises. The software backend in particular
    /// leaves `COMPUTE_SHADERS` unset: see `DESIGN.md`.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DownlevelFlags: u32 {
        /// Compute pipelines and compute passes are supported.
        const COMPUTE_SHADERS = 1 << 0;
        /// Indirect draw calls are supported.
        const INDIRECT_DRAW = 1 << 1;
        /// Anisotropic filtering is supported.
        const ANISOTROPIC_FILTERING = 1 << 2;
        /// Cube array texture views are supported.
        const CUBE_ARRAY_TEXTURES = 1 << 3;
    }
}

/// Numeric limits negotiated between an adapter and a device.
///
/// Fields named `min_*` are *required* alignments the backend publishes as
/// lower bounds (a backend may be stricter but never looser); all other
/// fields are upper bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum edge length of a 2D texture.
    pub max_texture_dimension_2d: u32,
    /// Maximum depth/array-layer count of a 3D or array texture.
    pub max_texture_dimension_3d: u32,
    /// Maximum number of bind groups bindable at once.
    pub max_bind_groups: u32,
    /// Maximum size, in bytes, of a single buffer.
    pub max_buffer_size: u64,
    /// Maximum number of vertex buffers bound to a render pipeline.
    pub max_vertex_buffers: u32,
    /// Required alignment, in bytes, of `BufferCopy` offsets and sizes.
    /// Always a power of two.
    pub min_buffer_copy_offset_alignment: u32,
    /// Required alignment, in bytes, of `BufferTextureCopy::bytes_per_row`.
    /// Always a power of two; typically 256.
    pub min_buffer_copy_pitch_alignment: u32,
    /// Required alignment, in bytes, of dynamic uniform-buffer bindings.
    pub min_uniform_buffer_offset_alignment: u32,
    /// Maximum local workgroup size for a compute pipeline, per dimension.
    pub max_compute_workgroup_size: [u32; 3],
}

impl Default for Limits {
    /// The conservative "downlevel" defaults every backend must meet.
    fn default() -> Self {
        Limits {
            max_texture_dimension_2d: 2048,
            max_texture_dimension_3d: 256,
            max_bind_groups: 4,
            max_buffer_size: 256 << 20,
            max_vertex_buffers: 8,
            min_buffer_copy_offset_alignment: 4,
            min_buffer_copy_pitch_alignment: 256,
            min_uniform_buffer_offset_alignment: 256,
            max_compute_workgroup_size: [256, 256, 64],
        }
    }
}
