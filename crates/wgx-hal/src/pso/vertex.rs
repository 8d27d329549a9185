//! Vertex input layout.

/// The scalar/vector layout of one vertex attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32,
    Uint32x2,
    Uint32x3,
    Uint32x4,
}

impl VertexFormat {
    /// Size in bytes of one value of this format.
    pub fn size(self) -> u64 {
        use VertexFormat::*;
        match self {
            Float32 | Uint32 => 4,
            Float32x2 | Uint32x2 => 8,
            Float32x3 | Uint32x3 => 12,
            Float32x4 | Uint32x4 => 16,
        }
    }
}

/// One attribute read out of a vertex buffer.
#[derive(Clone, Copy, Debug)]
pub struct VertexAttribute {
    pub format: VertexFormat,
    pub offset: u64,
    pub shader_location: u32,
}

/// Whether a vertex buffer advances per-vertex or per-instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VertexStepMode {
    Vertex,
    Instance,
}

/// The layout of one bound vertex buffer slot.
#[derive(Clone, Debug)]
pub struct VertexBufferLayout<'a> {
    pub array_stride: u64,
    pub step_mode: VertexStepMode,
    pub attributes: std::borrow::Cow<'a, [VertexAttribute]>,
}
