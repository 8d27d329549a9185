//! Buffer descriptors.

use std::borrow::Cow;

bitflags::bitflags! {
    /// How a buffer will be used. Immutable once the buffer is created.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BufferUses: u16 {
        /// Source of a `CopyBuffer`/`CopyBufferToTexture`.
        const COPY_SRC = 1 << 0;
        /// Destination of a `CopyBuffer`/`CopyTextureToBuffer`/`WriteBuffer`.
        const COPY_DST = 1 << 1;
        /// Bound as an index buffer.
        const INDEX = 1 << 2;
        /// Bound as a vertex buffer.
        const VERTEX = 1 << 3;
        /// Bound as a uniform buffer.
        const UNIFORM = 1 << 4;
        /// Bound as a read-write storage buffer.
        const STORAGE = 1 << 5;
        /// Used as the argument buffer of an indirect draw/dispatch.
        const INDIRECT = 1 << 6;
        /// Mapped for host reads via `Queue::read_buffer`.
        const MAP_READ = 1 << 7;
        /// Mapped for host writes via `Queue::write_buffer`.
        const MAP_WRITE = 1 << 8;
    }
}

/// Descriptor passed to `Device::create_buffer`.
#[derive(Clone, Debug)]
pub struct BufferDescriptor<'a> {
    /// Debug label, threaded into backend object names where supported.
    pub label: Option<Cow<'a, str>>,
    /// Size in bytes. Must be greater than zero.
    pub size: u64,
    /// Usage bitset. Must be non-empty.
    pub usage: BufferUses,
    /// Whether the buffer is mapped for host writes at creation time.
    pub mapped_at_creation: bool,
}

/// A region of one buffer copied to another.
#[derive(Clone, Copy, Debug)]
pub struct BufferCopy {
    /// Offset in bytes into the source buffer.
    pub src_offset: u64,
    /// Offset in bytes into the destination buffer.
    pub dst_offset: u64,
    /// Number of bytes to copy.
    pub size: u64,
}
