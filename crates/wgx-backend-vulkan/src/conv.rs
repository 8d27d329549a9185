//! Conversions between `wgx_hal`'s portable types and their `ash`/Vulkan
//! counterparts.

use ash::vk;
use wgx_hal::buffer::BufferUses;
use wgx_hal::command::{ClearColor, IndexFormat, LoadOp, StoreOp};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{AddressMode, CompareFunction, FilterMode, TextureUses};
use wgx_hal::pso::{
    BlendFactor, BlendOperation, CullMode, FrontFace, PrimitiveTopology, StencilOperation,
    VertexFormat,
};

pub fn texture_format(format: TextureFormat) -> vk::Format {
    use TextureFormat::*;
    match format {
        R8Unorm => vk::Format::R8_UNORM,
        R8Snorm => vk::Format::R8_SNORM,
        R8Uint => vk::Format::R8_UINT,
        R8Sint => vk::Format::R8_SINT,
        Rg8Unorm => vk::Format::R8G8_UNORM,
        Rg8Snorm => vk::Format::R8G8_SNORM,
        Rg8Uint => vk::Format::R8G8_UINT,
        Rg8Sint => vk::Format::R8G8_SINT,
        Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        Rgba8Snorm => vk::Format::R8G8B8A8_SNORM,
        Rgba8Uint => vk::Format::R8G8B8A8_UINT,
        Rgba8Sint => vk::Format::R8G8B8A8_SINT,
        Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
        Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
        R16Float => vk::Format::R16_SFLOAT,
        Rg16Float => vk::Format::R16G16_SFLOAT,
        Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        R32Float => vk::Format::R32_SFLOAT,
        Rg32Float => vk::Format::R32G32_SFLOAT,
        Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
        R32Uint => vk::Format::R32_UINT,
        R32Sint => vk::Format::R32_SINT,
        Rgba32Uint => vk::Format::R32G32B32A32_UINT,
        Rgba32Sint => vk::Format::R32G32B32A32_SINT,
        Depth32Float => vk::Format::D32_SFLOAT,
        Depth24PlusStencil8 => vk::Format::D24_UNORM_S8_UINT,
        Depth16Unorm => vk::Format::D16_UNORM,
    }
}

pub fn vertex_format(format: VertexFormat) -> vk::Format {
    use VertexFormat::*;
    match format {
        Float32 => vk::Format::R32_SFLOAT,
        Float32x2 => vk::Format::R32G32_SFLOAT,
        Float32x3 => vk::Format::R32G32B32_SFLOAT,
        Float32x4 => vk::Format::R32G32B32A32_SFLOAT,
        Uint32 => vk::Format::R32_UINT,
        Uint32x2 => vk::Format::R32G32_UINT,
        Uint32x3 => vk::Format::R32G32B32_UINT,
        Uint32x4 => vk::Format::R32G32B32A32_UINT,
    }
}

pub fn buffer_usage(uses: BufferUses) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if uses.contains(BufferUses::COPY_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if uses.contains(BufferUses::COPY_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    if uses.contains(BufferUses::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if uses.contains(BufferUses::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if uses.contains(BufferUses::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if uses.contains(BufferUses::STORAGE) {
        flags |= vk::BufferUsageFlags::STORAGE_BUFFER;
    }
    if uses.contains(BufferUses::INDIRECT) {
        flags |= vk::BufferUsageFlags::INDIRECT_BUFFER;
    }
    flags
}

pub fn image_usage(uses: TextureUses, format: TextureFormat) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if uses.contains(TextureUses::COPY_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if uses.contains(TextureUses::COPY_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if uses.contains(TextureUses::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if uses.contains(TextureUses::STORAGE) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if uses.contains(TextureUses::COLOR_TARGET) && format.is_color() {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if uses.contains(TextureUses::DEPTH_STENCIL_TARGET) && !format.is_color() {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    flags
}

pub fn aspect_mask(format: TextureFormat) -> vk::ImageAspectFlags {
    match (format.has_depth(), format.has_stencil()) {
        (true, true) => vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL,
        (true, false) => vk::ImageAspectFlags::DEPTH,
        (false, _) => vk::ImageAspectFlags::COLOR,
    }
}

pub fn filter_mode(filter: FilterMode) -> vk::Filter {
    match filter {
        FilterMode::Nearest => vk::Filter::NEAREST,
        FilterMode::Linear => vk::Filter::LINEAR,
    }
}

pub fn mipmap_mode(filter: FilterMode) -> vk::SamplerMipmapMode {
    match filter {
        FilterMode::Nearest => vk::SamplerMipmapMode::NEAREST,
        FilterMode::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub fn address_mode(mode: AddressMode) -> vk::SamplerAddressMode {
    match mode {
        AddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        AddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
        AddressMode::MirrorRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
    }
}

pub fn compare_op(func: CompareFunction) -> vk::CompareOp {
    match func {
        CompareFunction::Never => vk::CompareOp::NEVER,
        CompareFunction::Less => vk::CompareOp::LESS,
        CompareFunction::Equal => vk::CompareOp::EQUAL,
        CompareFunction::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareFunction::Greater => vk::CompareOp::GREATER,
        CompareFunction::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareFunction::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareFunction::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn stencil_op(op: StencilOperation) -> vk::StencilOp {
    match op {
        StencilOperation::Keep => vk::StencilOp::KEEP,
        StencilOperation::Zero => vk::StencilOp::ZERO,
        StencilOperation::Replace => vk::StencilOp::REPLACE,
        StencilOperation::IncrementClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
        StencilOperation::DecrementClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
        StencilOperation::Invert => vk::StencilOp::INVERT,
        StencilOperation::IncrementWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        StencilOperation::DecrementWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

pub fn blend_factor(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::Src => vk::BlendFactor::SRC_COLOR,
        BlendFactor::OneMinusSrc => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::Dst => vk::BlendFactor::DST_COLOR,
        BlendFactor::OneMinusDst => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        BlendFactor::Constant => vk::BlendFactor::CONSTANT_COLOR,
        BlendFactor::OneMinusConstant => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::SrcAlphaSaturated => vk::BlendFactor::SRC_ALPHA_SATURATE,
    }
}

pub fn blend_op(op: BlendOperation) -> vk::BlendOp {
    match op {
        BlendOperation::Add => vk::BlendOp::ADD,
        BlendOperation::Subtract => vk::BlendOp::SUBTRACT,
        BlendOperation::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOperation::Min => vk::BlendOp::MIN,
        BlendOperation::Max => vk::BlendOp::MAX,
    }
}

pub fn primitive_topology(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub fn front_face(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::Ccw => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Cw => vk::FrontFace::CLOCKWISE,
    }
}

pub fn cull_mode(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn index_type(format: IndexFormat) -> vk::IndexType {
    match format {
        IndexFormat::Uint16 => vk::IndexType::UINT16,
        IndexFormat::Uint32 => vk::IndexType::UINT32,
    }
}

pub fn clear_color_value(c: ClearColor) -> vk::ClearColorValue {
    vk::ClearColorValue {
        float32: [c.r as f32, c.g as f32, c.b as f32, c.a as f32],
    }
}

pub fn attachment_load_op<C>(op: LoadOp<C>) -> vk::AttachmentLoadOp {
    match op {
        LoadOp::Clear(_) => vk::AttachmentLoadOp::CLEAR,
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
    }
}

pub fn attachment_store_op(op: StoreOp) -> vk::AttachmentStoreOp {
    match op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::Discard => vk::AttachmentStoreOp::DONT_CARE,
    }
}
