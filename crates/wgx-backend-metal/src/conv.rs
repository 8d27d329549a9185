//! Conversions between `wgx_hal`'s portable types and `metal-rs` types.

use metal::MTLPixelFormat;
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{AddressMode, CompareFunction, FilterMode};
use wgx_hal::pso::{BlendFactor, BlendOperation, CullMode, FrontFace, PrimitiveTopology, StencilOperation, VertexFormat};

pub fn texture_format(format: TextureFormat) -> MTLPixelFormat {
    use TextureFormat::*;
    match format {
        R8Unorm => MTLPixelFormat::R8Unorm,
        R8Snorm => MTLPixelFormat::R8Snorm,
        R8Uint => MTLPixelFormat::R8Uint,
        R8Sint => MTLPixelFormat::R8Sint,
        Rg8Unorm => MTLPixelFormat::RG8Unorm,
        Rg8Snorm => MTLPixelFormat::RG8Snorm,
        Rg8Uint => MTLPixelFormat::RG8Uint,
        Rg8Sint => MTLPixelFormat::RG8Sint,
        Rgba8Unorm => MTLPixelFormat::RGBA8Unorm,
        Rgba8UnormSrgb => MTLPixelFormat::RGBA8Unorm_sRGB,
        Rgba8Snorm => MTLPixelFormat::RGBA8Snorm,
        Rgba8Uint => MTLPixelFormat::RGBA8Uint,
        Rgba8Sint => MTLPixelFormat::RGBA8Sint,
        Bgra8Unorm => MTLPixelFormat::BGRA8Unorm,
        Bgra8UnormSrgb => MTLPixelFormat::BGRA8Unorm_sRGB,
        R16Float => MTLPixelFormat::R16Float,
        Rg16Float => MTLPixelFormat::RG16Float,
        Rgba16Float => MTLPixelFormat::RGBA16Float,
        R32Float => MTLPixelFormat::R32Float,
        Rg32Float => MTLPixelFormat::RG32Float,
        Rgba32Float => MTLPixelFormat::RGBA32Float,
        R32Uint => MTLPixelFormat::R32Uint,
        R32Sint => MTLPixelFormat::R32Sint,
        Rgba32Uint => MTLPixelFormat::RGBA32Uint,
        Rgba32Sint => MTLPixelFormat::RGBA32Sint,
        Depth32Float => MTLPixelFormat::Depth32Float,
        Depth24PlusStencil8 => MTLPixelFormat::Depth32Float_Stencil8,
        Depth16Unorm => MTLPixelFormat::Depth16Unorm,
    }
}

pub fn vertex_format(format: VertexFormat) -> metal::MTLVertexFormat {
    use VertexFormat::*;
    match format {
        Float32 => metal::MTLVertexFormat::Float,
        Float32x2 => metal::MTLVertexFormat::Float2,
        Float32x3 => metal::MTLVertexFormat::Float3,
        Float32x4 => metal::MTLVertexFormat::Float4,
        Uint32 => metal::MTLVertexFormat::UInt,
        Uint32x2 => metal::MTLVertexFormat::UInt2,
        Uint32x3 => metal::MTLVertexFormat::UInt3,
        Uint32x4 => metal::MTLVertexFormat::UInt4,
    }
}

pub fn filter_mode(filter: FilterMode) -> metal::MTLSamplerMinMagFilter {
    match filter {
        FilterMode::Nearest => metal::MTLSamplerMinMagFilter::Nearest,
        FilterMode::Linear => metal::MTLSamplerMinMagFilter::Linear,
    }
}

pub fn mip_filter(filter: FilterMode) -> metal::MTLSamplerMipFilter {
    match filter {
        FilterMode::Nearest => metal::MTLSamplerMipFilter::Nearest,
        FilterMode::Linear => metal::MTLSamplerMipFilter::Linear,
    }
}

pub fn address_mode(mode: AddressMode) -> metal::MTLSamplerAddressMode {
    match mode {
        AddressMode::ClampToEdge => metal::MTLSamplerAddressMode::ClampToEdge,
        AddressMode::Repeat => metal::MTLSamplerAddressMode::Repeat,
        AddressMode::MirrorRepeat => metal::MTLSamplerAddressMode::MirrorRepeat,
    }
}

pub fn compare_function(func: CompareFunction) -> metal::MTLCompareFunction {
    match func {
        CompareFunction::Never => metal::MTLCompareFunction::Never,
        CompareFunction::Less => metal::MTLCompareFunction::Less,
        CompareFunction::Equal => metal::MTLCompareFunction::Equal,
        CompareFunction::LessEqual => metal::MTLCompareFunction::LessEqual,
        CompareFunction::Greater => metal::MTLCompareFunction::Greater,
        CompareFunction::NotEqual => metal::MTLCompareFunction::NotEqual,
        CompareFunction::GreaterEqual => metal::MTLCompareFunction::GreaterEqual,
        CompareFunction::Always => metal::MTLCompareFunction::Always,
    }
}

pub fn stencil_operation(op: StencilOperation) -> metal::MTLStencilOperation {
    match op {
        StencilOperation::Keep => metal::MTLStencilOperation::Keep,
        StencilOperation::Zero => metal::MTLStencilOperation::Zero,
        StencilOperation::Replace => metal::MTLStencilOperation::Replace,
        StencilOperation::IncrementClamp => metal::MTLStencilOperation::IncrementClamp,
        StencilOperation::DecrementClamp => metal::MTLStencilOperation::DecrementClamp,
        StencilOperation::Invert => metal::MTLStencilOperation::Invert,
        StencilOperation::IncrementWrap => metal::MTLStencilOperation::IncrementWrap,
        StencilOperation::DecrementWrap => metal::MTLStencilOperation::DecrementWrap,
    }
}

pub fn blend_factor(factor: BlendFactor) -> metal::MTLBlendFactor {
    match factor {
        BlendFactor::Zero => metal::MTLBlendFactor::Zero,
        BlendFactor::One => metal::MTLBlendFactor::One,
        BlendFactor::Src => metal::MTLBlendFactor::SourceColor,
        BlendFactor::OneMinusSrc => metal::MTLBlendFactor::OneMinusSourceColor,
        BlendFactor::Dst => metal::MTLBlendFactor::DestinationColor,
        BlendFactor::OneMinusDst => metal::MTLBlendFactor::OneMinusDestinationColor,
        BlendFactor::SrcAlpha => metal::MTLBlendFactor::SourceAlpha,
        BlendFactor::OneMinusSrcAlpha => metal::MTLBlendFactor::OneMinusSourceAlpha,
        BlendFactor::DstAlpha => metal::MTLBlendFactor::DestinationAlpha,
        BlendFactor::OneMinusDstAlpha => metal::MTLBlendFactor::OneMinusDestinationAlpha,
        BlendFactor::Constant => metal::MTLBlendFactor::BlendColor,
        BlendFactor::OneMinusConstant => metal::MTLBlendFactor::OneMinusBlendColor,
        BlendFactor::SrcAlphaSaturated => metal::MTLBlendFactor::SourceAlphaSaturated,
    }
}

pub fn blend_operation(op: BlendOperation) -> metal::MTLBlendOperation {
    match op {
        BlendOperation::Add => metal::MTLBlendOperation::Add,
        BlendOperation::Subtract => metal::MTLBlendOperation::Subtract,
        BlendOperation::ReverseSubtract => metal::MTLBlendOperation::ReverseSubtract,
        BlendOperation::Min => metal::MTLBlendOperation::Min,
        BlendOperation::Max => metal::MTLBlendOperation::Max,
    }
}

pub fn primitive_type(topology: PrimitiveTopology) -> metal::MTLPrimitiveType {
    match topology {
        PrimitiveTopology::PointList => metal::MTLPrimitiveType::Point,
        PrimitiveTopology::LineList => metal::MTLPrimitiveType::Line,
        PrimitiveTopology::LineStrip => metal::MTLPrimitiveType::LineStrip,
        PrimitiveTopology::TriangleList => metal::MTLPrimitiveType::Triangle,
        PrimitiveTopology::TriangleStrip => metal::MTLPrimitiveType::TriangleStrip,
    }
}

pub fn winding(face: FrontFace) -> metal::MTLWinding {
    match face {
        FrontFace::Ccw => metal::MTLWinding::CounterClockwise,
        FrontFace::Cw => metal::MTLWinding::Clockwise,
    }
}

pub fn cull_mode(mode: CullMode) -> metal::MTLCullMode {
    match mode {
        CullMode::None => metal::MTLCullMode::None,
        CullMode::Front => metal::MTLCullMode::Front,
        CullMode::Back => metal::MTLCullMode::Back,
    }
}

pub fn index_type(format: wgx_hal::command::IndexFormat) -> metal::MTLIndexType {
    match format {
        wgx_hal::command::IndexFormat::Uint16 => metal::MTLIndexType::UInt16,
        wgx_hal::command::IndexFormat::Uint32 => metal::MTLIndexType::UInt32,
    }
}

pub fn clear_color(c: wgx_hal::command::ClearColor) -> metal::MTLClearColor {
    metal::MTLClearColor::new(c.r, c.g, c.b, c.a)
}

pub fn load_action<C>(op: wgx_hal::command::LoadOp<C>) -> metal::MTLLoadAction {
    match op {
        wgx_hal::command::LoadOp::Clear(_) => metal::MTLLoadAction::Clear,
        wgx_hal::command::LoadOp::Load => metal::MTLLoadAction::Load,
    }
}

pub fn store_action(op: wgx_hal::command::StoreOp) -> metal::MTLStoreAction {
    match op {
        wgx_hal::command::StoreOp::Store => metal::MTLStoreAction::Store,
        wgx_hal::command::StoreOp::Discard => metal::MTLStoreAction::DontCare,
    }
}
