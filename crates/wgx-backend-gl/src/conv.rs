//! Conversions between `wgx_hal`'s portable types and raw GL enum values.

use glow::HasContext;
use wgx_hal::command::{IndexFormat, LoadOp, StoreOp};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{AddressMode, CompareFunction, FilterMode};
use wgx_hal::pso::{BlendFactor, BlendOperation, CullMode, FrontFace, PrimitiveTopology, StencilOperation, VertexFormat};

/// `(internal_format, format, ty)` triple for `glTexImage2D`.
pub fn texture_format(format: TextureFormat) -> (i32, u32, u32) {
    use TextureFormat::*;
    match format {
        R8Unorm => (glow::R8 as i32, glow::RED, glow::UNSIGNED_BYTE),
        R8Snorm => (glow::R8_SNORM as i32, glow::RED, glow::BYTE),
        R8Uint => (glow::R8UI as i32, glow::RED_INTEGER, glow::UNSIGNED_BYTE),
        R8Sint => (glow::R8I as i32, glow::RED_INTEGER, glow::BYTE),
        Rg8Unorm => (glow::RG8 as i32, glow::RG, glow::UNSIGNED_BYTE),
        Rg8Snorm => (glow::RG8_SNORM as i32, glow::RG, glow::BYTE),
        Rg8Uint => (glow::RG8UI as i32, glow::RG_INTEGER, glow::UNSIGNED_BYTE),
        Rg8Sint => (glow::RG8I as i32, glow::RG_INTEGER, glow::BYTE),
        Rgba8Unorm => (glow::RGBA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        Rgba8UnormSrgb => (glow::SRGB8_ALPHA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        Rgba8Snorm => (glow::RGBA8_SNORM as i32, glow::RGBA, glow::BYTE),
        Rgba8Uint => (glow::RGBA8UI as i32, glow::RGBA_INTEGER, glow::UNSIGNED_BYTE),
        Rgba8Sint => (glow::RGBA8I as i32, glow::RGBA_INTEGER, glow::BYTE),
        // GL has no native BGRA internal format on most ES implementations;
        // the driver reorders on upload and this is treated as RGBA8.
        Bgra8Unorm => (glow::RGBA8 as i32, glow::BGRA, glow::UNSIGNED_BYTE),
        Bgra8UnormSrgb => (glow::SRGB8_ALPHA8 as i32, glow::BGRA, glow::UNSIGNED_BYTE),
        R16Float => (glow::R16F as i32, glow::RED, glow::HALF_FLOAT),
        Rg16Float => (glow::RG16F as i32, glow::RG, glow::HALF_FLOAT),
        Rgba16Float => (glow::RGBA16F as i32, glow::RGBA, glow::HALF_FLOAT),
        R32Float => (glow::R32F as i32, glow::RED, glow::FLOAT),
        Rg32Float => (glow::RG32F as i32, glow::RG, glow::FLOAT),
        Rgba32Float => (glow::RGBA32F as i32, glow::RGBA, glow::FLOAT),
        R32Uint => (glow::R32UI as i32, glow::RED_INTEGER, glow::UNSIGNED_INT),
        R32Sint => (glow::R32I as i32, glow::RED_INTEGER, glow::INT),
        Rgba32Uint => (glow::RGBA32UI as i32, glow::RGBA_INTEGER, glow::UNSIGNED_INT),
        Rgba32Sint => (glow::RGBA32I as i32, glow::RGBA_INTEGER, glow::INT),
        Depth32Float => (glow::DEPTH_COMPONENT32F as i32, glow::DEPTH_COMPONENT, glow::FLOAT),
        Depth24PlusStencil8 => (glow::DEPTH24_STENCIL8 as i32, glow::DEPTH_STENCIL, glow::UNSIGNED_INT_24_8),
        Depth16Unorm => (glow::DEPTH_COMPONENT16 as i32, glow::DEPTH_COMPONENT, glow::UNSIGNED_SHORT),
    }
}

/// `(component_count, scalar_type, normalized)` for `glVertexAttribPointer`.
pub fn vertex_format(format: VertexFormat) -> (i32, u32, bool) {
    use VertexFormat::*;
    match format {
        Float32 => (1, glow::FLOAT, false),
        Float32x2 => (2, glow::FLOAT, false),
        Float32x3 => (3, glow::FLOAT, false),
        Float32x4 => (4, glow::FLOAT, false),
        Uint32 => (1, glow::UNSIGNED_INT, false),
        Uint32x2 => (2, glow::UNSIGNED_INT, false),
        Uint32x3 => (3, glow::UNSIGNED_INT, false),
        Uint32x4 => (4, glow::UNSIGNED_INT, false),
    }
}

pub fn filter(min: FilterMode, mag: FilterMode, mip: FilterMode) -> (i32, i32) {
    let min_filter = match (min, mip) {
        (FilterMode::Nearest, FilterMode::Nearest) => glow::NEAREST_MIPMAP_NEAREST,
        (FilterMode::Nearest, FilterMode::Linear) => glow::NEAREST_MIPMAP_LINEAR,
        (FilterMode::Linear, FilterMode::Nearest) => glow::LINEAR_MIPMAP_NEAREST,
        (FilterMode::Linear, FilterMode::Linear) => glow::LINEAR_MIPMAP_LINEAR,
    };
    let mag_filter = match mag {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear => glow::LINEAR,
    };
    (min_filter as i32, mag_filter as i32)
}

pub fn address_mode(mode: AddressMode) -> i32 {
    (match mode {
        AddressMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        AddressMode::Repeat => glow::REPEAT,
        AddressMode::MirrorRepeat => glow::MIRRORED_REPEAT,
    }) as i32
}

pub fn compare_function(func: CompareFunction) -> u32 {
    match func {
        CompareFunction::Never => glow::NEVER,
        CompareFunction::Less => glow::LESS,
        CompareFunction::Equal => glow::EQUAL,
        CompareFunction::LessEqual => glow::LEQUAL,
        CompareFunction::Greater => glow::GREATER,
        CompareFunction::NotEqual => glow::NOTEQUAL,
        CompareFunction::GreaterEqual => glow::GEQUAL,
        CompareFunction::Always => glow::ALWAYS,
    }
}

pub fn stencil_op(op: StencilOperation) -> u32 {
    match op {
        StencilOperation::Keep => glow::KEEP,
        StencilOperation::Zero => glow::ZERO,
        StencilOperation::Replace => glow::REPLACE,
        StencilOperation::IncrementClamp => glow::INCR,
        StencilOperation::DecrementClamp => glow::DECR,
        StencilOperation::Invert => glow::INVERT,
        StencilOperation::IncrementWrap => glow::INCR_WRAP,
        StencilOperation::DecrementWrap => glow::DECR_WRAP,
    }
}

pub fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::Src => glow::SRC_COLOR,
        BlendFactor::OneMinusSrc => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::Dst => glow::DST_COLOR,
        BlendFactor::OneMinusDst => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::Constant => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstant => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::SrcAlphaSaturated => glow::SRC_ALPHA_SATURATE,
    }
}

pub fn blend_op(op: BlendOperation) -> u32 {
    match op {
        BlendOperation::Add => glow::FUNC_ADD,
        BlendOperation::Subtract => glow::FUNC_SUBTRACT,
        BlendOperation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendOperation::Min => glow::MIN,
        BlendOperation::Max => glow::MAX,
    }
}

pub fn primitive_mode(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::PointList => glow::POINTS,
        PrimitiveTopology::LineList => glow::LINES,
        PrimitiveTopology::LineStrip => glow::LINE_STRIP,
        PrimitiveTopology::TriangleList => glow::TRIANGLES,
        PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

pub fn cull_face(mode: CullMode) -> Option<u32> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(glow::FRONT),
        CullMode::Back => Some(glow::BACK),
    }
}

pub fn front_face(face: FrontFace) -> u32 {
    match face {
        FrontFace::Ccw => glow::CCW,
        FrontFace::Cw => glow::CW,
    }
}

pub fn index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
        IndexFormat::Uint32 => glow::UNSIGNED_INT,
    }
}

pub fn index_size(format: IndexFormat) -> i32 {
    match format {
        IndexFormat::Uint16 => 2,
        IndexFormat::Uint32 => 4,
    }
}

/// Whether `load_op` requires a clear before drawing (store ops other than
/// `Discard` need no GL-side action: unlike Vulkan/Metal, a default
/// framebuffer-backed GL context always retains attachment contents).
pub fn needs_clear<C>(load_op: LoadOp<C>) -> Option<C> {
    match load_op {
        LoadOp::Clear(c) => Some(c),
        LoadOp::Load => None,
    }
}

pub fn is_discard(store_op: StoreOp) -> bool {
    matches!(store_op, StoreOp::Discard)
}

pub unsafe fn compile_shader(gl: &glow::Context, stage: u32, source: &str) -> Result<glow::NativeShader, String> {
    let shader = gl.create_shader(stage)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(log);
    }
    Ok(shader)
}
