//! Conversions between `wgx_hal`'s portable types and `windows`' D3D12/DXGI
//! bindings.

use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use wgx_hal::buffer::BufferUses;
use wgx_hal::command::{ClearColor, IndexFormat};
use wgx_hal::format::TextureFormat;
use wgx_hal::image::{AddressMode, CompareFunction, FilterMode, TextureUses};
use wgx_hal::pso::{BlendFactor, BlendOperation, CullMode, FrontFace, PrimitiveTopology, StencilOperation, VertexFormat};

pub fn texture_format(format: TextureFormat) -> DXGI_FORMAT {
    use TextureFormat::*;
    match format {
        R8Unorm => DXGI_FORMAT_R8_UNORM,
        R8Snorm => DXGI_FORMAT_R8_SNORM,
        R8Uint => DXGI_FORMAT_R8_UINT,
        R8Sint => DXGI_FORMAT_R8_SINT,
        Rg8Unorm => DXGI_FORMAT_R8G8_UNORM,
        Rg8Snorm => DXGI_FORMAT_R8G8_SNORM,
        Rg8Uint => DXGI_FORMAT_R8G8_UINT,
        Rg8Sint => DXGI_FORMAT_R8G8_SINT,
        Rgba8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        Rgba8UnormSrgb => DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
        Rgba8Snorm => DXGI_FORMAT_R8G8B8A8_SNORM,
        Rgba8Uint => DXGI_FORMAT_R8G8B8A8_UINT,
        Rgba8Sint => DXGI_FORMAT_R8G8B8A8_SINT,
        Bgra8Unorm => DXGI_FORMAT_B8G8R8A8_UNORM,
        Bgra8UnormSrgb => DXGI_FORMAT_B8G8R8A8_UNORM_SRGB,
        R16Float => DXGI_FORMAT_R16_FLOAT,
        Rg16Float => DXGI_FORMAT_R16G16_FLOAT,
        Rgba16Float => DXGI_FORMAT_R16G16B16A16_FLOAT,
        R32Float => DXGI_FORMAT_R32_FLOAT,
        Rg32Float => DXGI_FORMAT_R32G32_FLOAT,
        Rgba32Float => DXGI_FORMAT_R32G32B32A32_FLOAT,
        R32Uint => DXGI_FORMAT_R32_UINT,
        R32Sint => DXGI_FORMAT_R32_SINT,
        Rgba32Uint => DXGI_FORMAT_R32G32B32A32_UINT,
        Rgba32Sint => DXGI_FORMAT_R32G32B32A32_SINT,
        Depth32Float => DXGI_FORMAT_D32_FLOAT,
        Depth24PlusStencil8 => DXGI_FORMAT_D24_UNORM_S8_UINT,
        Depth16Unorm => DXGI_FORMAT_D16_UNORM,
    }
}

pub fn vertex_format(format: VertexFormat) -> DXGI_FORMAT {
    use VertexFormat::*;
    match format {
        Float32 => DXGI_FORMAT_R32_FLOAT,
        Float32x2 => DXGI_FORMAT_R32G32_FLOAT,
        Float32x3 => DXGI_FORMAT_R32G32B32_FLOAT,
        Float32x4 => DXGI_FORMAT_R32G32B32A32_FLOAT,
        Uint32 => DXGI_FORMAT_R32_UINT,
        Uint32x2 => DXGI_FORMAT_R32G32_UINT,
        Uint32x3 => DXGI_FORMAT_R32G32B32_UINT,
        Uint32x4 => DXGI_FORMAT_R32G32B32A32_UINT,
    }
}

pub fn resource_states_for_buffer(uses: BufferUses) -> D3D12_RESOURCE_STATES {
    let mut state = D3D12_RESOURCE_STATES(0);
    if uses.contains(BufferUses::COPY_SRC) {
        state |= D3D12_RESOURCE_STATE_COPY_SOURCE;
    }
    if uses.contains(BufferUses::COPY_DST) {
        state |= D3D12_RESOURCE_STATE_COPY_DEST;
    }
    if uses.contains(BufferUses::INDEX) {
        state |= D3D12_RESOURCE_STATE_INDEX_BUFFER;
    }
    if uses.contains(BufferUses::VERTEX) || uses.contains(BufferUses::UNIFORM) {
        state |= D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER;
    }
    if uses.contains(BufferUses::STORAGE) {
        state |= D3D12_RESOURCE_STATE_UNORDERED_ACCESS;
    }
    if uses.contains(BufferUses::INDIRECT) {
        state |= D3D12_RESOURCE_STATE_INDIRECT_ARGUMENT;
    }
    state
}

pub fn resource_states_for_texture(uses: TextureUses) -> D3D12_RESOURCE_STATES {
    let mut state = D3D12_RESOURCE_STATES(0);
    if uses.contains(TextureUses::COPY_SRC) {
        state |= D3D12_RESOURCE_STATE_COPY_SOURCE;
    }
    if uses.contains(TextureUses::COPY_DST) {
        state |= D3D12_RESOURCE_STATE_COPY_DEST;
    }
    if uses.contains(TextureUses::SAMPLED) {
        state |= D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE | D3D12_RESOURCE_STATE_NON_PIXEL_SHADER_RESOURCE;
    }
    if uses.contains(TextureUses::STORAGE) {
        state |= D3D12_RESOURCE_STATE_UNORDERED_ACCESS;
    }
    if uses.contains(TextureUses::COLOR_TARGET) {
        state |= D3D12_RESOURCE_STATE_RENDER_TARGET;
    }
    if uses.contains(TextureUses::DEPTH_STENCIL_TARGET) {
        state |= D3D12_RESOURCE_STATE_DEPTH_WRITE;
    }
    if uses.contains(TextureUses::PRESENT) {
        state |= D3D12_RESOURCE_STATE_PRESENT;
    }
    state
}

pub fn filter(min: FilterMode, mag: FilterMode, mip: FilterMode) -> D3D12_FILTER {
    match (min, mag, mip) {
        (FilterMode::Nearest, FilterMode::Nearest, FilterMode::Nearest) => D3D12_FILTER_MIN_MAG_MIP_POINT,
        (FilterMode::Linear, FilterMode::Linear, FilterMode::Linear) => D3D12_FILTER_MIN_MAG_MIP_LINEAR,
        (FilterMode::Linear, FilterMode::Linear, FilterMode::Nearest) => D3D12_FILTER_MIN_MAG_LINEAR_MIP_POINT,
        _ => D3D12_FILTER_MIN_MAG_MIP_LINEAR,
    }
}

pub fn address_mode(mode: AddressMode) -> D3D12_TEXTURE_ADDRESS_MODE {
    match mode {
        AddressMode::ClampToEdge => D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        AddressMode::Repeat => D3D12_TEXTURE_ADDRESS_MODE_WRAP,
        AddressMode::MirrorRepeat => D3D12_TEXTURE_ADDRESS_MODE_MIRROR,
    }
}

pub fn comparison_func(func: CompareFunction) -> D3D12_COMPARISON_FUNC {
    match func {
        CompareFunction::Never => D3D12_COMPARISON_FUNC_NEVER,
        CompareFunction::Less => D3D12_COMPARISON_FUNC_LESS,
        CompareFunction::Equal => D3D12_COMPARISON_FUNC_EQUAL,
        CompareFunction::LessEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
        CompareFunction::Greater => D3D12_COMPARISON_FUNC_GREATER,
        CompareFunction::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
        CompareFunction::GreaterEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
        CompareFunction::Always => D3D12_COMPARISON_FUNC_ALWAYS,
    }
}

pub fn stencil_op(op: StencilOperation) -> D3D12_STENCIL_OP {
    match op {
        StencilOperation::Keep => D3D12_STENCIL_OP_KEEP,
        StencilOperation::Zero => D3D12_STENCIL_OP_ZERO,
        StencilOperation::Replace => D3D12_STENCIL_OP_REPLACE,
        StencilOperation::IncrementClamp => D3D12_STENCIL_OP_INCR_SAT,
        StencilOperation::DecrementClamp => D3D12_STENCIL_OP_DECR_SAT,
        StencilOperation::Invert => D3D12_STENCIL_OP_INVERT,
        StencilOperation::IncrementWrap => D3D12_STENCIL_OP_INCR,
        StencilOperation::DecrementWrap => D3D12_STENCIL_OP_DECR,
    }
}

pub fn blend_factor(factor: BlendFactor) -> D3D12_BLEND {
    match factor {
        BlendFactor::Zero => D3D12_BLEND_ZERO,
        BlendFactor::One => D3D12_BLEND_ONE,
        BlendFactor::Src => D3D12_BLEND_SRC_COLOR,
        BlendFactor::OneMinusSrc => D3D12_BLEND_INV_SRC_COLOR,
        BlendFactor::Dst => D3D12_BLEND_DEST_COLOR,
        BlendFactor::OneMinusDst => D3D12_BLEND_INV_DEST_COLOR,
        BlendFactor::SrcAlpha => D3D12_BLEND_SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => D3D12_BLEND_INV_SRC_ALPHA,
        BlendFactor::DstAlpha => D3D12_BLEND_DEST_ALPHA,
        BlendFactor::OneMinusDstAlpha => D3D12_BLEND_INV_DEST_ALPHA,
        BlendFactor::Constant => D3D12_BLEND_BLEND_FACTOR,
        BlendFactor::OneMinusConstant => D3D12_BLEND_INV_BLEND_FACTOR,
        BlendFactor::SrcAlphaSaturated => D3D12_BLEND_SRC_ALPHA_SAT,
    }
}

pub fn blend_op(op: BlendOperation) -> D3D12_BLEND_OP {
    match op {
        BlendOperation::Add => D3D12_BLEND_OP_ADD,
        BlendOperation::Subtract => D3D12_BLEND_OP_SUBTRACT,
        BlendOperation::ReverseSubtract => D3D12_BLEND_OP_REV_SUBTRACT,
        BlendOperation::Min => D3D12_BLEND_OP_MIN,
        BlendOperation::Max => D3D12_BLEND_OP_MAX,
    }
}

pub fn primitive_topology(topology: PrimitiveTopology) -> D3D_PRIMITIVE_TOPOLOGY {
    match topology {
        PrimitiveTopology::PointList => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
        PrimitiveTopology::LineList => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
        PrimitiveTopology::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
        PrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        PrimitiveTopology::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
    }
}

pub fn primitive_topology_type(topology: PrimitiveTopology) -> D3D12_PRIMITIVE_TOPOLOGY_TYPE {
    match topology {
        PrimitiveTopology::PointList => D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT,
        PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE,
        PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
    }
}

pub fn cull_mode(mode: CullMode) -> D3D12_CULL_MODE {
    match mode {
        CullMode::None => D3D12_CULL_MODE_NONE,
        CullMode::Front => D3D12_CULL_MODE_FRONT,
        CullMode::Back => D3D12_CULL_MODE_BACK,
    }
}

pub fn front_counter_clockwise(face: FrontFace) -> bool {
    matches!(face, FrontFace::Ccw)
}

pub fn index_buffer_format(format: IndexFormat) -> DXGI_FORMAT {
    match format {
        IndexFormat::Uint16 => DXGI_FORMAT_R16_UINT,
        IndexFormat::Uint32 => DXGI_FORMAT_R32_UINT,
    }
}

pub fn clear_color_array(c: ClearColor) -> [f32; 4] {
    [c.r as f32, c.g as f32, c.b as f32, c.a as f32]
}
