//! Blend and stencil fixed-function state, shared by every backend and by
//! the software rasterizer (`wgx-backend-soft`).

use crate::image::CompareFunction;

/// A multiplicative factor applied to a color before blending.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlendFactor {
    Zero,
    One,
    Src,
    OneMinusSrc,
    Dst,
    OneMinusDst,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    Constant,
    OneMinusConstant,
    SrcAlphaSaturated,
}

/// How source and destination factors are combined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlendOperation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// The blend equation for one channel group (color or alpha).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// `src + dst * 0`, i.e. no blending: output equals the fragment.
    pub const REPLACE: BlendComponent = BlendComponent {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// The canonical "source over" compositing equation.
    pub const SOURCE_OVER_COLOR: BlendComponent = BlendComponent {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };
}

/// Color and alpha blend equations for one render pipeline color target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard alpha-compositing "source over destination".
    pub const ALPHA_BLENDING: BlendState = BlendState {
        color: BlendComponent::SOURCE_OVER_COLOR,
        alpha: BlendComponent::REPLACE,
    };
}

/// What a stencil test+op pass does to the stored stencil value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    IncrementClamp,
    DecrementClamp,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

/// Stencil test and op triple for one triangle winding (front or back).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StencilFaceState {
    pub compare: CompareFunction,
    pub fail_op: StencilOperation,
    pub depth_fail_op: StencilOperation,
    pub pass_op: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        }
    }
}

/// Full stencil test configuration: one face state for each winding, plus
/// the masks applied to both the stored value and the reference value.
#[derive(Clone, Copy, Debug)]
pub struct StencilState {
    pub front: StencilFaceState,
    pub back: StencilFaceState,
    pub read_mask: u32,
    pub write_mask: u32,
}

impl Default for StencilState {
    fn default() -> Self {
        StencilState {
            front: StencilFaceState::default(),
            back: StencilFaceState::default(),
            read_mask: !0,
            write_mask: !0,
        }
    }
}

impl StencilState {
    /// Whether either face performs a test or a state-mutating op; a
    /// pipeline can skip the stencil buffer entirely when this is false.
    pub fn is_enabled(&self) -> bool {
        (self.front.compare != CompareFunction::Always
            || self.front.fail_op != StencilOperation::Keep
            || self.front.depth_fail_op != StencilOperation::Keep
            || self.front.pass_op != StencilOperation::Keep)
            || (self.back.compare != CompareFunction::Always
                || self.back.fail_op != StencilOperation::Keep
                || self.back.depth_fail_op != StencilOperation::Keep
                || self.back.pass_op != StencilOperation::Keep)
    }
}
