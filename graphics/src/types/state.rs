//! Packed render-state word and the fixed-function state it decodes to.
//!
//! The material layer hands the backend a single [`StateBits`] word per draw.
//! The low byte holds the blend factors as two 4-bit enumerations (source in
//! bits 0..4, destination in bits 4..8); the remaining bits are independent
//! switches. A word of zero means: blending off, RGB writes on, alpha writes
//! off, depth test on with `LEQUAL`, depth writes off.

use bitflags::bitflags;

bitflags! {
    /// Packed fixed-function render state.
    ///
    /// Blend factor constants are enumerations inside their 4-bit field, not
    /// independent bits; decode them with [`StateBits::blend_factors`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateBits: u32 {
        const SRCBLEND_ZERO = 1;
        const SRCBLEND_ONE = 2;
        const SRCBLEND_DST_COLOR = 3;
        const SRCBLEND_ONE_MINUS_DST_COLOR = 4;
        const SRCBLEND_SRC_ALPHA = 5;
        const SRCBLEND_ONE_MINUS_SRC_ALPHA = 6;
        const SRCBLEND_DST_ALPHA = 7;
        const SRCBLEND_ONE_MINUS_DST_ALPHA = 8;
        const SRCBLEND_MASK = 0xF;

        const DSTBLEND_ZERO = 1 << 4;
        const DSTBLEND_ONE = 2 << 4;
        const DSTBLEND_SRC_COLOR = 3 << 4;
        const DSTBLEND_ONE_MINUS_SRC_COLOR = 4 << 4;
        const DSTBLEND_SRC_ALPHA = 5 << 4;
        const DSTBLEND_ONE_MINUS_SRC_ALPHA = 6 << 4;
        const DSTBLEND_DST_ALPHA = 7 << 4;
        const DSTBLEND_ONE_MINUS_DST_ALPHA = 8 << 4;
        const DSTBLEND_MASK = 0xF0;

        const BLEND_MASK = Self::SRCBLEND_MASK.bits() | Self::DSTBLEND_MASK.bits();

        /// Disable all color channel writes.
        const NO_COLORWRITE = 0x100;
        /// Enable alpha channel writes.
        const ALPHAWRITE = 0x200;
        /// Enable depth buffer writes.
        const DEPTHWRITE = 0x400;
        /// Depth test with `EQUAL`.
        const DEPTHFUNC_EQ = 0x800;
        /// Depth test with `GREATER` (ignored when `DEPTHFUNC_EQ` is set).
        const DEPTHFUNC_GT = 0x1000;
        /// Enable polygon offset fill (and drop the depth range bias).
        const OFFSET_FILL = 0x2000;
        /// Disable the depth test.
        const NO_DEPTH_TEST = 0x4000;
        /// Enable the stencil test.
        const STENCIL_TEST = 0x8000;

        const COLOR_WRITE_MASK = Self::NO_COLORWRITE.bits() | Self::ALPHAWRITE.bits();
        const DEPTHFUNC_MASK = Self::DEPTHFUNC_EQ.bits() | Self::DEPTHFUNC_GT.bits();
    }
}

impl StateBits {
    /// Decode the blend factors, or `None` when blending is disabled.
    ///
    /// Unset or unknown fields fall back to `ONE` for the source and `ZERO`
    /// for the destination.
    pub fn blend_factors(self) -> Option<(BlendFactor, BlendFactor)> {
        if !self.intersects(Self::BLEND_MASK) {
            return None;
        }

        let src = match self.bits() & Self::SRCBLEND_MASK.bits() {
            1 => BlendFactor::Zero,
            3 => BlendFactor::DstColor,
            4 => BlendFactor::OneMinusDstColor,
            5 => BlendFactor::SrcAlpha,
            6 => BlendFactor::OneMinusSrcAlpha,
            7 => BlendFactor::DstAlpha,
            8 => BlendFactor::OneMinusDstAlpha,
            _ => BlendFactor::One,
        };

        let dst = match (self.bits() & Self::DSTBLEND_MASK.bits()) >> 4 {
            2 => BlendFactor::One,
            3 => BlendFactor::SrcColor,
            4 => BlendFactor::OneMinusSrcColor,
            5 => BlendFactor::SrcAlpha,
            6 => BlendFactor::OneMinusSrcAlpha,
            7 => BlendFactor::DstAlpha,
            8 => BlendFactor::OneMinusDstAlpha,
            _ => BlendFactor::Zero,
        };

        Some((src, dst))
    }

    /// Decode the color write mask.
    pub fn color_mask(self) -> ColorMask {
        if self.contains(Self::NO_COLORWRITE) {
            ColorMask::NONE
        } else {
            ColorMask {
                red: true,
                green: true,
                blue: true,
                alpha: self.contains(Self::ALPHAWRITE),
            }
        }
    }

    /// Decode the depth comparison function.
    pub fn depth_func(self) -> DepthFunc {
        if self.contains(Self::DEPTHFUNC_EQ) {
            DepthFunc::Equal
        } else if self.contains(Self::DEPTHFUNC_GT) {
            DepthFunc::Greater
        } else {
            DepthFunc::LessEqual
        }
    }
}

// ============================================================================
// Fixed-function enums
// ============================================================================

/// Blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Per-channel color write mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
}

impl ColorMask {
    /// All channels disabled.
    pub const NONE: Self = Self {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };
    /// All channels enabled.
    pub const ALL: Self = Self {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };
}

/// Depth comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunc {
    #[default]
    LessEqual,
    Equal,
    Greater,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Culling disabled.
    #[default]
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// Front face winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise winding is front facing.
    #[default]
    Ccw,
    /// Clockwise winding is front facing.
    Cw,
}

/// Polygon rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// Server-side capability toggled with enable/disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlCapability {
    Blend,
    CullFace,
    DepthTest,
    StencilTest,
    ScissorTest,
    PolygonOffsetFill,
}

/// Stencil comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFunc {
    Always,
    Equal,
    NotEqual,
}

/// Stencil buffer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Replace,
    Incr,
    Decr,
}
