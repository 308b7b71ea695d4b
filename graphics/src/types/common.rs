//! Common types shared across the graphics system.

use bitflags::bitflags;

// ============================================================================
// Rectangles
// ============================================================================

/// Integer rectangle used for scissor and viewport regions.
///
/// Rectangles handed to and returned from the backend use a **top-left**
/// origin. The state cache flips them to the bottom-left origin of the
/// graphics API using the bound framebuffer height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Width of the rectangle.
    pub width: i32,
    /// Height of the rectangle.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from dimensions with origin at (0, 0).
    pub fn from_dimensions(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Convert between top-left and bottom-left origin for a surface of the given height.
    ///
    /// The conversion is its own inverse.
    pub fn flip_y(&self, surface_height: i32) -> Self {
        Self::new(
            self.x,
            surface_height - self.height - self.y,
            self.width,
            self.height,
        )
    }
}

// ============================================================================
// Extent2d
// ============================================================================

/// 2D extent of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2d {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Extent2d {
    /// Create a new extent.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Clearing
// ============================================================================

bitflags! {
    /// Buffers affected by a clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Clear the color buffer.
        const COLOR = 1 << 0;
        /// Clear the depth buffer.
        const DEPTH = 1 << 1;
        /// Clear the stencil buffer.
        const STENCIL = 1 << 2;
    }
}

/// RGBA clear color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    /// Create a clear color.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
}

/// Sampling used when a framebuffer blit scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlitFilter {
    #[default]
    Nearest,
    Linear,
}

// ============================================================================
// Primitive
// ============================================================================

/// Primitive type used for draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    /// Every three elements form a triangle.
    #[default]
    Triangles,
    /// Every two elements form a line segment.
    Lines,
    /// Every element is a point.
    Points,
}

impl Primitive {
    /// Returns true if draws of this primitive count towards the triangle statistics.
    pub fn is_triangles(self) -> bool {
        matches!(self, Self::Triangles)
    }
}
