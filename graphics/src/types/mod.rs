//! Common types and descriptors for the streaming backend.
//!
//! This module contains buffer handles and descriptors, rectangles, clear
//! flags, and the packed render-state word with the fixed-function enums it
//! decodes to.

mod buffer;
mod common;
mod state;

pub use buffer::{
    BufferDescriptor, BufferId, BufferTarget, BufferUsage, FramebufferId, TextureId,
};
pub use common::{BlitFilter, ClearColor, ClearFlags, Extent2d, Primitive, Rect};
pub use state::{
    BlendFactor, ColorMask, CullFace, DepthFunc, FrontFace, GlCapability, PolygonMode,
    StateBits, StencilFunc, StencilOp,
};
