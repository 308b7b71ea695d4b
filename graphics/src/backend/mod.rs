//! Graphics API abstraction layer.
//!
//! The streaming backend never talks to a driver directly. Every state change,
//! buffer update and draw goes through the [`GlBackend`] trait, which mirrors
//! the small slice of an OpenGL-style immediate API the backend needs.
//!
//! # Available Backends
//!
//! - `dummy` (default): [`DummyBackend`] records every call and keeps buffer
//!   contents in memory, for tests and tooling
//!
//! Window and context creation are owned by the application; it implements
//! [`GlBackend`] over its own context and hands it to
//! [`RenderBackend::new`](crate::RenderBackend::new).

#[cfg(feature = "dummy")]
pub mod dummy;

#[cfg(feature = "dummy")]
pub use dummy::{DummyBackend, GlCall};

use crate::error::GraphicsError;
use crate::mesh::{AttribPointer, AttribSlot, InstancePoint};
use crate::types::{
    BlendFactor, BlitFilter, BufferDescriptor, BufferId, BufferTarget, ClearColor, ClearFlags, ColorMask,
    CullFace, DepthFunc, Extent2d, FramebufferId, FrontFace, GlCapability, PolygonMode,
    Primitive, Rect, StencilFunc, StencilOp, TextureId,
};

/// Optional features of the graphics context, queried once at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    /// Per-instance vertex attributes with a divisor.
    pub instanced_arrays: bool,
    /// Instanced draws (instance data supplied through uniforms).
    pub draw_instanced: bool,
    /// Range-restricted indexed draws.
    pub draw_range_elements: bool,
    /// Half-float vertex attributes.
    pub half_float_vertex: bool,
    /// Number of stencil bits of the default framebuffer (0 when absent).
    pub stencil_bits: u8,
}

impl Capabilities {
    /// Every optional feature available, with an 8-bit stencil buffer.
    pub fn all() -> Self {
        Self {
            instanced_arrays: true,
            draw_instanced: true,
            draw_range_elements: true,
            half_float_vertex: true,
            stencil_bits: 8,
        }
    }

    /// No optional features.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn with_instanced_arrays(mut self, enabled: bool) -> Self {
        self.instanced_arrays = enabled;
        self
    }

    pub fn with_draw_instanced(mut self, enabled: bool) -> Self {
        self.draw_instanced = enabled;
        self
    }

    pub fn with_draw_range_elements(mut self, enabled: bool) -> Self {
        self.draw_range_elements = enabled;
        self
    }

    pub fn with_half_float_vertex(mut self, enabled: bool) -> Self {
        self.half_float_vertex = enabled;
        self
    }

    pub fn with_stencil_bits(mut self, bits: u8) -> Self {
        self.stencil_bits = bits;
        self
    }

    /// Returns true if the framebuffer has a stencil buffer.
    pub fn has_stencil(&self) -> bool {
        self.stencil_bits > 0
    }
}

/// Graphics API trait used by the streaming backend.
///
/// Calls map one-to-one onto API entry points; implementations do no state
/// filtering of their own, the backend's state cache takes care of that.
/// Element offsets and counts are in elements of `u16`.
pub trait GlBackend {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Optional features of the context.
    fn capabilities(&self) -> Capabilities;

    // ------------------------------------------------------------------------
    // Fixed-function state
    // ------------------------------------------------------------------------

    fn set_capability(&mut self, capability: GlCapability, enabled: bool);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn color_mask(&mut self, mask: ColorMask);
    fn depth_func(&mut self, func: DepthFunc);
    fn depth_mask(&mut self, write: bool);
    fn depth_range(&mut self, near: f32, far: f32);
    fn polygon_offset(&mut self, factor: f32, units: f32);
    fn polygon_mode(&mut self, mode: PolygonMode);
    /// Select the culled face. Never called with [`CullFace::None`]; culling is
    /// switched off through [`GlCapability::CullFace`].
    fn cull_face(&mut self, face: CullFace);
    fn front_face(&mut self, face: FrontFace);
    fn stencil_mask(&mut self, mask: u32);
    fn stencil_func(&mut self, func: StencilFunc, reference: i32, mask: u32);
    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);
    /// Set the scissor box (bottom-left origin).
    fn scissor(&mut self, rect: Rect);
    /// Set the viewport (bottom-left origin).
    fn viewport(&mut self, rect: Rect);

    // ------------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------------

    fn clear_color(&mut self, color: ClearColor);
    fn clear_depth(&mut self, depth: f32);
    fn clear_stencil(&mut self, value: i32);
    fn clear(&mut self, flags: ClearFlags);

    // ------------------------------------------------------------------------
    // Buffers and textures
    // ------------------------------------------------------------------------

    /// Create a buffer object of `descriptor.size` bytes.
    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, GraphicsError>;
    fn delete_buffer(&mut self, buffer: BufferId);
    /// Write `data` into `buffer` at byte `offset`.
    fn buffer_sub_data(&mut self, buffer: BufferId, offset: usize, data: &[u8]);
    /// Orphan the buffer storage; previous contents become undefined.
    fn invalidate_buffer(&mut self, buffer: BufferId);
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    // ------------------------------------------------------------------------
    // Vertex attributes
    // ------------------------------------------------------------------------

    fn set_vertex_attrib_enabled(&mut self, slot: AttribSlot, enabled: bool);
    fn vertex_attrib_pointer(&mut self, slot: AttribSlot, pointer: &AttribPointer);
    fn vertex_attrib_divisor(&mut self, slot: AttribSlot, divisor: u32);

    /// Push per-instance transforms to the bound program's uniforms.
    fn set_instance_uniforms(&mut self, instances: &[InstancePoint]);

    // ------------------------------------------------------------------------
    // Draws
    // ------------------------------------------------------------------------

    fn draw_elements(&mut self, primitive: Primitive, count: u32, first_elem: u32);
    /// Indexed draw whose elements all fall in `start..=end`.
    fn draw_range_elements(
        &mut self,
        primitive: Primitive,
        start: u32,
        end: u32,
        count: u32,
        first_elem: u32,
    );
    fn draw_elements_instanced(
        &mut self,
        primitive: Primitive,
        count: u32,
        first_elem: u32,
        instances: u32,
    );

    // ------------------------------------------------------------------------
    // Framebuffers and synchronization
    // ------------------------------------------------------------------------

    fn bind_framebuffer(&mut self, framebuffer: FramebufferId);
    fn framebuffer_size(&self, framebuffer: FramebufferId) -> Extent2d;
    /// Copy the `mask` buffers of `src_rect` in `src` to `dst_rect` in `dst`.
    /// Leaves the bound framebuffer unchanged.
    fn blit_framebuffer(
        &mut self,
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect,
        dst_rect: Rect,
        mask: ClearFlags,
        filter: BlitFilter,
    );
    /// Block until all submitted work has completed.
    fn finish(&mut self);
    /// Submit queued work without waiting.
    fn flush(&mut self);
}
