//! Render state cache.
//!
//! Mirrors the fixed-function state of the graphics context so redundant API
//! calls can be skipped. Every setter compares against the cached value first.

use crate::backend::{Capabilities, GlBackend};
use crate::types::{
    BufferId, BufferTarget, ClearColor, ClearFlags, CullFace, DepthFunc, Extent2d, FramebufferId,
    FrontFace, GlCapability, PolygonMode, Rect, StateBits, StencilFunc, StencilOp, TextureId,
};

/// Bias added to the near depth value so regular geometry loses depth ties
/// against fixed-depth and polygon-offset draws.
pub const DEPTH_RANGE_BIAS: f32 = 4.0 / 65535.0;

/// Stencil value written by clears.
pub const STENCIL_CLEAR_VALUE: i32 = 128;

/// Cached render state.
#[derive(Debug, Clone)]
pub struct StateCache {
    has_stencil: bool,
    state: StateBits,
    shader_and: StateBits,
    shader_or: StateBits,
    depth_min: f32,
    depth_max: f32,
    depth_applied: Option<(f32, f32)>,
    depth_offset: bool,
    cull: CullFace,
    front_face: FrontFace,
    polygon_mode: PolygonMode,
    scissor: Rect,
    scissor_issued: Option<Rect>,
    scissor_enabled: Option<bool>,
    viewport: Rect,
    viewport_issued: Option<Rect>,
    framebuffer: FramebufferId,
    framebuffer_size: Extent2d,
    array_buffer: Option<BufferId>,
    element_buffer: Option<BufferId>,
    textures: Vec<Option<TextureId>>,
}

impl StateCache {
    /// Create a cache for a context with the given capabilities.
    pub fn new(capabilities: &Capabilities) -> Self {
        Self {
            has_stencil: capabilities.has_stencil(),
            state: StateBits::empty(),
            shader_and: StateBits::all(),
            shader_or: StateBits::empty(),
            depth_min: 0.0,
            depth_max: 1.0,
            depth_applied: None,
            depth_offset: false,
            cull: CullFace::None,
            front_face: FrontFace::Ccw,
            polygon_mode: PolygonMode::Fill,
            scissor: Rect::default(),
            scissor_issued: None,
            scissor_enabled: None,
            viewport: Rect::default(),
            viewport_issued: None,
            framebuffer: FramebufferId::DEFAULT,
            framebuffer_size: Extent2d::default(),
            array_buffer: None,
            element_buffer: None,
            textures: Vec::new(),
        }
    }

    /// Put the context into the state the cache assumes: state word zero,
    /// culling off, counter-clockwise front faces, polygon fill.
    pub fn apply_defaults<B: GlBackend>(&mut self, gl: &mut B) {
        if self.has_stencil {
            gl.stencil_mask(!0);
            gl.stencil_func(StencilFunc::Equal, 128, 0xFF);
            gl.stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Incr);
        }

        gl.set_capability(GlCapability::CullFace, false);
        gl.front_face(FrontFace::Ccw);
        gl.set_capability(GlCapability::Blend, false);
        gl.depth_func(DepthFunc::LessEqual);
        gl.depth_mask(false);
        gl.set_capability(GlCapability::PolygonOffsetFill, false);
        // Units are handled through the depth range bias.
        gl.polygon_offset(-1.0, 0.0);
        gl.color_mask(StateBits::empty().color_mask());
        gl.set_capability(GlCapability::DepthTest, true);
        gl.polygon_mode(PolygonMode::Fill);

        self.state = StateBits::empty();
        self.cull = CullFace::None;
        self.front_face = FrontFace::Ccw;
        self.polygon_mode = PolygonMode::Fill;
        self.depth_offset = false;
        self.depth_applied = None;
    }

    // ========================================================================
    // State word
    // ========================================================================

    /// Current state word.
    pub fn state(&self) -> StateBits {
        self.state
    }

    /// Apply a state word, touching only the facets whose bits changed.
    pub fn set_state<B: GlBackend>(&mut self, gl: &mut B, state: StateBits) {
        let diff = self.state ^ state;
        if diff.is_empty() {
            return;
        }

        if diff.intersects(StateBits::BLEND_MASK) {
            match state.blend_factors() {
                Some((src, dst)) => {
                    if !self.state.intersects(StateBits::BLEND_MASK) {
                        gl.set_capability(GlCapability::Blend, true);
                    }
                    gl.blend_func(src, dst);
                }
                None => gl.set_capability(GlCapability::Blend, false),
            }
        }

        if diff.intersects(StateBits::COLOR_WRITE_MASK) {
            gl.color_mask(state.color_mask());
        }

        if diff.intersects(StateBits::DEPTHFUNC_MASK) {
            gl.depth_func(state.depth_func());
        }

        if diff.contains(StateBits::DEPTHWRITE) {
            gl.depth_mask(state.contains(StateBits::DEPTHWRITE));
        }

        if diff.contains(StateBits::NO_DEPTH_TEST) {
            gl.set_capability(
                GlCapability::DepthTest,
                !state.contains(StateBits::NO_DEPTH_TEST),
            );
        }

        if diff.contains(StateBits::OFFSET_FILL) {
            let enable = state.contains(StateBits::OFFSET_FILL);
            gl.set_capability(GlCapability::PolygonOffsetFill, enable);
            self.depth_offset(gl, enable);
        }

        if diff.contains(StateBits::STENCIL_TEST) && self.has_stencil {
            gl.set_capability(
                GlCapability::StencilTest,
                state.contains(StateBits::STENCIL_TEST),
            );
        }

        self.state = state;
    }

    /// Set the masks applied to state words coming from shaders.
    pub fn set_shader_state_mask(&mut self, and: StateBits, or: StateBits) {
        self.shader_and = and;
        self.shader_or = or;
    }

    /// Current shader state masks as `(and, or)`.
    pub fn shader_state_mask(&self) -> (StateBits, StateBits) {
        (self.shader_and, self.shader_or)
    }

    /// Apply a shader state word through the shader state masks.
    pub fn set_shader_state<B: GlBackend>(&mut self, gl: &mut B, state: StateBits) {
        let masked = (state & self.shader_and) | self.shader_or;
        self.set_state(gl, masked);
    }

    // ========================================================================
    // Depth
    // ========================================================================

    /// Set the depth range, clamped to `[0, 1]`.
    ///
    /// Unless polygon offset is engaged, a non-degenerate range has its near
    /// value biased by [`DEPTH_RANGE_BIAS`]. `min == max` writes a fixed depth
    /// and is never biased.
    pub fn set_depth_range<B: GlBackend>(&mut self, gl: &mut B, min: f32, max: f32) {
        self.depth_min = min.clamp(0.0, 1.0);
        self.depth_max = max.clamp(0.0, 1.0);
        self.apply_depth_range(gl);
    }

    /// Depth range as requested (without bias).
    pub fn depth_range(&self) -> (f32, f32) {
        (self.depth_min, self.depth_max)
    }

    /// Switch the depth range bias off (`true`) or on (`false`).
    pub fn depth_offset<B: GlBackend>(&mut self, gl: &mut B, enable: bool) {
        self.depth_offset = enable;
        if self.depth_min != self.depth_max {
            self.apply_depth_range(gl);
        }
    }

    fn apply_depth_range<B: GlBackend>(&mut self, gl: &mut B) {
        let mut near = self.depth_min;
        let far = self.depth_max;
        if near != far && !self.depth_offset {
            near += DEPTH_RANGE_BIAS;
        }
        if self.depth_applied == Some((near, far)) {
            return;
        }
        gl.depth_range(near, far);
        self.depth_applied = Some((near, far));
    }

    // ========================================================================
    // Rasterizer
    // ========================================================================

    /// Set the culled face, or disable culling with [`CullFace::None`].
    pub fn set_cull<B: GlBackend>(&mut self, gl: &mut B, cull: CullFace) {
        if self.cull == cull {
            return;
        }

        if cull == CullFace::None {
            gl.set_capability(GlCapability::CullFace, false);
        } else {
            if self.cull == CullFace::None {
                gl.set_capability(GlCapability::CullFace, true);
            }
            gl.cull_face(cull);
        }
        self.cull = cull;
    }

    pub fn cull(&self) -> CullFace {
        self.cull
    }

    pub fn set_front_face<B: GlBackend>(&mut self, gl: &mut B, face: FrontFace) {
        if self.front_face == face {
            return;
        }
        gl.front_face(face);
        self.front_face = face;
    }

    pub fn front_face(&self) -> FrontFace {
        self.front_face
    }

    pub fn set_polygon_mode<B: GlBackend>(&mut self, gl: &mut B, mode: PolygonMode) {
        if self.polygon_mode == mode {
            return;
        }
        gl.polygon_mode(mode);
        self.polygon_mode = mode;
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    // ========================================================================
    // Scissor and viewport
    // ========================================================================

    /// Set the scissor box (top-left origin).
    pub fn set_scissor<B: GlBackend>(&mut self, gl: &mut B, rect: Rect) {
        let issued = rect.flip_y(self.framebuffer_size.height);
        self.scissor = rect;
        if self.scissor_issued == Some(issued) {
            return;
        }
        gl.scissor(issued);
        self.scissor_issued = Some(issued);
    }

    /// Scissor box (top-left origin).
    pub fn scissor(&self) -> Rect {
        self.scissor
    }

    pub fn enable_scissor<B: GlBackend>(&mut self, gl: &mut B, enable: bool) {
        if self.scissor_enabled == Some(enable) {
            return;
        }
        gl.set_capability(GlCapability::ScissorTest, enable);
        self.scissor_enabled = Some(enable);
    }

    /// Set the viewport (top-left origin).
    pub fn set_viewport<B: GlBackend>(&mut self, gl: &mut B, rect: Rect) {
        let issued = rect.flip_y(self.framebuffer_size.height);
        self.viewport = rect;
        if self.viewport_issued == Some(issued) {
            return;
        }
        gl.viewport(issued);
        self.viewport_issued = Some(issued);
    }

    /// Viewport (top-left origin).
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    // ========================================================================
    // Framebuffers and clearing
    // ========================================================================

    /// Bind a framebuffer and record its size for origin flipping.
    pub fn bind_framebuffer<B: GlBackend>(&mut self, gl: &mut B, framebuffer: FramebufferId) {
        gl.bind_framebuffer(framebuffer);
        self.framebuffer = framebuffer;
        self.framebuffer_size = gl.framebuffer_size(framebuffer);
    }

    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }

    pub fn framebuffer_size(&self) -> Extent2d {
        self.framebuffer_size
    }

    /// Clear the selected buffers of the bound framebuffer.
    ///
    /// Write masks that would block the clear are lifted through the state
    /// word first, and the depth range is reset to `(0, 1)` afterwards.
    pub fn clear<B: GlBackend>(&mut self, gl: &mut B, flags: ClearFlags, color: ClearColor) {
        let mut state = self.state;

        if flags.contains(ClearFlags::DEPTH) {
            state |= StateBits::DEPTHWRITE;
        }

        if flags.contains(ClearFlags::STENCIL) {
            gl.clear_stencil(STENCIL_CLEAR_VALUE);
        }

        if flags.contains(ClearFlags::COLOR) {
            state = state.difference(StateBits::NO_COLORWRITE) | StateBits::ALPHAWRITE;
            gl.clear_color(color);
        }

        self.set_state(gl, state);
        gl.clear(flags);
        self.set_depth_range(gl, 0.0, 1.0);
    }

    // ========================================================================
    // Buffer and texture bindings
    // ========================================================================

    /// Bind an array buffer. Returns true if the binding changed.
    pub fn bind_array_buffer<B: GlBackend>(&mut self, gl: &mut B, buffer: Option<BufferId>) -> bool {
        if self.array_buffer == buffer {
            return false;
        }
        gl.bind_buffer(BufferTarget::Array, buffer);
        self.array_buffer = buffer;
        true
    }

    /// Bind an element array buffer. Returns true if the binding changed.
    pub fn bind_element_buffer<B: GlBackend>(
        &mut self,
        gl: &mut B,
        buffer: Option<BufferId>,
    ) -> bool {
        if self.element_buffer == buffer {
            return false;
        }
        gl.bind_buffer(BufferTarget::ElementArray, buffer);
        self.element_buffer = buffer;
        true
    }

    pub fn array_buffer(&self) -> Option<BufferId> {
        self.array_buffer
    }

    pub fn element_buffer(&self) -> Option<BufferId> {
        self.element_buffer
    }

    /// Forget buffer bindings without touching the context.
    ///
    /// Used when the context has dropped its buffer objects.
    pub fn forget_buffer_bindings(&mut self) {
        self.array_buffer = None;
        self.element_buffer = None;
    }

    /// Bind a texture to `unit`. Returns true if the binding changed.
    pub fn bind_texture<B: GlBackend>(
        &mut self,
        gl: &mut B,
        unit: u32,
        texture: Option<TextureId>,
    ) -> bool {
        let index = unit as usize;
        if self.textures.len() <= index {
            self.textures.resize(index + 1, None);
        }
        if self.textures[index] == texture {
            return false;
        }
        gl.bind_texture(unit, texture);
        self.textures[index] = texture;
        true
    }

    /// Texture bound to `unit`.
    pub fn texture(&self, unit: u32) -> Option<TextureId> {
        self.textures.get(unit as usize).copied().flatten()
    }
}
