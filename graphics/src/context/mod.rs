//! The render backend context.
//!
//! [`RenderBackend`] owns the graphics API handle together with every piece of
//! state the streaming engine needs: state cache, attribute tracker, stream
//! buffers, batch staging, matrices and frame statistics.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut backend = RenderBackend::new(DummyBackend::new(), BackendConfig::default())?;
//!
//! // Each frame:
//! backend.begin_frame();
//! backend.set_vertex_attribs(VertexAttribs::COMPACT);
//! backend.bind_buffer(BufferBinding::Stream(StreamId::Quad), Primitive::Triangles);
//! backend.begin_batch();
//! backend.batch_mesh(&sprite);
//! backend.end_batch();
//! backend.end_frame();
//!
//! // Map change:
//! backend.begin_registration()?;
//! backend.end_registration();
//! ```

mod batch;
mod submit;

use quadstream_core::math::{mat4_from_cols_array, transform_point4, Mat3, Mat4, Vec3};
use quadstream_core::profiling::{frame_mark, profile_plot};

use crate::backend::{Capabilities, GlBackend};
use crate::config::BackendConfig;
use crate::draw::{DrawElements, FrameStats, InstancingStrategy};
use crate::error::GraphicsError;
use crate::mesh::{InstancePoint, VertexAttribs, VertexFormat};
use crate::resources::{BatchArena, StaticMeshBuffer, StreamId, StreamPool};
use crate::state::{AttribTracker, StateCache};
use crate::types::{
    BlitFilter, BufferId, ClearColor, ClearFlags, CullFace, Extent2d, FramebufferId, FrontFace, Primitive,
    Rect, StateBits, TextureId,
};

/// Vertex/element buffers the next uploads and draws go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferBinding {
    /// Nothing bound; uploads and batches are no-ops.
    #[default]
    None,
    /// One of the backend's stream buffers.
    Stream(StreamId),
    /// Caller-owned buffers.
    Static(StaticMeshBuffer),
}

impl BufferBinding {
    /// The stream this binding refers to, if any.
    pub fn stream(&self) -> Option<StreamId> {
        match self {
            Self::Stream(id) => Some(*id),
            Self::None | Self::Static(_) => None,
        }
    }
}

/// Geometry batching and stream-buffer backend over a graphics API.
///
/// Single-threaded: all methods take `&mut self` and issue API calls
/// synchronously, in order.
#[derive(Debug)]
pub struct RenderBackend<B: GlBackend> {
    gl: B,
    config: BackendConfig,
    capabilities: Capabilities,
    instancing: InstancingStrategy,
    /// Strategy for instanced draws whose attribute mask lacks instance data.
    instancing_fallback: InstancingStrategy,

    cache: StateCache,
    attribs: AttribTracker,
    streams: StreamPool,
    batches: BatchArena,

    vertex_attribs: VertexAttribs,
    primitive: Primitive,
    binding: BufferBinding,

    draw_elements: DrawElements,
    shadow_elements: DrawElements,
    /// Instance transforms kept for uniform-driven draws.
    draw_instances: Vec<InstancePoint>,
    vertex_scratch: Vec<u8>,
    elem_scratch: Vec<u16>,
    triangle_outlines: bool,

    stats: FrameStats,
    frame_count: u64,
    in_frame: bool,

    camera_matrix: Mat4,
    object_matrix: Mat4,
    modelview_matrix: Mat4,
    projection_matrix: Mat4,
    mvp_matrix: Mat4,
    camera_origin: Vec3,
    camera_axis: Mat3,
    render_flags: u32,
    time: u32,
}

impl<B: GlBackend> RenderBackend<B> {
    /// Initialize the backend: validate the configuration, put the context
    /// into its default state and create the stream buffers.
    pub fn new(mut gl: B, config: BackendConfig) -> Result<Self, GraphicsError> {
        config.validate()?;

        let capabilities = gl.capabilities();
        let instancing = InstancingStrategy::select(&capabilities);
        let instancing_fallback = InstancingStrategy::uniform_fallback(&capabilities);

        let mut cache = StateCache::new(&capabilities);
        cache.apply_defaults(&mut gl);
        cache.bind_framebuffer(&mut gl, FramebufferId::DEFAULT);

        let mut streams = StreamPool::new();
        streams.register(&mut gl, &config, &capabilities)?;

        log::info!(
            "Render backend initialized on {} ({:?} instancing, {} stream verts)",
            gl.name(),
            instancing,
            config.stream_vertices
        );

        Ok(Self {
            batches: BatchArena::new(config.batch_vertices, config.batch_elements),
            gl,
            config,
            capabilities,
            instancing,
            instancing_fallback,
            cache,
            attribs: AttribTracker::new(),
            streams,
            vertex_attribs: VertexAttribs::empty(),
            primitive: Primitive::Triangles,
            binding: BufferBinding::None,
            draw_elements: DrawElements::default(),
            shadow_elements: DrawElements::default(),
            draw_instances: Vec::new(),
            vertex_scratch: Vec::new(),
            elem_scratch: Vec::new(),
            triangle_outlines: false,
            stats: FrameStats::default(),
            frame_count: 0,
            in_frame: false,
            camera_matrix: Mat4::identity(),
            object_matrix: Mat4::identity(),
            modelview_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            mvp_matrix: Mat4::identity(),
            camera_origin: Vec3::zeros(),
            camera_axis: Mat3::identity(),
            render_flags: 0,
            time: 0,
        })
    }

    /// Release the stream buffers and hand the graphics API back.
    pub fn shutdown(mut self) -> B {
        self.unbind();
        self.streams.destroy(&mut self.gl);
        log::info!("Render backend shut down after {} frames", self.frame_count);
        self.gl
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn gl(&self) -> &B {
        &self.gl
    }

    #[inline]
    pub fn gl_mut(&mut self) -> &mut B {
        &mut self.gl
    }

    #[inline]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Instancing strategy chosen at init.
    #[inline]
    pub fn instancing_strategy(&self) -> InstancingStrategy {
        self.instancing
    }

    /// Strategy used for instanced draws without instance attributes.
    #[inline]
    pub fn instancing_fallback(&self) -> InstancingStrategy {
        self.instancing_fallback
    }

    #[inline]
    pub fn streams(&self) -> &StreamPool {
        &self.streams
    }

    #[inline]
    pub fn batches(&self) -> &BatchArena {
        &self.batches
    }

    /// Statistics of the current frame.
    #[inline]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Number of completed frames.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Descriptors of the last draw and its shadow counterpart.
    pub fn draw_descriptors(&self) -> (DrawElements, DrawElements) {
        (self.draw_elements, self.shadow_elements)
    }

    // ========================================================================
    // Frame and registration lifecycle
    // ========================================================================

    /// Start a frame: statistics are reset, the shader state mask is lifted
    /// and no buffer is bound.
    pub fn begin_frame(&mut self) {
        debug_assert!(!self.in_frame, "begin_frame called while already in frame");
        self.in_frame = true;
        self.stats.reset();
        self.cache
            .set_shader_state_mask(StateBits::all(), StateBits::empty());
        self.unbind();
    }

    pub fn end_frame(&mut self) {
        debug_assert!(self.in_frame, "end_frame called outside of frame");
        self.in_frame = false;
        self.frame_count += 1;

        profile_plot!("draws", self.stats.draws);
        profile_plot!("verts", self.stats.verts);
        frame_mark!();

        log::trace!("Frame {} stats:\n{}", self.frame_count, self.stats);
    }

    /// Create missing stream buffers after a registration event.
    pub fn begin_registration(&mut self) -> Result<(), GraphicsError> {
        self.streams
            .register(&mut self.gl, &self.config, &self.capabilities)?;
        log::info!(
            "Stream buffers registered (sequence {})",
            self.streams.registration_sequence()
        );
        self.unbind();
        Ok(())
    }

    pub fn end_registration(&mut self) {
        self.unbind();
    }

    /// Drop stream handles after the context lost its objects. The next
    /// registration recreates them.
    pub fn forget_streams(&mut self) {
        self.streams.forget();
        self.batches.clear();
        self.binding = BufferBinding::None;
        self.cache.forget_buffer_bindings();
        self.attribs.forget_pointers();
        log::info!("Stream buffers forgotten");
    }

    /// Set the frame time in milliseconds.
    pub fn set_time(&mut self, time: u32) {
        self.time = time;
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn finish(&mut self) {
        self.gl.finish();
    }

    pub fn flush(&mut self) {
        self.gl.flush();
    }

    // ========================================================================
    // Render state
    // ========================================================================

    pub fn state(&self) -> StateBits {
        self.cache.state()
    }

    /// Apply a state word as is.
    pub fn set_state(&mut self, state: StateBits) {
        self.cache.set_state(&mut self.gl, state);
    }

    /// Apply a material's state word through the shader state mask.
    pub fn set_shader_state(&mut self, state: StateBits) {
        self.cache.set_shader_state(&mut self.gl, state);
    }

    /// Set the mask applied to material state words: `(state & and) | or`.
    pub fn set_shader_state_mask(&mut self, and: StateBits, or: StateBits) {
        self.cache.set_shader_state_mask(and, or);
    }

    pub fn set_depth_range(&mut self, min: f32, max: f32) {
        self.cache.set_depth_range(&mut self.gl, min, max);
    }

    pub fn depth_range(&self) -> (f32, f32) {
        self.cache.depth_range()
    }

    pub fn set_cull(&mut self, cull: CullFace) {
        self.cache.set_cull(&mut self.gl, cull);
    }

    pub fn cull(&self) -> CullFace {
        self.cache.cull()
    }

    /// Use clockwise front faces when `flipped`.
    pub fn set_front_face(&mut self, flipped: bool) {
        let face = if flipped { FrontFace::Cw } else { FrontFace::Ccw };
        self.cache.set_front_face(&mut self.gl, face);
    }

    pub fn flip_front_face(&mut self) {
        let flipped = self.cache.front_face() == FrontFace::Ccw;
        self.set_front_face(flipped);
    }

    /// Returns true if front faces are clockwise.
    pub fn front_face(&self) -> bool {
        self.cache.front_face() == FrontFace::Cw
    }

    pub fn set_scissor(&mut self, rect: Rect) {
        self.cache.set_scissor(&mut self.gl, rect);
    }

    pub fn scissor(&self) -> Rect {
        self.cache.scissor()
    }

    pub fn enable_scissor(&mut self, enable: bool) {
        self.cache.enable_scissor(&mut self.gl, enable);
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.cache.set_viewport(&mut self.gl, rect);
    }

    pub fn viewport(&self) -> Rect {
        self.cache.viewport()
    }

    pub fn bind_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.cache.bind_framebuffer(&mut self.gl, framebuffer);
    }

    /// Framebuffer draws currently go to.
    pub fn bound_framebuffer(&self) -> FramebufferId {
        self.cache.framebuffer()
    }

    pub fn framebuffer_size(&self) -> Extent2d {
        self.cache.framebuffer_size()
    }

    pub fn clear(&mut self, flags: ClearFlags, color: ClearColor) {
        self.cache.clear(&mut self.gl, flags, color);
    }

    /// Set the value depth clears write.
    pub fn clear_depth(&mut self, depth: f32) {
        self.gl.clear_depth(depth);
    }

    /// Copy the `mask` buffers of the bound framebuffer to `dest`, stretched
    /// over the whole destination.
    ///
    /// Depth and stencil copies are always nearest-filtered. The bound
    /// framebuffer stays bound.
    pub fn blit_framebuffer(&mut self, dest: FramebufferId, mask: ClearFlags, filter: BlitFilter) {
        let src = self.cache.framebuffer();
        if src == dest || mask.is_empty() {
            log::debug!("blit_framebuffer: nothing to copy from {:?} to {:?}", src, dest);
            return;
        }

        let filter = if mask.intersects(ClearFlags::DEPTH | ClearFlags::STENCIL) {
            BlitFilter::Nearest
        } else {
            filter
        };
        let src_size = self.cache.framebuffer_size();
        let dst_size = self.gl.framebuffer_size(dest);
        self.gl.blit_framebuffer(
            src,
            dest,
            Rect::new(0, 0, src_size.width, src_size.height),
            Rect::new(0, 0, dst_size.width, dst_size.height),
            mask,
            filter,
        );
    }

    /// Bind a texture, counting binds that reach the context.
    pub fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        if self.cache.bind_texture(&mut self.gl, unit, texture) {
            self.stats.add_bind();
        }
    }

    /// Record a program bind made by the material layer.
    pub fn count_program_bind(&mut self) {
        self.stats.add_program();
    }

    // ========================================================================
    // Vertex attributes and buffer binding
    // ========================================================================

    pub fn vertex_attribs(&self) -> VertexAttribs {
        self.vertex_attribs
    }

    /// Set the channels the next uploads and draws use.
    pub fn set_vertex_attribs(&mut self, attribs: VertexAttribs) {
        self.vertex_attribs = attribs;
    }

    pub fn binding(&self) -> BufferBinding {
        self.binding
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Bind buffers for the following uploads and draws.
    ///
    /// Stream bindings switch to the compact stream of the same kind while
    /// the vertex attributes only use compact channels. The underlying
    /// buffers are only rebound when the binding changes.
    pub fn bind_buffer(&mut self, binding: BufferBinding, primitive: Primitive) {
        let binding = match binding {
            BufferBinding::Stream(id) if self.vertex_attribs.is_compact() => {
                BufferBinding::Stream(id.compact())
            }
            other => other,
        };

        self.primitive = primitive;
        if self.binding == binding {
            return;
        }

        let (binding, buffers) = match binding {
            BufferBinding::None => (binding, None),
            BufferBinding::Stream(id) => match self.streams.get(id) {
                Some(stream) => (
                    binding,
                    Some((
                        stream.buffer().vertex_buffer(),
                        stream.buffer().element_buffer(),
                    )),
                ),
                None => {
                    log::debug!("bind_buffer: {} is not registered", id);
                    (BufferBinding::None, None)
                }
            },
            BufferBinding::Static(buffer) => (binding, Some((buffer.vertex, buffer.elements))),
        };

        self.binding = binding;
        let (vertex, elements): (Option<BufferId>, Option<BufferId>) = buffers.unzip();
        if self.cache.bind_array_buffer(&mut self.gl, vertex) {
            self.attribs.forget_pointers();
        }
        self.cache.bind_element_buffer(&mut self.gl, elements);
    }

    fn unbind(&mut self) {
        self.bind_buffer(BufferBinding::None, Primitive::Triangles);
    }

    /// Layout of the bound buffers.
    fn bound_format(&self) -> Option<VertexFormat> {
        match self.binding {
            BufferBinding::None => None,
            BufferBinding::Stream(id) => self.streams.get(id).map(|s| *s.buffer().format()),
            BufferBinding::Static(buffer) => Some(buffer.format),
        }
    }

    // ========================================================================
    // Matrices and view
    // ========================================================================

    /// Load the world-to-camera matrix (column-major).
    pub fn load_camera_matrix(&mut self, m: &[f32; 16]) {
        self.camera_matrix = mat4_from_cols_array(m);
    }

    /// Load the object-to-world matrix and recompute the modelview and
    /// modelview-projection matrices.
    pub fn load_object_matrix(&mut self, m: &[f32; 16]) {
        self.object_matrix = mat4_from_cols_array(m);
        self.modelview_matrix = self.camera_matrix * self.object_matrix;
        self.mvp_matrix = self.projection_matrix * self.modelview_matrix;
    }

    /// Load the projection matrix and recompute the modelview-projection.
    pub fn load_projection_matrix(&mut self, m: &[f32; 16]) {
        self.projection_matrix = mat4_from_cols_array(m);
        self.mvp_matrix = self.projection_matrix * self.modelview_matrix;
    }

    pub fn camera_matrix(&self) -> &Mat4 {
        &self.camera_matrix
    }

    pub fn object_matrix(&self) -> &Mat4 {
        &self.object_matrix
    }

    pub fn modelview_matrix(&self) -> &Mat4 {
        &self.modelview_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    pub fn modelview_projection_matrix(&self) -> &Mat4 {
        &self.mvp_matrix
    }

    pub fn set_camera(&mut self, origin: Vec3, axis: Mat3) {
        self.camera_origin = origin;
        self.camera_axis = axis;
    }

    pub fn camera_origin(&self) -> &Vec3 {
        &self.camera_origin
    }

    pub fn camera_axis(&self) -> &Mat3 {
        &self.camera_axis
    }

    /// Set the renderer's view flags, passed through to the material layer.
    pub fn set_render_flags(&mut self, flags: u32) {
        self.render_flags = flags;
    }

    pub fn render_flags(&self) -> u32 {
        self.render_flags
    }

    /// Screen rectangle (top-left origin) covering the projection of a box's
    /// eight corners, padded by one pixel and clipped to the viewport.
    ///
    /// Returns `None` when the clipped rectangle is empty. Corners with a zero
    /// `w` after projection push the box off-screen.
    pub fn scissor_for_bounds(&self, corners: &[Vec3; 8]) -> Option<Rect> {
        const OFFSCREEN: f32 = 999_999.0;

        let camera_projection = self.projection_matrix * self.camera_matrix;
        let viewport = self.cache.viewport();
        let (vw, vh) = (viewport.width as f32, viewport.height as f32);

        let (mut x1, mut y1) = (OFFSCREEN, OFFSCREEN);
        let (mut x2, mut y2) = (-OFFSCREEN, -OFFSCREEN);
        for corner in corners {
            let proj = transform_point4(&camera_projection, corner);
            let (x, y) = if proj.w != 0.0 {
                (
                    (proj.x / proj.w + 1.0) * 0.5 * vw,
                    (proj.y / proj.w + 1.0) * 0.5 * vh,
                )
            } else {
                (OFFSCREEN, OFFSCREEN)
            };
            x1 = x1.min(x);
            y1 = y1.min(y);
            x2 = x2.max(x);
            y2 = y2.max(y);
        }

        let ix1 = (x1 - 1.0).max(0.0) as i32;
        let ix2 = (x2 + 1.0).min(vw) as i32;
        if ix1 >= ix2 {
            return None;
        }

        let iy1 = (y1 - 1.0).max(0.0) as i32;
        let iy2 = (y2 + 1.0).min(vh) as i32;
        if iy1 >= iy2 {
            return None;
        }

        Some(Rect::new(ix1, viewport.height - iy2, ix2 - ix1, iy2 - iy1))
    }
}
