//! Dummy graphics backend for testing and development.
//!
//! This backend doesn't talk to a GPU. It records every call it receives as a
//! [`GlCall`], keeps buffer contents in memory and reports configurable
//! capabilities, so the streaming backend can be exercised and inspected
//! without a graphics context.

use std::collections::HashMap;

use crate::error::GraphicsError;
use crate::mesh::{AttribPointer, AttribSlot, InstancePoint};
use crate::types::{
    BlendFactor, BlitFilter, BufferDescriptor, BufferId, BufferTarget, BufferUsage, ClearColor, ClearFlags,
    ColorMask, CullFace, DepthFunc, Extent2d, FramebufferId, FrontFace, GlCapability, PolygonMode,
    Primitive, Rect, StencilFunc, StencilOp, TextureId,
};

use super::{Capabilities, GlBackend};

/// Default framebuffer size reported by the dummy backend.
pub const DEFAULT_FRAMEBUFFER_SIZE: Extent2d = Extent2d {
    width: 640,
    height: 480,
};

/// A recorded graphics API call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    SetCapability(GlCapability, bool),
    BlendFunc(BlendFactor, BlendFactor),
    ColorMask(ColorMask),
    DepthFunc(DepthFunc),
    DepthMask(bool),
    DepthRange(f32, f32),
    PolygonOffset(f32, f32),
    PolygonMode(PolygonMode),
    CullFace(CullFace),
    FrontFace(FrontFace),
    StencilMask(u32),
    StencilFunc(StencilFunc, i32, u32),
    StencilOp(StencilOp, StencilOp, StencilOp),
    Scissor(Rect),
    Viewport(Rect),
    ClearColor(ClearColor),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(ClearFlags),
    CreateBuffer {
        buffer: BufferId,
        size: u64,
        usage: BufferUsage,
    },
    DeleteBuffer(BufferId),
    BufferSubData {
        buffer: BufferId,
        offset: usize,
        len: usize,
    },
    InvalidateBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BindTexture(u32, Option<TextureId>),
    EnableAttrib(AttribSlot, bool),
    AttribPointer(AttribSlot, AttribPointer),
    AttribDivisor(AttribSlot, u32),
    InstanceUniforms(usize),
    DrawElements {
        primitive: Primitive,
        count: u32,
        first_elem: u32,
    },
    DrawRangeElements {
        primitive: Primitive,
        start: u32,
        end: u32,
        count: u32,
        first_elem: u32,
    },
    DrawElementsInstanced {
        primitive: Primitive,
        count: u32,
        first_elem: u32,
        instances: u32,
    },
    BindFramebuffer(FramebufferId),
    BlitFramebuffer {
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect,
        dst_rect: Rect,
        mask: ClearFlags,
        filter: BlitFilter,
    },
    Finish,
    Flush,
}

impl GlCall {
    /// Returns true for draw calls.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawElements { .. }
                | Self::DrawRangeElements { .. }
                | Self::DrawElementsInstanced { .. }
        )
    }

    /// Returns true for vertex attribute enable/disable calls.
    pub fn is_attrib_toggle(&self) -> bool {
        matches!(self, Self::EnableAttrib(..))
    }
}

/// Dummy graphics backend.
#[derive(Debug)]
pub struct DummyBackend {
    capabilities: Capabilities,
    calls: Vec<GlCall>,
    buffers: HashMap<BufferId, Vec<u8>>,
    next_buffer: u32,
    framebuffer_sizes: HashMap<FramebufferId, Extent2d>,
    bound_framebuffer: FramebufferId,
    instance_uniforms: Vec<InstancePoint>,
    fail_buffer_creation: bool,
}

impl DummyBackend {
    /// Create a new dummy backend with every optional feature available.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::all())
    }

    /// Create a dummy backend reporting `capabilities`.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let mut framebuffer_sizes = HashMap::new();
        framebuffer_sizes.insert(FramebufferId::DEFAULT, DEFAULT_FRAMEBUFFER_SIZE);
        Self {
            capabilities,
            calls: Vec::new(),
            buffers: HashMap::new(),
            next_buffer: 1,
            framebuffer_sizes,
            bound_framebuffer: FramebufferId::DEFAULT,
            instance_uniforms: Vec::new(),
            fail_buffer_creation: false,
        }
    }

    /// Set the size reported for `framebuffer`.
    pub fn with_framebuffer_size(mut self, framebuffer: FramebufferId, size: Extent2d) -> Self {
        self.framebuffer_sizes.insert(framebuffer, size);
        self
    }

    /// Make subsequent buffer creation fail with [`GraphicsError::OutOfMemory`].
    pub fn set_fail_buffer_creation(&mut self, fail: bool) {
        self.fail_buffer_creation = fail;
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Recorded draw calls.
    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.calls.iter().filter(|c| c.is_draw()).cloned().collect()
    }

    /// Contents of a live buffer.
    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Number of live buffers.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Currently bound framebuffer.
    pub fn bound_framebuffer(&self) -> FramebufferId {
        self.bound_framebuffer
    }

    /// Instance transforms pushed by the last uniform update.
    pub fn instance_uniforms(&self) -> &[InstancePoint] {
        &self.instance_uniforms
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("DummyBackend: {:?}", call);
        self.calls.push(call);
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_capability(&mut self, capability: GlCapability, enabled: bool) {
        self.record(GlCall::SetCapability(capability, enabled));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn color_mask(&mut self, mask: ColorMask) {
        self.record(GlCall::ColorMask(mask));
    }

    fn depth_func(&mut self, func: DepthFunc) {
        self.record(GlCall::DepthFunc(func));
    }

    fn depth_mask(&mut self, write: bool) {
        self.record(GlCall::DepthMask(write));
    }

    fn depth_range(&mut self, near: f32, far: f32) {
        self.record(GlCall::DepthRange(near, far));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.record(GlCall::PolygonOffset(factor, units));
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        self.record(GlCall::PolygonMode(mode));
    }

    fn cull_face(&mut self, face: CullFace) {
        self.record(GlCall::CullFace(face));
    }

    fn front_face(&mut self, face: FrontFace) {
        self.record(GlCall::FrontFace(face));
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.record(GlCall::StencilMask(mask));
    }

    fn stencil_func(&mut self, func: StencilFunc, reference: i32, mask: u32) {
        self.record(GlCall::StencilFunc(func, reference, mask));
    }

    fn stencil_op(&mut self, stencil_fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.record(GlCall::StencilOp(stencil_fail, depth_fail, pass));
    }

    fn scissor(&mut self, rect: Rect) {
        self.record(GlCall::Scissor(rect));
    }

    fn viewport(&mut self, rect: Rect) {
        self.record(GlCall::Viewport(rect));
    }

    fn clear_color(&mut self, color: ClearColor) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(GlCall::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, value: i32) {
        self.record(GlCall::ClearStencil(value));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(GlCall::Clear(flags));
    }

    fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, GraphicsError> {
        if self.fail_buffer_creation {
            return Err(GraphicsError::OutOfMemory);
        }

        let buffer = BufferId::new(self.next_buffer).ok_or_else(|| {
            GraphicsError::ResourceCreationFailed("buffer names exhausted".to_string())
        })?;
        self.next_buffer = self.next_buffer.wrapping_add(1);

        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        self.buffers.insert(buffer, vec![0; descriptor.size as usize]);
        self.record(GlCall::CreateBuffer {
            buffer,
            size: descriptor.size,
            usage: descriptor.usage,
        });
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn buffer_sub_data(&mut self, buffer: BufferId, offset: usize, data: &[u8]) {
        match self.buffers.get_mut(&buffer) {
            Some(storage) if offset + data.len() <= storage.len() => {
                storage[offset..offset + data.len()].copy_from_slice(data);
            }
            Some(storage) => {
                log::error!(
                    "DummyBackend: write of {} bytes at {} overflows buffer {:?} of {} bytes",
                    data.len(),
                    offset,
                    buffer,
                    storage.len()
                );
                debug_assert!(false, "buffer write out of range");
            }
            None => log::error!("DummyBackend: write to unknown buffer {:?}", buffer),
        }
        self.record(GlCall::BufferSubData {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn invalidate_buffer(&mut self, buffer: BufferId) {
        self.record(GlCall::InvalidateBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.record(GlCall::BindTexture(unit, texture));
    }

    fn set_vertex_attrib_enabled(&mut self, slot: AttribSlot, enabled: bool) {
        self.record(GlCall::EnableAttrib(slot, enabled));
    }

    fn vertex_attrib_pointer(&mut self, slot: AttribSlot, pointer: &AttribPointer) {
        self.record(GlCall::AttribPointer(slot, *pointer));
    }

    fn vertex_attrib_divisor(&mut self, slot: AttribSlot, divisor: u32) {
        self.record(GlCall::AttribDivisor(slot, divisor));
    }

    fn set_instance_uniforms(&mut self, instances: &[InstancePoint]) {
        self.instance_uniforms = instances.to_vec();
        self.record(GlCall::InstanceUniforms(instances.len()));
    }

    fn draw_elements(&mut self, primitive: Primitive, count: u32, first_elem: u32) {
        self.record(GlCall::DrawElements {
            primitive,
            count,
            first_elem,
        });
    }

    fn draw_range_elements(
        &mut self,
        primitive: Primitive,
        start: u32,
        end: u32,
        count: u32,
        first_elem: u32,
    ) {
        self.record(GlCall::DrawRangeElements {
            primitive,
            start,
            end,
            count,
            first_elem,
        });
    }

    fn draw_elements_instanced(
        &mut self,
        primitive: Primitive,
        count: u32,
        first_elem: u32,
        instances: u32,
    ) {
        self.record(GlCall::DrawElementsInstanced {
            primitive,
            count,
            first_elem,
            instances,
        });
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.bound_framebuffer = framebuffer;
        self.record(GlCall::BindFramebuffer(framebuffer));
    }

    fn framebuffer_size(&self, framebuffer: FramebufferId) -> Extent2d {
        self.framebuffer_sizes
            .get(&framebuffer)
            .copied()
            .unwrap_or(DEFAULT_FRAMEBUFFER_SIZE)
    }

    fn blit_framebuffer(
        &mut self,
        src: FramebufferId,
        dst: FramebufferId,
        src_rect: Rect,
        dst_rect: Rect,
        mask: ClearFlags,
        filter: BlitFilter,
    ) {
        self.record(GlCall::BlitFramebuffer {
            src,
            dst,
            src_rect,
            dst_rect,
            mask,
            filter,
        });
    }

    fn finish(&mut self) {
        self.record(GlCall::Finish);
    }

    fn flush(&mut self) {
        self.record(GlCall::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_storage() {
        let mut backend = DummyBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(8, BufferUsage::VERTEX))
            .unwrap();
        backend.buffer_sub_data(buffer, 4, &[1, 2, 3, 4]);
        assert_eq!(backend.buffer_data(buffer), Some(&[0, 0, 0, 0, 1, 2, 3, 4][..]));

        backend.delete_buffer(buffer);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_buffer_ids_are_unique() {
        let mut backend = DummyBackend::new();
        let desc = BufferDescriptor::new(4, BufferUsage::INDEX);
        let a = backend.create_buffer(&desc).unwrap();
        let b = backend.create_buffer(&desc).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_failing_allocation() {
        let mut backend = DummyBackend::new();
        backend.set_fail_buffer_creation(true);
        let result = backend.create_buffer(&BufferDescriptor::new(4, BufferUsage::VERTEX));
        assert_eq!(result, Err(GraphicsError::OutOfMemory));
    }

    #[test]
    fn test_records_draws() {
        let mut backend = DummyBackend::new();
        backend.depth_mask(true);
        backend.draw_elements(Primitive::Triangles, 6, 0);
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(backend.draw_calls().len(), 1);
        assert_eq!(backend.take_calls().len(), 2);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_framebuffer_sizes() {
        let offscreen = FramebufferId(3);
        let backend =
            DummyBackend::new().with_framebuffer_size(offscreen, Extent2d::new(256, 128));
        assert_eq!(backend.framebuffer_size(offscreen), Extent2d::new(256, 128));
        assert_eq!(
            backend.framebuffer_size(FramebufferId::DEFAULT),
            DEFAULT_FRAMEBUFFER_SIZE
        );
        assert_eq!(backend.name(), "Dummy");
    }
}
