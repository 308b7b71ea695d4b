//! Draw submission.

use quadstream_core::profiling::profile_scope;

use crate::backend::{Capabilities, GlBackend};
use crate::draw::{DrawElements, InstancingStrategy};
use crate::mesh::{InstancePoint, VertexAttribs};
use crate::types::{PolygonMode, Primitive, StateBits};

use super::{BufferBinding, RenderBackend};

/// Issue one non-instanced draw of `de`.
fn draw_range<B: GlBackend>(
    gl: &mut B,
    capabilities: &Capabilities,
    primitive: Primitive,
    de: &DrawElements,
) {
    let count = de.num_elems as u32;
    let first_elem = de.first_elem as u32;
    if capabilities.draw_range_elements {
        let start = de.first_vert as u32;
        let end = (de.first_vert + de.num_verts - 1) as u32;
        gl.draw_range_elements(primitive, start, end, count, first_elem);
    } else {
        gl.draw_elements(primitive, count, first_elem);
    }
}

impl<B: GlBackend> RenderBackend<B> {
    /// Draw a range of the bound buffers.
    ///
    /// `shadow` is kept alongside for passes that draw the shadow geometry of
    /// the same batch. Instance attributes are switched off.
    pub fn draw_elements(&mut self, de: DrawElements, shadow: DrawElements) {
        self.vertex_attribs.remove(VertexAttribs::INSTANCES);
        self.draw_elements = de.with_instances(0);
        self.shadow_elements = shadow.with_instances(0);
        self.draw_current();
    }

    /// Draw `instances.len()` instances of a range of the bound buffers.
    ///
    /// With vertex divisors, instance data of a bound stream goes through the
    /// stream's instance region in chunks of its instance capacity, one draw
    /// per chunk; static buffers must carry their own instance region.
    /// Otherwise the transforms are pushed as uniforms.
    pub fn draw_elements_instanced(
        &mut self,
        de: DrawElements,
        shadow: DrawElements,
        instances: &[InstancePoint],
    ) {
        if instances.is_empty() {
            return;
        }

        self.vertex_attribs.remove(VertexAttribs::INSTANCES);
        self.draw_elements = de.with_instances(0);
        self.shadow_elements = shadow.with_instances(0);

        let mut instances = instances;
        if self.instancing == InstancingStrategy::VertexDivisor {
            match self.binding {
                BufferBinding::Stream(id) => {
                    self.vertex_attribs.insert(VertexAttribs::INSTANCES);

                    let chunk = self.config.stream_instances;
                    while instances.len() > chunk {
                        let (head, tail) = instances.split_at(chunk);
                        self.upload_stream_instances(head);
                        self.set_instance_count(chunk);
                        self.draw_current();
                        instances = tail;
                    }
                    self.upload_stream_instances(instances);
                    log::trace!("{} instances through {}", instances.len(), id);
                }
                BufferBinding::Static(buffer) if buffer.has_instances() => {
                    self.vertex_attribs.insert(VertexAttribs::INSTANCES);
                }
                BufferBinding::Static(_) | BufferBinding::None => {}
            }
        }

        if !self.vertex_attribs.has_all(VertexAttribs::INSTANCES) {
            self.draw_instances.clear();
            self.draw_instances.extend_from_slice(instances);
        }

        self.set_instance_count(instances.len());
        self.draw_current();
    }

    /// Switch triangle outlines on or off, returning the previous setting.
    ///
    /// Outlines draw in line mode with depth testing forced off.
    pub fn enable_triangle_outlines(&mut self, enable: bool) -> bool {
        let previous = self.triangle_outlines;
        if previous == enable {
            return previous;
        }

        self.triangle_outlines = enable;
        if enable {
            self.cache
                .set_shader_state_mask(StateBits::empty(), StateBits::NO_DEPTH_TEST);
            self.cache.set_polygon_mode(&mut self.gl, PolygonMode::Line);
        } else {
            self.cache
                .set_shader_state_mask(StateBits::all(), StateBits::empty());
            self.cache.set_polygon_mode(&mut self.gl, PolygonMode::Fill);
        }
        previous
    }

    pub fn triangle_outlines(&self) -> bool {
        self.triangle_outlines
    }

    fn set_instance_count(&mut self, count: usize) {
        self.draw_elements.num_instances = count;
        self.shadow_elements.num_instances = count;
    }

    fn upload_stream_instances(&mut self, instances: &[InstancePoint]) {
        let Some(id) = self.binding.stream() else {
            return;
        };
        if let Some(stream) = self.streams.get(id) {
            stream.buffer().upload_instances(&mut self.gl, instances);
        }
    }

    fn draw_current(&mut self) {
        let de = self.draw_elements;
        if de.is_empty() {
            return;
        }

        let Some(format) = self.bound_format() else {
            log::debug!("draw_elements: no buffers bound");
            return;
        };

        self.attribs
            .enable_attribs(&mut self.gl, self.vertex_attribs, &format);
        self.draw_real(&de);
    }

    fn draw_real(&mut self, de: &DrawElements) {
        profile_scope!("draw_real");

        if !self.config.draw_elements {
            return;
        }

        let primitive = self.primitive;
        let count = de.num_elems as u32;
        let first_elem = de.first_elem as u32;

        let mut drawn_instances = de.num_instances;
        if drawn_instances == 0 {
            drawn_instances = 1;
            draw_range(&mut self.gl, &self.capabilities, primitive, de);
            self.stats.add_draw();
        } else {
            let strategy = if self.vertex_attribs.has_all(VertexAttribs::INSTANCES) {
                InstancingStrategy::VertexDivisor
            } else {
                self.instancing_fallback
            };

            match strategy {
                InstancingStrategy::VertexDivisor => {
                    self.gl.draw_elements_instanced(
                        primitive,
                        count,
                        first_elem,
                        de.num_instances as u32,
                    );
                    self.stats.add_draw();
                }
                InstancingStrategy::UniformBatches => {
                    let instances = &self.draw_instances[..de.num_instances];
                    for chunk in instances.chunks(self.config.max_uniform_instances) {
                        self.gl.set_instance_uniforms(chunk);
                        self.gl.draw_elements_instanced(
                            primitive,
                            count,
                            first_elem,
                            chunk.len() as u32,
                        );
                        self.stats.add_draw();
                    }
                }
                InstancingStrategy::PerInstance => {
                    let instances = &self.draw_instances[..de.num_instances];
                    for instance in instances.chunks(1) {
                        self.gl.set_instance_uniforms(instance);
                        draw_range(&mut self.gl, &self.capabilities, primitive, de);
                        self.stats.add_draw();
                    }
                }
            }
        }

        let tris = if primitive.is_triangles() {
            de.num_elems.saturating_mul(drawn_instances) / 3
        } else {
            0
        };
        self.stats
            .add_geometry(de.num_verts.saturating_mul(drawn_instances), tris);
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GlCall};
    use crate::config::BackendConfig;
    use crate::mesh::{AttribSlot, Mesh, VertexFormat};
    use crate::resources::{MeshBuffer, StreamId};

    fn backend_with(caps: Capabilities) -> RenderBackend<DummyBackend> {
        let config = BackendConfig::default()
            .with_stream_capacity(64, 96, 8)
            .with_batch_capacity(32, 48)
            .with_max_uniform_instances(4);
        let mut backend =
            RenderBackend::new(DummyBackend::with_capabilities(caps), config).unwrap();
        backend.set_vertex_attribs(VertexAttribs::POSITION | VertexAttribs::NORMAL);
        backend.bind_buffer(BufferBinding::Stream(StreamId::Generic), Primitive::Triangles);
        let positions = [[0.0f32; 4]; 4];
        backend.upload_mesh(&Mesh::new(&positions));
        backend.gl_mut().clear_calls();
        backend
    }

    fn range() -> DrawElements {
        DrawElements::new(0, 4, 0, 6)
    }

    fn instances(n: usize) -> Vec<InstancePoint> {
        (0..n).map(|i| InstancePoint::at([i as f32, 0.0, 0.0])).collect()
    }

    #[test]
    fn test_plain_draw_stats() {
        let mut backend = backend_with(Capabilities::all());
        backend.draw_elements(range(), range());
        assert_eq!(backend.stats().draws, 1);
        assert_eq!(backend.stats().verts, 4);
        assert_eq!(backend.stats().tris, 2);
        assert!(matches!(
            backend.gl().draw_calls()[0],
            GlCall::DrawRangeElements { start: 0, end: 3, count: 6, first_elem: 0, .. }
        ));
    }

    #[test]
    fn test_plain_draw_without_range_support() {
        let mut backend = backend_with(Capabilities::all().with_draw_range_elements(false));
        backend.draw_elements(range(), range());
        assert!(matches!(
            backend.gl().draw_calls()[0],
            GlCall::DrawElements { count: 6, first_elem: 0, .. }
        ));
    }

    #[test]
    fn test_empty_draw_is_skipped() {
        let mut backend = backend_with(Capabilities::all());
        backend.draw_elements(DrawElements::new(0, 4, 0, 0), DrawElements::default());
        assert!(backend.gl().calls().is_empty());
        assert_eq!(backend.stats().draws, 0);
    }

    #[test]
    fn test_lines_count_no_triangles() {
        let mut backend = backend_with(Capabilities::all());
        backend.bind_buffer(BufferBinding::Stream(StreamId::Generic), Primitive::Lines);
        backend.draw_elements(range(), range());
        assert_eq!(backend.stats().verts, 4);
        assert_eq!(backend.stats().tris, 0);
    }

    #[test]
    fn test_divisor_instancing_chunks_by_stream_capacity() {
        let mut backend = backend_with(Capabilities::all());
        backend.draw_elements_instanced(range(), range(), &instances(20));
        let draws = backend.gl().draw_calls();
        let counts: Vec<u32> = draws
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawElementsInstanced { instances, .. } => Some(*instances),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![8, 8, 4]);
        assert_eq!(backend.stats().verts, 80);
        assert_eq!(backend.stats().tris, 40);
        assert!(backend
            .gl()
            .calls()
            .iter()
            .any(|c| matches!(c, GlCall::AttribDivisor(AttribSlot::InstanceQuat, 1))));
    }

    #[test]
    fn test_uniform_batches_respect_limit() {
        let caps = Capabilities::all().with_instanced_arrays(false);
        let mut backend = backend_with(caps);
        backend.draw_elements_instanced(range(), range(), &instances(10));
        assert_eq!(backend.stats().draws, 3);
        assert_eq!(backend.gl().instance_uniforms().len(), 2);
        assert_eq!(backend.gl().instance_uniforms()[1], InstancePoint::at([9.0, 0.0, 0.0]));
    }

    #[test]
    fn test_per_instance_draws() {
        let mut backend = backend_with(Capabilities::minimal().with_draw_range_elements(true));
        backend.draw_elements_instanced(range(), range(), &instances(3));
        let draws = backend.gl().draw_calls();
        assert_eq!(draws.len(), 3);
        assert!(draws
            .iter()
            .all(|c| matches!(c, GlCall::DrawRangeElements { .. })));
        assert_eq!(backend.stats().verts, 12);
    }

    #[test]
    fn test_zero_instances_draw_nothing() {
        let mut backend = backend_with(Capabilities::all());
        backend.draw_elements_instanced(range(), range(), &[]);
        assert!(backend.gl().calls().is_empty());
    }

    #[test]
    fn test_static_buffer_without_instance_region_uses_uniforms() {
        let mut backend = backend_with(Capabilities::all());
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty());
        let buffer = MeshBuffer::create(backend.gl_mut(), "static", format, 4, 6, 0).unwrap();
        backend.set_vertex_attribs(VertexAttribs::POSITION | VertexAttribs::NORMAL);
        backend.bind_buffer(BufferBinding::Static(buffer.as_static()), Primitive::Triangles);
        backend.gl_mut().clear_calls();

        backend.draw_elements_instanced(range(), range(), &instances(6));
        assert_eq!(backend.stats().draws, 2);
        assert!(!backend.vertex_attribs().intersects(VertexAttribs::INSTANCES));
    }

    #[test]
    fn test_static_buffer_with_instance_region_uses_divisors() {
        let mut backend = backend_with(Capabilities::all());
        let format = VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty());
        let buffer = MeshBuffer::create(backend.gl_mut(), "static", format, 4, 6, 6).unwrap();
        backend.bind_buffer(BufferBinding::Static(buffer.as_static()), Primitive::Triangles);
        backend.gl_mut().clear_calls();

        backend.draw_elements_instanced(range(), range(), &instances(6));
        assert_eq!(backend.stats().draws, 1);
        assert!(backend.vertex_attribs().has_all(VertexAttribs::INSTANCES));

        backend.draw_elements(range(), range());
        assert!(!backend.vertex_attribs().intersects(VertexAttribs::INSTANCES));
    }

    #[test]
    fn test_draw_switch_suppresses_draws() {
        let config = BackendConfig::default().with_draw_elements(false);
        let mut backend = RenderBackend::new(DummyBackend::new(), config).unwrap();
        backend.set_vertex_attribs(VertexAttribs::COMPACT);
        backend.bind_buffer(BufferBinding::Stream(StreamId::Quad), Primitive::Triangles);
        backend.draw_elements(range(), range());
        assert!(backend.gl().draw_calls().is_empty());
        assert_eq!(backend.stats().draws, 0);
    }

    #[test]
    fn test_triangle_outlines_toggle() {
        let mut backend = backend_with(Capabilities::all());
        assert!(!backend.enable_triangle_outlines(true));
        assert!(backend.enable_triangle_outlines(true));
        assert!(backend
            .gl()
            .calls()
            .contains(&GlCall::PolygonMode(PolygonMode::Line)));

        backend.set_shader_state(StateBits::DEPTHWRITE);
        assert_eq!(backend.state(), StateBits::NO_DEPTH_TEST);

        assert!(backend.enable_triangle_outlines(false));
        assert!(!backend.triangle_outlines());
        backend.set_shader_state(StateBits::DEPTHWRITE);
        assert_eq!(backend.state(), StateBits::DEPTHWRITE);
    }

    #[test]
    fn test_shadow_descriptor_is_kept() {
        let mut backend = backend_with(Capabilities::all());
        let shadow = DrawElements::new(0, 2, 0, 3);
        backend.draw_elements_instanced(range(), shadow, &instances(2));
        let (draw, kept) = backend.draw_descriptors();
        assert_eq!(draw.num_instances, 2);
        assert_eq!(kept, shadow.with_instances(2));
    }
}
