//! Batching and stream uploads.

use quadstream_core::profiling::profile_function;

use crate::backend::GlBackend;
use crate::mesh::{elements, Mesh};
use crate::resources::{BatchStaging, StreamId, StreamKind};

use super::RenderBackend;

/// Elements `mesh` occupies in a stream of kind `kind`.
fn stream_element_count(kind: StreamKind, mesh: &Mesh<'_>) -> usize {
    match kind {
        StreamKind::Quad => elements::quad_element_count(mesh.num_verts()),
        StreamKind::Generic => match mesh.num_elems() {
            0 => elements::trifan_element_count(mesh.num_verts()),
            n => n,
        },
    }
}

impl<B: GlBackend> RenderBackend<B> {
    /// Reset the bound stream's batch.
    pub fn begin_batch(&mut self) {
        match self.binding.stream() {
            Some(id) => self.batches.get_mut(id).clear(),
            None => log::debug!("begin_batch: no stream bound"),
        }
    }

    /// Reset the bound stream's batch and hand out its staging mesh for the
    /// caller to fill with `num_verts` vertices and `num_elems` elements.
    ///
    /// Returns `None` when no stream is bound or the counts exceed the batch
    /// capacity. Finish with [`RenderBackend::upload_mapped_batch`].
    pub fn map_batch_mesh(
        &mut self,
        num_verts: usize,
        num_elems: usize,
    ) -> Option<&mut BatchStaging> {
        let Some(id) = self.binding.stream() else {
            log::debug!("map_batch_mesh: no stream bound");
            return None;
        };

        let batch = self.batches.get_mut(id);
        if num_verts > batch.vertex_capacity() || num_elems > batch.element_capacity() {
            return None;
        }
        batch.clear();
        Some(batch)
    }

    /// Upload the first `num_verts` vertices and `num_elems` elements the
    /// caller wrote into the mapped staging mesh.
    pub fn upload_mapped_batch(&mut self, num_verts: usize, num_elems: usize) {
        let Some(id) = self.binding.stream() else {
            return;
        };
        self.upload_batch(id, num_verts, num_elems);
    }

    /// Append a mesh to the bound stream's batch.
    ///
    /// A batch that cannot take the mesh is uploaded first (without a draw).
    /// Meshes larger than the batch itself go straight to
    /// [`RenderBackend::upload_mesh`].
    pub fn batch_mesh(&mut self, mesh: &Mesh<'_>) {
        profile_function!();

        let Some(id) = self.binding.stream() else {
            log::debug!("batch_mesh: no stream bound");
            return;
        };

        let num_verts = mesh.num_verts();
        let num_elems = stream_element_count(id.kind(), mesh);
        if num_verts == 0 || num_elems == 0 {
            return;
        }

        let batch = self.batches.get(id);
        if !batch.fits(num_verts, num_elems) {
            let (staged_verts, staged_elems) = (batch.num_verts(), batch.num_elems());
            self.upload_batch(id, staged_verts, staged_elems);
        }

        let batch = self.batches.get_mut(id);
        if num_verts > batch.vertex_capacity() || num_elems > batch.element_capacity() {
            self.upload_mesh(mesh);
        } else {
            batch.append(mesh, self.vertex_attribs, num_elems);
        }
    }

    /// Upload the pending batch and draw everything the bound stream holds
    /// since the last draw.
    pub fn end_batch(&mut self) {
        profile_function!();

        let Some(id) = self.binding.stream() else {
            return;
        };

        let batch = self.batches.get(id);
        if !batch.is_empty() {
            let (staged_verts, staged_elems) = (batch.num_verts(), batch.num_elems());
            self.upload_batch(id, staged_verts, staged_elems);
        }

        let Some(offset) = self.streams.get(id).map(|stream| stream.offset()) else {
            return;
        };
        if offset.is_empty() {
            return;
        }

        self.draw_elements(offset, offset);

        if let Some(stream) = self.streams.get_mut(id) {
            stream.offset.first_vert += offset.num_verts;
            stream.offset.first_elem += offset.num_elems;
            stream.offset.num_verts = 0;
            stream.offset.num_elems = 0;
        }
    }

    fn upload_batch(&mut self, id: StreamId, num_verts: usize, num_elems: usize) {
        let placeholder = BatchStaging::new(id.kind(), 0, 0);
        let mut staging = std::mem::replace(self.batches.get_mut(id), placeholder);
        self.upload_mesh(&staging.as_mesh(num_verts, num_elems));
        staging.clear();
        *self.batches.get_mut(id) = staging;
    }

    /// Append a mesh to the bound stream.
    ///
    /// When the stream cannot take the mesh, everything pending in it is
    /// drawn, the whole stream is discarded (vertex data always, element data
    /// on generic streams) and filling restarts at offset zero. A mesh larger
    /// than the stream is then dropped with a warning.
    ///
    /// Vertices are interleaved for the current vertex attributes. Elements
    /// are offset to the destination vertex, or synthesized as a triangle fan
    /// when the mesh has none; quad streams use their fixed elements.
    pub fn upload_mesh(&mut self, mesh: &Mesh<'_>) {
        profile_function!();

        let Some(id) = self.binding.stream() else {
            log::debug!("upload_mesh: no stream bound");
            return;
        };

        let num_verts = mesh.num_verts();
        let num_elems = stream_element_count(id.kind(), mesh);
        if num_verts == 0 || num_elems == 0 {
            return;
        }

        let Some(offset) = self.streams.get(id).map(|stream| stream.offset()) else {
            return;
        };

        let (max_verts, max_elems) = (self.config.stream_vertices, self.config.stream_elements);
        if offset.end_vert() + num_verts > max_verts || offset.end_elem() + num_elems > max_elems {
            self.draw_elements(offset, offset);
            if let Some(stream) = self.streams.get_mut(id) {
                stream.discard(&mut self.gl);
            }
            log::debug!("{} full, discarded after {} verts", id, offset.end_vert());
        }

        if num_verts > max_verts || num_elems > max_elems {
            log::warn!(
                "Dropped mesh of {} verts, {} elems: larger than {} ({} verts, {} elems)",
                num_verts,
                num_elems,
                id,
                max_verts,
                max_elems
            );
            return;
        }

        let Some(stream) = self.streams.get_mut(id) else {
            return;
        };
        let first_vert = stream.offset.end_vert();
        let first_elem = stream.offset.end_elem();

        if !id.is_quad() {
            self.elem_scratch.clear();
            match mesh.elems.filter(|elems| !elems.is_empty()) {
                Some(elems) => elements::copy_offset_elements(
                    elems.get(..num_elems).unwrap_or(elems),
                    first_vert,
                    &mut self.elem_scratch,
                ),
                None => {
                    elements::build_trifan_elements(first_vert, num_elems, &mut self.elem_scratch)
                }
            }
            stream
                .buffer()
                .upload_elements(&mut self.gl, first_elem, &self.elem_scratch);
        }

        stream
            .buffer()
            .format()
            .write_vertices(mesh, self.vertex_attribs, &mut self.vertex_scratch);
        stream
            .buffer()
            .upload_vertices(&mut self.gl, first_vert, &self.vertex_scratch);

        stream.offset.num_verts += num_verts;
        stream.offset.num_elems += num_elems;
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, GlCall};
    use crate::config::BackendConfig;
    use crate::context::BufferBinding;
    use crate::draw::DrawElements;
    use crate::mesh::VertexAttribs;
    use crate::types::Primitive;

    fn quad() -> [[f32; 4]; 4] {
        [
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
        ]
    }

    fn bound(stream: StreamId) -> RenderBackend<DummyBackend> {
        let config = BackendConfig::default()
            .with_stream_capacity(64, 96, 8)
            .with_batch_capacity(16, 24);
        let mut backend = RenderBackend::new(DummyBackend::new(), config).unwrap();
        backend.set_vertex_attribs(VertexAttribs::POSITION);
        backend.bind_buffer(BufferBinding::Stream(stream), Primitive::Triangles);
        backend.gl_mut().clear_calls();
        backend
    }

    fn offset(backend: &RenderBackend<DummyBackend>, id: StreamId) -> DrawElements {
        backend.streams().get(id).unwrap().offset()
    }

    #[test]
    fn test_element_counts_per_kind() {
        let positions = [[0.0; 4]; 7];
        let mesh = Mesh::new(&positions);
        assert_eq!(stream_element_count(StreamKind::Quad, &mesh), 6);
        assert_eq!(stream_element_count(StreamKind::Generic, &mesh), 15);
        let elems = [0u16, 1, 2];
        assert_eq!(
            stream_element_count(StreamKind::Generic, &mesh.with_elems(&elems)),
            3
        );
    }

    #[test]
    fn test_unbound_batch_is_noop() {
        let mut backend = bound(StreamId::QuadCompact);
        backend.bind_buffer(BufferBinding::None, Primitive::Triangles);
        assert!(backend.map_batch_mesh(4, 6).is_none());
        backend.batch_mesh(&Mesh::new(&quad()));
        backend.end_batch();
        assert!(backend.gl().draw_calls().is_empty());
    }

    #[test]
    fn test_map_batch_mesh_rejects_oversize() {
        let mut backend = bound(StreamId::QuadCompact);
        assert!(backend.map_batch_mesh(17, 0).is_none());
        assert!(backend.map_batch_mesh(16, 24).is_some());
    }

    #[test]
    fn test_mapped_batch_upload() {
        let mut backend = bound(StreamId::QuadCompact);
        let staging = backend.map_batch_mesh(8, 12).unwrap();
        staging.positions.extend_from_slice(&quad());
        staging.positions.extend_from_slice(&quad());
        backend.upload_mapped_batch(8, 12);
        assert_eq!(offset(&backend, StreamId::QuadCompact), DrawElements::new(0, 8, 0, 12));
        assert!(backend.batches().get(StreamId::QuadCompact).is_empty());
    }

    #[test]
    fn test_begin_batch_discards_staged_vertices() {
        let mut backend = bound(StreamId::QuadCompact);
        backend.begin_batch();
        backend.batch_mesh(&Mesh::new(&quad()));
        assert_eq!(backend.batches().get(StreamId::QuadCompact).num_verts(), 4);

        backend.begin_batch();
        assert!(backend.batches().get(StreamId::QuadCompact).is_empty());
        backend.end_batch();
        assert!(backend.gl().draw_calls().is_empty());
        assert!(offset(&backend, StreamId::QuadCompact).is_empty());
    }

    #[test]
    fn test_batch_overflow_uploads_without_drawing() {
        let mut backend = bound(StreamId::QuadCompact);
        backend.begin_batch();
        for _ in 0..5 {
            backend.batch_mesh(&Mesh::new(&quad()));
        }
        assert!(backend.gl().draw_calls().is_empty());
        assert_eq!(offset(&backend, StreamId::QuadCompact).num_verts, 16);
        assert_eq!(backend.batches().get(StreamId::QuadCompact).num_verts(), 4);
    }

    #[test]
    fn test_oversize_batch_mesh_goes_direct() {
        let mut backend = bound(StreamId::QuadCompact);
        let positions = [[0.0f32; 4]; 20];
        backend.begin_batch();
        backend.batch_mesh(&Mesh::new(&quad()));
        backend.batch_mesh(&Mesh::new(&positions));
        assert_eq!(offset(&backend, StreamId::QuadCompact).num_verts, 24);
        assert!(backend.batches().get(StreamId::QuadCompact).is_empty());
    }

    #[test]
    fn test_end_batch_advances_offset() {
        let mut backend = bound(StreamId::QuadCompact);
        backend.begin_batch();
        backend.batch_mesh(&Mesh::new(&quad()));
        backend.end_batch();
        assert_eq!(offset(&backend, StreamId::QuadCompact), DrawElements::new(4, 0, 6, 0));

        backend.begin_batch();
        backend.batch_mesh(&Mesh::new(&quad()));
        backend.end_batch();
        assert_eq!(offset(&backend, StreamId::QuadCompact), DrawElements::new(8, 0, 12, 0));
        let draws = backend.gl().draw_calls();
        assert_eq!(draws.len(), 2);
        assert!(matches!(
            draws[1],
            GlCall::DrawRangeElements { start: 4, end: 7, count: 6, first_elem: 6, .. }
        ));
    }

    #[test]
    fn test_stream_overflow_flushes_and_discards() {
        let mut backend = bound(StreamId::Generic);
        backend.set_vertex_attribs(VertexAttribs::POSITION | VertexAttribs::NORMAL);
        backend.bind_buffer(BufferBinding::Stream(StreamId::Generic), Primitive::Triangles);
        let positions = [[0.0f32; 4]; 40];
        let elems = [0u16, 1, 2, 0, 2, 3];
        let mesh = Mesh::new(&positions).with_elems(&elems);
        backend.upload_mesh(&mesh);
        assert_eq!(offset(&backend, StreamId::Generic).num_verts, 40);
        backend.gl_mut().clear_calls();

        backend.upload_mesh(&mesh);
        let calls = backend.gl().calls();
        let draw = calls.iter().position(GlCall::is_draw).unwrap();
        let discard = calls
            .iter()
            .position(|c| matches!(c, GlCall::InvalidateBuffer(_)))
            .unwrap();
        assert!(draw < discard);
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, GlCall::InvalidateBuffer(_)))
                .count(),
            2
        );
        assert_eq!(offset(&backend, StreamId::Generic), DrawElements::new(0, 40, 0, 6));
    }

    #[test]
    fn test_quad_stream_keeps_elements_on_discard() {
        let mut backend = bound(StreamId::QuadCompact);
        let positions = [[0.0f32; 4]; 40];
        backend.upload_mesh(&Mesh::new(&positions));
        backend.upload_mesh(&Mesh::new(&positions));
        let discards = backend
            .gl()
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::InvalidateBuffer(_)))
            .count();
        assert_eq!(discards, 1);
    }

    #[test]
    fn test_oversize_mesh_is_dropped() {
        let mut backend = bound(StreamId::QuadCompact);
        let positions = [[0.0f32; 4]; 68];
        backend.upload_mesh(&Mesh::new(&positions));
        assert_eq!(offset(&backend, StreamId::QuadCompact), DrawElements::default());
        assert!(backend.gl().draw_calls().is_empty());
        assert_eq!(backend.stats().draws, 0);
    }

    #[test]
    fn test_generic_elements_are_offset_to_destination() {
        let mut backend = bound(StreamId::Generic);
        backend.set_vertex_attribs(VertexAttribs::POSITION | VertexAttribs::NORMAL);
        backend.bind_buffer(BufferBinding::Stream(StreamId::Generic), Primitive::Triangles);
        let positions = quad();
        let elems = [0u16, 1, 2, 0, 2, 3];
        backend.upload_mesh(&Mesh::new(&positions).with_elems(&elems));
        backend.upload_mesh(&Mesh::new(&positions).with_elems(&elems));

        let stream = backend.streams().get(StreamId::Generic).unwrap();
        let data = backend
            .gl()
            .buffer_data(stream.buffer().element_buffer())
            .unwrap();
        let uploaded: Vec<u16> = data[..24]
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(uploaded, [0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }
}
