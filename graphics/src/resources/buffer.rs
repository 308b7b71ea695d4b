//! Vertex/element buffer pairs.

use crate::backend::GlBackend;
use crate::error::GraphicsError;
use crate::mesh::{InstancePoint, VertexFormat};
use crate::types::{BufferDescriptor, BufferId, BufferUsage};

/// A vertex buffer and an element buffer sharing one [`VertexFormat`].
///
/// Owns both buffer objects; call [`MeshBuffer::destroy`] to release them.
#[derive(Debug)]
pub struct MeshBuffer {
    vertex: BufferId,
    elements: BufferId,
    format: VertexFormat,
    vertex_capacity: usize,
    element_capacity: usize,
    instance_capacity: usize,
}

impl MeshBuffer {
    /// Create the buffer pair. The vertex buffer includes an instance region
    /// when `instance_capacity` is non-zero.
    pub fn create<B: GlBackend>(
        gl: &mut B,
        label: &str,
        format: VertexFormat,
        vertex_capacity: usize,
        element_capacity: usize,
        instance_capacity: usize,
    ) -> Result<Self, GraphicsError> {
        let format = if instance_capacity > 0 {
            format.with_instance_region(vertex_capacity)
        } else {
            format
        };

        let vertex_size = format.buffer_size(vertex_capacity, instance_capacity);
        let vertex = gl.create_buffer(
            &BufferDescriptor::new(
                vertex_size as u64,
                BufferUsage::VERTEX | BufferUsage::STREAM,
            )
            .with_label(format!("{label}_verts")),
        )?;

        let element_size = element_capacity * std::mem::size_of::<u16>();
        let elements = match gl.create_buffer(
            &BufferDescriptor::new(element_size as u64, BufferUsage::INDEX | BufferUsage::STREAM)
                .with_label(format!("{label}_elems")),
        ) {
            Ok(elements) => elements,
            Err(err) => {
                gl.delete_buffer(vertex);
                return Err(err);
            }
        };

        Ok(Self {
            vertex,
            elements,
            format,
            vertex_capacity,
            element_capacity,
            instance_capacity,
        })
    }

    /// Delete both buffer objects.
    pub fn destroy<B: GlBackend>(self, gl: &mut B) {
        gl.delete_buffer(self.vertex);
        gl.delete_buffer(self.elements);
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex
    }

    pub fn element_buffer(&self) -> BufferId {
        self.elements
    }

    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    pub fn element_capacity(&self) -> usize {
        self.element_capacity
    }

    pub fn instance_capacity(&self) -> usize {
        self.instance_capacity
    }

    /// Write interleaved vertex bytes starting at vertex `first_vert`.
    pub fn upload_vertices<B: GlBackend>(&self, gl: &mut B, first_vert: usize, bytes: &[u8]) {
        debug_assert_eq!(bytes.len() % self.format.stride(), 0);
        gl.buffer_sub_data(self.vertex, first_vert * self.format.stride(), bytes);
    }

    /// Write elements starting at element `first_elem`.
    pub fn upload_elements<B: GlBackend>(&self, gl: &mut B, first_elem: usize, elems: &[u16]) {
        gl.buffer_sub_data(
            self.elements,
            first_elem * std::mem::size_of::<u16>(),
            bytemuck::cast_slice(elems),
        );
    }

    /// Write instance transforms at the start of the instance region.
    ///
    /// Does nothing when the buffer has no instance region.
    pub fn upload_instances<B: GlBackend>(&self, gl: &mut B, instances: &[InstancePoint]) {
        if let Some(offset) = self.format.instances_offset() {
            debug_assert!(instances.len() <= self.instance_capacity);
            gl.buffer_sub_data(self.vertex, offset, bytemuck::cast_slice(instances));
        }
    }

    /// Orphan the vertex storage.
    pub fn discard_vertices<B: GlBackend>(&self, gl: &mut B) {
        gl.invalidate_buffer(self.vertex);
    }

    /// Orphan the element storage.
    pub fn discard_elements<B: GlBackend>(&self, gl: &mut B) {
        gl.invalidate_buffer(self.elements);
    }

    /// Handles of this pair as a static binding.
    pub fn as_static(&self) -> StaticMeshBuffer {
        StaticMeshBuffer {
            vertex: self.vertex,
            elements: self.elements,
            format: self.format,
        }
    }
}

/// Caller-owned vertex/element buffers drawn without streaming.
///
/// The format's instance region, if any, must already hold the instance
/// transforms the caller wants drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticMeshBuffer {
    pub vertex: BufferId,
    pub elements: BufferId,
    pub format: VertexFormat,
}

impl StaticMeshBuffer {
    /// Describe an existing buffer pair.
    pub fn new(vertex: BufferId, elements: BufferId, format: VertexFormat) -> Self {
        Self {
            vertex,
            elements,
            format,
        }
    }

    /// Returns true if the vertex buffer carries per-instance transforms.
    pub fn has_instances(&self) -> bool {
        self.format.instances_offset().is_some()
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use crate::mesh::VertexAttribs;

    fn compact() -> VertexFormat {
        VertexFormat::new(VertexAttribs::COMPACT, VertexAttribs::empty())
    }

    #[test]
    fn test_sizes_include_instance_region() {
        let mut gl = DummyBackend::new();
        let buffer = MeshBuffer::create(&mut gl, "test", compact(), 16, 24, 4).unwrap();
        let stride = buffer.format().stride();
        assert_eq!(
            gl.buffer_data(buffer.vertex_buffer()).map(<[u8]>::len),
            Some(16 * stride + 4 * InstancePoint::SIZE)
        );
        assert_eq!(gl.buffer_data(buffer.element_buffer()).map(<[u8]>::len), Some(48));
        assert!(buffer.as_static().has_instances());
    }

    #[test]
    fn test_failed_creation_leaks_nothing() {
        let mut gl = DummyBackend::new();
        gl.set_fail_buffer_creation(true);
        assert!(MeshBuffer::create(&mut gl, "test", compact(), 4, 6, 0).is_err());
        assert_eq!(gl.live_buffers(), 0);
    }

    #[test]
    fn test_upload_offsets() {
        let mut gl = DummyBackend::new();
        let buffer = MeshBuffer::create(&mut gl, "test", compact(), 4, 6, 0).unwrap();
        buffer.upload_elements(&mut gl, 2, &[7, 8]);
        let elems = gl.buffer_data(buffer.element_buffer()).unwrap();
        assert_eq!(&elems[4..8], bytemuck::cast_slice::<u16, u8>(&[7, 8]));

        buffer.destroy(&mut gl);
        assert_eq!(gl.live_buffers(), 0);
    }
}
