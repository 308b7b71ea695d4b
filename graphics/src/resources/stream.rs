//! Stream buffers: backend-owned vertex/element buffers filled front to back.

use std::fmt;

use crate::backend::{Capabilities, GlBackend};
use crate::config::BackendConfig;
use crate::draw::DrawElements;
use crate::error::GraphicsError;
use crate::mesh::{elements, VertexAttribs, VertexFormat};

use super::buffer::MeshBuffer;

/// Element topology of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Arbitrary element lists, uploaded with the vertices.
    Generic,
    /// Fixed quad elements written once at creation.
    Quad,
}

/// One of the four stream buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamId {
    Generic,
    GenericCompact,
    Quad,
    QuadCompact,
}

impl StreamId {
    /// Number of streams.
    pub const COUNT: usize = 4;

    /// All streams in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Generic,
        Self::GenericCompact,
        Self::Quad,
        Self::QuadCompact,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> StreamKind {
        match self {
            Self::Generic | Self::GenericCompact => StreamKind::Generic,
            Self::Quad | Self::QuadCompact => StreamKind::Quad,
        }
    }

    pub fn is_quad(self) -> bool {
        self.kind() == StreamKind::Quad
    }

    pub fn is_compact(self) -> bool {
        matches!(self, Self::GenericCompact | Self::QuadCompact)
    }

    /// The compact stream of the same kind.
    pub fn compact(self) -> Self {
        match self.kind() {
            StreamKind::Generic => Self::GenericCompact,
            StreamKind::Quad => Self::QuadCompact,
        }
    }

    /// Channels stored in this stream.
    pub fn attribs(self) -> VertexAttribs {
        if self.is_compact() {
            VertexAttribs::COMPACT
        } else {
            VertexAttribs::STREAM
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Generic => "stream_generic",
            Self::GenericCompact => "stream_generic_compact",
            Self::Quad => "stream_quad",
            Self::QuadCompact => "stream_quad_compact",
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stream buffer and the occupied range awaiting a draw.
#[derive(Debug)]
pub struct Stream {
    id: StreamId,
    buffer: MeshBuffer,
    /// Already drawn prefix plus the pending range.
    pub(crate) offset: DrawElements,
}

impl Stream {
    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn buffer(&self) -> &MeshBuffer {
        &self.buffer
    }

    /// Occupied range: `first_*` is the drawn prefix, `num_*` the pending data.
    pub fn offset(&self) -> DrawElements {
        self.offset
    }

    /// Orphan the stream storage and restart at offset zero.
    ///
    /// Quad streams keep their element buffer, which never changes.
    pub fn discard<B: GlBackend>(&mut self, gl: &mut B) {
        self.buffer.discard_vertices(gl);
        if !self.id.is_quad() {
            self.buffer.discard_elements(gl);
        }
        self.offset = DrawElements::default();
    }
}

/// The four stream buffers.
///
/// Streams survive registration sequences: a registration creates missing
/// streams and leaves existing ones intact.
#[derive(Debug, Default)]
pub struct StreamPool {
    streams: [Option<Stream>; StreamId::COUNT],
    registration_sequence: u32,
}

impl StreamPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create any missing stream. Quad streams get their element pattern for
    /// the whole vertex capacity.
    pub fn register<B: GlBackend>(
        &mut self,
        gl: &mut B,
        config: &BackendConfig,
        capabilities: &Capabilities,
    ) -> Result<(), GraphicsError> {
        self.registration_sequence = self.registration_sequence.wrapping_add(1);

        let half_float = if capabilities.half_float_vertex {
            VertexAttribs::HALF_FLOAT_CAPABLE
        } else {
            VertexAttribs::empty()
        };

        for id in StreamId::ALL {
            if self.streams[id.index()].is_some() {
                continue;
            }

            let format = VertexFormat::new(id.attribs(), half_float);
            let buffer = MeshBuffer::create(
                gl,
                id.label(),
                format,
                config.stream_vertices,
                config.stream_elements,
                config.stream_instances,
            )?;

            if id.is_quad() {
                let mut quad_elems = Vec::new();
                elements::build_quad_elements(0, config.stream_vertices, &mut quad_elems);
                buffer.upload_elements(gl, 0, &quad_elems);
            }

            log::debug!(
                "Created {} ({} verts, {} elems, stride {})",
                id,
                config.stream_vertices,
                config.stream_elements,
                buffer.format().stride()
            );

            self.streams[id.index()] = Some(Stream {
                id,
                buffer,
                offset: DrawElements::default(),
            });
        }

        Ok(())
    }

    /// Registration sequence of the last [`StreamPool::register`].
    pub fn registration_sequence(&self) -> u32 {
        self.registration_sequence
    }

    /// Returns true if every stream exists.
    pub fn is_complete(&self) -> bool {
        self.streams.iter().all(Option::is_some)
    }

    pub fn get(&self, id: StreamId) -> Option<&Stream> {
        self.streams[id.index()].as_ref()
    }

    pub fn get_mut(&mut self, id: StreamId) -> Option<&mut Stream> {
        self.streams[id.index()].as_mut()
    }

    /// Drop every stream without touching the context, used after the
    /// context has already released its objects.
    pub fn forget(&mut self) {
        for stream in &mut self.streams {
            if let Some(stream) = stream.take() {
                log::debug!("Forgot {}", stream.id);
            }
        }
    }

    /// Delete every stream's buffers.
    pub fn destroy<B: GlBackend>(&mut self, gl: &mut B) {
        for stream in &mut self.streams {
            if let Some(stream) = stream.take() {
                stream.buffer.destroy(gl);
            }
        }
    }
}
