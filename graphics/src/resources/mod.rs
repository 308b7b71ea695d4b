//! GPU buffers owned or referenced by the backend.
//!
//! - [`MeshBuffer`] - vertex/element buffer pair with a [`VertexFormat`]
//! - [`StaticMeshBuffer`] - caller-owned buffer pair drawn in place
//! - [`StreamPool`] - the four stream buffers filled front to back
//! - [`BatchArena`] - per-stream CPU staging meshes
//!
//! [`VertexFormat`]: crate::mesh::VertexFormat

mod batch;
mod buffer;
mod stream;

pub use batch::{BatchArena, BatchStaging};
pub use buffer::{MeshBuffer, StaticMeshBuffer};
pub use stream::{Stream, StreamId, StreamKind, StreamPool};
