//! # Quadstream Graphics
//!
//! Geometry batching and GPU stream-buffer backend.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`RenderBackend`] - Context object that batches meshes into stream
//!   buffers and submits draws
//! - [`GlBackend`] - Trait over the graphics API entry points
//! - [`StateCache`] and [`AttribTracker`] - Redundant-call elimination
//! - [`StreamPool`] and [`BatchArena`] - Stream buffers and CPU staging
//! - [`DummyBackend`] - Recording backend for tests (feature `dummy`)
//!
//! ## Example
//!
//! ```ignore
//! use quadstream_graphics::{
//!     BackendConfig, BufferBinding, DummyBackend, Mesh, Primitive, RenderBackend, StreamId,
//!     VertexAttribs,
//! };
//!
//! let mut backend = RenderBackend::new(DummyBackend::new(), BackendConfig::default())?;
//! backend.begin_frame();
//! backend.set_vertex_attribs(VertexAttribs::COMPACT);
//! backend.bind_buffer(BufferBinding::Stream(StreamId::Quad), Primitive::Triangles);
//! backend.begin_batch();
//! backend.batch_mesh(&Mesh::new(&positions).with_texcoords(&st));
//! backend.end_batch();
//! backend.end_frame();
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod mesh;
pub mod profiling;
pub mod resources;
pub mod state;
pub mod types;

// Re-export main types for convenience
pub use backend::{Capabilities, GlBackend};
#[cfg(feature = "dummy")]
pub use backend::{DummyBackend, GlCall};
pub use config::BackendConfig;
pub use context::{BufferBinding, RenderBackend};
pub use draw::{DrawElements, FrameStats, InstancingStrategy};
pub use error::GraphicsError;
pub use mesh::{InstancePoint, Mesh, VertexAttribs, VertexFormat, VertexLayout};
pub use resources::{BatchArena, BatchStaging, MeshBuffer, StaticMeshBuffer, StreamId, StreamPool};
pub use state::{AttribTracker, StateCache};
pub use types::{
    BlitFilter, BufferId, ClearColor, ClearFlags, CullFace, FramebufferId, Primitive, Rect, StateBits,
    TextureId,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert!(backend.name() == "Dummy");
    }
}
