//! Common utilities for backend integration tests.
//!
//! Everything runs against the recording [`DummyBackend`], so the tests can
//! inspect the exact calls and buffer contents a sequence of operations
//! produces.

#![allow(dead_code)]

use quadstream_graphics::{
    BackendConfig, BufferBinding, Capabilities, DummyBackend, GlCall, Primitive, RenderBackend,
    StreamId, VertexAttribs,
};

/// Install a test logger once; later calls are ignored.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Backend Construction
// ============================================================================

/// The backend type every test drives.
pub type Backend = RenderBackend<DummyBackend>;

/// Capability sets the tests are parameterised over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Every optional feature.
    Full,
    /// Instanced draws without vertex divisors.
    UniformInstancing,
    /// No optional features.
    Minimal,
}

impl Profile {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Profile::Full => Capabilities::all(),
            Profile::UniformInstancing => Capabilities::all().with_instanced_arrays(false),
            Profile::Minimal => Capabilities::minimal(),
        }
    }
}

/// Stream and batch capacities small enough to overflow in a test.
pub fn small_config() -> BackendConfig {
    BackendConfig::default()
        .with_stream_capacity(64, 96, 8)
        .with_batch_capacity(32, 48)
}

/// Create a backend, panicking on failure.
pub fn create_backend(profile: Profile, config: BackendConfig) -> Backend {
    init_logger();
    let gl = DummyBackend::with_capabilities(profile.capabilities());
    RenderBackend::new(gl, config).expect("backend creation")
}

/// Create a backend inside a frame with `stream` bound for triangles.
pub fn bound_backend(
    profile: Profile,
    config: BackendConfig,
    attribs: VertexAttribs,
    stream: StreamId,
) -> Backend {
    let mut backend = create_backend(profile, config);
    backend.begin_frame();
    backend.set_vertex_attribs(attribs);
    backend.bind_buffer(BufferBinding::Stream(stream), Primitive::Triangles);
    backend.gl_mut().clear_calls();
    backend
}

// ============================================================================
// Geometry
// ============================================================================

/// Positions of `count` unit quads laid out along x.
pub fn quad_positions(count: usize) -> Vec<[f32; 4]> {
    (0..count)
        .flat_map(|i| {
            let x = i as f32 * 2.0;
            [
                [x, 0.0, 0.0, 1.0],
                [x + 1.0, 0.0, 0.0, 1.0],
                [x + 1.0, 1.0, 0.0, 1.0],
                [x, 1.0, 0.0, 1.0],
            ]
        })
        .collect()
}

/// Texture coordinates matching [`quad_positions`].
pub fn quad_texcoords(count: usize) -> Vec<[f32; 2]> {
    (0..count)
        .flat_map(|_| [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
        .collect()
}

/// Opaque white per-vertex colours.
pub fn white(num_verts: usize) -> Vec<[u8; 4]> {
    vec![[255; 4]; num_verts]
}

/// A single triangle's positions offset by `z`.
pub fn triangle_positions(z: f32) -> Vec<[f32; 4]> {
    vec![
        [0.0, 0.0, z, 1.0],
        [1.0, 0.0, z, 1.0],
        [0.0, 1.0, z, 1.0],
    ]
}

// ============================================================================
// Inspection
// ============================================================================

/// Decode a native-endian element buffer.
pub fn decode_elements(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect()
}

/// Vertex bytes and elements held by `stream`.
pub fn stream_contents(backend: &Backend, stream: StreamId) -> (Vec<u8>, Vec<u16>) {
    let buffer = backend
        .streams()
        .get(stream)
        .expect("stream registered")
        .buffer();
    let vertices = backend
        .gl()
        .buffer_data(buffer.vertex_buffer())
        .expect("vertex buffer")
        .to_vec();
    let elements = backend
        .gl()
        .buffer_data(buffer.element_buffer())
        .map(decode_elements)
        .expect("element buffer");
    (vertices, elements)
}

/// Recorded draw calls.
pub fn draws(backend: &Backend) -> Vec<GlCall> {
    backend.gl().draw_calls()
}

/// Number of recorded buffer invalidations.
pub fn invalidations(backend: &Backend) -> usize {
    backend
        .gl()
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::InvalidateBuffer(_)))
        .count()
}
