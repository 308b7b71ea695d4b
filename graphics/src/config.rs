//! Capacity limits and debug switches for the streaming backend.

use crate::error::GraphicsError;
use crate::mesh::elements::quad_element_count;

/// Largest vertex count addressable by 16-bit elements.
pub const MAX_ELEMENT_ADDRESSABLE_VERTS: usize = u16::MAX as usize + 1;

/// Configuration of a [`RenderBackend`](crate::RenderBackend).
///
/// Capacities are fixed for the lifetime of the backend; exceeding them
/// flushes or drops geometry, buffers never grow.
///
/// # Example
///
/// ```ignore
/// let config = BackendConfig::default()
///     .with_stream_capacity(16384, 98304, 4096)
///     .with_max_uniform_instances(128);
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendConfig {
    /// Vertices per stream buffer.
    pub stream_vertices: usize,
    /// Elements per stream buffer.
    pub stream_elements: usize,
    /// Instances per stream buffer instance region.
    pub stream_instances: usize,
    /// Vertices per batch staging mesh.
    pub batch_vertices: usize,
    /// Elements per batch staging mesh.
    pub batch_elements: usize,
    /// Instances per draw when transforms are pushed as uniforms.
    pub max_uniform_instances: usize,
    /// Debug switch: when false no draw reaches the context.
    pub draw_elements: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            stream_vertices: 8192,
            stream_elements: 8192 * 6,
            stream_instances: 8192,
            batch_vertices: 4096,
            batch_elements: 4096 * 6,
            max_uniform_instances: 40,
            draw_elements: true,
        }
    }
}

impl BackendConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stream capacities.
    pub fn with_stream_capacity(mut self, vertices: usize, elements: usize, instances: usize) -> Self {
        self.stream_vertices = vertices;
        self.stream_elements = elements;
        self.stream_instances = instances;
        self
    }

    /// Set the batch staging capacities.
    pub fn with_batch_capacity(mut self, vertices: usize, elements: usize) -> Self {
        self.batch_vertices = vertices;
        self.batch_elements = elements;
        self
    }

    /// Set the instance limit of uniform-driven instanced draws.
    pub fn with_max_uniform_instances(mut self, instances: usize) -> Self {
        self.max_uniform_instances = instances;
        self
    }

    /// Enable or suppress draws.
    pub fn with_draw_elements(mut self, enabled: bool) -> Self {
        self.draw_elements = enabled;
        self
    }

    /// Check the capacities are usable.
    pub fn validate(&self) -> Result<(), GraphicsError> {
        let non_zero = [
            ("stream_vertices", self.stream_vertices),
            ("stream_elements", self.stream_elements),
            ("stream_instances", self.stream_instances),
            ("batch_vertices", self.batch_vertices),
            ("batch_elements", self.batch_elements),
            ("max_uniform_instances", self.max_uniform_instances),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(GraphicsError::InvalidParameter(format!(
                "{name} must be non-zero"
            )));
        }

        if self.stream_vertices > MAX_ELEMENT_ADDRESSABLE_VERTS {
            return Err(GraphicsError::InvalidParameter(format!(
                "stream_vertices ({}) exceeds the 16-bit element range ({})",
                self.stream_vertices, MAX_ELEMENT_ADDRESSABLE_VERTS
            )));
        }

        if self.batch_vertices > self.stream_vertices || self.batch_elements > self.stream_elements
        {
            return Err(GraphicsError::InvalidParameter(format!(
                "batch capacity ({} verts, {} elems) exceeds stream capacity ({} verts, {} elems)",
                self.batch_vertices, self.batch_elements, self.stream_vertices, self.stream_elements
            )));
        }

        let quad_elements = quad_element_count(self.stream_vertices);
        if quad_elements > self.stream_elements {
            return Err(GraphicsError::InvalidParameter(format!(
                "stream_elements ({}) cannot hold the quad pattern ({})",
                self.stream_elements, quad_elements
            )));
        }

        Ok(())
    }
}
