//! Draw descriptors, instancing strategies and frame statistics.

mod instancing;
mod stats;

pub use instancing::InstancingStrategy;
pub use stats::FrameStats;

/// Range of a vertex/element buffer pair to draw.
///
/// Also describes the occupied region of a stream and the pending contents
/// of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawElements {
    pub first_vert: usize,
    pub num_verts: usize,
    pub first_elem: usize,
    pub num_elems: usize,
    /// Number of instances, 0 for a non-instanced draw.
    pub num_instances: usize,
}

impl DrawElements {
    /// Create a non-instanced draw range.
    pub fn new(first_vert: usize, num_verts: usize, first_elem: usize, num_elems: usize) -> Self {
        Self {
            first_vert,
            num_verts,
            first_elem,
            num_elems,
            num_instances: 0,
        }
    }

    /// Set the instance count.
    pub fn with_instances(mut self, num_instances: usize) -> Self {
        self.num_instances = num_instances;
        self
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.num_verts == 0 || self.num_elems == 0
    }

    /// One past the last vertex.
    pub fn end_vert(&self) -> usize {
        self.first_vert + self.num_verts
    }

    /// One past the last element.
    pub fn end_elem(&self) -> usize {
        self.first_elem + self.num_elems
    }
}
