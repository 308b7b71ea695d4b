//! Buffer types and descriptors.

use std::num::NonZeroU32;

use bitflags::bitflags;

/// Name of a buffer object owned by the graphics context.
///
/// Zero is never a valid buffer name; "no buffer bound" is expressed as
/// `Option<BufferId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(NonZeroU32);

impl BufferId {
    /// Wrap a raw buffer name. Returns `None` for zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Get the raw buffer name.
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

/// Name of a texture object owned by the graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Name of a framebuffer object. `FramebufferId::DEFAULT` is the window surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    /// The default (window) framebuffer.
    pub const DEFAULT: Self = Self(0);
}

/// Binding point a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer holds vertex attribute data.
        const VERTEX = 1 << 0;
        /// Buffer holds index data.
        const INDEX = 1 << 1;
        /// Contents are rewritten frequently (streamed).
        const STREAM = 1 << 2;
        /// Contents are written once and never changed.
        const STATIC = 1 << 3;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Binding target implied by the usage flags.
    pub fn target(&self) -> BufferTarget {
        if self.usage.contains(BufferUsage::INDEX) {
            BufferTarget::ElementArray
        } else {
            BufferTarget::Array
        }
    }
}
