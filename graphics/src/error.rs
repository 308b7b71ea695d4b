//! Graphics error types.

use thiserror::Error;

/// Errors that can occur in the streaming backend.
///
/// Capacity overflow and invalid bindings are handled in place (flush, drop or
/// no-op) and never surface here; these variants cover resource creation and
/// configuration problems only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Failed to create a GPU resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The graphics context was lost; see
    /// [`RenderBackend::forget_streams`](crate::RenderBackend::forget_streams).
    #[error("graphics context lost")]
    ContextLost,
    /// An invalid configuration or parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
