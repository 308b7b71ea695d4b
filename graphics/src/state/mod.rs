//! Redundant-call elimination for the graphics context.
//!
//! - [`StateCache`] - fixed-function state, bindings, scissor and viewport
//! - [`AttribTracker`] - enabled vertex attribute slots and their pointers

mod attribs;
mod cache;

pub use attribs::AttribTracker;
pub use cache::{StateCache, DEPTH_RANGE_BIAS, STENCIL_CLEAR_VALUE};
