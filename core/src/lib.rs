//! # Quadstream Core
//!
//! Basic utilities shared by the Quadstream crates: math aliases and
//! profiling instrumentation.

pub mod math;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
