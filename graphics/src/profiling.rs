//! Profiling support via Tracy.
//!
//! Re-exports the CPU profiling macros from [`quadstream_core::profiling`].
//! Enable the `profiling` feature to compile the instrumentation in:
//!
//! ```toml
//! [dependencies]
//! quadstream-graphics = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! The backend marks frame boundaries in [`crate::RenderBackend::end_frame`]
//! and plots the per-frame draw and vertex counts.

pub use quadstream_core::profiling::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        frame_mark!();
        profile_scope!("test_scope");
        profile_function!();
        profile_plot!("test_value", 42.0);
    }
}
