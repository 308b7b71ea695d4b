//! Profiling support via Tracy.
//!
//! Instrumentation is compiled in only with the `profiling` Cargo feature:
//!
//! ```toml
//! [dependencies]
//! quadstream-core = { version = "0.1", features = ["profiling"] }
//! ```
//!
//! Without the feature every macro expands to nothing.
//!
//! ```ignore
//! use quadstream_core::profiling::{frame_mark, profile_function, profile_scope};
//!
//! fn flush_batch() {
//!     profile_function!();
//!     {
//!         profile_scope!("interleave");
//!         // ...
//!     }
//! }
//!
//! loop {
//!     // ... render frame ...
//!     frame_mark!();
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{
    self, frame_mark as tracy_frame_mark, plot as tracy_plot, span, Client, Span,
};

/// Mark the end of a frame for Tracy's frame analysis.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! frame_mark {
    () => {
        $crate::profiling::tracy_frame_mark()
    };
}

/// Mark the end of a frame (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! frame_mark {
    () => {};
}

/// Create a profiling span that lasts until the end of the current scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span covering the whole enclosing function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a value over time in Tracy, e.g. per-frame draw counts.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

pub use frame_mark;
pub use profile_function;
pub use profile_plot;
pub use profile_scope;

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        frame_mark!();
        profile_scope!("test_scope");
        profile_function!();
        profile_plot!("test_value", 42);
    }
}
