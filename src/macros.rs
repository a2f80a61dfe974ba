//! Per-tick logging macros
//!
//! The face and audio producers log every reading in debug builds.
//! In release builds these expand to nothing so the ~5 Hz loops stay quiet.

/// Debug-level log for per-tick readings - only active in debug builds
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! perf_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// No-op in release builds
#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! perf_debug {
    ($($arg:tt)*) => {};
}
