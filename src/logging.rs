//! Logging setup for daxtab.
//!
//! The crate itself only emits `tracing` events; embedding binaries and test
//! harnesses can use this helper to get a sensible subscriber.

use tracing_subscriber::EnvFilter;

/// Initializes logging to stderr.
///
/// Respects `RUST_LOG` when set, defaulting to `info`. Calling this more than
/// once is an error in `tracing-subscriber`; embedders owning their own
/// subscriber should skip it.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
