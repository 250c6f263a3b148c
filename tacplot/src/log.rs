//! Logging bootstrap for tacplot binaries.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the binary's decision. `RUST_LOG` overrides the passed filter.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber with `filter` as the default
/// directive. Safe to call more than once; later calls are no-ops.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
