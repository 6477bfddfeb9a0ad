//! Logging initialization
//!
//! Wires `tracing` to stderr with an env-filter: `RUST_LOG` overrides the
//! default directive when set.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global subscriber. Repeated calls are a no-op.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
