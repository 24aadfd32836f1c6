//! `tracing_subscriber::EnvFilter`-based init helper for binaries and
//! tests that want human-readable output (SPEC_FULL.md §1.1). Library
//! crates in this workspace never install a subscriber themselves; only
//! this top-level crate, and only on request, does.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber reading `RUST_LOG` (defaulting
/// to `info`), writing human-readable lines to stderr. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
