//! Structured logging setup. Telemetry export itself is out of scope
//! (`spec` §1); this only wires the process up to emit `tracing` events, the
//! same subscriber stack the teacher's binaries use.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber::fmt` subscriber filtered by `log_filter`
/// (falling back to the `RUST_LOG` environment variable convention via
/// [`EnvFilter`]). Call once, at process start.
pub fn init(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
