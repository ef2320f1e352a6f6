//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing.
///
/// Logs go to stderr so command output on stdout stays pipeable; the
/// default level is `info`, overridable via `RUST_LOG`. Safe to call more
/// than once (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
