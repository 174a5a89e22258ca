//! Tracing setup: structured logging with event types.

pub mod events;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "BEACON_LOG";

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `BEACON_LOG` environment variable for filtering. Defaults to
/// `debug` when `debug` is set, `info` otherwise. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init();
}
