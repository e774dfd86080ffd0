//! Telemetry and Observability
//!
//! Installs the `tracing-subscriber` pipeline used by the worker and CLI.
//! The active filter is resolved in precedence order: the `RUST_LOG`
//! environment variable, then the level passed in from the `--log` flag or
//! the config file. Debug builds log human-readable output for a terminal;
//! release builds emit JSON lines suitable for log shippers.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber at the given level.
///
/// Installs at most once per process; calling again after a subscriber is
/// in place is a no-op, which keeps tests that initialize repeatedly safe.
/// sqlx query logging is pinned to `warn` unless `RUST_LOG` overrides it.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{log_level},drover_engine={log_level},sqlx=warn"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    #[cfg(debug_assertions)]
    registry
        .with(fmt::layer().pretty().with_target(false))
        .try_init()
        .ok();

    #[cfg(not(debug_assertions))]
    registry
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .ok();
}
