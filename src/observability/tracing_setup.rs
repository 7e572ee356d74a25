//! Structured logging controlled by `RUST_LOG` (default `warn`).
//!
//! Log levels follow the teacher's convention: `error!` for actual
//! failures affecting results, `warn!` for recoverable issues, `info!` for
//! phase-level progress (orchestrator phase transitions, category
//! start/finish), `debug!` for per-job lifecycle, `trace!` for retry/
//! back-off attempts.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Call once, at process start.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// Initialize with an explicit filter string, for tests or programmatic use.
pub fn init_tracing_with_filter(filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(filter))
        .try_init();
}
