// Process-wide tracing subscriber whose level can be changed at runtime.
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the subscriber with the configured level.
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    init_tracing_with_level(&logging.level)
}

/// Install the subscriber. `RUST_LOG`, when set and parseable, wins over
/// `level`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing_with_level(level: &str) -> bool {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        Err(_) => EnvFilter::new(level),
    };

    let (filter_layer, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if installed {
        let _ = FILTER_HANDLE.set(handle);
    }
    installed
}

/// Swap the active filter for `level`. No-op before [`init_tracing`].
pub fn apply_logging_level(level: &str) {
    let Some(handle) = FILTER_HANDLE.get() else {
        return;
    };
    if let Err(e) = handle.modify(|filter| *filter = EnvFilter::new(level)) {
        tracing::warn!(error = %e, level, "failed to apply logging level");
    }
}
