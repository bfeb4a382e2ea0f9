//! Tracing subscriber initialization.
//!
//! The filter comes from `RUST_LOG` (default `info`); `[logging] format`
//! picks between human-readable and JSON output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};

/// Build the `EnvFilter`, falling back to `info` when `RUST_LOG` is unset
/// or invalid.
pub fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Install the global tracing subscriber. Call once, before any tracing
/// calls.
pub fn init(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(env_filter());

    match config.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
    }
}
