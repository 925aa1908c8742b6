//! Tracing subscriber setup.

use crate::config::LogConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when the configured level is empty.
pub const DEFAULT_FILTER: &str = "info";

/// Filter for `config`, unless `RUST_LOG` holds a non-empty valid filter.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(rust_log.as_deref(), config)
}

fn build_filter(rust_log: Option<&str>, config: &LogConfig) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }
    let level = if config.level.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        config.level.as_str()
    };
    EnvFilter::new(level)
}

/// Install the global subscriber. Logs go to stderr so stdout stays machine-readable.
pub fn init_logging(config: &LogConfig) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console_layer)
        .init();
}
