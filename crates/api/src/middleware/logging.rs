//! Tracing subscriber setup.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Default filter directives for a given base level.
///
/// Sightings arrive continuously from every beacon node, so per-statement
/// query logging at the base level would drown the classification logs; sqlx
/// is capped at warn unless RUST_LOG overrides the whole filter.
fn filter_directives(level: &str) -> String {
    format!("{level},sqlx=warn")
}

/// Initializes the logging subsystem based on configuration.
///
/// `format = "json"` emits one structured object per event for log
/// shippers; any other value falls back to a compact human-readable form
/// for local runs.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_target(true))
            .init();
    }
}
