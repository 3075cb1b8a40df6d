// Logging setup for applications embedding barber-link.
//
// The crate itself only emits through the `log` facade. `init_logging`
// installs a tracing-subscriber fmt layer and bridges `log` records into it
// with `tracing_log::LogTracer`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{BarberLinkError, Result};

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// HTTP stack crates that are chatty at debug level.
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("reqwest", "warn"),
    ("rustls", "warn"),
    ("h2", "warn"),
];

/// Build the `EnvFilter` from the base level plus the noisy-crate overrides.
///
/// `RUST_LOG`, when set, replaces the configured level.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let base = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| level.to_string());

    let mut directives = vec![base];
    for (target, lvl) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str).map_err(|e| {
        BarberLinkError::ConfigurationError(format!(
            "Invalid tracing filter '{}': {}",
            filter_str, e
        ))
    })
}

/// Initialize logging to stderr.
///
/// Fails with `ConfigurationError` if the level is not a valid filter or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(&config.level)?;

    // ok() in case a logger is already set
    tracing_log::LogTracer::init().ok();

    let layer = match LogFormat::parse(&config.format) {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        BarberLinkError::ConfigurationError(format!("Logging already initialized: {}", e))
    })?;

    tracing::trace!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
