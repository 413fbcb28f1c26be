//! Logging initialization for hosts embedding the translator.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

fn default_level() -> String {
    "info".to_owned()
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>);

/// Filter directive for a `-v` count: 0 keeps the configured level,
/// then info, debug, trace.
#[must_use]
pub fn directive(config: &LoggingConfig, verbosity: u8) -> String {
    match verbosity {
        0 => config.level.clone(),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

/// `RUST_LOG` wins; otherwise the directive derived from config and verbosity.
/// An unparsable directive falls back to `info`.
#[must_use]
pub fn build_filter(config: &LoggingConfig, verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(directive(config, verbosity)).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global `tracing` subscriber.
///
/// # Errors
/// Returns `LoggingError` if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) -> Result<(), LoggingError> {
    let filter = build_filter(config, verbosity);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json {
        builder.json().try_init().map_err(LoggingError)
    } else {
        builder.try_init().map_err(LoggingError)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        let cfg = LoggingConfig {
            level: "warn".to_owned(),
            json: false,
        };
        assert_eq!(directive(&cfg, 0), "warn");
        assert_eq!(directive(&cfg, 1), "info");
        assert_eq!(directive(&cfg, 2), "debug");
        assert_eq!(directive(&cfg, 7), "trace");
    }

    #[test]
    fn config_defaults() {
        let cfg: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggingConfig::default());
    }
}
