//! Logging configuration
//!
//! Installs a `tracing` subscriber with an env-filter and a pretty or compact
//! formatter writing to stderr, leaving stdout to command output.
//! `RUST_LOG` overrides the configured level.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log format style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level filter, e.g. "info" or "chinook_api=debug"
    pub level: String,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Subscriber installation failure
#[derive(Debug)]
pub struct LogInitError(String);

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to initialize logging: {}", self.0)
    }
}

impl std::error::Error for LogInitError {}

impl LogConfig {
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
        }
    }

    fn filter(&self) -> Result<EnvFilter, LogInitError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| LogInitError(format!("invalid level '{}': {}", self.level, e)))
    }

    /// Install the global subscriber. Fails if one is already installed.
    pub fn init(&self) -> Result<(), LogInitError> {
        let env_filter = self.filter()?;

        let result = match self.format {
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_fmt::layer().with_writer(std::io::stderr).pretty())
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_fmt::layer().with_writer(std::io::stderr).compact())
                .try_init(),
        };

        result.map_err(|e| LogInitError(e.to_string()))
    }
}
