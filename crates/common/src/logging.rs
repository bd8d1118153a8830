//! Logging setup.
//!
//! Components log through `tracing` macros. The subscriber is built here from
//! [`LoggingConfig`] and can either be installed process-wide with [`init`]
//! or scoped to a block with `tracing::subscriber::with_default`.

use serde::Deserialize;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, layer::SubscriberExt};

use crate::{AppError, AppResult};

/// Minimum level a record must have to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Recoverable failures.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Whether a record at `level` passes this threshold.
    #[must_use]
    pub fn allows(self, level: Self) -> bool {
        level >= self
    }

    /// Lowercase name, as used in filter directives.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Convert to the `tracing` filter.
    #[must_use]
    pub const fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(AppError::Config(format!("Unknown log level: {other}"))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level for civicpulse crates.
    #[serde(default)]
    pub level: LogLevel,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Filter directives for this configuration.
    ///
    /// `RUST_LOG`, when set, takes precedence.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse_lossy(self.directives())
        })
    }

    fn directives(&self) -> String {
        let level = self.level.as_str();
        format!("civicpulse={level},tower_http={level},sqlx=warn")
    }
}

/// Build a subscriber for `config` without installing it.
#[must_use]
pub fn build_subscriber(config: &LoggingConfig) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    if config.json {
        Box::new(registry.with(tracing_subscriber::fmt::layer().json()))
    } else {
        Box::new(registry.with(tracing_subscriber::fmt::layer()))
    }
}

/// Install the subscriber for `config` as the global default.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    tracing::subscriber::set_global_default(build_subscriber(config))
        .map_err(|e| AppError::Config(format!("Failed to install logger: {e}")))
}
