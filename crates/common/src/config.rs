//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::logging::LoggingConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Backend environment selection for API clients.
    pub backend: BackendConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Timeline generation configuration.
    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// API key clients must send. Unset disables the check.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Which backend deployment clients talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendEnvironment {
    /// Development and testing deployment.
    #[default]
    Test,
    /// Live deployment.
    Production,
}

/// Base URL and API key of one backend deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEndpoint {
    /// Base URL of the API, e.g. `http://localhost:3000/api`.
    pub url: String,
    /// Public API key sent with every request.
    #[serde(default)]
    pub api_key: String,
}

/// Backend configuration: one endpoint per environment plus the selector.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Selected environment.
    #[serde(default)]
    pub environment: BackendEnvironment,
    /// Test deployment.
    pub test: BackendEndpoint,
    /// Production deployment.
    pub production: BackendEndpoint,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// The endpoint of the selected environment.
    #[must_use]
    pub const fn active(&self) -> &BackendEndpoint {
        match self.environment {
            BackendEnvironment::Test => &self.test,
            BackendEnvironment::Production => &self.production,
        }
    }
}

/// Timeline generation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineConfig {
    /// Fixed seed for the timeline random source. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `CIVICPULSE_ENV`)
    /// 4. Environment variables with `CIVICPULSE__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("CIVICPULSE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CIVICPULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CIVICPULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
