//! Common utilities and shared types for civicpulse.
//!
//! This crate provides foundational components used across all civicpulse crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Logging**: Level-thresholded `tracing` subscribers via [`logging`]
//!
//! # Example
//!
//! ```no_run
//! use civicpulse_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     civicpulse_common::logging::init(&config.logging)?;
//!     let id_gen = IdGenerator::new();
//!     tracing::info!(id = %id_gen.generate(), "Generated ID");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod logging;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use logging::{LogLevel, LoggingConfig};
