//! Configuration management system for transferq
//!
//! This crate loads the settings of the transfer manager and its binary from
//! layered sources: built-in defaults, an optional YAML/TOML/JSON file and
//! `TRANSFERQ`-prefixed environment variables.
//!
//! # Examples
//!
//! ```rust
//! use transferq_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .env("TRANSFERQ")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Wake interval: {:?}", config.scheduler.wake_interval.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use transferq_types::WaitDuration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// File name of the durable task store when no path is configured
pub const DEFAULT_STORE_FILE: &str = "copy_tasks.json";

/// Accepted values of `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for transferq
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling loop configuration
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    /// Durable store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every value against its accepted range
    pub fn validate(&self) -> ConfigResult<()> {
        self.scheduler
            .wake_interval
            .validate()
            .map_err(|message| ConfigError::invalid("scheduler.wake_interval", message))?;
        self.scheduler
            .stop_timeout
            .validate()
            .map_err(|message| ConfigError::invalid("scheduler.stop_timeout", message))?;

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

/// Scheduling loop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Upper bound on how long the loop sleeps without a signal before it
    /// re-checks for a stop request
    #[serde(default)]
    pub wake_interval: WaitDuration,
    /// How long `stop` waits for the loop to exit
    #[serde(default)]
    pub stop_timeout: WaitDuration,
}

/// Durable store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Location of the JSON store file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve the store location
    ///
    /// Falls back to [`DEFAULT_STORE_FILE`] next to the running executable,
    /// or in the working directory when the executable path is unknown.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_STORE_FILE)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatting
    #[serde(default)]
    pub json_format: bool,
    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
