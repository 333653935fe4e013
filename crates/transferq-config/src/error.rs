//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Why configuration could not be loaded or saved
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file is missing or unreadable
    #[error("cannot read config file '{}': {source}", .path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// The configuration file could not be written
    #[error("cannot write config file '{}': {source}", .path.display())]
    Write {
        /// Target file
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// A layer could not be merged or deserialized
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// A value is outside its accepted range
    #[error("invalid value for '{key}': {message}")]
    Invalid {
        /// Dotted path of the offending setting
        key: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// The configuration could not be encoded in the requested format
    #[error("cannot encode configuration as {format}: {message}")]
    Encode {
        /// Target format
        format: &'static str,
        /// Encoder message
        message: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }

    pub(crate) fn encode(format: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Encode {
            format,
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for transferq_types::Error {
    fn from(error: ConfigError) -> Self {
        Self::config(error.to_string())
    }
}
