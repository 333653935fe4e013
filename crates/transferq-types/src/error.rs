//! Error types and handling for transferq
//!
//! This module provides the error taxonomy shared by every transferq crate:
//! enumeration failures, per-file copy failures, durable store failures and
//! configuration problems.

use std::path::PathBuf;

/// Main error type for transferq operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Source directory of a submission is missing
    #[error("Source location {} does not exist", .path.display())]
    SourceNotFound {
        /// Path that was expected to be a directory
        path: PathBuf,
    },

    /// Destination directory of a submission is missing
    #[error("Destination location {} does not exist", .path.display())]
    DestinationNotFound {
        /// Path that was expected to be a directory
        path: PathBuf,
    },

    /// Copying a single file failed
    #[error("Failed to copy '{source_file}' to '{destination_file}': {message}")]
    Copy {
        /// Source file
        source_file: String,
        /// Destination file
        destination_file: String,
        /// Underlying failure
        message: String,
    },

    /// Durable store failure
    #[error("Task store error: {message}")]
    Store {
        /// Error message describing the store failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {millis} ms")]
    Timeout {
        /// Number of milliseconds after which the operation timed out
        millis: u64,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// A submitted directory pair could not be enumerated
    Enumeration,
    /// A single file copy failed
    Copy,
    /// Durable store errors
    Store,
    /// Configuration errors
    Config,
    /// Timeout
    Timeout,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::SourceNotFound { .. } | Self::DestinationNotFound { .. } => {
                ErrorKind::Enumeration
            }
            Self::Copy { .. } => ErrorKind::Copy,
            Self::Store { .. } => ErrorKind::Store,
            Self::Config { .. } => ErrorKind::Config,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Create a new copy error for one file
    pub fn copy<S: Into<String>>(
        source: impl Into<String>,
        destination: impl Into<String>,
        message: S,
    ) -> Self {
        Self::Copy {
            source_file: source.into(),
            destination_file: destination.into(),
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Store {
            message: error.to_string(),
        }
    }
}
