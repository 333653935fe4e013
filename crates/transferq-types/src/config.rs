//! Configuration types for transferq
//!
//! This module provides type-safe configuration values with validation
//! and serialization support.

use std::time::Duration;

/// A bounded wait, stored in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WaitDuration(u64);

impl WaitDuration {
    /// Minimum wait (10ms)
    pub const MIN_MILLIS: u64 = 10;
    /// Maximum wait (1 hour)
    pub const MAX_MILLIS: u64 = 60 * 60 * 1000;
    /// Default wait (1 second)
    pub const DEFAULT_MILLIS: u64 = 1000;

    /// Create a new wait duration with validation
    pub fn from_millis(millis: u64) -> Result<Self, String> {
        if millis < Self::MIN_MILLIS {
            Err(format!(
                "Wait duration {}ms is below minimum {}ms",
                millis,
                Self::MIN_MILLIS
            ))
        } else if millis > Self::MAX_MILLIS {
            Err(format!(
                "Wait duration {}ms exceeds maximum {}ms",
                millis,
                Self::MAX_MILLIS
            ))
        } else {
            Ok(Self(millis))
        }
    }

    /// Get the value in milliseconds
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Get the value as a [`Duration`]
    pub fn get(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Check that a deserialized value is within bounds
    pub fn validate(self) -> Result<(), String> {
        Self::from_millis(self.0).map(|_| ())
    }
}

impl Default for WaitDuration {
    fn default() -> Self {
        Self(Self::DEFAULT_MILLIS)
    }
}
