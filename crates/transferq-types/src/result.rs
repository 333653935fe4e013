//! Result type alias for transferq operations

use crate::Error;

/// Result type alias for transferq operations
pub type Result<T> = std::result::Result<T, Error>;
