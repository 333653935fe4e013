//! Integration test support for transferq
//!
//! Shared fixtures for the end-to-end tests under `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Temporary directories, file helpers and wrapping collaborators
pub mod test_utils;
