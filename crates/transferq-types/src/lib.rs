//! Core type system and error handling for transferq
//!
//! This crate provides the foundational types shared by every transferq crate:
//!
//! - **Error handling**: the [`Error`] taxonomy and the [`Result`] alias
//! - **Task state**: [`TransferStatus`], its append-only [`StatusHistory`]
//!   and the persisted [`TaskSnapshot`]
//! - **Configuration**: validated values such as [`WaitDuration`]
//!
//! # Features
//!
//! - `serde` (default): Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use chrono::Utc;
//! use transferq_types::{StatusHistory, TransferStatus};
//!
//! let mut history = StatusHistory::new(Utc::now());
//! history.record(TransferStatus::Copying, Utc::now());
//! assert_eq!(history.len(), 2);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::WaitDuration;
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use types::*;
