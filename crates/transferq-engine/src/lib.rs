//! Per-extension serialized file transfer engine
//!
//! Files submitted as (source directory, destination directory) pairs are
//! partitioned by extension. Each extension owns a FIFO queue and at most one
//! copy per extension is in flight at any time; different extensions proceed
//! independently. Incomplete work is persisted so it can be recovered after a
//! restart.
//!
//! # Examples
//!
//! ```rust,no_run
//! use transferq_config::Config;
//! use transferq_engine::TransferManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TransferManager::local(&Config::default());
//! manager.start().await?;
//! manager.submit("/data/in", "/data/out");
//!
//! for record in manager.list_all().await {
//!     println!("{record}");
//! }
//! manager.stop().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod manager;
pub mod operations;
pub mod queue;
pub mod record;
pub mod registry;
pub mod run;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod testing;

pub use manager::TransferManager;
pub use operations::{FileOperations, LocalFileOperations};
pub use queue::{ExtensionGuard, ExtensionQueue};
pub use record::TaskRecord;
pub use registry::TaskRegistry;
pub use run::CopyRun;
pub use scheduler::{CompletionScheduler, SchedulerSignal};
pub use store::{JsonTaskStore, TaskStore};
