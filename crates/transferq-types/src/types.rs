//! Core data types for transferq
//!
//! This module provides the status state machine, the append-only status
//! history and the plain-data snapshot of a task used for persistence.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension reserved for whole-directory failures
pub const DIRECTORY_EXTENSION: &str = "directory";

/// Lifecycle state of a single file copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransferStatus {
    /// Registered and waiting for its turn in the extension queue
    Awaiting,
    /// Bytes are being copied
    Copying,
    /// Copy finished successfully
    Done,
    /// Copy or enumeration failed
    Error,
}

impl TransferStatus {
    /// Check if the status is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Check if the status still needs work (and therefore persistence)
    pub fn is_incomplete(self) -> bool {
        matches!(self, Self::Awaiting | Self::Copying)
    }

    /// Check whether `next` is a legal successor of this status
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Awaiting, Self::Copying)
                | (Self::Copying, Self::Done)
                | (Self::Copying, Self::Error)
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Awaiting => "Awaiting",
            Self::Copying => "Copying",
            Self::Done => "Done",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Ordered record of when each status was first entered
///
/// Entries are appended, never overwritten, and timestamps never move
/// backwards even if the wall clock does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatusHistory {
    entries: Vec<(TransferStatus, DateTime<Utc>)>,
}

impl StatusHistory {
    /// Start a history with the `Awaiting` entry
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            entries: vec![(TransferStatus::Awaiting, at)],
        }
    }

    /// Append `status` unless it was already entered
    ///
    /// Returns `false` when the status is already present.
    pub fn record(&mut self, status: TransferStatus, at: DateTime<Utc>) -> bool {
        if self.contains(status) {
            return false;
        }
        let at = self.latest().map_or(at, |(_, last)| at.max(last));
        self.entries.push((status, at));
        true
    }

    /// Timestamp at which `status` was first entered
    pub fn get(&self, status: TransferStatus) -> Option<DateTime<Utc>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == status)
            .map(|(_, at)| *at)
    }

    /// Check whether `status` has been entered
    pub fn contains(&self, status: TransferStatus) -> bool {
        self.get(status).is_some()
    }

    /// Most recently appended entry
    pub fn latest(&self) -> Option<(TransferStatus, DateTime<Utc>)> {
        self.entries.last().copied()
    }

    /// Entries in chronological order
    pub fn iter(&self) -> impl Iterator<Item = &(TransferStatus, DateTime<Utc>)> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identity of a task: two records are the same task iff both paths match
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskKey {
    /// Absolute source path
    pub source: String,
    /// Absolute destination path
    pub destination: String,
}

impl TaskKey {
    /// Create a new task key
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Point-in-time copy of a task, as written to the durable store
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskSnapshot {
    /// Absolute source path
    pub source: String,
    /// Absolute destination path
    pub destination: String,
    /// Partition key of the task
    pub extension: String,
    /// Status at snapshot time
    pub status: TransferStatus,
    /// Failure message, if any
    #[cfg_attr(feature = "serde", serde(default))]
    pub error_message: Option<String>,
    /// Status history at snapshot time
    pub status_history: StatusHistory,
}

impl TaskSnapshot {
    /// Identity of the snapshotted task
    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.source.clone(), self.destination.clone())
    }
}
