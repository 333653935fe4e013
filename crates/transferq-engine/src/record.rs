//! Task records: one file's copy job and its status history

use crate::queue::ExtensionGuard;
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use transferq_types::{
    StatusHistory, TaskKey, TaskSnapshot, TransferStatus, DIRECTORY_EXTENSION,
};

#[derive(Debug, Clone)]
struct TaskState {
    status: TransferStatus,
    error_message: Option<String>,
    history: StatusHistory,
}

/// A single file copy job
///
/// The paths and extension are fixed at creation. Status, error message and
/// history live behind an internal lock and are only advanced while the
/// owning extension's gate is held, so a reader never sees a status without
/// its history entry.
#[derive(Debug)]
pub struct TaskRecord {
    key: TaskKey,
    extension: String,
    state: RwLock<TaskState>,
}

impl TaskRecord {
    /// Create a new `Awaiting` record
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            key: TaskKey::new(source, destination),
            extension: extension.into(),
            state: RwLock::new(TaskState {
                status: TransferStatus::Awaiting,
                error_message: None,
                history: StatusHistory::new(Utc::now()),
            }),
        }
    }

    /// Create the record standing in for a directory pair that could not be
    /// enumerated. It starts (and stays) in `Error`.
    pub fn directory_failure(
        source: impl Into<String>,
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let mut history = StatusHistory::new(now);
        history.record(TransferStatus::Error, now);

        Self {
            key: TaskKey::new(source, destination),
            extension: DIRECTORY_EXTENSION.to_string(),
            state: RwLock::new(TaskState {
                status: TransferStatus::Error,
                error_message: Some(message.into()),
                history,
            }),
        }
    }

    /// Rebuild a live record from a persisted snapshot
    pub fn from_snapshot(snapshot: TaskSnapshot) -> Self {
        Self {
            key: TaskKey::new(snapshot.source, snapshot.destination),
            extension: snapshot.extension,
            state: RwLock::new(TaskState {
                status: snapshot.status,
                error_message: snapshot.error_message,
                history: snapshot.status_history,
            }),
        }
    }

    /// Identity of this record
    pub fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Source file path
    pub fn source(&self) -> &str {
        &self.key.source
    }

    /// Destination file path
    pub fn destination(&self) -> &str {
        &self.key.destination
    }

    /// Partition key
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Current status
    pub fn status(&self) -> TransferStatus {
        self.state.read().status
    }

    /// Failure message, if the record failed
    pub fn error_message(&self) -> Option<String> {
        self.state.read().error_message.clone()
    }

    /// Copy of the status history
    pub fn history(&self) -> StatusHistory {
        self.state.read().history.clone()
    }

    /// Consistent point-in-time copy of the whole record
    pub fn snapshot(&self) -> TaskSnapshot {
        let state = self.state.read();
        TaskSnapshot {
            source: self.key.source.clone(),
            destination: self.key.destination.clone(),
            extension: self.extension.clone(),
            status: state.status,
            error_message: state.error_message.clone(),
            status_history: state.history.clone(),
        }
    }

    /// Move to `next`, stamping the history
    ///
    /// The guard proves the caller holds this record's extension gate.
    /// Illegal transitions (anything leaving a terminal state, skipping a
    /// step) are refused and reported as `false`.
    pub(crate) fn advance(
        &self,
        gate: &ExtensionGuard<'_>,
        next: TransferStatus,
        error_message: Option<String>,
    ) -> bool {
        debug_assert_eq!(gate.extension(), self.extension);
        let mut state = self.state.write();
        if !state.status.can_advance_to(next) {
            return false;
        }
        state.history.record(next, Utc::now());
        state.status = next;
        state.error_message = error_message;
        true
    }
}

impl PartialEq for TaskRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TaskRecord {}

impl Hash for TaskRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        write!(
            f,
            "Source: {}, Destination: {}, Transfer Status {}, Error Message: {}",
            self.key.source,
            self.key.destination,
            state.status,
            state.error_message.as_deref().unwrap_or("")
        )
    }
}
