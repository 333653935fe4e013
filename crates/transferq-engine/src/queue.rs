//! Per-extension FIFO queues and their gates

use crate::record::TaskRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

/// Proof that an extension's gate is held
///
/// Status transitions and the scheduler's check-then-retire step both take
/// this guard so they can never interleave for the same extension.
#[derive(Debug)]
pub struct ExtensionGuard<'a> {
    extension: &'a str,
    _guard: MutexGuard<'a, ()>,
}

impl ExtensionGuard<'_> {
    /// Extension whose gate is held
    pub fn extension(&self) -> &str {
        self.extension
    }
}

/// Pending records sharing one extension, oldest first
///
/// Registration only appends; only the scheduler removes, and only the head.
#[derive(Debug)]
pub struct ExtensionQueue {
    extension: String,
    gate: AsyncMutex<()>,
    pending: Mutex<VecDeque<Arc<TaskRecord>>>,
}

impl ExtensionQueue {
    /// Create an empty queue for `extension`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            gate: AsyncMutex::new(()),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Extension served by this queue
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Acquire the extension gate
    pub async fn lock(&self) -> ExtensionGuard<'_> {
        ExtensionGuard {
            extension: &self.extension,
            _guard: self.gate.lock().await,
        }
    }

    /// Append a record at the tail
    pub(crate) fn push(&self, record: Arc<TaskRecord>) {
        self.pending.lock().push_back(record);
    }

    /// Current head, if any
    pub fn peek(&self) -> Option<Arc<TaskRecord>> {
        self.pending.lock().front().cloned()
    }

    /// Remove `head` if it is still at the front
    pub(crate) fn retire(&self, head: &Arc<TaskRecord>, _gate: &ExtensionGuard<'_>) -> bool {
        let mut pending = self.pending.lock();
        match pending.front() {
            Some(front) if Arc::ptr_eq(front, head) => {
                pending.pop_front();
                true
            }
            _ => false,
        }
    }

    /// Number of records not yet retired
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Check if every record has been retired
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
