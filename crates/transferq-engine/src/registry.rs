//! Registry of every task seen in this process, indexed by extension

use crate::queue::ExtensionQueue;
use crate::record::TaskRecord;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Single source of truth for submitted work
///
/// Holds the append-only list of all records (the status view) and one
/// lazily created [`ExtensionQueue`] per extension. Records are never
/// dropped from the list; queues are never destroyed.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    records: RwLock<Vec<Arc<TaskRecord>>>,
    queues: RwLock<BTreeMap<String, Arc<ExtensionQueue>>>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the status view and to the tail of its extension queue
    ///
    /// Not idempotent: registering the same task twice queues it twice.
    pub async fn register(&self, record: Arc<TaskRecord>) {
        self.records.write().await.push(Arc::clone(&record));
        self.queue_for(record.extension()).await.push(record);
    }

    /// Add a record to the status view only
    ///
    /// Used for records that are born terminal and have nothing to run.
    pub async fn record_only(&self, record: Arc<TaskRecord>) {
        self.records.write().await.push(record);
    }

    /// Shared handles to every record, in registration order
    pub async fn list_all(&self) -> Vec<Arc<TaskRecord>> {
        self.records.read().await.clone()
    }

    /// Snapshot of the current set of queues
    pub async fn queues(&self) -> Vec<Arc<ExtensionQueue>> {
        self.queues.read().await.values().cloned().collect()
    }

    /// Queue for `extension`, if one was ever created
    pub async fn queue(&self, extension: &str) -> Option<Arc<ExtensionQueue>> {
        self.queues.read().await.get(extension).cloned()
    }

    async fn queue_for(&self, extension: &str) -> Arc<ExtensionQueue> {
        if let Some(queue) = self.queue(extension).await {
            return queue;
        }

        let mut queues = self.queues.write().await;
        Arc::clone(queues.entry(extension.to_string()).or_insert_with(|| {
            debug!("Creating queue for extension '{}'", extension);
            Arc::new(ExtensionQueue::new(extension))
        }))
    }
}
