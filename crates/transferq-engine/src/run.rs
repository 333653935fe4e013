//! A single copy execution, from claimed head to terminal status

use crate::operations::FileOperations;
use crate::queue::ExtensionQueue;
use crate::record::TaskRecord;
use crate::store::TaskStore;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};
use transferq_types::{Error, Result, TransferStatus};

/// Everything a run needs besides the record itself
#[derive(Clone)]
pub struct CopyRun {
    store: Arc<dyn TaskStore>,
    operations: Arc<dyn FileOperations>,
    signal: Arc<Notify>,
}

impl std::fmt::Debug for CopyRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyRun").finish_non_exhaustive()
    }
}

impl CopyRun {
    /// Create a run context
    pub fn new(
        store: Arc<dyn TaskStore>,
        operations: Arc<dyn FileOperations>,
        signal: Arc<Notify>,
    ) -> Self {
        Self {
            store,
            operations,
            signal,
        }
    }

    /// Drive a `Copying` head to `Done` or `Error`
    ///
    /// Never fails: copy and store errors end up on the record. The
    /// scheduler is signalled on the way out whatever the outcome.
    pub async fn execute(&self, queue: Arc<ExtensionQueue>, record: Arc<TaskRecord>) {
        debug!("Copying {} -> {}", record.source(), record.destination());

        match self.copy(&record).await {
            Ok(()) => {
                {
                    let gate = queue.lock().await;
                    record.advance(&gate, TransferStatus::Done, None);
                }
                if let Err(e) = self.store.remove(&record).await {
                    warn!("Failed to forget finished task {}: {}", record.source(), e);
                }
                debug!("Finished {}", record.source());
            }
            Err(e) => {
                let message = e.to_string();
                debug!("Copy of {} failed: {}", record.source(), message);
                {
                    let gate = queue.lock().await;
                    record.advance(&gate, TransferStatus::Error, Some(message));
                }
                if let Err(e) = self.store.remove(&record).await {
                    warn!("Failed to forget failed task {}: {}", record.source(), e);
                }
            }
        }

        self.signal.notify_one();
    }

    async fn copy(&self, record: &TaskRecord) -> Result<()> {
        self.store.upsert(record).await?;

        AssertUnwindSafe(self.operations.copy(record))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(Error::copy(
                    record.source(),
                    record.destination(),
                    panic_message(payload.as_ref()),
                ))
            })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("copier panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("copier panicked: {message}")
    } else {
        "copier panicked".to_string()
    }
}
