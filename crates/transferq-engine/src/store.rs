//! Durable recovery store

use crate::record::TaskRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use transferq_types::{Error, Result, TaskKey, TaskSnapshot, TransferStatus};

/// Persistence of not-yet-terminal records across process restarts
///
/// Records are keyed by (source, destination). Implementations must give
/// concurrent `upsert`/`remove` calls a single global order.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Load prior state
    ///
    /// A missing or corrupt store is treated as empty and is never an error
    /// the caller has to handle.
    async fn init(&self) -> Result<()>;

    /// Records whose last persisted status was `Awaiting` or `Copying`
    async fn list_incomplete(&self) -> Result<Vec<TaskRecord>>;

    /// Insert or replace the persisted state of `record`
    async fn upsert(&self, record: &TaskRecord) -> Result<()>;

    /// Forget `record`; absent keys are ignored
    async fn remove(&self, record: &TaskRecord) -> Result<()>;
}

/// [`TaskStore`] backed by a single JSON file
///
/// The file holds an array of [`TaskSnapshot`] objects and is rewritten in
/// full on every change while the in-memory map is locked.
#[derive(Debug)]
pub struct JsonTaskStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<TaskKey, TaskSnapshot>>,
}

impl JsonTaskStore {
    /// Create a store over `path`; nothing is read until [`TaskStore::init`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<TaskSnapshot>> {
        let data = fs::read(&self.path).await.map_err(|e| Error::Io {
            message: format!("Failed to read task store '{}': {}", self.path.display(), e),
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Sibling file the next version is written to before it replaces
    /// the store
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, entries: &BTreeMap<TaskKey, TaskSnapshot>) -> Result<()> {
        let snapshots: Vec<&TaskSnapshot> = entries.values().collect();
        let data = serde_json::to_vec_pretty(&snapshots)?;
        let staging = self.staging_path();
        let write_error = |e: std::io::Error| Error::Io {
            message: format!(
                "Failed to write task store '{}': {}",
                self.path.display(),
                e
            ),
        };

        fs::write(&staging, data).await.map_err(write_error)?;
        fs::rename(&staging, &self.path).await.map_err(write_error)
    }
}

#[async_trait]
impl TaskStore for JsonTaskStore {
    async fn init(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();

        if !self.path.exists() {
            debug!("No task store at {}, starting empty", self.path.display());
            return Ok(());
        }

        match self.load().await {
            Ok(snapshots) => {
                for snapshot in snapshots {
                    entries.insert(snapshot.key(), snapshot);
                }
                info!(
                    "Loaded {} task(s) from {}",
                    entries.len(),
                    self.path.display()
                );
            }
            Err(e) => {
                warn!("Ignoring unreadable task store: {}", e);
            }
        }

        Ok(())
    }

    async fn list_incomplete(&self) -> Result<Vec<TaskRecord>> {
        let entries = self.entries.lock().await;
        let mut incomplete: Vec<&TaskSnapshot> = entries
            .values()
            .filter(|snapshot| snapshot.status.is_incomplete())
            .collect();
        // Oldest first, so recovered work re-enters its queue in FIFO order.
        incomplete.sort_by_key(|snapshot| snapshot.status_history.get(TransferStatus::Awaiting));

        Ok(incomplete
            .into_iter()
            .cloned()
            .map(TaskRecord::from_snapshot)
            .collect())
    }

    async fn upsert(&self, record: &TaskRecord) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(record.key().clone(), record.snapshot());
        self.persist(&entries).await
    }

    async fn remove(&self, record: &TaskRecord) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(record.key());
        self.persist(&entries).await
    }
}
