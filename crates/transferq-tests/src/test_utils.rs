//! Unified test utilities for transferq integration tests

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use transferq_config::Config;
use transferq_engine::{
    FileOperations, JsonTaskStore, LocalFileOperations, TaskRecord, TransferManager,
};
use transferq_types::{Error, Result, WaitDuration};

/// Source, destination and store file inside one temporary directory
pub struct TestWorkspace {
    root: TempDir,
    /// Directory files are copied from
    pub source: PathBuf,
    /// Directory files are copied into
    pub destination: PathBuf,
}

impl TestWorkspace {
    /// Create empty source and destination directories
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let source = root.path().join("source");
        let destination = root.path().join("destination");
        fs::create_dir_all(&source).expect("Failed to create source dir");
        fs::create_dir_all(&destination).expect("Failed to create destination dir");
        Self {
            root,
            source,
            destination,
        }
    }

    /// Location of the JSON task store
    pub fn store_path(&self) -> PathBuf {
        self.root.path().join("copy_tasks.json")
    }

    /// Write `content` to `source/name`
    pub fn add_source_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.source.join(name);
        fs::write(&path, content).expect("Failed to write source file");
        path
    }

    /// Source directory as the string form the manager takes
    pub fn source_str(&self) -> String {
        self.source.to_string_lossy().into_owned()
    }

    /// Destination directory as the string form the manager takes
    pub fn destination_str(&self) -> String {
        self.destination.to_string_lossy().into_owned()
    }

    /// Configuration pointing at this workspace's store, with a short
    /// scheduler wake interval
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.store.path = Some(self.store_path());
        config.scheduler.wake_interval =
            WaitDuration::from_millis(50).expect("valid wake interval");
        config
    }

    /// Manager over the real filesystem and JSON store
    pub fn manager(&self) -> TransferManager {
        TransferManager::local(&self.config())
    }

    /// Manager over the JSON store and custom file operations
    pub fn manager_with(&self, operations: Arc<dyn FileOperations>) -> TransferManager {
        TransferManager::with_config(
            &self.config(),
            Arc::new(JsonTaskStore::new(self.store_path())),
            operations,
        )
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Local file operations that sleep before every copy
#[derive(Debug)]
pub struct SlowOperations {
    inner: LocalFileOperations,
    delay: Duration,
}

impl SlowOperations {
    /// Delay every copy by `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: LocalFileOperations::new(),
            delay,
        }
    }
}

#[async_trait]
impl FileOperations for SlowOperations {
    async fn enumerate(&self, source: &str, destination: &str) -> Result<Vec<TaskRecord>> {
        self.inner.enumerate(source, destination).await
    }

    async fn copy(&self, record: &TaskRecord) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.copy(record).await
    }
}

/// Local file operations that refuse to copy one extension
#[derive(Debug)]
pub struct FailingOperations {
    inner: LocalFileOperations,
    extension: String,
}

impl FailingOperations {
    /// Fail every copy of files ending in `extension` (e.g. `".bad"`)
    pub fn new(extension: &str) -> Self {
        Self {
            inner: LocalFileOperations::new(),
            extension: extension.to_string(),
        }
    }
}

#[async_trait]
impl FileOperations for FailingOperations {
    async fn enumerate(&self, source: &str, destination: &str) -> Result<Vec<TaskRecord>> {
        self.inner.enumerate(source, destination).await
    }

    async fn copy(&self, record: &TaskRecord) -> Result<()> {
        if record.extension() == self.extension {
            return Err(Error::copy(
                record.source(),
                record.destination(),
                "device refused the write",
            ));
        }
        self.inner.copy(record).await
    }
}

/// Poll `manager.list_all()` until `done` holds or `limit` elapses
pub async fn wait_for<F>(manager: &TransferManager, limit: Duration, mut done: F) -> Vec<Arc<TaskRecord>>
where
    F: FnMut(&[Arc<TaskRecord>]) -> bool,
{
    tokio::time::timeout(limit, async {
        loop {
            let records = manager.list_all().await;
            if done(&records) {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timed out waiting for transfers")
}

/// Check that `expected` records exist and all are terminal
pub fn all_terminal(records: &[Arc<TaskRecord>], expected: usize) -> bool {
    records.len() == expected && records.iter().all(|r| r.status().is_terminal())
}

/// File name component of a record's source
pub fn file_name(record: &TaskRecord) -> String {
    Path::new(record.source())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
