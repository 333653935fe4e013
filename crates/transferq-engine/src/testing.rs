//! In-crate fakes for the store and filesystem collaborators

use crate::operations::{extension_of, FileOperations};
use crate::record::TaskRecord;
use crate::store::TaskStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use transferq_types::{Error, Result, TaskSnapshot};

pub(crate) const MISSING_DIR: &str = "/missing";

/// Start and end of one copy call
#[derive(Debug, Clone)]
pub(crate) struct CopySpan {
    pub source: String,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

/// Enumerates a fixed list of file names and copies nothing
#[derive(Debug, Default)]
pub(crate) struct ScriptedOperations {
    files: Vec<String>,
    delay: Duration,
    failing_extension: Option<String>,
    panics: bool,
    copies: AtomicUsize,
    spans: Mutex<Vec<CopySpan>>,
}

impl ScriptedOperations {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| (*f).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, extension: &str) -> Self {
        self.failing_extension = Some(extension.to_string());
        self
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }

    pub fn spans(&self) -> Vec<CopySpan> {
        self.spans.lock().clone()
    }
}

#[async_trait]
impl FileOperations for ScriptedOperations {
    async fn enumerate(&self, source: &str, destination: &str) -> Result<Vec<TaskRecord>> {
        if source == MISSING_DIR {
            return Err(Error::SourceNotFound {
                path: PathBuf::from(source),
            });
        }

        Ok(self
            .files
            .iter()
            .map(|name| {
                TaskRecord::new(
                    format!("{source}/{name}"),
                    format!("{destination}/{name}"),
                    extension_of(Path::new(name)),
                )
            })
            .collect())
    }

    async fn copy(&self, record: &TaskRecord) -> Result<()> {
        self.copies.fetch_add(1, Ordering::SeqCst);
        let started = Utc::now();
        if self.panics {
            panic!("scripted panic");
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.spans.lock().push(CopySpan {
            source: record.source().to_string(),
            started,
            finished: Utc::now(),
        });

        if self.failing_extension.as_deref() == Some(record.extension()) {
            return Err(Error::copy(
                record.source(),
                record.destination(),
                "scripted failure",
            ));
        }
        Ok(())
    }
}

/// Counts calls and optionally fails them
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    incomplete: Vec<TaskSnapshot>,
    fail_upsert: bool,
    fail_remove: bool,
    inits: AtomicUsize,
    upserts: AtomicUsize,
    removes: AtomicUsize,
}

impl RecordingStore {
    pub fn with_incomplete(incomplete: Vec<TaskSnapshot>) -> Self {
        Self {
            incomplete,
            ..Self::default()
        }
    }

    pub fn failing_upsert() -> Self {
        Self {
            fail_upsert: true,
            ..Self::default()
        }
    }

    pub fn failing_remove() -> Self {
        Self {
            fail_remove: true,
            ..Self::default()
        }
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    async fn init(&self) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_incomplete(&self) -> Result<Vec<TaskRecord>> {
        Ok(self
            .incomplete
            .iter()
            .cloned()
            .map(TaskRecord::from_snapshot)
            .collect())
    }

    async fn upsert(&self, _record: &TaskRecord) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert {
            return Err(Error::store("scripted upsert failure"));
        }
        Ok(())
    }

    async fn remove(&self, _record: &TaskRecord) -> Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove {
            return Err(Error::store("scripted remove failure"));
        }
        Ok(())
    }
}
