//! Enumeration and copying of files on the local filesystem

use crate::record::TaskRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use transferq_types::{Error, Result};
use walkdir::WalkDir;

/// Filesystem collaborator of the transfer manager
#[async_trait]
pub trait FileOperations: Send + Sync {
    /// Produce one `Awaiting` record per file to copy from `source` into
    /// `destination`
    ///
    /// Fails if either directory does not exist.
    async fn enumerate(&self, source: &str, destination: &str) -> Result<Vec<TaskRecord>>;

    /// Copy one file
    async fn copy(&self, record: &TaskRecord) -> Result<()>;
}

/// [`FileOperations`] over `std::fs`/`tokio::fs`
///
/// Enumeration is non-recursive and sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileOperations;

impl LocalFileOperations {
    /// Create a new instance
    pub fn new() -> Self {
        Self
    }

    fn list_files(source: &Path, destination: &Path) -> Result<Vec<TaskRecord>> {
        let mut records = Vec::new();

        for entry in WalkDir::new(source)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Io {
                message: format!("Failed to list '{}': {}", source.display(), e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let target = destination.join(entry.file_name());
            let (Some(source_file), Some(destination_file)) =
                (entry.path().to_str(), target.to_str())
            else {
                warn!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            records.push(TaskRecord::new(
                source_file,
                destination_file,
                extension_of(entry.path()),
            ));
        }

        Ok(records)
    }
}

#[async_trait]
impl FileOperations for LocalFileOperations {
    async fn enumerate(&self, source: &str, destination: &str) -> Result<Vec<TaskRecord>> {
        let source = match existing_dir(strip_quotes(source)).await {
            Ok(path) => path,
            Err(path) => return Err(Error::SourceNotFound { path }),
        };
        let destination = match existing_dir(strip_quotes(destination)).await {
            Ok(path) => path,
            Err(path) => return Err(Error::DestinationNotFound { path }),
        };

        let records = tokio::task::spawn_blocking(move || Self::list_files(&source, &destination))
            .await
            .map_err(|e| Error::other(format!("Enumeration task failed: {}", e)))??;

        debug!("Enumerated {} file(s)", records.len());
        Ok(records)
    }

    async fn copy(&self, record: &TaskRecord) -> Result<()> {
        tokio::fs::copy(record.source(), record.destination())
            .await
            .map_err(|e| Error::copy(record.source(), record.destination(), e.to_string()))?;
        Ok(())
    }
}

fn strip_quotes(path: &str) -> PathBuf {
    PathBuf::from(path.replace('"', ""))
}

/// Absolute form of `path` if it is a directory; the input path otherwise
async fn existing_dir(path: PathBuf) -> std::result::Result<PathBuf, PathBuf> {
    match tokio::fs::canonicalize(&path).await {
        Ok(absolute) if absolute.is_dir() => Ok(absolute),
        _ => Err(path),
    }
}

/// Partition key of a file: the file name from its last `.`, or empty when
/// there is no dot or nothing follows it
///
/// A dotfile such as `.bashrc` is its own extension.
pub fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => name[dot..].to_string(),
        _ => String::new(),
    }
}
