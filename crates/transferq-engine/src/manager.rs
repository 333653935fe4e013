//! Transfer manager: the facade handed to orchestration code

use crate::operations::{FileOperations, LocalFileOperations};
use crate::record::TaskRecord;
use crate::registry::TaskRegistry;
use crate::run::CopyRun;
use crate::scheduler::{CompletionScheduler, SchedulerSignal};
use crate::store::{JsonTaskStore, TaskStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use transferq_config::Config;
use transferq_types::{Error, Result, TransferStatus};

/// Owns the registry, the scheduler loop and the collaborators
///
/// Call [`start`](Self::start) once, then [`submit`](Self::submit) directory
/// pairs and query [`list_all`](Self::list_all). [`stop`](Self::stop) ends
/// the scheduler without cancelling copies already in flight.
pub struct TransferManager {
    registry: Arc<TaskRegistry>,
    store: Arc<dyn TaskStore>,
    operations: Arc<dyn FileOperations>,
    signal: SchedulerSignal,
    wake_interval: Duration,
    stop_timeout: Duration,
    started: AtomicBool,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for TransferManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferManager")
            .field("registry", &self.registry)
            .field("wake_interval", &self.wake_interval)
            .field("stop_timeout", &self.stop_timeout)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl TransferManager {
    /// Create a manager with default scheduler settings
    pub fn new(store: Arc<dyn TaskStore>, operations: Arc<dyn FileOperations>) -> Self {
        Self::with_config(&Config::default(), store, operations)
    }

    /// Create a manager with custom configuration
    pub fn with_config(
        config: &Config,
        store: Arc<dyn TaskStore>,
        operations: Arc<dyn FileOperations>,
    ) -> Self {
        Self {
            registry: Arc::new(TaskRegistry::new()),
            store,
            operations,
            signal: SchedulerSignal::new(),
            wake_interval: config.scheduler.wake_interval.get(),
            stop_timeout: config.scheduler.stop_timeout.get(),
            started: AtomicBool::new(false),
            scheduler: Mutex::new(None),
        }
    }

    /// Create a manager over the local filesystem and the JSON store the
    /// configuration points at
    pub fn local(config: &Config) -> Self {
        let store = JsonTaskStore::new(config.store.resolved_path());
        debug!("Using task store {}", store.path().display());
        Self::with_config(
            config,
            Arc::new(store),
            Arc::new(LocalFileOperations::new()),
        )
    }

    /// Recover incomplete work and start scheduling
    ///
    /// Fails if called twice or if the store cannot list prior work.
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::other("Transfer manager already started"));
        }

        if let Err(e) = self.recover().await {
            self.started.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let run = CopyRun::new(
            Arc::clone(&self.store),
            Arc::clone(&self.operations),
            self.signal.notify(),
        );
        let scheduler = CompletionScheduler::new(
            Arc::clone(&self.registry),
            run,
            self.signal.clone(),
            self.wake_interval,
        );
        *self.scheduler.lock() = Some(tokio::spawn(scheduler.run()));
        self.signal.wake();

        info!("Transfer manager started");
        Ok(())
    }

    async fn recover(&self) -> Result<()> {
        self.store.init().await?;
        let recovered = self.store.list_incomplete().await?;
        if recovered.is_empty() {
            return Ok(());
        }

        info!("Recovered {} incomplete task(s)", recovered.len());
        for record in recovered {
            if record.status() == TransferStatus::Copying {
                warn!(
                    "Recovered task {} was interrupted while copying; extension '{}' stays blocked behind it",
                    record.source(),
                    record.extension()
                );
            }
            self.registry.register(Arc::new(record)).await;
        }
        Ok(())
    }

    /// Queue every file of `source` for copying into `destination`
    ///
    /// Returns immediately; enumeration happens on a spawned task and its
    /// outcome only shows up in [`list_all`](Self::list_all).
    pub fn submit(&self, source: impl Into<String>, destination: impl Into<String>) {
        let submission = Submission {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            operations: Arc::clone(&self.operations),
            signal: self.signal.clone(),
        };
        let source = source.into();
        let destination = destination.into();

        tokio::spawn(async move {
            submission.process(&source, &destination).await;
        });
    }

    /// Every task seen by this process, in registration order
    ///
    /// The records are shared, so their status keeps changing after the
    /// call returns.
    pub async fn list_all(&self) -> Vec<Arc<TaskRecord>> {
        self.registry.list_all().await
    }

    /// Stop the scheduler and wait for it to exit
    ///
    /// A no-op if the manager was never started. Runs in flight are left to
    /// finish on their own.
    pub async fn stop(&self) -> Result<()> {
        let Some(handle) = self.scheduler.lock().take() else {
            return Ok(());
        };

        self.signal.request_stop();
        match tokio::time::timeout(self.stop_timeout, handle).await {
            Ok(Ok(())) => {
                info!("Transfer manager stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Scheduler task failed: {}", e);
                Err(Error::other(format!("Scheduler task failed: {}", e)))
            }
            Err(_) => {
                let millis = u64::try_from(self.stop_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!("Scheduler did not stop within {} ms", millis);
                Err(Error::Timeout { millis })
            }
        }
    }
}

struct Submission {
    registry: Arc<TaskRegistry>,
    store: Arc<dyn TaskStore>,
    operations: Arc<dyn FileOperations>,
    signal: SchedulerSignal,
}

impl Submission {
    async fn process(&self, source: &str, destination: &str) {
        match self.operations.enumerate(source, destination).await {
            Ok(records) => {
                info!(
                    "Queued {} file(s) from '{}' to '{}'",
                    records.len(),
                    source,
                    destination
                );
                for record in records {
                    // Persist before registering so a finished run's removal
                    // can never be overtaken by this write.
                    if let Err(e) = self.store.upsert(&record).await {
                        warn!("Failed to persist task {}: {}", record.source(), e);
                    }
                    self.registry.register(Arc::new(record)).await;
                }
            }
            Err(e) => {
                warn!("Cannot copy '{}' to '{}': {}", source, destination, e);
                self.registry
                    .record_only(Arc::new(TaskRecord::directory_failure(
                        source,
                        destination,
                        e.to_string(),
                    )))
                    .await;
            }
        }

        self.signal.wake();
    }
}
