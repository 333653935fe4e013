//! Completion-driven scheduler
//!
//! A single long-lived loop that starts and retires runs. It sleeps on a
//! level-triggered signal raised by submissions and finishing runs; the wake
//! interval only bounds how long a stop request can go unnoticed.
//!
//! Per round, every extension queue is handled independently:
//!
//! 1. a terminal head is retired,
//! 2. an `Awaiting` head is claimed (moved to `Copying`) and its run spawned.
//!
//! Both steps happen under the extension gate, so a head is never launched
//! twice and at most one run per extension is in flight.

use crate::queue::ExtensionQueue;
use crate::registry::TaskRegistry;
use crate::run::CopyRun;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};
use transferq_types::TransferStatus;

/// Handles shared between the scheduler loop and whoever drives it
#[derive(Debug, Clone, Default)]
pub struct SchedulerSignal {
    notify: Arc<Notify>,
    stop: Arc<AtomicBool>,
}

impl SchedulerSignal {
    /// Create a fresh signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the loop; wakes raised while it is busy are not lost
    pub fn wake(&self) {
        self.notify.notify_one();
    }

    /// Ask the loop to exit and wake it
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Check if a stop was requested
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub(crate) fn notify(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }
}

/// The scheduling loop
#[derive(Debug)]
pub struct CompletionScheduler {
    registry: Arc<TaskRegistry>,
    run: CopyRun,
    signal: SchedulerSignal,
    wake_interval: Duration,
}

impl CompletionScheduler {
    /// Create a scheduler over `registry`
    pub fn new(
        registry: Arc<TaskRegistry>,
        run: CopyRun,
        signal: SchedulerSignal,
        wake_interval: Duration,
    ) -> Self {
        Self {
            registry,
            run,
            signal,
            wake_interval,
        }
    }

    /// Run until a stop is requested
    ///
    /// Does not wait for in-flight runs.
    pub async fn run(self) {
        info!("Scheduler started");

        loop {
            let woken = tokio::time::timeout(self.wake_interval, self.signal.notify.notified())
                .await
                .is_ok();

            if self.signal.stop_requested() {
                break;
            }
            if woken {
                self.schedule_round().await;
            }
        }

        info!("Scheduler stopped");
    }

    /// Evaluate every queue once; returns the number of runs launched
    pub async fn schedule_round(&self) -> usize {
        let mut launched = 0;
        for queue in self.registry.queues().await {
            if self.schedule_queue(queue).await {
                launched += 1;
            }
        }
        launched
    }

    async fn schedule_queue(&self, queue: Arc<ExtensionQueue>) -> bool {
        let Some(head) = queue.peek() else {
            return false;
        };

        let gate = queue.lock().await;
        if head.status().is_terminal() && queue.retire(&head, &gate) {
            debug!(
                "Retired {} ({}) from '{}'",
                head.source(),
                head.status(),
                queue.extension()
            );
        }

        let Some(head) = queue.peek() else {
            return false;
        };
        if head.status() != TransferStatus::Awaiting
            || !head.advance(&gate, TransferStatus::Copying, None)
        {
            return false;
        }
        drop(gate);

        debug!("Launching {} on '{}'", head.source(), queue.extension());
        let run = self.run.clone();
        tokio::spawn(async move {
            run.execute(queue, head).await;
        });
        true
    }
}
