//! DispatchHandle - live view of a running dispatch

use std::sync::Arc;
use std::time::Duration;

use contracts::Outcome;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::metrics::{DispatchMetrics, MetricsSnapshot};

/// Handle to a spawned dispatch run.
///
/// Outcomes arrive through [`recv`](Self::recv) in completion order.
/// Dropping the handle stops workers at their next send.
pub struct DispatchHandle {
    rx: mpsc::Receiver<Outcome>,
    workers: Vec<JoinHandle<usize>>,
    cancel: CancellationToken,
    metrics: Arc<DispatchMetrics>,
    total: usize,
    started: Instant,
}

impl DispatchHandle {
    pub(crate) fn new(
        rx: mpsc::Receiver<Outcome>,
        workers: Vec<JoinHandle<usize>>,
        cancel: CancellationToken,
        metrics: Arc<DispatchMetrics>,
        total: usize,
    ) -> Self {
        Self {
            rx,
            workers,
            cancel,
            metrics,
            total,
            started: Instant::now(),
        }
    }

    /// Next completed outcome; `None` once every worker has stopped
    pub async fn recv(&mut self) -> Option<Outcome> {
        self.rx.recv().await
    }

    /// Stop dispatching new targets. In-flight calls still report.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Targets this run may dispatch, after `max_targets`
    pub fn total(&self) -> usize {
        self.total
    }

    /// Drain remaining outcomes and wait for all workers.
    ///
    /// Every worker is awaited; a panicked worker is listed in
    /// [`DispatchReport::panicked`] and the outcomes of the others are kept.
    #[instrument(name = "dispatch_handle_join", skip(self), fields(total = self.total))]
    pub async fn join(mut self) -> DispatchReport {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.rx.recv().await {
            outcomes.push(outcome);
        }

        let mut panicked = Vec::new();
        for (worker, handle) in self.workers.into_iter().enumerate() {
            match handle.await {
                Ok(produced) => debug!(worker, produced, "Worker joined"),
                Err(e) => {
                    error!(worker, error = %e, "Worker task panicked");
                    panicked.push(worker);
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        let completed = snapshot.succeeded + snapshot.failed;
        let report = DispatchReport {
            outcomes,
            total: self.total,
            completed: completed as usize,
            succeeded: snapshot.succeeded as usize,
            failed: snapshot.failed as usize,
            skipped: self.total.saturating_sub(completed as usize),
            cancelled: self.cancel.is_cancelled(),
            panicked,
            elapsed: self.started.elapsed(),
        };

        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            panicked = report.panicked.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Dispatch finished"
        );
        report
    }

    /// Counters at this instant
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Outcomes not consumed through `recv`, in completion order
    pub outcomes: Vec<Outcome>,
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Targets without an outcome: never dispatched after cancellation, or
    /// lost with a panicked worker
    pub skipped: usize,
    pub cancelled: bool,
    /// Ids of worker tasks that panicked
    pub panicked: Vec<usize>,
    pub elapsed: Duration,
}

impl DispatchReport {
    /// Reorder outcomes by input position
    pub fn sort_by_index(&mut self) {
        self.outcomes.sort_by_key(|o| o.index);
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.panicked.is_empty() && self.completed == self.total
    }
}
