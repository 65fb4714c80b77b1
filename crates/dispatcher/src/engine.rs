//! DispatchEngine - bounded worker pool over a target list

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use contracts::{DispatchConfig, Outcome, Target, Transport};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::DispatchError;
use crate::handle::{DispatchHandle, DispatchReport};
use crate::metrics::DispatchMetrics;
use crate::pacing::Pacer;
use crate::rate_gate::RateGate;
use crate::worker::{dispatch_worker, WorkerContext};

/// Outcome slots buffered per worker before workers block on send
const OUTCOMES_PER_WORKER: usize = 4;

/// Dispatches each target through `T` with at most `workers` calls in flight.
pub struct DispatchEngine<T> {
    config: DispatchConfig,
    transport: Arc<T>,
}

impl<T> DispatchEngine<T>
where
    T: Transport + Sync + 'static,
{
    /// Validates `config`; nothing is dispatched on error
    pub fn new(config: DispatchConfig, transport: T) -> Result<Self, DispatchError> {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Same as [`new`](Self::new) for a transport the caller keeps a handle to
    pub fn with_shared_transport(
        config: DispatchConfig,
        transport: Arc<T>,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Start dispatching in the background
    pub fn spawn(&self, targets: Vec<Target>) -> DispatchHandle {
        self.spawn_with_token(targets, CancellationToken::new())
    }

    /// Start dispatching; cancelling `cancel` stops new dispatches
    #[instrument(
        name = "dispatch_engine_spawn",
        skip(self, targets, cancel),
        fields(
            targets = targets.len(),
            workers = self.config.workers,
            mode = %self.config.mode,
        )
    )]
    pub fn spawn_with_token(
        &self,
        mut targets: Vec<Target>,
        cancel: CancellationToken,
    ) -> DispatchHandle {
        targets.truncate(self.config.effective_len(targets.len()));
        let targets: Arc<[Target]> = targets.into();
        let total = targets.len();
        let worker_count = self.config.workers.min(total);

        let (tx, rx) = mpsc::channel(worker_count.max(1) * OUTCOMES_PER_WORKER);
        let metrics = Arc::new(DispatchMetrics::new());
        let ctx = WorkerContext {
            targets,
            next_index: Arc::new(AtomicUsize::new(0)),
            transport: Arc::clone(&self.transport),
            pacer: Pacer::new(self.config.mode, Arc::new(RateGate::new())),
            timeout: self.config.timeout,
            cancel: cancel.clone(),
            metrics: Arc::clone(&metrics),
            tx,
        };

        info!(
            transport = self.transport.name(),
            total,
            workers = worker_count,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Dispatch started"
        );

        let workers = (0..worker_count)
            .map(|id| tokio::spawn(dispatch_worker(id, ctx.clone())))
            .collect();
        // The receiver closes once the last worker drops its sender.
        drop(ctx);

        DispatchHandle::new(rx, workers, cancel, metrics, total)
    }

    /// Dispatch everything and collect outcomes in completion order
    pub async fn run(&self, targets: Vec<Target>) -> DispatchReport {
        self.spawn(targets).join().await
    }

    /// Like [`run`](Self::run), calling `on_outcome` as each outcome arrives
    pub async fn run_with<F>(
        &self,
        targets: Vec<Target>,
        on_outcome: F,
    ) -> DispatchReport
    where
        F: FnMut(&Outcome),
    {
        self.run_with_token(targets, CancellationToken::new(), on_outcome)
            .await
    }

    /// Streaming run that can be stopped through `cancel`
    pub async fn run_with_token<F>(
        &self,
        targets: Vec<Target>,
        cancel: CancellationToken,
        mut on_outcome: F,
    ) -> DispatchReport
    where
        F: FnMut(&Outcome),
    {
        let mut handle = self.spawn_with_token(targets, cancel);
        let mut seen = Vec::with_capacity(handle.total());
        while let Some(outcome) = handle.recv().await {
            on_outcome(&outcome);
            seen.push(outcome);
        }
        let mut report = handle.join().await;
        seen.append(&mut report.outcomes);
        report.outcomes = seen;
        report
    }
}
