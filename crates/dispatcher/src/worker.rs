//! Worker loop - claims targets, paces, calls the transport

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, Outcome, Target, Transport};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::metrics::DispatchMetrics;
use crate::pacing::Pacer;

/// Everything a worker borrows from the run
pub(crate) struct WorkerContext<T> {
    pub targets: Arc<[Target]>,
    pub next_index: Arc<AtomicUsize>,
    pub transport: Arc<T>,
    pub pacer: Pacer,
    pub timeout: Duration,
    pub cancel: CancellationToken,
    pub metrics: Arc<DispatchMetrics>,
    pub tx: mpsc::Sender<Outcome>,
}

impl<T> Clone for WorkerContext<T> {
    fn clone(&self) -> Self {
        Self {
            targets: Arc::clone(&self.targets),
            next_index: Arc::clone(&self.next_index),
            transport: Arc::clone(&self.transport),
            pacer: self.pacer.clone(),
            timeout: self.timeout,
            cancel: self.cancel.clone(),
            metrics: Arc::clone(&self.metrics),
            tx: self.tx.clone(),
        }
    }
}

impl<T> WorkerContext<T> {
    /// Claim the next undispatched index, if any
    fn claim(&self) -> Option<usize> {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        (index < self.targets.len()).then_some(index)
    }
}

/// Process targets until the list is exhausted, the run is cancelled, or the
/// outcome receiver is gone. Returns the number of outcomes produced.
#[instrument(name = "dispatch_worker_loop", skip(ctx), fields(worker = id))]
pub(crate) async fn dispatch_worker<T>(id: usize, ctx: WorkerContext<T>) -> usize
where
    T: Transport + Sync,
{
    debug!(worker = id, "Worker started");
    let mut produced = 0;

    loop {
        if ctx.cancel.is_cancelled() {
            debug!(worker = id, "Cancellation observed");
            break;
        }
        let Some(index) = ctx.claim() else {
            break;
        };
        let target = ctx.targets[index].clone();

        let waited = match ctx.pacer.wait(&ctx.cancel).await {
            Ok(waited) => waited,
            Err(_) => {
                debug!(worker = id, index, "Cancelled while pacing");
                break;
            }
        };
        observability::record_pacing_wait(ctx.pacer.mode().label(), waited);

        ctx.metrics.record_start();
        let outcome = call_transport(ctx.transport.as_ref(), index, target, ctx.timeout).await;
        ctx.metrics.record_outcome(&outcome);
        observability::record_outcome(&outcome);
        trace!(worker = id, index, outcome = %outcome, "Target completed");

        produced += 1;
        if ctx.tx.send(outcome).await.is_err() {
            debug!(worker = id, "Outcome receiver dropped, stopping");
            break;
        }
    }

    debug!(worker = id, produced, "Worker stopped");
    produced
}

/// One bounded transport call, folded into an `Outcome`
pub(crate) async fn call_transport<T>(
    transport: &T,
    index: usize,
    target: Target,
    timeout: Duration,
) -> Outcome
where
    T: Transport + Sync,
{
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, transport.send(&target, timeout)).await;
    let latency = started.elapsed();

    match result {
        Ok(Ok(response)) => Outcome::success(
            index,
            target,
            latency,
            response.status,
            response.body_size,
        ),
        Ok(Err(e)) => Outcome::failure(index, target, latency, e.to_string()),
        Err(_) => Outcome::failure(
            index,
            target,
            latency,
            ContractError::transport_timeout(timeout).to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transports::{MockTransport, MockTransportConfig};
    use contracts::OutcomeKind;

    #[tokio::test]
    async fn test_call_transport_success() {
        let transport = MockTransport::new();
        let outcome = call_transport(&transport, 7, "http://a/".into(), Duration::from_secs(1)).await;
        assert_eq!(outcome.index, 7);
        assert_eq!(
            outcome.kind,
            OutcomeKind::Success {
                status: 200,
                body_size: 10
            }
        );
    }

    #[tokio::test]
    async fn test_call_transport_error_becomes_failure() {
        let transport = MockTransport::with_config(MockTransportConfig {
            fail_targets: vec!["http://bad/".into()],
            ..Default::default()
        });
        let outcome = call_transport(&transport, 0, "http://bad/".into(), Duration::from_secs(1)).await;
        assert!(!outcome.is_success());
        assert!(outcome.to_string().contains("ERR"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_transport_timeout_becomes_failure() {
        let transport = MockTransport::with_config(MockTransportConfig {
            hang_targets: vec!["http://slow/".into()],
            ..Default::default()
        });
        let outcome =
            call_transport(&transport, 0, "http://slow/".into(), Duration::from_millis(500)).await;
        match outcome.kind {
            OutcomeKind::Failure { error } => assert!(error.contains("timed out"), "got: {error}"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(outcome.latency >= Duration::from_millis(500));
    }
}
