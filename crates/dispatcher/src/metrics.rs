//! Run metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::Outcome;

/// Live counters for one dispatch run, shared by all workers
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Transport calls currently in flight
    in_flight: AtomicUsize,
    /// Transport calls started
    dispatched: AtomicU64,
    /// Outcomes with a response
    succeeded: AtomicU64,
    /// Outcomes with an error or timeout
    failed: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Outcomes produced so far
    pub fn completed(&self) -> u64 {
        self.succeeded() + self.failed()
    }

    /// A transport call is about to start
    pub fn record_start(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// A transport call produced `outcome`
    pub fn record_outcome(&self, outcome: &Outcome) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        if outcome.is_success() {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            in_flight: self.in_flight(),
            dispatched: self.dispatched(),
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of run metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub in_flight: usize,
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}
