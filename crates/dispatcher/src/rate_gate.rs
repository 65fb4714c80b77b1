//! RateGate - global minimum interval between dispatches
//!
//! Each acquisition reserves the next free slot under the lock and sleeps
//! until that slot outside of it. The reservation is visible to every later
//! caller before anyone sleeps, so two workers can never both compute their
//! wait from the same stale timestamp.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Returned when a gate wait is interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Shared rate gate for one dispatch run.
///
/// `last_dispatch` starts unset so the first acquisition proceeds at once.
#[derive(Debug, Default)]
pub struct RateGate {
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until a slot at least `interval` after the previous one.
    pub async fn acquire(&self, interval: Duration) {
        let slot = self.reserve(interval).await;
        if slot > Instant::now() {
            sleep_until(slot).await;
        }
    }

    /// Like [`acquire`](Self::acquire) but gives up when `cancel` fires.
    ///
    /// A cancelled caller keeps its reservation; later callers are still
    /// spaced from it.
    pub async fn acquire_cancellable(
        &self,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let slot = self.reserve(interval).await;
        if slot <= Instant::now() {
            return Ok(());
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Cancelled),
            () = sleep_until(slot) => Ok(()),
        }
    }

    /// Timestamp of the most recent reserved slot
    pub async fn last_dispatch(&self) -> Option<Instant> {
        *self.last_dispatch.lock().await
    }

    /// Read-compute-reserve, the only critical section.
    async fn reserve(&self, interval: Duration) -> Instant {
        let mut last = self.last_dispatch.lock().await;
        let now = Instant::now();
        let slot = match *last {
            Some(prev) => prev
                .checked_add(interval)
                .unwrap_or_else(far_future)
                .max(now),
            None => now,
        };
        *last = Some(slot);
        slot
    }
}

/// Slot used when `last + interval` does not fit in an `Instant`
fn far_future() -> Instant {
    // Roughly 30 years, the same horizon tokio uses for "never".
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn assert_min_gaps(mut stamps: Vec<Instant>, interval: Duration) {
        stamps.sort();
        for pair in stamps.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= interval, "gap {:?} < {:?}", gap, interval);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let gate = RateGate::new();
        let start = Instant::now();
        gate.acquire(Duration::from_secs(5)).await;
        assert_eq!(Instant::now(), start);
        assert_eq!(gate.last_dispatch().await, Some(start));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_acquires_are_spaced() {
        let gate = RateGate::new();
        let interval = Duration::from_millis(100);
        let start = Instant::now();

        for _ in 0..4 {
            gate.acquire(interval).await;
        }

        assert!(Instant::now() - start >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_idle_period() {
        let gate = RateGate::new();
        let interval = Duration::from_millis(100);
        gate.acquire(interval).await;

        tokio::time::sleep(Duration::from_millis(250)).await;
        let before = Instant::now();
        gate.acquire(interval).await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_respect_interval() {
        let gate = Arc::new(RateGate::new());
        let interval = Duration::from_millis(50);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire(interval).await;
                Instant::now()
            }));
        }

        let mut stamps = Vec::new();
        for h in handles {
            stamps.push(h.await.unwrap());
        }
        assert_eq!(stamps.len(), 16);
        assert_min_gaps(stamps, interval);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_gap_holds_under_thread_contention() {
        let gate = Arc::new(RateGate::new());
        let interval = Duration::from_millis(50);
        let callers = 12;
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..callers {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire(interval).await;
                Instant::now()
            }));
        }

        let mut stamps = Vec::new();
        for h in handles {
            stamps.push(h.await.unwrap());
        }
        stamps.sort();

        // Timers never fire early: the last caller cannot finish before its slot.
        let last = *stamps.last().unwrap();
        assert!(last - start >= interval * (callers - 1));

        // Wake-up jitter may shave a little off individual gaps.
        let tolerance = Duration::from_millis(15);
        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] + tolerance >= interval);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait() {
        let gate = Arc::new(RateGate::new());
        let interval = Duration::from_secs(10);
        let cancel = CancellationToken::new();

        gate.acquire(interval).await;

        let waiter = {
            let gate = Arc::clone(&gate);
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.acquire_cancellable(interval, &cancel).await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        assert_eq!(waiter.await.unwrap(), Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_does_not_overflow() {
        let gate = RateGate::new();
        let cancel = CancellationToken::new();
        let interval = Duration::try_from_secs_f64(1.5e19).unwrap();

        gate.acquire(interval).await;
        let second = gate.acquire_cancellable(interval, &cancel);
        tokio::pin!(second);

        tokio::select! {
            _ = &mut second => panic!("second slot must lie far in the future"),
            () = tokio::time::sleep(Duration::from_secs(3600)) => {}
        }
        cancel.cancel();
        assert_eq!(second.await, Err(Cancelled));
        assert!(gate.last_dispatch().await.unwrap() > Instant::now());
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let gate = RateGate::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            gate.acquire_cancellable(Duration::from_secs(1), &cancel).await,
            Err(Cancelled)
        );
        assert_eq!(gate.last_dispatch().await, None);
    }
}
