//! Pacer - applies a DelayMode before each transport call

use std::sync::Arc;
use std::time::Duration;

use contracts::DelayMode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::rate_gate::{Cancelled, RateGate};

/// Per-worker view of the run's pacing discipline.
///
/// All pacers of a run share one `RateGate`.
#[derive(Debug, Clone)]
pub struct Pacer {
    mode: DelayMode,
    gate: Arc<RateGate>,
}

impl Pacer {
    pub fn new(mode: DelayMode, gate: Arc<RateGate>) -> Self {
        Self { mode, gate }
    }

    pub fn mode(&self) -> DelayMode {
        self.mode
    }

    /// Wait as the discipline requires; returns how long the caller was held.
    ///
    /// A zero delay paces nothing in either sleeping mode.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<Duration, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let start = Instant::now();
        match self.mode {
            DelayMode::None => {}
            DelayMode::PerWorkerSleep(d) if d.is_zero() => {}
            DelayMode::GlobalStrict(d) if d.is_zero() => {}
            DelayMode::PerWorkerSleep(d) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(Cancelled),
                    () = tokio::time::sleep(d) => {}
                }
            }
            DelayMode::GlobalStrict(d) => {
                self.gate.acquire_cancellable(d, cancel).await?;
            }
        }
        Ok(start.elapsed())
    }
}
