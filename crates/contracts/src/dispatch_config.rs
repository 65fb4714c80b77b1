//! Dispatch engine configuration shared across crates.

use std::time::Duration;

use crate::{ContractError, DelayMode};

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatch engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Number of concurrent workers (must be >= 1)
    pub workers: usize,

    /// Pacing discipline
    pub mode: DelayMode,

    /// Upper bound for a single transport call
    pub timeout: Duration,

    /// Only the first `max_targets` targets are dispatched (None = all)
    pub max_targets: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            mode: DelayMode::GlobalStrict(Duration::from_secs(1)),
            timeout: DEFAULT_TIMEOUT,
            max_targets: None,
        }
    }
}

impl DispatchConfig {
    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.workers < 1 {
            return Err(ContractError::config_validation(
                "workers",
                format!("workers must be >= 1, got {}", self.workers),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ContractError::config_validation(
                "timeout",
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Number of targets that will actually be dispatched out of `available`
    pub fn effective_len(&self, available: usize) -> usize {
        match self.max_targets {
            Some(max) => available.min(max),
            None => available,
        }
    }
}
