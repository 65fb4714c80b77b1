//! DelayMode - pacing discipline applied before each request

use std::fmt;
use std::time::Duration;

use crate::ContractError;

/// Longest accepted delay between dispatches (one day)
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Pacing policy governing when a worker may perform its network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayMode {
    /// Dispatch immediately; bursts are limited only by worker count.
    #[default]
    None,
    /// Each worker sleeps `d` before each of its own calls.
    PerWorkerSleep(Duration),
    /// No two calls across any workers start less than `d` apart.
    GlobalStrict(Duration),
}

impl DelayMode {
    /// Build a mode from the numeric selector used on the command line.
    ///
    /// - `0` no extra delay
    /// - `1` per-worker pre-request sleep
    /// - `2` global strict rate limit
    pub fn from_selector(selector: u8, delay_secs: f64) -> Result<Self, ContractError> {
        let delay = Duration::try_from_secs_f64(delay_secs)
            .ok()
            .filter(|_| delay_secs <= MAX_DELAY_SECS)
            .ok_or_else(|| {
                ContractError::config_validation(
                    "delay",
                    format!("delay must be within 0..={MAX_DELAY_SECS} seconds, got {delay_secs}"),
                )
            })?;
        match selector {
            0 => Ok(Self::None),
            1 => Ok(Self::PerWorkerSleep(delay)),
            2 => Ok(Self::GlobalStrict(delay)),
            other => Err(ContractError::config_validation(
                "delay_mode",
                format!("unknown delay mode {other}, expected 0, 1 or 2"),
            )),
        }
    }

    /// Numeric selector for this mode
    pub fn selector(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::PerWorkerSleep(_) => 1,
            Self::GlobalStrict(_) => 2,
        }
    }

    /// Configured delay (zero for `None`)
    pub fn delay(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::PerWorkerSleep(d) | Self::GlobalStrict(d) => *d,
        }
    }

    /// Short label used in logs and metric labels
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PerWorkerSleep(_) => "per_worker",
            Self::GlobalStrict(_) => "global_strict",
        }
    }
}

impl fmt::Display for DelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::PerWorkerSleep(d) => write!(f, "per_worker({:.3}s)", d.as_secs_f64()),
            Self::GlobalStrict(d) => write!(f, "global_strict({:.3}s)", d.as_secs_f64()),
        }
    }
}
