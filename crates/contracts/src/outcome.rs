//! Outcome - per-target result record

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::Target;

/// Result of one dispatched target.
///
/// Exactly one `Outcome` is emitted per dispatched target. `index` is the
/// target's position in the submitted list, so callers that need submission
/// order can sort on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Position in the original target list
    pub index: usize,
    /// The dispatched target
    pub target: Target,
    /// Wall time of the transport call (pacing excluded)
    pub latency: Duration,
    /// Success or failure payload
    pub kind: OutcomeKind,
}

/// Tagged result payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OutcomeKind {
    Success { status: u16, body_size: u64 },
    Failure { error: String },
}

impl Outcome {
    pub fn success(
        index: usize,
        target: Target,
        latency: Duration,
        status: u16,
        body_size: u64,
    ) -> Self {
        Self {
            index,
            target,
            latency,
            kind: OutcomeKind::Success { status, body_size },
        }
    }

    pub fn failure(
        index: usize,
        target: Target,
        latency: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            target,
            latency,
            kind: OutcomeKind::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, OutcomeKind::Success { .. })
    }

    /// Status code for successes
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            OutcomeKind::Success { status, .. } => Some(status),
            OutcomeKind::Failure { .. } => None,
        }
    }
}

/// `<target> <status> <size>` or `<target> ERR <error>`
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OutcomeKind::Success { status, body_size } => {
                write!(f, "{} {} {}", self.target, status, body_size)
            }
            OutcomeKind::Failure { error } => write!(f, "{} ERR {}", self.target, error),
        }
    }
}
