//! # Dispatcher
//!
//! 并发分发引擎。
//!
//! 负责：
//! - 以固定数量的 worker 消费目标列表
//! - 按 `DelayMode` 节流（无 / 每 worker 睡眠 / 全局最小间隔）
//! - 每个目标产出一个 `Outcome`，单个失败不影响整体

pub mod engine;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod pacing;
pub mod rate_gate;
pub mod transports;
mod worker;

pub use contracts::{DelayMode, DispatchConfig, Outcome, OutcomeKind, Target, Transport};
pub use engine::DispatchEngine;
pub use error::DispatchError;
pub use handle::{DispatchHandle, DispatchReport};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use pacing::Pacer;
pub use rate_gate::{Cancelled, RateGate};
pub use tokio_util::sync::CancellationToken;
pub use transports::{HttpTransport, HttpTransportConfig, MockTransport, MockTransportConfig};
