//! 分发指标收集模块
//!
//! 基于 Outcome 记录请求结果与节流等待时间，并在内存中汇总运行摘要。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{Outcome, OutcomeKind};
use metrics::{counter, histogram};

/// 记录单个目标的分发结果
///
/// 每产出一个 `Outcome` 调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_outcome;
///
/// while let Some(outcome) = handle.recv().await {
///     record_outcome(&outcome);
/// }
/// ```
pub fn record_outcome(outcome: &Outcome) {
    let status = match &outcome.kind {
        OutcomeKind::Success { status, .. } => status.to_string(),
        OutcomeKind::Failure { .. } => "error".to_string(),
    };
    counter!("url_dispatcher_requests_total", "status" => status).increment(1);

    histogram!("url_dispatcher_request_latency_ms").record(duration_ms(outcome.latency));

    if let OutcomeKind::Success { body_size, .. } = outcome.kind {
        histogram!("url_dispatcher_response_bytes").record(body_size as f64);
    }
}

/// 记录节流等待时间
pub fn record_pacing_wait(mode: &'static str, waited: Duration) {
    histogram!("url_dispatcher_pacing_wait_ms", "mode" => mode).record(duration_ms(waited));
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// 分发结果聚合器
///
/// 在内存中聚合结果，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct OutcomeAggregator {
    /// 结果总数
    pub total: u64,

    /// 失败数（传输错误或超时）
    pub failures: u64,

    /// 各状态码计数
    pub status_counts: BTreeMap<u16, u64>,

    /// 响应体字节总数
    pub total_bytes: u64,

    /// 延迟统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl OutcomeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: &Outcome) {
        self.total += 1;
        self.latency_stats.push(duration_ms(outcome.latency));

        match outcome.kind {
            OutcomeKind::Success { status, body_size } => {
                *self.status_counts.entry(status).or_insert(0) += 1;
                self.total_bytes += body_size;
            }
            OutcomeKind::Failure { .. } => self.failures += 1,
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.total,
            failures: self.failures,
            failure_rate: if self.total > 0 {
                self.failures as f64 / self.total as f64 * 100.0
            } else {
                0.0
            },
            total_bytes: self.total_bytes,
            latency_ms: StatsSummary::from(&self.latency_stats),
            status_counts: self.status_counts.clone(),
        }
    }
}

/// 运行摘要
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub total_bytes: u64,
    pub latency_ms: StatsSummary,
    pub status_counts: BTreeMap<u16, u64>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total requests: {}", self.total)?;
        writeln!(
            f,
            "Failures: {} ({:.2}%)",
            self.failures, self.failure_rate
        )?;
        writeln!(f, "Response bytes: {}", self.total_bytes)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.status_counts.is_empty() {
            writeln!(f, "Status codes:")?;
            for (status, count) in &self.status_counts {
                writeln!(f, "  {}: {}", status, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
            self.min, self.max, self.mean, self.std_dev, self.count
        )
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
