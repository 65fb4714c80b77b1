//! MockTransport - in-process transport for tests and dry runs

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{ContractError, Target, Transport, TransportResponse};
use tokio::time::Instant;
use tracing::trace;

/// Configuration for MockTransport
#[derive(Debug, Clone)]
pub struct MockTransportConfig {
    pub status: u16,
    pub body_size: u64,
    /// Simulated latency of every call
    pub latency: Duration,
    /// Targets answered with a transport error
    pub fail_targets: Vec<String>,
    /// Targets that never answer
    pub hang_targets: Vec<String>,
    /// Targets whose call panics
    pub panic_targets: Vec<String>,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body_size: 10,
            latency: Duration::ZERO,
            fail_targets: Vec::new(),
            hang_targets: Vec::new(),
            panic_targets: Vec::new(),
        }
    }
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub target: Target,
    pub at: Instant,
}

/// Transport that answers from configuration and records every call
#[derive(Debug)]
pub struct MockTransport {
    name: String,
    status: u16,
    body_size: u64,
    latency: Duration,
    fail: HashSet<String>,
    hang: HashSet<String>,
    panic: HashSet<String>,
    calls: Mutex<Vec<MockCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Every call succeeds with `(200, 10)`
    pub fn new() -> Self {
        Self::with_config(MockTransportConfig::default())
    }

    pub fn with_config(config: MockTransportConfig) -> Self {
        Self {
            name: "mock".to_string(),
            status: config.status,
            body_size: config.body_size,
            latency: config.latency,
            fail: config.fail_targets.into_iter().collect(),
            hang: config.hang_targets.into_iter().collect(),
            panic: config.panic_targets.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Call start instants, sorted
    pub fn dispatch_times(&self) -> Vec<Instant> {
        let mut times: Vec<_> = self.calls().into_iter().map(|c| c.at).collect();
        times.sort();
        times
    }

    /// Highest number of simultaneous calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    fn enter(&self, target: &Target) -> InFlightGuard<'_> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockCall {
                target: target.clone(),
                at: Instant::now(),
            });
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        InFlightGuard(&self.in_flight)
    }
}

/// Decrements the in-flight count even when the call future is dropped
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        target: &Target,
        _timeout: Duration,
    ) -> Result<TransportResponse, ContractError> {
        let _guard = self.enter(target);
        trace!(target = %target, "Mock call");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.hang.contains(target.as_str()) {
            std::future::pending::<()>().await;
        }
        if self.panic.contains(target.as_str()) {
            panic!("mock transport panicked on {target}");
        }
        if self.fail.contains(target.as_str()) {
            return Err(ContractError::transport_request(&self.name, "mock failure"));
        }

        Ok(TransportResponse {
            status: self.status,
            body_size: self.body_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_answers_ok() {
        let mock = MockTransport::new();
        let resp = mock
            .send(&Target::from("http://a/"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_size, 10);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].target, "http://a/");
    }

    #[tokio::test]
    async fn test_configured_failures() {
        let mock = MockTransport::with_config(MockTransportConfig {
            status: 404,
            fail_targets: vec!["http://bad/".into()],
            ..Default::default()
        });
        assert!(mock.send(&"http://bad/".into(), Duration::from_secs(1)).await.is_err());
        let ok = mock.send(&"http://good/".into(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(ok.status, 404);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_hang_releases_in_flight() {
        let mock = MockTransport::with_config(MockTransportConfig {
            hang_targets: vec!["http://hang/".into()],
            ..Default::default()
        });
        let target = Target::from("http://hang/");
        let result = tokio::time::timeout(
            Duration::from_millis(100),
            mock.send(&target, Duration::from_millis(100)),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(mock.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(mock.peak_in_flight(), 1);
    }
}
