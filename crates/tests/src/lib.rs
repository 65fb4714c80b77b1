//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 生成 -> 分发 的端到端流程（MockTransport）
//! - HttpTransport 对本地 HTTP 响应器的真实请求

#[cfg(test)]
mod contract_tests {
    use contracts::{DelayMode, DispatchConfig};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_dispatch_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(
            config.mode,
            DelayMode::GlobalStrict(std::time::Duration::from_secs(1))
        );
        assert!(config.validate().is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::{DispatchEngine, MockTransport, MockTransportConfig, Target};
    use observability::OutcomeAggregator;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[dispatch]
workers = 3
delay_mode = 2
delay_secs = 0.05
max_targets = 4

[targets]
template = "http://lab.local/search?q={word}&at={time}"
time = "1700000000"
time_format = "%Y"
"#;

    /// End-to-end: config -> wordlist -> URL list on disk -> engine -> outcomes
    #[tokio::test(start_paused = true)]
    async fn test_e2e_config_to_outcomes() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let config = blueprint.dispatch.to_dispatch_config().unwrap();

        let dir = TempDir::new().unwrap();
        let words_path = dir.path().join("words.txt");
        fs::write(&words_path, "alpha\nbeta gamma\n\ndelta\nepsilon\nzeta\n").unwrap();

        let words = targets::read_wordlist(&words_path).unwrap();
        assert_eq!(words.len(), 5);

        let template =
            targets::UrlTemplate::new(blueprint.targets.template.as_deref().unwrap()).unwrap();
        let time =
            targets::resolve_time(&blueprint.targets.time, &blueprint.targets.time_format).unwrap();
        let list = template.generate(&words, &time);

        let out = dir.path().join("urls.txt");
        targets::save_targets(&list, &out).unwrap();
        let saved = fs::read_to_string(&out).unwrap();
        assert_eq!(saved.lines().count(), 5);
        assert!(saved.contains("q=beta+gamma"));

        let transport = Arc::new(MockTransport::new());
        let engine = DispatchEngine::with_shared_transport(config, Arc::clone(&transport)).unwrap();

        let mut aggregator = OutcomeAggregator::new();
        let mut report = engine
            .run_with(list.clone(), |o| aggregator.update(o))
            .await;
        report.sort_by_index();

        // max_targets = 4 cuts the fifth word
        assert_eq!(report.total, 4);
        assert_eq!(transport.call_count(), 4);
        for (outcome, expected) in report.outcomes.iter().zip(&list) {
            assert_eq!(&outcome.target, expected);
            assert_eq!(outcome.status(), Some(200));
        }
        assert_eq!(aggregator.summary().status_counts.get(&200), Some(&4));

        let times = transport.dispatch_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(50));
        }
    }

    #[tokio::test]
    async fn test_e2e_failures_do_not_stop_run() {
        let list: Vec<Target> = (0..20).map(|i| Target::from(format!("http://h/{i}"))).collect();
        let failing: Vec<String> = (0..20)
            .filter(|i| i % 3 == 0)
            .map(|i| format!("http://h/{i}"))
            .collect();

        let transport = MockTransport::with_config(MockTransportConfig {
            fail_targets: failing.clone(),
            ..Default::default()
        });
        let engine = DispatchEngine::new(
            contracts::DispatchConfig {
                workers: 5,
                mode: contracts::DelayMode::None,
                ..Default::default()
            },
            transport,
        )
        .unwrap();

        let report = engine.run(list).await;
        assert_eq!(report.outcomes.len(), 20);
        assert_eq!(report.failed, failing.len());

        let mut failed: Vec<String> = report
            .outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.target.to_string())
            .collect();
        failed.sort();
        let mut expected = failing;
        expected.sort();
        assert_eq!(failed, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_e2e_cancel_mid_run() {
        let transport = Arc::new(MockTransport::with_config(MockTransportConfig {
            latency: Duration::from_millis(10),
            ..Default::default()
        }));
        let engine = DispatchEngine::with_shared_transport(
            contracts::DispatchConfig {
                workers: 2,
                mode: contracts::DelayMode::PerWorkerSleep(Duration::from_millis(100)),
                ..Default::default()
            },
            Arc::clone(&transport),
        )
        .unwrap();

        let list: Vec<Target> = (0..50).map(|i| Target::from(format!("http://h/{i}"))).collect();
        let mut handle = engine.spawn(list);
        let token = handle.cancellation_token();

        let mut received = 0;
        while let Some(_outcome) = handle.recv().await {
            received += 1;
            if received == 6 {
                token.cancel();
            }
        }
        let report = handle.join().await;

        assert!(report.cancelled);
        assert!(report.completed >= 6);
        assert!(report.completed < 50);
        assert_eq!(report.completed + report.skipped, 50);
        assert_eq!(transport.call_count(), report.completed);
    }
}

#[cfg(test)]
mod http_tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use contracts::{DelayMode, DispatchConfig, OutcomeKind};
    use dispatcher::{DispatchEngine, HttpTransport, HttpTransportConfig, Target};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Hits = Arc<Mutex<Vec<(String, Instant)>>>;

    /// Minimal HTTP/1.1 responder: `/missing` is 404, `/slow` never answers
    /// in time, anything else is `200 hello`.
    async fn spawn_responder() -> (SocketAddr, Hits) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits: Hits = Arc::new(Mutex::new(Vec::new()));

        let server_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let hits = Arc::clone(&server_hits);
                tokio::spawn(async move {
                    let _ = respond(stream, hits).await;
                });
            }
        });

        (addr, hits)
    }

    async fn respond(mut stream: TcpStream, hits: Hits) -> std::io::Result<()> {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            request.extend_from_slice(&chunk[..n]);
        }

        let head = String::from_utf8_lossy(&request);
        let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
        hits.lock().unwrap().push((path.clone(), Instant::now()));

        let (status, body) = match path.as_str() {
            "/missing" => ("404 Not Found", "not found"),
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                ("200 OK", "late")
            }
            _ => ("200 OK", "hello"),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    }

    /// A local port with nothing listening
    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(
            "http",
            &HttpTransportConfig {
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_statuses_and_failures() {
        let (addr, hits) = spawn_responder().await;
        let refused = closed_port().await;

        let list = vec![
            Target::from(format!("http://{addr}/?q=one")),
            Target::from(format!("http://{addr}/missing")),
            Target::from(format!("http://{addr}/slow")),
            Target::from(format!("http://{refused}/")),
        ];
        let engine = DispatchEngine::new(
            DispatchConfig {
                workers: 4,
                mode: DelayMode::None,
                timeout: Duration::from_millis(500),
                max_targets: None,
            },
            transport(),
        )
        .unwrap();

        let mut report = engine.run(list).await;
        report.sort_by_index();
        let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind.clone()).collect();

        assert_eq!(
            kinds[0],
            OutcomeKind::Success {
                status: 200,
                body_size: 5
            }
        );
        assert_eq!(
            kinds[1],
            OutcomeKind::Success {
                status: 404,
                body_size: 9
            }
        );
        match &kinds[2] {
            OutcomeKind::Failure { error } => assert!(error.contains("timed out"), "got: {error}"),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(matches!(kinds[3], OutcomeKind::Failure { .. }));

        let paths: Vec<String> = hits.lock().unwrap().iter().map(|(p, _)| p.clone()).collect();
        assert!(paths.contains(&"/?q=one".to_string()));
        assert!(paths.contains(&"/slow".to_string()));
    }

    #[tokio::test]
    async fn test_http_global_strict_spacing_on_the_wire() {
        let (addr, hits) = spawn_responder().await;
        let interval = Duration::from_millis(100);
        let n = 5;

        let list: Vec<Target> = (0..n)
            .map(|i| Target::from(format!("http://{addr}/?id={i}")))
            .collect();
        let engine = DispatchEngine::new(
            DispatchConfig {
                workers: 4,
                mode: DelayMode::GlobalStrict(interval),
                timeout: Duration::from_secs(5),
                max_targets: None,
            },
            transport(),
        )
        .unwrap();

        let started = Instant::now();
        let report = engine.run(list).await;
        assert!(started.elapsed() >= interval * (n - 1));
        assert_eq!(report.succeeded, n as usize);

        let mut arrivals: Vec<Instant> = hits.lock().unwrap().iter().map(|(_, t)| *t).collect();
        arrivals.sort();
        assert_eq!(arrivals.len(), n as usize);

        // Connection setup adds a little jitter between send and arrival.
        let tolerance = Duration::from_millis(20);
        for pair in arrivals.windows(2) {
            assert!(pair[1] - pair[0] + tolerance >= interval);
        }
    }
}
