//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::DispatchBlueprint;
use dispatcher::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

const AUTHORIZATION_WARNING: &str =
    "WARNING: --send issues real HTTP requests. Only target systems you are authorized to test.";

/// Execute the `run` command
pub async fn run_dispatch(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args)?;
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    info!(
        wordlist = %args.wordlist.display(),
        workers = blueprint.dispatch.workers,
        delay_mode = blueprint.dispatch.delay_mode,
        delay_secs = blueprint.dispatch.delay_secs,
        send = args.send,
        "Configuration loaded"
    );

    if args.send {
        eprintln!("{}", AUTHORIZATION_WARNING);
    }

    let cancel = CancellationToken::new();
    cancel_on_shutdown_signal(cancel.clone());

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        wordlist: args.wordlist.clone(),
        out: args.out.clone(),
        send: args.send,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    let stats = pipeline
        .run(cancel)
        .await
        .context("Pipeline execution failed")?;
    stats.print_summary();

    Ok(())
}

/// Config file if given, built-in defaults otherwise
fn load_blueprint(args: &RunArgs) -> crate::error::Result<DispatchBlueprint> {
    let Some(path) = &args.config else {
        return Ok(DispatchBlueprint::default());
    };
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    info!(config = %path.display(), "Loading configuration");
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}

/// Flags win over file values
fn apply_overrides(blueprint: &mut DispatchBlueprint, args: &RunArgs) {
    let dispatch = &mut blueprint.dispatch;
    if let Some(workers) = args.workers {
        dispatch.workers = workers;
    }
    if let Some(mode) = args.delay_mode {
        dispatch.delay_mode = mode;
    }
    if let Some(delay) = args.delay {
        dispatch.delay_secs = delay;
    }
    if let Some(timeout) = args.timeout {
        dispatch.timeout_secs = timeout;
    }
    if let Some(max) = args.max_urls {
        dispatch.max_targets = Some(max);
    }

    let targets = &mut blueprint.targets;
    if let Some(template) = &args.template {
        targets.template = Some(template.clone());
    }
    if let Some(time) = &args.time {
        targets.time = time.clone();
    }
    if let Some(format) = &args.time_format {
        targets.time_format = format.clone();
    }

    if let Some(agent) = &args.user_agent {
        blueprint.http.user_agent = Some(agent.clone());
    }
    if args.insecure {
        blueprint.http.accept_invalid_certs = true;
    }
}

/// Cancel on Ctrl+C or SIGTERM; in-flight requests still finish
fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, finishing in-flight requests");
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["url-dispatcher", "run", "-w", "words.txt"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let args = run_args(&[]);
        let bp = load_blueprint(&args).unwrap();
        assert_eq!(bp.dispatch.workers, 4);
        assert_eq!(bp.dispatch.delay_mode, 2);
        assert_eq!(bp.dispatch.delay_secs, 1.0);
        assert_eq!(bp.dispatch.timeout_secs, 10.0);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dispatch.toml");
        fs::write(
            &path,
            r#"
[dispatch]
workers = 2
delay_mode = 1
delay_secs = 0.5

[targets]
template = "http://file/{word}"
"#,
        )
        .unwrap();

        let config = path.to_str().unwrap();
        let args = run_args(&[
            "-c",
            config,
            "--workers",
            "6",
            "--template",
            "http://flag/{word}",
            "--max-urls",
            "0",
            "--insecure",
        ]);
        let mut bp = load_blueprint(&args).unwrap();
        apply_overrides(&mut bp, &args);

        assert_eq!(bp.dispatch.workers, 6);
        assert_eq!(bp.dispatch.delay_mode, 1);
        assert_eq!(bp.dispatch.delay_secs, 0.5);
        assert_eq!(bp.targets.template.as_deref(), Some("http://flag/{word}"));
        assert!(bp.http.accept_invalid_certs);
        // 0 means "all"
        assert_eq!(bp.dispatch.to_dispatch_config().unwrap().max_targets, None);
    }

    #[test]
    fn test_missing_config_file() {
        let args = run_args(&["-c", "/nonexistent/dispatch.toml"]);
        let err = load_blueprint(&args).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }
}
