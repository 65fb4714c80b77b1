//! Pipeline orchestrator - generate, save, and optionally dispatch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use contracts::DispatchBlueprint;
use dispatcher::{CancellationToken, DispatchEngine, HttpTransport, HttpTransportConfig, Target};
use observability::OutcomeAggregator;
use targets::{read_wordlist, resolve_time, save_targets, UrlTemplate};
use tracing::{debug, info, instrument, warn};

use super::PipelineStats;
use crate::error::{CliError, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Blueprint after CLI overrides
    pub blueprint: DispatchBlueprint,

    /// Wordlist path
    pub wordlist: PathBuf,

    /// Where the generated list is saved
    pub out: PathBuf,

    /// Dispatch the list after saving it
    pub send: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline; `cancel` stops dispatching new requests
    #[instrument(name = "pipeline_run", skip(self, cancel), fields(send = self.config.send))]
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats> {
        let start = Instant::now();
        let blueprint = &self.config.blueprint;

        // Fail on bad dispatch settings before touching any file.
        let dispatch_config = blueprint.dispatch.to_dispatch_config()?;

        let (words, targets) =
            build_targets(blueprint, &self.config.wordlist, dispatch_config.max_targets)?;
        save_targets(&targets, &self.config.out)?;
        info!(
            words,
            urls = targets.len(),
            out = %self.config.out.display(),
            "URL list saved"
        );

        let mut stats = PipelineStats {
            words,
            generated: targets.len(),
            output: self.config.out.clone(),
            ..Default::default()
        };

        if !self.config.send {
            stats.duration = start.elapsed();
            return Ok(stats);
        }

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let transport = HttpTransport::new(
            "http",
            &HttpTransportConfig::from_section(&blueprint.http, dispatch_config.timeout),
        )?;
        let engine = DispatchEngine::new(dispatch_config, transport)?;

        let mut aggregator = OutcomeAggregator::new();
        let report = engine
            .run_with_token(targets, cancel, |outcome| {
                println!("{}", outcome);
                aggregator.update(outcome);
            })
            .await;
        if !report.panicked.is_empty() {
            warn!(workers = ?report.panicked, "Worker tasks panicked, their targets have no outcome");
        }

        stats.outcomes = aggregator;
        stats.report = Some(report);
        stats.duration = start.elapsed();
        Ok(stats)
    }
}

/// Read the wordlist, apply the limit, and render every word.
///
/// Returns the number of words read alongside the rendered targets.
pub fn build_targets(
    blueprint: &DispatchBlueprint,
    wordlist: &Path,
    limit: Option<usize>,
) -> Result<(usize, Vec<Target>)> {
    let template = blueprint
        .targets
        .template
        .as_deref()
        .ok_or(CliError::MissingTemplate)?;
    let template = UrlTemplate::new(template)?;

    let mut words = read_wordlist(wordlist)?;
    let read = words.len();
    if let Some(limit) = limit {
        words.truncate(limit);
    }

    let time = resolve_time(&blueprint.targets.time, &blueprint.targets.time_format)?;
    debug!(time = %time, template = template.as_str(), "Rendering URLs");

    Ok((read, template.generate(&words, &time)))
}
