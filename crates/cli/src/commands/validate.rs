//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DelayMode, DispatchBlueprint};
use serde::Serialize;
use targets::{UrlTemplate, WORD_PLACEHOLDER};
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    workers: usize,
    delay_mode: String,
    delay_secs: f64,
    timeout_secs: f64,
    max_targets: Option<usize>,
    template: Option<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let dispatch = &blueprint.dispatch;
            let mode = DelayMode::from_selector(dispatch.delay_mode, dispatch.delay_secs)
                .map(|m| m.to_string())
                .unwrap_or_else(|_| dispatch.delay_mode.to_string());

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    workers: dispatch.workers,
                    delay_mode: mode,
                    delay_secs: dispatch.delay_secs,
                    timeout_secs: dispatch.timeout_secs,
                    max_targets: dispatch.max_targets.filter(|&n| n > 0),
                    template: blueprint.targets.template.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &DispatchBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    match blueprint.targets.template.as_deref().map(UrlTemplate::new) {
        None => warnings.push(
            "No [targets].template - --template must be given on the command line".to_string(),
        ),
        Some(Ok(template)) if !template.has_word_placeholder() => warnings.push(format!(
            "Template has no {} placeholder - every URL will be identical",
            WORD_PLACEHOLDER
        )),
        Some(_) => {}
    }

    if blueprint.dispatch.delay_mode == 0 && blueprint.dispatch.workers > 1 {
        warnings.push(format!(
            "delay_mode = 0 with {} workers sends without any pacing",
            blueprint.dispatch.workers
        ));
    }

    if blueprint.http.accept_invalid_certs {
        warnings.push("http.accept_invalid_certs disables TLS verification".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Workers: {}", summary.workers);
            println!("  Pacing: {}", summary.delay_mode);
            println!("  Timeout: {}s", summary.timeout_secs);
            match summary.max_targets {
                Some(n) => println!("  Max URLs: {}", n),
                None => println!("  Max URLs: all"),
            }
            if let Some(ref template) = summary.template {
                println!("  Template: {}", template);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
