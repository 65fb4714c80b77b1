//! Config validation
//!
//! Rules:
//! - the dispatch section converts into a valid `DispatchConfig`
//! - dispatch ranges (derive): workers in 1..=1024, delay_mode <= 2,
//!   delay_secs in 0..=86400, timeout_secs > 0
//! - template, when present, is not blank
//! - time_format is not blank

use contracts::{ContractError, DispatchBlueprint};
use ::validator::Validate;

/// Validate a DispatchBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    validate_dispatch(blueprint)?;
    validate_ranges(blueprint)?;
    validate_targets(blueprint)?;
    Ok(())
}

/// Declarative range checks from the derive attributes
fn validate_ranges(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("dispatch", e.to_string()))
}

/// Cross-field checks on the dispatch section
fn validate_dispatch(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    blueprint.dispatch.to_dispatch_config().map(|_| ())
}

/// Target generation settings
fn validate_targets(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let targets = &blueprint.targets;

    if let Some(template) = &targets.template {
        if template.trim().is_empty() {
            return Err(ContractError::config_validation(
                "targets.template",
                "template cannot be empty",
            ));
        }
    }

    if targets.time_format.is_empty() {
        return Err(ContractError::config_validation(
            "targets.time_format",
            "time_format cannot be empty",
        ));
    }

    Ok(())
}
