//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Neither --template nor `[targets].template` was given
    #[error("No URL template: pass --template or set [targets].template")]
    MissingTemplate,

    /// Configuration rejected after CLI overrides
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Wordlist, template, time or output failure
    #[error(transparent)]
    Targets(#[from] targets::TargetError),

    /// Engine could not start or a worker died
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] dispatcher::DispatchError),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
