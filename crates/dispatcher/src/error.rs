//! Dispatcher error types

use thiserror::Error;

/// Engine-level errors. Per-target failures are `Outcome`s, never these.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invalid configuration, reported before any dispatch
    #[error("invalid dispatch config: {0}")]
    Config(#[source] contracts::ContractError),

    /// HTTP client could not be built
    #[error("failed to build transport '{name}': {message}")]
    TransportBuild { name: String, message: String },
}

impl DispatchError {
    /// Create a transport build error
    pub fn transport_build(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportBuild {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<contracts::ContractError> for DispatchError {
    fn from(err: contracts::ContractError) -> Self {
        Self::Config(err)
    }
}
