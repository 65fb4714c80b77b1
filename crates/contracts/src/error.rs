//! Layered error definitions
//!
//! Categorized by source: config / transport / io

use std::time::Duration;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Connection refused, DNS failure, TLS failure...
    #[error("transport '{transport}' request error: {message}")]
    TransportRequest { transport: String, message: String },

    /// Request exceeded its deadline
    #[error("request timed out after {:.3}s", .elapsed.as_secs_f64())]
    TransportTimeout { elapsed: Duration },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport request error
    pub fn transport_request(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportRequest {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create transport timeout error
    pub fn transport_timeout(elapsed: Duration) -> Self {
        Self::TransportTimeout { elapsed }
    }

    /// Whether this error comes from configuration misuse
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}
