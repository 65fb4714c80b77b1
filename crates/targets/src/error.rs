//! Target generation error types

use std::path::PathBuf;

use thiserror::Error;

/// Target generation errors
#[derive(Debug, Error)]
pub enum TargetError {
    /// Wordlist could not be read
    #[error("failed to read wordlist {}: {source}", .path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// URL list could not be written
    #[error("failed to write targets to {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template is blank
    #[error("URL template cannot be empty")]
    EmptyTemplate,

    /// strftime format rejected by the formatter
    #[error("invalid time format '{format}'")]
    TimeFormat { format: String },
}

/// Targets Result alias
pub type Result<T> = std::result::Result<T, TargetError>;
