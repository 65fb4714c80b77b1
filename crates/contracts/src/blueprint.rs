//! DispatchBlueprint - Config Loader output
//!
//! Describes a complete dispatch run: pacing, target generation and HTTP
//! client settings. Every section is optional; CLI flags override values.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::{ContractError, DelayMode, DispatchConfig, DEFAULT_TIMEOUT, DEFAULT_WORKERS};

/// Default time substituted into `{time}`
pub const DEFAULT_TIME: &str = "now";

/// Default strftime format for `{time}`
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete run blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DispatchBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Worker pool and pacing
    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchSection,

    /// Target generation
    #[serde(default)]
    pub targets: TargetsSection,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSection,
}

/// `[dispatch]` section
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchSection {
    /// Concurrent workers
    #[serde(default = "default_workers")]
    #[validate(range(min = 1, max = 1024))]
    pub workers: usize,

    /// 0 = none, 1 = per-worker sleep, 2 = global strict
    #[serde(default = "default_delay_mode")]
    #[validate(range(max = 2))]
    pub delay_mode: u8,

    /// Delay in seconds, at most one day
    #[serde(default = "default_delay_secs")]
    #[validate(range(min = 0.0, max = 86_400.0))]
    pub delay_secs: f64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(exclusive_min = 0.0))]
    pub timeout_secs: f64,

    /// Cap on dispatched targets (0 or absent = all)
    #[serde(default)]
    pub max_targets: Option<usize>,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_delay_mode() -> u8 {
    2
}

fn default_delay_secs() -> f64 {
    1.0
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            delay_mode: default_delay_mode(),
            delay_secs: default_delay_secs(),
            timeout_secs: default_timeout_secs(),
            max_targets: None,
        }
    }
}

impl DispatchSection {
    /// Convert into the engine's configuration
    pub fn to_dispatch_config(&self) -> Result<DispatchConfig, ContractError> {
        let timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                ContractError::config_validation(
                    "dispatch.timeout_secs",
                    format!("timeout must be > 0, got {}", self.timeout_secs),
                )
            })?;
        let config = DispatchConfig {
            workers: self.workers,
            mode: DelayMode::from_selector(self.delay_mode, self.delay_secs)?,
            timeout,
            max_targets: self.max_targets.filter(|&n| n > 0),
        };
        config.validate()?;
        Ok(config)
    }
}

/// `[targets]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsSection {
    /// URL template with `{word}` and `{time}` placeholders
    #[serde(default)]
    pub template: Option<String>,

    /// `now`, a Unix epoch, an ISO date/time, or a literal
    #[serde(default = "default_time")]
    pub time: String,

    /// strftime format used to render `{time}`
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

fn default_time() -> String {
    DEFAULT_TIME.to_string()
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl Default for TargetsSection {
    fn default() -> Self {
        Self {
            template: None,
            time: default_time(),
            time_format: default_time_format(),
        }
    }
}

/// `[http]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSection {
    /// User-Agent header (None = client default)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Follow 3xx redirects
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Skip TLS certificate verification (lab targets)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_follow_redirects() -> bool {
    true
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            user_agent: None,
            follow_redirects: default_follow_redirects(),
            accept_invalid_certs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let bp: DispatchBlueprint = toml::from_str("").unwrap();
        assert_eq!(bp.dispatch.workers, DEFAULT_WORKERS);
        assert_eq!(bp.dispatch.delay_mode, 2);
        assert_eq!(bp.targets.time, "now");
        assert!(bp.http.follow_redirects);
        assert!(bp.validate().is_ok());
    }

    #[test]
    fn test_to_dispatch_config() {
        let section = DispatchSection {
            workers: 8,
            delay_mode: 1,
            delay_secs: 0.5,
            timeout_secs: 2.0,
            max_targets: Some(0),
        };
        let config = section.to_dispatch_config().unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(
            config.mode,
            DelayMode::PerWorkerSleep(Duration::from_millis(500))
        );
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.max_targets, None);
    }

    #[test]
    fn test_zero_workers_fails_validation() {
        let mut bp = DispatchBlueprint::default();
        bp.dispatch.workers = 0;
        assert!(bp.validate().is_err());
        assert!(bp.dispatch.to_dispatch_config().is_err());
    }

    #[test]
    fn test_bad_delay_mode_fails_validation() {
        let mut bp = DispatchBlueprint::default();
        bp.dispatch.delay_mode = 7;
        assert!(bp.validate().is_err());
    }
}
