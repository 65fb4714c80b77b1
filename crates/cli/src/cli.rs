//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// URL Dispatcher - wordlist-driven URL generation and paced dispatch
#[derive(Parser, Debug)]
#[command(
    name = "url-dispatcher",
    author,
    version,
    about = "Generate URLs from a wordlist and optionally dispatch them",
    long_about = "Renders a URL template for every word of a wordlist, saves the list, \n\
                  and with --send issues one GET per URL through a bounded worker pool \n\
                  paced by a per-worker or global delay.\n\n\
                  Only send requests to systems you are authorized to test."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "URL_DISPATCHER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (logs go to stderr)
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "URL_DISPATCHER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the URL list and optionally dispatch it
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
///
/// Unset dispatch flags fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "URL_DISPATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Wordlist, one word per line
    #[arg(short, long, env = "URL_DISPATCHER_WORDLIST")]
    pub wordlist: PathBuf,

    /// URL template with {word} and optional {time} placeholders
    #[arg(short, long, env = "URL_DISPATCHER_TEMPLATE")]
    pub template: Option<String>,

    /// Time value: "now", Unix epoch seconds, an ISO date/datetime, or a literal [default: now]
    #[arg(short = 'T', long)]
    pub time: Option<String>,

    /// strftime format used to render {time} [default: %Y-%m-%dT%H:%M:%S]
    #[arg(short = 'f', long)]
    pub time_format: Option<String>,

    /// Where to save the generated URLs
    #[arg(short, long, default_value = "generated_urls.txt", env = "URL_DISPATCHER_OUT")]
    pub out: PathBuf,

    /// Send the generated requests (authorized targets only)
    #[arg(long)]
    pub send: bool,

    /// Delay in seconds used by the pacing discipline [default: 1.0]
    #[arg(long, env = "URL_DISPATCHER_DELAY")]
    pub delay: Option<f64>,

    /// Concurrent workers [default: 4]
    #[arg(long, env = "URL_DISPATCHER_WORKERS")]
    pub workers: Option<usize>,

    /// Maximum URLs to generate and send (0 = all)
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// 0 = no delay, 1 = per-worker sleep, 2 = global strict spacing [default: 2]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub delay_mode: Option<u8>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long, env = "URL_DISPATCHER_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Override the User-Agent header
    #[arg(long, env = "URL_DISPATCHER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "URL_DISPATCHER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
