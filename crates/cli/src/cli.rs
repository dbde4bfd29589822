//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Batch Dispatch - feed line-oriented input to a rate-limited processor
#[derive(Parser, Debug)]
#[command(
    name = "batch-dispatch",
    author,
    version,
    about = "Rate-aware batch dispatcher",
    long_about = "Feeds an ordered list of items to a rate-limited processor.\n\n\
                  Batches respect the processor's size and pacing limits, blocked \n\
                  submissions are retried after a fixed delay, and an interrupted run \n\
                  reports the position to resume from."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BATCH_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BATCH_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Prometheus port requested by the active command, if any
    pub fn metrics_port(&self) -> Option<u16> {
        match &self.command {
            Commands::Run(args) if args.metrics_port != 0 => Some(args.metrics_port),
            _ => None,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch the input file through the configured processor
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "dispatch.toml",
        env = "BATCH_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Input file, one item per line
    #[arg(short, long, env = "BATCH_DISPATCH_INPUT")]
    pub input: PathBuf,

    /// Index of the first item to dispatch (progress index + 1 of an earlier run)
    #[arg(long, default_value = "0", env = "BATCH_DISPATCH_RESUME_FROM")]
    pub resume_from: usize,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "BATCH_DISPATCH_TIMEOUT")]
    pub timeout: u64,

    /// Override the configured retry delay after a blocked submission
    #[arg(long, env = "BATCH_DISPATCH_RETRY_DELAY_MS")]
    pub retry_delay_ms: Option<u64>,

    /// Skip blank input lines instead of dispatching them as empty items
    #[arg(long)]
    pub skip_blank: bool,

    /// Log a progress line every N seconds (0 = disabled)
    #[arg(long, default_value = "0", env = "BATCH_DISPATCH_PROGRESS_INTERVAL")]
    pub progress_interval: u64,

    /// Validate configuration and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BATCH_DISPATCH_METRICS_PORT")]
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

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show processor parameters
    #[arg(long)]
    pub params: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "batch-dispatch",
            "run",
            "--input",
            "items.txt",
            "--resume-from",
            "42",
            "--metrics-port",
            "9100",
        ])
        .unwrap();

        assert_eq!(cli.metrics_port(), Some(9100));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.input, PathBuf::from("items.txt"));
                assert_eq!(args.config, PathBuf::from("dispatch.toml"));
                assert_eq!(args.resume_from, 42);
                assert_eq!(args.retry_delay_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_input() {
        assert!(Cli::try_parse_from(["batch-dispatch", "run"]).is_err());
    }

    #[test]
    fn test_validate_has_no_metrics_port() {
        let cli = Cli::try_parse_from(["batch-dispatch", "-q", "validate", "--json"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.metrics_port(), None);
    }
}
