//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::InvestigationMode;
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full report: findings, critiques, convergence history
    Full,
    /// Overall severity, confidence and synthesis only
    Summary,
    /// JSON output
    Json,
}

/// Investigation mode forced from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One worker for the primary signal, single pass
    Fast,
    /// All workers, single pass
    Standard,
    /// All workers with critique rounds
    Debate,
}

impl From<ModeArg> for InvestigationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fast => InvestigationMode::Fast,
            ModeArg::Standard => InvestigationMode::Standard,
            ModeArg::Debate => InvestigationMode::Debate,
        }
    }
}

/// CLI arguments for signal-council
#[derive(Parser, Debug)]
#[command(name = "signal-council")]
#[command(author, version, about = "Observability council - specialist workers investigate, debate and converge")]
#[command(long_about = r#"
Signal Council sends an investigation query to specialist workers, one per
observability signal (alerts, metrics, logs, traces, SQL), and merges their
findings into one assessment.

The intent classifier picks a mode unless --mode is given:
  fast      one worker for the query's primary signal, single pass
  standard  every worker, single pass
  debate    every worker, then critique and re-analysis rounds until
            confidence reaches the threshold or the round limit is hit

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>          Explicit config file
3. ./council.toml           Project-level config
4. ~/.config/signal-council/config.toml   Global config

Example:
  signal-council "is checkout healthy?"
  signal-council --mode debate "why is checkout failing since the 14:00 deploy?"
  signal-council --classify-only "p99 latency spike on payments"
"#)]
pub struct Cli {
    /// The investigation query
    #[arg(required_unless_present = "show_config")]
    pub query: Option<String>,

    /// Investigation id used in logs and telemetry (generated if omitted)
    #[arg(long, value_name = "ID")]
    pub investigation_id: Option<String>,

    /// Force the investigation mode instead of classifying the query
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Maximum debate rounds after the initial pass
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Confidence that ends the debate early (0.0 - 1.0)
    #[arg(long, value_name = "CONFIDENCE")]
    pub threshold: Option<f64>,

    /// Pipeline timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append council events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub telemetry_log: Option<PathBuf>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the intent classifier decision and exit
    #[arg(long)]
    pub classify_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "signal-council",
            "--mode",
            "debate",
            "--max-rounds",
            "2",
            "--threshold",
            "0.9",
            "-o",
            "json",
            "-vv",
            "why is checkout failing",
        ])
        .unwrap();

        assert_eq!(cli.query.as_deref(), Some("why is checkout failing"));
        assert_eq!(cli.mode.map(InvestigationMode::from), Some(InvestigationMode::Debate));
        assert_eq!(cli.max_rounds, Some(2));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_query_required_unless_show_config() {
        assert!(Cli::try_parse_from(["signal-council"]).is_err());
        assert!(Cli::try_parse_from(["signal-council", "--show-config"]).is_ok());
    }
}
