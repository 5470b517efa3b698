//! CLI argument definitions for Ferroscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run the full screening pipeline once |
//! | `analyze` | Kill verdict or score breakdown for every snapshot |
//! | `criteria` | Print the effective scan criteria |
//! | `monitor` | Re-scan a watchlist on an interval |
//! | `status` | Check source health |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | none | TOML configuration file |
//! | `--source` | `mock` | Snapshot source |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Scan the reference tape
//! ferroscan scan --format table
//!
//! # Scan a watchlist on Finnhub with a tighter price band
//! FINNHUB_API_KEY=... ferroscan --source finnhub scan VERO JFBR --max-price 10
//!
//! # Re-scan every minute, three times
//! ferroscan monitor VERO,JFBR --interval-secs 60 --cycles 3
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ferroscan_core::{ProviderId, ScanCriteria};

/// Small-cap momentum scanner
///
/// Screens stock snapshots through a baseline filter, a kill-filter cascade
/// and a 10-point scoring model.
#[derive(Debug, Parser)]
#[command(name = "ferroscan", author, version, about = "Small-cap momentum scanner")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot source.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Mock)]
    pub source: SourceSelector,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Built-in reference tape.
    Mock,
    /// Finnhub REST API (needs an api key).
    Finnhub,
    /// Local Interactive Brokers gateway bridge.
    #[value(alias = "ib")]
    Ibkr,
}

impl SourceSelector {
    pub const fn provider_id(self) -> ProviderId {
        match self {
            Self::Mock => ProviderId::Mock,
            Self::Finnhub => ProviderId::Finnhub,
            Self::Ibkr => ProviderId::Ibkr,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full screening pipeline once.
    Scan(ScanArgs),
    /// Show the kill verdict or score breakdown for every snapshot.
    Analyze(AnalyzeArgs),
    /// Print the effective criteria after config and flag merging.
    Criteria(CriteriaArgs),
    /// Re-scan a watchlist on an interval.
    Monitor(MonitorArgs),
    /// Check source health.
    Status,
}

/// Tickers, space or comma separated. Empty means the configured watchlist,
/// or the source's own candidates when that is empty too.
#[derive(Debug, Clone, Default, Args)]
pub struct TickerArgs {
    #[arg(value_name = "TICKERS")]
    pub tickers: Vec<String>,
}

/// Per-run overrides of the configured criteria.
#[derive(Debug, Clone, Default, Args)]
pub struct CriteriaOverrides {
    /// Lower bound of the price band.
    #[arg(long)]
    pub min_price: Option<f64>,
    /// Upper bound of the price band.
    #[arg(long)]
    pub max_price: Option<f64>,
    /// Minimum total gain (day + pre-market) in percent.
    #[arg(long)]
    pub min_gain: Option<f64>,
    /// Maximum absolute seven-day change in percent.
    #[arg(long)]
    pub max_seven_day: Option<f64>,
    /// Minimum relative volume.
    #[arg(long)]
    pub min_rel_vol: Option<f64>,
    /// Minimum shares traded today.
    #[arg(long)]
    pub min_volume: Option<u64>,
}

impl CriteriaOverrides {
    pub fn apply(&self, base: ScanCriteria) -> ScanCriteria {
        ScanCriteria {
            min_price: self.min_price.unwrap_or(base.min_price),
            max_price: self.max_price.unwrap_or(base.max_price),
            min_day_gain: self.min_gain.unwrap_or(base.min_day_gain),
            max_seven_day_change: self.max_seven_day.unwrap_or(base.max_seven_day_change),
            min_relative_volume: self.min_rel_vol.unwrap_or(base.min_relative_volume),
            min_day_volume: self.min_volume.unwrap_or(base.min_day_volume),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,
    #[command(flatten)]
    pub criteria: CriteriaOverrides,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CriteriaArgs {
    #[command(flatten)]
    pub criteria: CriteriaOverrides,
}

#[derive(Debug, Clone, Args)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,
    #[command(flatten)]
    pub criteria: CriteriaOverrides,
    /// Seconds between scans; defaults to the configured interval (300).
    #[arg(long)]
    pub interval_secs: Option<u64>,
    /// Stop after this many completed cycles; runs until Ctrl-C otherwise.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: Option<u64>,
}
