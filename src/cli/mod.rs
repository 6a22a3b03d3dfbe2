//! CLI interface for lag-corr
//!
//! Provides subcommands for:
//! - `analyze`: Download prices and report lagged return correlations
//! - `fetch`: Download prices to Parquet for offline runs
//! - `config`: Show the effective configuration

mod analyze;
mod fetch;

pub use analyze::AnalyzeArgs;
pub use fetch::FetchArgs;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{Config, InstrumentConfig};
use crate::provider::Interval;

#[derive(Parser, Debug)]
#[command(name = "lag-corr")]
#[command(about = "Lagged return correlation between two market instruments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download prices and report lagged return correlations
    Analyze(AnalyzeArgs),
    /// Download prices to Parquet for offline analysis
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}

/// Instrument and range overrides shared by subcommands
#[derive(Args, Debug, Default)]
pub struct InstrumentArgs {
    /// Base instrument ticker
    #[arg(long)]
    pub base: Option<String>,

    /// Display label for the base instrument
    #[arg(long)]
    pub base_label: Option<String>,

    /// Comparison instrument ticker
    #[arg(long)]
    pub comparison: Option<String>,

    /// Display label for the comparison instrument
    #[arg(long)]
    pub comparison_label: Option<String>,

    /// First date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date, exclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Sampling interval: 1h, 1d, 1wk or 1mo
    #[arg(long)]
    pub interval: Option<Interval>,
}

impl InstrumentArgs {
    /// Apply overrides on top of the loaded configuration
    ///
    /// A new ticker without a label drops the configured label.
    pub fn apply(&self, config: &mut Config) {
        override_instrument(
            &mut config.instruments.base,
            &self.base,
            &self.base_label,
        );
        override_instrument(
            &mut config.instruments.comparison,
            &self.comparison,
            &self.comparison_label,
        );

        if let Some(start) = self.start {
            config.range.start = start;
        }
        if let Some(end) = self.end {
            config.range.end = end;
        }
        if let Some(interval) = self.interval {
            config.range.interval = interval;
        }
    }
}

fn override_instrument(
    instrument: &mut InstrumentConfig,
    symbol: &Option<String>,
    label: &Option<String>,
) {
    if let Some(symbol) = symbol {
        if *symbol != instrument.symbol {
            instrument.label = None;
        }
        instrument.symbol = symbol.clone();
    }
    if let Some(label) = label {
        instrument.label = Some(label.clone());
    }
}
