//! Configuration types for lag-corr

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::provider::Interval;
use crate::report::ReportFormat;
use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub instruments: InstrumentsConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// The two instruments being compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentsConfig {
    /// Series that gets shifted by each lag
    #[serde(default = "default_base")]
    pub base: InstrumentConfig,
    /// Series compared unshifted
    #[serde(default = "default_comparison")]
    pub comparison: InstrumentConfig,
}

impl Default for InstrumentsConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            comparison: default_comparison(),
        }
    }
}

/// A single instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Provider symbol (e.g. "^GSPC")
    pub symbol: String,
    /// Display label, defaults to the symbol
    #[serde(default)]
    pub label: Option<String>,
}

impl InstrumentConfig {
    pub fn new(symbol: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.map(str::to_string),
        }
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.symbol)
    }
}

fn default_base() -> InstrumentConfig {
    InstrumentConfig::new("^GSPC", Some("S&P 500"))
}
fn default_comparison() -> InstrumentConfig {
    InstrumentConfig::new("BTC-USD", Some("Bitcoin"))
}

/// Date range and sampling interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    /// First date (inclusive)
    #[serde(default = "default_start")]
    pub start: NaiveDate,
    /// Last date (exclusive)
    #[serde(default = "default_end")]
    pub end: NaiveDate,
    #[serde(default)]
    pub interval: Interval,
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 3, 18).unwrap_or_default()
}
fn default_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 18).unwrap_or_default()
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            interval: Interval::default(),
        }
    }
}

/// Lag analysis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Candidate lags in periods
    #[serde(default = "default_lags")]
    pub lags: Vec<usize>,

    /// Minimum aligned pairs for a correlation
    #[serde(default = "default_min_pairs")]
    pub min_pairs: usize,

    /// Evaluate all lags over the same sample
    #[serde(default)]
    pub common_sample: bool,
}

fn default_lags() -> Vec<usize> {
    (1..=5).collect()
}
fn default_min_pairs() -> usize {
    2
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lags: default_lags(),
            min_pairs: default_min_pairs(),
            common_sample: false,
        }
    }
}

impl AnalysisConfig {
    /// Lags as non-zero values, rejecting zero
    pub fn lag_set(&self) -> Result<Vec<NonZeroUsize>, ConfigError> {
        if self.lags.is_empty() {
            return Err(ConfigError::NoLags);
        }
        self.lags
            .iter()
            .map(|l| NonZeroUsize::new(*l).ok_or(ConfigError::ZeroLag))
            .collect()
    }
}

/// Market data provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// Yahoo Finance base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory holding Parquet price files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Where prices come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Parquet,
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            data_dir: default_data_dir(),
        }
    }
}

/// Report, chart and export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Render the price chart
    #[serde(default = "default_true")]
    pub plot: bool,

    #[serde(default = "default_chart_path")]
    pub chart_path: PathBuf,

    /// Write Parquet results here when set
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub format: ReportFormat,
}

fn default_true() -> bool {
    true
}
fn default_chart_path() -> PathBuf {
    PathBuf::from("lag_corr_prices.svg")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot: true,
            chart_path: default_chart_path(),
            export_dir: None,
            format: ReportFormat::default(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Write Prometheus text metrics here at exit
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_path: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("start date {start} must be before end date {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error("at least one lag is required")]
    NoLags,
    #[error("lags must be positive")]
    ZeroLag,
    #[error("base and comparison are the same instrument: {0}")]
    SameInstrument(String),
    #[error("invalid lag list '{0}'")]
    InvalidLagSpec(String),
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range.start >= self.range.end {
            return Err(ConfigError::EmptyRange {
                start: self.range.start,
                end: self.range.end,
            });
        }
        self.analysis.lag_set()?;
        if self.instruments.base.symbol == self.instruments.comparison.symbol {
            return Err(ConfigError::SameInstrument(
                self.instruments.base.symbol.clone(),
            ));
        }
        Ok(())
    }
}

/// Candidate lags parsed from the command line
///
/// Accepts `1,2,3`, `1-5`, `1..=5` and `1..6`, or any comma-separated mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagSpec(pub Vec<usize>);

impl FromStr for LagSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidLagSpec(s.to_string());
        let parse = |v: &str| v.trim().parse::<usize>().map_err(|_| invalid());

        let mut lags = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((lo, hi)) = part.split_once("..=") {
                lags.extend(parse(lo)?..=parse(hi)?);
            } else if let Some((lo, hi)) = part.split_once("..") {
                lags.extend(parse(lo)?..parse(hi)?);
            } else if let Some((lo, hi)) = part.split_once('-') {
                lags.extend(parse(lo)?..=parse(hi)?);
            } else {
                lags.push(parse(part)?);
            }
        }

        if lags.is_empty() {
            return Err(invalid());
        }
        Ok(LagSpec(lags))
    }
}
