//! Market data provider module
//!
//! Fetches historical closing prices for a symbol over a date range

mod parquet;
mod yahoo;

pub use self::parquet::ParquetProvider;
pub use yahoo::{YahooClient, YahooConfig, YAHOO_API_URL};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::series::TimeSeries;

/// Sampling interval of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hourly,
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Whether bars are keyed by calendar date
    pub fn is_date_based(&self) -> bool {
        !matches!(self, Interval::Hourly)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" | "60m" => Ok(Interval::Hourly),
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(format!(
                "unknown interval '{}', expected one of 1h, 1d, 1wk, 1mo",
                other
            )),
        }
    }
}

/// A request for closing prices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub symbol: String,
    /// First date (inclusive)
    pub start: NaiveDate,
    /// Last date (exclusive)
    pub end: NaiveDate,
    pub interval: Interval,
}

impl PriceRequest {
    pub fn new(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
            interval,
        }
    }

    /// Midnight UTC of the start date
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC of the end date
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

/// Provider failures
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, unknown symbol, empty range or malformed data
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
}

impl ProviderError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ProviderError::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }
}

/// Trait for market data providers
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Fetch an ordered closing price series
    async fn fetch_prices(&self, request: &PriceRequest) -> Result<TimeSeries, ProviderError>;
}

/// Build the provider selected in configuration
pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Box<dyn MarketDataProvider>> {
    let provider: Box<dyn MarketDataProvider> = match config.kind {
        ProviderKind::Yahoo => Box::new(YahooClient::with_config(YahooConfig {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        })?),
        ProviderKind::Parquet => Box::new(ParquetProvider::new(config.data_dir.clone())),
    };
    Ok(provider)
}
