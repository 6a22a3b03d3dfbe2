//! Yahoo Finance chart API client
//!
//! Fetches historical closing prices from the v8 chart endpoint. Adjusted
//! closes are used when the response carries them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{Interval, MarketDataProvider, PriceRequest, ProviderError};
use crate::series::TimeSeries;

/// Yahoo Finance base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the chart API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Client for the Yahoo Finance chart API
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: YahooConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            encode_symbol(symbol)
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_prices(&self, request: &PriceRequest) -> Result<TimeSeries, ProviderError> {
        let url = self.chart_url(&request.symbol);
        let symbol = request.symbol.as_str();

        tracing::debug!(
            url = %url,
            symbol,
            start = %request.start,
            end = %request.end,
            interval = %request.interval,
            "Fetching chart from Yahoo Finance"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", request.start_time().timestamp().to_string()),
                ("period2", request.end_time().timestamp().to_string()),
                ("interval", request.interval.as_str().to_string()),
                ("includeAdjustedClose", "true".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(symbol, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::unavailable(symbol, e))?;

        if !status.is_success() {
            let detail = chart_error(&body).unwrap_or_else(|| truncate(&body, 200));
            return Err(ProviderError::unavailable(
                symbol,
                format!("Yahoo API error: {} - {}", status, detail),
            ));
        }

        let series = parse_chart(request, &body)?;

        tracing::info!(symbol, points = series.len(), "Fetched closing prices");

        Ok(series)
    }
}

/// Chart response envelope
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    /// Missing when the range holds no bars
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart response body into a price series
///
/// Date-based bars are keyed to midnight UTC of their exchange-local trading
/// date, so series from venues in different time zones join on the date.
/// Null closes are skipped; a repeated date keeps the later bar.
fn parse_chart(request: &PriceRequest, body: &str) -> Result<TimeSeries, ProviderError> {
    let symbol = request.symbol.as_str();

    let response: YahooResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::unavailable(symbol, format!("invalid response: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(ProviderError::unavailable(
            symbol,
            format!("Yahoo API error: {} - {}", error.code, error.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::unavailable(symbol, "no data in response"))?;

    let timestamps = data.timestamp.unwrap_or_default();
    let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let adjusted = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .filter(|closes| !closes.is_empty());
    let closes = match adjusted {
        Some(closes) => closes,
        None => data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let (start, end) = (request.start_time(), request.end_time());
    let mut bars: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite()) else {
            continue;
        };
        let Some(key) = bar_time(*ts, gmtoffset, request.interval) else {
            continue;
        };
        if key >= start && key < end {
            bars.insert(key, close);
        }
    }

    if bars.is_empty() {
        return Err(ProviderError::unavailable(
            symbol,
            "no prices in requested range",
        ));
    }

    TimeSeries::from_pairs(bars).map_err(|e| ProviderError::unavailable(symbol, e))
}

/// Timestamp a bar is keyed by
fn bar_time(ts: i64, gmtoffset: i64, interval: Interval) -> Option<DateTime<Utc>> {
    if interval.is_date_based() {
        let local = DateTime::from_timestamp(ts + gmtoffset, 0)?;
        Some(local.date_naive().and_time(chrono::NaiveTime::MIN).and_utc())
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

/// Error description from a chart error body, if it is one
fn chart_error(body: &str) -> Option<String> {
    let response: YahooResponse = serde_json::from_str(body).ok()?;
    response
        .chart
        .error
        .map(|e| format!("{} - {}", e.code, e.description))
}

/// Percent-encode characters Yahoo index symbols use in the URL path
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E").replace('=', "%3D").replace('/', "%2F")
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
