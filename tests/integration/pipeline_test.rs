//! End-to-end pipeline tests against an in-memory provider

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use lag_corr::config::{Config, ConfigError, InstrumentConfig};
use lag_corr::error::AnalysisError;
use lag_corr::lag::LagError;
use lag_corr::pipeline::{export_parquet, price_chart, render_prices, run_analysis};
use lag_corr::provider::{MarketDataProvider, PriceRequest, ProviderError};
use lag_corr::render::SvgRenderer;
use lag_corr::series::TimeSeries;
use tempfile::tempdir;

const DAYS: i64 = 60;

struct FakeProvider {
    series: HashMap<String, TimeSeries>,
}

impl FakeProvider {
    fn new(series: Vec<(&str, TimeSeries)>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|(symbol, s)| (symbol.to_string(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_prices(&self, request: &PriceRequest) -> Result<TimeSeries, ProviderError> {
        let series = self
            .series
            .get(&request.symbol)
            .ok_or_else(|| ProviderError::unavailable(&request.symbol, "unknown symbol"))?;
        let series = series.between(request.start_time(), request.end_time());
        if series.is_empty() {
            return Err(ProviderError::unavailable(&request.symbol, "no data in range"));
        }
        Ok(series)
    }
}

fn day(i: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i)
}

/// Deterministic pseudo-random daily return
fn shock(k: i64) -> f64 {
    let k = k + 10;
    (((k * k * 31 + k * 17) % 97) as f64 - 48.0) / 2000.0
}

/// Prices whose return at day `k` is `shock(k - delay)`
fn prices(delay: i64, start: f64) -> TimeSeries {
    let mut price = start;
    TimeSeries::from_pairs((0..DAYS).map(|k| {
        if k > 0 {
            price *= 1.0 + shock(k - delay);
        }
        (day(k), price)
    }))
    .unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.instruments.base = InstrumentConfig::new("BASE", Some("Base Index"));
    config.instruments.comparison = InstrumentConfig::new("COMP", None);
    config.range.start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    config.range.end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    config
}

#[tokio::test]
async fn test_finds_planted_lag() {
    let provider = FakeProvider::new(vec![("BASE", prices(0, 4700.0)), ("COMP", prices(3, 42000.0))]);

    let outcome = run_analysis(&config(), &provider).await.unwrap();

    assert_eq!(outcome.aligned.len(), DAYS as usize);
    assert_eq!(outcome.base_returns.len(), DAYS as usize - 1);
    assert_eq!(outcome.lags.len(), 5);

    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.lag.get(), 3);
    assert!(best.correlation.coefficient > 0.999);

    let text = outcome.report.format_text();
    assert!(text.contains("Best lag: 3 days with correlation 1.0000"));
    assert!(text.contains("Lag 5 days: Correlation = "));
    assert_eq!(outcome.report.base.label, "Base Index");
    assert_eq!(outcome.report.comparison.label, "COMP");
}

#[tokio::test]
async fn test_reported_lags_are_ascending() {
    let provider = FakeProvider::new(vec![("BASE", prices(0, 100.0)), ("COMP", prices(2, 50.0))]);
    let mut config = config();
    config.analysis.lags = vec![4, 1, 2, 2];

    let outcome = run_analysis(&config, &provider).await.unwrap();

    let lags: Vec<usize> = outcome.report.lags.iter().map(|r| r.lag).collect();
    assert_eq!(lags, vec![1, 2, 4]);
    assert_eq!(outcome.best.unwrap().lag.get(), 2);
}

#[tokio::test]
async fn test_constant_comparison_has_no_best_lag() {
    let flat = TimeSeries::from_pairs((0..DAYS).map(|k| (day(k), 1.0))).unwrap();
    let provider = FakeProvider::new(vec![("BASE", prices(0, 100.0)), ("COMP", flat)]);

    let outcome = run_analysis(&config(), &provider).await.unwrap();

    assert_eq!(outcome.lags.computed_count(), 0);
    assert!(matches!(outcome.best, Err(LagError::NoComputableLag { .. })));
    assert!(outcome.report.best.is_none());
    assert!(outcome.report.format_text().contains("Best lag: none"));
}

#[tokio::test]
async fn test_no_shared_timestamps() {
    let shifted = TimeSeries::from_pairs(
        (0..DAYS).map(|k| (day(k) + Duration::hours(12), 100.0 + k as f64)),
    )
    .unwrap();
    let provider = FakeProvider::new(vec![("BASE", prices(0, 100.0)), ("COMP", shifted)]);

    let err = run_analysis(&config(), &provider).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoOverlap { .. }));
}

#[tokio::test]
async fn test_unknown_symbol_is_data_unavailable() {
    let provider = FakeProvider::new(vec![("BASE", prices(0, 100.0))]);

    let err = run_analysis(&config(), &provider).await.unwrap_err();
    match err {
        AnalysisError::DataUnavailable(ProviderError::DataUnavailable { symbol, .. }) => {
            assert_eq!(symbol, "COMP")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_config_rejected_before_fetch() {
    let provider = FakeProvider::new(vec![]);
    let mut config = config();
    config.range.end = config.range.start;

    let err = run_analysis(&config, &provider).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Config(ConfigError::EmptyRange { .. })
    ));
}

#[tokio::test]
async fn test_zero_price_is_invalid_series() {
    let mut points: Vec<(DateTime<Utc>, f64)> = (0..DAYS).map(|k| (day(k), 10.0)).collect();
    points[5].1 = 0.0;
    let broken = TimeSeries::from_pairs(points).unwrap();
    let provider = FakeProvider::new(vec![("BASE", broken), ("COMP", prices(1, 10.0))]);

    let err = run_analysis(&config(), &provider).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidSeries { ref symbol, .. } if symbol == "BASE"));
}

#[tokio::test]
async fn test_export_and_render() {
    let provider = FakeProvider::new(vec![("BASE", prices(0, 4700.0)), ("COMP", prices(1, 42000.0))]);
    let config = config();
    let outcome = run_analysis(&config, &provider).await.unwrap();
    let dir = tempdir().unwrap();

    export_parquet(&outcome, dir.path()).unwrap();
    let run_id = outcome.run_id.to_string();
    assert!(dir.path().join(format!("aligned_{}.parquet", run_id)).exists());
    assert!(dir.path().join(format!("lags_{}.parquet", run_id)).exists());

    let chart = price_chart(&outcome, &config);
    assert_eq!(chart.title, "Base Index and COMP Prices");
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].color, "blue");
    assert_eq!(chart.series[1].color, "orange");

    let path = dir.path().join("prices.svg");
    render_prices(&outcome, &config, &SvgRenderer::new(&path)).unwrap();
    let svg = std::fs::read_to_string(&path).unwrap();
    assert_eq!(svg.matches("<polyline").count(), 2);
}
