//! Provider tests that need no network

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use lag_corr::data::ParquetWriter;
use lag_corr::provider::{
    Interval, MarketDataProvider, ParquetProvider, PriceRequest, ProviderError, YahooClient,
    YahooConfig,
};
use lag_corr::series::TimeSeries;
use tempfile::tempdir;

fn request(symbol: &str) -> PriceRequest {
    PriceRequest::new(
        symbol,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        Interval::Daily,
    )
}

#[tokio::test]
async fn test_yahoo_unreachable_is_data_unavailable() {
    let client = YahooClient::with_config(YahooConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    let err = client.fetch_prices(&request("^GSPC")).await.unwrap_err();
    let ProviderError::DataUnavailable { symbol, .. } = err;
    assert_eq!(symbol, "^GSPC");
}

#[tokio::test]
async fn test_fetch_then_offline_read() {
    let dir = tempdir().unwrap();
    let writer = ParquetWriter::new(dir.path());
    let prices = TimeSeries::from_pairs((1..=12).map(|d| {
        (
            Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap(),
            100.0 + d as f64,
        )
    }))
    .unwrap();
    writer
        .write_prices(&writer.price_path("BTC-USD"), "BTC-USD", &prices)
        .unwrap();

    let provider = ParquetProvider::new(dir.path());
    let series = provider.fetch_prices(&request("BTC-USD")).await.unwrap();

    // End date is exclusive
    assert_eq!(series.len(), 9);
    assert_eq!(series.first().unwrap().value, 101.0);
    assert_eq!(series.last().unwrap().value, 109.0);
}

#[tokio::test]
async fn test_offline_missing_symbol() {
    let dir = tempdir().unwrap();
    let provider = ParquetProvider::new(dir.path());
    assert!(provider.fetch_prices(&request("ETH-USD")).await.is_err());
}
