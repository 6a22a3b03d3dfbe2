//! Offline provider backed by Parquet price files
//!
//! Reads files written by the `fetch` command, one per symbol.

use async_trait::async_trait;
use std::path::PathBuf;

use super::{MarketDataProvider, PriceRequest, ProviderError};
use crate::data::{price_file_name, ParquetReader};
use crate::series::TimeSeries;

/// Provider reading `<data_dir>/<symbol>.parquet`
pub struct ParquetProvider {
    data_dir: PathBuf,
}

impl ParquetProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn load(&self, request: &PriceRequest) -> Result<TimeSeries, ProviderError> {
        let symbol = request.symbol.as_str();
        let path = self.data_dir.join(price_file_name(symbol));

        if !path.exists() {
            return Err(ProviderError::unavailable(
                symbol,
                format!("no price file at {}", path.display()),
            ));
        }

        let records = ParquetReader::new(&path)
            .read_prices()
            .map_err(|e| ProviderError::unavailable(symbol, format!("{:#}", e)))?;

        let (start, end) = (request.start_time(), request.end_time());
        let pairs: Vec<_> = records
            .into_iter()
            .filter(|r| r.symbol == symbol && r.timestamp >= start && r.timestamp < end)
            .map(|r| (r.timestamp, r.price))
            .collect();

        if pairs.is_empty() {
            return Err(ProviderError::unavailable(
                symbol,
                "no prices in requested range",
            ));
        }

        TimeSeries::from_pairs(pairs).map_err(|e| ProviderError::unavailable(symbol, e))
    }
}

#[async_trait]
impl MarketDataProvider for ParquetProvider {
    fn name(&self) -> &'static str {
        "parquet"
    }

    async fn fetch_prices(&self, request: &PriceRequest) -> Result<TimeSeries, ProviderError> {
        let series = self.load(request)?;
        tracing::info!(
            symbol = %request.symbol,
            points = series.len(),
            dir = ?self.data_dir,
            "Loaded closing prices from Parquet"
        );
        Ok(series)
    }
}
