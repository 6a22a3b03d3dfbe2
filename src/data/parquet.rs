//! Parquet export of prices, aligned tables and lag results

use arrow::array::{
    Array, ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::lag::{LagCorrelation, LagResult};
use crate::series::{AlignedSeries, ReturnSeries, TimeSeries};

fn timestamp_field() -> Field {
    Field::new(
        "timestamp",
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        false,
    )
}

/// Price series schema
pub fn price_schema() -> Schema {
    Schema::new(vec![
        timestamp_field(),
        Field::new("symbol", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
    ])
}

/// Aligned analysis table schema
pub fn aligned_schema() -> Schema {
    Schema::new(vec![
        timestamp_field(),
        Field::new("base_price", DataType::Float64, false),
        Field::new("comparison_price", DataType::Float64, false),
        Field::new("base_return", DataType::Float64, true),
        Field::new("comparison_return", DataType::Float64, true),
    ])
}

/// Lag result schema
pub fn lag_schema() -> Schema {
    Schema::new(vec![
        Field::new("lag", DataType::UInt64, false),
        Field::new("status", DataType::Utf8, false),
        Field::new("correlation", DataType::Float64, true),
        Field::new("pairs", DataType::UInt64, false),
        Field::new("p_value", DataType::Float64, true),
    ])
}

/// File name for a symbol's price series
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, so `^GSPC` maps to
/// `_GSPC.parquet`.
pub fn price_file_name(symbol: &str) -> String {
    let stem: String = symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.parquet", stem)
}

/// Parquet writer rooted at an output directory
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Path of a symbol's price file
    pub fn price_path(&self, symbol: &str) -> PathBuf {
        self.output_dir.join(price_file_name(symbol))
    }

    /// Path of a per-run artifact, e.g. `lags_<run id>.parquet`
    pub fn run_path(&self, prefix: &str, run_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.parquet", prefix, run_id))
    }

    fn write_batch(&self, path: &Path, batch: RecordBatch) -> anyhow::Result<()> {
        self.ensure_dir()?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    /// Write a symbol's closing prices
    pub fn write_prices(
        &self,
        path: &Path,
        symbol: &str,
        prices: &TimeSeries,
    ) -> anyhow::Result<()> {
        let timestamps: Vec<i64> = prices.timestamps().map(|t| t.timestamp_micros()).collect();
        let symbols: Vec<&str> = vec![symbol; prices.len()];
        let values: Vec<f64> = prices.values().collect();

        let batch = RecordBatch::try_new(
            Arc::new(price_schema()),
            vec![
                Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))
                    as ArrayRef,
                Arc::new(StringArray::from(symbols)) as ArrayRef,
                Arc::new(Float64Array::from(values)) as ArrayRef,
            ],
        )?;

        self.write_batch(path, batch)?;
        tracing::debug!(path = ?path, symbol, count = prices.len(), "Wrote prices to Parquet");
        Ok(())
    }

    /// Write the aligned price table with each side's return
    ///
    /// The first row has no return on either side.
    pub fn write_aligned(
        &self,
        path: &Path,
        aligned: &AlignedSeries,
        base_returns: &ReturnSeries,
        comparison_returns: &ReturnSeries,
    ) -> anyhow::Result<()> {
        let timestamps: Vec<i64> = aligned.timestamps().map(|t| t.timestamp_micros()).collect();
        let base_prices: Vec<f64> = aligned.base.values().collect();
        let comparison_prices: Vec<f64> = aligned.comparison.values().collect();
        let base_rets: Vec<Option<f64>> = aligned
            .timestamps()
            .map(|t| base_returns.as_series().value_at(t))
            .collect();
        let comparison_rets: Vec<Option<f64>> = aligned
            .timestamps()
            .map(|t| comparison_returns.as_series().value_at(t))
            .collect();

        let batch = RecordBatch::try_new(
            Arc::new(aligned_schema()),
            vec![
                Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))
                    as ArrayRef,
                Arc::new(Float64Array::from(base_prices)) as ArrayRef,
                Arc::new(Float64Array::from(comparison_prices)) as ArrayRef,
                Arc::new(Float64Array::from(base_rets)) as ArrayRef,
                Arc::new(Float64Array::from(comparison_rets)) as ArrayRef,
            ],
        )?;

        self.write_batch(path, batch)?;
        tracing::debug!(path = ?path, rows = aligned.len(), "Wrote aligned table to Parquet");
        Ok(())
    }

    /// Write one row per lag
    pub fn write_lag_results(&self, path: &Path, result: &LagResult) -> anyhow::Result<()> {
        let mut lags = Vec::with_capacity(result.len());
        let mut statuses = Vec::with_capacity(result.len());
        let mut correlations = Vec::with_capacity(result.len());
        let mut pairs = Vec::with_capacity(result.len());
        let mut p_values = Vec::with_capacity(result.len());

        for (lag, entry) in result.iter() {
            lags.push(lag.get() as u64);
            pairs.push(entry.pairs() as u64);
            match entry {
                LagCorrelation::Computed(c) => {
                    statuses.push("computed".to_string());
                    correlations.push(Some(c.coefficient));
                    p_values.push(c.p_value);
                }
                LagCorrelation::NotComputable(reason) => {
                    statuses.push(reason.to_string());
                    correlations.push(None);
                    p_values.push(None);
                }
            }
        }

        let batch = RecordBatch::try_new(
            Arc::new(lag_schema()),
            vec![
                Arc::new(UInt64Array::from(lags)) as ArrayRef,
                Arc::new(StringArray::from(statuses)) as ArrayRef,
                Arc::new(Float64Array::from(correlations)) as ArrayRef,
                Arc::new(UInt64Array::from(pairs)) as ArrayRef,
                Arc::new(Float64Array::from(p_values)) as ArrayRef,
            ],
        )?;

        self.write_batch(path, batch)?;
        tracing::debug!(path = ?path, lags = result.len(), "Wrote lag results to Parquet");
        Ok(())
    }
}

/// Record type for stored prices
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
}

/// Reader for Parquet price files
pub struct ParquetReader {
    path: PathBuf,
}

impl ParquetReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read price records written by [`ParquetWriter::write_prices`]
    pub fn read_prices(&self) -> anyhow::Result<Vec<PriceRecord>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let mut records = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let timestamps = batch
                .column(0)
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| anyhow::anyhow!("Invalid timestamp column"))?;

            let symbols = batch
                .column(1)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow::anyhow!("Invalid symbol column"))?;

            let prices = batch
                .column(2)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| anyhow::anyhow!("Invalid price column"))?;

            for i in 0..batch.num_rows() {
                if prices.is_null(i) {
                    continue;
                }
                let timestamp = DateTime::from_timestamp_micros(timestamps.value(i))
                    .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?;

                records.push(PriceRecord {
                    timestamp,
                    symbol: symbols.value(i).to_string(),
                    price: prices.value(i),
                });
            }
        }

        Ok(records)
    }
}
