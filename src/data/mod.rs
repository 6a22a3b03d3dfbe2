//! Data export module
//!
//! Stores price series and analysis results to Parquet

mod parquet;

pub use self::parquet::{
    aligned_schema, lag_schema, price_file_name, price_schema, ParquetReader, ParquetWriter,
    PriceRecord,
};
