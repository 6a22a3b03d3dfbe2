//! lag-corr: Lagged return correlation between two market instruments
//!
//! This library provides the core components for:
//! - Daily price downloads from Yahoo Finance, or Parquet files offline
//! - Timestamp alignment and simple returns
//! - Pearson correlation at each candidate lag, with p-values
//! - Best lag selection by absolute correlation
//! - Text and JSON reports, SVG price charts and Parquet export
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod lag;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod report;
pub mod series;
pub mod telemetry;
