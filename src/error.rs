//! Analysis pipeline errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::lag::LagError;
use crate::provider::ProviderError;
use crate::series::SeriesError;

/// Errors that end an analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DataUnavailable(#[from] ProviderError),

    #[error("Invalid series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("No overlapping timestamps between {base} and {comparison}")]
    NoOverlap { base: String, comparison: String },

    #[error(transparent)]
    Lag(#[from] LagError),
}
