//! Lag correlation module
//!
//! Measures how strongly past moves of one instrument line up with current
//! moves of another:
//!
//! 1. Shift the base return series by each candidate lag (in periods)
//! 2. Pair it with the comparison returns on shared timestamps
//! 3. Compute the Pearson correlation per lag
//! 4. Report the lag with the largest absolute correlation

mod analyzer;
mod stats;
mod types;

pub use analyzer::{compute_lag_correlations, LagAnalyzer, LagOptions};
pub use stats::{p_value, pearson};
pub use types::{
    BestLag, Correlation, LagCorrelation, LagError, LagResult, NotComputableReason,
};
