//! Time series module
//!
//! Price and return series, plus timestamp alignment

mod align;
mod returns;
mod types;

pub use align::{inner_join, AlignedSeries};
pub use returns::ReturnSeries;
pub use types::{Point, SeriesError, TimeSeries};
