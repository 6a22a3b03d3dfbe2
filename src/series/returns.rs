//! Periodic returns derived from a price series

use serde::Serialize;

use super::types::{Point, SeriesError, TimeSeries};

/// Fractional change between consecutive prices
///
/// `(p[t] - p[t-1]) / p[t-1]` for every timestamp after the first. The first
/// timestamp has no return and is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSeries {
    series: TimeSeries,
}

impl ReturnSeries {
    /// Derive returns from prices
    pub fn from_prices(prices: &TimeSeries) -> Result<Self, SeriesError> {
        let mut points = Vec::with_capacity(prices.len().saturating_sub(1));

        for pair in prices.points().windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if prev.value == 0.0 {
                return Err(SeriesError::ZeroPrice {
                    timestamp: prev.timestamp,
                });
            }
            points.push(Point::new(
                curr.timestamp,
                (curr.value - prev.value) / prev.value,
            ));
        }

        Ok(Self {
            series: TimeSeries::new(points)?,
        })
    }

    /// Wrap a series that already holds returns
    pub fn from_series(series: TimeSeries) -> Self {
        Self { series }
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        self.series.points()
    }
}
