//! Time series types
//!
//! Ordered (timestamp, value) sequences used for prices and returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("timestamps not strictly increasing at index {index}: {previous} then {current}")]
    NotIncreasing {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
    #[error("non-finite value at {timestamp}")]
    NonFinite { timestamp: DateTime<Utc> },
    #[error("zero price at {timestamp}, return is undefined")]
    ZeroPrice { timestamp: DateTime<Utc> },
}

/// A single observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Point {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered series with strictly increasing timestamps
///
/// Immutable once built. Every value is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<Point>,
}

impl TimeSeries {
    /// Build a series, rejecting unordered, duplicate or non-finite entries
    pub fn new(points: Vec<Point>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(SeriesError::NonFinite {
                timestamp: bad.timestamp,
            });
        }

        Ok(Self { points })
    }

    /// Wrap points taken in order from an already valid series
    pub(crate) fn from_ordered(points: Vec<Point>) -> Self {
        debug_assert!(points.windows(2).all(|p| p[0].timestamp < p[1].timestamp));
        Self { points }
    }

    /// Build from (timestamp, value) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| Point::new(timestamp, value))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|p| p.timestamp)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Value at an exact timestamp
    pub fn value_at(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Sub-series with `start <= timestamp < end`
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.timestamp >= start && p.timestamp < end)
                .copied()
                .collect(),
        }
    }

    /// Minimum and maximum value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.values();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
