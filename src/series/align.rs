//! Inner join of two series on their timestamps

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use super::types::{Point, TimeSeries};

/// Two series restricted to their common timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub base: TimeSeries,
    pub comparison: TimeSeries,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.base.timestamps()
    }

    /// Rows of (timestamp, base value, comparison value)
    pub fn rows(&self) -> impl Iterator<Item = (DateTime<Utc>, f64, f64)> + '_ {
        self.base
            .points()
            .iter()
            .zip(self.comparison.points())
            .map(|(b, c)| (b.timestamp, b.value, c.value))
    }
}

/// Keep only timestamps present in both series
pub fn inner_join(base: &TimeSeries, comparison: &TimeSeries) -> AlignedSeries {
    let (left, right) = (base.points(), comparison.points());
    let mut base_points: Vec<Point> = Vec::new();
    let mut comparison_points: Vec<Point> = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].timestamp.cmp(&right[j].timestamp) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                base_points.push(left[i]);
                comparison_points.push(right[j]);
                i += 1;
                j += 1;
            }
        }
    }

    AlignedSeries {
        base: TimeSeries::from_ordered(base_points),
        comparison: TimeSeries::from_ordered(comparison_points),
    }
}
