//! Lagged correlation analysis
//!
//! Correlates a base return series shifted by each candidate lag against an
//! unshifted comparison series, and tracks which lag correlates most.

use std::num::NonZeroUsize;

use crate::config::AnalysisConfig;
use crate::series::ReturnSeries;

use super::stats::{p_value, pearson};
use super::types::{Correlation, LagCorrelation, LagResult, NotComputableReason};

/// Options for lag analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagOptions {
    /// Minimum aligned pairs for a correlation (never below 2)
    pub min_pairs: usize,

    /// Evaluate every lag over the positions where the largest lag is
    /// defined, so all lags share one sample
    pub common_sample: bool,
}

impl Default for LagOptions {
    fn default() -> Self {
        Self {
            min_pairs: 2,
            common_sample: false,
        }
    }
}

impl From<&AnalysisConfig> for LagOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_pairs: config.min_pairs.max(2),
            common_sample: config.common_sample,
        }
    }
}

/// Lagged correlation analyzer
///
/// The shift is by position in the base series, not by calendar time: a lag
/// of N means N periods of the base series.
#[derive(Debug, Clone, Default)]
pub struct LagAnalyzer {
    options: LagOptions,
}

impl LagAnalyzer {
    /// Create an analyzer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom options
    pub fn with_options(options: LagOptions) -> Self {
        Self {
            options: LagOptions {
                min_pairs: options.min_pairs.max(2),
                ..options
            },
        }
    }

    /// Create from AnalysisConfig
    pub fn from_analysis_config(config: &AnalysisConfig) -> Self {
        Self::with_options(LagOptions::from(config))
    }

    pub fn options(&self) -> &LagOptions {
        &self.options
    }

    /// Correlation of `base` shifted by each lag against `comparison`
    ///
    /// Lags are evaluated independently; duplicates collapse into one entry.
    pub fn analyze<I>(&self, base: &ReturnSeries, comparison: &ReturnSeries, lags: I) -> LagResult
    where
        I: IntoIterator<Item = NonZeroUsize>,
    {
        let mut lags: Vec<NonZeroUsize> = lags.into_iter().collect();
        lags.sort_unstable();
        lags.dedup();

        let sample_start = if self.options.common_sample {
            lags.last().map(|l| l.get())
        } else {
            None
        };

        let mut result = LagResult::new();
        for lag in lags {
            let start = sample_start.unwrap_or(lag.get());
            let (xs, ys) = lagged_pairs(base, comparison, lag.get(), start);
            let entry = self.correlate(&xs, &ys);

            tracing::trace!(
                lag = lag.get(),
                pairs = xs.len(),
                computed = entry.is_computed(),
                "Evaluated lag"
            );

            result.insert(lag, entry);
        }

        result
    }

    fn correlate(&self, xs: &[f64], ys: &[f64]) -> LagCorrelation {
        let pairs = xs.len();
        if pairs < self.options.min_pairs {
            return LagCorrelation::NotComputable(NotComputableReason::InsufficientData {
                pairs,
                required: self.options.min_pairs,
            });
        }

        match pearson(xs, ys) {
            Ok(coefficient) => LagCorrelation::Computed(Correlation {
                coefficient,
                pairs,
                p_value: p_value(coefficient, pairs),
            }),
            Err(reason) => LagCorrelation::NotComputable(reason),
        }
    }
}

/// Compute the lag correlations with default options
pub fn compute_lag_correlations<I>(
    base_returns: &ReturnSeries,
    comparison_returns: &ReturnSeries,
    lags: I,
) -> LagResult
where
    I: IntoIterator<Item = NonZeroUsize>,
{
    LagAnalyzer::new().analyze(base_returns, comparison_returns, lags)
}

/// Pairs of (base value `lag` positions earlier, comparison value) sharing
/// a timestamp, starting at base position `start`
fn lagged_pairs(
    base: &ReturnSeries,
    comparison: &ReturnSeries,
    lag: usize,
    start: usize,
) -> (Vec<f64>, Vec<f64>) {
    let points = base.points();
    let comparison = comparison.as_series();

    let mut xs = Vec::with_capacity(points.len().saturating_sub(start));
    let mut ys = Vec::with_capacity(points.len().saturating_sub(start));

    for i in start.max(lag)..points.len() {
        if let Some(y) = comparison.value_at(points[i].timestamp) {
            xs.push(points[i - lag].value);
            ys.push(y);
        }
    }

    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag::LagError;
    use crate::series::TimeSeries;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn returns(values: &[f64]) -> ReturnSeries {
        ReturnSeries::from_series(
            TimeSeries::from_pairs(values.iter().enumerate().map(|(i, v)| (day(i as i64), *v)))
                .unwrap(),
        )
    }

    fn lags(range: std::ops::RangeInclusive<usize>) -> Vec<NonZeroUsize> {
        range.filter_map(NonZeroUsize::new).collect()
    }

    fn lag(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_lag_one_identical_series() {
        let base = returns(&[0.01, -0.02, 0.03, 0.01, -0.01]);
        let result = compute_lag_correlations(&base, &base, lags(1..=1));

        let LagCorrelation::Computed(c) = result.get(lag(1)).unwrap() else {
            panic!("lag 1 should be computable");
        };
        assert_eq!(c.pairs, 4);
        assert!((c.coefficient - (-0.492_212_535_860_906_5)).abs() < 1e-9);
    }

    #[test]
    fn test_shift_is_positional() {
        // Comparison is the base moved forward by two positions
        let base = returns(&[0.5, -0.1, 0.3, 0.7, -0.2, 0.4, 0.1, -0.6]);
        let values: Vec<f64> = base.as_series().values().collect();
        let mut shifted = vec![0.9, -0.9];
        shifted.extend_from_slice(&values[..values.len() - 2]);
        let comparison = returns(&shifted);

        let result = compute_lag_correlations(&base, &comparison, lags(1..=3));
        let best = result.best_lag().unwrap();
        assert_eq!(best.lag, lag(2));
        assert!((best.correlation.coefficient - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_shared_timestamps_are_paired() {
        let base = returns(&[0.1, 0.2, -0.1, 0.4, -0.3, 0.2]);
        // Comparison misses day 3
        let comparison = ReturnSeries::from_series(
            TimeSeries::from_pairs(vec![
                (day(1), 0.3),
                (day(2), -0.2),
                (day(4), 0.1),
                (day(5), 0.5),
            ])
            .unwrap(),
        );

        let result = compute_lag_correlations(&base, &comparison, lags(1..=1));
        assert_eq!(result.get(lag(1)).unwrap().pairs(), 4);
    }

    #[test]
    fn test_constant_comparison_not_computable() {
        let base = returns(&[0.01, -0.02, 0.03, 0.01, -0.01, 0.02, 0.0, 0.05]);
        let comparison = returns(&[0.001; 8]);

        let result = compute_lag_correlations(&base, &comparison, lags(1..=5));
        assert_eq!(result.len(), 5);
        for (_, entry) in result.iter() {
            assert!(matches!(
                entry,
                LagCorrelation::NotComputable(NotComputableReason::ZeroVariance { .. })
            ));
        }
        assert_eq!(
            result.best_lag(),
            Err(LagError::NoComputableLag { lags: 5 })
        );
    }

    #[test]
    fn test_steady_growth_comparison_not_computable() {
        // 1% a period: returns differ only by rounding
        let base = returns(&(0..40).map(|k| ((k * 37 % 11) as f64 - 5.0) / 100.0).collect::<Vec<_>>());
        let prices =
            TimeSeries::from_pairs((0..40).map(|k| (day(k), 100.0 * 1.01_f64.powi(k as i32))))
                .unwrap();
        let comparison = ReturnSeries::from_prices(&prices).unwrap();

        let result = compute_lag_correlations(&base, &comparison, lags(1..=5));
        assert_eq!(result.computed_count(), 0);
        for (_, entry) in result.iter() {
            assert!(matches!(
                entry,
                LagCorrelation::NotComputable(NotComputableReason::ZeroVariance { .. })
            ));
        }
        assert_eq!(
            result.best_lag(),
            Err(LagError::NoComputableLag { lags: 5 })
        );
    }

    #[test]
    fn test_lag_longer_than_series() {
        let base = returns(&[0.1, 0.2, 0.3]);
        let result = compute_lag_correlations(&base, &base, lags(2..=3));

        assert_eq!(
            result.get(lag(2)),
            Some(&LagCorrelation::NotComputable(
                NotComputableReason::InsufficientData {
                    pairs: 1,
                    required: 2
                }
            ))
        );
        assert_eq!(result.get(lag(3)).unwrap().pairs(), 0);
    }

    #[test]
    fn test_lag_order_does_not_matter() {
        let base = returns(&[0.02, -0.01, 0.04, 0.0, -0.03, 0.01, 0.02, -0.02, 0.03]);
        let comparison = returns(&[0.01, 0.03, -0.02, 0.02, 0.01, -0.04, 0.0, 0.05, -0.01]);

        let ascending = compute_lag_correlations(&base, &comparison, lags(1..=4));
        let shuffled = compute_lag_correlations(
            &base,
            &comparison,
            vec![lag(3), lag(1), lag(4), lag(2), lag(3)],
        );
        assert_eq!(ascending, shuffled);
    }

    #[test]
    fn test_repeatable() {
        let base = returns(&[0.02, -0.01, 0.04, 0.0, -0.03, 0.01, 0.02]);
        let comparison = returns(&[0.01, 0.03, -0.02, 0.02, 0.01, -0.04, 0.0]);

        let first = compute_lag_correlations(&base, &comparison, lags(1..=3));
        let second = compute_lag_correlations(&base, &comparison, lags(1..=3));
        for ((_, a), (_, b)) in first.iter().zip(second.iter()) {
            assert_eq!(
                a.coefficient().map(f64::to_bits),
                b.coefficient().map(f64::to_bits)
            );
        }
    }

    #[test]
    fn test_common_sample_uses_same_pairs() {
        let base = returns(&[0.02, -0.01, 0.04, 0.0, -0.03, 0.01, 0.02, -0.02]);
        let comparison = returns(&[0.01, 0.03, -0.02, 0.02, 0.01, -0.04, 0.0, 0.05]);

        let analyzer = LagAnalyzer::with_options(LagOptions {
            min_pairs: 2,
            common_sample: true,
        });
        let result = analyzer.analyze(&base, &comparison, lags(1..=3));
        for (_, entry) in result.iter() {
            assert_eq!(entry.pairs(), 5);
        }

        let independent = compute_lag_correlations(&base, &comparison, lags(1..=3));
        assert_eq!(independent.get(lag(1)).unwrap().pairs(), 7);
    }

    #[test]
    fn test_min_pairs_threshold() {
        let base = returns(&[0.02, -0.01, 0.04, 0.0, -0.03]);
        let analyzer = LagAnalyzer::with_options(LagOptions {
            min_pairs: 10,
            common_sample: false,
        });
        let result = analyzer.analyze(&base, &base, lags(1..=1));
        assert_eq!(
            result.get(lag(1)),
            Some(&LagCorrelation::NotComputable(
                NotComputableReason::InsufficientData {
                    pairs: 4,
                    required: 10
                }
            ))
        );
    }

    #[test]
    fn test_min_pairs_floor() {
        let analyzer = LagAnalyzer::with_options(LagOptions {
            min_pairs: 0,
            common_sample: false,
        });
        assert_eq!(analyzer.options().min_pairs, 2);
    }

    #[test]
    fn test_correlations_bounded() {
        let base = returns(&[0.3, -0.5, 0.2, 0.9, -0.7, 0.1, 0.4, -0.2, 0.6, -0.1]);
        let comparison = returns(&[-0.2, 0.4, 0.1, -0.6, 0.3, 0.8, -0.5, 0.2, 0.0, 0.7]);

        let result = compute_lag_correlations(&base, &comparison, lags(1..=5));
        for (_, entry) in result.iter() {
            let r = entry.coefficient().unwrap();
            assert!((-1.0..=1.0).contains(&r));
        }
    }
}
