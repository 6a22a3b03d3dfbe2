//! Lag correlation types
//!
//! Per-lag outcomes and the best-lag query over them.

use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use thiserror::Error;

/// Why a lag's correlation could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotComputableReason {
    /// Too few aligned pairs after shifting
    InsufficientData { pairs: usize, required: usize },
    /// One side is constant over the aligned pairs
    ZeroVariance { pairs: usize },
}

impl std::fmt::Display for NotComputableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotComputableReason::InsufficientData { pairs, required } => write!(
                f,
                "Insufficient data: {} aligned pairs, need {}",
                pairs, required
            ),
            NotComputableReason::ZeroVariance { pairs } => {
                write!(f, "Insufficient data: zero variance over {} pairs", pairs)
            }
        }
    }
}

/// A computed Pearson correlation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    /// Number of aligned pairs used
    pub pairs: usize,
    /// Two-sided p-value against zero correlation, if defined
    pub p_value: Option<f64>,
}

/// Outcome for a single lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LagCorrelation {
    Computed(Correlation),
    NotComputable(NotComputableReason),
}

impl LagCorrelation {
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            LagCorrelation::Computed(c) => Some(c.coefficient),
            LagCorrelation::NotComputable(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, LagCorrelation::Computed(_))
    }

    /// Aligned pairs considered for this lag
    pub fn pairs(&self) -> usize {
        match self {
            LagCorrelation::Computed(c) => c.pairs,
            LagCorrelation::NotComputable(NotComputableReason::InsufficientData {
                pairs, ..
            })
            | LagCorrelation::NotComputable(NotComputableReason::ZeroVariance { pairs }) => {
                *pairs
            }
        }
    }
}

/// Errors from best-lag selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LagError {
    #[error("No lags supplied")]
    NoLags,
    #[error("No computable lag among {lags} candidate(s)")]
    NoComputableLag { lags: usize },
}

/// The lag with the strongest absolute correlation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestLag {
    pub lag: NonZeroUsize,
    pub correlation: Correlation,
}

/// Correlation per lag, ordered by lag
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LagResult {
    entries: BTreeMap<NonZeroUsize, LagCorrelation>,
}

impl LagResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a lag, replacing any previous entry
    pub fn insert(&mut self, lag: NonZeroUsize, correlation: LagCorrelation) {
        self.entries.insert(lag, correlation);
    }

    pub fn get(&self, lag: NonZeroUsize) -> Option<&LagCorrelation> {
        self.entries.get(&lag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending lag order
    pub fn iter(&self) -> impl Iterator<Item = (NonZeroUsize, &LagCorrelation)> + '_ {
        self.entries.iter().map(|(lag, c)| (*lag, c))
    }

    /// Number of lags with a computed correlation
    pub fn computed_count(&self) -> usize {
        self.entries.values().filter(|c| c.is_computed()).count()
    }

    /// Lag of maximum absolute correlation
    ///
    /// Not computable lags are skipped. Ties go to the smaller lag.
    pub fn best_lag(&self) -> Result<BestLag, LagError> {
        if self.entries.is_empty() {
            return Err(LagError::NoLags);
        }

        let mut best: Option<BestLag> = None;
        for (lag, entry) in self.iter() {
            let LagCorrelation::Computed(correlation) = entry else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    correlation.coefficient.abs() > current.correlation.coefficient.abs()
                }
            };
            if better {
                best = Some(BestLag {
                    lag,
                    correlation: *correlation,
                });
            }
        }

        best.ok_or(LagError::NoComputableLag {
            lags: self.entries.len(),
        })
    }
}
