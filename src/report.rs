//! Console report of lag correlations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lag::{BestLag, LagCorrelation, LagResult};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Instrument summary in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub symbol: String,
    pub label: String,
    /// Prices returned by the provider
    pub points: usize,
}

/// One lag line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagRow {
    pub lag: usize,
    pub correlation: Option<f64>,
    pub pairs: usize,
    pub p_value: Option<f64>,
    /// Why the correlation is missing
    pub reason: Option<String>,
}

impl LagRow {
    fn from_entry(lag: usize, entry: &LagCorrelation) -> Self {
        match entry {
            LagCorrelation::Computed(c) => Self {
                lag,
                correlation: Some(c.coefficient),
                pairs: c.pairs,
                p_value: c.p_value,
                reason: None,
            },
            LagCorrelation::NotComputable(reason) => Self {
                lag,
                correlation: None,
                pairs: entry.pairs(),
                p_value: None,
                reason: Some(reason.to_string()),
            },
        }
    }
}

/// The best lag line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestRow {
    pub lag: usize,
    pub correlation: f64,
}

impl From<&BestLag> for BestRow {
    fn from(best: &BestLag) -> Self {
        Self {
            lag: best.lag.get(),
            correlation: best.correlation.coefficient,
        }
    }
}

/// Everything printed at the end of an analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub base: InstrumentSummary,
    pub comparison: InstrumentSummary,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: String,
    /// Timestamps shared by both price series
    pub aligned_points: usize,
    pub lags: Vec<LagRow>,
    /// Absent when no lag was computable
    pub best: Option<BestRow>,
}

impl AnalysisReport {
    /// One row per lag, ascending
    pub fn lag_rows(result: &LagResult) -> Vec<LagRow> {
        result
            .iter()
            .map(|(lag, entry)| LagRow::from_entry(lag.get(), entry))
            .collect()
    }

    /// Format as text for CLI output
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{} ({}) vs {} ({}), {} to {}, interval {}\n",
            self.base.label,
            self.base.symbol,
            self.comparison.label,
            self.comparison.symbol,
            self.start,
            self.end,
            self.interval
        ));
        out.push_str(&format!("Aligned observations: {}\n\n", self.aligned_points));

        for row in &self.lags {
            match (row.correlation, &row.reason) {
                (Some(corr), _) => {
                    out.push_str(&format!(
                        "Lag {} days: Correlation = {:.4}",
                        row.lag, corr
                    ));
                    match row.p_value {
                        Some(p) => out.push_str(&format!(
                            "  (pairs = {}, p-value = {:.4})\n",
                            row.pairs, p
                        )),
                        None => out.push_str(&format!("  (pairs = {})\n", row.pairs)),
                    }
                }
                (None, reason) => {
                    out.push_str(&format!(
                        "Lag {} days: Correlation = n/a  ({})\n",
                        row.lag,
                        reason.as_deref().unwrap_or("not computable")
                    ));
                }
            }
        }

        match &self.best {
            Some(best) => out.push_str(&format!(
                "\nBest lag: {} days with correlation {:.4}\n",
                best.lag, best.correlation
            )),
            None => out.push_str("\nBest lag: none, no lag had enough data\n"),
        }

        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.format_text()),
            ReportFormat::Json => self.to_json(),
        }
    }
}
