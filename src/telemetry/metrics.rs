//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Price download per instrument
    Fetch,
    /// Merge, returns and lag correlations
    Analysis,
    /// Chart rendering
    Render,
    /// Parquet export
    Export,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CountMetric {
    /// Prices returned by the provider
    PointsFetched,
    /// Lags with a correlation
    ComputedLags,
    /// Lags without enough data
    SkippedLags,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Timestamps shared by both instruments
    AlignedPoints,
    /// Lag with the strongest correlation
    BestLag,
    /// Correlation at the best lag
    BestCorrelation,
}

impl LatencyMetric {
    pub fn name(self) -> &'static str {
        match self {
            LatencyMetric::Fetch => "lagcorr_fetch_latency_ms",
            LatencyMetric::Analysis => "lagcorr_analysis_latency_ms",
            LatencyMetric::Render => "lagcorr_render_latency_ms",
            LatencyMetric::Export => "lagcorr_export_latency_ms",
        }
    }
}

impl CountMetric {
    pub fn name(self) -> &'static str {
        match self {
            CountMetric::PointsFetched => "lagcorr_points_fetched_total",
            CountMetric::ComputedLags => "lagcorr_computed_lags_total",
            CountMetric::SkippedLags => "lagcorr_skipped_lags_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::AlignedPoints => "lagcorr_aligned_points",
            GaugeMetric::BestLag => "lagcorr_best_lag",
            GaugeMetric::BestCorrelation => "lagcorr_best_correlation",
        }
    }
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    metrics::histogram!(metric.name()).record(value_ms);
    tracing::debug!(metric = metric.name(), value_ms, "Recording latency");
}

/// Increment a counter
pub fn record_count(metric: CountMetric, value: u64) {
    metrics::counter!(metric.name()).increment(value);
    tracing::debug!(metric = metric.name(), value, "Incrementing counter");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
    tracing::debug!(metric = metric.name(), value, "Setting gauge");
}
