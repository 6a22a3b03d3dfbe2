//! Telemetry module
//!
//! Logging and Prometheus metrics

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogFormat};
pub use self::metrics::{
    record_count, record_latency, set_gauge, CountMetric, GaugeMetric, LatencyMetric,
};

use std::path::PathBuf;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::TelemetryConfig;

/// Guard that flushes telemetry on drop
///
/// When a metrics path is configured the Prometheus text exposition is
/// written there once the run ends.
pub struct TelemetryGuard {
    metrics: Option<(PrometheusHandle, PathBuf)>,
}

impl TelemetryGuard {
    /// Current metrics in Prometheus text format
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(|(handle, _)| handle.render())
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some((handle, path)) = self.metrics.take() {
            if let Err(e) = std::fs::write(&path, handle.render()) {
                tracing::warn!(path = ?path, error = %e, "Failed to write metrics");
            }
        }
    }
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    let metrics = match &config.metrics_path {
        Some(path) => {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;
            tracing::debug!(path = ?path, "Metrics will be written on exit");
            Some((handle, path.clone()))
        }
        None => None,
    };

    Ok(TelemetryGuard { metrics })
}
