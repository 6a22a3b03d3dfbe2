//! Prometheus textfile export

use lag_corr::config::TelemetryConfig;
use lag_corr::telemetry::{init_telemetry, record_count, set_gauge, CountMetric, GaugeMetric};
use tempfile::tempdir;

#[test]
fn test_metrics_written_on_guard_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lag-corr.prom");
    let config = TelemetryConfig {
        metrics_path: Some(path.clone()),
        ..Default::default()
    };

    let guard = init_telemetry(&config).unwrap();
    record_count(CountMetric::ComputedLags, 4);
    set_gauge(GaugeMetric::BestLag, 3.0);

    let rendered = guard.render_metrics().unwrap();
    assert!(rendered.contains("lagcorr_best_lag"));
    assert!(!path.exists());

    drop(guard);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("lagcorr_best_lag"));
    assert!(content.contains("lagcorr_computed_lags_total"));
}
