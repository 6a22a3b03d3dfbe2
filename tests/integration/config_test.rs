//! Configuration loading tests

use std::io::Write;

use lag_corr::config::{Config, ConfigError, ProviderKind};
use lag_corr::provider::Interval;
use lag_corr::report::ReportFormat;
use lag_corr::telemetry::LogFormat;
use tempfile::NamedTempFile;

#[test]
fn test_config_example_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();

    assert_eq!(config.instruments.base.symbol, "^GSPC");
    assert_eq!(config.instruments.comparison.symbol, "BTC-USD");
    assert_eq!(config.analysis.lags, vec![1, 2, 3, 4, 5]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_partial_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [instruments.comparison]
        symbol = "ETH-USD"

        [range]
        start = "2024-01-01"
        end = "2024-06-30"
        interval = "1wk"

        [provider]
        kind = "parquet"
        data_dir = "./prices"

        [output]
        format = "json"

        [telemetry]
        log_format = "json"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.instruments.base.symbol, "^GSPC");
    assert_eq!(config.instruments.comparison.display_name(), "ETH-USD");
    assert_eq!(config.range.interval, Interval::Weekly);
    assert_eq!(config.provider.kind, ProviderKind::Parquet);
    assert_eq!(config.output.format, ReportFormat::Json);
    assert_eq!(config.telemetry.log_format, LogFormat::Json);
    assert_eq!(config.analysis, Config::default().analysis);
}

#[test]
fn test_load_missing_file() {
    assert!(Config::load("/nonexistent/lag-corr.toml").is_err());
}

#[test]
fn test_load_malformed_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[range]\nstart = \"yesterday\"").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_validate_rejects_zero_lag() {
    let mut config = Config::default();
    config.analysis.lags = vec![0, 1];
    assert!(matches!(config.validate(), Err(ConfigError::ZeroLag)));
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
