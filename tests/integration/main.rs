//! Integration tests

mod config_test;
mod pipeline_test;
mod provider_test;
mod telemetry_test;
