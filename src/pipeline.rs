//! Analysis pipeline
//!
//! fetch → merge → returns → lag correlations → report, with optional
//! Parquet export and chart rendering on the result.

use std::path::Path;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::data::ParquetWriter;
use crate::error::AnalysisError;
use crate::lag::{BestLag, LagAnalyzer, LagError, LagResult};
use crate::provider::{MarketDataProvider, PriceRequest};
use crate::render::{Chart, ChartRenderer, ChartSeries};
use crate::report::{AnalysisReport, BestRow, InstrumentSummary};
use crate::series::{inner_join, AlignedSeries, ReturnSeries, TimeSeries};
use crate::telemetry::{
    record_count, record_latency, set_gauge, CountMetric, GaugeMetric, LatencyMetric,
};

/// Everything produced by one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run_id: Uuid,
    /// Prices on timestamps shared by both instruments
    pub aligned: AlignedSeries,
    pub base_returns: ReturnSeries,
    pub comparison_returns: ReturnSeries,
    pub lags: LagResult,
    /// `NoComputableLag` when every lag lacked data
    pub best: Result<BestLag, LagError>,
    pub report: AnalysisReport,
}

/// Run the analysis described by `config` against `provider`
pub async fn run_analysis(
    config: &Config,
    provider: &dyn MarketDataProvider,
) -> Result<AnalysisOutcome, AnalysisError> {
    config.validate()?;

    let run_id = Uuid::new_v4();
    analyze(config, provider, run_id)
        .instrument(tracing::info_span!("analysis", run_id = %run_id))
        .await
}

async fn analyze(
    config: &Config,
    provider: &dyn MarketDataProvider,
    run_id: Uuid,
) -> Result<AnalysisOutcome, AnalysisError> {
    let lag_set = config.analysis.lag_set()?;

    let base = &config.instruments.base;
    let comparison = &config.instruments.comparison;

    let base_prices = fetch(provider, config, &base.symbol).await?;
    let comparison_prices = fetch(provider, config, &comparison.symbol).await?;

    let started = Instant::now();

    let aligned = inner_join(&base_prices, &comparison_prices);
    set_gauge(GaugeMetric::AlignedPoints, aligned.len() as f64);
    tracing::info!(
        aligned = aligned.len(),
        base_points = base_prices.len(),
        comparison_points = comparison_prices.len(),
        "Merged price series"
    );
    if aligned.is_empty() {
        return Err(AnalysisError::NoOverlap {
            base: base.symbol.clone(),
            comparison: comparison.symbol.clone(),
        });
    }

    let base_returns = returns(&aligned.base, &base.symbol)?;
    let comparison_returns = returns(&aligned.comparison, &comparison.symbol)?;

    let analyzer = LagAnalyzer::from_analysis_config(&config.analysis);
    let lags = analyzer.analyze(&base_returns, &comparison_returns, lag_set);
    let best = lags.best_lag();

    record_count(CountMetric::ComputedLags, lags.computed_count() as u64);
    record_count(
        CountMetric::SkippedLags,
        (lags.len() - lags.computed_count()) as u64,
    );
    record_latency(LatencyMetric::Analysis, started.elapsed());

    match &best {
        Ok(b) => {
            set_gauge(GaugeMetric::BestLag, b.lag.get() as f64);
            set_gauge(GaugeMetric::BestCorrelation, b.correlation.coefficient);
            tracing::info!(
                best_lag = b.lag.get(),
                correlation = b.correlation.coefficient,
                "Lag analysis complete"
            );
        }
        Err(e) => tracing::warn!(error = %e, "Lag analysis found no computable lag"),
    }

    let report = AnalysisReport {
        run_id,
        base: InstrumentSummary {
            symbol: base.symbol.clone(),
            label: base.display_name().to_string(),
            points: base_prices.len(),
        },
        comparison: InstrumentSummary {
            symbol: comparison.symbol.clone(),
            label: comparison.display_name().to_string(),
            points: comparison_prices.len(),
        },
        start: config.range.start,
        end: config.range.end,
        interval: config.range.interval.to_string(),
        aligned_points: aligned.len(),
        lags: AnalysisReport::lag_rows(&lags),
        best: best.as_ref().ok().map(BestRow::from),
    };

    Ok(AnalysisOutcome {
        run_id,
        aligned,
        base_returns,
        comparison_returns,
        lags,
        best,
        report,
    })
}

async fn fetch(
    provider: &dyn MarketDataProvider,
    config: &Config,
    symbol: &str,
) -> Result<TimeSeries, AnalysisError> {
    let request = PriceRequest::new(
        symbol,
        config.range.start,
        config.range.end,
        config.range.interval,
    );

    tracing::info!(symbol, provider = provider.name(), "Downloading prices");
    let started = Instant::now();
    let prices = provider.fetch_prices(&request).await?;
    record_latency(LatencyMetric::Fetch, started.elapsed());
    record_count(CountMetric::PointsFetched, prices.len() as u64);

    Ok(prices)
}

fn returns(prices: &TimeSeries, symbol: &str) -> Result<ReturnSeries, AnalysisError> {
    ReturnSeries::from_prices(prices).map_err(|source| AnalysisError::InvalidSeries {
        symbol: symbol.to_string(),
        source,
    })
}

/// Chart of both aligned price series
pub fn price_chart(outcome: &AnalysisOutcome, config: &Config) -> Chart {
    let base = config.instruments.base.display_name();
    let comparison = config.instruments.comparison.display_name();

    Chart {
        title: format!("{} and {} Prices", base, comparison),
        x_label: "Date".to_string(),
        y_label: "Price".to_string(),
        series: vec![
            ChartSeries::new(base, "blue", outcome.aligned.base.clone()),
            ChartSeries::new(comparison, "orange", outcome.aligned.comparison.clone()),
        ],
    }
}

/// Render the aligned prices
pub fn render_prices(
    outcome: &AnalysisOutcome,
    config: &Config,
    renderer: &dyn ChartRenderer,
) -> anyhow::Result<()> {
    let started = Instant::now();
    renderer.render(&price_chart(outcome, config))?;
    record_latency(LatencyMetric::Render, started.elapsed());
    Ok(())
}

/// Write the aligned table and lag results under `dir`
pub fn export_parquet(outcome: &AnalysisOutcome, dir: &Path) -> anyhow::Result<()> {
    let started = Instant::now();
    let writer = ParquetWriter::new(dir);
    let run_id = outcome.run_id.to_string();

    let aligned_path = writer.run_path("aligned", &run_id);
    writer.write_aligned(
        &aligned_path,
        &outcome.aligned,
        &outcome.base_returns,
        &outcome.comparison_returns,
    )?;

    let lags_path = writer.run_path("lags", &run_id);
    writer.write_lag_results(&lags_path, &outcome.lags)?;

    record_latency(LatencyMetric::Export, started.elapsed());
    tracing::info!(aligned = ?aligned_path, lags = ?lags_path, "Exported results to Parquet");
    Ok(())
}
