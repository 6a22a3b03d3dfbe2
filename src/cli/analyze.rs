//! Analyze command implementation

use clap::Args;
use std::path::PathBuf;

use super::InstrumentArgs;
use crate::config::{Config, LagSpec, ProviderKind};
use crate::pipeline;
use crate::provider;
use crate::render::SvgRenderer;
use crate::report::ReportFormat;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub instruments: InstrumentArgs,

    /// Lags to test, e.g. `1,2,3` or `1-5`
    #[arg(long)]
    pub lags: Option<LagSpec>,

    /// Minimum aligned pairs for a correlation
    #[arg(long)]
    pub min_pairs: Option<usize>,

    /// Use the same sample window for every lag
    #[arg(long, conflicts_with = "no_common_sample")]
    pub common_sample: bool,

    /// Give every lag its own sample window
    #[arg(long)]
    pub no_common_sample: bool,

    /// Chart output path
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Skip the price chart
    #[arg(long)]
    pub no_plot: bool,

    /// Directory for Parquet export of the aligned table and lag results
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Read prices from Parquet files in the data directory
    #[arg(long)]
    pub offline: bool,

    /// Directory of Parquet price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Fold command line overrides into the configuration
    pub fn apply(&self, config: &mut Config) {
        self.instruments.apply(config);

        if let Some(lags) = &self.lags {
            config.analysis.lags = lags.0.clone();
        }
        if let Some(min_pairs) = self.min_pairs {
            config.analysis.min_pairs = min_pairs;
        }
        if self.common_sample {
            config.analysis.common_sample = true;
        }
        if self.no_common_sample {
            config.analysis.common_sample = false;
        }
        if let Some(chart) = &self.chart {
            config.output.chart_path = chart.clone();
        }
        if self.no_plot {
            config.output.plot = false;
        }
        if let Some(dir) = &self.export {
            config.output.export_dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.offline {
            config.provider.kind = ProviderKind::Parquet;
        }
        if let Some(dir) = &self.data_dir {
            config.provider.data_dir = dir.clone();
        }
    }

    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.apply(&mut config);
        config.validate()?;

        let provider = provider::from_config(&config.provider)?;
        tracing::info!(
            base = %config.instruments.base.symbol,
            comparison = %config.instruments.comparison.symbol,
            provider = provider.name(),
            "Starting lag analysis"
        );

        let outcome = pipeline::run_analysis(&config, provider.as_ref()).await?;

        print!("{}", outcome.report.render(config.output.format)?);
        if config.output.format == ReportFormat::Json {
            println!();
        }

        if let Some(dir) = &config.output.export_dir {
            pipeline::export_parquet(&outcome, dir)?;
        }

        if config.output.plot {
            let renderer = SvgRenderer::new(&config.output.chart_path);
            pipeline::render_prices(&outcome, &config, &renderer)?;
        }

        outcome.best?;
        Ok(())
    }
}
