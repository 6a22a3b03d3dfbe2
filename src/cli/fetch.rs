//! Fetch command implementation

use clap::Args;
use std::path::PathBuf;

use super::InstrumentArgs;
use crate::config::{Config, ProviderKind};
use crate::data::ParquetWriter;
use crate::provider::{self, PriceRequest};

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub instruments: InstrumentArgs,

    /// Output directory, defaults to the provider data directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.instruments.apply(&mut config);
        config.validate()?;

        // Always download; Parquet is the destination here
        config.provider.kind = ProviderKind::Yahoo;
        let provider = provider::from_config(&config.provider)?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| config.provider.data_dir.clone());
        let writer = ParquetWriter::new(output);

        for instrument in [&config.instruments.base, &config.instruments.comparison] {
            let request = PriceRequest::new(
                &instrument.symbol,
                config.range.start,
                config.range.end,
                config.range.interval,
            );
            let prices = provider.fetch_prices(&request).await?;

            let path = writer.price_path(&instrument.symbol);
            writer.write_prices(&path, &instrument.symbol, &prices)?;

            tracing::info!(symbol = %instrument.symbol, count = prices.len(), path = ?path, "Saved prices");
            println!(
                "{}: {} prices -> {}",
                instrument.symbol,
                prices.len(),
                path.display()
            );
        }

        Ok(())
    }
}
