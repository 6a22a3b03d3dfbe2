use std::path::Path;

use clap::Parser;
use lag_corr::cli::{Cli, Commands};
use lag_corr::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)
            .map_err(|e| anyhow::anyhow!("Could not load config from {}: {}", cli.config, e))?
    } else {
        eprintln!("Warning: {} not found, using default configuration", cli.config);
        Config::default()
    };

    // Initialize telemetry
    let _telemetry = lag_corr::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Analyze(args) => {
            tracing::info!("Starting analysis");
            args.execute(config).await?;
        }
        Commands::Fetch(args) => {
            tracing::info!("Starting price download");
            args.execute(config).await?;
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
