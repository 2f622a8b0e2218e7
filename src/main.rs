use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_gen::{config::Config, services::PlaylistService};

#[derive(Parser)]
#[command(name = "m3u-gen")]
#[command(version = "0.1.0")]
#[command(about = "Generates an M3U playlist with cached channel logos from raw link lists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Raw list directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    raw_lists: Option<PathBuf>,

    /// Playlist output path (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("m3u_gen={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting m3u-gen v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(raw_lists) = cli.raw_lists {
        config.storage.raw_lists_path = raw_lists;
    }
    if let Some(output) = cli.output {
        config.storage.playlist_path = output;
    }
    config.validate()?;

    let mut service = PlaylistService::new(config)?;
    let summary = service.run().await?;

    info!(
        "Run complete: {} playlist entries written",
        summary.entries_written
    );
    Ok(())
}
