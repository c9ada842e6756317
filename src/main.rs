use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use map_image_sync::{
    config::Config,
    sources::{HttpMapImageSource, MapImageSource},
    storage::MapImageStorage,
    sync::{read_map_list, MapImageSync, SyncOptions},
    variants::VariantGenerator,
};

#[derive(Parser)]
#[command(name = "map-image-sync")]
#[command(version)]
#[command(about = "Downloads map preview images by fuzzy-matching local map names against a remote catalog")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Map list to sync (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    map_list: Option<PathBuf>,

    /// Output directory for images (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Catalog application id (overrides config file)
    #[arg(short, long, value_name = "ID")]
    app_id: Option<u32>,

    /// Number of concurrent downloads (overrides config file)
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("map_image_sync={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting map-image-sync v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    if let Some(map_list) = cli.map_list {
        config.sync.map_list = map_list;
    }
    if let Some(output_dir) = cli.output_dir {
        config.sync.output_dir = output_dir;
    }
    if let Some(app_id) = cli.app_id {
        config.images.app_id = app_id;
    }
    if let Some(workers) = cli.workers {
        config.sync.workers = workers;
    }
    config.validate()?;

    let maps = read_map_list(&config.sync.map_list)
        .await
        .with_context(|| format!("Failed to read {}", config.sync.map_list.display()))?;
    info!(
        "Read {} maps from {}",
        maps.len(),
        config.sync.map_list.display()
    );

    let source = HttpMapImageSource::from_config(&config)?;
    let catalog = source.fetch_catalog().await?;
    info!("Loaded map list");

    let storage = MapImageStorage::new(config.sync.output_dir.clone());
    storage.ensure_storage_dir().await?;

    let mut sync = MapImageSync::new(
        Arc::new(source),
        Arc::new(catalog),
        storage,
        SyncOptions::from_config(&config),
    );
    if config.variants.enabled {
        info!("Writing image variants to {}", config.variants.build_dir.display());
        sync = sync.with_variants(VariantGenerator::new(config.variants.build_dir.clone()));
    }

    sync.run(maps).await;

    Ok(())
}
