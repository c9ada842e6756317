//! Batch synchronisation of map images
//!
//! One job per map: resolve the name against the catalog, download the
//! matching image, check its resolution and write it to the output
//! directory. Jobs run on a bounded pool and never affect each other; every
//! job ends as a [`MapOutcome`] in the returned [`SyncReport`].

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::errors::{SyncError, SyncResult};
use crate::models::{Catalog, MapOutcome, SavedImage, SyncReport};
use crate::resolver::MapNameResolver;
use crate::sources::MapImageSource;
use crate::storage::{decode_image, MapImageStorage};
use crate::variants::VariantGenerator;

/// Run parameters of a [`MapImageSync`]
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub app_id: u32,
    /// Required `(width, height)` of every saved image
    pub resolution: (u32, u32),
    /// Maximum number of maps processed concurrently
    pub workers: usize,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_id: config.images.app_id,
            resolution: (config.images.width, config.images.height),
            workers: config.sync.workers,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct MapImageSync {
    source: Arc<dyn MapImageSource>,
    resolver: MapNameResolver,
    storage: MapImageStorage,
    variants: Option<VariantGenerator>,
    options: SyncOptions,
}

impl MapImageSync {
    pub fn new(
        source: Arc<dyn MapImageSource>,
        catalog: Arc<Catalog>,
        storage: MapImageStorage,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            resolver: MapNameResolver::new(catalog),
            storage,
            variants: None,
            options,
        }
    }

    /// Also write resized variants of every saved image
    pub fn with_variants(mut self, generator: VariantGenerator) -> Self {
        self.variants = Some(generator);
        self
    }

    /// Split `maps` into those still to fetch and those already on disk
    pub fn partition_pending(&self, maps: Vec<String>) -> (Vec<String>, Vec<String>) {
        maps.into_iter().partition(|map| !self.storage.exists(map))
    }

    /// Process every map of `maps`, skipping the ones already saved.
    ///
    /// Outcomes are returned in the order of `maps` regardless of the order
    /// in which jobs completed.
    pub async fn run(&self, maps: Vec<String>) -> SyncReport {
        let (pending, skipped) = self.partition_pending(maps);
        for map in &skipped {
            debug!("Skipping {}, image already exists", map);
        }

        info!(
            "Syncing {} maps ({} already present) with {} workers",
            pending.len(),
            skipped.len(),
            self.options.workers
        );

        let mut indexed: Vec<(usize, MapOutcome)> = stream::iter(pending.into_iter().enumerate())
            .map(|(index, map)| async move { (index, self.sync_map(map).await) })
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);

        let report = SyncReport {
            outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
            skipped,
        };

        let summary = report.summary();
        info!(
            "Sync finished: {} saved, {} skipped, {} not found, {} wrong resolution, {} unknown application, {} failed",
            summary.saved,
            summary.skipped,
            summary.not_found,
            summary.resolution_mismatch,
            summary.unknown_application,
            summary.failed
        );

        report
    }

    /// Run the full pipeline for a single map and log its outcome
    pub async fn sync_map(&self, map: String) -> MapOutcome {
        match self.process_map(&map).await {
            Ok(saved) => MapOutcome::saved(map, saved),
            Err(e) => {
                match &e {
                    SyncError::NoMatch { .. } | SyncError::ResolutionMismatch { .. } => {
                        warn!("{}", e)
                    }
                    _ => error!("{}: {}", map, e),
                }
                MapOutcome::failed(map, e)
            }
        }
    }

    /// Drop variants left over from an earlier image of `map`, so the build
    /// directory never holds variants of an image that is not saved
    async fn discard_variants(&self, map: &str) {
        if let Some(generator) = &self.variants {
            if let Err(e) = generator.remove_variants(map).await {
                warn!("Failed to remove stale variants of {}: {}", map, e);
            }
        }
    }

    async fn process_map(&self, map: &str) -> SyncResult<SavedImage> {
        // Reject unusable names before touching the network
        self.storage.image_path(map)?;

        let canonical_name = self
            .resolver
            .resolve(map, self.options.app_id)?
            .ok_or_else(|| SyncError::no_match(map))?;
        debug!("Resolved {} to {}", map, canonical_name);

        let data = self
            .source
            .fetch_image(self.options.app_id, &canonical_name)
            .await?;
        let image = decode_image(data).await?;
        if let Err(e) = image.ensure_resolution(map, self.options.resolution) {
            self.discard_variants(map).await;
            return Err(e);
        }
        let (width, height) = image.dimensions();

        info!("Saving {}...", map);
        let path = self.storage.save_image(map, image).await?;

        if let Some(generator) = &self.variants {
            if let Err(e) = generator.generate_variants(&path).await {
                warn!("Variant generation failed for {}: {}", map, e);
            }
        }

        Ok(SavedImage {
            canonical_name,
            path,
            width,
            height,
        })
    }
}

/// Parse a newline-delimited map list.
///
/// Lines are trimmed, blank lines dropped and repeated names kept only once.
pub fn parse_map_list(contents: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

pub async fn read_map_list(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_map_list(&contents))
}
