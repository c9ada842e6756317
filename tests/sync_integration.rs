use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use map_image_sync::{
    errors::{AppResult, SyncError, SyncResult},
    models::{Catalog, OutcomeKind},
    sources::MapImageSource,
    storage::MapImageStorage,
    sync::{MapImageSync, SyncOptions},
    variants::{ImageVariant, VariantFormat, VariantGenerator},
};

const APP_ID: u32 = 730;
const SMALL: (u32, u32) = (64, 36);

// In-memory stand-in for the remote image host
struct FakeSource {
    catalog: Catalog,
    images: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSource {
    fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            images: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_image(mut self, name: &str, data: Vec<u8>) -> Self {
        self.images.insert(name.to_string(), data);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MapImageSource for FakeSource {
    async fn fetch_catalog(&self) -> AppResult<Catalog> {
        Ok(self.catalog.clone())
    }

    async fn fetch_image(&self, app_id: u32, canonical_name: &str) -> SyncResult<Vec<u8>> {
        self.requests.lock().unwrap().push(canonical_name.to_string());
        self.images
            .get(canonical_name)
            .cloned()
            .ok_or_else(|| {
                SyncError::http_status(404, format!("fake://{}/{}.jpg", app_id, canonical_name))
            })
    }
}

fn jpeg((width, height): (u32, u32)) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Jpeg(80))
        .unwrap();
    buffer.into_inner()
}

fn catalog(names: &[&str]) -> Catalog {
    [(APP_ID, names.to_vec())].into_iter().collect()
}

fn options(workers: usize) -> SyncOptions {
    SyncOptions {
        app_id: APP_ID,
        resolution: SMALL,
        workers,
    }
}

fn build(source: Arc<FakeSource>, dir: &TempDir, workers: usize) -> MapImageSync {
    let catalog = Arc::new(source.catalog.clone());
    MapImageSync::new(
        source,
        catalog,
        MapImageStorage::new(dir.path().join("images")),
        options(workers),
    )
}

fn maps(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_saves_resolved_images_under_raw_name() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["ze_Forest", "ze_Forest_Night"]))
            .with_image("ze_Forest", jpeg(SMALL))
            .with_image("ze_Forest_Night", jpeg(SMALL)),
    );
    let sync = build(source.clone(), &dir, 4);

    let report = sync.run(maps(&["ze_forest_night_v2"])).await;

    let outcome = report.outcome("ze_forest_night_v2").unwrap();
    let saved = outcome.status.as_ref().unwrap();
    assert_eq!(saved.canonical_name, "ze_Forest_Night");
    assert_eq!((saved.width, saved.height), SMALL);
    assert_eq!(
        saved.path,
        dir.path().join("images").join("ze_forest_night_v2.jpg")
    );
    assert!(saved.path.exists());
    assert_eq!(source.requests(), vec!["ze_Forest_Night".to_string()]);
}

#[tokio::test]
async fn test_uppercase_map_names_are_lowercased_for_matching() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["de_Dust2"])).with_image("de_Dust2", jpeg(SMALL)),
    );
    let sync = build(source, &dir, 1);

    let report = sync.run(maps(&["DE_DUST2_CSGO"])).await;

    assert!(report.outcome("DE_DUST2_CSGO").unwrap().is_saved());
    assert!(dir.path().join("images").join("DE_DUST2_CSGO.jpg").exists());
}

#[tokio::test]
async fn test_existing_images_are_skipped() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["de_dust2", "de_nuke"]))
            .with_image("de_dust2", jpeg(SMALL))
            .with_image("de_nuke", jpeg(SMALL)),
    );
    let sync = build(source.clone(), &dir, 2);

    let first = sync.run(maps(&["de_dust2"])).await;
    assert_eq!(first.summary().saved, 1);

    let second = sync.run(maps(&["de_dust2", "de_nuke"])).await;
    assert_eq!(second.skipped, vec!["de_dust2".to_string()]);
    assert_eq!(second.outcomes.len(), 1);
    assert_eq!(second.outcomes[0].map, "de_nuke");

    // de_dust2 was only ever fetched by the first run
    assert_eq!(
        source.requests(),
        vec!["de_dust2".to_string(), "de_nuke".to_string()]
    );
}

#[tokio::test]
async fn test_wrong_resolution_is_never_written() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["de_tiny"])).with_image("de_tiny", jpeg((32, 32))),
    );
    let sync = build(source, &dir, 1);

    let report = sync.run(maps(&["de_tiny"])).await;

    let outcome = report.outcome("de_tiny").unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::ResolutionMismatch);
    assert!(!dir.path().join("images").join("de_tiny.jpg").exists());
}

#[tokio::test]
async fn test_full_hd_requirement_by_default() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["ze_hd", "ze_small"]))
            .with_image("ze_hd", jpeg((1920, 1080)))
            .with_image("ze_small", jpeg((1280, 720))),
    );
    let catalog = Arc::new(source.catalog.clone());
    let sync = MapImageSync::new(
        source,
        catalog,
        MapImageStorage::new(dir.path().to_path_buf()),
        SyncOptions::default(),
    );

    let report = sync.run(maps(&["ze_hd", "ze_small"])).await;

    assert!(report.outcome("ze_hd").unwrap().is_saved());
    assert!(matches!(
        report.outcome("ze_small").unwrap().status,
        Err(SyncError::ResolutionMismatch {
            width: 1280,
            height: 720,
            ..
        })
    ));
    assert!(dir.path().join("ze_hd.jpg").exists());
    assert!(!dir.path().join("ze_small.jpg").exists());
}

#[tokio::test]
async fn test_failures_do_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["de_dust2", "de_missing", "de_broken", "de_nuke"]))
            .with_image("de_dust2", jpeg(SMALL))
            .with_image("de_broken", b"<html>oops</html>".to_vec())
            .with_image("de_nuke", jpeg(SMALL)),
    );
    let sync = build(source, &dir, 3);

    let report = sync
        .run(maps(&[
            "de_dust2",
            "cs_office",
            "de_missing",
            "de_broken",
            "../escape",
            "de_nuke",
        ]))
        .await;

    let kinds: Vec<(String, OutcomeKind)> = report
        .outcomes
        .iter()
        .map(|o| (o.map.clone(), o.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("de_dust2".to_string(), OutcomeKind::Saved),
            ("cs_office".to_string(), OutcomeKind::NotFound),
            ("de_missing".to_string(), OutcomeKind::Failed),
            ("de_broken".to_string(), OutcomeKind::Failed),
            ("../escape".to_string(), OutcomeKind::Failed),
            ("de_nuke".to_string(), OutcomeKind::Saved),
        ]
    );
    assert!(matches!(
        report.outcome("de_broken").unwrap().status,
        Err(SyncError::Image(_))
    ));
    assert!(matches!(
        report.outcome("../escape").unwrap().status,
        Err(SyncError::InvalidMapName { .. })
    ));

    let summary = report.summary();
    assert_eq!(summary.saved, 2);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.failed, 3);
}

#[tokio::test]
async fn test_unknown_application_is_reported_per_map() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FakeSource::new(catalog(&["de_dust2"])));
    let catalog = Arc::new(source.catalog.clone());
    let sync = MapImageSync::new(
        source.clone(),
        catalog,
        MapImageStorage::new(dir.path().to_path_buf()),
        SyncOptions {
            app_id: 240,
            ..options(2)
        },
    );

    let report = sync.run(maps(&["de_dust2", "de_nuke"])).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.kind() == OutcomeKind::UnknownApplication));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_outcomes_keep_input_order_with_many_workers() {
    let dir = TempDir::new().unwrap();
    let names: Vec<String> = (0..25).map(|i| format!("map_{:02}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut source = FakeSource::new(catalog(&refs));
    for name in &names {
        source = source.with_image(name, jpeg(SMALL));
    }
    let sync = build(Arc::new(source), &dir, 10);

    let report = sync.run(names.clone()).await;

    let order: Vec<String> = report.outcomes.iter().map(|o| o.map.clone()).collect();
    assert_eq!(order, names);
    assert_eq!(report.summary().saved, 25);
}

#[tokio::test]
async fn test_variants_written_when_enabled() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(
        FakeSource::new(catalog(&["ze_Forest"])).with_image("ze_Forest", jpeg(SMALL)),
    );
    let build_dir = dir.path().join("build");
    let sync = build(source, &dir, 1).with_variants(VariantGenerator::new(build_dir.clone()));

    let report = sync.run(maps(&["ze_forest_v3"])).await;
    assert!(report.outcome("ze_forest_v3").unwrap().is_saved());

    let generator = VariantGenerator::new(build_dir);
    for format in VariantFormat::ALL {
        for variant in ImageVariant::ALL {
            assert!(
                generator.variant_path("ze_forest_v3", format, variant).exists(),
                "missing {:?} {:?} variant",
                format,
                variant
            );
        }
    }
}

#[tokio::test]
async fn test_stale_variants_removed_on_wrong_resolution() {
    let dir = TempDir::new().unwrap();
    let build_dir = dir.path().join("build");
    let generator = VariantGenerator::new(build_dir.clone());

    // Variants from an earlier image whose full-size file was since deleted
    for format in VariantFormat::ALL {
        for variant in ImageVariant::ALL {
            let path = generator.variant_path("de_tiny", format, variant);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, b"old").unwrap();
        }
    }
    let unrelated = generator.variant_path("de_other", VariantFormat::Jpg, ImageVariant::Full);
    std::fs::write(&unrelated, b"keep").unwrap();

    let source = Arc::new(
        FakeSource::new(catalog(&["de_tiny"])).with_image("de_tiny", jpeg((32, 32))),
    );
    let sync = build(source, &dir, 1).with_variants(generator.clone());

    let report = sync.run(maps(&["de_tiny"])).await;

    assert_eq!(
        report.outcome("de_tiny").unwrap().kind(),
        OutcomeKind::ResolutionMismatch
    );
    for format in VariantFormat::ALL {
        for variant in ImageVariant::ALL {
            assert!(!generator.variant_path("de_tiny", format, variant).exists());
        }
    }
    assert!(unrelated.exists());
}
