//! Resized variants of saved map images
//!
//! Each saved image can be turned into a set of variants under a build
//! directory, in both JPEG and WebP:
//!
//! | variant     | size                      | jpg           | webp          |
//! |-------------|---------------------------|---------------|---------------|
//! | `full`      | 1920x1080 (forced)        | `images/`     | `webp/`       |
//! | `medium`    | 512 wide, height to ratio | `mediums/`    | `webp/medium/`|
//! | `thumbnail` | 200 wide, height to ratio | `thumbnails/` | `webp/thumb/` |
//!
//! A failing variant is logged and skipped; it never fails the sync of the
//! map it was derived from.

use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageOutputFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{SyncError, SyncResult};
use crate::utils::run_blocking;

const VARIANT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageVariant {
    Full,
    Medium,
    Thumbnail,
}

/// Encoding of a variant file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantFormat {
    Jpg,
    /// Lossless WebP
    WebP,
}

impl ImageVariant {
    pub const ALL: [ImageVariant; 3] = [Self::Full, Self::Medium, Self::Thumbnail];

    /// Target width and, when fixed, height
    pub fn dimensions(self) -> (u32, Option<u32>) {
        match self {
            Self::Full => (1920, Some(1080)),
            Self::Medium => (512, None),
            Self::Thumbnail => (200, None),
        }
    }

    /// Output size for a source image of `width`x`height`
    pub fn target_size(self, width: u32, height: u32) -> (u32, u32) {
        match self.dimensions() {
            (w, Some(h)) => (w, h),
            (w, None) => {
                let scaled = (u64::from(height) * u64::from(w) + u64::from(width) / 2)
                    / u64::from(width.max(1));
                (w, scaled.clamp(1, u64::from(u32::MAX)) as u32)
            }
        }
    }
}

impl VariantFormat {
    pub const ALL: [VariantFormat; 2] = [Self::Jpg, Self::WebP];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Directory of `variant` in this format, relative to the build directory
    pub fn directory(self, variant: ImageVariant) -> &'static str {
        match (self, variant) {
            (Self::Jpg, ImageVariant::Full) => "images",
            (Self::Jpg, ImageVariant::Medium) => "mediums",
            (Self::Jpg, ImageVariant::Thumbnail) => "thumbnails",
            (Self::WebP, ImageVariant::Full) => "webp",
            (Self::WebP, ImageVariant::Medium) => "webp/medium",
            (Self::WebP, ImageVariant::Thumbnail) => "webp/thumb",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantGenerator {
    build_dir: PathBuf,
}

impl VariantGenerator {
    pub fn new(build_dir: PathBuf) -> Self {
        Self { build_dir }
    }

    pub fn variant_path(&self, name: &str, format: VariantFormat, variant: ImageVariant) -> PathBuf {
        self.build_dir
            .join(format.directory(variant))
            .join(format!("{}.{}", name, format.extension()))
    }

    /// Write every variant of the image at `src` in every format, returning
    /// the written paths.
    pub async fn generate_variants(&self, src: &Path) -> SyncResult<Vec<PathBuf>> {
        let name = src
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SyncError::invalid_map_name(src.display().to_string()))?
            .to_string();
        let src = src.to_path_buf();
        let generator = self.clone();

        run_blocking(move || {
            let image = image::open(&src)?;
            let mut written = Vec::new();

            for variant in ImageVariant::ALL {
                let resized = resize(&image, variant);
                for format in VariantFormat::ALL {
                    let dest = generator.variant_path(&name, format, variant);
                    match write_variant(&resized, format, &dest) {
                        Ok(()) => {
                            debug!("Wrote {:?} {:?} variant of {} to {}", format, variant, name, dest.display());
                            written.push(dest);
                        }
                        Err(e) => warn!(
                            "Resize failed {} to {} ({:?}): {}",
                            src.display(),
                            dest.display(),
                            variant,
                            e
                        ),
                    }
                }
            }

            Ok(written)
        })
        .await
    }

    /// Remove every variant of `name` in every format; missing files are
    /// ignored
    pub async fn remove_variants(&self, name: &str) -> SyncResult<()> {
        for format in VariantFormat::ALL {
            for variant in ImageVariant::ALL {
                match tokio::fs::remove_file(self.variant_path(name, format, variant)).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }
}

fn resize(image: &DynamicImage, variant: ImageVariant) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = variant.target_size(width, height);
    if (width, height) == (target_width, target_height) {
        image.clone()
    } else {
        image.resize_exact(target_width, target_height, FilterType::Lanczos3)
    }
}

fn write_variant(image: &DynamicImage, format: VariantFormat, dest: &Path) -> SyncResult<()> {
    if let Some(dir) = dest.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut writer = BufWriter::new(File::create(dest)?);
    match format {
        VariantFormat::Jpg => {
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_to(&mut writer, ImageOutputFormat::Jpeg(VARIANT_JPEG_QUALITY))?;
        }
        VariantFormat::WebP => {
            let rgba = image.to_rgba8();
            WebPEncoder::new_lossless(&mut writer).encode(
                &rgba,
                rgba.width(),
                rgba.height(),
                ColorType::Rgba8,
            )?;
        }
    }
    Ok(())
}
