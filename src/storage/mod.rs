//! Output directory for map images
//!
//! Files are named after the raw map name (`<output_dir>/<map>.jpg`), and the
//! presence of that file is what marks a map as already synced.

use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use std::path::PathBuf;
use tokio::fs;

use crate::errors::{SyncError, SyncResult};
use crate::utils::run_blocking;

pub mod validation;

pub use validation::{decode_image, ValidatedImage};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone)]
pub struct MapImageStorage {
    output_dir: PathBuf,
}

impl MapImageStorage {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub async fn ensure_storage_dir(&self) -> Result<(), std::io::Error> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
        }
        Ok(())
    }

    /// Path of the image file for `map`.
    ///
    /// Fails for names that would not land directly inside the output
    /// directory.
    pub fn image_path(&self, map: &str) -> SyncResult<PathBuf> {
        if map.is_empty()
            || map == "."
            || map == ".."
            || map.contains(['/', '\\'])
            || map.contains('\0')
        {
            return Err(SyncError::invalid_map_name(map));
        }
        Ok(self.output_dir.join(format!("{}.jpg", map)))
    }

    /// Whether an image for `map` has already been written
    pub fn exists(&self, map: &str) -> bool {
        self.image_path(map).map(|p| p.exists()).unwrap_or(false)
    }

    /// Write a validated image for `map`.
    ///
    /// JPEG payloads are written byte for byte; anything else is re-encoded
    /// to JPEG first.
    pub async fn save_image(&self, map: &str, image: ValidatedImage) -> SyncResult<PathBuf> {
        let file_path = self.image_path(map)?;
        self.ensure_storage_dir().await?;

        let data = match Self::detect_image_format(&image.data) {
            Some(ImageFormat::Jpeg) => image.data,
            _ => Self::encode_jpeg(image.image).await?,
        };

        fs::write(&file_path, &data).await?;
        Ok(file_path)
    }

    async fn encode_jpeg(image: DynamicImage) -> SyncResult<Vec<u8>> {
        run_blocking(move || {
            let mut buffer = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_to(&mut buffer, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
            Ok(buffer.into_inner())
        })
        .await
    }

    pub(crate) fn detect_image_format(data: &[u8]) -> Option<ImageFormat> {
        if data.len() < 8 {
            return None;
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(&[0x47, 0x49, 0x46]) {
            Some(ImageFormat::Gif)
        } else if data.len() >= 12 && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }
}
