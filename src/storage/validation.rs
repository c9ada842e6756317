//! Decoding and resolution checks for fetched images

use image::{DynamicImage, GenericImageView};

use crate::errors::{SyncError, SyncResult};
use crate::utils::run_blocking;

/// A fetched image that decoded successfully
#[derive(Debug)]
pub struct ValidatedImage {
    /// Raw bytes as received
    pub data: Vec<u8>,
    pub image: DynamicImage,
}

impl ValidatedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Check the image against the required resolution
    pub fn ensure_resolution(&self, map: &str, expected: (u32, u32)) -> SyncResult<()> {
        let actual = self.dimensions();
        if actual != expected {
            return Err(SyncError::resolution_mismatch(map, actual, expected));
        }
        Ok(())
    }
}

/// Fully decode `data` on the blocking pool
pub async fn decode_image(data: Vec<u8>) -> SyncResult<ValidatedImage> {
    run_blocking(move || {
        let image = image::load_from_memory(&data)?;
        Ok(ValidatedImage { data, image })
    })
    .await
}
