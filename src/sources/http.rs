//! HTTP implementation of [`MapImageSource`]
//!
//! Catalog: `GET <catalog url>` returning `{ "<app id>": ["<name>", ...] }`.
//! Images: `GET <base url>/<app id>/<percent-encoded name>.jpg`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::MapImageSource;
use crate::config::Config;
use crate::errors::{AppError, AppResult, SyncError, SyncResult};
use crate::models::Catalog;
use crate::utils::sanitize_base_url;

/// Largest image body accepted from the image host by default
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub struct HttpMapImageSource {
    client: Client,
    catalog_url: String,
    image_base_url: String,
    max_image_bytes: usize,
}

impl HttpMapImageSource {
    pub fn new(
        catalog_url: &str,
        image_base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            catalog_url: catalog_url.trim().to_string(),
            image_base_url: sanitize_base_url(image_base_url),
            max_image_bytes: MAX_IMAGE_BYTES,
        })
    }

    /// Override the largest accepted image body
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(
            &config.catalog.url,
            &config.images.base_url,
            Duration::from_secs(config.catalog.timeout_secs),
            &config.catalog.user_agent,
        )?
        .with_max_image_bytes(config.images.max_bytes))
    }

    pub fn image_url(&self, app_id: u32, canonical_name: &str) -> String {
        image_url(&self.image_base_url, app_id, canonical_name)
    }
}

/// Build the image URL for `canonical_name` under `base_url`.
pub fn image_url(base_url: &str, app_id: u32, canonical_name: &str) -> String {
    format!(
        "{}/{}/{}.jpg",
        base_url.trim_end_matches('/'),
        app_id,
        urlencoding::encode(canonical_name)
    )
}

#[async_trait]
impl MapImageSource for HttpMapImageSource {
    async fn fetch_catalog(&self) -> AppResult<Catalog> {
        debug!("Fetching map catalog from {}", self.catalog_url);

        let response = self.client.get(&self.catalog_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::catalog(
                &self.catalog_url,
                format!("HTTP {}", response.status()),
            ));
        }

        let catalog: Catalog = response
            .json()
            .await
            .map_err(|e| AppError::catalog(&self.catalog_url, e.to_string()))?;

        info!(
            "Loaded map catalog: {} applications, {} images",
            catalog.app_count(),
            catalog.name_count()
        );
        Ok(catalog)
    }

    async fn fetch_image(&self, app_id: u32, canonical_name: &str) -> SyncResult<Vec<u8>> {
        let url = self.image_url(app_id, canonical_name);
        debug!("Downloading {}", url);

        let mut response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SyncError::http_status(response.status().as_u16(), url));
        }

        let max_size = self.max_image_bytes;
        if let Some(length) = response.content_length() {
            if length > max_size as u64 {
                return Err(SyncError::PayloadTooLarge {
                    url,
                    size: usize::try_from(length).unwrap_or(usize::MAX),
                    max_size,
                });
            }
        }

        // Content-Length may be absent or wrong, so the cap is also enforced
        // while reading
        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if data.len() + chunk.len() > max_size {
                return Err(SyncError::PayloadTooLarge {
                    url,
                    size: data.len() + chunk.len(),
                    max_size,
                });
            }
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }
}
