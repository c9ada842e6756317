//! Remote catalog and image sources
//!
//! The batch only talks to the remote image host through [`MapImageSource`],
//! which keeps the orchestration testable with an in-memory fake.

use async_trait::async_trait;

use crate::errors::{AppResult, SyncResult};
use crate::models::Catalog;

pub mod http;

pub use http::HttpMapImageSource;

#[async_trait]
pub trait MapImageSource: Send + Sync {
    /// Fetch the full catalog of canonical image names
    async fn fetch_catalog(&self) -> AppResult<Catalog>;

    /// Fetch the raw image bytes for a canonical name
    async fn fetch_image(&self, app_id: u32, canonical_name: &str) -> SyncResult<Vec<u8>>;
}
