use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub images: ImagesConfig,
    pub sync: SyncConfig,
    pub variants: VariantsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub base_url: String,
    pub app_id: u32,
    pub width: u32,
    pub height: u32,
    /// Largest image body accepted, in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub map_list: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VariantsConfig {
    pub enabled: bool,
    pub build_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "https://vauff.com/mapimgs/list.php".to_string(),
            timeout_secs: 30,
            user_agent: format!("map-image-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vauff.com/mapimgs".to_string(),
            app_id: 730,
            width: 1920,
            height: 1080,
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            map_list: PathBuf::from("mapcycle.txt"),
            output_dir: PathBuf::from("../images"),
            workers: 10,
        }
    }
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            build_dir: PathBuf::from("./build"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(config_file: &Path) -> Result<Self> {
        let config: Self = if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sync.workers == 0 {
            return Err(AppError::configuration("sync.workers must be at least 1"));
        }
        if self.images.width == 0 || self.images.height == 0 {
            return Err(AppError::configuration(
                "images.width and images.height must be non-zero",
            ));
        }
        if self.images.max_bytes == 0 {
            return Err(AppError::configuration("images.max_bytes must be non-zero"));
        }
        if self.catalog.url.trim().is_empty() {
            return Err(AppError::configuration("catalog.url must not be empty"));
        }
        if self.images.base_url.trim().is_empty() {
            return Err(AppError::configuration("images.base_url must not be empty"));
        }
        Ok(())
    }
}
