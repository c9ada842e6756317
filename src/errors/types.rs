//! Error type definitions for map-image-sync

use thiserror::Error;

/// Process-level error type
///
/// Anything in this enum prevents the batch from starting at all.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The catalog could not be fetched or parsed
    #[error("Catalog error: {url} - {message}")]
    Catalog { url: String, message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors scoped to a single map of the batch
#[derive(Error, Debug)]
pub enum SyncError {
    /// The application id has no entry in the catalog
    #[error("Unknown application: {app_id} is not present in the catalog")]
    UnknownApplication { app_id: u32 },

    /// No catalog entry is a prefix of the map name
    #[error("{map} not found")]
    NoMatch { map: String },

    /// The fetched image does not have the required dimensions
    #[error("{map} image is not {expected_width}x{expected_height} (got {width}x{height})")]
    ResolutionMismatch {
        map: String,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    /// The map name cannot be used as a file name in the output directory
    #[error("Invalid map name: {map:?}")]
    InvalidMapName { map: String },

    /// Non-success HTTP status from the image host
    #[error("HTTP error: {status} - {url}")]
    HttpStatus { status: u16, url: String },

    /// Image body exceeds the accepted size
    #[error("Payload too large: {url} ({size} bytes, max: {max_size})")]
    PayloadTooLarge {
        url: String,
        size: usize,
        max_size: usize,
    },

    /// Transport level HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image decoding or encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task panicked or was cancelled
    #[error("Worker error: {message}")]
    Worker { message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Catalog {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl SyncError {
    pub fn unknown_application(app_id: u32) -> Self {
        Self::UnknownApplication { app_id }
    }

    pub fn no_match<S: Into<String>>(map: S) -> Self {
        Self::NoMatch { map: map.into() }
    }

    /// Create a resolution mismatch error for `map`
    pub fn resolution_mismatch<S: Into<String>>(
        map: S,
        (width, height): (u32, u32),
        (expected_width, expected_height): (u32, u32),
    ) -> Self {
        Self::ResolutionMismatch {
            map: map.into(),
            width,
            height,
            expected_width,
            expected_height,
        }
    }

    pub fn invalid_map_name<S: Into<String>>(map: S) -> Self {
        Self::InvalidMapName { map: map.into() }
    }

    pub fn http_status<U: Into<String>>(status: u16, url: U) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn worker<S: Into<String>>(message: S) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}
