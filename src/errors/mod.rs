//! Centralized error handling for map-image-sync
//!
//! Errors are split in two layers:
//!
//! - **AppError**: process-level failures (configuration, catalog download,
//!   reading the map list) that stop the run before any map is processed.
//! - **SyncError**: failures scoped to a single map. The batch records them
//!   in its report and carries on with the remaining maps.
//!
//! # Usage
//!
//! ```rust
//! use map_image_sync::errors::{SyncError, SyncResult};
//!
//! fn lookup(app_id: u32) -> SyncResult<()> {
//!     Err(SyncError::unknown_application(app_id))
//! }
//!
//! assert!(lookup(730).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for per-map Results
pub type SyncResult<T> = Result<T, SyncError>;
