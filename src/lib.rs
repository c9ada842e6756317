//! map-image-sync
//!
//! Downloads map preview images for a game server. Local map names are
//! matched against a remote catalog of canonical image names, the best match
//! is downloaded, checked for the expected resolution and written to an
//! output directory that doubles as a cache for later runs.

pub mod config;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod sources;
pub mod storage;
pub mod sync;
pub mod utils;
pub mod variants;
