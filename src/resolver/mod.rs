//! Map name resolution against the remote catalog
//!
//! Local map names are frequently the canonical catalog name with a version
//! or variant suffix appended (`ze_forest_night_v2` for `ze_Forest_Night`).
//! A candidate is only considered when the truncated local name literally
//! starts with the candidate's lowercased text; eligible candidates are then
//! ranked by Levenshtein distance, keeping the first one seen on ties.
//! There is no fallback to pure edit distance when no candidate
//! is prefix-eligible.

use std::sync::Arc;
use tracing::trace;

use crate::errors::{SyncError, SyncResult};
use crate::models::Catalog;
use crate::utils::{levenshtein, truncate_chars};

/// Maximum number of characters of a local map name used for matching
pub const MAX_MAP_NAME_CHARS: usize = 31;

/// Resolves local map names to canonical catalog names.
///
/// Holds the catalog behind an `Arc`, so clones are cheap and the resolver
/// can be shared across worker tasks.
#[derive(Debug, Clone)]
pub struct MapNameResolver {
    catalog: Arc<Catalog>,
}

impl MapNameResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `map` to the closest canonical name listed under `app_id`.
    ///
    /// `map` is cut to its first [`MAX_MAP_NAME_CHARS`] characters and only
    /// then lowercased, so the window never depends on how case folding
    /// changes the length of a name. Catalog names are lowercased before
    /// comparison as well. Returns `Ok(None)` when no
    /// candidate is eligible and `Err(SyncError::UnknownApplication)` when
    /// the catalog has no list for `app_id`.
    pub fn resolve(&self, map: &str, app_id: u32) -> SyncResult<Option<String>> {
        let candidates = self
            .catalog
            .names_for(app_id)
            .ok_or_else(|| SyncError::unknown_application(app_id))?;

        Ok(best_match(map, candidates).map(str::to_string))
    }
}

/// Pick the eligible candidate closest to `map`.
fn best_match<'a>(map: &str, candidates: &'a [String]) -> Option<&'a str> {
    let trimmed_map = truncate_chars(map, MAX_MAP_NAME_CHARS).to_lowercase();
    let trimmed_map = trimmed_map.as_str();
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        if !trimmed_map.starts_with(&candidate_lower) {
            continue;
        }

        let distance = levenshtein::distance(trimmed_map, &candidate_lower);
        trace!("{} -> {} (distance {})", trimmed_map, candidate, distance);

        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate.as_str(), distance)),
        }
    }

    best.map(|(name, _)| name)
}
