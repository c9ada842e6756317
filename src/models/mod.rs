use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::SyncError;

/// Remote registry of canonical map image names, keyed by the stringified
/// application id.
///
/// Deserializes directly from the JSON object served by the catalog endpoint:
///
/// ```json
/// { "730": ["de_dust2", "ze_forest_night"], "240": ["de_nuke"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: HashMap<String, Vec<String>>,
}

impl Catalog {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Canonical names for `app_id`, in catalog order.
    pub fn names_for(&self, app_id: u32) -> Option<&[String]> {
        self.entries.get(&app_id.to_string()).map(Vec::as_slice)
    }

    pub fn app_count(&self) -> usize {
        self.entries.len()
    }

    pub fn name_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl<K, V> FromIterator<(K, V)> for Catalog
where
    K: ToString,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// What happened to one map of the batch
#[derive(Debug)]
pub struct MapOutcome {
    /// The raw map name as it appears in the map list
    pub map: String,
    pub status: Result<SavedImage, SyncError>,
}

/// A successfully resolved, validated and written image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub canonical_name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Coarse classification of an outcome, used for run summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Saved,
    NotFound,
    UnknownApplication,
    ResolutionMismatch,
    Failed,
}

impl MapOutcome {
    pub fn saved(map: String, image: SavedImage) -> Self {
        Self {
            map,
            status: Ok(image),
        }
    }

    pub fn failed(map: String, error: SyncError) -> Self {
        Self {
            map,
            status: Err(error),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match &self.status {
            Ok(_) => OutcomeKind::Saved,
            Err(SyncError::NoMatch { .. }) => OutcomeKind::NotFound,
            Err(SyncError::UnknownApplication { .. }) => OutcomeKind::UnknownApplication,
            Err(SyncError::ResolutionMismatch { .. }) => OutcomeKind::ResolutionMismatch,
            Err(_) => OutcomeKind::Failed,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.status.is_ok()
    }
}

/// Result of one batch run
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Outcomes in map-list order
    pub outcomes: Vec<MapOutcome>,
    /// Maps skipped because an output file already existed
    pub skipped: Vec<String>,
}

/// Per-kind counters of a [`SyncReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub saved: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub unknown_application: usize,
    pub resolution_mismatch: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn outcome(&self, map: &str) -> Option<&MapOutcome> {
        self.outcomes.iter().find(|o| o.map == map)
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary {
            skipped: self.skipped.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome.kind() {
                OutcomeKind::Saved => summary.saved += 1,
                OutcomeKind::NotFound => summary.not_found += 1,
                OutcomeKind::UnknownApplication => summary.unknown_application += 1,
                OutcomeKind::ResolutionMismatch => summary.resolution_mismatch += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }
}
