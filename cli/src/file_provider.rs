//! JSON-file snapshot provider.
//!
//! An external page bridge dumps the roster grid to a JSON file; this
//! provider re-reads it every cycle. A missing, mid-write, or malformed
//! file counts as "source not ready" rather than an error, so the monitor
//! just skips the cycle.

use std::path::PathBuf;

use wardbell_core::provider::{RawRoster, SnapshotProvider};
use wardbell_types::is_slot_label;

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotProvider for FileProvider {
    fn roster(&mut self) -> Option<RawRoster> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "roster file unreadable: {e}");
                return None;
            }
        };
        match serde_json::from_str::<RawRoster>(&text) {
            Ok(raw) => Some(retain_slot_columns(raw)),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "roster file not parseable yet: {e}");
                None
            }
        }
    }
}

/// Keep only header columns that look like clock slots, dropping the
/// matching bucket from every entity so indices stay aligned.
fn retain_slot_columns(mut raw: RawRoster) -> RawRoster {
    let keep: Vec<bool> = raw.slot_labels.iter().map(|l| is_slot_label(l)).collect();
    if keep.iter().all(|k| *k) {
        return raw;
    }

    raw.slot_labels = raw
        .slot_labels
        .into_iter()
        .zip(&keep)
        .filter_map(|(label, keep)| keep.then_some(label))
        .collect();

    for entity in &mut raw.entities {
        entity.slots = std::mem::take(&mut entity.slots)
            .into_iter()
            .zip(&keep)
            .filter_map(|(bucket, keep)| keep.then_some(bucket))
            .collect();
    }
    raw
}
