//! Snapshot extraction.
//!
//! Turns one raw provider tree into a canonical [`RosterSnapshot`].
//! Extraction is deliberately forgiving: missing buckets and out-of-range
//! slot indices degrade to zero, and only a completely absent roster is an
//! error. Identity is resolved against the previous cycle's key set so the
//! snapshot speaks the same keys as the retained table.

use wardbell_types::{BucketShape, TaskChannel, TaskCounters};

use crate::error::ExtractError;
use crate::identity;
use crate::provider::{RawBucket, SnapshotProvider};
use crate::roster::{EntityKey, EntityState, RosterSnapshot};

/// Read one snapshot from the provider.
///
/// `known_keys` is the retained table's key set in its iteration order.
/// Duplicate resolved keys within one snapshot keep the first occurrence.
pub fn extract<P: SnapshotProvider>(
    provider: &mut P,
    known_keys: &[EntityKey],
    shape: BucketShape,
) -> Result<RosterSnapshot, ExtractError> {
    let raw = provider.roster().ok_or(ExtractError::SourceNotReady)?;

    let mut snapshot = RosterSnapshot {
        entities: Vec::with_capacity(raw.entities.len()),
        slot_order: raw.slot_labels,
    };

    for raw_entity in raw.entities {
        let key = identity::resolve(&raw_entity.label, known_keys.iter());
        if key.is_empty() {
            tracing::debug!(label = %raw_entity.label, "skipping entity with empty label");
            continue;
        }
        if snapshot.contains_key(&key) {
            tracing::debug!(key = %key, "duplicate entity in snapshot, keeping first");
            continue;
        }

        let mut entity = EntityState::new(key, &snapshot.slot_order);
        entity.in_exam_room = raw_entity.in_exam_room;
        entity.critical_notes = read_bucket(&raw_entity.critical_notes, shape);
        entity.missed = read_bucket(&raw_entity.missed, shape);
        entity.due = read_bucket(&raw_entity.due, shape);

        for (idx, bucket) in raw_entity.slots.iter().enumerate() {
            // Buckets past the header row have no label to file them under
            let Some(label) = snapshot.slot_order.get(idx) else {
                tracing::debug!(index = idx, "slot bucket beyond header row, ignored");
                break;
            };
            entity
                .time_slots
                .insert(label.clone(), read_bucket(bucket, shape));
        }

        snapshot.entities.push(entity);
    }

    Ok(snapshot)
}

/// Count policy: an explicit number wins, a bare marker counts as one, an
/// absent marker is zero. Under the presence shape the bucket flag lands on
/// the diagnostics channel as 0 or 1.
fn read_bucket(bucket: &RawBucket, shape: BucketShape) -> TaskCounters {
    let mut counters = TaskCounters::ZERO;
    match shape {
        BucketShape::Presence => {
            counters.diagnostics = bucket.flagged as u32;
        }
        BucketShape::Counts => {
            for channel in TaskChannel::ALL {
                let count = bucket
                    .markers
                    .iter()
                    .find(|m| m.channel == channel)
                    .map(|m| m.count.unwrap_or(1))
                    .unwrap_or(0);
                counters.set(channel, count);
            }
        }
    }
    counters
}
