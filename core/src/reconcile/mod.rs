//! Snapshot reconciliation.
//!
//! The engine owns the retained entity table and diffs each extracted
//! snapshot against it, producing [`ChangeEvent`]s and committing the
//! snapshot as the new retained state. Diffing runs in a fixed order so a
//! cycle's events are deterministic: slot-set migration first, then entity
//! additions, then removals, then counter increases.
//!
//! Newly added entities commit with zero buckets. Their real counts arrive
//! on the next cycle and alert then, which keeps a freshly admitted entity
//! from firing one chime per pre-existing task.

use std::collections::{BTreeMap, HashSet};

use wardbell_types::{BucketRef, BucketShape, TaskChannel, TaskCounters};

use crate::events::ChangeEvent;
use crate::roster::{EntityKey, EntityState, RosterSnapshot, SlotLabel};

#[cfg(test)]
mod engine_tests;

/// Diffs snapshots against retained state and emits change events.
#[derive(Debug, Default)]
pub struct ReconcileEngine {
    /// Retained entity table; BTreeMap for deterministic iteration.
    entities: BTreeMap<EntityKey, EntityState>,
    /// Slot headers as of the last commit.
    slot_order: Vec<SlotLabel>,
    /// How bucket content is interpreted, fixed at startup.
    shape: BucketShape,
    /// Re-entrancy guard; a cycle must commit before the next starts.
    busy: bool,
}

impl ReconcileEngine {
    pub fn new(shape: BucketShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn shape(&self) -> BucketShape {
        self.shape
    }

    /// Keys of every retained entity, in table order.
    pub fn known_keys(&self) -> Vec<EntityKey> {
        self.entities.keys().cloned().collect()
    }

    /// Drop all retained state.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.slot_order.clear();
    }

    /// Clone the retained table as a snapshot, for inspection.
    pub fn dump(&self) -> RosterSnapshot {
        RosterSnapshot {
            entities: self.entities.values().cloned().collect(),
            slot_order: self.slot_order.clone(),
        }
    }

    /// Diff `snapshot` against retained state, commit it, and return the
    /// observed changes. Returns an empty vec if a cycle is already running.
    pub fn reconcile(&mut self, snapshot: RosterSnapshot) -> Vec<ChangeEvent> {
        if self.busy {
            tracing::debug!("reconcile re-entered before commit, skipping");
            return Vec::new();
        }
        self.busy = true;
        let events = self.run_cycle(snapshot);
        self.busy = false;
        events
    }

    fn run_cycle(&mut self, snapshot: RosterSnapshot) -> Vec<ChangeEvent> {
        let mut events = Vec::new();

        self.diff_slot_set(&snapshot, &mut events);
        let added_keys = self.diff_entity_set(&snapshot, &mut events);
        self.diff_counters(&snapshot, &added_keys, &mut events);

        self.slot_order = snapshot.slot_order;
        events
    }

    /// Phase 1: migrate the retained table to the snapshot's slot headers.
    fn diff_slot_set(&mut self, snapshot: &RosterSnapshot, events: &mut Vec<ChangeEvent>) {
        let old: HashSet<&SlotLabel> = self.slot_order.iter().collect();
        let new: HashSet<&SlotLabel> = snapshot.slot_order.iter().collect();

        let added: Vec<SlotLabel> = snapshot
            .slot_order
            .iter()
            .filter(|l| !old.contains(l))
            .cloned()
            .collect();
        let removed: Vec<SlotLabel> = self
            .slot_order
            .iter()
            .filter(|l| !new.contains(l))
            .cloned()
            .collect();

        if added.is_empty() && removed.is_empty() {
            return;
        }

        for entity in self.entities.values_mut() {
            for label in &removed {
                entity.time_slots.remove(label);
            }
            for label in &added {
                entity
                    .time_slots
                    .entry(label.clone())
                    .or_insert(TaskCounters::ZERO);
            }
        }

        tracing::info!(added = ?added, removed = ?removed, "time-slot set changed");
        events.push(ChangeEvent::SlotSetChanged { added, removed });
    }

    /// Phase 2: admit new entities (at zero) and drop departed ones.
    /// Returns the keys added this cycle so the counter phase skips them.
    fn diff_entity_set(
        &mut self,
        snapshot: &RosterSnapshot,
        events: &mut Vec<ChangeEvent>,
    ) -> HashSet<EntityKey> {
        let mut added_keys = HashSet::new();

        for entity in &snapshot.entities {
            if !self.entities.contains_key(&entity.key) {
                tracing::info!(key = %entity.key, "entity added");
                self.entities.insert(
                    entity.key.clone(),
                    EntityState::new(entity.key.clone(), &snapshot.slot_order),
                );
                added_keys.insert(entity.key.clone());
                events.push(ChangeEvent::EntityAdded {
                    key: entity.key.clone(),
                });
            }
        }

        let departed: Vec<EntityKey> = self
            .entities
            .keys()
            .filter(|key| !snapshot.contains_key(key))
            .cloned()
            .collect();
        for key in departed {
            tracing::info!(key = %key, "entity removed");
            self.entities.remove(&key);
            events.push(ChangeEvent::EntityRemoved { key });
        }

        added_keys
    }

    /// Phase 3: per-bucket counter diff for entities present in both sets,
    /// then overwrite retained values with the snapshot's.
    fn diff_counters(
        &mut self,
        snapshot: &RosterSnapshot,
        added_keys: &HashSet<EntityKey>,
        events: &mut Vec<ChangeEvent>,
    ) {
        for new_state in &snapshot.entities {
            // Entities admitted this cycle stay at zero; their real counts
            // are diffed on the next cycle.
            if added_keys.contains(&new_state.key) {
                continue;
            }
            let Some(old_state) = self.entities.get_mut(&new_state.key) else {
                continue;
            };

            if old_state.in_exam_room != Some(true) && new_state.in_exam_room == Some(true) {
                events.push(ChangeEvent::ExamRoomEntered {
                    key: new_state.key.clone(),
                });
            }

            diff_bucket(
                &new_state.key,
                BucketRef::CriticalNotes,
                old_state.critical_notes,
                new_state.critical_notes,
                events,
            );
            diff_bucket(
                &new_state.key,
                BucketRef::Missed,
                old_state.missed,
                new_state.missed,
                events,
            );
            diff_bucket(
                &new_state.key,
                BucketRef::Due,
                old_state.due,
                new_state.due,
                events,
            );

            for label in &snapshot.slot_order {
                let old = old_state
                    .time_slots
                    .get(label)
                    .copied()
                    .unwrap_or(TaskCounters::ZERO);
                let new = new_state
                    .time_slots
                    .get(label)
                    .copied()
                    .unwrap_or(TaskCounters::ZERO);
                diff_bucket(
                    &new_state.key,
                    BucketRef::TimeSlot(label.clone()),
                    old,
                    new,
                    events,
                );
            }

            *old_state = new_state.clone();
        }
    }
}

/// Emit `CounterIncreased` for each channel where `new > old`. Decreases
/// are tracked silently by the commit.
fn diff_bucket(
    entity: &EntityKey,
    bucket: BucketRef,
    old: TaskCounters,
    new: TaskCounters,
    events: &mut Vec<ChangeEvent>,
) {
    for channel in TaskChannel::ALL {
        let (old_value, new_value) = (old.get(channel), new.get(channel));
        if new_value > old_value {
            events.push(ChangeEvent::CounterIncreased {
                entity: entity.clone(),
                bucket: bucket.clone(),
                channel,
                old_value,
                new_value,
            });
        }
    }
}
