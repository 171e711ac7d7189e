//! Canonical roster state.

use std::collections::HashMap;

use serde::Serialize;
use wardbell_types::TaskCounters;

/// Canonical entity identity: trimmed, quote-stripped, lowercased label.
pub type EntityKey = String;

/// Time-slot column header, compared by exact string equality.
pub type SlotLabel = String;

/// Everything tracked for one roster entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub key: EntityKey,
    pub in_exam_room: Option<bool>,
    pub critical_notes: TaskCounters,
    pub missed: TaskCounters,
    pub due: TaskCounters,
    pub time_slots: HashMap<SlotLabel, TaskCounters>,
}

impl EntityState {
    /// A fresh entity with every bucket zeroed for the given slot set.
    pub fn new(key: EntityKey, slot_order: &[SlotLabel]) -> Self {
        Self {
            key,
            in_exam_room: None,
            critical_notes: TaskCounters::ZERO,
            missed: TaskCounters::ZERO,
            due: TaskCounters::ZERO,
            time_slots: slot_order
                .iter()
                .map(|label| (label.clone(), TaskCounters::ZERO))
                .collect(),
        }
    }
}

/// One extracted roster: transient until the engine commits it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RosterSnapshot {
    /// Entities in provider order.
    pub entities: Vec<EntityState>,
    /// Time-slot headers in display order.
    pub slot_order: Vec<SlotLabel>,
}

impl RosterSnapshot {
    pub fn contains_key(&self, key: &str) -> bool {
        self.entities.iter().any(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&EntityState> {
        self.entities.iter().find(|e| e.key == key)
    }
}
