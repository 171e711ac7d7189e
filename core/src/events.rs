//! Change events produced by reconciliation.

use serde::Serialize;
use wardbell_types::{BucketRef, SoundChannel, TaskChannel};

use crate::roster::{EntityKey, SlotLabel};

/// One observed roster change. Events are emitted in a fixed order within a
/// cycle: slot-set changes, additions, removals, then counter increases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    EntityAdded {
        key: EntityKey,
    },
    EntityRemoved {
        key: EntityKey,
    },
    ExamRoomEntered {
        key: EntityKey,
    },
    CounterIncreased {
        entity: EntityKey,
        bucket: BucketRef,
        channel: TaskChannel,
        old_value: u32,
        new_value: u32,
    },
    SlotSetChanged {
        added: Vec<SlotLabel>,
        removed: Vec<SlotLabel>,
    },
}

impl ChangeEvent {
    /// The sound channel this event alerts on, if any. Slot migrations are
    /// bookkeeping and stay silent.
    pub fn sound_channel(&self) -> Option<SoundChannel> {
        match self {
            ChangeEvent::EntityAdded { .. } => Some(SoundChannel::PatientAdded),
            ChangeEvent::EntityRemoved { .. } => Some(SoundChannel::PatientRemoved),
            ChangeEvent::ExamRoomEntered { .. } => Some(SoundChannel::ExamRoom),
            ChangeEvent::CounterIncreased { channel, .. } => Some(channel.sound_channel()),
            ChangeEvent::SlotSetChanged { .. } => None,
        }
    }
}
