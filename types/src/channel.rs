//! Sound channels and bucket classification.
//!
//! A `SoundChannel` identifies one audible alert category with its own
//! volume, enable flag, and sound file. `TaskChannel` is the subset that
//! carries task counts inside roster buckets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One audible alert category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundChannel {
    Diagnostics,
    Medication,
    NursingCare,
    PatientAdded,
    PatientRemoved,
    ExamRoom,
}

impl SoundChannel {
    pub const ALL: [SoundChannel; 6] = [
        SoundChannel::Diagnostics,
        SoundChannel::Medication,
        SoundChannel::NursingCare,
        SoundChannel::PatientAdded,
        SoundChannel::PatientRemoved,
        SoundChannel::ExamRoom,
    ];

    /// Built-in sound file shipped for this channel.
    pub fn default_asset(&self) -> &'static str {
        match self {
            SoundChannel::Diagnostics => "triple_chime.mp3",
            SoundChannel::Medication => "bell_notification.mp3",
            SoundChannel::NursingCare => "doorbell_single.mp3",
            SoundChannel::PatientAdded => "patient_in.mp3",
            SoundChannel::PatientRemoved => "patient_out.mp3",
            SoundChannel::ExamRoom => "exam_room.mp3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundChannel::Diagnostics => "diagnostics",
            SoundChannel::Medication => "medication",
            SoundChannel::NursingCare => "nursing_care",
            SoundChannel::PatientAdded => "patient_added",
            SoundChannel::PatientRemoved => "patient_removed",
            SoundChannel::ExamRoom => "exam_room",
        }
    }
}

impl fmt::Display for SoundChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diagnostics" => Ok(SoundChannel::Diagnostics),
            "medication" => Ok(SoundChannel::Medication),
            "nursing_care" => Ok(SoundChannel::NursingCare),
            "patient_added" => Ok(SoundChannel::PatientAdded),
            "patient_removed" => Ok(SoundChannel::PatientRemoved),
            "exam_room" => Ok(SoundChannel::ExamRoom),
            other => Err(format!("unknown sound channel: {other}")),
        }
    }
}

/// The three task categories counted inside every roster bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskChannel {
    Diagnostics,
    Medication,
    NursingCare,
}

impl TaskChannel {
    pub const ALL: [TaskChannel; 3] = [
        TaskChannel::Diagnostics,
        TaskChannel::Medication,
        TaskChannel::NursingCare,
    ];

    /// The sound channel that alerts for this task category.
    pub fn sound_channel(&self) -> SoundChannel {
        match self {
            TaskChannel::Diagnostics => SoundChannel::Diagnostics,
            TaskChannel::Medication => SoundChannel::Medication,
            TaskChannel::NursingCare => SoundChannel::NursingCare,
        }
    }
}

impl fmt::Display for TaskChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskChannel::Diagnostics => "diagnostics",
            TaskChannel::Medication => "medication",
            TaskChannel::NursingCare => "nursing_care",
        };
        f.write_str(s)
    }
}

/// How bucket content is interpreted, resolved once at startup.
///
/// `Counts` reads per-channel numeric markers; `Presence` reads a single
/// bucket-level flag and records it on the diagnostics channel as 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketShape {
    #[default]
    Counts,
    Presence,
}

/// Identifies one bucket on an entity: a fixed bucket or a named time slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketRef {
    CriticalNotes,
    Missed,
    Due,
    TimeSlot(String),
}

impl fmt::Display for BucketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketRef::CriticalNotes => f.write_str("critical_notes"),
            BucketRef::Missed => f.write_str("missed"),
            BucketRef::Due => f.write_str("due"),
            BucketRef::TimeSlot(label) => write!(f, "slot:{label}"),
        }
    }
}
