//! Snapshot provider boundary.
//!
//! A provider hands over one raw roster tree per cycle: entities with a
//! display label, fixed buckets, and index-ordered time-slot buckets. The
//! tree carries no markup and no identity guarantees; extraction turns it
//! into a canonical [`crate::roster::RosterSnapshot`].

use serde::Deserialize;
use wardbell_types::TaskChannel;

/// One channel marker inside a bucket. A marker with no count means "at
/// least one task present".
#[derive(Debug, Clone, Deserialize)]
pub struct RawMarker {
    pub channel: TaskChannel,
    #[serde(default)]
    pub count: Option<u32>,
}

/// One bucket as the source presents it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBucket {
    #[serde(default)]
    pub markers: Vec<RawMarker>,
    /// Bucket-level notification flag, read under the presence shape.
    #[serde(default)]
    pub flagged: bool,
}

/// One roster row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub label: String,
    #[serde(default)]
    pub in_exam_room: Option<bool>,
    #[serde(default)]
    pub critical_notes: RawBucket,
    #[serde(default)]
    pub missed: RawBucket,
    #[serde(default)]
    pub due: RawBucket,
    /// Slot buckets in column order; interpreted through `slot_labels`.
    #[serde(default)]
    pub slots: Vec<RawBucket>,
}

/// The whole roster as read from the source in one cycle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoster {
    /// Time-slot column headers in display order.
    #[serde(default)]
    pub slot_labels: Vec<String>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
}

/// Source of raw roster snapshots, polled once per monitor cycle.
pub trait SnapshotProvider {
    /// Read the current roster, or `None` when the source has nothing to
    /// offer yet (page still loading, file missing or mid-write).
    fn roster(&mut self) -> Option<RawRoster>;
}
