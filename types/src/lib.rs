pub mod channel;
pub mod counters;
pub mod slot;

// Re-exports for convenience
pub use channel::{BucketRef, BucketShape, SoundChannel, TaskChannel};
pub use counters::TaskCounters;
pub use slot::is_slot_label;
