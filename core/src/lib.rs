pub mod audio;
pub mod error;
pub mod events;
pub mod extract;
pub mod identity;
pub mod monitor;
pub mod provider;
pub mod reconcile;
pub mod roster;
pub mod settings;

// Re-exports for convenience
pub use audio::{AudioSink, ChimeQueue, ChimeRequest, PlaybackFailure, MAX_QUEUE_SIZE};
pub use error::{ExtractError, PlaybackError, SettingsError};
pub use events::ChangeEvent;
pub use monitor::{Monitor, MonitorHandle, TriggerStrategy};
pub use provider::{RawBucket, RawEntity, RawMarker, RawRoster, SnapshotProvider};
pub use reconcile::ReconcileEngine;
pub use roster::{EntityKey, EntityState, RosterSnapshot, SlotLabel};
pub use settings::{AudioSettings, ChannelSettings, SettingsStore};
