//! Error taxonomy.
//!
//! Nothing here stops the monitor loop: extraction errors skip the cycle,
//! playback errors fall back and get surfaced through the command channel.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The snapshot source had no roster to read this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("snapshot source not ready")]
    SourceNotReady,
}

/// A single playback attempt failed.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("sound file missing: {0}")]
    MissingAsset(PathBuf),

    #[error("audio output error: {0}")]
    Output(String),

    #[error("playback did not finish within {0:?}")]
    WatchdogExpired(Duration),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] confy::ConfyError),
}
