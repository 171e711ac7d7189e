//! Notification queue.
//!
//! Chime requests are queued FIFO and played one at a time. The queue is
//! bounded; enqueueing on a full queue drops the request. A failing custom
//! sound reverts the channel to its built-in default and retries once, so
//! a bad file selection degrades instead of silencing the channel.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::Instant;
use wardbell_types::SoundChannel;

use crate::error::PlaybackError;
use crate::settings::SettingsStore;


pub const MAX_QUEUE_SIZE: usize = 20;

/// Upper bound on a single playback; a wedged sink forfeits its turn.
const PLAYBACK_WATCHDOG: Duration = Duration::from_secs(10);

/// Plays one sound file to completion.
pub trait AudioSink {
    fn play(
        &mut self,
        path: &Path,
        volume: f32,
    ) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    /// Stop any in-flight playback. Default is a no-op.
    fn stop(&mut self) {}
}

/// One queued chime.
#[derive(Debug, Clone)]
pub struct ChimeRequest {
    pub channel: SoundChannel,
    pub enqueued_at: Instant,
}

/// A playback failure surfaced after fallback was exhausted.
#[derive(Debug, Clone)]
pub struct PlaybackFailure {
    pub channel: SoundChannel,
    pub error: String,
    pub at: NaiveDateTime,
}

/// Bounded FIFO of chime requests with sequential playback.
#[derive(Debug)]
pub struct ChimeQueue<S> {
    queue: VecDeque<ChimeRequest>,
    /// Mutated only at the entry and exit of `process_queue`.
    is_playing: bool,
    sink: S,
    failures: Vec<PlaybackFailure>,
    watchdog: Duration,
}

impl<S: AudioSink> ChimeQueue<S> {
    pub fn new(sink: S) -> Self {
        Self {
            queue: VecDeque::new(),
            is_playing: false,
            sink,
            failures: Vec::new(),
            watchdog: PLAYBACK_WATCHDOG,
        }
    }

    #[cfg(test)]
    fn with_watchdog(sink: S, watchdog: Duration) -> Self {
        let mut q = Self::new(sink);
        q.watchdog = watchdog;
        q
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue a chime. A full queue drops the request.
    pub fn enqueue(&mut self, channel: SoundChannel) {
        if self.queue.len() >= MAX_QUEUE_SIZE {
            tracing::debug!(%channel, "chime queue full, request dropped");
            return;
        }
        self.queue.push_back(ChimeRequest {
            channel,
            enqueued_at: Instant::now(),
        });
    }

    /// Drain the queue, playing each chime to completion. Single-flight: a
    /// call made while another is draining returns immediately.
    pub async fn process_queue(&mut self, settings: &mut SettingsStore) {
        if self.is_playing {
            return;
        }
        self.is_playing = true;

        while let Some(request) = self.queue.pop_front() {
            self.play_one(request, settings).await;
        }

        self.is_playing = false;
    }

    /// Drain surfaced playback failures.
    pub fn take_failures(&mut self) -> Vec<PlaybackFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Drop all pending chimes and stop in-flight audio.
    pub fn cleanup(&mut self) {
        self.queue.clear();
        self.is_playing = false;
        self.sink.stop();
    }

    async fn play_one(&mut self, request: ChimeRequest, settings: &mut SettingsStore) {
        let channel = request.channel;
        let current = settings.get();
        let channel_settings = current.channel(channel);

        // Enable state is read at play time, not enqueue time
        if !channel_settings.enabled {
            tracing::debug!(%channel, "channel disabled, chime skipped");
            return;
        }

        let volume = current.effective_volume(channel);
        let custom = channel_settings.asset.clone();
        let path = custom
            .clone()
            .unwrap_or_else(|| default_asset_path(channel));

        match self.play_with_watchdog(&path, volume).await {
            Ok(()) => {}
            Err(err) if custom.is_some() => {
                tracing::warn!(%channel, %err, "custom sound failed, falling back to default");
                if let Err(e) = settings.revert_to_default(channel) {
                    tracing::error!("failed to persist sound reversion: {e}");
                }
                let fallback = default_asset_path(channel);
                if let Err(err) = self.play_with_watchdog(&fallback, volume).await {
                    self.record_failure(channel, &err);
                }
            }
            Err(err) => self.record_failure(channel, &err),
        }
    }

    async fn play_with_watchdog(
        &mut self,
        path: &Path,
        volume: f32,
    ) -> Result<(), PlaybackError> {
        match tokio::time::timeout(self.watchdog, self.sink.play(path, volume)).await {
            Ok(result) => result,
            Err(_) => {
                self.sink.stop();
                Err(PlaybackError::WatchdogExpired(self.watchdog))
            }
        }
    }

    fn record_failure(&mut self, channel: SoundChannel, err: &PlaybackError) {
        tracing::error!(%channel, %err, "chime playback failed");
        self.failures.push(PlaybackFailure {
            channel,
            error: err.to_string(),
            at: chrono::Local::now().naive_local(),
        });
    }
}

/// Resolve a channel's built-in sound: user config dir first, then a
/// `sounds` directory next to the executable, then the working directory.
pub fn default_asset_path(channel: SoundChannel) -> PathBuf {
    let filename = channel.default_asset();

    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join(APP_SOUND_DIR).join(filename);
        if candidate.exists() {
            return candidate;
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("sounds").join(filename);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    PathBuf::from("assets/sounds").join(filename)
}

const APP_SOUND_DIR: &str = "wardbell/sounds";
