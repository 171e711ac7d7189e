//! Persisted audio settings.
//!
//! Settings live in the platform config directory under the app name
//! "wardbell" and are loaded/stored through confy. The store hands out
//! clones and broadcasts every change on a watch channel so long-lived
//! tasks pick up volume and enable changes without re-reading disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use wardbell_types::SoundChannel;

use crate::error::SettingsError;

const APP_NAME: &str = "wardbell";

/// Per-channel playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub volume: f32,
    pub enabled: bool,
    /// Custom sound file; `None` plays the channel's built-in default.
    pub asset: Option<PathBuf>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            enabled: true,
            asset: None,
        }
    }
}

/// All audio settings, one block per sound channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub diagnostics: ChannelSettings,
    pub medication: ChannelSettings,
    pub nursing_care: ChannelSettings,
    pub patient_added: ChannelSettings,
    pub patient_removed: ChannelSettings,
    pub exam_room: ChannelSettings,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            diagnostics: ChannelSettings::default(),
            medication: ChannelSettings::default(),
            nursing_care: ChannelSettings::default(),
            patient_added: ChannelSettings::default(),
            patient_removed: ChannelSettings::default(),
            exam_room: ChannelSettings::default(),
        }
    }
}

impl AudioSettings {
    pub fn channel(&self, channel: SoundChannel) -> &ChannelSettings {
        match channel {
            SoundChannel::Diagnostics => &self.diagnostics,
            SoundChannel::Medication => &self.medication,
            SoundChannel::NursingCare => &self.nursing_care,
            SoundChannel::PatientAdded => &self.patient_added,
            SoundChannel::PatientRemoved => &self.patient_removed,
            SoundChannel::ExamRoom => &self.exam_room,
        }
    }

    pub fn channel_mut(&mut self, channel: SoundChannel) -> &mut ChannelSettings {
        match channel {
            SoundChannel::Diagnostics => &mut self.diagnostics,
            SoundChannel::Medication => &mut self.medication,
            SoundChannel::NursingCare => &mut self.nursing_care,
            SoundChannel::PatientAdded => &mut self.patient_added,
            SoundChannel::PatientRemoved => &mut self.patient_removed,
            SoundChannel::ExamRoom => &mut self.exam_room,
        }
    }

    /// Master volume times channel volume, clamped to the unit range.
    pub fn effective_volume(&self, channel: SoundChannel) -> f32 {
        (self.master_volume * self.channel(channel).volume).clamp(0.0, 1.0)
    }
}

/// Where settings changes get written.
#[derive(Debug)]
enum Persist {
    /// The platform config directory, under the app name.
    ConfigDir,
    /// An explicit settings file.
    File(PathBuf),
    /// Nowhere; in-memory only.
    None,
}

/// Owns the settings and persists changes.
#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<AudioSettings>,
    persist: Persist,
}

impl SettingsStore {
    /// Load from the config directory, falling back to defaults on a
    /// missing or unreadable file.
    pub fn load() -> Self {
        let settings = confy::load(APP_NAME, None).unwrap_or_else(|e| {
            tracing::warn!("failed to load settings, using defaults: {e}");
            AudioSettings::default()
        });
        Self {
            tx: watch::Sender::new(settings),
            persist: Persist::ConfigDir,
        }
    }

    /// Load from an explicit settings file, creating it with defaults when
    /// missing.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = confy::load_path(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "failed to load settings, using defaults: {e}");
            AudioSettings::default()
        });
        Self {
            tx: watch::Sender::new(settings),
            persist: Persist::File(path),
        }
    }

    /// In-memory store that never touches disk, for tests.
    pub fn ephemeral(settings: AudioSettings) -> Self {
        Self {
            tx: watch::Sender::new(settings),
            persist: Persist::None,
        }
    }

    pub fn get(&self) -> AudioSettings {
        self.tx.borrow().clone()
    }

    /// Subscribe to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<AudioSettings> {
        self.tx.subscribe()
    }

    /// Apply a mutation, broadcast it, and persist.
    pub fn update<F>(&mut self, f: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut AudioSettings),
    {
        self.tx.send_modify(f);
        match &self.persist {
            Persist::ConfigDir => confy::store(APP_NAME, None, &*self.tx.borrow())?,
            Persist::File(path) => confy::store_path(path, &*self.tx.borrow())?,
            Persist::None => {}
        }
        Ok(())
    }

    /// Drop a channel's custom sound selection, persisting the reversion.
    pub fn revert_to_default(&mut self, channel: SoundChannel) -> Result<(), SettingsError> {
        tracing::warn!(%channel, "reverting channel to built-in default sound");
        self.update(|s| s.channel_mut(channel).asset = None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_behavior() {
        let settings = AudioSettings::default();
        assert_eq!(settings.master_volume, 0.5);
        for channel in SoundChannel::ALL {
            let ch = settings.channel(channel);
            assert_eq!(ch.volume, 1.0);
            assert!(ch.enabled);
            assert!(ch.asset.is_none());
        }
    }

    #[test]
    fn effective_volume_mixes_and_clamps() {
        let mut settings = AudioSettings::default();
        settings.master_volume = 0.5;
        settings.medication.volume = 0.6;
        assert!((settings.effective_volume(SoundChannel::Medication) - 0.3).abs() < 1e-6);

        settings.master_volume = 2.0;
        settings.medication.volume = 2.0;
        assert_eq!(settings.effective_volume(SoundChannel::Medication), 1.0);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = AudioSettings::default();
        settings.exam_room.enabled = false;
        settings.exam_room.asset = Some(PathBuf::from("/tmp/custom.mp3"));

        let text = toml::to_string(&settings).unwrap();
        let back: AudioSettings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let back: AudioSettings = toml::from_str("master_volume = 0.8").unwrap();
        assert_eq!(back.master_volume, 0.8);
        assert_eq!(back.diagnostics, ChannelSettings::default());
    }

    #[test]
    fn ephemeral_update_broadcasts_without_persisting() {
        let mut store = SettingsStore::ephemeral(AudioSettings::default());
        let mut rx = store.subscribe();

        store
            .update(|s| s.master_volume = 0.25)
            .expect("ephemeral update cannot fail");

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().master_volume, 0.25);
        assert_eq!(store.get().master_volume, 0.25);
    }

    #[test]
    fn persisted_settings_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut store = SettingsStore::at_path(path.clone());
        store
            .update(|s| {
                s.master_volume = 0.75;
                s.exam_room.enabled = false;
                s.diagnostics.asset = Some(PathBuf::from("/tmp/bell.mp3"));
            })
            .unwrap();

        let reloaded = SettingsStore::at_path(path).get();
        assert_eq!(reloaded.master_volume, 0.75);
        assert!(!reloaded.exam_room.enabled);
        assert_eq!(
            reloaded.diagnostics.asset.as_deref(),
            Some(std::path::Path::new("/tmp/bell.mp3"))
        );
    }

    #[test]
    fn persisted_reversion_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut store = SettingsStore::at_path(path.clone());
        store
            .update(|s| s.nursing_care.asset = Some(PathBuf::from("/tmp/broken.mp3")))
            .unwrap();
        store.revert_to_default(SoundChannel::NursingCare).unwrap();

        let reloaded = SettingsStore::at_path(path).get();
        assert!(reloaded.nursing_care.asset.is_none());
    }

    #[test]
    fn revert_clears_custom_asset() {
        let mut settings = AudioSettings::default();
        settings.diagnostics.asset = Some(PathBuf::from("/tmp/bell.mp3"));
        let mut store = SettingsStore::ephemeral(settings);

        store.revert_to_default(SoundChannel::Diagnostics).unwrap();
        assert!(store.get().diagnostics.asset.is_none());
    }
}
