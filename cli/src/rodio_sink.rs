//! Rodio playback sink.
//!
//! Decoding and output run on a blocking thread; the async side polls the
//! shared sink slot until playback drains. `stop()` empties the slot, which
//! both silences the sink and lets the blocking thread exit.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wardbell_core::audio::AudioSink;
use wardbell_core::error::PlaybackError;

#[derive(Default, Clone)]
pub struct RodioSink {
    current: Arc<Mutex<Option<rodio::Sink>>>,
}

impl RodioSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for RodioSink {
    fn play(
        &mut self,
        path: &Path,
        volume: f32,
    ) -> impl Future<Output = Result<(), PlaybackError>> + Send {
        let path = path.to_path_buf();
        let slot = self.current.clone();
        async move {
            tokio::task::spawn_blocking(move || blocking_play(&path, volume, slot))
                .await
                .map_err(|e| PlaybackError::Output(format!("playback task failed: {e}")))?
        }
    }

    fn stop(&mut self) {
        if let Ok(mut guard) = self.current.lock() {
            if let Some(sink) = guard.take() {
                sink.stop();
            }
        }
    }
}

fn blocking_play(
    path: &PathBuf,
    volume: f32,
    slot: Arc<Mutex<Option<rodio::Sink>>>,
) -> Result<(), PlaybackError> {
    // The stream must outlive playback; it is dropped when this fn returns
    let (_stream, handle) = rodio::OutputStream::try_default()
        .map_err(|e| PlaybackError::Output(e.to_string()))?;

    let file = std::fs::File::open(path)
        .map_err(|_| PlaybackError::MissingAsset(path.clone()))?;
    let source = rodio::Decoder::new(std::io::BufReader::new(file))
        .map_err(|e| PlaybackError::Output(e.to_string()))?;

    let sink = rodio::Sink::try_new(&handle).map_err(|e| PlaybackError::Output(e.to_string()))?;
    sink.set_volume(volume);
    sink.append(source);

    match slot.lock() {
        Ok(mut guard) => *guard = Some(sink),
        Err(e) => return Err(PlaybackError::Output(format!("sink slot poisoned: {e}"))),
    }

    // Poll until the sink drains or stop() empties the slot
    loop {
        let done = match slot.lock() {
            Ok(guard) => guard.as_ref().map(|s| s.empty()).unwrap_or(true),
            Err(_) => true,
        };
        if done {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    if let Ok(mut guard) = slot.lock() {
        guard.take();
    }
    Ok(())
}
