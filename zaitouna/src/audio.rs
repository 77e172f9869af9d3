//! Audio backend for the shell: reports playback changes instead of playing.

use zaitouna_core::{AudioBackend, NarrativeId, PlaybackError};

/// Prints `[AUDIO]` lines for play and pause, and logs volume changes.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioBackend for LogAudio {
    fn play(&mut self, id: &NarrativeId) -> Result<(), PlaybackError> {
        println!("[AUDIO] play {id}");
        Ok(())
    }

    fn pause(&mut self, id: &NarrativeId) {
        println!("[AUDIO] pause {id}");
    }

    fn set_volume(&mut self, id: &NarrativeId, volume: f64) {
        tracing::trace!(narrative = %id, volume, "volume");
    }
}
