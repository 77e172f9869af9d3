//! Audio play/pause gating.
//!
//! At most one narrative plays at a time: the focused one. Every other track
//! is paused but keeps its volume current so a later resume starts at the
//! right level. Starting playback resumes from the track's current position.

use crate::proximity::Attention;
use crate::model::NarrativeId;
use std::collections::HashMap;
use thiserror::Error;

/// A refusal to start playback, e.g. an autoplay policy or a missing decoder.
#[derive(Debug, Clone, Error)]
#[error("playback refused for narrative {id}: {reason}")]
pub struct PlaybackError {
    pub id: NarrativeId,
    pub reason: String,
}

/// Whatever actually produces sound.
pub trait AudioBackend {
    /// Resume the track from where it was left. Never seeks.
    fn play(&mut self, id: &NarrativeId) -> Result<(), PlaybackError>;

    fn pause(&mut self, id: &NarrativeId);

    /// Volume in `[0, 1]`.
    fn set_volume(&mut self, id: &NarrativeId, volume: f64);
}

/// Playback state of one track as the deck last left it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub volume: f64,
    pub playing: bool,
}

/// Keeps a backend in step with the attention engine.
pub struct AudioDeck<B: AudioBackend> {
    backend: B,
    tracks: HashMap<NarrativeId, TrackState>,
}

impl<B: AudioBackend> AudioDeck<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tracks: HashMap::new(),
        }
    }

    /// Apply a frame's weights: update every volume, play the focused item and
    /// pause everything else.
    ///
    /// A backend that refuses to play is tolerated. The track is recorded as
    /// not playing and the next sync tries again.
    pub fn sync(&mut self, attention: &Attention) {
        for weight in &attention.weights {
            self.backend.set_volume(&weight.id, weight.volume);
            let was_playing = self.tracks.get(&weight.id).is_some_and(|t| t.playing);

            let playing = if weight.active {
                if was_playing {
                    true
                } else {
                    match self.backend.play(&weight.id) {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::debug!(error = %e, "ignoring playback failure");
                            false
                        }
                    }
                }
            } else {
                if was_playing {
                    self.backend.pause(&weight.id);
                }
                false
            };

            self.tracks.insert(
                weight.id.clone(),
                TrackState {
                    volume: weight.volume,
                    playing,
                },
            );
        }

        // Tracks that vanished from the frame (item replaced or exhibition left).
        let live: Vec<&NarrativeId> = attention.weights.iter().map(|w| &w.id).collect();
        let stale: Vec<NarrativeId> = self
            .tracks
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if self.tracks.remove(&id).is_some_and(|t| t.playing) {
                self.backend.pause(&id);
            }
        }
    }

    /// Pause everything, e.g. when the visitor leaves the exhibition.
    pub fn silence(&mut self) {
        for (id, track) in self.tracks.iter_mut() {
            if track.playing {
                self.backend.pause(id);
                track.playing = false;
            }
        }
    }

    pub fn track(&self, id: &NarrativeId) -> Option<TrackState> {
        self.tracks.get(id).copied()
    }

    /// The track currently playing, if any.
    pub fn playing(&self) -> Option<NarrativeId> {
        self.tracks
            .iter()
            .find(|(_, t)| t.playing)
            .map(|(id, _)| id.clone())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
