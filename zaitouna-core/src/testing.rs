//! Test doubles for the gallery's collaborators.
//!
//! - `MockGenerator` for deterministic generation without API calls
//! - `RecordingAudio` to observe play/pause gating
//! - `FailingStore` to exercise persistence failure paths

use crate::intro::{GenerateError, IntroGenerator};
use crate::model::NarrativeId;
use crate::persist::{KvStore, PersistError};
use crate::playback::{AudioBackend, PlaybackError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// A scripted reply from [`MockGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Fail,
}

/// A generator that returns scripted replies in order and counts calls.
///
/// Once the script runs out it keeps returning `fallback`.
pub struct MockGenerator {
    script: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    fallback: MockReply,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            fallback: MockReply::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(MockReply::Text(text.into()))
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl IntroGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());

        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail => Err(GenerateError::Unavailable("scripted failure".to_string())),
        }
    }
}

/// One call made on [`RecordingAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Play(NarrativeId),
    Pause(NarrativeId),
}

/// An audio backend that records play and pause calls.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
    pub volumes: std::collections::HashMap<NarrativeId, f64>,
    /// When set, every `play` is refused.
    pub refuse: bool,
}

impl RecordingAudio {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

impl AudioBackend for RecordingAudio {
    fn play(&mut self, id: &NarrativeId) -> Result<(), PlaybackError> {
        if self.refuse {
            return Err(PlaybackError {
                id: id.clone(),
                reason: "autoplay blocked".to_string(),
            });
        }
        self.calls.push(AudioCall::Play(id.clone()));
        Ok(())
    }

    fn pause(&mut self, id: &NarrativeId) {
        self.calls.push(AudioCall::Pause(id.clone()));
    }

    fn set_volume(&mut self, id: &NarrativeId, volume: f64) {
        self.volumes.insert(id.clone(), volume);
    }
}

/// A key-value store whose writes always fail.
///
/// Reads fail too unless built with [`FailingStore::writes`], in which case
/// the store reads as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore {
    readable: bool,
}

impl FailingStore {
    /// Every read and write fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads find nothing, writes fail.
    pub fn writes() -> Self {
        Self { readable: true }
    }
}

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
        if self.readable {
            return Ok(None);
        }
        Err(std::io::Error::other("storage offline").into())
    }

    async fn set(&self, _key: &str, _blob: &str) -> Result<(), PersistError> {
        Err(std::io::Error::other("storage offline").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_script_then_fallback() {
        let generator = MockGenerator::new(vec![
            MockReply::Fail,
            MockReply::Text("first".into()),
        ])
        .with_fallback(MockReply::Text("again".into()));

        assert!(generator.generate("a").await.is_err());
        assert_eq!(generator.generate("b").await.unwrap(), "first");
        assert_eq!(generator.generate("c").await.unwrap(), "again");
        assert_eq!(generator.calls(), 3);
        assert_eq!(generator.prompts().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failing_store() {
        assert!(FailingStore::new().get("k").await.is_err());
        assert!(FailingStore::new().set("k", "v").await.is_err());
        assert!(FailingStore::writes().get("k").await.unwrap().is_none());
        assert!(FailingStore::writes().set("k", "v").await.is_err());
    }
}
