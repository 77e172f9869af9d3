//! Runtime configuration.

use crate::intro::{WriterConfig, DEFAULT_INTRO_PROMPT, DEFAULT_REFLECTION_PROMPT};
use crate::seed::{DEFAULT_LOCATION, DEFAULT_STORY};
use crate::store::STORE_KEY;
use std::path::PathBuf;

/// Configuration for a gallery.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Directory holding the persisted collection.
    pub data_dir: PathBuf,

    /// Key the collection is stored under.
    pub store_key: String,

    /// Model used for introductions. `None` uses the client default.
    pub model: Option<String>,

    /// Maximum tokens for generated text.
    pub max_tokens: usize,

    /// Temperature for generated text.
    pub temperature: Option<f32>,

    /// Introduction prompt template.
    pub intro_prompt: String,

    /// Reflection prompt template.
    pub reflection_prompt: String,

    /// Page URL share links are built from.
    pub base_url: String,

    /// Location given to newly created exhibitions.
    pub default_location: String,

    /// Story given to newly created exhibitions.
    pub default_story: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("zaitouna-data"),
            store_key: STORE_KEY.to_string(),
            model: None,
            max_tokens: 512,
            temperature: Some(0.8),
            intro_prompt: DEFAULT_INTRO_PROMPT.to_string(),
            reflection_prompt: DEFAULT_REFLECTION_PROMPT.to_string(),
            base_url: "http://localhost:3000/".to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            default_story: DEFAULT_STORY.to_string(),
        }
    }
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ZAITOUNA_DATA_DIR`, `ZAITOUNA_MODEL` and
    /// `ZAITOUNA_BASE_URL` when set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(dir) = get("ZAITOUNA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(model) = get("ZAITOUNA_MODEL") {
            config.model = Some(model);
        }
        if let Some(url) = get("ZAITOUNA_BASE_URL") {
            config.base_url = url;
        }
        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_intro_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.intro_prompt = prompt.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_defaults(mut self, location: impl Into<String>, story: impl Into<String>) -> Self {
        self.default_location = location.into();
        self.default_story = story.into();
        self
    }

    /// Generation settings for [`ClaudeWriter`](crate::intro::ClaudeWriter).
    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}
