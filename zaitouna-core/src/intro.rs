//! Generated exhibition introductions.
//!
//! An introduction is requested once per exhibition, cached forever after the
//! first success, and its absence never blocks a visitor. The gate here only
//! decides *whether* to ask; the interaction shell performs the call and
//! writes the result through the store.

use crate::model::{Exhibition, ExhibitionId, VillageContext};
use async_trait::async_trait;
use claude::Claude;
use std::collections::HashSet;
use thiserror::Error;

/// Prompt used for introductions. `{name}`, `{location}` and `{story}` are
/// filled from the exhibition's context.
pub const DEFAULT_INTRO_PROMPT: &str = "اكتب مقدمة شاعرية قصيرة لمعرض فني عن زيت الزيتون التونسي يسمى \"ما لا يرى في الزيت\" في {name} ({location})، يركز على الروح والذاكرة والتراث. خلفية المعرض: {story}";

/// Prompt used to answer a visitor's reflection. `{comment}` is replaced.
pub const DEFAULT_REFLECTION_PROMPT: &str = "بصفتك منسق معارض، علق على انطباع زائر قال: \"{comment}\" عن معرض زيت الزيتون. اجعل الرد ملهماً وفنياً.";

/// Errors from a text generator. Callers treat every variant the same way.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Claude API error: {0}")]
    Client(#[from] claude::Error),

    #[error("Generator returned no text")]
    EmptyResponse,

    #[error("Generator unavailable: {0}")]
    Unavailable(String),
}

/// Turns a prompt into text.
#[async_trait]
pub trait IntroGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[async_trait]
impl<T: IntroGenerator + ?Sized> IntroGenerator for Box<T> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt).await
    }
}

/// Settings for [`ClaudeWriter`].
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub model: Option<String>,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 512,
            temperature: Some(0.8),
        }
    }
}

/// [`IntroGenerator`] backed by the Claude Messages API.
pub struct ClaudeWriter {
    client: Claude,
    config: WriterConfig,
}

impl ClaudeWriter {
    pub fn new(client: Claude) -> Self {
        Self {
            client,
            config: WriterConfig::default(),
        }
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self, GenerateError> {
        Ok(Self::new(Claude::from_env()?))
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl IntroGenerator for ClaudeWriter {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut request = claude::Request::new(vec![claude::Message::user(prompt)])
            .with_max_tokens(self.config.max_tokens);
        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }
        if let Some(temp) = self.config.temperature {
            request = request.with_temperature(temp);
        }

        let text = self.client.complete(request).await?.text();
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// A generator for runs without credentials: every call fails.
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl IntroGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Unavailable("no API key configured".to_string()))
    }
}

/// Fill an introduction prompt template from a village context.
pub fn intro_prompt(template: &str, context: &VillageContext) -> String {
    template
        .replace("{name}", &context.name)
        .replace("{location}", &context.location)
        .replace("{story}", &context.story)
}

/// Fill a reflection prompt template with a visitor comment.
pub fn reflection_prompt(template: &str, comment: &str) -> String {
    template.replace("{comment}", comment)
}

/// Decides when an introduction request should be issued.
///
/// A request is issued only for an exhibition with no cached introduction and
/// no request already in flight.
#[derive(Debug, Clone)]
pub struct IntroGate {
    template: String,
    in_flight: HashSet<ExhibitionId>,
}

impl IntroGate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            in_flight: HashSet::new(),
        }
    }

    /// Claim the request slot for `exhibition` and return its prompt, or
    /// `None` if no request should be made.
    pub fn begin(&mut self, exhibition: &Exhibition) -> Option<String> {
        if exhibition.intro.is_some() {
            return None;
        }
        if !self.in_flight.insert(exhibition.id.clone()) {
            tracing::debug!(exhibition = %exhibition.id, "introduction already requested");
            return None;
        }
        Some(intro_prompt(&self.template, &exhibition.context))
    }

    /// Release the slot claimed by [`begin`](Self::begin).
    pub fn finish(&mut self, id: &ExhibitionId) {
        self.in_flight.remove(id);
    }

    pub fn is_in_flight(&self, id: &ExhibitionId) -> bool {
        self.in_flight.contains(id)
    }
}

impl Default for IntroGate {
    fn default() -> Self {
        Self::new(DEFAULT_INTRO_PROMPT)
    }
}
