//! The interaction shell.
//!
//! `Gallery` owns the exhibition store, the introduction generator and the
//! application state, and is the only thing that changes any of them. Each
//! method is one event (a pointer move, a click, a curator command) and runs
//! to completion before the next one.
//!
//! Introductions are the exception: entering an exhibition only queues an
//! [`IntroRequest`]. The caller runs it wherever it likes and hands the
//! outcome back through [`Gallery::complete_intro`].
//!
//! # Example
//!
//! ```ignore
//! use zaitouna_core::{Gallery, GalleryConfig, FileStore, OfflineGenerator, Role, Viewport};
//!
//! let config = GalleryConfig::from_env();
//! let kv = FileStore::new(&config.data_dir);
//! let mut gallery = Gallery::open(config, kv, OfflineGenerator).await;
//!
//! let id = gallery.exhibitions()[0].id.clone();
//! gallery.enter_exhibition(&id);
//! gallery.run_pending_intros().await;
//! gallery.open_as(Role::Visitor);
//!
//! let viewport = Viewport::new(0.0, 0.0, 1280.0, 800.0);
//! if let Some(frame) = gallery.pointer_moved(1088.0, 400.0, viewport) {
//!     println!("focused: {:?}", frame.focused);
//! }
//! ```

use crate::config::GalleryConfig;
use crate::intro::{reflection_prompt, GenerateError, IntroGate, IntroGenerator};
use crate::layout::LayoutPolicy;
use crate::media;
use crate::model::{Exhibition, ExhibitionId, Narrative, NarrativeId, Point, VillageContext};
use crate::persist::KvStore;
use crate::proximity::Attention;
use crate::share::SharePayload;
use crate::store::{ExhibitionPatch, ExhibitionStore, StoreError};
use std::sync::Arc;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The list of exhibitions.
    #[default]
    Gallery,
    /// An exhibition's title card and introduction.
    Landing,
    /// The explorable canvas.
    Exhibition,
}

/// How the canvas was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Visitor,
    /// Can add, move and edit narratives.
    Curator,
}

/// Pixel rectangle of the canvas on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert a pixel position into normalized canvas coordinates.
    ///
    /// `None` for a degenerate viewport. Positions outside the rectangle map
    /// outside `[0, 100]` rather than being clamped.
    pub fn normalize(&self, px: f64, py: f64) -> Option<Point> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(self.width) || !usable(self.height) {
            return None;
        }
        let point = Point::new(
            (px - self.left) / self.width * 100.0,
            (py - self.top) / self.height * 100.0,
        );
        (point.x.is_finite() && point.y.is_finite()).then_some(point)
    }
}

/// Everything the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub view: View,
    pub role: Role,
    pub active: Option<ExhibitionId>,
    /// Narrative open in the detail overlay.
    pub selected: Option<NarrativeId>,
    /// Narrative focused by the last pointer move.
    pub hovered: Option<NarrativeId>,
    pub probe: Point,
    /// Whether the pointer is over the canvas.
    pub walking: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: View::Gallery,
            role: Role::Visitor,
            active: None,
            selected: None,
            hovered: None,
            probe: Point::center(),
            walking: false,
        }
    }
}

impl AppState {
    fn reset_canvas(&mut self) {
        self.selected = None;
        self.hovered = None;
        self.probe = Point::center();
        self.walking = false;
    }
}

/// An introduction the gallery wants generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroRequest {
    pub exhibition: ExhibitionId,
    pub prompt: String,
}

/// A running gallery.
pub struct Gallery<S: KvStore, G: IntroGenerator> {
    config: GalleryConfig,
    store: ExhibitionStore<S>,
    generator: Arc<G>,
    gate: IntroGate,
    pending: Vec<IntroRequest>,
    state: AppState,
}

impl<S: KvStore, G: IntroGenerator> Gallery<S, G> {
    /// Load the stored collection and start on the gallery screen.
    pub async fn open(config: GalleryConfig, kv: S, generator: G) -> Self {
        let store = ExhibitionStore::load_with_key(kv, config.store_key.clone()).await;
        let gate = IntroGate::new(config.intro_prompt.clone());
        Self {
            config,
            store,
            generator: Arc::new(generator),
            gate,
            pending: Vec::new(),
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn store(&self) -> &ExhibitionStore<S> {
        &self.store
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// A handle to the generator that can be moved into a spawned task.
    pub fn shared_generator(&self) -> Arc<G> {
        Arc::clone(&self.generator)
    }

    pub fn exhibitions(&self) -> &[Exhibition] {
        self.store.all()
    }

    /// The exhibition being viewed, if any.
    pub fn active(&self) -> Option<&Exhibition> {
        self.state.active.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn selected(&self) -> Option<&Narrative> {
        let id = self.state.selected.as_ref()?;
        self.active()?.narrative(id)
    }

    pub fn hovered(&self) -> Option<&Narrative> {
        let id = self.state.hovered.as_ref()?;
        self.active()?.narrative(id)
    }

    fn is_curating(&self) -> bool {
        self.state.view == View::Exhibition && self.state.role == Role::Curator
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Show an exhibition's landing screen.
    ///
    /// If the exhibition has no introduction and none is already being
    /// generated, an [`IntroRequest`] is queued for
    /// [`take_intro_requests`](Self::take_intro_requests). Returns `false` if
    /// no exhibition has this id.
    pub fn enter_exhibition(&mut self, id: &ExhibitionId) -> bool {
        if !self.store.contains(id) {
            tracing::debug!(exhibition = %id, "enter ignored, no such exhibition");
            return false;
        }

        self.state.view = View::Landing;
        self.state.active = Some(id.clone());
        self.state.reset_canvas();

        let prompt = self.store.get(id).and_then(|ex| self.gate.begin(ex));
        if let Some(prompt) = prompt {
            tracing::debug!(exhibition = %id, "queued introduction request");
            self.pending.push(IntroRequest {
                exhibition: id.clone(),
                prompt,
            });
        }
        true
    }

    /// Drain the introduction requests queued since the last call.
    pub fn take_intro_requests(&mut self) -> Vec<IntroRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Whether an introduction for `id` has been requested and not completed.
    pub fn intro_pending(&self, id: &ExhibitionId) -> bool {
        self.gate.is_in_flight(id)
    }

    /// Record the outcome of an introduction request.
    ///
    /// Failures are logged and otherwise ignored; the next entry asks again.
    /// A result for an exhibition removed in the meantime is dropped.
    pub async fn complete_intro(&mut self, id: &ExhibitionId, result: Result<String, GenerateError>) {
        self.gate.finish(id);
        match result {
            Ok(text) => self.cache_intro(id, text).await,
            Err(e) => {
                tracing::warn!(exhibition = %id, error = %e, "introduction generation failed");
            }
        }
    }

    /// Generate every queued introduction in turn and record the results.
    pub async fn run_pending_intros(&mut self) {
        for request in self.take_intro_requests() {
            let result = self.generator.generate(&request.prompt).await;
            self.complete_intro(&request.exhibition, result).await;
        }
    }

    async fn cache_intro(&mut self, id: &ExhibitionId, text: String) {
        if !self.store.contains(id) {
            tracing::debug!(exhibition = %id, "dropping introduction for removed exhibition");
            return;
        }
        match self.store.set_intro(id, text).await {
            Ok(_) => tracing::info!(exhibition = %id, "cached introduction"),
            Err(e) => tracing::warn!(exhibition = %id, error = %e, "failed to cache introduction"),
        }
    }

    /// Leave the landing screen for the canvas.
    pub fn open_as(&mut self, role: Role) -> bool {
        if self.active().is_none() {
            return false;
        }
        self.state.view = View::Exhibition;
        self.state.role = role;
        self.state.reset_canvas();
        true
    }

    pub fn back_to_landing(&mut self) -> bool {
        if self.active().is_none() {
            return false;
        }
        self.state.view = View::Landing;
        self.state.reset_canvas();
        true
    }

    pub fn back_to_gallery(&mut self) {
        self.state.view = View::Gallery;
        self.state.active = None;
        self.state.role = Role::Visitor;
        self.state.reset_canvas();
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Move the probe to a pixel position and recompute attention.
    ///
    /// Ignored (returns `None`) outside the canvas view, while a narrative is
    /// open, or for a degenerate viewport.
    pub fn pointer_moved(&mut self, px: f64, py: f64, viewport: Viewport) -> Option<Attention> {
        let probe = viewport.normalize(px, py)?;
        self.probe_at(probe)
    }

    /// Move the probe directly in normalized coordinates.
    pub fn probe_at(&mut self, probe: Point) -> Option<Attention> {
        if self.state.view != View::Exhibition || self.state.selected.is_some() {
            return None;
        }
        if !probe.x.is_finite() || !probe.y.is_finite() {
            return None;
        }
        let attention = Attention::compute(probe, &self.active()?.items);

        self.state.probe = probe;
        self.state.walking = true;
        self.state.hovered = attention.focused.clone();
        Some(attention)
    }

    pub fn pointer_left(&mut self) {
        self.state.walking = false;
    }

    /// Weights for the current probe, reusing the last computed focus.
    pub fn attention(&self) -> Option<Attention> {
        if self.state.view != View::Exhibition {
            return None;
        }
        let items = &self.active()?.items;
        Some(Attention::with_focus(self.state.probe, items, self.state.hovered.clone()))
    }

    /// Open a narrative's detail overlay.
    pub fn select(&mut self, id: &NarrativeId) -> bool {
        if self.state.view != View::Exhibition {
            return false;
        }
        if self.active().and_then(|ex| ex.narrative(id)).is_none() {
            return false;
        }
        self.state.selected = Some(id.clone());
        true
    }

    pub fn close_overlay(&mut self) {
        self.state.selected = None;
    }

    // ========================================================================
    // Curation
    // ========================================================================

    /// Create an exhibition and enter it. Blank names are ignored.
    pub async fn create_exhibition(&mut self, name: &str) -> Result<Option<ExhibitionId>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let location = self.config.default_location.clone();
        let story = self.config.default_story.clone();
        let id = self.store.create(name, &location, &story).await?;
        self.enter_exhibition(&id);
        Ok(Some(id))
    }

    /// Remove an exhibition, leaving it first if it is the active one.
    pub async fn remove_exhibition(&mut self, id: &ExhibitionId) -> Result<bool, StoreError> {
        let removed = self.store.remove(id).await?;
        if removed && self.state.active.as_ref() == Some(id) {
            self.back_to_gallery();
        }
        Ok(removed)
    }

    /// Add a template narrative at the center and open it for editing.
    pub async fn add_narrative(&mut self) -> Result<Option<NarrativeId>, StoreError> {
        let Some(ex_id) = self.curated_exhibition() else {
            return Ok(None);
        };
        let added = self.store.add_narrative(&ex_id).await?;
        if added.is_some() {
            self.state.selected = added.clone();
        }
        Ok(added)
    }

    pub async fn apply_layout(&mut self, policy: LayoutPolicy) -> Result<bool, StoreError> {
        let Some(ex_id) = self.curated_exhibition() else {
            return Ok(false);
        };
        self.store.apply_layout(&ex_id, policy).await
    }

    /// Save an edited narrative.
    pub async fn update_narrative(&mut self, narrative: Narrative) -> Result<bool, StoreError> {
        let Some(ex_id) = self.curated_exhibition() else {
            return Ok(false);
        };
        self.store.update_narrative(&ex_id, narrative).await
    }

    /// Replace a narrative's image with an uploaded file.
    pub async fn replace_image(
        &mut self,
        id: &NarrativeId,
        mime: &str,
        bytes: &[u8],
    ) -> Result<bool, StoreError> {
        let Some(mut narrative) = self.curated_narrative(id) else {
            return Ok(false);
        };
        narrative.image = media::data_url(mime, bytes);
        self.update_narrative(narrative).await
    }

    pub async fn edit_context(&mut self, context: VillageContext) -> Result<bool, StoreError> {
        let Some(ex_id) = self.curated_exhibition() else {
            return Ok(false);
        };
        self.store.update(&ex_id, ExhibitionPatch::context(context)).await
    }

    fn curated_exhibition(&self) -> Option<ExhibitionId> {
        if !self.is_curating() {
            tracing::debug!("curator command ignored outside curator mode");
            return None;
        }
        self.state.active.clone()
    }

    fn curated_narrative(&self, id: &NarrativeId) -> Option<Narrative> {
        self.curated_exhibition()?;
        self.active()?.narrative(id).cloned()
    }

    // ========================================================================
    // Sharing and reflections
    // ========================================================================

    /// Share payload for a narrative of the active exhibition.
    pub fn share(&self, id: &NarrativeId) -> Option<SharePayload> {
        let ex = self.active()?;
        let narrative = ex.narrative(id)?;
        Some(SharePayload::for_narrative(&self.config.base_url, ex, narrative))
    }

    /// A curator's reply to a visitor's reflection, or `None` if generation
    /// fails or the comment is blank.
    pub async fn reflect(&self, comment: &str) -> Option<String> {
        let comment = comment.trim();
        if comment.is_empty() {
            return None;
        }
        let prompt = reflection_prompt(&self.config.reflection_prompt, comment);
        match self.generator.generate(&prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "reflection generation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_normalize() {
        let vp = Viewport::new(100.0, 50.0, 200.0, 400.0);
        assert_eq!(vp.normalize(200.0, 250.0), Some(Point::new(50.0, 50.0)));
        assert_eq!(vp.normalize(100.0, 50.0), Some(Point::new(0.0, 0.0)));
        // Outside the rectangle is off canvas, not clamped.
        assert_eq!(vp.normalize(0.0, 50.0), Some(Point::new(-50.0, 0.0)));
    }

    #[test]
    fn test_degenerate_viewport() {
        assert!(Viewport::new(0.0, 0.0, 0.0, 100.0).normalize(1.0, 1.0).is_none());
        assert!(Viewport::new(0.0, 0.0, 100.0, f64::NAN).normalize(1.0, 1.0).is_none());
    }

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.view, View::Gallery);
        assert_eq!(state.probe, Point::center());
        assert!(!state.walking);
    }
}
