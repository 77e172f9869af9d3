//! Proximity and attention engine.
//!
//! Maps the visitor's probe point to a focused narrative and to a visual and
//! audio weight for every item. Everything here is a stateless recomputation
//! over a linear scan of the items; collections are small enough that no
//! spatial index is needed.

use crate::model::{Narrative, NarrativeId, Point};

/// An item is focused when the probe is strictly closer than this.
pub const FOCUS_RADIUS: f64 = 8.0;

/// Distance at which opacity would reach zero before flooring.
pub const VISUAL_RADIUS: f64 = 40.0;

/// Distance at which audio falls silent.
pub const AUDIO_RADIUS: f64 = 25.0;

/// Items never fade below this opacity.
pub const MIN_OPACITY: f64 = 0.1;

/// Scale of the focused item.
pub const FOCUSED_SCALE: f64 = 1.5;

/// Largest shrink applied to unfocused items.
pub const MAX_SHRINK: f64 = 0.5;

/// The focused narrative for a probe point.
///
/// Returns the *first* item in sequence order whose distance is below
/// [`FOCUS_RADIUS`], not the nearest one. When two items overlap the probe,
/// the earlier one wins even if the later one is closer.
pub fn focused(probe: Point, items: &[Narrative]) -> Option<&Narrative> {
    items
        .iter()
        .find(|item| probe.distance_to(item.position()) < FOCUS_RADIUS)
}

/// Visual opacity at distance `d`: linear falloff floored at [`MIN_OPACITY`].
pub fn opacity(d: f64) -> f64 {
    (1.0 - d / VISUAL_RADIUS).max(MIN_OPACITY)
}

/// Visual scale at distance `d`.
pub fn scale(d: f64, is_focused: bool) -> f64 {
    if is_focused {
        FOCUSED_SCALE
    } else {
        1.0 - (d / 100.0).min(MAX_SHRINK)
    }
}

/// Audio volume at distance `d`: linear falloff to silence at [`AUDIO_RADIUS`].
pub fn volume(d: f64) -> f64 {
    (1.0 - d / AUDIO_RADIUS).max(0.0)
}

/// Render and playback weights for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWeight {
    pub id: NarrativeId,
    pub distance: f64,
    pub opacity: f64,
    pub scale: f64,
    pub volume: f64,
    /// Whether this item's audio should be playing.
    pub active: bool,
}

/// Everything a frame needs for one probe point.
#[derive(Debug, Clone, PartialEq)]
pub struct Attention {
    pub probe: Point,
    pub focused: Option<NarrativeId>,
    /// One entry per item, in sequence order.
    pub weights: Vec<ItemWeight>,
}

impl Attention {
    /// Recompute focus and weights from scratch.
    pub fn compute(probe: Point, items: &[Narrative]) -> Self {
        let focused = focused(probe, items).map(|n| n.id.clone());
        Self::with_focus(probe, items, focused)
    }

    /// Weights for a probe with an already-decided focus.
    ///
    /// The interaction shell keeps the focus it computed on the last pointer
    /// move; this lets a redraw reuse it.
    pub fn with_focus(probe: Point, items: &[Narrative], focused: Option<NarrativeId>) -> Self {
        let weights = items
            .iter()
            .map(|item| {
                let d = probe.distance_to(item.position());
                let active = focused.as_ref() == Some(&item.id);
                ItemWeight {
                    id: item.id.clone(),
                    distance: d,
                    opacity: opacity(d),
                    scale: scale(d, active),
                    volume: volume(d),
                    active,
                }
            })
            .collect();

        Self {
            probe,
            focused,
            weights,
        }
    }

    pub fn weight(&self, id: &NarrativeId) -> Option<&ItemWeight> {
        self.weights.iter().find(|w| &w.id == id)
    }

    /// Items close enough to be heard at all.
    pub fn audible(&self) -> impl Iterator<Item = &ItemWeight> {
        self.weights.iter().filter(|w| w.volume > 0.0)
    }
}
