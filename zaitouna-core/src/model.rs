//! Exhibition data model.
//!
//! All positions live in the normalized canvas space: both axes run over
//! `[0, 100]` as a percentage of the viewport. Values outside that range are
//! legal and simply mean "off canvas".

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Lower bound of the normalized canvas on both axes.
pub const CANVAS_MIN: f64 = 0.0;

/// Upper bound of the normalized canvas on both axes.
pub const CANVAS_MAX: f64 = 100.0;

/// A point in normalized canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The middle of the canvas, where a visitor starts.
    pub const fn center() -> Self {
        Self::new(50.0, 50.0)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether the point lies inside the visible canvas (edges included).
    pub fn on_canvas(self) -> bool {
        (CANVAS_MIN..=CANVAS_MAX).contains(&self.x) && (CANVAS_MIN..=CANVAS_MAX).contains(&self.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::center()
    }
}

/// Identifier of a narrative, unique within its exhibition.
///
/// Stored collections carry integers, fractions (ids drawn from a random
/// float) or strings. Each is kept exactly as stored and written back the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NarrativeId {
    Number(serde_json::Number),
    Text(String),
}

impl NarrativeId {
    pub fn new(n: u64) -> Self {
        Self::Number(n.into())
    }

    /// Numeric value, if the id is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NarrativeId::Number(n) => n.as_f64(),
            NarrativeId::Text(_) => None,
        }
    }
}

impl From<u64> for NarrativeId {
    fn from(n: u64) -> Self {
        Self::new(n)
    }
}

impl From<&str> for NarrativeId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for NarrativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeId::Number(n) => write!(f, "{n}"),
            NarrativeId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for NarrativeId {
    type Err = Infallible;

    /// Integers and finite numbers become numeric ids, anything else text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self::new(n));
        }
        let number = s
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64);
        Ok(match number {
            Some(n) => Self::Number(n),
            None => Self::Text(s.to_string()),
        })
    }
}

/// Identifier of an exhibition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExhibitionId(pub String);

impl ExhibitionId {
    /// A fresh, globally unique id.
    pub fn generate() -> Self {
        Self(format!("ex-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExhibitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExhibitionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single media + text item placed on the exhibition canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub id: NarrativeId,
    pub title: String,
    pub writer: String,
    /// Opaque image locator (remote URL or data URL).
    pub image: String,
    /// Opaque audio locator.
    pub audio_url: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
}

impl Narrative {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }
}

/// Descriptive metadata of a village exhibition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageContext {
    pub name: String,
    pub location: String,
    pub story: String,
}

/// A named, persisted collection of narratives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    pub id: ExhibitionId,
    pub slug: String,
    pub context: VillageContext,
    /// Insertion order. Layouts move items but never reorder them.
    pub items: Vec<Narrative>,
    /// Unix time in milliseconds.
    pub created_at: i64,
    /// Generated introduction, cached after the first successful request.
    #[serde(rename = "aiIntro", default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

impl Exhibition {
    pub fn narrative(&self, id: &NarrativeId) -> Option<&Narrative> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn narrative_mut(&mut self, id: &NarrativeId) -> Option<&mut Narrative> {
        self.items.iter_mut().find(|n| &n.id == id)
    }

    /// An integer id above every numeric id in use.
    pub fn next_narrative_id(&self) -> NarrativeId {
        let max = self
            .items
            .iter()
            .filter_map(|n| n.id.as_f64())
            .fold(0.0_f64, f64::max);
        NarrativeId::new(max.floor() as u64 + 1)
    }

    /// First id that appears more than once in `items`, if any.
    pub fn duplicate_narrative_id(items: &[Narrative]) -> Option<NarrativeId> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|n| &n.id)
            .find(|id| !seen.insert(*id))
            .cloned()
    }
}

/// Derive a URL slug from an exhibition name.
///
/// Lower-cases the name and collapses each whitespace run into a single `-`.
/// Leading and trailing whitespace also become `-`, matching the stored data.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}
