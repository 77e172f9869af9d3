//! Deterministic layout policies.
//!
//! Every policy is a pure function of the item index `i` and the item count
//! `n`. Grid policies guard their divisors with `max(d, 1)`, so a single row or
//! column sits on the margin rather than in the middle of the canvas.

use crate::model::{Narrative, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

const CENTER: f64 = 50.0;
const CIRCLE_RADIUS: f64 = 35.0;

const SQUARE_SPAN: f64 = 70.0;
const SQUARE_MARGIN: f64 = 15.0;

const RECT_ASPECT: f64 = 1.5;
const RECT_SPAN_X: f64 = 80.0;
const RECT_MARGIN_X: f64 = 10.0;
const RECT_SPAN_Y: f64 = 60.0;
const RECT_MARGIN_Y: f64 = 20.0;

const LINE_SPAN: f64 = 80.0;
const LINE_MARGIN: f64 = 10.0;

/// How items are arranged on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    /// Evenly spaced on a circle around the canvas center.
    Circle,
    /// Near-square grid, `ceil(sqrt(n))` columns.
    Square,
    /// Grid biased 1.5:1 wider than tall.
    Rectangle,
    /// A single horizontal line through the center.
    Linear,
}

impl LayoutPolicy {
    pub const ALL: [LayoutPolicy; 4] = [
        LayoutPolicy::Circle,
        LayoutPolicy::Square,
        LayoutPolicy::Rectangle,
        LayoutPolicy::Linear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutPolicy::Circle => "circle",
            LayoutPolicy::Square => "square",
            LayoutPolicy::Rectangle => "rectangle",
            LayoutPolicy::Linear => "linear",
        }
    }

    /// Position of item `index` out of `count`.
    ///
    /// `index` must be below `count`.
    pub fn position(self, index: usize, count: usize) -> Point {
        debug_assert!(index < count);
        let i = index as f64;
        match self {
            LayoutPolicy::Circle => {
                let angle = TAU * i / count as f64;
                Point::new(
                    CENTER + CIRCLE_RADIUS * angle.cos(),
                    CENTER + CIRCLE_RADIUS * angle.sin(),
                )
            }
            LayoutPolicy::Square => {
                let side = ceil_sqrt(count as f64);
                let (row, col) = (index / side, index % side);
                let divisor = guarded(side);
                Point::new(
                    col as f64 / divisor * SQUARE_SPAN + SQUARE_MARGIN,
                    row as f64 / divisor * SQUARE_SPAN + SQUARE_MARGIN,
                )
            }
            LayoutPolicy::Rectangle => {
                let cols = ceil_sqrt(count as f64 * RECT_ASPECT);
                let rows = count.div_ceil(cols);
                let (row, col) = (index / cols, index % cols);
                Point::new(
                    col as f64 / guarded(cols) * RECT_SPAN_X + RECT_MARGIN_X,
                    row as f64 / guarded(rows) * RECT_SPAN_Y + RECT_MARGIN_Y,
                )
            }
            LayoutPolicy::Linear => {
                Point::new(i / guarded(count) * LINE_SPAN + LINE_MARGIN, CENTER)
            }
        }
    }
}

impl fmt::Display for LayoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout '{0}' (expected circle, square, rectangle or linear)")]
pub struct UnknownLayout(pub String);

impl FromStr for LayoutPolicy {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutPolicy::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}

/// All positions for `count` items, in sequence order.
pub fn positions(policy: LayoutPolicy, count: usize) -> Vec<Point> {
    (0..count).map(|i| policy.position(i, count)).collect()
}

/// Overwrite every item's position in place. Order is untouched.
pub fn apply(policy: LayoutPolicy, items: &mut [Narrative]) {
    let count = items.len();
    for (i, item) in items.iter_mut().enumerate() {
        item.set_position(policy.position(i, count));
    }
}

/// `ceil(sqrt(x))` as a grid dimension, at least 1.
fn ceil_sqrt(x: f64) -> usize {
    (x.sqrt().ceil() as usize).max(1)
}

/// Divisor for spreading `n` cells across a span: `max(n - 1, 1)`.
fn guarded(n: usize) -> f64 {
    n.saturating_sub(1).max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_near(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < EPS && (p.y - y).abs() < EPS,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    #[test]
    fn test_empty_collection_is_noop() {
        for policy in LayoutPolicy::ALL {
            assert!(positions(policy, 0).is_empty());
            let mut items: Vec<Narrative> = vec![];
            apply(policy, &mut items);
        }
    }

    #[test]
    fn test_square_nine_is_three_by_three() {
        let pts = positions(LayoutPolicy::Square, 9);
        assert_near(pts[0], 15.0, 15.0);
        assert_near(pts[1], 50.0, 15.0);
        assert_near(pts[2], 85.0, 15.0);
        assert_near(pts[4], 50.0, 50.0);
        assert_near(pts[8], 85.0, 85.0);
    }

    #[test]
    fn test_square_partial_last_row() {
        // side = ceil(sqrt(5)) = 3, so rows 0 and 1 are used.
        let pts = positions(LayoutPolicy::Square, 5);
        assert_near(pts[3], 15.0, 50.0);
        assert_near(pts[4], 50.0, 50.0);
    }

    #[test]
    fn test_rectangle_twelve() {
        // cols = ceil(sqrt(18)) = 5, rows = ceil(12 / 5) = 3.
        let pts = positions(LayoutPolicy::Rectangle, 12);
        assert_near(pts[0], 10.0, 20.0);
        assert_near(pts[4], 90.0, 20.0);
        assert_near(pts[5], 10.0, 50.0);
        assert_near(pts[11], 30.0, 80.0);
    }

    #[test]
    fn test_rectangle_two_items_share_one_row() {
        // cols = ceil(sqrt(3)) = 2, rows = 1 so the row divisor is guarded.
        let pts = positions(LayoutPolicy::Rectangle, 2);
        assert_near(pts[0], 10.0, 20.0);
        assert_near(pts[1], 90.0, 20.0);
    }

    #[test]
    fn test_linear_spreads_endpoints() {
        let pts = positions(LayoutPolicy::Linear, 5);
        assert_near(pts[0], 10.0, 50.0);
        assert_near(pts[2], 50.0, 50.0);
        assert_near(pts[4], 90.0, 50.0);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("circle".parse::<LayoutPolicy>(), Ok(LayoutPolicy::Circle));
        assert_eq!(" Linear ".parse::<LayoutPolicy>(), Ok(LayoutPolicy::Linear));
        assert!("spiral".parse::<LayoutPolicy>().is_err());
        for policy in LayoutPolicy::ALL {
            assert_eq!(policy.to_string().parse::<LayoutPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_all_grid_positions_on_canvas() {
        for policy in LayoutPolicy::ALL {
            for n in 1..60 {
                for p in positions(policy, n) {
                    assert!(p.on_canvas(), "{policy} n={n} produced {p:?}");
                }
            }
        }
    }
}
