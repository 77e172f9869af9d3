//! QA tests for the layout policies.
//!
//! Run with: `cargo test -p zaitouna-core --test qa_layout`

use zaitouna_core::layout::{self, positions};
use zaitouna_core::seed::default_narratives;
use zaitouna_core::{LayoutPolicy, Point};

const EPS: f64 = 1e-9;

fn assert_near(p: Point, x: f64, y: f64) {
    assert!(
        (p.x - x).abs() < EPS && (p.y - y).abs() < EPS,
        "expected ({x}, {y}), got ({}, {})",
        p.x,
        p.y
    );
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_layouts_are_deterministic() {
    for policy in LayoutPolicy::ALL {
        for n in [0, 1, 2, 5, 12, 37] {
            assert_eq!(positions(policy, n), positions(policy, n), "{policy} n={n}");
        }
    }
}

#[test]
fn test_apply_matches_positions_and_keeps_order() {
    for policy in LayoutPolicy::ALL {
        let mut items = default_narratives();
        let ids: Vec<_> = items.iter().map(|n| n.id.clone()).collect();

        layout::apply(policy, &mut items);

        let expected = positions(policy, items.len());
        for (item, p) in items.iter().zip(expected) {
            assert_eq!(item.position(), p);
        }
        assert_eq!(ids, items.iter().map(|n| n.id.clone()).collect::<Vec<_>>());
    }
}

// =============================================================================
// Single item: every policy lands on its margin, not the center
// =============================================================================

#[test]
fn test_single_item_placement() {
    assert_near(positions(LayoutPolicy::Circle, 1)[0], 85.0, 50.0);
    assert_near(positions(LayoutPolicy::Square, 1)[0], 15.0, 15.0);
    assert_near(positions(LayoutPolicy::Rectangle, 1)[0], 10.0, 20.0);
    assert_near(positions(LayoutPolicy::Linear, 1)[0], 10.0, 50.0);
}

// =============================================================================
// Circle
// =============================================================================

#[test]
fn test_circle_four_items_on_compass_points() {
    let pts = positions(LayoutPolicy::Circle, 4);
    assert_near(pts[0], 85.0, 50.0);
    assert_near(pts[1], 50.0, 85.0);
    assert_near(pts[2], 15.0, 50.0);
    assert_near(pts[3], 50.0, 15.0);
}

#[test]
fn test_circle_items_share_radius() {
    for p in positions(LayoutPolicy::Circle, 12) {
        assert!((p.distance_to(Point::center()) - 35.0).abs() < EPS);
    }
}

// =============================================================================
// Grids
// =============================================================================

#[test]
fn test_square_two_items_span_the_row() {
    let pts = positions(LayoutPolicy::Square, 2);
    assert_near(pts[0], 15.0, 15.0);
    assert_near(pts[1], 85.0, 15.0);
}

#[test]
fn test_rectangle_is_wider_than_tall() {
    let pts = positions(LayoutPolicy::Rectangle, 12);
    let distinct = |f: fn(&Point) -> f64| {
        let mut v: Vec<f64> = pts.iter().map(f).collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v.dedup();
        v.len()
    };
    let columns = distinct(|p| p.x);
    let rows = distinct(|p| p.y);
    assert_eq!((columns, rows), (5, 3));
}

#[test]
fn test_linear_two_items_hit_both_ends() {
    let pts = positions(LayoutPolicy::Linear, 2);
    assert_near(pts[0], 10.0, 50.0);
    assert_near(pts[1], 90.0, 50.0);
}
