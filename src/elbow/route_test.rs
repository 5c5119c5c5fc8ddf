#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::consts::BASE_PADDING;

fn unbound_state() -> ArrowState {
    ArrowState::of(&Element::elbow_arrow(0.0, 0.0, 250.0, 200.0))
}

fn unbound_points() -> Vec<Point> {
    vec![Point::origin(), Point::new(250.0, 200.0)]
}

// =============================================================
// Offsets and simplification
// =============================================================

#[test]
fn offset_puts_head_on_the_heading_side() {
    assert_eq!(offset_from_heading(Heading::Up, 5.0, 1.0), [5.0, 1.0, 1.0, 1.0]);
    assert_eq!(offset_from_heading(Heading::Right, 5.0, 1.0), [1.0, 5.0, 1.0, 1.0]);
    assert_eq!(offset_from_heading(Heading::Down, 5.0, 1.0), [1.0, 1.0, 5.0, 1.0]);
    assert_eq!(offset_from_heading(Heading::Left, 5.0, 1.0), [1.0, 1.0, 1.0, 5.0]);
}

#[test]
fn corner_points_drops_collinear_points() {
    let points = vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
    assert_eq!(corner_points(points), vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)]);
}

#[test]
fn remove_short_segments_drops_near_duplicates() {
    let points = vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)];
    assert_eq!(
        remove_short_segments(points),
        vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 100.0)]
    );
}

#[test]
fn remove_short_segments_leaves_short_routes_alone() {
    let points = vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(0.5, 100.0)];
    assert_eq!(remove_short_segments(points.clone()), points);
}

// =============================================================
// Route data
// =============================================================

#[test]
fn unbound_route_data_splits_the_gap_between_the_ends() {
    let scene = Scene::new();
    let data = elbow_arrow_data(&unbound_state(), &scene, &unbound_points(), false, 1.0, BASE_PADDING);
    assert_eq!(data.start_heading, Heading::Right);
    assert_eq!(data.end_heading, Heading::Left);
    assert_eq!(data.dynamic_aabbs[0], Bounds::new(-42.0, -42.0, 125.0, 100.0));
    assert_eq!(data.dynamic_aabbs[1], Bounds::new(125.0, 100.0, 292.0, 242.0));
    assert_eq!(data.start_dongle, Point::new(125.0, 0.0));
    assert_eq!(data.end_dongle, Point::new(125.0, 200.0));
    assert!(data.hovered_start.is_none() && data.hovered_end.is_none());
}

#[test]
fn unbound_route_turns_halfway() {
    let scene = Scene::new();
    let data = elbow_arrow_data(&unbound_state(), &scene, &unbound_points(), false, 1.0, BASE_PADDING);
    assert_eq!(
        routed_corners(false, &data),
        vec![Point::new(0.0, 0.0), Point::new(125.0, 0.0), Point::new(125.0, 200.0), Point::new(250.0, 200.0)]
    );
}

#[test]
fn bound_route_starts_and_ends_on_the_fixed_points() {
    let a = Element::rectangle(0.0, 0.0, 100.0, 100.0);
    let b = Element::rectangle(300.0, 0.0, 100.0, 100.0);
    let binding = |id, fixed: Point| PointBinding { element_id: id, focus: 0.0, gap: 5.0, fixed_point: Some(fixed) };
    let state = ArrowState {
        x: 105.0,
        y: 50.01,
        start_binding: Some(binding(a.id, Point::new(1.05, 0.5001))),
        end_binding: Some(binding(b.id, Point::new(-0.05, 0.5001))),
        start_arrowhead: false,
        end_arrowhead: true,
    };
    let scene = Scene::from_elements(vec![a, b]);
    let data = elbow_arrow_data(&state, &scene, &[Point::origin(), Point::new(190.0, 0.0)], false, 1.0, BASE_PADDING);
    assert!(data.hovered_start.is_some() && data.hovered_end.is_some());

    let route = routed_corners(true, &data);
    let first = route.first().copied().unwrap();
    let last = route.last().copied().unwrap();
    assert!(first.approx_eq(Point::new(105.0, 50.01), 1e-6));
    assert!(last.approx_eq(Point::new(295.0, 50.01), 1e-6));
    assert!(crate::elbow::validate_elbow_points(&route));
}

#[test]
fn missing_bound_element_is_not_bindable() {
    let scene = Scene::new();
    assert!(bindable_element(&scene, uuid::Uuid::new_v4()).is_none());
}
