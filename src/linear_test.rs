#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::PI;

use super::*;

const EPSILON: f64 = 1e-9;

fn point_approx_eq(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn degenerate_arrow() -> Element {
    Element::arrow(
        100.0,
        0.0,
        vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 0.0)],
    )
}

// =============================================================
// Indices and coordinates
// =============================================================

#[test]
fn endpoint_and_adjacent_indices() {
    let arrow = degenerate_arrow();
    assert_eq!(endpoint_index(&arrow, Endpoint::Start), 0);
    assert_eq!(endpoint_index(&arrow, Endpoint::End), 3);
    assert_eq!(adjacent_index(&arrow, Endpoint::Start), 1);
    assert_eq!(adjacent_index(&arrow, Endpoint::End), 2);
}

#[test]
fn global_points_offset_by_position() {
    let arrow = degenerate_arrow();
    assert_eq!(global_endpoint(&arrow, Endpoint::End), Some(Point::new(200.0, 0.0)));
    assert_eq!(global_points(&arrow).len(), 4);
}

#[test]
fn rotated_global_point_and_back() {
    let arrow = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 0.0)]).with_angle(PI);
    let end = global_endpoint(&arrow, Endpoint::End).unwrap();
    assert!(point_approx_eq(end, Point::new(0.0, 0.0)));
    assert!(point_approx_eq(local_point(&arrow, end), Point::new(100.0, 0.0)));
}

// =============================================================
// Point handle hit test
// =============================================================

#[test]
fn coincident_points_resolve_last_to_first() {
    let arrow = degenerate_arrow();
    assert_eq!(point_index_at(&arrow, Point::new(100.0, 0.0), 1.0, 10.0), Some(1));
    assert_eq!(point_index_at(&arrow, Point::new(200.0, 0.0), 1.0, 10.0), Some(3));
}

#[test]
fn hit_radius_scales_with_zoom() {
    let arrow = degenerate_arrow();
    assert_eq!(point_index_at(&arrow, Point::new(108.0, 0.0), 1.0, 10.0), Some(1));
    assert_eq!(point_index_at(&arrow, Point::new(108.0, 0.0), 2.0, 10.0), None);
}

// =============================================================
// Point moves
// =============================================================

#[test]
fn moving_middle_point_keeps_origin() {
    let arrow = degenerate_arrow();
    let update = move_points_update(&arrow, &[(1, Point::new(-45.0, 0.0))]);
    let points = update.points.unwrap();
    assert_eq!(points[0], Point::origin());
    assert_eq!(points[1], Point::new(-45.0, 0.0));
    assert_eq!(update.x, Some(100.0));
    assert_eq!(update.width, Some(145.0));
}

#[test]
fn moving_first_point_shifts_position() {
    let arrow = degenerate_arrow();
    let update = move_points_update(&arrow, &[(0, Point::new(-45.0, 0.0))]);
    let points = update.points.unwrap();
    assert_eq!(points[0], Point::origin());
    assert_eq!(points[3], Point::new(145.0, 0.0));
    assert_eq!(update.x, Some(55.0));
    assert_eq!(update.y, Some(0.0));
}

#[test]
fn moving_first_point_of_rotated_arrow_keeps_other_points_in_place() {
    let mut arrow = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 0.0)]).with_angle(PI / 2.0);
    let before = global_endpoint(&arrow, Endpoint::End).unwrap();
    let update = move_points_update(&arrow, &[(0, Point::new(-20.0, 0.0))]);
    arrow.apply_update(&update);
    let after = global_endpoint(&arrow, Endpoint::End).unwrap();
    assert!(point_approx_eq(before, after));
}

#[test]
fn non_linear_elements_get_empty_update() {
    let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
    assert_eq!(move_points_update(&rect, &[(0, Point::origin())]), ElementUpdate::default());
}

#[test]
fn elbow_arrows_only_move_their_endpoints() {
    let arrow = Element::elbow_arrow(0.0, 0.0, 0.0, 0.0).with_points(vec![
        Point::new(0.0, 0.0),
        Point::new(50.0, 0.0),
        Point::new(50.0, 80.0),
    ]);
    let update = move_points_update(&arrow, &[(2, Point::new(60.0, 90.0))]);
    assert_eq!(update.points, Some(vec![Point::new(0.0, 0.0), Point::new(60.0, 90.0)]));
    assert!(update.x.is_none());
}
