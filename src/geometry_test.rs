#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// =============================================================
// Point
// =============================================================

#[test]
fn point_serializes_as_pair() {
    let json = serde_json::to_string(&Point::new(1.5, -2.0)).unwrap();
    assert_eq!(json, "[1.5,-2.0]");
    let back: Point = serde_json::from_str("[3.0,4.0]").unwrap();
    assert_eq!(back, Point::new(3.0, 4.0));
}

#[test]
fn point_arithmetic() {
    let a = Point::new(1.0, 2.0);
    let b = Point::new(4.0, 6.0);
    assert_eq!(a + b, Point::new(5.0, 8.0));
    assert_eq!(b - a, Point::new(3.0, 4.0));
    assert_eq!(a * 2.0, Point::new(2.0, 4.0));
    assert_eq!(-a, Point::new(-1.0, -2.0));
    assert_eq!(a.distance(b), 5.0);
    assert_eq!(a.manhattan(b), 7.0);
}

#[test]
fn normalize_zero_vector_is_zero() {
    assert_eq!(Point::origin().normalize(), Point::origin());
}

#[test]
fn rotate_quarter_turn_clockwise_on_screen() {
    let p = Point::new(10.0, 0.0).rotate_around(Point::origin(), FRAC_PI_2);
    assert!(approx_eq(p.x, 0.0));
    assert!(approx_eq(p.y, 10.0));
}

#[test]
fn rotate_by_zero_is_identity() {
    let p = Point::new(3.0, 7.0);
    assert_eq!(p.rotate_around(Point::new(100.0, 100.0), 0.0), p);
}

#[test]
fn scale_from_origin_point() {
    let p = Point::new(2.0, 2.0).scale_from(Point::new(1.0, 1.0), 3.0);
    assert_eq!(p, Point::new(4.0, 4.0));
}

#[test]
fn finite_or_replaces_nan() {
    assert_eq!(finite_or(f64::NAN, 1.0), 1.0);
    assert_eq!(finite_or(f64::INFINITY, 2.0), 2.0);
    assert_eq!(finite_or(3.0, 2.0), 3.0);
}

// =============================================================
// Line
// =============================================================

#[test]
fn line_through_gives_signed_distance() {
    // Horizontal line through the origin, left to right.
    let line = Line::through(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert!(approx_eq(line.distance(Point::new(5.0, 3.0)).abs(), 3.0));
    assert!(approx_eq(line.distance(Point::new(5.0, 0.0)), 0.0));
    let above = line.distance(Point::new(0.0, -1.0));
    let below = line.distance(Point::new(0.0, 1.0));
    assert!(above * below < 0.0);
}

#[test]
fn line_through_coincident_points_is_zero_line() {
    let p = Point::new(2.0, 2.0);
    let line = Line::through(p, p);
    assert_eq!(line.n, 0.0);
    assert_eq!(line.m, 0.0);
    assert_eq!(line.c, 0.0);
}

#[test]
fn line_intersection() {
    let a = Line::through(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
    let b = Line::through(Point::new(0.0, 10.0), Point::new(10.0, 0.0));
    let p = a.intersect(&b).unwrap();
    assert!(approx_eq(p.x, 5.0));
    assert!(approx_eq(p.y, 5.0));
}

#[test]
fn parallel_lines_do_not_intersect() {
    let a = Line::through(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    let b = Line::through(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
    assert!(a.intersect(&b).is_none());
}

// =============================================================
// Segments and triangles
// =============================================================

#[test]
fn crossing_segments_intersect() {
    let p = segments_intersect_at(
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 0.0),
    )
    .unwrap();
    assert!(approx_eq(p.x, 5.0));
    assert!(approx_eq(p.y, 5.0));
}

#[test]
fn disjoint_segments_do_not_intersect() {
    let p = segments_intersect_at(
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(5.0, -1.0),
        Point::new(5.0, 1.0),
    );
    assert!(p.is_none());
}

#[test]
fn parallel_segments_do_not_intersect() {
    let p = segments_intersect_at(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(10.0, 1.0),
    );
    assert!(p.is_none());
}

#[test]
fn triangle_contains_inner_and_edge_points() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    let c = Point::new(0.0, 10.0);
    assert!(triangle_includes_point(a, b, c, Point::new(2.0, 2.0)));
    assert!(triangle_includes_point(a, b, c, Point::new(5.0, 0.0)));
    assert!(!triangle_includes_point(a, b, c, Point::new(8.0, 8.0)));
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn bounds_from_points() {
    let b = Bounds::from_points(&[Point::new(3.0, -1.0), Point::new(-2.0, 4.0), Point::new(0.0, 0.0)]);
    assert_eq!(b, Bounds::new(-2.0, -1.0, 3.0, 4.0));
    assert_eq!(b.width(), 5.0);
    assert_eq!(b.height(), 5.0);
}

#[test]
fn bounds_from_no_points_is_zero() {
    assert_eq!(Bounds::from_points(&[]), Bounds::new(0.0, 0.0, 0.0, 0.0));
}

#[test]
fn rotated_square_bounds_grow() {
    let b = Bounds::of_rotated_rect(0.0, 0.0, 10.0, 10.0, std::f64::consts::FRAC_PI_4);
    let half_diag = 50.0_f64.sqrt();
    assert!(approx_eq(b.min_x, 5.0 - half_diag));
    assert!(approx_eq(b.max_y, 5.0 + half_diag));
}

#[test]
fn strict_containment_excludes_border() {
    let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
    assert!(b.contains_strict(Point::new(5.0, 5.0)));
    assert!(!b.contains_strict(Point::new(0.0, 5.0)));
    assert!(b.contains(Point::new(0.0, 5.0)));
}

#[test]
fn expand_offsets_each_side() {
    let b = Bounds::new(0.0, 0.0, 10.0, 10.0).expand([1.0, 2.0, 3.0, 4.0]);
    assert_eq!(b, Bounds::new(-4.0, -1.0, 12.0, 13.0));
}

#[test]
fn overlap_and_union() {
    let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
    let b = Bounds::new(5.0, 5.0, 15.0, 15.0);
    let c = Bounds::new(20.0, 20.0, 30.0, 30.0);
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
    assert_eq!(a.union(&c), Bounds::new(0.0, 0.0, 30.0, 30.0));
}
