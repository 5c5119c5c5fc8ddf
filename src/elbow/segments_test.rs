#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn elbow(points: Vec<Point>, fixed: Vec<FixedSegment>) -> Element {
    let mut arrow = Element::elbow_arrow(0.0, 0.0, 0.0, 0.0).with_points(points);
    if let Some(linear) = arrow.linear_mut() {
        linear.fixed_segments = fixed;
    }
    arrow
}

fn pinned(index: usize, start: (f64, f64), end: (f64, f64)) -> FixedSegment {
    FixedSegment { index, start: Point::new(start.0, start.1), end: Point::new(end.0, end.1) }
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn align_takes_the_cross_axis_from_the_anchor() {
    let p = Point::new(10.0, 20.0);
    let from = Point::new(30.0, 40.0);
    assert_eq!(align(p, from, true), Point::new(10.0, 40.0));
    assert_eq!(align(p, from, false), Point::new(30.0, 20.0));
}

#[test]
fn right_and_down_are_positive() {
    assert!(is_positive(Heading::Right));
    assert!(is_positive(Heading::Down));
    assert!(!is_positive(Heading::Left));
    assert!(!is_positive(Heading::Up));
}

// =============================================================
// Renormalization
// =============================================================

#[test]
fn renormalize_without_pins_keeps_the_points() {
    let arrow = elbow(pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 80.0)]), Vec::new());
    let scene = Scene::from_elements(vec![arrow.clone()]);
    let update = renormalize(&arrow, arrow.linear().unwrap(), &scene, ElbowOptions::default());
    assert_eq!(update.points, Some(pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 80.0)])));
    assert_eq!(update.fixed_segments, Some(Vec::new()));
}

#[test]
fn renormalize_merges_collinear_segments_and_shifts_pins() {
    let arrow = elbow(
        pts(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (100.0, 100.0), (200.0, 100.0)]),
        vec![pinned(3, (100.0, 0.0), (100.0, 100.0))],
    );
    let scene = Scene::from_elements(vec![arrow.clone()]);
    let update = renormalize(&arrow, arrow.linear().unwrap(), &scene, ElbowOptions::default());
    assert_eq!(update.points, Some(pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (200.0, 100.0)])));
    assert_eq!(update.fixed_segments, Some(vec![pinned(2, (100.0, 0.0), (100.0, 100.0))]));
}

// =============================================================
// Release
// =============================================================

#[test]
fn release_reroutes_only_the_freed_stretch() {
    let points = pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (150.0, 100.0), (150.0, 200.0), (250.0, 200.0)]);
    let kept = pinned(2, (50.0, 0.0), (50.0, 100.0));
    let arrow = elbow(points.clone(), vec![kept, pinned(4, (150.0, 100.0), (150.0, 200.0))]);
    let scene = Scene::from_elements(vec![arrow.clone()]);

    let update = release(&arrow, arrow.linear().unwrap(), &[kept], &scene, ElbowOptions::default());
    assert_eq!(update.x, Some(0.0));
    assert_eq!(update.y, Some(0.0));
    assert_eq!(update.points, Some(points));
    assert_eq!(update.fixed_segments, Some(vec![kept]));
    assert_eq!(update.start_is_special, Some(false));
}

#[test]
fn release_of_unknown_segment_keeps_points() {
    let arrow = elbow(pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 100.0)]), Vec::new());
    let scene = Scene::new();
    let update = release(&arrow, arrow.linear().unwrap(), &[], &scene, ElbowOptions::default());
    assert_eq!(update.points, Some(pts(&[(0.0, 0.0), (50.0, 0.0), (50.0, 100.0)])));
    assert!(update.fixed_segments.is_none());
}
