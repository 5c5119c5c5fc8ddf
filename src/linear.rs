//! Linear element point helpers: local/global conversion, point handle hit
//! testing, and point moves that keep the first point at the local origin.

#[cfg(test)]
#[path = "linear_test.rs"]
mod linear_test;

use crate::element::{Element, ElementUpdate, Endpoint};
use crate::geometry::{Bounds, Point};

/// Index of the point at `end`.
#[must_use]
pub fn endpoint_index(el: &Element, end: Endpoint) -> usize {
    match end {
        Endpoint::Start => 0,
        Endpoint::End => el.linear().map_or(0, |l| l.points.len().saturating_sub(1)),
    }
}

/// Index of the point next to the endpoint at `end`.
#[must_use]
pub fn adjacent_index(el: &Element, end: Endpoint) -> usize {
    let len = el.linear().map_or(0, |l| l.points.len());
    match end {
        Endpoint::Start => 1.min(len.saturating_sub(1)),
        Endpoint::End => len.saturating_sub(2),
    }
}

/// Scene coordinates of the point at `index`, with the element's rotation applied.
#[must_use]
pub fn global_point(el: &Element, index: usize) -> Option<Point> {
    let p = *el.linear()?.points.get(index)?;
    Some(Point::new(el.x + p.x, el.y + p.y).rotate_around(el.center(), el.angle))
}

/// All points in scene coordinates.
#[must_use]
pub fn global_points(el: &Element) -> Vec<Point> {
    let Some(l) = el.linear() else {
        return Vec::new();
    };
    let center = el.center();
    l.points.iter().map(|p| Point::new(el.x + p.x, el.y + p.y).rotate_around(center, el.angle)).collect()
}

#[must_use]
pub fn global_endpoint(el: &Element, end: Endpoint) -> Option<Point> {
    global_point(el, endpoint_index(el, end))
}

/// Convert a scene point into the element's local point space.
#[must_use]
pub fn local_point(el: &Element, global: Point) -> Point {
    let p = global.rotate_around(el.center(), -el.angle);
    Point::new(p.x - el.x, p.y - el.y)
}

/// Index of the point handle under `scene_point`, searching last to first so
/// that coincident points resolve to the most recently added one.
#[must_use]
pub fn point_index_at(el: &Element, scene_point: Point, zoom: f64, handle_size: f64) -> Option<usize> {
    let points = global_points(el);
    (0..points.len()).rev().find(|&i| points[i].distance(scene_point) * zoom < handle_size + 1.0)
}

/// Update moving the points at the given indices to new local positions.
///
/// Moving the first point shifts `x`/`y` so the first point stays at the
/// local origin; width and height follow the new points. Elbow arrows only
/// get their two endpoints back, for the router to fill in.
#[must_use]
pub fn move_points_update(el: &Element, targets: &[(usize, Point)]) -> ElementUpdate {
    let Some(l) = el.linear() else {
        return ElementUpdate::default();
    };
    let points = &l.points;
    if l.elbowed {
        let last = points.len().saturating_sub(1);
        let pick = |i: usize| {
            targets.iter().find(|(t, _)| *t == i).map(|&(_, p)| p).or_else(|| points.get(i).copied()).unwrap_or_default()
        };
        return ElementUpdate { points: Some(vec![pick(0), pick(last)]), ..ElementUpdate::default() };
    }
    let origin = points.first().copied().unwrap_or_default();
    let offset = targets
        .iter()
        .find(|(i, _)| *i == 0)
        .map_or(Point::origin(), |(_, p)| Point::new(p.x + origin.x, p.y + origin.y));

    let next: Vec<Point> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| match targets.iter().find(|(t, _)| *t == i) {
            Some((0, _)) => p,
            Some((_, target)) => Point::new(target.x - offset.x, target.y - offset.y),
            None => p - offset,
        })
        .collect();

    points_update(el, next, offset)
}

/// Update replacing all points, shifting `x`/`y` by `offset` (the local
/// position the new first point had) with the rotation center compensated.
#[must_use]
pub fn points_update(el: &Element, next: Vec<Point>, offset: Point) -> ElementUpdate {
    let Some(l) = el.linear() else {
        return ElementUpdate::default();
    };
    let prev = Bounds::from_points(&l.points);
    let nb = Bounds::from_points(&next);
    let prev_center = Point::new(el.x + prev.center().x, el.y + prev.center().y);
    let next_center = Point::new(el.x + nb.center().x, el.y + nb.center().y);
    let d = prev_center - next_center;
    let rotated = offset.rotate_around(d, el.angle);
    ElementUpdate {
        x: Some(el.x + rotated.x),
        y: Some(el.y + rotated.y),
        width: Some(nb.width()),
        height: Some(nb.height()),
        points: Some(next),
        ..ElementUpdate::default()
    }
}

/// Update translating a whole element by `delta`.
#[must_use]
pub fn translate_update(el: &Element, delta: Point) -> ElementUpdate {
    ElementUpdate::position(el.x + delta.x, el.y + delta.y)
}
