//! Elbow-arrow router.
//!
//! Elbow arrows only have horizontal and vertical segments. Their points are
//! recomputed whenever an endpoint, a binding or a pinned segment changes:
//!
//! | Change | Handler |
//! |--------|---------|
//! | nothing (scene reload) | merge collinear and too-short segments |
//! | no pinned segments | full grid route |
//! | a pinned segment was released | re-route only the freed stretch |
//! | a pinned segment moved | splice it in, adding a leg at either end if needed |
//! | endpoints moved with pinned segments | keep the middle, re-derive both end legs |
//!
//! [`route`] computes the route data and the A* grid route, [`segments`]
//! holds the incremental handlers.

mod astar;
mod route;
mod segments;


use tracing::{debug, warn};

use crate::consts::{BASE_PADDING, MAX_POS, ORTHOGONAL_TOLERANCE};
use crate::element::{Element, ElementUpdate, FixedSegment, LinearData, PointBinding};
use crate::geometry::{Bounds, Point};
use crate::store::Scene;

use route::{ArrowState, bindable_element, elbow_arrow_data, routed_corners};

/// Requested changes to an elbow arrow. Absent fields keep the arrow's own.
///
/// `points` of length two replace only the first and last point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElbowUpdates {
    pub points: Option<Vec<Point>>,
    pub fixed_segments: Option<Vec<FixedSegment>>,
    pub start_binding: Option<Option<PointBinding>>,
    pub end_binding: Option<Option<PointBinding>>,
}

impl ElbowUpdates {
    /// The router-relevant part of a sparse element update.
    #[must_use]
    pub fn from_update(update: &ElementUpdate) -> Self {
        Self {
            points: update.points.clone(),
            fixed_segments: update.fixed_segments.clone(),
            start_binding: update.start_binding,
            end_binding: update.end_binding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowOptions {
    /// Endpoints bind to whatever they hover instead of their recorded bindings.
    pub is_dragging: bool,
    pub zoom: f64,
    /// Clearance kept around bound shapes.
    pub padding: f64,
}

impl Default for ElbowOptions {
    fn default() -> Self {
        Self { is_dragging: false, zoom: 1.0, padding: BASE_PADDING }
    }
}

/// Whether every segment is horizontal or vertical within `ORTHOGONAL_TOLERANCE`.
#[must_use]
pub fn validate_elbow_points(points: &[Point]) -> bool {
    points.windows(2).all(|w| {
        (w[1].x - w[0].x).abs() < ORTHOGONAL_TOLERANCE || (w[1].y - w[0].y).abs() < ORTHOGONAL_TOLERANCE
    })
}

/// Complete `update` for an elbow arrow with the router's points.
///
/// Updates that touch neither points, pinned segments nor bindings pass
/// through unchanged unless they are empty, which renormalizes the arrow.
/// Routed updates always reset the angle.
#[must_use]
pub fn elbow_arrow_update(arrow: &Element, scene: &Scene, update: &ElementUpdate, opts: ElbowOptions) -> ElementUpdate {
    if !arrow.is_elbow_arrow() || (*update != ElementUpdate::default() && !touches_route(update)) {
        return update.clone();
    }
    let requested = ElbowUpdates::from_update(update);
    let mut moved = arrow.clone();
    moved.x = update.x.unwrap_or(arrow.x);
    moved.y = update.y.unwrap_or(arrow.y);
    let routed = update_elbow_arrow_points(&moved, scene, requested, opts);

    let mut merged = update.clone();
    merged.angle = Some(0.0);
    merged.x = routed.x.or(merged.x);
    merged.y = routed.y.or(merged.y);
    merged.width = routed.width.or(merged.width);
    merged.height = routed.height.or(merged.height);
    merged.points = routed.points.or(merged.points);
    merged.fixed_segments = routed.fixed_segments.or(merged.fixed_segments);
    merged.start_is_special = routed.start_is_special.or(merged.start_is_special);
    merged.end_is_special = routed.end_is_special.or(merged.end_is_special);
    merged
}

fn touches_route(update: &ElementUpdate) -> bool {
    update.points.is_some()
        || update.fixed_segments.is_some()
        || update.start_binding.is_some()
        || update.end_binding.is_some()
}

/// Route an elbow arrow for the requested changes.
///
/// Returns the sparse update to apply; an empty update means nothing changes.
#[must_use]
pub fn update_elbow_arrow_points(
    arrow: &Element,
    scene: &Scene,
    updates: ElbowUpdates,
    opts: ElbowOptions,
) -> ElementUpdate {
    let Some(linear) = arrow.linear() else {
        return ElementUpdate::default();
    };
    if linear.points.len() < 2 {
        return ElementUpdate {
            points: Some(updates.points.unwrap_or_else(|| linear.points.clone())),
            ..ElementUpdate::default()
        };
    }

    let mut arrow = arrow.clone();
    if arrow.x.abs() > MAX_POS || arrow.y.abs() > MAX_POS {
        warn!(id = %arrow.id, x = arrow.x, y = arrow.y, "elbow arrow outside coordinate limits, clamping");
    }
    arrow.x = arrow.x.clamp(-MAX_POS, MAX_POS);
    arrow.y = arrow.y.clamp(-MAX_POS, MAX_POS);
    let update_points: Option<Vec<Point>> = updates
        .points
        .filter(|p| p.len() >= 2)
        .map(|points| points.into_iter().map(clamp_point).collect());

    let fixed: Vec<FixedSegment> = updates.fixed_segments.clone().unwrap_or_else(|| linear.fixed_segments.clone());
    let updated_points: Vec<Point> = match &update_points {
        Some(next) if next.len() == 2 => {
            let last = linear.points.len() - 1;
            linear
                .points
                .iter()
                .enumerate()
                .map(|(i, &p)| match i {
                    0 => next[0],
                    i if i == last => next[1],
                    _ => p,
                })
                .collect()
        }
        Some(next) => next.clone(),
        None => linear.points.clone(),
    };

    let start_binding = updates.start_binding.unwrap_or(linear.start_binding);
    let end_binding = updates.end_binding.unwrap_or(linear.end_binding);
    let start_missing = start_binding.is_some_and(|b| bindable_element(scene, b.element_id).is_none());
    let end_missing = end_binding.is_some_and(|b| bindable_element(scene, b.element_id).is_none());
    let valid = validate_elbow_points(&updated_points);
    let origin = Point::new(arrow.x, arrow.y);

    if (start_missing || end_missing || scene.non_deleted().next().is_none()) && valid {
        debug!(id = %arrow.id, "renormalizing elbow arrow with a missing bound element");
        let global: Vec<Point> = updated_points.iter().map(|&p| origin + p).collect();
        return normalize_arrow_update(
            &global,
            linear.fixed_segments.clone(),
            linear.start_is_special,
            linear.end_is_special,
        );
    }

    let binding_set = |b: Option<Option<PointBinding>>| b.flatten().is_some();
    if update_points.is_none()
        && updates.fixed_segments.is_none()
        && !binding_set(updates.start_binding)
        && !binding_set(updates.end_binding)
    {
        return segments::renormalize(&arrow, linear, scene, opts);
    }

    let unchanged = updates.start_binding == Some(linear.start_binding)
        && updates.end_binding == Some(linear.end_binding)
        && update_points
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .all(|(i, p)| linear.points.get(i) == Some(p));
    if unchanged && valid {
        return ElementUpdate::default();
    }

    let state = ArrowState { start_binding, end_binding, ..ArrowState::of(&arrow) };
    let data = elbow_arrow_data(&state, scene, &updated_points, opts.is_dragging, opts.zoom, opts.padding);

    if fixed.is_empty() {
        let corners = routed_corners(linear.start_binding.is_some(), &data);
        return normalize_arrow_update(&corners, Vec::new(), false, false);
    }

    if linear.fixed_segments.len() > fixed.len() {
        return segments::release(&arrow, linear, &fixed, scene, opts);
    }

    let Some(points) = update_points else {
        return segments::segment_move(&arrow, linear, fixed, &data, opts.padding);
    };

    if let Some(fixed_segments) = updates.fixed_segments {
        let size = Bounds::from_points(&points);
        return ElementUpdate {
            width: Some(size.width()),
            height: Some(size.height()),
            points: Some(points),
            fixed_segments: Some(fixed_segments),
            ..ElementUpdate::default()
        };
    }

    segments::endpoint_drag(&arrow, linear, &updated_points, &fixed, &data, opts.padding)
}

fn clamp_point(p: Point) -> Point {
    Point::new(p.x.clamp(-MAX_POS, MAX_POS), p.y.clamp(-MAX_POS, MAX_POS))
}

fn absolute_points(arrow: &Element, linear: &LinearData) -> Vec<Point> {
    let origin = Point::new(arrow.x, arrow.y);
    linear.points.iter().map(|&p| origin + p).collect()
}

/// Update placing the arrow at `global[0]` with points relative to it.
fn normalize_arrow_update(
    global: &[Point],
    fixed_segments: Vec<FixedSegment>,
    start_is_special: bool,
    end_is_special: bool,
) -> ElementUpdate {
    let Some(&first) = global.first() else {
        return ElementUpdate::default();
    };
    let points: Vec<Point> = global.iter().map(|&p| clamp_point(p - first)).collect();
    let size = Bounds::from_points(&points);
    ElementUpdate {
        x: Some(first.x.clamp(-MAX_POS, MAX_POS)),
        y: Some(first.y.clamp(-MAX_POS, MAX_POS)),
        width: Some(size.width()),
        height: Some(size.height()),
        points: Some(points),
        fixed_segments: Some(fixed_segments),
        start_is_special: Some(start_is_special),
        end_is_special: Some(end_is_special),
        ..ElementUpdate::default()
    }
}
