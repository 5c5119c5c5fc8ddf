//! Shape distance and binding proximity tests.
//!
//! Distances are signed: negative inside the shape, zero on the outline,
//! positive outside. Shapes are symmetric over both axes, so every test works
//! on the absolute position relative to the (un-rotated) center.

#[cfg(test)]
#[path = "collision_test.rs"]
mod collision_test;

use crate::consts::{
    BINDING_GAP_SIZE_FRACTION, BINDING_GAP_ZOOM_PX, MAX_SIZE_BINDING_GAP, MIN_BINDING_GAP,
};
use crate::element::{Element, ElementKind};
use crate::geometry::{Line, Point};

/// Binding highlight offset added to the zoom-derived gap.
const BINDING_HIGHLIGHT_OFFSET: f64 = 4.0;

/// Iterations of the closest-point search on an ellipse.
const ELLIPSE_ITERATIONS: usize = 4;

/// `p` relative to the center of `el` with rotation undone, folded into the
/// positive quadrant, plus the half width and half height.
#[must_use]
pub fn point_relative_to_element(el: &Element, p: Point) -> (Point, f64, f64) {
    let bounds = el.absolute_coords();
    let center = bounds.center();
    let unrotated = p.rotate_around(center, -el.angle);
    ((unrotated - center).abs(), bounds.width() / 2.0, bounds.height() / 2.0)
}

/// Signed distance from `p` to the outline of `el`.
#[must_use]
pub fn distance_to_bindable(el: &Element, p: Point) -> f64 {
    let (rel, hw, hh) = point_relative_to_element(el, p);
    match el.kind {
        ElementKind::Diamond => distance_to_diamond(rel, hw, hh),
        ElementKind::Ellipse => distance_to_ellipse(rel, hw, hh),
        ElementKind::Rectangle
        | ElementKind::Text
        | ElementKind::Frame
        | ElementKind::Image
        | ElementKind::Arrow
        | ElementKind::Line
        | ElementKind::Freedraw => distance_to_rectangle(rel, hw, hh),
    }
}

fn distance_to_rectangle(rel: Point, hw: f64, hh: f64) -> f64 {
    (rel.y - hh).max(rel.x - hw)
}

fn distance_to_diamond(rel: Point, hw: f64, hh: f64) -> f64 {
    if hw == 0.0 || hh == 0.0 {
        return distance_to_rectangle(rel, hw, hh);
    }
    Line::equation(hh, hw, -hh * hw).distance(rel)
}

fn distance_to_ellipse(rel: Point, a: f64, b: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return distance_to_rectangle(rel, a, b);
    }
    let closest = closest_point_on_ellipse(rel, a, b);
    let d = rel.distance(closest);
    let outside = (rel.x / a).powi(2) + (rel.y / b).powi(2) > 1.0;
    if outside { d } else { -d }
}

/// Closest point on the ellipse with semi-axes `a`, `b` to `p` (positive quadrant).
fn closest_point_on_ellipse(p: Point, a: f64, b: f64) -> Point {
    let mut tx = 0.707_f64;
    let mut ty = 0.707_f64;
    for _ in 0..ELLIPSE_ITERATIONS {
        let xx = a * tx;
        let yy = b * ty;
        let ex = ((a * a - b * b) * tx.powi(3)) / a;
        let ey = ((b * b - a * a) * ty.powi(3)) / b;
        let rx = xx - ex;
        let ry = yy - ey;
        let qx = p.x - ex;
        let qy = p.y - ey;
        let r = ry.hypot(rx);
        let q = qy.hypot(qx);
        if q == 0.0 {
            break;
        }
        tx = (((qx * r) / q + ex) / a).clamp(0.0, 1.0);
        ty = (((qy * r) / q + ey) / b).clamp(0.0, 1.0);
        let t = ty.hypot(tx);
        if t == 0.0 {
            break;
        }
        tx /= t;
        ty /= t;
    }
    Point::new(a * tx, b * ty)
}

/// Largest outline distance at which an endpoint still binds to `el`.
#[must_use]
pub fn max_binding_gap(el: &Element, width: f64, height: f64, zoom: f64) -> f64 {
    let zoom = if zoom > 0.0 && zoom < 1.0 { zoom } else { 1.0 };
    let shape_ratio = if el.kind == ElementKind::Diamond { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };
    let smaller = shape_ratio * width.min(height);
    MIN_BINDING_GAP
        .max((BINDING_GAP_SIZE_FRACTION * smaller).min(MAX_SIZE_BINDING_GAP))
        .max(BINDING_GAP_ZOOM_PX / zoom + BINDING_HIGHLIGHT_OFFSET)
}

/// Whether `p` is close enough to `el` to bind.
///
/// The outline band is `|distance| < max_binding_gap`. With `full_shape`
/// any point strictly inside the axis-aligned box also passes; frames never
/// bind by full shape.
#[must_use]
pub fn binding_border_test(el: &Element, p: Point, zoom: f64, full_shape: bool) -> bool {
    let threshold = max_binding_gap(el, el.width, el.height, zoom);
    let d = distance_to_bindable(el, p);
    if d.abs() < threshold {
        return true;
    }
    full_shape && el.kind != ElementKind::Frame && el.aabb().contains_strict(p)
}

/// Whether `p` lies inside or on the outline of `el`.
#[must_use]
pub fn is_point_in_shape(el: &Element, p: Point) -> bool {
    distance_to_bindable(el, p) <= 0.0
}
