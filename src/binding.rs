//! Binding resolver: which shape an arrow endpoint attaches to, and the
//! `focus`/`gap`/`fixed_point` record describing where it attaches.
//!
//! Focus and gap math works in a frame relative to the target's center with
//! the target's rotation undone. `focus` is the oriented ratio between the
//! target and the scaled copy of its outline that the arrow's last segment is
//! tangent to; `gap` is the distance kept from the outline. Both are turned
//! back into an endpoint by [`update_bound_point`] whenever the target moves.

#[cfg(test)]
#[path = "binding_test.rs"]
mod binding_test;

use std::collections::HashSet;

use tracing::debug;

use crate::collision::{binding_border_test, distance_to_bindable, max_binding_gap};
use crate::consts::{
    FALLBACK_BINDING_GAP, FIXED_BINDING_DISTANCE, FIXED_POINT_CENTER, FIXED_POINT_CENTER_NUDGED,
    SNAP_TO_MID_MAX, SNAP_TO_MID_MIN, SNAP_TO_MID_TOLERANCE,
};
use crate::element::{BoundElement, BoundKind, Element, ElementId, ElementKind, ElementUpdate, Endpoint, PointBinding};
use crate::geometry::{Bounds, Line, Point, finite_or, segments_intersect_at};
use crate::heading::{Heading, heading_for_point_from_element};
use crate::linear::{adjacent_index, endpoint_index, global_point, local_point};
use crate::store::Scene;

/// What to do with one end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingChoice {
    /// Leave the end as it is.
    Keep,
    /// Drop the end's binding.
    Unbind,
    /// Bind (or rebind, refreshing focus and gap) to this element.
    Bind(ElementId),
}

impl From<Option<ElementId>> for BindingChoice {
    fn from(id: Option<ElementId>) -> Self {
        id.map_or(Self::Unbind, Self::Bind)
    }
}

// =============================================================================
// Candidate search
// =============================================================================

/// Topmost bindable element close enough to `p` to bind.
///
/// Locked elements, tombstones and text labels inside containers never
/// qualify. With `full_shape` a point anywhere inside the box also counts,
/// except for frames so that their children stay reachable.
///
/// Among qualifying elements, one whose outline contains `p` wins over one
/// that `p` merely hovers near; then the topmost wins. With `consider_all`
/// (elbow arrows) the element whose outline band holds `p` wins if it is the
/// only one, otherwise the smallest candidate.
#[must_use]
pub fn hovered_element_for_binding(
    scene: &Scene,
    p: Point,
    zoom: f64,
    full_shape: bool,
    consider_all: bool,
) -> Option<&Element> {
    let mut candidates = scene.non_deleted().rev().filter(|el| {
        el.is_bindable() && !el.locked && binding_border_test(el, p, zoom, full_shape && el.kind != ElementKind::Frame)
    });

    if !consider_all {
        let mut topmost = None;
        for el in candidates {
            if distance_to_bindable(el, p) <= 0.0 {
                return Some(el);
            }
            if topmost.is_none() {
                topmost = Some(el);
            }
        }
        return topmost;
    }

    let all: Vec<&Element> = candidates.by_ref().collect();
    if all.len() <= 1 {
        return all.first().copied();
    }
    let on_border: Vec<&Element> = all.iter().copied().filter(|el| binding_border_test(el, p, zoom, false)).collect();
    if let [only] = on_border.as_slice() {
        return Some(*only);
    }
    let size = |el: &Element| el.width.powi(2) + el.height.powi(2);
    all.into_iter().fold(None, |best, el| match best {
        Some(b) if size(b) < size(el) => Some(b),
        _ => Some(el),
    })
}

/// Element the endpoint at `end` of `arrow` would bind to where it stands now.
#[must_use]
pub fn eligible_element_for_end(scene: &Scene, arrow: &Element, end: Endpoint, zoom: f64) -> Option<ElementId> {
    let edge = global_point(arrow, endpoint_index(arrow, end))?;
    let elbow = arrow.is_elbow_arrow();
    hovered_element_for_binding(scene, edge, zoom, elbow, elbow).map(|el| el.id)
}

// =============================================================================
// Focus and gap
// =============================================================================

fn to_relative(el: &Element, p: Point) -> Point {
    let center = el.center();
    p.rotate_around(center, -el.angle) - center
}

fn from_relative(el: &Element, p: Point) -> Point {
    let center = el.center();
    (p + center).rotate_around(center, el.angle)
}

/// Oriented relative distance of the line `a → b` from the center of `el`,
/// measured against the scaled outline the line is tangent to.
///
/// `b` is the point closer to the element. Degenerate input yields 0.
#[must_use]
pub fn determine_focus_distance(el: &Element, a: Point, b: Point) -> f64 {
    let line = Line::through(to_relative(el, a), to_relative(el, b));
    let q = el.height / el.width;
    let hw = el.width / 2.0;
    let hh = el.height / 2.0;
    let n = line.n.abs();
    let m = line.m.abs();
    let focus = match el.kind {
        ElementKind::Diamond => {
            if m < n {
                line.c / (n * hw)
            } else {
                line.c / (m * hh)
            }
        }
        ElementKind::Ellipse => line.c / (hw * (line.n.powi(2) + q.powi(2) * line.m.powi(2)).sqrt()),
        ElementKind::Rectangle
        | ElementKind::Text
        | ElementKind::Frame
        | ElementKind::Image
        | ElementKind::Arrow
        | ElementKind::Line
        | ElementKind::Freedraw => line.c / (hw * (n + q * m)),
    };
    finite_or(focus, 0.0)
}

/// Scene point on the scaled outline of `el` (scale `|focus|`) where the
/// tangent through `adjacent` touches it. Focus 0 is the center.
#[must_use]
pub fn determine_focus_point(el: &Element, focus: f64, adjacent: Point) -> Point {
    if focus == 0.0 {
        return el.center();
    }
    let rel = to_relative(el, adjacent);
    let point = match el.kind {
        ElementKind::Ellipse => focus_point_for_ellipse(el, focus, rel),
        _ => focus_point_for_rectangulars(el, focus, rel),
    };
    from_relative(el, point)
}

/// Outline corners relative to the center, scaled by `scale`.
fn corners(el: &Element, scale: f64) -> [Point; 4] {
    let hx = scale * el.width / 2.0;
    let hy = scale * el.height / 2.0;
    if el.kind == ElementKind::Diamond {
        [Point::new(0.0, hy), Point::new(hx, 0.0), Point::new(0.0, -hy), Point::new(-hx, 0.0)]
    } else {
        [Point::new(hx, hy), Point::new(hx, -hy), Point::new(-hx, -hy), Point::new(-hx, hy)]
    }
}

fn focus_point_for_rectangulars(el: &Element, focus: f64, point: Point) -> Point {
    let orientation = focus.signum();
    let mut max_distance = 0.0;
    let mut tangent = Point::origin();
    for corner in corners(el, focus.abs()) {
        let distance = orientation * Line::through(point, corner).c;
        if distance > max_distance {
            max_distance = distance;
            tangent = corner;
        }
    }
    tangent
}

fn focus_point_for_ellipse(el: &Element, focus: f64, point: Point) -> Point {
    let a = el.width * focus.abs() / 2.0;
    let b = el.height * focus.abs() / 2.0;
    let orientation = focus.signum();
    let px = point.x;
    let py = if point.y == 0.0 { 0.0001 } else { point.y };

    let squares = px.powi(2) * b.powi(2) + py.powi(2) * a.powi(2);
    // Tangent m·x + n·y + 1 = 0
    let m = (-px * b.powi(2) + orientation * py * (squares - a.powi(2) * b.powi(2)).max(0.0).sqrt()) / squares;
    let mut n = (-m * px - 1.0) / py;
    if n == 0.0 {
        n = if n.is_sign_negative() { -0.01 } else { 0.01 };
    }
    let x = -(a.powi(2) * m) / (n.powi(2) * b.powi(2) + m.powi(2) * a.powi(2));
    Point::new(x, (-m * x - 1.0) / n)
}

/// Intersections of the line through `a` and `b` with the outline of `el`
/// inflated by `gap`.
///
/// Box-like shapes return the hits of the segment `a → b` in edge order.
/// Diamonds and ellipses return the nearest and farthest hit from `a`, or
/// nothing when the line only grazes the shape.
#[must_use]
pub fn intersect_element_with_line(el: &Element, a: Point, b: Point, gap: f64) -> Vec<Point> {
    if el.kind.is_rectanguloid() {
        return intersect_box(el, a, b, gap);
    }
    let a_rel = to_relative(el, a);
    let line = Line::through(a_rel, to_relative(el, b));
    let mut hits = if el.kind == ElementKind::Ellipse {
        ellipse_intersections(el, gap, &line)
    } else {
        let corners = corners(el, 1.0);
        let mut hits: Vec<Point> = (0..4)
            .filter_map(|i| {
                let (s0, s1) = offset_segment(corners[i], corners[(i + 1) % 4], gap);
                intersect_segment(&line, s0, s1)
            })
            .collect();
        for corner in corners {
            hits.extend(circle_intersections(corner, gap, &line));
        }
        hits
    };
    if hits.len() < 2 {
        return Vec::new();
    }
    hits.sort_by(|p, q| p.distance(a_rel).total_cmp(&q.distance(a_rel)));
    let (Some(&near), Some(&far)) = (hits.first(), hits.last()) else {
        return Vec::new();
    };
    vec![from_relative(el, near), from_relative(el, far)]
}

fn intersect_box(el: &Element, a: Point, b: Point, gap: f64) -> Vec<Point> {
    let bounds = Bounds::new(el.x - gap, el.y - gap, el.x + el.width + gap, el.y + el.height + gap);
    let center = bounds.center();
    let c = bounds.corners().map(|p| p.rotate_around(center, el.angle));
    (0..4).filter_map(|i| segments_intersect_at(a, b, c[i], c[(i + 1) % 4])).collect()
}

/// The segment moved outward by `distance` along its normal.
fn offset_segment(a: Point, b: Point, distance: f64) -> (Point, Point) {
    let dir = (b - a).normalize();
    let offset = Point::new(-dir.y, dir.x) * distance;
    (a + offset, b + offset)
}

fn intersect_segment(line: &Line, a: Point, b: Point) -> Option<Point> {
    if line.distance(a) * line.distance(b) >= 0.0 {
        return None;
    }
    line.intersect(&Line::through(a, b))
}

fn ellipse_intersections(el: &Element, gap: f64, line: &Line) -> Vec<Point> {
    let a = el.width / 2.0 + gap;
    let b = el.height / 2.0 + gap;
    let (kx, ky, c) = (line.n, line.m, line.c);
    let squares = a * a * kx * kx + b * b * ky * ky;
    let discr = squares - c * c;
    if squares == 0.0 || discr <= 0.0 {
        return Vec::new();
    }
    let root = discr.sqrt();
    let xn = -a * a * kx * c;
    let yn = -b * b * ky * c;
    vec![
        Point::new((xn + a * b * ky * root) / squares, (yn - a * b * kx * root) / squares),
        Point::new((xn - a * b * ky * root) / squares, (yn + a * b * kx * root) / squares),
    ]
}

fn circle_intersections(center: Point, radius: f64, line: &Line) -> Vec<Point> {
    if radius == 0.0 {
        return if line.distance(center) == 0.0 { vec![center] } else { Vec::new() };
    }
    let (kx, ky, c) = (line.n, line.m, line.c);
    let (a, b) = (center.x, center.y);
    let squares = kx * kx + ky * ky;
    let discr = radius * radius * squares - (kx * a + ky * b + c).powi(2);
    if squares == 0.0 || discr <= 0.0 {
        return Vec::new();
    }
    let root = discr.sqrt();
    let xn = a * ky * ky - b * kx * ky - kx * c;
    let yn = b * kx * kx - a * kx * ky - ky * c;
    vec![
        Point::new((xn + ky * root) / squares, (yn - kx * root) / squares),
        Point::new((xn - ky * root) / squares, (yn + kx * root) / squares),
    ]
}

/// Focus and gap of the endpoint at `end` of `arrow` against `target`.
#[must_use]
pub fn calculate_focus_and_gap(arrow: &Element, target: &Element, end: Endpoint) -> (f64, f64) {
    let edge = global_point(arrow, endpoint_index(arrow, end)).unwrap_or_default();
    let adjacent = global_point(arrow, adjacent_index(arrow, end)).unwrap_or(edge);
    let focus = determine_focus_distance(target, adjacent, edge);
    let gap = distance_to_bindable(target, edge).max(1.0);
    (focus, finite_or(gap, 1.0))
}

/// Replace a gap wider than the binding threshold with the fallback gap.
#[must_use]
pub fn normalize_gap(target: &Element, gap: f64) -> f64 {
    if gap > max_binding_gap(target, target.width, target.height, 1.0) { FALLBACK_BINDING_GAP } else { gap }
}

// =============================================================================
// Bind / unbind
// =============================================================================

/// Binding record for the endpoint at `end` of `arrow` against `target`.
#[must_use]
pub fn binding_for(arrow: &Element, target: &Element, end: Endpoint) -> PointBinding {
    let (focus, gap) = calculate_focus_and_gap(arrow, target, end);
    PointBinding {
        element_id: target.id,
        focus,
        gap: normalize_gap(target, gap),
        fixed_point: arrow
            .is_elbow_arrow()
            .then(|| calculate_fixed_point_for_elbow_arrow_binding(arrow, target, end)),
    }
}

/// Bind the endpoint at `end` of an arrow to `target` and list the arrow in
/// the target's `bound_elements`. Lines and missing elements are ignored.
pub fn bind_linear_element(scene: &mut Scene, arrow_id: ElementId, target_id: ElementId, end: Endpoint) {
    let (Some(arrow), Some(target)) = (scene.get_non_deleted(&arrow_id), scene.get_non_deleted(&target_id)) else {
        return;
    };
    if !arrow.is_arrow() {
        return;
    }
    let binding = binding_for(arrow, target, end);
    let listed = target.lists_bound(arrow_id);
    let mut bound = target.bound_elements.clone();
    debug!(%arrow_id, %target_id, ?end, focus = binding.focus, gap = binding.gap, "bound arrow endpoint");
    scene.mutate(&arrow_id, &ElementUpdate::binding(end, Some(binding)));
    if !listed {
        bound.push(BoundElement::arrow(arrow_id));
        scene.mutate(&target_id, &ElementUpdate::bound_elements(bound));
    }
}

/// Clear the binding at `end`. Returns the id the end was bound to.
pub fn unbind_linear_element(scene: &mut Scene, arrow_id: ElementId, end: Endpoint) -> Option<ElementId> {
    let target = scene.get_non_deleted(&arrow_id)?.linear()?.binding(end)?.element_id;
    scene.mutate(&arrow_id, &ElementUpdate::binding(end, None));
    debug!(%arrow_id, target_id = %target, ?end, "unbound arrow endpoint");
    Some(target)
}

/// Apply a choice to both ends of an arrow, start first.
///
/// Arrows with fewer than three points never bind both ends to the same
/// element; the start end wins. Elements that only lost the arrow drop it
/// from their `bound_elements`.
pub fn bind_or_unbind_linear_element(scene: &mut Scene, arrow_id: ElementId, start: BindingChoice, end: BindingChoice) {
    let mut bound = HashSet::new();
    let mut unbound = HashSet::new();
    bind_or_unbind_edge(scene, arrow_id, start, end, Endpoint::Start, &mut bound, &mut unbound);
    bind_or_unbind_edge(scene, arrow_id, end, start, Endpoint::End, &mut bound, &mut unbound);

    for id in unbound.difference(&bound) {
        let Some(el) = scene.get_non_deleted(id) else {
            continue;
        };
        let remaining: Vec<BoundElement> = el
            .bound_elements
            .iter()
            .copied()
            .filter(|b| b.kind != BoundKind::Arrow || b.id != arrow_id)
            .collect();
        scene.mutate(id, &ElementUpdate::bound_elements(remaining));
    }
}

fn bind_or_unbind_edge(
    scene: &mut Scene,
    arrow_id: ElementId,
    choice: BindingChoice,
    other: BindingChoice,
    end: Endpoint,
    bound: &mut HashSet<ElementId>,
    unbound: &mut HashSet<ElementId>,
) {
    let target_id = match choice {
        BindingChoice::Keep => return,
        BindingChoice::Unbind => {
            if let Some(id) = unbind_linear_element(scene, arrow_id, end) {
                unbound.insert(id);
            }
            return;
        }
        BindingChoice::Bind(id) => id,
    };
    let Some(arrow) = scene.get_non_deleted(&arrow_id) else {
        return;
    };
    let simple = arrow.linear().is_some_and(|l| l.points.len() < 3);
    if simple {
        let allowed = match other {
            BindingChoice::Unbind => true,
            BindingChoice::Keep => {
                let other_id = arrow.linear().and_then(|l| l.binding(end.opposite())).map(|b| b.element_id);
                other_id != Some(target_id)
            }
            BindingChoice::Bind(other_id) => end == Endpoint::Start || other_id != target_id,
        };
        if !allowed {
            return;
        }
    }
    bind_linear_element(scene, arrow_id, target_id, end);
    bound.insert(target_id);
}

// =============================================================================
// Strategies
// =============================================================================

/// Choices for an arrow whose point handles at `dragged` are being dragged.
///
/// A dragged end binds to whatever it hovers (or unbinds when binding is
/// disabled). The other end rebinds to refresh its focus and gap.
#[must_use]
pub fn strategy_for_dragging_endpoints(
    scene: &Scene,
    arrow: &Element,
    binding_enabled: bool,
    dragged: &[usize],
    zoom: f64,
) -> (BindingChoice, BindingChoice) {
    let choose = |end: Endpoint| {
        let is_dragged = dragged.contains(&endpoint_index(arrow, end));
        if is_dragged && !binding_enabled {
            BindingChoice::Unbind
        } else {
            eligible_element_for_end(scene, arrow, end, zoom).into()
        }
    };
    (choose(Endpoint::Start), choose(Endpoint::End))
}

/// Choices for an arrow moved as a whole, by inner points, or by nudging.
///
/// An end stays bound only while its original target still passes the
/// border test; an end that was not bound never binds here.
#[must_use]
pub fn strategy_for_dragging_arrow_or_joints(
    scene: &Scene,
    arrow: &Element,
    binding_enabled: bool,
    zoom: f64,
) -> (BindingChoice, BindingChoice) {
    let choose = |end: Endpoint| {
        let still_close = arrow
            .linear()
            .and_then(|l| l.binding(end))
            .and_then(|b| scene.get_non_deleted(&b.element_id))
            .filter(|target| target.is_bindable())
            .zip(global_point(arrow, endpoint_index(arrow, end)))
            .is_some_and(|(target, edge)| binding_border_test(target, edge, zoom, false));
        if still_close && binding_enabled {
            eligible_element_for_end(scene, arrow, end, zoom).into()
        } else {
            BindingChoice::Unbind
        }
    };
    (choose(Endpoint::Start), choose(Endpoint::End))
}

/// Rebind every arrow in `ids` after a gesture.
///
/// `dragging_points` holds the dragged point indices when point handles were
/// dragged; `None` or an empty slice means the arrows moved as a whole.
pub fn bind_or_unbind_linear_elements(
    scene: &mut Scene,
    ids: &[ElementId],
    binding_enabled: bool,
    dragging_points: Option<&[usize]>,
    zoom: f64,
) {
    for &id in ids {
        let Some(arrow) = scene.get_non_deleted(&id).filter(|el| el.is_linear()) else {
            continue;
        };
        let (start, end) = match dragging_points {
            Some(points) if !points.is_empty() => {
                strategy_for_dragging_endpoints(scene, arrow, binding_enabled, points, zoom)
            }
            _ => strategy_for_dragging_arrow_or_joints(scene, arrow, binding_enabled, zoom),
        };
        bind_or_unbind_linear_element(scene, id, start, end);
    }
}

// =============================================================================
// Elbow arrow snapping
// =============================================================================

/// Heading an elbow arrow leaves `p` with.
///
/// Without a target the heading points at `other`. A target that `orig` is
/// too far from (or exactly on) yields the heading away from its center;
/// otherwise the side of the target facing `p`.
#[must_use]
pub fn heading_for_elbow_arrow_snap(
    p: Point,
    other: Point,
    target: Option<(&Element, Bounds)>,
    orig: Point,
    zoom: f64,
) -> Heading {
    let Some((el, aabb)) = target else {
        return Heading::from_vector(other - p);
    };
    let distance = distance_to_bindable(el, orig);
    if distance > max_binding_gap(el, el.width, el.height, zoom) || distance == 0.0 {
        let center = Point::new(el.x + el.width / 2.0, el.y + el.height / 2.0);
        return Heading::from_vector(p - center);
    }
    heading_for_point_from_element(el, &aabb, p)
}

/// Project `p` onto the outline of `el`, kept [`FIXED_BINDING_DISTANCE`] away,
/// along the axis matching the side it faces. Returns `p` when nothing lines up.
#[must_use]
pub fn snap_point_to_outline(el: &Element, p: Point) -> Point {
    let aabb = el.aabb();
    let heading = heading_for_point_from_element(el, &aabb, p);
    let mut hits = intersect_element_with_line(
        el,
        Point::new(p.x, p.y - 2.0 * el.height),
        Point::new(p.x, p.y + 2.0 * el.height),
        FIXED_BINDING_DISTANCE,
    );
    hits.extend(intersect_element_with_line(
        el,
        Point::new(p.x - 2.0 * el.width, p.y),
        Point::new(p.x + 2.0 * el.width, p.y),
        FIXED_BINDING_DISTANCE,
    ));
    let horizontal_side = heading.is_horizontal();
    hits.sort_by(|a, b| {
        let da = (a.x - p.x).powi(2) + (a.y - p.y).powi(2);
        let db = (b.x - p.x).powi(2) + (b.y - p.y).powi(2);
        da.total_cmp(&db)
    });
    hits.into_iter()
        .find(|i| if horizontal_side { (p.y - i.y).abs() < 0.1 } else { (p.x - i.x).abs() < 0.1 })
        .unwrap_or(p)
}

/// Move a point sitting off a corner of a box-like `el` onto the nearer of
/// the two adjacent sides, [`FIXED_BINDING_DISTANCE`] out.
#[must_use]
pub fn avoid_rectangular_corner(el: &Element, p: Point) -> Point {
    let center = Point::new(el.x + el.width / 2.0, el.y + el.height / 2.0);
    let r = p.rotate_around(center, -el.angle);
    let d = FIXED_BINDING_DISTANCE;
    let (left, top, right, bottom) = (el.x, el.y, el.x + el.width, el.y + el.height);
    let snapped = if r.x < left && r.y < top {
        if r.y - top > -d { Point::new(left - d, top) } else { Point::new(left, top - d) }
    } else if r.x < left && r.y > bottom {
        if r.x - left > -d { Point::new(left, bottom + d) } else { Point::new(left - d, bottom) }
    } else if r.x > right && r.y > bottom {
        if r.x - left < el.width + d { Point::new(right, bottom + d) } else { Point::new(right + d, bottom) }
    } else if r.x > right && r.y < top {
        if r.x - left < el.width + d { Point::new(right, top - d) } else { Point::new(right + d, top) }
    } else {
        return p;
    };
    snapped.rotate_around(center, el.angle)
}

/// Snap `p` to the midpoint of a side of `el` when it is within a size
/// dependent tolerance of that midpoint.
#[must_use]
pub fn snap_to_mid(el: &Element, p: Point) -> Point {
    let (x, y, w, h) = (el.x, el.y, el.width, el.height);
    let center = Point::new(x + w / 2.0 - 0.1, y + h / 2.0 - 0.1);
    let r = p.rotate_around(center, -el.angle);
    let vertical = (SNAP_TO_MID_TOLERANCE * h).clamp(SNAP_TO_MID_MIN, SNAP_TO_MID_MAX);
    let horizontal = (SNAP_TO_MID_TOLERANCE * w).clamp(SNAP_TO_MID_MIN, SNAP_TO_MID_MAX);
    let near_mid_y = r.y > center.y - vertical && r.y < center.y + vertical;
    let near_mid_x = r.x > center.x - horizontal && r.x < center.x + horizontal;

    let snapped = if r.x <= x + w / 2.0 && near_mid_y {
        Point::new(x - FIXED_BINDING_DISTANCE, center.y)
    } else if r.y <= y + h / 2.0 && near_mid_x {
        Point::new(center.x, y - FIXED_BINDING_DISTANCE)
    } else if r.x >= x + w / 2.0 && near_mid_y {
        Point::new(x + w + FIXED_BINDING_DISTANCE, center.y)
    } else if r.y >= y + h / 2.0 && near_mid_x {
        Point::new(center.x, y + h + FIXED_BINDING_DISTANCE)
    } else {
        return p;
    };
    snapped.rotate_around(center, el.angle)
}

// =============================================================================
// Fixed points
// =============================================================================

/// Nudge exact-center coordinates off 0.5 so the side stays unambiguous.
#[must_use]
pub fn normalize_fixed_point(p: Point) -> Point {
    let nudge = |v: f64| if v == FIXED_POINT_CENTER { FIXED_POINT_CENTER_NUDGED } else { v };
    Point::new(nudge(p.x), nudge(p.y))
}

/// Normalized anchor of the endpoint at `end` of an elbow arrow inside `target`'s box.
#[must_use]
pub fn calculate_fixed_point_for_elbow_arrow_binding(arrow: &Element, target: &Element, end: Endpoint) -> Point {
    let edge = global_point(arrow, endpoint_index(arrow, end)).unwrap_or_default();
    let snapped = snap_point_to_outline(target, edge);
    let mid = Point::new(target.x + target.width / 2.0, target.y + target.height / 2.0);
    let r = snapped.rotate_around(mid, -target.angle);
    normalize_fixed_point(Point::new(
        finite_or((r.x - target.x) / target.width, FIXED_POINT_CENTER),
        finite_or((r.y - target.y) / target.height, FIXED_POINT_CENTER),
    ))
}

/// Scene position of a normalized anchor inside `el`.
#[must_use]
pub fn global_fixed_point(fixed: Point, el: &Element) -> Point {
    let f = normalize_fixed_point(fixed);
    let mid = Point::new(el.x + el.width / 2.0, el.y + el.height / 2.0);
    Point::new(el.x + el.width * f.x, el.y + el.height * f.y).rotate_around(mid, el.angle)
}

// =============================================================================
// Bound point
// =============================================================================

/// Binding with its gap scaled for `target` being resized to `new_size`.
#[must_use]
pub fn max_gap_when_scaling(target: &Element, binding: PointBinding, new_size: Option<(f64, f64)>) -> PointBinding {
    let Some((w, h)) = new_size else {
        return binding;
    };
    let ratio = if w < h { w / target.width } else { h / target.height };
    let gap = max_binding_gap(target, w, h, 1.0).min(binding.gap * ratio).max(1.0);
    PointBinding { gap: finite_or(gap, binding.gap), ..binding }
}

/// New local position of the endpoint at `end` of `arrow` bound to `target`.
///
/// `None` when the end is unbound, or when the binding names another
/// element on an arrow with more than two points.
#[must_use]
pub fn update_bound_point(
    arrow: &Element,
    end: Endpoint,
    binding: Option<&PointBinding>,
    target: &Element,
) -> Option<Point> {
    let binding = binding?;
    let points = arrow.linear()?.points.len();
    if binding.element_id != target.id && points > 2 {
        return None;
    }

    if arrow.is_elbow_arrow() {
        if let Some(fixed) = binding.fixed_point {
            return Some(local_point(arrow, global_fixed_point(fixed, target)));
        }
    }

    let adjacent = global_point(arrow, adjacent_index(arrow, end))?;
    let focus_point = determine_focus_point(target, binding.focus, adjacent);
    let edge = if binding.gap == 0.0 {
        focus_point
    } else {
        intersect_element_with_line(target, adjacent, focus_point, binding.gap)
            .first()
            .copied()
            .unwrap_or(focus_point)
    };
    Some(local_point(arrow, edge))
}
