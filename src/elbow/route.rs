//! Route data for an elbow arrow: snapped endpoints, headings, the two
//! dynamic routing boxes, and the grid route between the dongles in front of
//! each end.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use tracing::{trace, warn};

use super::astar::{Grid, astar};
use crate::binding::{
    avoid_rectangular_corner, global_fixed_point, heading_for_elbow_arrow_snap, hovered_element_for_binding,
    snap_point_to_outline, snap_to_mid,
};
use crate::collision::{distance_to_bindable, is_point_in_shape};
use crate::consts::{ARROWHEAD_STANDOFF, DEDUP_THRESHOLD, FIXED_BINDING_DISTANCE, PLAIN_STANDOFF};
use crate::element::{Element, ElementId, PointBinding};
use crate::geometry::{Bounds, Point};
use crate::heading::Heading;
use crate::store::Scene;

/// The parts of an elbow arrow the router reads. Sub-routes are computed
/// for synthetic states that share the arrow's bindings only partially.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrowState {
    pub x: f64,
    pub y: f64,
    pub start_binding: Option<PointBinding>,
    pub end_binding: Option<PointBinding>,
    pub start_arrowhead: bool,
    pub end_arrowhead: bool,
}

impl ArrowState {
    pub fn of(arrow: &Element) -> Self {
        let linear = arrow.linear();
        Self {
            x: arrow.x,
            y: arrow.y,
            start_binding: linear.and_then(|l| l.start_binding),
            end_binding: linear.and_then(|l| l.end_binding),
            start_arrowhead: linear.is_some_and(|l| l.start_arrowhead.is_some()),
            end_arrowhead: linear.is_some_and(|l| l.end_arrowhead.is_some()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElbowArrowData<'a> {
    pub dynamic_aabbs: [Bounds; 2],
    pub start_dongle: Point,
    pub start_global: Point,
    pub start_heading: Heading,
    pub end_dongle: Point,
    pub end_global: Point,
    pub end_heading: Heading,
    pub common_bounds: Bounds,
    pub hovered_start: Option<&'a Element>,
    pub hovered_end: Option<&'a Element>,
}

/// Live bindable element behind `id`.
pub(crate) fn bindable_element(scene: &Scene, id: ElementId) -> Option<&Element> {
    scene.get_non_deleted(&id).filter(|el| el.is_bindable())
}

fn standoff(arrowhead: bool) -> f64 {
    if arrowhead { ARROWHEAD_STANDOFF } else { PLAIN_STANDOFF }
}

fn point_box(p: Point) -> Bounds {
    Bounds::new(p.x - 2.0, p.y - 2.0, p.x + 2.0, p.y + 2.0)
}

/// Box offsets `[up, right, down, left]` with `head` on the side `heading`
/// points to and `side` everywhere else.
#[must_use]
pub(crate) fn offset_from_heading(heading: Heading, head: f64, side: f64) -> [f64; 4] {
    match heading {
        Heading::Up => [head, side, side, side],
        Heading::Right => [side, head, side, side],
        Heading::Down => [side, side, head, side],
        Heading::Left => [side, side, side, head],
    }
}

/// Route inputs for `state` with its local endpoints taken from `next_points`.
///
/// While dragging, the ends bind to whatever they hover; otherwise to the
/// elements their bindings name.
pub(crate) fn elbow_arrow_data<'a>(
    state: &ArrowState,
    scene: &'a Scene,
    next_points: &[Point],
    is_dragging: bool,
    zoom: f64,
    padding: f64,
) -> ElbowArrowData<'a> {
    let origin = Point::new(state.x, state.y);
    let orig_start = origin + next_points.first().copied().unwrap_or_default();
    let orig_end = origin + next_points.last().copied().unwrap_or_default();

    let (hovered_start, hovered_end) = if is_dragging {
        (
            hovered_element_for_binding(scene, orig_start, zoom, true, true),
            hovered_element_for_binding(scene, orig_end, zoom, true, true),
        )
    } else {
        (
            state.start_binding.and_then(|b| bindable_element(scene, b.element_id)),
            state.end_binding.and_then(|b| bindable_element(scene, b.element_id)),
        )
    };

    let start_global = endpoint_position(
        hovered_start,
        state.start_binding.and_then(|b| b.fixed_point),
        orig_start,
        is_dragging,
    );
    let end_global =
        endpoint_position(hovered_end, state.end_binding.and_then(|b| b.fixed_point), orig_end, is_dragging);
    let start_heading = bind_point_heading(start_global, end_global, hovered_start, orig_start);
    let end_heading = bind_point_heading(end_global, start_global, hovered_end, orig_end);

    let start_point_bounds = point_box(start_global);
    let end_point_bounds = point_box(end_global);
    let start_element_bounds = hovered_start.map_or(start_point_bounds, |el| {
        el.aabb().expand(offset_from_heading(start_heading, standoff(state.start_arrowhead), 1.0))
    });
    let end_element_bounds = hovered_end.map_or(end_point_bounds, |el| {
        el.aabb().expand(offset_from_heading(end_heading, standoff(state.end_arrowhead), 1.0))
    });

    let bounds_overlap = hovered_end
        .map_or(end_point_bounds, |el| el.aabb().expand(offset_from_heading(end_heading, padding, padding)))
        .contains_strict(start_global)
        || hovered_start
            .map_or(start_point_bounds, |el| el.aabb().expand(offset_from_heading(start_heading, padding, padding)))
            .contains_strict(end_global);

    let (a, b) = if bounds_overlap {
        (start_point_bounds, end_point_bounds)
    } else {
        (start_element_bounds, end_element_bounds)
    };
    let common_bounds = a.union(&b);
    let both_unbound = hovered_start.is_none() && hovered_end.is_none();
    let difference = |heading: Heading, arrowhead: bool| {
        if bounds_overlap {
            offset_from_heading(heading, if both_unbound { 0.0 } else { padding }, 0.0)
        } else {
            offset_from_heading(heading, if both_unbound { 0.0 } else { padding - standoff(arrowhead) }, padding)
        }
    };
    let dynamic_aabbs = generate_dynamic_aabbs(
        a,
        b,
        common_bounds,
        difference(start_heading, state.start_arrowhead),
        difference(end_heading, state.end_arrowhead),
        bounds_overlap,
        hovered_start.map(Element::aabb),
        hovered_end.map(Element::aabb),
    );

    ElbowArrowData {
        start_dongle: dongle_position(&dynamic_aabbs[0], start_heading, start_global),
        end_dongle: dongle_position(&dynamic_aabbs[1], end_heading, end_global),
        dynamic_aabbs,
        start_global,
        start_heading,
        end_global,
        end_heading,
        common_bounds,
        hovered_start,
        hovered_end,
    }
}

fn outline_snap(el: &Element, p: Point) -> Point {
    let p = if el.kind.is_rectanguloid() { avoid_rectangular_corner(el, p) } else { p };
    snap_point_to_outline(el, p)
}

/// Scene position of an endpoint.
///
/// A dragged endpoint inside a shape snaps to its outline (and to an edge
/// midpoint when close). A resting bound endpoint sits on its fixed point
/// unless a resize moved that off the outline, in which case it snaps again.
fn endpoint_position(el: Option<&Element>, fixed_point: Option<Point>, initial: Point, is_dragging: bool) -> Point {
    if is_dragging {
        return match el {
            Some(el) if is_point_in_shape(el, initial) => snap_to_mid(el, outline_snap(el, initial)),
            _ => initial,
        };
    }
    let Some(el) = el else {
        return initial;
    };
    let fixed = global_fixed_point(fixed_point.unwrap_or_default(), el);
    if (distance_to_bindable(el, fixed) - FIXED_BINDING_DISTANCE).abs() > 0.01 {
        outline_snap(el, initial)
    } else {
        fixed
    }
}

fn bind_point_heading(p: Point, other: Point, el: Option<&Element>, orig: Point) -> Heading {
    let target = el.map(|el| (el, el.aabb().inflate(distance_to_bindable(el, p))));
    heading_for_elbow_arrow_snap(p, other, target, orig, 1.0)
}

/// Point where the route leaves (or enters) the routing box along `heading`.
fn dongle_position(bounds: &Bounds, heading: Heading, p: Point) -> Point {
    match heading {
        Heading::Up => Point::new(p.x, bounds.min_y),
        Heading::Right => Point::new(bounds.max_x, p.y),
        Heading::Down => Point::new(p.x, bounds.max_y),
        Heading::Left => Point::new(bounds.min_x, p.y),
    }
}

// =============================================================================
// Dynamic boxes
// =============================================================================

fn edges(b: &Bounds) -> [f64; 4] {
    [b.min_x, b.min_y, b.max_x, b.max_y]
}

fn from_edges([min_x, min_y, max_x, max_y]: [f64; 4]) -> Bounds {
    Bounds::new(min_x, min_y, max_x, max_y)
}

/// Two boxes around the start (`a`) and end (`b`) that grow towards each
/// other until they touch halfway, each keeping at least its static extent
/// plus the per-side `[up, right, down, left]` differences.
///
/// When the ends sit diagonally and the boxes would overlap on both axes,
/// the overlap is split along the axis that keeps the end box's corner
/// clear, unless `disable_side_hack` is set.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
pub(crate) fn generate_dynamic_aabbs(
    a: Bounds,
    b: Bounds,
    common: Bounds,
    start_difference: [f64; 4],
    end_difference: [f64; 4],
    disable_side_hack: bool,
    start_element: Option<Bounds>,
    end_element: Option<Bounds>,
) -> [Bounds; 2] {
    let s = edges(&start_element.unwrap_or(a));
    let e = edges(&end_element.unwrap_or(b));
    let c = edges(&common);
    let [start_up, start_right, start_down, start_left] = start_difference;
    let [end_up, end_right, end_down, end_left] = end_difference;
    let a = edges(&a);
    let b = edges(&b);

    let first = [
        if a[0] > b[2] {
            if a[1] > b[3] || a[3] < b[1] {
                f64::min(f64::midpoint(s[0], e[2]), a[0] - start_left)
            } else {
                f64::midpoint(s[0], e[2])
            }
        } else if a[0] > b[0] {
            a[0] - start_left
        } else {
            c[0] - start_left
        },
        if a[1] > b[3] {
            if a[0] > b[2] || a[2] < b[0] {
                f64::min(f64::midpoint(s[1], e[3]), a[1] - start_up)
            } else {
                f64::midpoint(s[1], e[3])
            }
        } else if a[1] > b[1] {
            a[1] - start_up
        } else {
            c[1] - start_up
        },
        if a[2] < b[0] {
            if a[1] > b[3] || a[3] < b[1] {
                f64::max(f64::midpoint(s[2], e[0]), a[2] + start_right)
            } else {
                f64::midpoint(s[2], e[0])
            }
        } else if a[2] < b[2] {
            a[2] + start_right
        } else {
            c[2] + start_right
        },
        if a[3] < b[1] {
            if a[0] > b[2] || a[2] < b[0] {
                f64::max(f64::midpoint(s[3], e[1]), a[3] + start_down)
            } else {
                f64::midpoint(s[3], e[1])
            }
        } else if a[3] < b[3] {
            a[3] + start_down
        } else {
            c[3] + start_down
        },
    ];
    let second = [
        if b[0] > a[2] {
            if b[1] > a[3] || b[3] < a[1] {
                f64::min(f64::midpoint(e[0], s[2]), b[0] - end_left)
            } else {
                f64::midpoint(e[0], s[2])
            }
        } else if b[0] > a[0] {
            b[0] - end_left
        } else {
            c[0] - end_left
        },
        if b[1] > a[3] {
            if b[0] > a[2] || b[2] < a[0] {
                f64::min(f64::midpoint(e[1], s[3]), b[1] - end_up)
            } else {
                f64::midpoint(e[1], s[3])
            }
        } else if b[1] > a[1] {
            b[1] - end_up
        } else {
            c[1] - end_up
        },
        if b[2] < a[0] {
            if b[1] > a[3] || b[3] < a[1] {
                f64::max(f64::midpoint(e[2], s[0]), b[2] + end_right)
            } else {
                f64::midpoint(e[2], s[0])
            }
        } else if b[2] < a[2] {
            b[2] + end_right
        } else {
            c[2] + end_right
        },
        if b[3] < a[1] {
            if b[0] > a[2] || b[2] < a[0] {
                f64::max(f64::midpoint(e[3], s[1]), b[3] + end_down)
            } else {
                f64::midpoint(e[3], s[1])
            }
        } else if b[3] < a[3] {
            b[3] + end_down
        } else {
            c[3] + end_down
        },
    ];

    let both = from_edges(first).union(&from_edges(second));
    let overlapping = first[2] - first[0] + second[2] - second[0] > both.width() + 1e-11
        && first[3] - first[1] + second[3] - second[1] > both.height() + 1e-11;
    if !disable_side_hack && overlapping {
        let end_center = Point::new(f64::midpoint(second[0], second[2]), f64::midpoint(second[1], second[3]));
        let cross = |p: Point, q: Point| (p - end_center).cross(q - end_center) > 0.0;
        let split_x = |x: f64, start_left_of_end: bool| {
            if start_left_of_end {
                [from_edges([first[0], first[1], x, first[3]]), from_edges([x, second[1], second[2], second[3]])]
            } else {
                [from_edges([x, first[1], first[2], first[3]]), from_edges([second[0], second[1], x, second[3]])]
            }
        };
        let split_y = |y: f64, start_above_end: bool| {
            if start_above_end {
                [from_edges([first[0], first[1], first[2], y]), from_edges([second[0], y, second[2], second[3]])]
            } else {
                [from_edges([first[0], y, first[2], first[3]]), from_edges([second[0], second[1], second[2], y])]
            }
        };

        if b[0] > a[2] && a[1] > b[3] {
            // End is up and to the right.
            let cx = first[2] + (second[0] - first[2]) / 2.0;
            let cy = second[3] + (first[1] - second[3]) / 2.0;
            return if cross(Point::new(a[2], a[1]), Point::new(a[0], a[3])) {
                split_x(cx, true)
            } else {
                split_y(cy, false)
            };
        } else if a[2] < b[0] && a[3] < b[1] {
            // End is down and to the right.
            let cx = first[2] + (second[0] - first[2]) / 2.0;
            let cy = first[3] + (second[1] - first[3]) / 2.0;
            return if cross(Point::new(a[0], a[1]), Point::new(a[2], a[3])) {
                split_y(cy, true)
            } else {
                split_x(cx, true)
            };
        } else if a[0] > b[2] && a[3] < b[1] {
            // End is down and to the left.
            let cx = second[2] + (first[0] - second[2]) / 2.0;
            let cy = first[3] + (second[1] - first[3]) / 2.0;
            return if cross(Point::new(a[2], a[1]), Point::new(a[0], a[3])) {
                split_x(cx, false)
            } else {
                split_y(cy, true)
            };
        } else if a[0] > b[2] && a[1] > b[3] {
            // End is up and to the left.
            let cx = second[2] + (first[0] - second[2]) / 2.0;
            let cy = second[3] + (first[1] - second[3]) / 2.0;
            return if cross(Point::new(a[0], a[1]), Point::new(a[2], a[3])) {
                split_x(cx, false)
            } else {
                split_y(cy, false)
            };
        }
    }

    [from_edges(first), from_edges(second)]
}

// =============================================================================
// Grid route
// =============================================================================

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Grid lines: every box edge, the common bounds, and the endpoint
/// coordinate across each end's heading.
fn calculate_grid(
    aabbs: &[Bounds; 2],
    start: Point,
    start_heading: Heading,
    end: Point,
    end_heading: Heading,
    common: &Bounds,
) -> Grid {
    let mut columns = Vec::new();
    let mut rows = Vec::new();
    for (p, heading) in [(start, start_heading), (end, end_heading)] {
        if heading.is_horizontal() {
            rows.push(p.y);
        } else {
            columns.push(p.x);
        }
    }
    for aabb in aabbs.iter().chain(std::iter::once(common)) {
        columns.extend([aabb.min_x, aabb.max_x]);
        rows.extend([aabb.min_y, aabb.max_y]);
    }
    Grid::new(&sorted_unique(columns), &sorted_unique(rows))
}

/// Raw grid route from the start point to the end point through both
/// dongles, or `None` when no route exists.
pub(crate) fn route_elbow_arrow(start_bound: bool, data: &ElbowArrowData<'_>) -> Option<Vec<Point>> {
    let mut grid = calculate_grid(
        &data.dynamic_aabbs,
        data.start_dongle,
        data.start_heading,
        data.end_dongle,
        data.end_heading,
        &data.common_bounds,
    );

    let start_dongle = grid.find(data.start_dongle);
    let end_dongle = grid.find(data.end_dongle);
    let end_node = grid.find(data.end_global);
    if let Some(node) = end_node {
        if data.hovered_end.is_some() {
            grid.nodes[node].closed = true;
        }
    }
    let start_node = grid.find(data.start_global);
    if let Some(node) = start_node {
        if start_bound {
            grid.nodes[node].closed = true;
        }
    }

    let dongle_overlap = match (start_dongle, end_dongle) {
        (Some(s), Some(e)) => {
            data.dynamic_aabbs[1].contains_strict(grid.nodes[s].pos)
                || data.dynamic_aabbs[0].contains_strict(grid.nodes[e].pos)
        }
        _ => false,
    };
    let obstacles: &[Bounds] = if dongle_overlap { &[] } else { &data.dynamic_aabbs };

    let from = start_dongle.or(start_node)?;
    let to = end_dongle.or(end_node)?;
    let mut path = astar(&mut grid, from, to, data.start_heading, data.end_heading, obstacles)?;
    if start_dongle.is_some() {
        path.insert(0, data.start_global);
    }
    if end_dongle.is_some() {
        path.push(data.end_global);
    }
    trace!(columns = grid.cols, rows = grid.rows, points = path.len(), "routed elbow arrow");
    Some(path)
}

/// Full route simplified to its corners. Falls back to a single bend when
/// the grid search finds nothing.
pub(crate) fn routed_corners(start_bound: bool, data: &ElbowArrowData<'_>) -> Vec<Point> {
    if let Some(route) = route_elbow_arrow(start_bound, data) {
        return corner_points(remove_short_segments(route));
    }
    warn!(start = ?data.start_global, end = ?data.end_global, "no elbow route found, using a single bend");
    let (s, e) = (data.start_global, data.end_global);
    if s.x == e.x || s.y == e.y {
        vec![s, e]
    } else {
        vec![s, Point::new(e.x, s.y), e]
    }
}

// =============================================================================
// Simplification
// =============================================================================

/// Drop interior points closer than the dedup threshold to their predecessor.
/// Routes of fewer than four points are left alone.
#[must_use]
pub(crate) fn remove_short_segments(points: Vec<Point>) -> Vec<Point> {
    if points.len() < 4 {
        return points;
    }
    let last = points.len() - 1;
    (0..points.len())
        .filter(|&i| i == 0 || i == last || points[i - 1].distance(points[i]) > DEDUP_THRESHOLD)
        .map(|i| points[i])
        .collect()
}

/// Keep only the endpoints and the points where the route turns.
#[must_use]
pub(crate) fn corner_points(points: Vec<Point>) -> Vec<Point> {
    if points.len() <= 1 {
        return points;
    }
    let horizontal = |a: Point, b: Point| (a.y - b.y).abs() < (a.x - b.x).abs();
    let last = points.len() - 1;
    let mut previous = horizontal(points[0], points[1]);
    let mut kept = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        if i == 0 || i == last {
            kept.push(p);
            continue;
        }
        let next = horizontal(p, points[i + 1]);
        if previous != next {
            kept.push(p);
        }
        previous = next;
    }
    kept
}
