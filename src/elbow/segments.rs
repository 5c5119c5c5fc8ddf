//! Incremental elbow-arrow edits that keep pinned segments in place.

#[cfg(test)]
#[path = "segments_test.rs"]
mod segments_test;

use tracing::warn;

use super::route::{ArrowState, ElbowArrowData, elbow_arrow_data, routed_corners};
use super::{ElbowOptions, absolute_points, clamp_point, normalize_arrow_update, validate_elbow_points};
use crate::consts::DEDUP_THRESHOLD;
use crate::element::{Element, ElementUpdate, FixedSegment, LinearData};
use crate::geometry::Point;
use crate::heading::Heading;
use crate::store::Scene;

fn points_only(linear: &LinearData) -> ElementUpdate {
    ElementUpdate { points: Some(linear.points.clone()), ..ElementUpdate::default() }
}

fn is_positive(heading: Heading) -> bool {
    matches!(heading, Heading::Right | Heading::Down)
}

/// `p` with one coordinate taken from `from`: y for a horizontal leg, x otherwise.
fn align(p: Point, from: Point, horizontal: bool) -> Point {
    if horizontal { Point::new(p.x, from.y) } else { Point::new(from.x, p.y) }
}

// =============================================================================
// Renormalization
// =============================================================================

/// Merge consecutive segments running the same way and drop segments shorter
/// than the dedup threshold, keeping pinned segment indices in step. Falls
/// back to a full route when no interior pinned segment survives.
pub(super) fn renormalize(arrow: &Element, linear: &LinearData, scene: &Scene, opts: ElbowOptions) -> ElementUpdate {
    if linear.fixed_segments.is_empty() {
        return ElementUpdate {
            x: Some(arrow.x),
            y: Some(arrow.y),
            points: Some(linear.points.clone()),
            fixed_segments: Some(Vec::new()),
            start_is_special: Some(linear.start_is_special),
            end_is_special: Some(linear.end_is_special),
            ..ElementUpdate::default()
        };
    }

    let mut fixed = linear.fixed_segments.clone();
    let origin = Point::new(arrow.x, arrow.y);
    let points = absolute_points(arrow, linear);

    let mut merged: Vec<Point> = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        if i >= 2 && Heading::for_point(p, points[i - 1]) == Heading::for_point(points[i - 1], points[i - 2]) {
            let previous = fixed.iter().position(|s| s.index == i - 1);
            if let Some(current) = fixed.iter().position(|s| s.index == i) {
                fixed[current].start = points[i - 2] - origin;
            }
            if let Some(previous) = previous {
                fixed.remove(previous);
            }
            merged.pop();
            for s in &mut fixed {
                if s.index > i - 1 {
                    s.index -= 1;
                }
            }
        }
        merged.push(p);
    }

    let mut next: Vec<Point> = Vec::with_capacity(merged.len());
    for (i, &p) in merged.iter().enumerate() {
        if i >= 3 && merged[i - 2].distance(merged[i - 1]) < DEDUP_THRESHOLD {
            let before_previous = fixed.iter().position(|s| s.index == i - 2);
            let previous = fixed.iter().position(|s| s.index == i - 1);
            if let Some(previous) = previous {
                fixed.remove(previous);
            }
            if let Some(before_previous) = before_previous {
                if before_previous < fixed.len() {
                    fixed.remove(before_previous);
                }
            }
            next.truncate(next.len().saturating_sub(2));
            for s in &mut fixed {
                if s.index > i - 2 {
                    s.index -= 2;
                }
            }
            let horizontal = Heading::for_point(p, merged[i - 1]).is_horizontal();
            next.push(align(p, merged[i - 2], horizontal));
            continue;
        }
        next.push(p);
    }

    let last = next.len().saturating_sub(1);
    fixed.retain(|s| s.index != 1 && s.index != last);
    if fixed.is_empty() {
        let local: Vec<Point> = next.iter().map(|&p| p - origin).collect();
        let data = elbow_arrow_data(&ArrowState::of(arrow), scene, &local, false, opts.zoom, opts.padding);
        let corners = routed_corners(linear.start_binding.is_some(), &data);
        return normalize_arrow_update(&corners, fixed, false, false);
    }

    if !validate_elbow_points(&next) {
        warn!(id = %arrow.id, "renormalized elbow arrow has diagonal segments");
    }
    normalize_arrow_update(&next, fixed, linear.start_is_special, linear.end_is_special)
}

// =============================================================================
// Segment release
// =============================================================================

/// Re-route the stretch between the pinned neighbours of the segment that
/// was unpinned, keeping the points outside that stretch.
pub(super) fn release(
    arrow: &Element,
    linear: &LinearData,
    fixed: &[FixedSegment],
    scene: &Scene,
    opts: ElbowOptions,
) -> ElementUpdate {
    let old = &linear.fixed_segments;
    let Some(released) = old.iter().position(|s| !fixed.iter().any(|n| n.index == s.index)) else {
        return points_only(linear);
    };
    let released_index = old[released].index;
    let prev = released.checked_sub(1).and_then(|i| old.get(i)).copied();
    let next = old.get(released + 1).copied();
    let points = &linear.points;
    let last = points.len() - 1;

    let origin = Point::new(arrow.x, arrow.y);
    let sub_origin = origin + prev.map_or(Point::origin(), |s| s.end);
    let state = ArrowState {
        x: sub_origin.x,
        y: sub_origin.y,
        start_binding: if prev.is_some() { None } else { linear.start_binding },
        end_binding: if next.is_some() { None } else { linear.end_binding },
        start_arrowhead: false,
        end_arrowhead: false,
    };
    let sub_end = origin + next.map_or(points[last], |s| s.start) - sub_origin;
    let data = elbow_arrow_data(&state, scene, &[Point::origin(), sub_end], false, opts.zoom, opts.padding);
    let restored = routed_corners(linear.start_binding.is_some(), &data);
    let restored_origin = restored.first().copied().unwrap_or_default();

    let mut next_points: Vec<Point> = Vec::with_capacity(points.len() + restored.len());
    if let Some(prev) = prev {
        next_points.extend(points.iter().take(prev.index).map(|&p| origin + p));
    }
    next_points.extend(restored.iter().map(|&p| sub_origin + clamp_point(p - restored_origin)));
    if let Some(next) = next {
        next_points.extend(points.iter().skip(next.index).map(|&p| origin + p));
    }

    let replaced = next.map_or(points.len(), |s| s.index).saturating_sub(prev.map_or(0, |s| s.index) + 1);
    let mut next_fixed: Vec<FixedSegment> = fixed
        .iter()
        .map(|&s| {
            if s.index > released_index {
                FixedSegment { index: (s.index + restored.len()).saturating_sub(1 + replaced), ..s }
            } else {
                s
            }
        })
        .collect();

    let mut simplified = Vec::with_capacity(next_points.len());
    for (i, &p) in next_points.iter().enumerate() {
        if i > 0 && i + 1 < next_points.len() {
            let incoming = Heading::for_point(p, next_points[i - 1]);
            let outgoing = Heading::for_point(next_points[i + 1], p);
            if incoming == outgoing {
                for s in &mut next_fixed {
                    if s.index > i {
                        s.index -= 1;
                    }
                }
                continue;
            }
            if incoming == outgoing.flip() {
                for s in &mut next_fixed {
                    if s.index > i {
                        s.index += 1;
                    }
                }
                simplified.extend([p, p]);
                continue;
            }
        }
        simplified.push(p);
    }

    normalize_arrow_update(&simplified, next_fixed, false, false)
}

// =============================================================================
// Segment move
// =============================================================================

/// Splice the segment the user is dragging into the current points.
///
/// Moving the first or last segment of an arrow bound at that end inserts a
/// new leg so the arrow still leaves the shape perpendicular to it.
pub(super) fn segment_move(
    arrow: &Element,
    linear: &LinearData,
    mut fixed: Vec<FixedSegment>,
    data: &ElbowArrowData<'_>,
    padding: f64,
) -> ElementUpdate {
    let old = &linear.fixed_segments;
    let active = fixed.iter().enumerate().find_map(|(i, s)| match old.get(i) {
        Some(o) if o.index == s.index => {
            let moved_x = s.start.x != o.start.x && s.end.x != o.end.x;
            let moved_y = s.start.y != o.start.y && s.end.y != o.end.y;
            (moved_x != moved_y).then_some(i)
        }
        _ => Some(i),
    });
    let Some(active) = active else {
        return points_only(linear);
    };
    let points = &linear.points;
    let last = points.len() - 1;
    if fixed[active].index == 0 || fixed[active].index > last {
        return points_only(linear);
    }

    let first_pinned = old.iter().any(|s| s.index == 1);
    let last_pinned = old.iter().any(|s| s.index == last);
    let length = fixed[active].start.distance(fixed[active].end);
    let too_short = length < padding + 5.0;
    let leg = |positive: bool| {
        let d = if too_short { length / 2.0 } else { padding };
        if positive { d } else { -d }
    };

    if !first_pinned && fixed[active].index == 1 && data.hovered_start.is_some() {
        let horizontal = data.start_heading.is_horizontal();
        let d = leg(is_positive(data.start_heading));
        let s = &mut fixed[active].start;
        if horizontal {
            s.x += d;
        } else {
            s.y += d;
        }
    }
    if !last_pinned && fixed[active].index == last && data.hovered_end.is_some() {
        let horizontal = data.end_heading.is_horizontal();
        let d = leg(is_positive(data.end_heading));
        let e = &mut fixed[active].end;
        if horizontal {
            e.x += d;
        } else {
            e.y += d;
        }
    }

    let origin = Point::new(arrow.x, arrow.y);
    let mut next_fixed: Vec<FixedSegment> =
        fixed.iter().map(|s| FixedSegment { index: s.index, start: origin + s.start, end: origin + s.end }).collect();
    let mut new_points = absolute_points(arrow, linear);

    let start_idx = next_fixed[active].index - 1;
    let end_idx = next_fixed[active].index;
    let start = next_fixed[active].start;
    let end = next_fixed[active].end;

    let prev_horizontal = start_idx
        .checked_sub(1)
        .filter(|&i| new_points[i] != new_points[start_idx])
        .map(|i| Heading::for_point(new_points[i], new_points[start_idx]).is_horizontal());
    let next_horizontal = (end_idx + 1 < new_points.len() && new_points[end_idx] != new_points[end_idx + 1])
        .then(|| Heading::for_point(new_points[end_idx + 1], new_points[end_idx]).is_horizontal());

    if let Some(horizontal) = prev_horizontal {
        new_points[start_idx - 1] = align(new_points[start_idx - 1], start, horizontal);
    }
    new_points[start_idx] = start;
    new_points[end_idx] = end;
    if let Some(horizontal) = next_horizontal {
        new_points[end_idx + 1] = align(new_points[end_idx + 1], end, horizontal);
    }

    if let Some(i) = next_fixed.iter().position(|s| s.index == start_idx) {
        let horizontal = Heading::for_point(next_fixed[i].end, next_fixed[i].start).is_horizontal();
        next_fixed[i].start = align(next_fixed[i].start, start, horizontal);
        next_fixed[i].end = start;
    }
    if let Some(i) = next_fixed.iter().position(|s| s.index == end_idx + 1) {
        let horizontal = Heading::for_point(next_fixed[i].end, next_fixed[i].start).is_horizontal();
        next_fixed[i].end = align(next_fixed[i].end, end, horizontal);
        next_fixed[i].start = end;
    }

    if !first_pinned && start_idx == 0 {
        let first = origin + points[0];
        let horizontal = if data.hovered_start.is_some() {
            data.start_heading.is_horizontal()
        } else {
            Heading::for_point(new_points[1], new_points[0]).is_horizontal()
        };
        new_points.insert(0, if horizontal { Point::new(start.x, first.y) } else { Point::new(first.x, start.y) });
        if data.hovered_start.is_some() {
            new_points.insert(0, first);
        }
        let shift = if data.hovered_start.is_some() { 2 } else { 1 };
        for s in &mut next_fixed {
            s.index += shift;
        }
    }

    if !last_pinned && end_idx == last {
        let final_point = origin + points[last];
        let horizontal = data.end_heading.is_horizontal();
        new_points.push(if horizontal {
            Point::new(end.x, final_point.y)
        } else {
            Point::new(final_point.x, end.y)
        });
        if data.hovered_end.is_some() {
            new_points.push(final_point);
        }
    }

    let local_fixed =
        next_fixed.iter().map(|s| FixedSegment { index: s.index, start: s.start - origin, end: s.end - origin }).collect();
    normalize_arrow_update(&new_points, local_fixed, false, false)
}

// =============================================================================
// Endpoint drag
// =============================================================================

/// Keep the interior points and rebuild the first and last legs for moved
/// endpoints. A bound end whose leg would run along the shape gets an extra
/// bend `padding` in front of the shape and becomes "special".
pub(super) fn endpoint_drag(
    arrow: &Element,
    linear: &LinearData,
    updated: &[Point],
    fixed: &[FixedSegment],
    data: &ElbowArrowData<'_>,
    padding: f64,
) -> ElementUpdate {
    let mut start_special = linear.start_is_special;
    let mut end_special = linear.end_is_special;
    let origin = Point::new(arrow.x, arrow.y);
    let count = updated.len();
    let global: Vec<Point> = updated
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 || i + 1 == count {
                origin + p
            } else {
                origin + linear.points.get(i).copied().unwrap_or(p)
            }
        })
        .collect();
    let pick = |i: usize| global[i.min(count - 1)];
    let mut indices: Vec<usize> = fixed.iter().map(|s| s.index).collect();

    let offset = 2 + usize::from(start_special);
    let end_offset = 2 + usize::from(end_special);
    let middle: Vec<Point> = (offset..count.saturating_sub(end_offset)).map(|i| global[i]).collect();

    let sg = data.start_global;
    let mut front = vec![sg];
    {
        let second = pick(if start_special { 2 } else { 1 });
        let third = pick(if start_special { 3 } else { 2 });
        let start_horizontal = data.start_heading.is_horizontal();
        let second_horizontal = Heading::from_vector(second - third).is_horizontal();
        if data.hovered_start.is_some() && start_horizontal == second_horizontal {
            let d = if is_positive(data.start_heading) { padding } else { -padding };
            front.push(if start_horizontal { Point::new(sg.x + d, sg.y) } else { Point::new(sg.x, sg.y + d) });
            front.push(if second_horizontal { Point::new(sg.x + d, third.y) } else { Point::new(third.x, sg.y + d) });
            if !start_special {
                start_special = true;
                for index in &mut indices {
                    if *index > 1 {
                        *index += 1;
                    }
                }
            }
        } else {
            front.push(if second_horizontal { Point::new(sg.x, second.y) } else { Point::new(second.x, sg.y) });
            if start_special {
                start_special = false;
                for index in &mut indices {
                    if *index > 1 {
                        *index -= 1;
                    }
                }
            }
        }
    }

    let eg = data.end_global;
    let mut back = Vec::with_capacity(3);
    {
        let second_last = pick(count.saturating_sub(if end_special { 3 } else { 2 }));
        let third_last = pick(count.saturating_sub(if end_special { 4 } else { 3 }));
        let end_horizontal = data.end_heading.is_horizontal();
        let second_horizontal = Heading::for_point(third_last, second_last).is_horizontal();
        if data.hovered_end.is_some() && end_horizontal == second_horizontal {
            let d = if is_positive(data.end_heading) { padding } else { -padding };
            back.push(if second_horizontal { Point::new(eg.x + d, third_last.y) } else { Point::new(third_last.x, eg.y + d) });
            back.push(if end_horizontal { Point::new(eg.x + d, eg.y) } else { Point::new(eg.x, eg.y + d) });
            end_special = true;
        } else {
            back.push(if second_horizontal {
                Point::new(eg.x, second_last.y)
            } else {
                Point::new(second_last.x, eg.y)
            });
            end_special = false;
        }
    }
    back.push(eg);

    let mut new_points = front;
    new_points.extend(middle);
    new_points.extend(back);

    let next_fixed = indices
        .into_iter()
        .filter_map(|index| {
            let start = *new_points.get(index.checked_sub(1)?)?;
            let end = *new_points.get(index)?;
            Some(FixedSegment { index, start: start - sg, end: end - sg })
        })
        .collect();
    normalize_arrow_update(&new_points, next_fixed, start_special, end_special)
}
