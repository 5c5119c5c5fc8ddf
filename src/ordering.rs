//! Z-order normalization.
//!
//! Reorders (never edits) the element array so that groups stay contiguous,
//! bound text directly follows its container and frame children directly
//! precede their frame. Elements with no ordering constraint keep their
//! relative order.

#[cfg(test)]
#[path = "ordering_test.rs"]
mod ordering_test;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::element::{BoundKind, Element, ElementId, ElementKind};
use crate::store::Scene;

/// Group pass, then bound-text pass, then frame pass.
#[must_use]
pub fn normalize_element_order(elements: &[Element]) -> Vec<Element> {
    normalized(elements).into_iter().cloned().collect()
}

/// Normalize the scene's order in place. Returns `true` if anything moved.
pub fn normalize_scene_order(scene: &mut Scene) -> bool {
    let ids: Vec<ElementId> = normalized(scene.elements()).iter().map(|el| el.id).collect();
    let moved = scene.reorder(&ids);
    if moved {
        debug!(count = ids.len(), "normalized element order");
    }
    moved
}

fn normalized(elements: &[Element]) -> Vec<&Element> {
    let refs: Vec<&Element> = elements.iter().collect();
    let refs = group_order(&refs);
    let refs = bound_text_order(&refs);
    frame_order(&refs)
}

/// Drop repeats; if the pass lost or gained elements, fall back to its input.
fn checked<'a>(pass: &'static str, input: &[&'a Element], output: Vec<&'a Element>) -> Vec<&'a Element> {
    let mut seen = HashSet::with_capacity(output.len());
    let output: Vec<&Element> = output.into_iter().filter(|el| seen.insert(el.id)).collect();
    if output.len() != input.len() {
        warn!(pass, expected = input.len(), got = output.len(), "order pass changed the element count");
        return input.to_vec();
    }
    output
}

// =============================================================================
// Passes
// =============================================================================

/// Each outermost group becomes one block at the position of its first
/// member; inside a block, members sharing the leading member's group path
/// come first, recursively.
fn group_order<'a>(elements: &[&'a Element]) -> Vec<&'a Element> {
    let mut handled: HashSet<ElementId> = HashSet::new();
    let mut out = Vec::with_capacity(elements.len());
    for (idx, el) in elements.iter().enumerate() {
        if handled.contains(&el.id) {
            continue;
        }
        let Some(outermost) = el.group_ids.last() else {
            out.push(*el);
            continue;
        };
        let members: Vec<&Element> =
            elements[idx..].iter().copied().filter(|m| m.group_ids.contains(outermost)).collect();
        handled.extend(members.iter().map(|m| m.id));
        out.extend(order_inner_groups(members));
    }
    checked("group", elements, out)
}

fn order_inner_groups(mut rest: Vec<&Element>) -> Vec<&Element> {
    let mut out = Vec::with_capacity(rest.len());
    while !rest.is_empty() {
        let path = rest[0].group_ids.clone();
        let (same, other): (Vec<&Element>, Vec<&Element>) =
            rest.into_iter().partition(|el| el.group_ids.starts_with(&path));
        out.extend(same);
        rest = other;
    }
    out
}

/// Labels move to directly after their container. A label whose container
/// does not list it back stays where it is.
fn bound_text_order<'a>(elements: &[&'a Element]) -> Vec<&'a Element> {
    let by_id: HashMap<ElementId, &Element> = elements.iter().map(|el| (el.id, *el)).collect();
    let mut out = Vec::with_capacity(elements.len());
    for el in elements {
        let claimed = el.container_id().and_then(|c| by_id.get(&c)).is_some_and(|c| c.lists_bound(el.id));
        if claimed {
            continue;
        }
        out.push(*el);
        for b in el.bound_elements.iter().filter(|b| b.kind == BoundKind::Text) {
            if let Some(label) = by_id.get(&b.id) {
                out.push(*label);
            }
        }
    }
    checked("bound text", elements, out)
}

/// Children move to directly before their frame. Labels travel with their
/// container.
fn frame_order<'a>(elements: &[&'a Element]) -> Vec<&'a Element> {
    let by_id: HashMap<ElementId, &Element> = elements.iter().map(|el| (el.id, *el)).collect();
    let is_frame = |id: ElementId| by_id.get(&id).is_some_and(|f| f.kind == ElementKind::Frame);
    let owner = |el: &Element| -> Option<ElementId> {
        if el.kind == ElementKind::Frame {
            return None;
        }
        el.frame_id
            .or_else(|| el.container_id().and_then(|c| by_id.get(&c)).and_then(|c| c.frame_id))
            .filter(|f| is_frame(*f))
    };

    let mut out = Vec::with_capacity(elements.len());
    for el in elements {
        if owner(el).is_some() {
            continue;
        }
        if el.kind == ElementKind::Frame {
            out.extend(elements.iter().copied().filter(|c| owner(c) == Some(el.id)));
        }
        out.push(*el);
    }
    checked("frame", elements, out)
}
