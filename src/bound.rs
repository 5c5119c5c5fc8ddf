//! Bound-element geometry updater.
//!
//! Keeps arrows attached to the shapes they are bound to. User mutations
//! queue changed bindables in the store's dirty set; [`flush`] drains it once
//! per gesture and runs one pass over each changed element's dependents,
//! writing through the updater path so the pass never feeds itself.
//!
//! Also repairs back-references after deletion, restoration and duplication.

#[cfg(test)]
#[path = "bound_test.rs"]
mod bound_test;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::binding::{max_gap_when_scaling, update_bound_point};
use crate::consts::{BASE_PADDING, BOUND_TEXT_PADDING};
use crate::elbow::{ElbowOptions, elbow_arrow_update};
use crate::element::{BoundElement, BoundKind, Element, ElementId, ElementKind, ElementUpdate, Endpoint, PointBinding};
use crate::geometry::Point;
use crate::linear::{endpoint_index, move_points_update};
use crate::store::Scene;
use crate::text::reposition_bound_text;

#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions<'a> {
    /// Elements moving in the same gesture. Their arrows only get fresh
    /// bindings; their points already moved with them.
    pub simultaneously_updated: &'a [ElementId],
    /// Size the changed element is being resized to, for gap scaling.
    pub new_size: Option<(f64, f64)>,
    pub zoom: f64,
    pub text_padding: f64,
    pub elbow_padding: f64,
}

impl Default for UpdateOptions<'_> {
    fn default() -> Self {
        Self {
            simultaneously_updated: &[],
            new_size: None,
            zoom: 1.0,
            text_padding: BOUND_TEXT_PADDING,
            elbow_padding: BASE_PADDING,
        }
    }
}

impl UpdateOptions<'_> {
    fn elbow(&self) -> ElbowOptions {
        ElbowOptions { is_dragging: false, zoom: self.zoom, padding: self.elbow_padding }
    }
}

// =============================================================================
// Routed writes
// =============================================================================

/// [`Scene::mutate`] that routes elbow arrows through the elbow router first.
pub fn mutate_element(scene: &mut Scene, id: &ElementId, update: &ElementUpdate, opts: ElbowOptions) -> bool {
    let Some(el) = scene.get_non_deleted(id) else {
        return false;
    };
    let routed = elbow_arrow_update(el, scene, update, opts);
    scene.mutate(id, &routed)
}

/// [`Scene::mutate_derived`] that routes elbow arrows through the elbow router first.
pub fn mutate_element_derived(scene: &mut Scene, id: &ElementId, update: &ElementUpdate, opts: ElbowOptions) -> bool {
    let Some(el) = scene.get_non_deleted(id) else {
        return false;
    };
    let routed = elbow_arrow_update(el, scene, update, opts);
    scene.mutate_derived(id, &routed)
}

// =============================================================================
// Geometry pass
// =============================================================================

/// Re-derive every arrow bound to `changed_id` from its stored focus and gap
/// against the element's current box, then re-center the arrows' labels.
pub fn update_bound_elements(scene: &mut Scene, changed_id: ElementId, opts: &UpdateOptions<'_>) {
    let Some(changed) = scene.get_non_deleted(&changed_id).filter(|el| el.is_bindable()).cloned() else {
        return;
    };
    let arrows: Vec<ElementId> =
        changed.bound_elements.iter().filter(|b| b.kind == BoundKind::Arrow).map(|b| b.id).collect();

    for arrow_id in arrows {
        let Some(arrow) = scene.get_non_deleted(&arrow_id).filter(|el| el.is_linear()).cloned() else {
            continue;
        };
        let Some(linear) = arrow.linear() else {
            continue;
        };
        let scaled = |binding: Option<PointBinding>| {
            binding
                .filter(|b| b.element_id == changed_id)
                .map(|b| max_gap_when_scaling(&changed, b, opts.new_size))
        };
        let start = scaled(linear.start_binding);
        let end = scaled(linear.end_binding);
        if start.is_none() && end.is_none() {
            continue;
        }

        if opts.simultaneously_updated.contains(&arrow_id) {
            let update = ElementUpdate {
                start_binding: start.map(Some),
                end_binding: end.map(Some),
                ..ElementUpdate::default()
            };
            scene.mutate_derived(&arrow_id, &update);
            continue;
        }

        let targets: Vec<(usize, Point)> = [(Endpoint::Start, start), (Endpoint::End, end)]
            .into_iter()
            .filter_map(|(end, binding)| {
                let binding = binding?;
                let p = update_bound_point(&arrow, end, Some(&binding), &changed)?;
                Some((endpoint_index(&arrow, end), p))
            })
            .collect();
        let mut update = move_points_update(&arrow, &targets);
        update.start_binding = start.map(Some);
        update.end_binding = end.map(Some);
        let update = elbow_arrow_update(&arrow, scene, &update, opts.elbow());
        if scene.mutate_derived(&arrow_id, &update) {
            debug!(%arrow_id, %changed_id, "updated bound arrow");
        }
        reposition_bound_text(scene, arrow_id, opts.text_padding);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlushOptions {
    pub zoom: f64,
    pub text_padding: f64,
    pub elbow_padding: f64,
}

impl Default for FlushOptions {
    fn default() -> Self {
        Self { zoom: 1.0, text_padding: BOUND_TEXT_PADDING, elbow_padding: BASE_PADDING }
    }
}

/// Drain the scene's dirty set and bring every dependent up to date in one
/// pass. `moved` lists elements the gesture moved as a whole; arrows among
/// them (or in the dirty set) only get their bindings refreshed.
///
/// Returns the drained ids.
pub fn flush(scene: &mut Scene, moved: &[ElementId], opts: FlushOptions) -> Vec<ElementId> {
    let dirty = scene.take_dirty();
    if dirty.is_empty() {
        return dirty;
    }
    let mut batch: Vec<ElementId> = moved.to_vec();
    batch.extend(dirty.iter().filter(|id| !moved.contains(id)));
    let update_opts = UpdateOptions {
        simultaneously_updated: &batch,
        new_size: None,
        zoom: opts.zoom,
        text_padding: opts.text_padding,
        elbow_padding: opts.elbow_padding,
    };

    let mut deleted = Vec::new();
    for id in &dirty {
        let Some(el) = scene.get(id) else {
            warn!(%id, "dirty element vanished from the scene");
            continue;
        };
        if el.is_deleted {
            deleted.push(*id);
            continue;
        }
        let (bindable, labelled) = (el.is_bindable(), el.bound_text_id().is_some());
        if bindable {
            update_bound_elements(scene, *id, &update_opts);
        }
        if labelled {
            reposition_bound_text(scene, *id, opts.text_padding);
        }
    }
    fix_bindings_after_deletion(scene, &deleted);
    debug!(count = dirty.len(), deleted = deleted.len(), "flushed bound elements");
    dirty
}

// =============================================================================
// Deletion / restoration
// =============================================================================

/// Ids `el` refers to: its container and its binding targets.
fn referenced_ids(el: &Element) -> Vec<ElementId> {
    let mut ids: Vec<ElementId> = el.container_id().into_iter().collect();
    if let Some(l) = el.linear() {
        ids.extend(l.start_binding.map(|b| b.element_id));
        ids.extend(l.end_binding.map(|b| b.element_id));
    }
    ids.dedup();
    ids
}

/// Fields of `dependent` that point at `target`, cleared.
fn unbind_update(dependent: &Element, target: ElementId) -> ElementUpdate {
    let mut update = ElementUpdate::default();
    if let Some(l) = dependent.linear() {
        if l.start_binding.is_some_and(|b| b.element_id == target) {
            update.start_binding = Some(None);
        }
        if l.end_binding.is_some_and(|b| b.element_id == target) {
            update.end_binding = Some(None);
        }
    }
    if dependent.container_id() == Some(target) {
        update.container_id = Some(None);
    }
    update
}

/// Cut every link between the `deleted` elements and live elements.
///
/// Live elements an arrow or label referred to drop it from their
/// `bound_elements`; live arrows and labels listed by a deleted element lose
/// the binding or container reference to it.
pub fn fix_bindings_after_deletion(scene: &mut Scene, deleted: &[ElementId]) {
    for id in deleted {
        let Some(el) = scene.get(id).cloned() else {
            continue;
        };
        for target in referenced_ids(&el) {
            let Some(t) = scene.get_non_deleted(&target).filter(|t| t.lists_bound(*id)) else {
                continue;
            };
            let remaining: Vec<BoundElement> = t.bound_elements.iter().copied().filter(|b| b.id != *id).collect();
            scene.mutate_derived(&target, &ElementUpdate::bound_elements(remaining));
        }
        for b in &el.bound_elements {
            let Some(dependent) = scene.get_non_deleted(&b.id) else {
                continue;
            };
            let update = unbind_update(dependent, *id);
            if update != ElementUpdate::default() {
                debug!(dependent_id = %b.id, deleted_id = %id, "unbound from deleted element");
                scene.mutate_derived(&b.id, &update);
            }
        }
    }
}

/// Re-establish back-references of restored elements, healing whatever
/// no longer resolves.
///
/// A restored arrow or label whose target is gone loses the reference;
/// otherwise the target lists it again, except that a container keeps at
/// most one label. A restored bindable drops dead entries and keeps only its
/// last listed label.
pub fn rebind_affected(scene: &mut Scene, restored: &[ElementId]) {
    for id in restored {
        rebind_bound_side(scene, *id);
        rebind_bindable_side(scene, *id);
    }
}

fn rebind_bound_side(scene: &mut Scene, id: ElementId) {
    let Some(el) = scene.get_non_deleted(&id).cloned() else {
        return;
    };
    let kind = if el.kind == ElementKind::Text { BoundKind::Text } else { BoundKind::Arrow };
    for target_id in referenced_ids(&el) {
        let Some(target) = scene.get_non_deleted(&target_id) else {
            warn!(%id, %target_id, "restored element refers to a missing element");
            scene.mutate_derived(&id, &unbind_update(&el, target_id));
            continue;
        };
        if target.lists_bound(id) {
            continue;
        }
        let mut bound = target.bound_elements.clone();
        if kind == BoundKind::Text && bound.iter().any(|b| b.kind == BoundKind::Text) {
            scene.mutate_derived(&id, &ElementUpdate { container_id: Some(None), ..ElementUpdate::default() });
            continue;
        }
        bound.push(BoundElement { id, kind });
        scene.mutate_derived(&target_id, &ElementUpdate::bound_elements(bound));
    }
}

fn rebind_bindable_side(scene: &mut Scene, id: ElementId) {
    let Some(el) = scene.get_non_deleted(&id) else {
        return;
    };
    let listed = el.bound_elements.clone();
    let last_text = listed.iter().rev().find(|b| b.kind == BoundKind::Text).map(|b| b.id);
    let mut kept = Vec::with_capacity(listed.len());
    for b in listed {
        let Some(dependent) = scene.get_non_deleted(&b.id) else {
            continue;
        };
        if dependent.kind == ElementKind::Text {
            if Some(b.id) == last_text {
                if dependent.container_id() != Some(id) {
                    scene.mutate_derived(&b.id, &ElementUpdate { container_id: Some(Some(id)), ..ElementUpdate::default() });
                }
            } else {
                if dependent.container_id().is_some() {
                    scene.mutate_derived(&b.id, &ElementUpdate { container_id: Some(None), ..ElementUpdate::default() });
                }
                continue;
            }
        }
        kept.push(b);
    }
    scene.mutate_derived(&id, &ElementUpdate::bound_elements(kept));
}

// =============================================================================
// Duplication
// =============================================================================

/// Relink bindings after `old_ids` were duplicated per `old_to_new`.
///
/// Links inside the duplicated set follow the duplicates. A duplicated arrow
/// bound to an element outside the set stays bound to it, and that element
/// lists the duplicate too; a duplicated shape does not take over arrows from
/// outside the set.
///
/// With `duplicates_serve_as_old` (alt-drag, where the originals move away
/// and the duplicates stay put) links to elements outside the set move over
/// to the duplicates instead.
pub fn fix_bindings_after_duplication(
    scene: &mut Scene,
    old_ids: &[ElementId],
    old_to_new: &HashMap<ElementId, ElementId>,
    duplicates_serve_as_old: bool,
) {
    let new_to_old: HashMap<ElementId, ElementId> = old_to_new.iter().map(|(&o, &n)| (n, o)).collect();
    let mut arrows: Vec<ElementId> = Vec::new();
    let mut bindables: Vec<ElementId> = Vec::new();

    for old_id in old_ids {
        let (Some(&new_id), Some(old)) = (old_to_new.get(old_id), scene.get(old_id)) else {
            continue;
        };
        if !old.bound_elements.is_empty() {
            if duplicates_serve_as_old {
                arrows.extend(old.bound_elements.iter().filter(|b| !old_to_new.contains_key(&b.id)).map(|b| b.id));
            }
            bindables.push(new_id);
        }
        if let Some(l) = old.linear() {
            let targets = [l.start_binding, l.end_binding];
            if duplicates_serve_as_old {
                bindables.extend(targets.iter().flatten().map(|b| b.element_id).filter(|t| !old_to_new.contains_key(t)));
            }
            if targets.iter().any(Option::is_some) {
                arrows.push(new_id);
            }
        }
    }
    let mut seen = HashSet::new();
    arrows.retain(|id| seen.insert(*id));
    seen.clear();
    bindables.retain(|id| seen.insert(*id));

    let remap = |b: Option<PointBinding>| {
        b.map(|b| PointBinding { element_id: old_to_new.get(&b.element_id).copied().unwrap_or(b.element_id), ..b })
    };
    for id in &arrows {
        let Some(arrow) = scene.get(id) else {
            continue;
        };
        let Some(l) = arrow.linear() else {
            continue;
        };
        let (start, end) = (remap(l.start_binding), remap(l.end_binding));
        let update = ElementUpdate { start_binding: Some(start), end_binding: Some(end), ..ElementUpdate::default() };
        scene.mutate(id, &update);
        if duplicates_serve_as_old {
            continue;
        }
        for target_id in [start, end].iter().flatten().map(|b| b.element_id) {
            let Some(target) = scene.get_non_deleted(&target_id).filter(|t| !t.lists_bound(*id)) else {
                continue;
            };
            let mut bound = target.bound_elements.clone();
            bound.push(BoundElement::arrow(*id));
            scene.mutate(&target_id, &ElementUpdate::bound_elements(bound));
        }
    }

    for id in &bindables {
        let source = new_to_old.get(id).copied().unwrap_or(*id);
        let Some(listed) = scene.get(&source).map(|el| el.bound_elements.clone()) else {
            continue;
        };
        let duplicated = |b: &BoundElement| old_to_new.get(&b.id).map(|&n| BoundElement { id: n, kind: b.kind });
        let next: Vec<BoundElement> = if source == *id {
            let mut next = listed.clone();
            next.extend(listed.iter().filter_map(duplicated).filter(|b| !listed.contains(b)));
            next
        } else if duplicates_serve_as_old {
            listed.iter().map(|b| duplicated(b).unwrap_or(*b)).collect()
        } else {
            listed.iter().filter_map(duplicated).collect()
        };
        scene.mutate(id, &ElementUpdate::bound_elements(next));
    }

    if duplicates_serve_as_old {
        for old_id in old_ids.iter().filter(|id| old_to_new.contains_key(id)) {
            let Some(old) = scene.get(old_id) else {
                continue;
            };
            let kept: Vec<BoundElement> =
                old.bound_elements.iter().copied().filter(|b| old_to_new.contains_key(&b.id)).collect();
            scene.mutate(old_id, &ElementUpdate::bound_elements(kept));
        }
    }
}
