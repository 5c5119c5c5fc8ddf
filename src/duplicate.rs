//! Element duplication.
//!
//! Copies a selection with fresh ids, keeping labels with their containers
//! and frame children with their frames, then relinks bindings among the
//! copies and normalizes the z-order.

#[cfg(test)]
#[path = "duplicate_test.rs"]
mod duplicate_test;

use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use crate::bound::fix_bindings_after_duplication;
use crate::element::{Element, ElementId, ElementKind, GroupId};
use crate::geometry::Point;
use crate::ordering::normalize_scene_order;
use crate::store::Scene;
use crate::text::bind_text_to_shape_after_duplication;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateOptions {
    /// Added to every copy's position.
    pub offset: Point,
    /// Alt-drag: the originals are about to move away, so the copies go
    /// underneath them and take over links to elements outside the selection.
    pub alt_drag: bool,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self { offset: Point::new(10.0, 10.0), alt_drag: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Duplication {
    /// Original id to copy id.
    pub old_to_new: HashMap<ElementId, ElementId>,
    /// Copies in z-order.
    pub new_ids: Vec<ElementId>,
}

impl Duplication {
    /// Copies of the originals the caller asked for, labels and frame
    /// children excluded. This is the selection after duplicating.
    #[must_use]
    pub fn selection(&self, requested: &[ElementId]) -> Vec<ElementId> {
        requested.iter().filter_map(|id| self.old_to_new.get(id).copied()).collect()
    }
}

/// `ids` plus labels of containers, containers of labels and frame children.
fn expand_selection(scene: &Scene, ids: &[ElementId]) -> HashSet<ElementId> {
    let mut set: HashSet<ElementId> = ids.iter().copied().filter(|id| scene.get_non_deleted(id).is_some()).collect();
    let frames: HashSet<ElementId> = set
        .iter()
        .filter_map(|id| scene.get(id))
        .filter(|el| el.kind == ElementKind::Frame)
        .map(|el| el.id)
        .collect();
    set.extend(scene.non_deleted().filter(|el| el.frame_id.is_some_and(|f| frames.contains(&f))).map(|el| el.id));

    let related: Vec<ElementId> = set
        .iter()
        .filter_map(|id| scene.get(id))
        .flat_map(|el| el.bound_text_id().into_iter().chain(el.container_id()))
        .filter(|id| scene.get_non_deleted(id).is_some())
        .collect();
    set.extend(related);
    set
}

/// Groups every live member of which is being copied get a fresh id.
fn group_map(scene: &Scene, set: &HashSet<ElementId>) -> HashMap<GroupId, GroupId> {
    let mut map = HashMap::new();
    for el in set.iter().filter_map(|id| scene.get(id)) {
        for g in &el.group_ids {
            if map.contains_key(g) {
                continue;
            }
            let whole = scene.non_deleted().filter(|m| m.group_ids.contains(g)).all(|m| set.contains(&m.id));
            if whole {
                map.insert(*g, Uuid::new_v4());
            }
        }
    }
    map
}

/// Duplicate `ids` and insert the copies next to the originals.
pub fn duplicate_elements(scene: &mut Scene, ids: &[ElementId], opts: DuplicateOptions) -> Duplication {
    normalize_scene_order(scene);
    let set = expand_selection(scene, ids);
    if set.is_empty() {
        return Duplication::default();
    }
    let groups = group_map(scene, &set);

    let originals: Vec<Element> = scene.elements().iter().filter(|el| set.contains(&el.id)).cloned().collect();
    let old_to_new: HashMap<ElementId, ElementId> = originals.iter().map(|el| (el.id, Uuid::new_v4())).collect();
    let old_ids: Vec<ElementId> = originals.iter().map(|el| el.id).collect();
    let clock = scene.clock();

    let copies: Vec<Element> = originals
        .iter()
        .map(|orig| {
            let mut copy = orig.clone();
            copy.id = old_to_new[&orig.id];
            copy.duplicate_of = Some(orig.id);
            copy.x += opts.offset.x;
            copy.y += opts.offset.y;
            copy.group_ids = orig.group_ids.iter().map(|g| groups.get(g).copied().unwrap_or(*g)).collect();
            copy.frame_id = orig.frame_id.map(|f| old_to_new.get(&f).copied().unwrap_or(f));
            copy.version = 1;
            copy.version_nonce = rand::random();
            copy.updated = clock;
            copy
        })
        .collect();

    let indices = old_ids.iter().filter_map(|id| scene.index_of(id));
    let mut at = if opts.alt_drag { indices.min().unwrap_or(0) } else { indices.max().map_or(0, |i| i + 1) };
    let new_ids: Vec<ElementId> = copies.iter().map(|el| el.id).collect();
    for copy in copies {
        scene.insert_at(at, copy);
        at += 1;
    }

    fix_bindings_after_duplication(scene, &old_ids, &old_to_new, opts.alt_drag);
    bind_text_to_shape_after_duplication(scene, &old_ids, &old_to_new);
    normalize_scene_order(scene);
    debug!(count = new_ids.len(), alt_drag = opts.alt_drag, "duplicated elements");

    let new_ids = scene.elements().iter().map(|el| el.id).filter(|id| new_ids.contains(id)).collect();
    Duplication { old_to_new, new_ids }
}
