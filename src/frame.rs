//! Frame membership and frame-aware deletion.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use std::collections::HashSet;

use tracing::debug;

use crate::bound::fix_bindings_after_deletion;
use crate::element::{Element, ElementId, ElementKind, ElementUpdate, GroupId};
use crate::error::SceneError;
use crate::ordering::normalize_scene_order;
use crate::store::Scene;

/// Live elements whose `frame_id` is `frame_id`, in z-order.
#[must_use]
pub fn get_frame_children(scene: &Scene, frame_id: ElementId) -> Vec<&Element> {
    scene.non_deleted().filter(|el| el.frame_id == Some(frame_id)).collect()
}

/// The live frame `el` belongs to, if any.
#[must_use]
pub fn get_containing_frame<'s>(scene: &'s Scene, el: &Element) -> Option<&'s Element> {
    el.frame_id.and_then(|id| scene.get_non_deleted(&id)).filter(|f| f.kind == ElementKind::Frame)
}

/// Outermost groups of `ids` that also hold a frame.
fn groups_holding_frames(scene: &Scene, ids: &[ElementId]) -> HashSet<GroupId> {
    let outermost: HashSet<GroupId> =
        ids.iter().filter_map(|id| scene.get_non_deleted(id)).filter_map(|el| el.group_ids.last().copied()).collect();
    scene
        .non_deleted()
        .filter(|el| el.kind == ElementKind::Frame)
        .flat_map(|f| f.group_ids.iter().copied())
        .filter(|g| outermost.contains(g))
        .collect()
}

fn set_frame(scene: &mut Scene, id: ElementId, frame_id: Option<ElementId>) -> bool {
    scene.mutate(&id, &ElementUpdate { frame_id: Some(frame_id), ..ElementUpdate::default() })
}

/// Put `ids` and their labels into `frame_id`. Returns the ids that changed.
///
/// Frames are never nested. Elements whose own frame is also in `ids` keep
/// their membership, and so do groups that hold a frame.
pub fn add_elements_to_frame(
    scene: &mut Scene,
    ids: &[ElementId],
    frame_id: ElementId,
) -> Result<Vec<ElementId>, SceneError> {
    let frame = scene.get(&frame_id).ok_or(SceneError::NotFound(frame_id))?;
    if frame.is_deleted {
        return Err(SceneError::Deleted(frame_id));
    }
    if frame.kind != ElementKind::Frame {
        return Err(SceneError::NotFrame(frame_id));
    }

    let supplied: HashSet<ElementId> = ids.iter().copied().collect();
    let rejected_groups = groups_holding_frames(scene, ids);
    let mut to_add: Vec<ElementId> = Vec::new();
    for id in ids {
        let Some(el) = scene.get_non_deleted(id) else {
            continue;
        };
        if el.kind == ElementKind::Frame
            || el.group_ids.last().is_some_and(|g| rejected_groups.contains(g))
            || el.frame_id.is_some_and(|f| f != frame_id && supplied.contains(&f))
        {
            continue;
        }
        if el.frame_id != Some(frame_id) {
            to_add.push(el.id);
        }
        let label = el.bound_text_id().and_then(|t| scene.get_non_deleted(&t));
        if let Some(label) = label.filter(|t| !supplied.contains(&t.id) && t.frame_id != Some(frame_id)) {
            to_add.push(label.id);
        }
    }

    let changed: Vec<ElementId> = to_add.into_iter().filter(|id| set_frame(scene, *id, Some(frame_id))).collect();
    if !changed.is_empty() {
        debug!(%frame_id, count = changed.len(), "added elements to frame");
        normalize_scene_order(scene);
    }
    Ok(changed)
}

/// Take `ids` and their labels out of whatever frame holds them.
pub fn remove_elements_from_frame(scene: &mut Scene, ids: &[ElementId]) -> Vec<ElementId> {
    let mut to_remove: Vec<ElementId> = Vec::new();
    for id in ids {
        let Some(el) = scene.get_non_deleted(id).filter(|el| el.frame_id.is_some()) else {
            continue;
        };
        to_remove.push(el.id);
        to_remove.extend(el.bound_text_id());
    }
    let changed: Vec<ElementId> = to_remove.into_iter().filter(|id| set_frame(scene, *id, None)).collect();
    if !changed.is_empty() {
        debug!(count = changed.len(), "removed elements from frames");
        normalize_scene_order(scene);
    }
    changed
}

// =============================================================================
// Deletion
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deletion {
    /// Elements tombstoned by this call, labels included.
    pub deleted: Vec<ElementId>,
    /// Selection afterwards: children released from deleted frames.
    pub selected: Vec<ElementId>,
}

/// Delete the selection `ids`.
///
/// Deleting a frame keeps its children: they leave the frame and become the
/// new selection. Labels of deleted containers stay as free text, and every
/// binding to a deleted element is cut.
pub fn delete_elements(scene: &mut Scene, ids: &[ElementId]) -> Deletion {
    let selected: HashSet<ElementId> = ids.iter().copied().collect();
    let frames: HashSet<ElementId> = ids
        .iter()
        .filter_map(|id| scene.get_non_deleted(id))
        .filter(|el| el.kind == ElementKind::Frame)
        .map(|el| el.id)
        .collect();
    let in_deleted_frame = |el: &Element| el.frame_id.is_some_and(|f| frames.contains(&f));

    let mut doomed: Vec<ElementId> = Vec::new();
    let mut released: Vec<ElementId> = Vec::new();
    let mut outcome = Deletion::default();
    for el in scene.non_deleted() {
        let container = el.container_id().and_then(|c| scene.get_non_deleted(&c));
        if in_deleted_frame(el) || container.is_some_and(|c| in_deleted_frame(c)) {
            released.push(el.id);
            if container.is_none() {
                outcome.selected.push(el.id);
            }
        } else if selected.contains(&el.id) {
            doomed.push(el.id);
        }
    }

    for id in &released {
        set_frame(scene, *id, None);
    }
    for id in doomed {
        if scene.delete(&id) {
            outcome.deleted.push(id);
        }
    }
    fix_bindings_after_deletion(scene, &outcome.deleted);
    normalize_scene_order(scene);
    debug!(deleted = outcome.deleted.len(), released = released.len(), "deleted elements");
    outcome
}
