#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::binding::bind_linear_element;
use crate::element::{BoundElement, Endpoint};
use crate::geometry::Point;

fn frame() -> Element {
    Element::frame(0.0, 0.0, 500.0, 500.0)
}

fn rect() -> Element {
    Element::rectangle(10.0, 10.0, 50.0, 50.0)
}

fn labelled() -> (Element, Element) {
    let container = rect();
    let text = Element::text(0.0, 0.0, "x").with_container(container.id);
    let container = container.with_bound_elements(vec![BoundElement::text(text.id)]);
    (container, text)
}

fn frame_of(scene: &Scene, id: ElementId) -> Option<ElementId> {
    scene.get(&id).unwrap().frame_id
}

// =============================================================================
// Membership
// =============================================================================

#[test]
fn added_elements_bring_their_labels_and_precede_the_frame() {
    let f = frame();
    let r = rect();
    let (container, label) = labelled();
    let (fid, rid, cid, tid) = (f.id, r.id, container.id, label.id);
    let mut scene = Scene::from_elements(vec![f, r, container, label]);

    let changed = add_elements_to_frame(&mut scene, &[rid, cid], fid).unwrap();

    assert_eq!(changed, vec![rid, cid, tid]);
    for id in [rid, cid, tid] {
        assert_eq!(frame_of(&scene, id), Some(fid));
    }
    let order: Vec<ElementId> = scene.elements().iter().map(|el| el.id).collect();
    assert_eq!(order, vec![rid, cid, tid, fid]);
    assert_eq!(get_frame_children(&scene, fid).len(), 3);
}

#[test]
fn adding_existing_children_changes_nothing() {
    let f = frame();
    let r = rect().with_frame(f.id);
    let (fid, rid) = (f.id, r.id);
    let mut scene = Scene::from_elements(vec![r, f]);
    assert!(add_elements_to_frame(&mut scene, &[rid], fid).unwrap().is_empty());
}

#[test]
fn frames_are_not_nested() {
    let f = frame();
    let other = frame();
    let child = rect().with_frame(other.id);
    let (fid, oid, child_id) = (f.id, other.id, child.id);
    let mut scene = Scene::from_elements(vec![f, child, other]);

    let changed = add_elements_to_frame(&mut scene, &[oid, child_id], fid).unwrap();

    assert!(changed.is_empty());
    assert_eq!(frame_of(&scene, oid), None);
    assert_eq!(frame_of(&scene, child_id), Some(oid));
}

#[test]
fn adding_to_a_non_frame_fails() {
    let r = rect();
    let rid = r.id;
    let mut scene = Scene::from_elements(vec![r]);
    let err = add_elements_to_frame(&mut scene, &[rid], rid).unwrap_err();
    assert!(matches!(err, SceneError::NotFrame(id) if id == rid));
}

#[test]
fn removal_releases_labels_too() {
    let f = frame();
    let (container, label) = labelled();
    let (container, label) = (container.with_frame(f.id), label.with_frame(f.id));
    let (fid, cid, tid) = (f.id, container.id, label.id);
    let mut scene = Scene::from_elements(vec![container, label, f]);

    assert_eq!(remove_elements_from_frame(&mut scene, &[cid]), vec![cid, tid]);
    assert_eq!(frame_of(&scene, cid), None);
    assert_eq!(frame_of(&scene, tid), None);
    assert!(get_frame_children(&scene, fid).is_empty());
}

#[test]
fn containing_frame_resolves_live_frames_only() {
    let f = frame();
    let r = rect().with_frame(f.id);
    let (fid, rid) = (f.id, r.id);
    let mut scene = Scene::from_elements(vec![r, f]);
    let child = scene.get(&rid).unwrap().clone();
    assert_eq!(get_containing_frame(&scene, &child).map(|f| f.id), Some(fid));
    scene.delete(&fid);
    assert!(get_containing_frame(&scene, &child).is_none());
}

// =============================================================================
// Deletion
// =============================================================================

#[test]
fn deleting_a_frame_releases_and_selects_its_children() {
    let f = frame();
    let r = rect().with_frame(f.id);
    let (container, label) = labelled();
    let (container, label) = (container.with_frame(f.id), label.with_frame(f.id));
    let (fid, rid, cid, tid) = (f.id, r.id, container.id, label.id);
    let mut scene = Scene::from_elements(vec![r, container, label, f]);

    let outcome = delete_elements(&mut scene, &[fid]);

    assert_eq!(outcome.deleted, vec![fid]);
    assert_eq!(outcome.selected, vec![rid, cid]);
    for id in [rid, cid, tid] {
        let el = scene.get(&id).unwrap();
        assert!(!el.is_deleted);
        assert_eq!(el.frame_id, None);
    }
}

#[test]
fn selected_children_of_a_deleted_frame_survive() {
    let f = frame();
    let r = rect().with_frame(f.id);
    let (fid, rid) = (f.id, r.id);
    let mut scene = Scene::from_elements(vec![r, f]);

    let outcome = delete_elements(&mut scene, &[fid, rid]);

    assert_eq!(outcome.deleted, vec![fid]);
    assert!(!scene.get(&rid).unwrap().is_deleted);
}

#[test]
fn deleting_a_container_frees_its_label() {
    let (container, label) = labelled();
    let (cid, tid) = (container.id, label.id);
    let mut scene = Scene::from_elements(vec![container, label]);

    let outcome = delete_elements(&mut scene, &[cid]);

    assert_eq!(outcome.deleted, vec![cid]);
    let label = scene.get(&tid).unwrap();
    assert!(!label.is_deleted);
    assert_eq!(label.container_id(), None);
    assert!(outcome.selected.is_empty());
}

#[test]
fn deleting_a_shape_unbinds_its_arrows() {
    let r = Element::rectangle(0.0, 0.0, 100.0, 100.0);
    let a = Element::arrow(-100.0, 25.0, vec![Point::origin(), Point::new(95.0, 0.0)]);
    let (rid, aid) = (r.id, a.id);
    let mut scene = Scene::from_elements(vec![r, a]);
    bind_linear_element(&mut scene, aid, rid, Endpoint::End);
    assert!(scene.get(&aid).unwrap().linear().unwrap().end_binding.is_some());

    delete_elements(&mut scene, &[rid]);

    assert_eq!(scene.get(&aid).unwrap().linear().unwrap().end_binding, None);
}
