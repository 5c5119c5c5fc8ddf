#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::binding::bind_linear_element;
use crate::element::{BoundElement, Endpoint};

fn rect() -> Element {
    Element::rectangle(0.0, 0.0, 100.0, 100.0)
}

fn order(scene: &Scene) -> Vec<ElementId> {
    scene.elements().iter().map(|el| el.id).collect()
}

fn labelled() -> (Element, Element) {
    let container = rect();
    let text = Element::text(0.0, 0.0, "x").with_container(container.id);
    let container = container.with_bound_elements(vec![BoundElement::text(text.id)]);
    (container, text)
}

// =============================================================================
// Copies
// =============================================================================

#[test]
fn copy_gets_fresh_id_and_offset() {
    let (a, b) = (rect(), rect());
    let (aid, bid) = (a.id, b.id);
    let mut scene = Scene::from_elements(vec![a, b]);

    let dup = duplicate_elements(&mut scene, &[aid], DuplicateOptions::default());

    let new_id = dup.old_to_new[&aid];
    assert_ne!(new_id, aid);
    assert_eq!(dup.new_ids, vec![new_id]);
    assert_eq!(dup.selection(&[aid]), vec![new_id]);
    let copy = scene.get(&new_id).unwrap();
    assert_eq!((copy.x, copy.y), (10.0, 10.0));
    assert_eq!(copy.duplicate_of, Some(aid));
    assert_eq!(copy.version, 1);
    assert_eq!(order(&scene), vec![aid, new_id, bid]);
}

#[test]
fn nothing_to_copy() {
    let mut scene = Scene::from_elements(vec![rect()]);
    let dup = duplicate_elements(&mut scene, &[Uuid::new_v4()], DuplicateOptions::default());
    assert!(dup.new_ids.is_empty());
    assert_eq!(scene.len(), 1);
}

#[test]
fn labels_are_copied_with_their_containers() {
    let (container, label) = labelled();
    let (cid, tid) = (container.id, label.id);
    let mut scene = Scene::from_elements(vec![container, label]);

    let dup = duplicate_elements(&mut scene, &[cid], DuplicateOptions::default());

    let (c2, t2) = (dup.old_to_new[&cid], dup.old_to_new[&tid]);
    assert_eq!(order(&scene), vec![cid, tid, c2, t2]);
    assert_eq!(scene.get(&c2).unwrap().bound_elements, vec![BoundElement::text(t2)]);
    assert_eq!(scene.get(&t2).unwrap().container_id(), Some(c2));
    assert_eq!(scene.get(&cid).unwrap().bound_elements, vec![BoundElement::text(tid)]);
    assert_eq!(scene.get(&tid).unwrap().container_id(), Some(cid));
    assert_eq!(dup.selection(&[cid]), vec![c2]);
}

#[test]
fn selecting_a_label_copies_its_container() {
    let (container, label) = labelled();
    let (cid, tid) = (container.id, label.id);
    let mut scene = Scene::from_elements(vec![container, label]);

    let dup = duplicate_elements(&mut scene, &[tid], DuplicateOptions::default());

    assert_eq!(dup.new_ids.len(), 2);
    assert!(dup.old_to_new.contains_key(&cid));
}

// =============================================================================
// Groups and frames
// =============================================================================

#[test]
fn whole_groups_get_new_ids_and_partial_groups_are_shared() {
    let (g, h) = (Uuid::new_v4(), Uuid::new_v4());
    let a = rect().with_group_ids(vec![g]);
    let b = rect().with_group_ids(vec![g]);
    let c = rect().with_group_ids(vec![h]);
    let d = rect().with_group_ids(vec![h]);
    let (aid, bid, cid) = (a.id, b.id, c.id);
    let mut scene = Scene::from_elements(vec![a, b, c, d]);

    let dup = duplicate_elements(&mut scene, &[aid, bid, cid], DuplicateOptions::default());

    let a2 = scene.get(&dup.old_to_new[&aid]).unwrap();
    let b2 = scene.get(&dup.old_to_new[&bid]).unwrap();
    let c2 = scene.get(&dup.old_to_new[&cid]).unwrap();
    assert_ne!(a2.group_ids, vec![g]);
    assert_eq!(a2.group_ids, b2.group_ids);
    assert_eq!(c2.group_ids, vec![h]);
}

#[test]
fn frame_copies_take_their_children() {
    let f = Element::frame(0.0, 0.0, 300.0, 300.0);
    let child = rect().with_frame(f.id);
    let (fid, child_id) = (f.id, child.id);
    let mut scene = Scene::from_elements(vec![child, f]);

    let dup = duplicate_elements(&mut scene, &[fid], DuplicateOptions::default());

    let (f2, child2) = (dup.old_to_new[&fid], dup.old_to_new[&child_id]);
    assert_eq!(scene.get(&child2).unwrap().frame_id, Some(f2));
    assert_eq!(scene.get(&child_id).unwrap().frame_id, Some(fid));
    assert_eq!(order(&scene), vec![child_id, fid, child2, f2]);
}

// =============================================================================
// Bindings
// =============================================================================

fn bound_pair() -> (Scene, ElementId, ElementId) {
    let r = rect();
    let a = Element::arrow(-100.0, 25.0, vec![Point::origin(), Point::new(95.0, 0.0)]);
    let (rid, aid) = (r.id, a.id);
    let mut scene = Scene::from_elements(vec![r, a]);
    bind_linear_element(&mut scene, aid, rid, Endpoint::End);
    (scene, rid, aid)
}

#[test]
fn copied_pair_binds_among_the_copies() {
    let (mut scene, rid, aid) = bound_pair();

    let dup = duplicate_elements(&mut scene, &[rid, aid], DuplicateOptions::default());

    let (r2, a2) = (dup.old_to_new[&rid], dup.old_to_new[&aid]);
    let binding = scene.get(&a2).unwrap().linear().unwrap().end_binding.unwrap();
    assert_eq!(binding.element_id, r2);
    assert_eq!(scene.get(&r2).unwrap().bound_elements, vec![BoundElement::arrow(a2)]);
    assert_eq!(order(&scene), vec![rid, aid, r2, a2]);
}

#[test]
fn alt_drag_copies_go_underneath_and_keep_the_arrows() {
    let (mut scene, rid, aid) = bound_pair();
    let opts = DuplicateOptions { offset: Point::origin(), alt_drag: true };

    let dup = duplicate_elements(&mut scene, &[rid], opts);

    let r2 = dup.old_to_new[&rid];
    assert_eq!(order(&scene), vec![r2, rid, aid]);
    let binding = scene.get(&aid).unwrap().linear().unwrap().end_binding.unwrap();
    assert_eq!(binding.element_id, r2);
    assert!(scene.get(&rid).unwrap().bound_elements.is_empty());
    let copy = scene.get(&r2).unwrap();
    assert_eq!((copy.x, copy.y), (0.0, 0.0));
}
