//! Scene store and mutation gateway.
//!
//! `Scene` owns every element in z-order (index 0 is the bottom) plus an
//! id→index map. Elements are only handed out by shared reference; all writes
//! go through [`Scene::mutate`] or [`Scene::mutate_derived`], which bump the
//! element's version, draw a new nonce and advance the scene clock.
//!
//! User mutations that move, resize, rotate or delete an element with
//! dependents record it in a dirty set. The bound-element updater drains that
//! set once per gesture and writes its results with `mutate_derived`, which
//! never records dirt, so the updater cannot re-trigger itself.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::element::{Element, ElementId, ElementUpdate};
use crate::error::SceneError;

/// Who issued a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// A gesture or API call; geometry changes are queued for dependents.
    User,
    /// The bound-element updater reacting to earlier mutations.
    Updater,
}

/// Ordered element collection with a scene-wide change clock.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<Element>,
    index: HashMap<ElementId, usize>,
    clock: u64,
    dirty: Vec<ElementId>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from elements in z-order. Later duplicates of an id win.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        let mut scene = Self::new();
        scene.load_snapshot(elements);
        scene
    }

    /// Replace the whole scene. The clock continues from the newest element.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        self.index.clear();
        self.dirty.clear();
        for el in elements {
            self.clock = self.clock.max(el.updated);
            self.push_or_replace(el);
        }
    }

    /// Parse a JSON array of elements.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Snapshot`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        Ok(Self::from_elements(elements))
    }

    /// Serialize all elements, tombstones included, in z-order.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(&self.elements)?)
    }

    // --- Reads ---

    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in z-order, including tombstones.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Non-deleted elements in z-order.
    pub fn non_deleted(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter().filter(|el| !el.is_deleted)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.index.get(id).and_then(|&i| self.elements.get(i))
    }

    /// Lookup that treats tombstones as absent.
    #[must_use]
    pub fn get_non_deleted(&self, id: &ElementId) -> Option<&Element> {
        self.get(id).filter(|el| !el.is_deleted)
    }

    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    // --- Writes ---

    /// Add an element on top of the stack, or replace one with the same id in place.
    pub fn insert(&mut self, el: Element) {
        self.clock += 1;
        self.push_or_replace(el);
    }

    /// Insert `el` directly above the element at `index`.
    pub fn insert_at(&mut self, index: usize, el: Element) {
        if self.contains(&el.id) {
            self.insert(el);
            return;
        }
        let at = index.min(self.elements.len());
        self.clock += 1;
        self.elements.insert(at, el);
        self.rebuild_index();
    }

    /// Apply a user mutation. Returns `false` if the element is missing,
    /// deleted, or the update changes nothing.
    pub fn mutate(&mut self, id: &ElementId, update: &ElementUpdate) -> bool {
        self.apply(id, update, MutationOrigin::User)
    }

    /// Apply a mutation issued by the bound-element updater; never marks dirt.
    pub fn mutate_derived(&mut self, id: &ElementId, update: &ElementUpdate) -> bool {
        self.apply(id, update, MutationOrigin::Updater)
    }

    /// Tombstone an element. Dependents are repaired by the updater.
    pub fn delete(&mut self, id: &ElementId) -> bool {
        self.mutate(id, &ElementUpdate { is_deleted: Some(true), ..ElementUpdate::default() })
    }

    /// Bring a tombstone back. Unlike `mutate`, this accepts deleted elements.
    pub fn restore(&mut self, id: &ElementId) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        if !self.elements[i].is_deleted {
            return false;
        }
        self.elements[i].is_deleted = false;
        self.bump(i);
        self.mark_dirty(*id);
        true
    }

    /// Drain the ids of elements whose geometry changed through user mutations.
    pub fn take_dirty(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.dirty)
    }

    /// Queue an element for the updater without mutating it.
    pub fn mark_dirty(&mut self, id: ElementId) {
        if !self.dirty.contains(&id) {
            self.dirty.push(id);
        }
    }

    /// Reorder elements to match `ids`, which must be a permutation of the scene.
    ///
    /// Returns `false` and leaves the order untouched otherwise.
    pub fn reorder(&mut self, ids: &[ElementId]) -> bool {
        if ids.len() != self.elements.len() {
            warn!(expected = self.elements.len(), got = ids.len(), "reorder size mismatch");
            return false;
        }
        let mut next = Vec::with_capacity(ids.len());
        let mut taken = vec![false; self.elements.len()];
        for id in ids {
            let Some(&i) = self.index.get(id) else {
                warn!(%id, "reorder references unknown element");
                return false;
            };
            if taken[i] {
                warn!(%id, "reorder lists element twice");
                return false;
            }
            taken[i] = true;
            next.push(i);
        }
        if next.iter().enumerate().all(|(pos, &i)| pos == i) {
            return false;
        }
        let mut old: Vec<Option<Element>> = std::mem::take(&mut self.elements).into_iter().map(Some).collect();
        self.elements = next.into_iter().filter_map(|i| old[i].take()).collect();
        self.rebuild_index();
        self.clock += 1;
        true
    }

    /// Write back every element of `preview` whose content differs from this
    /// scene's copy, then adopt the preview's order. Returns the changed ids.
    ///
    /// Versions are bumped here; version fields in the preview are ignored.
    pub fn commit(&mut self, preview: &Scene) -> Vec<ElementId> {
        let mut changed = Vec::new();
        for el in &preview.elements {
            match self.index.get(&el.id).copied() {
                Some(i) => {
                    if !same_content(&self.elements[i], el) {
                        let version = self.elements[i].version;
                        self.elements[i] = el.clone();
                        self.elements[i].version = version;
                        self.bump(i);
                        changed.push(el.id);
                    }
                }
                None => {
                    self.insert(el.clone());
                    changed.push(el.id);
                }
            }
        }
        let order: Vec<ElementId> = preview.elements.iter().map(|el| el.id).collect();
        if order.len() == self.elements.len() {
            self.reorder(&order);
        }
        debug!(count = changed.len(), "committed preview");
        changed
    }

    // --- Internals ---

    fn apply(&mut self, id: &ElementId, update: &ElementUpdate, origin: MutationOrigin) -> bool {
        let Some(&i) = self.index.get(id) else {
            debug!(%id, "mutation of unknown element ignored");
            return false;
        };
        if self.elements[i].is_deleted {
            debug!(%id, "mutation of deleted element ignored");
            return false;
        }
        if !self.elements[i].apply_update(update) {
            return false;
        }
        self.bump(i);
        let el = &self.elements[i];
        let has_dependents = el.is_bindable() || !el.bound_elements.is_empty();
        if origin == MutationOrigin::User && update.touches_geometry() && has_dependents {
            self.mark_dirty(*id);
        }
        true
    }

    fn bump(&mut self, i: usize) {
        self.clock += 1;
        let el = &mut self.elements[i];
        el.version += 1;
        el.version_nonce = rand::random();
        el.updated = self.clock;
    }

    fn push_or_replace(&mut self, el: Element) {
        if let Some(&i) = self.index.get(&el.id) {
            self.elements[i] = el;
        } else {
            self.index.insert(el.id, self.elements.len());
            self.elements.push(el);
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self.elements.iter().enumerate().map(|(i, el)| (el.id, i)).collect();
    }
}

/// Content equality ignoring version bookkeeping.
fn same_content(a: &Element, b: &Element) -> bool {
    let mut b = b.clone();
    b.version = a.version;
    b.version_nonce = a.version_nonce;
    b.updated = a.updated;
    *a == b
}
