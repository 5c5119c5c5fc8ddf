//! Gesture-level operations over the scene.
//!
//! `EngineCore` owns the committed [`Scene`] and runs every user gesture
//! against a copy of it. Drags and moves keep that copy as a preview between
//! their `begin_*` and `end_*` calls so hosts can render it; one-shot
//! operations build it, settle bindings and commit it in one call. Commits
//! go through [`Scene::commit`], which bumps versions only for elements that
//! actually changed and returns their ids.
//!
//! Positions passed in are scene coordinates. Use [`Camera::screen_to_world`]
//! for pointer events.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::f64::consts::TAU;

use tracing::{debug, info};

use crate::binding::bind_or_unbind_linear_elements;
use crate::bound::{FlushOptions, UpdateOptions, flush, mutate_element, rebind_affected, update_bound_elements};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::consts::{MIN_DIMENSION, ORTHOGONAL_TOLERANCE};
use crate::container_cache::ContainerCache;
use crate::duplicate::{DuplicateOptions, duplicate_elements};
use crate::elbow::ElbowOptions;
use crate::element::{Element, ElementId, ElementKind, ElementUpdate, FixedSegment};
use crate::error::SceneError;
use crate::frame::{add_elements_to_frame, delete_elements, remove_elements_from_frame};
use crate::geometry::{Bounds, Point};
use crate::input::{InputState, Modifiers, Nudge, ResizeHandle, ViewState};
use crate::linear::{local_point, move_points_update, point_index_at, translate_update};
use crate::ordering::normalize_scene_order;
use crate::store::Scene;
use crate::text::{
    FixedAdvanceMeasurer, Font, TextLayout, TextMeasurer, get_container_element, handle_bind_text_resize,
    measure_text, min_container_height, reposition_bound_text,
};

/// Core engine state: the scene, the view onto it and the gesture in progress.
pub struct EngineCore {
    pub scene: Scene,
    pub camera: Camera,
    pub config: EngineConfig,
    pub view: ViewState,
    pub input: InputState,
    /// Original heights of containers grown by their labels.
    pub cache: ContainerCache,
    pub measurer: Box<dyn TextMeasurer>,
    selection: Vec<ElementId>,
    preview: Option<Scene>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_measurer(EngineConfig::default(), Box::new(FixedAdvanceMeasurer::default()))
    }
}

/// Layout for label operations, built from fields so callers can still
/// borrow the scene and cache mutably.
fn text_layout<'a>(measurer: &'a dyn TextMeasurer, config: &EngineConfig) -> TextLayout<'a> {
    TextLayout::new(measurer).with_padding(config.bound_text_padding)
}

/// Elements a gesture on `ids` actually moves: labels are replaced by their
/// containers, containers bring their labels, locked elements stay put.
fn movable_ids(scene: &Scene, ids: &[ElementId]) -> Vec<ElementId> {
    let mut out = Vec::new();
    for id in ids {
        let Some(el) = scene.get_non_deleted(id) else {
            continue;
        };
        let owner = el
            .container_id()
            .and_then(|c| scene.get_non_deleted(&c))
            .filter(|c| c.lists_bound(el.id))
            .unwrap_or(el);
        if owner.locked || out.contains(&owner.id) {
            continue;
        }
        out.push(owner.id);
        if let Some(label) = owner.bound_text_id().filter(|t| scene.get_non_deleted(t).is_some()) {
            if !out.contains(&label) {
                out.push(label);
            }
        }
    }
    out
}

/// Live, unlocked element or the error naming why not. Locked elements
/// yield `Ok(None)`.
fn editable<'s>(scene: &'s Scene, id: ElementId) -> Result<Option<&'s Element>, SceneError> {
    let Some(el) = scene.get(&id) else {
        return Err(SceneError::NotFound(id));
    };
    if el.is_deleted {
        return Err(SceneError::Deleted(id));
    }
    Ok((!el.locked).then_some(el))
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an explicit configuration and text measurer.
    #[must_use]
    pub fn with_measurer(config: EngineConfig, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            config,
            view: ViewState::default(),
            input: InputState::default(),
            cache: ContainerCache::new(),
            measurer,
            selection: Vec::new(),
            preview: None,
        }
    }

    // --- Data inputs ---

    /// Replace the scene with a snapshot. Drops any gesture, the selection
    /// and cached container heights.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.scene.load_snapshot(elements);
        self.cache.clear();
        self.selection.clear();
        self.cancel();
        info!(count = self.scene.len(), "loaded scene snapshot");
    }

    /// Put `el` on top of the scene.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`] in view mode.
    pub fn add_element(&mut self, el: Element) -> Result<ElementId, SceneError> {
        self.check_editable()?;
        let id = el.id;
        self.scene.insert(el);
        Ok(id)
    }

    /// Free-standing text at `at` in the configured font, sized to its content.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`] in view mode.
    pub fn add_text(&mut self, at: Point, text: &str) -> Result<ElementId, SceneError> {
        let mut el = Element::text(at.x, at.y, text);
        if let Some(data) = el.text_data_mut() {
            data.font_size = self.config.default_font_size;
            data.line_height = self.config.default_line_height;
        }
        if let Some(data) = el.text_data() {
            let metrics = measure_text(self.measurer.as_ref(), &data.text, Font::of(data), data.line_height);
            el.width = metrics.width;
            el.height = metrics.height;
        }
        self.add_element(el)
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn select(&mut self, ids: Vec<ElementId>) {
        self.selection = ids;
    }

    /// Committed state of an element.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.scene.get(id)
    }

    /// Scene with the gesture in progress applied, if any.
    #[must_use]
    pub fn preview(&self) -> Option<&Scene> {
        self.preview.as_ref()
    }

    /// Index of the point handle of linear element `id` under `at`.
    #[must_use]
    pub fn point_handle_at(&self, id: &ElementId, at: Point) -> Option<usize> {
        let el = self.scene.get_non_deleted(id).filter(|el| el.is_linear())?;
        point_index_at(el, at, self.camera.zoom, self.config.point_handle_size)
    }

    // --- Point drag ---

    /// Start dragging point `index` of linear element `id`.
    ///
    /// Returns `Ok(false)` for locked elements.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`], [`SceneError::NotFound`],
    /// [`SceneError::Deleted`], [`SceneError::NotLinear`] or
    /// [`SceneError::PointIndexOutOfRange`].
    pub fn begin_point_drag(&mut self, id: ElementId, index: usize) -> Result<bool, SceneError> {
        self.check_editable()?;
        let Some(el) = editable(&self.scene, id)? else {
            return Ok(false);
        };
        let Some(linear) = el.linear() else {
            return Err(SceneError::NotLinear(id));
        };
        if index >= linear.points.len() {
            return Err(SceneError::PointIndexOutOfRange { id, index, len: linear.points.len() });
        }
        self.preview = Some(self.scene.clone());
        self.input = InputState::DraggingPoint { id, index };
        debug!(%id, index, "point drag started");
        Ok(true)
    }

    /// Move the dragged point to `at`. Returns whether the preview changed.
    pub fn drag_point_to(&mut self, at: Point) -> bool {
        let InputState::DraggingPoint { id, index } = self.input else {
            return false;
        };
        let elbow = self.elbow_options(true);
        let opts = self.flush_options();
        let Some(preview) = self.preview.as_mut() else {
            return false;
        };
        let Some(el) = preview.get_non_deleted(&id).cloned() else {
            return false;
        };
        let update = move_points_update(&el, &[(index, local_point(&el, at))]);
        let changed = mutate_element(preview, &id, &update, elbow);
        flush(preview, &[id], opts);
        changed
    }

    /// Finish the point drag: bind or unbind the dragged end and commit.
    /// Returns the changed ids.
    pub fn end_point_drag(&mut self) -> Vec<ElementId> {
        let InputState::DraggingPoint { id, index } = std::mem::take(&mut self.input) else {
            return Vec::new();
        };
        let Some(mut preview) = self.preview.take() else {
            return Vec::new();
        };
        let Some(el) = preview.get_non_deleted(&id) else {
            return Vec::new();
        };
        let last = el.linear().map_or(0, |l| l.points.len().saturating_sub(1));
        let is_elbow = el.is_elbow_arrow();
        let dragged = [index];
        let dragging_points = (index == 0 || index == last).then_some(&dragged[..]);
        bind_or_unbind_linear_elements(
            &mut preview,
            &[id],
            self.config.binding_enabled,
            dragging_points,
            self.camera.binding_zoom(),
        );
        if is_elbow {
            mutate_element(&mut preview, &id, &ElementUpdate::default(), self.elbow_options(false));
        }
        self.commit_draft(preview, &[id])
    }

    // --- Move ---

    /// Start moving `ids` from scene point `at`. Labels move with their
    /// containers. With Alt held, copies are left behind underneath the
    /// moving originals. Returns whether anything can move.
    pub fn begin_move(&mut self, ids: &[ElementId], at: Point, modifiers: Modifiers) -> bool {
        if self.view.view_mode {
            return false;
        }
        let ids = movable_ids(&self.scene, ids);
        if ids.is_empty() {
            return false;
        }
        if modifiers.alt {
            let mut draft = self.scene.clone();
            let opts = DuplicateOptions { offset: Point::origin(), alt_drag: true };
            if !duplicate_elements(&mut draft, &ids, opts).new_ids.is_empty() {
                self.commit_draft(draft, &[]);
            }
        }
        debug!(count = ids.len(), alt = modifiers.alt, "move started");
        self.preview = Some(self.scene.clone());
        self.input = InputState::MovingElements { ids, origin: at };
        true
    }

    /// Recompute the preview with the moved elements offset by `at - origin`.
    pub fn move_to(&mut self, at: Point) -> bool {
        let InputState::MovingElements { ids, origin } = &self.input else {
            return false;
        };
        let delta = at - *origin;
        let mut preview = self.scene.clone();
        let elbow = self.elbow_options(false);
        for id in ids {
            let Some(el) = preview.get_non_deleted(id) else {
                continue;
            };
            let update = translate_update(el, delta);
            mutate_element(&mut preview, id, &update, elbow);
        }
        flush(&mut preview, ids, self.flush_options());
        self.preview = Some(preview);
        true
    }

    /// Finish the move: moved arrows keep bindings only to shapes they still
    /// touch. Returns the changed ids.
    pub fn end_move(&mut self) -> Vec<ElementId> {
        let InputState::MovingElements { ids, .. } = std::mem::take(&mut self.input) else {
            return Vec::new();
        };
        let Some(mut preview) = self.preview.take() else {
            return Vec::new();
        };
        bind_or_unbind_linear_elements(
            &mut preview,
            &ids,
            self.config.binding_enabled,
            None,
            self.camera.binding_zoom(),
        );
        self.commit_draft(preview, &ids)
    }

    /// Drop the gesture in progress and its preview.
    pub fn cancel(&mut self) -> bool {
        let active = self.input.is_active();
        self.input = InputState::Idle;
        self.preview = None;
        if active {
            debug!("gesture cancelled");
        }
        active
    }

    // --- One-shot edits ---

    /// Move the selection one step in `direction`; Shift takes the large step.
    pub fn nudge(&mut self, direction: Nudge, modifiers: Modifiers) -> Vec<ElementId> {
        if self.view.view_mode {
            return Vec::new();
        }
        let step = if modifiers.shift { self.config.nudge_step_large } else { self.config.nudge_step };
        let ids = movable_ids(&self.scene, &self.selection);
        if ids.is_empty() {
            return Vec::new();
        }
        let delta = direction.delta(step);
        let mut draft = self.scene.clone();
        let elbow = self.elbow_options(false);
        for id in &ids {
            let Some(el) = draft.get_non_deleted(id) else {
                continue;
            };
            let update = translate_update(el, delta);
            mutate_element(&mut draft, id, &update, elbow);
        }
        flush(&mut draft, &ids, self.flush_options());
        bind_or_unbind_linear_elements(&mut draft, &ids, self.config.binding_enabled, None, self.camera.binding_zoom());
        self.commit_draft(draft, &ids)
    }

    /// Resize element `id` to `bounds` from `handle` (`None` for programmatic
    /// resizes). Sizes are clamped to `MIN_DIMENSION`, and labelled
    /// containers to one line of their label.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`], [`SceneError::NotFound`] or [`SceneError::Deleted`].
    pub fn resize_element(
        &mut self,
        id: ElementId,
        handle: Option<ResizeHandle>,
        bounds: Bounds,
    ) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let Some(el) = editable(&self.scene, id)?.cloned() else {
            return Ok(Vec::new());
        };
        let mut draft = self.scene.clone();
        let update = if el.is_linear() {
            scaled_linear_update(&el, bounds)
        } else {
            let min_height = el
                .bound_text_id()
                .and_then(|t| draft.get_non_deleted(&t))
                .and_then(Element::text_data)
                .map_or(MIN_DIMENSION, |data| min_container_height(data, self.config.bound_text_padding));
            ElementUpdate {
                x: Some(bounds.min_x),
                y: Some(bounds.min_y),
                width: Some(bounds.width().max(MIN_DIMENSION)),
                height: Some(bounds.height().max(min_height).max(MIN_DIMENSION)),
                ..ElementUpdate::default()
            }
        };
        let new_size = update.width.zip(update.height);
        if !mutate_element(&mut draft, &id, &update, self.elbow_options(false)) {
            return Ok(Vec::new());
        }

        let layout = text_layout(self.measurer.as_ref(), &self.config);
        handle_bind_text_resize(&mut draft, &mut self.cache, layout, id, handle);
        let opts = UpdateOptions {
            simultaneously_updated: &[],
            new_size: draft.get_non_deleted(&id).map(|el| (el.width, el.height)).or(new_size),
            zoom: self.camera.binding_zoom(),
            text_padding: self.config.bound_text_padding,
            elbow_padding: self.config.elbow_base_padding,
        };
        update_bound_elements(&mut draft, id, &opts);
        // The resized element's arrows are settled; keep the rest queued.
        for pending in draft.take_dirty().into_iter().filter(|d| *d != id) {
            draft.mark_dirty(pending);
        }
        reposition_bound_text(&mut draft, id, self.config.bound_text_padding);
        Ok(self.commit_draft(draft, &[]))
    }

    /// Set the rotation of `id` to `angle` radians. Labels turn with their
    /// containers. Elbow arrows stay axis-aligned and are left alone.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`], [`SceneError::NotFound`] or [`SceneError::Deleted`].
    pub fn rotate_element(&mut self, id: ElementId, angle: f64) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let Some(el) = editable(&self.scene, id)? else {
            return Ok(Vec::new());
        };
        if el.is_elbow_arrow() {
            debug!(%id, "elbow arrows do not rotate");
            return Ok(Vec::new());
        }
        let label = el.bound_text_id();
        let mut draft = self.scene.clone();
        let update = ElementUpdate { angle: Some(angle), ..ElementUpdate::default() };
        draft.mutate(&id, &update);
        if let Some(label) = label {
            draft.mutate(&label, &update);
        }
        Ok(self.commit_draft(draft, &[]))
    }

    /// Turn `ids` by `angle` radians about `center` as one edit.
    ///
    /// Labels follow their containers. Arrows bound at both ends to turned
    /// elements turn with them; every other arrow bound to a turned element
    /// is re-derived in a single pass. Elbow arrows keep their orientation
    /// and are only re-routed.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`].
    pub fn rotate_elements(
        &mut self,
        ids: &[ElementId],
        center: Point,
        angle: f64,
    ) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let mut turned = movable_ids(&self.scene, ids);
        let carried: Vec<ElementId> = self
            .scene
            .non_deleted()
            .filter(|el| !el.locked && !el.is_elbow_arrow() && !turned.contains(&el.id))
            .filter(|el| {
                el.linear().is_some_and(|l| {
                    [l.start_binding, l.end_binding]
                        .iter()
                        .all(|b| b.is_some_and(|b| turned.contains(&b.element_id)))
                })
            })
            .map(|el| el.id)
            .collect();
        turned.extend(carried);

        let mut draft = self.scene.clone();
        let mut moved = Vec::new();
        for id in &turned {
            let Some(el) = draft.get_non_deleted(id).cloned() else {
                continue;
            };
            if el.is_elbow_arrow() || get_container_element(&draft, &el).is_some() {
                continue;
            }
            let c = el.center();
            let shift = c.rotate_around(center, angle) - c;
            let turn = Some((el.angle + angle).rem_euclid(TAU));
            let update = ElementUpdate {
                x: Some(el.x + shift.x),
                y: Some(el.y + shift.y),
                angle: turn,
                ..ElementUpdate::default()
            };
            if draft.mutate(id, &update) {
                moved.push(*id);
            }
            if let Some(label) = el.bound_text_id().filter(|_| el.kind != ElementKind::Arrow) {
                draft.mutate(&label, &ElementUpdate { angle: turn, ..ElementUpdate::default() });
            }
        }
        for id in &moved {
            reposition_bound_text(&mut draft, *id, self.config.bound_text_padding);
        }
        debug!(count = moved.len(), angle, "rotated elements");
        Ok(self.commit_draft(draft, &moved))
    }

    /// Pin segment `index` of elbow arrow `id` (the segment ending at point
    /// `index`) so that it passes through `to`. The first and last segments
    /// follow the endpoints and cannot be pinned.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`], [`SceneError::NotFound`],
    /// [`SceneError::Deleted`], [`SceneError::NotLinear`] for anything but an
    /// elbow arrow and [`SceneError::PointIndexOutOfRange`].
    pub fn drag_elbow_segment(&mut self, id: ElementId, index: usize, to: Point) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let Some(el) = editable(&self.scene, id)? else {
            return Ok(Vec::new());
        };
        let Some(linear) = el.linear().filter(|l| l.elbowed) else {
            return Err(SceneError::NotLinear(id));
        };
        let points = &linear.points;
        if index == 0 || index >= points.len() {
            return Err(SceneError::PointIndexOutOfRange { id, index, len: points.len() });
        }
        if index == 1 || index == points.len() - 1 {
            debug!(%id, index, "end segments of elbow arrows are not pinned");
            return Ok(Vec::new());
        }

        let (a, b) = (points[index - 1], points[index]);
        let target = local_point(el, to);
        let segment = if (a.x - b.x).abs() < ORTHOGONAL_TOLERANCE {
            FixedSegment { index, start: Point::new(target.x, a.y), end: Point::new(target.x, b.y) }
        } else {
            FixedSegment { index, start: Point::new(a.x, target.y), end: Point::new(b.x, target.y) }
        };
        let mut fixed: Vec<FixedSegment> = linear.fixed_segments.iter().copied().filter(|s| s.index != index).collect();
        fixed.push(segment);
        fixed.sort_by_key(|s| s.index);

        let update = ElementUpdate { fixed_segments: Some(fixed), ..ElementUpdate::default() };
        let mut draft = self.scene.clone();
        mutate_element(&mut draft, &id, &update, self.elbow_options(false));
        Ok(self.commit_draft(draft, &[]))
    }

    /// Release the pinned segment `index` of elbow arrow `id`, re-routing
    /// the stretch it held.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`], [`SceneError::NotFound`],
    /// [`SceneError::Deleted`] or [`SceneError::NotLinear`].
    pub fn reset_elbow_segment(&mut self, id: ElementId, index: usize) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let Some(el) = editable(&self.scene, id)? else {
            return Ok(Vec::new());
        };
        let Some(linear) = el.linear().filter(|l| l.elbowed) else {
            return Err(SceneError::NotLinear(id));
        };
        if !linear.fixed_segments.iter().any(|s| s.index == index) {
            return Ok(Vec::new());
        }
        let fixed: Vec<FixedSegment> = linear.fixed_segments.iter().copied().filter(|s| s.index != index).collect();
        let update = ElementUpdate { fixed_segments: Some(fixed), ..ElementUpdate::default() };
        let mut draft = self.scene.clone();
        mutate_element(&mut draft, &id, &update, self.elbow_options(false));
        Ok(self.commit_draft(draft, &[]))
    }

    // --- Text ---

    /// Bind free text `text_id` into `container_id` as its label.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`] or whatever binding the label reports.
    pub fn bind_text(&mut self, text_id: ElementId, container_id: ElementId) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let mut draft = self.scene.clone();
        let layout = text_layout(self.measurer.as_ref(), &self.config);
        if !crate::text::bind_text_to_container(&mut draft, &mut self.cache, layout, text_id, container_id)? {
            return Ok(Vec::new());
        }
        Ok(self.commit_draft(draft, &[]))
    }

    /// Detach the label of `container_id`, restoring the container's height.
    pub fn unbind_text(&mut self, container_id: ElementId) -> Vec<ElementId> {
        if self.view.view_mode {
            return Vec::new();
        }
        let mut draft = self.scene.clone();
        let layout = text_layout(self.measurer.as_ref(), &self.config);
        if crate::text::unbind_text(&mut draft, &mut self.cache, layout, container_id).is_none() {
            return Vec::new();
        }
        self.commit_draft(draft, &[])
    }

    /// Replace the content of text element `text_id`.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`] or whatever the text edit reports.
    pub fn set_text(&mut self, text_id: ElementId, text: &str) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let mut draft = self.scene.clone();
        let layout = text_layout(self.measurer.as_ref(), &self.config);
        crate::text::set_text(&mut draft, &mut self.cache, layout, text_id, text)?;
        Ok(self.commit_draft(draft, &[]))
    }

    // --- Structure ---

    /// Delete the selection. Children of deleted frames stay and become the
    /// new selection.
    pub fn delete(&mut self) -> Vec<ElementId> {
        if self.view.view_mode {
            return Vec::new();
        }
        let ids: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.scene.get_non_deleted(id).is_some_and(|el| !el.locked))
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }
        let mut draft = self.scene.clone();
        let outcome = delete_elements(&mut draft, &ids);
        self.selection = outcome.selected;
        self.commit_draft(draft, &[])
    }

    /// Bring deleted elements back and re-attach arrows and labels that
    /// still point at them.
    pub fn restore(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        if self.view.view_mode {
            return Vec::new();
        }
        let mut draft = self.scene.clone();
        let restored: Vec<ElementId> = ids.iter().copied().filter(|id| draft.restore(id)).collect();
        if restored.is_empty() {
            return Vec::new();
        }
        rebind_affected(&mut draft, &restored);
        self.commit_draft(draft, &[])
    }

    /// Duplicate the selection next to itself and select the copies.
    pub fn duplicate(&mut self) -> Vec<ElementId> {
        if self.view.view_mode || self.selection.is_empty() {
            return Vec::new();
        }
        let mut draft = self.scene.clone();
        let requested = self.selection.clone();
        let dup = duplicate_elements(&mut draft, &requested, DuplicateOptions::default());
        if dup.new_ids.is_empty() {
            return Vec::new();
        }
        self.selection = dup.selection(&requested);
        self.commit_draft(draft, &[])
    }

    /// Put `ids` into frame `frame_id`.
    ///
    /// # Errors
    ///
    /// [`SceneError::ViewMode`] or whatever frame membership reports.
    pub fn add_to_frame(&mut self, ids: &[ElementId], frame_id: ElementId) -> Result<Vec<ElementId>, SceneError> {
        self.check_editable()?;
        let mut draft = self.scene.clone();
        add_elements_to_frame(&mut draft, ids, frame_id)?;
        Ok(self.commit_draft(draft, &[]))
    }

    /// Take `ids` out of their frames.
    pub fn remove_from_frame(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        if self.view.view_mode {
            return Vec::new();
        }
        let mut draft = self.scene.clone();
        remove_elements_from_frame(&mut draft, ids);
        self.commit_draft(draft, &[])
    }

    /// Repair the z-order of a loaded scene. Returns whether it changed.
    pub fn normalize_order(&mut self) -> bool {
        !self.view.view_mode && normalize_scene_order(&mut self.scene)
    }

    // --- Internals ---

    fn check_editable(&self) -> Result<(), SceneError> {
        if self.view.view_mode { Err(SceneError::ViewMode) } else { Ok(()) }
    }

    fn flush_options(&self) -> FlushOptions {
        FlushOptions {
            zoom: self.camera.binding_zoom(),
            text_padding: self.config.bound_text_padding,
            elbow_padding: self.config.elbow_base_padding,
        }
    }

    fn elbow_options(&self, is_dragging: bool) -> ElbowOptions {
        ElbowOptions { is_dragging, zoom: self.camera.binding_zoom(), padding: self.config.elbow_base_padding }
    }

    /// Settle the draft's pending bound-element updates and commit it.
    fn commit_draft(&mut self, mut draft: Scene, moved: &[ElementId]) -> Vec<ElementId> {
        flush(&mut draft, moved, self.flush_options());
        let changed = self.scene.commit(&draft);
        debug!(count = changed.len(), "committed edit");
        changed
    }
}

/// Update fitting a linear element's points into `bounds`. Elbow arrows only
/// get their endpoints, for the router to fill in.
fn scaled_linear_update(el: &Element, bounds: Bounds) -> ElementUpdate {
    let Some(linear) = el.linear() else {
        return ElementUpdate::default();
    };
    let sx = if el.width > 0.0 { bounds.width() / el.width } else { 1.0 };
    let sy = if el.height > 0.0 { bounds.height() / el.height } else { 1.0 };
    let scaled: Vec<Point> = linear.points.iter().map(|p| Point::new(p.x * sx, p.y * sy)).collect();
    let b = Bounds::from_points(&scaled);
    let (x, y) = (bounds.min_x - b.min_x, bounds.min_y - b.min_y);
    if linear.elbowed {
        let ends = scaled.first().copied().zip(scaled.last().copied());
        return ElementUpdate {
            x: Some(x),
            y: Some(y),
            points: ends.map(|(first, last)| vec![first, last]),
            ..ElementUpdate::default()
        };
    }
    ElementUpdate {
        x: Some(x),
        y: Some(y),
        width: Some(b.width()),
        height: Some(b.height()),
        points: Some(scaled),
        ..ElementUpdate::default()
    }
}
