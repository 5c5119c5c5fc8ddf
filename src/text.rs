//! Text-container synchronizer.
//!
//! A bound text label's wrapped text, size and position are a function of its
//! container's box and the label's font, alignment and `original_text`. Every
//! operation here re-derives them after changing either side, growing the
//! container when the wrapped text no longer fits.
//!
//! Text measurement goes through [`TextMeasurer`] so hosts can plug in real
//! font metrics; [`FixedAdvanceMeasurer`] gives every character the same
//! advance.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use tracing::debug;

use crate::consts::{
    ARROW_LABEL_FONT_SIZE_TO_MIN_WIDTH_RATIO, ARROW_LABEL_VERTICAL_ROOM, ARROW_LABEL_WIDTH_FRACTION,
    BOUND_TEXT_PADDING, DEFAULT_CHAR_WIDTH_RATIO,
};
use crate::container_cache::ContainerCache;
use crate::element::{
    BoundElement, BoundKind, Element, ElementId, ElementKind, ElementUpdate, TextAlign, TextData, VerticalAlign,
};
use crate::error::SceneError;
use crate::geometry::Point;
use crate::input::ResizeHandle;
use crate::linear::global_points;
use crate::store::Scene;

// =============================================================================
// Measurement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f64,
    pub family: u32,
}

impl Font {
    #[must_use]
    pub fn of(text: &TextData) -> Self {
        Self { size: text.font_size, family: text.font_family }
    }
}

/// Width of a single line of text rendered in a font.
pub trait TextMeasurer {
    fn line_width(&self, line: &str, font: Font) -> f64;
}

/// Every character advances by `font.size * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasurer {
    pub ratio: f64,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { ratio: DEFAULT_CHAR_WIDTH_RATIO }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, line: &str, font: Font) -> f64 {
        line.chars().count() as f64 * font.size * self.ratio
    }
}

/// Measurer plus the padding between a container's edge and its label.
#[derive(Clone, Copy)]
pub struct TextLayout<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub padding: f64,
}

impl<'a> TextLayout<'a> {
    #[must_use]
    pub fn new(measurer: &'a dyn TextMeasurer) -> Self {
        Self { measurer, padding: BOUND_TEXT_PADDING }
    }

    #[must_use]
    pub fn with_padding(self, padding: f64) -> Self {
        Self { padding, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Unify line endings and expand tabs.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', "        ")
}

#[must_use]
pub fn line_height_px(font_size: f64, line_height: f64) -> f64 {
    font_size * line_height
}

/// Size of `text`: the widest line by the number of lines. Empty lines count.
#[must_use]
pub fn measure_text(measurer: &dyn TextMeasurer, text: &str, font: Font, line_height: f64) -> TextMetrics {
    let normalized = normalize_text(text);
    let mut width: f64 = 0.0;
    let mut lines = 0_u32;
    for line in normalized.split('\n') {
        let line = if line.is_empty() { " " } else { line };
        width = width.max(measurer.line_width(line, font));
        lines += 1;
    }
    TextMetrics { width, height: line_height_px(font.size, line_height) * f64::from(lines) }
}

/// Smallest container height that still fits one line of `text`.
#[must_use]
pub fn min_container_height(text: &TextData, padding: f64) -> f64 {
    line_height_px(text.font_size, text.line_height) + padding * 2.0
}

// =============================================================================
// Wrapping
// =============================================================================

/// Wrap `text` so no line is wider than `max_width`.
///
/// Lines that already fit are kept verbatim. Longer lines break at
/// whitespace and after hyphens; a single word wider than the limit is
/// broken by characters. A non-finite or negative limit leaves the text as is.
#[must_use]
pub fn wrap_text(measurer: &dyn TextMeasurer, text: &str, font: Font, max_width: f64) -> String {
    if !max_width.is_finite() || max_width < 0.0 {
        return text.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if measurer.line_width(line, font) <= max_width {
            lines.push(line.to_string());
        } else {
            lines.extend(wrap_line(measurer, line, font, max_width));
        }
    }
    lines.join("\n")
}

/// Whitespace characters become their own tokens; hyphens end a token.
fn tokens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(c.to_string());
        } else {
            current.push(c);
            if c == '-' {
                out.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn wrap_line(measurer: &dyn TextMeasurer, line: &str, font: Font, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let tokens = tokens(line);
    let mut i = 0;
    while let Some(token) = tokens.get(i) {
        let test = format!("{current}{token}");
        let is_space = token.chars().all(char::is_whitespace);
        if is_space || measurer.line_width(&test, font) <= max_width {
            current = test;
            i += 1;
            continue;
        }
        if current.is_empty() {
            let mut pieces = wrap_word(measurer, token, font, max_width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            i += 1;
        } else {
            lines.push(current.trim_end().to_string());
            current.clear();
        }
    }
    if !current.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

fn wrap_word(measurer: &dyn TextMeasurer, word: &str, font: Font, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;
    for c in word.chars() {
        let advance = measurer.line_width(c.encode_utf8(&mut [0; 4]), font);
        if width + advance <= max_width {
            current.push(c);
            width += advance;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current.push(c);
        width = advance;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// Container geometry
// =============================================================================

/// Width available to the label of `container`.
#[must_use]
pub fn bound_text_max_width(container: &Element, text: Option<&TextData>, padding: f64) -> f64 {
    let w = container.width;
    match container.kind {
        ElementKind::Arrow => {
            let font_size = text.map_or(TextData::default().font_size, |t| t.font_size);
            (w * ARROW_LABEL_WIDTH_FRACTION).max(font_size * ARROW_LABEL_FONT_SIZE_TO_MIN_WIDTH_RATIO)
        }
        ElementKind::Ellipse => (w / 2.0 * SQRT_2).round() - padding * 2.0,
        ElementKind::Diamond => (w / 2.0).round() - padding * 2.0,
        _ => w - padding * 2.0,
    }
}

/// Height available to the label of `container`; `text_height` is the
/// label's current height, which arrows fall back to when they are short.
#[must_use]
pub fn bound_text_max_height(container: &Element, text_height: f64, padding: f64) -> f64 {
    let h = container.height;
    match container.kind {
        ElementKind::Arrow => {
            if h - ARROW_LABEL_VERTICAL_ROOM <= 0.0 {
                text_height
            } else {
                h
            }
        }
        ElementKind::Ellipse => (h / 2.0 * SQRT_2).round() - padding * 2.0,
        ElementKind::Diamond => (h / 2.0).round() - padding * 2.0,
        _ => h - padding * 2.0,
    }
}

/// Container size along one axis that fits a label of size `dimension`.
#[must_use]
pub fn container_dimension_for_bound_text(dimension: f64, kind: ElementKind, padding: f64) -> f64 {
    let d = dimension.ceil();
    let pad = padding * 2.0;
    match kind {
        ElementKind::Ellipse => ((d + pad) / SQRT_2 * 2.0).round(),
        ElementKind::Arrow => d + pad * 8.0,
        ElementKind::Diamond => 2.0 * (d + pad),
        _ => d + pad,
    }
}

/// Top-left corner of the area a label may occupy inside `container`.
#[must_use]
pub fn container_coords(container: &Element, padding: f64) -> Point {
    let (mut dx, mut dy) = (padding, padding);
    match container.kind {
        ElementKind::Ellipse => {
            dx += container.width / 2.0 * (1.0 - SQRT_2 / 2.0);
            dy += container.height / 2.0 * (1.0 - SQRT_2 / 2.0);
        }
        ElementKind::Diamond => {
            dx += container.width / 4.0;
            dy += container.height / 4.0;
        }
        _ => {}
    }
    Point::new(container.x + dx, container.y + dy)
}

/// Position of `text` inside `container` from its alignment.
#[must_use]
pub fn compute_bound_text_position(container: &Element, text: &Element, padding: f64) -> Point {
    if container.kind == ElementKind::Arrow {
        return get_bound_text_element_position(container, text).unwrap_or(Point::new(text.x, text.y));
    }
    let Some(data) = text.text_data() else {
        return Point::new(text.x, text.y);
    };
    let origin = container_coords(container, padding);
    let max_width = bound_text_max_width(container, Some(data), padding);
    let max_height = bound_text_max_height(container, text.height, padding);
    let y = match data.vertical_align {
        VerticalAlign::Top => origin.y,
        VerticalAlign::Bottom => origin.y + max_height - text.height,
        VerticalAlign::Middle => origin.y + (max_height / 2.0 - text.height / 2.0),
    };
    let x = match data.text_align {
        TextAlign::Left => origin.x,
        TextAlign::Right => origin.x + max_width - text.width,
        TextAlign::Center => origin.x + (max_width / 2.0 - text.width / 2.0),
    };
    Point::new(x, y)
}

/// Label position on an arrow: centered on the middle point, or on the
/// middle segment's midpoint when the point count is even.
#[must_use]
pub fn get_bound_text_element_position(arrow: &Element, text: &Element) -> Option<Point> {
    let points = global_points(arrow);
    if points.len() < 2 {
        return None;
    }
    let anchor = if points.len() % 2 == 1 {
        points[points.len() / 2]
    } else {
        let index = points.len() / 2 - 1;
        points[index].midpoint(points[index + 1])
    };
    Some(Point::new(anchor.x - text.width / 2.0, anchor.y - text.height / 2.0))
}

// =============================================================================
// Lookups
// =============================================================================

/// The non-deleted text label listed by `container`.
#[must_use]
pub fn get_bound_text_element<'s>(scene: &'s Scene, container: &Element) -> Option<&'s Element> {
    let id = container.bound_text_id()?;
    scene.get_non_deleted(&id).filter(|el| el.text_data().is_some())
}

/// The non-deleted container `text` names, if it lists `text` back.
///
/// A `container_id` the container does not confirm is treated as unbound.
#[must_use]
pub fn get_container_element<'s>(scene: &'s Scene, text: &Element) -> Option<&'s Element> {
    let id = text.container_id()?;
    scene.get_non_deleted(&id).filter(|c| c.lists_bound(text.id))
}

// =============================================================================
// Synchronization
// =============================================================================

/// Move the label of `container_id` to where its alignment puts it.
///
/// Labels of shapes also take the container's rotation. Writes go through
/// the updater path. Returns whether the label changed.
pub fn reposition_bound_text(scene: &mut Scene, container_id: ElementId, padding: f64) -> bool {
    let Some(container) = scene.get_non_deleted(&container_id) else {
        return false;
    };
    let Some(text) = get_bound_text_element(scene, container) else {
        return false;
    };
    let position = compute_bound_text_position(container, text, padding);
    let angle = if container.kind == ElementKind::Arrow { text.angle } else { container.angle };
    let update = ElementUpdate { angle: Some(angle), ..ElementUpdate::position(position.x, position.y) };
    let text_id = text.id;
    scene.mutate_derived(&text_id, &update)
}

/// Re-wrap `text_id` into its container, growing the container when the
/// text no longer fits, then re-center it.
///
/// A container grown in height records the new height in `cache`. Free text
/// is only re-measured (and wrapped to its own width when fixed-width).
pub fn redraw_text_bounding_box(
    scene: &mut Scene,
    cache: &mut ContainerCache,
    layout: TextLayout<'_>,
    text_id: ElementId,
) -> bool {
    let Some(text) = scene.get_non_deleted(&text_id).cloned() else {
        return false;
    };
    let Some(data) = text.text_data().cloned() else {
        return false;
    };
    let font = Font::of(&data);
    let container = get_container_element(scene, &text).cloned();

    let wrapped = match &container {
        Some(c) => wrap_text(layout.measurer, &data.original_text, font, bound_text_max_width(c, Some(&data), layout.padding)),
        None if !data.auto_resize => wrap_text(layout.measurer, &data.original_text, font, text.width),
        None => data.text.clone(),
    };
    let metrics = measure_text(layout.measurer, &wrapped, font, data.line_height);

    let mut update = ElementUpdate { text: Some(wrapped), height: Some(metrics.height), ..ElementUpdate::default() };
    if data.auto_resize {
        update.width = Some(metrics.width);
    }

    if let Some(container) = container {
        let max_height = bound_text_max_height(&container, text.height, layout.padding);
        let max_width = bound_text_max_width(&container, Some(&data), layout.padding);
        let mut grown = ElementUpdate::default();
        if container.kind != ElementKind::Arrow && metrics.height > max_height {
            let height = container_dimension_for_bound_text(metrics.height, container.kind, layout.padding);
            grown.height = Some(height);
            cache.update(container.id, height);
        }
        if metrics.width > max_width {
            grown.width = Some(container_dimension_for_bound_text(metrics.width, container.kind, layout.padding));
        }
        if grown != ElementUpdate::default() {
            debug!(container_id = %container.id, height = grown.height, width = grown.width, "grew container to fit text");
            scene.mutate(&container.id, &grown);
        }
        let mut resized = text.clone();
        resized.apply_update(&update);
        if let Some(container) = scene.get_non_deleted(&container.id) {
            let position = compute_bound_text_position(container, &resized, layout.padding);
            update.x = Some(position.x);
            update.y = Some(position.y);
        }
    }
    scene.mutate(&text_id, &update)
}

/// Re-fit the label of `container_id` after the container was resized by
/// `handle`. Vertical-only handles keep the current wrapping.
///
/// Resizing invalidates the container's cached height.
pub fn handle_bind_text_resize(
    scene: &mut Scene,
    cache: &mut ContainerCache,
    layout: TextLayout<'_>,
    container_id: ElementId,
    handle: Option<ResizeHandle>,
) {
    let Some(container) = scene.get_non_deleted(&container_id).cloned() else {
        return;
    };
    if container.bound_text_id().is_none() {
        return;
    }
    cache.reset(&container_id);
    let Some(text) = get_bound_text_element(scene, &container) else {
        return;
    };
    let Some(data) = text.text_data().cloned() else {
        return;
    };
    if data.text.is_empty() {
        return;
    }
    let text_id = text.id;
    let font = Font::of(&data);
    let max_width = bound_text_max_width(&container, Some(&data), layout.padding);
    let max_height = bound_text_max_height(&container, text.height, layout.padding);

    let mut next_text = data.text.clone();
    let mut next = TextMetrics { width: text.width, height: text.height };
    if !handle.is_some_and(ResizeHandle::is_vertical_only) {
        next_text = wrap_text(layout.measurer, &data.original_text, font, max_width);
        next = measure_text(layout.measurer, &next_text, font, data.line_height);
    }

    if next.height > max_height {
        let height = container_dimension_for_bound_text(next.height, container.kind, layout.padding);
        let from_top = container.kind != ElementKind::Arrow && handle.is_some_and(ResizeHandle::is_top);
        let y = if from_top { container.y - (height - container.height) } else { container.y };
        scene.mutate(&container_id, &ElementUpdate { height: Some(height), y: Some(y), ..ElementUpdate::default() });
    }

    scene.mutate(
        &text_id,
        &ElementUpdate {
            text: Some(next_text),
            width: Some(next.width),
            height: Some(next.height),
            ..ElementUpdate::default()
        },
    );
    if container.kind != ElementKind::Arrow {
        if let (Some(container), Some(text)) = (scene.get_non_deleted(&container_id), scene.get_non_deleted(&text_id)) {
            let position = compute_bound_text_position(container, text, layout.padding);
            scene.mutate(&text_id, &ElementUpdate::position(position.x, position.y));
        }
    }
}

/// Bind free text `text_id` into `container_id` as its centered label.
///
/// The label is wrapped to the container, which grows to fit, and is moved
/// directly above the container in z-order. The container's height from
/// before the bind is cached so that unbinding restores it exactly.
/// Returns `Ok(false)` when the container already has a label.
///
/// # Errors
///
/// [`SceneError::NotFound`] / [`SceneError::Deleted`] for a missing element,
/// [`SceneError::NotText`] if `text_id` is not text and
/// [`SceneError::NotTextContainer`] if the container cannot hold text.
pub fn bind_text_to_container(
    scene: &mut Scene,
    cache: &mut ContainerCache,
    layout: TextLayout<'_>,
    text_id: ElementId,
    container_id: ElementId,
) -> Result<bool, SceneError> {
    let text = live(scene, text_id)?;
    if text.text_data().is_none() {
        return Err(SceneError::NotText(text_id));
    }
    let previous_container = text.container_id();
    let container = live(scene, container_id)?;
    if !container.is_text_container() {
        return Err(SceneError::NotTextContainer(container_id));
    }
    if get_bound_text_element(scene, container).is_some() {
        debug!(%container_id, "container already has a label");
        return Ok(false);
    }
    let angle = if container.kind == ElementKind::Arrow { 0.0 } else { container.angle };
    let original_height = container.height;
    let mut bound = container.bound_elements.clone();
    bound.retain(|b| b.kind != BoundKind::Text);
    bound.push(BoundElement::text(text_id));

    if let Some(previous) = previous_container.filter(|&id| id != container_id) {
        if let Some(old) = scene.get_non_deleted(&previous) {
            let remaining: Vec<BoundElement> = old.bound_elements.iter().copied().filter(|b| b.id != text_id).collect();
            scene.mutate(&previous, &ElementUpdate::bound_elements(remaining));
        }
    }

    scene.mutate(
        &text_id,
        &ElementUpdate {
            container_id: Some(Some(container_id)),
            vertical_align: Some(VerticalAlign::Middle),
            text_align: Some(TextAlign::Center),
            auto_resize: Some(true),
            angle: Some(angle),
            ..ElementUpdate::default()
        },
    );
    scene.mutate(&container_id, &ElementUpdate::bound_elements(bound));
    redraw_text_bounding_box(scene, cache, layout, text_id);
    cache.update(container_id, original_height);
    push_text_above_container(scene, text_id, container_id);
    debug!(%text_id, %container_id, "bound text to container");
    Ok(true)
}

fn live(scene: &Scene, id: ElementId) -> Result<&Element, SceneError> {
    let el = scene.get(&id).ok_or(SceneError::NotFound(id))?;
    if el.is_deleted {
        return Err(SceneError::Deleted(id));
    }
    Ok(el)
}

fn push_text_above_container(scene: &mut Scene, text_id: ElementId, container_id: ElementId) {
    let mut order: Vec<ElementId> = scene.elements().iter().map(|el| el.id).filter(|&id| id != text_id).collect();
    let Some(at) = order.iter().position(|&id| id == container_id) else {
        return;
    };
    order.insert(at + 1, text_id);
    scene.reorder(&order);
}

/// Release the label of `container_id` as free text with its unwrapped
/// content, and restore the container to its cached original height.
/// Returns the released text's id.
pub fn unbind_text(
    scene: &mut Scene,
    cache: &mut ContainerCache,
    layout: TextLayout<'_>,
    container_id: ElementId,
) -> Option<ElementId> {
    let container = scene.get_non_deleted(&container_id)?;
    let text = get_bound_text_element(scene, container)?;
    let data = text.text_data()?.clone();
    let text_id = text.id;
    let metrics = measure_text(layout.measurer, &data.original_text, Font::of(&data), data.line_height);
    let original_height = cache.get(&container_id);
    cache.reset(&container_id);
    let position = compute_bound_text_position(container, text, layout.padding);
    let height = original_height.unwrap_or(container.height);
    let remaining: Vec<BoundElement> = container.bound_elements.iter().copied().filter(|b| b.id != text_id).collect();

    scene.mutate(
        &text_id,
        &ElementUpdate {
            container_id: Some(None),
            width: Some(metrics.width),
            height: Some(metrics.height),
            text: Some(data.original_text),
            x: Some(position.x),
            y: Some(position.y),
            ..ElementUpdate::default()
        },
    );
    scene.mutate(
        &container_id,
        &ElementUpdate { bound_elements: Some(remaining), height: Some(height), ..ElementUpdate::default() },
    );
    debug!(%text_id, %container_id, height, "unbound text from container");
    Some(text_id)
}

/// Replace the content of `text_id` as a text edit would.
///
/// A label grows its container when the new text needs more room and shrinks
/// it back toward the cached original height when it needs less. Clearing a
/// label deletes it and restores the container as [`unbind_text`] does.
///
/// # Errors
///
/// [`SceneError::NotFound`] / [`SceneError::Deleted`] for a missing element,
/// [`SceneError::NotText`] if `text_id` is not text.
pub fn set_text(
    scene: &mut Scene,
    cache: &mut ContainerCache,
    layout: TextLayout<'_>,
    text_id: ElementId,
    next: &str,
) -> Result<(), SceneError> {
    let text = live(scene, text_id)?;
    let Some(data) = text.text_data().cloned() else {
        return Err(SceneError::NotText(text_id));
    };
    let next = normalize_text(next);
    let text_height = text.height;
    let container = get_container_element(scene, text).cloned();

    if let Some(container) = &container {
        if next.trim().is_empty() {
            let original = cache.get(&container.id).unwrap_or(container.height);
            cache.reset(&container.id);
            let remaining: Vec<BoundElement> =
                container.bound_elements.iter().copied().filter(|b| b.id != text_id).collect();
            scene.delete(&text_id);
            scene.mutate(
                &container.id,
                &ElementUpdate { bound_elements: Some(remaining), height: Some(original), ..ElementUpdate::default() },
            );
            debug!(%text_id, container_id = %container.id, "cleared label removed");
            return Ok(());
        }

        let original = match cache.get(&container.id) {
            Some(h) => h,
            None => cache.update(container.id, container.height),
        };
        let font = Font::of(&data);
        let wrapped = wrap_text(layout.measurer, &next, font, bound_text_max_width(container, Some(&data), layout.padding));
        let height = measure_text(layout.measurer, &wrapped, font, data.line_height).height;
        let max_height = bound_text_max_height(container, text_height, layout.padding);
        if container.kind != ElementKind::Arrow {
            let target = container_dimension_for_bound_text(height, container.kind, layout.padding);
            if height > max_height {
                scene.mutate(&container.id, &ElementUpdate { height: Some(target), ..ElementUpdate::default() });
            } else if container.height > original && height < max_height {
                let shrunk = target.max(original);
                scene.mutate(&container.id, &ElementUpdate { height: Some(shrunk), ..ElementUpdate::default() });
            }
        }
    }

    scene.mutate(
        &text_id,
        &ElementUpdate { text: Some(next.clone()), original_text: Some(next), ..ElementUpdate::default() },
    );
    redraw_text_bounding_box(scene, cache, layout, text_id);
    Ok(())
}

/// Point duplicated containers and their duplicated labels at each other.
///
/// `old_to_new` maps original ids to duplicate ids. Containers whose label
/// was not duplicated are left alone.
pub fn bind_text_to_shape_after_duplication(
    scene: &mut Scene,
    old_ids: &[ElementId],
    old_to_new: &HashMap<ElementId, ElementId>,
) {
    for old_id in old_ids {
        let (Some(&new_id), Some(old)) = (old_to_new.get(old_id), scene.get(old_id)) else {
            continue;
        };
        let Some(old_text) = old.bound_text_id() else {
            continue;
        };
        let Some(&new_text) = old_to_new.get(&old_text) else {
            continue;
        };
        let bound = scene.get(&new_id).map(|dup| {
            let mut bound: Vec<BoundElement> =
                dup.bound_elements.iter().copied().filter(|b| b.id != old_text && b.id != new_text).collect();
            bound.push(BoundElement::text(new_text));
            bound
        });
        let container = match bound {
            Some(bound) => {
                scene.mutate(&new_id, &ElementUpdate::bound_elements(bound));
                Some(new_id)
            }
            None => None,
        };
        scene.mutate(&new_text, &ElementUpdate { container_id: Some(container), ..ElementUpdate::default() });
    }
}
