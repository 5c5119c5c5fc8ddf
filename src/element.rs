//! Element model: scene elements, their kind-specific payloads, and the
//! sparse update type used by the mutation gateway.
//!
//! Cross-element links (`bound_elements`, `container_id`, binding targets,
//! `frame_id`) are plain ids resolved through the store. Any of them may
//! dangle; consumers treat a failed lookup as "absent".

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::geometry::{Bounds, Point};

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Identifier of a group; elements share a group by carrying the same id.
pub type GroupId = Uuid;

/// The kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Diamond,
    Ellipse,
    Text,
    Frame,
    Image,
    Arrow,
    Line,
    Freedraw,
}

impl ElementKind {
    /// Kinds a linear element may bind to. Text only qualifies when free-standing.
    #[must_use]
    pub fn is_bindable(self) -> bool {
        matches!(self, Self::Rectangle | Self::Diamond | Self::Ellipse | Self::Text | Self::Frame | Self::Image)
    }

    /// Kinds that can host a bound text label.
    #[must_use]
    pub fn is_text_container(self) -> bool {
        matches!(self, Self::Rectangle | Self::Diamond | Self::Ellipse | Self::Arrow)
    }

    /// Kinds whose outline is their bounding box.
    #[must_use]
    pub fn is_rectanguloid(self) -> bool {
        matches!(self, Self::Rectangle | Self::Text | Self::Frame | Self::Image)
    }

    #[must_use]
    pub fn is_linear(self) -> bool {
        matches!(self, Self::Arrow | Self::Line)
    }
}

/// What kind of element a back-reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    Arrow,
    Text,
}

/// Weak back-reference from a bindable element to an arrow or label bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: BoundKind,
}

impl BoundElement {
    #[must_use]
    pub fn arrow(id: ElementId) -> Self {
        Self { id, kind: BoundKind::Arrow }
    }

    #[must_use]
    pub fn text(id: ElementId) -> Self {
        Self { id, kind: BoundKind::Text }
    }
}

/// Binding of one end of a linear element to a bindable element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBinding {
    pub element_id: ElementId,
    /// Oriented relative distance of the anchor from the target's center, roughly in `[-1, 1]`.
    pub focus: f64,
    /// Distance kept between the endpoint and the target's outline.
    pub gap: f64,
    /// Normalized anchor inside the target's box, used by elbow arrows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_point: Option<Point>,
}

/// Which end of a linear element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// A user-pinned elbow arrow segment. `index` is the index of the segment's end point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedSegment {
    pub index: usize,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrowhead {
    Arrow,
    Bar,
    Dot,
    Triangle,
}

/// Payload of arrows and lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearData {
    /// Local coordinates relative to the element's `x`/`y`. The first point is always the origin.
    pub points: Vec<Point>,
    pub start_binding: Option<PointBinding>,
    pub end_binding: Option<PointBinding>,
    pub start_arrowhead: Option<Arrowhead>,
    pub end_arrowhead: Option<Arrowhead>,
    #[serde(default)]
    pub elbowed: bool,
    #[serde(default)]
    pub fixed_segments: Vec<FixedSegment>,
    #[serde(default)]
    pub start_is_special: bool,
    #[serde(default)]
    pub end_is_special: bool,
}

impl Default for LinearData {
    fn default() -> Self {
        Self {
            points: vec![Point::origin()],
            start_binding: None,
            end_binding: None,
            start_arrowhead: None,
            end_arrowhead: None,
            elbowed: false,
            fixed_segments: Vec::new(),
            start_is_special: false,
            end_is_special: false,
        }
    }
}

impl LinearData {
    #[must_use]
    pub fn binding(&self, end: Endpoint) -> Option<&PointBinding> {
        match end {
            Endpoint::Start => self.start_binding.as_ref(),
            Endpoint::End => self.end_binding.as_ref(),
        }
    }

    #[must_use]
    pub fn arrowhead(&self, end: Endpoint) -> Option<Arrowhead> {
        match end {
            Endpoint::Start => self.start_arrowhead,
            Endpoint::End => self.end_arrowhead,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Payload of text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    /// Displayed text, possibly with wrap-inserted newlines.
    pub text: String,
    /// Unwrapped source text.
    pub original_text: String,
    pub container_id: Option<ElementId>,
    pub font_size: f64,
    pub font_family: u32,
    pub line_height: f64,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    #[serde(default = "default_auto_resize")]
    pub auto_resize: bool,
}

fn default_auto_resize() -> bool {
    true
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: String::new(),
            original_text: String::new(),
            container_id: None,
            font_size: 20.0,
            font_family: 1,
            line_height: 1.25,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            auto_resize: true,
        }
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementData {
    Shape,
    Linear(LinearData),
    Text(TextData),
}

/// A scene element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Left edge of the un-rotated box.
    pub x: f64,
    /// Top edge of the un-rotated box.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in radians around the box center.
    pub angle: f64,
    /// Bumped on every mutation; never decremented.
    pub version: u64,
    /// Random tie-breaker for concurrent edits at the same version.
    pub version_nonce: u32,
    pub is_deleted: bool,
    /// Innermost group first, outermost last.
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub frame_id: Option<ElementId>,
    #[serde(default)]
    pub bound_elements: Vec<BoundElement>,
    #[serde(default)]
    pub locked: bool,
    /// Scene clock value at the last mutation.
    #[serde(default)]
    pub updated: u64,
    /// Source of a duplicate. Transient; absent on regular elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
    pub data: ElementData,
}

impl Element {
    /// Create an element of `kind` with default payload and `version = 1`.
    ///
    /// Linear elements get two points spanning the box.
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        let data = match kind {
            ElementKind::Arrow | ElementKind::Line => ElementData::Linear(LinearData {
                points: vec![Point::origin(), Point::new(width, height)],
                end_arrowhead: (kind == ElementKind::Arrow).then_some(Arrowhead::Arrow),
                ..LinearData::default()
            }),
            ElementKind::Text => ElementData::Text(TextData::default()),
            ElementKind::Rectangle
            | ElementKind::Diamond
            | ElementKind::Ellipse
            | ElementKind::Frame
            | ElementKind::Image
            | ElementKind::Freedraw => ElementData::Shape,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width: width.abs(),
            height: height.abs(),
            angle: 0.0,
            version: 1,
            version_nonce: rand::random(),
            is_deleted: false,
            group_ids: Vec::new(),
            frame_id: None,
            bound_elements: Vec::new(),
            locked: false,
            updated: 0,
            duplicate_of: None,
            custom_data: None,
            data,
        }
    }

    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rectangle, x, y, width, height)
    }

    #[must_use]
    pub fn diamond(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Diamond, x, y, width, height)
    }

    #[must_use]
    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Ellipse, x, y, width, height)
    }

    #[must_use]
    pub fn frame(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Frame, x, y, width, height)
    }

    /// Arrow at `x, y` through local `points`; the box is derived from the points.
    #[must_use]
    pub fn arrow(x: f64, y: f64, points: Vec<Point>) -> Self {
        Self::new(ElementKind::Arrow, x, y, 0.0, 0.0).with_points(points)
    }

    #[must_use]
    pub fn line(x: f64, y: f64, points: Vec<Point>) -> Self {
        Self::new(ElementKind::Line, x, y, 0.0, 0.0).with_points(points)
    }

    /// Elbow arrow from local origin to `(width, height)`.
    #[must_use]
    pub fn elbow_arrow(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut el = Self::arrow(x, y, vec![Point::origin(), Point::new(width, height)]);
        if let ElementData::Linear(l) = &mut el.data {
            l.elbowed = true;
        }
        el
    }

    /// Free-standing text sized to its content by the caller.
    #[must_use]
    pub fn text(x: f64, y: f64, text: &str) -> Self {
        let mut el = Self::new(ElementKind::Text, x, y, 0.0, 0.0);
        if let ElementData::Text(t) = &mut el.data {
            t.text = text.to_string();
            t.original_text = text.to_string();
        }
        el
    }

    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub fn with_group_ids(mut self, group_ids: Vec<GroupId>) -> Self {
        self.group_ids = group_ids;
        self
    }

    #[must_use]
    pub fn with_frame(mut self, frame_id: ElementId) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    #[must_use]
    pub fn with_bound_elements(mut self, bound: Vec<BoundElement>) -> Self {
        self.bound_elements = bound;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container_id: ElementId) -> Self {
        if let ElementData::Text(t) = &mut self.data {
            t.container_id = Some(container_id);
        }
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        if let ElementData::Text(t) = &mut self.data {
            t.font_size = font_size;
        }
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Replace the points of a linear element; width and height follow the points.
    #[must_use]
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        if let ElementData::Linear(l) = &mut self.data {
            let b = Bounds::from_points(&points);
            self.width = b.width();
            self.height = b.height();
            l.points = points;
        }
        self
    }

    // --- Payload access ---

    #[must_use]
    pub fn linear(&self) -> Option<&LinearData> {
        match &self.data {
            ElementData::Linear(l) => Some(l),
            _ => None,
        }
    }

    pub fn linear_mut(&mut self) -> Option<&mut LinearData> {
        match &mut self.data {
            ElementData::Linear(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_data(&self) -> Option<&TextData> {
        match &self.data {
            ElementData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_data_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.data {
            ElementData::Text(t) => Some(t),
            _ => None,
        }
    }

    // --- Classification ---

    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.linear().is_some()
    }

    #[must_use]
    pub fn is_arrow(&self) -> bool {
        self.kind == ElementKind::Arrow
    }

    #[must_use]
    pub fn is_elbow_arrow(&self) -> bool {
        self.kind == ElementKind::Arrow && self.linear().is_some_and(|l| l.elbowed)
    }

    /// A valid binding target: bindable kind, and not a text label inside a container.
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        self.kind.is_bindable() && self.container_id().is_none()
    }

    #[must_use]
    pub fn is_text_container(&self) -> bool {
        self.kind.is_text_container()
    }

    #[must_use]
    pub fn container_id(&self) -> Option<ElementId> {
        self.text_data().and_then(|t| t.container_id)
    }

    /// Id of the bound text label, if the back-reference list has one.
    #[must_use]
    pub fn bound_text_id(&self) -> Option<ElementId> {
        self.bound_elements.iter().find(|b| b.kind == BoundKind::Text).map(|b| b.id)
    }

    #[must_use]
    pub fn lists_bound(&self, id: ElementId) -> bool {
        self.bound_elements.iter().any(|b| b.id == id)
    }

    // --- Geometry ---

    /// Un-rotated box in scene coordinates. For linear elements this is the
    /// box of the points offset by `x`/`y`.
    #[must_use]
    pub fn absolute_coords(&self) -> Bounds {
        match &self.data {
            ElementData::Linear(l) => {
                let b = Bounds::from_points(&l.points);
                Bounds::new(self.x + b.min_x, self.y + b.min_y, self.x + b.max_x, self.y + b.max_y)
            }
            ElementData::Shape | ElementData::Text(_) => {
                Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
            }
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.absolute_coords().center()
    }

    /// Axis-aligned box of the rotated element.
    #[must_use]
    pub fn aabb(&self) -> Bounds {
        let b = self.absolute_coords();
        Bounds::of_rotated_rect(b.min_x, b.min_y, b.width(), b.height(), self.angle)
    }

    // --- Updates ---

    /// Apply a sparse update in place. Returns whether any field changed.
    ///
    /// Non-finite geometry is rejected field by field.
    pub fn apply_update(&mut self, update: &ElementUpdate) -> bool {
        let mut changed = false;
        let id = self.id;

        macro_rules! set_geom {
            ($field:ident) => {
                if let Some(v) = update.$field {
                    if !v.is_finite() {
                        warn!(%id, field = stringify!($field), "ignored non-finite geometry");
                    } else if self.$field != v {
                        self.$field = v;
                        changed = true;
                    }
                }
            };
        }
        macro_rules! set {
            ($target:expr, $value:expr) => {
                if let Some(v) = $value {
                    if $target != *v {
                        $target = v.clone();
                        changed = true;
                    }
                }
            };
        }

        set_geom!(x);
        set_geom!(y);
        set_geom!(width);
        set_geom!(height);
        set_geom!(angle);
        set!(self.is_deleted, &update.is_deleted);
        set!(self.locked, &update.locked);
        set!(self.group_ids, &update.group_ids);
        set!(self.frame_id, &update.frame_id);
        set!(self.bound_elements, &update.bound_elements);
        set!(self.custom_data, &update.custom_data);

        match &mut self.data {
            ElementData::Linear(l) => {
                if let Some(points) = &update.points {
                    if points.iter().all(|p| p.is_finite()) {
                        if l.points != *points {
                            l.points.clone_from(points);
                            changed = true;
                        }
                    } else {
                        warn!(%id, "ignored non-finite points");
                    }
                }
                set!(l.start_binding, &update.start_binding);
                set!(l.end_binding, &update.end_binding);
                set!(l.fixed_segments, &update.fixed_segments);
                set!(l.start_is_special, &update.start_is_special);
                set!(l.end_is_special, &update.end_is_special);
                set!(l.elbowed, &update.elbowed);
            }
            ElementData::Text(t) => {
                set!(t.text, &update.text);
                set!(t.original_text, &update.original_text);
                set!(t.container_id, &update.container_id);
                set!(t.text_align, &update.text_align);
                set!(t.vertical_align, &update.vertical_align);
                set!(t.auto_resize, &update.auto_resize);
                if let Some(size) = update.font_size {
                    if size.is_finite() && size > 0.0 && t.font_size != size {
                        t.font_size = size;
                        changed = true;
                    }
                }
            }
            ElementData::Shape => {}
        }
        changed
    }
}

/// Sparse update for an element. Only present fields are applied.
///
/// Nullable fields use `Option<Option<T>>`: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<GroupId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<Option<ElementId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_elements: Option<Vec<BoundElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Option<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_binding: Option<Option<PointBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_binding: Option<Option<PointBinding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_segments: Option<Vec<FixedSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_is_special: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_is_special: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<Option<ElementId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_resize: Option<bool>,
}

impl ElementUpdate {
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    #[must_use]
    pub fn binding(end: Endpoint, binding: Option<PointBinding>) -> Self {
        match end {
            Endpoint::Start => Self { start_binding: Some(binding), ..Self::default() },
            Endpoint::End => Self { end_binding: Some(binding), ..Self::default() },
        }
    }

    #[must_use]
    pub fn bound_elements(bound: Vec<BoundElement>) -> Self {
        Self { bound_elements: Some(bound), ..Self::default() }
    }

    /// Whether the update touches position, size or rotation.
    #[must_use]
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.angle.is_some()
            || self.points.is_some()
            || self.is_deleted.is_some()
    }
}
