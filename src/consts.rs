//! Shared numeric constants for the scene crate.

// ── Binding ─────────────────────────────────────────────────────

/// Lower bound of the binding gap, in scene units.
pub const MIN_BINDING_GAP: f64 = 16.0;

/// Upper bound of the size-derived part of the binding gap.
pub const MAX_SIZE_BINDING_GAP: f64 = 32.0;

/// Fraction of the smaller side used for the size-derived binding gap.
pub const BINDING_GAP_SIZE_FRACTION: f64 = 0.25;

/// Screen-pixel slop added to the zoom-derived binding gap.
pub const BINDING_GAP_ZOOM_PX: f64 = 10.0;

/// Gap written into a binding whose measured gap exceeds the binding threshold.
pub const FALLBACK_BINDING_GAP: f64 = 14.0;

/// Distance between an elbow arrow endpoint and the outline it is bound to.
pub const FIXED_BINDING_DISTANCE: f64 = 5.0;

/// Relative tolerance around an edge midpoint that snaps an elbow endpoint to it.
pub const SNAP_TO_MID_TOLERANCE: f64 = 0.05;

/// Clamp range of the absolute snap-to-mid tolerance, in scene units.
pub const SNAP_TO_MID_MIN: f64 = 5.0;
pub const SNAP_TO_MID_MAX: f64 = 80.0;

/// Normalized fixed-point coordinate that is nudged off the exact center.
pub const FIXED_POINT_CENTER: f64 = 0.5;
pub const FIXED_POINT_CENTER_NUDGED: f64 = 0.5001;

// ── Elbow routing ───────────────────────────────────────────────

/// Points closer than this are merged when simplifying a route.
pub const DEDUP_THRESHOLD: f64 = 1.0;

/// Default clearance kept around bound shapes by the router.
pub const BASE_PADDING: f64 = 40.0;

/// Standoff in front of a bound shape when the endpoint carries an arrowhead.
pub const ARROWHEAD_STANDOFF: f64 = 30.0;

/// Standoff in front of a bound shape when the endpoint has no arrowhead.
pub const PLAIN_STANDOFF: f64 = 10.0;

/// Absolute coordinate limit for elbow arrow points.
pub const MAX_POS: f64 = 1e6;

/// Two coordinates within this distance count as aligned on an axis.
pub const ORTHOGONAL_TOLERANCE: f64 = 1.0;

// ── Text ────────────────────────────────────────────────────────

/// Padding between a container's edge and its bound text.
pub const BOUND_TEXT_PADDING: f64 = 5.0;

/// Fraction of an arrow's width available to its label.
pub const ARROW_LABEL_WIDTH_FRACTION: f64 = 0.7;

/// Minimum label width of an arrow label, as a multiple of the font size.
pub const ARROW_LABEL_FONT_SIZE_TO_MIN_WIDTH_RATIO: f64 = 11.0;

/// Vertical room reserved around an arrow label.
pub const ARROW_LABEL_VERTICAL_ROOM: f64 = 80.0;

/// Default per-character advance as a fraction of the font size.
pub const DEFAULT_CHAR_WIDTH_RATIO: f64 = 0.5;

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a shape is clamped to.
pub const MIN_DIMENSION: f64 = 1.0;

/// Tolerance used when comparing computed geometry.
pub const EPSILON: f64 = 1e-9;

/// Scale applied to a box when deriving the entry cone of a heading.
pub const SEARCH_CONE_MULTIPLIER: f64 = 2.0;

// ── View ────────────────────────────────────────────────────────

/// Zoom range the camera accepts.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 30.0;
