//! Input model: modifier keys, nudge keys, resize handles, view flags and the
//! gesture state machine.
//!
//! `InputState` is the gesture tracked between its `begin_*` and `end_*`
//! calls on the engine, carrying what is needed to recompute the preview on
//! every pointer move and to commit it on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::element::ElementId;
use crate::geometry::Point;

/// Modifier keys held while a gesture or key press happens.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Large nudge steps.
    pub shift: bool,
    pub ctrl: bool,
    /// Alt / Option: duplicate on drag.
    pub alt: bool,
    /// Meta / Command.
    pub meta: bool,
}

/// A keyboard key, by the name the host reports (e.g. `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Arrow-key direction for nudging the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
    Left,
    Right,
}

impl Nudge {
    /// The nudge an arrow key stands for.
    #[must_use]
    pub fn from_key(key: &Key) -> Option<Self> {
        match key.0.as_str() {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    /// Displacement for a step of `step` scene units.
    #[must_use]
    pub fn delta(self, step: f64) -> Point {
        match self {
            Self::Up => Point::new(0.0, -step),
            Self::Down => Point::new(0.0, step),
            Self::Left => Point::new(-step, 0.0),
            Self::Right => Point::new(step, 0.0),
        }
    }
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    /// Handles that only change the height.
    #[must_use]
    pub fn is_vertical_only(self) -> bool {
        matches!(self, Self::N | Self::S)
    }

    /// Handles that only change the width.
    #[must_use]
    pub fn is_horizontal_only(self) -> bool {
        matches!(self, Self::E | Self::W)
    }

    /// Handles on the top edge; growing from them moves the element up.
    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Handles on the left edge; growing from them moves the element left.
    #[must_use]
    pub fn is_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

/// Host-controlled flags that gate editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Read-only viewing: every mutating operation is refused.
    pub view_mode: bool,
}

/// Gesture in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// One point handle of a linear element is being dragged.
    DraggingPoint {
        /// Id of the linear element being edited.
        id: ElementId,
        /// Index of the dragged point.
        index: usize,
    },
    /// Elements are being moved as a whole.
    MovingElements {
        /// Ids of the moved elements. Labels move with their containers.
        ids: Vec<ElementId>,
        /// Scene-space pointer position at the start of the move.
        origin: Point,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
