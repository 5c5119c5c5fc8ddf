//! Axis headings used by the elbow router.

#[cfg(test)]
#[path = "heading_test.rs"]
mod heading_test;

use crate::consts::SEARCH_CONE_MULTIPLIER;
use crate::element::{Element, ElementKind};
use crate::geometry::{Bounds, Point, triangle_includes_point};

/// One of the four axis directions, in screen coordinates (y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Right,
    Down,
    Left,
    Up,
}

impl Heading {
    #[must_use]
    pub fn vector(self) -> Point {
        match self {
            Self::Right => Point::new(1.0, 0.0),
            Self::Down => Point::new(0.0, 1.0),
            Self::Left => Point::new(-1.0, 0.0),
            Self::Up => Point::new(0.0, -1.0),
        }
    }

    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
        }
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }

    /// Heading of a vector. Diagonals resolve right, left, down, then up;
    /// the zero vector is `Left`.
    #[must_use]
    pub fn from_vector(v: Point) -> Self {
        let abs_x = v.x.abs();
        let abs_y = v.y.abs();
        if v.x > abs_y {
            Self::Right
        } else if v.x <= -abs_y {
            Self::Left
        } else if v.y > abs_x {
            Self::Down
        } else {
            Self::Up
        }
    }

    /// Heading from `origin` towards `p`.
    #[must_use]
    pub fn for_point(p: Point, origin: Point) -> Self {
        Self::from_vector(p - origin)
    }
}

/// Side of `el` facing `p`: the four cones from the center through the
/// corners of `aabb` scaled up. Diamonds use the cones through their vertices.
#[must_use]
pub fn heading_for_point_from_element(el: &Element, aabb: &Bounds, p: Point) -> Heading {
    let mid = aabb.center();
    if el.kind == ElementKind::Diamond {
        if p.x < el.x {
            return Heading::Left;
        } else if p.y < el.y {
            return Heading::Up;
        } else if p.x > el.x + el.width {
            return Heading::Right;
        } else if p.y > el.y + el.height {
            return Heading::Down;
        }
        let cone = |v: Point| v.scale_from(mid, SEARCH_CONE_MULTIPLIER).rotate_around(mid, el.angle);
        let top = cone(Point::new(el.x + el.width / 2.0, el.y));
        let right = cone(Point::new(el.x + el.width, el.y + el.height / 2.0));
        let bottom = cone(Point::new(el.x + el.width / 2.0, el.y + el.height));
        let left = cone(Point::new(el.x, el.y + el.height / 2.0));
        return if triangle_includes_point(top, right, mid, p) {
            heading_for_diamond(top, right)
        } else if triangle_includes_point(right, bottom, mid, p) {
            heading_for_diamond(right, bottom)
        } else if triangle_includes_point(bottom, left, mid, p) {
            heading_for_diamond(bottom, left)
        } else {
            heading_for_diamond(left, top)
        };
    }

    let [top_left, top_right, bottom_right, bottom_left] =
        aabb.corners().map(|c| c.scale_from(mid, SEARCH_CONE_MULTIPLIER));
    if triangle_includes_point(top_left, top_right, mid, p) {
        Heading::Up
    } else if triangle_includes_point(top_right, bottom_right, mid, p) {
        Heading::Right
    } else if triangle_includes_point(bottom_right, bottom_left, mid, p) {
        Heading::Down
    } else {
        Heading::Left
    }
}

/// Heading of the diamond side running from `a` to `b`.
fn heading_for_diamond(a: Point, b: Point) -> Heading {
    let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees().rem_euclid(360.0);
    if !(45.0..315.0).contains(&angle) {
        Heading::Up
    } else if angle < 135.0 {
        Heading::Right
    } else if angle < 225.0 {
        Heading::Down
    } else {
        Heading::Left
    }
}
