//! Geometry kernel: points, vectors, lines, bounds and rotations.
//!
//! Everything here is pure. Points double as vectors; `Line` is a normalized
//! implicit line `n·x + m·y + c = 0` whose evaluation at a point is the signed
//! distance to it. `Bounds` is an axis-aligned box stored as min/max corners.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point (or vector) in scene coordinates. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn manhattan(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product of two vectors.
    #[must_use]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalize(self) -> Point {
        let len = self.length();
        if len == 0.0 { Point::origin() } else { self * (1.0 / len) }
    }

    #[must_use]
    pub fn abs(self) -> Point {
        Point::new(self.x.abs(), self.y.abs())
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotate clockwise (screen coordinates, y down) by `angle` radians around `center`.
    #[must_use]
    pub fn rotate_around(self, center: Point, angle: f64) -> Point {
        if angle == 0.0 {
            return self;
        }
        let (sin, cos) = angle.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(dx * cos - dy * sin + center.x, dx * sin + dy * cos + center.y)
    }

    /// Scale the vector from `origin` to this point by `factor`.
    #[must_use]
    pub fn scale_from(self, origin: Point, factor: f64) -> Point {
        origin + (self - origin) * factor
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Exact coordinate equality within `tolerance` on both axes.
    #[must_use]
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// Replace a non-finite value with `fallback`.
#[must_use]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// A normalized implicit line `n·x + m·y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub n: f64,
    pub m: f64,
    pub c: f64,
}

impl Line {
    /// Line through `from` and `to`. A degenerate pair yields the zero line.
    #[must_use]
    pub fn through(from: Point, to: Point) -> Self {
        let n = from.y - to.y;
        let m = to.x - from.x;
        let c = to.y * from.x - to.x * from.y;
        let len = n.hypot(m);
        if len == 0.0 {
            return Self { n, m, c };
        }
        Self { n: n / len, m: m / len, c: c / len }
    }

    /// Line `a·x + b·y + c = 0`, normalized.
    #[must_use]
    pub fn equation(a: f64, b: f64, c: f64) -> Self {
        let len = a.hypot(b);
        if len == 0.0 {
            return Self { n: a, m: b, c };
        }
        Self { n: a / len, m: b / len, c: c / len }
    }

    /// Signed distance from `p` to the line.
    #[must_use]
    pub fn distance(&self, p: Point) -> f64 {
        self.n * p.x + self.m * p.y + self.c
    }

    /// Intersection with another line, if they are not parallel.
    #[must_use]
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let det = self.n * other.m - other.n * self.m;
        if det == 0.0 {
            return None;
        }
        let x = (self.m * other.c - other.m * self.c) / det;
        let y = (other.n * self.c - self.n * other.c) / det;
        let p = Point::new(x, y);
        p.is_finite().then_some(p)
    }
}

/// Intersection of segments `a0→a1` and `b0→b1`, half-open at the far ends.
#[must_use]
pub fn segments_intersect_at(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Point> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.cross(s);
    if denom == 0.0 {
        return None;
    }
    let i = b0 - a0;
    let u = i.cross(r) / denom;
    let t = i.cross(s) / denom;
    if u == 0.0 {
        return None;
    }
    let p = a0 + r * t;
    if (0.0..1.0).contains(&t) && (0.0..1.0).contains(&u) {
        return Some(p);
    }
    None
}

/// Whether `p` lies inside or on the triangle `a, b, c`.
#[must_use]
pub fn triangle_includes_point(a: Point, b: Point, c: Point, p: Point) -> bool {
    let sign = |p1: Point, p2: Point, p3: Point| (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y);
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box containing every point. Empty input yields a zero box.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        };
        points.iter().skip(1).fold(
            Self::new(first.x, first.y, first.x, first.y),
            |b, p| Self::new(b.min_x.min(p.x), b.min_y.min(p.y), b.max_x.max(p.x), b.max_y.max(p.y)),
        )
    }

    /// Axis-aligned box of the rectangle `x, y, w, h` rotated by `angle` around its center.
    #[must_use]
    pub fn of_rotated_rect(x: f64, y: f64, width: f64, height: f64, angle: f64) -> Self {
        let center = Point::new(x + width / 2.0, y + height / 2.0);
        let corners = [
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ]
        .map(|p| p.rotate_around(center, angle));
        Self::from_points(&corners)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Strict containment; points on the border are outside.
    #[must_use]
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.min_x && p.x < self.max_x && p.y > self.min_y && p.y < self.max_y
    }

    /// Inclusive containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Grow each side independently. Offsets are `[up, right, down, left]`.
    #[must_use]
    pub fn expand(&self, [up, right, down, left]: [f64; 4]) -> Self {
        Self::new(self.min_x - left, self.min_y - up, self.max_x + right, self.max_y + down)
    }

    #[must_use]
    pub fn inflate(&self, by: f64) -> Self {
        self.expand([by; 4])
    }

    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x && self.max_x > other.min_x && self.min_y < other.max_y && self.max_y > other.min_y
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Corners in order top-left, top-right, bottom-right, bottom-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}
