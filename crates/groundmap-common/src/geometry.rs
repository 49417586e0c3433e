//! 2D geometry kernel for ground maps
//!
//! Points, segments and lines in scene pixel space, plus the orientation
//! predicate everything else is built on. All operations are exact on `f64`
//! inputs: no tolerance is applied anywhere in this module.

use crate::Point;

/// Orientation of an ordered triple of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The three points lie on one line
    Collinear,
    /// Negative cross product
    Clockwise,
    /// Positive cross product
    CounterClockwise,
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Midpoint of two points.
#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    (a + b) * 0.5
}

/// Twice the signed area of the triangle `abc`.
#[inline]
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Orientation of `c` relative to the directed line `a -> b`.
///
/// The collinear case is an exact comparison against zero.
#[inline]
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let area = cross(a, b, c);
    if area == 0.0 {
        Orientation::Collinear
    } else if area > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Infinite line through a reference point along a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    reference: Point,
    direction: Point,
}

impl Line {
    /// Line through `a` and `b`. The direction is zero when `a == b`.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            reference: a,
            direction: (b - a).normalize_or_zero(),
        }
    }

    /// Unit direction of the line
    pub fn direction(&self) -> Point {
        self.direction
    }

    /// Orthogonal projection of `p` onto the line
    pub fn projection(&self, p: Point) -> Point {
        let along = (p - self.reference).dot(self.direction);
        self.reference + self.direction * along
    }

    /// Perpendicular distance from `p` to the line
    pub fn distance(&self, p: Point) -> f64 {
        p.distance(self.projection(p))
    }
}

/// Segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub source: Point,
    pub target: Point,
}

impl Segment {
    pub fn new(source: Point, target: Point) -> Self {
        Self { source, target }
    }

    pub fn length(&self) -> f64 {
        distance(self.source, self.target)
    }

    pub fn midpoint(&self) -> Point {
        midpoint(self.source, self.target)
    }

    /// Supporting line of the segment
    pub fn to_line(&self) -> Line {
        Line::new(self.source, self.target)
    }

    /// Checks whether two segments cross.
    ///
    /// This is the general-position half of the classic four-orientation
    /// test: the segments intersect when each one separates the endpoints of
    /// the other. Touching configurations where exactly one orientation is
    /// collinear still count, but collinear overlaps (all four orientations
    /// collinear) are reported as non-intersecting. Callers rely on that
    /// simplification; it is not a general robust predicate.
    pub fn intersects(&self, other: &Segment) -> bool {
        let o1 = orientation(self.source, self.target, other.source);
        let o2 = orientation(self.source, self.target, other.target);
        let o3 = orientation(other.source, other.target, self.source);
        let o4 = orientation(other.source, other.target, self.target);
        o1 != o2 && o3 != o4
    }

    /// Projects `p` onto the supporting line.
    ///
    /// Returns the foot of the perpendicular and whether it lies strictly
    /// inside the segment span. A zero-length segment never contains a
    /// projection.
    pub fn projection(&self, p: Point) -> (Point, bool) {
        let line = self.to_line();
        let foot = line.projection(p);
        let along = (foot - self.source).dot(line.direction());
        let inside = along > 0.0 && distance(self.source, foot) < self.length();
        (foot, inside)
    }
}
