//! Geometry primitives for line-of-sight tests
//!
//! Everything here is pure math with no state. Coordinates are kernel space
//! (Y-up), see [`crate::lighting`].

use serde::{Deserialize, Serialize};

/// A point in 2D kernel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move `factor` of the way toward `target`
    #[inline]
    pub fn lerp(&self, target: &Point, factor: f32) -> Point {
        Point::new(
            self.x + (target.x - self.x) * factor,
            self.y + (target.y - self.y) * factor,
        )
    }
}

/// Binary orientation flag: true when `c` lies strictly to the left of the
/// directed segment `a -> b`.
///
/// There is no collinear case. Collinear points resolve to `false`, the same
/// as clockwise, so an edge-on configuration can be classified differently
/// depending on which side the other endpoint sits. [`segments_intersect`]
/// inherits this; see its tests for the exact behaviour.
#[inline]
pub fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether the closed bounding boxes of `a`-`b` and `c`-`d` share a point
#[inline]
pub fn boxes_overlap(a: Point, b: Point, c: Point, d: Point) -> bool {
    a.x.min(b.x) <= c.x.max(d.x)
        && c.x.min(d.x) <= a.x.max(b.x)
        && a.y.min(b.y) <= c.y.max(d.y)
        && c.y.min(d.y) <= a.y.max(b.y)
}

/// True when segment `a`-`b` crosses segment `c`-`d`.
///
/// Four-orientation test: the endpoints of each segment must fall on
/// different sides of the other segment's supporting line. Segments whose
/// bounding boxes are disjoint never cross; checking that first keeps
/// rounding noise in nearly collinear orientation products from reporting
/// a crossing between segments that are far apart.
#[inline]
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    boxes_overlap(a, b, c, d) && ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Numeric form of [`segments_intersect`] for flat compute-style callers:
/// `0.0` means the ray is blocked, `1.0` means it is clear.
#[inline]
pub fn clear_factor(a: Point, b: Point, c: Point, d: Point) -> f32 {
    if segments_intersect(a, b, c, d) {
        0.0
    } else {
        1.0
    }
}
