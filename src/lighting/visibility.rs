//! Bounding-box rejection ahead of the exact intersection test

use crate::geometry::Point;

/// Spans narrower than this always count as overlapping, and overlap tests
/// are widened by the same margin.
pub const PRUNE_EPSILON: f32 = 1e-3;

#[inline]
fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Whether the closed intervals `[a0, a1]` and `[b0, b1]` (in any order)
/// overlap, with near-zero-width spans treated as overlapping.
#[inline]
pub fn spans_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
    let (lo_a, hi_a) = ordered(a0, a1);
    let (lo_b, hi_b) = ordered(b0, b1);
    if hi_a - lo_a < PRUNE_EPSILON || hi_b - lo_b < PRUNE_EPSILON {
        return true;
    }
    lo_a <= hi_b + PRUNE_EPSILON && lo_b <= hi_a + PRUNE_EPSILON
}

/// Cheap test for whether the obstacle `start`–`end` could lie between
/// `source` and `pixel`.
///
/// The obstacle is rejected only when its extents miss the ray's extents on
/// both axes by more than [`PRUNE_EPSILON`]. That implies the exact boxes are
/// disjoint, and [`segments_intersect`] never reports a crossing for
/// disjoint boxes, so a `false` here never hides one.
///
/// [`segments_intersect`]: crate::geometry::segments_intersect
#[inline]
pub fn may_occlude(source: Point, pixel: Point, start: Point, end: Point) -> bool {
    spans_overlap(source.x, pixel.x, start.x, end.x)
        || spans_overlap(source.y, pixel.y, start.y, end.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans() {
        assert!(spans_overlap(0.0, 10.0, 5.0, 15.0));
        assert!(spans_overlap(10.0, 0.0, 15.0, 5.0));
        assert!(spans_overlap(0.0, 10.0, 10.0, 20.0));
        assert!(!spans_overlap(0.0, 10.0, 11.0, 20.0));
    }

    #[test]
    fn test_narrow_span_always_overlaps() {
        // A vertical ray has zero x-width
        assert!(spans_overlap(5.0, 5.0, 100.0, 200.0));
        assert!(spans_overlap(0.0, 1.0, 50.0, 50.0005));
    }

    #[test]
    fn test_far_obstacle_rejected() {
        let source = Point::new(0.0, 0.0);
        let pixel = Point::new(10.0, 10.0);
        assert!(!may_occlude(
            source,
            pixel,
            Point::new(50.0, 50.0),
            Point::new(60.0, 70.0)
        ));
    }

    #[test]
    fn test_one_axis_overlap_is_kept() {
        let source = Point::new(0.0, 0.0);
        let pixel = Point::new(10.0, 10.0);
        // x overlaps, y does not
        assert!(may_occlude(
            source,
            pixel,
            Point::new(2.0, 50.0),
            Point::new(8.0, 60.0)
        ));
    }

    #[test]
    fn test_rejection_implies_exact_miss() {
        use crate::geometry::segments_intersect;
        let mut rng = crate::util::Rng::new(0xb0c5);
        let mut point = || Point::new(rng.range_f32(-100.0, 100.0), rng.range_f32(-100.0, 100.0));
        for _ in 0..20_000 {
            let (s, p, a, b) = (point(), point(), point(), point());
            if !may_occlude(s, p, a, b) {
                assert!(!segments_intersect(s, p, a, b));
            }
        }
    }
}
