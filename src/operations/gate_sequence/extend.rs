use crate::geometry::{Boundary, Gate};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::vector_2d::side_of_line;

/// Distance from the gate midpoint to the first crossing segment of an outer
/// boundary ring, plus the index of that segment to seed the next call.
///
/// With no cursor (first gate) the scan direction is chosen from which side
/// of the gate chord the ring's first point lies: at or behind the gate means
/// the crossing sits near the seam, so the scan runs backwards from the end.
/// With a cursor the scan always runs forward from it, which makes each call
/// near-constant time as consecutive gates advance around the ring.
///
/// A full revolution without a crossing returns `None` and leaves the cursor
/// unchanged; the caller falls back to the primary width.
pub fn width_to_boundary(
    gate: &Gate,
    boundary: &Boundary,
    cursor: Option<usize>,
) -> (Option<f64>, Option<usize>) {
    let n = boundary.len();
    let (mut i, step): (usize, isize) = match cursor {
        Some(start) => (start, 1),
        None => {
            let first = &boundary.points()[0];
            let (a, b) = (gate.chord.a, gate.chord.b);
            if side_of_line(first.x, first.y, a.x, a.y, b.x, b.y) >= 0.0 {
                (n - 1, -1)
            } else {
                (0, 1)
            }
        }
    };

    for _ in 0..n {
        let next = if step > 0 { (i + 1) % n } else { (i + n - 1) % n };
        let seg_a = boundary.point2_at(i);
        let seg_b = boundary.point2_at(next);
        if let Some((hit, _, _)) =
            segment_segment_intersect_2d(&seg_a, &seg_b, &gate.chord.a, &gate.chord.b)
        {
            return (Some((hit - gate.midpoint).norm()), Some(i));
        }
        i = next;
    }

    log::warn!(
        "no crossing with the outer boundary for the gate at ({:.3}, {:.3})",
        gate.midpoint.x,
        gate.midpoint.y
    );
    (None, cursor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Point3, Vector2};

    /// Closed ring around the origin: a 200x200 square traversed
    /// anti-clockwise, 4 vertices plus the closing point. Large enough that
    /// a 50-unit half-width chord only reaches one edge at a time.
    fn ring() -> Boundary {
        Boundary::new(
            vec![
                Point3::new(-100.0, -100.0, 0.0),
                Point3::new(100.0, -100.0, 0.0),
                Point3::new(100.0, 100.0, 0.0),
                Point3::new(-100.0, 100.0, 0.0),
                Point3::new(-100.0, -100.0, 0.0),
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn first_call_finds_the_crossing() {
        // Gate near the bottom edge, pointing +x.
        let gate = Gate::from_midpoint(Point2::new(0.0, -90.0), Vector2::new(1.0, 0.0), 50.0);
        let (width, cursor) = width_to_boundary(&gate, &ring(), None);
        // Crossing at (0, -100): 10 units below the midpoint.
        assert!((width.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(cursor, Some(1));
    }

    #[test]
    fn forward_scan_from_cursor() {
        let ring = ring();
        // First gate crosses the bottom edge.
        let gate = Gate::from_midpoint(Point2::new(0.0, -90.0), Vector2::new(1.0, 0.0), 50.0);
        let (_, cursor) = width_to_boundary(&gate, &ring, None);
        // Next gate crosses the right edge (segment 1), found forward.
        let gate = Gate::from_midpoint(Point2::new(90.0, 0.0), Vector2::new(0.0, 1.0), 50.0);
        let (width, cursor) = width_to_boundary(&gate, &ring, cursor);
        assert!((width.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(cursor, Some(1));
    }

    #[test]
    fn miss_returns_none_and_keeps_cursor() {
        let ring = ring();
        // Gate entirely inside the ring: a short chord crossing nothing.
        let gate = Gate::from_midpoint(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 5.0);
        let (width, cursor) = width_to_boundary(&gate, &ring, Some(2));
        assert!(width.is_none());
        assert_eq!(cursor, Some(2));
    }

    #[test]
    fn backward_scan_when_first_point_behind_the_gate() {
        // Gate near the right edge pointing +y: the ring's first point
        // (-100, -100) sits behind it, so the first scan runs backwards and
        // still lands on the crossing.
        let gate = Gate::from_midpoint(Point2::new(90.0, 0.0), Vector2::new(0.0, 1.0), 50.0);
        let (width, cursor) = width_to_boundary(&gate, &ring(), None);
        assert!((width.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(cursor, Some(2));
    }
}
