use crate::error::{GeometryError, Result};
use crate::math::vector_2d::perp_ccw;
use crate::math::{Point2, Vector2, TOLERANCE};

/// A finite 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    /// Creates a segment between two endpoints.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }
}

/// A transverse cross-section of the track corridor.
///
/// `direction` is the unit forward-travel tangent, the left→right chord
/// vector rotated 90° anti-clockwise. `chord` is the symmetric half-width
/// segment about the midpoint, running from the left end to the right end;
/// it is what gets intersected against the boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    pub midpoint: Point2,
    pub direction: Vector2,
    pub chord: Segment,
}

impl Gate {
    /// Builds the gate through two boundary points, reaching `half_width`
    /// either side of their midpoint.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroVector` if the two points coincide.
    pub fn from_points(left: Point2, right: Point2, half_width: f64) -> Result<Self> {
        let midpoint = Point2::new((left.x + right.x) / 2.0, (left.y + right.y) / 2.0);
        let across = Vector2::new(right.x - left.x, right.y - left.y);
        let norm = across.norm();
        if norm < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let direction = perp_ccw(&across) / norm;
        Ok(Self::from_midpoint(midpoint, direction, half_width))
    }

    /// Builds the symmetric gate about `midpoint`, perpendicular to the unit
    /// `direction`.
    #[must_use]
    pub fn from_midpoint(midpoint: Point2, direction: Vector2, half_width: f64) -> Self {
        let chord = extend_line(midpoint, &direction, half_width, half_width);
        Self {
            midpoint,
            direction,
            chord,
        }
    }

    /// Exact chord equality, used to recognise a start or finish gate that
    /// coincides with an already-placed gate.
    #[must_use]
    pub fn coincides_with(&self, other: &Gate) -> bool {
        self.chord == other.chord
    }
}

/// The gate chord stretched to independent widths each side of the midpoint,
/// left end first. Used as the corridor footprint in overlap tests.
#[must_use]
pub fn extend_line(
    midpoint: Point2,
    direction: &Vector2,
    left_width: f64,
    right_width: f64,
) -> Segment {
    let n = perp_ccw(direction);
    Segment::new(midpoint + n * left_width, midpoint - n * right_width)
}

/// A committed gate together with its measured widths.
///
/// The extend widths are stored already maxed against the primary widths, so
/// `left_extend_width >= left_width` and `right_extend_width >= right_width`
/// always hold.
#[derive(Debug, Clone, Copy)]
pub struct GateRecord {
    pub gate: Gate,
    pub left_width: f64,
    pub right_width: f64,
    pub left_extend_width: f64,
    pub right_extend_width: f64,
}

/// The finished, immutable sequence of gates.
///
/// Parallel arrays over the committed gates, plus the indices of the gates
/// sitting on the start and finish lines.
#[derive(Debug, Clone)]
pub struct GateSequence {
    midpoints: Vec<Point2>,
    directions: Vec<Vector2>,
    left_widths: Vec<f64>,
    right_widths: Vec<f64>,
    left_extend_widths: Vec<f64>,
    right_extend_widths: Vec<f64>,
    start_gate_index: usize,
    finish_gate_index: usize,
}

impl GateSequence {
    pub(crate) fn freeze(
        records: &[GateRecord],
        start_gate_index: usize,
        finish_gate_index: usize,
    ) -> Self {
        Self {
            midpoints: records.iter().map(|r| r.gate.midpoint).collect(),
            directions: records.iter().map(|r| r.gate.direction).collect(),
            left_widths: records.iter().map(|r| r.left_width).collect(),
            right_widths: records.iter().map(|r| r.right_width).collect(),
            left_extend_widths: records.iter().map(|r| r.left_extend_width).collect(),
            right_extend_widths: records.iter().map(|r| r.right_extend_width).collect(),
            start_gate_index,
            finish_gate_index,
        }
    }

    /// Number of gates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.midpoints.len()
    }

    /// Whether the sequence holds no gates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }

    /// Gate midpoints, in travel order.
    #[must_use]
    pub fn midpoints(&self) -> &[Point2] {
        &self.midpoints
    }

    /// Unit forward-travel directions, parallel to `midpoints`.
    #[must_use]
    pub fn directions(&self) -> &[Vector2] {
        &self.directions
    }

    /// Distances from each midpoint to the left primary boundary.
    #[must_use]
    pub fn left_widths(&self) -> &[f64] {
        &self.left_widths
    }

    /// Distances from each midpoint to the right primary boundary.
    #[must_use]
    pub fn right_widths(&self) -> &[f64] {
        &self.right_widths
    }

    /// Distances from each midpoint to the left extend boundary.
    #[must_use]
    pub fn left_extend_widths(&self) -> &[f64] {
        &self.left_extend_widths
    }

    /// Distances from each midpoint to the right extend boundary.
    #[must_use]
    pub fn right_extend_widths(&self) -> &[f64] {
        &self.right_extend_widths
    }

    /// Index of the gate on the start line.
    #[must_use]
    pub fn start_gate_index(&self) -> usize {
        self.start_gate_index
    }

    /// Index of the gate on the finish line.
    #[must_use]
    pub fn finish_gate_index(&self) -> usize {
        self.finish_gate_index
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_forward() {
        // Left at (0, 20), right at (0, 0): an anti-clockwise track heading +x.
        let gate = Gate::from_points(Point2::new(0.0, 20.0), Point2::new(0.0, 0.0), 50.0).unwrap();
        assert!((gate.midpoint.x).abs() < 1e-12);
        assert!((gate.midpoint.y - 10.0).abs() < 1e-12);
        assert!((gate.direction.x - 1.0).abs() < 1e-12);
        assert!((gate.direction.y).abs() < 1e-12);
    }

    #[test]
    fn chord_is_symmetric_about_midpoint() {
        let gate = Gate::from_points(Point2::new(0.0, 20.0), Point2::new(0.0, 0.0), 50.0).unwrap();
        // Left chord end is on the left boundary side.
        assert!((gate.chord.a.y - 60.0).abs() < 1e-12);
        assert!((gate.chord.b.y + 40.0).abs() < 1e-12);
        assert!((gate.chord.a.x).abs() < 1e-12);
        assert!((gate.chord.b.x).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_rejected() {
        let p = Point2::new(3.0, 4.0);
        assert!(Gate::from_points(p, p, 50.0).is_err());
    }

    #[test]
    fn extend_line_is_asymmetric() {
        let mid = Point2::new(0.0, 0.0);
        let dir = Vector2::new(1.0, 0.0);
        let line = extend_line(mid, &dir, 30.0, 10.0);
        assert!((line.a.y - 30.0).abs() < 1e-12);
        assert!((line.b.y + 10.0).abs() < 1e-12);
    }

    #[test]
    fn coincides_is_exact() {
        let left = Point2::new(0.0, 20.0);
        let right = Point2::new(0.0, 0.0);
        let a = Gate::from_points(left, right, 50.0).unwrap();
        let b = Gate::from_points(left, right, 50.0).unwrap();
        assert!(a.coincides_with(&b));
        let c = Gate::from_points(Point2::new(1e-12, 20.0), right, 50.0).unwrap();
        assert!(!a.coincides_with(&c));
    }

    #[test]
    fn freeze_preserves_order_and_indices() {
        let gate = Gate::from_points(Point2::new(0.0, 20.0), Point2::new(0.0, 0.0), 50.0).unwrap();
        let record = GateRecord {
            gate,
            left_width: 10.0,
            right_width: 10.0,
            left_extend_width: 12.0,
            right_extend_width: 11.0,
        };
        let seq = GateSequence::freeze(&[record, record, record], 0, 2);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.start_gate_index(), 0);
        assert_eq!(seq.finish_gate_index(), 2);
        assert!((seq.left_extend_widths()[1] - 12.0).abs() < 1e-12);
    }
}
