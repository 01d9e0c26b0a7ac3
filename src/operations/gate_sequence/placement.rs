use super::window::BoundaryWindow;
use crate::error::Result;
use crate::geometry::Gate;
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::minimize::NelderMead;
use crate::math::vector_2d::rotate_ccw;
use crate::math::{Point2, Vector2};

/// A candidate gate placed relative to the previous one, with its measured
/// widths to the left and right boundary windows.
///
/// A width of exactly the gate half-width means the chord never crossed that
/// window; the clamp value propagates bit-identically so callers can test it
/// with `==`.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub gate: Gate,
    pub left_width: f64,
    pub right_width: f64,
}

/// Minimum distance from the gate midpoint to a crossing between the gate
/// chord and the window polyline, or `None` when they never cross.
#[must_use]
pub fn width_to_window(gate: &Gate, window: &BoundaryWindow) -> Option<f64> {
    let mut best: Option<f64> = None;
    for pair in window.points.windows(2) {
        if let Some((hit, _, _)) =
            segment_segment_intersect_2d(&pair[0], &pair[1], &gate.chord.a, &gate.chord.b)
        {
            let d = (hit - gate.midpoint).norm();
            best = Some(best.map_or(d, |b| b.min(d)));
        }
    }
    best
}

/// Places a candidate gate `step` ahead of the previous one.
///
/// `params = [heading, angle]`: `heading` is the anti-clockwise angle from
/// the previous direction along which the midpoint steps, `angle` the extra
/// anti-clockwise rotation of the new chord relative to that heading.
#[must_use]
pub fn place_gate(
    params: [f64; 2],
    prev_midpoint: Point2,
    prev_direction: Vector2,
    half_width: f64,
    step: f64,
    left: &BoundaryWindow,
    right: &BoundaryWindow,
) -> Placement {
    let [heading, angle] = params;
    let midpoint = prev_midpoint + rotate_ccw(&prev_direction, heading) * step;
    let direction = rotate_ccw(&prev_direction, heading + angle);
    let gate = Gate::from_midpoint(midpoint, direction, half_width);
    let left_width = width_to_window(&gate, left).unwrap_or(half_width);
    let right_width = width_to_window(&gate, right).unwrap_or(half_width);
    Placement {
        gate,
        left_width,
        right_width,
    }
}

/// Score for the placement solve: minimal when the gate is centred between
/// the boundaries with the smallest total width.
///
/// A missed window reports a width of exactly `half_width`; that case scores
/// strictly worse than any placement with two real crossings, steering the
/// solver back without treating the clamp value as a measurement.
#[allow(clippy::float_cmp)] // missed-window widths are clamped to exactly `half_width`
fn placement_score(placement: &Placement, half_width: f64) -> f64 {
    let (l, r) = (placement.left_width, placement.right_width);
    if l == half_width || r == half_width {
        2.0 * half_width + (l - r).abs()
    } else {
        l + r + (l - r).abs()
    }
}

/// Solves for the next gate placement relative to the previous gate.
///
/// # Errors
///
/// Returns `ConstructionError::SolverStalled` when the minimizer exhausts its
/// iteration cap.
pub fn solve_next_gate(
    prev_midpoint: Point2,
    prev_direction: Vector2,
    half_width: f64,
    step: f64,
    left: &BoundaryWindow,
    right: &BoundaryWindow,
    solver: &NelderMead,
) -> Result<Placement> {
    let params = solver.minimize(
        |params| {
            let candidate = place_gate(
                params,
                prev_midpoint,
                prev_direction,
                half_width,
                step,
                left,
                right,
            );
            placement_score(&candidate, half_width)
        },
        [0.0, 0.0],
    )?;
    Ok(place_gate(
        params,
        prev_midpoint,
        prev_direction,
        half_width,
        step,
        left,
        right,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A straight corridor: left wall at y = 20, right wall at y = 0.
    fn straight_windows() -> (BoundaryWindow, BoundaryWindow) {
        let left = BoundaryWindow {
            points: (0..9)
                .map(|i| Point2::new(f64::from(i) * 10.0, 20.0))
                .collect(),
            distances: (0..9).map(|i| f64::from(i) * 10.0).collect(),
        };
        let right = BoundaryWindow {
            points: (0..9)
                .map(|i| Point2::new(f64::from(i) * 10.0, 0.0))
                .collect(),
            distances: (0..9).map(|i| f64::from(i) * 10.0).collect(),
        };
        (left, right)
    }

    #[test]
    fn width_measures_nearest_crossing() {
        let (left, _) = straight_windows();
        let gate = Gate::from_midpoint(Point2::new(15.0, 10.0), Vector2::new(1.0, 0.0), 50.0);
        let w = width_to_window(&gate, &left).unwrap();
        assert!((w - 10.0).abs() < 1e-9, "w={w}");
    }

    #[test]
    fn width_none_when_window_missed() {
        let (left, _) = straight_windows();
        // Gate far beyond the window's x range.
        let gate = Gate::from_midpoint(Point2::new(500.0, 10.0), Vector2::new(1.0, 0.0), 50.0);
        assert!(width_to_window(&gate, &left).is_none());
    }

    #[test]
    fn place_gate_clamps_missed_sides() {
        let (left, right) = straight_windows();
        let placement = place_gate(
            [0.0, 0.0],
            Point2::new(480.0, 10.0),
            Vector2::new(1.0, 0.0),
            50.0,
            20.0,
            &left,
            &right,
        );
        assert!((placement.left_width - 50.0).abs() < f64::EPSILON);
        assert!((placement.right_width - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missed_window_scores_worse_than_any_real_placement() {
        let gate = Gate::from_midpoint(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 50.0);
        let missed = Placement {
            gate,
            left_width: 50.0,
            right_width: 30.0,
        };
        let real = Placement {
            gate,
            left_width: 49.9,
            right_width: 49.9,
        };
        assert!(placement_score(&missed, 50.0) > placement_score(&real, 50.0));
    }

    #[test]
    fn solver_centres_the_gate_on_a_straight() {
        let (left, right) = straight_windows();
        let placement = solve_next_gate(
            Point2::new(10.0, 10.0),
            Vector2::new(1.0, 0.0),
            50.0,
            20.0,
            &left,
            &right,
            &NelderMead::default(),
        )
        .unwrap();
        let mid = placement.gate.midpoint;
        assert!((mid.y - 10.0).abs() < 0.1, "midpoint y = {}", mid.y);
        assert!((placement.left_width - 10.0).abs() < 0.1);
        assert!((placement.right_width - 10.0).abs() < 0.1);
        assert!(
            (placement.left_width + placement.right_width - 20.0).abs() < 0.1,
            "total width = {}",
            placement.left_width + placement.right_width
        );
    }

    #[test]
    fn solver_follows_a_bend() {
        // Corridor turning upward: walls rotate 30 degrees at x = 40.
        let bend = |y0: f64| -> Vec<Point2> {
            let angle = 30_f64.to_radians();
            let mut pts: Vec<Point2> = (0..5)
                .map(|i| Point2::new(f64::from(i) * 10.0, y0))
                .collect();
            for i in 1..5 {
                let t = f64::from(i) * 10.0;
                pts.push(Point2::new(40.0 + t * angle.cos(), y0 + t * angle.sin()));
            }
            pts
        };
        let left_pts = bend(20.0);
        let right_pts = bend(0.0);
        let distances = |pts: &[Point2]| -> Vec<f64> {
            let mut d = vec![0.0];
            for pair in pts.windows(2) {
                d.push(d[d.len() - 1] + (pair[1] - pair[0]).norm());
            }
            d
        };
        let left = BoundaryWindow {
            distances: distances(&left_pts),
            points: left_pts,
        };
        let right = BoundaryWindow {
            distances: distances(&right_pts),
            points: right_pts,
        };
        let placement = solve_next_gate(
            Point2::new(35.0, 10.0),
            Vector2::new(1.0, 0.0),
            50.0,
            20.0,
            &left,
            &right,
            &NelderMead::default(),
        )
        .unwrap();
        // The new gate stays centred even though the corridor has turned.
        assert!(
            (placement.left_width - placement.right_width).abs() < 1.0,
            "widths {} vs {}",
            placement.left_width,
            placement.right_width
        );
        assert!(placement.left_width < 15.0);
    }
}
