use super::window::BoundaryWindow;
use crate::geometry::Gate;
use crate::math::intersect_2d::segment_segment_intersect_2d;

/// Arc length along the boundary at which the gate chord crosses the window.
///
/// Scans consecutive window points for the first crossing segment, then
/// interpolates the arc length of the crossing point on whichever axis has
/// the larger coordinate spread across that segment (a near-vertical segment
/// interpolates on y, a near-horizontal one on x). Distances that drop
/// across the closed-loop seam are unwrapped by shifting the segment start
/// below zero so the interpolation stays monotonic; the result can then be
/// slightly negative, which wraps cleanly in the next window request.
///
/// If the gate missed the window entirely, returns the window's first
/// distance and leaves a diagnostic.
#[must_use]
pub fn crossing_distance(gate: &Gate, window: &BoundaryWindow, total_length: f64) -> f64 {
    for i in 0..window.points.len().saturating_sub(1) {
        let a = window.points[i];
        let b = window.points[i + 1];
        let Some((hit, _, _)) =
            segment_segment_intersect_2d(&a, &b, &gate.chord.a, &gate.chord.b)
        else {
            continue;
        };

        let mut d_start = window.distances[i];
        let d_end = window.distances[i + 1];
        if d_start > d_end {
            d_start -= total_length;
        }

        let span_x = (b.x - a.x).abs();
        let span_y = (b.y - a.y).abs();
        let t = if span_x > span_y {
            (hit.x - a.x) / (b.x - a.x)
        } else {
            (hit.y - a.y) / (b.y - a.y)
        };
        return d_start + t * (d_end - d_start);
    }

    log::warn!(
        "gate at ({:.3}, {:.3}) never crossed its boundary window, \
         falling back to the window start",
        gate.midpoint.x,
        gate.midpoint.y
    );
    window.distances[0]
}
