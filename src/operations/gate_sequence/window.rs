use crate::error::{ConstructionError, Result};
use crate::geometry::Boundary;
use crate::math::wrap::wrap;
use crate::math::Point2;

/// A contiguous run of boundary points inside an arc-length window, with the
/// cumulative distance of every point.
///
/// The first and last entries are interpolated window endpoints; everything
/// between is an actual boundary vertex. Near the closed-loop seam the
/// distance list can drop back to zero mid-window.
#[derive(Debug, Clone)]
pub struct BoundaryWindow {
    pub points: Vec<Point2>,
    pub distances: Vec<f64>,
}

/// Extracts the boundary points within `half_window` of the expected next
/// crossing at `prev_dist + gate_step`, wrapping around the closed seam.
///
/// Restricting the search to this window keeps the per-gate work local and
/// makes the crossing unambiguous on self-approaching layouts such as
/// figure-eight tracks. If the walk comes back around to its starting vertex
/// before reaching the window end (window larger than the whole loop), the
/// partial window is returned with a diagnostic.
///
/// # Errors
///
/// Returns `ConstructionError::OpenBoundaryUnsupported` for open boundaries;
/// only the wrapping variant is implemented.
pub fn extract(
    boundary: &Boundary,
    prev_dist: f64,
    gate_step: f64,
    half_window: f64,
) -> Result<BoundaryWindow> {
    if !boundary.closed() {
        return Err(ConstructionError::OpenBoundaryUnsupported.into());
    }

    let total = boundary.total_length();
    let dist_start = wrap(prev_dist + gate_step - half_window, 0.0, total);
    let dist_stop = wrap(prev_dist + gate_step + half_window, 0.0, total);

    let mut distances = vec![dist_start];
    let mut points = vec![boundary.sample_at(dist_start)];

    let n = boundary.len();
    let table = boundary.distances();

    // First vertex at or after the window start; step past it when the start
    // falls exactly on a vertex.
    let i_start = table.partition_point(|&d| d < dist_start);
    let mut i = if table[i_start] == dist_start {
        (i_start + 1) % n
    } else {
        i_start % n
    };

    let mut prev = dist_start;
    loop {
        let d = table[i];
        if (prev <= dist_stop && dist_stop <= d) || (d < prev && prev <= dist_stop) {
            distances.push(dist_stop);
            points.push(boundary.sample_at(dist_stop));
            break;
        }
        distances.push(d);
        points.push(boundary.point2_at(i));
        prev = d;
        i = (i + 1) % n;
        if i == i_start {
            log::warn!(
                "boundary window [{dist_start:.3}, {dist_stop:.3}] wrapped the whole loop \
                 without closing"
            );
            break;
        }
    }

    Ok(BoundaryWindow { points, distances })
}
