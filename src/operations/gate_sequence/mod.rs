mod extend;
mod placement;
mod resolve;
mod window;

use crate::error::{ConstructionError, GeometryError, Result};
use crate::geometry::gate::extend_line;
use crate::geometry::{Boundary, Gate, GateRecord, GateSequence, HeightField, Segment, TrackBounds};
use crate::math::intersect_2d::segments_intersect;
use crate::math::minimize::NelderMead;
use crate::math::{Point2, Point3};
use placement::Placement;

/// Default spacing between consecutive gate midpoints.
pub const DEFAULT_GATE_STEP: f64 = 10.0;

/// Half-width of the symmetric chord a gate is placed with.
const GATE_HALF_WIDTH: f64 = 50.0;

/// Endpoint gap below which a track counts as a closed loop.
const CLOSED_GAP_THRESHOLD: f64 = 10.0;

/// A discretized track: the frozen corridor gates plus the surface-height
/// lookup and the bounds the construction ran under.
#[derive(Debug)]
pub struct Track {
    gates: GateSequence,
    heights: HeightField,
    bounds: TrackBounds,
    is_closed: bool,
}

impl Track {
    /// The frozen gate sequence.
    #[must_use]
    pub fn gates(&self) -> &GateSequence {
        &self.gates
    }

    /// The surface-height lookup.
    #[must_use]
    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    /// Axis-aligned bounds over all boundaries.
    #[must_use]
    pub fn bounds(&self) -> &TrackBounds {
        &self.bounds
    }

    /// Whether the track is a closed loop.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }
}

/// Builds the gate sequence for a pair of track boundary polylines.
///
/// Walks along the boundaries from their first points, repeatedly solving for
/// the next gate placement against a local boundary window, until the walk
/// crosses the terminal line. The start and finish lines must both be crossed
/// along the way; the gates sitting on them are spliced into the sequence.
///
/// ```no_run
/// use trackgate::TrackBuilder;
/// use nalgebra::Point3;
///
/// let left = vec![Point3::new(0.0, 20.0, 0.0) /* ... */];
/// let right = vec![Point3::new(0.0, 0.0, 0.0) /* ... */];
/// let track = TrackBuilder::new(left, right).gate_step(20.0).execute()?;
/// # Ok::<(), trackgate::TrackgateError>(())
/// ```
pub struct TrackBuilder {
    left: Vec<Point3>,
    right: Vec<Point3>,
    left_extend: Option<Vec<Point3>>,
    right_extend: Option<Vec<Point3>>,
    start_line: Option<[Point2; 2]>,
    finish_line: Option<[Point2; 2]>,
    is_closed: Option<bool>,
    gate_step: f64,
}

impl TrackBuilder {
    /// Creates a builder from the left and right boundary polylines.
    #[must_use]
    pub fn new(left: Vec<Point3>, right: Vec<Point3>) -> Self {
        Self {
            left,
            right,
            left_extend: None,
            right_extend: None,
            start_line: None,
            finish_line: None,
            is_closed: None,
            gate_step: DEFAULT_GATE_STEP,
        }
    }

    /// Outer limit beyond the left boundary (run-off edge). Defaults to the
    /// left boundary itself.
    #[must_use]
    pub fn left_extend(mut self, points: Vec<Point3>) -> Self {
        self.left_extend = Some(points);
        self
    }

    /// Outer limit beyond the right boundary. Defaults to the right boundary
    /// itself.
    #[must_use]
    pub fn right_extend(mut self, points: Vec<Point3>) -> Self {
        self.right_extend = Some(points);
        self
    }

    /// Explicit start line as its left and right end coordinates. Defaults to
    /// the first left/right boundary points (or the finish line on a closed
    /// track that has one).
    #[must_use]
    pub fn start_line(mut self, coords: [Point2; 2]) -> Self {
        self.start_line = Some(coords);
        self
    }

    /// Explicit finish line. Defaults to the start line on a closed track,
    /// else to the last left/right boundary points.
    #[must_use]
    pub fn finish_line(mut self, coords: [Point2; 2]) -> Self {
        self.finish_line = Some(coords);
        self
    }

    /// Forces the closed-loop flag instead of detecting it from the endpoint
    /// gap.
    #[must_use]
    pub fn closed(mut self, is_closed: bool) -> Self {
        self.is_closed = Some(is_closed);
        self
    }

    /// Target arc-length advance between consecutive gates.
    #[must_use]
    pub fn gate_step(mut self, gate_step: f64) -> Self {
        self.gate_step = gate_step;
        self
    }

    /// Executes the construction, returning the finished track.
    ///
    /// # Errors
    ///
    /// Fails when a boundary has fewer than 2 points, when the track is not a
    /// closed loop (open-track windowing is not implemented), when gate
    /// placement explodes out of the track bounds, when the placement solver
    /// stalls, or when the start or finish line is never crossed.
    #[allow(clippy::too_many_lines)]
    pub fn execute(self) -> Result<Track> {
        log::debug!("initialising track");

        if self.left.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                min: 2,
                got: self.left.len(),
            }
            .into());
        }
        if self.right.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                min: 2,
                got: self.right.len(),
            }
            .into());
        }

        let mut left = self.left;
        let mut right = self.right;
        let left_extend_provided = self.left_extend.is_some();
        let right_extend_provided = self.right_extend.is_some();
        let mut left_extend = self.left_extend.unwrap_or_else(|| left.clone());
        let mut right_extend = self.right_extend.unwrap_or_else(|| right.clone());

        let bounds = TrackBounds::from_boundaries([
            left.as_slice(),
            right.as_slice(),
            left_extend.as_slice(),
            right_extend.as_slice(),
        ]);

        // Height samples: every supplied boundary, without duplicating the
        // primaries when the extends merely alias them.
        let mut samples = Vec::with_capacity(
            left.len() + right.len() + left_extend.len() + right_extend.len(),
        );
        samples.extend_from_slice(&left);
        samples.extend_from_slice(&right);
        if left_extend_provided {
            samples.extend_from_slice(&left_extend);
        }
        if right_extend_provided {
            samples.extend_from_slice(&right_extend);
        }
        let heights = HeightField::from_samples(samples)?;

        let is_closed = self.is_closed.unwrap_or_else(|| {
            let gap_left = (left[0] - left[left.len() - 1]).norm();
            let gap_right = (right[0] - right[right.len() - 1]).norm();
            gap_left.max(gap_right) < CLOSED_GAP_THRESHOLD
        });

        if is_closed {
            close_ring(&mut left);
            close_ring(&mut right);
            close_ring(&mut left_extend);
            close_ring(&mut right_extend);
        }

        let start_coords: [Point2; 2] = match (self.start_line, self.finish_line) {
            (Some(coords), _) => coords,
            (None, Some(coords)) if is_closed => coords,
            (None, _) => [xy(&left[0]), xy(&right[0])],
        };
        let finish_coords: [Point2; 2] = match self.finish_line {
            Some(coords) => coords,
            None if is_closed => start_coords,
            None => [xy(&left[left.len() - 1]), xy(&right[right.len() - 1])],
        };
        let start_line = Segment::new(start_coords[0], start_coords[1]);
        let finish_line = Segment::new(finish_coords[0], finish_coords[1]);

        let left_boundary = Boundary::new(left, is_closed)?;
        let right_boundary = Boundary::new(right, is_closed)?;
        let left_extend_boundary = Boundary::new(left_extend, is_closed)?;
        let right_extend_boundary = Boundary::new(right_extend, is_closed)?;

        let mut state = BuildState {
            records: Vec::new(),
            left_cursor: None,
            right_cursor: None,
            left_extend: &left_extend_boundary,
            right_extend: &right_extend_boundary,
        };

        // The first gate comes straight from the first boundary points, not
        // from the placement solver.
        let first_left = left_boundary.point2_at(0);
        let first_right = right_boundary.point2_at(0);
        let first_gate = Gate::from_points(first_left, first_right, GATE_HALF_WIDTH)?;
        state.splice_gate(
            first_gate,
            (first_gate.midpoint - first_left).norm(),
            (first_gate.midpoint - first_right).norm(),
            "first",
        );

        // Terminal chord between the final boundary points; crossing it ends
        // the walk. On a closed loop this coincides with the first gate's
        // chord.
        let terminal_chord = Segment::new(
            left_boundary.point2_at(left_boundary.len() - 1),
            right_boundary.point2_at(right_boundary.len() - 1),
        );

        let solver = NelderMead::default();
        let half_window = 2.0 * self.gate_step;
        let mut prev_left_dist = 0.0;
        let mut prev_right_dist = 0.0;
        let mut prev_midpoint = first_gate.midpoint;
        let mut prev_direction = first_gate.direction;
        let mut start_index: Option<usize> = None;
        let mut finish_index: Option<usize> = None;

        log::debug!("creating track gates");
        loop {
            let left_window =
                window::extract(&left_boundary, prev_left_dist, self.gate_step, half_window)?;
            let right_window =
                window::extract(&right_boundary, prev_right_dist, self.gate_step, half_window)?;

            let candidate = placement::solve_next_gate(
                prev_midpoint,
                prev_direction,
                GATE_HALF_WIDTH,
                self.gate_step,
                &left_window,
                &right_window,
                &solver,
            )?;
            let gate = candidate.gate;

            if !bounds.contains(&gate.midpoint) || both_sides_missed(&candidate, GATE_HALF_WIDTH) {
                return Err(ConstructionError::Exploded {
                    x: gate.midpoint.x,
                    y: gate.midpoint.y,
                    x_min: bounds.x_min,
                    x_max: bounds.x_max,
                    y_min: bounds.y_min,
                    y_max: bounds.y_max,
                }
                .into());
            }

            // Where this gate crossed each boundary seeds the next window.
            prev_left_dist =
                resolve::crossing_distance(&gate, &left_window, left_boundary.total_length());
            prev_right_dist =
                resolve::crossing_distance(&gate, &right_window, right_boundary.total_length());

            // Extend widths for the candidate; the advanced cursors only
            // commit if the gate itself does.
            let (left_ext, left_cursor_candidate) =
                extend::width_to_boundary(&gate, &left_extend_boundary, state.left_cursor);
            let (right_ext, right_cursor_candidate) =
                extend::width_to_boundary(&gate, &right_extend_boundary, state.right_cursor);

            let midline = Segment::new(state.last().gate.midpoint, gate.midpoint);

            if start_index.is_none() && lines_cross(&midline, &start_line) {
                let start_gate =
                    Gate::from_points(start_coords[0], start_coords[1], GATE_HALF_WIDTH)?;
                if start_gate.coincides_with(&state.last().gate) {
                    start_index = Some(state.records.len() - 1);
                } else if start_gate.coincides_with(&gate) {
                    start_index = Some(state.records.len());
                } else {
                    let lw = placement::width_to_window(&start_gate, &left_window)
                        .unwrap_or(GATE_HALF_WIDTH);
                    let rw = placement::width_to_window(&start_gate, &right_window)
                        .unwrap_or(GATE_HALF_WIDTH);
                    state.splice_gate(start_gate, lw, rw, "start");
                    start_index = Some(state.records.len() - 1);
                }
                log::debug!("start gate index: {start_index:?}");
            }

            if finish_index.is_none() && lines_cross(&midline, &finish_line) {
                let finish_gate =
                    Gate::from_points(finish_coords[0], finish_coords[1], GATE_HALF_WIDTH)?;
                if finish_gate.coincides_with(&state.last().gate) {
                    finish_index = Some(state.records.len() - 1);
                } else if finish_gate.coincides_with(&gate) {
                    // A finish line identical to the start line is already
                    // covered by the start gate.
                    finish_index = if start_line == finish_line {
                        start_index
                    } else {
                        Some(state.records.len())
                    };
                } else {
                    let lw = placement::width_to_window(&finish_gate, &left_window)
                        .unwrap_or(GATE_HALF_WIDTH);
                    let rw = placement::width_to_window(&finish_gate, &right_window)
                        .unwrap_or(GATE_HALF_WIDTH);
                    state.splice_gate(finish_gate, lw, rw, "finish");
                    finish_index = Some(state.records.len() - 1);
                }
                log::debug!("finish gate index: {finish_index:?}");
            }

            // At least 4 gates guards against the first midline touching the
            // terminal chord at the shared seam.
            if state.records.len() >= 4 && lines_cross(&midline, &terminal_chord) {
                if !is_closed {
                    // Open track: the closing gate is a real gate of its own.
                    let closing_left = left_boundary.point2_at(left_boundary.len() - 1);
                    let closing_right = right_boundary.point2_at(right_boundary.len() - 1);
                    let closing_gate =
                        Gate::from_points(closing_left, closing_right, GATE_HALF_WIDTH)?;
                    state.splice_gate(
                        closing_gate,
                        (closing_gate.midpoint - closing_left).norm(),
                        (closing_gate.midpoint - closing_right).norm(),
                        "closing",
                    );
                }
                log::debug!("finished gate creation with {} gates", state.records.len());
                break;
            }

            let candidate_line = extend_line(
                gate.midpoint,
                &gate.direction,
                left_ext.unwrap_or(GATE_HALF_WIDTH),
                right_ext.unwrap_or(GATE_HALF_WIDTH),
            );
            let last_line = {
                let last = state.last();
                extend_line(
                    last.gate.midpoint,
                    &last.gate.direction,
                    last.left_extend_width,
                    last.right_extend_width,
                )
            };
            if lines_cross(&candidate_line, &last_line) {
                log::debug!(
                    "discarding the gate at ({:.3}, {:.3}): its corridor crosses the previous gate",
                    gate.midpoint.x,
                    gate.midpoint.y
                );
            } else {
                state.records.push(GateRecord {
                    gate,
                    left_width: candidate.left_width,
                    right_width: candidate.right_width,
                    left_extend_width: left_ext
                        .unwrap_or(GATE_HALF_WIDTH)
                        .max(candidate.left_width),
                    right_extend_width: right_ext
                        .unwrap_or(GATE_HALF_WIDTH)
                        .max(candidate.right_width),
                });
                state.left_cursor = left_cursor_candidate;
                state.right_cursor = right_cursor_candidate;
            }

            // The next placement chains from this candidate, committed or
            // not; only the midline and overlap tests reference the last
            // committed gate.
            prev_midpoint = gate.midpoint;
            prev_direction = gate.direction;
        }

        let start_gate_index = start_index.ok_or(ConstructionError::StartLineNotCrossed)?;
        let finish_gate_index = finish_index.ok_or(ConstructionError::FinishLineNotCrossed)?;

        let gates = GateSequence::freeze(&state.records, start_gate_index, finish_gate_index);
        log::debug!("track initialised with {} gates", gates.len());

        Ok(Track {
            gates,
            heights,
            bounds,
            is_closed,
        })
    }
}

/// Mutable construction state: the committed gate records plus the extend
/// scan cursors that belong to them.
struct BuildState<'a> {
    records: Vec<GateRecord>,
    left_cursor: Option<usize>,
    right_cursor: Option<usize>,
    left_extend: &'a Boundary,
    right_extend: &'a Boundary,
}

impl BuildState<'_> {
    fn last(&self) -> &GateRecord {
        &self.records[self.records.len() - 1]
    }

    /// Measures the gate against the extend rings, pops committed gates
    /// whose corridors cross it, then appends it. Used for the gates built
    /// from literal line coordinates (first, start, finish, closing); the
    /// extend cursors commit immediately.
    fn splice_gate(&mut self, gate: Gate, left_width: f64, right_width: f64, what: &str) {
        let (left_ext, left_cursor) =
            extend::width_to_boundary(&gate, self.left_extend, self.left_cursor);
        self.left_cursor = left_cursor;
        let (right_ext, right_cursor) =
            extend::width_to_boundary(&gate, self.right_extend, self.right_cursor);
        self.right_cursor = right_cursor;

        let left_extend_width = left_ext.unwrap_or(GATE_HALF_WIDTH);
        let right_extend_width = right_ext.unwrap_or(GATE_HALF_WIDTH);
        let line = extend_line(
            gate.midpoint,
            &gate.direction,
            left_extend_width,
            right_extend_width,
        );
        while let Some(last) = self.records.last() {
            let last_line = extend_line(
                last.gate.midpoint,
                &last.gate.direction,
                last.left_extend_width,
                last.right_extend_width,
            );
            if lines_cross(&line, &last_line) {
                log::debug!(
                    "pruning the gate at ({:.3}, {:.3}): its corridor crosses the {what} gate",
                    last.gate.midpoint.x,
                    last.gate.midpoint.y
                );
                self.records.pop();
            } else {
                break;
            }
        }

        self.records.push(GateRecord {
            gate,
            left_width,
            right_width,
            left_extend_width: left_extend_width.max(left_width),
            right_extend_width: right_extend_width.max(right_width),
        });
    }
}

fn lines_cross(a: &Segment, b: &Segment) -> bool {
    segments_intersect(&a.a, &a.b, &b.a, &b.b)
}

#[allow(clippy::float_cmp)] // missed-window widths are clamped to exactly `half_width`
fn both_sides_missed(placement: &Placement, half_width: f64) -> bool {
    placement.left_width + placement.right_width == 2.0 * half_width
}

fn close_ring(points: &mut Vec<Point3>) {
    if points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
}

fn xy(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}
