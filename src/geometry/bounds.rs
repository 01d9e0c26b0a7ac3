use crate::math::{Point2, Point3};

/// Axis-aligned bounds over every boundary of the track.
///
/// Only used as a sanity guard during gate placement: a gate midpoint outside
/// these bounds means the placement walk has left the track entirely.
#[derive(Debug, Clone, Copy)]
pub struct TrackBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl TrackBounds {
    /// Computes the bounds over one or more boundary polylines.
    #[must_use]
    pub fn from_boundaries<'a, I>(boundaries: I) -> Self
    where
        I: IntoIterator<Item = &'a [Point3]>,
    {
        let mut bounds = Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for points in boundaries {
            for p in points {
                bounds.x_min = bounds.x_min.min(p.x);
                bounds.x_max = bounds.x_max.max(p.x);
                bounds.y_min = bounds.y_min.min(p.y);
                bounds.y_max = bounds.y_max.max(p.y);
            }
        }
        bounds
    }

    /// Whether the point lies within the bounds, edges included.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}
