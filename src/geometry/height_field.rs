use spade::{
    DelaunayTriangulation, FloatTriangulation, HasPosition, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{GeometryError, Result};
use crate::math::Point3;

/// One `(x, y) → z` sample of the track surface.
#[derive(Debug)]
struct HeightSample {
    position: SpadePoint2<f64>,
    z: f64,
}

impl HasPosition for HeightSample {
    type Scalar = f64;

    fn position(&self) -> SpadePoint2<f64> {
        self.position
    }
}

/// Surface-height lookup over the union of all boundary samples.
///
/// Built once from the `(x, y, z)` boundary points and query-only afterwards,
/// so it is safe to share across readers. Queries interpolate linearly over
/// the Delaunay triangulation of the samples and fall back to the nearest
/// sample outside the triangulated region.
#[derive(Debug)]
pub struct HeightField {
    triangulation: DelaunayTriangulation<HeightSample>,
}

impl HeightField {
    /// Builds the height field from `(x, y, z)` samples. Duplicate sample
    /// positions collapse into one vertex.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::TooFewPoints` when no samples are supplied and
    /// `GeometryError::HeightSample` when a sample has non-finite
    /// coordinates.
    pub fn from_samples<I>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut triangulation = DelaunayTriangulation::new();
        for p in samples {
            triangulation
                .insert(HeightSample {
                    position: SpadePoint2::new(p.x, p.y),
                    z: p.z,
                })
                .map_err(|e| GeometryError::HeightSample(e.to_string()))?;
        }
        if triangulation.num_vertices() == 0 {
            return Err(GeometryError::TooFewPoints { min: 1, got: 0 }.into());
        }
        Ok(Self { triangulation })
    }

    /// Surface height at `(x, y)`.
    ///
    /// Linear interpolation over the sample triangulation where the point is
    /// covered, nearest-sample height otherwise. Never fails: the
    /// constructor guarantees at least one sample exists.
    #[must_use]
    pub fn height_at(&self, x: f64, y: f64) -> f64 {
        let query = SpadePoint2::new(x, y);
        if let Some(z) = self
            .triangulation
            .barycentric()
            .interpolate(|v| v.data().z, query)
        {
            return z;
        }
        self.triangulation
            .nearest_neighbor(query)
            .map_or(f64::NAN, |v| v.data().z)
    }

    /// Number of distinct sample positions.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.triangulation.num_vertices()
    }
}
