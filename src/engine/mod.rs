mod rtree;

pub use rtree::RTreeEngine;

use anyhow::Result;
use geo::{MultiPolygon, Point};

/// Narrow capability seam over the geometric primitives the pipelines need.
///
/// Implementations must be deterministic: wherever more than one answer is
/// geometrically valid, the lowest index wins.
pub trait GeometryEngine {
    /// One-to-one containment join: for each point, the index of the polygon
    /// it falls in, or `None` when no polygon matches. Points on a shared
    /// boundary resolve to the lowest polygon index.
    fn locate_points(
        &self,
        polygons: &[MultiPolygon<f64>],
        points: &[Point<f64>],
    ) -> Result<Vec<Option<u32>>>;

    /// How many of `points` intersect each polygon. A point on a shared
    /// boundary counts toward every polygon it touches.
    fn count_points(
        &self,
        polygons: &[MultiPolygon<f64>],
        points: &[Point<f64>],
    ) -> Result<Vec<u32>>;

    /// For each query, the nearest candidate as `(candidate index, planar
    /// Euclidean distance)`, or `None` when there are no candidates.
    /// Equidistant candidates resolve to the lowest index.
    fn nearest_points(
        &self,
        queries: &[Point<f64>],
        candidates: &[Point<f64>],
    ) -> Result<Vec<Option<(u32, f64)>>>;
}
