use anyhow::{anyhow, Result};
use geo::{BoundingRect, Intersects, MultiPolygon, Point, Rect};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::GeometryEngine;

#[derive(Debug, Clone)]
struct BoundingBox {
    idx: u32, // Index of corresponding MultiPolygon in the layer
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

#[derive(Debug, Clone)]
struct SitePoint {
    idx: u32, // Index of corresponding candidate point
    pos: [f64; 2],
}

impl RTreeObject for SitePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for SitePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Default engine: bulk-loaded R-trees over bounding boxes, exact `geo`
/// predicates on the bbox candidates.
#[derive(Debug, Default)]
pub struct RTreeEngine;

impl RTreeEngine {
    fn bbox_tree(polygons: &[MultiPolygon<f64>]) -> Result<RTree<BoundingBox>> {
        let boxes = polygons
            .iter()
            .enumerate()
            .map(|(i, poly)| {
                poly.bounding_rect()
                    .map(|bbox| BoundingBox { idx: i as u32, bbox })
                    .ok_or_else(|| anyhow!("polygon {i} is empty (no bounding box)"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RTree::bulk_load(boxes))
    }
}

impl GeometryEngine for RTreeEngine {
    fn locate_points(
        &self,
        polygons: &[MultiPolygon<f64>],
        points: &[Point<f64>],
    ) -> Result<Vec<Option<u32>>> {
        let rtree = Self::bbox_tree(polygons)?;
        Ok(points
            .iter()
            .map(|pt| {
                let env = AABB::from_point([pt.x(), pt.y()]);
                rtree
                    .locate_in_envelope_intersecting(&env)
                    .filter(|bb| polygons[bb.idx as usize].intersects(pt))
                    .map(|bb| bb.idx)
                    .min()
            })
            .collect())
    }

    fn count_points(
        &self,
        polygons: &[MultiPolygon<f64>],
        points: &[Point<f64>],
    ) -> Result<Vec<u32>> {
        let rtree = Self::bbox_tree(polygons)?;
        let mut counts = vec![0u32; polygons.len()];
        for pt in points {
            let env = AABB::from_point([pt.x(), pt.y()]);
            for bb in rtree.locate_in_envelope_intersecting(&env) {
                if polygons[bb.idx as usize].intersects(pt) {
                    counts[bb.idx as usize] += 1;
                }
            }
        }
        Ok(counts)
    }

    fn nearest_points(
        &self,
        queries: &[Point<f64>],
        candidates: &[Point<f64>],
    ) -> Result<Vec<Option<(u32, f64)>>> {
        let sites = candidates
            .iter()
            .enumerate()
            .map(|(i, pt)| SitePoint { idx: i as u32, pos: [pt.x(), pt.y()] })
            .collect();
        let rtree = RTree::bulk_load(sites);

        Ok(queries
            .iter()
            .map(|pt| {
                // The iterator is sorted by distance, so ties are the leading run.
                let mut best: Option<(u32, f64)> = None;
                for (site, d2) in rtree.nearest_neighbor_iter_with_distance_2(&[pt.x(), pt.y()]) {
                    match best {
                        None => best = Some((site.idx, d2)),
                        Some((idx, best_d2)) => {
                            if d2 > best_d2 {
                                break;
                            }
                            if site.idx < idx {
                                best = Some((site.idx, d2));
                            }
                        }
                    }
                }
                best.map(|(idx, d2)| (idx, d2.sqrt()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]
        .into()
    }

    #[test]
    fn locate_points_finds_the_containing_polygon() {
        let polygons = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)];
        let points = vec![Point::new(0.5, 0.5), Point::new(1.5, 0.5), Point::new(5.0, 5.0)];

        let located = RTreeEngine.locate_points(&polygons, &points).unwrap();
        assert_eq!(located, vec![Some(0), Some(1), None]);
    }

    #[test]
    fn locate_points_breaks_boundary_ties_to_the_lowest_index() {
        let polygons = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)];
        let located = RTreeEngine.locate_points(&polygons, &[Point::new(1.0, 0.5)]).unwrap();
        assert_eq!(located, vec![Some(0)]);
    }

    #[test]
    fn count_points_counts_boundary_points_in_every_touching_polygon() {
        let polygons = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)];
        let points = vec![
            Point::new(0.5, 0.5), // inside the first square only
            Point::new(1.0, 0.5), // on the shared edge
        ];

        let counts = RTreeEngine.count_points(&polygons, &points).unwrap();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn nearest_points_reports_distance_and_breaks_ties_low() {
        let candidates = vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)];
        let queries = vec![Point::new(1.0, 0.0), Point::new(1.9, 0.0)];

        let nearest = RTreeEngine.nearest_points(&queries, &candidates).unwrap();
        let (idx, dist) = nearest[0].unwrap();
        assert_eq!(idx, 0); // equidistant: lowest index wins
        assert!((dist - 1.0).abs() < 1e-12);
        assert_eq!(nearest[1].unwrap().0, 1);
    }

    #[test]
    fn nearest_points_with_no_candidates_is_none() {
        let nearest = RTreeEngine.nearest_points(&[Point::new(0.0, 0.0)], &[]).unwrap();
        assert_eq!(nearest, vec![None]);
    }
}
