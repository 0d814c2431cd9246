//! Attribute-transfer orchestration: representative points, the source
//! containment join, and population extraction.

use anyhow::{anyhow, ensure, Result};
use geo::{Centroid, InteriorPoint, Point};

use crate::engine::GeometryEngine;
use crate::zone::PolygonLayer;

/// Interior points for the containment join (guaranteed inside for valid
/// areal geometries, unlike the centroid).
pub(crate) fn interior_points(layer: &PolygonLayer) -> Result<Vec<Point<f64>>> {
    layer
        .geoms
        .iter()
        .zip(&layer.ids)
        .map(|(geom, id)| {
            geom.interior_point()
                .ok_or_else(|| anyhow!("zone '{id}' has no interior point (empty or degenerate geometry)"))
        })
        .collect()
}

/// True centroids, used to seed the nearest-control query.
pub(crate) fn centroids(layer: &PolygonLayer) -> Result<Vec<Point<f64>>> {
    layer
        .geoms
        .iter()
        .zip(&layer.ids)
        .map(|(geom, id)| {
            geom.centroid()
                .ok_or_else(|| anyhow!("zone '{id}' has no centroid (empty or degenerate geometry)"))
        })
        .collect()
}

/// Assign each target zone to the source zone containing it.
pub(crate) fn assign_sources(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    engine: &dyn GeometryEngine,
) -> Result<Vec<u32>> {
    let reps = interior_points(targets)?;
    let located = engine.locate_points(&sources.geoms, &reps)?;
    located
        .into_iter()
        .zip(&targets.ids)
        .map(|(parent, id)| {
            parent.ok_or_else(|| anyhow!("target zone '{id}' is not contained in any source zone"))
        })
        .collect()
}

/// Known per-source quantities, validated before any geometry work.
pub(crate) fn source_populations(sources: &PolygonLayer, column: &str) -> Result<Vec<f64>> {
    let populations = sources.numeric_column(column)?;
    for (value, id) in populations.iter().zip(&sources.ids) {
        ensure!(
            value.is_finite() && *value >= 0.0,
            "source zone '{id}': '{column}' must be a non-negative number, got {value}"
        );
    }
    Ok(populations)
}
