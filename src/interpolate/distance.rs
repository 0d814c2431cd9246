//! Distance-weighted point-based areal interpolation.
//!
//! A target zone's weight decays with its centroid's distance to the
//! nearest control point, relative to the farthest zone of the same source
//! zone: `Wsi = (1 - dsi / dsmax)^q`.

use anyhow::{anyhow, ensure, Result};

use crate::engine::GeometryEngine;
use crate::zone::{PointLayer, PolygonLayer};

use super::{check_exponent, join, normalize, output, Disaggregation, TargetRecord};

/// Parameters for the distance model.
#[derive(Debug, Clone)]
pub struct DistanceParams {
    /// Power parameter controlling the decay steepness.
    pub exponent: f64,
    /// Source-layer field holding the quantity to redistribute.
    pub population: String,
}

impl Default for DistanceParams {
    fn default() -> Self {
        Self { exponent: 0.2, population: "Spop".into() }
    }
}

/// Run the distance pipeline: find each target centroid's nearest control,
/// turn per-source distance shares into weights, and redistribute each
/// source total.
pub fn disaggregate_by_distance(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    controls: &PointLayer,
    engine: &dyn GeometryEngine,
    params: &DistanceParams,
) -> Result<Disaggregation> {
    check_exponent(params.exponent)?;
    ensure!(
        !controls.is_empty(),
        "control layer is empty: the distance model needs at least one control point"
    );
    let populations = join::source_populations(sources, &params.population)?;
    let parents = join::assign_sources(targets, sources, engine)?;

    // dsi: distance from each target centroid to the closest control point
    let seeds = join::centroids(targets)?;
    let nearest = engine.nearest_points(&seeds, &controls.points)?;
    let mut distances = Vec::with_capacity(targets.len());
    let mut matched = Vec::with_capacity(targets.len());
    for (near, id) in nearest.into_iter().zip(&targets.ids) {
        let (control, distance) =
            near.ok_or_else(|| anyhow!("no control point found near target zone '{id}'"))?;
        matched.push(control);
        distances.push(distance);
    }

    // dsmax: maximum nearest-control distance within each source zone
    let mut group_max = vec![0.0f64; sources.len()];
    for (i, &parent) in parents.iter().enumerate() {
        group_max[parent as usize] = group_max[parent as usize].max(distances[i]);
    }

    let mut records: Vec<TargetRecord> = parents
        .iter()
        .enumerate()
        .map(|(i, &parent)| {
            let dsmax = group_max[parent as usize];
            // All centroids on control points: zero distance everywhere.
            let ratio = if dsmax > 0.0 { distances[i] / dsmax } else { 0.0 };
            TargetRecord {
                target: i as u32,
                source: parent,
                ratio,
                weight: (1.0 - ratio).powf(params.exponent),
                value: 0.0,
            }
        })
        .collect();

    let aggregates = normalize::redistribute(&mut records, &populations, sources.len());

    let table = output::distance_table(
        targets, sources, controls, &records, &aggregates, &distances, &matched, &group_max,
    )?;
    Ok(Disaggregation { table, records, aggregates })
}
