//! Density-weighted point-based areal interpolation.
//!
//! A target zone's weight grows with its share of the control points found
//! across its source zone: `Wsi = (csi / cs)^q`.

use anyhow::Result;

use crate::engine::GeometryEngine;
use crate::zone::{PointLayer, PolygonLayer};

use super::{check_exponent, join, normalize, output, Disaggregation, TargetRecord};

/// Parameters for the density model.
#[derive(Debug, Clone)]
pub struct DensityParams {
    /// Power parameter controlling the degree of local influence.
    pub exponent: f64,
    /// Source-layer field holding the quantity to redistribute.
    pub population: String,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self { exponent: 1.0, population: "Spop".into() }
    }
}

/// Run the density pipeline: count controls per target zone, turn per-source
/// count shares into weights, and redistribute each source total.
pub fn disaggregate_by_density(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    controls: &PointLayer,
    engine: &dyn GeometryEngine,
    params: &DensityParams,
) -> Result<Disaggregation> {
    check_exponent(params.exponent)?;
    let populations = join::source_populations(sources, &params.population)?;
    let parents = join::assign_sources(targets, sources, engine)?;

    // csi: number of control points in each target zone
    let counts = engine.count_points(&targets.geoms, &controls.points)?;

    // cs: number of control points within all target zones of a source zone
    let mut group_counts = vec![0u64; sources.len()];
    for (i, &parent) in parents.iter().enumerate() {
        group_counts[parent as usize] += counts[i] as u64;
    }

    let mut records: Vec<TargetRecord> = parents
        .iter()
        .enumerate()
        .map(|(i, &parent)| {
            let cs = group_counts[parent as usize];
            // A source zone without any control point gets all-zero weights
            // here; redistribution restores a uniform split.
            let ratio = if cs > 0 { counts[i] as f64 / cs as f64 } else { 0.0 };
            TargetRecord {
                target: i as u32,
                source: parent,
                ratio,
                weight: ratio.powf(params.exponent),
                value: 0.0,
            }
        })
        .collect();

    let aggregates = normalize::redistribute(&mut records, &populations, sources.len());

    let table =
        output::density_table(targets, sources, &records, &aggregates, &counts, &group_counts)?;
    Ok(Disaggregation { table, records, aggregates })
}
