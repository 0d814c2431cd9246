//! Output assembly: merge the computed fields back onto a fresh copy of the
//! target layer's attribute table.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use polars::{df, frame::DataFrame, prelude::DataFrameJoinOps};

use crate::common::{fs, io};
use crate::zone::{PointLayer, PolygonLayer};

use super::{SourceAggregate, TargetRecord};

pub(crate) fn density_table(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    records: &[TargetRecord],
    aggregates: &[SourceAggregate],
    counts: &[u32],
    group_counts: &[u64],
) -> Result<DataFrame> {
    let computed = df![
        targets.key.as_str() => record_target_ids(targets, records),
        sources.key.as_str() => record_source_ids(sources, records),
        "csi" => records.iter().map(|r| counts[r.target as usize]).collect::<Vec<u32>>(),
        "cs" => records.iter().map(|r| group_counts[r.source as usize]).collect::<Vec<u64>>(),
        "ratio" => records.iter().map(|r| r.ratio).collect::<Vec<f64>>(),
        "weight" => records.iter().map(|r| r.weight).collect::<Vec<f64>>(),
        "sum_weight" => records.iter().map(|r| aggregates[r.source as usize].sum_weight).collect::<Vec<f64>>(),
        "scale" => records.iter().map(|r| aggregates[r.source as usize].scale).collect::<Vec<f64>>(),
        "value" => records.iter().map(|r| r.value).collect::<Vec<f64>>(),
    ]?;
    merge_onto_targets(targets, sources, computed)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn distance_table(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    controls: &PointLayer,
    records: &[TargetRecord],
    aggregates: &[SourceAggregate],
    distances: &[f64],
    matched: &[u32],
    group_max: &[f64],
) -> Result<DataFrame> {
    let computed = df![
        targets.key.as_str() => record_target_ids(targets, records),
        sources.key.as_str() => record_source_ids(sources, records),
        "controlID" => records.iter()
            .map(|r| controls.ids[matched[r.target as usize] as usize].as_ref())
            .collect::<Vec<&str>>(),
        "dsi" => records.iter().map(|r| distances[r.target as usize]).collect::<Vec<f64>>(),
        "dsmax" => records.iter().map(|r| group_max[r.source as usize]).collect::<Vec<f64>>(),
        "ratio" => records.iter().map(|r| r.ratio).collect::<Vec<f64>>(),
        "weight" => records.iter().map(|r| r.weight).collect::<Vec<f64>>(),
        "sum_weight" => records.iter().map(|r| aggregates[r.source as usize].sum_weight).collect::<Vec<f64>>(),
        "scale" => records.iter().map(|r| aggregates[r.source as usize].scale).collect::<Vec<f64>>(),
        "value" => records.iter().map(|r| r.value).collect::<Vec<f64>>(),
    ]?;
    merge_onto_targets(targets, sources, computed)
}

fn record_target_ids<'a>(targets: &'a PolygonLayer, records: &[TargetRecord]) -> Vec<&'a str> {
    records.iter().map(|r| targets.ids[r.target as usize].as_ref()).collect()
}

fn record_source_ids<'a>(sources: &'a PolygonLayer, records: &[TargetRecord]) -> Vec<&'a str> {
    records.iter().map(|r| sources.ids[r.source as usize].as_ref()).collect()
}

/// One-to-one join of the computed fields onto a fresh copy of the target
/// attribute table. Fails if the target key is not unique on either side.
fn merge_onto_targets(
    targets: &PolygonLayer,
    sources: &PolygonLayer,
    computed: DataFrame,
) -> Result<DataFrame> {
    ensure!(
        targets.key != sources.key,
        "target and source layers must use differently named key fields (both are '{}')",
        targets.key
    );
    let key = targets.key.as_str();
    for side in [&targets.data, &computed] {
        let n_unique = side.column(key)?.as_materialized_series().n_unique()?;
        ensure!(n_unique == side.height(), "key field '{key}' is not unique in the output join");
    }

    let merged = targets
        .data
        .inner_join(&computed, [key], [key])
        .context("joining computed fields onto the target table failed")?;
    ensure!(
        merged.height() == targets.len(),
        "output join dropped {} of {} target zones",
        targets.len() - merged.height(),
        targets.len()
    );
    Ok(merged)
}

/// Write the merged table to `path`: GeoJSON (with the original target
/// geometries re-attached) for `.geojson`/`.json`, CSV otherwise.
pub fn write_output(
    path: &Path,
    table: &mut DataFrame,
    targets: &PolygonLayer,
    force: bool,
) -> Result<()> {
    fs::prepare_output(path, force)?;
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or("") {
        "geojson" | "json" => io::geojson::write_table(path, table, targets),
        _ => io::csv::write_csv(table, path),
    }
}
