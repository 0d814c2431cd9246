//! Shared fixtures for the pipeline tests: small grids of axis-aligned
//! squares with hand-checkable geometry.

#![allow(dead_code)]

use arealize::{PointLayer, PolygonLayer};
use geo::{polygon, MultiPolygon, Point};
use polars::{df, frame::DataFrame};

/// Axis-aligned square with lower-left corner at (x0, y0).
pub fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
    ]
    .into()
}

pub fn target_layer(ids: &[&str], geoms: Vec<MultiPolygon<f64>>) -> PolygonLayer {
    let data = df!["targetID" => ids].unwrap();
    PolygonLayer::new(geoms, data, "targetID").unwrap()
}

pub fn source_layer(ids: &[&str], pops: &[f64], geoms: Vec<MultiPolygon<f64>>) -> PolygonLayer {
    let data = df!["sourceID" => ids, "Spop" => pops].unwrap();
    PolygonLayer::new(geoms, data, "sourceID").unwrap()
}

pub fn control_layer(coords: &[(f64, f64)]) -> PointLayer {
    let points = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
    PointLayer::new(points, DataFrame::empty(), None).unwrap()
}

/// Numeric cell of `name` in the row whose targetID equals `id`.
pub fn number(table: &DataFrame, id: &str, name: &str) -> f64 {
    let row = row_of(table, id);
    table.column(name).unwrap().f64().unwrap().get(row).unwrap()
}

/// Text cell of `name` in the row whose targetID equals `id`.
pub fn text(table: &DataFrame, id: &str, name: &str) -> String {
    let row = row_of(table, id);
    table.column(name).unwrap().str().unwrap().get(row).unwrap().to_string()
}

fn row_of(table: &DataFrame, id: &str) -> usize {
    table
        .column("targetID")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .position(|v| v == id)
        .unwrap_or_else(|| panic!("no row with targetID '{id}'"))
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}
