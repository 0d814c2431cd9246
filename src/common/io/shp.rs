//! Shapefile reading: shapes plus their dbase attribute records.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Centroid, MultiPolygon, Point};
use polars::{frame::DataFrame, prelude::NamedFrom, series::Series};
use shapefile::{
    dbase::{FieldValue, Record},
    Reader, Shape,
};

/// Read a polygon layer: shapes converted to `geo` multipolygons, records
/// converted to an attribute table.
pub(crate) fn read_polygons(path: &Path) -> Result<(Vec<MultiPolygon<f64>>, DataFrame)> {
    let (shapes, table) = read_shapes(path)?;
    let geoms = shapes
        .iter()
        .map(|shape| match shape {
            Shape::Polygon(p) => Ok(shp_to_geo(p)),
            _ => bail!("unsupported shape type in {} (polygons required)", path.display()),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((geoms, table))
}

/// Read a control layer: point shapes pass through, polygon shapes reduce
/// to their centroids.
pub(crate) fn read_points(path: &Path) -> Result<(Vec<Point<f64>>, DataFrame)> {
    let (shapes, table) = read_shapes(path)?;
    let points = shapes
        .iter()
        .map(|shape| match shape {
            Shape::Point(p) => Ok(Point::new(p.x, p.y)),
            Shape::Polygon(p) => shp_to_geo(p)
                .centroid()
                .ok_or_else(|| anyhow!("degenerate polygon control feature in {}", path.display())),
            _ => bail!("unsupported shape type in {} (points required)", path.display()),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((points, table))
}

/// Read all shapes + attribute records from a given `.shp` file path.
fn read_shapes(path: &Path) -> Result<(Vec<Shape>, DataFrame)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut shapes = Vec::with_capacity(reader.shape_count()?);
    let mut records = Vec::with_capacity(shapes.capacity());
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        shapes.push(shape);
        records.push(record);
    }
    Ok((shapes, records_to_table(&records)?))
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>
fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0])
        }
    }

    /// Get the signed area of a geo::Coord list (negative for hole)
    fn signed_area(pts: &[geo::Coord<f64>]) -> f64 {
        let mut a = 0.0;
        for w in pts.windows(2) {
            a += w[0].x * w[1].y - w[1].x * w[0].y;
        }
        a / 2.0
    }

    // 1) Convert each ring into a LineString (ensure closed); CW => exterior
    //    in the Shapefile convention.
    let mut ls_rings: Vec<(geo::LineString<f64>, bool)> = Vec::with_capacity(p.rings().len());
    for ring in p.rings().iter() {
        let mut coords: Vec<geo::Coord<f64>> =
            ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
        ensure_closed(&mut coords);
        let ls = geo::LineString(coords);
        let is_exterior = signed_area(&ls.0) < 0.0;
        ls_rings.push((ls, is_exterior));
    }

    // 2) Group: each exterior with its following holes (Shapefile stores
    //    rings in this order)
    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for (ls, is_exterior) in ls_rings {
        if is_exterior {
            if let Some(ext) = current_exterior.take() {
                polys.push(geo::Polygon::new(ext, current_holes));
                current_holes = Vec::new();
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

/// Convert dbase records to an attribute table. Field kinds come from the
/// first record; character, numeric, integer and logical fields are
/// carried, anything else (dates, memos) is skipped.
fn records_to_table(records: &[Record]) -> Result<DataFrame> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::empty());
    };

    let mut columns: Vec<Series> = Vec::new();
    for (name, value) in first.clone() {
        match value {
            FieldValue::Character(_) => columns.push(character_column(records, &name)),
            FieldValue::Numeric(_) | FieldValue::Float(_) | FieldValue::Double(_) => {
                columns.push(numeric_column(records, &name))
            }
            FieldValue::Integer(_) => columns.push(integer_column(records, &name)),
            FieldValue::Logical(_) => columns.push(logical_column(records, &name)),
            _ => {}
        }
    }
    Ok(DataFrame::new(columns.into_iter().map(Into::into).collect())?)
}

fn character_column(records: &[Record], name: &str) -> Series {
    let values: Vec<Option<String>> = records
        .iter()
        .map(|record| match record.get(name) {
            Some(FieldValue::Character(v)) => v.clone(),
            _ => None,
        })
        .collect();
    Series::new(name.into(), values)
}

fn numeric_column(records: &[Record], name: &str) -> Series {
    let values: Vec<Option<f64>> = records
        .iter()
        .map(|record| match record.get(name) {
            Some(FieldValue::Numeric(v)) => *v,
            Some(FieldValue::Float(v)) => v.map(f64::from),
            Some(FieldValue::Double(v)) => Some(*v),
            Some(FieldValue::Integer(v)) => Some(*v as f64),
            _ => None,
        })
        .collect();
    Series::new(name.into(), values)
}

fn integer_column(records: &[Record], name: &str) -> Series {
    let values: Vec<Option<i64>> = records
        .iter()
        .map(|record| match record.get(name) {
            Some(FieldValue::Integer(v)) => Some(*v as i64),
            _ => None,
        })
        .collect();
    Series::new(name.into(), values)
}

fn logical_column(records: &[Record], name: &str) -> Series {
    let values: Vec<Option<bool>> = records
        .iter()
        .map(|record| match record.get(name) {
            Some(FieldValue::Logical(v)) => *v,
            _ => None,
        })
        .collect();
    Series::new(name.into(), values)
}
