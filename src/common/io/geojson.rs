//! GeoJSON reading and writing (feature collections with properties).

use std::{fs, path::Path};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Centroid, Coord, LineString, MultiPolygon, Point, Polygon};
use polars::{frame::DataFrame, prelude::{AnyValue, NamedFrom}, series::Series};
use serde_json::{json, Map, Value};

use crate::zone::PolygonLayer;

/// Read polygonal features and their properties.
pub(crate) fn read_polygons(path: &Path) -> Result<(Vec<MultiPolygon<f64>>, DataFrame)> {
    let features = read_features(path)?;
    let mut geoms = Vec::with_capacity(features.len());
    let mut rows = Vec::with_capacity(features.len());
    for (geometry, properties) in features {
        geoms.push(parse_polygonal(&geometry)?);
        rows.push(properties);
    }
    Ok((geoms, properties_to_table(&rows)?))
}

/// Read point features and their properties. Polygonal features reduce to
/// their centroids.
pub(crate) fn read_points(path: &Path) -> Result<(Vec<Point<f64>>, DataFrame)> {
    let features = read_features(path)?;
    let mut points = Vec::with_capacity(features.len());
    let mut rows = Vec::with_capacity(features.len());
    for (geometry, properties) in features {
        let point = match geometry["type"].as_str() {
            Some("Point") => {
                let coords = geometry["coordinates"]
                    .as_array()
                    .ok_or_else(|| anyhow!("Point geometry has no coordinates"))?;
                ensure!(coords.len() >= 2, "Point coordinate has fewer than two components");
                Point::new(
                    coords[0].as_f64().ok_or_else(|| anyhow!("coordinate x is not a number"))?,
                    coords[1].as_f64().ok_or_else(|| anyhow!("coordinate y is not a number"))?,
                )
            }
            Some("Polygon") | Some("MultiPolygon") => parse_polygonal(&geometry)?
                .centroid()
                .ok_or_else(|| anyhow!("polygonal control feature has no centroid"))?,
            other => bail!("expected Point, Polygon or MultiPolygon geometry, found {other:?}"),
        };
        points.push(point);
        rows.push(properties);
    }
    Ok((points, properties_to_table(&rows)?))
}

fn read_features(path: &Path) -> Result<Vec<(Value, Map<String, Value>)>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse GeoJSON from {}", path.display()))?;
    let features = value["features"]
        .as_array()
        .ok_or_else(|| anyhow!("{} is not a GeoJSON FeatureCollection", path.display()))?;

    Ok(features
        .iter()
        .map(|feature| {
            let geometry = feature["geometry"].clone();
            let properties = feature["properties"].as_object().cloned().unwrap_or_default();
            (geometry, properties)
        })
        .collect())
}

fn parse_polygonal(geometry: &Value) -> Result<MultiPolygon<f64>> {
    match geometry["type"].as_str() {
        Some("Polygon") => {
            let rings = geometry["coordinates"]
                .as_array()
                .ok_or_else(|| anyhow!("Polygon geometry has no coordinates"))?;
            Ok(MultiPolygon(vec![parse_polygon_coords(rings)?]))
        }
        Some("MultiPolygon") => {
            let polygons = geometry["coordinates"]
                .as_array()
                .ok_or_else(|| anyhow!("MultiPolygon geometry has no coordinates"))?;
            let polygons = polygons
                .iter()
                .map(|rings| {
                    let rings = rings
                        .as_array()
                        .ok_or_else(|| anyhow!("MultiPolygon member is not an array"))?;
                    parse_polygon_coords(rings)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => bail!("expected Polygon or MultiPolygon geometry, found {other:?}"),
    }
}

/// Parse GeoJSON polygon rings: the first ring is the exterior, the rest
/// are holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    ensure!(!rings.is_empty(), "polygon has no rings");
    let exterior = parse_ring(&rings[0])?;
    let interiors = rings[1..].iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    let coords = ring.as_array().ok_or_else(|| anyhow!("ring is not an array"))?;
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair.as_array().ok_or_else(|| anyhow!("coordinate is not an array"))?;
        ensure!(pair.len() >= 2, "coordinate has fewer than two components");
        let x = pair[0].as_f64().ok_or_else(|| anyhow!("coordinate x is not a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow!("coordinate y is not a number"))?;
        points.push(Coord { x, y });
    }

    // Ensure ring is closed (first point == last point)
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Build an attribute table from per-feature property maps. Column order
/// follows first appearance; a column is numeric when every present value
/// is numeric, boolean when every present value is boolean, text otherwise.
fn properties_to_table(rows: &[Map<String, Value>]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let columns = names
        .iter()
        .map(|&name| {
            let values: Vec<&Value> =
                rows.iter().map(|row| row.get(name).unwrap_or(&Value::Null)).collect();

            if values.iter().all(|v| v.is_null() || v.as_i64().is_some()) {
                Series::new(name.into(), values.iter().map(|v| v.as_i64()).collect::<Vec<_>>())
            } else if values.iter().all(|v| v.is_null() || v.is_number()) {
                Series::new(name.into(), values.iter().map(|v| v.as_f64()).collect::<Vec<_>>())
            } else if values.iter().all(|v| v.is_null() || v.is_boolean()) {
                Series::new(name.into(), values.iter().map(|v| v.as_bool()).collect::<Vec<_>>())
            } else {
                let strings: Vec<Option<String>> = values
                    .iter()
                    .map(|v| match v {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect();
                Series::new(name.into(), strings)
            }
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns.into_iter().map(Into::into).collect())?)
}

/// Write a table as a GeoJSON FeatureCollection, one feature per row, keyed
/// back to its geometry through the layer's key column.
pub(crate) fn write_table(path: &Path, table: &DataFrame, targets: &PolygonLayer) -> Result<()> {
    let keys = table
        .column(&targets.key)
        .with_context(|| format!("output table lost the key field '{}'", targets.key))?
        .str()?;

    let mut features = Vec::with_capacity(table.height());
    for (row, key) in keys.into_no_null_iter().enumerate() {
        let &geom_row = targets
            .index
            .get(key)
            .ok_or_else(|| anyhow!("no target geometry for key '{key}'"))?;

        let mut properties = Map::new();
        for column in table.get_columns() {
            properties.insert(column.name().to_string(), any_value_to_json(column.get(row)?));
        }

        features.push(json!({
            "type": "Feature",
            "geometry": multipolygon_geometry(&targets.geoms[geom_row as usize]),
            "properties": properties,
        }));
    }

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    fs::write(path, serde_json::to_vec(&collection)?)
        .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))
}

fn multipolygon_geometry(mp: &MultiPolygon<f64>) -> Value {
    let coordinates: Vec<Value> = mp
        .0
        .iter()
        .map(|polygon| {
            let mut rings = vec![ring_coords(polygon.exterior())];
            rings.extend(polygon.interiors().iter().map(ring_coords));
            json!(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": coordinates })
}

fn ring_coords(ring: &LineString<f64>) -> Value {
    json!(ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
}

fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => json!(v),
        AnyValue::String(v) => json!(v),
        AnyValue::StringOwned(v) => json!(v.as_str()),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        other => json!(other.to_string()),
    }
}
