use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{bail, ensure, Context, Result};
use geo::{MultiPolygon, Point};
use polars::{frame::DataFrame, prelude::{DataType, NamedFrom}, series::Series};

use super::id::{numeric_id, ZoneId};

/// A polygon layer (source or target zones) with its attribute table.
///
/// Rows are aligned across `ids`, `data`, and `geoms`. The key column is
/// normalized to strings on construction and must be unique and non-null.
#[derive(Debug)]
pub struct PolygonLayer {
    pub key: String, // name of the key column
    pub ids: Vec<ZoneId>,
    pub index: AHashMap<ZoneId, u32>, // key -> row
    pub data: DataFrame,
    pub geoms: Vec<MultiPolygon<f64>>,
}

impl PolygonLayer {
    /// Build a layer from parallel geometry and attribute rows.
    pub fn new(geoms: Vec<MultiPolygon<f64>>, data: DataFrame, key: &str) -> Result<Self> {
        ensure!(
            data.width() == 0 || geoms.len() == data.height(),
            "layer has {} geometries but {} attribute rows",
            geoms.len(),
            data.height()
        );
        let (ids, data) = normalize_key(data, key)?;
        ensure!(
            ids.len() == geoms.len(),
            "key field '{key}' has {} values for {} geometries",
            ids.len(),
            geoms.len()
        );
        let index = build_index(&ids, key)?;
        Ok(Self { key: key.to_string(), ids, index, data, geoms })
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Extract an attribute column as f64, rejecting non-numeric dtypes and nulls.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .data
            .column(name)
            .with_context(|| format!("required field '{name}' is missing"))?;
        ensure!(
            column.dtype().is_primitive_numeric(),
            "field '{name}' must be numeric, found {:?}",
            column.dtype()
        );
        ensure!(
            column.null_count() == 0,
            "field '{name}' contains {} null values",
            column.null_count()
        );
        Ok(column.cast(&DataType::Float64)?.f64()?.into_no_null_iter().collect())
    }
}

/// A point layer (control features) with its attribute table.
pub struct PointLayer {
    pub ids: Vec<ZoneId>,
    pub data: DataFrame,
    pub points: Vec<Point<f64>>,
}

impl PointLayer {
    /// Build a control layer. Without a key column, row numbers become the ids.
    /// Control keys are carried into the output but need not be unique.
    pub fn new(points: Vec<Point<f64>>, data: DataFrame, key: Option<&str>) -> Result<Self> {
        ensure!(
            data.width() == 0 || points.len() == data.height(),
            "layer has {} points but {} attribute rows",
            points.len(),
            data.height()
        );
        match key {
            Some(key) => {
                let (ids, data) = normalize_key(data, key)?;
                ensure!(
                    ids.len() == points.len(),
                    "key field '{key}' has {} values for {} points",
                    ids.len(),
                    points.len()
                );
                Ok(Self { ids, data, points })
            }
            None => {
                let ids = (0..points.len()).map(|i| ZoneId::from(i.to_string())).collect();
                Ok(Self { ids, data, points })
            }
        }
    }

    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// Normalize the key column to strings: text keys stay as written, numeric
/// keys render without a trailing `.0`. The column is replaced in the table
/// so later joins see the same representation.
fn normalize_key(mut data: DataFrame, key: &str) -> Result<(Vec<ZoneId>, DataFrame)> {
    let column = data
        .column(key)
        .with_context(|| format!("required key field '{key}' is missing"))?;
    ensure!(
        column.null_count() == 0,
        "key field '{key}' contains {} null values",
        column.null_count()
    );

    let ids: Vec<String> = if column.dtype() == &DataType::String {
        column.str()?.into_no_null_iter().map(|s| s.to_string()).collect()
    } else if column.dtype().is_primitive_numeric() {
        column.cast(&DataType::Float64)?.f64()?.into_no_null_iter().map(numeric_id).collect()
    } else {
        bail!("key field '{key}' must be text or numeric, found {:?}", column.dtype());
    };

    data.replace_or_add(key.into(), Series::new(key.into(), &ids))?;
    Ok((ids.into_iter().map(Arc::from).collect(), data))
}

fn build_index(ids: &[ZoneId], key: &str) -> Result<AHashMap<ZoneId, u32>> {
    let mut index = AHashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        ensure!(
            index.insert(id.clone(), i as u32).is_none(),
            "key field '{key}' is not unique: duplicate value '{id}'"
        );
    }
    Ok(index)
}
