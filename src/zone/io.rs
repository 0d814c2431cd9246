//! Layer loading: dispatch on file extension to the GeoJSON or shapefile readers.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::common::io::{geojson, shp};

use super::layer::{PointLayer, PolygonLayer};

impl PolygonLayer {
    /// Read a polygon layer from a `.geojson`/`.json` or `.shp` file.
    pub fn read_from_path(path: &Path, key: &str) -> Result<Self> {
        let (geoms, data) = match extension(path) {
            "geojson" | "json" => geojson::read_polygons(path)?,
            "shp" => shp::read_polygons(path)?,
            other => bail!("unsupported polygon format '{other}': {}", path.display()),
        };
        Self::new(geoms, data, key).with_context(|| format!("in {}", path.display()))
    }
}

impl PointLayer {
    /// Read a control layer from a `.geojson`/`.json` or `.shp` file.
    /// Polygonal control features reduce to their centroids.
    pub fn read_from_path(path: &Path, key: Option<&str>) -> Result<Self> {
        let (points, data) = match extension(path) {
            "geojson" | "json" => geojson::read_points(path)?,
            "shp" => shp::read_points(path)?,
            other => bail!("unsupported control format '{other}': {}", path.display()),
        };
        Self::new(points, data, key).with_context(|| format!("in {}", path.display()))
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
}
