//! IO module for format-specific reading and writing operations.
//!
//! Each format module handles reading and/or writing for a specific file format.
//!
//! # Format Modules
//!
//! - `geojson` - GeoJSON FeatureCollections for polygon input and region export
//! - `shp` - Shapefile format for polygon input
//! - `svg` - SVG format for figure export
//! - `png` - PNG raster format for figure export

pub(crate) mod geojson;
pub(crate) mod png;
pub(crate) mod shp;
pub(crate) mod svg;

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use tracing::{info, info_span, warn};

use crate::{geom::{PolygonSet, repair_records}, region::MacroRegion};

pub(crate) use png::write_scene_to_png;
pub(crate) use svg::{write_scene_to_svg, write_scene_to_svg_string};

/// Load polygon records from `path` and repair their geometry.
/// The format is chosen from the extension: `.geojson`/`.json` or `.shp`.
pub fn load_polygons(path: &Path) -> Result<PolygonSet> {
    let _span = info_span!("load", path = %path.display()).entered();

    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    let mut records = match extension.as_deref() {
        Some("geojson" | "json") => geojson::read_records_from_geojson(path)?,
        Some("shp") => shp::read_records_from_shapefile(path)?,
        _ => bail!("[io] Unsupported polygon file {}: expected .geojson, .json or .shp", path.display()),
    };
    ensure!(!records.is_empty(), "[io] {} contains no polygons", path.display());

    let repaired = repair_records(&mut records);
    if repaired > 0 {
        warn!(repaired, "repaired invalid geometries");
    }

    let polygons = PolygonSet::new(records);
    info!(records = polygons.len(), "loaded polygons");
    Ok(polygons)
}

/// Write macro-regions as a GeoJSON FeatureCollection with `cluster` and `members` properties.
pub fn write_regions_geojson(path: &Path, regions: &[MacroRegion]) -> Result<()> {
    geojson::write_regions_to_geojson(path, regions)
        .with_context(|| format!("[io] Failed to export regions to {}", path.display()))?;
    info!(path = %path.display(), regions = regions.len(), "wrote regions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "a" },
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] } },
            { "type": "Feature", "properties": { "name": "b" },
              "geometry": { "type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]] } }
        ]
    }"#;

    #[test]
    fn loads_geojson_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        file.write_all(TWO_SQUARES.as_bytes()).unwrap();

        let polygons = load_polygons(file.path()).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons.records()[1].attributes["name"], "b");
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".kml").tempfile().unwrap();
        assert!(load_polygons(file.path()).is_err());
    }

    #[test]
    fn rejects_empty_collection() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{ "type": "FeatureCollection", "features": [] }"#).unwrap();
        assert!(load_polygons(file.path()).is_err());
    }
}
