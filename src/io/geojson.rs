//! GeoJSON reading for polygon records and writing for macro-regions.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value, json};

use crate::{geom::PolygonRecord, region::MacroRegion};

/// Read polygon records from a GeoJSON FeatureCollection file.
pub(crate) fn read_records_from_geojson(path: &Path) -> Result<Vec<PolygonRecord>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    read_records_from_geojson_bytes(&bytes)
        .with_context(|| format!("[io::geojson] Failed to load {}", path.display()))
}

/// Read polygon records from GeoJSON bytes.
/// Every feature must carry a Polygon or MultiPolygon geometry.
pub(crate) fn read_records_from_geojson_bytes(bytes: &[u8]) -> Result<Vec<PolygonRecord>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson] Failed to parse GeoJSON bytes")?;

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection with a `features` array"))?;

    features.iter().enumerate()
        .map(|(idx, feature)| {
            let geometry = feature["geometry"].as_object()
                .ok_or_else(|| anyhow!("[io::geojson] Feature {idx} has no geometry"))?;
            let coords = geometry.get("coordinates")
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("[io::geojson] Feature {idx} has no coordinates"))?;

            let shape = match geometry.get("type").and_then(Value::as_str) {
                Some("Polygon") => MultiPolygon(vec![parse_polygon_coords(coords)?]),
                Some("MultiPolygon") => parse_multipolygon_coords(coords)?,
                other => bail!("[io::geojson] Feature {idx} has unsupported geometry type {other:?}"),
            };

            let attributes = match &feature["properties"] {
                Value::Object(properties) => properties.clone(),
                _ => Map::new(),
            };

            Ok(PolygonRecord::with_attributes(idx, shape, attributes))
        })
        .collect()
}

/// Parse GeoJSON MultiPolygon coordinates: a list of polygons, each a list of rings.
fn parse_multipolygon_coords(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    coords.iter()
        .map(|polygon| polygon.as_array()
            .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon is not an array"))
            .and_then(|rings| parse_polygon_coords(rings)))
        .collect::<Result<Vec<_>>>()
        .map(MultiPolygon)
}

/// Parse GeoJSON Polygon coordinates: the exterior ring followed by any holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter()
        .map(|ring| ring.as_array()
            .ok_or_else(|| anyhow!("Invalid Polygon: ring is not an array"))
            .and_then(|coords| parse_ring_coords(coords)));

    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring (exterior or interior) from GeoJSON coordinates.
/// Format: [[x, y], [x, y], ...]
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let pair = pair.as_array()
                .filter(|pair| pair.len() >= 2)
                .ok_or_else(|| anyhow!("Invalid coordinate: expected [x, y]"))?;
            let x = pair[0].as_f64()
                .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64()
                .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Ok(LineString(points))
}

/// Write macro-regions as a GeoJSON FeatureCollection file.
pub(crate) fn write_regions_to_geojson(path: &Path, regions: &[MacroRegion]) -> Result<()> {
    let bytes = write_regions_to_geojson_bytes(regions)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("[io::geojson] Failed to write {}", path.display()))
}

/// Write macro-regions to GeoJSON bytes, one feature per region.
pub(crate) fn write_regions_to_geojson_bytes(regions: &[MacroRegion]) -> Result<Vec<u8>> {
    let features = regions.iter()
        .map(|region| json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(&region.geometry),
            "properties": {
                "cluster": region.label,
                "members": region.members.len(),
            },
        }))
        .collect::<Vec<_>>();

    let feature_collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    serde_json::to_vec(&feature_collection).context("[io::geojson] Failed to serialize GeoJSON to bytes")
}

/// Convert a MultiPolygon into a GeoJSON geometry object.
fn multipolygon_to_geojson(shape: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| ls.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>();

    json!({
        "type": "MultiPolygon",
        "coordinates": shape.0.iter()
            .map(|polygon| std::iter::once(ring(polygon.exterior()))
                .chain(polygon.interiors().iter().map(ring))
                .collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    })
}
