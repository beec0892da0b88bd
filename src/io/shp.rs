//! Shapefile reading for polygon records.

use std::path::Path;

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Number, Value};
use shapefile::{self as shp, PolygonRing, Shape, dbase::{FieldValue, Record}};

use crate::geom::PolygonRecord;

/// Read all polygon shapes + attribute records from a given `.shp` file path.
/// The sibling `.dbf` file supplies the attributes.
pub(crate) fn read_records_from_shapefile(path: &Path) -> Result<Vec<PolygonRecord>> {
    let mut reader = shp::Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    reader.iter_shapes_and_records().enumerate()
        .map(|(idx, result)| {
            let (shape, record) = result
                .with_context(|| format!("[io::shp] Error reading shape+record {idx}"))?;
            let geometry = shape_to_multipolygon(shape)
                .with_context(|| format!("[io::shp] Error converting shape {idx} in {}", path.display()))?;
            Ok(PolygonRecord::with_attributes(idx, geometry, record_to_attributes(record)))
        })
        .collect()
}

/// Convert a polygon shape of any flavour to a geo::MultiPolygon<f64>.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y)),
        Shape::PolygonM(polygon) => rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y)),
        Shape::PolygonZ(polygon) => rings_to_multipolygon(polygon.rings(), |p| (p.x, p.y)),
        other => bail!("found non-Polygon shape: {:?}", other.shapetype()),
    }
}

/// Group shapefile rings into polygons: each outer ring owns the inner rings that follow it.
fn rings_to_multipolygon<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> (f64, f64)) -> Result<MultiPolygon<f64>> {
    let to_linestring = |points: &[P]| {
        let mut coords = points.iter()
            .map(|p| { let (x, y) = xy(p); Coord { x, y } })
            .collect::<Vec<_>>();
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
        LineString(coords)
    };

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    let mut current: Option<(LineString<f64>, Vec<LineString<f64>>)> = None;

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                // flush previous polygon
                if let Some((exterior, holes)) = current.take() {
                    polygons.push(Polygon::new(exterior, holes));
                }
                current = Some((to_linestring(points.as_slice()), Vec::new()));
            }
            PolygonRing::Inner(points) => match current.as_mut() {
                Some((_, holes)) => holes.push(to_linestring(points.as_slice())),
                None => bail!("inner ring found before any outer ring"),
            },
        }
    }
    if let Some((exterior, holes)) = current {
        polygons.push(Polygon::new(exterior, holes));
    }

    Ok(MultiPolygon(polygons))
}

/// Convert a dBase record into JSON attribute values.
fn record_to_attributes(record: Record) -> Map<String, Value> {
    record.into_iter()
        .map(|(field, value)| {
            let value = match value {
                FieldValue::Character(Some(s)) => Value::String(s.trim().to_string()),
                FieldValue::Memo(s) => Value::String(s),
                FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) =>
                    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
                FieldValue::Float(Some(f)) =>
                    Number::from_f64(f as f64).map(Value::Number).unwrap_or(Value::Null),
                FieldValue::Integer(i) => Value::from(i),
                FieldValue::Logical(Some(b)) => Value::Bool(b),
                _ => Value::Null,
            };
            (field, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn pt(x: f64, y: f64) -> shp::Point { shp::Point { x, y } }

    #[test]
    fn outer_rings_own_following_holes() {
        let rings = vec![
            PolygonRing::Outer(vec![pt(0.0, 0.0), pt(0.0, 4.0), pt(4.0, 4.0), pt(4.0, 0.0), pt(0.0, 0.0)]),
            PolygonRing::Inner(vec![pt(1.0, 1.0), pt(2.0, 1.0), pt(2.0, 2.0), pt(1.0, 2.0), pt(1.0, 1.0)]),
            PolygonRing::Outer(vec![pt(10.0, 10.0), pt(10.0, 11.0), pt(11.0, 11.0), pt(11.0, 10.0)]),
        ];
        let shape = rings_to_multipolygon(&rings, |p| (p.x, p.y)).unwrap();

        assert_eq!(shape.0.len(), 2);
        assert_eq!(shape.0[0].interiors().len(), 1);
        assert!(shape.0[1].interiors().is_empty());
        // Open outer ring is closed on conversion.
        assert_eq!(shape.0[1].exterior().0.len(), 5);
        assert!((shape.unsigned_area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn leading_inner_ring_is_an_error() {
        let rings = vec![
            PolygonRing::Inner(vec![pt(1.0, 1.0), pt(2.0, 1.0), pt(2.0, 2.0), pt(1.0, 1.0)]),
        ];
        assert!(rings_to_multipolygon(&rings, |p| (p.x, p.y)).is_err());
    }

    #[test]
    fn non_polygon_shapes_are_rejected() {
        assert!(shape_to_multipolygon(Shape::Point(pt(0.0, 0.0))).is_err());
    }
}
