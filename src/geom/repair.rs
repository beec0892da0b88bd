use geo::{Area, MultiPolygon, unary_union};
use tracing::debug;

use crate::geom::PolygonRecord;

/// Relative area change above which a repaired geometry counts as modified.
const AREA_TOLERANCE: f64 = 1e-9;

/// Repair a possibly self-intersecting MultiPolygon by unioning it with itself.
/// Overlapping parts are dissolved. A bow-tie ring, whose two lobes wind in opposite
/// directions, keeps a single lobe, matching a zero-distance buffer.
pub fn repair(shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if shape.0.is_empty() { return shape.clone() }
    unary_union(std::iter::once(shape))
}

/// Repair every record in place, returning how many geometries changed area.
pub(crate) fn repair_records(records: &mut [PolygonRecord]) -> usize {
    records.iter_mut()
        .filter_map(|record| {
            let before = record.geometry.unsigned_area();
            record.geometry = repair(&record.geometry);
            let after = record.geometry.unsigned_area();
            let changed = (after - before).abs() > AREA_TOLERANCE * before.max(1.0);
            if changed {
                debug!(id = record.id, before, after, "repaired geometry changed area");
            }
            changed.then_some(record.id)
        })
        .count()
}
