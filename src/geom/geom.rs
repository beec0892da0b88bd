use geo::{Area, BoundingRect, Coord, MultiPolygon, Rect};
use rstar::{RTree, AABB};
use serde_json::{Map, Value};

use crate::geom::BoundingBox;

/// A single boundary polygon loaded from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    /// Position of the record in the loaded collection.
    pub id: usize,
    pub geometry: MultiPolygon<f64>,
    /// Attribute fields carried over from the source file, untouched.
    pub attributes: Map<String, Value>,
}

impl PolygonRecord {
    pub fn new(id: usize, geometry: MultiPolygon<f64>) -> Self {
        Self { id, geometry, attributes: Map::new() }
    }

    pub fn with_attributes(id: usize, geometry: MultiPolygon<f64>, attributes: Map<String, Value>) -> Self {
        Self { id, geometry, attributes }
    }
}

/// PolygonSet is the ordered collection of polygon records, with a bounding-box
/// index used for candidate lookups. Records are immutable once the set is built.
#[derive(Debug, Clone)]
pub struct PolygonSet {
    records: Vec<PolygonRecord>,
    rtree: RTree<BoundingBox>,
}

impl PolygonSet {
    /// Construct a PolygonSet from records. Record ids are reassigned to their positions.
    pub fn new(records: Vec<PolygonRecord>) -> Self {
        let records = records.into_iter().enumerate()
            .map(|(id, record)| PolygonRecord { id, ..record })
            .collect::<Vec<_>>();

        Self {
            rtree: RTree::bulk_load(
                records.iter()
                    .filter_map(|record| record.geometry.bounding_rect()
                        .map(|rect| BoundingBox::new(record.id, rect)))
                    .collect()
            ),
            records,
        }
    }

    /// Construct a PolygonSet from bare geometries, with no attributes.
    pub fn from_geometries(geometries: Vec<MultiPolygon<f64>>) -> Self {
        Self::new(geometries.into_iter().enumerate()
            .map(|(id, geometry)| PolygonRecord::new(id, geometry))
            .collect())
    }

    /// Get the number of records.
    #[inline] pub fn len(&self) -> usize { self.records.len() }

    /// Check if there are no records.
    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Get a reference to the list of records.
    #[inline] pub fn records(&self) -> &[PolygonRecord] { &self.records }

    /// Get the geometry of the record at `idx`.
    #[inline] pub fn shape(&self, idx: usize) -> &MultiPolygon<f64> { &self.records[idx].geometry }

    /// Iterate over all geometries in record order.
    #[inline]
    pub fn shapes(&self) -> impl Iterator<Item = &MultiPolygon<f64>> + '_ {
        self.records.iter().map(|record| &record.geometry)
    }

    /// Query the R-tree for the bounding box of the record at `idx`, padded by `eps`,
    /// returning the indices of records whose bounding boxes intersect it.
    pub(crate) fn candidates(&self, idx: usize, eps: f64) -> Vec<usize> {
        let Some(rect) = self.shape(idx).bounding_rect() else { return Vec::new() };
        let search = BoundingBox::new(idx, rect).padded(eps);
        self.query(&search).collect()
    }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query<'a>(&'a self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = usize> + 'a {
        self.rtree.locate_in_envelope_intersecting(envelope).map(|bbox| bbox.idx())
    }

    /// Compute the bounding rectangle of all records.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        bounds_of(self.shapes())
    }

    /// Sum of the unsigned areas of all records.
    pub fn total_area(&self) -> f64 {
        self.shapes().map(|shape| shape.unsigned_area()).sum()
    }
}

/// Compute the bounding rectangle enclosing every geometry in `shapes`.
pub fn bounds_of<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Option<Rect<f64>> {
    shapes.into_iter()
        .filter_map(|polygon| polygon.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord {
                x: a.min().x.min(b.min().x),
                y: a.min().y.min(b.min().y),
            },
            Coord {
                x: a.max().x.max(b.max().x),
                y: a.max().y.max(b.max().y),
            }
        ))
}
