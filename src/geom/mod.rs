mod bbox;
mod geom;
mod repair;

use bbox::BoundingBox;
pub use geom::{PolygonRecord, PolygonSet, bounds_of};
pub use repair::repair;
pub(crate) use repair::repair_records;
