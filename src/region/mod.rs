//! Dissolving clustered polygons into macro-regions.

mod merge;

pub use merge::{MacroRegion, merge_regions};
