#![doc = "Macro-region clustering of contiguous municipal polygons"]
mod cluster;
mod config;
mod geom;
mod graph;
mod io;
mod pipeline;
mod plot;
mod region;

#[doc(inline)]
pub use geom::{PolygonRecord, PolygonSet, bounds_of, repair};

#[doc(inline)]
pub use graph::{AdjacencyMatrix, AdjacencySearch, AffinityMatrix, Contiguity};

#[doc(inline)]
pub use cluster::{AssignLabels, ClusterAssignment, Partitioner, SpectralClustering};

#[doc(inline)]
pub use region::{MacroRegion, merge_regions};

#[doc(inline)]
pub use plot::{OutputFormat, PlotOptions, RenderError, Rgb, render_side_by_side, render_side_by_side_svg};

#[doc(inline)]
pub use io::{load_polygons, write_regions_geojson};

#[doc(inline)]
pub use config::Config;

#[doc(inline)]
pub use pipeline::{Summary, run};
