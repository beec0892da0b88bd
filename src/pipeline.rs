//! End-to-end run: load, build matrices, cluster, merge, render.

use std::fmt;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use crate::{
    cluster::{Partitioner, SpectralClustering},
    config::Config,
    graph::{AdjacencyMatrix, AffinityMatrix},
    io,
    plot::{OutputFormat, PlotOptions, render_side_by_side},
    region::merge_regions,
};

/// What a run produced, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub edges: usize,
    /// Polygons per cluster label, including empty labels.
    pub cluster_sizes: Vec<usize>,
    pub regions: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "polygons:      {}", self.records)?;
        writeln!(f, "adjacent pairs: {}", self.edges)?;
        writeln!(f, "cluster sizes: {:?}", self.cluster_sizes)?;
        write!(f, "macro-regions: {}", self.regions)
    }
}

/// Run every stage with the given configuration and write the figure
/// (and the regions file when one is configured).
pub fn run(config: &Config) -> Result<Summary> {
    config.validate()?;
    let options = PlotOptions::from_config(config)?;
    OutputFormat::from_path(&config.output_path)?;
    let _span = info_span!("run", input = %config.input_path.display()).entered();

    let polygons = io::load_polygons(&config.input_path)
        .context("[pipeline] Failed to load polygons")?;

    let adjacency = AdjacencyMatrix::build(&polygons, config.contiguity, config.search)
        .context("[pipeline] Failed to build adjacency matrix")?;
    let affinity = AffinityMatrix::from_adjacency(&adjacency)
        .context("[pipeline] Failed to build affinity matrix")?;

    let assignment = SpectralClustering::new(config.n_clusters)
        .with_assign_labels(config.assign_labels)
        .with_seed(config.seed)
        .partition(&affinity)
        .context("[pipeline] Spectral clustering failed")?;

    let regions = merge_regions(&polygons, &assignment)
        .context("[pipeline] Failed to merge regions")?;

    if let Some(path) = &config.regions_path {
        io::write_regions_geojson(path, &regions)?;
    }

    render_side_by_side(&config.output_path, &polygons, &regions, &options)
        .with_context(|| format!("[pipeline] Failed to render {}", config.output_path.display()))?;

    let summary = Summary {
        records: polygons.len(),
        edges: adjacency.edge_count(),
        cluster_sizes: assignment.sizes(),
        regions: regions.len(),
    };
    info!(regions = summary.regions, output = %config.output_path.display(), "done");
    Ok(summary)
}
