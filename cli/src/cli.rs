use std::path::PathBuf;

use macroregions::{AdjacencySearch, AssignLabels, Contiguity};

/// Spectral clustering of municipal polygons into contiguous macro-regions
#[derive(clap::Parser, Debug)]
#[command(name = "macroregions", version, about)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON configuration file; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Input polygon file (.geojson, .json or .shp)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output figure (.png or .svg), defaults to "./side_by_side_plot.png"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also export the merged regions as GeoJSON
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub regions: Option<PathBuf>,

    /// Number of clusters
    #[arg(short = 'k', long)]
    pub clusters: Option<usize>,

    /// Adjacency rule: queen or rook
    #[arg(long)]
    pub contiguity: Option<Contiguity>,

    /// Candidate pair search: indexed or exhaustive
    #[arg(long)]
    pub search: Option<AdjacencySearch>,

    /// Label assignment: discretize or kmeans
    #[arg(long)]
    pub assign_labels: Option<AssignLabels>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}
