//! Run configuration, loadable from JSON. Missing fields fall back to their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{cluster::AssignLabels, graph::{AdjacencySearch, Contiguity}, plot::Rgb};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Polygon file to cluster (`.geojson`, `.json` or `.shp`).
    pub input_path: PathBuf,
    /// Side-by-side figure (`.png` or `.svg`).
    pub output_path: PathBuf,
    /// Optional GeoJSON export of the merged regions.
    pub regions_path: Option<PathBuf>,
    pub n_clusters: usize,
    /// Color names indexed by cluster label.
    pub palette: Vec<String>,
    pub original_fill: String,
    pub dpi: u32,
    /// Width and height in inches.
    pub figure_size: [f64; 2],
    pub contiguity: Contiguity,
    pub search: AdjacencySearch,
    pub assign_labels: AssignLabels,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("nl_2020.geojson"),
            output_path: PathBuf::from("side_by_side_plot.png"),
            regions_path: None,
            n_clusters: 10,
            palette: [
                "red", "blue", "green", "purple", "yellow", "black",
                "cyan", "gold", "magenta", "brown", "orange", "grey",
            ].map(String::from).to_vec(),
            original_fill: "blue".to_string(),
            dpi: 300,
            figure_size: [12.0, 6.0],
            contiguity: Contiguity::default(),
            search: AdjacencySearch::default(),
            assign_labels: AssignLabels::default(),
            seed: 0,
        }
    }
}

impl Config {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("[config] Failed to parse {}", path.display()))
    }

    /// Check the settings are usable before any work starts.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.n_clusters > 0, "[config] n_clusters must be at least 1");
        ensure!(!self.palette.is_empty(), "[config] palette must not be empty");
        ensure!(
            self.n_clusters <= self.palette.len(),
            "[config] n_clusters ({}) exceeds the palette size ({}); add colors or lower n_clusters",
            self.n_clusters, self.palette.len()
        );
        ensure!(self.dpi > 0, "[config] dpi must be positive");
        ensure!(
            self.figure_size.iter().all(|&side| side.is_finite() && side > 0.0),
            "[config] figure_size must be positive, got {:?}", self.figure_size
        );

        for name in self.palette.iter().chain(std::iter::once(&self.original_fill)) {
            Rgb::parse(name).context("[config] Invalid color")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.n_clusters, 10);
        assert_eq!(config.palette.len(), 12);
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "n_clusters": 4, "contiguity": "rook", "assign_labels": "kmeans" }}"#).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.n_clusters, 4);
        assert_eq!(config.contiguity, Contiguity::Rook);
        assert_eq!(config.assign_labels, AssignLabels::KMeans);
        assert_eq!(config.dpi, 300);
        assert_eq!(config.output_path, PathBuf::from("side_by_side_plot.png"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "clusters": 4 }}"#).unwrap();
        assert!(Config::from_json_file(file.path()).is_err());
    }

    #[test]
    fn more_clusters_than_colors_is_invalid() {
        let config = Config { n_clusters: 13, ..Config::default() };
        let message = format!("{:#}", config.validate().unwrap_err());
        assert!(message.contains("palette"), "{message}");
    }

    #[test]
    fn bad_values_are_invalid() {
        assert!(Config { n_clusters: 0, ..Config::default() }.validate().is_err());
        assert!(Config { palette: Vec::new(), ..Config::default() }.validate().is_err());
        assert!(Config { original_fill: "ultraviolet".into(), ..Config::default() }.validate().is_err());
        assert!(Config { dpi: 0, ..Config::default() }.validate().is_err());
    }
}
