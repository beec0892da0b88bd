//! Spectral partitioning of a precomputed affinity matrix.

mod assignment;
mod discretize;
mod kmeans;
mod spectral;

use anyhow::Result;

use crate::graph::AffinityMatrix;

pub use assignment::ClusterAssignment;
pub use spectral::{AssignLabels, SpectralClustering};

/// Assigns every row of an affinity matrix to a cluster label.
pub trait Partitioner {
    fn partition(&self, affinity: &AffinityMatrix) -> Result<ClusterAssignment>;
}
