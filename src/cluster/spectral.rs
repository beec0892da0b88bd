use std::{collections::VecDeque, str::FromStr};

use anyhow::{Result, ensure};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::{cluster::{ClusterAssignment, Partitioner, discretize::discretize, kmeans::kmeans}, graph::AffinityMatrix};

/// Strategy for turning the spectral embedding into discrete labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignLabels {
    /// Search for the partition matrix closest to the embedding (Yu & Shi).
    #[default]
    Discretize,
    /// Lloyd's k-means over the embedding rows.
    KMeans,
}

impl FromStr for AssignLabels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discretize" => Ok(Self::Discretize),
            "kmeans" => Ok(Self::KMeans),
            other => Err(format!("unknown label assignment {other:?}, expected discretize or kmeans")),
        }
    }
}

/// Spectral clustering over a precomputed affinity matrix.
#[derive(Debug, Clone)]
pub struct SpectralClustering {
    pub n_clusters: usize,
    pub assign_labels: AssignLabels,
    /// Seed for every random choice, so runs are reproducible.
    pub seed: u64,
    /// Discretization: rotation updates per attempt.
    pub n_iter_max: usize,
    /// Discretization: attempts after an SVD failure.
    pub max_svd_restarts: usize,
    /// K-means: independent initializations.
    pub n_init: usize,
}

impl SpectralClustering {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            assign_labels: AssignLabels::default(),
            seed: 0,
            n_iter_max: 20,
            max_svd_restarts: 30,
            n_init: 10,
        }
    }

    pub fn with_assign_labels(mut self, assign_labels: AssignLabels) -> Self {
        self.assign_labels = assign_labels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Partitioner for SpectralClustering {
    fn partition(&self, affinity: &AffinityMatrix) -> Result<ClusterAssignment> {
        let n = affinity.len();
        let k = self.n_clusters;
        let _span = info_span!("spectral", n, k, assign_labels = ?self.assign_labels).entered();

        ensure!(n > 0, "cannot cluster an empty affinity matrix");
        ensure!(k > 0, "number of clusters must be positive");
        ensure!(k <= n, "cannot form {k} clusters from {n} polygons");

        if k == 1 {
            return ClusterAssignment::new(vec![0; n], 1)
        }

        if !affinity.is_symmetric(1e-12) {
            warn!("affinity matrix is not symmetric; clustering its symmetric part (A + Aᵀ) / 2");
        }
        let weights = affinity.symmetrized();

        let components = count_components(&weights);
        if components > 1 {
            warn!(components, "affinity graph is not fully connected; spectral embedding may not work as expected");
        }

        let maps = spectral_embedding(&weights, k);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let labels = match self.assign_labels {
            AssignLabels::Discretize => discretize(&maps, &mut rng, self.n_iter_max, self.max_svd_restarts)?,
            AssignLabels::KMeans => kmeans(&maps, k, self.n_init, 300, &mut rng),
        };

        let assignment = ClusterAssignment::new(labels, k)?;
        info!(non_empty = assignment.non_empty(), sizes = ?assignment.sizes(), "clustered polygons");
        Ok(assignment)
    }
}

/// Embed every node with the `k` eigenvectors of the normalized Laplacian with the smallest
/// eigenvalues, rescaled by the inverse square-root degree. Returns an n x k matrix.
pub(crate) fn spectral_embedding(weights: &Array2<f64>, k: usize) -> DMatrix<f64> {
    let n = weights.nrows();

    // Self loops do not count towards the degree.
    let degree = (0..n)
        .map(|i| (0..n).filter(|&j| j != i).map(|j| weights[[i, j]]).sum::<f64>())
        .collect::<Vec<_>>();
    let isolated = degree.iter().map(|&d| d <= 0.0).collect::<Vec<_>>();
    let dd = degree.iter().zip(&isolated)
        .map(|(&d, &iso)| if iso { 1.0 } else { d.sqrt() })
        .collect::<Vec<_>>();

    let laplacian = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            if isolated[i] { 0.0 } else { 1.0 }
        } else {
            -weights[[i, j]] / (dd[i] * dd[j])
        }
    });

    let eigen = SymmetricEigen::new(laplacian);
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    debug!(eigenvalues = ?order.iter().take(k).map(|&i| eigen.eigenvalues[i]).collect::<Vec<_>>(), "smallest Laplacian eigenvalues");

    let mut maps = DMatrix::from_fn(n, k, |row, col| eigen.eigenvectors[(row, order[col])] / dd[row]);

    // Deterministic sign: the largest-magnitude entry of every vector is positive.
    for mut column in maps.column_iter_mut() {
        let pivot = column.iter().copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            column.neg_mut();
        }
    }

    maps
}

/// Number of connected components of the graph with an edge wherever a weight is positive.
fn count_components(weights: &Array2<f64>) -> usize {
    let n = weights.nrows();
    let mut seen = vec![false; n];
    let mut components = 0;

    for start in 0..n {
        if seen[start] { continue }
        components += 1;
        seen[start] = true;

        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for next in 0..n {
                if !seen[next] && weights[[node, next]] > 0.0 {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    components
}
