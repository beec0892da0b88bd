use anyhow::{Result, bail, ensure};
use ndarray::{Array1, Array2, Axis};

use crate::graph::AdjacencyMatrix;

/// Non-negative square matrix of pairwise similarities, consumed by the partitioner.
/// Built from an adjacency matrix it is row-stochastic but generally not symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityMatrix(Array2<f64>);

impl AffinityMatrix {
    /// Divide each row of the adjacency matrix by its row sum.
    pub fn from_adjacency(adjacency: &AdjacencyMatrix) -> Result<Self> {
        Self::row_normalized(adjacency.as_array().clone())
    }

    /// Row-normalize an arbitrary non-negative square matrix.
    pub fn row_normalized(mut matrix: Array2<f64>) -> Result<Self> {
        let sums = matrix.sum_axis(Axis(1));
        for (i, mut row) in matrix.axis_iter_mut(Axis(0)).enumerate() {
            let sum = sums[i];
            if !(sum > 0.0) { bail!("row {i} sums to {sum}; cannot normalize") }
            row.mapv_inplace(|value| value / sum);
        }
        Self::from_array(matrix)
    }

    /// Wrap a precomputed affinity matrix, checking it is square, finite and non-negative.
    pub fn from_array(matrix: Array2<f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        ensure!(rows == cols, "affinity matrix must be square, got {rows}x{cols}");
        ensure!(matrix.iter().all(|v| v.is_finite() && *v >= 0.0), "affinity matrix must be finite and non-negative");
        Ok(Self(matrix))
    }

    #[inline] pub fn len(&self) -> usize { self.0.nrows() }

    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline] pub fn as_array(&self) -> &Array2<f64> { &self.0 }

    /// Sum of each row.
    pub fn row_sums(&self) -> Array1<f64> { self.0.sum_axis(Axis(1)) }

    /// Whether A[i][j] and A[j][i] agree within `tol` everywhere.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.0.indexed_iter().all(|((i, j), &value)| (value - self.0[[j, i]]).abs() <= tol)
    }

    /// The symmetric part (A + Aᵀ) / 2.
    pub fn symmetrized(&self) -> Array2<f64> {
        (&self.0 + &self.0.t()) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn rows_sum_to_one() {
        let adjacency = AdjacencyMatrix::from_array(array![
            [1.0, 1.0, 1.0, 0.0],
            [1.0, 1.0, 0.0, 1.0],
            [1.0, 0.0, 1.0, 1.0],
            [0.0, 1.0, 1.0, 1.0],
        ]).unwrap();
        let affinity = AffinityMatrix::from_adjacency(&adjacency).unwrap();
        for &sum in affinity.row_sums().iter() {
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(affinity.as_array()[[0, 1]], 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn path_graph_is_asymmetric() {
        // 0 - 1 - 2: the middle row is split three ways, the end rows two ways.
        let adjacency = AdjacencyMatrix::from_array(array![
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]).unwrap();
        let affinity = AffinityMatrix::from_adjacency(&adjacency).unwrap();
        assert_abs_diff_eq!(affinity.as_array()[[0, 1]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(affinity.as_array()[[1, 0]], 1.0 / 3.0, epsilon = 1e-12);
        assert!(!affinity.is_symmetric(1e-9));

        let symmetric = affinity.symmetrized();
        assert_abs_diff_eq!(symmetric[[0, 1]], symmetric[[1, 0]], epsilon = 1e-15);
    }

    #[test]
    fn single_polygon_affinity_is_one() {
        let adjacency = AdjacencyMatrix::from_array(array![[1.0]]).unwrap();
        let affinity = AffinityMatrix::from_adjacency(&adjacency).unwrap();
        assert_eq!(affinity.as_array(), &array![[1.0]]);
    }

    #[test]
    fn zero_rows_are_rejected() {
        assert!(AffinityMatrix::row_normalized(array![[0.0, 0.0], [1.0, 1.0]]).is_err());
    }

    #[test]
    fn negative_entries_are_rejected() {
        assert!(AffinityMatrix::from_array(array![[1.0, -0.5], [0.5, 1.0]]).is_err());
    }

    proptest! {
        #[test]
        fn random_adjacency_is_row_stochastic(n in 1usize..12, bits in proptest::collection::vec(any::<bool>(), 144)) {
            let mut matrix = Array2::<f64>::eye(n);
            for i in 0..n {
                for j in i + 1..n {
                    if bits[i * 12 + j] {
                        matrix[[i, j]] = 1.0;
                        matrix[[j, i]] = 1.0;
                    }
                }
            }
            let adjacency = AdjacencyMatrix::from_array(matrix).unwrap();
            let affinity = AffinityMatrix::from_adjacency(&adjacency).unwrap();
            for &sum in affinity.row_sums().iter() {
                prop_assert!((sum - 1.0).abs() < 1e-9);
            }
        }
    }
}
