use anyhow::{Result, bail};
use nalgebra::DMatrix;
use rand::Rng;
use tracing::{debug, warn};

/// Search for the discrete partition closest to a spectral embedding (Yu & Shi, 2003).
///
/// Alternates between snapping the rotated embedding to its nearest indicator matrix and
/// solving for the orthogonal rotation that best maps the embedding onto that indicator.
/// An SVD that fails to converge restarts the search from a new random rotation.
pub(crate) fn discretize(
    embedding: &DMatrix<f64>,
    rng: &mut impl Rng,
    n_iter_max: usize,
    max_svd_restarts: usize,
) -> Result<Vec<usize>> {
    let (n, k) = embedding.shape();
    let vectors = normalize(embedding);

    let mut restarts = 0;
    while restarts < max_svd_restarts {
        let mut rotation = initial_rotation(&vectors, rng);
        let mut last_objective = 0.0;
        let mut n_iter = 0;

        loop {
            n_iter += 1;

            let projected = &vectors * &rotation;
            let labels = (0..n).map(|row| argmax(projected.row(row).iter())).collect::<Vec<_>>();

            // Indicatorᵀ * vectors, accumulated row by row.
            let mut t_svd = DMatrix::<f64>::zeros(k, k);
            for (row, &label) in labels.iter().enumerate() {
                let mut target = t_svd.row_mut(label);
                target += vectors.row(row);
            }

            let Some(svd) = t_svd.try_svd(true, true, f64::EPSILON, 0) else {
                restarts += 1;
                warn!(restarts, "SVD did not converge, randomizing and trying again");
                break
            };

            let ncut = 2.0 * (n as f64 - svd.singular_values.sum());
            if (ncut - last_objective).abs() < f64::EPSILON || n_iter > n_iter_max {
                debug!(n_iter, ncut, "discretization converged");
                return Ok(labels)
            }
            last_objective = ncut;

            let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
                bail!("SVD did not produce singular vectors");
            };
            rotation = v_t.transpose() * u.transpose();
        }
    }

    bail!("SVD did not converge after {max_svd_restarts} restarts")
}

/// Scale each eigenvector to norm sqrt(n) with a negative first entry, then scale each row to unit length.
fn normalize(embedding: &DMatrix<f64>) -> DMatrix<f64> {
    let n = embedding.nrows();
    let mut vectors = embedding.clone();

    for mut column in vectors.column_iter_mut() {
        let norm = column.norm();
        if norm > 0.0 {
            column *= (n as f64).sqrt() / norm;
        }
        let first = column[0];
        if first != 0.0 {
            column *= -first.signum();
        }
    }

    for mut row in vectors.row_iter_mut() {
        let norm = row.norm();
        if norm > 0.0 {
            row /= norm;
        }
    }

    vectors
}

/// First column is a random row of `vectors`; each following column is the row least
/// aligned with every column chosen so far.
fn initial_rotation(vectors: &DMatrix<f64>, rng: &mut impl Rng) -> DMatrix<f64> {
    let (n, k) = vectors.shape();
    let mut rotation = DMatrix::<f64>::zeros(k, k);
    rotation.set_column(0, &vectors.row(rng.random_range(0..n)).transpose());

    let mut c = vec![0.0; n];
    for j in 1..k {
        let alignment = vectors * rotation.column(j - 1);
        for (acc, value) in c.iter_mut().zip(alignment.iter()) {
            *acc += value.abs();
        }
        let next = argmin(c.iter());
        rotation.set_column(j, &vectors.row(next).transpose());
    }

    rotation
}

/// Index of the largest value; ties go to the first.
fn argmax<'a>(values: impl Iterator<Item = &'a f64>) -> usize {
    values.enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| if v > max { (i, v) } else { (best, max) })
        .0
}

/// Index of the smallest value; ties go to the first.
fn argmin<'a>(values: impl Iterator<Item = &'a f64>) -> usize {
    values.enumerate()
        .fold((0, f64::INFINITY), |(best, min), (i, &v)| if v < min { (i, v) } else { (best, min) })
        .0
}
