use nalgebra::DMatrix;
use rand::Rng;
use tracing::debug;

/// Lloyd's k-means over the rows of `points`, seeded with k-means++.
/// Runs `n_init` independent initializations and keeps the labels with the lowest inertia.
pub(crate) fn kmeans(points: &DMatrix<f64>, k: usize, n_init: usize, max_iter: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut best: Option<(f64, Vec<usize>)> = None;

    for run in 0..n_init.max(1) {
        let centroids = kmeans_plus_plus(points, k, rng);
        let (inertia, labels) = lloyd(points, centroids, max_iter);
        debug!(run, inertia, "k-means run finished");

        if best.as_ref().is_none_or(|(lowest, _)| inertia < *lowest) {
            best = Some((inertia, labels));
        }
    }

    best.map(|(_, labels)| labels).unwrap_or_default()
}

fn squared_distance(points: &DMatrix<f64>, row: usize, centroids: &DMatrix<f64>, c: usize) -> f64 {
    (0..points.ncols()).map(|d| (points[(row, d)] - centroids[(c, d)]).powi(2)).sum()
}

/// Nearest centroid of `row` and the squared distance to it.
fn nearest(points: &DMatrix<f64>, row: usize, centroids: &DMatrix<f64>) -> (usize, f64) {
    (0..centroids.nrows())
        .map(|c| (c, squared_distance(points, row, centroids, c)))
        .fold((0, f64::INFINITY), |best, cand| if cand.1 < best.1 { cand } else { best })
}

/// Pick the first centroid uniformly, then each next one with probability proportional
/// to its squared distance from the closest centroid chosen so far.
fn kmeans_plus_plus(points: &DMatrix<f64>, k: usize, rng: &mut impl Rng) -> DMatrix<f64> {
    let n = points.nrows();
    let mut centroids = DMatrix::<f64>::zeros(k, points.ncols());
    centroids.set_row(0, &points.row(rng.random_range(0..n)));

    let mut distances = (0..n)
        .map(|row| squared_distance(points, row, &centroids, 0))
        .collect::<Vec<_>>();

    for c in 1..k {
        let total = distances.iter().sum::<f64>();
        let chosen = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            distances.iter()
                .position(|&d| { target -= d; target <= 0.0 })
                .unwrap_or(n - 1)
        } else {
            rng.random_range(0..n)
        };
        centroids.set_row(c, &points.row(chosen));

        for (row, distance) in distances.iter_mut().enumerate() {
            *distance = distance.min(squared_distance(points, row, &centroids, c));
        }
    }

    centroids
}

/// Alternate assignment and centroid updates until labels stop changing.
/// A centroid that loses all its points stays where it was.
fn lloyd(points: &DMatrix<f64>, mut centroids: DMatrix<f64>, max_iter: usize) -> (f64, Vec<usize>) {
    let (n, dims) = points.shape();
    let k = centroids.nrows();
    let mut labels = vec![usize::MAX; n];

    for _ in 0..max_iter {
        let mut changed = false;
        for (row, label) in labels.iter_mut().enumerate() {
            let (c, _) = nearest(points, row, &centroids);
            if *label != c {
                *label = c;
                changed = true;
            }
        }
        if !changed { break }

        let mut sums = DMatrix::<f64>::zeros(k, dims);
        let mut counts = vec![0usize; k];
        for (row, &label) in labels.iter().enumerate() {
            let mut target = sums.row_mut(label);
            target += points.row(row);
            counts[label] += 1;
        }
        for (c, &count) in counts.iter().enumerate() {
            if count > 0 {
                centroids.set_row(c, &(sums.row(c) / count as f64));
            }
        }
    }

    let inertia = (0..n).map(|row| nearest(points, row, &centroids).1).sum();
    let labels = (0..n).map(|row| nearest(points, row, &centroids).0).collect();
    (inertia, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn blobs() -> DMatrix<f64> {
        DMatrix::from_row_slice(6, 2, &[
            0.0, 0.0,
            0.1, 0.0,
            0.0, 0.1,
            5.0, 5.0,
            5.1, 5.0,
            5.0, 5.1,
        ])
    }

    #[test]
    fn separates_two_blobs() {
        let mut rng = StdRng::seed_from_u64(3);
        let labels = kmeans(&blobs(), 2, 5, 100, &mut rng);
        assert!(labels[..3].iter().all(|&l| l == labels[0]));
        assert!(labels[3..].iter().all(|&l| l == labels[3]));
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn seeding_picks_distinct_points_for_distinct_data() {
        let mut rng = StdRng::seed_from_u64(0);
        let centroids = kmeans_plus_plus(&blobs(), 2, &mut rng);
        let gap = (centroids[(0, 0)] - centroids[(1, 0)]).abs();
        assert!(gap > 1.0);
    }

    #[test]
    fn identical_points_share_a_label() {
        let points = DMatrix::from_row_slice(3, 1, &[1.0, 1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let labels = kmeans(&points, 2, 3, 10, &mut rng);
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().all(|&l| l == labels[0]));
    }
}
