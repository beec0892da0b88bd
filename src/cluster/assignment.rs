use anyhow::{Result, ensure};

/// Cluster label for every polygon index, with labels in `[0, n_clusters)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    n_clusters: usize,
}

impl ClusterAssignment {
    /// Construct an assignment, checking every label is below `n_clusters`.
    pub fn new(labels: Vec<usize>, n_clusters: usize) -> Result<Self> {
        if let Some((idx, &label)) = labels.iter().enumerate().find(|&(_, &label)| label >= n_clusters) {
            anyhow::bail!("label {label} of polygon {idx} is out of range for {n_clusters} clusters");
        }
        ensure!(n_clusters > 0 || labels.is_empty(), "cannot assign polygons to zero clusters");
        Ok(Self { labels, n_clusters })
    }

    /// Number of assigned polygons.
    #[inline] pub fn len(&self) -> usize { self.labels.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Target number of clusters; some of them may be empty.
    #[inline] pub fn n_clusters(&self) -> usize { self.n_clusters }

    #[inline] pub fn labels(&self) -> &[usize] { &self.labels }

    /// Label of the polygon at `idx`.
    #[inline] pub fn label(&self, idx: usize) -> usize { self.labels[idx] }

    /// Polygon indices grouped by label, in ascending index order; one (possibly empty) group per label.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.n_clusters];
        for (idx, &label) in self.labels.iter().enumerate() {
            groups[label].push(idx);
        }
        groups
    }

    /// Number of polygons carrying each label.
    pub fn sizes(&self) -> Vec<usize> {
        self.groups().iter().map(Vec::len).collect()
    }

    /// Number of labels with at least one polygon.
    pub fn non_empty(&self) -> usize {
        self.sizes().into_iter().filter(|&size| size > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_cover_every_index_once() {
        let assignment = ClusterAssignment::new(vec![2, 0, 2, 4, 0], 5).unwrap();
        let groups = assignment.groups();
        assert_eq!(groups, vec![vec![1, 4], vec![], vec![0, 2], vec![], vec![3]]);

        let mut seen = groups.concat();
        seen.sort_unstable();
        assert_eq!(seen, (0..assignment.len()).collect::<Vec<_>>());

        assert_eq!(assignment.sizes(), vec![2, 0, 2, 0, 1]);
        assert_eq!(assignment.non_empty(), 3);
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        assert!(ClusterAssignment::new(vec![0, 3], 3).is_err());
        assert!(ClusterAssignment::new(vec![0], 0).is_err());
        assert!(ClusterAssignment::new(Vec::new(), 0).is_ok());
    }
}
