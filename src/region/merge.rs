use anyhow::{Result, ensure};
use geo::{MultiPolygon, unary_union};
use tracing::{debug, info_span};

use crate::{cluster::ClusterAssignment, geom::PolygonSet};

/// The union of every polygon sharing one cluster label.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRegion {
    pub label: usize,
    pub geometry: MultiPolygon<f64>,
    /// Indices of the member polygons, ascending.
    pub members: Vec<usize>,
}

/// Dissolve the polygons of each cluster into one macro-region.
///
/// Regions come out in ascending label order. Labels with no members produce no region,
/// so fewer than `n_clusters` regions may be returned.
pub fn merge_regions(polygons: &PolygonSet, assignment: &ClusterAssignment) -> Result<Vec<MacroRegion>> {
    ensure!(
        polygons.len() == assignment.len(),
        "assignment covers {} polygons but the set has {}", assignment.len(), polygons.len()
    );

    let _span = info_span!("merge", n = polygons.len(), k = assignment.n_clusters()).entered();

    let regions = assignment.groups().into_iter().enumerate()
        .filter(|(_, members)| !members.is_empty())
        .map(|(label, members)| {
            let geometry = unary_union(members.iter().map(|&idx| polygons.shape(idx)));
            debug!(label, members = members.len(), parts = geometry.0.len(), "merged region");
            MacroRegion { label, geometry, members }
        })
        .collect::<Vec<_>>();

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::{Area, polygon};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0), (x: x, y: y),
        ]])
    }

    fn strip(n: usize) -> PolygonSet {
        PolygonSet::from_geometries((0..n).map(|i| square(i as f64, 0.0)).collect())
    }

    #[test]
    fn empty_labels_produce_no_region() {
        let polygons = strip(4);
        let assignment = ClusterAssignment::new(vec![0, 0, 2, 4], 5).unwrap();
        let regions = merge_regions(&polygons, &assignment).unwrap();
        assert_eq!(regions.iter().map(|r| r.label).collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(regions[0].members, vec![0, 1]);
    }

    #[test]
    fn adjacent_members_dissolve_into_one_part() {
        let polygons = strip(3);
        let assignment = ClusterAssignment::new(vec![0, 0, 1], 2).unwrap();
        let regions = merge_regions(&polygons, &assignment).unwrap();
        assert_eq!(regions[0].geometry.0.len(), 1);
        assert_abs_diff_eq!(regions[0].geometry.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn region_areas_add_up_to_the_input() {
        let polygons = strip(6);
        let assignment = ClusterAssignment::new(vec![1, 0, 1, 2, 2, 0], 3).unwrap();
        let regions = merge_regions(&polygons, &assignment).unwrap();
        let total = regions.iter().map(|r| r.geometry.unsigned_area()).sum::<f64>();
        assert_abs_diff_eq!(total, polygons.total_area(), epsilon = 1e-9);

        let mut members = regions.iter().flat_map(|r| r.members.iter().copied()).collect::<Vec<_>>();
        members.sort_unstable();
        assert_eq!(members, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn lone_member_keeps_its_shape() {
        let polygons = strip(1);
        let assignment = ClusterAssignment::new(vec![0], 1).unwrap();
        let regions = merge_regions(&polygons, &assignment).unwrap();
        assert_eq!(regions.len(), 1);
        assert_abs_diff_eq!(regions[0].geometry.unsigned_area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let assignment = ClusterAssignment::new(vec![0, 0], 1).unwrap();
        assert!(merge_regions(&strip(3), &assignment).is_err());
    }
}
