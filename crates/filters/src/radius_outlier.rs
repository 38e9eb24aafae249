use crate::OutlierFilter;
use cloudclean_core::{CloudError, FilterResult, PointCloud, Result};
use cloudclean_spatial::KdTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Radius-density outlier removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusOutlierFilter {
    pub min_points: usize,
    pub radius: f32,
}

impl Default for RadiusOutlierFilter {
    fn default() -> Self {
        Self {
            min_points: 16,
            radius: 0.05,
        }
    }
}

impl OutlierFilter for RadiusOutlierFilter {
    fn name(&self) -> &'static str {
        "radius"
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        radius_outlier_removal(cloud, self.radius, self.min_points)
    }
}

/// Keep points that have at least `min_points` other points within
/// `radius`.
///
/// Distances are Euclidean and the boundary is inclusive: a neighbour at
/// exactly `radius` counts. The point itself is never counted, so an
/// isolated point is removed whenever `min_points >= 1`.
pub fn radius_outlier_removal(
    cloud: &PointCloud,
    radius: f32,
    min_points: usize,
) -> Result<FilterResult> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(CloudError::invalid_parameter(
            "radius must be > 0 and finite",
        ));
    }

    if cloud.is_empty() {
        return Ok(FilterResult::empty());
    }

    let tree = KdTree::build(cloud);
    let keep: Vec<usize> = (0..cloud.len())
        .filter(|&i| tree.count_others_within(cloud, i, radius) >= min_points)
        .collect();

    debug!(
        radius,
        min_points,
        kept = keep.len(),
        "radius outlier pass"
    );

    Ok(FilterResult::from_kept(cloud, keep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn radius_outlier_removes_isolated_points() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, 0.1, 0.2, 100.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
        );
        // Each of the three close points has two others within 0.5.
        let result = radius_outlier_removal(&cloud, 0.5, 2).unwrap();
        assert_eq!(result.retained(), 3);
        assert_eq!(result.removed_indices(), vec![3]);
    }

    #[test]
    fn isolated_point_removed_with_min_points_one() {
        let cloud = PointCloud::from_xyz(vec![0.0, 0.01, 5.0], vec![0.0; 3], vec![0.0; 3]);
        let result = radius_outlier_removal(&cloud, 0.05, 1).unwrap();
        assert_eq!(result.kept, vec![0, 1]);
    }

    #[test]
    fn single_point_is_removed() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        let result = radius_outlier_removal(&cloud, 1.0, 1).unwrap();
        assert!(result.cloud.is_empty());
        assert_eq!(result.removed, 1);
    }

    #[test]
    fn neighbour_on_boundary_counts() {
        let cloud = PointCloud::from_xyz(vec![0.0, 0.5], vec![0.0; 2], vec![0.0; 2]);
        let result = radius_outlier_removal(&cloud, 0.5, 1).unwrap();
        assert_eq!(result.retained(), 2);
    }

    #[test]
    fn radius_outlier_keeps_dense_cluster() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, 0.1, 0.2, 0.3, 0.4],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
        );
        let result = radius_outlier_removal(&cloud, 1.0, 2).unwrap();
        assert_eq!(result.retained(), 5);
    }

    #[test]
    fn min_points_zero_keeps_everything() {
        let cloud = PointCloud::from_xyz(vec![0.0, 50.0], vec![0.0; 2], vec![0.0; 2]);
        let result = radius_outlier_removal(&cloud, 0.1, 0).unwrap();
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn radius_outlier_empty_cloud() {
        let result = radius_outlier_removal(&PointCloud::new(), 1.0, 2).unwrap();
        assert!(result.cloud.is_empty());
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn invalid_radius_rejected() {
        let cloud = PointCloud::from_xyz(vec![0.0], vec![0.0], vec![0.0]);
        for r in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                radius_outlier_removal(&cloud, r, 1),
                Err(CloudError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn default_parameters() {
        let f = RadiusOutlierFilter::default();
        assert_eq!(f.min_points, 16);
        assert_eq!(f.radius, 0.05);
    }

    proptest! {
        #[test]
        fn radius_outlier_counts_add_up(
            pts in prop::collection::vec(
                (-100.0f32..100.0f32, -100.0f32..100.0f32, -100.0f32..100.0f32),
                0..300
            ),
            radius in 0.01f32..10.0f32,
            min_points in 1usize..10,
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let result = radius_outlier_removal(&cloud, radius, min_points).unwrap();
            prop_assert_eq!(result.retained() + result.removed, cloud.len());
        }
    }
}
