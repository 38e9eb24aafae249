use crate::stats::mean_std;
use crate::OutlierFilter;
use cloudclean_core::{CloudError, FilterResult, PointCloud, Result};
use cloudclean_spatial::KdTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Statistical outlier removal over k-nearest-neighbour distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticalOutlierFilter {
    pub k_neighbors: usize,
    pub std_ratio: f32,
}

impl Default for StatisticalOutlierFilter {
    fn default() -> Self {
        Self {
            k_neighbors: 20,
            std_ratio: 2.0,
        }
    }
}

impl OutlierFilter for StatisticalOutlierFilter {
    fn name(&self) -> &'static str {
        "statistical"
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        statistical_outlier_removal(cloud, self.k_neighbors, self.std_ratio)
    }
}

/// Remove points whose mean distance to their `k` nearest neighbours is
/// unusually large.
///
/// For every point the mean Euclidean distance to its `k` nearest other
/// points is computed. A point is discarded when that mean exceeds
/// `mean + std_ratio * stddev`, both taken over all points.
///
/// Neighbour lookups go through a k-d tree: O(n log n) to build and
/// O(k log n) per query. Non-finite points are always discarded.
///
/// # Errors
///
/// - [`CloudError::InsufficientData`] if the cloud has fewer than `k + 1`
///   finite points.
/// - [`CloudError::InvalidParameter`] if `k == 0` or `std_ratio` is
///   negative or non-finite.
pub fn statistical_outlier_removal(
    cloud: &PointCloud,
    k: usize,
    std_ratio: f32,
) -> Result<FilterResult> {
    if k == 0 {
        return Err(CloudError::invalid_parameter("k_neighbors must be >= 1"));
    }
    if !std_ratio.is_finite() || std_ratio < 0.0 {
        return Err(CloudError::invalid_parameter(
            "std_ratio must be >= 0 and finite",
        ));
    }

    let tree = KdTree::build(cloud);
    if tree.len() < k + 1 {
        return Err(CloudError::InsufficientData {
            required: k + 1,
            available: tree.len(),
        });
    }

    let mean_dists: Vec<Option<f64>> = (0..cloud.len())
        .map(|i| {
            if !cloud.is_finite(i) {
                return None;
            }
            let (_, dists) = tree.knn_others(cloud, i, k);
            if dists.is_empty() {
                return None;
            }
            let sum: f64 = dists.iter().map(|&d| d as f64).sum();
            Some(sum / dists.len() as f64)
        })
        .collect();

    let finite: Vec<f64> = mean_dists.iter().flatten().copied().collect();
    let Some((global_mean, global_std)) = mean_std(&finite) else {
        return Ok(FilterResult::from_mask(cloud, &vec![false; cloud.len()]));
    };

    let threshold = global_mean + std_ratio as f64 * global_std;
    debug!(
        k,
        std_ratio, global_mean, global_std, threshold, "statistical outlier threshold"
    );

    let mask: Vec<bool> = mean_dists
        .iter()
        .map(|d| d.is_some_and(|d| d <= threshold))
        .collect();

    Ok(FilterResult::from_mask(cloud, &mask))
}
