use crate::stats::mean_std;
use crate::OutlierFilter;
use cloudclean_core::{CloudError, FilterResult, PointCloud, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance-from-centroid thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentroidDistanceFilter {
    pub threshold_multiplier: f32,
}

impl Default for CentroidDistanceFilter {
    fn default() -> Self {
        Self {
            threshold_multiplier: 3.0,
        }
    }
}

impl CentroidDistanceFilter {
    /// Tighter cut at two standard deviations.
    pub fn strict() -> Self {
        Self {
            threshold_multiplier: 2.0,
        }
    }
}

impl OutlierFilter for CentroidDistanceFilter {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        centroid_distance_removal(cloud, self.threshold_multiplier)
    }
}

fn to_vector(p: [f32; 3]) -> Vector3<f64> {
    Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Remove points far from the cloud's centroid.
///
/// The centroid is the mean of all finite positions. A point is discarded
/// when its distance to the centroid exceeds
/// `mean + threshold_multiplier * stddev` of those distances. Sums are
/// accumulated in `f64`. Non-finite points are discarded and do not
/// contribute to the statistics.
pub fn centroid_distance_removal(
    cloud: &PointCloud,
    threshold_multiplier: f32,
) -> Result<FilterResult> {
    if !threshold_multiplier.is_finite() || threshold_multiplier < 0.0 {
        return Err(CloudError::invalid_parameter(
            "threshold_multiplier must be >= 0 and finite",
        ));
    }

    let finite: Vec<usize> = (0..cloud.len())
        .filter(|&i| cloud.is_finite(i))
        .collect();
    if finite.is_empty() {
        return Ok(FilterResult::from_kept(cloud, Vec::new()));
    }

    let centroid = finite
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, &i| acc + to_vector(cloud.point(i)))
        / finite.len() as f64;

    let distances: Vec<f64> = finite
        .iter()
        .map(|&i| (to_vector(cloud.point(i)) - centroid).norm())
        .collect();

    let Some((mean, std)) = mean_std(&distances) else {
        return Ok(FilterResult::from_kept(cloud, Vec::new()));
    };
    let threshold = mean + threshold_multiplier as f64 * std;
    debug!(
        centroid = ?[centroid.x, centroid.y, centroid.z],
        mean, std, threshold, "centroid distance threshold"
    );

    let keep: Vec<usize> = finite
        .iter()
        .zip(&distances)
        .filter(|(_, &d)| d <= threshold)
        .map(|(&i, _)| i)
        .collect();

    Ok(FilterResult::from_kept(cloud, keep))
}
