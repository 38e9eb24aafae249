use crate::OutlierFilter;
use cloudclean_core::{CloudError, FilterResult, PointCloud, Result};
use cloudclean_segmentation::dbscan;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Keep only the largest DBSCAN cluster ("main object").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityClusterFilter {
    pub eps: f32,
    pub min_samples: usize,
}

impl Default for DensityClusterFilter {
    fn default() -> Self {
        Self {
            eps: 0.02,
            min_samples: 10,
        }
    }
}

impl DensityClusterFilter {
    /// Wider neighbourhood for sparse scans with scattered outliers.
    pub fn coarse() -> Self {
        Self {
            eps: 0.05,
            min_samples: 15,
        }
    }
}

impl OutlierFilter for DensityClusterFilter {
    fn name(&self) -> &'static str {
        "clustering"
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        density_cluster_removal(cloud, self.eps, self.min_samples)
    }
}

/// Cluster the cloud with DBSCAN and keep the members of the largest
/// cluster. Noise and every smaller cluster are discarded; equal-sized
/// clusters resolve to the one discovered first.
///
/// When no cluster forms, the fallback keeps all non-noise points, which is
/// nothing: the result is empty and a warning is logged.
pub fn density_cluster_removal(
    cloud: &PointCloud,
    eps: f32,
    min_samples: usize,
) -> Result<FilterResult> {
    if !eps.is_finite() || eps <= 0.0 {
        return Err(CloudError::invalid_parameter("eps must be > 0 and finite"));
    }
    if min_samples == 0 {
        return Err(CloudError::invalid_parameter("min_samples must be >= 1"));
    }

    let clustering = dbscan(cloud, eps, min_samples);

    let mask: Vec<bool> = match clustering.largest() {
        Some(main) => {
            debug!(
                label = main,
                size = clustering.sizes[main],
                clusters = clustering.num_clusters(),
                "keeping largest cluster"
            );
            clustering.labels.iter().map(|l| *l == Some(main)).collect()
        }
        None => {
            if !cloud.is_empty() {
                warn!(
                    points = cloud.len(),
                    eps, min_samples, "no cluster found, every point is noise"
                );
            }
            clustering.labels.iter().map(Option::is_some).collect()
        }
    };

    Ok(FilterResult::from_mask(cloud, &mask))
}
