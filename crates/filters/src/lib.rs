#![forbid(unsafe_code)]

//! Outlier filters for point clouds.
//!
//! Every filter is available both as a free function taking its parameters
//! directly and as a configuration struct implementing [`OutlierFilter`],
//! so callers can pick a method at runtime through [`FilterMethod`].

pub mod centroid_distance;
pub mod density_cluster;
pub mod method;
pub mod radius_outlier;
pub mod statistical_outlier;
mod stats;

use cloudclean_core::{FilterResult, PointCloud, Result};

pub use centroid_distance::{centroid_distance_removal, CentroidDistanceFilter};
pub use density_cluster::{density_cluster_removal, DensityClusterFilter};
pub use method::FilterMethod;
pub use radius_outlier::{radius_outlier_removal, RadiusOutlierFilter};
pub use statistical_outlier::{statistical_outlier_removal, StatisticalOutlierFilter};

/// A strategy deciding which points of a cloud to keep.
///
/// Implementations never mutate the input; the returned [`FilterResult`]
/// holds a filtered copy whose points keep their original relative order.
pub trait OutlierFilter {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult>;
}

impl<F: OutlierFilter + ?Sized> OutlierFilter for &F {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        (**self).apply(cloud)
    }
}

impl<F: OutlierFilter + ?Sized> OutlierFilter for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        (**self).apply(cloud)
    }
}
