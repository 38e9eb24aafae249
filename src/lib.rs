#![forbid(unsafe_code)]

//! Outlier removal for PLY point clouds.
//!
//! Four entry points read a cloud from disk, run one filter and write the
//! retained points back out:
//!
//! | method | function | defaults |
//! |---|---|---|
//! | statistical-neighbour | [`remove_outliers_statistical`] | k_neighbors = 20, std_ratio = 2.0 |
//! | radius-density | [`remove_outliers_radius`] | min_points = 16, radius = 0.05 |
//! | centroid-distance | [`remove_outliers_centroid`] | threshold_multiplier = 3.0 |
//! | density-clustering | [`remove_outliers_clustering`] | eps = 0.02, min_samples = 10 |

pub mod config;
pub mod pipeline;

pub use cloudclean_core::{CloudError, Colors, FilterResult, Point, PointCloud, Result};
pub use cloudclean_filters::{
    CentroidDistanceFilter, DensityClusterFilter, FilterMethod, OutlierFilter,
    RadiusOutlierFilter, StatisticalOutlierFilter,
};
pub use cloudclean_io::{
    parse_ply, read_ply, write_ply, write_ply_binary, write_ply_with, PlyEncoding,
};
pub use config::{CleanConfig, ConfigError, OutputEncoding};
pub use pipeline::{
    batch_plan, filter_file, remove_outliers_centroid, remove_outliers_clustering,
    remove_outliers_radius, remove_outliers_statistical, run_batch, BatchOutput, FilterReport,
};
