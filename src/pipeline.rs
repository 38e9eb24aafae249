//! File-level entry points: load a PLY, run one filter, write the result
//! and report the counts.

use cloudclean_core::{CloudError, FilterResult, Result};
use cloudclean_filters::{
    CentroidDistanceFilter, DensityClusterFilter, FilterMethod, OutlierFilter,
    RadiusOutlierFilter, StatisticalOutlierFilter,
};
use cloudclean_io::{read_ply, write_ply_with, PlyEncoding};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Point counts for one filter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub method: &'static str,
    pub original: usize,
    pub retained: usize,
    pub removed: usize,
}

impl FilterReport {
    pub fn new(method: &'static str, result: &FilterResult) -> Self {
        Self {
            method,
            original: result.original(),
            retained: result.retained(),
            removed: result.removed,
        }
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original points: {}", self.original)?;
        writeln!(f, "Filtered points: {}", self.retained)?;
        write!(f, "Removed {} outliers", self.removed)
    }
}

/// Read `input`, apply `filter` and write the retained points to `output`.
pub fn filter_file<F: OutlierFilter + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    filter: &F,
    encoding: PlyEncoding,
) -> Result<FilterReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let cloud = read_ply(input)?;
    let result = filter.apply(&cloud)?;
    write_ply_with(output, &result.cloud, encoding)?;

    let report = FilterReport::new(filter.name(), &result);
    info!(
        method = report.method,
        input = %input.display(),
        output = %output.display(),
        original = report.original,
        retained = report.retained,
        removed = report.removed,
        "filtered point cloud"
    );
    Ok(report)
}

/// Statistical-neighbour removal from `input` to `output`.
pub fn remove_outliers_statistical(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    k_neighbors: usize,
    std_ratio: f32,
) -> Result<FilterReport> {
    let filter = StatisticalOutlierFilter {
        k_neighbors,
        std_ratio,
    };
    filter_file(input, output, &filter, PlyEncoding::default())
}

/// Radius-density removal from `input` to `output`.
pub fn remove_outliers_radius(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    min_points: usize,
    radius: f32,
) -> Result<FilterReport> {
    let filter = RadiusOutlierFilter { min_points, radius };
    filter_file(input, output, &filter, PlyEncoding::default())
}

/// Centroid-distance removal from `input` to `output`.
pub fn remove_outliers_centroid(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    threshold_multiplier: f32,
) -> Result<FilterReport> {
    let filter = CentroidDistanceFilter {
        threshold_multiplier,
    };
    filter_file(input, output, &filter, PlyEncoding::default())
}

/// Keep the largest DBSCAN cluster of `input`, writing it to `output`.
pub fn remove_outliers_clustering(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    eps: f32,
    min_samples: usize,
) -> Result<FilterReport> {
    let filter = DensityClusterFilter { eps, min_samples };
    filter_file(input, output, &filter, PlyEncoding::default())
}

/// One output of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub path: PathBuf,
    pub report: FilterReport,
}

/// The three passes of a batch run with their output file suffixes.
pub fn batch_plan() -> [(&'static str, FilterMethod); 3] {
    [
        ("filtered", StatisticalOutlierFilter::default().into()),
        ("manual", CentroidDistanceFilter::strict().into()),
        ("clustering", DensityClusterFilter::coarse().into()),
    ]
}

/// Run every pass of [`batch_plan`] over `input`, writing
/// `<stem>_<suffix>.ply` into `out_dir` (the input's directory when `None`).
///
/// The input is read once. The first failing pass aborts the batch.
pub fn run_batch(
    input: impl AsRef<Path>,
    out_dir: Option<&Path>,
    encoding: PlyEncoding,
) -> Result<Vec<BatchOutput>> {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            CloudError::invalid_parameter(format!(
                "input path has no file name: {}",
                input.display()
            ))
        })?;
    let dir = match out_dir {
        Some(d) => d.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let cloud = read_ply(input)?;
    let mut outputs = Vec::new();
    for (suffix, method) in batch_plan() {
        let path = dir.join(format!("{stem}_{suffix}.ply"));
        let result = method.apply(&cloud)?;
        write_ply_with(&path, &result.cloud, encoding)?;

        let report = FilterReport::new(method.name(), &result);
        info!(
            method = report.method,
            output = %path.display(),
            retained = report.retained,
            removed = report.removed,
            "batch pass done"
        );
        outputs.push(BatchOutput { path, report });
    }
    Ok(outputs)
}
