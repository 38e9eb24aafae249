use crate::{
    CentroidDistanceFilter, DensityClusterFilter, OutlierFilter, RadiusOutlierFilter,
    StatisticalOutlierFilter,
};
use cloudclean_core::{FilterResult, PointCloud, Result};
use serde::{Deserialize, Serialize};

/// One of the four filters, selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FilterMethod {
    Statistical(StatisticalOutlierFilter),
    Radius(RadiusOutlierFilter),
    Centroid(CentroidDistanceFilter),
    Clustering(DensityClusterFilter),
}

impl FilterMethod {
    fn inner(&self) -> &dyn OutlierFilter {
        match self {
            FilterMethod::Statistical(f) => f,
            FilterMethod::Radius(f) => f,
            FilterMethod::Centroid(f) => f,
            FilterMethod::Clustering(f) => f,
        }
    }
}

impl OutlierFilter for FilterMethod {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn apply(&self, cloud: &PointCloud) -> Result<FilterResult> {
        self.inner().apply(cloud)
    }
}

impl From<StatisticalOutlierFilter> for FilterMethod {
    fn from(f: StatisticalOutlierFilter) -> Self {
        FilterMethod::Statistical(f)
    }
}

impl From<RadiusOutlierFilter> for FilterMethod {
    fn from(f: RadiusOutlierFilter) -> Self {
        FilterMethod::Radius(f)
    }
}

impl From<CentroidDistanceFilter> for FilterMethod {
    fn from(f: CentroidDistanceFilter) -> Self {
        FilterMethod::Centroid(f)
    }
}

impl From<DensityClusterFilter> for FilterMethod {
    fn from(f: DensityClusterFilter) -> Self {
        FilterMethod::Clustering(f)
    }
}
