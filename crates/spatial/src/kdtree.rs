use cloudclean_core::{is_finite_position, PointCloud};
use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use std::num::NonZero;
use tracing::{debug, warn};

/// A KdTree for neighbour queries on 3D point clouds.
///
/// Built on kiddo v5's `ImmutableKdTree`. Only points with finite
/// coordinates are inserted; every index the tree returns refers to the
/// position of the point in the source `PointCloud`, so callers never see
/// the internal numbering.
#[derive(Debug, Clone)]
pub struct KdTree {
    tree: ImmutableKdTree<f32, u32, 3, 32>,
    // tree item -> cloud index
    source: Vec<usize>,
    cloud_len: usize,
}

impl KdTree {
    /// Build a KdTree from a PointCloud, skipping non-finite points.
    pub fn build(cloud: &PointCloud) -> Self {
        let mut points: Vec<[f32; 3]> = Vec::with_capacity(cloud.len());
        let mut source = Vec::with_capacity(cloud.len());
        for (i, p) in cloud.iter_points().enumerate() {
            if is_finite_position(&p) {
                points.push(p);
                source.push(i);
            }
        }

        if points.len() < cloud.len() {
            warn!(
                skipped = cloud.len() - points.len(),
                "non-finite points left out of kd-tree"
            );
        }

        let tree = ImmutableKdTree::new_from_slice(&points);
        debug!(points = points.len(), "built kd-tree");

        Self {
            tree,
            source,
            cloud_len: cloud.len(),
        }
    }

    /// Number of points indexed by the tree (finite points only).
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Number of points in the cloud the tree was built from.
    pub fn cloud_len(&self) -> usize {
        self.cloud_len
    }

    /// Find the `k` nearest neighbours to `query`.
    ///
    /// Returns `(indices, distances)` where distances are **Euclidean**
    /// (not squared), sorted in ascending order by distance.
    ///
    /// Edge cases:
    /// - Returns empty if `k == 0`, the tree is empty, or query is non-finite.
    /// - If `k > len()`, returns all indexed points.
    pub fn knn(&self, query: &[f32; 3], k: usize) -> (Vec<usize>, Vec<f32>) {
        let Some(nz_k) = NonZero::new(k) else {
            return (Vec::new(), Vec::new());
        };
        if self.is_empty() || !is_finite_position(query) {
            return (Vec::new(), Vec::new());
        }

        let results = self.tree.nearest_n::<SquaredEuclidean>(query, nz_k);

        let mut indices = Vec::with_capacity(results.len());
        let mut distances = Vec::with_capacity(results.len());
        for nn in results {
            indices.push(self.source[nn.item as usize]);
            distances.push(nn.distance.sqrt());
        }

        (indices, distances)
    }

    /// Find the `k` nearest neighbours of the cloud point `index`, not
    /// counting the point itself.
    ///
    /// Duplicates of the point at the same position are distinct
    /// neighbours at distance zero.
    pub fn knn_others(
        &self,
        cloud: &PointCloud,
        index: usize,
        k: usize,
    ) -> (Vec<usize>, Vec<f32>) {
        let (indices, distances) = self.knn(&cloud.point(index), k + 1);

        let mut out_idx = Vec::with_capacity(k);
        let mut out_dist = Vec::with_capacity(k);
        for (i, d) in indices.into_iter().zip(distances) {
            if i == index || out_idx.len() == k {
                continue;
            }
            out_idx.push(i);
            out_dist.push(d);
        }

        (out_idx, out_dist)
    }

    /// Find all points within `radius` (Euclidean distance) of `query`.
    ///
    /// Returns indices of points where `euclidean_dist <= radius`, sorted
    /// ascending.
    ///
    /// Edge cases:
    /// - Returns empty if radius <= 0, the tree is empty, radius is
    ///   non-finite, or query contains NaN.
    pub fn radius_search(&self, query: &[f32; 3], radius: f32) -> Vec<usize> {
        if self.is_empty()
            || radius <= 0.0
            || !radius.is_finite()
            || !is_finite_position(query)
        {
            return Vec::new();
        }

        let radius_sq = radius * radius;

        // kiddo's `within_unsorted` uses strict `<`. To include points
        // exactly on the boundary (dist == radius), we query with a tiny
        // epsilon added, then post-filter with `<=`.
        let query_radius_sq = radius_sq + f32::EPSILON * radius_sq.max(1.0);

        let results = self
            .tree
            .within_unsorted::<SquaredEuclidean>(query, query_radius_sq);

        let mut indices: Vec<usize> = results
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| self.source[nn.item as usize])
            .collect();

        indices.sort_unstable();

        indices
    }

    /// Count points other than `index` within `radius` of the cloud point
    /// `index` (boundary inclusive).
    pub fn count_others_within(&self, cloud: &PointCloud, index: usize, radius: f32) -> usize {
        self.radius_search(&cloud.point(index), radius)
            .into_iter()
            .filter(|&j| j != index)
            .count()
    }
}
