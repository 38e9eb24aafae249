use cloudclean_core::PointCloud;
use cloudclean_spatial::KdTree;
use std::collections::VecDeque;
use tracing::debug;

/// Per-point cluster assignment produced by [`dbscan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// `Some(label)` for clustered points, `None` for noise.
    pub labels: Vec<Option<usize>>,
    /// Point count of each cluster, indexed by label.
    pub sizes: Vec<usize>,
}

impl Clustering {
    pub fn num_clusters(&self) -> usize {
        self.sizes.len()
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    /// Label of the cluster with the most points. Ties go to the lowest
    /// label. `None` if every point is noise.
    pub fn largest(&self) -> Option<usize> {
        self.sizes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (label, &size)| match best {
                Some((_, best_size)) if best_size >= size => best,
                _ => Some((label, size)),
            })
            .map(|(label, _)| label)
    }
}

/// Density-based clustering (DBSCAN) of a point cloud.
///
/// A point is a core point when at least `min_samples` points, itself
/// included, lie within `eps` of it (boundary inclusive). Clusters grow
/// from core points through their neighbourhoods; points reachable from no
/// core point are noise. Labels are numbered in order of discovery when
/// scanning points by ascending index, and a border point reachable from
/// several clusters joins the first one that reaches it.
///
/// Non-finite points are always noise. Returns every point as noise when
/// `eps` is not a positive finite number or `min_samples == 0`.
pub fn dbscan(cloud: &PointCloud, eps: f32, min_samples: usize) -> Clustering {
    let n = cloud.len();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut sizes = Vec::new();

    if n == 0 || !(eps.is_finite() && eps > 0.0) || min_samples == 0 {
        return Clustering { labels, sizes };
    }

    let tree = KdTree::build(cloud);
    let is_core: Vec<bool> = (0..n)
        .map(|i| tree.radius_search(&cloud.point(i), eps).len() >= min_samples)
        .collect();

    let mut queued = vec![false; n];
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }

        let label = sizes.len();
        let mut size = 1;
        labels[seed] = Some(label);
        queued[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            for neighbor in tree.radius_search(&cloud.point(current), eps) {
                if labels[neighbor].is_none() {
                    labels[neighbor] = Some(label);
                    size += 1;
                }
                if is_core[neighbor] && !queued[neighbor] && labels[neighbor] == Some(label) {
                    queued[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        sizes.push(size);
    }

    let clustering = Clustering { labels, sizes };
    debug!(
        points = n,
        clusters = clustering.num_clusters(),
        noise = clustering.noise_count(),
        eps,
        min_samples,
        "dbscan finished"
    );
    clustering
}
