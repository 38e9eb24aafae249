//! Differential correctness tests for the k-d tree backed DBSCAN.
//!
//! Compares `dbscan` against a brute-force reference so that neighbour
//! search shortcuts cannot silently change labels.

use cloudclean_core::PointCloud;
use cloudclean_segmentation::{dbscan, Clustering};
use rand::prelude::*;
use std::collections::VecDeque;

// ────────────────── Brute-force reference ──────────────────

fn neighbours(cloud: &PointCloud, i: usize, eps: f32) -> Vec<usize> {
    let p = cloud.point(i);
    if !p.iter().all(|v| v.is_finite()) {
        return Vec::new();
    }
    let eps_sq = eps * eps;
    (0..cloud.len())
        .filter(|&j| {
            let q = cloud.point(j);
            let dx = p[0] - q[0];
            let dy = p[1] - q[1];
            let dz = p[2] - q[2];
            dx * dx + dy * dy + dz * dz <= eps_sq
        })
        .collect()
}

/// O(n^2) DBSCAN: clusters numbered by lowest core index, border points
/// owned by the first cluster that reaches them.
fn brute_force_dbscan(cloud: &PointCloud, eps: f32, min_samples: usize) -> Vec<Option<usize>> {
    let n = cloud.len();
    let hood: Vec<Vec<usize>> = (0..n).map(|i| neighbours(cloud, i, eps)).collect();
    let core: Vec<bool> = hood.iter().map(|h| h.len() >= min_samples).collect();

    let mut labels = vec![None; n];
    let mut next = 0;
    for seed in 0..n {
        if labels[seed].is_some() || !core[seed] {
            continue;
        }
        labels[seed] = Some(next);
        let mut stack = VecDeque::from([seed]);
        let mut expanded = vec![false; n];
        expanded[seed] = true;
        while let Some(i) = stack.pop_back() {
            for &j in &hood[i] {
                if labels[j].is_none() {
                    labels[j] = Some(next);
                }
                if core[j] && !expanded[j] && labels[j] == Some(next) {
                    expanded[j] = true;
                    stack.push_back(j);
                }
            }
        }
        next += 1;
    }
    labels
}

fn random_cloud(rng: &mut StdRng, n: usize, extent: f32) -> PointCloud {
    let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-extent..extent)).collect();
    let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-extent..extent)).collect();
    let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-extent..extent)).collect();
    PointCloud::from_xyz(x, y, z)
}

fn check_sizes(c: &Clustering) {
    for (label, &size) in c.sizes.iter().enumerate() {
        let count = c.labels.iter().filter(|l| **l == Some(label)).count();
        assert_eq!(count, size, "size of cluster {label}");
    }
}

// ────────────────── 1. Differential correctness ──────────────────

#[test]
fn differential_random_small_clouds() {
    let mut rng = StdRng::seed_from_u64(42);

    for trial in 0..200 {
        let n = rng.gen_range(2..80);
        let eps = rng.gen_range(1.0f32..8.0);
        let min_samples = rng.gen_range(1..6);
        let cloud = random_cloud(&mut rng, n, 20.0);

        let got = dbscan(&cloud, eps, min_samples);
        let expected = brute_force_dbscan(&cloud, eps, min_samples);
        assert_eq!(
            got.labels, expected,
            "trial {trial}: n={n}, eps={eps:.2}, min_samples={min_samples}"
        );
        check_sizes(&got);
    }
}

#[test]
fn differential_medium_clouds() {
    let mut rng = StdRng::seed_from_u64(99);

    for trial in 0..10 {
        let n = rng.gen_range(500..1500);
        let eps = rng.gen_range(2.0f32..8.0);
        let min_samples = rng.gen_range(2..12);
        let cloud = random_cloud(&mut rng, n, 50.0);

        let got = dbscan(&cloud, eps, min_samples);
        let expected = brute_force_dbscan(&cloud, eps, min_samples);
        assert_eq!(
            got.labels, expected,
            "trial {trial}: n={n}, eps={eps:.2}, min_samples={min_samples}"
        );
        check_sizes(&got);
    }
}

// ────────────────── 2. Boundary tests ──────────────────

#[test]
fn neighbour_exactly_at_eps_counts() {
    let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2]);
    let c = dbscan(&cloud, 1.0, 2);
    assert_eq!(c.labels, vec![Some(0), Some(0)]);
}

#[test]
fn neighbour_just_beyond_eps_is_noise() {
    let cloud = PointCloud::from_xyz(vec![0.0, 1.0 + 1e-4], vec![0.0; 2], vec![0.0; 2]);
    let c = dbscan(&cloud, 1.0, 2);
    assert_eq!(c.labels, vec![None, None]);
}

#[test]
fn min_samples_one_makes_every_point_core() {
    let cloud = PointCloud::from_xyz(vec![0.0, 10.0, 20.0], vec![0.0; 3], vec![0.0; 3]);
    let c = dbscan(&cloud, 0.5, 1);
    assert_eq!(c.labels, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(c.sizes, vec![1, 1, 1]);
}

#[test]
fn border_point_joins_first_cluster() {
    // Two dense groups with a single border point between them, reachable
    // from both. The group at lower indices is discovered first.
    let mut x = vec![0.0, 0.1, 0.2, 0.3];
    x.extend([2.0, 2.1, 2.2, 2.3]);
    x.push(1.15);
    let n = x.len();
    let cloud = PointCloud::from_xyz(x, vec![0.0; n], vec![0.0; n]);
    let c = dbscan(&cloud, 0.9, 4);
    assert_eq!(c.num_clusters(), 2);
    assert_eq!(c.labels[8], Some(0));
    assert_eq!(c.sizes, vec![5, 4]);
    assert_eq!(brute_force_dbscan(&cloud, 0.9, 4), c.labels);
}

#[test]
fn very_large_coordinates() {
    let base = 1e5_f32;
    let cloud = PointCloud::from_xyz(
        vec![base, base + 0.1, base + 0.2, base + 100.0],
        vec![base; 4],
        vec![0.0; 4],
    );
    let c = dbscan(&cloud, 0.5, 2);
    assert_eq!(c.labels, vec![Some(0), Some(0), Some(0), None]);
}

#[test]
fn non_finite_points_are_noise() {
    let cloud = PointCloud::from_xyz(
        vec![0.0, 0.1, f32::NAN, 0.2],
        vec![0.0, 0.0, 0.0, f32::INFINITY],
        vec![0.0; 4],
    );
    let c = dbscan(&cloud, 0.5, 2);
    assert_eq!(c.labels, vec![Some(0), Some(0), None, None]);
    assert_eq!(brute_force_dbscan(&cloud, 0.5, 2), c.labels);
}

#[test]
fn duplicate_points_form_a_cluster() {
    let cloud = PointCloud::from_xyz(vec![1.0; 5], vec![1.0; 5], vec![1.0; 5]);
    let c = dbscan(&cloud, 0.01, 5);
    assert_eq!(c.sizes, vec![5]);
    assert_eq!(c.largest(), Some(0));
}
