use cloudclean::{
    CentroidDistanceFilter, DensityClusterFilter, FilterMethod, OutlierFilter, PointCloud,
    RadiusOutlierFilter, StatisticalOutlierFilter,
};

fn main() {
    // A 20x20 patch with 0.01 spacing plus a handful of stray points
    let mut x: Vec<f32> = (0..400).map(|i| (i % 20) as f32 * 0.01).collect();
    let mut y: Vec<f32> = (0..400).map(|i| (i / 20) as f32 * 0.01).collect();
    let mut z: Vec<f32> = (0..400).map(|i| ((i * 7) % 13) as f32 * 1e-4).collect();
    for (i, p) in [[1.5, 0.0, 0.2], [-0.8, 1.1, 0.0], [0.1, 0.1, 2.0]]
        .iter()
        .enumerate()
    {
        x.push(p[0]);
        y.push(p[1] + i as f32 * 0.3);
        z.push(p[2]);
    }
    let cloud = PointCloud::from_xyz(x, y, z);
    println!("Original cloud: {} points", cloud.len());

    let methods: [FilterMethod; 4] = [
        StatisticalOutlierFilter::default().into(),
        RadiusOutlierFilter::default().into(),
        CentroidDistanceFilter::default().into(),
        DensityClusterFilter::default().into(),
    ];

    for method in &methods {
        match method.apply(&cloud) {
            Ok(result) => println!(
                "{:>11}: kept {} points, removed {}",
                method.name(),
                result.retained(),
                result.removed
            ),
            Err(e) => println!("{:>11}: failed: {e}", method.name()),
        }
    }
}
