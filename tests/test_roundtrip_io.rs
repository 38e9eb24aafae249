use cloudclean_core::{Colors, PointCloud};
use cloudclean_io::{read_ply, write_ply, write_ply_binary, write_ply_with, PlyEncoding};
use rand::prelude::*;

fn colored_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let cloud = PointCloud::from_xyz(
        (0..n).map(|_| rng.gen_range(-10.0f32..10.0)).collect(),
        (0..n).map(|_| rng.gen_range(-10.0f32..10.0)).collect(),
        (0..n).map(|_| rng.gen_range(-10.0f32..10.0)).collect(),
    );
    cloud
        .with_colors(Colors {
            r: (0..n).map(|_| rng.gen()).collect(),
            g: (0..n).map(|_| rng.gen()).collect(),
            b: (0..n).map(|_| rng.gen()).collect(),
        })
        .unwrap()
}

fn assert_same(loaded: &PointCloud, cloud: &PointCloud) {
    assert_eq!(loaded.len(), cloud.len());
    for i in 0..cloud.len() {
        assert!((loaded.x[i] - cloud.x[i]).abs() < 1e-6);
        assert!((loaded.y[i] - cloud.y[i]).abs() < 1e-6);
        assert!((loaded.z[i] - cloud.z[i]).abs() < 1e-6);
        assert_eq!(loaded.color(i), cloud.color(i));
    }
}

#[test]
fn ply_ascii_write_then_read_roundtrip() {
    let cloud = colored_cloud(500, 1);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.ply");

    write_ply(&path, &cloud).unwrap();
    assert_same(&read_ply(&path).unwrap(), &cloud);
}

#[test]
fn ply_binary_write_then_read_roundtrip() {
    let cloud = colored_cloud(500, 2);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip_bin.ply");

    write_ply_binary(&path, &cloud).unwrap();
    let loaded = read_ply(&path).unwrap();
    assert_eq!(loaded, cloud);
}

#[test]
fn every_encoding_reads_back_identically() {
    let cloud = colored_cloud(64, 3);
    let dir = tempfile::tempdir().unwrap();
    for encoding in [
        PlyEncoding::Ascii,
        PlyEncoding::BinaryLittleEndian,
        PlyEncoding::BinaryBigEndian,
    ] {
        let path = dir.path().join(format!("{}.ply", encoding.keyword()));
        write_ply_with(&path, &cloud, encoding).unwrap();
        assert_same(&read_ply(&path).unwrap(), &cloud);
    }
}

#[test]
fn ply_without_colors_stays_uncolored() {
    let cloud = PointCloud::from_xyz(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.ply");

    write_ply_binary(&path, &cloud).unwrap();
    let loaded = read_ply(&path).unwrap();
    assert!(!loaded.has_colors());
    assert_same(&loaded, &cloud);
}

#[test]
fn ply_empty_cloud_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.ply");

    write_ply(&path, &PointCloud::new()).unwrap();
    assert_eq!(read_ply(&path).unwrap().len(), 0);
}
