use crate::{is_finite_position, CloudError, Point, Result};

/// An ordered point cloud stored as structure-of-arrays.
///
/// Color presence is uniform: either every point carries an RGB triple or
/// none does. When `colors` is `Some`, each channel has `len()` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    fn is_consistent(&self) -> bool {
        self.r.len() == self.g.len() && self.r.len() == self.b.len()
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    /// Attach per-point colors, checking that every channel matches the
    /// number of positions.
    pub fn with_colors(mut self, colors: Colors) -> Result<Self> {
        if !colors.is_consistent() || colors.len() != self.len() {
            return Err(CloudError::format(format!(
                "color count ({}, {}, {}) does not match point count {}",
                colors.r.len(),
                colors.g.len(),
                colors.b.len(),
                self.len()
            )));
        }
        self.colors = Some(colors);
        Ok(self)
    }

    /// Build a cloud from individual points.
    ///
    /// Fails if some points carry a color and others do not.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let has_colors = points.first().is_some_and(|p| p.color.is_some());

        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());
        let mut colors = has_colors.then(|| Colors {
            r: Vec::with_capacity(points.len()),
            g: Vec::with_capacity(points.len()),
            b: Vec::with_capacity(points.len()),
        });

        for (i, p) in points.iter().enumerate() {
            x.push(p.position[0]);
            y.push(p.position[1]);
            z.push(p.position[2]);

            match (colors.as_mut(), p.color) {
                (Some(c), Some([r, g, b])) => {
                    c.r.push(r);
                    c.g.push(g);
                    c.b.push(b);
                }
                (None, None) => {}
                _ => {
                    return Err(CloudError::format(format!(
                        "point {} disagrees with the cloud on color presence",
                        i
                    )));
                }
            }
        }

        Ok(Self { x, y, z, colors })
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Whether point `i` has finite coordinates.
    pub fn is_finite(&self, i: usize) -> bool {
        is_finite_position(&self.point(i))
    }

    pub fn color(&self, i: usize) -> Option<[u8; 3]> {
        self.colors.as_ref().map(|c| [c.r[i], c.g[i], c.b[i]])
    }

    pub fn get(&self, i: usize) -> Point {
        Point {
            position: self.point(i),
            color: self.color(i),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self { x, y, z, colors }
    }

    /// Indices of the `true` entries of a keep-mask, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `mask.len() != self.len()`.
    pub fn mask_indices(&self, mask: &[bool]) -> Vec<usize> {
        assert_eq!(mask.len(), self.len(), "mask length must match cloud");
        mask.iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect()
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Colors, PointCloud};
    use crate::{CloudError, Point};
    use proptest::prelude::*;

    fn colored_cloud() -> PointCloud {
        PointCloud::from_xyz(vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0], vec![6.0, 7.0, 8.0])
            .with_colors(Colors {
                r: vec![10, 20, 30],
                g: vec![40, 50, 60],
                b: vec![70, 80, 90],
            })
            .unwrap()
    }

    #[test]
    fn new_is_empty() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert!(!cloud.has_colors());
    }

    #[test]
    fn from_xyz_builds_cloud() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.0, 3.0, 5.0]);
        assert_eq!(cloud.point(1), [2.0, 4.0, 6.0]);
        assert_eq!(cloud.color(0), None);
    }

    #[test]
    fn with_colors_rejects_length_mismatch() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        let err = cloud
            .with_colors(Colors {
                r: vec![1],
                g: vec![2],
                b: vec![3],
            })
            .unwrap_err();
        assert!(matches!(err, CloudError::Format(_)));
    }

    #[test]
    fn with_colors_rejects_ragged_channels() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![3.0], vec![5.0]);
        let err = cloud
            .with_colors(Colors {
                r: vec![1],
                g: vec![2, 2],
                b: vec![3],
            })
            .unwrap_err();
        assert!(matches!(err, CloudError::Format(_)));
    }

    #[test]
    fn from_points_keeps_colors() {
        let pts = [
            Point::with_color(1.0, 2.0, 3.0, [1, 2, 3]),
            Point::with_color(4.0, 5.0, 6.0, [4, 5, 6]),
        ];
        let cloud = PointCloud::from_points(&pts).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.get(1), pts[1]);
        let back: Vec<Point> = cloud.iter().collect();
        assert_eq!(back, pts);
    }

    #[test]
    fn from_points_rejects_mixed_color_presence() {
        let pts = [
            Point::with_color(1.0, 2.0, 3.0, [1, 2, 3]),
            Point::new(4.0, 5.0, 6.0),
        ];
        assert!(matches!(
            PointCloud::from_points(&pts),
            Err(CloudError::Format(_))
        ));
    }

    #[test]
    fn from_points_empty() {
        let cloud = PointCloud::from_points(&[]).unwrap();
        assert!(cloud.is_empty());
        assert!(!cloud.has_colors());
    }

    #[test]
    fn is_finite_checks_every_axis() {
        let cloud = PointCloud::from_xyz(
            vec![1.0, f32::NAN, 0.0, 0.0],
            vec![0.0, 0.0, f32::INFINITY, 0.0],
            vec![0.0, 0.0, 0.0, f32::NEG_INFINITY],
        );
        assert!(cloud.is_finite(0));
        assert!(!cloud.is_finite(1));
        assert!(!cloud.is_finite(2));
        assert!(!cloud.is_finite(3));
    }

    #[test]
    fn select_subsets_points_and_colors() {
        let cloud = colored_cloud();
        let selected = cloud.select(&[2, 0]);
        assert_eq!(selected.x, vec![2.0, 0.0]);
        assert_eq!(selected.y, vec![5.0, 3.0]);
        assert_eq!(selected.z, vec![8.0, 6.0]);
        assert_eq!(selected.color(0), Some([30, 60, 90]));
        assert_eq!(selected.color(1), Some([10, 40, 70]));
    }

    #[test]
    fn mask_indices_preserves_order() {
        let cloud = colored_cloud();
        assert_eq!(cloud.mask_indices(&[true, false, true]), vec![0, 2]);
        assert!(cloud.mask_indices(&[false, false, false]).is_empty());
    }

    #[test]
    #[should_panic]
    fn mask_indices_panics_on_length_mismatch() {
        let cloud = colored_cloud();
        let _ = cloud.mask_indices(&[true]);
    }

    #[test]
    fn iter_points_yields_xyz_tuples() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        let pts: Vec<[f32; 3]> = cloud.iter_points().collect();
        assert_eq!(pts, vec![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]);
    }

    #[test]
    #[should_panic]
    fn from_xyz_panics_on_mismatch() {
        let _ = PointCloud::from_xyz(vec![1.0], vec![2.0, 3.0], vec![4.0]);
    }

    proptest! {
        #[test]
        fn select_never_changes_length_to_more_than_indices(
            data in prop::collection::vec((-10.0f32..10.0f32, -10.0f32..10.0f32, -10.0f32..10.0f32), 1..200),
            idxs in prop::collection::vec(0usize..200, 0..200)
        ) {
            let n = data.len();
            let cloud = PointCloud::from_xyz(
                data.iter().map(|p| p.0).collect(),
                data.iter().map(|p| p.1).collect(),
                data.iter().map(|p| p.2).collect(),
            );
            let valid: Vec<usize> = idxs.into_iter().filter(|i| *i < n).collect();
            let out = cloud.select(&valid);
            prop_assert_eq!(out.len(), valid.len());
        }

        #[test]
        fn mask_selection_keeps_exactly_true_entries(
            mask in prop::collection::vec(any::<bool>(), 0..300)
        ) {
            let n = mask.len();
            let cloud = PointCloud::from_xyz(
                (0..n).map(|i| i as f32).collect(),
                vec![0.0; n],
                vec![0.0; n],
            );
            let kept = cloud.select(&cloud.mask_indices(&mask));
            prop_assert_eq!(kept.len(), mask.iter().filter(|&&b| b).count());
            for w in kept.x.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
        }
    }
}
