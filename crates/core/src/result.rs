use crate::PointCloud;

/// Outcome of running an outlier filter over a cloud.
///
/// `cloud` holds the retained points in their original relative order and
/// `kept` their indices into the input cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub cloud: PointCloud,
    pub kept: Vec<usize>,
    pub removed: usize,
}

impl FilterResult {
    /// Build a result by selecting `kept` (ascending indices) from `input`.
    pub fn from_kept(input: &PointCloud, kept: Vec<usize>) -> Self {
        debug_assert!(kept.windows(2).all(|w| w[0] < w[1]));
        let cloud = input.select(&kept);
        let removed = input.len() - kept.len();
        Self {
            cloud,
            kept,
            removed,
        }
    }

    /// Build a result from a per-point keep mask.
    pub fn from_mask(input: &PointCloud, mask: &[bool]) -> Self {
        let kept = input.mask_indices(mask);
        Self::from_kept(input, kept)
    }

    pub fn empty() -> Self {
        Self {
            cloud: PointCloud::new(),
            kept: Vec::new(),
            removed: 0,
        }
    }

    pub fn retained(&self) -> usize {
        self.cloud.len()
    }

    pub fn original(&self) -> usize {
        self.retained() + self.removed
    }

    /// Indices into the input cloud of the points that were discarded.
    pub fn removed_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.removed);
        let mut kept = self.kept.iter().peekable();
        for i in 0..self.original() {
            if kept.peek() == Some(&&i) {
                kept.next();
            } else {
                out.push(i);
            }
        }
        out
    }
}
