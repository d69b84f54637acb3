/// Cluster index for each dataset point, in dataset order.
///
/// Always produced by the backend (possibly after normalization); the
/// client never derives membership from distances itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignments(Vec<usize>);

impl Assignments {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Every point in cluster 0. Used when the backend reports no membership.
    pub fn default_bucket(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// True when the assignment array lines up with a dataset of `len` points.
    pub fn matches_len(&self, len: usize) -> bool {
        self.0.len() == len
    }
}
