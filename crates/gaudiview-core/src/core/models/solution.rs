/// One candidate result: a unique key plus one value per objective.
///
/// The cluster id lives beside the objective values rather than inside them, so the value
/// vector always lines up with the objective schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub key: String,
    pub values: Vec<f64>,
    pub cluster: Option<u32>,
}

impl Solution {
    pub fn new(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            key: key.into(),
            values,
            cluster: None,
        }
    }

    pub fn with_cluster(mut self, cluster: u32) -> Self {
        self.cluster = Some(cluster);
        self
    }

    #[inline]
    pub fn value(&self, objective_index: usize) -> Option<f64> {
        self.values.get(objective_index).copied()
    }
}
