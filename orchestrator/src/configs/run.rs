use std::num::NonZeroUsize;

use knn::{Classifier, DistanceMetric};

use super::Isolation;

/// Everything a `Session` needs besides the datasets.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub k: NonZeroUsize,
    pub metric: DistanceMetric,
    pub workers: NonZeroUsize,
    pub isolation: Isolation,
}

impl RunConfig {
    /// The classifier every worker of the run uses.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.k, self.metric)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            k: NonZeroUsize::MIN,
            metric: DistanceMetric::default(),
            workers: NonZeroUsize::MIN,
            isolation: Isolation::default(),
        }
    }
}
