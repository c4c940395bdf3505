pub mod classifier;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod metric;

pub use classifier::{Classifier, NeighborCandidate, classify};
pub use dataset::{Dataset, FeatureVector, Label, LabeledItem};
pub use error::{KnnErr, Result};
pub use loader::{DEFAULT_DIM, MAX_DIM, check_dim, load_dataset, read_dataset};
pub use metric::DistanceMetric;
