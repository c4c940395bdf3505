pub mod configs;
pub mod error;
mod handle;
pub mod planner;
mod session;

use std::{path::Path, sync::Arc};

use knn::Dataset;

pub use error::OrchestratorError;
pub use session::{RunSummary, Session};

use crate::configs::RunConfig;

/// Loads a dataset of `dim`-dimensional items from `path`.
///
/// # Errors
/// Returns `OrchestratorError::DatasetLoad` if the file is missing or malformed.
pub fn load_dataset<P: AsRef<Path>>(path: P, dim: usize) -> Result<Dataset, OrchestratorError> {
    let path = path.as_ref();
    knn::load_dataset(path, dim).map_err(|source| OrchestratorError::DatasetLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Classifies `queries` against `reference` with the workers described by `config`.
///
/// # Errors
/// Returns an `OrchestratorError` if the datasets are incompatible or any worker fails.
pub async fn classify(
    config: RunConfig,
    reference: Arc<Dataset>,
    queries: Arc<Dataset>,
) -> Result<RunSummary, OrchestratorError> {
    log::info!(
        "classifying {} item(s) against {} with {} worker(s)",
        queries.count(),
        reference.count(),
        config.workers
    );
    Session::new(config, reference, queries)?.run().await
}
