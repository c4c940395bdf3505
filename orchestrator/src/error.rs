use std::{fmt, io, path::PathBuf};

use knn::KnnErr;

/// All errors that can end a classification run.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before any worker is created.
    InvalidConfig(String),
    /// A dataset file could not be loaded.
    DatasetLoad { path: PathBuf, source: KnnErr },
    /// A worker could not be started.
    Spawn {
        worker_id: usize,
        source: io::Error,
    },
    /// The channel to a worker failed while the worker itself exited cleanly.
    ChannelFault {
        worker_id: usize,
        source: io::Error,
    },
    /// A worker ended without delivering its result.
    WorkerAbnormalTermination { worker_id: usize, reason: String },
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::DatasetLoad { path, source } => {
                write!(f, "the data set in {} could not be loaded: {source}", path.display())
            }
            Self::Spawn { worker_id, source } => {
                write!(f, "failed to start worker {worker_id}: {source}")
            }
            Self::ChannelFault { worker_id, source } => {
                write!(f, "channel to worker {worker_id} failed: {source}")
            }
            Self::WorkerAbnormalTermination { worker_id, reason } => {
                write!(f, "worker {worker_id} terminated abnormally: {reason}")
            }
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetLoad { source, .. } => Some(source),
            Self::Spawn { source, .. } => Some(source),
            Self::ChannelFault { source, .. } => Some(source),
            _ => None,
        }
    }
}
