use std::{error::Error, fmt, io};

use comms::Partition;
use knn::KnnErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    Knn(KnnErr),
    PartitionOutOfRange {
        partition: Partition,
        count: usize,
    },
    Panicked(String),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::Knn(e) => write!(f, "classification failed: {e}"),
            WorkerErr::PartitionOutOfRange { partition, count } => write!(
                f,
                "partition {}..{} is out of bounds for a test set of {count} items",
                partition.start,
                partition.end()
            ),
            WorkerErr::Panicked(msg) => write!(f, "classification task panicked: {msg}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) => Some(e),
            WorkerErr::Knn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<KnnErr> for WorkerErr {
    fn from(value: KnnErr) -> Self {
        Self::Knn(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
