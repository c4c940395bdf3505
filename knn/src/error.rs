use std::{error::Error, fmt, io, path::PathBuf};

/// The result type used across the knn crate.
pub type Result<T> = std::result::Result<T, KnnErr>;

/// Errors produced while loading datasets or classifying against them.
#[derive(Debug)]
pub enum KnnErr {
    /// The metric name is empty or is not a prefix of any known metric.
    InvalidMetric(String),

    /// A feature vector or feature matrix does not have the expected shape.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// The feature dimension is zero or larger than any dataset can hold.
    InvalidDimension { dim: usize, max: usize },

    /// Classification needs at least one reference item.
    EmptyReference,

    /// A query range reaches past the end of the query set.
    OutOfRange {
        start: usize,
        end: usize,
        count: usize,
    },

    /// The dataset file ends before its item count header.
    TruncatedHeader,

    /// The dataset file ends in the middle of the `index`-th record.
    TruncatedRecord { index: usize, count: usize },

    /// The dataset file holds bytes after its last declared record.
    TrailingBytes { count: usize },

    /// The dataset file could not be opened.
    Open { path: PathBuf, source: io::Error },

    Io(io::Error),
}

impl fmt::Display for KnnErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnnErr::InvalidMetric(name) => write!(
                f,
                "unknown distance metric {name:?}, expected any initial substring of \"euclidean\" or \"cosine\""
            ),
            KnnErr::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "dimension mismatch for {what}: got {got}, expected {expected}"
            ),
            KnnErr::InvalidDimension { dim, max } => {
                write!(f, "feature dimension must be between 1 and {max}, got {dim}")
            }
            KnnErr::EmptyReference => write!(f, "the reference set has no items"),
            KnnErr::OutOfRange { start, end, count } => write!(
                f,
                "range {start}..{end} is out of bounds for a set of {count} items"
            ),
            KnnErr::TruncatedHeader => write!(f, "dataset ends before its item count"),
            KnnErr::TruncatedRecord { index, count } => {
                write!(f, "dataset ends inside record {index} of {count}")
            }
            KnnErr::TrailingBytes { count } => {
                write!(f, "dataset has trailing bytes after its {count} records")
            }
            KnnErr::Open { path, source } => {
                write!(f, "failed to open {}: {source}", path.display())
            }
            KnnErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for KnnErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KnnErr::Open { source, .. } => Some(source),
            KnnErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for KnnErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
