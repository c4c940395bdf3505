//! Reader for the binary image dataset format.
//!
//! ```text
//! u32 (little-endian)   item count N
//! N records of:
//!   u8                  label
//!   dim x u8            feature components
//! ```

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use ndarray::Array2;

use crate::{Dataset, KnnErr, Label, Result};

/// Feature dimension of the 28x28 grayscale images the format was made for.
pub const DEFAULT_DIM: usize = 28 * 28;

/// Largest feature dimension a record may declare.
pub const MAX_DIM: usize = 1 << 20;

/// Upper bound on the features reserved ahead of reading, the header is not trusted.
const MAX_PREALLOCATED_FEATURES: usize = 1 << 22;

/// Checks that `dim` is a usable feature dimension.
///
/// # Errors
/// Returns `KnnErr::InvalidDimension` if `dim` is zero or above [`MAX_DIM`].
pub fn check_dim(dim: usize) -> Result<usize> {
    if dim == 0 || dim > MAX_DIM {
        return Err(KnnErr::InvalidDimension { dim, max: MAX_DIM });
    }

    Ok(dim)
}

/// Loads the dataset stored at `path`, every record holding `dim` features.
///
/// # Errors
/// Returns a `KnnErr` if the file cannot be opened or is malformed.
pub fn load_dataset<P: AsRef<Path>>(path: P, dim: usize) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| KnnErr::Open {
        path: path.to_path_buf(),
        source,
    })?;

    read_dataset(BufReader::new(file), dim)
}

/// Reads a dataset of `dim`-dimensional records from `reader`.
///
/// The whole input must be consumed: a record cut short or bytes after the last
/// record are both errors.
///
/// # Errors
/// Returns `KnnErr::InvalidDimension` before reading anything if `dim` is unusable.
pub fn read_dataset<R: Read>(mut reader: R, dim: usize) -> Result<Dataset> {
    let dim = check_dim(dim)?;

    let mut header = [0; size_of::<u32>()];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => KnnErr::TruncatedHeader,
        _ => KnnErr::Io(e),
    })?;
    let count = u32::from_le_bytes(header) as usize;

    let reserved = count.min(MAX_PREALLOCATED_FEATURES / dim);
    let mut labels: Vec<Label> = Vec::with_capacity(reserved);
    let mut data: Vec<f32> = Vec::with_capacity(reserved * dim);
    let mut record = vec![0u8; dim + 1];

    for index in 0..count {
        reader.read_exact(&mut record).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => KnnErr::TruncatedRecord { index, count },
            _ => KnnErr::Io(e),
        })?;

        labels.push(Label::from(record[0]));
        data.extend(record[1..].iter().map(|&px| f32::from(px)));
    }

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(KnnErr::TrailingBytes { count });
    }

    let features = Array2::from_shape_vec((count, dim), data).map_err(|_| {
        KnnErr::DimensionMismatch {
            what: "feature matrix",
            got: count,
            expected: dim,
        }
    })?;

    Dataset::new(features, labels)
}
