use ndarray::{Array2, ArrayView1, Axis};

use crate::{KnnErr, Result};

/// A class label attached to every item.
pub type Label = u32;

/// A borrowed view over one item's features.
pub type FeatureVector<'a> = ArrayView1<'a, f32>;

/// One item of a dataset: its ground-truth label and its features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledItem<'a> {
    pub label: Label,
    pub features: FeatureVector<'a>,
}

/// An immutable, in-memory set of labeled items.
///
/// Features are stored row-major, one row per item, so every item has the same
/// dimension by construction. Once built the dataset is never mutated and can be
/// shared freely between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Vec<Label>,
}

impl Dataset {
    /// Creates a dataset from a feature matrix and one label per row.
    ///
    /// # Errors
    /// Returns `KnnErr::DimensionMismatch` if the amount of labels differs from the
    /// amount of rows.
    pub fn new(features: Array2<f32>, labels: Vec<Label>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(KnnErr::DimensionMismatch {
                what: "labels",
                got: labels.len(),
                expected: features.nrows(),
            });
        }

        Ok(Self { features, labels })
    }

    /// Creates a dataset of `dim`-dimensional items.
    ///
    /// # Errors
    /// Returns `KnnErr::DimensionMismatch` if any item is not `dim` long.
    pub fn from_items<I, V>(dim: usize, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Label, V)>,
        V: AsRef<[f32]>,
    {
        let mut labels = Vec::new();
        let mut data = Vec::new();

        for (label, features) in items {
            let features = features.as_ref();
            if features.len() != dim {
                return Err(KnnErr::DimensionMismatch {
                    what: "item features",
                    got: features.len(),
                    expected: dim,
                });
            }

            labels.push(label);
            data.extend_from_slice(features);
        }

        let features = Array2::from_shape_vec((labels.len(), dim), data).map_err(|_| {
            KnnErr::DimensionMismatch {
                what: "feature matrix",
                got: labels.len(),
                expected: dim,
            }
        })?;

        Self::new(features, labels)
    }

    /// Number of items.
    #[inline]
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The feature dimension shared by every item.
    #[inline]
    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    /// Returns the item at `idx` (panics if out of bounds).
    #[inline]
    pub fn item(&self, idx: usize) -> LabeledItem<'_> {
        LabeledItem {
            label: self.labels[idx],
            features: self.features.row(idx),
        }
    }

    /// Iterates the items in index order.
    pub fn items(&self) -> impl Iterator<Item = LabeledItem<'_>> {
        self.features
            .axis_iter(Axis(0))
            .zip(&self.labels)
            .map(|(features, &label)| LabeledItem { label, features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_items_keeps_order() {
        let ds = Dataset::from_items(2, [(0, [0.0_f32, 0.0]), (1, [10.0, 10.0])]).unwrap();

        assert_eq!(ds.count(), 2);
        assert_eq!(ds.dim(), 2);
        assert_eq!(ds.item(0).label, 0);

        let item = ds.item(1);
        assert_eq!(item.label, 1);
        assert_eq!(item.features.to_vec(), vec![10.0, 10.0]);
    }

    #[test]
    fn from_items_rejects_ragged_features() {
        let items: Vec<(Label, Vec<f32>)> = vec![(0, vec![1.0, 2.0]), (1, vec![3.0])];
        let err = Dataset::from_items(2, items).unwrap_err();

        assert!(matches!(
            err,
            KnnErr::DimensionMismatch {
                got: 1,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_label_count_mismatch() {
        let features = Array2::<f32>::zeros((3, 4));
        assert!(Dataset::new(features, vec![0, 1]).is_err());
    }

    #[test]
    fn empty_dataset_keeps_dimension() {
        let ds = Dataset::from_items(5, Vec::<(Label, Vec<f32>)>::new()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.dim(), 5);
        assert_eq!(ds.items().count(), 0);
    }
}
