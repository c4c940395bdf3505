use std::{cmp::Ordering, collections::BTreeMap, num::NonZeroUsize, ops::Range};

use crate::{Dataset, DistanceMetric, FeatureVector, KnnErr, Label, Result};

/// A reference item scored against one query, only alive during a single classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborCandidate {
    pub distance: f64,
    pub label: Label,
    pub source_index: usize,
}

impl NeighborCandidate {
    /// Total order used to pick neighbors: nearer first, then lower reference index.
    fn closer(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.source_index.cmp(&other.source_index))
    }
}

/// Brute-force k-nearest-neighbor classifier.
///
/// Neighbors at equal distance are ranked by their index in the reference set and
/// votes tied between labels go to the smallest label, so predictions are fully
/// deterministic. A `k` larger than the reference set is clamped to its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    k: NonZeroUsize,
    metric: DistanceMetric,
}

impl Classifier {
    pub fn new(k: NonZeroUsize, metric: DistanceMetric) -> Self {
        Self { k, metric }
    }

    #[inline]
    pub fn k(&self) -> NonZeroUsize {
        self.k
    }

    #[inline]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The amount of neighbors that actually vote against `reference`.
    #[inline]
    pub fn effective_k(&self, reference: &Dataset) -> usize {
        self.k.get().min(reference.count())
    }

    /// Predicts the label of `query`.
    ///
    /// # Errors
    /// Returns `KnnErr::EmptyReference` if `reference` has no items and
    /// `KnnErr::DimensionMismatch` if `query` is not `reference.dim()` long.
    pub fn classify(&self, query: FeatureVector<'_>, reference: &Dataset) -> Result<Label> {
        let neighbors = self.nearest(query, reference)?;
        Ok(majority_vote(&neighbors))
    }

    /// Returns the `effective_k` nearest reference items to `query`, nearest first.
    pub fn nearest(
        &self,
        query: FeatureVector<'_>,
        reference: &Dataset,
    ) -> Result<Vec<NeighborCandidate>> {
        check_reference(query.len(), reference)?;
        Ok(self.nearest_unchecked(query, reference))
    }

    /// Classifies every item of `queries` within `range` and counts how many
    /// predictions match their ground-truth label.
    ///
    /// # Errors
    /// Returns `KnnErr::OutOfRange` if `range` does not fit in `queries`, plus the
    /// errors of [`Classifier::classify`].
    pub fn count_correct(
        &self,
        queries: &Dataset,
        range: Range<usize>,
        reference: &Dataset,
    ) -> Result<u64> {
        if range.start > range.end || range.end > queries.count() {
            return Err(KnnErr::OutOfRange {
                start: range.start,
                end: range.end,
                count: queries.count(),
            });
        }

        if range.is_empty() {
            return Ok(0);
        }

        check_reference(queries.dim(), reference)?;

        let correct = range
            .map(|idx| queries.item(idx))
            .filter(|item| {
                let neighbors = self.nearest_unchecked(item.features, reference);
                majority_vote(&neighbors) == item.label
            })
            .count();

        Ok(correct as u64)
    }

    fn nearest_unchecked(
        &self,
        query: FeatureVector<'_>,
        reference: &Dataset,
    ) -> Vec<NeighborCandidate> {
        let mut candidates: Vec<NeighborCandidate> = reference
            .items()
            .enumerate()
            .map(|(source_index, item)| NeighborCandidate {
                distance: self.metric.distance(query, item.features),
                label: item.label,
                source_index,
            })
            .collect();

        let k = self.effective_k(reference);
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, NeighborCandidate::closer);
            candidates.truncate(k);
        }

        candidates.sort_unstable_by(NeighborCandidate::closer);
        candidates
    }
}

/// Classifies `query` against `reference` with the `k` nearest neighbors under `metric`.
pub fn classify(
    query: FeatureVector<'_>,
    reference: &Dataset,
    k: NonZeroUsize,
    metric: DistanceMetric,
) -> Result<Label> {
    Classifier::new(k, metric).classify(query, reference)
}

fn check_reference(query_dim: usize, reference: &Dataset) -> Result<()> {
    if reference.is_empty() {
        return Err(KnnErr::EmptyReference);
    }

    if query_dim != reference.dim() {
        return Err(KnnErr::DimensionMismatch {
            what: "query",
            got: query_dim,
            expected: reference.dim(),
        });
    }

    Ok(())
}

/// Most frequent label among `neighbors`, the smallest label wins a tie.
///
/// `neighbors` is never empty: the reference set is non-empty and `k >= 1`.
fn majority_vote(neighbors: &[NeighborCandidate]) -> Label {
    let mut votes = BTreeMap::new();
    for neighbor in neighbors {
        *votes.entry(neighbor.label).or_insert(0usize) += 1;
    }

    let mut winner = (Label::MAX, 0);
    for (label, count) in votes {
        if count > winner.1 {
            winner = (label, count);
        }
    }

    winner.0
}
