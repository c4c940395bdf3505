use std::{fmt, str::FromStr};

use crate::{FeatureVector, KnnErr};

/// Cosine distance reported when either vector has zero magnitude.
pub const MAX_COSINE_DISTANCE: f64 = 2.0;

/// Dissimilarity between two feature vectors, smaller means more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMetric {
    /// `sqrt(sum((a_i - b_i)^2))`
    #[default]
    Euclidean,
    /// `1 - dot(a, b) / (|a| * |b|)`
    Cosine,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 2] = [DistanceMetric::Euclidean, DistanceMetric::Cosine];

    /// The canonical, lowercase name of the metric.
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cosine => "cosine",
        }
    }

    /// Computes the distance between `a` and `b`.
    ///
    /// # Panics
    /// If `a` and `b` have different lengths.
    pub fn distance(self, a: FeatureVector<'_>, b: FeatureVector<'_>) -> f64 {
        assert_eq!(
            a.len(),
            b.len(),
            "distance between vectors of different dimension"
        );

        match self {
            DistanceMetric::Euclidean => euclidean(a, b),
            DistanceMetric::Cosine => cosine(a, b),
        }
    }
}

fn euclidean(a: FeatureVector<'_>, b: FeatureVector<'_>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = f64::from(x) - f64::from(y);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

fn cosine(a: FeatureVector<'_>, b: FeatureVector<'_>) -> f64 {
    let (dot, norm_a, norm_b) =
        a.iter()
            .zip(b.iter())
            .fold((0.0, 0.0, 0.0), |(dot, na, nb), (&x, &y)| {
                let (x, y) = (f64::from(x), f64::from(y));
                (dot + x * y, na + x * x, nb + y * y)
            });

    if norm_a == 0.0 || norm_b == 0.0 {
        return MAX_COSINE_DISTANCE;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    (1.0 - similarity).clamp(0.0, MAX_COSINE_DISTANCE)
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selects a metric by any non-empty, case-insensitive prefix of its name.
impl FromStr for DistanceMetric {
    type Err = KnnErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = s.to_ascii_lowercase();
        if prefix.is_empty() {
            return Err(KnnErr::InvalidMetric(s.to_string()));
        }

        let mut matches = Self::ALL
            .into_iter()
            .filter(|metric| metric.name().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(metric), None) => Ok(metric),
            _ => Err(KnnErr::InvalidMetric(s.to_string())),
        }
    }
}
