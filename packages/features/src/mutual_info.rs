//! Mutual information between discretized features and the target.
//!
//! Categorical features are factorized into integer levels with null as a
//! level of its own. Numeric features are split into equal-width bins over
//! their observed range; nulls get an extra bin. The score of a feature is
//! the plug-in estimate of `I(feature; target)` in nats.

use std::collections::HashMap;
use std::hash::Hash;

use crate::matrix::{FeatureMatrix, FeatureValues};
use crate::{FeatureScore, FeatureScorer, ScoreError, sort_scores};

/// Default number of equal-width bins for numeric features.
pub const DEFAULT_BINS: usize = 10;

/// Scores features by their mutual information with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutualInformationScorer {
    bins: usize,
}

impl MutualInformationScorer {
    /// Creates a scorer splitting numeric features into `bins` bins (at
    /// least one).
    #[must_use]
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(1) }
    }

    /// Number of bins for numeric features.
    #[must_use]
    pub const fn bins(&self) -> usize {
        self.bins
    }
}

impl Default for MutualInformationScorer {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

impl FeatureScorer for MutualInformationScorer {
    fn name(&self) -> &'static str {
        "mutual_info"
    }

    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<FeatureScore>, ScoreError> {
        let target = factorize(matrix.target().iter().map(Some));

        let mut scores: Vec<FeatureScore> = matrix
            .features()
            .iter()
            .map(|feature| {
                let levels = match &feature.values {
                    FeatureValues::Numeric(values) => discretize(values, self.bins),
                    FeatureValues::Categorical(values) => {
                        factorize(values.iter().map(Option::as_ref))
                    }
                };
                FeatureScore {
                    feature: feature.name.clone(),
                    importance: mutual_information(&levels, &target),
                }
            })
            .collect();

        sort_scores(&mut scores);
        Ok(scores)
    }
}

/// Maps each value to an integer level in first-seen order. `None` is a
/// level of its own.
pub fn factorize<'a, T, I>(values: I) -> Vec<usize>
where
    T: Eq + Hash + ?Sized + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    let mut levels: HashMap<Option<&T>, usize> = HashMap::new();
    values
        .into_iter()
        .map(|value| {
            let next = levels.len();
            *levels.entry(value).or_insert(next)
        })
        .collect()
}

/// Assigns each value to one of `bins` equal-width bins spanning the
/// observed range. Nulls go to bin `bins`. A constant column maps every
/// non-null value to bin 0.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn discretize(values: &[Option<f64>], bins: usize) -> Vec<usize> {
    let bins = bins.max(1);
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let width = (max - min) / bins as f64;

    values
        .iter()
        .map(|value| match value {
            None => bins,
            Some(v) if width > 0.0 => (((v - min) / width).floor() as usize).min(bins - 1),
            Some(_) => 0,
        })
        .collect()
}

/// Plug-in mutual information, in nats, between two aligned level
/// sequences.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mutual_information(x: &[usize], y: &[usize]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let mut joint: HashMap<(usize, usize), usize> = HashMap::new();
    let mut x_counts: HashMap<usize, usize> = HashMap::new();
    let mut y_counts: HashMap<usize, usize> = HashMap::new();
    for (&a, &b) in x.iter().zip(y).take(n) {
        *joint.entry((a, b)).or_default() += 1;
        *x_counts.entry(a).or_default() += 1;
        *y_counts.entry(b).or_default() += 1;
    }

    let n = n as f64;
    let mi: f64 = joint
        .iter()
        .map(|(&(a, b), &count)| {
            let count = count as f64;
            let expected = x_counts[&a] as f64 * y_counts[&b] as f64;
            (count / n) * (count * n / expected).ln()
        })
        .sum();
    mi.max(0.0)
}
