//! Random forest feature ranking.
//!
//! Categorical features are one-hot encoded and numeric gaps are filled
//! with the column median. Bootstrapped Gini trees with balanced class
//! weights are fitted on a seeded sample of rows, and each encoded column
//! is scored by its normalized impurity decrease averaged over the trees.

use std::collections::{BTreeMap, BTreeSet};

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::matrix::{FeatureMatrix, FeatureValues};
use crate::sample::{DEFAULT_MAX_ROWS, SAMPLE_SEED, sample_indices};
use crate::{FeatureScore, FeatureScorer, ScoreError, sort_scores};

/// Default number of trees in the forest.
pub const DEFAULT_TREES: usize = 80;

/// Default maximum depth of each tree.
pub const DEFAULT_MAX_DEPTH: usize = 8;

const NAME: &str = "random_forest";

/// Scores encoded features by random forest impurity importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomForestScorer {
    trees: usize,
    max_depth: usize,
    max_rows: usize,
    seed: u64,
}

impl RandomForestScorer {
    /// Creates a forest fitted on at most `max_rows` sampled rows.
    #[must_use]
    pub const fn new(max_rows: usize) -> Self {
        Self {
            trees: DEFAULT_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_rows,
            seed: SAMPLE_SEED,
        }
    }

    /// Sets the number of trees (at least one).
    #[must_use]
    pub fn with_trees(mut self, trees: usize) -> Self {
        self.trees = trees.max(1);
        self
    }

    fn fit_importances(
        &self,
        records: &Array2<f64>,
        targets: &Array1<usize>,
        weights: &Array1<f32>,
    ) -> Result<Vec<f64>, ScoreError> {
        let (rows, width) = records.dim();
        let mut total = vec![0.0; width];
        if rows == 0 || width == 0 {
            return Ok(total);
        }

        let mut rng = Pcg64::seed_from_u64(self.seed);
        for _ in 0..self.trees {
            let picked: Vec<usize> = (0..rows).map(|_| rng.random_range(0..rows)).collect();
            let dataset = Dataset::new(
                records.select(Axis(0), &picked),
                targets.select(Axis(0), &picked),
            )
            .with_weights(weights.select(Axis(0), &picked));

            let tree = DecisionTree::<f64, usize>::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(Some(self.max_depth))
                .fit(&dataset)
                .map_err(|err| ScoreError::Model {
                    model: NAME,
                    message: err.to_string(),
                })?;

            // Trees that never split carry no importance.
            let importance = tree.feature_importance();
            let sum: f64 = importance.iter().sum();
            if sum.is_finite() && sum > 0.0 {
                for (acc, value) in total.iter_mut().zip(&importance) {
                    *acc += value / sum;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for value in &mut total {
                *value /= sum;
            }
        }
        Ok(total)
    }
}

impl Default for RandomForestScorer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl FeatureScorer for RandomForestScorer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<FeatureScore>, ScoreError> {
        let total = matrix.len();
        let sample;
        let matrix = if total > self.max_rows {
            sample = matrix.select_rows(&sample_indices(total, self.max_rows, self.seed));
            log::info!(
                "Random forest: using a sample of {} rows (out of {total})",
                sample.len()
            );
            &sample
        } else {
            log::info!("Random forest: using all {total} rows");
            matrix
        };

        let encoded = encode(matrix);
        let (targets, class_count) = class_indices(matrix.target());
        let weights = balanced_weights(&targets, class_count);
        log::debug!(
            "Fitting {} tree(s) on {} encoded column(s), {class_count} class(es)",
            self.trees,
            encoded.names.len()
        );
        let importances = self.fit_importances(&encoded.records, &targets, &weights)?;

        let mut scores: Vec<FeatureScore> = encoded
            .names
            .into_iter()
            .zip(importances)
            .map(|(feature, importance)| FeatureScore {
                feature,
                importance,
            })
            .collect();
        sort_scores(&mut scores);
        Ok(scores)
    }
}

/// Numeric design matrix with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    /// Encoded column names.
    pub names: Vec<String>,
    /// One row per matrix row, one column per name.
    pub records: Array2<f64>,
}

/// One-hot encodes categorical features and fills numeric gaps with the
/// column median.
///
/// Categorical indicators come first, as `<column>_<category>` with
/// categories in sorted order and `<column>_nan` last for nulls. Numeric
/// columns follow in matrix order; a column with no value is filled with
/// zero.
#[must_use]
pub fn encode(matrix: &FeatureMatrix) -> EncodedFeatures {
    let mut names = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for feature in matrix.features() {
        let FeatureValues::Categorical(values) = &feature.values else {
            continue;
        };
        let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
        for category in categories {
            names.push(format!("{}_{category}", feature.name));
            columns.push(
                values
                    .iter()
                    .map(|v| indicator(v.as_deref() == Some(category)))
                    .collect(),
            );
        }
        if values.iter().any(Option::is_none) {
            names.push(format!("{}_nan", feature.name));
            columns.push(values.iter().map(|v| indicator(v.is_none())).collect());
        }
    }

    for feature in matrix.features() {
        let FeatureValues::Numeric(values) = &feature.values else {
            continue;
        };
        let fill = median(values).unwrap_or(0.0);
        names.push(feature.name.clone());
        columns.push(values.iter().map(|v| v.unwrap_or(fill)).collect());
    }

    let mut records = Array2::zeros((matrix.len(), columns.len()));
    for (idx, column) in columns.into_iter().enumerate() {
        records.column_mut(idx).assign(&Array1::from(column));
    }
    EncodedFeatures { names, records }
}

const fn indicator(hit: bool) -> f64 {
    if hit { 1.0 } else { 0.0 }
}

fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    Some(if present.len() % 2 == 0 {
        f64::midpoint(present[mid - 1], present[mid])
    } else {
        present[mid]
    })
}

/// Maps labels to class indices in sorted label order. Returns the
/// indices and the number of classes.
fn class_indices(target: &[String]) -> (Array1<usize>, usize) {
    let classes: BTreeMap<&str, usize> = target
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(idx, label)| (label, idx))
        .collect();
    let indices = target.iter().map(|label| classes[label.as_str()]).collect();
    (indices, classes.len())
}

/// Balanced class weights `n / (classes * count)`, scaled so that the
/// most frequent class weighs 1.
#[allow(clippy::cast_precision_loss)]
fn balanced_weights(targets: &Array1<usize>, class_count: usize) -> Array1<f32> {
    let mut counts = vec![0_usize; class_count];
    for &class in targets {
        counts[class] += 1;
    }
    let largest = counts.iter().copied().max().unwrap_or(1) as f32;
    targets.mapv(|class| largest / counts[class] as f32)
}
