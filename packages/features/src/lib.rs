#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Feature importance against injury severity.
//!
//! Reads the clean accident table, splits it into typed feature columns
//! and the target, and ranks features with each [`FeatureScorer`]:
//! [`random_forest::RandomForestScorer`] on a seeded sample of rows and
//! [`mutual_info::MutualInformationScorer`] on every row.

pub mod matrix;
pub mod mutual_info;
pub mod random_forest;
pub mod report;
pub mod sample;

use std::path::PathBuf;

use road_accidents_table::TableError;

use crate::matrix::FeatureMatrix;

/// Errors that can occur while scoring features.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// The clean table does not exist.
    #[error("Could not find file: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The target column is absent from the clean table.
    #[error("Target column '{column}' not found")]
    MissingTarget {
        /// Expected target column.
        column: String,
    },

    /// No row has a target value.
    #[error("No rows with a target value")]
    Empty,

    /// A model could not be fitted.
    #[error("Failed to fit {model}: {message}")]
    Model {
        /// Scorer whose model failed.
        model: &'static str,
        /// Underlying error message.
        message: String,
    },

    /// Reading or writing a table failed.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Importance of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScore {
    /// Feature (column) name.
    pub feature: String,
    /// Importance; larger is more informative.
    pub importance: f64,
}

/// Ranks the features of a [`FeatureMatrix`] against its target.
pub trait FeatureScorer {
    /// Short identifier, used in output file names.
    fn name(&self) -> &'static str;

    /// Scores every feature. The result is sorted by descending
    /// importance.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::Model`] if the scorer's model cannot be fitted.
    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<FeatureScore>, ScoreError>;
}

/// Sorts scores by descending importance, breaking ties by feature name.
pub fn sort_scores(scores: &mut [FeatureScore]) {
    scores.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.feature.cmp(&b.feature))
    });
}
