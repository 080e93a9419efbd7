//! Typed feature columns extracted from the clean table.

use road_accidents_table::Table;
use road_accidents_table::cell::{as_text, parse_f64};

use crate::ScoreError;

/// Values of one feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValues {
    /// Every non-null cell parses as a number.
    Numeric(Vec<Option<f64>>),
    /// At least one non-null cell is not a number.
    Categorical(Vec<Option<String>>),
}

impl FeatureValues {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Self::Categorical(v) => Self::Categorical(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// A named feature column.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Column name.
    pub name: String,
    /// Column values, aligned with the target.
    pub values: FeatureValues,
}

/// Feature columns plus the target, restricted to rows with a target.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    features: Vec<Feature>,
    target: Vec<String>,
}

impl FeatureMatrix {
    /// Builds a matrix from `table` with `target` as the label column.
    ///
    /// Rows with a null target are dropped. Every other column becomes a
    /// feature, numeric when each non-null cell parses as a float and
    /// categorical otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::MissingTarget`] if `target` is absent.
    pub fn from_table(table: &Table, target: &str) -> Result<Self, ScoreError> {
        let target_idx = table
            .column_index(target)
            .ok_or_else(|| ScoreError::MissingTarget {
                column: target.to_owned(),
            })?;

        let mut labels = Vec::with_capacity(table.len());
        let mut kept = Vec::with_capacity(table.len());
        for row in table.rows() {
            if let Some(label) = as_text(&row[target_idx]) {
                labels.push(label);
                kept.push(row);
            }
        }
        let dropped = table.len() - kept.len();
        if dropped > 0 {
            log::info!("Dropped {dropped} row(s) without a target value");
        }

        let features = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target_idx)
            .map(|(idx, name)| {
                let numeric = kept
                    .iter()
                    .all(|row| row[idx].is_null() || parse_f64(&row[idx]).is_some());
                let values = if numeric {
                    FeatureValues::Numeric(kept.iter().map(|row| parse_f64(&row[idx])).collect())
                } else {
                    FeatureValues::Categorical(kept.iter().map(|row| as_text(&row[idx])).collect())
                };
                Feature {
                    name: name.clone(),
                    values,
                }
            })
            .collect();

        Ok(Self {
            features,
            target: labels,
        })
    }

    /// Feature columns in table order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Target labels.
    #[must_use]
    pub fn target(&self) -> &[String] {
        &self.target
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Returns `true` if no row has a target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Number of numeric features.
    #[must_use]
    pub fn numeric_count(&self) -> usize {
        self.features
            .iter()
            .filter(|f| matches!(f.values, FeatureValues::Numeric(_)))
            .count()
    }

    /// Number of categorical features.
    #[must_use]
    pub fn categorical_count(&self) -> usize {
        self.features.len() - self.numeric_count()
    }

    /// Returns a matrix holding only the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            features: self
                .features
                .iter()
                .map(|f| Feature {
                    name: f.name.clone(),
                    values: f.values.select(rows),
                })
                .collect(),
            target: rows.iter().map(|&i| self.target[i].clone()).collect(),
        }
    }
}
