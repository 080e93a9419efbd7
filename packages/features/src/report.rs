//! Scoring run over the clean CSV and result persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use road_accidents_accident_models::TARGET_COLUMN;
use road_accidents_source::progress::ProgressCallback;
use road_accidents_table::Table;
use road_accidents_table::cell::float_cell;
use road_accidents_table::csv_io::{read_delimited, write_csv};
use serde_json::Value;

use crate::matrix::FeatureMatrix;
use crate::mutual_info::{DEFAULT_BINS, MutualInformationScorer};
use crate::random_forest::RandomForestScorer;
use crate::sample::DEFAULT_MAX_ROWS;
use crate::{FeatureScore, FeatureScorer, ScoreError};

/// Default clean table read by the scorer.
pub const DEFAULT_INPUT_PATH: &str = "data/clean_df.csv";

/// Number of top features logged after scoring.
pub const TOP_N: usize = 20;

/// Settings of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreConfig {
    /// Clean table to score.
    pub input_path: PathBuf,
    /// Directory receiving `feature_importance_<scorer>.csv`.
    pub output_dir: PathBuf,
    /// Row cap before the random forest samples.
    pub max_rows: usize,
    /// Bins for numeric features.
    pub bins: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from("."),
            max_rows: DEFAULT_MAX_ROWS,
            bins: DEFAULT_BINS,
        }
    }
}

impl ScoreConfig {
    /// Path of the results file written for `scorer`.
    #[must_use]
    pub fn output_path(&self, scorer: &dyn FeatureScorer) -> PathBuf {
        self.output_dir
            .join(format!("feature_importance_{}.csv", scorer.name()))
    }

    /// Scorers run by [`score_file`], in order.
    #[must_use]
    pub fn scorers(&self) -> Vec<Box<dyn FeatureScorer>> {
        vec![
            Box::new(RandomForestScorer::new(self.max_rows)),
            Box::new(MutualInformationScorer::new(self.bins)),
        ]
    }
}

/// Ranking produced by one scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Scorer name.
    pub scorer: &'static str,
    /// File the ranking was written to.
    pub path: PathBuf,
    /// Scores by descending importance.
    pub scores: Vec<FeatureScore>,
}

/// Converts scores to a two-column `feature,importance` table.
#[must_use]
pub fn scores_table(scores: &[FeatureScore]) -> Table {
    Table::from_rows(
        vec!["feature".to_owned(), "importance".to_owned()],
        scores
            .iter()
            .map(|s| vec![Value::String(s.feature.clone()), float_cell(s.importance)])
            .collect(),
    )
}

/// Writes scores as CSV, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ScoreError::Table`] if the file cannot be written.
pub fn write_scores(scores: &[FeatureScore], path: &Path) -> Result<(), ScoreError> {
    write_csv(&scores_table(scores), path)?;
    Ok(())
}

/// Loads the clean table at `path` into a feature matrix.
///
/// # Errors
///
/// Returns [`ScoreError`] if the file is missing or unreadable, lacks the
/// target, or has no target values.
pub fn load_matrix(path: &Path) -> Result<FeatureMatrix, ScoreError> {
    if !path.is_file() {
        return Err(ScoreError::NotFound {
            path: path.to_path_buf(),
        });
    }

    log::info!("Loading dataset from {}", path.display());
    let table = read_delimited(path, b',')?;
    log::info!("Loaded {}", table.shape());

    let matrix = FeatureMatrix::from_table(&table, TARGET_COLUMN)?;
    if matrix.is_empty() {
        return Err(ScoreError::Empty);
    }
    log::info!(
        "Using {} categorical and {} numerical feature(s)",
        matrix.categorical_count(),
        matrix.numeric_count()
    );
    Ok(matrix)
}

/// Loads the clean table and runs each scorer over every row with a
/// target, writing one ranking file per scorer. Progress advances once per
/// scorer.
///
/// # Errors
///
/// Returns [`ScoreError`] if the input cannot be loaded, a model cannot be
/// fitted, or an output cannot be written.
pub fn score_file(
    config: &ScoreConfig,
    scorers: &[Box<dyn FeatureScorer>],
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Ranking>, ScoreError> {
    progress.set_total(scorers.len() as u64);
    progress.set_message("Loading clean table".to_owned());
    let matrix = load_matrix(&config.input_path)?;

    let rankings = scorers
        .iter()
        .map(|scorer| {
            progress.set_message(format!("Scoring ({})", scorer.name()));
            let scores = scorer.score(&matrix)?;

            log::info!("Top {TOP_N} features ({}):", scorer.name());
            for (rank, score) in scores.iter().take(TOP_N).enumerate() {
                log::info!("  {:>2}. {:<32} {:.6}", rank + 1, score.feature, score.importance);
            }

            let path = config.output_path(scorer.as_ref());
            write_scores(&scores, &path)?;
            log::info!("Saved {}", path.display());
            progress.inc(1);

            Ok(Ranking {
                scorer: scorer.name(),
                path,
                scores,
            })
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;

    progress.finish(format!("Ranked features with {} scorer(s)", rankings.len()));
    Ok(rankings)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use road_accidents_source::progress::null_progress;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        tmp
    }

    fn write_clean_file(path: &Path) {
        let mut csv = String::from("weather,hour,injury_severity\n");
        for i in 0..30 {
            let (weather, severity) = if i % 2 == 0 {
                ("Rain", "Killed")
            } else {
                ("Normal", "Unharmed")
            };
            csv.push_str(&format!("{weather},{},{severity}\n", (i / 2) % 24));
        }
        csv.push_str("Rain,3,\n");
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn writes_both_rankings() {
        let tmp = scratch_dir("road_accidents_features_score_file");
        let input = tmp.join("clean_df.csv");
        write_clean_file(&input);

        let config = ScoreConfig {
            input_path: input,
            output_dir: tmp.join("out"),
            max_rows: 20,
            bins: DEFAULT_BINS,
        };
        let rankings = score_file(&config, &config.scorers(), &null_progress()).unwrap();
        let names: Vec<&str> = rankings.iter().map(|r| r.scorer).collect();
        assert_eq!(names, ["random_forest", "mutual_info"]);

        let forest = &rankings[0];
        assert!(forest.path.ends_with("feature_importance_random_forest.csv"));
        assert!(forest.scores[0].feature.starts_with("weather_"));
        let written = read_delimited(&forest.path, b',').unwrap();
        assert_eq!(written.columns(), ["feature", "importance"]);
        assert_eq!(written.len(), 3);

        let mutual_info = &rankings[1];
        assert!(mutual_info.path.ends_with("feature_importance_mutual_info.csv"));
        assert_eq!(mutual_info.scores.len(), 2);
        assert_eq!(mutual_info.scores[0].feature, "weather");
        let written = read_delimited(&mutual_info.path, b',').unwrap();
        assert_eq!(written.get(0, "feature"), Some(&json!("weather")));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn mutual_information_ignores_the_row_cap() {
        let tmp = scratch_dir("road_accidents_features_full_rows");
        let input = tmp.join("clean_df.csv");
        write_clean_file(&input);

        let config = ScoreConfig {
            input_path: input.clone(),
            output_dir: tmp.clone(),
            max_rows: 5,
            bins: DEFAULT_BINS,
        };
        let scorer = MutualInformationScorer::new(config.bins);
        let scorers: Vec<Box<dyn FeatureScorer>> = vec![Box::new(scorer)];
        let rankings = score_file(&config, &scorers, &null_progress()).unwrap();

        let full = load_matrix(&input).unwrap();
        assert_eq!(full.len(), 30);
        assert_eq!(rankings[0].scores, scorer.score(&full).unwrap());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_input_is_not_found() {
        let config = ScoreConfig {
            input_path: std::env::temp_dir().join("road_accidents_features_absent.csv"),
            ..ScoreConfig::default()
        };
        let err = score_file(&config, &config.scorers(), &null_progress()).unwrap_err();
        assert!(matches!(err, ScoreError::NotFound { .. }));
    }

    #[test]
    fn missing_target_is_reported() {
        let tmp = scratch_dir("road_accidents_features_no_target");
        let input = tmp.join("clean_df.csv");
        std::fs::write(&input, "weather,hour\nRain,3\n").unwrap();
        let config = ScoreConfig {
            input_path: input,
            output_dir: tmp.clone(),
            ..ScoreConfig::default()
        };
        let err = score_file(&config, &config.scorers(), &null_progress()).unwrap_err();
        assert!(matches!(err, ScoreError::MissingTarget { .. }));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
