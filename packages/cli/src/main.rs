#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for cleaning road accident records and scoring features.
//!
//! ```text
//! road_accidents clean [--data-dir data] [--output data/clean_df.csv]
//! road_accidents score [--input data/clean_df.csv] [--output-dir .] [--max-rows 20000] [--bins 10]
//! road_accidents run
//! ```
//!
//! Running with no subcommand is the same as `run`: clean with the default
//! paths, then score the result.
//!
//! Uses `indicatif-log-bridge` (via [`road_accidents_cli_utils::init_logger`])
//! so that log lines and progress bars never fight for the terminal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use road_accidents_clean::pipeline::{
    self, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_PATH, PipelineConfig, PipelineStep,
};
use road_accidents_cli_utils::{IndicatifProgress, MultiProgress};
use road_accidents_features::mutual_info::DEFAULT_BINS;
use road_accidents_features::report::{DEFAULT_INPUT_PATH, ScoreConfig, score_file};
use road_accidents_features::sample::DEFAULT_MAX_ROWS;

#[derive(Parser)]
#[command(
    name = "road_accidents",
    about = "Clean yearly road accident records and rank features against injury severity"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the clean table from the raw yearly files
    Clean(CleanArgs),
    /// Rank the clean table's features against injury severity
    Score(ScoreArgs),
    /// Clean, then score, with default paths
    Run,
}

#[derive(Args)]
struct CleanArgs {
    /// Directory holding `<prefix>-<year>.csv` files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Clean table output path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

impl From<CleanArgs> for PipelineConfig {
    fn from(args: CleanArgs) -> Self {
        Self {
            data_dir: args.data_dir,
            output_path: args.output,
        }
    }
}

#[derive(Args)]
struct ScoreArgs {
    /// Clean table to score
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,
    /// Directory receiving the ranking CSV
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Row cap before the random forest fits on a seeded sample
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,
    /// Equal-width bins for numeric features
    #[arg(long, default_value_t = DEFAULT_BINS)]
    bins: usize,
}

impl From<ScoreArgs> for ScoreConfig {
    fn from(args: ScoreArgs) -> Self {
        Self {
            input_path: args.input,
            output_dir: args.output_dir,
            max_rows: args.max_rows,
            bins: args.bins,
        }
    }
}

fn clean(multi: &MultiProgress, config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let progress =
        IndicatifProgress::steps_bar(multi, "Cleaning", PipelineStep::ALL.len() as u64);
    let report = pipeline::run(config, &progress)?;

    println!(
        "Wrote {} rows × {} columns to {}",
        report.rows,
        report.columns,
        config.output_path.display()
    );
    println!(
        "  merged: {}, invalid dates: {}, outside region: {}, duplicates: {}",
        report.merged_rows, report.invalid_dates, report.filtered_out, report.duplicates
    );
    if let Some(median) = report.recode.speed_median {
        println!("  implausible speed limits imputed with {median}");
    }
    Ok(())
}

fn score(multi: &MultiProgress, config: &ScoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scorers = config.scorers();
    let progress = IndicatifProgress::steps_bar(multi, "Scoring", scorers.len() as u64);
    let rankings = score_file(config, &scorers, &progress)?;

    for ranking in &rankings {
        println!("Saved {}", ranking.path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = road_accidents_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Clean(args) => clean(&multi, &args.into())?,
        Commands::Score(args) => score(&multi, &args.into())?,
        Commands::Run => {
            let pipeline_config = PipelineConfig::default();
            clean(&multi, &pipeline_config)?;
            let score_config = ScoreConfig {
                input_path: pipeline_config.output_path,
                ..ScoreConfig::default()
            };
            score(&multi, &score_config)?;
        }
    }

    Ok(())
}
