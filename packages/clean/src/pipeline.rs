//! End-to-end cleaning run: raw files in, one clean CSV out.
//!
//! Steps run strictly in the order of [`PipelineStep::ALL`]. Each logs the
//! resulting table shape and advances the progress indicator by one. The
//! output file is only written once every transformation has succeeded.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use road_accidents_accident_models::{InjurySeverity, TARGET_COLUMN};
use road_accidents_source::LoadOptions;
use road_accidents_source::loader::{RawTables, load_raw_tables};
use road_accidents_source::progress::ProgressCallback;
use road_accidents_table::Table;
use road_accidents_table::csv_io::write_csv;

use crate::recode::RecodeSummary;
use crate::{CleanError, datetime, dedup, geo, merge, prune, recode, reduce, schema};

/// Default directory holding the raw yearly files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default clean table path.
pub const DEFAULT_OUTPUT_PATH: &str = "data/clean_df.csv";

/// Paths of one cleaning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory containing `<prefix>-<year>.csv` files.
    pub data_dir: PathBuf,
    /// Where the clean table is written.
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Stages of a cleaning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Load,
    Reduce,
    Merge,
    Rename,
    DeriveDateTime,
    Prune,
    Recode,
    GeoFilter,
    Dedup,
    Write,
}

impl PipelineStep {
    /// Every step in execution order.
    pub const ALL: &[Self] = &[
        Self::Load,
        Self::Reduce,
        Self::Merge,
        Self::Rename,
        Self::DeriveDateTime,
        Self::Prune,
        Self::Recode,
        Self::GeoFilter,
        Self::Dedup,
        Self::Write,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Load => "Load raw files",
            Self::Reduce => "Reduce users per accident",
            Self::Merge => "Merge tables",
            Self::Rename => "Rename columns",
            Self::DeriveDateTime => "Derive date and time",
            Self::Prune => "Prune columns",
            Self::Recode => "Recode categories",
            Self::GeoFilter => "Filter departments",
            Self::Dedup => "Drop duplicates",
            Self::Write => "Write clean table",
        }
    }
}

/// Row counts and recoding details of a finished run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Rows after loading, per source: characteristics, places, users.
    pub raw_rows: [usize; 3],
    /// Rows after the merge.
    pub merged_rows: usize,
    /// Rows dropped for an invalid date.
    pub invalid_dates: usize,
    /// Rows outside the department allow-set.
    pub filtered_out: usize,
    /// Exact duplicates removed.
    pub duplicates: usize,
    /// Recoding details.
    pub recode: RecodeSummary,
    /// Shape of the final table.
    pub rows: usize,
    /// Column count of the final table.
    pub columns: usize,
}

fn step_done(progress: &Arc<dyn ProgressCallback>, step: PipelineStep, table: &Table) {
    log::info!("[{}] {}", step.label(), table.shape());
    progress.inc(1);
}

/// Runs every transformation step on already loaded raw tables.
///
/// Advances `progress` once per step from [`PipelineStep::Reduce`] to
/// [`PipelineStep::Dedup`].
///
/// # Errors
///
/// Returns [`CleanError`] on the first failing step.
pub fn clean_tables(
    raw: &RawTables,
    progress: &Arc<dyn ProgressCallback>,
    report: &mut PipelineReport,
) -> Result<Table, CleanError> {
    progress.set_message(PipelineStep::Reduce.label().to_owned());
    let users = reduce::reduce_users(&raw.users)?;
    step_done(progress, PipelineStep::Reduce, &users);

    progress.set_message(PipelineStep::Merge.label().to_owned());
    let mut table = merge::merge_tables(&raw.places, &users, &raw.characteristics)?;
    report.merged_rows = table.len();
    step_done(progress, PipelineStep::Merge, &table);

    progress.set_message(PipelineStep::Rename.label().to_owned());
    schema::normalize_schema(&mut table);
    step_done(progress, PipelineStep::Rename, &table);

    progress.set_message(PipelineStep::DeriveDateTime.label().to_owned());
    report.invalid_dates = datetime::derive_date_time(&mut table)?;
    step_done(progress, PipelineStep::DeriveDateTime, &table);

    progress.set_message(PipelineStep::Prune.label().to_owned());
    prune::prune_columns(&mut table);
    step_done(progress, PipelineStep::Prune, &table);

    progress.set_message(PipelineStep::Recode.label().to_owned());
    report.recode = recode::recode(&mut table)?;
    step_done(progress, PipelineStep::Recode, &table);

    progress.set_message(PipelineStep::GeoFilter.label().to_owned());
    report.filtered_out = geo::filter_departments(&mut table)?;
    step_done(progress, PipelineStep::GeoFilter, &table);

    progress.set_message(PipelineStep::Dedup.label().to_owned());
    report.duplicates = dedup::deduplicate(&mut table);
    step_done(progress, PipelineStep::Dedup, &table);

    report.rows = table.len();
    report.columns = table.width();
    Ok(table)
}

/// Logs how many rows carry each severity label.
fn log_target_distribution(table: &Table) {
    let Some(idx) = table.column_index(TARGET_COLUMN) else {
        return;
    };
    for severity in InjurySeverity::all() {
        let label = severity.to_string();
        let count = table
            .rows()
            .iter()
            .filter(|row| row[idx].as_str() == Some(label.as_str()))
            .count();
        log::info!("  {label}: {count}");
    }
}

/// Loads the raw files, cleans them and writes the clean table.
///
/// # Errors
///
/// Returns [`CleanError`] if loading, any transformation, or writing
/// fails. Nothing is written unless every transformation succeeds.
pub fn run(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PipelineReport, CleanError> {
    let start = Instant::now();
    progress.set_total(PipelineStep::ALL.len() as u64);

    progress.set_message(PipelineStep::Load.label().to_owned());
    let raw = load_raw_tables(&LoadOptions::new(&config.data_dir))?;
    let mut report = PipelineReport {
        raw_rows: [raw.characteristics.len(), raw.places.len(), raw.users.len()],
        ..PipelineReport::default()
    };
    log::info!(
        "[{}] characteristics: {}, places: {}, users: {}",
        PipelineStep::Load.label(),
        raw.characteristics.shape(),
        raw.places.shape(),
        raw.users.shape()
    );
    progress.inc(1);

    let table = clean_tables(&raw, progress, &mut report)?;
    log_target_distribution(&table);

    progress.set_message(PipelineStep::Write.label().to_owned());
    write_csv(&table, &config.output_path)?;
    log::info!(
        "[{}] {} -> {}",
        PipelineStep::Write.label(),
        table.shape(),
        config.output_path.display()
    );
    progress.inc(1);

    progress.finish(format!(
        "Cleaned {} rows in {:.1}s",
        report.rows,
        start.elapsed().as_secs_f64()
    ));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use road_accidents_source::progress::null_progress;
    use road_accidents_table::csv_io::read_delimited;
    use serde_json::json;

    use super::*;

    const FINAL_COLUMNS: &[&str] = &[
        "date",
        "day_of_week",
        "hour",
        "road_category",
        "road_layout",
        "num_lanes",
        "reserved_lane",
        "road_profile",
        "road_shape",
        "surface_condition",
        "infrastructure",
        "road_location",
        "speed_limit",
        "user_category",
        "injury_severity",
        "sex",
        "birth_year",
        "trip_purpose",
        "safety_device_1",
        "users_involved",
        "light_conditions",
        "department",
        "urban_area",
        "intersection_type",
        "weather",
        "collision_type",
        "latitude",
        "longitude",
    ];

    fn scratch_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        tmp
    }

    fn write_fixture(dir: &std::path::Path) {
        std::fs::write(
            dir.join("caracteristiques-2021.csv"),
            "Num_Acc;jour;mois;an;hrmn;lum;dep;com;agg;int;atm;col;adr;lat;long\n\
             1;14;07;2021;22:15;-1;75;75056;2;1;1;3;rue A;48,85;2,35\n\
             2;15;07;2021;08:05;;2B;2B033;1;1;2;1;rue B;42,70;9,45\n\
             3;31;02;2021;10:00;1;92;92012;2;1;1;3;rue C;48,83;2,24\n\
             4;01;03;2021;12:30;1;93;93001;2;6;1;2;rue D;48,90;2,38\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("lieux-2021.csv"),
            "Num_Acc;catr;voie;v1;v2;circ;nbv;vosp;prof;pr;pr1;plan;lartpc;larrout;surf;infra;situ;vma\n\
             1;4;RUE A;;;2;0;0;1;;;1;;;1;0;1;250\n\
             2;3;D81;;;2;2;0;1;;;2;;;2;0;1;80\n\
             3;4;RUE C;;;2;2;0;1;;;1;;;1;0;1;50\n\
             4;4;RUE D;;;1; 1 ;0;1;;;1;;;1;0;1;30\n\
             4;4;RUE D;;;1; 1 ;0;1;;;1;;;1;0;1;30\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("usagers-2021.csv"),
            "Num_Acc;id_usager;id_vehicule;num_veh;place;catu;grav;sexe;an_nais;trajet;secu1;secu2;secu3;locp;actp;etatp\n\
             1;U1;V1;A01;1;1;2;1;1980;5;1;0;-1;0;0;-1\n\
             1;U2;V1;A01;2;2;4;2;1990;0;8;-1;-1;0;0;-1\n\
             2;U3;V2;A01;1;1;1;1;1975;1;1;0;-1;0;0;-1\n\
             4;U4;V4;A01;1;1;3;2;2001;-1;1;0;-1;0;0;-1\n",
        )
        .unwrap();
    }

    #[test]
    fn step_order_matches_execution() {
        assert_eq!(PipelineStep::ALL.first(), Some(&PipelineStep::Load));
        assert_eq!(PipelineStep::ALL.last(), Some(&PipelineStep::Write));
        assert_eq!(PipelineStep::ALL.len(), 10);
    }

    #[test]
    fn cleans_a_small_dataset_end_to_end() {
        let tmp = scratch_dir("road_accidents_pipeline_end_to_end");
        write_fixture(&tmp);
        let config = PipelineConfig {
            data_dir: tmp.clone(),
            output_path: tmp.join("out").join("clean_df.csv"),
        };

        let report = run(&config, &null_progress()).unwrap();
        assert_eq!(report.raw_rows, [4, 5, 4]);
        assert_eq!(report.merged_rows, 5);
        assert_eq!(report.invalid_dates, 1);
        assert_eq!(report.filtered_out, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.rows, 2);

        let clean = read_delimited(&config.output_path, b',').unwrap();
        assert_eq!(clean.columns(), FINAL_COLUMNS);
        assert_eq!(clean.len(), 2);

        // Accident 1: Paris, night, worst outcome kept out of two users.
        assert_eq!(clean.get(0, "department"), Some(&json!("75")));
        assert_eq!(clean.get(0, "day_of_week"), Some(&json!("Wednesday")));
        assert_eq!(clean.get(0, "light_conditions"), Some(&json!("Night")));
        assert_eq!(clean.get(0, "injury_severity"), Some(&json!("Light injury")));
        assert_eq!(clean.get(0, "users_involved"), Some(&json!("2")));
        assert_eq!(clean.get(0, "num_lanes"), Some(&json!("2")));
        assert_eq!(clean.get(0, "speed_limit"), Some(&json!("30")));
        assert_eq!(clean.get(0, "latitude"), Some(&json!("48.85")));

        // Accident 4: duplicated place row collapsed.
        assert_eq!(clean.get(1, "department"), Some(&json!("93")));
        assert_eq!(clean.get(1, "intersection_type"), Some(&json!("Roundabout")));
        assert_eq!(clean.get(1, "trip_purpose"), Some(&json!("Leisure")));
        assert_eq!(clean.get(1, "num_lanes"), Some(&json!("1")));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_run_writes_nothing() {
        let tmp = scratch_dir("road_accidents_pipeline_failure");
        write_fixture(&tmp);
        std::fs::write(
            tmp.join("usagers-2021.csv"),
            "Num_Acc;catu\n1;1\n",
        )
        .unwrap();
        let config = PipelineConfig {
            data_dir: tmp.clone(),
            output_path: tmp.join("clean_df.csv"),
        };

        let err = run(&config, &null_progress()).unwrap_err();
        assert!(matches!(err, CleanError::Schema { step: "reduce", .. }));
        assert!(!config.output_path.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_source_propagates() {
        let tmp = scratch_dir("road_accidents_pipeline_missing");
        let config = PipelineConfig {
            data_dir: tmp.clone(),
            output_path: tmp.join("clean_df.csv"),
        };
        assert!(matches!(
            run(&config, &null_progress()),
            Err(CleanError::Source(_))
        ));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
