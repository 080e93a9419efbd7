//! Categorical recoding and numeric cleanup of the renamed table.
//!
//! Runs, in order: lane count cleanup, speed limit cleanup, the generic
//! code-to-label mappings from [`mapping`], the light-period fallback on
//! `hour`, coordinate parsing and integer parsing. Parse failures are
//! resolved locally and never surface as errors.

pub mod mapping;
pub mod numeric;

use std::collections::BTreeMap;

use road_accidents_accident_models::LightPeriod;
use road_accidents_table::Table;
use road_accidents_table::cell::parse_i64;
use serde_json::Value;

use crate::CleanError;
use crate::datetime::HOUR_COLUMN;
use crate::reduce::USERS_INVOLVED_COLUMN;

use self::mapping::{CodeMapping, Lookup, code_mappings};

/// Light column; filled from `hour` when the raw code is unusable.
pub const LIGHT_COLUMN: &str = "light_conditions";
/// Lane count column.
pub const NUM_LANES_COLUMN: &str = "num_lanes";
/// Speed limit column.
pub const SPEED_LIMIT_COLUMN: &str = "speed_limit";
/// Coordinate columns.
pub const COORDINATE_COLUMNS: &[&str] = &["latitude", "longitude"];
/// Columns converted to plain integers.
pub const INTEGER_COLUMNS: &[&str] = &["birth_year", USERS_INVOLVED_COLUMN];

/// What the recoder changed, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecodeSummary {
    /// Median used to replace implausible speed limits.
    pub speed_median: Option<f64>,
    /// Per column, cells whose code was neither known nor a sentinel.
    pub unmapped: BTreeMap<String, usize>,
    /// Light cells derived from the hour of day.
    pub light_from_hour: usize,
}

/// Applies every recoding step to `table` using the embedded mappings.
/// Columns absent from the table are skipped.
///
/// # Errors
///
/// Returns [`CleanError`] if a table operation fails.
pub fn recode(table: &mut Table) -> Result<RecodeSummary, CleanError> {
    recode_with(table, &code_mappings())
}

/// Applies every recoding step to `table` using `mappings`.
///
/// # Errors
///
/// Returns [`CleanError`] if a table operation fails.
pub fn recode_with(
    table: &mut Table,
    mappings: &[CodeMapping],
) -> Result<RecodeSummary, CleanError> {
    let mut summary = RecodeSummary::default();

    if table.has_column(NUM_LANES_COLUMN) {
        numeric::clean_num_lanes(table, NUM_LANES_COLUMN)?;
    }
    if table.has_column(SPEED_LIMIT_COLUMN) {
        summary.speed_median = numeric::clean_speed_limit(table, SPEED_LIMIT_COLUMN)?;
    }

    for mapping in mappings {
        if !table.has_column(&mapping.column) {
            log::debug!("Column '{}' absent, not recoded", mapping.column);
            continue;
        }
        if mapping.column == LIGHT_COLUMN {
            summary.light_from_hour = recode_light(table, mapping)?;
            continue;
        }

        let mut unmapped = 0_usize;
        table.map_column(&mapping.column, |cell| {
            if matches!(mapping.lookup(cell), Lookup::Unmapped | Lookup::Unparseable) {
                unmapped += 1;
            }
            mapping.apply(cell)
        })?;
        if unmapped > 0 {
            summary.unmapped.insert(mapping.column.clone(), unmapped);
        }
    }

    for column in COORDINATE_COLUMNS {
        if table.has_column(column) {
            numeric::clean_coordinate(table, column)?;
        }
    }
    for column in INTEGER_COLUMNS {
        if table.has_column(column) {
            numeric::clean_integer(table, column)?;
        }
    }

    for (column, count) in &summary.unmapped {
        log::debug!("{column}: {count} unknown code(s) set to null");
    }
    Ok(summary)
}

/// Recodes the light column, deriving the period from the hour of day for
/// every cell that holds no known code. Returns how many cells were
/// derived from the hour.
fn recode_light(table: &mut Table, mapping: &CodeMapping) -> Result<usize, CleanError> {
    let light_idx = table.require_column(LIGHT_COLUMN)?;
    let hour_idx = table.column_index(HOUR_COLUMN);

    let mut derived = 0_usize;
    let values: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            let cell = &row[light_idx];
            if let Lookup::Label(label) = mapping.lookup(cell) {
                return Value::String(label.to_owned());
            }
            let hour = hour_idx
                .and_then(|i| parse_i64(&row[i]))
                .and_then(|h| u32::try_from(h).ok())
                .filter(|h| *h <= 23);
            hour.map_or(Value::Null, |h| {
                derived += 1;
                Value::String(LightPeriod::from_hour(h).to_string())
            })
        })
        .collect();

    table.set_column(LIGHT_COLUMN, values);
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(columns: &[&str], rows: &[Vec<Value>]) -> Table {
        Table::from_rows(
            columns.iter().map(|c| (*c).to_owned()).collect(),
            rows.to_vec(),
        )
    }

    #[test]
    fn missing_light_follows_the_hour() {
        let mut t = table(
            &["hour", "light_conditions"],
            &[
                vec![json!(22), Value::Null],
                vec![json!(8), json!("-1")],
                vec![json!(6), Value::Null],
                vec![Value::Null, Value::Null],
                vec![json!(22), json!("1")],
            ],
        );
        let summary = recode(&mut t).unwrap();
        assert_eq!(t.get(0, "light_conditions"), Some(&json!("Night")));
        assert_eq!(t.get(1, "light_conditions"), Some(&json!("Day")));
        assert_eq!(t.get(2, "light_conditions"), Some(&json!("Twilight")));
        assert_eq!(t.get(3, "light_conditions"), Some(&Value::Null));
        assert_eq!(t.get(4, "light_conditions"), Some(&json!("Day")));
        assert_eq!(summary.light_from_hour, 3);
    }

    #[test]
    fn categorical_policy_applies_per_column() {
        let mut t = table(
            &["weather", "injury_severity", "sex"],
            &[
                vec![json!("2"), json!("4"), json!("2")],
                vec![json!("-1"), json!("-1"), json!("-1")],
                vec![json!("77"), json!("x"), Value::Null],
            ],
        );
        let summary = recode(&mut t).unwrap();

        assert_eq!(t.rows()[0], [json!("Rain"), json!("Light injury"), json!("Female")]);
        assert_eq!(t.rows()[1], [json!("Normal"), Value::Null, json!("Male")]);
        assert_eq!(t.rows()[2], [Value::Null, Value::Null, Value::Null]);
        assert_eq!(summary.unmapped.get("weather"), Some(&1));
        assert_eq!(summary.unmapped.get("injury_severity"), Some(&1));
        assert_eq!(summary.unmapped.get("sex"), None);
    }

    #[test]
    fn numeric_columns_are_cleaned() {
        let mut t = table(
            &[
                "num_lanes",
                "speed_limit",
                "latitude",
                "longitude",
                "birth_year",
                "users_involved",
            ],
            &[
                vec![
                    json!("0"),
                    json!("250"),
                    json!("48,85"),
                    json!("2,35"),
                    json!("1980"),
                    json!(2),
                ],
                vec![
                    json!("3"),
                    json!("50"),
                    json!(""),
                    json!("2,30"),
                    json!("?"),
                    json!(1),
                ],
                vec![
                    json!(""),
                    json!("90"),
                    json!("48,80"),
                    Value::Null,
                    Value::Null,
                    json!(3),
                ],
            ],
        );
        let summary = recode(&mut t).unwrap();

        assert_eq!(summary.speed_median, Some(70.0));
        assert_eq!(t.rows()[0][0], json!(2));
        assert_eq!(t.rows()[0][1], json!(70));
        assert_eq!(t.rows()[0][2], json!(48.85));
        assert_eq!(t.rows()[1][2], Value::Null);
        assert_eq!(t.rows()[1][4], Value::Null);
        assert_eq!(t.rows()[2][0], json!(2));
        assert_eq!(t.rows()[2][5], json!(3));
    }

    #[test]
    fn absent_columns_are_skipped() {
        let mut t = table(&["custom"], &[vec![json!("1")]]);
        let summary = recode(&mut t).unwrap();
        assert_eq!(summary, RecodeSummary::default());
        assert_eq!(t.get(0, "custom"), Some(&json!("1")));
    }
}
