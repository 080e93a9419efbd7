//! Numeric column cleanups: lane counts, speed limits, coordinates and
//! plain integer columns.

use road_accidents_table::Table;
use road_accidents_table::cell::{float_cell, parse_f64, parse_i64};
use serde_json::Value;

use crate::CleanError;
use crate::parsing::parse_decimal_comma;

/// Lane count assumed when the raw value is missing or below one.
pub const DEFAULT_NUM_LANES: i64 = 2;

/// Speed limit assumed for missing and non-positive values.
pub const DEFAULT_SPEED_LIMIT: i64 = 50;

/// Highest legal speed limit.
pub const MAX_SPEED_LIMIT: f64 = 130.0;

/// Rounded speeds at or above this value are treated as data entry errors
/// and replaced by the median.
pub const IMPLAUSIBLE_SPEED_LIMIT: f64 = 200.0;

/// Rounds to the nearest multiple of ten, halves away from zero.
#[must_use]
pub fn round_to_ten(value: f64) -> f64 {
    (value / 10.0).round() * 10.0
}

/// Median of `values`, averaging the two middle elements of an even-length
/// input. Returns `None` for an empty input.
#[must_use]
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some(f64::midpoint(values[mid - 1], values[mid]))
    } else {
        Some(values[mid])
    }
}

/// Converts a speed already known to lie in `[1, 130]` to an integer.
#[allow(clippy::cast_possible_truncation)]
fn speed_cell(value: f64) -> Value {
    Value::from(value as i64)
}

/// Cleans the lane count: unparseable values become `-1`, then anything
/// below one becomes [`DEFAULT_NUM_LANES`].
///
/// # Errors
///
/// Returns [`CleanError::Table`] if the column is absent.
pub fn clean_num_lanes(table: &mut Table, column: &str) -> Result<(), CleanError> {
    table.map_column(column, |cell| {
        let lanes = parse_i64(cell).unwrap_or(-1);
        Value::from(if lanes < 1 { DEFAULT_NUM_LANES } else { lanes })
    })?;
    Ok(())
}

/// Cleans the speed limit column and returns the imputation median, if one
/// was computed.
///
/// Values are rounded to the nearest ten. Values between 130 and 200 are
/// clamped to 130. Values of 200 and above are replaced by the median of
/// every non-missing value at most 130 at that point, rounded to ten (or
/// left missing when no such value exists). Finally values below one and
/// missing values become [`DEFAULT_SPEED_LIMIT`].
///
/// # Errors
///
/// Returns [`CleanError::Table`] if the column is absent.
pub fn clean_speed_limit(table: &mut Table, column: &str) -> Result<Option<f64>, CleanError> {
    let mut speeds: Vec<Option<f64>> = table
        .column_values(column)?
        .into_iter()
        .map(|cell| parse_f64(cell).map(round_to_ten))
        .collect();

    for speed in speeds.iter_mut().flatten() {
        if *speed > MAX_SPEED_LIMIT && *speed < IMPLAUSIBLE_SPEED_LIMIT {
            *speed = MAX_SPEED_LIMIT;
        }
    }

    let mut plausible: Vec<f64> = speeds
        .iter()
        .flatten()
        .copied()
        .filter(|s| *s <= MAX_SPEED_LIMIT)
        .collect();
    let imputed = median(&mut plausible).map(round_to_ten);

    let mut replaced = 0_usize;
    for speed in &mut speeds {
        if speed.is_some_and(|s| s >= IMPLAUSIBLE_SPEED_LIMIT) {
            *speed = imputed;
            replaced += 1;
        }
    }
    if replaced > 0 {
        log::debug!("Replaced {replaced} implausible speed limit(s) with {imputed:?}");
    }

    let cleaned: Vec<Value> = speeds
        .into_iter()
        .map(|speed| match speed {
            Some(s) if s >= 1.0 => speed_cell(s),
            _ => Value::from(DEFAULT_SPEED_LIMIT),
        })
        .collect();
    table.set_column(column, cleaned);
    Ok(imputed)
}

/// Converts a decimal-comma coordinate column to floats.
///
/// # Errors
///
/// Returns [`CleanError::Table`] if the column is absent.
pub fn clean_coordinate(table: &mut Table, column: &str) -> Result<(), CleanError> {
    table.map_column(column, |cell| {
        parse_decimal_comma(cell).map_or(Value::Null, float_cell)
    })?;
    Ok(())
}

/// Converts a column to integers; unparseable cells become null.
///
/// # Errors
///
/// Returns [`CleanError::Table`] if the column is absent.
pub fn clean_integer(table: &mut Table, column: &str) -> Result<(), CleanError> {
    table.map_column(column, |cell| parse_i64(cell).map_or(Value::Null, Value::from))?;
    Ok(())
}
