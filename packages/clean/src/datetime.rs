//! Calendar date, weekday and hour derivation.

use chrono::{Datelike, NaiveDate, Weekday};
use road_accidents_table::Table;
use road_accidents_table::cell::{as_text, parse_i64};
use serde_json::Value;

use crate::parsing::parse_hour;
use crate::{CleanError, require_column};

/// Derived calendar date column (`YYYY-MM-DD`).
pub const DATE_COLUMN: &str = "date";
/// Derived English weekday name column.
pub const DAY_OF_WEEK_COLUMN: &str = "day_of_week";
/// Derived hour-of-day column.
pub const HOUR_COLUMN: &str = "hour";

const YEAR_COLUMN: &str = "year";
const MONTH_COLUMN: &str = "month";
const DAY_COLUMN: &str = "day";
const HOUR_MINUTE_COLUMN: &str = "hour_minute";

const STEP: &str = "derive_datetime";

/// English name of a weekday.
#[must_use]
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn calendar_date(year: &Value, month: &Value, day: &Value) -> Option<NaiveDate> {
    let year = i32::try_from(parse_i64(year)?).ok()?;
    let month = u32::try_from(parse_i64(month)?).ok()?;
    let day = u32::try_from(parse_i64(day)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Builds `date`, `day_of_week` and `hour` from the split date and time
/// columns, then drops the split columns.
///
/// Rows whose date is missing or invalid are dropped. An absent or
/// unparseable time leaves `hour` null. The three derived columns are
/// moved to the front. Returns the number of dropped rows.
///
/// # Errors
///
/// Returns [`CleanError::Schema`] if `year`, `month` or `day` is absent.
pub fn derive_date_time(table: &mut Table) -> Result<usize, CleanError> {
    let year_idx = require_column(table, YEAR_COLUMN, STEP)?;
    let month_idx = require_column(table, MONTH_COLUMN, STEP)?;
    let day_idx = require_column(table, DAY_COLUMN, STEP)?;
    let time_idx = table.column_index(HOUR_MINUTE_COLUMN);

    let before = table.len();
    let (columns, rows) = std::mem::take(table).into_parts();
    let mut derived = Table::new(columns);
    let mut dates = Vec::with_capacity(rows.len());
    let mut weekdays = Vec::with_capacity(rows.len());
    let mut hours = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(date) = calendar_date(&row[year_idx], &row[month_idx], &row[day_idx]) else {
            continue;
        };
        let hour = time_idx
            .and_then(|i| as_text(&row[i]))
            .and_then(|t| parse_hour(&t));

        dates.push(Value::String(date.to_string()));
        weekdays.push(Value::String(weekday_name(date.weekday()).to_owned()));
        hours.push(hour.map_or(Value::Null, Value::from));
        derived.push_row(row);
    }

    derived.set_column(DATE_COLUMN, dates);
    derived.set_column(DAY_OF_WEEK_COLUMN, weekdays);
    derived.set_column(HOUR_COLUMN, hours);
    derived.drop_columns(&[YEAR_COLUMN, MONTH_COLUMN, DAY_COLUMN, HOUR_MINUTE_COLUMN]);
    derived.move_to_front(&[DATE_COLUMN, DAY_OF_WEEK_COLUMN, HOUR_COLUMN]);

    let dropped = before - derived.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} row(s) with a missing or invalid date");
    }
    *table = derived;
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(rows: &[[&str; 4]]) -> Table {
        Table::from_rows(
            vec![
                "weather".to_owned(),
                "day".to_owned(),
                "month".to_owned(),
                "year".to_owned(),
                "hour_minute".to_owned(),
            ],
            rows.iter()
                .map(|[d, m, y, t]| vec![json!("1"), json!(d), json!(m), json!(y), json!(t)])
                .collect(),
        )
    }

    #[test]
    fn derives_date_weekday_and_hour() {
        let mut t = table(&[["14", "07", "2021", "22:15"]]);
        let dropped = derive_date_time(&mut t).unwrap();
        assert_eq!(dropped, 0);
        assert_eq!(t.columns(), ["date", "day_of_week", "hour", "weather"]);
        assert_eq!(t.get(0, "date"), Some(&json!("2021-07-14")));
        assert_eq!(t.get(0, "day_of_week"), Some(&json!("Wednesday")));
        assert_eq!(t.get(0, "hour"), Some(&json!(22)));
    }

    #[test]
    fn drops_invalid_dates() {
        let mut t = table(&[
            ["31", "02", "2021", "08:00"],
            ["01", "03", "2021", "08:00"],
            ["", "03", "2021", "08:00"],
        ]);
        let dropped = derive_date_time(&mut t).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(0, "date"), Some(&json!("2021-03-01")));
    }

    #[test]
    fn out_of_range_hour_is_null() {
        let mut t = table(&[["01", "01", "2020", "25:00"]]);
        derive_date_time(&mut t).unwrap();
        assert_eq!(t.get(0, "hour"), Some(&Value::Null));
    }

    #[test]
    fn missing_year_is_a_schema_error() {
        let mut t = Table::from_rows(vec!["day".to_owned(), "month".to_owned()], vec![]);
        let err = derive_date_time(&mut t).unwrap_err();
        assert!(matches!(err, CleanError::Schema { ref column, .. } if column == "year"));
    }
}
