//! Restriction of the dataset to the Île-de-France departments.

use std::collections::BTreeMap;

use road_accidents_geography_models::departments::{
    department_name, is_ile_de_france, parse_numeric_code,
};
use road_accidents_table::Table;
use road_accidents_table::cell::as_text;
use serde_json::Value;

use crate::{CleanError, require_column};

/// Department column name after renaming.
pub const DEPARTMENT_COLUMN: &str = "department";

const STEP: &str = "geo_filter";

/// Keeps rows whose department is a purely numeric code inside the
/// Île-de-France allow-set, converting the department to an integer.
/// Alphanumeric codes such as `2A`/`2B` are dropped before conversion.
/// Returns the number of removed rows.
///
/// # Errors
///
/// Returns [`CleanError::Schema`] if the department column is absent.
pub fn filter_departments(table: &mut Table) -> Result<usize, CleanError> {
    let idx = require_column(table, DEPARTMENT_COLUMN, STEP)?;

    let removed = table.retain_rows(|row| {
        as_text(&row[idx])
            .and_then(|code| parse_numeric_code(&code))
            .is_some_and(is_ile_de_france)
    });
    table.map_column(DEPARTMENT_COLUMN, |cell| {
        as_text(cell)
            .and_then(|code| parse_numeric_code(&code))
            .map_or(Value::Null, Value::from)
    })?;

    let mut per_department: BTreeMap<u32, usize> = BTreeMap::new();
    for row in table.rows() {
        if let Some(code) = row[idx].as_u64().and_then(|c| u32::try_from(c).ok()) {
            *per_department.entry(code).or_default() += 1;
        }
    }
    for (code, count) in &per_department {
        log::debug!("  {code} {}: {count} row(s)", department_name(*code));
    }
    log::debug!("Kept {} row(s), removed {removed}", table.len());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use road_accidents_geography_models::departments::ILE_DE_FRANCE;
    use serde_json::json;

    use super::*;

    fn departments(codes: &[Value]) -> Table {
        Table::from_rows(
            vec!["department".to_owned()],
            codes.iter().map(|c| vec![c.clone()]).collect(),
        )
    }

    #[test]
    fn keeps_paris_and_drops_corsica() {
        let mut table = departments(&[json!("2B"), json!("75"), json!("2A")]);
        let removed = filter_departments(&mut table).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "department"), Some(&json!(75)));
    }

    #[test]
    fn every_kept_department_is_in_the_allow_set() {
        let mut table = departments(&[
            json!("13"),
            json!("92"),
            json!("971"),
            json!(" 93"),
            Value::Null,
            json!("95"),
            json!("7 5"),
            json!("077"),
        ]);
        filter_departments(&mut table).unwrap();
        let kept: Vec<i64> = table
            .rows()
            .iter()
            .map(|r| r[0].as_i64().unwrap())
            .collect();
        assert_eq!(kept, [92, 93, 95, 77]);
        for code in kept {
            assert!(ILE_DE_FRANCE.contains(&u32::try_from(code).unwrap()));
        }
    }

    #[test]
    fn missing_department_is_a_schema_error() {
        let mut table = Table::new(vec!["hour".to_owned()]);
        assert!(matches!(
            filter_departments(&mut table),
            Err(CleanError::Schema { .. })
        ));
    }
}
