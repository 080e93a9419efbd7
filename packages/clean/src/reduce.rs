//! Per-accident reduction of the users table.
//!
//! Each accident keeps a single user row: the one with the highest raw
//! severity code. Which row survives when several share that maximum is
//! unspecified; callers must only rely on the surviving severity being the
//! group maximum.

use std::collections::BTreeMap;

use road_accidents_accident_models::{ACCIDENT_ID_COLUMN, RAW_SEVERITY_COLUMN};
use road_accidents_table::Table;
use road_accidents_table::cell::{as_text, parse_i64};
use serde_json::Value;

use crate::{CleanError, require_column};

/// Column holding the number of user rows of each accident.
pub const USERS_INVOLVED_COLUMN: &str = "users_involved";

const STEP: &str = "reduce";

/// Running state of one accident group.
struct Group {
    count: i64,
    best_row: usize,
    best_severity: Option<i64>,
}

/// Returns `true` if `candidate` should replace `current` as the group's
/// worst outcome. Parseable codes always beat unparseable ones.
const fn beats(candidate: Option<i64>, current: Option<i64>) -> bool {
    match (candidate, current) {
        (Some(c), Some(cur)) => c > cur,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Collapses the users table to one row per accident.
///
/// The output has the input's columns plus [`USERS_INVOLVED_COLUMN`], one
/// row per distinct accident identifier, ordered by identifier. Rows with
/// a null identifier are not grouped and do not count.
///
/// # Errors
///
/// Returns [`CleanError::Schema`] if the identifier or severity column is
/// absent.
pub fn reduce_users(users: &Table) -> Result<Table, CleanError> {
    let key_idx = require_column(users, ACCIDENT_ID_COLUMN, STEP)?;
    let severity_idx = require_column(users, RAW_SEVERITY_COLUMN, STEP)?;

    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut ungrouped = 0_usize;

    for (row_idx, row) in users.rows().iter().enumerate() {
        let Some(key) = as_text(&row[key_idx]) else {
            ungrouped += 1;
            continue;
        };
        let severity = parse_i64(&row[severity_idx]);

        let group = groups.entry(key).or_insert(Group {
            count: 0,
            best_row: row_idx,
            best_severity: severity,
        });
        group.count += 1;
        if beats(severity, group.best_severity) {
            group.best_row = row_idx;
            group.best_severity = severity;
        }
    }

    if ungrouped > 0 {
        log::warn!("{ungrouped} user row(s) without an accident identifier were ignored");
    }

    let mut columns = users.columns().to_vec();
    columns.push(USERS_INVOLVED_COLUMN.to_owned());

    let mut reduced = Table::new(columns);
    for group in groups.values() {
        let mut row = users.rows()[group.best_row].clone();
        row.push(Value::from(group.count));
        reduced.push_row(row);
    }

    log::info!(
        "Reduced {} user rows to {} accidents",
        users.len(),
        reduced.len()
    );
    Ok(reduced)
}
