//! Left joins between tables on a single key column.

use std::collections::HashMap;

use serde_json::Value;

use crate::cell::as_text;
use crate::{Table, TableError};

/// Suffix appended to a left-hand column whose name collides with a
/// right-hand column.
pub const LEFT_SUFFIX: &str = "_x";

/// Suffix appended to a right-hand column whose name collides with a
/// left-hand column.
pub const RIGHT_SUFFIX: &str = "_y";

/// Left-joins `right` onto `left` on the column `key`.
///
/// Every `left` row is kept. A row with no match in `right` gets null
/// cells for the right-hand columns; a row with several matches is repeated
/// once per match. Right rows that match nothing are dropped. Keys are
/// compared by their textual form and null keys never match.
///
/// The output holds the left columns followed by the right columns minus
/// the key. Non-key names present on both sides get [`LEFT_SUFFIX`] and
/// [`RIGHT_SUFFIX`].
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if either table lacks `key`.
pub fn left_join(left: &Table, right: &Table, key: &str) -> Result<Table, TableError> {
    let left_key = left.require_column(key)?;
    let right_key = right.require_column(key)?;

    let right_columns: Vec<usize> = (0..right.width()).filter(|&i| i != right_key).collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .map(|c| {
            if c != key && right.has_column(c) {
                format!("{c}{LEFT_SUFFIX}")
            } else {
                c.clone()
            }
        })
        .collect();
    for &i in &right_columns {
        let name = &right.columns()[i];
        if left.has_column(name) {
            columns.push(format!("{name}{RIGHT_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows().iter().enumerate() {
        if let Some(k) = as_text(&row[right_key]) {
            index.entry(k).or_default().push(row_idx);
        }
    }

    let mut out = Table::new(columns);
    let empty = vec![Value::Null; right_columns.len()];
    let mut unmatched = 0_usize;

    for row in left.rows() {
        let matches = as_text(&row[left_key]).and_then(|k| index.get(&k));
        match matches {
            Some(matches) => {
                for &m in matches {
                    let right_row = &right.rows()[m];
                    let mut merged = row.clone();
                    merged.extend(right_columns.iter().map(|&i| right_row[i].clone()));
                    out.push_row(merged);
                }
            }
            None => {
                unmatched += 1;
                let mut merged = row.clone();
                merged.extend(empty.iter().cloned());
                out.push_row(merged);
            }
        }
    }

    log::debug!(
        "Left join on '{key}': {} left rows, {} right rows, {unmatched} unmatched -> {}",
        left.len(),
        right.len(),
        out.shape()
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(columns.iter().map(|s| (*s).to_owned()).collect(), rows)
    }

    #[test]
    fn keeps_every_left_row() {
        let places = table(
            &["Num_Acc", "catr"],
            vec![
                vec![json!("1"), json!("3")],
                vec![json!("2"), json!("4")],
                vec![json!("3"), json!("1")],
            ],
        );
        let users = table(
            &["Num_Acc", "grav"],
            vec![vec![json!("1"), json!("2")], vec![json!("9"), json!("4")]],
        );

        let merged = left_join(&places, &users, "Num_Acc").unwrap();
        assert_eq!(merged.len(), places.len());
        assert_eq!(merged.columns(), ["Num_Acc", "catr", "grav"]);
        assert_eq!(merged.get(0, "grav"), Some(&json!("2")));
        assert_eq!(merged.get(1, "grav"), Some(&Value::Null));
        assert_eq!(merged.get(2, "grav"), Some(&Value::Null));
    }

    #[test]
    fn repeats_rows_for_multiple_matches() {
        let left = table(&["k"], vec![vec![json!("a")]]);
        let right = table(
            &["k", "v"],
            vec![vec![json!("a"), json!(1)], vec![json!("a"), json!(2)]],
        );
        let merged = left_join(&left, &right, "k").unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn matches_string_and_number_keys() {
        let left = table(&["k"], vec![vec![json!("12")]]);
        let right = table(&["k", "v"], vec![vec![json!(12), json!("x")]]);
        let merged = left_join(&left, &right, "k").unwrap();
        assert_eq!(merged.get(0, "v"), Some(&json!("x")));
    }

    #[test]
    fn null_keys_never_match() {
        let left = table(&["k"], vec![vec![Value::Null]]);
        let right = table(&["k", "v"], vec![vec![Value::Null, json!("x")]]);
        let merged = left_join(&left, &right, "k").unwrap();
        assert_eq!(merged.get(0, "v"), Some(&Value::Null));
    }

    #[test]
    fn suffixes_colliding_columns() {
        let left = table(&["k", "v"], vec![vec![json!("a"), json!(1)]]);
        let right = table(&["k", "v"], vec![vec![json!("a"), json!(2)]]);
        let merged = left_join(&left, &right, "k").unwrap();
        assert_eq!(merged.columns(), ["k", "v_x", "v_y"]);
    }

    #[test]
    fn missing_key_is_an_error() {
        let left = table(&["k"], vec![]);
        let right = table(&["other"], vec![]);
        assert!(matches!(
            left_join(&left, &right, "k"),
            Err(TableError::MissingColumn { column }) if column == "k"
        ));
    }
}
