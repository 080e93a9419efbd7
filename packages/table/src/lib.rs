#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory tabular data for the accident cleaning pipeline.
//!
//! A [`Table`] is an ordered list of column names plus rows of
//! [`serde_json::Value`] cells. Raw files are read as strings and each
//! pipeline step converts the columns it owns to integers, floats or
//! labels, so a single table may mix cell types within a column while it
//! is being cleaned.

pub mod cell;
pub mod csv_io;
pub mod join;

use std::collections::HashSet;

use serde_json::Value;

/// Errors that can occur while manipulating tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A column required by an operation is absent.
    #[error("Missing column '{column}'")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// An ordered, column-named collection of rows.
///
/// Every row has exactly one cell per column; constructors pad short rows
/// with nulls and truncate long ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from column names and rows.
    #[must_use]
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Consumes the table, returning its columns and rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if a column with this name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the position of a column, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if no column has this name.
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_owned(),
            })
    }

    /// Returns the cell at `row` in the named column, if both exist.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Returns every cell of a column in row order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if no column has this name.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>, TableError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Appends a row, padding with nulls or truncating to the table width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Appends a column. `values` is padded with nulls or truncated to the
    /// row count. An existing column with the same name is replaced in
    /// place.
    pub fn set_column(&mut self, name: &str, mut values: Vec<Value>) {
        values.resize(self.rows.len(), Value::Null);
        if let Some(idx) = self.column_index(name) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
            return;
        }
        self.columns.push(name.to_owned());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Renames columns according to `(from, to)` pairs. Columns that are not
    /// listed keep their names and pairs whose source is absent are
    /// ignored. Returns how many columns were renamed.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) -> usize {
        let mut renamed = 0;
        for column in &mut self.columns {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.as_str()) {
                *column = (*to).to_owned();
                renamed += 1;
            }
        }
        renamed
    }

    /// Removes the named columns, ignoring names that are absent. Returns
    /// how many columns were removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> usize {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_by_mask(std::mem::take(row), &keep);
        }
        removed
    }

    /// Moves the named columns to the front, in the given order. Names that
    /// are absent are skipped; the remaining columns keep their relative
    /// order.
    pub fn move_to_front(&mut self, names: &[&str]) {
        let mut order: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        for idx in 0..self.columns.len() {
            if !order.contains(&idx) {
                order.push(idx);
            }
        }

        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = order.iter().map(|&i| row[i].clone()).collect();
        }
    }

    /// Replaces every cell of a column with `f(cell)`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if no column has this name.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), TableError>
    where
        F: FnMut(&Value) -> Value,
    {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(())
    }

    /// Keeps only rows for which `predicate` returns `true`. Returns how
    /// many rows were removed.
    pub fn retain_rows<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| predicate(row));
        before - self.rows.len()
    }

    /// Removes rows that are equal across every column, keeping the first
    /// occurrence. Returns how many rows were removed.
    pub fn dedup_rows(&mut self) -> usize {
        let mut seen: HashSet<String> = HashSet::with_capacity(self.rows.len());
        self.retain_rows(|row| seen.insert(row_key(row)))
    }

    /// Concatenates tables vertically.
    ///
    /// The result's columns are the union of all inputs' columns in
    /// first-seen order. Cells for columns a table lacks are null.
    #[must_use]
    pub fn concat(tables: Vec<Self>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut out = Self::new(columns);
        for table in tables {
            let positions: Vec<usize> = table
                .columns
                .iter()
                .map(|c| out.columns.iter().position(|o| o == c).unwrap_or(0))
                .collect();
            for row in table.rows {
                let mut merged = vec![Value::Null; out.columns.len()];
                for (value, &pos) in row.into_iter().zip(&positions) {
                    merged[pos] = value;
                }
                out.rows.push(merged);
            }
        }
        out
    }

    /// Returns a short `rows × columns` description for log lines.
    #[must_use]
    pub fn shape(&self) -> String {
        format!("{} rows × {} columns", self.len(), self.width())
    }
}

/// Keeps the elements of `items` whose mask entry is `true`.
fn retain_by_mask<T>(items: Vec<T>, mask: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(mask)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

/// Serializes a row into a hashable key for full-row equality.
fn row_key(row: &[Value]) -> String {
    Value::Array(row.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn sample() -> Table {
        Table::from_rows(
            cols(&["a", "b", "c"]),
            vec![
                vec![json!("1"), json!("x"), json!(10)],
                vec![json!("2"), json!("y"), json!(20)],
                vec![json!("1"), json!("x"), json!(10)],
            ],
        )
    }

    #[test]
    fn pads_short_rows() {
        let table = Table::from_rows(cols(&["a", "b"]), vec![vec![json!("1")]]);
        assert_eq!(table.rows()[0], vec![json!("1"), Value::Null]);
    }

    #[test]
    fn renames_only_listed_columns() {
        let mut table = sample();
        let renamed = table.rename_columns(&[("a", "alpha"), ("zz", "ignored")]);
        assert_eq!(renamed, 1);
        assert_eq!(table.columns(), cols(&["alpha", "b", "c"]));
    }

    #[test]
    fn drops_columns_ignoring_absent() {
        let mut table = sample();
        let removed = table.drop_columns(&["b", "missing"]);
        assert_eq!(removed, 1);
        assert_eq!(table.columns(), cols(&["a", "c"]));
        assert_eq!(table.rows()[1], vec![json!("2"), json!(20)]);
    }

    #[test]
    fn moves_columns_to_front() {
        let mut table = sample();
        table.move_to_front(&["c", "nope", "b"]);
        assert_eq!(table.columns(), cols(&["c", "b", "a"]));
        assert_eq!(table.rows()[0], vec![json!(10), json!("x"), json!("1")]);
    }

    #[test]
    fn dedup_keeps_first_and_is_idempotent() {
        let mut table = sample();
        assert_eq!(table.dedup_rows(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.dedup_rows(), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn dedup_distinguishes_types() {
        let mut table = Table::from_rows(
            cols(&["a"]),
            vec![vec![json!("10")], vec![json!(10)], vec![Value::Null]],
        );
        assert_eq!(table.dedup_rows(), 0);
    }

    #[test]
    fn concat_unions_columns() {
        let first = Table::from_rows(cols(&["a", "b"]), vec![vec![json!("1"), json!("2")]]);
        let second = Table::from_rows(cols(&["b", "c"]), vec![vec![json!("3"), json!("4")]]);
        let table = Table::concat(vec![first, second]);
        assert_eq!(table.columns(), cols(&["a", "b", "c"]));
        assert_eq!(table.rows()[0], vec![json!("1"), json!("2"), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Null, json!("3"), json!("4")]);
    }

    #[test]
    fn set_column_replaces_or_appends() {
        let mut table = sample();
        table.set_column("d", vec![json!(1)]);
        assert_eq!(table.width(), 4);
        assert_eq!(table.get(0, "d"), Some(&json!(1)));
        assert_eq!(table.get(1, "d"), Some(&Value::Null));

        table.set_column("a", vec![json!("9"), json!("9"), json!("9")]);
        assert_eq!(table.width(), 4);
        assert_eq!(table.get(2, "a"), Some(&json!("9")));
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut table = sample();
        let err = table.map_column("zz", Value::clone).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn { column } if column == "zz"));
    }
}
