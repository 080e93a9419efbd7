#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Raw-to-clean transformation of yearly road accident records.
//!
//! The pipeline is a strict linear sequence of table transformations:
//!
//! | Step | Module |
//! |------|--------|
//! | collapse users to the worst outcome per accident | [`reduce`] |
//! | left-join places, users and characteristics | [`merge`] |
//! | rename raw coded columns | [`schema`] |
//! | build `date`, `day_of_week`, `hour` | [`datetime`] |
//! | drop uninformative columns | [`prune`] |
//! | recode categories and clean numeric columns | [`recode`] |
//! | keep one metropolitan subregion | [`geo`] |
//! | drop duplicate rows | [`dedup`] |
//!
//! [`pipeline`] chains them, starting from the raw files and ending with
//! the written clean table. Any failure aborts the run before output is
//! written.

pub mod datetime;
pub mod dedup;
pub mod geo;
pub mod merge;
pub mod parsing;
pub mod pipeline;
pub mod prune;
pub mod recode;
pub mod reduce;
pub mod schema;

use road_accidents_source::SourceError;
use road_accidents_table::{Table, TableError};

/// Errors that can occur while cleaning.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// A column a step depends on is absent.
    #[error("Schema error in {step}: missing column '{column}'")]
    Schema {
        /// Pipeline step that needed the column.
        step: &'static str,
        /// Name of the absent column.
        column: String,
    },

    /// Loading the raw sources failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A table operation failed.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Returns the position of `column` in `table`, or a [`CleanError::Schema`]
/// attributed to `step`.
pub(crate) fn require_column(
    table: &Table,
    column: &str,
    step: &'static str,
) -> Result<usize, CleanError> {
    table.column_index(column).ok_or_else(|| CleanError::Schema {
        step,
        column: column.to_owned(),
    })
}
