#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Raw accident source definitions and loading.
//!
//! The national accident database is published as one semicolon-separated
//! file per year for each of three logical sources. [`loader`] discovers
//! those partitions in an explicitly configured directory and concatenates
//! them into one [`Table`](road_accidents_table::Table) per source.

pub mod loader;
pub mod progress;

use std::path::PathBuf;

use road_accidents_table::TableError;
use strum_macros::Display;

/// Errors that can occur while loading raw sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No partition file matched a required source prefix.
    #[error("No files found for prefix '{prefix}' in {}", dir.display())]
    MissingSource {
        /// File name prefix that matched nothing.
        prefix: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// I/O error (directory listing, file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A partition could not be parsed.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// One of the three logical raw sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RawSource {
    /// Accident-level characteristics: date, time, light, location.
    Characteristics,
    /// Road and place attributes of the accident site.
    Places,
    /// One row per person involved.
    Users,
}

impl RawSource {
    /// Returns the file name prefix of this source's yearly partitions
    /// (e.g. `caracteristiques-2021.csv`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Characteristics => "caracteristiques",
            Self::Places => "lieux",
            Self::Users => "usagers",
        }
    }

    /// Returns all variants of this enum in loading order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Characteristics, Self::Places, Self::Users]
    }
}

/// Where raw partitions are read from.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory containing the `<prefix>-<year>.csv` files.
    pub data_dir: PathBuf,
    /// Field delimiter of the raw files.
    pub delimiter: u8,
}

impl LoadOptions {
    /// Creates options for a data directory with the standard `;`
    /// delimiter.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            delimiter: b';',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_distinct() {
        let mut prefixes: Vec<&str> = RawSource::all().iter().map(|s| s.prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), RawSource::all().len());
    }

    #[test]
    fn source_names_are_snake_case() {
        let names: Vec<String> = RawSource::all().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["characteristics", "places", "users"]);
    }

    #[test]
    fn missing_source_message_names_prefix_and_dir() {
        let err = SourceError::MissingSource {
            prefix: "lieux".to_owned(),
            dir: PathBuf::from("/data"),
        };
        assert_eq!(err.to_string(), "No files found for prefix 'lieux' in /data");
    }
}
