//! Yearly partition discovery and concatenation.

use std::path::{Path, PathBuf};

use road_accidents_table::Table;
use road_accidents_table::csv_io::read_delimited;

use crate::{LoadOptions, RawSource, SourceError};

/// The three raw tables of one run.
#[derive(Debug, Clone)]
pub struct RawTables {
    /// Accident characteristics.
    pub characteristics: Table,
    /// Place attributes.
    pub places: Table,
    /// Per-person user records.
    pub users: Table,
}

/// Returns `true` if `file_name` is a partition of the source with
/// `prefix`, i.e. `<prefix>-<year>.csv` where `<year>` is all digits.
#[must_use]
pub fn is_partition_file(file_name: &str, prefix: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
    else {
        return false;
    };
    let Some((year, ext)) = rest.rsplit_once('.') else {
        return false;
    };
    !year.is_empty() && year.bytes().all(|b| b.is_ascii_digit()) && ext.eq_ignore_ascii_case("csv")
}

/// Lists the partition files of a source in lexicographic file name order.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the directory cannot be read, or
/// [`SourceError::MissingSource`] if no file matches.
pub fn discover_partitions(dir: &Path, source: RawSource) -> Result<Vec<PathBuf>, SourceError> {
    let prefix = source.prefix();
    let mut files: Vec<(String, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_partition_file(&name, prefix) {
            files.push((name, entry.path()));
        }
    }

    if files.is_empty() {
        return Err(SourceError::MissingSource {
            prefix: prefix.to_owned(),
            dir: dir.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Loads every yearly partition of a source and concatenates them into one
/// table. Row positions are renumbered; columns are the union of all
/// partitions' headers.
///
/// # Errors
///
/// Returns [`SourceError`] if no partition exists or one cannot be read.
pub fn load_all_years(options: &LoadOptions, source: RawSource) -> Result<Table, SourceError> {
    let files = discover_partitions(&options.data_dir, source)?;

    let mut partitions = Vec::with_capacity(files.len());
    for path in &files {
        log::info!(
            "[{source}] Loading {}",
            path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned()
            )
        );
        partitions.push(read_delimited(path, options.delimiter)?);
    }

    let table = Table::concat(partitions);
    log::info!(
        "[{source}] Loaded {} rows from {} file(s)",
        table.len(),
        files.len()
    );
    Ok(table)
}

/// Loads all three raw sources.
///
/// # Errors
///
/// Returns [`SourceError`] on the first source that fails to load.
pub fn load_raw_tables(options: &LoadOptions) -> Result<RawTables, SourceError> {
    Ok(RawTables {
        characteristics: load_all_years(options, RawSource::Characteristics)?,
        places: load_all_years(options, RawSource::Places)?,
        users: load_all_years(options, RawSource::Users)?,
    })
}
