//! Delimited-file reading and writing for [`Table`].
//!
//! Every field is read as a trimmed string; empty fields become null.
//! Older yearly exports are Latin-1 encoded, so bytes that are not valid
//! UTF-8 are decoded lossily instead of failing the whole file.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::cell::{as_text, text_cell};
use crate::{Table, TableError};

/// Reads a delimited file with a header row into a [`Table`].
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be opened or parsed.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let file = File::open(path)?;
    let table = read_delimited_from(file, delimiter)?;
    log::debug!("Parsed {} from {}", table.shape(), path.display());
    Ok(table)
}

/// Reads delimited data with a header row from any reader.
///
/// Rows with fewer fields than the header are padded with nulls.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if the data cannot be parsed.
pub fn read_delimited_from<R: Read>(reader: R, delimiter: u8) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_owned())
        .collect();

    let mut table = Table::new(headers);
    for result in reader.byte_records() {
        let record = result?;
        let row: Vec<Value> = record
            .iter()
            .map(|field| text_cell(String::from_utf8_lossy(field).trim()))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Writes a table as comma-separated values with a header row, replacing
/// any existing file and creating parent directories as needed.
///
/// Nulls are written as empty fields.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be created or written.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_csv_to(table, file)?;
    log::debug!("Wrote {} to {}", table.shape(), path.display());
    Ok(())
}

/// Writes a table as comma-separated values to any writer.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if writing fails.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| as_text(cell).unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}
