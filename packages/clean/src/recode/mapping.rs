//! Code-to-label tables loaded from the embedded `recode.toml`.
//!
//! Each entry names a column, the integer codes it recognizes, the
//! sentinel codes meaning "not recorded", and an optional default label
//! for sentinels. One generic routine ([`CodeMapping::apply`]) applies any
//! entry. The target table comes from [`InjurySeverity`] instead of the
//! file.

use std::collections::BTreeMap;

use road_accidents_accident_models::{InjurySeverity, TARGET_COLUMN};
use road_accidents_table::cell::parse_i64;
use serde::Deserialize;
use serde_json::Value;

/// Mapping tables embedded at compile time.
const RECODE_TOML: &str = include_str!("../../mappings/recode.toml");

/// Code the sources use for an unrecorded severity.
const SEVERITY_NOT_RECORDED: i64 = -1;

/// Number of recoded columns, target included (used in tests).
#[cfg(test)]
const EXPECTED_MAPPING_COUNT: usize = 18;

/// Errors that can occur while parsing mapping tables.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The TOML document is malformed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A key of a `codes` table is not an integer.
    #[error("Column '{column}': code '{code}' is not an integer")]
    InvalidCode {
        /// Column whose table holds the bad key.
        column: String,
        /// The offending key.
        code: String,
    },

    /// Two entries recode the same column.
    #[error("Column '{column}' is mapped more than once")]
    DuplicateColumn {
        /// The repeated column name.
        column: String,
    },
}

#[derive(Debug, Deserialize)]
struct MappingFile {
    mapping: Vec<MappingDef>,
}

#[derive(Debug, Deserialize)]
struct MappingDef {
    column: String,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    sentinels: Vec<i64>,
    codes: BTreeMap<String, String>,
}

/// Outcome of looking up one cell in a [`CodeMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The cell holds a known code.
    Label(&'a str),
    /// The cell holds a sentinel code.
    Sentinel,
    /// The cell holds an integer that is neither known nor a sentinel.
    Unmapped,
    /// The cell is not an integer.
    Unparseable,
    /// The cell is null.
    Missing,
}

/// A parsed code-to-label table for one column.
#[derive(Debug, Clone)]
pub struct CodeMapping {
    /// Column the table applies to.
    pub column: String,
    labels: BTreeMap<i64, String>,
    sentinels: Vec<i64>,
    default: Option<String>,
}

impl CodeMapping {
    /// Classifies a cell against this table.
    #[must_use]
    pub fn lookup(&self, cell: &Value) -> Lookup<'_> {
        if cell.is_null() {
            return Lookup::Missing;
        }
        let Some(code) = parse_i64(cell) else {
            return Lookup::Unparseable;
        };
        if let Some(label) = self.labels.get(&code) {
            Lookup::Label(label)
        } else if self.sentinels.contains(&code) {
            Lookup::Sentinel
        } else {
            Lookup::Unmapped
        }
    }

    /// Recodes a cell: known codes become their label, sentinels become the
    /// default label (or null without one), anything else becomes null.
    #[must_use]
    pub fn apply(&self, cell: &Value) -> Value {
        match self.lookup(cell) {
            Lookup::Label(label) => Value::String(label.to_owned()),
            Lookup::Sentinel => self
                .default
                .as_ref()
                .map_or(Value::Null, |d| Value::String(d.clone())),
            Lookup::Unmapped | Lookup::Unparseable | Lookup::Missing => Value::Null,
        }
    }

    /// Label imputed for sentinel codes.
    #[must_use]
    pub fn default_label(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Returns `true` if `label` is one of this table's labels.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.values().any(|l| l == label)
    }
}

/// Parses a mapping document.
///
/// # Errors
///
/// Returns [`MappingError`] if the document is malformed, a code key is not
/// an integer, or a column appears twice.
pub fn parse_mappings(toml_str: &str) -> Result<Vec<CodeMapping>, MappingError> {
    let file: MappingFile = toml::from_str(toml_str)?;
    let mut mappings: Vec<CodeMapping> = Vec::with_capacity(file.mapping.len());

    for def in file.mapping {
        if mappings.iter().any(|m| m.column == def.column) {
            return Err(MappingError::DuplicateColumn { column: def.column });
        }

        let mut labels = BTreeMap::new();
        for (code, label) in def.codes {
            let parsed = code
                .trim()
                .parse::<i64>()
                .map_err(|_| MappingError::InvalidCode {
                    column: def.column.clone(),
                    code: code.clone(),
                })?;
            labels.insert(parsed, label);
        }

        mappings.push(CodeMapping {
            column: def.column,
            labels,
            sentinels: def.sentinels,
            default: def.default,
        });
    }

    Ok(mappings)
}

/// Target table: every [`InjurySeverity`] code to its label, unrecorded
/// severities to null.
#[must_use]
pub fn severity_mapping() -> CodeMapping {
    CodeMapping {
        column: TARGET_COLUMN.to_owned(),
        labels: InjurySeverity::all()
            .iter()
            .map(|severity| (severity.code(), severity.to_string()))
            .collect(),
        sentinels: vec![SEVERITY_NOT_RECORDED],
        default: None,
    }
}

/// Returns the embedded code mappings followed by the target mapping.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed or also maps the target (a
/// build-time guarantee since the file is compiled in and covered by
/// tests).
#[must_use]
pub fn code_mappings() -> Vec<CodeMapping> {
    let mut mappings =
        parse_mappings(RECODE_TOML).unwrap_or_else(|e| panic!("Failed to parse recode.toml: {e}"));
    assert!(
        mappings.iter().all(|m| m.column != TARGET_COLUMN),
        "recode.toml must not map {TARGET_COLUMN}"
    );
    mappings.push(severity_mapping());
    mappings
}
