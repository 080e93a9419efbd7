//! Joins the three per-source tables into one row per place record.

use road_accidents_accident_models::ACCIDENT_ID_COLUMN;
use road_accidents_table::Table;
use road_accidents_table::join::left_join;

use crate::{CleanError, require_column};

const STEP: &str = "merge";

/// Left-joins reduced users and then characteristics onto places, on the
/// accident identifier.
///
/// Every places row is kept. When the right-hand tables hold at most one
/// row per accident the output has exactly as many rows as `places`.
///
/// # Errors
///
/// Returns [`CleanError::Schema`] if any input lacks the identifier column.
pub fn merge_tables(
    places: &Table,
    users: &Table,
    characteristics: &Table,
) -> Result<Table, CleanError> {
    require_column(places, ACCIDENT_ID_COLUMN, STEP)?;
    require_column(users, ACCIDENT_ID_COLUMN, STEP)?;
    require_column(characteristics, ACCIDENT_ID_COLUMN, STEP)?;

    let with_users = left_join(places, users, ACCIDENT_ID_COLUMN)?;
    let merged = left_join(&with_users, characteristics, ACCIDENT_ID_COLUMN)?;

    log::debug!(
        "Merged {} places with {} users and {} characteristics",
        places.len(),
        users.len(),
        characteristics.len()
    );
    Ok(merged)
}
