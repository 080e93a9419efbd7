//! Exact duplicate row removal.

use road_accidents_table::Table;

/// Drops rows identical across every column, keeping the first
/// occurrence. Returns the number of removed rows.
pub fn deduplicate(table: &mut Table) -> usize {
    let removed = table.dedup_rows();
    if removed > 0 {
        log::debug!("Removed {removed} duplicate row(s)");
    }
    removed
}
