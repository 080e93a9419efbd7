//! Removal of identifier and free-text columns with no analytical value.

use road_accidents_table::Table;

/// Dropped characteristics columns.
pub const CHARACTERISTICS_DROPPED: &[&str] =
    &["accident_number", "accident_uid", "commune", "road_address"];

/// Dropped places columns.
pub const PLACES_DROPPED: &[&str] = &[
    "road_number",
    "numerical_index_road",
    "alphanumeric_index_road",
    "road_ref_1",
    "road_ref_2",
    "width_central_reservation",
    "width_carriageway",
];

/// Dropped users columns.
pub const USERS_DROPPED: &[&str] = &[
    "user_id",
    "vehicle_id",
    "vehicle_number",
    "seat_position",
    "safety_device_2",
    "safety_device_3",
    "pedestrian_location",
    "pedestrian_action",
    "pedestrian_alone",
];

/// Drops every listed column present in `table`. Returns how many columns
/// were removed.
pub fn prune_columns(table: &mut Table) -> usize {
    [CHARACTERISTICS_DROPPED, PLACES_DROPPED, USERS_DROPPED]
        .into_iter()
        .map(|names| table.drop_columns(names))
        .sum()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn drops_listed_columns_and_ignores_absent_ones() {
        let mut table = Table::from_rows(
            vec![
                "accident_number".to_owned(),
                "weather".to_owned(),
                "road_ref_1".to_owned(),
                "seat_position".to_owned(),
            ],
            vec![vec![json!("1"), json!("2"), json!("3"), json!("4")]],
        );
        assert_eq!(prune_columns(&mut table), 3);
        assert_eq!(table.columns(), ["weather"]);
        assert_eq!(table.get(0, "weather"), Some(&json!("2")));
        assert_eq!(prune_columns(&mut table), 0);
    }
}
