//! Raw column names to descriptive names.

use road_accidents_table::Table;

/// Raw export column name and its descriptive replacement.
pub const RAW_TO_DESCRIPTIVE: &[(&str, &str)] = &[
    // Characteristics
    ("Num_Acc", "accident_number"),
    ("jour", "day"),
    ("mois", "month"),
    ("an", "year"),
    ("hrmn", "hour_minute"),
    ("lum", "light_conditions"),
    ("dep", "department"),
    ("com", "commune"),
    ("agg", "urban_area"),
    ("int", "intersection_type"),
    ("atm", "weather"),
    ("col", "collision_type"),
    ("adr", "road_address"),
    ("lat", "latitude"),
    ("long", "longitude"),
    ("Accident_Id", "accident_uid"),
    // Places
    ("catr", "road_category"),
    ("voie", "road_number"),
    ("v1", "numerical_index_road"),
    ("v2", "alphanumeric_index_road"),
    ("circ", "road_layout"),
    ("nbv", "num_lanes"),
    ("vosp", "reserved_lane"),
    ("prof", "road_profile"),
    ("pr", "road_ref_1"),
    ("pr1", "road_ref_2"),
    ("plan", "road_shape"),
    ("lartpc", "width_central_reservation"),
    ("larrout", "width_carriageway"),
    ("surf", "surface_condition"),
    ("infra", "infrastructure"),
    ("situ", "road_location"),
    ("vma", "speed_limit"),
    // Users
    ("id_usager", "user_id"),
    ("id_vehicule", "vehicle_id"),
    ("num_veh", "vehicle_number"),
    ("place", "seat_position"),
    ("catu", "user_category"),
    ("grav", "injury_severity"),
    ("sexe", "sex"),
    ("an_nais", "birth_year"),
    ("trajet", "trip_purpose"),
    ("secu1", "safety_device_1"),
    ("secu2", "safety_device_2"),
    ("secu3", "safety_device_3"),
    ("locp", "pedestrian_location"),
    ("actp", "pedestrian_action"),
    ("etatp", "pedestrian_alone"),
];

/// Renames raw columns to their descriptive names. Columns without a
/// mapping pass through unchanged.
pub fn normalize_schema(table: &mut Table) {
    let renamed = table.rename_columns(RAW_TO_DESCRIPTIVE);
    log::debug!("Renamed {renamed} of {} columns", table.width());
}
