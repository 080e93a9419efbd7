//! French department code utilities.
//!
//! Provides the Île-de-France allow-list used to restrict the cleaned
//! dataset to one metropolitan subregion, plus helpers to parse raw
//! department codes.

/// Numeric department codes of the Île-de-France region.
pub const ILE_DE_FRANCE: &[u32] = &[75, 77, 78, 91, 92, 93, 94, 95];

/// Parses a raw department code into its integer form.
///
/// Only purely numeric codes are accepted. Alphanumeric codes such as
/// `"2A"` / `"2B"` (Corsica) return `None`, as do empty strings.
#[must_use]
pub fn parse_numeric_code(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

/// Returns `true` if the code belongs to the Île-de-France region.
#[must_use]
pub fn is_ile_de_france(code: u32) -> bool {
    ILE_DE_FRANCE.contains(&code)
}

/// Maps an Île-de-France department code to its name.
///
/// Returns `"Unknown"` for codes outside the region.
#[must_use]
pub const fn department_name(code: u32) -> &'static str {
    match code {
        75 => "Paris",
        77 => "Seine-et-Marne",
        78 => "Yvelines",
        91 => "Essonne",
        92 => "Hauts-de-Seine",
        93 => "Seine-Saint-Denis",
        94 => "Val-de-Marne",
        95 => "Val-d'Oise",
        _ => "Unknown",
    }
}
