//! Shared parsing utilities for raw accident fields.
//!
//! Raw exports mix conventions between years: coordinates use a decimal
//! comma, times are `HH:MM` in recent files and `HHMM` in older ones.

use road_accidents_table::cell::as_text;
use serde_json::Value;

/// Parses a decimal-comma number (`"48,8566"`) into a float. Numbers that
/// already use a dot are accepted too. Returns `None` for null, empty or
/// unparseable cells.
#[must_use]
pub fn parse_decimal_comma(value: &Value) -> Option<f64> {
    if let Value::Number(n) = value {
        return n.as_f64();
    }
    let text = as_text(value)?;
    let normalized = text.trim().replace(',', ".");
    let parsed = normalized.parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Extracts the hour of day from an `HH:MM` time.
///
/// The part before the colon must be an integer in `0..=23`. Colon-less
/// three or four digit values (`"0930"`, `"930"`) are read as `HHMM`.
#[must_use]
pub fn parse_hour(text: &str) -> Option<u32> {
    let text = text.trim();
    let hour_part = match text.split_once(':') {
        Some((hour, _)) => hour.trim(),
        None if (3..=4).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit()) => {
            &text[..text.len() - 2]
        }
        None => return None,
    };
    let hour = hour_part.parse::<u32>().ok()?;
    (hour <= 23).then_some(hour)
}
