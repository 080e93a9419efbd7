//! Cell conversion helpers.
//!
//! Raw cells arrive as strings; cleaned cells may be numbers. These helpers
//! read either form so that steps do not care which representation an
//! earlier step produced.

use serde_json::{Number, Value};

/// Returns the textual form of a cell, or `None` for null.
///
/// Strings are returned as-is; numbers and booleans use their JSON
/// rendering.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Reads a cell as an integer.
///
/// Accepts JSON integers, integral floats, and strings containing either
/// (surrounding whitespace is ignored). Returns `None` otherwise.
#[must_use]
pub fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// Reads a cell as a float.
///
/// Accepts JSON numbers and strings containing a number (surrounding
/// whitespace is ignored). Non-finite values are rejected.
#[must_use]
pub fn parse_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Builds a float cell. Non-finite values become null since JSON cannot
/// represent them.
#[must_use]
pub fn float_cell(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Builds a string cell, mapping empty strings to null.
#[must_use]
pub fn text_cell(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_owned())
    }
}

/// Converts an integral float to `i64`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_integers_from_strings() {
        assert_eq!(parse_i64(&json!(" 2 ")), Some(2));
        assert_eq!(parse_i64(&json!("-1")), Some(-1));
        assert_eq!(parse_i64(&json!("90.0")), Some(90));
        assert_eq!(parse_i64(&json!("90.5")), None);
        assert_eq!(parse_i64(&json!("abc")), None);
        assert_eq!(parse_i64(&Value::Null), None);
    }

    #[test]
    fn parses_integers_from_numbers() {
        assert_eq!(parse_i64(&json!(7)), Some(7));
        assert_eq!(parse_i64(&json!(7.0)), Some(7));
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_f64(&json!("48.85")), Some(48.85));
        assert_eq!(parse_f64(&json!(2)), Some(2.0));
        assert_eq!(parse_f64(&json!("NaN")), None);
        assert_eq!(parse_f64(&json!("48,85")), None);
    }

    #[test]
    fn renders_text() {
        assert_eq!(as_text(&json!("a")), Some("a".to_owned()));
        assert_eq!(as_text(&json!(12)), Some("12".to_owned()));
        assert_eq!(as_text(&Value::Null), None);
    }

    #[test]
    fn float_cell_rejects_nan() {
        assert_eq!(float_cell(f64::NAN), Value::Null);
        assert_eq!(float_cell(1.5), json!(1.5));
    }
}
