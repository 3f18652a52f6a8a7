//! Lenient numeric parsing for amounts and quantities.

use serde_json::Value;

/// Parses a number from a cell value.
///
/// Accepts JSON numbers and strings with an optional currency symbol,
/// thousands separators and accounting-style parentheses for negatives.
/// Anything else yields `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

pub fn parse_number_str(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let parsed = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -parsed } else { parsed })
}
