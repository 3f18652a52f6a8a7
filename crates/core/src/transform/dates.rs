//! Date normalization for spreadsheet-sourced values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
pub const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

pub const SECONDS_PER_DAY: f64 = 86400.0;

// US slash formats come first: `%Y` accepts a single digit, so `7/6/23`
// would otherwise parse as year 7.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Converts a spreadsheet date serial to a calendar date (UTC).
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY).floor();
    DateTime::<Utc>::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}

/// Parses a date written in one of the accepted textual formats.
pub fn parse_date_str(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(serial) = input.parse::<f64>() {
        return serial_to_date(serial);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        })
}

/// Normalizes a cell value to a date. Blank or unparsable input yields `None`.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n.as_f64().and_then(serial_to_date),
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_uses_unix_epoch_offset() {
        // (45123 - 25569) days after 1970-01-01
        assert_eq!(normalize_date(&json!(45123)), Some(ymd(2023, 7, 16)));
        assert_eq!(serial_to_date(25569.0), Some(ymd(1970, 1, 1)));
    }

    #[test]
    fn test_fractional_serial_keeps_the_day() {
        assert_eq!(serial_to_date(45123.99), Some(ymd(2023, 7, 16)));
    }

    #[test]
    fn test_serial_as_string() {
        assert_eq!(normalize_date(&json!("45123")), Some(ymd(2023, 7, 16)));
    }

    #[test]
    fn test_string_formats() {
        let expected = Some(ymd(2023, 7, 6));
        for input in [
            "2023-07-06",
            "2023/07/06",
            "07/06/2023",
            "7/6/2023",
            "7/6/23",
            "06-Jul-2023",
            "6 Jul 2023",
            "Jul 6, 2023",
            "July 6, 2023",
            "2023-07-06T10:30:00Z",
            "2023-07-06T10:30:00",
            "2023-07-06 10:30:00",
        ] {
            assert_eq!(parse_date_str(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_rfc3339_normalizes_to_utc() {
        assert_eq!(
            parse_date_str("2024-01-15T23:30:00-05:00"),
            Some(ymd(2024, 1, 16))
        );
    }

    #[test]
    fn test_unparsable_dates_are_none() {
        assert_eq!(normalize_date(&json!("not-a-date")), None);
        assert_eq!(normalize_date(&json!("")), None);
        assert_eq!(normalize_date(&json!(null)), None);
        assert_eq!(normalize_date(&json!(true)), None);
        assert_eq!(normalize_date(&json!(-4)), None);
    }
}
