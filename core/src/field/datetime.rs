//! Date-time normalization to RFC 3339.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::Value;

/// Zero-date sentinels some databases store in place of `NULL`.
const ZERO_SENTINELS: &[&str] = &["0000-00-00 00:00:00", "0000-00-00"];

/// Naive layouts, tried in order. Naive values are interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Layouts carrying an explicit offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Normalizes a date-time value to an RFC 3339 string.
///
/// Strings in common SQL layouts and integer Unix timestamps are accepted.
/// Empty strings, zero-date sentinels and anything unparseable yield `null`.
pub fn normalize(value: &Value) -> Value {
    parse(value).map_or(Value::Null, |dt| Value::String(format(&dt)))
}

/// Renders with a trailing `Z` for UTC and the full offset otherwise.
pub fn format(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a value into an offset-aware date-time.
pub fn parse(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.fixed_offset()),
        _ => None,
    }
}

fn parse_str(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() || ZERO_SENTINELS.contains(&s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for layout in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Some(dt);
        }
    }
    for layout in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sql_layout_is_utc() {
        assert_eq!(
            normalize(&json!("2016-03-01 00:00:00")),
            json!("2016-03-01T00:00:00Z")
        );
        assert_eq!(
            normalize(&json!("2016-03-01T12:30:15")),
            json!("2016-03-01T12:30:15Z")
        );
        assert_eq!(normalize(&json!("2016-03-01")), json!("2016-03-01T00:00:00Z"));
    }

    #[test]
    fn offsets_are_kept() {
        assert_eq!(
            normalize(&json!("2016-03-01T10:00:00+02:00")),
            json!("2016-03-01T10:00:00+02:00")
        );
        assert_eq!(
            normalize(&json!("2016-03-01 10:00:00+00:00")),
            json!("2016-03-01T10:00:00Z")
        );
        assert_eq!(
            normalize(&json!("2016-03-01T10:00:00.250-05:00")),
            json!("2016-03-01T10:00:00.250-05:00")
        );
    }

    #[test]
    fn empty_and_sentinels_are_null() {
        assert_eq!(normalize(&json!("")), Value::Null);
        assert_eq!(normalize(&json!("0000-00-00 00:00:00")), Value::Null);
        assert_eq!(normalize(&json!("0000-00-00")), Value::Null);
        assert_eq!(normalize(&json!("yesterday")), Value::Null);
        assert_eq!(normalize(&json!(true)), Value::Null);
    }

    #[test]
    fn unix_timestamps() {
        assert_eq!(normalize(&json!(0)), json!("1970-01-01T00:00:00Z"));
        assert_eq!(normalize(&json!(1456790400)), json!("2016-03-01T00:00:00Z"));
    }
}
