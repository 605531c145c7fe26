//! Lenient ISO-8601 timestamp decoding.
//!
//! Providers send either RFC 3339 timestamps or naive ones without an
//! offset. Naive timestamps are taken to be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses `text` as RFC 3339, falling back to a naive date-time (or bare
/// date) in UTC.
#[must_use]
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` helper for a required timestamp.
///
/// # Errors
///
/// Fails if the value is not a string or not an ISO-8601 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_utc(&text).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid timestamp '{text}': expected ISO-8601"))
    })
}

/// `deserialize_with` helper for an optional timestamp. `null` is `None`.
///
/// # Errors
///
/// Fails if a present value is not an ISO-8601 timestamp.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|text| {
            parse_utc(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid timestamp '{text}': expected ISO-8601"))
            })
        })
        .transpose()
}
