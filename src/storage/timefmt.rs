//! Timestamp formatting shared by the JSON files and the SQLite columns.
//!
//! Timestamps are written as `YYYY-MM-DDTHH:MM:SS.mmmZ`. Any RFC 3339 value
//! is accepted on read and normalized to UTC at millisecond precision, so a
//! value compares equal before and after it is stored.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Format a timestamp the way it is stored
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drop anything finer than a millisecond
pub fn truncate(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// Parse a stored or user-supplied RFC 3339 timestamp
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| truncate(ts.with_timezone(&Utc)))
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Same format for optional fields
pub mod option {
    use super::*;

    pub fn serialize<S>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| super::parse(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Patch fields: absent → `None`, `null` → `Some(None)`, value → `Some(Some(ts))`
pub mod patch {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::option::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 8, 20, 0, 0).unwrap();
        assert_eq!(format(&ts), "2025-09-08T20:00:00.000Z");
    }

    #[test]
    fn test_parse_normalizes_offset() {
        let ts = parse("2025-09-08T20:00:00-04:00").unwrap();
        assert_eq!(format(&ts), "2025-09-09T00:00:00.000Z");
    }

    #[test]
    fn test_parse_truncates_to_millis() {
        let ts = parse("2025-09-12T23:00:00.123456789Z").unwrap();
        assert_eq!(ts.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(parse(&format(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 8, 20, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(987_654_321);
        let cut = truncate(ts);
        assert_eq!(cut.timestamp_subsec_millis(), 987);
        assert_eq!(cut.timestamp_subsec_nanos(), 987_000_000);
        assert_eq!(truncate(cut), cut);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("next tuesday").is_err());
    }
}
