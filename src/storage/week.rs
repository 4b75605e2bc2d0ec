//! Week keys: the partition key for events.
//!
//! A week is identified by the `YYYY-MM-DD` date of the Monday it starts on.
//! Sunday belongs to the week that began the previous Monday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::storage::error::StorageError;

/// Canonical partition key: an ISO calendar date
///
/// Ordering is chronological, which is also the lexical order of the
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Wrap a date as-is
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Week containing a calendar date
    pub fn containing_date(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self(date - Duration::days(offset))
    }

    /// Week containing a timestamp, judged in the timestamp's own time zone
    pub fn containing<Tz: TimeZone>(ts: &DateTime<Tz>) -> Self {
        Self::containing_date(ts.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whether the key is the Monday of its own week
    pub fn is_week_start(&self) -> bool {
        self.0.weekday().num_days_from_monday() == 0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for WeekKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exactly ten characters so keys stay file-name safe
        if s.len() != 10 {
            return Err(StorageError::InvalidWeekKey(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(WeekKey)
            .map_err(|_| StorageError::InvalidWeekKey(s.to_string()))
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn key(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_tuesday_maps_to_previous_monday() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 2, 3, 0, 0).unwrap();
        assert_eq!(WeekKey::containing(&ts), key("2025-09-01"));
    }

    #[test]
    fn test_monday_midnight_maps_to_same_monday() {
        let ts = Utc.with_ymd_and_hms(2025, 9, 8, 0, 0, 0).unwrap();
        assert_eq!(WeekKey::containing(&ts), key("2025-09-08"));

        let pr = FixedOffset::west_opt(4 * 3600).unwrap();
        let local = pr.with_ymd_and_hms(2025, 9, 8, 0, 0, 0).unwrap();
        assert_eq!(WeekKey::containing(&local), key("2025-09-08"));
    }

    #[test]
    fn test_sunday_maps_to_monday_six_days_earlier() {
        for day in [7, 14, 21, 28] {
            let sunday = NaiveDate::from_ymd_opt(2025, 9, day).unwrap();
            let week = WeekKey::containing_date(sunday);
            assert_eq!(week.date(), sunday - Duration::days(6));
            assert!(week.is_week_start());
        }
    }

    #[test]
    fn test_sunday_late_night_in_local_zone() {
        // 23:30 Sunday in UTC-4 is already Monday in UTC
        let pr = FixedOffset::west_opt(4 * 3600).unwrap();
        let ts = pr.with_ymd_and_hms(2025, 9, 14, 23, 30, 0).unwrap();
        assert_eq!(WeekKey::containing(&ts), key("2025-09-08"));
        assert_eq!(WeekKey::containing(&ts.with_timezone(&Utc)), key("2025-09-15"));
    }

    #[test]
    fn test_week_spanning_year_boundary() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(WeekKey::containing(&ts), key("2025-12-29"));
    }

    #[test]
    fn test_parse_and_display() {
        let week = key("2025-09-08");
        assert_eq!(week.to_string(), "2025-09-08");
        assert!(week.is_week_start());
        assert!(!key("2025-09-09").is_week_start());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2025-9-8", "2025-02-30", "../etc/passwd", "", "2025-09-08.json"] {
            assert!(bad.parse::<WeekKey>().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&key("2025-09-08")).unwrap();
        assert_eq!(json, "\"2025-09-08\"");
        let back: WeekKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2025-09-08"));
        assert!(serde_json::from_str::<WeekKey>("\"nope\"").is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys = vec![key("2025-10-06"), key("2024-12-30"), key("2025-09-08")];
        keys.sort();
        assert_eq!(keys, vec![key("2024-12-30"), key("2025-09-08"), key("2025-10-06")]);
    }
}
