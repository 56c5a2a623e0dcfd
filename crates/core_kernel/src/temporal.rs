//! Time handling for stored and displayed timestamps
//!
//! The backend stores and transmits UTC. Operators read Vietnam local time.
//! The shift happens only through [`to_display_timezone`] and
//! [`from_display_timezone`], at the presentation boundary, and never on a
//! value that is about to be stored or sent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

/// Wire format for timestamps sent to the backend
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used when a timestamp is shown to an operator
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Timezone wrapper with custom serialization support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Looks up an IANA zone name such as `Asia/Ho_Chi_Minh`
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| CoreError::UnknownTimezone(name.to_string()))
    }

    /// Converts a stored UTC instant into the wall-clock time shown on screen
    pub fn to_display(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        utc.with_timezone(&self.0).naive_local()
    }

    /// Converts wall-clock input typed by an operator back into UTC
    pub fn from_display(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, TemporalError> {
        self.0
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::AmbiguousLocalTime(local.to_string()))
    }

    /// Start of the given local day, as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        self.from_display(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Ho_Chi_Minh)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Local time {0} does not map to a single instant")]
    AmbiguousLocalTime(String),
}

pub fn to_display_timezone(utc: DateTime<Utc>) -> NaiveDateTime {
    Timezone::default().to_display(utc)
}

pub fn from_display_timezone(local: NaiveDateTime) -> Result<DateTime<Utc>, TemporalError> {
    Timezone::default().from_display(local)
}

/// Formats a stored timestamp for an operator, shifting it exactly once
pub fn format_for_display(utc: DateTime<Utc>) -> String {
    to_display_timezone(utc).format(DISPLAY_FORMAT).to_string()
}

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DD HH:MM:SS` / ISO forms; naive
/// values are taken as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TemporalError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in [WIRE_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(TemporalError::InvalidTimestamp(trimmed.to_string()))
}

/// Parses a timestamp typed by an operator.
///
/// Input with an explicit offset is taken as is; naive input is wall-clock
/// time in the display timezone and is shifted back to UTC.
pub fn parse_operator_input(input: &str) -> Result<DateTime<Utc>, TemporalError> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in [WIRE_FORMAT, DISPLAY_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return from_display_timezone(naive);
        }
    }
    Err(TemporalError::InvalidTimestamp(trimmed.to_string()))
}

pub fn format_timestamp(utc: DateTime<Utc>) -> String {
    utc.format(WIRE_FORMAT).to_string()
}

/// Serde adapter for optional wire timestamps; empty strings and `null` are `None`
pub mod wire_timestamp {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_timestamp(*dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// An inclusive range of calendar dates, as used by date filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// `from` / `to` query values in `YYYY-MM-DD`
    pub fn to_query(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shift_is_seven_hours() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap();
        let local = to_display_timezone(utc);
        assert_eq!(local.to_string(), "2024-03-02 03:30:00");
        assert_eq!(from_display_timezone(local).unwrap(), utc);
    }

    #[test]
    fn test_parse_naive_wire_format_as_utc() {
        let parsed = parse_timestamp("2024-05-06 07:08:09").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        assert_eq!(format_timestamp(parsed), "2024-05-06 07:08:09");
    }

    #[test]
    fn test_date_range_rejects_reversed() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(TemporalError::InvalidPeriod { .. })
        ));
    }
}
