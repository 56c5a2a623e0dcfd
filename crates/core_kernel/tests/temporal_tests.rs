//! Unit tests for the Temporal module
//!
//! Tests cover the display timezone pair, wire timestamp parsing and
//! formatting, and DateRange.

use chrono::{NaiveDate, TimeZone, Timelike, Utc};
use core_kernel::temporal::{format_timestamp, parse_operator_input, parse_timestamp, wire_timestamp};
use core_kernel::{
    format_for_display, from_display_timezone, to_display_timezone, DateRange, TemporalError,
    Timezone,
};
use serde::{Deserialize, Serialize};

mod display_timezone {
    use super::*;

    #[test]
    fn test_default_is_vietnam() {
        assert_eq!(Timezone::default().0.name(), "Asia/Ho_Chi_Minh");
    }

    #[test]
    fn test_shift_crosses_midnight() {
        let utc = Utc.with_ymd_and_hms(2024, 12, 31, 18, 0, 0).unwrap();
        let local = to_display_timezone(utc);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(local.hour(), 1);
    }

    #[test]
    fn test_round_trip_restores_instant() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap();
        assert_eq!(from_display_timezone(to_display_timezone(utc)).unwrap(), utc);
    }

    #[test]
    fn test_format_for_display_shifts_once() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 1, 2, 3).unwrap();
        assert_eq!(format_for_display(utc), "01/06/2024 08:02:03");
    }

    #[test]
    fn test_start_of_day_is_previous_utc_evening() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = Timezone::default().start_of_day(day).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 31, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_from_name_rejects_unknown_zone() {
        assert!(Timezone::from_name("Mars/Olympus").is_err());
        assert!(Timezone::from_name("UTC").is_ok());
    }
}

mod wire_format {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "wire_timestamp", default)]
        at: Option<chrono::DateTime<Utc>>,
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-05-06T14:08:09+07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
    }

    #[test]
    fn test_parse_iso_without_offset() {
        let parsed = parse_timestamp("2024-05-06T07:08:09.123").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-05-06 07:08:09");
    }

    #[test]
    fn test_operator_input_is_local_time() {
        let parsed = parse_operator_input("2024-05-06 14:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap());
        let parsed = parse_operator_input("06/05/2024 14:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(TemporalError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_empty_string_deserializes_to_none() {
        let stamped: Stamped = serde_json::from_str(r#"{"at": ""}"#).unwrap();
        assert!(stamped.at.is_none());
        let stamped: Stamped = serde_json::from_str("{}").unwrap();
        assert!(stamped.at.is_none());
    }

    #[test]
    fn test_serializes_in_wire_format() {
        let stamped = Stamped {
            at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        };
        assert_eq!(
            serde_json::to_string(&stamped).unwrap(),
            r#"{"at":"2024-01-02 03:04:05"}"#
        );
    }
}

mod date_range {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert_eq!(range.days(), 30);
    }

    #[test]
    fn test_to_query_formats_iso_dates() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        )
        .unwrap();
        assert_eq!(
            range.to_query(),
            ("2024-03-05".to_string(), "2024-03-09".to_string())
        );
    }
}
