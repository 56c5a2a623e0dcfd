//! Report granularity and date-range presets

use chrono::{Datelike, Months, NaiveDate};
use core_kernel::DateRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Bucket size of the summary report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Hour => "Theo giờ",
            Granularity::Day => "Theo ngày",
            Granularity::Week => "Theo tuần",
            Granularity::Month => "Theo tháng",
            Granularity::Year => "Theo năm",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(ReportError::UnknownGranularity(other.to_string())),
        }
    }
}

/// Quick ranges offered next to the date pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    Today,
    Last7Days,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

impl RangePreset {
    pub const ALL: [RangePreset; 6] = [
        RangePreset::Today,
        RangePreset::Last7Days,
        RangePreset::ThisMonth,
        RangePreset::LastMonth,
        RangePreset::ThisYear,
        RangePreset::LastYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::Today => "Hôm nay",
            RangePreset::Last7Days => "7 ngày qua",
            RangePreset::ThisMonth => "Tháng này",
            RangePreset::LastMonth => "Tháng trước",
            RangePreset::ThisYear => "Năm nay",
            RangePreset::LastYear => "Năm trước",
        }
    }

    /// The range this preset denotes on the given day
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, ReportError> {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let (start, end) = match self {
            RangePreset::Today => (today, today),
            RangePreset::Last7Days => (today - chrono::Days::new(6), today),
            RangePreset::ThisMonth => (first_of_month, today),
            RangePreset::LastMonth => {
                let start = first_of_month
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(first_of_month);
                (start, first_of_month.pred_opt().unwrap_or(first_of_month))
            }
            RangePreset::ThisYear => (year_start(today.year()).unwrap_or(today), today),
            RangePreset::LastYear => {
                let start = year_start(today.year() - 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year() - 1, 12, 31).unwrap_or(today);
                (start, end)
            }
        };
        Ok(DateRange::new(start, end)?)
    }
}

fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// The calendar month containing `day`, used by the due-settlement calendar
pub fn month_of(day: NaiveDate) -> Result<DateRange, ReportError> {
    let start = day.with_day(1).unwrap_or(day);
    let next = start.checked_add_months(Months::new(1)).unwrap_or(start);
    let end = next.pred_opt().unwrap_or(start);
    Ok(DateRange::new(start, end)?)
}
