//! Resolution of the diary date window from (partially) given year/month/day URL components.

use crate::diary::clock::Clock;
use chrono::{naive::NaiveDate, DateTime, Datelike, TimeZone, Utc};
use std::fmt::{Display, Formatter};

/// A resolved diary window: a local start date and a number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// First day of the window, as a date in the venue timezone
    pub start_date: NaiveDate,
    /// Number of calendar days covered by the window
    pub days: u32,
}

impl DateWindow {
    /// First day after the window
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + chrono::Duration::days(self.days as i64)
    }

    /// The window start as a UTC timestamp: local midnight of the start date in the venue timezone
    pub fn start_utc(&self, tz: chrono_tz::Tz) -> DateTime<Utc> {
        local_start_of_day(self.start_date, tz)
    }

    /// The (exclusive) window end as a UTC timestamp
    pub fn end_utc(&self, tz: chrono_tz::Tz) -> DateTime<Utc> {
        local_start_of_day(self.end_date(), tz)
    }
}

/// Local midnight of the given date in the given timezone, as a UTC timestamp.
///
/// On days where midnight does not exist or is ambiguous due to a DST transition, the later
/// interpretation is used; as a last resort, the naive time is interpreted as UTC.
pub fn local_start_of_day(date: NaiveDate, tz: chrono_tz::Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .latest()
        .map(|dt| dt.to_utc())
        .unwrap_or(midnight.and_utc())
}

#[derive(Debug, PartialEq, Eq)]
pub enum InvalidDateError {
    /// The given year/month/day components do not form a possible calendar date
    ImpossibleDate {
        year: i32,
        month: u32,
        day: u32,
    },
    /// The given days-ahead parameter is not a positive integer
    InvalidDaysAhead(String),
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidDateError::ImpossibleDate { year, month, day } => {
                write!(f, "Invalid date: {:04}-{:02}-{:02}", year, month, day)
            }
            InvalidDateError::InvalidDaysAhead(value) => {
                write!(f, "Invalid days ahead value: {}", value)
            }
        }
    }
}

impl std::error::Error for InvalidDateError {}

/// Resolve the diary window from optional year/month/day URL components.
///
/// * nothing given: the window starts today (venue timezone) and spans the days-ahead parameter
///   (or the given default)
/// * only a year: the whole year
/// * year and month: the whole month
/// * year, month and day: that day, spanning the days-ahead parameter (or the default)
///
/// A days-ahead parameter that is not a positive integer, and year/month/day combinations that do
/// not form a possible calendar date, are rejected with [InvalidDateError].
pub fn resolve_date_range(
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    days_ahead_param: Option<&str>,
    default_days_ahead: u32,
    tz: chrono_tz::Tz,
    clock: &dyn Clock,
) -> Result<DateWindow, InvalidDateError> {
    let days_ahead = match days_ahead_param {
        Some(value) => match value.parse::<u32>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => return Err(InvalidDateError::InvalidDaysAhead(value.to_owned())),
        },
        None => default_days_ahead,
    };

    match (year, month, day) {
        (None, _, _) => Ok(DateWindow {
            start_date: clock.now().with_timezone(&tz).date_naive(),
            days: days_ahead,
        }),
        (Some(year), None, _) => {
            let start_date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(
                InvalidDateError::ImpossibleDate { year, month: 1, day: 1 },
            )?;
            Ok(DateWindow {
                start_date,
                days: days_in_year(year),
            })
        }
        (Some(year), Some(month), None) => {
            let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or(
                InvalidDateError::ImpossibleDate { year, month, day: 1 },
            )?;
            Ok(DateWindow {
                start_date,
                days: days_in_month(year, month),
            })
        }
        (Some(year), Some(month), Some(day)) => {
            let start_date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or(InvalidDateError::ImpossibleDate { year, month, day })?;
            Ok(DateWindow {
                start_date,
                days: days_ahead,
            })
        }
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or(first);
    (next - first).num_days() as u32
}

/// First day of the month the given date belongs to
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
