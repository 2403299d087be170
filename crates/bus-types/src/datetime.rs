//! # Bus DateTime
//!
//! Broken-down calendar time as the bus stores it: one integer per field plus
//! a timezone offset expressed as hours, minutes and a west-of-UTC flag.
//!
//! Fields are public and unchecked so that values read off the wire can be
//! represented exactly, malformed ones included. [`BusDateTime::new`] is the
//! validating constructor for values we build ourselves.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::ValueError;

/// Offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeZoneOffset {
    pub hours: i32,
    pub minutes: i32,
    /// `true` for offsets west of UTC (negative).
    pub west: bool,
}

impl TimeZoneOffset {
    pub const UTC: Self = Self {
        hours: 0,
        minutes: 0,
        west: false,
    };

    /// Build from a signed offset in seconds.
    #[must_use]
    pub fn from_seconds(offset: i32) -> Self {
        let west = offset < 0;
        let abs = offset.unsigned_abs();
        Self {
            hours: (abs / 3600) as i32,
            minutes: ((abs % 3600) / 60) as i32,
            west,
        }
    }
}

/// Calendar timestamp with timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusDateTime {
    /// Full year, e.g. 2024.
    pub year: i32,
    /// 1-12.
    pub month: i32,
    /// 1-31.
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub tz: TimeZoneOffset,
}

impl BusDateTime {
    /// Validating constructor.
    pub fn new(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
        tz: TimeZoneOffset,
    ) -> Result<Self, ValueError> {
        check("year", year, 0, 9999)?;
        check("month", month, 1, 12)?;
        check("day", day, 1, 31)?;
        check("hour", hour, 0, 23)?;
        check("minute", minute, 0, 59)?;
        // 60 admits a leap second
        check("second", second, 0, 60)?;
        check("tz_hours", tz.hours, 0, 23)?;
        check("tz_minutes", tz.minutes, 0, 59)?;

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            tz,
        })
    }
}

fn check(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), ValueError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValueError::InvalidDateTime { field, value })
    }
}

impl From<DateTime<FixedOffset>> for BusDateTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month() as i32,
            day: dt.day() as i32,
            hour: dt.hour() as i32,
            minute: dt.minute() as i32,
            second: dt.second() as i32,
            tz: TimeZoneOffset::from_seconds(dt.offset().local_minus_utc()),
        }
    }
}
