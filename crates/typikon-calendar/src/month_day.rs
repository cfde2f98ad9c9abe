//! Fixed-cycle month/day key
//!
//! [`MonthDay`] is the key of every fixed-calendar table (menaion days,
//! collision rules, the local commemoration). It serializes as `MM-DD`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Day of the fixed (menaion) cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Create month/day pair
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonthDay`] if the pair does not exist in a leap year.
    pub fn new(month: u32, day: u32) -> CalendarResult<Self> {
        // 2000 is a leap year, so 02-29 is accepted
        NaiveDate::from_ymd_opt(2000, month, day)
            .map(|_| Self { month, day })
            .ok_or_else(|| CalendarError::invalid_month_day(format!("{month:02}-{day:02}")))
    }

    /// Month/day of a date
    #[inline]
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Month number (1-12)
    #[inline]
    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    /// Day of month
    #[inline]
    #[must_use]
    pub fn day(self) -> u32 {
        self.day
    }

    /// Check if `self` lies in the inclusive range `from..=to`
    ///
    /// Ranges that wrap the new year (e.g. `12-25..=01-05`) are supported.
    #[must_use]
    pub fn within(self, from: Self, to: Self) -> bool {
        if from <= to {
            from <= self && self <= to
        } else {
            self >= from || self <= to
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, day) = s
            .split_once('-')
            .ok_or_else(|| CalendarError::invalid_month_day(s))?;
        let month = month
            .parse()
            .map_err(|_| CalendarError::invalid_month_day(s))?;
        let day = day.parse().map_err(|_| CalendarError::invalid_month_day(s))?;
        Self::new(month, day).map_err(|_| CalendarError::invalid_month_day(s))
    }
}

impl TryFrom<String> for MonthDay {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}
