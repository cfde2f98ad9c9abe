//! Movable-feast anchor (Pascha) computus
//!
//! The anchor is computed with the anonymous Gregorian algorithm published by
//! Meeus (also known as the Meeus/Jones/Butcher method). It is pure integer
//! arithmetic and needs no tables.
//!
//! # Epoch
//!
//! The Gregorian reform took effect in 1583; the algorithm's published
//! verification tables end at 4099. Years outside [`FIRST_SUPPORTED_YEAR`]
//! ..= [`LAST_SUPPORTED_YEAR`] are rejected with
//! [`CalendarError::OutOfRange`].

use chrono::NaiveDate;

use crate::error::{CalendarError, CalendarResult};

/// First year of the supported calendar epoch
pub const FIRST_SUPPORTED_YEAR: i32 = 1583;

/// Last year of the supported calendar epoch
pub const LAST_SUPPORTED_YEAR: i32 = 4099;

/// Check that a year lies inside the supported epoch
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`] for years before 1583 or after 4099.
#[inline]
pub fn validate_year(year: i32) -> CalendarResult<()> {
    if (FIRST_SUPPORTED_YEAR..=LAST_SUPPORTED_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::out_of_range(year))
    }
}

/// Compute the anchor date (Pascha) for a year
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`] when `year` is outside the epoch.
///
/// # Example
///
/// ```rust,ignore
/// let pascha = anchor_date(2024)?;
/// assert_eq!(pascha, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
/// ```
pub fn anchor_date(year: i32) -> CalendarResult<NaiveDate> {
    validate_year(year)?;

    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    // month is 3 or 4 and day 1..=31 for every year in the epoch
    let month = u32::try_from(month).map_err(|_| CalendarError::out_of_range(year))?;
    let day = u32::try_from(day).map_err(|_| CalendarError::out_of_range(year))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| CalendarError::out_of_range(year))
}
