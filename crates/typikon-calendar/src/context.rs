//! Liturgical context of a single date
//!
//! [`ContextBuilder`] turns a calendar date into an immutable [`Context`]:
//! anchor offset, liturgical weekday, season, named period and the weekly
//! cycles. Anchors are cached per year so building contexts for a whole
//! year costs one computus per distinct year touched.
//!
//! # Example
//!
//! ```rust,ignore
//! let builder = ContextBuilder::new().with_local_commemoration("12-06".parse()?);
//! let context = builder.build(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())?;
//! assert_eq!(context.season(), Season::FeastOfTheAnchor);
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate};
use moka::sync::Cache;
use serde::Serialize;
use tracing::debug;

use crate::anchor::anchor_date;
use crate::cycle::{self, THOMAS_SUNDAY};
use crate::error::CalendarResult;
use crate::month_day::MonthDay;
use crate::season::{Period, Season};

/// Rotation applied to chrono's Monday-based weekday so Sunday becomes 0
pub const WEEKDAY_ROTATION: u32 = 1;

/// Liturgical weekday index of Sunday
pub const SUNDAY: u8 = 0;

/// Liturgical weekday index of Saturday
pub const SATURDAY: u8 = 6;

const ANCHOR_CACHE_CAPACITY: u64 = 512;

/// Liturgical coordinates of one date
///
/// Every field is derived from the date (plus the configured local
/// commemoration) and never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    date: NaiveDate,
    year: i32,
    month: u32,
    day: u32,
    weekday_index: u8,
    day_offset_from_anchor: i64,
    season: Season,
    period: Period,
    tone: u8,
    eothinon: u8,
    is_local_commemoration_day: bool,
}

impl Context {
    /// Calendar date
    #[inline]
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Calendar year
    #[inline]
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1-12)
    #[inline]
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day of month
    #[inline]
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Fixed-cycle key of the date
    #[inline]
    #[must_use]
    pub fn month_day(&self) -> MonthDay {
        MonthDay::of(self.date)
    }

    /// Liturgical weekday, Sunday = 0 .. Saturday = 6
    #[inline]
    #[must_use]
    pub fn weekday_index(&self) -> u8 {
        self.weekday_index
    }

    /// Check if the date is a Sunday
    #[inline]
    #[must_use]
    pub fn is_sunday(&self) -> bool {
        self.weekday_index == SUNDAY
    }

    /// Signed day distance from this year's anchor
    #[inline]
    #[must_use]
    pub fn day_offset_from_anchor(&self) -> i64 {
        self.day_offset_from_anchor
    }

    /// Season of the date
    #[inline]
    #[must_use]
    pub fn season(&self) -> Season {
        self.season
    }

    /// Named period of the date
    #[inline]
    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    /// Tone of the week (1..=8)
    #[inline]
    #[must_use]
    pub fn tone(&self) -> u8 {
        self.tone
    }

    /// Eothinon gospel number (1..=11)
    #[inline]
    #[must_use]
    pub fn eothinon(&self) -> u8 {
        self.eothinon
    }

    /// Week of the Great Fast, if inside it
    #[inline]
    #[must_use]
    pub fn lenten_week(&self) -> Option<u8> {
        cycle::lenten_week(self.day_offset_from_anchor)
    }

    /// Check if the date is the local (temple) commemoration
    #[inline]
    #[must_use]
    pub fn is_local_commemoration_day(&self) -> bool {
        self.is_local_commemoration_day
    }

    /// Key of the day in the seasonal book, e.g. `triodion_day_-7`
    ///
    /// `None` outside the movable windows.
    #[must_use]
    pub fn season_day_key(&self) -> Option<String> {
        match self.season {
            Season::Ordinary => None,
            season => Some(format!(
                "{}_day_{}",
                season.book(),
                self.day_offset_from_anchor
            )),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (offset {}, {}, tone {})",
            self.date, self.day_offset_from_anchor, self.season, self.tone
        )
    }
}

/// Builds [`Context`] values, caching anchors per year
#[derive(Clone)]
pub struct ContextBuilder {
    anchors: Cache<i32, NaiveDate>,
    local_commemoration: Option<MonthDay>,
}

impl ContextBuilder {
    /// Create builder with an empty anchor cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchors: Cache::new(ANCHOR_CACHE_CAPACITY),
            local_commemoration: None,
        }
    }

    /// Set the local (temple) commemoration day
    #[must_use]
    pub fn with_local_commemoration(mut self, month_day: MonthDay) -> Self {
        self.local_commemoration = Some(month_day);
        self
    }

    /// Configured local commemoration day
    #[inline]
    #[must_use]
    pub fn local_commemoration(&self) -> Option<MonthDay> {
        self.local_commemoration
    }

    /// Anchor date for a year, computed once and cached
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`](crate::CalendarError::OutOfRange)
    /// for years outside the epoch.
    pub fn anchor(&self, year: i32) -> CalendarResult<NaiveDate> {
        if let Some(date) = self.anchors.get(&year) {
            return Ok(date);
        }
        let date = anchor_date(year)?;
        debug!(year, anchor = %date, "anchor cache miss");
        self.anchors.insert(year, date);
        Ok(date)
    }

    /// Derive the context of a date
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`](crate::CalendarError::OutOfRange)
    /// when the date or the previous year's anchor (needed for the tone
    /// before Thomas Sunday) falls outside the epoch.
    pub fn build(&self, date: NaiveDate) -> CalendarResult<Context> {
        let year = date.year();
        let anchor = self.anchor(year)?;
        let offset = (date - anchor).num_days();
        let tone = self.tone(date, offset, anchor)?;

        // chrono counts Monday = 0; the liturgical week starts on Sunday
        let weekday = (date.weekday().num_days_from_monday() + WEEKDAY_ROTATION) % 7;

        Ok(Context {
            date,
            year,
            month: date.month(),
            day: date.day(),
            weekday_index: u8::try_from(weekday).unwrap_or(SUNDAY),
            day_offset_from_anchor: offset,
            season: Season::from_offset(offset),
            period: Period::from_offset(offset),
            tone,
            eothinon: cycle::eothinon(offset),
            is_local_commemoration_day: self.local_commemoration == Some(MonthDay::of(date)),
        })
    }

    fn tone(&self, date: NaiveDate, offset: i64, anchor: NaiveDate) -> CalendarResult<u8> {
        if let Some(tone) = cycle::bright_week_tone(offset) {
            return Ok(tone);
        }
        let reference = if offset >= THOMAS_SUNDAY {
            anchor
        } else {
            self.anchor(date.year() - 1)?
        };
        let days = (date - reference).num_days() - THOMAS_SUNDAY;
        Ok(cycle::weekly_tone(days))
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("cached_years", &self.anchors.entry_count())
            .field("local_commemoration", &self.local_commemoration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CalendarError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn anchor_day_context() {
        let builder = ContextBuilder::new();
        let ctx = builder.build(ymd(2024, 3, 31)).unwrap();
        assert_eq!(ctx.day_offset_from_anchor(), 0);
        assert_eq!(ctx.season(), Season::FeastOfTheAnchor);
        assert_eq!(ctx.period(), Period::Pascha);
        assert_eq!(ctx.weekday_index(), SUNDAY);
        assert!(ctx.is_sunday());
        assert_eq!(ctx.tone(), 1);
        assert_eq!(ctx.season_day_key().as_deref(), Some("pentecostarion_day_0"));
    }

    #[test]
    fn weekday_rotation() {
        let builder = ContextBuilder::new();
        // 2024-05-04 is a Saturday
        let ctx = builder.build(ymd(2024, 5, 4)).unwrap();
        assert_eq!(ctx.weekday_index(), SATURDAY);
        let monday = builder.build(ymd(2024, 5, 6)).unwrap();
        assert_eq!(monday.weekday_index(), 1);
    }

    #[test]
    fn pre_festal_offsets() {
        let builder = ContextBuilder::new();
        // Palm Sunday 2024
        let ctx = builder.build(ymd(2024, 3, 24)).unwrap();
        assert_eq!(ctx.day_offset_from_anchor(), -7);
        assert_eq!(ctx.season(), Season::PreFestal);
        assert_eq!(ctx.season_day_key().as_deref(), Some("triodion_day_-7"));
        assert_eq!(ctx.lenten_week(), Some(6));
    }

    #[test]
    fn tone_counts_from_thomas_sunday() {
        let builder = ContextBuilder::new();
        // Thomas Sunday 2024
        assert_eq!(builder.build(ymd(2024, 4, 7)).unwrap().tone(), 1);
        assert_eq!(builder.build(ymd(2024, 4, 14)).unwrap().tone(), 2);
        // Bright Saturday takes tone 8
        assert_eq!(builder.build(ymd(2024, 4, 6)).unwrap().tone(), 8);
    }

    #[test]
    fn tone_before_anchor_uses_previous_year() {
        let builder = ContextBuilder::new();
        // Thomas Sunday 2023 was 04-23; 2024-01-07 is 37 weeks later
        let ctx = builder.build(ymd(2024, 1, 7)).unwrap();
        assert_eq!(ctx.tone(), u8::try_from(37 % 8 + 1).unwrap());
    }

    #[test]
    fn local_commemoration_flag() {
        let builder = ContextBuilder::new().with_local_commemoration("12-06".parse().unwrap());
        assert!(builder.build(ymd(2024, 12, 6)).unwrap().is_local_commemoration_day());
        assert!(!builder.build(ymd(2024, 12, 7)).unwrap().is_local_commemoration_day());
        assert!(!ContextBuilder::new()
            .build(ymd(2024, 12, 6))
            .unwrap()
            .is_local_commemoration_day());
    }

    #[test]
    fn out_of_epoch_dates() {
        let builder = ContextBuilder::new();
        assert_eq!(
            builder.build(ymd(1500, 6, 1)),
            Err(CalendarError::out_of_range(1500))
        );
        assert!(builder.build(ymd(4100, 1, 1)).is_err());
        // early 1583 needs the 1582 anchor for its tone
        assert!(builder.build(ymd(1583, 1, 10)).is_err());
        assert!(builder.build(ymd(1583, 12, 1)).is_ok());
    }

    #[test]
    fn anchors_are_cached() {
        let builder = ContextBuilder::new();
        let first = builder.anchor(2030).unwrap();
        let second = builder.anchor(2030).unwrap();
        assert_eq!(first, second);
        assert!(builder.anchors.contains_key(&2030));
    }

    proptest! {
        #[test]
        fn offset_matches_anchor_difference(days in 0i64..(365 * 400)) {
            let date = ymd(1700, 1, 1) + chrono::Duration::days(days);
            let builder = ContextBuilder::new();
            let ctx = builder.build(date).unwrap();
            let anchor = anchor_date(date.year()).unwrap();
            prop_assert_eq!(ctx.day_offset_from_anchor(), (date - anchor).num_days());
            prop_assert_eq!(ctx.season(), Season::from_offset(ctx.day_offset_from_anchor()));
            prop_assert!((1..=8).contains(&ctx.tone()));
            prop_assert!(ctx.weekday_index() < 7);
        }
    }
}
