//! Declarative trigger predicates
//!
//! A [`Trigger`] is a conjunction of optional conditions. Absent fields are
//! satisfied by anything, so the empty trigger matches every day. Triggers
//! are evaluated against [`Facts`]: the date's [`Context`] plus what has been
//! resolved so far (the active seasonal key, the rank, the commemorations).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use typikon_calendar::{Context, Period, Season};

use crate::matcher::Predicate;
use crate::rank::{Commemoration, CommemorationKind, Rank};

/// Inclusive anchor-offset range, written `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRange(pub i64, pub i64);

impl OffsetRange {
    /// Check if offset is inside the range
    #[inline]
    #[must_use]
    pub fn contains(self, offset: i64) -> bool {
        (self.0..=self.1).contains(&offset)
    }
}

/// Inclusive rank tier, written `[highest, lowest]` (e.g. `[1, 3]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier(pub Rank, pub Rank);

impl RankTier {
    /// Check if rank is inside the tier
    #[inline]
    #[must_use]
    pub fn contains(self, rank: Rank) -> bool {
        (self.0..=self.1).contains(&rank)
    }
}

/// What a trigger is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct Facts<'a> {
    /// Coordinates of the date
    pub context: &'a Context,
    /// Id of the seasonal rule already in force, if any
    pub active_key: Option<&'a str>,
    /// Rank, once classified
    pub rank: Option<Rank>,
    /// Commemorations of the day
    pub commemorations: &'a [Commemoration],
}

impl<'a> Facts<'a> {
    /// Facts carrying only the date's context
    #[inline]
    #[must_use]
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            active_key: None,
            rank: None,
            commemorations: &[],
        }
    }

    /// Set the active seasonal key
    #[inline]
    #[must_use]
    pub fn with_active_key(mut self, key: Option<&'a str>) -> Self {
        self.active_key = key;
        self
    }

    /// Set the classified rank
    #[inline]
    #[must_use]
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Set the commemorations
    #[inline]
    #[must_use]
    pub fn with_commemorations(mut self, commemorations: &'a [Commemoration]) -> Self {
        self.commemorations = commemorations;
        self
    }
}

/// Conjunction of optional day conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Trigger {
    /// Liturgical weekdays (Sunday = 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<BTreeSet<u8>>,
    /// Exact anchor offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_offset: Option<i64>,
    /// Inclusive anchor-offset range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_offset_range: Option<OffsetRange>,
    /// Season
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    /// Named periods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BTreeSet<Period>>,
    /// Weeks of the Great Fast (1..=7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lenten_week: Option<BTreeSet<u8>>,
    /// Active seasonal keys that disqualify this rule
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_keys: Vec<String>,
    /// Rank tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<RankTier>,
    /// At least one commemoration of these kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commemoration_type: Option<BTreeSet<CommemorationKind>>,
    /// Exact number of commemorations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commemoration_count: Option<usize>,
}

impl Trigger {
    /// Trigger matching every day
    #[inline]
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Trigger on an exact anchor offset
    #[must_use]
    pub fn on_offset(offset: i64) -> Self {
        Self {
            anchor_offset: Some(offset),
            ..Self::default()
        }
    }

    /// Trigger on an inclusive offset range
    #[must_use]
    pub fn in_offsets(lo: i64, hi: i64) -> Self {
        Self {
            anchor_offset_range: Some(OffsetRange(lo, hi)),
            ..Self::default()
        }
    }

    /// Restrict to weekdays
    #[must_use]
    pub fn on_weekdays(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.day_of_week = Some(days.into_iter().collect());
        self
    }

    /// Disqualify for an active seasonal key
    #[must_use]
    pub fn excluding(mut self, key: impl Into<String>) -> Self {
        self.exclude_keys.push(key.into());
        self
    }
}

impl Predicate<Facts<'_>> for Trigger {
    fn matches(&self, facts: &Facts<'_>) -> bool {
        let ctx = facts.context;
        let offset = ctx.day_offset_from_anchor();

        if let Some(days) = &self.day_of_week {
            if !days.contains(&ctx.weekday_index()) {
                return false;
            }
        }
        if self.anchor_offset.is_some_and(|expected| expected != offset) {
            return false;
        }
        if self.anchor_offset_range.is_some_and(|range| !range.contains(offset)) {
            return false;
        }
        if self.season.is_some_and(|season| season != ctx.season()) {
            return false;
        }
        if let Some(periods) = &self.period {
            if !periods.contains(&ctx.period()) {
                return false;
            }
        }
        if let Some(weeks) = &self.lenten_week {
            match ctx.lenten_week() {
                Some(week) if weeks.contains(&week) => {}
                _ => return false,
            }
        }
        if let Some(active) = facts.active_key {
            if self.exclude_keys.iter().any(|key| key == active) {
                return false;
            }
        }
        if let Some(tier) = self.rank {
            if !facts.rank.is_some_and(|rank| tier.contains(rank)) {
                return false;
            }
        }
        if let Some(kinds) = &self.commemoration_type {
            if !facts.commemorations.iter().any(|c| kinds.contains(&c.kind)) {
                return false;
            }
        }
        if self
            .commemoration_count
            .is_some_and(|count| count != facts.commemorations.len())
        {
            return false;
        }
        true
    }
}
