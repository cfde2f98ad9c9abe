//! Rank and paradigm classification
//!
//! Rank is the precedence tier of a day (1 = highest, 5 = lowest). Paradigm
//! is the structural family of its services. Paradigm is always derived
//! after rank: a feast of the Lord falling on a Sunday suppresses the
//! resurrection material entirely, so the rank check has to come first.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use typikon_calendar::Context;

use crate::error::{RulesError, RulesResult};
use crate::matcher::MatchTable;
use crate::trigger::{Facts, Trigger};

/// Precedence tier, 1 (highest) to 5 (lowest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    /// Great feasts of the Lord and the Theotokos
    pub const HIGHEST: Self = Self(1);
    /// Simple commemorations
    pub const LOWEST: Self = Self(5);
    /// Rank of an ordinary day with nothing else to go on
    pub const DEFAULT: Self = Self(4);

    /// Create rank
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidRank`] outside 1..=5.
    pub fn new(value: u8) -> RulesResult<Self> {
        if (Self::HIGHEST.0..=Self::LOWEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RulesError::InvalidRank(value))
        }
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Check if `self` takes precedence over `other`
    #[inline]
    #[must_use]
    pub fn outranks(self, other: Self) -> bool {
        self.0 < other.0
    }

    /// Check if the rank is at least as high as `tier`
    #[inline]
    #[must_use]
    pub fn at_least(self, tier: Self) -> bool {
        self.0 <= tier.0
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Rank {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank {}", self.0)
    }
}

/// Structural family of a day's services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Paradigm {
    /// Rank-1 feast; resurrection material is suppressed
    FeastOfTheLord,
    /// Weekly commemoration of the resurrection
    SundayResurrection,
    /// Any other day
    OrdinaryWeekday,
}

impl Paradigm {
    /// Stable name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeastOfTheLord => "feast-of-the-lord",
            Self::SundayResurrection => "sunday-resurrection",
            Self::OrdinaryWeekday => "ordinary-weekday",
        }
    }
}

impl fmt::Display for Paradigm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typikon class of a commemorated saint or feast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommemorationKind {
    /// Great feast
    GreatFeast,
    /// All-night vigil
    Vigil,
    /// Polyeleos
    Polyeleos,
    /// Great doxology
    Doxology,
    /// Six stichera
    SixStichera,
    /// Simple commemoration
    #[default]
    Simple,
}

impl CommemorationKind {
    /// Rank implied by the class
    #[must_use]
    pub fn default_rank(self) -> Rank {
        match self {
            Self::GreatFeast => Rank(1),
            Self::Vigil => Rank(2),
            Self::Polyeleos | Self::Doxology => Rank(3),
            Self::SixStichera => Rank(4),
            Self::Simple => Rank(5),
        }
    }
}

/// A saint or feast commemorated on a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commemoration {
    /// Display name
    pub name: String,
    /// Typikon class
    #[serde(default)]
    pub kind: CommemorationKind,
    /// Explicit rank that bypasses derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_rank: Option<Rank>,
    /// Tone of the troparion, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub troparion_tone: Option<u8>,
}

impl Commemoration {
    /// Create commemoration
    pub fn new(name: impl Into<String>, kind: CommemorationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            override_rank: None,
            troparion_tone: None,
        }
    }

    /// Pin the rank regardless of class
    #[must_use]
    pub fn with_override_rank(mut self, rank: Rank) -> Self {
        self.override_rank = Some(rank);
        self
    }

    /// Effective rank of this commemoration
    #[inline]
    #[must_use]
    pub fn rank(&self) -> Rank {
        self.override_rank.unwrap_or_else(|| self.kind.default_rank())
    }
}

/// Seasonal rank table: trigger → rank
pub type RankTable = MatchTable<Trigger, Rank>;

/// Assign a precedence rank to a day
///
/// An explicit override on any commemoration wins outright (the highest
/// override if several). Otherwise the result is the highest of the seasonal
/// table's best match and the commemorations' own ranks, falling back to
/// [`Rank::DEFAULT`].
#[must_use]
pub fn classify_rank(
    context: &Context,
    commemorations: &[Commemoration],
    table: &RankTable,
) -> Rank {
    if let Some(rank) = commemorations.iter().filter_map(|c| c.override_rank).min() {
        debug!(%rank, "rank pinned by override");
        return rank;
    }

    let facts = Facts::new(context).with_commemorations(commemorations);
    let seasonal = table.best_match(&facts).map(|rule| rule.payload);
    let commemorated = commemorations.iter().map(Commemoration::rank).min();

    seasonal
        .into_iter()
        .chain(commemorated)
        .min()
        .unwrap_or(Rank::DEFAULT)
}

/// Derive the paradigm from rank, then weekday
#[must_use]
pub fn classify_paradigm(context: &Context, rank: Rank) -> Paradigm {
    if rank == Rank::HIGHEST {
        Paradigm::FeastOfTheLord
    } else if context.is_sunday() {
        Paradigm::SundayResurrection
    } else {
        Paradigm::OrdinaryWeekday
    }
}
