//! Seasons and named periods of the movable cycle
//!
//! Both are pure functions of the day offset from the anchor. [`Season`] is the
//! coarse partition used by rule triggers; [`Period`] names the individual
//! days and weeks the services treat specially.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// First offset of the pre-festal window (Sunday of the Publican and Pharisee)
pub const PRE_FESTAL_START: i64 = -70;

/// Last offset of the post-festal window (Sunday of All Saints)
pub const POST_FESTAL_END: i64 = 56;

/// First offset of the Great Fast weekdays (Clean Monday)
pub const GREAT_FAST_START: i64 = -48;

/// Closed set of seasons
///
/// The four variants partition every possible offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    /// Governed by the eight-tone cycle alone
    Ordinary,
    /// The window immediately before the anchor
    PreFestal,
    /// The anchor day itself
    FeastOfTheAnchor,
    /// The window immediately after the anchor
    PostFestal,
}

impl Season {
    /// All seasons in calendar order
    pub const ALL: [Self; 4] = [
        Self::Ordinary,
        Self::PreFestal,
        Self::FeastOfTheAnchor,
        Self::PostFestal,
    ];

    /// Map an anchor offset to its season
    #[must_use]
    pub fn from_offset(offset: i64) -> Self {
        match offset {
            PRE_FESTAL_START..=-1 => Self::PreFestal,
            0 => Self::FeastOfTheAnchor,
            1..=POST_FESTAL_END => Self::PostFestal,
            _ => Self::Ordinary,
        }
    }

    /// Stable name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::PreFestal => "pre-festal",
            Self::FeastOfTheAnchor => "feast-of-the-anchor",
            Self::PostFestal => "post-festal",
        }
    }

    /// Book that supplies the seasonal propers
    #[inline]
    #[must_use]
    pub fn book(self) -> LiturgicalBook {
        match self {
            Self::Ordinary => LiturgicalBook::Octoechos,
            Self::PreFestal => LiturgicalBook::Triodion,
            Self::FeastOfTheAnchor | Self::PostFestal => LiturgicalBook::Pentecostarion,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|season| season.as_str() == s)
            .ok_or_else(|| format!("unknown season: {s}"))
    }
}

/// Service book governing a season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiturgicalBook {
    /// Book of the eight tones
    Octoechos,
    /// Lenten triodion
    Triodion,
    /// Flowery triodion
    Pentecostarion,
}

impl LiturgicalBook {
    /// Asset key prefix for the book
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Octoechos => "octoechos",
            Self::Triodion => "triodion",
            Self::Pentecostarion => "pentecostarion",
        }
    }
}

impl fmt::Display for LiturgicalBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named day or stretch of the movable cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    /// The anchor day
    Pascha,
    /// Offset -1
    HolySaturday,
    /// Offset -2
    HolyFriday,
    /// Offsets 1..=6
    BrightWeek,
    /// Offset 7
    ThomasSunday,
    /// Offset 39
    Ascension,
    /// Offset 49
    Pentecost,
    /// Offset 50
    MondayHolySpirit,
    /// Remaining days of the Great Fast, offsets -48..=-3
    LentWeekday,
    /// Everything else
    Normal,
}

impl Period {
    /// Map an anchor offset to its period
    #[must_use]
    pub fn from_offset(offset: i64) -> Self {
        match offset {
            0 => Self::Pascha,
            -1 => Self::HolySaturday,
            -2 => Self::HolyFriday,
            1..=6 => Self::BrightWeek,
            7 => Self::ThomasSunday,
            39 => Self::Ascension,
            49 => Self::Pentecost,
            50 => Self::MondayHolySpirit,
            GREAT_FAST_START..=-3 => Self::LentWeekday,
            _ => Self::Normal,
        }
    }

    /// Stable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pascha => "pascha",
            Self::HolySaturday => "holy-saturday",
            Self::HolyFriday => "holy-friday",
            Self::BrightWeek => "bright-week",
            Self::ThomasSunday => "thomas-sunday",
            Self::Ascension => "ascension",
            Self::Pentecost => "pentecost",
            Self::MondayHolySpirit => "monday-holy-spirit",
            Self::LentWeekday => "lent-weekday",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn season_boundaries() {
        assert_eq!(Season::from_offset(-71), Season::Ordinary);
        assert_eq!(Season::from_offset(-70), Season::PreFestal);
        assert_eq!(Season::from_offset(-1), Season::PreFestal);
        assert_eq!(Season::from_offset(0), Season::FeastOfTheAnchor);
        assert_eq!(Season::from_offset(1), Season::PostFestal);
        assert_eq!(Season::from_offset(56), Season::PostFestal);
        assert_eq!(Season::from_offset(57), Season::Ordinary);
    }

    #[test]
    fn season_books() {
        assert_eq!(Season::Ordinary.book(), LiturgicalBook::Octoechos);
        assert_eq!(Season::PreFestal.book(), LiturgicalBook::Triodion);
        assert_eq!(Season::FeastOfTheAnchor.book(), LiturgicalBook::Pentecostarion);
    }

    #[test]
    fn season_names_round_trip() {
        for season in Season::ALL {
            assert_eq!(season.as_str().parse::<Season>().unwrap(), season);
            let json = serde_json::to_string(&season).unwrap();
            assert_eq!(json, format!("\"{season}\""));
        }
        assert!("lent".parse::<Season>().is_err());
    }

    #[test]
    fn named_periods() {
        assert_eq!(Period::from_offset(0), Period::Pascha);
        assert_eq!(Period::from_offset(-2), Period::HolyFriday);
        assert_eq!(Period::from_offset(-1), Period::HolySaturday);
        assert_eq!(Period::from_offset(-3), Period::LentWeekday);
        assert_eq!(Period::from_offset(-48), Period::LentWeekday);
        assert_eq!(Period::from_offset(-49), Period::Normal);
        assert_eq!(Period::from_offset(3), Period::BrightWeek);
        assert_eq!(Period::from_offset(7), Period::ThomasSunday);
        assert_eq!(Period::from_offset(39), Period::Ascension);
        assert_eq!(Period::from_offset(49), Period::Pentecost);
        assert_eq!(Period::from_offset(50), Period::MondayHolySpirit);
        assert_eq!(Period::from_offset(120), Period::Normal);
    }

    proptest! {
        #[test]
        fn seasons_partition_offsets(offset in -400i64..400) {
            let hits = [
                (-70..=-1).contains(&offset),
                offset == 0,
                (1..=56).contains(&offset),
                !(-70..=56).contains(&offset),
            ];
            prop_assert_eq!(hits.iter().filter(|hit| **hit).count(), 1);
            let expected = Season::ALL[hits.iter().position(|hit| *hit).map_or(0, |i| (i + 1) % 4)];
            prop_assert_eq!(Season::from_offset(offset), expected);
        }
    }
}
