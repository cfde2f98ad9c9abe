//! Slots: the addressable units of a service
//!
//! A [`Slot`] has an id, an optional rubric annotation and a tagged
//! [`SlotContent`] descriptor. Slots produced by template expansion are only
//! ever read; edits go through [`OverrideOp`](crate::OverrideOp) and yield
//! new slots.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Arguments passed to a variable-logic resolver
pub type LogicArgs = IndexMap<String, Value>;

/// Closed set of variable-logic resolvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverId {
    /// Symbolic token → asset key
    VariableReference,
    /// General-case distribution of a stack
    SticheraDistribution,
    /// Troparia and kontakia order with temple priority
    TropariaStack,
    /// Entrance verse of the liturgy
    Isodikon,
    /// Hierarchical dismissal
    Dismissal,
    /// Antiphons of the liturgy
    Antiphons,
    /// Hymn to the Theotokos after the anaphora
    Magnification,
    /// Psalter reading at vespers
    VespersKathisma,
    /// Entrance at vespers
    VespersEntrance,
    /// Great doxology sung or read
    DoxologyMode,
    /// Seasonal katavasia
    Katavasia,
    /// Communion hymn
    CommunionHymn,
    /// Odes of the lenten triodion canon
    CanonOdes,
    /// Resurrectional gospel of matins
    Eothinon,
    /// God is the Lord, or Alleluia on lenten weekdays
    GodIsTheLord,
    /// Trisagion prayers and hymn with their festal substitutions
    Trisagion,
    /// Troparia of one of the hours
    HoursTroparia,
    /// Kontakion of one of the hours
    HoursKontakion,
    /// Cherubic hymn of the liturgy
    CherubicHymn,
}

impl ResolverId {
    /// Every resolver id
    pub const ALL: [Self; 19] = [
        Self::VariableReference,
        Self::SticheraDistribution,
        Self::TropariaStack,
        Self::Isodikon,
        Self::Dismissal,
        Self::Antiphons,
        Self::Magnification,
        Self::VespersKathisma,
        Self::VespersEntrance,
        Self::DoxologyMode,
        Self::Katavasia,
        Self::CommunionHymn,
        Self::CanonOdes,
        Self::Eothinon,
        Self::GodIsTheLord,
        Self::Trisagion,
        Self::HoursTroparia,
        Self::HoursKontakion,
        Self::CherubicHymn,
    ];

    /// Stable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VariableReference => "variable_reference",
            Self::SticheraDistribution => "stichera_distribution",
            Self::TropariaStack => "troparia_stack",
            Self::Isodikon => "isodikon",
            Self::Dismissal => "dismissal",
            Self::Antiphons => "antiphons",
            Self::Magnification => "magnification",
            Self::VespersKathisma => "vespers_kathisma",
            Self::VespersEntrance => "vespers_entrance",
            Self::DoxologyMode => "doxology_mode",
            Self::Katavasia => "katavasia",
            Self::CommunionHymn => "communion_hymn",
            Self::CanonOdes => "canon_odes",
            Self::Eothinon => "eothinon",
            Self::GodIsTheLord => "god_is_the_lord",
            Self::Trisagion => "trisagion",
            Self::HoursTroparia => "hours_troparia",
            Self::HoursKontakion => "hours_kontakion",
            Self::CherubicHymn => "cherubic_hymn",
        }
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown resolver: {s}"))
    }
}

/// What a slot is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotContent {
    /// One asset key
    FixedRef {
        /// Asset key
        key: String,
    },
    /// Several asset keys rendered in order
    RefGroup {
        /// Asset keys
        keys: Vec<String>,
    },
    /// Content computed by a resolver
    VariableLogic {
        /// Resolver to dispatch to
        function: ResolverId,
        /// Resolver arguments
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        args: LogicArgs,
    },
    /// Literal lines rendered verbatim (empty for rubric-only slots)
    LiteralSequence {
        /// Lines
        #[serde(default)]
        lines: Vec<String>,
    },
}

impl Default for SlotContent {
    fn default() -> Self {
        Self::LiteralSequence { lines: Vec::new() }
    }
}

/// One unit of a service skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot id, the target of override operations
    pub id: String,
    /// Rubrical annotation shown before the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    /// Content descriptor
    #[serde(default)]
    pub content: SlotContent,
}

impl Slot {
    /// Fixed-reference slot
    pub fn fixed(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rubric: None,
            content: SlotContent::FixedRef { key: key.into() },
        }
    }

    /// Reference-group slot
    pub fn group<I, K>(id: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            id: id.into(),
            rubric: None,
            content: SlotContent::RefGroup {
                keys: keys.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Variable-logic slot
    pub fn logic(id: impl Into<String>, function: ResolverId) -> Self {
        Self {
            id: id.into(),
            rubric: None,
            content: SlotContent::VariableLogic {
                function,
                args: LogicArgs::new(),
            },
        }
    }

    /// Literal slot
    pub fn literal<I, L>(id: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            rubric: None,
            content: SlotContent::LiteralSequence {
                lines: lines.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Set rubric annotation
    #[must_use]
    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    /// Add a resolver argument (variable-logic slots only)
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let SlotContent::VariableLogic { args, .. } = &mut self.content {
            args.insert(name.into(), value.into());
        }
        self
    }

    /// Copy of this slot with a patch merged in
    ///
    /// The rubric is replaced when the patch carries one; logic arguments are
    /// merged key by key. Fields the patch does not mention are kept.
    #[must_use]
    pub fn patched(&self, rubric: Option<&str>, logic_args: Option<&LogicArgs>) -> Self {
        let mut slot = self.clone();
        if let Some(rubric) = rubric {
            slot.rubric = Some(rubric.to_string());
        }
        if let Some(patch) = logic_args {
            match &mut slot.content {
                SlotContent::VariableLogic { args, .. } => {
                    for (name, value) in patch {
                        args.insert(name.clone(), value.clone());
                    }
                }
                _ => debug!(slot = %slot.id, "logic_args ignored on non-logic slot"),
            }
        }
        slot
    }
}
