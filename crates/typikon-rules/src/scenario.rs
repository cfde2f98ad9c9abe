//! Scenario and collision matching
//!
//! Names the occasion a date is celebrated as. Resolution runs in three
//! stages and stops at the first that produces an answer:
//!
//! 1. **Movable**: the anchor offset is looked up in the [`MovableRegistry`].
//!    On a hit, the [`CollisionTable`] is consulted with
//!    `(month_day, movable_key)`; a collision rule supersedes the plain
//!    movable scenario.
//! 2. **Local**: on the local commemoration day the local scenario table
//!    (offset ranges, weekday sets, exclusion lists) picks a handling case.
//! 3. **Ordinary**: [`ScenarioId::ORDINARY`].
//!
//! The collision table is only consulted after a movable hit. Matching never
//! fails.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use typikon_calendar::MonthDay;

use crate::error::{RulesError, RulesResult};
use crate::matcher::MatchTable;
use crate::trigger::{Facts, Trigger};

/// Identifier of a resolved occasion
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Identifier returned when nothing else matches
    pub const ORDINARY: &'static str = "standard_day";

    /// Create identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ordinary-day identifier
    #[must_use]
    pub fn ordinary() -> Self {
        Self(Self::ORDINARY.to_string())
    }

    /// Identifier as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Registry entry for a named day of the movable cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableFeast {
    /// Anchor offset of the day
    pub offset: i64,
    /// Movable-slot key used by collision rules (e.g. `pascha`)
    pub key: String,
    /// Scenario of the day absent any collision
    pub scenario: ScenarioId,
    /// Precedence among entries sharing an offset
    #[serde(default)]
    pub priority: i32,
}

/// Offset-keyed registry of movable feasts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MovableFeast>", into = "Vec<MovableFeast>")]
pub struct MovableRegistry {
    entries: Vec<MovableFeast>,
    by_offset: HashMap<i64, Vec<usize>>,
}

impl MovableRegistry {
    /// Create registry from entries in declaration order
    #[must_use]
    pub fn new(entries: Vec<MovableFeast>) -> Self {
        let mut by_offset: HashMap<i64, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_offset.entry(entry.offset).or_default().push(index);
        }
        Self { entries, by_offset }
    }

    /// Entry for an offset; highest priority wins, ties to the first declared
    #[must_use]
    pub fn lookup(&self, offset: i64) -> Option<&MovableFeast> {
        let mut best: Option<&MovableFeast> = None;
        for entry in self
            .by_offset
            .get(&offset)
            .into_iter()
            .flatten()
            .map(|&index| &self.entries[index])
        {
            if best.map_or(true, |current| entry.priority > current.priority) {
                best = Some(entry);
            }
        }
        best
    }

    /// Entries in declaration order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[MovableFeast] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<MovableFeast>> for MovableRegistry {
    fn from(entries: Vec<MovableFeast>) -> Self {
        Self::new(entries)
    }
}

impl From<MovableRegistry> for Vec<MovableFeast> {
    fn from(registry: MovableRegistry) -> Self {
        registry.entries
    }
}

/// How a fixed commemoration is handled on a movable day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionAction {
    /// Fixed commemoration moves to another day
    Transfer,
    /// Both are celebrated in one combined service
    Merge,
    /// Temple patron's material is dropped
    SuppressTemplePatron,
}

/// Rule for a fixed commemoration falling on a named movable day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRule {
    /// Fixed-cycle day
    pub month_day: MonthDay,
    /// Movable-slot key
    pub movable_key: String,
    /// Scenario that supersedes the movable one
    pub scenario: ScenarioId,
    /// Handling of the fixed commemoration
    pub action: CollisionAction,
    /// Combined service title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Rubric overrides applied on the day
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub overrides: IndexMap<String, String>,
}

/// Collision rules keyed by `(month_day, movable_key)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CollisionRule>", into = "Vec<CollisionRule>")]
pub struct CollisionTable {
    rules: Vec<CollisionRule>,
    index: HashMap<(MonthDay, String), usize>,
}

impl CollisionTable {
    /// Create table, rejecting duplicate keys
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::DuplicateCollision`] when two rules share a key.
    pub fn new(rules: Vec<CollisionRule>) -> RulesResult<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            let key = (rule.month_day, rule.movable_key.clone());
            if index.insert(key, position).is_some() {
                return Err(RulesError::DuplicateCollision {
                    month_day: rule.month_day,
                    movable_key: rule.movable_key.clone(),
                });
            }
        }
        Ok(Self { rules, index })
    }

    /// Rule for a fixed day on a movable slot
    #[must_use]
    pub fn lookup(&self, month_day: MonthDay, movable_key: &str) -> Option<&CollisionRule> {
        self.index
            .get(&(month_day, movable_key.to_string()))
            .map(|&position| &self.rules[position])
    }

    /// Rules in declaration order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[CollisionRule] {
        &self.rules
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<CollisionRule>> for CollisionTable {
    type Error = RulesError;

    fn try_from(rules: Vec<CollisionRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<CollisionTable> for Vec<CollisionRule> {
    fn from(table: CollisionTable) -> Self {
        table.rules
    }
}

/// Local scenario table: trigger → scenario id
pub type LocalScenarioTable = MatchTable<Trigger, ScenarioId>;

/// Stage that produced a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioSource {
    /// Movable-feast registry
    Movable,
    /// Collision table
    Collision,
    /// Local commemoration rules
    Local,
    /// Nothing matched
    Ordinary,
}

/// Result of scenario identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMatch {
    /// Selected scenario
    pub id: ScenarioId,
    /// Stage that selected it
    pub source: ScenarioSource,
    /// Priority of the winning rule
    pub priority: i32,
    /// Movable-slot key, when the day is in the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movable_key: Option<String>,
    /// Collision rule in force
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<CollisionRule>,
}

impl ScenarioMatch {
    /// The ordinary-day match
    #[must_use]
    pub fn ordinary() -> Self {
        Self {
            id: ScenarioId::ordinary(),
            source: ScenarioSource::Ordinary,
            priority: 0,
            movable_key: None,
            collision: None,
        }
    }

    /// Check if a collision rule was applied
    #[inline]
    #[must_use]
    pub fn is_collision(&self) -> bool {
        self.collision.is_some()
    }
}

/// Borrowing view over the three scenario tables
#[derive(Debug, Clone, Copy)]
pub struct ScenarioMatcher<'a> {
    movable: &'a MovableRegistry,
    collisions: &'a CollisionTable,
    local: &'a LocalScenarioTable,
}

impl<'a> ScenarioMatcher<'a> {
    /// Create matcher over tables
    #[must_use]
    pub fn new(
        movable: &'a MovableRegistry,
        collisions: &'a CollisionTable,
        local: &'a LocalScenarioTable,
    ) -> Self {
        Self {
            movable,
            collisions,
            local,
        }
    }

    /// Name the occasion of a day
    #[must_use]
    pub fn identify(&self, facts: &Facts<'_>) -> ScenarioMatch {
        let ctx = facts.context;

        if let Some(feast) = self.movable.lookup(ctx.day_offset_from_anchor()) {
            if let Some(rule) = self.collisions.lookup(ctx.month_day(), &feast.key) {
                info!(
                    date = %ctx.date(),
                    movable = %feast.key,
                    scenario = %rule.scenario,
                    action = ?rule.action,
                    "collision rule applied"
                );
                return ScenarioMatch {
                    id: rule.scenario.clone(),
                    source: ScenarioSource::Collision,
                    priority: feast.priority,
                    movable_key: Some(feast.key.clone()),
                    collision: Some(rule.clone()),
                };
            }
            debug!(date = %ctx.date(), scenario = %feast.scenario, "movable feast");
            return ScenarioMatch {
                id: feast.scenario.clone(),
                source: ScenarioSource::Movable,
                priority: feast.priority,
                movable_key: Some(feast.key.clone()),
                collision: None,
            };
        }

        if ctx.is_local_commemoration_day() {
            if let Some(rule) = self.local.best_match(facts) {
                debug!(date = %ctx.date(), scenario = %rule.payload, rule = %rule.id, "local case");
                return ScenarioMatch {
                    id: rule.payload.clone(),
                    source: ScenarioSource::Local,
                    priority: rule.priority,
                    movable_key: None,
                    collision: None,
                };
            }
        }

        ScenarioMatch::ordinary()
    }
}
