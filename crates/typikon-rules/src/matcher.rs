//! Generic priority-ordered match tables
//!
//! Every rule family of the engine (seasonal rubrics, ranks, scenarios,
//! general cases, menaion variants) is a [`MatchTable`]: an ordered list of
//! `(id, priority, trigger, payload)` rules evaluated against some input.
//!
//! # Selection
//!
//! - [`MatchTable::best_match`]: highest priority wins; ties go to the rule
//!   declared first.
//! - [`MatchTable::first_match`]: first rule in declaration order whose
//!   trigger matches.
//!
//! Declaration order is preserved through serde, so a table loaded from
//! configuration resolves exactly as written.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RulesError, RulesResult};

/// A trigger that can be evaluated against an input
pub trait Predicate<I: ?Sized> {
    /// Check if the trigger is satisfied by the input
    fn matches(&self, input: &I) -> bool;
}

/// One rule of a match table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "P: Serialize, T: Serialize",
    deserialize = "P: Deserialize<'de> + Default, T: Deserialize<'de>"
))]
pub struct MatchRule<P, T> {
    /// Rule identifier (also the active key for exclusion lists)
    pub id: String,
    /// Declared priority, higher wins
    #[serde(default)]
    pub priority: i32,
    /// Condition under which the rule applies
    #[serde(default)]
    pub trigger: P,
    /// Data carried by the rule
    pub payload: T,
}

impl<P, T> MatchRule<P, T> {
    /// Create rule
    pub fn new(id: impl Into<String>, priority: i32, trigger: P, payload: T) -> Self {
        Self {
            id: id.into(),
            priority,
            trigger,
            payload,
        }
    }
}

/// Ordered collection of rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "P: Serialize, T: Serialize",
    deserialize = "P: Deserialize<'de> + Default, T: Deserialize<'de>"
))]
pub struct MatchTable<P, T> {
    rules: Vec<MatchRule<P, T>>,
}

impl<P, T> MatchTable<P, T> {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create table from rules, rejecting duplicate ids
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::DuplicateRuleId`] if two rules share an id.
    pub fn from_rules(rules: Vec<MatchRule<P, T>>) -> RulesResult<Self> {
        let table = Self { rules };
        table.check_unique_ids()?;
        Ok(table)
    }

    /// Append rule (lowest declaration precedence)
    #[must_use]
    pub fn with_rule(mut self, rule: MatchRule<P, T>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append rule in place
    pub fn push(&mut self, rule: MatchRule<P, T>) {
        self.rules.push(rule);
    }

    /// Rules in declaration order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[MatchRule<P, T>] {
        &self.rules
    }

    /// Rule by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MatchRule<P, T>> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if table has no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Verify that rule ids are unique
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::DuplicateRuleId`] naming the first repeated id.
    pub fn check_unique_ids(&self) -> RulesResult<()> {
        let mut seen = HashSet::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(RulesError::DuplicateRuleId(rule.id.clone()));
            }
        }
        Ok(())
    }

    /// Highest-priority matching rule; ties resolve to the first declared
    pub fn best_match<I: ?Sized>(&self, input: &I) -> Option<&MatchRule<P, T>>
    where
        P: Predicate<I>,
    {
        let mut best: Option<&MatchRule<P, T>> = None;
        for rule in self.rules.iter().filter(|rule| rule.trigger.matches(input)) {
            // strictly greater keeps the earlier rule on ties
            if best.map_or(true, |current| rule.priority > current.priority) {
                best = Some(rule);
            }
        }
        best
    }

    /// First matching rule in declaration order
    pub fn first_match<I: ?Sized>(&self, input: &I) -> Option<&MatchRule<P, T>>
    where
        P: Predicate<I>,
    {
        self.rules.iter().find(|rule| rule.trigger.matches(input))
    }

    /// All matching rules in declaration order
    pub fn matching<'a, I: ?Sized>(
        &'a self,
        input: &'a I,
    ) -> impl Iterator<Item = &'a MatchRule<P, T>> + 'a
    where
        P: Predicate<I>,
    {
        self.rules.iter().filter(move |rule| rule.trigger.matches(input))
    }
}

impl<P, T> Default for MatchTable<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, T> FromIterator<MatchRule<P, T>> for MatchTable<P, T> {
    fn from_iter<It: IntoIterator<Item = MatchRule<P, T>>>(iter: It) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
