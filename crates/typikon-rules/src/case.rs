//! General-case decision table
//!
//! A general case maps (weekday, rank tier, period, commemoration type) to
//! hymn-count distributions, one per stack (`vespers`, `canon`, `praises`,
//! ...). The table is scanned in declaration order and the first case whose
//! trigger fully matches wins.
//!
//! A distribution may carry a `switch` keyed by a secondary cardinality
//! (currently the number of commemorations); the matching branch replaces
//! the base distribution before quantities are read. Every branch is checked
//! at load time: quantities must sum to the declared total.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RulesError, RulesResult};
use crate::matcher::{MatchRule, MatchTable};
use crate::trigger::{Facts, Trigger};

/// One `(source, quantity)` entry of a distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Book or proper supplying the hymns (e.g. `octoechos`, `menaion`)
    pub source: String,
    /// Family within the source (e.g. `resurrection`, `saint`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Number of hymns taken
    pub quantity: u32,
}

impl Allocation {
    /// Create allocation
    pub fn new(source: impl Into<String>, kind: Option<&str>, quantity: u32) -> Self {
        Self {
            source: source.into(),
            kind: kind.map(str::to_string),
            quantity,
        }
    }

    /// `source` or `source.kind`
    #[must_use]
    pub fn label(&self) -> String {
        match &self.kind {
            Some(kind) => format!("{}.{kind}", self.source),
            None => self.source.clone(),
        }
    }
}

/// Secondary key a switch is resolved on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchKey {
    /// Number of concurrent commemorations
    CommemorationCount,
}

/// Nested distributions selected by a secondary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSwitch {
    /// Key the branches are selected on
    pub on: SwitchKey,
    /// Branch per key value
    pub cases: BTreeMap<usize, DistributionSpec>,
}

/// Total slot count and its split across sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSpec {
    /// Declared total
    pub total: u32,
    /// Ordered allocations
    pub distribution: Vec<Allocation>,
    /// Optional branches replacing this spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<DistributionSwitch>,
}

impl DistributionSpec {
    /// Create spec without a switch
    #[must_use]
    pub fn new(total: u32, distribution: Vec<Allocation>) -> Self {
        Self {
            total,
            distribution,
            switch: None,
        }
    }

    /// Attach a switch branch
    #[must_use]
    pub fn with_branch(mut self, on: SwitchKey, key: usize, branch: Self) -> Self {
        self.switch
            .get_or_insert_with(|| DistributionSwitch {
                on,
                cases: BTreeMap::new(),
            })
            .cases
            .insert(key, branch);
        self
    }

    /// Sum of allocation quantities, widened so that no total overflows
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.distribution.iter().map(|a| u64::from(a.quantity)).sum()
    }

    /// Check the sum of this spec and every branch
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::DistributionMismatch`] for the first spec whose
    /// quantities do not add up to its total.
    pub fn validate(&self, case_id: &str, stack: &str) -> RulesResult<()> {
        let actual = self.sum();
        if actual != u64::from(self.total) {
            return Err(RulesError::distribution_mismatch(
                case_id, stack, self.total, actual,
            ));
        }
        if let Some(switch) = &self.switch {
            for (key, branch) in &switch.cases {
                branch.validate(case_id, &format!("{stack}[{key}]"))?;
            }
        }
        Ok(())
    }

    /// Apply the switch (recursively) and drop it
    #[must_use]
    pub fn select(&self, facts: &Facts<'_>) -> Self {
        if let Some(switch) = &self.switch {
            let key = match switch.on {
                SwitchKey::CommemorationCount => facts.commemorations.len(),
            };
            if let Some(branch) = switch.cases.get(&key) {
                return branch.select(facts);
            }
        }
        Self::new(self.total, self.distribution.clone())
    }
}

/// Payload of a general case: one distribution per stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralCase {
    /// Human-readable label
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Distribution per stack name
    pub stacks: IndexMap<String, DistributionSpec>,
}

/// Resolved general case with switches applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResolution {
    /// Matched case id
    pub case_id: String,
    /// Final distribution per stack
    pub stacks: IndexMap<String, DistributionSpec>,
}

impl CaseResolution {
    /// Distribution of a stack
    #[must_use]
    pub fn stack(&self, name: &str) -> Option<&DistributionSpec> {
        self.stacks.get(name)
    }
}

/// Validated general-case table (first full match wins)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "MatchTable<Trigger, GeneralCase>",
    into = "MatchTable<Trigger, GeneralCase>"
)]
pub struct CaseTable {
    table: MatchTable<Trigger, GeneralCase>,
}

impl CaseTable {
    /// Create table, validating every distribution
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::DistributionMismatch`] or
    /// [`RulesError::DuplicateRuleId`].
    pub fn new(table: MatchTable<Trigger, GeneralCase>) -> RulesResult<Self> {
        table.check_unique_ids()?;
        for rule in table.rules() {
            for (stack, spec) in &rule.payload.stacks {
                spec.validate(&rule.id, stack)?;
            }
        }
        Ok(Self { table })
    }

    /// Create table from rules
    ///
    /// # Errors
    ///
    /// See [`CaseTable::new`].
    pub fn from_rules(rules: Vec<MatchRule<Trigger, GeneralCase>>) -> RulesResult<Self> {
        Self::new(rules.into_iter().collect())
    }

    /// Underlying rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[MatchRule<Trigger, GeneralCase>] {
        self.table.rules()
    }

    /// Resolve the general case of a day
    ///
    /// `facts` should carry the rank and commemorations; triggers on those
    /// fields fail when they are absent.
    #[must_use]
    pub fn resolve_case(&self, facts: &Facts<'_>) -> Option<CaseResolution> {
        let rule = self.table.first_match(facts)?;
        debug!(case = %rule.id, commemorations = facts.commemorations.len(), "general case");
        Some(CaseResolution {
            case_id: rule.id.clone(),
            stacks: rule
                .payload
                .stacks
                .iter()
                .map(|(name, spec)| (name.clone(), spec.select(facts)))
                .collect(),
        })
    }
}

impl TryFrom<MatchTable<Trigger, GeneralCase>> for CaseTable {
    type Error = RulesError;

    fn try_from(table: MatchTable<Trigger, GeneralCase>) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl From<CaseTable> for MatchTable<Trigger, GeneralCase> {
    fn from(table: CaseTable) -> Self {
        table.table
    }
}
