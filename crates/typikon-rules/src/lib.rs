//! Typikon Rules - table-driven liturgical precedence
//!
//! Every decision the engine makes about a day is a lookup in a
//! priority-ordered table evaluated against the day's [`Facts`]. This crate
//! provides the generic table and the rule families built on it.
//!
//! # Core Concepts
//!
//! - **MatchTable**: ordered `(id, priority, trigger, payload)` rules with
//!   best-priority and first-match selection
//! - **Trigger**: declarative conjunction of day conditions
//! - **Rank / Paradigm**: precedence tier and structural family
//! - **Scenario**: movable feast, collision, local case or ordinary day
//! - **General case**: hymn-count distributions per stack
//! - **Variable map**: symbolic token → concrete asset key
//!
//! # Example
//!
//! ```rust,ignore
//! use typikon_rules::prelude::*;
//!
//! let rank = classify_rank(&context, &commemorations, &rank_table);
//! let paradigm = classify_paradigm(&context, rank);
//! let facts = Facts::new(&context).with_rank(rank).with_commemorations(&commemorations);
//! let case = cases.resolve_case(&facts);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod case;
pub mod error;
pub mod fill;
pub mod matcher;
pub mod rank;
pub mod scenario;
pub mod trigger;
pub mod variable;

pub use case::{
    Allocation, CaseResolution, CaseTable, DistributionSpec, DistributionSwitch, GeneralCase,
    SwitchKey,
};
pub use error::{RulesError, RulesResult};
pub use fill::fill_to_count;
pub use matcher::{MatchRule, MatchTable, Predicate};
pub use rank::{
    classify_paradigm, classify_rank, Commemoration, CommemorationKind, Paradigm, Rank, RankTable,
};
pub use scenario::{
    CollisionAction, CollisionRule, CollisionTable, LocalScenarioTable, MovableFeast,
    MovableRegistry, ScenarioId, ScenarioMatch, ScenarioMatcher, ScenarioSource,
};
pub use trigger::{Facts, OffsetRange, RankTier, Trigger};
pub use variable::{resolve_variable, VariableInputs, VariableMap};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        classify_paradigm, classify_rank, fill_to_count, resolve_variable, CaseTable,
        Commemoration, CommemorationKind, Facts, MatchRule, MatchTable, Paradigm, Predicate, Rank,
        RulesError, ScenarioId, ScenarioMatch, ScenarioMatcher, Trigger,
    };
}
