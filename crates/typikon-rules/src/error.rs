//! Error types for rule tables
//!
//! Every variant is a configuration defect detected when a table is built.
//! Matching itself never fails: a context that no rule covers simply yields
//! no match.

use typikon_calendar::MonthDay;

/// Errors raised while building rule tables
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// Rank outside the 1..=5 scale
    #[error("invalid rank {0}: expected 1 (highest) to 5 (lowest)")]
    InvalidRank(u8),

    /// Distribution quantities do not add up to the declared total
    #[error(
        "case '{case_id}' stack '{stack}': distribution sums to {actual}, \
         declared total is {declared}"
    )]
    DistributionMismatch {
        /// General case identifier
        case_id: String,
        /// Stack name (with switch path for nested specs)
        stack: String,
        /// Declared total
        declared: u32,
        /// Sum of quantities
        actual: u64,
    },

    /// Two collision rules share the same key
    #[error("duplicate collision rule for {month_day} on '{movable_key}'")]
    DuplicateCollision {
        /// Fixed-cycle day
        month_day: MonthDay,
        /// Movable-cycle key
        movable_key: String,
    },

    /// Two rules in one table share an identifier
    #[error("duplicate rule id '{0}'")]
    DuplicateRuleId(String),
}

impl RulesError {
    /// Create distribution mismatch error
    pub fn distribution_mismatch(
        case_id: impl Into<String>,
        stack: impl Into<String>,
        declared: u32,
        actual: u64,
    ) -> Self {
        Self::DistributionMismatch {
            case_id: case_id.into(),
            stack: stack.into(),
            declared,
            actual,
        }
    }
}

/// Result type for rule table construction
pub type RulesResult<T> = Result<T, RulesError>;
