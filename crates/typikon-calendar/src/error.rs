//! Error types for calendar computations
//!
//! Only two things can go wrong here: a year outside the supported
//! Gregorian epoch, or a malformed `MM-DD` literal in configuration.

use crate::anchor::{FIRST_SUPPORTED_YEAR, LAST_SUPPORTED_YEAR};

/// Errors raised while deriving calendar coordinates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Year falls outside the documented calendar epoch
    #[error("year {year} is outside the supported calendar epoch {min}..={max}")]
    OutOfRange {
        /// Requested year
        year: i32,
        /// First supported year
        min: i32,
        /// Last supported year
        max: i32,
    },

    /// A month/day literal could not be parsed
    #[error("invalid month-day '{value}': expected MM-DD")]
    InvalidMonthDay {
        /// The rejected literal
        value: String,
    },
}

impl CalendarError {
    /// Create out-of-range error for year
    #[must_use]
    pub fn out_of_range(year: i32) -> Self {
        Self::OutOfRange {
            year,
            min: FIRST_SUPPORTED_YEAR,
            max: LAST_SUPPORTED_YEAR,
        }
    }

    /// Create month-day parse error
    pub fn invalid_month_day(value: impl Into<String>) -> Self {
        Self::InvalidMonthDay {
            value: value.into(),
        }
    }

    /// Check if the error is caused by an out-of-epoch date
    #[inline]
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;
