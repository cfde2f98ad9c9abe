//! Typikon Calendar - liturgical coordinates of a date
//!
//! Everything the rule engine knows about a day starts here: the movable-feast
//! anchor of its year, the signed offset from that anchor, and the season,
//! period, weekday and weekly cycles derived from it.
//!
//! # Core Concepts
//!
//! - **Anchor**: Gregorian Pascha, see [`anchor_date`]
//! - **Context**: immutable coordinates of one date, see [`Context`]
//! - **Season**: closed partition of anchor offsets, see [`Season`]
//! - **MonthDay**: key of the fixed cycle, see [`MonthDay`]
//!
//! # Example
//!
//! ```rust,ignore
//! use typikon_calendar::prelude::*;
//!
//! let builder = ContextBuilder::new();
//! let ctx = builder.build(NaiveDate::from_ymd_opt(2025, 4, 20).unwrap())?;
//! assert_eq!(ctx.season(), Season::FeastOfTheAnchor);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod anchor;
pub mod context;
pub mod cycle;
pub mod error;
pub mod month_day;
pub mod season;

pub use anchor::{anchor_date, validate_year, FIRST_SUPPORTED_YEAR, LAST_SUPPORTED_YEAR};
pub use context::{Context, ContextBuilder, SATURDAY, SUNDAY};
pub use error::{CalendarError, CalendarResult};
pub use month_day::MonthDay;
pub use season::{LiturgicalBook, Period, Season};

/// Re-exported so callers build dates with the same chrono version
pub use chrono::NaiveDate;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        anchor_date, CalendarError, CalendarResult, Context, ContextBuilder, LiturgicalBook,
        MonthDay, NaiveDate, Period, Season,
    };
}
