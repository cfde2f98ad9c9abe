//! Typikon Core - rubric resolution engine
//!
//! Turns a civil date into the day's calendar context, its resolved rubrics
//! and an assembled booklet of services. The lower crates supply the pieces
//! (calendar, rule tables, templates, texts); this crate layers the rules,
//! dispatches the variable-logic slots and binds every slot to text.
//!
//! # Core Concepts
//!
//! - **ConfigurationSet**: rule book, template library and daily cycle,
//!   validated once at load time
//! - **ResolvedRubrics**: title, scenario, rank, paradigm, general case,
//!   variables and overrides of one day
//! - **ResolverRegistry**: the variable-logic resolvers, replaceable per id
//! - **Document**: sections per service, bound slots and the list of gaps
//! - **Typikon**: the facade tying it all together
//!
//! # Example
//!
//! ```rust,ignore
//! use typikon_core::prelude::*;
//!
//! let engine = Typikon::builtin()?
//!     .with_options(EngineOptions::new().with_temple("St. Nicholas", TempleType::Saint));
//! let (context, rubrics, document) = engine.generate(date)?.into_parts();
//! if !document.is_complete() {
//!     eprintln!("{} texts missing", document.gaps.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod booklet;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolvers;
pub mod rubrics;

pub use booklet::{BookletAssembler, Document, RenderedSlot, RenderedText, Section, MERGE_NOTE};
pub use config::{
    builtin_assets, ConfigurationSet, DailyCycle, EngineOptions, FloatingFeast, MenaionDay,
    MenaionVariant, RuleBook, SeasonalRubric, SeasonalTable, ServiceEntry, TempleType,
};
pub use engine::{Generation, Typikon};
pub use error::{TypikonError, TypikonResult};
pub use resolvers::{LogicResolver, ResolverInput, ResolverOutput, ResolverRegistry};
pub use rubrics::{
    festal_tier, resolve_rubrics, ResolvedRubrics, LITURGY_TYPE, MATINS_THEOTOKION, PATRONAL_PREFIX,
    TEMPLE_PATRON, VESPERAL_MERGE,
};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        ConfigurationSet, Document, EngineOptions, Generation, ResolvedRubrics, ResolverRegistry,
        TempleType, Typikon, TypikonError, TypikonResult,
    };
    pub use typikon_calendar::{Context, MonthDay, NaiveDate};
}
