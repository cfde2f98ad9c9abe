//! Testing utilities for the typikon workspace
//!
//! Shared date helpers, context fixtures and test logging.

#![allow(missing_docs)]

use chrono::Datelike;
use tracing_subscriber::EnvFilter;
use typikon_calendar::{Context, ContextBuilder, NaiveDate};
use typikon_rules::{Commemoration, CommemorationKind};

/// Route tracing output through the test harness; `RUST_LOG` overrides
/// the default engine filter. Safe to call from every test.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("typikon_core=debug,typikon_rules=debug,typikon_structure=debug")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn context(year: i32, month: u32, day: u32) -> Context {
    ContextBuilder::new().build(ymd(year, month, day)).unwrap()
}

pub fn saint(name: &str, kind: CommemorationKind) -> Commemoration {
    Commemoration::new(name, kind)
}

/// Every date of a year, in order
pub fn days_of(year: i32) -> Vec<NaiveDate> {
    ymd(year, 1, 1)
        .iter_days()
        .take_while(|date| date.year() == year)
        .collect()
}
