//! Variable-logic resolvers
//!
//! A variable-logic slot names one [`ResolverId`]. The assembler hands the
//! slot's arguments, the day's context and its resolved rubrics to the
//! resolver registered for that id and renders what comes back.
//!
//! # Core Concepts
//!
//! - **LogicResolver**: pure function of [`ResolverInput`] producing literal
//!   lines and asset references
//! - **ResolverRegistry**: id → resolver map, pre-filled with the built-in
//!   implementations and open to replacement
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = ResolverRegistry::with_defaults();
//! registry.register(ResolverId::Dismissal, |input: &ResolverInput<'_>| {
//!     ResolverOutput::default().line("Go in peace.")
//! });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use typikon_assets::UnresolvedReference;
use typikon_calendar::Context;
use typikon_structure::{LogicArgs, ResolverId};

use crate::config::EngineOptions;
use crate::rubrics::ResolvedRubrics;

mod builtin;

/// Everything a resolver may read
#[derive(Debug, Clone, Copy)]
pub struct ResolverInput<'a> {
    /// Day being resolved
    pub context: &'a Context,
    /// Rubrics of the day
    pub rubrics: &'a ResolvedRubrics,
    /// Slot arguments
    pub args: &'a LogicArgs,
    /// Parish options
    pub options: &'a EngineOptions,
    /// Service and slot asking, e.g. `liturgy/dismissal`
    pub required_by: &'a str,
}

impl<'a> ResolverInput<'a> {
    /// String argument
    #[must_use]
    pub fn arg_str(&self, name: &str) -> Option<&'a str> {
        self.args.get(name).and_then(Value::as_str)
    }

    /// Unsigned integer argument
    #[must_use]
    pub fn arg_u64(&self, name: &str) -> Option<u64> {
        self.args.get(name).and_then(Value::as_u64)
    }

    /// String-array argument; non-string entries are skipped
    #[must_use]
    pub fn arg_strings(&self, name: &str) -> Vec<String> {
        self.args
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// What a resolver produced for one slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOutput {
    /// Literal lines rendered verbatim
    pub lines: Vec<String>,
    /// Asset keys rendered after the lines, in order
    pub refs: Vec<String>,
    /// Symbolic references that had no mapping
    pub unresolved: Vec<UnresolvedReference>,
}

impl ResolverOutput {
    /// Add a literal line
    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Add an asset reference
    #[must_use]
    pub fn reference(mut self, key: impl Into<String>) -> Self {
        self.refs.push(key.into());
        self
    }

    /// Record an unmapped symbolic reference
    #[must_use]
    pub fn unresolved(mut self, reference: UnresolvedReference) -> Self {
        self.unresolved.push(reference);
        self
    }

    /// Check if nothing was produced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.refs.is_empty() && self.unresolved.is_empty()
    }
}

/// Computes the content of a variable-logic slot
///
/// Implementations must be pure: the same input always yields the same
/// output and nothing is retained between calls.
pub trait LogicResolver: Send + Sync {
    /// Resolve one slot
    fn resolve(&self, input: &ResolverInput<'_>) -> ResolverOutput;
}

impl<F> LogicResolver for F
where
    F: Fn(&ResolverInput<'_>) -> ResolverOutput + Send + Sync,
{
    fn resolve(&self, input: &ResolverInput<'_>) -> ResolverOutput {
        self(input)
    }
}

/// Resolver per [`ResolverId`]
#[derive(Clone)]
pub struct ResolverRegistry {
    resolvers: HashMap<ResolverId, Arc<dyn LogicResolver>>,
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.resolvers.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &ids)
            .finish()
    }
}

impl ResolverRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Registry with every built-in resolver
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in ResolverId::ALL {
            registry.register(id, default_resolver(id));
        }
        registry
    }

    /// Register (or replace) the resolver for an id
    pub fn register<R>(&mut self, id: ResolverId, resolver: R)
    where
        R: LogicResolver + 'static,
    {
        self.resolvers.insert(id, Arc::new(resolver));
    }

    /// Check if an id has a resolver
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ResolverId) -> bool {
        self.resolvers.contains_key(&id)
    }

    /// Number of registered resolvers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Dispatch a slot to its resolver
    ///
    /// An id without a resolver yields an unresolved reference named after
    /// the id, so the gap shows up in the document instead of failing.
    #[must_use]
    pub fn resolve(&self, id: ResolverId, input: &ResolverInput<'_>) -> ResolverOutput {
        match self.resolvers.get(&id) {
            Some(resolver) => resolver.resolve(input),
            None => ResolverOutput::default().unresolved(UnresolvedReference::new(
                format!("logic.{id}"),
                input.required_by,
            )),
        }
    }
}

fn default_resolver(id: ResolverId) -> fn(&ResolverInput<'_>) -> ResolverOutput {
    match id {
        ResolverId::VariableReference => builtin::variable_reference,
        ResolverId::SticheraDistribution => builtin::stichera_distribution,
        ResolverId::TropariaStack => builtin::troparia_stack,
        ResolverId::Isodikon => builtin::isodikon,
        ResolverId::Dismissal => builtin::dismissal,
        ResolverId::Antiphons => builtin::antiphons,
        ResolverId::Magnification => builtin::magnification,
        ResolverId::VespersKathisma => builtin::vespers_kathisma,
        ResolverId::VespersEntrance => builtin::vespers_entrance,
        ResolverId::DoxologyMode => builtin::doxology_mode,
        ResolverId::Katavasia => builtin::katavasia,
        ResolverId::CommunionHymn => builtin::communion_hymn,
        ResolverId::CanonOdes => builtin::canon_odes,
        ResolverId::Eothinon => builtin::eothinon,
        ResolverId::GodIsTheLord => builtin::god_is_the_lord,
        ResolverId::Trisagion => builtin::trisagion,
        ResolverId::HoursTroparia => builtin::hours_troparia,
        ResolverId::HoursKontakion => builtin::hours_kontakion,
        ResolverId::CherubicHymn => builtin::cherubic_hymn,
    }
}
