//! Rubric resolution: everything decided about a day before assembly
//!
//! The layers are applied in a fixed order, each able to refine what the
//! previous ones set:
//!
//! 1. seasonal table (best priority match), whose rule id becomes the active
//!    key for exclusion lists
//! 2. the first floating feast whose date range and trigger match, appended
//!    to the title
//! 3. the fixed-date calendar, whose title replaces the previous one, and its
//!    first matching variant, or a generic saint-of-the-day fallback
//! 4. scenario identification, where a collision rule can transfer the
//!    fixed commemoration away, retitle the day or add overrides
//! 5. rank, paradigm and general case
//! 6. patronal-feast prefix and empty-title fallback
//! 7. Saturday lookahead to the coming Sunday's tone, which also picks the
//!    dogmatic theotokion when a festal saint's matins is served that evening
//!
//! [`ResolvedRubrics`] is inspectable on its own; nothing here reads texts.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use typikon_calendar::{Context, SATURDAY};
use typikon_rules::{
    classify_paradigm, classify_rank, CaseResolution, CollisionAction, Commemoration,
    CommemorationKind, Facts, Paradigm, Predicate, Rank, ScenarioMatch, ScenarioMatcher,
};

use crate::config::RuleBook;

/// Override key carrying the evening-office handling
pub const LITURGY_TYPE: &str = "liturgy_type";

/// Override value folding vespers into the liturgy
pub const VESPERAL_MERGE: &str = "vesperal-merge";

/// Override key set when the temple patron's hymns are dropped
pub const TEMPLE_PATRON: &str = "temple_patron";

/// Variable naming the theotokion sung after the matins troparia
pub const MATINS_THEOTOKION: &str = "matins_theotokion";

/// Prefix of the title on the temple's patronal feast
pub const PATRONAL_PREFIX: &str = "PATRONAL FEAST: ";

/// Decisions about one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRubrics {
    /// Human-readable title
    pub title: String,
    /// Selected scenario
    pub scenario: ScenarioMatch,
    /// Precedence rank
    pub rank: Rank,
    /// Structural paradigm
    pub paradigm: Paradigm,
    /// Id of the seasonal rule in force
    pub active_key: Option<String>,
    /// Commemorations of the day
    pub commemorations: Vec<Commemoration>,
    /// General case with switches applied
    pub case: Option<CaseResolution>,
    /// Variables set by the layers
    pub variables: IndexMap<String, String>,
    /// Overrides consumed by the assembler
    pub overrides: IndexMap<String, String>,
    /// Saturday evening serves the Sunday vigil
    pub is_sunday_vigil: bool,
    /// Tone of the following day, known at a Saturday vigil
    pub next_day_tone: Option<u8>,
}

impl ResolvedRubrics {
    /// Variable by name
    #[inline]
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Override by name
    #[inline]
    #[must_use]
    pub fn override_for(&self, name: &str) -> Option<&str> {
        self.overrides.get(name).map(String::as_str)
    }

    /// Check if vespers is folded into the liturgy
    #[inline]
    #[must_use]
    pub fn evening_office_merged(&self) -> bool {
        self.override_for(LITURGY_TYPE) == Some(VESPERAL_MERGE)
    }

    /// Check if the temple patron's material is dropped
    #[inline]
    #[must_use]
    pub fn temple_patron_suppressed(&self) -> bool {
        self.paradigm == Paradigm::FeastOfTheLord
            || self.override_for(TEMPLE_PATRON) == Some("suppressed")
    }

    /// Check if the day is festal enough for the festal form of a service
    #[inline]
    #[must_use]
    pub fn is_festal(&self) -> bool {
        self.rank.at_least(festal_tier()) || self.is_sunday_vigil
    }
}

/// Lowest rank served with festal forms (polyeleos)
#[inline]
#[must_use]
pub fn festal_tier() -> Rank {
    CommemorationKind::Polyeleos.default_rank()
}

/// Working state threaded through the layers
#[derive(Default)]
struct Draft {
    title: String,
    active_key: Option<String>,
    commemorations: Vec<Commemoration>,
    variables: IndexMap<String, String>,
    overrides: IndexMap<String, String>,
}

impl Draft {
    fn append_title(&mut self, title: &str) {
        if title.is_empty() {
            return;
        }
        if self.title.is_empty() {
            self.title = title.to_string();
        } else {
            self.title = format!("{} & {title}", self.title);
        }
    }

    /// Merge variables; `*_type` keys are also overrides
    fn merge_variables(&mut self, variables: &IndexMap<String, String>) {
        for (key, value) in variables {
            if key.ends_with("_type") {
                self.overrides.insert(key.clone(), value.clone());
            }
            self.variables.insert(key.clone(), value.clone());
        }
    }

    fn mark_merged(&mut self) {
        self.overrides
            .insert(LITURGY_TYPE.to_string(), VESPERAL_MERGE.to_string());
    }
}

/// Resolve the rubrics of a day
///
/// `next_day` is the context of the following date; it is consulted only on
/// Saturdays to pick up the Sunday tone and may be `None` at the end of the
/// epoch.
#[must_use]
pub fn resolve_rubrics(
    rules: &RuleBook,
    context: &Context,
    next_day: Option<&Context>,
) -> ResolvedRubrics {
    let mut draft = Draft::default();

    // 1. seasonal
    if let Some(rule) = rules.seasonal.best_match(&Facts::new(context)) {
        debug!(date = %context.date(), rule = %rule.id, "seasonal rubric");
        draft.title.clone_from(&rule.payload.title);
        draft.merge_variables(&rule.payload.variables);
        if rule.payload.merge_evening_office {
            draft.mark_merged();
        }
        draft.active_key = Some(rule.id.clone());
    }
    let seasonal_title = draft.title.clone();

    // 2. floating feasts, first match only
    let month_day = context.month_day();
    let facts = Facts::new(context).with_active_key(draft.active_key.as_deref());
    if let Some(feast) = rules
        .floating_feasts
        .iter()
        .find(|feast| month_day.within(feast.from, feast.to) && feast.trigger.matches(&facts))
    {
        debug!(feast = %feast.id, "floating feast");
        draft.append_title(&feast.title);
        draft.merge_variables(&feast.variables);
    }

    // 3. fixed-date calendar
    match rules.menaion.get(&month_day) {
        Some(day) => {
            if !day.title.is_empty() {
                draft.title.clone_from(&day.title);
            }
            draft.commemorations.extend(day.commemorations.iter().cloned());
            draft.merge_variables(&day.variables);

            let commemorations = draft.commemorations.clone();
            let facts = Facts::new(context)
                .with_active_key(draft.active_key.as_deref())
                .with_commemorations(&commemorations);
            if let Some(variant) = day.variants.first_match(&facts) {
                debug!(variant = %variant.id, "menaion variant");
                if let Some(title) = &variant.payload.title {
                    draft.title.clone_from(title);
                }
                draft.merge_variables(&variant.payload.variables);
                if variant.payload.merge_evening_office {
                    draft.mark_merged();
                }
            }
        }
        None if draft.title.is_empty() => {
            let name = format!("Saint of the Day ({}-{})", context.month(), context.day());
            draft.title.clone_from(&name);
            draft
                .commemorations
                .push(Commemoration::new(name, CommemorationKind::Simple));
        }
        None => {}
    }

    // 4. scenario
    let facts = Facts::new(context)
        .with_active_key(draft.active_key.as_deref())
        .with_commemorations(&draft.commemorations);
    let scenario =
        ScenarioMatcher::new(&rules.movable_feasts, &rules.collisions, &rules.local_scenarios)
            .identify(&facts);
    if let Some(collision) = &scenario.collision {
        match collision.action {
            CollisionAction::Transfer => {
                debug!(date = %context.date(), "fixed commemoration transferred");
                draft.commemorations.clear();
                draft.title.clone_from(&seasonal_title);
            }
            CollisionAction::SuppressTemplePatron => {
                draft
                    .overrides
                    .insert(TEMPLE_PATRON.to_string(), "suppressed".to_string());
            }
            CollisionAction::Merge => {}
        }
        if let Some(title) = &collision.title {
            draft.title.clone_from(title);
        }
        for (key, value) in &collision.overrides {
            draft.overrides.insert(key.clone(), value.clone());
        }
    }

    // 5. rank, paradigm, case
    let rank = classify_rank(context, &draft.commemorations, &rules.rank_table);
    let paradigm = classify_paradigm(context, rank);
    let case = rules.general_cases.resolve_case(
        &Facts::new(context)
            .with_active_key(draft.active_key.as_deref())
            .with_rank(rank)
            .with_commemorations(&draft.commemorations),
    );

    // 6. titles
    if context.is_local_commemoration_day() {
        draft.title = format!("{PATRONAL_PREFIX}{}", draft.title);
    }
    if draft.title.trim().is_empty() {
        draft.title = format!("Service for {}", context.date());
    }

    // 7. lookahead
    let is_sunday_vigil = context.weekday_index() == SATURDAY;
    let next_day_tone = if is_sunday_vigil {
        next_day.map(Context::tone)
    } else {
        None
    };
    if is_sunday_vigil && rank.at_least(festal_tier()) {
        let next = next_day_tone.unwrap_or_else(|| context.tone() % 8 + 1);
        draft.variables.insert(
            MATINS_THEOTOKION.to_string(),
            format!("tone_{next}.theotokion_dogmatikon"),
        );
    }

    debug!(
        date = %context.date(),
        title = %draft.title,
        %rank,
        %paradigm,
        scenario = %scenario.id,
        case = case.as_ref().map_or("-", |c| c.case_id.as_str()),
        "rubrics resolved"
    );

    ResolvedRubrics {
        title: draft.title,
        scenario,
        rank,
        paradigm,
        active_key: draft.active_key,
        commemorations: draft.commemorations,
        case,
        variables: draft.variables,
        overrides: draft.overrides,
        is_sunday_vigil,
        next_day_tone,
    }
}
