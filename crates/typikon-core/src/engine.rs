//! Engine facade: date in, context + rubrics + document out
//!
//! [`Typikon`] owns one validated configuration, one text store and one
//! resolver registry. Every call to [`Typikon::generate`] is independent,
//! so a single engine serves any number of dates, in parallel if needed.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = Typikon::builtin()?;
//! let generation = engine.generate(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())?;
//! println!("{}", generation.document.render());
//! ```

use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};
use typikon_assets::{AssetLoader, TextAssetStore};
use typikon_calendar::{Context, ContextBuilder, SATURDAY};

use crate::booklet::{BookletAssembler, Document};
use crate::config::{builtin_assets, ConfigurationSet, EngineOptions};
use crate::error::TypikonResult;
use crate::resolvers::ResolverRegistry;
use crate::rubrics::{resolve_rubrics, ResolvedRubrics};

/// Everything produced for one date
#[derive(Debug, Clone)]
pub struct Generation {
    /// Calendar coordinates of the date
    pub context: Context,
    /// Decisions about the day
    pub rubrics: ResolvedRubrics,
    /// Assembled booklet
    pub document: Document,
}

impl Generation {
    /// Split into parts
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Context, ResolvedRubrics, Document) {
        (self.context, self.rubrics, self.document)
    }
}

/// The rubric resolution engine
#[derive(Debug, Clone)]
pub struct Typikon {
    config: ConfigurationSet,
    assets: TextAssetStore,
    contexts: ContextBuilder,
    resolvers: ResolverRegistry,
    options: EngineOptions,
}

impl Typikon {
    /// Create engine with default options and resolvers
    #[must_use]
    pub fn new(config: ConfigurationSet, assets: TextAssetStore) -> Self {
        Self {
            config,
            assets,
            contexts: ContextBuilder::new(),
            resolvers: ResolverRegistry::with_defaults(),
            options: EngineOptions::default(),
        }
    }

    /// Engine over the embedded configuration and texts
    ///
    /// # Errors
    ///
    /// Only if the embedded documents are defective.
    pub fn builtin() -> TypikonResult<Self> {
        let config = ConfigurationSet::builtin()?;
        let assets = TextAssetStore::builder().layer(builtin_assets()?).build();
        Ok(Self::new(config, assets))
    }

    /// Load configuration from a directory and layer asset directories over
    /// the embedded texts
    ///
    /// Later directories override earlier ones.
    ///
    /// # Errors
    ///
    /// Any configuration or asset loading error.
    pub async fn load<P: AsRef<Path>>(
        config_dir: impl AsRef<Path>,
        asset_dirs: &[P],
    ) -> TypikonResult<Self> {
        let config = ConfigurationSet::load_dir(config_dir).await?;

        let loader = AssetLoader::new();
        let mut builder = TextAssetStore::builder().layer(builtin_assets()?);
        for (index, dir) in asset_dirs.iter().enumerate() {
            builder.push(loader.load_dir(format!("layer_{index}"), dir).await?);
        }
        let assets = builder.build();

        info!(layers = ?assets.layers(), records = assets.len(), "engine loaded");
        Ok(Self::new(config, assets))
    }

    /// With parish options
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        let mut contexts = ContextBuilder::new();
        if let Some(month_day) = options.local_commemoration {
            contexts = contexts.with_local_commemoration(month_day);
        }
        self.contexts = contexts;
        self.options = options;
        self
    }

    /// With a custom resolver registry
    #[must_use]
    pub fn with_resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConfigurationSet {
        &self.config
    }

    /// Text store in use
    #[inline]
    #[must_use]
    pub fn assets(&self) -> &TextAssetStore {
        &self.assets
    }

    /// Parish options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Resolver registry
    #[inline]
    #[must_use]
    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    /// Calendar context of a date
    ///
    /// # Errors
    ///
    /// Date outside the supported epoch.
    pub fn context(&self, date: NaiveDate) -> TypikonResult<Context> {
        Ok(self.contexts.build(date)?)
    }

    /// Rubrics of a day
    ///
    /// On Saturdays the following day is built too, for the vigil tone.
    #[must_use]
    pub fn resolve_rubrics(&self, context: &Context) -> ResolvedRubrics {
        let next_day = if context.weekday_index() == SATURDAY {
            context
                .date()
                .succ_opt()
                .and_then(|date| self.contexts.build(date).ok())
        } else {
            None
        };
        resolve_rubrics(self.config.rules(), context, next_day.as_ref())
    }

    /// Document of a day from its context and rubrics
    #[must_use]
    pub fn assemble(&self, context: &Context, rubrics: &ResolvedRubrics) -> Document {
        BookletAssembler::new(&self.config, &self.assets, &self.resolvers, &self.options)
            .assemble(context, rubrics)
    }

    /// Context, rubrics and document of a date
    ///
    /// # Errors
    ///
    /// Date outside the supported epoch. Missing texts are not errors; they
    /// are listed in [`Document::gaps`].
    pub fn generate(&self, date: NaiveDate) -> TypikonResult<Generation> {
        let context = self.context(date)?;
        let rubrics = self.resolve_rubrics(&context);
        debug!(
            date = %date,
            scenario = %rubrics.scenario.id,
            rank = rubrics.rank.value(),
            "rubrics resolved"
        );
        let document = self.assemble(&context, &rubrics);
        Ok(Generation {
            context,
            rubrics,
            document,
        })
    }

    /// Generate several dates in parallel, results in input order
    #[must_use]
    pub fn generate_many(&self, dates: &[NaiveDate]) -> Vec<TypikonResult<Generation>> {
        dates.par_iter().map(|&date| self.generate(date)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booklet::MERGE_NOTE;
    use crate::config::TempleType;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use typikon_calendar::MonthDay;
    use typikon_rules::{Paradigm, ScenarioSource};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn engine() -> Typikon {
        Typikon::builtin().unwrap()
    }

    #[test]
    fn pascha_is_a_feast_of_the_lord() {
        let generation = engine().generate(ymd(2024, 3, 31)).unwrap();
        assert_eq!(generation.context.day_offset_from_anchor(), 0);
        assert_eq!(generation.rubrics.scenario.source, ScenarioSource::Movable);
        assert_eq!(generation.rubrics.paradigm, Paradigm::FeastOfTheLord);
        assert!(generation.rubrics.title.contains("Pascha"));

        let hours = generation.document.section("hours").unwrap();
        assert_eq!(hours.template.as_deref(), Some("hours_paschal"));
        let matins = generation.document.section("matins").unwrap();
        assert_eq!(matins.template.as_deref(), Some("matins_bright"));
    }

    #[test]
    fn saturday_carries_sunday_tone() {
        let engine = engine();
        let saturday = engine.context(ymd(2024, 9, 7)).unwrap();
        let sunday = engine.context(ymd(2024, 9, 8)).unwrap();
        let rubrics = engine.resolve_rubrics(&saturday);
        assert_eq!(rubrics.next_day_tone, Some(sunday.tone()));

        let weekday = engine.context(ymd(2024, 9, 4)).unwrap();
        assert_eq!(engine.resolve_rubrics(&weekday).next_day_tone, None);
    }

    #[test]
    fn ordinary_sunday_uses_sunday_matins() {
        let generation = engine().generate(ymd(2024, 9, 22)).unwrap();
        let matins = generation.document.section("matins").unwrap();
        assert_eq!(matins.template.as_deref(), Some("matins_sunday"));
        assert!(matins.slot("eothinon").is_some());
    }

    #[test]
    fn nativity_eve_on_weekday_merges_vespers() {
        // 2025-12-24 is a Wednesday
        let generation = engine().generate(ymd(2025, 12, 24)).unwrap();
        assert!(generation.rubrics.evening_office_merged());
        let vespers = generation.document.section("vespers").unwrap();
        assert_eq!(vespers.note.as_deref(), Some(MERGE_NOTE));
        assert!(vespers.slots.is_empty());
        let hours = generation.document.section("hours").unwrap();
        assert_eq!(hours.template.as_deref(), Some("hours_royal"));
    }

    #[test]
    fn patronal_feast_prefixes_title() {
        let engine = engine().with_options(
            EngineOptions::new()
                .with_local_commemoration(MonthDay::new(12, 6).unwrap())
                .with_temple("St. Nicholas", TempleType::Saint),
        );
        let generation = engine.generate(ymd(2024, 12, 6)).unwrap();
        assert!(generation.context.is_local_commemoration_day());
        assert!(generation.rubrics.title.starts_with("PATRONAL FEAST: "));
    }

    #[test]
    fn out_of_epoch_dates_fail() {
        let engine = engine();
        assert!(engine.generate(ymd(1500, 6, 1)).unwrap_err().is_date_error());
        assert!(engine.generate(ymd(4100, 6, 1)).unwrap_err().is_date_error());
    }

    #[test]
    fn parallel_generation_keeps_order() {
        let engine = engine();
        let dates = [ymd(2024, 1, 7), ymd(1500, 1, 1), ymd(2024, 8, 15)];
        let results = engine.generate_many(&dates);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().context.date(), dates[0]);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().context.date(), dates[2]);
    }

    #[test]
    fn generation_is_deterministic() {
        let engine = engine();
        let first = engine.generate(ymd(2024, 4, 23)).unwrap();
        let second = engine.generate(ymd(2024, 4, 23)).unwrap();
        assert_eq!(first.rubrics, second.rubrics);
        assert_eq!(first.document, second.document);
    }

    proptest! {
        #[test]
        fn every_day_has_every_service(ordinal in 1u32..=366) {
            let engine = engine();
            let date = NaiveDate::from_yo_opt(2024, ordinal).unwrap();
            let generation = engine.generate(date).unwrap();
            let services: Vec<&str> = engine
                .config()
                .cycle()
                .services()
                .iter()
                .map(|entry| entry.service.as_str())
                .collect();
            let sections: Vec<&str> = generation
                .document
                .sections
                .iter()
                .map(|section| section.service.as_str())
                .collect();
            prop_assert_eq!(sections, services);
            prop_assert!(!generation.rubrics.title.is_empty());
        }
    }
}
