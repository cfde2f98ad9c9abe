//! Configuration set: rule book, template library and daily cycle
//!
//! A [`ConfigurationSet`] is built once, validated eagerly and then shared
//! read-only by every resolution. Nothing in it changes after construction.
//!
//! # Core Concepts
//!
//! - **RuleBook**: every decision table (rank, seasonal rubrics, movable
//!   feasts, collisions, local cases, general cases) plus the fixed-date
//!   calendar (menaion) and floating feasts
//! - **DailyCycle**: the ordered services of a day and how each picks its
//!   template
//! - **EngineOptions**: parish-specific knobs (temple patron, local feast)
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ConfigurationSet::builtin()?;
//! let custom = ConfigurationSet::load_dir("/etc/typikon").await?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use typikon_assets::AssetLayer;
use typikon_calendar::{MonthDay, Period};
use typikon_rules::{
    CaseTable, CollisionTable, Commemoration, LocalScenarioTable, MatchTable, MovableRegistry,
    RankTable, Trigger,
};
use typikon_structure::{StructureTemplate, TemplateLibrary};

use crate::error::{TypikonError, TypikonResult};

const BUILTIN_RULES: &str = include_str!("../data/rules.json");
const BUILTIN_TEMPLATES: &str = include_str!("../data/templates.json");
const BUILTIN_DAILY_CYCLE: &str = include_str!("../data/daily_cycle.json");
const BUILTIN_ASSETS: &str = include_str!("../data/assets.json");

/// Extensions tried, in order, when reading a configuration directory
const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Rubrics contributed by the movable cycle for a day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalRubric {
    /// Title of the day
    #[serde(default)]
    pub title: String,
    /// Variables set for the day
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,
    /// Vespers is served together with the liturgy
    #[serde(default)]
    pub merge_evening_office: bool,
}

/// Seasonal rubric table; its best match's id is the day's active key
pub type SeasonalTable = MatchTable<Trigger, SeasonalRubric>;

/// Conditional adjustment of a fixed-date day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenaionVariant {
    /// Replacement title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Variables set when the variant applies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,
    /// Vespers is served together with the liturgy
    #[serde(default)]
    pub merge_evening_office: bool,
}

/// Fixed-date calendar entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenaionDay {
    /// Title of the day
    #[serde(default)]
    pub title: String,
    /// Saints and feasts of the day
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commemorations: Vec<Commemoration>,
    /// Variables set for the day
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,
    /// Variants by weekday or season; the first match applies
    #[serde(default, skip_serializing_if = "MatchTable::is_empty")]
    pub variants: MatchTable<Trigger, MenaionVariant>,
}

/// Feast observed on one day of a date range (e.g. the Sunday before a feast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingFeast {
    /// Identifier
    pub id: String,
    /// Title appended to the day's title
    pub title: String,
    /// First day of the range
    pub from: MonthDay,
    /// Last day of the range (inclusive, may wrap the year end)
    pub to: MonthDay,
    /// Further conditions, usually a weekday
    #[serde(default)]
    pub trigger: Trigger,
    /// Variables set when the feast applies
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, String>,
}

/// Every rule table the engine consults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    /// Seasonal rank table
    #[serde(default)]
    pub rank_table: RankTable,
    /// Seasonal rubric table
    #[serde(default)]
    pub seasonal: SeasonalTable,
    /// Movable-feast registry
    #[serde(default)]
    pub movable_feasts: MovableRegistry,
    /// Collision table
    #[serde(default)]
    pub collisions: CollisionTable,
    /// Local commemoration cases
    #[serde(default)]
    pub local_scenarios: LocalScenarioTable,
    /// General-case distributions
    #[serde(default)]
    pub general_cases: CaseTable,
    /// Fixed-date calendar
    #[serde(default)]
    pub menaion: BTreeMap<MonthDay, MenaionDay>,
    /// Range-bound feasts
    #[serde(default)]
    pub floating_feasts: Vec<FloatingFeast>,
}

impl RuleBook {
    /// Check rule ids are unique within each table
    ///
    /// General cases and collisions validate themselves when deserialized.
    ///
    /// # Errors
    ///
    /// [`TypikonError::Rules`] for a duplicate id.
    pub fn validate(&self) -> TypikonResult<()> {
        self.rank_table.check_unique_ids()?;
        self.seasonal.check_unique_ids()?;
        self.local_scenarios.check_unique_ids()?;
        for day in self.menaion.values() {
            day.variants.check_unique_ids()?;
        }
        Ok(())
    }
}

/// One service of the daily cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Service key (`vespers`, `matins`, ...)
    pub service: String,
    /// Heading used when rendering
    pub display_name: String,
    /// Override key that names an explicit template
    pub type_key: String,
    /// Template used when nothing else applies
    pub default_template: String,
    /// Template for Sundays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunday_template: Option<String>,
    /// Template for high-ranked days and Sunday vigils
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub festal_template: Option<String>,
    /// Template per named period
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub period_templates: BTreeMap<Period, String>,
    /// Rubric variable whose value selects a variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_variable: Option<String>,
    /// Template per substring of the variant variable
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variants: IndexMap<String, String>,
    /// Can be folded into the liturgy on vesperal-merge days
    #[serde(default)]
    pub mergeable: bool,
}

impl ServiceEntry {
    /// Every template name this entry may select
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default_template.as_str())
            .chain(self.sunday_template.as_deref())
            .chain(self.festal_template.as_deref())
            .chain(self.period_templates.values().map(String::as_str))
            .chain(self.variants.values().map(String::as_str))
    }
}

/// Ordered services of a day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyCycle {
    services: Vec<ServiceEntry>,
}

impl DailyCycle {
    /// Create cycle
    #[must_use]
    pub fn new(services: Vec<ServiceEntry>) -> Self {
        Self { services }
    }

    /// Services in order
    #[inline]
    #[must_use]
    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    /// Number of services
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if cycle is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Dedication of the temple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempleType {
    /// Dedicated to a saint
    #[default]
    Saint,
    /// Dedicated to the Theotokos or a feast of the Lord
    Theotokos,
}

/// Runtime options of one parish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Day of the temple's patronal feast
    pub local_commemoration: Option<MonthDay>,
    /// Patron named in the dismissal
    pub temple_patron: String,
    /// Dedication of the temple
    pub temple_type: TempleType,
}

impl EngineOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With local commemoration day
    #[inline]
    #[must_use]
    pub fn with_local_commemoration(mut self, month_day: MonthDay) -> Self {
        self.local_commemoration = Some(month_day);
        self
    }

    /// With temple patron and dedication
    #[inline]
    #[must_use]
    pub fn with_temple(mut self, patron: impl Into<String>, temple_type: TempleType) -> Self {
        self.temple_patron = patron.into();
        self.temple_type = temple_type;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            local_commemoration: None,
            temple_patron: "St. Nicholas".to_string(),
            temple_type: TempleType::Saint,
        }
    }
}

/// Immutable, validated configuration
#[derive(Debug, Clone)]
pub struct ConfigurationSet {
    rules: RuleBook,
    templates: TemplateLibrary,
    cycle: DailyCycle,
}

impl ConfigurationSet {
    /// Create and validate a configuration set
    ///
    /// # Errors
    ///
    /// [`TypikonError::Rules`] for duplicate rule ids,
    /// [`TypikonError::UnknownTemplate`] when the daily cycle names a
    /// template the library lacks.
    pub fn new(
        rules: RuleBook,
        templates: TemplateLibrary,
        cycle: DailyCycle,
    ) -> TypikonResult<Self> {
        rules.validate()?;
        for entry in cycle.services() {
            if let Some(missing) = entry.template_names().find(|name| !templates.contains(name)) {
                return Err(TypikonError::UnknownTemplate {
                    service: entry.service.clone(),
                    template: missing.to_string(),
                });
            }
        }

        info!(
            seasonal = rules.seasonal.len(),
            general_cases = rules.general_cases.rules().len(),
            menaion_days = rules.menaion.len(),
            templates = templates.len(),
            services = cycle.len(),
            "configuration loaded"
        );
        Ok(Self {
            rules,
            templates,
            cycle,
        })
    }

    /// Configuration embedded in the crate
    ///
    /// # Errors
    ///
    /// Only if the embedded documents are defective.
    pub fn builtin() -> TypikonResult<Self> {
        Self::from_json_documents(BUILTIN_RULES, BUILTIN_TEMPLATES, BUILTIN_DAILY_CYCLE)
    }

    /// Build from three JSON documents
    ///
    /// # Errors
    ///
    /// [`TypikonError::Parse`] for a malformed document (including rule
    /// tables that fail their own validation), otherwise as
    /// [`ConfigurationSet::new`].
    pub fn from_json_documents(rules: &str, templates: &str, cycle: &str) -> TypikonResult<Self> {
        let rules: RuleBook = parse_json("rules", rules)?;
        let templates: Vec<StructureTemplate> = parse_json("templates", templates)?;
        let cycle: DailyCycle = parse_json("daily_cycle", cycle)?;
        Self::new(rules, TemplateLibrary::new(templates)?, cycle)
    }

    /// Build from three YAML documents
    ///
    /// # Errors
    ///
    /// As [`ConfigurationSet::from_json_documents`].
    pub fn from_yaml_documents(rules: &str, templates: &str, cycle: &str) -> TypikonResult<Self> {
        let rules: RuleBook = parse_yaml("rules", rules)?;
        let templates: Vec<StructureTemplate> = parse_yaml("templates", templates)?;
        let cycle: DailyCycle = parse_yaml("daily_cycle", cycle)?;
        Self::new(rules, TemplateLibrary::new(templates)?, cycle)
    }

    /// Load `rules`, `templates` and `daily_cycle` documents from a directory
    ///
    /// Each document may be `.json`, `.yaml` or `.yml`; the first extension
    /// found in that order is used.
    ///
    /// # Errors
    ///
    /// [`TypikonError::Io`] when a document is missing or unreadable,
    /// otherwise as [`ConfigurationSet::from_json_documents`].
    pub async fn load_dir(dir: impl AsRef<Path>) -> TypikonResult<Self> {
        let dir = dir.as_ref();
        let rules: RuleBook = read_document(dir, "rules").await?;
        let templates: Vec<StructureTemplate> = read_document(dir, "templates").await?;
        let cycle: DailyCycle = read_document(dir, "daily_cycle").await?;
        Self::new(rules, TemplateLibrary::new(templates)?, cycle)
    }

    /// Rule tables
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Template library
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Daily cycle
    #[inline]
    #[must_use]
    pub fn cycle(&self) -> &DailyCycle {
        &self.cycle
    }
}

/// Base text layer embedded in the crate
///
/// # Errors
///
/// Only if the embedded document is defective.
pub fn builtin_assets() -> TypikonResult<AssetLayer> {
    Ok(AssetLayer::from_json_str("builtin", BUILTIN_ASSETS)?)
}

fn parse_json<T: DeserializeOwned>(document: &str, text: &str) -> TypikonResult<T> {
    serde_json::from_str(text).map_err(|e| TypikonError::parse_error(document, e))
}

fn parse_yaml<T: DeserializeOwned>(document: &str, text: &str) -> TypikonResult<T> {
    serde_yaml::from_str(text).map_err(|e| TypikonError::parse_error(document, e))
}

async fn read_document<T: DeserializeOwned>(dir: &Path, stem: &str) -> TypikonResult<T> {
    let mut last_missing = None;
    for ext in DOCUMENT_EXTENSIONS {
        let path = dir.join(format!("{stem}.{ext}"));
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(path = %path.display(), "configuration document read");
                return if ext == "json" {
                    parse_json(stem, &text)
                } else {
                    parse_yaml(stem, &text)
                };
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                last_missing = Some((path, err));
            }
            Err(err) => return Err(TypikonError::io_error(path, err)),
        }
    }
    let (path, err) = last_missing.unwrap_or_else(|| {
        (
            dir.join(stem),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        )
    });
    Err(TypikonError::io_error(path, err))
}
