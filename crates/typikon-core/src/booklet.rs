//! Booklet assembly
//!
//! Walks the daily cycle in order. For every service the effective template
//! is chosen, expanded, and each slot bound to content:
//!
//! - fixed references and reference groups are looked up in the asset store
//! - variable-logic slots are dispatched through the [`ResolverRegistry`]
//! - literal sequences are copied as they are
//!
//! Missing texts never abort assembly: a placeholder record takes their
//! place and the reference is listed in [`Document::gaps`], so the output
//! keeps its full structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use typikon_assets::{TextAssetStore, TextRecord, UnresolvedReference};
use typikon_calendar::Context;
use typikon_structure::{Slot, SlotContent};

use crate::config::{ConfigurationSet, EngineOptions, ServiceEntry};
use crate::error::{TypikonError, TypikonResult};
use crate::resolvers::{ResolverInput, ResolverRegistry};
use crate::rubrics::ResolvedRubrics;

/// Note replacing vespers on vesperal-merge days
pub const MERGE_NOTE: &str = "NOTE: Vespers is combined with the Divine Liturgy below.";

/// A text placed in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedText {
    /// Key that was looked up
    pub key: String,
    /// Record found, or its placeholder
    pub record: TextRecord,
}

/// One slot bound to content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSlot {
    /// Slot id from the template
    pub id: String,
    /// Rubrical annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    /// Literal lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
    /// Texts, after the lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<RenderedText>,
}

impl RenderedSlot {
    fn new(slot: &Slot) -> Self {
        Self {
            id: slot.id.clone(),
            rubric: slot.rubric.clone(),
            lines: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Check if any text in the slot is a placeholder
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.texts.iter().any(|t| t.record.is_placeholder)
    }
}

/// One service of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Service key
    pub service: String,
    /// Heading
    pub display_name: String,
    /// Template used, absent when the service was not expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Note shown instead of, or before, the slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Bound slots in template order
    #[serde(default)]
    pub slots: Vec<RenderedSlot>,
}

impl Section {
    /// Slot by id
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&RenderedSlot> {
        self.slots.iter().find(|s| s.id == id)
    }
}

/// Assembled services of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Civil date
    pub date: NaiveDate,
    /// Title of the day
    pub title: String,
    /// Services in cycle order
    pub sections: Vec<Section>,
    /// Every reference that fell back to a placeholder
    #[serde(default)]
    pub gaps: Vec<UnresolvedReference>,
}

impl Document {
    /// Section by service key
    #[must_use]
    pub fn section(&self, service: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.service == service)
    }

    /// Check if every reference was found
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails.
    pub fn to_json(&self) -> TypikonResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TypikonError::parse_error("document", e))
    }

    /// Plain-text rendering
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("DATE: {}\nFEAST: {}\n", self.date, self.title);
        for section in &self.sections {
            out.push('\n');
            match &section.template {
                Some(template) => {
                    out.push_str(&format!("--- {} ({template}) ---\n", section.display_name));
                }
                None => out.push_str(&format!("--- {} ---\n", section.display_name)),
            }
            if let Some(note) = &section.note {
                out.push_str(note);
                out.push('\n');
            }
            for slot in &section.slots {
                match &slot.rubric {
                    Some(rubric) => out.push_str(&format!("[{}] {rubric}\n", slot.id)),
                    None => out.push_str(&format!("[{}]\n", slot.id)),
                }
                for line in &slot.lines {
                    out.push_str(line);
                    out.push('\n');
                }
                for text in &slot.texts {
                    let record = &text.record;
                    if record.title.is_empty() || record.is_placeholder {
                        out.push_str(&record.body);
                    } else {
                        out.push_str(&format!("{}: {}", record.title, record.body));
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// Binds expanded templates to texts for one configuration
#[derive(Debug, Clone, Copy)]
pub struct BookletAssembler<'a> {
    config: &'a ConfigurationSet,
    assets: &'a TextAssetStore,
    resolvers: &'a ResolverRegistry,
    options: &'a EngineOptions,
}

impl<'a> BookletAssembler<'a> {
    /// Create assembler
    #[must_use]
    pub fn new(
        config: &'a ConfigurationSet,
        assets: &'a TextAssetStore,
        resolvers: &'a ResolverRegistry,
        options: &'a EngineOptions,
    ) -> Self {
        Self {
            config,
            assets,
            resolvers,
            options,
        }
    }

    /// Template a service uses on a day
    ///
    /// Order: explicit override in the rubrics, named period, variant of the
    /// day-type variable, Sunday form, festal form on high-ranked days and
    /// Sunday vigils, default.
    #[must_use]
    pub fn effective_template<'r>(
        &self,
        entry: &'r ServiceEntry,
        context: &Context,
        rubrics: &'r ResolvedRubrics,
    ) -> &'r str {
        let templates = self.config.templates();

        if let Some(name) = rubrics.override_for(&entry.type_key) {
            if templates.contains(name) {
                return name;
            }
            warn!(
                service = %entry.service,
                template = name,
                "override names unknown template, ignored"
            );
        }
        if let Some(name) = entry.period_templates.get(&context.period()) {
            return name;
        }
        if let Some(value) = entry
            .variant_variable
            .as_deref()
            .and_then(|variable| rubrics.variable(variable))
        {
            if let Some(name) = entry
                .variants
                .iter()
                .find_map(|(needle, name)| value.contains(needle.as_str()).then_some(name))
            {
                return name;
            }
        }
        if let Some(name) = &entry.sunday_template {
            if context.is_sunday() {
                return name;
            }
        }
        if let Some(name) = &entry.festal_template {
            if rubrics.is_festal() {
                return name;
            }
        }
        &entry.default_template
    }

    /// Assemble the document of a day
    #[must_use]
    pub fn assemble(&self, context: &Context, rubrics: &ResolvedRubrics) -> Document {
        let mut gaps = Vec::new();
        let sections = self
            .config
            .cycle()
            .services()
            .iter()
            .map(|entry| self.assemble_service(entry, context, rubrics, &mut gaps))
            .collect();

        let document = Document {
            date: context.date(),
            title: rubrics.title.clone(),
            sections,
            gaps,
        };
        info!(
            date = %document.date,
            sections = document.sections.len(),
            gaps = document.gaps.len(),
            "booklet assembled"
        );
        document
    }

    fn assemble_service(
        &self,
        entry: &ServiceEntry,
        context: &Context,
        rubrics: &ResolvedRubrics,
        gaps: &mut Vec<UnresolvedReference>,
    ) -> Section {
        let mut section = Section {
            service: entry.service.clone(),
            display_name: entry.display_name.clone(),
            template: None,
            note: None,
            slots: Vec::new(),
        };

        if entry.mergeable && rubrics.evening_office_merged() {
            debug!(service = %entry.service, "service merged into the liturgy");
            section.note = Some(MERGE_NOTE.to_string());
            return section;
        }

        let template = self.effective_template(entry, context, rubrics);
        debug!(service = %entry.service, template, "template selected");
        section.template = Some(template.to_string());

        let Some(sequence) = self.config.templates().resolve_sequence(template) else {
            section.note = Some(format!("Template '{template}' could not be resolved."));
            gaps.push(UnresolvedReference::new(
                format!("template.{template}"),
                entry.service.as_str(),
            ));
            return section;
        };

        section.slots = sequence
            .iter()
            .map(|slot| self.bind_slot(&entry.service, slot, context, rubrics, gaps))
            .collect();
        section
    }

    fn bind_slot(
        &self,
        service: &str,
        slot: &Slot,
        context: &Context,
        rubrics: &ResolvedRubrics,
        gaps: &mut Vec<UnresolvedReference>,
    ) -> RenderedSlot {
        let required_by = format!("{service}/{}", slot.id);
        let mut rendered = RenderedSlot::new(slot);

        match &slot.content {
            SlotContent::FixedRef { key } => {
                rendered.texts.push(self.lookup(key, &required_by, gaps));
            }
            SlotContent::RefGroup { keys } => {
                rendered
                    .texts
                    .extend(keys.iter().map(|key| self.lookup(key, &required_by, gaps)));
            }
            SlotContent::VariableLogic { function, args } => {
                let input = ResolverInput {
                    context,
                    rubrics,
                    args,
                    options: self.options,
                    required_by: &required_by,
                };
                let output = self.resolvers.resolve(*function, &input);
                rendered.lines = output.lines;
                rendered.texts.extend(
                    output
                        .refs
                        .iter()
                        .map(|key| self.lookup(key, &required_by, gaps)),
                );
                for missing in output.unresolved {
                    rendered.texts.push(placeholder(missing, gaps));
                }
            }
            SlotContent::LiteralSequence { lines } => {
                rendered.lines.clone_from(lines);
            }
        }
        rendered
    }

    fn lookup(
        &self,
        key: &str,
        required_by: &str,
        gaps: &mut Vec<UnresolvedReference>,
    ) -> RenderedText {
        match self.assets.lookup(key, required_by) {
            Ok(record) => RenderedText {
                key: key.to_string(),
                record: record.clone(),
            },
            Err(missing) => placeholder(missing, gaps),
        }
    }
}

fn placeholder(missing: UnresolvedReference, gaps: &mut Vec<UnresolvedReference>) -> RenderedText {
    debug!(key = %missing.key, required_by = %missing.required_by, "placeholder substituted");
    let text = RenderedText {
        key: missing.key.clone(),
        record: TextRecord::placeholder(&missing),
    };
    gaps.push(missing);
    text
}
