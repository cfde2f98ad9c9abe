//! Validated collection of structure templates
//!
//! The library checks the whole inheritance graph when it is built:
//! duplicate names, unknown parents, cycles and ambiguous override targets
//! are all rejected up front. After that, [`TemplateLibrary::resolve_sequence`]
//! only has to walk a known-good chain.

use std::collections::HashSet;

use im::Vector;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{StructureError, StructureResult};
use crate::slot::Slot;
use crate::template::StructureTemplate;

/// Named templates with inheritance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateLibrary {
    templates: IndexMap<String, StructureTemplate>,
}

impl TemplateLibrary {
    /// Build and validate a library
    ///
    /// # Errors
    ///
    /// Any [`StructureError`] describing the first defect found.
    pub fn new(templates: impl IntoIterator<Item = StructureTemplate>) -> StructureResult<Self> {
        let mut map = IndexMap::new();
        for template in templates {
            if map.contains_key(&template.name) {
                return Err(StructureError::DuplicateTemplate(template.name));
            }
            map.insert(template.name.clone(), template);
        }

        let library = Self { templates: map };
        library.validate()?;
        info!(templates = library.len(), "template library loaded");
        Ok(library)
    }

    /// Parse a JSON array of templates
    ///
    /// # Errors
    ///
    /// [`StructureError::Malformed`] on a bad document, otherwise any
    /// validation error from [`TemplateLibrary::new`].
    pub fn from_json(json: &str) -> StructureResult<Self> {
        let templates: Vec<StructureTemplate> = serde_json::from_str(json)?;
        Self::new(templates)
    }

    fn validate(&self) -> StructureResult<()> {
        for template in self.templates.values() {
            match &template.inherits_from {
                Some(_) if !template.sequence.is_empty() => {
                    return Err(StructureError::MixedDefinition(template.name.clone()));
                }
                None if !template.overrides.is_empty() => {
                    return Err(StructureError::MixedDefinition(template.name.clone()));
                }
                Some(parent) if !self.templates.contains_key(parent) => {
                    return Err(StructureError::unknown_parent(&template.name, parent));
                }
                _ => {}
            }
        }

        for name in self.templates.keys() {
            self.check_chain(name)?;
        }

        for name in self.templates.keys() {
            self.expand(name)?;
        }
        Ok(())
    }

    /// Walk `inherits_from` links from `name`, failing on a revisit
    fn check_chain(&self, name: &str) -> StructureResult<()> {
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        let mut current = Some(name);

        while let Some(step) = current {
            path.push(step.to_string());
            if !seen.insert(step) {
                return Err(StructureError::CyclicInheritance { path });
            }
            current = self
                .templates
                .get(step)
                .and_then(|t| t.inherits_from.as_deref());
        }
        Ok(())
    }

    fn expand(&self, name: &str) -> StructureResult<Option<Vector<Slot>>> {
        let Some(template) = self.templates.get(name) else {
            return Ok(None);
        };
        match &template.inherits_from {
            None => Ok(Some(template.sequence.iter().cloned().collect())),
            Some(parent) => {
                let Some(base) = self.expand(parent)? else {
                    return Err(StructureError::unknown_parent(name, parent));
                };
                template.apply_overrides(&base).map(Some)
            }
        }
    }

    /// Fully expanded slot sequence of a template
    ///
    /// Returns `None` when no template has that name. The result is a fresh
    /// vector; neither the parent nor any sibling is affected by the
    /// overrides applied to produce it.
    #[must_use]
    pub fn resolve_sequence(&self, name: &str) -> Option<Vector<Slot>> {
        match self.expand(name) {
            Ok(Some(sequence)) => {
                debug!(template = name, slots = sequence.len(), "sequence resolved");
                Some(sequence)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(template = name, error = %err, "template failed to resolve");
                None
            }
        }
    }

    /// Template by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StructureTemplate> {
        self.templates.get(name)
    }

    /// Whether a template exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of templates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
