//! Error types for template libraries
//!
//! All of these are raised when a [`TemplateLibrary`](crate::TemplateLibrary)
//! is built. Resolving a validated library cannot fail.

/// Configuration defects in a template set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// Two templates share a name
    #[error("duplicate template '{0}'")]
    DuplicateTemplate(String),

    /// `inherits_from` names a template that does not exist
    #[error("template '{template}' inherits from unknown template '{parent}'")]
    UnknownParent {
        /// Child template
        template: String,
        /// Missing parent
        parent: String,
    },

    /// `inherits_from` chain loops back on itself
    #[error("cyclic template inheritance: {}", path.join(" -> "))]
    CyclicInheritance {
        /// Chain of names, first and last equal
        path: Vec<String>,
    },

    /// Override target matches more than one slot
    #[error("template '{template}': override target '{target_id}' matches {occurrences} slots")]
    AmbiguousTarget {
        /// Template declaring the override
        template: String,
        /// Target slot id
        target_id: String,
        /// Number of slots with that id
        occurrences: usize,
    },

    /// A template both inherits and declares its own sequence
    #[error("template '{0}' declares both inherits_from and a sequence")]
    MixedDefinition(String),

    /// Template document could not be parsed
    #[error("malformed template document: {0}")]
    Malformed(String),
}

impl StructureError {
    /// Create unknown-parent error
    pub fn unknown_parent(template: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnknownParent {
            template: template.into(),
            parent: parent.into(),
        }
    }

    /// Create ambiguous-target error
    pub fn ambiguous_target(
        template: impl Into<String>,
        target_id: impl Into<String>,
        occurrences: usize,
    ) -> Self {
        Self::AmbiguousTarget {
            template: template.into(),
            target_id: target_id.into(),
            occurrences,
        }
    }
}

impl From<serde_json::Error> for StructureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type for template operations
pub type StructureResult<T> = Result<T, StructureError>;
