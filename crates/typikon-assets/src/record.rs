//! Text records and unresolved references

use serde::{Deserialize, Serialize};

/// Source attribution given to generated placeholder records
pub const PLACEHOLDER_SOURCE: &str = "System Logic";

/// Title given to generated placeholder records
pub const PLACEHOLDER_TITLE: &str = "Missing Component";

/// One text asset
///
/// Field aliases accept the older record shapes (`content`,
/// `source_attribution`, `is_stub`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Text body
    #[serde(alias = "content")]
    pub body: String,
    /// Source book or edition
    #[serde(default, alias = "source_attribution")]
    pub source: String,
    /// Stand-in for text not yet entered
    #[serde(default, alias = "is_stub", alias = "is_missing")]
    pub is_placeholder: bool,
}

impl TextRecord {
    /// Record with a body only
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            body: body.into(),
            source: String::new(),
            is_placeholder: false,
        }
    }

    /// Set title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set source attribution
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Structured stand-in for a missing key
    #[must_use]
    pub fn placeholder(missing: &UnresolvedReference) -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            body: format!(
                "[MISSING_COMPONENT: {} | REQUIRED_BY: {}]",
                missing.key, missing.required_by
            ),
            source: PLACEHOLDER_SOURCE.to_string(),
            is_placeholder: true,
        }
    }
}

/// A reference with no matching asset
///
/// Recovered locally: the assembler substitutes
/// [`TextRecord::placeholder`] and lists the reference among the document's
/// gaps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("missing component '{key}' required by '{required_by}'")]
pub struct UnresolvedReference {
    /// Key that was looked up
    pub key: String,
    /// Rule or slot that asked for it
    pub required_by: String,
}

impl UnresolvedReference {
    /// Create reference
    pub fn new(key: impl Into<String>, required_by: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            required_by: required_by.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn accepts_legacy_field_names() {
        let record: TextRecord = serde_json::from_value(json!({
            "title": "Troparion",
            "content": "Thy Resurrection, O Christ",
            "source_attribution": "Octoechos",
            "is_stub": true
        }))
        .unwrap();
        assert_eq!(record.body, "Thy Resurrection, O Christ");
        assert_eq!(record.source, "Octoechos");
        assert!(record.is_placeholder);

        let minimal: TextRecord = serde_json::from_value(json!({"body": "Amen."})).unwrap();
        assert_eq!(minimal, TextRecord::new("Amen."));
    }

    #[test]
    fn placeholder_names_key_and_requester() {
        let missing = UnresolvedReference::new("menaion.09_14.troparion", "troparia");
        let record = TextRecord::placeholder(&missing);
        assert_eq!(
            record.body,
            "[MISSING_COMPONENT: menaion.09_14.troparion | REQUIRED_BY: troparia]"
        );
        assert_eq!(record.title, PLACEHOLDER_TITLE);
        assert!(record.is_placeholder);
        assert_eq!(
            missing.to_string(),
            "missing component 'menaion.09_14.troparion' required by 'troparia'"
        );
    }
}
