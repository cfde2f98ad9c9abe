//! Structure templates and override operations
//!
//! A root template declares its sequence directly. A child template names a
//! parent with `inherits_from` and lists [`OverrideOp`]s applied, in order,
//! to a copy of the parent's expansion.
//!
//! Each operation locates the first slot whose id equals its `target_id`.
//! A target that matches nothing is skipped, so a template can be written
//! against optional slots of a richer parent. A target that matches more
//! than one slot is a configuration error.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StructureError, StructureResult};
use crate::slot::{LogicArgs, Slot};

/// Edit applied to an inherited sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OverrideOp {
    /// Swap the target for a new slot
    Replace {
        /// Slot to replace
        target_id: String,
        /// Replacement
        new_component: Slot,
    },
    /// Remove the target
    Delete {
        /// Slot to remove
        target_id: String,
    },
    /// Insert a slot after the target
    InsertAfter {
        /// Anchor slot
        target_id: String,
        /// Inserted slot
        new_component: Slot,
    },
    /// Insert a slot before the target
    InsertBefore {
        /// Anchor slot
        target_id: String,
        /// Inserted slot
        new_component: Slot,
    },
    /// Merge a partial patch into the target
    Modify {
        /// Slot to patch
        target_id: String,
        /// New rubric annotation
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rubric: Option<String>,
        /// Resolver arguments merged into the slot's own
        #[serde(default, skip_serializing_if = "Option::is_none")]
        logic_args: Option<LogicArgs>,
    },
}

impl OverrideOp {
    /// Slot id the operation addresses
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &str {
        match self {
            Self::Replace { target_id, .. }
            | Self::Delete { target_id }
            | Self::InsertAfter { target_id, .. }
            | Self::InsertBefore { target_id, .. }
            | Self::Modify { target_id, .. } => target_id,
        }
    }

    /// Apply to a sequence, returning the edited copy
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::AmbiguousTarget`] when the target id occurs
    /// more than once in `sequence`.
    pub fn apply(&self, template: &str, sequence: &Vector<Slot>) -> StructureResult<Vector<Slot>> {
        let target = self.target_id();
        let mut hits = sequence
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.id == target)
            .map(|(index, _)| index);

        let Some(index) = hits.next() else {
            debug!(template, target, "override target absent, skipped");
            return Ok(sequence.clone());
        };
        let extra = hits.count();
        if extra > 0 {
            return Err(StructureError::ambiguous_target(template, target, extra + 1));
        }

        // im::Vector clones share structure; edits never reach `sequence`
        let mut edited = sequence.clone();
        match self {
            Self::Replace { new_component, .. } => {
                edited.set(index, new_component.clone());
            }
            Self::Delete { .. } => {
                edited.remove(index);
            }
            Self::InsertAfter { new_component, .. } => {
                edited.insert(index + 1, new_component.clone());
            }
            Self::InsertBefore { new_component, .. } => {
                edited.insert(index, new_component.clone());
            }
            Self::Modify {
                rubric, logic_args, ..
            } => {
                let patched = edited[index].patched(rubric.as_deref(), logic_args.as_ref());
                edited.set(index, patched);
            }
        }
        Ok(edited)
    }
}

/// Named service skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    /// Template name
    pub name: String,
    /// Parent template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
    /// Own sequence (root templates only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<Slot>,
    /// Edits applied to the parent's expansion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideOp>,
}

impl StructureTemplate {
    /// Root template with its own sequence
    pub fn root(name: impl Into<String>, sequence: Vec<Slot>) -> Self {
        Self {
            name: name.into(),
            inherits_from: None,
            sequence,
            overrides: Vec::new(),
        }
    }

    /// Child template of `parent`
    pub fn child(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherits_from: Some(parent.into()),
            sequence: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Append an override operation
    #[must_use]
    pub fn with_override(mut self, op: OverrideOp) -> Self {
        self.overrides.push(op);
        self
    }

    /// Apply all overrides in declaration order
    ///
    /// # Errors
    ///
    /// Propagates [`StructureError::AmbiguousTarget`] from the first
    /// ambiguous operation.
    pub fn apply_overrides(&self, base: &Vector<Slot>) -> StructureResult<Vector<Slot>> {
        self.overrides
            .iter()
            .try_fold(base.clone(), |sequence, op| op.apply(&self.name, &sequence))
    }
}
