//! Typikon Structure - service templates with inheritance
//!
//! A service is a sequence of [`Slot`]s. Templates either declare that
//! sequence outright or inherit one and edit it with override operations.
//!
//! # Core Concepts
//!
//! - **Slot**: id, optional rubric, and a content descriptor (fixed asset
//!   key, key group, resolver call or literal lines)
//! - **OverrideOp**: replace, delete, insert before/after, or modify a slot
//!   located by id
//! - **TemplateLibrary**: validated template set; expansion returns a fresh
//!   persistent vector so parents are never mutated
//!
//! # Example
//!
//! ```rust,ignore
//! use typikon_structure::prelude::*;
//!
//! let library = TemplateLibrary::from_json(include_str!("templates.json"))?;
//! let slots = library.resolve_sequence("vespers_great").unwrap_or_default();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod library;
pub mod slot;
pub mod template;

pub use error::{StructureError, StructureResult};
pub use library::TemplateLibrary;
pub use slot::{LogicArgs, ResolverId, Slot, SlotContent};
pub use template::{OverrideOp, StructureTemplate};

/// Persistent vector returned by template expansion
pub use im::Vector;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        LogicArgs, OverrideOp, ResolverId, Slot, SlotContent, StructureError, StructureTemplate,
        TemplateLibrary, Vector,
    };
}
