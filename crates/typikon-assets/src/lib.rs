//! Typikon Assets - layered text store
//!
//! Holds every text the engine can place into a service: psalms, hymns,
//! litanies, rubric notes. Keys are dot-delimited paths such as
//! `tone_3.sat_vespers.troparia`.
//!
//! # Core Concepts
//!
//! - **TextRecord**: title, body, source attribution and a placeholder flag
//! - **AssetLayer**: one source of records (embedded defaults, a recension,
//!   an override directory)
//! - **TextAssetStore**: layers merged in precedence order, read-only after
//!   build, with flat-alias fallback lookups
//! - **UnresolvedReference**: a missing key and who asked for it
//!
//! # Example
//!
//! ```rust,ignore
//! use typikon_assets::prelude::*;
//!
//! let loader = AssetLoader::new();
//! let store = TextAssetStore::builder()
//!     .layer(AssetLayer::from_json_str("base", BASE_JSON)?)
//!     .layer(loader.load_dir("local", "/etc/typikon/texts").await?)
//!     .build();
//! let record = store.lookup("horologion.axion_estin", "magnification");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod loader;
pub mod record;
pub mod store;

pub use error::{AssetError, AssetResult};
pub use loader::{AssetLoader, ASSET_EXTENSIONS};
pub use record::{TextRecord, UnresolvedReference, PLACEHOLDER_SOURCE, PLACEHOLDER_TITLE};
pub use store::{AssetLayer, AssetStoreBuilder, TextAssetStore};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        AssetError, AssetLayer, AssetLoader, TextAssetStore, TextRecord, UnresolvedReference,
    };
}
