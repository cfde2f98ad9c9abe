//! Error types for the engine
//!
//! Two families reach the caller:
//! - configuration errors, raised while a [`ConfigurationSet`](crate::ConfigurationSet)
//!   or asset store is built, always before any date is resolved
//! - date errors, raised when a requested date lies outside the supported
//!   calendar epoch
//!
//! Missing texts are neither; they are recorded as gaps in the document.

use std::path::PathBuf;

use typikon_assets::AssetError;
use typikon_calendar::CalendarError;
use typikon_rules::RulesError;
use typikon_structure::StructureError;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum TypikonError {
    /// Date outside the epoch
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Rule table defect
    #[error("rule configuration error: {0}")]
    Rules(#[from] RulesError),

    /// Template library defect
    #[error("template configuration error: {0}")]
    Structure(#[from] StructureError),

    /// Asset layer could not be loaded
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Daily cycle names a template the library lacks
    #[error("service '{service}' names unknown template '{template}'")]
    UnknownTemplate {
        /// Service entry
        service: String,
        /// Missing template
        template: String,
    },

    /// A configuration document failed to parse
    #[error("malformed {document} document: {message}")]
    Parse {
        /// Which document (`rules`, `templates`, `daily_cycle`)
        document: String,
        /// Parser message
        message: String,
    },

    /// IO error reading a configuration document
    #[error("io error reading {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Any other configuration defect
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TypikonError {
    /// Create parse error
    pub fn parse_error(document: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            document: document.into(),
            message: message.to_string(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the error was raised while loading configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !self.is_date_error()
    }

    /// Check if the error concerns the requested date
    #[inline]
    #[must_use]
    pub fn is_date_error(&self) -> bool {
        matches!(self, Self::Calendar(_))
    }
}

/// Result type for engine operations
pub type TypikonResult<T> = Result<T, TypikonError>;
