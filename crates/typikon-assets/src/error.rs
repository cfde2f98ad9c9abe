//! Error types for asset loading
//!
//! Loading failures are fatal and surface here. A key that is merely
//! missing at lookup time is not an error of this kind; it is reported as an
//! [`UnresolvedReference`](crate::UnresolvedReference) value.

use std::path::PathBuf;

/// Errors while building asset layers
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// IO error reading a layer
    #[error("io error reading {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document could not be parsed
    #[error("parse error in {origin}: {message}")]
    Parse {
        /// File path or layer name
        origin: String,
        /// Parser message
        message: String,
    },

    /// Document parsed but is not an asset or asset collection
    #[error("unexpected asset shape in {origin} at '{key}'")]
    InvalidShape {
        /// File path or layer name
        origin: String,
        /// Key whose value was rejected
        key: String,
    },
}

impl AssetError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create parse error
    pub fn parse_error(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Create shape error
    pub fn invalid_shape(origin: impl Into<String>, key: impl Into<String>) -> Self {
        Self::InvalidShape {
            origin: origin.into(),
            key: key.into(),
        }
    }
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;
