//! # Error Types
//!
//! Configuration loading is the only fallible operation that aborts a
//! validation run. Everything a document can get wrong is reported as a
//! finding string instead, so it does not appear here.

use std::path::Path;

use thiserror::Error;

/// A tag vocabulary or schema file could not be turned into usable
/// configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the file that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid YAML.
    #[error("failed to parse config {path}: {reason}")]
    Parse {
        /// Path of the file that failed to parse.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The file parsed, but its top level is not a mapping.
    #[error("config {path} must be a mapping at the top level")]
    NotAMapping {
        /// Path of the offending file.
        path: String,
    },

    /// The schema document is structurally unusable (missing the tag
    /// injection point, malformed keyword, unsupported keyword, bad regex).
    #[error("invalid schema {path}: {reason}")]
    InvalidSchema {
        /// Path or identifier of the schema.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Build a [`ConfigError::Read`] for `path`.
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.display().to_string(),
            source,
        }
    }

    /// Build a [`ConfigError::Parse`] for `path`.
    pub fn parse(path: &Path, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ConfigError::InvalidSchema`] for `path`.
    pub fn invalid_schema(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::InvalidSchema {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}
