//! Error types for the appconf library.
//!
//! This module provides the error hierarchy for schema loading and
//! configuration resolution, using `thiserror` for ergonomic error handling.
//!
//! Errors fall into two families:
//!
//! - **Schema errors** are raised while loading the option schema and abort
//!   construction before any option is materialized.
//! - **Configuration errors** are raised while building or checking a
//!   configuration (attribute collisions, bad explicit values, directories
//!   that cannot be created).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an appconf error.
///
/// # Examples
///
/// ```
/// use appconf::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the appconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema source is malformed or violates a structural rule.
    #[error("schema error in {source_name}: {message}")]
    Schema {
        /// Where the schema came from (file path or a label).
        source_name: String,
        /// A description of the problem.
        message: String,
    },

    /// The schema source could not be read.
    #[error("cannot read schema {}: {source}", path.display())]
    SchemaUnreadable {
        /// The schema path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Parent links between path options form a cycle.
    #[error("path resolution cycle: {}", chain.join(" -> "))]
    ResolutionCycle {
        /// The options on the cycle, in traversal order.
        chain: Vec<String>,
    },

    /// A schema option collides with an internal attribute.
    #[error("attempting to override existing attribute '{key}'")]
    AttributeCollision {
        /// The offending option name.
        key: String,
    },

    /// An explicitly supplied value is not acceptable for its option.
    #[error("invalid value for '{option}': {reason}")]
    InvalidValue {
        /// The option name.
        option: String,
        /// The reason the value was rejected.
        reason: String,
    },

    /// A path option resolves against an option holding a list of paths.
    #[error("option '{option}' resolves against list-valued option '{parent}'")]
    ListParent {
        /// The child option.
        option: String,
        /// The list-valued parent option.
        parent: String,
    },

    /// A required directory is missing and could not be created.
    #[error("unable to create missing directory {}: {source}", path.display())]
    DirectoryCreation {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be read or is not a mapping.
    #[error("configuration file {}: {reason}", path.display())]
    ConfigFile {
        /// The configuration file path.
        path: PathBuf,
        /// A description of the problem.
        reason: String,
    },

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),

    /// A YAML document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a schema error for the given source.
    pub(crate) fn schema(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-value error for the given option.
    pub(crate) fn invalid_value(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Check if error originates from loading or validating the schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use appconf::Error;
    ///
    /// let err = Error::ResolutionCycle { chain: vec!["a".into(), "b".into(), "a".into()] };
    /// assert!(err.is_schema_error());
    /// ```
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::SchemaUnreadable { .. } | Self::ResolutionCycle { .. }
        )
    }

    /// Check if error is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use appconf::Error;
    ///
    /// let err = Error::AttributeCollision { key: "root".into() };
    /// assert!(err.is_configuration_error());
    /// assert!(!err.is_schema_error());
    /// ```
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::AttributeCollision { .. }
                | Self::InvalidValue { .. }
                | Self::ListParent { .. }
                | Self::DirectoryCreation { .. }
                | Self::ConfigFile { .. }
        )
    }
}
