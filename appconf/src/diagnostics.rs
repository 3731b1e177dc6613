//! Non-fatal findings raised while building a configuration.
//!
//! Every warning is logged through the `log` facade when it is recorded and
//! is also kept on the configuration, so callers and tests can inspect what
//! was corrected or ignored.

use std::fmt;
use std::path::PathBuf;

/// A non-fatal configuration finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A database URL used a deprecated scheme and was rewritten.
    DeprecatedUrlScheme {
        /// The option holding the URL.
        option: String,
        /// The deprecated scheme.
        old: String,
        /// The replacement scheme.
        new: String,
    },

    /// A path carried a leading directory that its parent already implies.
    DeprecatedDirectoryPrefix {
        /// The path option.
        option: String,
        /// The option the path resolves against.
        resolves_to: String,
        /// The stripped prefix, including the separator.
        prefix: String,
        /// The path as supplied.
        path: String,
    },

    /// A path was found relative to the root instead of its parent.
    RootRelativePath {
        /// The path option.
        option: String,
        /// The option the path should be relative to.
        resolves_to: String,
        /// The adopted path.
        path: PathBuf,
    },

    /// A deprecated option was supplied.
    DeprecatedOption {
        /// The option name.
        option: String,
    },

    /// A path was taken from a deprecated location.
    DeprecatedLocation {
        /// The option name.
        option: String,
        /// The adopted path.
        path: PathBuf,
    },

    /// An explicitly configured list file does not exist.
    MissingListFile {
        /// The option naming the file.
        option: String,
        /// The missing file.
        path: PathBuf,
    },
}

impl ConfigWarning {
    /// The option the warning is about.
    #[must_use]
    pub fn option(&self) -> &str {
        match self {
            Self::DeprecatedUrlScheme { option, .. }
            | Self::DeprecatedDirectoryPrefix { option, .. }
            | Self::RootRelativePath { option, .. }
            | Self::DeprecatedOption { option }
            | Self::DeprecatedLocation { option, .. }
            | Self::MissingListFile { option, .. } => option,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeprecatedUrlScheme { option, old, new } => write!(
                f,
                "Database URLs of the form \"{old}://\" in '{option}' are deprecated. Please use \"{new}://\"."
            ),
            Self::DeprecatedDirectoryPrefix {
                option,
                resolves_to,
                prefix,
                path,
            } => write!(
                f,
                "Paths for the '{option}' option are now relative to '{resolves_to}', remove the leading '{prefix}' to suppress this warning: {path}"
            ),
            Self::RootRelativePath {
                option,
                resolves_to,
                ..
            } => write!(
                f,
                "Paths for the '{option}' option should be relative to '{resolves_to}'. To suppress this warning, move '{option}' into '{resolves_to}', or set its value to an absolute path."
            ),
            Self::DeprecatedOption { option } => write!(
                f,
                "Config option '{option}' is deprecated and will be removed in a future release."
            ),
            Self::DeprecatedLocation { option, path } => write!(
                f,
                "The path '{}' for the '{option}' config option is deprecated and will no longer be checked in a future release.",
                path.display()
            ),
            Self::MissingListFile { option, path } => write!(
                f,
                "File for '{option}' explicitly specified as '{}' but does not exist, continuing with an empty list.",
                path.display()
            ),
        }
    }
}

/// Collects warnings, logging each as it arrives.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<ConfigWarning>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a warning.
    pub fn warn(&mut self, warning: ConfigWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// The recorded warnings, in order.
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Take ownership of the recorded warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<ConfigWarning> {
        self.warnings
    }
}
