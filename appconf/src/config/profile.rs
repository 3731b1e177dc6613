//! Application-specific resolution policy.
//!
//! The schema says what options exist; the profile says how a particular
//! application treats them: which names were renamed, which paths get a
//! bundled sample fallback, which are lists, and so on.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the application is laid out on disk.
///
/// This decides the fallback locations of the base directories when they
/// are not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Running from a source checkout: `<root>/config`, `<root>/database`.
    #[default]
    Source,
    /// Installed as a package: the working directory holds the config.
    Installed,
}

/// Resolution policy for one application.
///
/// # Examples
///
/// ```
/// use appconf::config::AppProfile;
///
/// let profile: AppProfile = serde_yaml::from_str(r"
/// renamed_options:
///   whitelist_file: allowlist_file
/// deprecated_dirs:
///   config_dir: config
/// listify_options: [tool_config_file]
/// ").unwrap();
/// assert_eq!(profile.renamed_options["whitelist_file"], "allowlist_file");
/// assert!(profile.listify_options.contains("tool_config_file"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppProfile {
    /// Old option name to new option name.
    pub renamed_options: BTreeMap<String, String>,
    /// Options that still work but should no longer be used.
    pub deprecated_options: BTreeSet<String>,
    /// Parent option to a leading directory name that paths under it used to carry.
    pub deprecated_dirs: BTreeMap<String, String>,
    /// Explicitly set options retried against the root when their resolved path is missing.
    pub paths_to_check_against_root: BTreeSet<String>,
    /// Unset options whose defaults get a bundled sample file appended.
    pub add_sample_file_to_defaults: BTreeSet<String>,
    /// Options whose values are lists of paths.
    pub listify_options: BTreeSet<String>,
    /// Options holding database URLs subject to scheme rewriting.
    pub database_url_options: BTreeSet<String>,
    /// Directory options that `check` creates when missing.
    pub required_directories: Vec<String>,
    /// Deprecated fallback locations per option, relative to the root.
    pub deprecated_locations: BTreeMap<String, Vec<String>>,
    /// Prefix for environment overrides (`<PREFIX>_CONFIG_<OPTION>`).
    pub env_prefix: Option<String>,
    /// On-disk layout.
    pub layout: Layout,
}

impl AppProfile {
    /// Load a profile from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a
    /// profile.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: format!("Failed to read profile: {e}"),
        })?;
        serde_yaml::from_str(&contents).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: format!("Invalid profile: {e}"),
        })
    }

    /// Whether `option` is a listify option.
    #[must_use]
    pub fn is_listify(&self, option: &str) -> bool {
        self.listify_options.contains(option)
    }
}
