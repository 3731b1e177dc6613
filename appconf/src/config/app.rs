//! The built configuration and its read surface.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::attributes::Attributes;
use crate::config::loader::ConfigFileLoader;
use crate::config::merger::ConfigMerger;
use crate::config::profile::AppProfile;
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::error::{Error, Result};
use crate::path::PathProbe;
use crate::schema::Schema;
use crate::value::{string_as_bool, Options, Value};

/// Prefix of options passed through to the database engine.
pub const DATABASE_ENGINE_OPTION_PREFIX: &str = "database_engine_option_";

/// A fully resolved application configuration.
///
/// Built by [`AppConfigBuilder`](crate::config::AppConfigBuilder). Read
/// access is through `&self` and the value is `Send + Sync`, so it can be
/// shared behind an `Arc`; reloading needs `&mut self`.
pub struct AppConfig {
    pub(crate) schema: Arc<Schema>,
    pub(crate) profile: AppProfile,
    pub(crate) explicit: Options,
    pub(crate) raw: Options,
    pub(crate) attributes: Attributes,
    pub(crate) root: PathBuf,
    pub(crate) config_file: Option<PathBuf>,
    pub(crate) probe: Arc<dyn PathProbe>,
    pub(crate) diagnostics: Diagnostics,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_name", &self.schema.app_name())
            .field("root", &self.root)
            .field("config_file", &self.config_file)
            .field("attributes", &self.attributes.len())
            .field("warnings", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// The schema this configuration was built from.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The application profile.
    #[must_use]
    pub fn profile(&self) -> &AppProfile {
        &self.profile
    }

    /// The application root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration file the options were read from, if any.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Warnings raised while building.
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        self.diagnostics.warnings()
    }

    /// All attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The raw configuration: schema defaults overlaid with converted
    /// explicit values, before path resolution.
    #[must_use]
    pub fn raw(&self) -> &Options {
        &self.raw
    }

    /// The explicit options as supplied, after preprocessing.
    #[must_use]
    pub fn explicit(&self) -> &Options {
        &self.explicit
    }

    /// An attribute value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// An attribute as a string.
    #[must_use]
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    /// An attribute as a single path.
    #[must_use]
    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.value(key).and_then(Value::as_path)
    }

    /// An attribute as a list of paths.
    ///
    /// Single paths yield a one-element list and unset values an empty one.
    #[must_use]
    pub fn paths(&self, key: &str) -> Vec<PathBuf> {
        self.value(key)
            .map(Value::listify_strings)
            .unwrap_or_default()
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }

    /// An attribute as a boolean; null is `None`.
    #[must_use]
    pub fn bool_value(&self, key: &str) -> Option<bool> {
        self.value(key)
            .filter(|v| !v.is_null())
            .map(Value::as_bool_lossy)
    }

    /// An attribute as an integer.
    #[must_use]
    pub fn int_value(&self, key: &str) -> Option<i64> {
        match self.value(key)? {
            Value::Int(i) => Some(*i),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// An explicitly supplied value, unconverted.
    ///
    /// This reads the explicit options, not the attributes, so it also sees
    /// keys the schema does not declare.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.explicit.get(key)
    }

    /// An explicitly supplied value read as a boolean, or `default`.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.explicit.get(key).map_or(default, Value::as_bool_lossy)
    }

    /// Whether the option was supplied explicitly.
    ///
    /// Logs a warning when the schema does not know `key`.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        if !self.raw.contains_key(key) {
            log::warn!("Configuration option does not exist: '{key}'");
        }
        self.explicit.contains_key(key)
    }

    /// Join `path` onto the root.
    #[must_use]
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// The value of `option` for a given host.
    ///
    /// For per-host options, the `<option>_by_host` mapping of the explicit
    /// options is scanned in declaration order and the first entry whose key
    /// is a substring of `host` wins. Otherwise the attribute value is returned.
    #[must_use]
    pub fn value_for_host(&self, option: &str, host: &str) -> Option<&Value> {
        if self.schema.per_host_options().contains(option) {
            let by_host = self
                .explicit
                .get(&format!("{option}_by_host"))
                .and_then(Value::as_map);
            if let Some(by_host) = by_host {
                if let Some((_, value)) = by_host.iter().find(|(key, _)| host.contains(key.as_str())) {
                    return Some(value);
                }
            }
        }
        self.value(option)
    }

    /// For an unset option, adopt the first existing candidate path.
    ///
    /// Returns the adopted path.
    pub fn set_alt_paths<P: AsRef<Path>>(&mut self, option: &str, candidates: &[P]) -> Option<PathBuf> {
        if self.is_set(option) {
            return None;
        }
        let found = candidates
            .iter()
            .map(|p| p.as_ref().to_path_buf())
            .find(|p| self.probe.exists(p))?;
        self.attributes.set(option, Value::from(found.clone()));
        Some(found)
    }

    /// Create missing required directories and report deprecated options.
    ///
    /// The data and managed config directories are always required, along
    /// with every option named in the profile's `required_directories`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreation`] naming the first directory that
    /// could not be created.
    pub fn check(&self) -> Result<Vec<ConfigWarning>> {
        let mut required: Vec<PathBuf> = ["data_dir", "managed_config_dir"]
            .iter()
            .filter_map(|key| self.path(key))
            .collect();
        for option in &self.profile.required_directories {
            required.extend(self.paths(option));
        }

        for dir in &required {
            if dir.is_dir() {
                continue;
            }
            fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreation {
                path: dir.clone(),
                source,
            })?;
            log::debug!("Created missing directory {}", dir.display());
        }

        let mut diagnostics = Diagnostics::new();
        for option in self.explicit.keys() {
            if self.profile.deprecated_options.contains(option) {
                diagnostics.warn(ConfigWarning::DeprecatedOption {
                    option: option.clone(),
                });
            }
        }
        Ok(diagnostics.into_warnings())
    }

    /// Read a list file: one entry per line, trimmed, with blank lines and
    /// `#` comment lines dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load_list_from_file(path: &Path) -> Result<Vec<String>> {
        let contents = fs::read_to_string(path)?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    /// Read the list file named by a path option.
    ///
    /// A missing or unreadable file yields an empty list. That is logged as
    /// a warning when the option was set explicitly, at debug level
    /// otherwise.
    #[must_use]
    pub fn read_list_option(&self, option: &str) -> Vec<String> {
        let Some(path) = self.path(option) else {
            return Vec::new();
        };
        match Self::load_list_from_file(&path) {
            Ok(entries) => entries,
            Err(err) => {
                if self.explicit.contains_key(option) {
                    log::warn!(
                        "{}",
                        ConfigWarning::MissingListFile {
                            option: option.to_string(),
                            path,
                        }
                    );
                } else if matches!(&err, Error::Io(e) if e.kind() == ErrorKind::NotFound) {
                    log::debug!("No list file for '{option}' at {}", path.display());
                } else {
                    log::debug!("Cannot read list file for '{option}': {err}");
                }
                Vec::new()
            }
        }
    }

    /// Apply changed values of reloadable options.
    ///
    /// Each reloadable option present in `modified` whose converted value
    /// differs from the raw value is updated in the raw configuration and
    /// the attributes. Returns the names of the updated options.
    ///
    /// # Errors
    ///
    /// Returns an error if a new value cannot be converted to its type.
    pub fn reload(&mut self, modified: &Options) -> Result<Vec<String>> {
        let mut reloaded = Vec::new();
        for option in self.schema.reloadable_options() {
            let (Some(new), Some(spec)) = (modified.get(option), self.schema.option(option)) else {
                continue;
            };
            let new = ConfigMerger::convert(spec, new)?;
            if self.raw.get(option) == Some(&new) {
                continue;
            }
            self.raw.insert(option.clone(), new.clone());
            self.attributes.set(option, new);
            log::info!("Reloaded {option}");
            reloaded.push(option.clone());
        }
        Ok(reloaded)
    }

    /// Re-read the configuration file and reload from it.
    ///
    /// Without a configuration file there is nothing to reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or a value cannot be
    /// converted.
    pub fn reload_from_file(&mut self) -> Result<Vec<String>> {
        let Some(path) = self.config_file.clone() else {
            log::debug!("No configuration file to reload from");
            return Ok(Vec::new());
        };
        let modified = ConfigFileLoader::load_file(&path, self.schema.app_name())?;
        self.reload(&modified)
    }

    /// Explicit options starting with `prefix`, with the prefix removed.
    #[must_use]
    pub fn prefixed_options(&self, prefix: &str) -> Options {
        self.explicit
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect()
    }

    /// Options for the database engine, from explicit
    /// `<model_prefix>database_engine_option_*` options.
    ///
    /// Well-known engine options are converted to booleans or integers.
    #[must_use]
    pub fn database_engine_options(&self, model_prefix: &str) -> Options {
        let prefix = format!("{model_prefix}{DATABASE_ENGINE_OPTION_PREFIX}");
        self.prefixed_options(&prefix)
            .into_iter()
            .map(|(key, value)| {
                let converted = match key.as_str() {
                    "convert_unicode" | "echo" | "echo_pool" | "pool_threadlocal"
                    | "server_side_cursors" => Value::Bool(string_as_bool(&value.to_string())),
                    "pool_timeout" | "pool_recycle" | "pool_size" | "max_overflow" => {
                        match value.to_string().trim().parse() {
                            Ok(i) => Value::Int(i),
                            Err(_) => value,
                        }
                    }
                    _ => value,
                };
                (key, converted)
            })
            .collect()
    }
}
