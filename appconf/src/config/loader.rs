//! Configuration file discovery and loading.
//!
//! Configuration files are YAML. A file may hold the options at the top
//! level or nest them under the application section:
//!
//! ```yaml
//! myapp:
//!   tool_config_file: tool_conf.xml,shed_tool_conf.xml
//!   database_connection: sqlite:///universe.sqlite
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::value::{yaml_key, Options, Value};

/// Loads option mappings from configuration files.
///
/// # Examples
///
/// ```no_run
/// use appconf::config::ConfigFileLoader;
/// use std::path::Path;
///
/// if let Some(path) = ConfigFileLoader::find_config_file(Path::new("."), "galaxy") {
///     let options = ConfigFileLoader::load_file(&path, "galaxy").unwrap();
///     println!("{} options in {}", options.len(), path.display());
/// }
/// ```
pub struct ConfigFileLoader;

impl ConfigFileLoader {
    /// Candidate file names under the root, in discovery order.
    fn candidates(root: &Path, app_name: &str) -> [PathBuf; 3] {
        [
            root.join("config").join(format!("{app_name}.yml")),
            root.join("config").join(format!("{app_name}.yaml")),
            root.join(format!("{app_name}.yml")),
        ]
    }

    /// Find the default configuration file under `root`.
    ///
    /// Looks for `config/<app>.yml`, `config/<app>.yaml` and `<app>.yml`,
    /// returning the first that is a file.
    #[must_use]
    pub fn find_config_file(root: &Path, app_name: &str) -> Option<PathBuf> {
        Self::candidates(root, app_name)
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Load and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a YAML mapping.
    pub fn load_file(path: &Path, app_name: &str) -> Result<Options> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: format!("Failed to read configuration file: {e}"),
        })?;
        let options = Self::load_str(&contents, app_name).map_err(|reason| Error::ConfigFile {
            path: path.to_path_buf(),
            reason,
        })?;
        log::debug!("Loaded {} options from {}", options.len(), path.display());
        Ok(options)
    }

    /// Parse configuration text.
    ///
    /// An empty document yields no options.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the text is not valid YAML or
    /// the option section is not a mapping.
    pub fn load_str(contents: &str, app_name: &str) -> std::result::Result<Options, String> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(contents).map_err(|e| format!("Invalid YAML: {e}"))?;

        let section = match document {
            serde_yaml::Value::Null => return Ok(Options::new()),
            serde_yaml::Value::Mapping(mut top) => {
                match top.remove(serde_yaml::Value::String(app_name.to_string())) {
                    Some(serde_yaml::Value::Null) => return Ok(Options::new()),
                    Some(serde_yaml::Value::Mapping(section)) => section,
                    Some(_) => return Err(format!("Section '{app_name}' is not a mapping")),
                    None => top,
                }
            }
            _ => return Err("Expected a mapping of options".to_string()),
        };

        Ok(section
            .into_iter()
            .map(|(k, v)| (yaml_key(k), Value::from(v)))
            .collect())
    }
}
