//! Base directories every other path is resolved against.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::profile::Layout;
use crate::error::{Error, Result};
use crate::path::normalize::{normalize, normalize_against};
use crate::value::Options;

/// The absolute base directories of one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectories {
    /// Application root.
    pub root: PathBuf,
    /// Directory holding configuration files.
    pub config_dir: PathBuf,
    /// Directory holding application data.
    pub data_dir: PathBuf,
    /// Directory for configuration files the application writes itself.
    pub managed_config_dir: PathBuf,
    /// Directory holding bundled sample configuration files.
    pub sample_config_dir: PathBuf,
}

impl BaseDirectories {
    /// Work out the base directories.
    ///
    /// `config_dir` comes from the options, else the directory of the
    /// configuration file, else the layout default; `data_dir` and
    /// `managed_config_dir` come from the options, else the layout default.
    /// Explicit values are made absolute against the current directory.
    /// The sample directory defaults to `<root>/config/sample`.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be made absolute.
    pub fn resolve(
        root: &Path,
        kwargs: &Options,
        config_file: Option<&Path>,
        sample_config_dir: Option<&Path>,
        layout: Layout,
    ) -> Result<Self> {
        let root = normalize(root)?;
        let explicit = |key: &str| -> Result<Option<PathBuf>> {
            kwargs
                .get(key)
                .and_then(crate::Value::as_path)
                .map(|path| normalize(&path))
                .transpose()
        };

        let config_dir = match explicit("config_dir")? {
            Some(dir) => Some(dir),
            None => config_file
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(normalize)
                .transpose()?,
        };
        let data_dir = explicit("data_dir")?;
        let managed_config_dir = explicit("managed_config_dir")?;

        let (config_dir, data_dir, managed_config_dir) = match layout {
            Layout::Source => {
                let config_dir = config_dir.unwrap_or_else(|| root.join("config"));
                let data_dir = data_dir.unwrap_or_else(|| root.join("database"));
                let managed = managed_config_dir.unwrap_or_else(|| config_dir.clone());
                (config_dir, data_dir, managed)
            }
            Layout::Installed => {
                let config_dir = match config_dir {
                    Some(dir) => dir,
                    None => env::current_dir().map_err(|e| Error::InvalidPath {
                        path: PathBuf::from("."),
                        reason: format!("Cannot get current directory: {e}"),
                    })?,
                };
                let data_dir = data_dir.unwrap_or_else(|| config_dir.join("data"));
                let managed = managed_config_dir.unwrap_or_else(|| data_dir.join("config"));
                (config_dir, data_dir, managed)
            }
        };

        let sample_config_dir = match sample_config_dir {
            Some(dir) => normalize_against(dir, &root)?,
            None => root.join("config").join("sample"),
        };

        log::debug!("Configuration directory is {}", config_dir.display());
        log::debug!("Data directory is {}", data_dir.display());
        log::debug!("Managed config directory is {}", managed_config_dir.display());

        Ok(Self {
            root,
            config_dir,
            data_dir,
            managed_config_dir,
            sample_config_dir,
        })
    }
}
