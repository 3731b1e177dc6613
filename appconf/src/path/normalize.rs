//! Path normalization for base directories.
//!
//! Base directories (the root, the config and data directories) are made
//! absolute once, up front, so everything resolved against them is absolute
//! too. Option values joined onto them are not normalized further.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Expand a leading `~` to the home directory.
///
/// `~user` forms are rejected.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8, the home directory is
/// unknown, or the path uses `~user` syntax.
///
/// # Examples
///
/// ```
/// use appconf::path::normalize::expand_tilde;
/// use std::path::Path;
///
/// assert!(expand_tilde(Path::new("~/galaxy")).unwrap().is_absolute());
/// assert_eq!(expand_tilde(Path::new("/srv")).unwrap(), Path::new("/srv"));
/// ```
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains invalid UTF-8".to_string(),
    })?;

    let Some(rest) = path_str.strip_prefix('~') else {
        return Ok(path.to_path_buf());
    };

    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot determine home directory".to_string(),
    })?;

    if rest.is_empty() {
        Ok(home)
    } else if let Some(tail) = rest.strip_prefix('/').or_else(|| rest.strip_prefix('\\')) {
        Ok(home.join(tail))
    } else {
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}

/// Drop `.` components and fold `..` into the preceding component.
///
/// A `..` at the root stays at the root.
///
/// # Examples
///
/// ```
/// use appconf::path::normalize::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(resolve_components(Path::new("/srv/./app/../data")), PathBuf::from("/srv/data"));
/// assert_eq!(resolve_components(Path::new("/../etc")), PathBuf::from("/etc"));
/// ```
#[must_use]
pub fn resolve_components(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::RootDir => result.push(Component::RootDir),
            Component::Normal(c) => result.push(c),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = result.parent().is_none() && result.has_root();
                if !at_root && !result.pop() {
                    result.push("..");
                }
            }
        }
    }

    result
}

/// Make `path` absolute against `base` and fold its components.
///
/// # Errors
///
/// Returns an error if tilde expansion fails.
pub fn normalize_against(path: &Path, base: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    Ok(resolve_components(&absolute))
}

/// Make `path` absolute against the current directory and fold its
/// components.
///
/// # Errors
///
/// Returns an error if tilde expansion fails or the current directory
/// cannot be determined.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|e| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: format!("Cannot get current directory: {e}"),
    })?;
    normalize_against(path, &cwd)
}
