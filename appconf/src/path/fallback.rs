//! Root-relative fallback for explicitly set path options.
//!
//! Older deployments gave some paths relative to the application root
//! rather than to the directory option they now resolve against. When such
//! a path does not exist where it resolves to, the same relative value is
//! tried under the root and adopted from there if it exists.

use std::path::{Path, PathBuf};

use crate::config::attributes::Attributes;
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::path::probe::PathProbe;
use crate::value::Value;

/// Retries missing relative paths against the application root.
pub struct RootFallback<'a> {
    root: &'a Path,
    probe: &'a dyn PathProbe,
}

impl<'a> RootFallback<'a> {
    /// Create a fallback rooted at `root`.
    #[must_use]
    pub fn new(root: &'a Path, probe: &'a dyn PathProbe) -> Self {
        Self { root, probe }
    }

    /// Check an option's resolved path(s) against the root.
    ///
    /// `raw` is the option's value before resolution. Lists are checked
    /// element by element, keeping positions. Returns whether anything was
    /// replaced.
    pub fn check(
        &self,
        key: &str,
        resolves_to: &str,
        raw: &Value,
        attributes: &mut Attributes,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(current) = attributes.get(key).cloned() else {
            return false;
        };

        match current {
            Value::List(items) => {
                let initial = raw.listify_strings();
                let mut changed = false;
                let updated: Vec<Value> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let (Some(resolved), Some(initial)) = (item.as_path(), initial.get(i)) else {
                            return item;
                        };
                        match self.fallback_for(&resolved, initial) {
                            Some(path) => {
                                changed = true;
                                self.warn(key, resolves_to, &path, diagnostics);
                                Value::from(path)
                            }
                            None => item,
                        }
                    })
                    .collect();
                if changed {
                    attributes.set(key, Value::List(updated));
                }
                changed
            }
            other => {
                let (Some(resolved), Some(initial)) = (other.as_path(), raw.as_str()) else {
                    return false;
                };
                match self.fallback_for(&resolved, initial) {
                    Some(path) => {
                        self.warn(key, resolves_to, &path, diagnostics);
                        attributes.set(key, Value::from(path));
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// The root-relative replacement for `resolved`, if one applies.
    fn fallback_for(&self, resolved: &Path, initial: &str) -> Option<PathBuf> {
        if self.probe.exists(resolved) || Path::new(initial).is_absolute() {
            return None;
        }
        let candidate = self.root.join(initial);
        self.probe.exists(&candidate).then_some(candidate)
    }

    fn warn(&self, key: &str, resolves_to: &str, path: &Path, diagnostics: &mut Diagnostics) {
        diagnostics.warn(ConfigWarning::RootRelativePath {
            option: key.to_string(),
            resolves_to: resolves_to.to_string(),
            path: path.to_path_buf(),
        });
    }
}
