//! Resolution of path options against their parent directory options.
//!
//! Each path option names the option it is relative to. Resolving an option
//! first resolves its parent (and so on up to a root option with no parent),
//! then joins the option's own value onto the parent's path. Results are
//! memoized so a shared ancestor is resolved exactly once, and the walk up
//! the parent chain is iterative so deep chains cannot overflow the stack.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::attributes::Attributes;
use crate::error::{Error, Result};
use crate::schema::{OptionType, Schema};
use crate::value::Value;

/// Resolves path options in an [`Attributes`] store.
///
/// One resolver is used per configuration build and dropped afterwards.
///
/// # Examples
///
/// ```
/// use appconf::config::{Attributes, Layout};
/// use appconf::path::{BaseDirectories, OptionPathResolver};
/// use appconf::schema::{OptionSpec, OptionType, Schema};
/// use appconf::{Options, Value};
/// use std::collections::BTreeSet;
/// use std::path::Path;
///
/// let schema = Schema::new("demo", vec![
///     OptionSpec::new("data_dir", OptionType::Path),
///     OptionSpec::new("file_path", OptionType::Path).with_default("objects").resolves_against("data_dir"),
/// ]).unwrap();
/// let dirs = BaseDirectories::resolve(Path::new("/srv"), &Options::new(), None, None, Layout::Source).unwrap();
/// let mut attributes = Attributes::seeded(&dirs, None);
/// attributes.materialize(schema.defaults()).unwrap();
///
/// let listify = BTreeSet::new();
/// let mut resolver = OptionPathResolver::new(&schema, &listify);
/// resolver.resolve_option("file_path", &mut attributes).unwrap();
/// assert_eq!(attributes.get("file_path"), Some(&Value::from("/srv/database/objects")));
/// ```
pub struct OptionPathResolver<'a> {
    schema: &'a Schema,
    listify: &'a BTreeSet<String>,
    cache: HashMap<String, Option<PathBuf>>,
    lists: HashSet<String>,
    resolutions: usize,
}

impl<'a> OptionPathResolver<'a> {
    /// Create a resolver with an empty cache.
    #[must_use]
    pub fn new(schema: &'a Schema, listify: &'a BTreeSet<String>) -> Self {
        Self {
            schema,
            listify,
            cache: HashMap::new(),
            lists: HashSet::new(),
            resolutions: 0,
        }
    }

    /// Resolve one option and store the result on its attribute.
    ///
    /// Options holding a list, options declared as lists, and listify
    /// options have every element joined onto the option's base directory;
    /// order and count are kept.
    /// Anything else is resolved as a single path.
    ///
    /// Resolving an option a second time is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent chain is cyclic or passes through a
    /// list-valued option.
    pub fn resolve_option(&mut self, key: &str, attributes: &mut Attributes) -> Result<()> {
        if self.lists.contains(key) || self.cache.contains_key(key) {
            return Ok(());
        }

        let value = attributes.get(key).cloned().unwrap_or_default();
        if value.is_list() || self.declared_list(key) || self.listify.contains(key) {
            let items = value.listify_strings();
            let base = self.resolve_base_dir(key, attributes)?;
            let resolved = Self::apply_base_dir(base.as_deref(), &items);
            attributes.set(key, Value::from_paths(resolved));
            self.lists.insert(key.to_string());
            self.resolutions += 1;
        } else {
            self.resolve(key, attributes)?;
        }
        Ok(())
    }

    /// Resolve a single-path option, returning its path.
    ///
    /// An option without a parent is returned as it stands and is neither
    /// cached nor rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent chain is cyclic or passes through a
    /// list-valued option.
    pub fn resolve(&mut self, key: &str, attributes: &mut Attributes) -> Result<Option<PathBuf>> {
        self.resolve_chain(key, None, attributes)
    }

    /// The directory an option's values are joined onto: its parent's
    /// resolved path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent chain is cyclic or passes through a
    /// list-valued option.
    pub fn resolve_base_dir(&mut self, key: &str, attributes: &mut Attributes) -> Result<Option<PathBuf>> {
        match self.schema.parent_of(key) {
            Some(parent) => self.resolve_chain(parent, Some(key), attributes),
            None => Ok(None),
        }
    }

    /// Join each value onto `base`, keeping order.
    ///
    /// Absolute values are kept as they are; without a base every value is
    /// kept as it is.
    #[must_use]
    pub fn apply_base_dir(base: Option<&Path>, values: &[String]) -> Vec<PathBuf> {
        values
            .iter()
            .map(|value| match base {
                Some(base) => base.join(value),
                None => PathBuf::from(value),
            })
            .collect()
    }

    /// Number of options resolved so far; cache hits are not counted.
    #[must_use]
    pub fn resolutions(&self) -> usize {
        self.resolutions
    }

    /// Number of single-path options in the cache.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Walk up from `key` to the first cached or parentless option, then
    /// resolve back down, caching every option on the way.
    ///
    /// `dependent` is the option that will be joined onto `key`'s result,
    /// if any; it must not be list-valued.
    fn resolve_chain(
        &mut self,
        key: &str,
        dependent: Option<&str>,
        attributes: &mut Attributes,
    ) -> Result<Option<PathBuf>> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = key.to_string();

        let mut base = loop {
            if let Some(cached) = self.cache.get(&current) {
                break cached.clone();
            }
            if chain.contains(&current) {
                chain.push(current);
                return Err(Error::ResolutionCycle { chain });
            }
            let Some(parent) = self.schema.parent_of(&current) else {
                let child = chain.last().map_or(dependent, |c| Some(c.as_str()));
                self.check_not_list(&current, child, attributes)?;
                break attributes.get(&current).and_then(path_of);
            };
            let parent = parent.to_string();
            chain.push(current);
            current = parent;
        };

        while let Some(option) = chain.pop() {
            let child = chain.last().map_or(dependent, |c| Some(c.as_str()));
            self.check_not_list(&option, child, attributes)?;

            let own = attributes.get(&option).and_then(path_of);
            let resolved = match (own, &base) {
                (Some(own), Some(base)) => Some(base.join(own)),
                (Some(own), None) => Some(own),
                (None, base) => base.clone(),
            };

            attributes.set(&option, Value::from(resolved.clone()));
            self.cache.insert(option, resolved.clone());
            self.resolutions += 1;
            base = resolved;
        }

        Ok(base)
    }

    fn declared_list(&self, key: &str) -> bool {
        self.schema
            .option(key)
            .is_some_and(|spec| spec.option_type == OptionType::List)
    }

    fn check_not_list(&self, option: &str, child: Option<&str>, attributes: &Attributes) -> Result<()> {
        let Some(child) = child else {
            return Ok(());
        };
        let is_list = self.lists.contains(option)
            || self.listify.contains(option)
            || self.declared_list(option)
            || attributes.get(option).is_some_and(Value::is_list);
        if is_list {
            return Err(Error::ListParent {
                option: child.to_string(),
                parent: option.to_string(),
            });
        }
        Ok(())
    }
}

/// The path held by an attribute value; null means none.
fn path_of(value: &Value) -> Option<PathBuf> {
    match value {
        Value::Null | Value::List(_) | Value::Map(_) => None,
        Value::Str(s) => Some(PathBuf::from(s)),
        other => Some(PathBuf::from(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profile::Layout;
    use crate::path::BaseDirectories;
    use crate::schema::{OptionSpec, OptionType};
    use crate::value::Options;

    fn attributes_for(schema: &Schema, overrides: &[(&str, Value)]) -> Attributes {
        let dirs = BaseDirectories::resolve(
            Path::new("/srv/app"),
            &Options::new(),
            None,
            None,
            Layout::Source,
        )
        .unwrap();
        let mut raw = schema.defaults().clone();
        for (key, value) in overrides {
            raw.insert((*key).to_string(), value.clone());
        }
        let mut attributes = Attributes::seeded(&dirs, None);
        attributes.materialize(&raw).unwrap();
        attributes
    }

    fn chain_schema() -> Schema {
        Schema::new(
            "app",
            vec![
                OptionSpec::new("data_dir", OptionType::Path),
                OptionSpec::new("cache_dir", OptionType::Path)
                    .with_default("cache")
                    .resolves_against("data_dir"),
                OptionSpec::new("object_cache", OptionType::Path)
                    .with_default("objects")
                    .resolves_against("cache_dir"),
                OptionSpec::new("tool_cache", OptionType::Path)
                    .with_default("tools")
                    .resolves_against("cache_dir"),
                OptionSpec::new("tool_config_file", OptionType::List)
                    .with_default("tool_conf.xml,shed_tool_conf.xml")
                    .resolves_against("cache_dir"),
            ],
        )
        .unwrap()
    }

    #[test]
    #[cfg(unix)]
    fn test_chain_resolves_through_ancestors() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        let path = resolver.resolve("object_cache", &mut attributes).unwrap();
        assert_eq!(path, Some(PathBuf::from("/srv/app/database/cache/objects")));
        assert_eq!(
            attributes.get("cache_dir"),
            Some(&Value::from("/srv/app/database/cache"))
        );
    }

    #[test]
    fn test_shared_ancestor_resolved_once() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve_option("object_cache", &mut attributes).unwrap();
        assert_eq!(resolver.resolutions(), 2);
        resolver.resolve_option("tool_cache", &mut attributes).unwrap();
        assert_eq!(resolver.resolutions(), 3);
        resolver.resolve_option("cache_dir", &mut attributes).unwrap();
        assert_eq!(resolver.resolutions(), 3);
        assert_eq!(resolver.cached(), 3);
    }

    #[test]
    fn test_re_resolution_is_idempotent() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        let first = resolver.resolve("object_cache", &mut attributes).unwrap();
        let snapshot = attributes.clone();
        let second = resolver.resolve("object_cache", &mut attributes).unwrap();
        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();
        let lists = attributes.get("tool_config_file").cloned();
        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();

        assert_eq!(first, second);
        assert_eq!(snapshot.get("object_cache"), attributes.get("object_cache"));
        assert_eq!(lists.as_ref(), attributes.get("tool_config_file"));
    }

    #[test]
    #[cfg(unix)]
    fn test_list_option_joins_each_element_in_order() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes =
            attributes_for(&schema, &[("tool_config_file", Value::from(vec!["b.xml", " a.xml"]))]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();
        assert_eq!(
            attributes.get("tool_config_file"),
            Some(&Value::from(vec![
                "/srv/app/database/cache/b.xml",
                "/srv/app/database/cache/a.xml",
            ]))
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_listify_option_splits_string() {
        let schema = chain_schema();
        let listify: BTreeSet<String> = ["tool_config_file".to_string()].into();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();
        let paths = attributes.get("tool_config_file").unwrap().listify_strings();
        assert_eq!(
            paths,
            vec![
                "/srv/app/database/cache/tool_conf.xml",
                "/srv/app/database/cache/shed_tool_conf.xml",
            ]
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_value_replaces_parent() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[("cache_dir", Value::from("/tmp/cache"))]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        let path = resolver.resolve("tool_cache", &mut attributes).unwrap();
        assert_eq!(path, Some(PathBuf::from("/tmp/cache/tools")));
    }

    #[test]
    #[cfg(unix)]
    fn test_null_value_takes_parent_path() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[("cache_dir", Value::Null)]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        let path = resolver.resolve("cache_dir", &mut attributes).unwrap();
        assert_eq!(path, Some(PathBuf::from("/srv/app/database")));
    }

    #[test]
    fn test_option_without_parent_is_unchanged() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let before = attributes.get("data_dir").cloned();
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve("data_dir", &mut attributes).unwrap();
        assert_eq!(attributes.get("data_dir").cloned(), before);
        assert_eq!(resolver.resolutions(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_declared_list_with_string_default_resolves_per_element() {
        let schema = chain_schema();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        resolver.resolve_option("tool_config_file", &mut attributes).unwrap();
        assert_eq!(
            attributes.get("tool_config_file"),
            Some(&Value::from_paths([
                "/srv/app/database/cache/tool_conf.xml",
                "/srv/app/database/cache/shed_tool_conf.xml",
            ]))
        );
    }

    #[test]
    fn test_list_parent_rejected() {
        let schema = Schema::new(
            "app",
            vec![
                OptionSpec::new("data_dir", OptionType::Path),
                OptionSpec::new("roots", OptionType::List)
                    .with_default(vec!["a", "b"])
                    .resolves_against("data_dir"),
                OptionSpec::new("leaf", OptionType::Path)
                    .with_default("x")
                    .resolves_against("roots"),
            ],
        )
        .unwrap();
        let listify = BTreeSet::new();
        let mut attributes = attributes_for(&schema, &[]);
        let mut resolver = OptionPathResolver::new(&schema, &listify);

        let err = resolver.resolve_option("leaf", &mut attributes).unwrap_err();
        assert!(matches!(
            err,
            Error::ListParent { ref option, ref parent } if option == "leaf" && parent == "roots"
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_apply_base_dir() {
        let values = vec!["a.txt".to_string(), "/abs/b.txt".to_string()];
        assert_eq!(
            OptionPathResolver::apply_base_dir(Some(Path::new("/root/data")), &values),
            vec![PathBuf::from("/root/data/a.txt"), PathBuf::from("/abs/b.txt")]
        );
        assert_eq!(
            OptionPathResolver::apply_base_dir(None, &values),
            vec![PathBuf::from("a.txt"), PathBuf::from("/abs/b.txt")]
        );
    }
}
