//! The flat attribute namespace of a built configuration.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::path::BaseDirectories;
use crate::value::{Options, Value};

/// Attributes present before any option is materialized.
pub const RESERVED_ATTRIBUTES: [&str; 6] = [
    "root",
    "config_file",
    "config_dir",
    "data_dir",
    "managed_config_dir",
    "sample_config_dir",
];

/// Reserved attributes an option of the same name may not overwrite but
/// may silently coincide with.
pub const BASE_ATTRIBUTES: [&str; 3] = ["config_dir", "data_dir", "managed_config_dir"];

/// Attribute store keyed by option name.
///
/// # Examples
///
/// ```
/// use appconf::config::Attributes;
/// use appconf::path::BaseDirectories;
/// use appconf::config::Layout;
/// use appconf::{Options, Value};
/// use std::path::Path;
///
/// let dirs = BaseDirectories::resolve(Path::new("/srv/app"), &Options::new(), None, None, Layout::Source).unwrap();
/// let mut attributes = Attributes::seeded(&dirs, None);
///
/// let mut raw = Options::new();
/// raw.insert("brand".into(), Value::from("Lab"));
/// attributes.materialize(&raw).unwrap();
/// assert_eq!(attributes.get("brand"), Some(&Value::from("Lab")));
///
/// raw.insert("root".into(), Value::from("/elsewhere"));
/// assert!(attributes.materialize(&raw).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, Value>,
}

impl Attributes {
    /// A store holding only the reserved attributes.
    #[must_use]
    pub fn seeded(dirs: &BaseDirectories, config_file: Option<&Path>) -> Self {
        let mut values = BTreeMap::new();
        values.insert("root".to_string(), Value::from(dirs.root.clone()));
        values.insert(
            "config_file".to_string(),
            Value::from(config_file.map(Path::to_path_buf)),
        );
        values.insert("config_dir".to_string(), Value::from(dirs.config_dir.clone()));
        values.insert("data_dir".to_string(), Value::from(dirs.data_dir.clone()));
        values.insert(
            "managed_config_dir".to_string(),
            Value::from(dirs.managed_config_dir.clone()),
        );
        values.insert(
            "sample_config_dir".to_string(),
            Value::from(dirs.sample_config_dir.clone()),
        );
        Self { values }
    }

    /// Create one attribute per raw entry.
    ///
    /// Entries that name a base directory are skipped so that the computed
    /// directory stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeCollision`] if any other entry names an
    /// attribute that already exists.
    pub fn materialize(&mut self, raw: &Options) -> Result<()> {
        for (key, value) in raw {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), value.clone());
            } else if !BASE_ATTRIBUTES.contains(&key.as_str()) {
                return Err(Error::AttributeCollision { key: key.clone() });
            }
        }
        Ok(())
    }

    /// The attribute value, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the attribute exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Replace an attribute value.
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        match self.values.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(key.to_string(), value);
            }
        }
    }

    /// All attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The attributes as a map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
