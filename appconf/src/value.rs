//! Dynamically typed option values.
//!
//! Option values arrive from YAML files, environment variables and
//! programmatic input, so they are carried as a small tagged [`Value`] until
//! a typed accessor reads them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Mapping from option name to value.
pub type Options = BTreeMap<String, Value>;

/// A configuration value.
///
/// # Examples
///
/// ```
/// use appconf::Value;
///
/// let value = Value::from("a.xml, b.xml");
/// assert_eq!(value.listify(), vec![Value::from("a.xml"), Value::from("b.xml")]);
/// assert!(Value::from("yes").as_bool_lossy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string (paths are stored as strings too).
    Str(String),
    /// A sequence of values.
    List(Vec<Value>),
    /// A nested mapping, in declaration order.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for `List`.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Truthiness: null, false, zero and empty containers are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
        }
    }

    /// Borrow the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries, if this is a mapping.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Read the value as a boolean.
    ///
    /// Booleans are returned as-is; anything else is true when its
    /// lowercased string form is `true`, `yes`, `on` or `1`.
    #[must_use]
    pub fn as_bool_lossy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Null => false,
            other => string_as_bool(&other.to_string()),
        }
    }

    /// Read the value as a path, if it is a non-empty string.
    #[must_use]
    pub fn as_path(&self) -> Option<PathBuf> {
        match self {
            Self::Str(s) if !s.is_empty() => Some(PathBuf::from(s)),
            _ => None,
        }
    }

    /// Convert the value to a list.
    ///
    /// Falsy values become an empty list, lists are returned unchanged,
    /// comma-separated strings are split and each token trimmed, and any
    /// other value becomes a one-element list.
    #[must_use]
    pub fn listify(&self) -> Vec<Value> {
        match self {
            v if !v.is_truthy() => Vec::new(),
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::Str(s) => Self::Str(s.trim().to_string()),
                    other => other.clone(),
                })
                .collect(),
            Self::Str(s) => s.split(',').map(|t| Self::Str(t.trim().to_string())).collect(),
            other => vec![other.clone()],
        }
    }

    /// Convert the value to a list of strings, dropping non-string items.
    #[must_use]
    pub fn listify_strings(&self) -> Vec<String> {
        self.listify()
            .into_iter()
            .filter_map(|v| match v {
                Self::Str(s) => Some(s),
                Self::Null | Self::List(_) | Self::Map(_) => None,
                other => Some(other.to_string()),
            })
            .collect()
    }

    /// Build a list of string values from paths.
    #[must_use]
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::List(
            paths
                .into_iter()
                .map(|p| Self::from(p.into()))
                .collect(),
        )
    }
}

/// Interpret a string as a boolean the way configuration files spell it.
///
/// # Examples
///
/// ```
/// use appconf::value::string_as_bool;
///
/// assert!(string_as_bool("True"));
/// assert!(string_as_bool("on"));
/// assert!(!string_as_bool("off"));
/// assert!(!string_as_bool("2"));
/// ```
#[must_use]
pub fn string_as_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "1")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            serde_yaml::Value::String(s) => Self::Str(s),
            serde_yaml::Value::Sequence(seq) => Self::List(seq.into_iter().map(Self::from).collect()),
            serde_yaml::Value::Mapping(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

/// Render a YAML mapping key as an option name.
pub(crate) fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => Value::from(other).to_string(),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_yaml::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<PathBuf> for Value {
    fn from(path: PathBuf) -> Self {
        Self::Str(path.to_string_lossy().into_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
