//! Option specifications and the validated schema index.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::{Error, Result};
use crate::value::{Options, Value};

/// Declared type of an option.
///
/// The type selects the converter applied to explicitly supplied values.
/// `Map` and `Any` values are passed through unchanged.
///
/// # Examples
///
/// ```
/// use appconf::schema::OptionType;
///
/// assert_eq!(OptionType::parse("bool"), OptionType::Bool);
/// assert_eq!(OptionType::parse("seq"), OptionType::List);
/// assert_eq!(OptionType::parse("timedelta"), OptionType::Any);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptionType {
    /// Boolean flag.
    Bool,
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Free-form string.
    #[default]
    Str,
    /// Filesystem path (converted like a string).
    Path,
    /// Sequence of values.
    List,
    /// Nested mapping.
    Map,
    /// Anything; no conversion.
    Any,
}

impl OptionType {
    /// Parse a schema type name. Unknown names map to [`OptionType::Any`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "int" | "integer" => Self::Int,
            "float" | "number" => Self::Float,
            "str" | "string" => Self::Str,
            "path" => Self::Path,
            "list" | "seq" => Self::List,
            "map" => Self::Map,
            _ => Self::Any,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Path => "path",
            Self::List => "list",
            Self::Map => "map",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// A single option declared by the schema.
///
/// # Examples
///
/// ```
/// use appconf::schema::{OptionSpec, OptionType};
///
/// let spec = OptionSpec::new("tool_config_file", OptionType::Str)
///     .with_default("tool_conf.xml")
///     .resolves_against("config_dir")
///     .reloadable();
/// assert_eq!(spec.resolves_against.as_deref(), Some("config_dir"));
/// assert!(spec.reloadable);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    /// Option name, unique within the schema.
    pub name: String,
    /// Declared type.
    pub option_type: OptionType,
    /// Default value.
    pub default: Value,
    /// Directory option this path option is resolved against.
    pub resolves_against: Option<String>,
    /// Whether reload may change the option after construction.
    pub reloadable: bool,
    /// Whether host-specific overrides are honored.
    pub per_host: bool,
    /// Allowed values for an explicitly supplied value.
    pub allowed_values: Option<Vec<Value>>,
    /// Human readable description.
    pub description: Option<String>,
}

impl OptionSpec {
    /// Create a spec with a null default and no flags.
    #[must_use]
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            option_type,
            default: Value::Null,
            resolves_against: None,
            reloadable: false,
            per_host: false,
            allowed_values: None,
            description: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Resolve this option's paths against `parent`.
    #[must_use]
    pub fn resolves_against(mut self, parent: impl Into<String>) -> Self {
        self.resolves_against = Some(parent.into());
        self
    }

    /// Mark the option reloadable.
    #[must_use]
    pub fn reloadable(mut self) -> Self {
        self.reloadable = true;
        self
    }

    /// Mark the option as accepting per-host overrides.
    #[must_use]
    pub fn per_host(mut self) -> Self {
        self.per_host = true;
        self
    }

    /// Restrict explicit values to `allowed`.
    #[must_use]
    pub fn allowed<I, V>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = Some(allowed.into_iter().map(Into::into).collect());
        self
    }
}

/// The validated schema index.
///
/// Building a `Schema` checks that option names are unique, that every
/// `resolves_against` names another option, and that parent links are
/// acyclic. The derived views (defaults, parents, reloadable and per-host
/// sets) are computed once.
#[derive(Debug, Clone)]
pub struct Schema {
    source_name: String,
    app_name: String,
    options: Vec<OptionSpec>,
    index: HashMap<String, usize>,
    defaults: Options,
    paths_to_resolve: BTreeMap<String, String>,
    reloadable: BTreeSet<String>,
    per_host: BTreeSet<String>,
}

impl Schema {
    /// Build a schema from programmatic specs.
    ///
    /// # Errors
    ///
    /// Returns a schema error for duplicate names, dangling parents or cycles.
    ///
    /// # Examples
    ///
    /// ```
    /// use appconf::schema::{OptionSpec, OptionType, Schema};
    ///
    /// let schema = Schema::new("demo", vec![
    ///     OptionSpec::new("config_dir", OptionType::Path),
    ///     OptionSpec::new("job_conf", OptionType::Path)
    ///         .with_default("job_conf.yml")
    ///         .resolves_against("config_dir"),
    /// ]).unwrap();
    /// assert_eq!(schema.parent_of("job_conf"), Some("config_dir"));
    /// ```
    pub fn new(app_name: impl Into<String>, specs: Vec<OptionSpec>) -> Result<Self> {
        Self::build("<inline>", app_name, specs)
    }

    pub(crate) fn build(
        source_name: impl Into<String>,
        app_name: impl Into<String>,
        specs: Vec<OptionSpec>,
    ) -> Result<Self> {
        let source_name = source_name.into();
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(Error::schema(&source_name, "option name cannot be empty"));
            }
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(Error::schema(
                    &source_name,
                    format!("option '{}' is declared more than once", spec.name),
                ));
            }
        }

        let mut paths_to_resolve = BTreeMap::new();
        for spec in &specs {
            if let Some(parent) = &spec.resolves_against {
                if !index.contains_key(parent) {
                    return Err(Error::schema(
                        &source_name,
                        format!(
                            "option '{}' resolves against unknown option '{parent}'",
                            spec.name
                        ),
                    ));
                }
                paths_to_resolve.insert(spec.name.clone(), parent.clone());
            }
        }
        check_acyclic(&paths_to_resolve)?;

        let defaults = specs
            .iter()
            .map(|s| (s.name.clone(), s.default.clone()))
            .collect();
        let reloadable = specs
            .iter()
            .filter(|s| s.reloadable)
            .map(|s| s.name.clone())
            .collect();
        let per_host = specs
            .iter()
            .filter(|s| s.per_host)
            .map(|s| s.name.clone())
            .collect();

        Ok(Self {
            source_name,
            app_name: app_name.into(),
            options: specs,
            index,
            defaults,
            paths_to_resolve,
            reloadable,
            per_host,
        })
    }

    /// Where the schema was loaded from.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The application section name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Look up an option.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.index.get(name).map(|&i| &self.options[i])
    }

    /// Whether an option is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter()
    }

    /// Number of declared options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the schema declares no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Option name to default value.
    #[must_use]
    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Option name to parent option, for every path option.
    #[must_use]
    pub fn paths_to_resolve(&self) -> &BTreeMap<String, String> {
        &self.paths_to_resolve
    }

    /// The parent option of `name`, if it is a path option.
    #[must_use]
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.paths_to_resolve.get(name).map(String::as_str)
    }

    /// Names of reloadable options.
    #[must_use]
    pub fn reloadable_options(&self) -> &BTreeSet<String> {
        &self.reloadable
    }

    /// Names of options accepting per-host overrides.
    #[must_use]
    pub fn per_host_options(&self) -> &BTreeSet<String> {
        &self.per_host
    }
}

/// Walk every parent chain and fail on the first cycle found.
fn check_acyclic(parents: &BTreeMap<String, String>) -> Result<()> {
    let mut finished: HashSet<&str> = HashSet::new();
    for start in parents.keys() {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = start.as_str();
        loop {
            if finished.contains(current) {
                break;
            }
            if let Some(pos) = chain.iter().position(|&c| c == current) {
                let mut cycle: Vec<String> = chain[pos..].iter().map(|s| (*s).to_string()).collect();
                cycle.push(current.to_string());
                return Err(Error::ResolutionCycle { chain: cycle });
            }
            chain.push(current);
            match parents.get(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        finished.extend(chain);
    }
    Ok(())
}
