//! Merging explicit options over schema defaults.
//!
//! Explicit options go through two in-place preprocessing passes (renamed
//! option propagation and database URL scheme rewriting) and are then
//! converted to their declared types and laid over a copy of the schema
//! defaults to form the raw configuration.

use crate::config::profile::AppProfile;
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::error::{Error, Result};
use crate::schema::{OptionSpec, OptionType, Schema};
use crate::value::{Options, Value};

/// Deprecated database URL schemes and their replacements.
pub const DEPRECATED_URL_SCHEMES: &[(&str, &str)] = &[("postgres", "postgresql")];

/// Merges explicit options with schema defaults.
///
/// # Examples
///
/// ```
/// use appconf::config::{AppProfile, ConfigMerger};
/// use appconf::diagnostics::Diagnostics;
/// use appconf::schema::{OptionSpec, OptionType, Schema};
/// use appconf::{Options, Value};
///
/// let schema = Schema::new("demo", vec![
///     OptionSpec::new("workers", OptionType::Int).with_default(1i64),
///     OptionSpec::new("debug", OptionType::Bool).with_default(false),
/// ]).unwrap();
///
/// let mut explicit = Options::new();
/// explicit.insert("workers".into(), Value::from("8"));
///
/// let raw = ConfigMerger::merge(&schema, &AppProfile::default(), &explicit, &mut Diagnostics::new()).unwrap();
/// assert_eq!(raw["workers"], Value::Int(8));
/// assert_eq!(raw["debug"], Value::Bool(false));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Run the preprocessing passes over explicit options, in place.
    pub fn preprocess(kwargs: &mut Options, profile: &AppProfile, diagnostics: &mut Diagnostics) {
        Self::process_renamed_options(kwargs, profile);
        Self::fix_database_urls(kwargs, profile, diagnostics);
    }

    /// Copy old-named options to their new names when the new name is unset.
    ///
    /// The old names are kept so that deprecated usage can still be reported.
    fn process_renamed_options(kwargs: &mut Options, profile: &AppProfile) {
        for (old, new) in &profile.renamed_options {
            if kwargs.contains_key(new) {
                continue;
            }
            if let Some(value) = kwargs.get(old).cloned() {
                log::debug!("Option '{old}' has been renamed to '{new}'");
                kwargs.insert(new.clone(), value);
            }
        }
    }

    /// Rewrite deprecated database URL schemes.
    fn fix_database_urls(kwargs: &mut Options, profile: &AppProfile, diagnostics: &mut Diagnostics) {
        for key in &profile.database_url_options {
            let Some(Value::Str(url)) = kwargs.get_mut(key) else {
                continue;
            };
            for (old, new) in DEPRECATED_URL_SCHEMES {
                let matches = url
                    .strip_prefix(old)
                    .is_some_and(|rest| rest.starts_with(':') || rest.starts_with('+'));
                if matches {
                    *url = format!("{new}{}", &url[old.len()..]);
                    diagnostics.warn(ConfigWarning::DeprecatedUrlScheme {
                        option: key.clone(),
                        old: (*old).to_string(),
                        new: (*new).to_string(),
                    });
                    break;
                }
            }
        }
    }

    /// Build the raw configuration from schema defaults and explicit options.
    ///
    /// Keys unknown to the schema are ignored here; they stay in the explicit
    /// record only.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit value cannot be converted to its
    /// declared type or is not one of the option's allowed values.
    pub fn merge(
        schema: &Schema,
        profile: &AppProfile,
        kwargs: &Options,
        diagnostics: &mut Diagnostics,
    ) -> Result<Options> {
        let mut raw = schema.defaults().clone();

        for (key, value) in kwargs {
            let Some(spec) = schema.option(key) else {
                continue;
            };
            let mut value = Self::convert(spec, value)?;
            Self::check_allowed(spec, &value)?;
            if value.is_truthy() && !profile.deprecated_dirs.is_empty() {
                value = Self::strip_deprecated_dir(schema, profile, key, value, diagnostics);
            }
            raw.insert(key.clone(), value);
        }

        Ok(raw)
    }

    /// Convert a value to the option's declared type.
    ///
    /// Null values are never converted and lists are converted element-wise.
    /// A string given for a list option is split on commas.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as the declared type.
    pub fn convert(spec: &OptionSpec, value: &Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .iter()
                .map(|item| Self::convert_scalar(spec, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Self::convert_scalar(spec, other),
        }
    }

    fn convert_scalar(spec: &OptionSpec, value: &Value) -> Result<Value> {
        let invalid = |expected: &str| {
            Error::invalid_value(&spec.name, format!("expected {expected}, got '{value}'"))
        };

        match spec.option_type {
            OptionType::Bool => Ok(Value::Bool(value.as_bool_lossy())),
            OptionType::Int => match value {
                Value::Int(i) => Ok(Value::Int(*i)),
                #[allow(clippy::cast_possible_truncation)]
                Value::Float(x) => Ok(Value::Int(x.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| invalid("an integer")),
                _ => Err(invalid("an integer")),
            },
            OptionType::Float => match value {
                #[allow(clippy::cast_precision_loss)]
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Float(x) => Ok(Value::Float(*x)),
                Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| invalid("a number")),
                _ => Err(invalid("a number")),
            },
            OptionType::Str | OptionType::Path => match value {
                Value::Str(_) | Value::Map(_) | Value::List(_) | Value::Null => Ok(value.clone()),
                scalar => Ok(Value::Str(scalar.to_string())),
            },
            OptionType::List => match value {
                Value::Str(_) => Ok(Value::List(value.listify())),
                other => Ok(other.clone()),
            },
            OptionType::Map | OptionType::Any => Ok(value.clone()),
        }
    }

    /// Reject explicit values outside the option's allowed set.
    fn check_allowed(spec: &OptionSpec, value: &Value) -> Result<()> {
        let Some(allowed) = &spec.allowed_values else {
            return Ok(());
        };
        if value.is_null() || allowed.contains(value) {
            return Ok(());
        }
        let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        Err(Error::invalid_value(
            &spec.name,
            format!("'{value}' is not one of: {}", choices.join(", ")),
        ))
    }

    /// Strip a deprecated leading directory from each path of a path option.
    ///
    /// Lists stay lists; strings are split on commas and rejoined.
    fn strip_deprecated_dir(
        schema: &Schema,
        profile: &AppProfile,
        key: &str,
        value: Value,
        diagnostics: &mut Diagnostics,
    ) -> Value {
        let Some(resolves_to) = schema.parent_of(key) else {
            return value;
        };
        let Some(deprecated) = profile.deprecated_dirs.get(resolves_to) else {
            return value;
        };
        let prefix = format!("{deprecated}{}", std::path::MAIN_SEPARATOR);

        let was_list = value.is_list();
        let paths: Vec<String> = value
            .listify_strings()
            .into_iter()
            .map(|path| match path.strip_prefix(&prefix) {
                Some(rest) => {
                    diagnostics.warn(ConfigWarning::DeprecatedDirectoryPrefix {
                        option: key.to_string(),
                        resolves_to: resolves_to.to_string(),
                        prefix: prefix.clone(),
                        path: path.clone(),
                    });
                    rest.to_string()
                }
                None => path,
            })
            .collect();

        if was_list {
            Value::from(paths)
        } else {
            Value::Str(paths.join(","))
        }
    }
}
