//! Environment variable overrides for configuration options.
//!
//! Two forms are recognised for an application prefix `P`:
//!
//! - `P_CONFIG_<OPTION>` sets the option only when nothing else set it.
//! - `P_CONFIG_OVERRIDE_<OPTION>` always wins.
//!
//! Option names are matched against the schema case-insensitively and
//! values are passed through as strings; type conversion happens in the
//! merger like for any other explicit value.

use std::env;

use crate::schema::Schema;
use crate::value::{Options, Value};

/// Applies `<PREFIX>_CONFIG_*` environment variables to explicit options.
///
/// # Examples
///
/// ```
/// use appconf::config::EnvironmentOverrides;
/// use appconf::schema::{OptionSpec, OptionType, Schema};
/// use appconf::{Options, Value};
///
/// let schema = Schema::new("demo", vec![OptionSpec::new("brand", OptionType::Str)]).unwrap();
/// let vars = vec![("DEMO_CONFIG_BRAND".to_string(), "Lab".to_string())];
///
/// let mut options = Options::new();
/// let applied = EnvironmentOverrides::apply_from(vars, "DEMO", &schema, &mut options);
/// assert_eq!(applied, vec!["brand".to_string()]);
/// assert_eq!(options["brand"], Value::from("Lab"));
/// ```
pub struct EnvironmentOverrides;

impl EnvironmentOverrides {
    /// Apply overrides from the process environment.
    ///
    /// Returns the names of the options that were set.
    pub fn apply(prefix: &str, schema: &Schema, kwargs: &mut Options) -> Vec<String> {
        Self::apply_from(env::vars(), prefix, schema, kwargs)
    }

    /// Apply overrides from an explicit set of variables.
    ///
    /// Plain `CONFIG_` variables are applied before `CONFIG_OVERRIDE_`
    /// variables, so an override always has the final say.
    pub fn apply_from<I>(vars: I, prefix: &str, schema: &Schema, kwargs: &mut Options) -> Vec<String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config_prefix = format!("{}_CONFIG_", prefix.to_uppercase());
        let override_prefix = format!("{config_prefix}OVERRIDE_");

        let mut defaults = Vec::new();
        let mut overrides = Vec::new();
        for (name, value) in vars {
            if let Some(option) = name.strip_prefix(&override_prefix) {
                overrides.push((option.to_lowercase(), value));
            } else if let Some(option) = name.strip_prefix(&config_prefix) {
                defaults.push((option.to_lowercase(), value));
            }
        }

        let mut applied = Vec::new();
        for (option, value) in defaults {
            if !schema.contains(&option) {
                log::debug!("Ignoring environment setting for unknown option '{option}'");
                continue;
            }
            if kwargs.contains_key(&option) {
                continue;
            }
            kwargs.insert(option.clone(), Value::Str(value));
            applied.push(option);
        }
        for (option, value) in overrides {
            if !schema.contains(&option) {
                log::debug!("Ignoring environment override for unknown option '{option}'");
                continue;
            }
            kwargs.insert(option.clone(), Value::Str(value));
            if !applied.contains(&option) {
                applied.push(option);
            }
        }

        if !applied.is_empty() {
            log::debug!("Applied {} option(s) from the environment", applied.len());
        }
        applied
    }
}
