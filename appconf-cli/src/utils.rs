//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including schema and profile loading, configuration building, and output
//! formatting.

use crate::error::CliError;
use appconf::{AppConfig, AppConfigBuilder, AppProfile, Options, Schema, SchemaLoader, Value};
use std::path::PathBuf;

/// Global CLI options shared across all commands.
///
/// Verbosity is consumed by logging setup in `main` and is not carried here.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Suppress non-essential output.
    pub quiet: bool,

    /// Option schema file.
    pub schema: Option<PathBuf>,

    /// Application profile file.
    pub profile: Option<PathBuf>,

    /// Configuration file; discovered under the root when absent.
    pub config: Option<PathBuf>,

    /// Application root.
    pub root: Option<PathBuf>,

    /// Application section name in the schema and config file.
    pub app_name: String,

    /// Explicit `KEY=VALUE` options.
    pub set: Vec<String>,
}

/// Load the option schema named by `--schema`.
pub fn load_schema(global: &GlobalOptions) -> Result<Schema, CliError> {
    let path = global
        .schema
        .as_ref()
        .ok_or_else(|| CliError::InvalidArguments("--schema is required".to_string()))?;
    Ok(SchemaLoader::load_file(path, &global.app_name)?)
}

/// Load the profile named by `--profile`, or the default profile.
pub fn load_profile(global: &GlobalOptions) -> Result<AppProfile, CliError> {
    match &global.profile {
        Some(path) => AppProfile::load_file(path).map_err(|e| CliError::Config(e.to_string())),
        None => Ok(AppProfile::default()),
    }
}

/// Parse a `KEY=VALUE` assignment.
///
/// The value is read as a YAML scalar, so `4` is an integer and `true` a
/// boolean; anything else is kept as a string.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value), CliError> {
    let (key, raw) = assignment.split_once('=').ok_or_else(|| {
        CliError::InvalidArguments(format!("expected KEY=VALUE, got '{assignment}'"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidArguments(format!(
            "empty option name in '{assignment}'"
        )));
    }
    let value = match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Int(_) | Value::Float(_))) => value,
        _ => Value::from(raw),
    };
    Ok((key.to_string(), value))
}

/// Parse every `--set` assignment.
pub fn parse_assignments(assignments: &[String]) -> Result<Options, CliError> {
    assignments
        .iter()
        .map(String::as_str)
        .map(parse_assignment)
        .collect()
}

/// Build the configuration described by the global options.
///
/// Options are collected from the configuration file, `--set` assignments
/// and the environment (when the profile names a prefix).
pub fn build_config(global: &GlobalOptions) -> Result<AppConfig, CliError> {
    let schema = load_schema(global)?;
    let profile = load_profile(global)?;
    let options = parse_assignments(&global.set)?;

    let mut builder = AppConfigBuilder::new(schema)
        .with_profile(profile)
        .with_options(options)
        .with_env_overrides();
    if let Some(root) = &global.root {
        builder = builder.with_root(root);
    }
    builder = match &global.config {
        Some(path) => builder.with_config_file(path),
        None => builder.discover_config_file(),
    };

    Ok(builder.build()?)
}

/// Render a value for plain text output.
///
/// Lists print one element per line.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::List(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
