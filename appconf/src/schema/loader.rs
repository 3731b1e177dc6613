//! Schema document loading.
//!
//! Schemas are YAML documents with the option table nested under the
//! application section:
//!
//! ```yaml
//! type: map
//! mapping:
//!   myapp:
//!     type: map
//!     mapping:
//!       tool_config_file:
//!         type: str
//!         default: tool_conf.xml
//!         path_resolves_to: config_dir
//!         reloadable: true
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schema::types::{OptionSpec, OptionType, Schema};
use crate::value::{yaml_key, Value};

/// One entry of the option table, as written in the document.
#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(rename = "type")]
    option_type: Option<String>,
    #[serde(default)]
    default: Value,
    path_resolves_to: Option<String>,
    #[serde(default)]
    reloadable: bool,
    #[serde(default)]
    per_host: bool,
    #[serde(rename = "enum")]
    allowed: Option<Vec<Value>>,
    desc: Option<String>,
}

impl RawOption {
    fn into_spec(self, name: String) -> OptionSpec {
        OptionSpec {
            name,
            option_type: self
                .option_type
                .as_deref()
                .map_or(OptionType::Str, OptionType::parse),
            default: self.default,
            resolves_against: self.path_resolves_to,
            reloadable: self.reloadable,
            per_host: self.per_host,
            allowed_values: self.allowed,
            description: self.desc,
        }
    }
}

/// Loads [`Schema`] documents.
///
/// # Examples
///
/// ```
/// use appconf::schema::SchemaLoader;
///
/// let yaml = r"
/// mapping:
///   demo:
///     mapping:
///       config_dir:
///         type: str
///       job_config_file:
///         type: str
///         default: job_conf.yml
///         path_resolves_to: config_dir
/// ";
/// let schema = SchemaLoader::load_str("demo.yml", yaml, "demo").unwrap();
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.parent_of("job_config_file"), Some("config_dir"));
/// ```
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a schema file and extract the `app_name` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the document is not a
    /// valid schema.
    pub fn load_file(path: &Path, app_name: &str) -> Result<Schema> {
        let contents = fs::read_to_string(path).map_err(|source| Error::SchemaUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&path.display().to_string(), &contents, app_name)
    }

    /// Parse a schema document.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the YAML is invalid, the application section
    /// is missing, or any option entry is malformed.
    pub fn load_str(source_name: &str, yaml: &str, app_name: &str) -> Result<Schema> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| Error::schema(source_name, format!("invalid YAML: {e}")))?;

        let table = document
            .get("mapping")
            .and_then(|m| m.get(app_name))
            .and_then(|section| section.get("mapping"))
            .and_then(serde_yaml::Value::as_mapping)
            .ok_or_else(|| {
                Error::schema(
                    source_name,
                    format!("no option mapping found for application '{app_name}'"),
                )
            })?;

        let mut specs = Vec::with_capacity(table.len());
        for (key, entry) in table {
            let name = yaml_key(key.clone());
            let raw: RawOption = match entry {
                serde_yaml::Value::Null => RawOption {
                    option_type: None,
                    default: Value::Null,
                    path_resolves_to: None,
                    reloadable: false,
                    per_host: false,
                    allowed: None,
                    desc: None,
                },
                other => serde_yaml::from_value(other.clone()).map_err(|e| {
                    Error::schema(source_name, format!("option '{name}' is malformed: {e}"))
                })?,
            };
            specs.push(raw.into_spec(name));
        }

        let schema = Schema::build(source_name, app_name, specs)?;
        log::debug!(
            "Loaded {} options for '{app_name}' from {source_name}",
            schema.len()
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = r"
type: map
mapping:
  app:
    type: map
    desc: Application options
    mapping:
      config_dir:
        type: str
        required: false
      data_dir:
        type: str
      file_path:
        type: str
        default: objects
        path_resolves_to: data_dir
      welcome_url:
        type: str
        default: /static/welcome.html
        per_host: true
        reloadable: true
      max_jobs:
        type: int
        default: 4
      store_by:
        type: str
        enum: [id, uuid]
";

    #[test]
    fn test_load_full_entries() {
        let schema = SchemaLoader::load_str("schema.yml", SCHEMA, "app").unwrap();
        assert_eq!(schema.len(), 6);
        assert_eq!(schema.app_name(), "app");

        let file_path = schema.option("file_path").unwrap();
        assert_eq!(file_path.option_type, OptionType::Str);
        assert_eq!(file_path.default, Value::from("objects"));
        assert_eq!(file_path.resolves_against.as_deref(), Some("data_dir"));

        let welcome = schema.option("welcome_url").unwrap();
        assert!(welcome.reloadable && welcome.per_host);

        assert_eq!(schema.defaults()["max_jobs"], Value::Int(4));
        assert_eq!(
            schema.option("store_by").unwrap().allowed_values,
            Some(vec![Value::from("id"), Value::from("uuid")])
        );
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let schema = SchemaLoader::load_str("schema.yml", SCHEMA, "app").unwrap();
        let names: Vec<&str> = schema.options().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            ["config_dir", "data_dir", "file_path", "welcome_url", "max_jobs", "store_by"]
        );
    }

    #[test]
    fn test_missing_section_is_schema_error() {
        let err = SchemaLoader::load_str("schema.yml", SCHEMA, "other").unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("'other'"));
    }

    #[test]
    fn test_malformed_entry_names_option() {
        let yaml = "mapping:\n  app:\n    mapping:\n      broken:\n        reloadable: [1, 2]\n";
        let err = SchemaLoader::load_str("schema.yml", yaml, "app").unwrap_err();
        assert!(err.to_string().contains("'broken'"));
    }

    #[test]
    fn test_invalid_yaml_is_schema_error() {
        let err = SchemaLoader::load_str("schema.yml", "mapping: [unclosed", "app").unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_dangling_parent_is_schema_error() {
        let yaml = "mapping:\n  app:\n    mapping:\n      a:\n        path_resolves_to: nowhere\n";
        let err = SchemaLoader::load_str("schema.yml", yaml, "app").unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_load_file_unreadable() {
        let err = SchemaLoader::load_file(Path::new("/nonexistent/schema.yml"), "app").unwrap_err();
        assert!(matches!(err, Error::SchemaUnreadable { .. }));
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema.yml");
        fs::write(&path, SCHEMA).unwrap();

        let schema = SchemaLoader::load_file(&path, "app").unwrap();
        assert!(schema.source_name().ends_with("schema.yml"));
        assert!(schema.contains("store_by"));
    }

    #[test]
    fn test_bare_entry_defaults_to_str() {
        let yaml = "mapping:\n  app:\n    mapping:\n      brand:\n";
        let schema = SchemaLoader::load_str("schema.yml", yaml, "app").unwrap();
        let brand = schema.option("brand").unwrap();
        assert_eq!(brand.option_type, OptionType::Str);
        assert!(brand.default.is_null());
    }
}
