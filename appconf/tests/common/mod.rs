//! Common test utilities for integration tests.
//!
//! This module provides a representative schema and profile plus helpers
//! for laying out an application tree in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use appconf::{AppConfigBuilder, AppProfile, Schema, SchemaLoader};
use tempfile::TempDir;

/// Application name used by the fixtures.
pub const APP: &str = "galaxy";

/// A schema shaped like a real application's.
pub const SCHEMA_YAML: &str = r"
type: map
mapping:
  galaxy:
    type: map
    mapping:
      config_dir:
        type: str
      data_dir:
        type: str
      managed_config_dir:
        type: str
      brand:
        type: str
        reloadable: true
      welcome_url:
        type: str
        default: /static/welcome.html
        reloadable: true
        per_host: true
      workers:
        type: int
        default: 1
      use_tasked_jobs:
        type: bool
        default: false
      database_connection:
        type: str
      tool_config_file:
        type: str
        default: tool_conf.xml
        path_resolves_to: config_dir
      job_config_file:
        type: str
        default: job_conf.yml
        path_resolves_to: config_dir
      file_path:
        type: str
        default: objects
        path_resolves_to: data_dir
      cache_dir:
        type: str
        default: cache
        path_resolves_to: data_dir
      object_cache_dir:
        type: str
        default: objects
        path_resolves_to: cache_dir
      allowlist_file:
        type: str
        path_resolves_to: config_dir
      shed_tool_config_file:
        type: str
        default: shed_tool_conf.xml
        path_resolves_to: managed_config_dir
      log_level:
        type: str
        default: DEBUG
        enum: [CRITICAL, ERROR, WARNING, INFO, DEBUG, TRACE]
";

/// A profile exercising every policy knob.
pub const PROFILE_YAML: &str = r"
renamed_options:
  whitelist_file: allowlist_file
deprecated_options: [use_tasked_jobs]
deprecated_dirs:
  config_dir: config
paths_to_check_against_root: [job_config_file, tool_config_file]
add_sample_file_to_defaults: [job_config_file, tool_config_file]
listify_options: [tool_config_file]
database_url_options: [database_connection]
required_directories: [cache_dir]
env_prefix: GALAXY
";

/// The fixture schema.
#[allow(dead_code)]
pub fn schema() -> Arc<Schema> {
    Arc::new(SchemaLoader::load_str("fixture.yml", SCHEMA_YAML, APP).unwrap())
}

/// The fixture profile.
#[allow(dead_code)]
pub fn profile() -> AppProfile {
    serde_yaml::from_str(PROFILE_YAML).unwrap()
}

/// A builder over the fixtures rooted at `root`.
#[allow(dead_code)]
pub fn builder(root: &Path) -> AppConfigBuilder {
    AppConfigBuilder::new(schema())
        .with_profile(profile())
        .with_root(root)
}

/// An application tree in a temporary directory.
///
/// The directory is removed when the tree is dropped.
#[allow(dead_code)]
pub struct AppTree {
    dir: TempDir,
}

#[allow(dead_code)]
impl AppTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// The tree's root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the tree.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a file, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Creates an empty file.
    pub fn touch(&self, relative: &str) -> PathBuf {
        self.write(relative, "")
    }
}
