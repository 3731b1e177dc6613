//! Common test utilities for CLI integration tests.
//!
//! This module provides an isolated application tree with a schema and
//! profile written into it, plus a command builder pointed at them.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema used by every CLI test.
pub const SCHEMA: &str = r"
type: map
mapping:
  galaxy:
    type: map
    mapping:
      config_dir:
        type: str
      data_dir:
        type: str
      brand:
        type: str
        reloadable: true
      workers:
        type: int
        default: 1
      job_config_file:
        type: str
        default: job_conf.yml
        path_resolves_to: config_dir
      tool_config_file:
        type: str
        default: tool_conf.xml
        path_resolves_to: config_dir
      cache_dir:
        type: str
        default: cache
        path_resolves_to: data_dir
      use_tasked_jobs:
        type: bool
        default: false
";

/// Profile used by every CLI test.
pub const PROFILE: &str = r"
deprecated_options: [use_tasked_jobs]
paths_to_check_against_root: [job_config_file]
add_sample_file_to_defaults: [job_config_file]
listify_options: [tool_config_file]
required_directories: [cache_dir]
env_prefix: APPCONF_TEST_GALAXY
";

/// Test environment with an isolated application root.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Application root
    pub root: PathBuf,
    /// Schema file
    pub schema: PathBuf,
    /// Profile file
    pub profile: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The schema and profile live outside the application root so they
    /// are never mistaken for configuration files.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("app");
        fs::create_dir_all(&root).expect("Failed to create app root");

        let schema = temp_dir.path().join("schema.yml");
        fs::write(&schema, SCHEMA).expect("Failed to write schema");
        let profile = temp_dir.path().join("profile.yml");
        fs::write(&profile, PROFILE).expect("Failed to write profile");

        Self {
            temp_dir,
            root,
            schema,
            profile,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("appconf").expect("Failed to find appconf binary");
        cmd.env_remove("APPCONF_SCHEMA")
            .env_remove("APPCONF_PROFILE")
            .env_remove("APPCONF_APP_NAME")
            .env_remove("APPCONF_LOG_LEVEL");
        cmd
    }

    /// Get a command builder with schema, profile and root pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--schema")
            .arg(&self.schema)
            .arg("--profile")
            .arg(&self.profile)
            .arg("--root")
            .arg(&self.root);
        cmd
    }

    /// Path of `relative` under the application root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write a file under the application root.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// The application root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
