//! Configuration construction for schema-driven applications.
//!
//! This module turns an option [`Schema`](crate::schema::Schema), an
//! [`AppProfile`] and explicit options into a resolved [`AppConfig`]:
//! - YAML configuration files (`<app>:` section or top-level mapping)
//! - Environment variable overrides (`<PREFIX>_CONFIG_*`)
//! - Programmatic options via [`AppConfigBuilder`]
//! - Type conversion, path resolution and fallbacks
//!
//! # Option Precedence
//!
//! Explicit options are collected from the following sources (highest to
//! lowest):
//!
//! 1. `<PREFIX>_CONFIG_OVERRIDE_<OPTION>` environment variables
//! 2. Programmatic options (via [`AppConfigBuilder::with_option`])
//! 3. The configuration file
//! 4. `<PREFIX>_CONFIG_<OPTION>` environment variables
//! 5. Schema defaults
//!
//! # Examples
//!
//! ```no_run
//! use appconf::config::{AppConfigBuilder, AppProfile};
//! use appconf::schema::SchemaLoader;
//! use std::path::Path;
//!
//! let schema = SchemaLoader::load_file(Path::new("lib/config_schema.yml"), "galaxy").unwrap();
//! let profile = AppProfile::load_file(Path::new("lib/galaxy_profile.yml")).unwrap();
//!
//! let config = AppConfigBuilder::new(schema)
//!     .with_profile(profile)
//!     .with_root("/srv/galaxy")
//!     .discover_config_file()
//!     .with_env_overrides()
//!     .build()
//!     .unwrap();
//!
//! for path in config.paths("tool_config_file") {
//!     println!("{}", path.display());
//! }
//! ```

pub mod app;
pub mod attributes;
pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod profile;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use app::AppConfig;
pub use attributes::{Attributes, BASE_ATTRIBUTES, RESERVED_ATTRIBUTES};
pub use builder::AppConfigBuilder;
pub use environment::EnvironmentOverrides;
pub use loader::ConfigFileLoader;
pub use merger::ConfigMerger;
pub use profile::{AppProfile, Layout};
