#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # appconf
//!
//! Schema-driven application configuration.
//!
//! An option schema declares every option with its type, default and the
//! option its path is relative to. This library merges explicit options
//! from files, the environment and code over those defaults, converts them
//! to their declared types and resolves every path option to an absolute
//! path, with fallbacks for relocated and bundled sample files.
//!
//! ## Core Types
//!
//! - [`Schema`] and [`OptionSpec`]: the option declarations
//! - [`AppProfile`]: per-application resolution policy
//! - [`AppConfigBuilder`] and [`AppConfig`]: building and reading a configuration
//! - [`Value`] and [`Options`]: dynamically typed option values
//! - [`ConfigWarning`]: non-fatal findings kept on the configuration
//! - [`Error`] and [`Result`]: Error handling types
//! - [`LogLevel`] and [`init_logger`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use appconf::{AppConfigBuilder, OptionSpec, OptionType, Schema};
//!
//! let schema = Schema::new("demo", vec![
//!     OptionSpec::new("data_dir", OptionType::Path),
//!     OptionSpec::new("file_path", OptionType::Path)
//!         .with_default("objects")
//!         .resolves_against("data_dir"),
//! ]).unwrap();
//!
//! let config = AppConfigBuilder::new(schema)
//!     .with_root("/srv/demo")
//!     .with_option("data_dir", "/data")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.path("file_path").unwrap(), std::path::Path::new("/data/objects"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod path;
pub mod schema;
pub mod value;

// Re-export key types at crate root for convenience
pub use config::{AppConfig, AppConfigBuilder, AppProfile, Layout};
pub use diagnostics::ConfigWarning;
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel};
pub use schema::{OptionSpec, OptionType, Schema, SchemaLoader};
pub use value::{Options, Value};
