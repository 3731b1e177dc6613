//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `resolve`: Print every resolved attribute
//! - `get`: Print one resolved option
//! - `is_set`: Test whether an option was set explicitly
//! - `check`: Create required directories and report warnings
//! - `schema`: Print the schema's option table
//! - `completions`: Generate shell completion scripts

pub mod check;
pub mod completions;
pub mod get;
pub mod is_set;
pub mod resolve;
pub mod schema;

pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use get::GetCommand;
pub use is_set::IsSetCommand;
pub use resolve::{ResolveCommand, ResolveFormat};
pub use schema::SchemaCommand;
