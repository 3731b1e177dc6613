//! Option schema: declared options, their defaults, types and path parents.
//!
//! A [`Schema`] is loaded once per application and shared by every
//! configuration built from it. Path options name the directory option
//! they resolve against; those parent links form a forest that is checked
//! for dangling references and cycles when the schema is built.

pub mod loader;
mod types;

pub use loader::SchemaLoader;
pub use types::{OptionSpec, OptionType, Schema};
