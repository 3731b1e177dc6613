//! Library exports for appconf-cli.
//!
//! This module exports the CLI structure so the command tree can be
//! inspected outside the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
