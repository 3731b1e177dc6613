//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CheckCommand, CompletionsCommand, GetCommand, IsSetCommand, ResolveCommand, SchemaCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for inspecting resolved application configuration.
#[derive(Parser)]
#[command(name = "appconf")]
#[command(version, about = "Inspect schema-driven application configuration", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Option schema file
    #[arg(long, value_name = "PATH", global = true, env = "APPCONF_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Application profile file
    #[arg(long, value_name = "PATH", global = true, env = "APPCONF_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Configuration file (discovered under the root when omitted)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Application root directory
    #[arg(long, value_name = "PATH", global = true)]
    pub root: Option<PathBuf>,

    /// Application section name in the schema and configuration file
    #[arg(
        long,
        value_name = "NAME",
        global = true,
        env = "APPCONF_APP_NAME",
        default_value = "galaxy"
    )]
    pub app_name: String,

    /// Set an option explicitly (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print every resolved attribute
    Resolve(ResolveCommand),

    /// Print the resolved value of one option
    Get(GetCommand),

    /// Exit 0 if an option was set explicitly, 1 otherwise
    IsSet(IsSetCommand),

    /// Create required directories and report warnings
    Check(CheckCommand),

    /// Print the options declared by the schema
    Schema(SchemaCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
