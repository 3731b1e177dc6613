//! Main entry point for the appconf CLI.
//!
//! This is the command-line interface for inspecting configurations built
//! from an option schema. It provides commands for:
//! - `resolve`: Print every resolved attribute
//! - `get`: Print one resolved option
//! - `is-set`: Test whether an option was set explicitly
//! - `check`: Create required directories and report warnings
//! - `schema`: Print the schema's option table

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if let Err(e) = appconf::init_logger(cli.verbose, cli.quiet) {
        eprintln!("Warning: {e}");
    }

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        quiet: cli.quiet,
        schema: cli.schema,
        profile: cli.profile,
        config: cli.config,
        root: cli.root,
        app_name: cli.app_name,
        set: cli.set,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Resolve(cmd) => cmd.execute(&global),
        cli::Command::Get(cmd) => cmd.execute(&global),
        cli::Command::IsSet(cmd) => cmd.execute(&global),
        cli::Command::Check(cmd) => cmd.execute(&global),
        cli::Command::Schema(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            if !matches!(e, error::CliError::SemanticFailure(_)) || !global.quiet {
                eprintln!("Error: {e}");
            }
            std::process::exit(e.exit_code());
        }
    }
}
