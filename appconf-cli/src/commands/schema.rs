//! Command to print the option table of a schema.

use crate::error::CliError;
use crate::utils::{load_schema, GlobalOptions};
use clap::Args;

/// Print the options declared by the schema.
#[derive(Args)]
pub struct SchemaCommand {
    /// Only show path options
    #[arg(long)]
    pub paths: bool,
}

impl SchemaCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let schema = load_schema(global)?;

        for spec in schema.options() {
            if self.paths && spec.resolves_against.is_none() {
                continue;
            }
            let mut flags = Vec::new();
            if let Some(parent) = &spec.resolves_against {
                flags.push(format!("-> {parent}"));
            }
            if spec.reloadable {
                flags.push("reloadable".to_string());
            }
            if spec.per_host {
                flags.push("per-host".to_string());
            }
            let default = if spec.default.is_null() {
                "~".to_string()
            } else {
                spec.default.to_string()
            };
            println!(
                "{}\t{}\t{}\t{}",
                spec.name,
                spec.option_type,
                default,
                flags.join(" ")
            );
        }
        Ok(())
    }
}
