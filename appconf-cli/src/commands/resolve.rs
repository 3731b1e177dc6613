//! Command to print every resolved attribute.

use crate::error::CliError;
use crate::utils::{build_config, GlobalOptions};
use clap::{Args, ValueEnum};

/// Output format for `resolve`.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ResolveFormat {
    /// YAML mapping.
    #[default]
    Yaml,
    /// JSON object.
    Json,
}

/// Print all resolved attributes.
#[derive(Args)]
pub struct ResolveCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = ResolveFormat::Yaml)]
    pub format: ResolveFormat,

    /// Also print construction warnings to stderr
    #[arg(long)]
    pub show_warnings: bool,
}

impl ResolveCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = build_config(global)?;

        if self.show_warnings {
            for warning in config.warnings() {
                eprintln!("warning: {warning}");
            }
        }

        let attributes = config.attributes().as_map();
        let output = match self.format {
            ResolveFormat::Yaml => serde_yaml::to_string(attributes)
                .map_err(|e| CliError::Library(appconf::Error::Yaml(e)))?,
            ResolveFormat::Json => serde_json::to_string_pretty(attributes)
                .map_err(|e| CliError::Io(std::io::Error::other(e)))?,
        };
        println!("{}", output.trim_end());
        Ok(())
    }
}
