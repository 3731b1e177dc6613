//! Command to print one resolved option.

use crate::error::CliError;
use crate::utils::{build_config, format_value, GlobalOptions};
use clap::Args;

/// Print the resolved value of an option.
#[derive(Args)]
pub struct GetCommand {
    /// Option name
    #[arg(value_name = "OPTION")]
    pub option: String,

    /// Host name for per-host options
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}

impl GetCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = build_config(global)?;

        let value = match &self.host {
            Some(host) => config.value_for_host(&self.option, host),
            None => config.value(&self.option),
        };
        let value = value.ok_or_else(|| {
            CliError::SemanticFailure(format!("Unknown option: {}", self.option))
        })?;

        println!("{}", format_value(value));
        Ok(())
    }
}
