//! Command to test whether an option was set explicitly.

use crate::error::CliError;
use crate::utils::{build_config, GlobalOptions};
use clap::Args;

/// Exit 0 if the option was set explicitly, 1 otherwise.
#[derive(Args)]
pub struct IsSetCommand {
    /// Option name
    #[arg(value_name = "OPTION")]
    pub option: String,
}

impl IsSetCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = build_config(global)?;

        if config.is_set(&self.option) {
            if !global.quiet {
                println!("{} is set", self.option);
            }
            Ok(())
        } else {
            Err(CliError::SemanticFailure(format!(
                "{} is not set",
                self.option
            )))
        }
    }
}
