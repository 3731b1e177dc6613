//! Command to check a configuration and create its required directories.

use crate::error::CliError;
use crate::utils::{build_config, GlobalOptions};
use clap::Args;

/// Build the configuration, create required directories and report
/// warnings.
#[derive(Args)]
pub struct CheckCommand {
    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = build_config(global)?;
        let mut warnings = config.warnings().to_vec();
        warnings.extend(config.check()?);

        for warning in &warnings {
            eprintln!("warning: {warning}");
        }

        if self.strict && !warnings.is_empty() {
            return Err(CliError::SemanticFailure(format!(
                "Configuration has {} warning(s)",
                warnings.len()
            )));
        }

        if !global.quiet {
            println!("Configuration is valid");
        }
        Ok(())
    }
}
