//! Shell completion generation command.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Name of the installed binary
const BIN_NAME: &str = "appconf";

/// Generate shell completion scripts
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Where the script is usually installed for `shell`.
    fn install_hint(shell: Shell) -> Option<&'static str> {
        match shell {
            Shell::Bash => Some("~/.local/share/bash-completion/completions/appconf"),
            Shell::Zsh => Some("~/.zsh/completions/_appconf"),
            Shell::Fish => Some("~/.config/fish/completions/appconf.fish"),
            _ => None,
        }
    }

    /// Execute the completions command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        match &self.output {
            Some(path) => {
                let mut file = File::create(path)?;
                generate(self.shell, &mut cmd, BIN_NAME, &mut file);
                file.flush()?;
                if !global.quiet {
                    eprintln!("Wrote {} completions to {}", self.shell, path.display());
                }
            }
            None => {
                if !global.quiet {
                    if let Some(hint) = Self::install_hint(self.shell) {
                        eprintln!("# Save this script as {hint}");
                    }
                }
                generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());
            }
        }

        Ok(())
    }
}
