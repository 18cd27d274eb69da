//! `completions` command: shell completion scripts for `otlpconf`.
//!
//! The script goes to stdout so it can be redirected into place; the hint on
//! where to put it goes to stderr and is silenced by `--quiet`.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

const BIN_NAME: &str = "otlpconf";

/// Generate shell completion scripts
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let script = render_script(self.shell);

        if !global.quiet {
            match install_hint(self.shell) {
                Some(hint) => eprintln!("# {} completions for {BIN_NAME}: {hint}", self.shell),
                None => eprintln!("# {} completions for {BIN_NAME}", self.shell),
            }
        }

        io::stdout().lock().write_all(&script)?;
        Ok(())
    }
}

/// The completion script for `shell`.
fn render_script(shell: Shell) -> Vec<u8> {
    let mut buf = Vec::new();
    generate(shell, &mut Cli::command(), BIN_NAME, &mut buf);
    buf
}

/// Where the script for `shell` is usually installed.
fn install_hint(shell: Shell) -> Option<&'static str> {
    match shell {
        Shell::Bash => Some("save to ~/.local/share/bash-completion/completions/otlpconf"),
        Shell::Zsh => Some("save as _otlpconf in a directory on $fpath"),
        Shell::Fish => Some("save to ~/.config/fish/completions/otlpconf.fish"),
        Shell::PowerShell => Some("pipe through Out-String | Invoke-Expression in $PROFILE"),
        _ => None,
    }
}
