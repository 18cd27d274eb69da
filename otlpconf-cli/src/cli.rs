//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, EnvCommand, ResolveCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for inspecting OTLP metric exporter configuration.
#[derive(Parser)]
#[command(name = "otlpconf")]
#[command(
    version,
    about = "Inspect resolved OTLP metric exporter configuration",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve an exporter configuration and print it
    Resolve(ResolveCommand),

    /// List the exporter environment variables and their values
    Env(EnvCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["otlpconf", "env", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Env(_)));
    }
}
