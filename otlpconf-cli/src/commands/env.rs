//! Env command implementation.
//!
//! Lists every exporter environment variable the resolver reads, with the
//! value currently set in the process environment.

use crate::error::CliError;
use crate::utils::{render_structured, GlobalOptions, OutputFormat};
use clap::Args;
use otlpconf::config::environment::RECOGNIZED_VARS;
use otlpconf::EnvironmentConfig;
use serde::Serialize;
use std::io::{self, Write};

/// List the exporter environment variables and their values.
#[derive(Args)]
pub struct EnvCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,

    /// Only show variables that are set
    #[arg(long)]
    pub set_only: bool,
}

/// One recognised variable and its value.
#[derive(Debug, Serialize)]
pub struct EnvEntry {
    pub name: &'static str,
    pub value: Option<String>,
}

impl EnvCommand {
    /// Execute the env command.
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let env = EnvironmentConfig::from_process();
        let entries = collect_entries(&env, self.set_only);

        let rendered = match self.format {
            OutputFormat::Text => entries
                .iter()
                .map(|entry| match &entry.value {
                    Some(value) => format!("{}={value}", entry.name),
                    None => format!("{} (unset)", entry.name),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            format => render_structured(format, &entries)?,
        };

        if !rendered.is_empty() {
            writeln!(io::stdout().lock(), "{rendered}")?;
        }
        Ok(())
    }
}

fn collect_entries(env: &EnvironmentConfig, set_only: bool) -> Vec<EnvEntry> {
    RECOGNIZED_VARS
        .iter()
        .map(|&name| EnvEntry {
            name,
            value: env.raw(name).map(str::to_string),
        })
        .filter(|entry| !set_only || entry.value.is_some())
        .collect()
}
