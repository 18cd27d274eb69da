//! Utility functions for CLI operations.
//!
//! This module provides helpers shared across CLI commands: global options,
//! output formats and argument parsers.

use crate::error::CliError;
use clap::ValueEnum;
use serde::Serialize;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)] // verbose is consumed by the logger before dispatch
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned `key: value` lines (human-readable)
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Render a value as JSON or YAML.
///
/// Text output is command-specific, so it is rejected here.
pub fn render_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?.trim_end().to_string()),
        OutputFormat::Text => Err(CliError::Render(
            "text output has no generic rendering".to_string(),
        )),
    }
}

/// Parse a `KEY=VALUE` header argument.
///
/// The key is trimmed and must not be empty; the value is kept verbatim and
/// may itself contain `=`.
pub fn parse_header(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty header name in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Convert a duration to whole milliseconds for display.
pub fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("authorization=Bearer a=b").unwrap(),
            ("authorization".to_string(), "Bearer a=b".to_string())
        );
        assert_eq!(
            parse_header(" x-tenant =").unwrap(),
            ("x-tenant".to_string(), String::new())
        );
        assert!(parse_header("novalue").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn test_render_structured() {
        let json = render_structured(OutputFormat::Json, &vec![1, 2]).unwrap();
        assert!(json.contains('1'));
        let yaml = render_structured(OutputFormat::Yaml, &vec!["a"]).unwrap();
        assert_eq!(yaml, "- a");
        assert!(render_structured(OutputFormat::Text, &1).is_err());
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(Duration::from_secs(10)), 10_000);
        assert_eq!(millis(Duration::ZERO), 0);
    }
}
