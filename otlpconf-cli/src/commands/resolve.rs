//! Resolve command implementation.
//!
//! Builds an exporter configuration from the environment and the flags given
//! on the command line, then prints what the exporter would use.

use crate::error::CliError;
use crate::utils::{millis, parse_header, render_structured, GlobalOptions, OutputFormat};
use clap::Args;
use otlpconf::config::{
    with_compression, with_endpoint, with_headers, with_insecure, with_reconnection_period,
    with_service_config, with_timeout, with_tls_client_config, with_url_path,
};
use otlpconf::{
    CapturingReporter, Compression, Config, ConfigBuilder, ConfigOption, ConfigValidator,
    InstrumentKind, RetryConfig, Temporality, TlsConfig, Transport,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Resolve an exporter configuration and print it.
#[derive(Args)]
pub struct ResolveCommand {
    /// Transport to resolve for (http or grpc)
    #[arg(
        long,
        default_value = "http",
        env = "OTLPCONF_TRANSPORT",
        value_parser = Transport::parse
    )]
    pub transport: Transport,

    /// Collector endpoint, with or without scheme
    #[arg(long, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Disable transport security
    #[arg(long)]
    pub insecure: bool,

    /// URL path metrics are posted to
    #[arg(long, value_name = "PATH")]
    pub url_path: Option<String>,

    /// Payload compression (gzip or none)
    #[arg(long, value_name = "COMPRESSION", value_parser = Compression::parse)]
    pub compression: Option<Compression>,

    /// Export timeout in milliseconds
    #[arg(long, value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Header sent with every export (repeatable)
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Minimum reconnect timeout in milliseconds (gRPC)
    #[arg(long, value_name = "MILLIS")]
    pub reconnection_period_ms: Option<u64>,

    /// Default service configuration JSON (gRPC)
    #[arg(long, value_name = "JSON")]
    pub service_config: Option<String>,

    /// PEM file with root certificates trusted for the collector
    #[arg(long, value_name = "PATH")]
    pub certificate: Option<PathBuf>,

    /// Ignore OTEL_EXPORTER_OTLP_* environment variables
    #[arg(long)]
    pub skip_env: bool,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        env = "OTLPCONF_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,

    /// Fail if the resolved configuration is inconsistent or any setting was
    /// rejected
    #[arg(long)]
    pub check: bool,
}

/// Printable view of a resolved configuration.
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub transport: Transport,
    pub endpoint: String,
    pub insecure: bool,
    pub url_path: String,
    pub compression: Compression,
    pub timeout_ms: u64,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    pub retry: RetryConfig,
    pub temporality: Vec<TemporalityEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dial_options: Vec<String>,
}

/// Temporality the selector picks for one instrument kind.
#[derive(Debug, Serialize)]
pub struct TemporalityEntry {
    pub instrument: InstrumentKind,
    pub temporality: Temporality,
}

impl ConfigSummary {
    /// Summarize `config` as resolved for `transport`.
    pub fn new(config: &Config, transport: Transport) -> Self {
        let metrics = &config.metrics;
        let temporality = InstrumentKind::ALL
            .into_iter()
            .map(|instrument| TemporalityEntry {
                instrument,
                temporality: (metrics.temporality_selector)(instrument),
            })
            .collect();

        let tls = metrics.tls_config.as_ref().map(|tls| {
            if tls.uses_system_roots() {
                "system roots".to_string()
            } else {
                "custom roots".to_string()
            }
        });

        Self {
            transport,
            endpoint: metrics.endpoint.clone(),
            insecure: metrics.insecure,
            url_path: metrics.url_path.clone(),
            compression: metrics.compression,
            timeout_ms: millis(metrics.timeout),
            headers: metrics.headers.clone().into_iter().collect(),
            tls,
            credentials: config
                .transport_credentials()
                .map(|creds| creds.describe().to_string()),
            retry: config.retry,
            temporality,
            dial_options: config.dial_options.iter().map(ToString::to_string).collect(),
        }
    }

    /// Render as `key: value` lines.
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("transport: {}", self.transport),
            format!("endpoint: {}", self.endpoint),
            format!("insecure: {}", self.insecure),
            format!("url_path: {}", self.url_path),
            format!("compression: {}", self.compression),
            format!("timeout_ms: {}", self.timeout_ms),
        ];
        if let Some(tls) = &self.tls {
            lines.push(format!("tls: {tls}"));
        }
        if let Some(credentials) = &self.credentials {
            lines.push(format!("credentials: {credentials}"));
        }
        for (name, value) in &self.headers {
            lines.push(format!("header {name}: {value}"));
        }
        if self.retry.enabled {
            lines.push(format!(
                "retry: initial={}ms max={}ms elapsed={}ms",
                millis(self.retry.initial_interval),
                millis(self.retry.max_interval),
                millis(self.retry.max_elapsed_time)
            ));
        } else {
            lines.push("retry: disabled".to_string());
        }
        for entry in &self.temporality {
            lines.push(format!(
                "temporality {}: {}",
                entry.instrument, entry.temporality
            ));
        }
        for option in &self.dial_options {
            lines.push(format!("dial_option: {option}"));
        }
        lines.join("\n")
    }
}

impl ResolveCommand {
    /// Options derived from the flags, in the order they are applied.
    ///
    /// Unlike settings from the environment, a flag that cannot be used is an
    /// error rather than a diagnostic.
    fn options(&self) -> Result<Vec<ConfigOption>, CliError> {
        let mut options = Vec::new();

        // Insecure first so a bare endpoint picks up the http scheme
        if self.insecure {
            options.push(with_insecure());
        }
        if let Some(endpoint) = &self.endpoint {
            options.push(with_endpoint(endpoint.clone()));
        }
        if let Some(url_path) = &self.url_path {
            options.push(with_url_path(url_path.clone()));
        }
        if let Some(compression) = self.compression {
            options.push(with_compression(compression));
        }
        if let Some(ms) = self.timeout_ms {
            options.push(with_timeout(Duration::from_millis(ms)));
        }
        if !self.headers.is_empty() {
            let headers: HashMap<String, String> = self.headers.iter().cloned().collect();
            options.push(with_headers(headers));
        }
        if let Some(ms) = self.reconnection_period_ms {
            options.push(with_reconnection_period(Duration::from_millis(ms)));
        }
        if let Some(service_config) = &self.service_config {
            serde_json::from_str::<serde_json::Value>(service_config).map_err(|e| {
                CliError::InvalidArguments(format!("--service-config is not JSON: {e}"))
            })?;
            options.push(with_service_config(service_config.clone()));
        }
        if let Some(path) = &self.certificate {
            options.push(with_tls_client_config(TlsConfig::from_pem_file(path)?));
        }
        Ok(options)
    }

    /// Execute the resolve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let reporter = Arc::new(CapturingReporter::new());
        let mut builder = ConfigBuilder::new().with_reporter(reporter.clone());
        if self.skip_env {
            builder = builder.skip_env();
        }
        let builder = builder.with_options(self.options()?);

        let config = match self.transport {
            Transport::Http => builder.build_http(),
            Transport::Grpc => builder.build_grpc(),
        };

        // Diagnostics are always shown, even with --quiet
        let reports = reporter.reports();
        for report in &reports {
            eprintln!("warning: {}: {}", report.message, report.error);
        }

        let summary = ConfigSummary::new(&config, self.transport);
        let rendered = match self.format {
            OutputFormat::Text => summary.to_text(),
            format => render_structured(format, &summary)?,
        };
        writeln!(io::stdout().lock(), "{rendered}")?;

        if self.check {
            check(&config, self.transport, reports.len())?;
            if !global.quiet {
                eprintln!("Configuration is valid");
            }
        }

        Ok(())
    }
}

/// Fail when `config` does not validate or `diagnostics` settings were
/// rejected while building it.
fn check(config: &Config, transport: Transport, diagnostics: usize) -> Result<(), CliError> {
    ConfigValidator::validate(config, transport)?;
    if diagnostics > 0 {
        return Err(CliError::SemanticFailure(format!(
            "Configuration is invalid: {diagnostics} setting(s) were rejected"
        )));
    }
    Ok(())
}
