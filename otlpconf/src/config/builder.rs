//! Configuration builder that layers defaults, environment and options.
//!
//! Precedence, from lowest to highest:
//!
//! 1. Built-in defaults for the transport
//! 2. Environment variables (`OTEL_EXPORTER_OTLP_*`)
//! 3. Caller options, in the order they were added
//!
//! After the layers are applied the builder normalizes the URL path and, for
//! gRPC, assembles the dial options from the resolved settings.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::config::option::ConfigOption;
use crate::config::schema::{Config, DEFAULT_METRICS_PATH};
use crate::path::clean_path;
use crate::reporter::{LogReporter, SharedReporter};
use crate::transport::{
    BackoffConfig, Compression, DialOption, TlsConfig, Transport, TransportCredentials,
    GZIP_COMPRESSOR,
};

/// Where the environment layer comes from.
#[derive(Debug, Clone)]
enum EnvSource {
    /// Snapshot the process environment at build time.
    Process,
    /// Use a snapshot supplied by the caller.
    Snapshot(EnvironmentConfig),
    /// No environment layer.
    Skip,
}

/// Builder for resolved exporter configurations.
///
/// The same builder can produce both an HTTP and a gRPC configuration; each
/// build starts again from the defaults.
///
/// # Examples
///
/// ```
/// use otlpconf::config::{with_compression, with_insecure, ConfigBuilder};
/// use otlpconf::transport::{Compression, DialOption, TransportCredentials};
///
/// let cfg = ConfigBuilder::new()
///     .skip_env()
///     .with_option(with_insecure())
///     .with_option(with_compression(Compression::Gzip))
///     .build_grpc();
///
/// assert_eq!(cfg.transport_credentials(), Some(&TransportCredentials::Insecure));
/// assert!(cfg
///     .dial_options
///     .contains(&DialOption::DefaultCallCompressor("gzip".to_string())));
/// ```
#[derive(Clone)]
pub struct ConfigBuilder {
    reporter: SharedReporter,
    environment: EnvSource,
    options: Vec<ConfigOption>,
}

impl std::fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("environment", &self.environment)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Builder reading the process environment and logging diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(LogReporter),
            environment: EnvSource::Process,
            options: Vec::new(),
        }
    }

    /// Send diagnostics to `reporter` instead of the log.
    #[must_use]
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Use `environment` instead of the process environment.
    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentConfig) -> Self {
        self.environment = EnvSource::Snapshot(environment);
        self
    }

    /// Skip the environment layer entirely.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.environment = EnvSource::Skip;
        self
    }

    /// Append one option.
    #[must_use]
    pub fn with_option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append options, keeping their order.
    #[must_use]
    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        self.options.extend(options);
        self
    }

    /// Resolve an HTTP configuration.
    #[must_use]
    pub fn build_http(&self) -> Config {
        let mut config = self.layered(Config::http_defaults(), Transport::Http);
        config.metrics.url_path = clean_path(&config.metrics.url_path, DEFAULT_METRICS_PATH);

        log::debug!(
            "resolved http config: endpoint={} url_path={}",
            config.metrics.endpoint,
            config.metrics.url_path
        );
        config
    }

    /// Resolve a gRPC configuration.
    ///
    /// Dial options are appended after the user agent in this order: default
    /// service config, transport credentials, call compressor, connect
    /// parameters. Exactly one credential is chosen: explicit credentials,
    /// else insecure, else TLS with the system roots (which is also stored
    /// back as the explicit credential).
    #[must_use]
    pub fn build_grpc(&self) -> Config {
        let mut config = self.layered(Config::grpc_defaults(), Transport::Grpc);
        config.metrics.url_path = clean_path(&config.metrics.url_path, DEFAULT_METRICS_PATH);

        if !config.service_config.is_empty() {
            config
                .dial_options
                .push(DialOption::DefaultServiceConfig(config.service_config.clone()));
        }

        let credentials = if let Some(explicit) = config.metrics.grpc_credentials.clone() {
            explicit
        } else if config.metrics.insecure {
            TransportCredentials::Insecure
        } else {
            let tls = TransportCredentials::new_tls(Some(TlsConfig::system_roots()));
            config.metrics.grpc_credentials = Some(tls.clone());
            tls
        };
        log::debug!("grpc credentials: {}", credentials.describe());
        config
            .dial_options
            .push(DialOption::TransportCredentials(credentials));

        if config.metrics.compression == Compression::Gzip {
            config
                .dial_options
                .push(DialOption::DefaultCallCompressor(GZIP_COMPRESSOR.to_string()));
        }

        if !config.reconnection_period.is_zero() {
            config.dial_options.push(DialOption::ConnectParams {
                backoff: BackoffConfig::default(),
                min_connect_timeout: config.reconnection_period,
            });
        }

        log::debug!(
            "resolved grpc config: endpoint={} dial_options={}",
            config.metrics.endpoint,
            config.dial_options.len()
        );
        config
    }

    /// Apply the environment and option layers on top of `defaults`.
    fn layered(&self, defaults: Config, transport: Transport) -> Config {
        let config = match &self.environment {
            EnvSource::Process => {
                EnvironmentConfig::from_process().apply(defaults, transport, &self.reporter)
            }
            EnvSource::Snapshot(env) => env.apply(defaults, transport, &self.reporter),
            EnvSource::Skip => defaults,
        };

        let applied = self
            .options
            .iter()
            .filter(|option| option.targets(transport))
            .count();
        log::debug!(
            "building {transport} config with {applied} of {} options",
            self.options.len()
        );

        self.options
            .iter()
            .fold(config, |config, option| option.apply(transport, config, &self.reporter))
    }
}

/// Resolve an HTTP configuration from the process environment and `options`.
///
/// Diagnostics go to the log.
#[must_use]
pub fn new_http_config<I>(options: I) -> Config
where
    I: IntoIterator<Item = ConfigOption>,
{
    ConfigBuilder::new().with_options(options).build_http()
}

/// Resolve a gRPC configuration from the process environment and `options`.
///
/// Diagnostics go to the log.
#[must_use]
pub fn new_grpc_config<I>(options: I) -> Config
where
    I: IntoIterator<Item = ConfigOption>,
{
    ConfigBuilder::new().with_options(options).build_grpc()
}
