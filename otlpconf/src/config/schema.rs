//! Resolved configuration data model.
//!
//! A [`Config`] is the single value handed to the transport layer. It is seeded
//! from the defaults below, overlaid with the environment and then with
//! caller options by [`ConfigBuilder`](crate::config::ConfigBuilder).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::metric::{
    default_aggregation_selector, default_temporality_selector, AggregationSelector,
    TemporalitySelector,
};
use crate::retry::RetryConfig;
use crate::transport::{Compression, DialOption, TlsConfig, TransportCredentials};

/// Host of the collector when nothing else is configured.
pub const DEFAULT_COLLECTOR_HOST: &str = "localhost";

/// Default port of an OTLP/gRPC collector.
pub const DEFAULT_COLLECTOR_GRPC_PORT: u16 = 4317;

/// Default port of an OTLP/HTTP collector.
pub const DEFAULT_COLLECTOR_HTTP_PORT: u16 = 4318;

/// Default URL path for the endpoint receiving metrics.
pub const DEFAULT_METRICS_PATH: &str = "/v1/metrics";

/// Default maximum time the backend gets to process each export.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times an export is attempted by default.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base backoff for exporters that apply their own exponential backoff.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(300);

/// User-agent announced by the exporter.
#[must_use]
pub fn user_agent() -> String {
    format!("OTel OTLP Exporter Rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Transport parameters for the metrics signal.
#[derive(Clone)]
pub struct SignalConfig {
    /// Collector `host[:port]`, without scheme or path.
    pub endpoint: String,

    /// Send without transport security.
    pub insecure: bool,

    /// TLS material for the HTTP client.
    pub tls_config: Option<TlsConfig>,

    /// Extra headers sent with every export.
    pub headers: HashMap<String, String>,

    /// Payload compression.
    pub compression: Compression,

    /// Maximum time for a single export.
    pub timeout: Duration,

    /// URL path metrics are posted to (HTTP).
    pub url_path: String,

    /// Explicit or derived gRPC connection security.
    pub grpc_credentials: Option<TransportCredentials>,

    /// Temporality chosen per instrument kind.
    pub temporality_selector: TemporalitySelector,

    /// Aggregation chosen per instrument kind.
    pub aggregation_selector: AggregationSelector,
}

impl SignalConfig {
    fn with_port(port: u16) -> Self {
        Self {
            endpoint: format!("{DEFAULT_COLLECTOR_HOST}:{port}"),
            insecure: false,
            tls_config: None,
            headers: HashMap::new(),
            compression: Compression::None,
            timeout: DEFAULT_TIMEOUT,
            url_path: DEFAULT_METRICS_PATH.to_string(),
            grpc_credentials: None,
            temporality_selector: default_temporality_selector(),
            aggregation_selector: default_aggregation_selector(),
        }
    }
}

impl fmt::Debug for SignalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalConfig")
            .field("endpoint", &self.endpoint)
            .field("insecure", &self.insecure)
            .field("tls_config", &self.tls_config)
            .field("headers", &self.headers)
            .field("compression", &self.compression)
            .field("timeout", &self.timeout)
            .field("url_path", &self.url_path)
            .field("grpc_credentials", &self.grpc_credentials)
            .finish_non_exhaustive()
    }
}

// Selectors compare by identity: the same selector handle on both sides.
impl PartialEq for SignalConfig {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.insecure == other.insecure
            && self.tls_config == other.tls_config
            && self.headers == other.headers
            && self.compression == other.compression
            && self.timeout == other.timeout
            && self.url_path == other.url_path
            && self.grpc_credentials == other.grpc_credentials
            && Arc::ptr_eq(&self.temporality_selector, &other.temporality_selector)
            && Arc::ptr_eq(&self.aggregation_selector, &other.aggregation_selector)
    }
}

/// Fully resolved exporter configuration.
///
/// # Examples
///
/// ```
/// use otlpconf::config::{Config, DEFAULT_METRICS_PATH};
///
/// let http = Config::http_defaults();
/// assert_eq!(http.metrics.endpoint, "localhost:4318");
/// assert_eq!(http.metrics.url_path, DEFAULT_METRICS_PATH);
/// assert!(http.dial_options.is_empty());
///
/// let grpc = Config::grpc_defaults();
/// assert_eq!(grpc.metrics.endpoint, "localhost:4317");
/// assert_eq!(grpc.dial_options.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Metrics signal parameters.
    pub metrics: SignalConfig,

    /// Retry policy for failed exports.
    pub retry: RetryConfig,

    /// Minimum connect timeout for gRPC reconnects; zero disables it.
    pub reconnection_period: Duration,

    /// gRPC default service configuration JSON.
    pub service_config: String,

    /// Ordered gRPC dial parameters.
    pub dial_options: Vec<DialOption>,
}

impl Config {
    /// Seed values for an HTTP build.
    #[must_use]
    pub fn http_defaults() -> Self {
        Self {
            metrics: SignalConfig::with_port(DEFAULT_COLLECTOR_HTTP_PORT),
            retry: RetryConfig::default(),
            reconnection_period: Duration::ZERO,
            service_config: String::new(),
            dial_options: Vec::new(),
        }
    }

    /// Seed values for a gRPC build, including the user-agent dial option.
    #[must_use]
    pub fn grpc_defaults() -> Self {
        Self {
            metrics: SignalConfig::with_port(DEFAULT_COLLECTOR_GRPC_PORT),
            dial_options: vec![DialOption::UserAgent(user_agent())],
            ..Self::http_defaults()
        }
    }

    /// The credential dial option chosen for a gRPC build, if any.
    #[must_use]
    pub fn transport_credentials(&self) -> Option<&TransportCredentials> {
        self.dial_options.iter().find_map(|opt| match opt {
            DialOption::TransportCredentials(creds) => Some(creds),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        let cfg = Config::http_defaults();
        assert_eq!(cfg.metrics.endpoint, "localhost:4318");
        assert_eq!(cfg.metrics.compression, Compression::None);
        assert_eq!(cfg.metrics.timeout, DEFAULT_TIMEOUT);
        assert!(!cfg.metrics.insecure);
        assert!(cfg.metrics.headers.is_empty());
        assert_eq!(cfg.retry, RetryConfig::default());
        assert_eq!(cfg.reconnection_period, Duration::ZERO);
        assert!(cfg.transport_credentials().is_none());
    }

    #[test]
    fn test_grpc_defaults_carry_user_agent() {
        let cfg = Config::grpc_defaults();
        assert_eq!(cfg.metrics.endpoint, "localhost:4317");
        assert_eq!(cfg.dial_options, vec![DialOption::UserAgent(user_agent())]);
    }

    #[test]
    fn test_user_agent_names_rust_exporter() {
        let agent = user_agent();
        assert!(agent.starts_with("OTel OTLP Exporter Rust/"));
        assert!(agent.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_equality_compares_selector_identity() {
        let a = Config::http_defaults();
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.metrics.temporality_selector = Arc::new(crate::metric::cumulative_temporality);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_omits_selectors() {
        let rendered = format!("{:?}", Config::http_defaults());
        assert!(rendered.contains("localhost:4318"));
        assert!(!rendered.contains("temporality_selector"));
    }
}
