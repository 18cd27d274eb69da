//! Configuration resolution for the OTLP metrics exporter.
//!
//! A configuration is resolved in layers, from lowest to highest precedence:
//!
//! 1. Built-in defaults for the transport ([`Config::http_defaults`],
//!    [`Config::grpc_defaults`])
//! 2. Environment variables (`OTEL_EXPORTER_OTLP_*`, see [`environment`])
//! 3. Caller options, in the order supplied (see [`option`])
//!
//! The builder then normalizes the URL path and, for gRPC, assembles the dial
//! options. Malformed input never fails a build: it is reported through the
//! builder's [`ErrorReporter`](crate::reporter::ErrorReporter) and skipped.
//!
//! # Examples
//!
//! Resolving with the process environment:
//!
//! ```no_run
//! use otlpconf::config::{new_grpc_config, with_endpoint};
//!
//! let config = new_grpc_config([with_endpoint("collector:4317")]);
//! println!("dialing {}", config.metrics.endpoint);
//! ```
//!
//! Fully programmatic configuration:
//!
//! ```
//! use std::time::Duration;
//! use otlpconf::config::{with_endpoint, with_insecure, with_timeout, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .skip_env()
//!     .with_option(with_insecure())
//!     .with_option(with_endpoint("collector:4318"))
//!     .with_option(with_timeout(Duration::from_secs(5)))
//!     .build_http();
//!
//! assert_eq!(config.metrics.endpoint, "collector:4318");
//! assert_eq!(config.metrics.url_path, "/v1/metrics");
//! assert_eq!(config.metrics.timeout, Duration::from_secs(5));
//! ```

pub mod builder;
pub mod environment;
pub mod option;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use builder::{new_grpc_config, new_http_config, ConfigBuilder};
pub use environment::EnvironmentConfig;
pub use option::{
    with_aggregation_selector, with_compression, with_dial_option, with_endpoint,
    with_grpc_credentials, with_headers, with_insecure, with_reconnection_period, with_retry,
    with_secure, with_service_config, with_temporality_selector, with_timeout,
    with_tls_client_config, with_url_path, ConfigOption, Mutator,
};
pub use schema::{
    user_agent, Config, SignalConfig, DEFAULT_BACKOFF, DEFAULT_COLLECTOR_GRPC_PORT,
    DEFAULT_COLLECTOR_HOST, DEFAULT_COLLECTOR_HTTP_PORT, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_METRICS_PATH, DEFAULT_TIMEOUT,
};
pub use validator::ConfigValidator;
