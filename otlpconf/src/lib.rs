#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # otlpconf
//!
//! Configuration resolution for OTLP metric exporters.
//!
//! This library turns built-in defaults, the `OTEL_EXPORTER_OTLP_*`
//! environment variables and caller-supplied options into one resolved
//! configuration for an HTTP or gRPC exporter.
//!
//! ## Core Types
//!
//! - [`ConfigBuilder`] and [`ConfigOption`]: layering and options
//! - [`Config`]: the resolved configuration
//! - [`EnvironmentConfig`]: snapshot of the exporter environment variables
//! - [`ErrorReporter`]: sink for non-fatal problems found while resolving
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: stderr backend for the `log` facade
//!
//! ## Examples
//!
//! ```
//! use otlpconf::config::{with_endpoint, with_insecure};
//! use otlpconf::{ConfigBuilder, ConfigValidator, Transport};
//!
//! let config = ConfigBuilder::new()
//!     .skip_env()
//!     .with_option(with_insecure())
//!     .with_option(with_endpoint("collector:4317"))
//!     .build_grpc();
//!
//! assert_eq!(config.metrics.endpoint, "collector:4317");
//! ConfigValidator::validate(&config, Transport::Grpc).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metric;
pub mod path;
pub mod reporter;
pub mod retry;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{
    new_grpc_config, new_http_config, Config, ConfigBuilder, ConfigOption, ConfigValidator,
    EnvironmentConfig, SignalConfig,
};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use metric::{Aggregation, InstrumentKind, Temporality};
pub use reporter::{CapturingReporter, ErrorReporter, LogReporter, SharedReporter};
pub use retry::RetryConfig;
pub use transport::{Compression, DialOption, TlsConfig, Transport, TransportCredentials};
