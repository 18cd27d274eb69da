//! Environment variable handling for configuration overrides.
//!
//! This module reads the `OTEL_EXPORTER_OTLP_*` variables. Each setting has a
//! generic variable and a `METRICS_` variant; the generic one is applied
//! first so the signal-specific value wins when both are set. Values that
//! cannot be used are reported and ignored, never fatal.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::Path;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::option::{
    authority, with_compression, with_headers, with_insecure, with_reconnection_period,
    with_secure, with_temporality_selector, with_timeout, with_tls_client_config, ConfigOption,
};
use crate::config::schema::{Config, DEFAULT_METRICS_PATH};
use crate::error::{Error, Result};
use crate::metric::{cumulative_temporality, delta_temporality, low_memory_temporality};
use crate::path::{has_scheme, join_path};
use crate::reporter::SharedReporter;
use crate::transport::{Compression, TlsConfig, Transport};

/// Prefix shared by every variable this module reads.
pub const ENV_PREFIX: &str = "OTEL_EXPORTER_OTLP_";

/// Collector endpoint for every signal.
pub const ENV_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Collector endpoint for metrics.
pub const ENV_METRICS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";
/// PEM file with root certificates for every signal.
pub const ENV_CERTIFICATE: &str = "OTEL_EXPORTER_OTLP_CERTIFICATE";
/// PEM file with root certificates for metrics.
pub const ENV_METRICS_CERTIFICATE: &str = "OTEL_EXPORTER_OTLP_METRICS_CERTIFICATE";
/// Disable transport security for every signal.
pub const ENV_INSECURE: &str = "OTEL_EXPORTER_OTLP_INSECURE";
/// Disable transport security for metrics.
pub const ENV_METRICS_INSECURE: &str = "OTEL_EXPORTER_OTLP_METRICS_INSECURE";
/// Export headers for every signal.
pub const ENV_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";
/// Export headers for metrics.
pub const ENV_METRICS_HEADERS: &str = "OTEL_EXPORTER_OTLP_METRICS_HEADERS";
/// Compression for every signal.
pub const ENV_COMPRESSION: &str = "OTEL_EXPORTER_OTLP_COMPRESSION";
/// Compression for metrics.
pub const ENV_METRICS_COMPRESSION: &str = "OTEL_EXPORTER_OTLP_METRICS_COMPRESSION";
/// Export timeout in milliseconds for every signal.
pub const ENV_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TIMEOUT";
/// Export timeout in milliseconds for metrics.
pub const ENV_METRICS_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_METRICS_TIMEOUT";
/// gRPC reconnection period in milliseconds for every signal.
pub const ENV_RECONNECTION_PERIOD: &str = "OTEL_EXPORTER_OTLP_RECONNECTION_PERIOD";
/// gRPC reconnection period in milliseconds for metrics.
pub const ENV_METRICS_RECONNECTION_PERIOD: &str = "OTEL_EXPORTER_OTLP_METRICS_RECONNECTION_PERIOD";
/// Temporality preference for metrics.
pub const ENV_METRICS_TEMPORALITY_PREFERENCE: &str =
    "OTEL_EXPORTER_OTLP_METRICS_TEMPORALITY_PREFERENCE";

/// Every variable the resolver understands, in application order.
pub const RECOGNIZED_VARS: [&str; 15] = [
    ENV_ENDPOINT,
    ENV_METRICS_ENDPOINT,
    ENV_CERTIFICATE,
    ENV_METRICS_CERTIFICATE,
    ENV_INSECURE,
    ENV_METRICS_INSECURE,
    ENV_HEADERS,
    ENV_METRICS_HEADERS,
    ENV_COMPRESSION,
    ENV_METRICS_COMPRESSION,
    ENV_TIMEOUT,
    ENV_METRICS_TIMEOUT,
    ENV_RECONNECTION_PERIOD,
    ENV_METRICS_RECONNECTION_PERIOD,
    ENV_METRICS_TEMPORALITY_PREFERENCE,
];

/// Which endpoint variable a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointScope {
    /// Shared by all signals: the metrics path is appended for HTTP.
    Generic,
    /// Metrics only: the path is used as given.
    Metrics,
}

/// Immutable snapshot of the exporter environment variables.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use otlpconf::config::{Config, EnvironmentConfig};
/// use otlpconf::reporter::{LogReporter, SharedReporter};
/// use otlpconf::Transport;
///
/// let env = EnvironmentConfig::from_pairs([
///     ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4318/prefix"),
/// ]);
/// let reporter: SharedReporter = Arc::new(LogReporter);
/// let cfg = env.apply(Config::http_defaults(), Transport::Http, &reporter);
///
/// assert_eq!(cfg.metrics.endpoint, "collector:4318");
/// assert_eq!(cfg.metrics.url_path, "/prefix/v1/metrics");
/// assert!(cfg.metrics.insecure);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    vars: BTreeMap<String, String>,
}

impl EnvironmentConfig {
    /// Snapshot the current process environment.
    ///
    /// Only variables starting with [`ENV_PREFIX`] whose names and values are
    /// valid Unicode are kept.
    #[must_use]
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from explicit name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of a variable, as captured.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns true if the snapshot holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Trimmed value of a variable; blank values count as unset.
    fn value(&self, name: &str) -> Option<&str> {
        self.raw(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Overlay the snapshot onto `config` for a `transport` build.
    #[must_use]
    pub fn apply(&self, config: Config, transport: Transport, reporter: &SharedReporter) -> Config {
        self.options(reporter)
            .iter()
            .fold(config, |config, option| option.apply(transport, config, reporter))
    }

    /// Translate the snapshot into options, in application order.
    ///
    /// Unusable values are reported here and produce no option.
    #[must_use]
    pub fn options(&self, reporter: &SharedReporter) -> Vec<ConfigOption> {
        let mut options = Vec::new();

        for (name, scope) in [
            (ENV_ENDPOINT, EndpointScope::Generic),
            (ENV_METRICS_ENDPOINT, EndpointScope::Metrics),
        ] {
            if let Some(value) = self.value(name) {
                match Self::parse_endpoint_url(name, value) {
                    Ok(url) => options.extend(Self::endpoint_options(&url, value, scope)),
                    Err(err) => reporter.report(&err, "parse url", &[("input", value.to_string())]),
                }
            }
        }

        let mut tls = None;
        for name in [ENV_CERTIFICATE, ENV_METRICS_CERTIFICATE] {
            if let Some(file) = self.value(name) {
                match TlsConfig::from_pem_file(Path::new(file)) {
                    Ok(loaded) => tls = Some(loaded),
                    Err(err) => reporter.report(
                        &err,
                        "read tls ca cert file",
                        &[("file", file.to_string())],
                    ),
                }
            }
        }
        if let Some(tls) = tls {
            options.push(with_tls_client_config(tls));
        }

        for name in [ENV_INSECURE, ENV_METRICS_INSECURE] {
            if let Some(value) = self.value(name) {
                match Self::parse_bool(name, value) {
                    Ok(true) => options.push(with_insecure()),
                    Ok(false) => options.push(with_secure()),
                    Err(err) => reporter.report(&err, "parse bool", &[("input", value.to_string())]),
                }
            }
        }

        for name in [ENV_HEADERS, ENV_METRICS_HEADERS] {
            if let Some(value) = self.value(name) {
                options.push(with_headers(Self::parse_headers(name, value, reporter)));
            }
        }

        for name in [ENV_COMPRESSION, ENV_METRICS_COMPRESSION] {
            if let Some(value) = self.value(name) {
                match Compression::parse(value) {
                    Ok(compression) => options.push(with_compression(compression)),
                    Err(message) => reporter.report(
                        &Error::InvalidEnvironment {
                            var: name.into(),
                            message,
                        },
                        "parse compression",
                        &[("input", value.to_string())],
                    ),
                }
            }
        }

        for name in [ENV_TIMEOUT, ENV_METRICS_TIMEOUT] {
            if let Some(value) = self.value(name) {
                match Self::parse_millis(name, value) {
                    Ok(timeout) => options.push(with_timeout(timeout)),
                    Err(err) => {
                        reporter.report(&err, "parse duration", &[("input", value.to_string())]);
                    }
                }
            }
        }

        for name in [ENV_RECONNECTION_PERIOD, ENV_METRICS_RECONNECTION_PERIOD] {
            if let Some(value) = self.value(name) {
                match Self::parse_millis(name, value) {
                    Ok(period) => options.push(with_reconnection_period(period)),
                    Err(err) => {
                        reporter.report(&err, "parse duration", &[("input", value.to_string())]);
                    }
                }
            }
        }

        if let Some(value) = self.value(ENV_METRICS_TEMPORALITY_PREFERENCE) {
            match value.to_lowercase().as_str() {
                "cumulative" => options.push(with_temporality_selector(cumulative_temporality)),
                "delta" => options.push(with_temporality_selector(delta_temporality)),
                "lowmemory" => options.push(with_temporality_selector(low_memory_temporality)),
                _ => reporter.report(
                    &Error::InvalidEnvironment {
                        var: ENV_METRICS_TEMPORALITY_PREFERENCE.into(),
                        message: "expected cumulative, delta or lowmemory".into(),
                    },
                    "ignoring temporality preference",
                    &[("value", value.to_string())],
                ),
            }
        }

        options
    }

    fn parse_endpoint_url(name: &str, value: &str) -> Result<Url> {
        if !has_scheme(value) {
            return Err(Error::InvalidEnvironment {
                var: name.into(),
                message: format!("endpoint '{value}' has no scheme"),
            });
        }
        Url::parse(value).map_err(|source| Error::InvalidEndpoint {
            input: value.to_string(),
            source,
        })
    }

    /// Options derived from one endpoint URL.
    ///
    /// The scheme decides security: `http` and `unix` are insecure, anything
    /// else is secure.
    fn endpoint_options(url: &Url, raw: &str, scope: EndpointScope) -> [ConfigOption; 2] {
        let security = match url.scheme() {
            "http" | "unix" => with_insecure(),
            _ => with_secure(),
        };

        let host = authority(url, raw);
        let path = url.path().to_string();
        let grpc_endpoint = join_path(&[host.as_str(), path.as_str()]);
        let http_path = match scope {
            EndpointScope::Generic => join_path(&[path.as_str(), DEFAULT_METRICS_PATH]),
            EndpointScope::Metrics if path.is_empty() => "/".to_string(),
            EndpointScope::Metrics => path,
        };

        let endpoint = ConfigOption::split(
            move |mut config, _| {
                config.metrics.endpoint.clone_from(&host);
                config.metrics.url_path.clone_from(&http_path);
                config
            },
            move |mut config, _| {
                config.metrics.endpoint.clone_from(&grpc_endpoint);
                config
            },
        );
        [security, endpoint]
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::InvalidEnvironment {
                var: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    /// Parse a non-negative integer number of milliseconds.
    fn parse_millis(field: &str, s: &str) -> Result<Duration> {
        s.parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| Error::InvalidEnvironment {
                var: field.into(),
                message: format!("Invalid duration: '{s}' (expected non-negative milliseconds)"),
            })
    }

    /// Parse `key=value` pairs separated by commas.
    ///
    /// Keys and values are percent-decoded and trimmed. Pairs without `=` or
    /// with a bad escape are reported and skipped.
    fn parse_headers(field: &str, s: &str, reporter: &SharedReporter) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        for pair in s.split(',') {
            let Some((raw_key, raw_value)) = pair.split_once('=') else {
                reporter.report(
                    &Error::InvalidEnvironment {
                        var: field.into(),
                        message: "missing '='".into(),
                    },
                    "parse headers",
                    &[("input", pair.to_string())],
                );
                continue;
            };

            let key = match percent_decode(raw_key) {
                Ok(key) => key,
                Err(message) => {
                    reporter.report(
                        &Error::InvalidEnvironment {
                            var: field.into(),
                            message,
                        },
                        "escape header key",
                        &[("key", raw_key.to_string())],
                    );
                    continue;
                }
            };
            let value = match percent_decode(raw_value) {
                Ok(value) => value,
                Err(message) => {
                    reporter.report(
                        &Error::InvalidEnvironment {
                            var: field.into(),
                            message,
                        },
                        "escape header value",
                        &[("value", raw_value.to_string())],
                    );
                    continue;
                }
            };

            headers.insert(key.trim().to_string(), value.trim().to_string());
        }

        headers
    }
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape and
/// the decoded bytes must be UTF-8.
fn percent_decode(s: &str) -> std::result::Result<String, String> {
    let bytes = s.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(format!("invalid escape in '{s}'"));
    }

    percent_decode_str(s)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| format!("escape in '{s}' is not UTF-8"))
}
