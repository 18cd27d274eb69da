//! Caller-supplied configuration options.
//!
//! An option is a value describing one change to a [`Config`]. Options are
//! cheap to clone, can be reused across builds, and are applied in the order
//! the caller supplied them. Whether an option affects a build depends on its
//! variant and the transport being built:
//!
//! | Variant | HTTP build | gRPC build |
//! |---------|------------|------------|
//! | [`ConfigOption::Generic`] | applied | applied |
//! | [`ConfigOption::Split`] | `http` half | `grpc` half |
//! | [`ConfigOption::Http`] | applied | ignored |
//! | [`ConfigOption::Grpc`] | ignored | applied |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::{Position, Url};

use crate::config::schema::{Config, DEFAULT_METRICS_PATH};
use crate::error::Error;
use crate::metric::{
    default_aggregation, Aggregation, InstrumentKind, Temporality, TemporalitySelector,
};
use crate::path::{has_scheme, join_path};
use crate::reporter::SharedReporter;
use crate::retry::RetryConfig;
use crate::transport::{Compression, DialOption, TlsConfig, Transport, TransportCredentials};

/// A single configuration change.
///
/// The reporter receives problems found while applying the change; the
/// option then leaves the configuration as it was.
pub type Mutator = Arc<dyn Fn(Config, &SharedReporter) -> Config + Send + Sync>;

/// A configuration option, tagged with the transports it applies to.
#[derive(Clone)]
pub enum ConfigOption {
    /// Same change for both transports.
    Generic(Mutator),
    /// A different change per transport.
    Split {
        /// Change applied to HTTP builds.
        http: Mutator,
        /// Change applied to gRPC builds.
        grpc: Mutator,
    },
    /// Change applied to HTTP builds only.
    Http(Mutator),
    /// Change applied to gRPC builds only.
    Grpc(Mutator),
}

impl ConfigOption {
    /// Option applying `f` for both transports.
    pub fn generic<F>(f: F) -> Self
    where
        F: Fn(Config, &SharedReporter) -> Config + Send + Sync + 'static,
    {
        Self::Generic(Arc::new(f))
    }

    /// Option applying `http` to HTTP builds and `grpc` to gRPC builds.
    pub fn split<H, G>(http: H, grpc: G) -> Self
    where
        H: Fn(Config, &SharedReporter) -> Config + Send + Sync + 'static,
        G: Fn(Config, &SharedReporter) -> Config + Send + Sync + 'static,
    {
        Self::Split {
            http: Arc::new(http),
            grpc: Arc::new(grpc),
        }
    }

    /// Option applying `f` to HTTP builds only.
    pub fn http<F>(f: F) -> Self
    where
        F: Fn(Config, &SharedReporter) -> Config + Send + Sync + 'static,
    {
        Self::Http(Arc::new(f))
    }

    /// Option applying `f` to gRPC builds only.
    pub fn grpc<F>(f: F) -> Self
    where
        F: Fn(Config, &SharedReporter) -> Config + Send + Sync + 'static,
    {
        Self::Grpc(Arc::new(f))
    }

    /// Returns true if applying the option to a `transport` build can change it.
    #[must_use]
    pub fn targets(&self, transport: Transport) -> bool {
        match self {
            Self::Generic(_) | Self::Split { .. } => true,
            Self::Http(_) => transport == Transport::Http,
            Self::Grpc(_) => transport == Transport::Grpc,
        }
    }

    /// Apply the option to `config` as part of a `transport` build.
    ///
    /// Options not targeting `transport` return `config` unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use otlpconf::config::{with_reconnection_period, Config};
    /// use otlpconf::reporter::{LogReporter, SharedReporter};
    /// use otlpconf::Transport;
    /// use std::time::Duration;
    ///
    /// let reporter: SharedReporter = Arc::new(LogReporter);
    /// let opt = with_reconnection_period(Duration::from_secs(5));
    ///
    /// let http = opt.apply(Transport::Http, Config::http_defaults(), &reporter);
    /// assert_eq!(http.reconnection_period, Duration::ZERO);
    ///
    /// let grpc = opt.apply(Transport::Grpc, Config::grpc_defaults(), &reporter);
    /// assert_eq!(grpc.reconnection_period, Duration::from_secs(5));
    /// ```
    #[must_use]
    pub fn apply(&self, transport: Transport, config: Config, reporter: &SharedReporter) -> Config {
        match (self, transport) {
            (Self::Generic(f), _)
            | (Self::Split { http: f, .. }, Transport::Http)
            | (Self::Split { grpc: f, .. }, Transport::Grpc)
            | (Self::Http(f), Transport::Http)
            | (Self::Grpc(f), Transport::Grpc) => f(config, reporter),
            (Self::Http(_), Transport::Grpc) | (Self::Grpc(_), Transport::Http) => config,
        }
    }
}

impl fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Generic(_) => "Generic",
            Self::Split { .. } => "Split",
            Self::Http(_) => "Http",
            Self::Grpc(_) => "Grpc",
        };
        write!(f, "ConfigOption::{tag}")
    }
}

/// The `host[:port]` part of a parsed URL.
///
/// `raw` is the text `url` was parsed from. The parser omits a port equal to
/// the scheme's default, so a port written explicitly is taken from `raw`.
pub(crate) fn authority(url: &Url, raw: &str) -> String {
    let host = &url[Position::BeforeHost..Position::AfterHost];
    match url.port().or_else(|| explicit_port(raw)) {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Port written in the authority of `raw`, if any.
fn explicit_port(raw: &str) -> Option<u16> {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    // An IPv6 literal without a port ends in ']'
    let (_, port) = host_port.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok()
}

/// Set the collector endpoint.
///
/// A bare `host[:port]` gets `http://` when the configuration is insecure at
/// the time the option is applied, `https://` otherwise. The host and port
/// become the endpoint and the URL path, joined with the default metrics
/// path, becomes the URL path. An unparseable endpoint is reported and the
/// configuration is left untouched.
///
/// # Examples
///
/// ```
/// use otlpconf::config::{with_endpoint, ConfigBuilder};
///
/// let cfg = ConfigBuilder::new()
///     .skip_env()
///     .with_option(with_endpoint("collector:4318/base"))
///     .build_http();
/// assert_eq!(cfg.metrics.endpoint, "collector:4318");
/// assert_eq!(cfg.metrics.url_path, "/base/v1/metrics");
/// ```
pub fn with_endpoint(endpoint: impl Into<String>) -> ConfigOption {
    let endpoint = endpoint.into();
    ConfigOption::generic(move |mut config, reporter| {
        let raw = if has_scheme(&endpoint) {
            endpoint.clone()
        } else if config.metrics.insecure {
            format!("http://{endpoint}")
        } else {
            format!("https://{endpoint}")
        };

        match Url::parse(&raw) {
            Ok(url) => {
                config.metrics.endpoint = authority(&url, &raw);
                config.metrics.url_path = join_path(&[url.path(), DEFAULT_METRICS_PATH]);
            }
            Err(source) => {
                reporter.report(
                    &Error::InvalidEndpoint {
                        input: raw.clone(),
                        source,
                    },
                    "parse url",
                    &[("input", raw)],
                );
            }
        }
        config
    })
}

/// Set payload compression.
pub fn with_compression(compression: Compression) -> ConfigOption {
    ConfigOption::generic(move |mut config, _| {
        config.metrics.compression = compression;
        config
    })
}

/// Set the URL path verbatim; it is cleaned once all options are applied.
pub fn with_url_path(url_path: impl Into<String>) -> ConfigOption {
    let url_path = url_path.into();
    ConfigOption::generic(move |mut config, _| {
        config.metrics.url_path.clone_from(&url_path);
        config
    })
}

/// Replace the retry policy.
pub fn with_retry(retry: RetryConfig) -> ConfigOption {
    ConfigOption::generic(move |mut config, _| {
        config.retry = retry;
        config
    })
}

/// Use the given TLS material.
///
/// HTTP builds keep a copy in `tls_config`; gRPC builds turn it into explicit
/// TLS credentials.
pub fn with_tls_client_config(tls: TlsConfig) -> ConfigOption {
    let for_grpc = tls.clone();
    ConfigOption::split(
        move |mut config, _| {
            config.metrics.tls_config = Some(tls.clone());
            config
        },
        move |mut config, _| {
            config.metrics.grpc_credentials = Some(TransportCredentials::new_tls(Some(
                for_grpc.clone(),
            )));
            config
        },
    )
}

/// Disable transport security.
pub fn with_insecure() -> ConfigOption {
    ConfigOption::generic(|mut config, _| {
        config.metrics.insecure = true;
        config
    })
}

/// Re-enable transport security.
pub fn with_secure() -> ConfigOption {
    ConfigOption::generic(|mut config, _| {
        config.metrics.insecure = false;
        config
    })
}

/// Replace the header map.
///
/// Headers are not merged: the last header option wins in full.
pub fn with_headers(headers: HashMap<String, String>) -> ConfigOption {
    ConfigOption::generic(move |mut config, _| {
        config.metrics.headers.clone_from(&headers);
        config
    })
}

/// Set the per-export timeout.
pub fn with_timeout(timeout: Duration) -> ConfigOption {
    ConfigOption::generic(move |mut config, _| {
        config.metrics.timeout = timeout;
        config
    })
}

/// Set the temporality selector.
pub fn with_temporality_selector<F>(selector: F) -> ConfigOption
where
    F: Fn(InstrumentKind) -> Temporality + Send + Sync + 'static,
{
    let selector: TemporalitySelector = Arc::new(selector);
    ConfigOption::generic(move |mut config, _| {
        config.metrics.temporality_selector = Arc::clone(&selector);
        config
    })
}

/// Set the aggregation selector.
///
/// The installed selector clones and validates every aggregation the caller's
/// selector returns. An invalid aggregation is replaced by the default
/// aggregation for the instrument kind, and the substitution is reported to
/// the reporter of the build that installed it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use otlpconf::config::{with_aggregation_selector, ConfigBuilder};
/// use otlpconf::metric::{default_aggregation, Aggregation, InstrumentKind};
/// use otlpconf::reporter::CapturingReporter;
///
/// let reporter = Arc::new(CapturingReporter::new());
/// let cfg = ConfigBuilder::new()
///     .skip_env()
///     .with_reporter(reporter.clone())
///     .with_option(with_aggregation_selector(|_| Aggregation::ExplicitBucketHistogram {
///         boundaries: vec![5.0, 1.0],
///         no_min_max: false,
///     }))
///     .build_http();
///
/// let chosen = (cfg.metrics.aggregation_selector)(InstrumentKind::Counter);
/// assert_eq!(chosen, default_aggregation(InstrumentKind::Counter));
/// assert_eq!(reporter.len(), 1);
/// ```
pub fn with_aggregation_selector<F>(selector: F) -> ConfigOption
where
    F: Fn(InstrumentKind) -> Aggregation + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    ConfigOption::generic(move |mut config, reporter| {
        let selector = Arc::clone(&selector);
        let reporter = Arc::clone(reporter);
        config.metrics.aggregation_selector = Arc::new(move |kind: InstrumentKind| {
            let chosen = selector(kind);
            let copy = chosen.clone();
            match copy.validate() {
                Ok(()) => copy,
                Err(err) => {
                    let replacement = default_aggregation(kind);
                    reporter.report(
                        &err,
                        "using default aggregation instead",
                        &[
                            ("aggregation", format!("{chosen:?}")),
                            ("replacement", format!("{replacement:?}")),
                        ],
                    );
                    replacement
                }
            }
        });
        config
    })
}

/// Use explicit gRPC credentials, taking precedence over `insecure`.
pub fn with_grpc_credentials(credentials: TransportCredentials) -> ConfigOption {
    ConfigOption::grpc(move |mut config, _| {
        config.metrics.grpc_credentials = Some(credentials.clone());
        config
    })
}

/// Set the minimum connect timeout used when the gRPC connection is re-established.
pub fn with_reconnection_period(period: Duration) -> ConfigOption {
    ConfigOption::grpc(move |mut config, _| {
        config.reconnection_period = period;
        config
    })
}

/// Set the gRPC default service configuration JSON.
pub fn with_service_config(service_config: impl Into<String>) -> ConfigOption {
    let service_config = service_config.into();
    ConfigOption::grpc(move |mut config, _| {
        config.service_config.clone_from(&service_config);
        config
    })
}

/// Append a gRPC dial option.
pub fn with_dial_option(option: DialOption) -> ConfigOption {
    ConfigOption::grpc(move |mut config, _| {
        config.dial_options.push(option.clone());
        config
    })
}
