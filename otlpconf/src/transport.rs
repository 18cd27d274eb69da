//! Transport-facing values produced by configuration resolution.
//!
//! None of these types open connections. They describe what the HTTP or gRPC
//! client should do, and the client layer consumes them as-is.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The transport a configuration is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// OTLP over HTTP.
    Http,
    /// OTLP over gRPC.
    Grpc,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Grpc => write!(f, "grpc"),
        }
    }
}

impl Transport {
    /// Parses a transport name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `http` or `grpc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use otlpconf::Transport;
    ///
    /// assert_eq!(Transport::parse("GRPC").unwrap(), Transport::Grpc);
    /// assert!(Transport::parse("udp").is_err());
    /// ```
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "grpc" => Ok(Self::Grpc),
            _ => Err(format!("invalid transport: {s}")),
        }
    }
}

/// Payload compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Payloads are sent uncompressed.
    #[default]
    None,
    /// Payloads are gzip-compressed.
    Gzip,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Gzip => write!(f, "gzip"),
        }
    }
}

impl Compression {
    /// Parses a compression name (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `gzip` or `none`.
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "gzip" => Ok(Self::Gzip),
            "none" => Ok(Self::None),
            _ => Err(format!("invalid compression: {s}")),
        }
    }
}

/// Client TLS material.
///
/// The default value trusts the system root certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// PEM-encoded root certificates replacing the system roots.
    pub ca_certificate_pem: Option<Vec<u8>>,
    /// Server name used for verification instead of the endpoint host.
    pub server_name: Option<String>,
}

impl TlsConfig {
    /// TLS configuration trusting the system root certificates.
    #[must_use]
    pub fn system_roots() -> Self {
        Self::default()
    }

    /// Load root certificates from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if the file cannot be read and
    /// [`Error::Validation`] if it holds no PEM certificate block.
    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path).map_err(|source| Error::Certificate {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(pem)
    }

    /// Use the given PEM bytes as root certificates.
    ///
    /// Every `CERTIFICATE` section must decode, and at least one must be
    /// present. Other PEM sections are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a certificate section is malformed or
    /// none is found.
    ///
    /// # Examples
    ///
    /// ```
    /// use otlpconf::TlsConfig;
    ///
    /// assert!(TlsConfig::from_pem(b"garbage".to_vec()).is_err());
    /// assert!(TlsConfig::from_pem(b"-----BEGIN CERTIFICATE-----\n!!!\n".to_vec()).is_err());
    /// ```
    pub fn from_pem(pem: Vec<u8>) -> Result<Self> {
        let certificates = CertificateDer::pem_slice_iter(&pem)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Validation {
                field: "certificate".into(),
                message: format!("failed to parse certificates: {e}"),
            })?;
        if certificates.is_empty() {
            return Err(Error::Validation {
                field: "certificate".into(),
                message: "no PEM certificate found".into(),
            });
        }
        log::debug!("loaded {} root certificate(s)", certificates.len());

        Ok(Self {
            ca_certificate_pem: Some(pem),
            server_name: None,
        })
    }

    /// Returns true when no custom root certificates are configured.
    #[must_use]
    pub fn uses_system_roots(&self) -> bool {
        self.ca_certificate_pem.is_none()
    }
}

/// Security applied to a gRPC connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCredentials {
    /// Plaintext connection.
    Insecure,
    /// TLS with the given material.
    Tls(TlsConfig),
}

impl TransportCredentials {
    /// TLS credentials; `None` trusts the system root certificates.
    #[must_use]
    pub fn new_tls(config: Option<TlsConfig>) -> Self {
        Self::Tls(config.unwrap_or_default())
    }

    /// Short description used in logs and summaries.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Insecure => "insecure",
            Self::Tls(tls) if tls.uses_system_roots() => "tls (system roots)",
            Self::Tls(_) => "tls (custom roots)",
        }
    }
}

/// Connection backoff shape used while (re)connecting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay after the first failure.
    #[serde(with = "crate::retry::duration_ms")]
    pub base_delay: Duration,
    /// Factor applied after each failure.
    pub multiplier: f64,
    /// Randomization factor.
    pub jitter: f64,
    /// Upper bound for the delay.
    #[serde(with = "crate::retry::duration_ms")]
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 1.6,
            jitter: 0.2,
            max_delay: Duration::from_secs(120),
        }
    }
}

/// Name of the gzip compressor understood by gRPC clients.
pub const GZIP_COMPRESSOR: &str = "gzip";

/// A parameter applied when dialing a gRPC connection.
///
/// Order matters: later entries may override earlier ones once applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DialOption {
    /// User-agent sent with every request.
    UserAgent(String),
    /// Default service configuration JSON.
    DefaultServiceConfig(String),
    /// Connection security.
    TransportCredentials(TransportCredentials),
    /// Compressor used for every call.
    DefaultCallCompressor(String),
    /// Connection parameters for reconnect behavior.
    ConnectParams {
        /// Backoff between connection attempts.
        backoff: BackoffConfig,
        /// Minimum time given to a connection attempt.
        min_connect_timeout: Duration,
    },
    /// Caller-supplied parameter passed through untouched.
    Custom {
        /// Parameter name.
        name: String,
        /// Parameter value.
        value: String,
    },
}

impl DialOption {
    /// Stable name of the variant, used for summaries and duplicate checks.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserAgent(_) => "user_agent",
            Self::DefaultServiceConfig(_) => "default_service_config",
            Self::TransportCredentials(_) => "transport_credentials",
            Self::DefaultCallCompressor(_) => "default_call_compressor",
            Self::ConnectParams { .. } => "connect_params",
            Self::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for DialOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserAgent(agent) => write!(f, "user_agent={agent}"),
            Self::DefaultServiceConfig(cfg) => write!(f, "default_service_config={cfg}"),
            Self::TransportCredentials(creds) => {
                write!(f, "transport_credentials={}", creds.describe())
            }
            Self::DefaultCallCompressor(name) => write!(f, "default_call_compressor={name}"),
            Self::ConnectParams {
                min_connect_timeout,
                ..
            } => write!(
                f,
                "connect_params(min_connect_timeout={}ms)",
                min_connect_timeout.as_millis()
            ),
            Self::Custom { name, value } => write!(f, "{name}={value}"),
        }
    }
}

/// Self-signed CA used by tests that load certificate files.
#[cfg(test)]
pub(crate) const TEST_CA_PEM: &str = include_str!("../tests/fixtures/test_ca.pem");
