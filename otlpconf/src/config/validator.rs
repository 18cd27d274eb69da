//! Configuration validation.
//!
//! Building never fails, so these checks are a separate step: they confirm
//! that a resolved configuration honours the invariants the transport layer
//! relies on.

use std::collections::HashSet;

use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::path::has_scheme;
use crate::retry::RetryConfig;
use crate::transport::{DialOption, Transport};

/// Validates resolved configurations.
///
/// # Examples
///
/// ```
/// use otlpconf::config::{ConfigBuilder, ConfigValidator};
/// use otlpconf::Transport;
///
/// let config = ConfigBuilder::new().skip_env().build_grpc();
/// ConfigValidator::validate(&config, Transport::Grpc).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a configuration built for `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first field that breaks an
    /// invariant.
    pub fn validate(config: &Config, transport: Transport) -> Result<()> {
        Self::validate_endpoint(&config.metrics.endpoint, transport)?;
        Self::validate_url_path(&config.metrics.url_path)?;
        Self::validate_headers(config)?;
        Self::validate_retry(&config.retry)?;

        match transport {
            Transport::Http => {
                if !config.dial_options.is_empty() {
                    return Err(Error::Validation {
                        field: "dial_options".into(),
                        message: "HTTP configurations carry no dial options".into(),
                    });
                }
                Ok(())
            }
            Transport::Grpc => Self::validate_dial_options(config),
        }
    }

    /// The endpoint is `host[:port]`; gRPC endpoints may also carry a path
    /// taken from the environment.
    fn validate_endpoint(endpoint: &str, transport: Transport) -> Result<()> {
        if endpoint.trim().is_empty() {
            return Err(Error::Validation {
                field: "endpoint".into(),
                message: "Cannot be empty".into(),
            });
        }

        if has_scheme(endpoint) {
            return Err(Error::Validation {
                field: "endpoint".into(),
                message: format!("'{endpoint}' must not include a scheme"),
            });
        }

        if transport == Transport::Http && endpoint.contains('/') {
            return Err(Error::Validation {
                field: "endpoint".into(),
                message: format!("'{endpoint}' must not include a path"),
            });
        }

        Ok(())
    }

    fn validate_url_path(url_path: &str) -> Result<()> {
        if !url_path.starts_with('/') {
            return Err(Error::Validation {
                field: "url_path".into(),
                message: format!("'{url_path}' must be absolute"),
            });
        }
        Ok(())
    }

    fn validate_headers(config: &Config) -> Result<()> {
        for name in config.metrics.headers.keys() {
            if name.is_empty() {
                return Err(Error::Validation {
                    field: "headers".into(),
                    message: "Header names cannot be empty".into(),
                });
            }
            if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
                return Err(Error::Validation {
                    field: "headers".into(),
                    message: format!("Invalid header name: {name:?}"),
                });
            }
        }
        Ok(())
    }

    fn validate_retry(retry: &RetryConfig) -> Result<()> {
        if retry.enabled && retry.initial_interval > retry.max_interval {
            return Err(Error::Validation {
                field: "retry".into(),
                message: format!(
                    "initial_interval ({:?}) exceeds max_interval ({:?})",
                    retry.initial_interval, retry.max_interval
                ),
            });
        }
        Ok(())
    }

    /// Exactly one credential, matching the explicit credential when one is
    /// recorded, and no dial option listed twice.
    fn validate_dial_options(config: &Config) -> Result<()> {
        let credentials: Vec<_> = config
            .dial_options
            .iter()
            .filter_map(|option| match option {
                DialOption::TransportCredentials(creds) => Some(creds),
                _ => None,
            })
            .collect();

        if credentials.len() != 1 {
            return Err(Error::Validation {
                field: "dial_options".into(),
                message: format!(
                    "Expected exactly one transport credential, found {}",
                    credentials.len()
                ),
            });
        }

        if let Some(explicit) = &config.metrics.grpc_credentials {
            if credentials[0] != explicit {
                return Err(Error::Validation {
                    field: "grpc_credentials".into(),
                    message: "Dial credentials differ from the configured credentials".into(),
                });
            }
        }

        let mut seen = HashSet::new();
        for option in &config.dial_options {
            if !seen.insert(option.to_string()) {
                return Err(Error::Validation {
                    field: "dial_options".into(),
                    message: format!("Duplicate dial option: {option}"),
                });
            }
        }

        Ok(())
    }
}
