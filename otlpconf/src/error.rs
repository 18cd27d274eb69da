//! Error types for the otlpconf library.
//!
//! Configuration resolution itself never fails: malformed input is handed to
//! an [`ErrorReporter`](crate::reporter::ErrorReporter) as one of these
//! errors and the build continues with the previous value. The fallible
//! surfaces (validation, certificate loading) return them through [`Result`].

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an otlpconf error.
///
/// # Examples
///
/// ```
/// use otlpconf::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(4317)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the otlpconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// An endpoint string could not be parsed as a URL.
    #[error("invalid endpoint '{input}': {source}")]
    InvalidEndpoint {
        /// The endpoint string after any default scheme was added.
        input: String,
        /// The underlying parse failure.
        #[source]
        source: url::ParseError,
    },

    /// An environment variable carried a value that could not be used.
    #[error("invalid value for {var}: {message}")]
    InvalidEnvironment {
        /// The environment variable name.
        var: String,
        /// A description of the problem.
        message: String,
    },

    /// An aggregation returned by a selector failed validation.
    #[error("invalid aggregation: {reason}")]
    InvalidAggregation {
        /// Why the aggregation was rejected.
        reason: String,
    },

    /// A resolved configuration violated one of its invariants.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A certificate file could not be read.
    #[error("cannot read certificate {}: {source}", path.display())]
    Certificate {
        /// The certificate path.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Check if the error describes a malformed endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use otlpconf::Error;
    ///
    /// let err = Error::InvalidEndpoint {
    ///     input: "https://[::1".to_string(),
    ///     source: url::Url::parse("https://[::1").unwrap_err(),
    /// };
    /// assert!(err.is_invalid_endpoint());
    /// ```
    #[must_use]
    pub fn is_invalid_endpoint(&self) -> bool {
        matches!(self, Self::InvalidEndpoint { .. })
    }

    /// Returns the environment variable this error refers to, if any.
    #[must_use]
    pub fn env_var(&self) -> Option<&str> {
        match self {
            Self::InvalidEnvironment { var, .. } => Some(var),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint_error() {
        let source = url::Url::parse("http://exa mple.com").unwrap_err();
        let err = Error::InvalidEndpoint {
            input: "http://exa mple.com".to_string(),
            source,
        };
        let display = format!("{err}");
        assert!(display.contains("invalid endpoint"));
        assert!(display.contains("exa mple.com"));
        assert!(err.is_invalid_endpoint());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_environment_error() {
        let err = Error::InvalidEnvironment {
            var: "OTEL_EXPORTER_OTLP_TIMEOUT".to_string(),
            message: "not an integer".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("OTEL_EXPORTER_OTLP_TIMEOUT"));
        assert!(display.contains("not an integer"));
        assert_eq!(err.env_var(), Some("OTEL_EXPORTER_OTLP_TIMEOUT"));
    }

    #[test]
    fn test_invalid_aggregation_error() {
        let err = Error::InvalidAggregation {
            reason: "boundaries not sorted".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid aggregation"));
        assert!(display.contains("not sorted"));
        assert_eq!(err.env_var(), None);
    }

    #[test]
    fn test_validation_error() {
        let err = Error::Validation {
            field: "url_path".to_string(),
            message: "must be absolute".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("url_path"));
        assert!(display.contains("must be absolute"));
    }

    #[test]
    fn test_certificate_error() {
        let err = Error::Certificate {
            path: PathBuf::from("/missing/ca.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let display = format!("{err}");
        assert!(display.contains("cannot read certificate"));
        assert!(display.replace(std::path::MAIN_SEPARATOR, "/").contains("/missing/ca.pem"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
