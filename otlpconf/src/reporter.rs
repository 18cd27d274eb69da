//! Diagnostic sink for non-fatal configuration problems.
//!
//! Resolution never aborts on bad input. Instead the offending value is
//! ignored and the problem is handed to an [`ErrorReporter`]. The builder
//! takes the reporter as an injected dependency so tests can substitute
//! [`CapturingReporter`] for the default [`LogReporter`].

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Error;

/// Receives diagnostics emitted while resolving a configuration.
///
/// Implementations must not block and must be safe to share between
/// threads, since independent builds may report concurrently.
pub trait ErrorReporter: Send + Sync {
    /// Report a problem together with context key/value pairs.
    fn report(&self, error: &Error, message: &str, fields: &[(&str, String)]);
}

/// Reporter handle shared between a builder, its options and the selectors
/// they install.
pub type SharedReporter = Arc<dyn ErrorReporter>;

/// Reporter that forwards diagnostics to the `log` facade at error level.
///
/// # Examples
///
/// ```
/// use otlpconf::reporter::{ErrorReporter, LogReporter};
/// use otlpconf::Error;
///
/// let reporter = LogReporter;
/// let err = Error::Validation { field: "endpoint".into(), message: "empty".into() };
/// reporter.report(&err, "resolving endpoint", &[("input", String::new())]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &Error, message: &str, fields: &[(&str, String)]) {
        if fields.is_empty() {
            log::error!("{message}: {error}");
        } else {
            let context = fields
                .iter()
                .map(|(key, value)| format!("{key}={value:?}"))
                .collect::<Vec<_>>()
                .join(" ");
            log::error!("{message}: {error} ({context})");
        }
    }
}

/// A diagnostic recorded by [`CapturingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Rendered error.
    pub error: String,
    /// Whether the error describes a malformed endpoint.
    pub invalid_endpoint: bool,
    /// Environment variable named by the error, if any.
    pub env_var: Option<String>,
    /// Message supplied by the reporting site.
    pub message: String,
    /// Context key/value pairs.
    pub fields: Vec<(String, String)>,
}

impl Report {
    /// Look up a context field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Reporter that records every diagnostic in memory.
///
/// # Examples
///
/// ```
/// use otlpconf::reporter::{CapturingReporter, ErrorReporter};
/// use otlpconf::Error;
///
/// let reporter = CapturingReporter::new();
/// let err = Error::InvalidAggregation { reason: "bad".into() };
/// reporter.report(&err, "using default aggregation instead", &[]);
///
/// let reports = reporter.reports();
/// assert_eq!(reports.len(), 1);
/// assert_eq!(reports[0].message, "using default aggregation instead");
/// ```
#[derive(Debug, Default)]
pub struct CapturingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CapturingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of reports received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for CapturingReporter {
    fn report(&self, error: &Error, message: &str, fields: &[(&str, String)]) {
        let report = Report {
            error: error.to_string(),
            invalid_endpoint: error.is_invalid_endpoint(),
            env_var: error.env_var().map(str::to_string),
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        };
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_capturing_reporter_records_fields() {
        let reporter = CapturingReporter::new();
        assert!(reporter.is_empty());

        let err = Error::InvalidEnvironment {
            var: "OTEL_EXPORTER_OTLP_INSECURE".into(),
            message: "not a boolean".into(),
        };
        reporter.report(&err, "ignoring environment value", &[("value", "maybe".into())]);

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].env_var.as_deref(), Some("OTEL_EXPORTER_OTLP_INSECURE"));
        assert_eq!(reports[0].field("value"), Some("maybe"));
        assert_eq!(reports[0].field("missing"), None);
        assert!(!reports[0].invalid_endpoint);
    }

    #[test]
    fn test_capturing_reporter_is_shareable() {
        let reporter = Arc::new(CapturingReporter::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let reporter = Arc::clone(&reporter);
                thread::spawn(move || {
                    let err = Error::InvalidAggregation {
                        reason: format!("thread {i}"),
                    };
                    reporter.report(&err, "concurrent", &[]);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(reporter.len(), 4);
    }

    #[test]
    fn test_log_reporter_does_not_panic() {
        let err = Error::Validation {
            field: "url_path".into(),
            message: "relative".into(),
        };
        LogReporter.report(&err, "check", &[]);
        LogReporter.report(&err, "check", &[("k", "v".into())]);
    }
}
