//! Retry policy handed to the export retry executor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential-backoff retry policy.
///
/// The configuration layer only stores this value; retries are executed by
/// the transport.
///
/// # Examples
///
/// ```
/// use otlpconf::retry::RetryConfig;
/// use std::time::Duration;
///
/// let retry = RetryConfig::default();
/// assert!(retry.enabled);
/// assert_eq!(retry.initial_interval, Duration::from_secs(5));
///
/// let off = RetryConfig::disabled();
/// assert!(!off.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Whether failed exports are retried at all.
    pub enabled: bool,
    /// Delay before the first retry.
    #[serde(with = "duration_ms")]
    pub initial_interval: Duration,
    /// Upper bound for a single backoff delay.
    #[serde(with = "duration_ms")]
    pub max_interval: Duration,
    /// Total time after which retrying stops.
    #[serde(with = "duration_ms")]
    pub max_elapsed_time: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            max_elapsed_time: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
