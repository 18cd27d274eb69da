//! Metric SDK contracts consumed by the exporter configuration.
//!
//! The configuration never interprets temporality or aggregation; it only
//! stores the selector functions the metric reader will call. The types here
//! are the minimal surface those selectors need, plus the SDK defaults.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of instrument a selector is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Synchronous monotonic counter.
    Counter,
    /// Synchronous non-monotonic counter.
    UpDownCounter,
    /// Synchronous histogram.
    Histogram,
    /// Asynchronous monotonic counter.
    ObservableCounter,
    /// Asynchronous non-monotonic counter.
    ObservableUpDownCounter,
    /// Asynchronous gauge.
    ObservableGauge,
}

impl InstrumentKind {
    /// Every instrument kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Counter,
        Self::UpDownCounter,
        Self::Histogram,
        Self::ObservableCounter,
        Self::ObservableUpDownCounter,
        Self::ObservableGauge,
    ];
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Counter => "counter",
            Self::UpDownCounter => "up_down_counter",
            Self::Histogram => "histogram",
            Self::ObservableCounter => "observable_counter",
            Self::ObservableUpDownCounter => "observable_up_down_counter",
            Self::ObservableGauge => "observable_gauge",
        };
        f.write_str(name)
    }
}

/// Aggregation temporality reported for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temporality {
    /// Values accumulate from the start of the process.
    Cumulative,
    /// Values cover only the last collection interval.
    Delta,
}

impl fmt::Display for Temporality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cumulative => write!(f, "cumulative"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

/// Explicit bucket boundaries used by the default histogram aggregation.
pub const DEFAULT_HISTOGRAM_BOUNDARIES: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2500.0, 5000.0,
    7500.0, 10000.0,
];

/// How measurements of an instrument are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    /// Measurements are dropped.
    Drop,
    /// The SDK picks the aggregation for the instrument kind.
    Default,
    /// Arithmetic sum.
    Sum,
    /// Last recorded value.
    LastValue,
    /// Histogram with explicit bucket boundaries.
    ExplicitBucketHistogram {
        /// Strictly increasing, finite upper bounds.
        boundaries: Vec<f64>,
        /// Skip min/max tracking.
        no_min_max: bool,
    },
    /// Base-2 exponential histogram.
    Base2ExponentialHistogram {
        /// Maximum number of buckets.
        max_size: u32,
        /// Maximum scale factor, between -10 and 20.
        max_scale: i32,
        /// Skip min/max tracking.
        no_min_max: bool,
    },
}

impl Aggregation {
    /// Check that the aggregation is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAggregation`] when histogram boundaries are not
    /// finite and strictly increasing, or when exponential histogram
    /// parameters are out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use otlpconf::metric::Aggregation;
    ///
    /// let ok = Aggregation::ExplicitBucketHistogram { boundaries: vec![1.0, 2.0], no_min_max: false };
    /// assert!(ok.validate().is_ok());
    ///
    /// let bad = Aggregation::ExplicitBucketHistogram { boundaries: vec![2.0, 1.0], no_min_max: false };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ExplicitBucketHistogram { boundaries, .. } => {
                if boundaries.iter().any(|b| !b.is_finite()) {
                    return Err(Error::InvalidAggregation {
                        reason: "histogram boundaries must be finite".to_string(),
                    });
                }
                if boundaries.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(Error::InvalidAggregation {
                        reason: format!(
                            "histogram boundaries must be strictly increasing: {boundaries:?}"
                        ),
                    });
                }
                Ok(())
            }
            Self::Base2ExponentialHistogram {
                max_size,
                max_scale,
                ..
            } => {
                if !(-10..=20).contains(max_scale) {
                    return Err(Error::InvalidAggregation {
                        reason: format!("max_scale {max_scale} outside -10..=20"),
                    });
                }
                if *max_size < 2 {
                    return Err(Error::InvalidAggregation {
                        reason: format!("max_size {max_size} must be at least 2"),
                    });
                }
                Ok(())
            }
            Self::Drop | Self::Default | Self::Sum | Self::LastValue => Ok(()),
        }
    }
}

/// Chooses the temporality for an instrument kind.
pub type TemporalitySelector = Arc<dyn Fn(InstrumentKind) -> Temporality + Send + Sync>;

/// Chooses the aggregation for an instrument kind.
pub type AggregationSelector = Arc<dyn Fn(InstrumentKind) -> Aggregation + Send + Sync>;

/// Cumulative temporality for every instrument.
#[must_use]
pub fn cumulative_temporality(_kind: InstrumentKind) -> Temporality {
    Temporality::Cumulative
}

/// Delta temporality for monotonic counters and histograms.
#[must_use]
pub fn delta_temporality(kind: InstrumentKind) -> Temporality {
    match kind {
        InstrumentKind::Counter
        | InstrumentKind::Histogram
        | InstrumentKind::ObservableCounter => Temporality::Delta,
        InstrumentKind::UpDownCounter
        | InstrumentKind::ObservableUpDownCounter
        | InstrumentKind::ObservableGauge => Temporality::Cumulative,
    }
}

/// Delta only for synchronous counters and histograms.
#[must_use]
pub fn low_memory_temporality(kind: InstrumentKind) -> Temporality {
    match kind {
        InstrumentKind::Counter | InstrumentKind::Histogram => Temporality::Delta,
        InstrumentKind::UpDownCounter
        | InstrumentKind::ObservableCounter
        | InstrumentKind::ObservableUpDownCounter
        | InstrumentKind::ObservableGauge => Temporality::Cumulative,
    }
}

/// The SDK default aggregation for an instrument kind.
#[must_use]
pub fn default_aggregation(kind: InstrumentKind) -> Aggregation {
    match kind {
        InstrumentKind::Counter
        | InstrumentKind::UpDownCounter
        | InstrumentKind::ObservableCounter
        | InstrumentKind::ObservableUpDownCounter => Aggregation::Sum,
        InstrumentKind::ObservableGauge => Aggregation::LastValue,
        InstrumentKind::Histogram => Aggregation::ExplicitBucketHistogram {
            boundaries: DEFAULT_HISTOGRAM_BOUNDARIES.to_vec(),
            no_min_max: false,
        },
    }
}

/// Shared selector returning [`cumulative_temporality`].
///
/// Every call hands out the same handle, so configurations built from
/// defaults compare equal.
#[must_use]
pub fn default_temporality_selector() -> TemporalitySelector {
    static SELECTOR: OnceLock<TemporalitySelector> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| Arc::new(cumulative_temporality)))
}

/// Shared selector returning [`default_aggregation`].
#[must_use]
pub fn default_aggregation_selector() -> AggregationSelector {
    static SELECTOR: OnceLock<AggregationSelector> = OnceLock::new();
    Arc::clone(SELECTOR.get_or_init(|| Arc::new(default_aggregation)))
}
