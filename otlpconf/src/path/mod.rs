//! URL path normalization for collector endpoints.
//!
//! Collector URLs are built from a host, an optional base path and a
//! per-signal suffix. This module provides the purely lexical helpers used to
//! combine and clean those pieces:
//!
//! - [`normalize::clean_path`] cleans a path against a fallback default
//! - [`normalize::has_scheme`] detects a leading `scheme://`
//! - [`normalize::join_path`] joins path segments the way a URL joiner would
//!
//! # Examples
//!
//! ```
//! use otlpconf::path::{clean_path, has_scheme, join_path};
//!
//! let base = "/prefix";
//! let joined = join_path(&[base, "/v1/metrics"]);
//! assert_eq!(clean_path(&joined, "/v1/metrics"), "/prefix/v1/metrics");
//! assert!(!has_scheme("collector:4318"));
//! ```

pub mod normalize;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use normalize::{clean_path, has_scheme, join_path};
