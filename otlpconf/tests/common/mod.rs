//! Common test utilities for integration tests.
//!
//! This module provides helpers for tests that touch the process
//! environment or need certificate files on disk.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use otlpconf::config::environment::RECOGNIZED_VARS;
use otlpconf::{CapturingReporter, ConfigBuilder};

/// Self-signed CA certificate used wherever a real PEM file is needed.
#[allow(dead_code)]
pub const TEST_PEM: &str = include_str!("../fixtures/test_ca.pem");

/// RAII guard for setting and restoring environment variables.
///
/// Note: Tests using environment variables should not run in parallel.
/// Use the #[serial] attribute.
pub struct EnvGuard {
    key: String,
    old_value: Option<String>,
}

impl EnvGuard {
    /// Set `key` to `value` until the guard is dropped.
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = env::var(key).ok();
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    /// Remove `key` until the guard is dropped.
    pub fn remove(key: &str) -> Self {
        let old_value = env::var(key).ok();
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => env::set_var(&self.key, val),
            None => env::remove_var(&self.key),
        }
    }
}

/// Clear every exporter variable for the lifetime of the returned guards.
#[allow(dead_code)]
pub fn clear_exporter_env() -> Vec<EnvGuard> {
    RECOGNIZED_VARS.iter().map(|var| EnvGuard::remove(var)).collect()
}

/// Builder with a capturing reporter and no environment layer.
#[allow(dead_code)]
pub fn isolated_builder() -> (ConfigBuilder, Arc<CapturingReporter>) {
    let reporter = Arc::new(CapturingReporter::new());
    let builder = ConfigBuilder::new()
        .skip_env()
        .with_reporter(reporter.clone());
    (builder, reporter)
}

/// Write a PEM file named `name` into `dir`.
#[allow(dead_code)]
pub fn write_pem(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, TEST_PEM).unwrap();
    path
}
