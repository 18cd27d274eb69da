//! Common test utilities for CLI integration tests.
//!
//! Every command built here starts from a clean exporter environment, so the
//! developer's own `OTEL_EXPORTER_OTLP_*` settings never leak into a test.

use assert_cmd::Command;
use otlpconf::config::environment::RECOGNIZED_VARS;
use otlpconf::logging::LOG_MODE_ENV;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Self-signed CA certificate used wherever a real PEM file is needed.
#[allow(dead_code)]
pub const TEST_PEM: &str = include_str!("../fixtures/test_ca.pem");

/// Get an otlpconf command with the exporter environment cleared.
pub fn otlpconf() -> Command {
    let mut cmd = Command::cargo_bin("otlpconf").expect("Failed to find otlpconf binary");
    for name in RECOGNIZED_VARS {
        cmd.env_remove(name);
    }
    cmd.env_remove(LOG_MODE_ENV)
        .env_remove("OTLPCONF_TRANSPORT")
        .env_remove("OTLPCONF_OUTPUT_FORMAT");
    cmd
}

/// Run `otlpconf resolve` with extra arguments and parse its JSON output.
#[allow(dead_code)]
pub fn resolve_json(args: &[&str], env: &[(&str, &str)]) -> serde_json::Value {
    let mut cmd = otlpconf();
    cmd.arg("resolve").arg("--format").arg("json").args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.output().expect("Failed to run resolve command");
    assert!(
        output.status.success(),
        "resolve failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("resolve output is not JSON")
}

/// Temporary directory holding certificate fixtures.
#[allow(dead_code)]
pub struct CertDir {
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl CertDir {
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a PEM file and return its path.
    pub fn write_pem(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, TEST_PEM).expect("Failed to write certificate");
        path
    }
}
