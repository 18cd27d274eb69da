//! Integration tests for the `env` command.

mod common;

use common::otlpconf;
use predicates::prelude::*;

#[test]
fn test_env_lists_all_variables() {
    otlpconf()
        .env("OTEL_EXPORTER_OTLP_TIMEOUT", "2500")
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("OTEL_EXPORTER_OTLP_TIMEOUT=2500"))
        .stdout(predicate::str::contains("OTEL_EXPORTER_OTLP_ENDPOINT (unset)"))
        .stdout(predicate::str::contains(
            "OTEL_EXPORTER_OTLP_METRICS_TEMPORALITY_PREFERENCE",
        ));
}

#[test]
fn test_env_set_only_json() {
    let output = otlpconf()
        .env("OTEL_EXPORTER_OTLP_INSECURE", "true")
        .args(["env", "--set-only", "--format", "json"])
        .output()
        .expect("Failed to run env command");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "OTEL_EXPORTER_OTLP_INSECURE");
    assert_eq!(entries[0]["value"], "true");
}

#[test]
fn test_env_set_only_empty_prints_nothing() {
    otlpconf()
        .args(["env", "--set-only"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_env_ignores_unrelated_variables() {
    otlpconf()
        .env("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT", "http://traces:4318")
        .args(["env", "--set-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TRACES").not());
}
