//! Property-based tests for configuration resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::builder::ConfigBuilder;
use super::option::{
    with_compression, with_endpoint, with_grpc_credentials, with_headers, with_insecure,
    with_reconnection_period, with_secure, with_service_config, with_timeout,
    with_tls_client_config, with_url_path, ConfigOption,
};
use super::validator::ConfigValidator;
use crate::reporter::CapturingReporter;
use crate::transport::{Compression, DialOption, TlsConfig, Transport, TransportCredentials};
use proptest::prelude::*;

/// A setter option in printable form, so failures shrink to readable cases.
#[derive(Debug, Clone)]
enum Op {
    Endpoint(String),
    Insecure,
    Secure,
    Gzip(bool),
    UrlPath(String),
    Timeout(u64),
    Headers(HashMap<String, String>),
    Reconnect(u64),
    ServiceConfig(String),
    CustomTls,
    InsecureCredentials,
}

impl Op {
    fn to_option(&self) -> ConfigOption {
        match self {
            Self::Endpoint(e) => with_endpoint(e.clone()),
            Self::Insecure => with_insecure(),
            Self::Secure => with_secure(),
            Self::Gzip(on) => with_compression(if *on {
                Compression::Gzip
            } else {
                Compression::None
            }),
            Self::UrlPath(p) => with_url_path(p.clone()),
            Self::Timeout(ms) => with_timeout(Duration::from_millis(*ms)),
            Self::Headers(h) => with_headers(h.clone()),
            Self::Reconnect(ms) => with_reconnection_period(Duration::from_millis(*ms)),
            Self::ServiceConfig(s) => with_service_config(s.clone()),
            Self::CustomTls => with_tls_client_config(TlsConfig {
                ca_certificate_pem: Some(b"-----BEGIN CERTIFICATE-----".to_vec()),
                server_name: None,
            }),
            Self::InsecureCredentials => with_grpc_credentials(TransportCredentials::Insecure),
        }
    }
}

// Ports include the scheme defaults, which must survive as written.
fn endpoint_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,10}(\\.[a-z]{2,5})?",
        prop::option::of(prop_oneof![Just(80u16), Just(443u16), 1000u16..9000]),
        "(/[a-z]{1,5}){0,2}",
    )
        .prop_map(|(host, port, path)| match port {
            Some(port) => format!("{host}:{port}{path}"),
            None => format!("{host}{path}"),
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        endpoint_strategy().prop_map(Op::Endpoint),
        Just(Op::Insecure),
        Just(Op::Secure),
        any::<bool>().prop_map(Op::Gzip),
        "[a-z./ ]{0,12}".prop_map(Op::UrlPath),
        (0u64..60_000).prop_map(Op::Timeout),
        prop::collection::hash_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..4).prop_map(Op::Headers),
        (0u64..10_000).prop_map(Op::Reconnect),
        "[a-z{}:\"]{0,10}".prop_map(Op::ServiceConfig),
        Just(Op::CustomTls),
        Just(Op::InsecureCredentials),
    ]
}

fn builder_for(ops: &[Op]) -> ConfigBuilder {
    ConfigBuilder::new()
        .skip_env()
        .with_reporter(Arc::new(CapturingReporter::new()))
        .with_options(ops.iter().map(Op::to_option))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Every gRPC build passes validation: one credential, no duplicates
    #[test]
    fn grpc_build_is_always_valid(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let config = builder_for(&ops).build_grpc();
        prop_assert!(ConfigValidator::validate(&config, Transport::Grpc).is_ok(), "{config:?}");

        let credentials = config
            .dial_options
            .iter()
            .filter(|o| matches!(o, DialOption::TransportCredentials(_)))
            .count();
        prop_assert_eq!(credentials, 1);
    }

    // HTTP builds validate and never carry dial options
    #[test]
    fn http_build_is_always_valid(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let config = builder_for(&ops).build_http();
        prop_assert!(config.dial_options.is_empty());
        prop_assert!(ConfigValidator::validate(&config, Transport::Http).is_ok(), "{config:?}");
    }

    // The URL path is absolute after any build
    #[test]
    fn url_path_is_absolute(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let b = builder_for(&ops);
        prop_assert!(b.build_http().metrics.url_path.starts_with('/'));
        prop_assert!(b.build_grpc().metrics.url_path.starts_with('/'));
    }

    // Applying a list of setters twice resolves to the same configuration
    #[test]
    fn setter_lists_are_idempotent(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let twice: Vec<Op> = ops.iter().chain(ops.iter()).cloned().collect();
        prop_assert_eq!(builder_for(&ops).build_http(), builder_for(&twice).build_http());
        prop_assert_eq!(builder_for(&ops).build_grpc(), builder_for(&twice).build_grpc());
    }

    // Credential precedence: explicit, then insecure, then system TLS
    #[test]
    fn credential_precedence(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let config = builder_for(&ops).build_grpc();

        let explicit = ops.iter().rev().find_map(|op| match op {
            Op::CustomTls | Op::InsecureCredentials => Some(op.clone()),
            _ => None,
        });
        let insecure = ops
            .iter()
            .rev()
            .find_map(|op| match op {
                Op::Insecure => Some(true),
                Op::Secure => Some(false),
                _ => None,
            })
            .unwrap_or(false);

        let chosen = config.transport_credentials().cloned();
        match explicit {
            Some(Op::InsecureCredentials) => {
                prop_assert_eq!(chosen, Some(TransportCredentials::Insecure));
            }
            Some(_) => {
                prop_assert!(matches!(chosen, Some(TransportCredentials::Tls(ref t)) if !t.uses_system_roots()));
            }
            None if insecure => {
                prop_assert_eq!(chosen, Some(TransportCredentials::Insecure));
            }
            None => {
                prop_assert_eq!(chosen, Some(TransportCredentials::new_tls(None)));
                prop_assert_eq!(
                    config.metrics.grpc_credentials,
                    Some(TransportCredentials::new_tls(None))
                );
            }
        }
    }

    // The resolved endpoint is the host and port exactly as written
    #[test]
    fn endpoint_authority_is_kept_as_written(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let written = ops.iter().rev().find_map(|op| match op {
            Op::Endpoint(e) => Some(e.split('/').next().unwrap_or_default().to_string()),
            _ => None,
        });
        if let Some(written) = written {
            prop_assert_eq!(builder_for(&ops).build_http().metrics.endpoint, written);
        }
    }

    // The last header option replaces the map wholesale
    #[test]
    fn last_headers_win(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let expected = ops
            .iter()
            .rev()
            .find_map(|op| match op {
                Op::Headers(h) => Some(h.clone()),
                _ => None,
            })
            .unwrap_or_default();
        prop_assert_eq!(builder_for(&ops).build_http().metrics.headers, expected);
    }
}
