//! Property-based tests for path cleaning and scheme detection.

use super::normalize::{clean_path, has_scheme, join_path};
use proptest::prelude::*;

const DEFAULT: &str = "/v1/metrics";

// Segments mixing ordinary names with "." and ".." references
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".".to_string()),
        Just("..".to_string()),
        "[a-z0-9_-]{1,8}",
    ]
}

fn raw_path_strategy() -> impl Strategy<Value = String> {
    (any::<bool>(), prop::collection::vec(segment_strategy(), 0..8)).prop_map(
        |(rooted, segments)| {
            let joined = segments.join("/");
            if rooted {
                format!("/{joined}")
            } else {
                joined
            }
        },
    )
}

fn scheme_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9+.-]{0,10}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 10000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // The cleaned path is always absolute when the default is absolute
    #[test]
    fn clean_path_always_absolute(raw in raw_path_strategy()) {
        prop_assert!(clean_path(&raw, DEFAULT).starts_with('/'));
    }

    // Cleaning a rooted path twice gives the same result as cleaning once.
    // Relative inputs with a leading ".." are excluded: the first pass roots
    // them, and the second pass then drops the "..".
    #[test]
    fn clean_path_idempotent(raw in raw_path_strategy()) {
        let rooted = format!("/{raw}");
        let once = clean_path(&rooted, DEFAULT);
        let twice = clean_path(&once, DEFAULT);
        prop_assert_eq!(once, twice);
    }

    // Rooted inputs never keep "." or ".." segments or empty segments
    #[test]
    fn clean_rooted_path_has_no_dot_segments(raw in raw_path_strategy()) {
        let rooted = format!("/{raw}");
        let cleaned = clean_path(&rooted, DEFAULT);
        if cleaned != "/" {
            for segment in cleaned[1..].split('/') {
                prop_assert!(segment != "." && segment != ".." && !segment.is_empty());
            }
        }
    }

    // Surrounding whitespace never changes the outcome
    #[test]
    fn clean_path_ignores_surrounding_whitespace(
        raw in raw_path_strategy(),
        before in "[ \\t]{0,3}",
        after in "[ \\t]{0,3}",
    ) {
        let padded = format!("{before}{raw}{after}");
        prop_assert_eq!(clean_path(&padded, DEFAULT), clean_path(&raw, DEFAULT));
    }

    // Any well-formed scheme followed by "://" is detected
    #[test]
    fn has_scheme_detects_wellformed_schemes(scheme in scheme_strategy(), rest in "[a-z0-9.:/]{0,20}") {
        let candidate = format!("{scheme}://{rest}");
        prop_assert!(has_scheme(&candidate));
        prop_assert!(has_scheme(&candidate.to_uppercase()));
    }

    // host:port strings without "://" never look like they carry a scheme
    #[test]
    fn has_scheme_rejects_host_port(host in "[a-z][a-z0-9.-]{0,20}", port in 1u16..=65535) {
        let candidate = format!("{host}:{port}");
        prop_assert!(!has_scheme(&candidate));
    }

    // Joining a plain base with the default path always ends with the default
    #[test]
    fn join_path_keeps_default_suffix(base in prop::collection::vec("[a-z0-9_-]{1,8}", 0..5)) {
        let base = format!("/{}", base.join("/"));
        let joined = join_path(&[&base, DEFAULT]);
        prop_assert!(joined.ends_with(DEFAULT));
        prop_assert!(joined.starts_with('/'));
    }
}
