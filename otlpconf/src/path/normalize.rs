//! Lexical path and URL-shape helpers.
//!
//! These functions work on `/`-separated strings only. They never touch the
//! filesystem and never parse URLs: a scheme embedded in a path is treated as
//! ordinary path text.

/// Lexically clean a `/`-separated path.
///
/// Repeated separators and `.` segments are dropped, `..` removes the segment
/// before it, and a `..` at the start of a rooted path is discarded. A path
/// that cleans to nothing is returned as `"."`.
///
/// # Examples
///
/// ```
/// use otlpconf::path::normalize::lexical_clean;
///
/// assert_eq!(lexical_clean("/a/./b/../c"), "/a/c");
/// assert_eq!(lexical_clean("a//b/"), "a/b");
/// assert_eq!(lexical_clean("/.."), "/");
/// assert_eq!(lexical_clean("../a"), "../a");
/// assert_eq!(lexical_clean("dir/.."), ".");
/// ```
#[must_use]
pub fn lexical_clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Clean a URL path, falling back to `default_path` when nothing is left.
///
/// Whitespace is trimmed first. An empty input, or one that cleans to `"."`,
/// yields `default_path` unchanged. Any other result is made absolute.
///
/// # Examples
///
/// ```
/// use otlpconf::path::normalize::clean_path;
///
/// assert_eq!(clean_path("", "/v1/metrics"), "/v1/metrics");
/// assert_eq!(clean_path(" /dir", "/v1/metrics"), "/dir");
/// assert_eq!(clean_path("dir/..", "/v1/metrics"), "/v1/metrics");
/// assert_eq!(clean_path("dir/a", "/v1/metrics"), "/dir/a");
///
/// // Schemes are not special: the string is treated as a path.
/// assert_eq!(clean_path("https://env_endpoint", "/v1/metrics"), "/https:/env_endpoint");
/// ```
#[must_use]
pub fn clean_path(raw_path: &str, default_path: &str) -> String {
    let trimmed = raw_path.trim();
    if trimmed.is_empty() {
        return default_path.to_string();
    }

    let cleaned = lexical_clean(trimmed);
    if cleaned == "." {
        return default_path.to_string();
    }

    if cleaned.starts_with('/') {
        cleaned
    } else {
        format!("/{cleaned}")
    }
}

/// Report whether `candidate` starts with a URI scheme followed by `://`.
///
/// The scheme must begin with an ASCII letter and may continue with letters,
/// digits, `+`, `-` or `.`. Case is irrelevant and the scheme value itself is
/// not checked against any list of supported schemes.
///
/// # Examples
///
/// ```
/// use otlpconf::path::normalize::has_scheme;
///
/// assert!(has_scheme("https://127.0.0.1:4318"));
/// assert!(has_scheme("HtTp://collector"));
/// assert!(has_scheme("ftp://collector"));
/// assert!(!has_scheme("localhost:4318"));
/// ```
#[must_use]
pub fn has_scheme(candidate: &str) -> bool {
    let Some((scheme, _)) = candidate.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Join path elements with `/` and clean the result.
///
/// Empty elements are ignored; if every element is empty the result is the
/// empty string.
///
/// # Examples
///
/// ```
/// use otlpconf::path::normalize::join_path;
///
/// assert_eq!(join_path(&["/base", "/v1/metrics"]), "/base/v1/metrics");
/// assert_eq!(join_path(&["/", "/v1/metrics"]), "/v1/metrics");
/// assert_eq!(join_path(&["collector:4317", "/"]), "collector:4317");
/// assert_eq!(join_path(&["", ""]), "");
/// ```
#[must_use]
pub fn join_path(elements: &[&str]) -> String {
    let parts: Vec<&str> = elements.iter().copied().filter(|e| !e.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    lexical_clean(&parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "/v1/metrics";

    #[test]
    fn test_clean_path_empty_uses_default() {
        assert_eq!(clean_path("", "DefaultPath"), "DefaultPath");
        assert_eq!(clean_path("   ", "DefaultPath"), "DefaultPath");
    }

    #[test]
    fn test_clean_path_already_clean() {
        assert_eq!(clean_path("/prefix/v1/metrics", DEFAULT), "/prefix/v1/metrics");
    }

    #[test]
    fn test_clean_path_scheme_is_plain_text() {
        assert_eq!(
            clean_path("https://env_endpoint", "DefaultTracesPath"),
            "/https:/env_endpoint"
        );
    }

    #[test]
    fn test_clean_path_trims_whitespace() {
        assert_eq!(clean_path(" /dir", ""), "/dir");
        assert_eq!(clean_path("\t/dir/sub \n", ""), "/dir/sub");
    }

    #[test]
    fn test_clean_path_resolves_to_nothing() {
        assert_eq!(clean_path("dir/..", "DefaultTracesPath"), "DefaultTracesPath");
        assert_eq!(clean_path(".", DEFAULT), DEFAULT);
        assert_eq!(clean_path("./a/..", DEFAULT), DEFAULT);
    }

    #[test]
    fn test_clean_path_made_absolute() {
        assert_eq!(clean_path("dir/a", ""), "/dir/a");
    }

    #[test]
    fn test_clean_path_rooted_parent_collapses_to_root() {
        assert_eq!(clean_path("/..", DEFAULT), "/");
        assert_eq!(clean_path("/", DEFAULT), "/");
    }

    #[test]
    fn test_clean_path_leading_parent_kept_on_relative() {
        assert_eq!(clean_path("../x", DEFAULT), "/../x");
    }

    #[test]
    fn test_clean_path_collapses_separators() {
        assert_eq!(clean_path("//a///b//", DEFAULT), "/a/b");
    }

    #[test]
    fn test_has_scheme_cases() {
        assert!(!has_scheme("localhost:3422"));
        assert!(has_scheme("https://127.0.0.1:3422"));
        assert!(has_scheme("HtTpS://127.0.0.1:3422"));
        assert!(has_scheme("http://127.0.0.1:3422"));
        assert!(has_scheme("HtTp://127.0.0.1:3422"));
        assert!(has_scheme("ftp://127.0.0.1:3422"));
    }

    #[test]
    fn test_has_scheme_rejects_malformed_schemes() {
        assert!(!has_scheme("://host"));
        assert!(!has_scheme("1http://host"));
        assert!(!has_scheme("ht tp://host"));
        assert!(!has_scheme("localhost:4318/x://y"));
        assert!(has_scheme("svc+grpc.v1-beta://host"));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["", DEFAULT]), DEFAULT);
        assert_eq!(join_path(&["/base", DEFAULT]), "/base/v1/metrics");
        assert_eq!(join_path(&["/base/", DEFAULT]), "/base/v1/metrics");
        assert_eq!(join_path(&["collector:4317", ""]), "collector:4317");
        assert_eq!(join_path(&["collector:4317", "/prefix"]), "collector:4317/prefix");
    }
}
