//! Language segment insertion and host locality checks
//!
//! A string counts as an absolute URL when `url` parses it and its scheme is
//! not `file` (a bare `/path` never parses without a base). Everything else is
//! handled as a relative reference; nothing here returns an error.

use crate::utils::text::starts_with_ignore_case;
use url::Url;

/// Parse `url` as an absolute, non-file URL
fn parse_absolute(url: &str) -> Option<Url> {
    Url::parse(url).ok().filter(|u| u.scheme() != "file")
}

/// Host plus explicit non-default port, the way an authority is compared
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Split a relative reference into its path and its `?query#fragment` tail
fn split_path(url: &str) -> (&str, &str) {
    match url.find(|c: char| c == '?' || c == '#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

fn prepend_to_path(path: &str, segment: &str) -> String {
    let mut out = String::with_capacity(path.len() + segment.len() + 2);
    if !segment.starts_with('/') {
        out.push('/');
    }
    out.push_str(segment);
    if !path.is_empty() && path != "/" {
        if !path.starts_with('/') {
            out.push('/');
        }
        out.push_str(path);
    }
    out
}

fn strip_from_path(path: &str, segment: &str) -> Option<String> {
    let segment = segment.trim_matches('/');
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (first, rest) = match trimmed.find('/') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    if segment.is_empty() || !first.eq_ignore_ascii_case(segment) {
        return None;
    }
    Some(if rest.is_empty() { "/".to_string() } else { rest.to_string() })
}

/// Insert `/segment` at the front of the URL path.
///
/// ```
/// use nugget_extract::localizer::prepend_path_segment;
///
/// assert_eq!(prepend_path_segment("http://example.com", Some("en")), "http://example.com/en");
/// assert_eq!(prepend_path_segment("/accounts", Some("en")), "/en/accounts");
/// assert_eq!(prepend_path_segment("/", None), "/");
/// ```
///
/// Scheme, host, query and fragment of absolute URLs are kept; default ports
/// are never added. An unset or empty segment returns the URL unchanged, as
/// does an absolute URL without a hierarchical path (`mailto:`).
pub fn prepend_path_segment(url: &str, segment: Option<&str>) -> String {
    let Some(segment) = segment.filter(|s| !s.is_empty()) else {
        return url.to_string();
    };

    match parse_absolute(url) {
        Some(absolute) if absolute.cannot_be_a_base() => url.to_string(),
        Some(mut absolute) => {
            let path = prepend_to_path(absolute.path(), segment);
            absolute.set_path(&path);
            absolute.to_string()
        }
        None => prepend_to_path(url, segment),
    }
}

/// Remove a leading path segment equal to `segment` (ASCII case-insensitive).
///
/// Returns `None` when the URL does not start with that segment.
pub fn strip_path_segment(url: &str, segment: &str) -> Option<String> {
    match parse_absolute(url) {
        Some(absolute) if absolute.cannot_be_a_base() => None,
        Some(mut absolute) => {
            let path = strip_from_path(absolute.path(), segment)?;
            absolute.set_path(&path);
            Some(absolute.to_string())
        }
        None => {
            let (path, tail) = split_path(url);
            let path = strip_from_path(path, segment)?;
            Some(format!("{}{}", path, tail))
        }
    }
}

/// First non-empty path segment of an absolute or relative URL
pub fn extract_first_segment(url: &str) -> Option<String> {
    let path = match parse_absolute(url) {
        Some(absolute) if absolute.cannot_be_a_base() => return None,
        Some(absolute) => absolute.path().to_string(),
        None => split_path(url).0.to_string(),
    };
    path.split('/')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Whether `candidate` addresses the same host as `base`.
///
/// Absolute candidates compare authority (host and non-default port) without
/// regard to case. Relative candidates are local when well formed. Anything
/// doubtful, including an unset candidate, is not local.
pub fn is_local(base: &Url, candidate: Option<&str>) -> bool {
    let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
        return false;
    };

    if let Ok(absolute) = Url::parse(candidate) {
        return authority(&absolute).eq_ignore_ascii_case(&authority(base));
    }

    !starts_with_ignore_case(candidate, "http:")
        && !starts_with_ignore_case(candidate, "https:")
        && is_well_formed_relative(candidate)
        && base.join(candidate).is_ok()
}

/// Relative reference check: no network-path prefix, no whitespace, control
/// characters or backslashes, and only complete percent escapes.
fn is_well_formed_relative(candidate: &str) -> bool {
    if candidate.starts_with("//") {
        return false;
    }
    if candidate
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '\\')
    {
        return false;
    }

    let bytes = candidate.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com").unwrap()
    }

    #[test]
    fn test_prepend_absolute() {
        assert_eq!(prepend_path_segment("http://example.com", Some("en")), "http://example.com/en");
        assert_eq!(prepend_path_segment("http://example.com/", Some("en")), "http://example.com/en");
        assert_eq!(
            prepend_path_segment("http://example.com/accounts", Some("en")),
            "http://example.com/en/accounts"
        );
    }

    #[test]
    fn test_prepend_keeps_query_fragment_and_port() {
        assert_eq!(
            prepend_path_segment("https://Example.com:8443/a/b?x=1#top", Some("fr")),
            "https://example.com:8443/fr/a/b?x=1#top"
        );
        assert_eq!(
            prepend_path_segment("http://example.com:80/a", Some("fr")),
            "http://example.com/fr/a"
        );
    }

    #[test]
    fn test_prepend_relative() {
        assert_eq!(prepend_path_segment("/", Some("en")), "/en");
        assert_eq!(prepend_path_segment("", Some("en")), "/en");
        assert_eq!(prepend_path_segment("/accounts", Some("en")), "/en/accounts");
        assert_eq!(prepend_path_segment("accounts/login", Some("en")), "/en/accounts/login");
        assert_eq!(prepend_path_segment("/accounts", Some("/en")), "/en/accounts");
    }

    #[test]
    fn test_prepend_without_segment_is_noop() {
        assert_eq!(prepend_path_segment("/accounts", None), "/accounts");
        assert_eq!(prepend_path_segment("http://example.com/a", Some("")), "http://example.com/a");
    }

    #[test]
    fn test_prepend_opaque_url_unchanged() {
        assert_eq!(prepend_path_segment("mailto:me@example.com", Some("en")), "mailto:me@example.com");
    }

    #[test]
    fn test_strip_segment() {
        assert_eq!(strip_path_segment("/en/accounts", "en").as_deref(), Some("/accounts"));
        assert_eq!(strip_path_segment("/EN", "en").as_deref(), Some("/"));
        assert_eq!(strip_path_segment("/en?x=1", "en").as_deref(), Some("/?x=1"));
        assert_eq!(
            strip_path_segment("http://example.com/en/a?b=c", "en").as_deref(),
            Some("http://example.com/a?b=c")
        );
        assert_eq!(strip_path_segment("/english/a", "en"), None);
        assert_eq!(strip_path_segment("/fr/a", "en"), None);
    }

    #[test]
    fn test_extract_first_segment() {
        assert_eq!(extract_first_segment("/fr-CA/home").as_deref(), Some("fr-CA"));
        assert_eq!(extract_first_segment("http://example.com/de?x").as_deref(), Some("de"));
        assert_eq!(extract_first_segment("/"), None);
        assert_eq!(extract_first_segment("http://example.com"), None);
    }

    #[test]
    fn test_is_local_relative() {
        assert!(is_local(&base(), Some("/accounts")));
        assert!(is_local(&base(), Some("accounts?x=1")));
        assert!(!is_local(&base(), Some("//other.com/x")));
        assert!(!is_local(&base(), Some("/a b")));
        assert!(!is_local(&base(), Some("/bad%zz")));
        assert!(!is_local(&base(), Some("/\\evil.com")));
    }

    #[test]
    fn test_is_local_absolute() {
        assert!(!is_local(&base(), Some("http://other.com/x")));
        assert!(is_local(&base(), Some("https://example.com/x")));
        assert!(is_local(&base(), Some("HTTP://EXAMPLE.COM/y")));
        assert!(!is_local(&base(), Some("http://example.com:8080/x")));
        assert!(!is_local(&base(), Some("javascript:alert(1)")));
    }

    #[test]
    fn test_is_local_unset() {
        assert!(!is_local(&base(), None));
        assert!(!is_local(&base(), Some("")));
        assert!(!is_local(&base(), Some("http:")));
    }
}
