//! Root-domain extraction from website values.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("Invalid scheme regex"));

/// Hostname guess for values the URL parser rejects: skip an optional
/// scheme and userinfo, take everything up to the first separator.
static HOST_GUESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?(?:[^@/?#\s]*@)?([^/:?#\s]+\.[^/:?#\s]+)")
        .expect("Invalid host regex")
});

/// Normalized hostname of a website value.
///
/// `https://` is assumed when no scheme is given. The host is lowercased and
/// a leading `www.` removed. Values no hostname can be read from are
/// returned unchanged; empty input gives an empty string.
///
/// ```ignore
/// assert_eq!(extract_root_domain("https://www.Example.com/path"), "example.com");
/// ```
pub fn extract_root_domain(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    if let Ok(url) = Url::parse(&candidate)
        && let Some(host) = url.host_str()
        && !host.is_empty()
    {
        return normalize_host(host);
    }

    if let Some(host) = HOST_GUESS
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
    {
        return normalize_host(host.as_str());
    }

    value.to_string()
}

fn normalize_host(host: &str) -> String {
    let lower = host.trim_end_matches('.').to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
