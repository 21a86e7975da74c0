// src/urls/canonical.rs
// =============================================================================
// This module turns raw URL strings into canonical URLs.
//
// The canonical form is the identity key used everywhere else in the crawler:
// the frontier's seen-set, the analyzer's dedup gate and the page records all
// key on it. Two raw URLs that canonicalize to the same string are the same
// page.
//
// Rules for any URL with a host:
// - http and https both become https; other schemes are kept
// - host is lower-cased and any leading "www." is removed
// - the fragment (#...) is dropped
// - trailing slashes are dropped, except for the root path "/"
// - a non-empty query string is kept as-is
//
// Anything without a host (unparseable input, mailto:, ...) only loses its
// fragment. canonicalize() never fails.
//
// Rust concepts:
// - url::Url: A parsed URL that already lower-cases hosts and resolves "." / ".."
// - Cow-free string building with String::with_capacity
// =============================================================================

use url::Url;

// Maps a raw URL to its canonical form
//
// Examples:
//   "HTTP://WWW.Example.com/a/"    -> "https://example.com/a"
//   "https://example.com"          -> "https://example.com/"
//   "https://example.com/p?q=1#x"  -> "https://example.com/p?q=1"
//   "not a url#frag"               -> "not a url"
pub fn canonicalize(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => render_url(&parsed),
        _ => strip_fragment(raw).to_string(),
    }
}

// Returns the lower-cased host of a URL, if it has one
//
// Used for per-domain politeness and for per-subdomain page counts.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

fn render_url(parsed: &Url) -> String {
    let web = matches!(parsed.scheme(), "http" | "https");

    let mut out = String::with_capacity(parsed.as_str().len());
    out.push_str(if web { "https" } else { parsed.scheme() });
    out.push_str("://");

    let username = parsed.username();
    if !username.is_empty() {
        out.push_str(username);
        if let Some(password) = parsed.password() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }

    out.push_str(&canonical_host(parsed.host_str().unwrap_or_default()));

    // 443 is the default https port, so keeping it would make the output
    // canonicalize differently a second time
    if let Some(port) = parsed.port() {
        if !(web && port == 443) {
            out.push(':');
            out.push_str(&port.to_string());
        }
    }

    let path = parsed.path();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        out.push('/');
    } else {
        out.push_str(trimmed);
    }

    if let Some(query) = parsed.query() {
        if !query.is_empty() {
            out.push('?');
            out.push_str(query);
        }
    }

    out
}

// Lower-cases a host and strips every leading "www." label
//
// Stripping repeatedly keeps canonicalize() idempotent for hosts like
// "www.www.example.com".
fn canonical_host(host: &str) -> String {
    let mut host = host.to_ascii_lowercase();
    while let Some(rest) = host.strip_prefix("www.") {
        if rest.is_empty() {
            break;
        }
        host = rest.to_string();
    }
    host
}

fn strip_fragment(raw: &str) -> &str {
    match raw.split_once('#') {
        Some((before, _)) => before,
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_host_and_slash_are_normalized() {
        assert_eq!(
            canonicalize("HTTP://WWW.Example.com/a/"),
            canonicalize("https://example.com/a")
        );
        assert_eq!(canonicalize("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_root_path_keeps_its_slash() {
        assert_eq!(canonicalize("http://example.com"), "https://example.com/");
        assert_eq!(canonicalize("http://example.com///"), "https://example.com/");
    }

    #[test]
    fn test_fragment_dropped_and_query_kept() {
        assert_eq!(
            canonicalize("https://www.ics.uci.edu/people/?page=2#top"),
            "https://ics.uci.edu/people?page=2"
        );
        assert_eq!(canonicalize("https://ics.uci.edu/a?"), "https://ics.uci.edu/a");
    }

    #[test]
    fn test_ports() {
        assert_eq!(canonicalize("http://example.com:80/x"), "https://example.com/x");
        assert_eq!(canonicalize("http://example.com:443/x"), "https://example.com/x");
        assert_eq!(canonicalize("https://example.com:8080/x"), "https://example.com:8080/x");
    }

    #[test]
    fn test_other_schemes_keep_scheme_but_normalize_host() {
        assert_eq!(canonicalize("FTP://WWW.Example.com/files/#x"), "ftp://example.com/files");
        assert_eq!(canonicalize("ws://www.Example.com:80/chat/"), "ws://example.com/chat");
        assert_eq!(canonicalize("ws://example.com:443/chat"), "ws://example.com:443/chat");
    }

    #[test]
    fn test_unparseable_input_only_loses_fragment() {
        assert_eq!(canonicalize("/relative/path#frag"), "/relative/path");
        assert_eq!(canonicalize("not a url"), "not a url");
        assert_eq!(canonicalize("mailto:someone@uci.edu#x"), "mailto:someone@uci.edu");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTP://WWW.Example.com/a/",
            "https://www.www.example.com/",
            "http://example.com:443",
            "https://user:pw@Example.com/a//?x=1&y=2#f",
            "https://example.com/a b/c d",
            "https://example.com/%7Euser/",
            "garbage#with#hashes",
            "FTP://WWW.Example.com/files/",
            "custom://www.Host.example/Path/?q#f",
            "",
        ];
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://Vision.ICS.uci.edu/x").as_deref(), Some("vision.ics.uci.edu"));
        assert_eq!(host_of("not a url"), None);
    }
}
