// src/fetch/links.rs
// =============================================================================
// This module extracts outgoing links from a downloaded page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses
//
// Link rules:
// - relative hrefs are resolved against the URL the page was actually
//   served from (after redirects), not the URL we asked for
// - fragments (#...) are dropped
// - a "?" query with no "=" or "&" anywhere in the URL is dropped too
//
// Filtering (allowed hosts, extensions, ...) happens later in UrlPolicy.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use super::http::Response;

// Extracts all links from a downloaded page
//
// Parameters:
//   url: the URL we asked for (used when the response has no final URL)
//   response: the downloaded page
//
// Returns: absolute URLs in document order; empty when the page has no
// usable content
pub fn extract_next_links(url: &str, response: &Response) -> Vec<String> {
    let mut links = Vec::new();

    let Some(content) = response.page_content() else {
        return links;
    };
    if content.is_empty() {
        return links;
    }

    let base_url = if response.url.is_empty() { url } else { response.url.as_str() };
    let Ok(base) = Url::parse(base_url) else {
        return links;
    };

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    let html = String::from_utf8_lossy(content);
    let document = Html::parse_document(&html);

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve_link(&base, href) {
                links.push(link);
            }
        }
    }

    links
}

// Resolves an href against the page URL and applies the link rules
//
// Examples (base = "https://cs.uci.edu/dir/page"):
//   "/docs"             -> Some("https://cs.uci.edu/docs")
//   "other#part"        -> Some("https://cs.uci.edu/dir/other")
//   "/search?"          -> Some("https://cs.uci.edu/search")
//   "/list?sort"        -> Some("https://cs.uci.edu/list")
//   "/list?sort=asc"    -> Some("https://cs.uci.edu/list?sort=asc")
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href.trim()).ok()?;
    resolved.set_fragment(None);

    let mut link = resolved.to_string();
    if link.contains('?') && !link.contains('=') && !link.contains('&') {
        if let Some(cut) = link.find('?') {
            link.truncate(cut);
        }
    }
    Some(link)
}
