// src/urls/policy.rs
// =============================================================================
// This module decides whether a discovered link is worth crawling.
//
// A link is rejected when:
// 1. It is longer than the configured cap (200 characters by default)
// 2. Its scheme is not http or https
// 3. Its host is not in the allow-list (case-insensitive)
// 4. Its path ends in a binary/media/archive/document extension
// 5. Its path has too many "/"-separated segments (a common crawl trap)
//
// The check never fails: anything we cannot parse is simply rejected.
//
// Rust concepts:
// - regex::Regex: Compiled once, matched many times
// - HashSet<String>: O(1) allow-list lookup
// =============================================================================

use regex::Regex;
use std::collections::HashSet;
use url::Url;

use crate::config::Config;
use crate::error::ConfigError;

// The compiled crawl policy, shared read-only by every worker
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_hosts: HashSet<String>,
    disallowed_extensions: Regex,
    max_url_length: usize,
    max_path_segments: usize,
}

impl UrlPolicy {
    pub fn new(
        allowed_hosts: &[String],
        disallowed_extensions: &str,
        max_url_length: usize,
        max_path_segments: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            allowed_hosts: allowed_hosts
                .iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .collect(),
            disallowed_extensions: Regex::new(disallowed_extensions)?,
            max_url_length,
            max_path_segments,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            &config.allowed_domains,
            &config.disallowed_extensions,
            config.max_url_length,
            config.max_path_segments,
        )
        .map_err(|e| ConfigError::Invalid(vec![format!("disallowed_extensions: {e}")]))
    }

    // Returns true if the URL should be enqueued
    pub fn is_valid(&self, url: &str) -> bool {
        if url.chars().count() > self.max_url_length {
            return false;
        }

        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        // An explicit non-default port has to be allow-listed as host:port
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host.to_ascii_lowercase(), port),
            (Some(host), None) => host.to_ascii_lowercase(),
            (None, _) => return false,
        };
        if !self.allowed_hosts.contains(&host) {
            return false;
        }

        let path = parsed.path().to_lowercase();
        if self.disallowed_extensions.is_match(&path) {
            return false;
        }

        if path.split('/').count() > self.max_path_segments {
            return false;
        }

        true
    }
}
