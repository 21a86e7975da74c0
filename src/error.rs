// src/error.rs
// =============================================================================
// Typed errors for the parts of the crawler that can actually fail.
//
// Everything on the hot path (canonicalizing, filtering, politeness, analysis)
// never fails. Errors only come from:
// - loading and validating configuration
// - reading/writing the persisted frontier log
// - setting up the crawl (HTTP client, report file)
//
// main.rs wraps these in anyhow::Error with extra context.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[derive(Error, Debug)]
pub enum FrontierError {
    #[error("frontier log I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt frontier log '{path}' at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("frontier log entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Frontier(#[from] FrontierError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to write report '{path}': {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("crawl state cannot be reset while workers are running")]
    Busy,
}
