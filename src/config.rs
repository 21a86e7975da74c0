// src/config.rs
// =============================================================================
// This file holds the crawl-wide configuration.
//
// Where values come from, lowest priority first:
// 1. Built-in defaults (a polite single-worker crawl of the UCI departments)
// 2. An optional TOML file (--config crawler.toml)
// 3. Command-line flags (see cli.rs)
//
// After those are merged, validate() checks everything at once and the result
// is frozen behind an Arc<Config> for the rest of the run.
//
// Rust concepts:
// - #[serde(default)]: Missing keys fall back to Config::default()
// - Option<f64>: "maybe a delay"; None means no throttling at all
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::CrawlArgs;
use crate::error::ConfigError;

// One day; a longer gap between requests to one host is a configuration mistake
pub const MAX_POLITENESS_DELAY_SECS: f64 = 86_400.0;

pub const DEFAULT_DISALLOWED_EXTENSIONS: &str = concat!(
    r"\.(css|js|bmp|gif|jpe?g|ico",
    r"|png|tiff?|mid|mp2|mp3|mp4",
    r"|wav|avi|mov|mpeg|ram|m4v|mkv|ogg|ogv|pdf",
    r"|ps|eps|tex|ppt|pptx|doc|docx|xls|xlsx|names",
    r"|data|dat|exe|bz2|tar|msi|bin|7z|psd|dmg|iso",
    r"|epub|dll|cnf|tgz|sha1",
    r"|thmx|mso|arff|rtf|jar|csv",
    r"|rm|smil|wmv|swf|wma|zip|rar|gz)$",
);

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Where the crawl starts when the frontier is empty
    pub seed_urls: Vec<String>,
    /// Number of concurrent workers
    pub threads: usize,
    /// Minimum seconds between two requests to the same host
    pub politeness_delay: Option<f64>,
    /// Hosts we are allowed to crawl (compared case-insensitively)
    pub allowed_domains: Vec<String>,
    /// Host suffix used for the per-subdomain section of the report
    pub monitored_suffix: String,
    pub max_url_length: usize,
    pub max_path_segments: usize,
    /// Regex matched against the lower-cased URL path
    pub disallowed_extensions: String,
    pub request_timeout_secs: u64,
    /// Append-only log of the frontier, used to resume a crawl
    pub save_file: PathBuf,
    pub report_file: PathBuf,
    /// How many words the report lists
    pub top_words: usize,
    /// true = throw away the saved frontier and start clean
    pub restart: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "focus-crawler/0.1".to_string(),
            seed_urls: vec![
                "https://www.ics.uci.edu".to_string(),
                "https://www.cs.uci.edu".to_string(),
                "https://www.informatics.uci.edu".to_string(),
                "https://www.stat.uci.edu".to_string(),
            ],
            threads: 1,
            politeness_delay: Some(0.5),
            allowed_domains: [
                "ics.uci.edu",
                "www.ics.uci.edu",
                "cs.uci.edu",
                "www.cs.uci.edu",
                "informatics.uci.edu",
                "www.informatics.uci.edu",
                "stat.uci.edu",
                "www.stat.uci.edu",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            monitored_suffix: ".uci.edu".to_string(),
            max_url_length: 200,
            max_path_segments: 10,
            disallowed_extensions: DEFAULT_DISALLOWED_EXTENSIONS.to_string(),
            request_timeout_secs: 10,
            save_file: PathBuf::from("frontier.log"),
            report_file: PathBuf::from("crawler_report.txt"),
            top_words: 50,
            restart: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    // Loads a config file, or returns the defaults when no path is given
    //
    // The result is NOT validated yet: CLI overrides still need to be applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Applies command-line flags on top of file/default values
    pub fn apply_overrides(&mut self, args: &CrawlArgs) {
        if !args.seeds.is_empty() {
            self.seed_urls = args.seeds.clone();
        }
        if let Some(threads) = args.threads {
            self.threads = threads;
        }
        if args.no_politeness {
            self.politeness_delay = None;
        } else if let Some(delay) = args.delay {
            self.politeness_delay = Some(delay);
        }
        if let Some(path) = &args.save_file {
            self.save_file = path.clone();
        }
        if let Some(path) = &args.report {
            self.report_file = path.clone();
        }
        if args.restart {
            self.restart = true;
        }
    }

    // Checks every field and reports all problems together
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.threads == 0 {
            errors.push("threads must be a positive integer".to_string());
        }
        if let Some(delay) = self.politeness_delay {
            if !delay.is_finite() || delay < 0.0 || Duration::try_from_secs_f64(delay).is_err() {
                errors.push(format!("politeness_delay must be a non-negative number of seconds, got {delay}"));
            } else if delay > MAX_POLITENESS_DELAY_SECS {
                errors.push(format!(
                    "politeness_delay must be at most {MAX_POLITENESS_DELAY_SECS} seconds, got {delay}"
                ));
            }
        }
        if self.allowed_domains.is_empty() {
            errors.push("allowed_domains must list at least one host".to_string());
        }
        if self.max_url_length == 0 {
            errors.push("max_url_length must be positive".to_string());
        }
        if self.max_path_segments == 0 {
            errors.push("max_path_segments must be positive".to_string());
        }
        if let Err(e) = regex::Regex::new(&self.disallowed_extensions) {
            errors.push(format!("disallowed_extensions is not a valid regex: {e}"));
        }
        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }
        if self.top_words == 0 {
            errors.push("top_words must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    // The politeness delay as a Duration; zero counts as "no throttling"
    //
    // Out-of-range values are clamped to MAX_POLITENESS_DELAY_SECS here;
    // validate() is what reports them.
    pub fn politeness_delay(&self) -> Option<Duration> {
        self.politeness_delay
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs.min(MAX_POLITENESS_DELAY_SECS)).ok())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.politeness_delay(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "threads = 4").unwrap();
        writeln!(file, "politeness_delay = 0.0").unwrap();
        writeln!(file, "allowed_domains = [\"example.com\"]").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.politeness_delay(), None);
        assert_eq!(config.allowed_domains, vec!["example.com"]);
        assert_eq!(config.max_url_length, 200);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawler.toml");
        std::fs::write(&path, "thread_count = 4\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = Config {
            threads: 0,
            politeness_delay: Some(-1.0),
            disallowed_extensions: "(".to_string(),
            ..Config::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_politeness_delay_is_rejected_not_a_panic() {
        for delay in [1e30, f64::MAX, MAX_POLITENESS_DELAY_SECS + 1.0] {
            let config = Config {
                politeness_delay: Some(delay),
                ..Config::default()
            };
            match config.validate() {
                Err(ConfigError::Invalid(errors)) => {
                    assert_eq!(errors.len(), 1, "delay {delay}");
                    assert!(errors[0].contains("politeness_delay"));
                }
                other => panic!("expected delay {delay} to be rejected, got {other:?}"),
            }
            assert_eq!(
                config.politeness_delay(),
                Some(Duration::from_secs_f64(MAX_POLITENESS_DELAY_SECS))
            );
        }

        let config = Config {
            politeness_delay: Some(MAX_POLITENESS_DELAY_SECS),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let args = CrawlArgs {
            seeds: vec!["https://cs.uci.edu".to_string()],
            threads: Some(8),
            delay: Some(2.0),
            no_politeness: false,
            restart: true,
            save_file: None,
            report: Some(PathBuf::from("out.txt")),
        };
        config.apply_overrides(&args);
        assert_eq!(config.seed_urls, vec!["https://cs.uci.edu"]);
        assert_eq!(config.threads, 8);
        assert_eq!(config.politeness_delay(), Some(Duration::from_secs(2)));
        assert!(config.restart);
        assert_eq!(config.report_file, PathBuf::from("out.txt"));
        assert_eq!(config.save_file, PathBuf::from("frontier.log"));
    }
}
