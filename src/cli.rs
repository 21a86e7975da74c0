// src/cli.rs
// =============================================================================
// The command-line interface, defined with clap's derive API.
//
// Two subcommands:
//   crawl    run (or resume) a crawl and write the report
//   status   summarize a saved frontier log without crawling
//
// Every crawl flag is optional: when absent, the value from the config file
// (or the built-in default) is used. See Config::apply_overrides.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "focus-crawler",
    version,
    about = "A polite, resumable web crawler for a fixed set of domains",
    long_about = "focus-crawler crawls a configured set of hosts with several workers, \
                  keeps at most one request per host in flight per politeness window, \
                  and writes a report of unique pages, the longest page, the most common \
                  words and the pages found per subdomain."
)]
pub struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "focus_crawler=debug" (RUST_LOG wins if set)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl from the seed URLs (or resume a saved crawl) and write the report
    ///
    /// Example: focus-crawler crawl --threads 4 https://www.ics.uci.edu
    Crawl(CrawlArgs),

    /// Show what a saved frontier log contains
    ///
    /// Example: focus-crawler status --save-file frontier.log
    Status {
        /// Frontier log to inspect (defaults to the configured save file)
        #[arg(long)]
        save_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CrawlArgs {
    /// Seed URLs; replace the configured seeds when given
    pub seeds: Vec<String>,

    /// Number of workers
    #[arg(long, short)]
    pub threads: Option<usize>,

    /// Seconds between two requests to the same host
    #[arg(long, conflicts_with = "no_politeness")]
    pub delay: Option<f64>,

    /// Disable the per-host delay entirely
    #[arg(long)]
    pub no_politeness: bool,

    /// Throw away the saved frontier and start from the seeds
    #[arg(long)]
    pub restart: bool,

    /// Where the frontier log lives
    #[arg(long)]
    pub save_file: Option<PathBuf>,

    /// Where to write the final report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_crawl_flags() {
        let cli = Cli::try_parse_from([
            "focus-crawler",
            "--config",
            "crawler.toml",
            "crawl",
            "--threads",
            "4",
            "--delay",
            "1.5",
            "--restart",
            "https://www.ics.uci.edu",
            "https://www.cs.uci.edu",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("crawler.toml")));
        match cli.command {
            Commands::Crawl(args) => {
                assert_eq!(args.seeds, vec!["https://www.ics.uci.edu", "https://www.cs.uci.edu"]);
                assert_eq!(args.threads, Some(4));
                assert_eq!(args.delay, Some(1.5));
                assert!(args.restart);
                assert!(!args.no_politeness);
            }
            other => panic!("expected crawl, got {other:?}"),
        }
    }

    #[test]
    fn test_delay_conflicts_with_no_politeness() {
        let result = Cli::try_parse_from(["focus-crawler", "crawl", "--delay", "1", "--no-politeness"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_takes_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["focus-crawler", "status", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::Status { save_file: None }));
    }
}
