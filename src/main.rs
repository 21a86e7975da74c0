// src/main.rs
// =============================================================================
// Entry point of the focus-crawler CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the config file and apply command-line overrides
// 3. Set up logging (tracing)
// 4. Dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 2 = error)
//
// Ctrl-C during a crawl requests a graceful stop: workers finish the page they
// are on, the report is still written, and the frontier log lets the next run
// resume.
// =============================================================================

mod analysis;
mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod urls;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CrawlArgs};
use config::Config;
use crawl::{Crawler, Journal};
use fetch::HttpDownloader;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&log_level);

    match cli.command {
        Commands::Crawl(args) => handle_crawl(config, &args).await,
        Commands::Status { save_file } => {
            if let Some(path) = save_file {
                config.save_file = path;
            }
            handle_status(&config.save_file)
        }
    }
}

// RUST_LOG takes precedence over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn handle_crawl(mut config: Config, args: &CrawlArgs) -> Result<i32> {
    config.apply_overrides(args);
    config.validate()?;
    let config = Arc::new(config);

    let downloader = HttpDownloader::new(&config).context("failed to build HTTP client")?;
    let mut crawler = Crawler::new(Arc::clone(&config), downloader)?;
    crawler
        .restart(!config.restart)
        .with_context(|| format!("failed to load frontier from '{}'", config.save_file.display()))?;

    let stats = crawler.frontier().stats();
    if stats.completed > 0 {
        println!("♻️  Resuming: {} done, {} pending", stats.completed, stats.pending);
    }

    let stop = crawler.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after in-flight pages");
            stop.cancel();
        }
    });

    println!("🕷️  Crawling with {} worker(s)", config.threads);
    let summary = crawler.run().await?;
    info!(pages = summary.analysis.unique_pages, "Crawl finished");

    let failed: usize = summary.workers.iter().map(|w| w.failed_downloads).sum();
    println!();
    println!("📊 Summary:");
    println!("   📄 Unique pages: {}", summary.analysis.unique_pages);
    println!("   ❌ Failed downloads: {failed}");
    println!("   ⏳ Still pending: {}", summary.frontier.pending);
    println!("   📝 Report: {}", config.report_file.display());

    Ok(0)
}

fn handle_status(save_file: &Path) -> Result<i32> {
    if !save_file.exists() {
        println!("No saved frontier at {}", save_file.display());
        return Ok(0);
    }

    let snapshot = Journal::replay(save_file)?;
    println!("📂 Frontier log: {}", save_file.display());
    println!("   🔎 Seen: {}", snapshot.discovered.len());
    println!("   ✅ Completed: {}", snapshot.completed.len());
    println!("   ⏳ Pending: {}", snapshot.pending.len());
    if let Some(next) = snapshot.pending.front() {
        println!("   ➡️  Next up: {next}");
    }

    Ok(0)
}
