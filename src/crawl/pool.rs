// src/crawl/pool.rs
// =============================================================================
// The crawl coordinator: owns the shared state, runs the worker pool, and
// writes the report once every worker has stopped.
//
// Shared state, each with its own lock, never held together:
// - Frontier             (what to crawl next)
// - PolitenessScheduler  (when each host may be hit again)
// - ContentAnalyzer      (what we learned from the pages)
//
// Lifecycle:
//   Crawler::new()      build everything from the config
//   restart(preserve)   resume or wipe the saved frontier, reset the analyzer,
//                       seed an empty frontier
//   run()               spawn N workers, wait for all of them, write report
//
// restart() needs exclusive access to the shared state. While workers hold
// clones of the Arcs, Arc::get_mut fails and restart() returns Busy.
// =============================================================================

use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

use super::frontier::{Frontier, FrontierStats};
use super::politeness::PolitenessScheduler;
use super::worker::{Worker, WorkerSummary};
use crate::analysis::{render_report, write_report, AnalysisSnapshot, ContentAnalyzer, Stopwords};
use crate::config::Config;
use crate::error::CrawlError;
use crate::fetch::Downloader;
use crate::urls::UrlPolicy;

// The outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub analysis: AnalysisSnapshot,
    pub frontier: FrontierStats,
    pub workers: Vec<WorkerSummary>,
}

pub struct Crawler<D> {
    config: Arc<Config>,
    frontier: Arc<Frontier>,
    politeness: Arc<PolitenessScheduler>,
    analyzer: Arc<ContentAnalyzer>,
    policy: Arc<UrlPolicy>,
    downloader: Arc<D>,
    stop: CancellationToken,
}

impl<D: Downloader + 'static> Crawler<D> {
    pub fn new(config: Arc<Config>, downloader: D) -> Result<Self, CrawlError> {
        let policy = UrlPolicy::from_config(&config)?;
        Ok(Self {
            frontier: Arc::new(Frontier::persistent(&config.save_file)),
            politeness: Arc::new(PolitenessScheduler::new(config.politeness_delay())),
            analyzer: Arc::new(ContentAnalyzer::new(Stopwords::english(), config.monitored_suffix.clone())),
            policy: Arc::new(policy),
            downloader: Arc::new(downloader),
            stop: CancellationToken::new(),
            config,
        })
    }

    // Resumes (preserve = true) or wipes (preserve = false) the crawl state
    pub fn restart(&mut self, preserve: bool) -> Result<(), CrawlError> {
        let frontier = Arc::get_mut(&mut self.frontier).ok_or(CrawlError::Busy)?;
        frontier.restart(preserve)?;

        if !preserve {
            Arc::get_mut(&mut self.analyzer).ok_or(CrawlError::Busy)?.reset();
            Arc::get_mut(&mut self.politeness).ok_or(CrawlError::Busy)?.reset();
        }

        let seeded = self.frontier.seed(&self.config.seed_urls);
        if seeded > 0 {
            info!(seeded, "Seeded empty frontier");
        }
        Ok(())
    }

    // A handle that stops the crawl gracefully when cancelled
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    // Runs the worker pool to completion, then writes the report
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let stats = self.frontier.stats();
        info!(
            workers = self.config.threads,
            pending = stats.pending,
            completed = stats.completed,
            "Starting crawl"
        );

        let handles: Vec<_> = (0..self.config.threads)
            .map(|id| {
                let worker = Worker {
                    id,
                    frontier: Arc::clone(&self.frontier),
                    politeness: Arc::clone(&self.politeness),
                    analyzer: Arc::clone(&self.analyzer),
                    policy: Arc::clone(&self.policy),
                    downloader: Arc::clone(&self.downloader),
                    stop: self.stop.clone(),
                };
                tokio::spawn(worker.run().instrument(info_span!("worker", id)))
            })
            .collect();

        let mut workers = Vec::with_capacity(handles.len());
        for result in join_all(handles).await {
            match result {
                Ok(summary) => workers.push(summary),
                // The panicked worker's URL was released by its drop guard,
                // so the other workers drained the frontier without it
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        info!("All workers finished. Generating final report...");
        let analysis = self.analyzer.snapshot(self.config.top_words);
        let report = render_report(&analysis, self.config.top_words, &self.config.monitored_suffix);
        write_report(&self.config.report_file, &report).map_err(|source| CrawlError::Report {
            path: self.config.report_file.clone(),
            source,
        })?;
        info!(path = %self.config.report_file.display(), "Report written");

        Ok(CrawlSummary {
            analysis,
            frontier: self.frontier.stats(),
            workers,
        })
    }
}
