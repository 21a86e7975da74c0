// src/crawl/worker.rs
// =============================================================================
// One crawl worker.
//
// Each worker runs this loop until it stops:
//
//   Idle       take a URL from the frontier (or stop if there is no more work,
//              or a stop was requested)
//   Fetching   wait for the host's politeness slot, then download
//   Filtering  extract links, keep the ones UrlPolicy accepts and the
//              frontier has not seen, enqueue them
//   Recording  hand the page to the content analyzer
//   -> mark the URL complete, back to Idle
//
// A failed download is not an error here: the page is recorded without
// content and still marked complete. Once stopped, a worker never resumes.
//
// The URL a worker holds is completed by a drop guard, so a worker that
// panics mid-page still releases it and its siblings can drain the frontier.
// =============================================================================

use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use super::frontier::Frontier;
use super::politeness::PolitenessScheduler;
use crate::analysis::ContentAnalyzer;
use crate::fetch::{extract_next_links, Downloader, Response};
use crate::urls::{host_of, UrlPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Fetching,
    Filtering,
    Recording,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

// What a worker did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub pages: usize,
    pub failed_downloads: usize,
    pub links_enqueued: usize,
}

// Marks its URL complete when dropped, on the normal path and on unwind alike
struct InFlight<'a> {
    frontier: &'a Frontier,
    url: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!(url = %self.url, "Worker panicked while processing URL; releasing it");
        }
        self.frontier.mark_complete(&self.url);
    }
}

pub struct Worker<D> {
    pub(super) id: usize,
    pub(super) frontier: Arc<Frontier>,
    pub(super) politeness: Arc<PolitenessScheduler>,
    pub(super) analyzer: Arc<ContentAnalyzer>,
    pub(super) policy: Arc<UrlPolicy>,
    pub(super) downloader: Arc<D>,
    pub(super) stop: CancellationToken,
}

impl<D: Downloader> Worker<D> {
    pub async fn run(self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        let mut state = WorkerState::Idle;

        loop {
            if self.stop.is_cancelled() {
                info!("Stop requested. Worker stopping.");
                break;
            }

            // A stop request also interrupts waiting for siblings to produce work
            let next = tokio::select! {
                biased;
                _ = self.stop.cancelled() => None,
                url = self.frontier.dequeue() => url,
            };
            let Some(url) = next else {
                if !self.stop.is_cancelled() {
                    info!("Frontier is empty. Worker stopping.");
                }
                break;
            };
            let page = InFlight {
                frontier: &self.frontier,
                url,
            };
            let url = page.url.as_str();

            state = self.transition(state, WorkerState::Fetching, url);
            let response = self.fetch(url).await;
            let content = response.page_content();
            if content.is_none() {
                summary.failed_downloads += 1;
            }

            state = self.transition(state, WorkerState::Filtering, url);
            summary.links_enqueued += self.enqueue_links(url, &response);

            state = self.transition(state, WorkerState::Recording, url);
            if self.analyzer.record(url, content) {
                if let Some(words) = self.analyzer.page_words(url) {
                    debug!(%url, words, "Recorded page");
                }
            }

            state = self.transition(state, WorkerState::Idle, url);
            drop(page);
            summary.pages += 1;
        }

        self.transition(state, WorkerState::Stopped, "");
        info!(
            worker = self.id,
            pages = summary.pages,
            failed = summary.failed_downloads,
            enqueued = summary.links_enqueued,
            "Worker finished"
        );
        summary
    }

    async fn fetch(&self, url: &str) -> Response {
        if let Some(domain) = host_of(url) {
            self.politeness.wait_for(&domain).await;
        }

        let response = self.downloader.download(url).await;
        match &response.error {
            Some(error) => info!(%url, status = response.status, %error, "Download failed"),
            None => info!(%url, status = response.status, "Downloaded"),
        }
        response
    }

    // Enqueues the page's acceptable, unseen links; returns how many were new
    fn enqueue_links(&self, url: &str, response: &Response) -> usize {
        let mut added = 0;
        for link in extract_next_links(url, response) {
            if !self.policy.is_valid(&link) {
                trace!(%link, "Rejected by URL policy");
                continue;
            }
            if self.frontier.contains(&link) {
                continue;
            }
            if self.frontier.enqueue(&link) {
                added += 1;
            }
        }
        if added > 0 {
            debug!(%url, added, "Enqueued new links");
        }
        added
    }

    fn transition(&self, from: WorkerState, to: WorkerState, url: &str) -> WorkerState {
        trace!(worker = self.id, %from, %to, %url, "state change");
        to
    }
}
