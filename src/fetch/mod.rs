// src/fetch/mod.rs
// =============================================================================
// This module talks to the outside world on behalf of a worker.
//
// Submodules:
// - http: Downloads a page (Downloader trait + reqwest implementation)
// - links: Pulls outgoing <a href> links out of a downloaded page
// =============================================================================

mod http;
mod links;

pub use http::{Downloader, HttpDownloader, Response};
pub use links::extract_next_links;
