// src/crawl/mod.rs
// =============================================================================
// This module runs the crawl itself.
//
// Submodules:
// - frontier: Which URLs are known, queued, in progress and done
// - journal: The append-only log that lets a stopped crawl resume
// - politeness: Keeps requests to one host at least `delay` apart
// - worker: The fetch -> filter -> record loop of a single worker
// - pool: Builds the shared state, runs N workers, writes the report
// =============================================================================

mod frontier;
mod journal;
mod politeness;
mod pool;
mod worker;

pub use journal::Journal;
pub use pool::Crawler;
