// src/analysis/mod.rs
// =============================================================================
// Page statistics and the end-of-crawl report.
//
// Submodules:
// - text: Markup -> words, plus the stopword list
// - analyzer: The shared, deduplicating statistics store
// - report: Renders a snapshot of the statistics as text
// =============================================================================

mod analyzer;
mod report;
mod text;

pub use analyzer::{AnalysisSnapshot, ContentAnalyzer};
pub use report::{render_report, write_report};
pub use text::Stopwords;
