// src/analysis/report.rs
// =============================================================================
// Renders the final crawl report.
//
// Layout, in order:
//   unique pages found: <count>
//   longest page: <url> <word count>
//   <n> most common words:
//       1. <word>          (<count> occurrences)
//      ...
//   <blank line>
//   <suffix> subdomains:
//      <host>, <page count>
// =============================================================================

use std::fmt::Write as _;
use std::path::Path;

use super::analyzer::AnalysisSnapshot;

pub fn render_report(snapshot: &AnalysisSnapshot, top_n: usize, monitored_suffix: &str) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail, so the fmt::Results are ignored
    let _ = writeln!(out, "unique pages found: {}", snapshot.unique_pages);

    match &snapshot.longest_page {
        Some((url, words)) => {
            let _ = writeln!(out, "longest page: {url} {words}");
        }
        None => {
            let _ = writeln!(out, "longest page: None 0");
        }
    }

    let _ = writeln!(out, "{top_n} most common words:");
    for (rank, (word, count)) in snapshot.top_words.iter().enumerate() {
        let _ = writeln!(out, "   {:2}. {:<15} ({} occurrences)", rank + 1, word, count);
    }
    out.push('\n');

    let _ = writeln!(out, "{} subdomains:", monitored_suffix.trim_start_matches('.'));
    for (host, pages) in &snapshot.subdomains {
        let _ = writeln!(out, "   {host}, {pages}");
    }

    out
}

pub fn write_report(path: &Path, report: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, report)
}
