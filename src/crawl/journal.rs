// src/crawl/journal.rs
// =============================================================================
// Durable storage for the frontier: an append-only JSON-lines log.
//
// Two kinds of entries:
//   {"op":"add","url":"https://..."}    a URL was discovered
//   {"op":"done","url":"https://..."}   a URL finished processing
//
// Replaying the log rebuilds the frontier exactly:
// - seen      = every added URL
// - completed = every URL with a "done" entry
// - pending   = added but not done, in discovery order
//
// A URL that was in progress when the crawl stopped has no "done" entry, so
// it simply comes back as pending, in its original position.
//
// After a replay the log is compacted (rewritten with one line per fact) via
// a temp file + rename, so a crash mid-compaction leaves the old log intact.
// A half-written final line (crash during append) is skipped with a warning.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::FrontierError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Entry {
    Add { url: String },
    Done { url: String },
}

// The durable part of the frontier's state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontierSnapshot {
    /// Every URL ever seen, in discovery order
    pub discovered: Vec<String>,
    pub pending: VecDeque<String>,
    pub completed: HashSet<String>,
}

pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Journal {
    // Starts an empty log, truncating any previous one
    pub fn create(path: &Path) -> Result<Self, FrontierError> {
        let file = File::create(path).map_err(|source| io_error(path, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    // Rewrites the log so it holds exactly `snapshot`, then keeps appending to it
    pub fn compact(path: &Path, snapshot: &FrontierSnapshot) -> Result<Self, FrontierError> {
        let tmp_path = path.with_extension("tmp");
        {
            let mut tmp = Self::create(&tmp_path)?;
            for url in &snapshot.discovered {
                tmp.write_entry(&Entry::Add { url: url.clone() })?;
            }
            for url in snapshot.discovered.iter().filter(|u| snapshot.completed.contains(*u)) {
                tmp.write_entry(&Entry::Done { url: url.clone() })?;
            }
        }
        fs::rename(&tmp_path, path).map_err(|source| io_error(path, source))?;

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| io_error(path, source))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn record_add(&mut self, url: &str) -> Result<(), FrontierError> {
        self.write_entry(&Entry::Add { url: url.to_string() })
    }

    pub fn record_done(&mut self, url: &str) -> Result<(), FrontierError> {
        self.write_entry(&Entry::Done { url: url.to_string() })
    }

    fn write_entry(&mut self, entry: &Entry) -> Result<(), FrontierError> {
        let line = serde_json::to_string(entry)?;
        writeln!(self.writer, "{line}").map_err(|source| io_error(&self.path, source))?;
        self.writer.flush().map_err(|source| io_error(&self.path, source))
    }

    // Rebuilds the frontier state from a log; a missing log is an empty frontier
    pub fn replay(path: &Path) -> Result<FrontierSnapshot, FrontierError> {
        let mut snapshot = FrontierSnapshot::default();
        if !path.exists() {
            return Ok(snapshot);
        }

        let file = File::open(path).map_err(|source| io_error(path, source))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| io_error(path, source))?;

        let mut seen = HashSet::new();
        let last = lines.len();
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: Entry = match serde_json::from_str(line) {
                Ok(entry) => entry,
                Err(e) if index + 1 == last => {
                    warn!(path = %path.display(), error = %e, "Skipping torn last line of frontier log");
                    break;
                }
                Err(source) => {
                    return Err(FrontierError::Corrupt {
                        path: path.to_path_buf(),
                        line: index + 1,
                        source,
                    })
                }
            };

            match entry {
                Entry::Add { url } => {
                    if seen.insert(url.clone()) {
                        snapshot.discovered.push(url);
                    }
                }
                Entry::Done { url } => {
                    if seen.contains(&url) {
                        snapshot.completed.insert(url);
                    } else {
                        warn!(%url, "Frontier log marks an unknown URL as done, ignoring");
                    }
                }
            }
        }

        snapshot.pending = snapshot
            .discovered
            .iter()
            .filter(|url| !snapshot.completed.contains(*url))
            .cloned()
            .collect();

        info!(
            path = %path.display(),
            seen = snapshot.discovered.len(),
            pending = snapshot.pending.len(),
            completed = snapshot.completed.len(),
            "Replayed frontier log"
        );
        Ok(snapshot)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FrontierError {
    FrontierError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Journal::replay(&dir.path().join("nothing.log")).unwrap();
        assert_eq!(snapshot, FrontierSnapshot::default());
    }

    #[test]
    fn test_replay_rebuilds_state_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");

        let mut journal = Journal::create(&path).unwrap();
        for url in ["https://a.edu/1", "https://a.edu/2", "https://a.edu/3", "https://a.edu/4"] {
            journal.record_add(url).unwrap();
        }
        journal.record_done("https://a.edu/2").unwrap();
        drop(journal);

        let snapshot = Journal::replay(&path).unwrap();
        assert_eq!(snapshot.discovered.len(), 4);
        assert_eq!(
            snapshot.pending,
            VecDeque::from(vec![
                "https://a.edu/1".to_string(),
                "https://a.edu/3".to_string(),
                "https://a.edu/4".to_string(),
            ])
        );
        assert!(snapshot.completed.contains("https://a.edu/2"));
    }

    #[test]
    fn test_compact_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");

        let mut journal = Journal::create(&path).unwrap();
        for url in ["https://a.edu/x", "https://a.edu/y", "https://a.edu/x"] {
            journal.record_add(url).unwrap();
        }
        journal.record_done("https://a.edu/x").unwrap();
        journal.record_done("https://a.edu/x").unwrap();
        drop(journal);

        let before = Journal::replay(&path).unwrap();
        let mut compacted = Journal::compact(&path, &before).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);

        // Appending after compaction keeps working
        compacted.record_add("https://a.edu/z").unwrap();
        drop(compacted);

        let after = Journal::replay(&path).unwrap();
        assert_eq!(after.discovered, vec!["https://a.edu/x", "https://a.edu/y", "https://a.edu/z"]);
        assert_eq!(after.pending, VecDeque::from(vec!["https://a.edu/y".to_string(), "https://a.edu/z".to_string()]));
        assert_eq!(after.completed, before.completed);
    }

    #[test]
    fn test_torn_last_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");
        std::fs::write(
            &path,
            "{\"op\":\"add\",\"url\":\"https://a.edu/1\"}\n{\"op\":\"add\",\"url\":\"https://a.e",
        )
        .unwrap();

        let snapshot = Journal::replay(&path).unwrap();
        assert_eq!(snapshot.discovered, vec!["https://a.edu/1"]);
    }

    #[test]
    fn test_corrupt_middle_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");
        std::fs::write(
            &path,
            "{\"op\":\"add\",\"url\":\"https://a.edu/1\"}\ngarbage\n{\"op\":\"done\",\"url\":\"https://a.edu/1\"}\n",
        )
        .unwrap();

        match Journal::replay(&path) {
            Err(FrontierError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a corrupt-log error, got {other:?}"),
        }
    }
}
