// src/crawl/frontier.rs
// =============================================================================
// The frontier: every URL the crawl knows about, and whose turn it is.
//
// Each canonical URL is in exactly one of:
//   pending      queued, waiting for a worker        (VecDeque, FIFO)
//   in_progress  handed to a worker, not yet done     (HashSet)
//   completed    done, never handed out again         (HashSet)
// and `seen` is the union of the three. It only grows during a run.
//
// All of that lives behind one mutex, so no caller ever sees a URL that is
// seen but in none (or two) of the three states. The lock is never held
// across an .await.
//
// dequeue() only reports "no more work" when nothing is pending AND nothing is
// in progress: a sibling that is still fetching may yet discover new URLs.
// Waiting workers are woken through a tokio Notify whenever work is added or
// a URL completes.
//
// Every change is also appended to the journal (see journal.rs) so a stopped
// crawl can resume. Journal write failures are logged and the crawl goes on.
// =============================================================================

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::journal::{FrontierSnapshot, Journal};
use crate::error::FrontierError;
use crate::urls::canonicalize;

#[derive(Default)]
struct FrontierState {
    seen: HashSet<String>,
    pending: VecDeque<String>,
    in_progress: HashSet<String>,
    completed: HashSet<String>,
    journal: Option<Journal>,
}

impl FrontierState {
    fn from_snapshot(snapshot: FrontierSnapshot, journal: Option<Journal>) -> Self {
        Self {
            seen: snapshot.discovered.into_iter().collect(),
            pending: snapshot.pending,
            in_progress: HashSet::new(),
            completed: snapshot.completed,
            journal,
        }
    }

    fn journal_add(&mut self, url: &str) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.record_add(url) {
                warn!(%url, error = %e, "Failed to persist discovered URL");
            }
        }
    }

    fn journal_done(&mut self, url: &str) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.record_done(url) {
                warn!(%url, error = %e, "Failed to persist completed URL");
            }
        }
    }
}

// Sizes of each part of the frontier, for logging and the status command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    pub seen: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

pub struct Frontier {
    save_file: Option<PathBuf>,
    state: Mutex<FrontierState>,
    work_changed: Notify,
}

impl Frontier {
    // A frontier persisted to `save_file`; call restart() before using it
    pub fn persistent(save_file: impl AsRef<Path>) -> Self {
        Self {
            save_file: Some(save_file.as_ref().to_path_buf()),
            state: Mutex::new(FrontierState::default()),
            work_changed: Notify::new(),
        }
    }

    // A frontier that lives only in memory
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            save_file: None,
            state: Mutex::new(FrontierState::default()),
            work_changed: Notify::new(),
        }
    }

    // Loads the saved frontier (preserve = true) or wipes it (preserve = false)
    //
    // Takes &mut self: this cannot run while workers share the frontier.
    pub fn restart(&mut self, preserve: bool) -> Result<(), FrontierError> {
        let state = match (&self.save_file, preserve) {
            (None, _) => FrontierState::default(),
            (Some(path), true) => {
                let snapshot = Journal::replay(path)?;
                let journal = Journal::compact(path, &snapshot)?;
                info!(
                    path = %path.display(),
                    pending = snapshot.pending.len(),
                    completed = snapshot.completed.len(),
                    "Resuming saved frontier"
                );
                FrontierState::from_snapshot(snapshot, Some(journal))
            }
            (Some(path), false) => {
                info!(path = %path.display(), "Starting with an empty frontier");
                FrontierState {
                    journal: Some(Journal::create(path)?),
                    ..FrontierState::default()
                }
            }
        };
        *self.state.get_mut() = state;
        Ok(())
    }

    // Adds a URL unless its canonical form was seen before
    //
    // Returns true if the URL was new.
    pub fn enqueue(&self, url: &str) -> bool {
        let canonical = canonicalize(url);
        {
            let mut state = self.state.lock();
            if !state.seen.insert(canonical.clone()) {
                return false;
            }
            state.journal_add(&canonical);
            state.pending.push_back(canonical);
        }
        self.work_changed.notify_waiters();
        true
    }

    // Enqueues the seed URLs, but only into a frontier that has never seen anything
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.state.lock().seen.is_empty() {
            return 0;
        }
        urls.into_iter().filter(|url| self.enqueue(url.as_ref())).count()
    }

    // Whether the canonical form of `url` has ever been seen
    pub fn contains(&self, url: &str) -> bool {
        self.state.lock().seen.contains(&canonicalize(url))
    }

    // Hands out the next pending URL
    //
    // Waits while the queue is empty but siblings are still working; returns
    // None once there is nothing pending and nothing in progress. Dropping the
    // returned future never loses a URL: a URL only leaves `pending` in the
    // same poll that returns it.
    pub async fn dequeue(&self) -> Option<String> {
        loop {
            let notified = self.work_changed.notified();
            tokio::pin!(notified);
            // Register before looking at the state so a wake-up between the
            // check and the await is not lost
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(url) = state.pending.pop_front() {
                    state.in_progress.insert(url.clone());
                    return Some(url);
                }
                if state.in_progress.is_empty() {
                    return None;
                }
            }

            notified.await;
        }
    }

    // Marks an in-progress URL as done; anything else is ignored
    pub fn mark_complete(&self, url: &str) {
        let canonical = canonicalize(url);
        {
            let mut state = self.state.lock();
            if !state.in_progress.remove(&canonical) {
                debug!(url = %canonical, "mark_complete on a URL that is not in progress, ignoring");
                return;
            }
            state.journal_done(&canonical);
            state.completed.insert(canonical);
        }
        self.work_changed.notify_waiters();
    }

    pub fn stats(&self) -> FrontierStats {
        let state = self.state.lock();
        FrontierStats {
            seen: state.seen.len(),
            pending: state.pending.len(),
            in_progress: state.in_progress.len(),
            completed: state.completed.len(),
        }
    }

    #[cfg(test)]
    pub fn is_completed(&self, url: &str) -> bool {
        self.state.lock().completed.contains(&canonicalize(url))
    }

    // The pending queue, front first
    #[cfg(test)]
    pub fn pending(&self) -> Vec<String> {
        self.state.lock().pending.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn fresh() -> Frontier {
        let mut frontier = Frontier::in_memory();
        frontier.restart(false).unwrap();
        frontier
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let frontier = fresh();
        frontier.enqueue("https://cs.uci.edu/1");
        frontier.enqueue("https://cs.uci.edu/2");
        frontier.enqueue("https://cs.uci.edu/3");

        assert_eq!(frontier.dequeue().await.as_deref(), Some("https://cs.uci.edu/1"));
        assert_eq!(frontier.dequeue().await.as_deref(), Some("https://cs.uci.edu/2"));
        assert_eq!(frontier.dequeue().await.as_deref(), Some("https://cs.uci.edu/3"));
    }

    #[tokio::test]
    async fn test_double_enqueue_is_absorbed() {
        let frontier = fresh();
        assert!(frontier.enqueue("http://www.cs.uci.edu/a/"));
        assert!(!frontier.enqueue("https://cs.uci.edu/a"));
        assert!(!frontier.enqueue("https://cs.uci.edu/a#top"));

        assert_eq!(frontier.stats().seen, 1);
        let url = frontier.dequeue().await.unwrap();
        frontier.mark_complete(&url);
        assert_eq!(frontier.dequeue().await, None);

        // Completed URLs never come back
        assert!(!frontier.enqueue("https://cs.uci.edu/a"));
        assert_eq!(frontier.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_empty_frontier_reports_done() {
        let frontier = fresh();
        assert_eq!(frontier.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_mark_complete_unknown_url_is_a_noop() {
        let frontier = fresh();
        frontier.mark_complete("https://cs.uci.edu/never-seen");
        frontier.enqueue("https://cs.uci.edu/queued");
        // Queued but never handed out: still not completable
        frontier.mark_complete("https://cs.uci.edu/queued");

        assert_eq!(
            frontier.stats(),
            FrontierStats { seen: 1, pending: 1, in_progress: 0, completed: 0 }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dequeue_waits_for_in_progress_sibling() {
        let frontier = Arc::new(fresh());
        frontier.enqueue("https://cs.uci.edu/root");
        let root = frontier.dequeue().await.unwrap();

        // A second worker finds nothing pending, but root is still in progress
        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.dequeue().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        // The sibling discovers a child, then finishes
        frontier.enqueue("https://cs.uci.edu/child");
        frontier.mark_complete(&root);

        let got = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.as_deref(), Some("https://cs.uci.edu/child"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_waiter_released_when_last_sibling_completes() {
        let frontier = Arc::new(fresh());
        frontier.enqueue("https://cs.uci.edu/only");
        let only = frontier.dequeue().await.unwrap();

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.dequeue().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        frontier.mark_complete(&only);

        let got = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_enqueue_hands_each_url_out_once() {
        let frontier = Arc::new(fresh());
        let mut producers = Vec::new();
        for _ in 0..8 {
            let frontier = Arc::clone(&frontier);
            producers.push(tokio::spawn(async move {
                for i in 0..100 {
                    frontier.enqueue(&format!("https://cs.uci.edu/page/{i}"));
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let mut handed_out = HashSet::new();
        while let Some(url) = frontier.dequeue().await {
            assert!(handed_out.insert(url.clone()), "{url} handed out twice");
            frontier.mark_complete(&url);
        }
        assert_eq!(handed_out.len(), 100);
    }

    #[tokio::test]
    async fn test_restart_preserve_resumes_where_it_left_off() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");

        {
            let mut frontier = Frontier::persistent(&path);
            frontier.restart(false).unwrap();
            for page in ["a", "b", "c", "d"] {
                frontier.enqueue(&format!("https://cs.uci.edu/{page}"));
            }
            let a = frontier.dequeue().await.unwrap();
            frontier.mark_complete(&a);
            // b is in progress when the crawl stops
            let _b = frontier.dequeue().await.unwrap();
        }

        let mut frontier = Frontier::persistent(&path);
        frontier.restart(true).unwrap();

        assert!(frontier.is_completed("https://cs.uci.edu/a"));
        assert_eq!(
            frontier.pending(),
            vec!["https://cs.uci.edu/b", "https://cs.uci.edu/c", "https://cs.uci.edu/d"]
        );
        assert!(!frontier.enqueue("https://cs.uci.edu/a"));
        assert_eq!(frontier.seed(["https://cs.uci.edu/"]), 0);

        let mut order = Vec::new();
        while let Some(url) = frontier.dequeue().await {
            frontier.mark_complete(&url);
            order.push(url);
        }
        assert_eq!(order, vec!["https://cs.uci.edu/b", "https://cs.uci.edu/c", "https://cs.uci.edu/d"]);
    }

    #[tokio::test]
    async fn test_restart_without_preserve_wipes_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.log");

        {
            let mut frontier = Frontier::persistent(&path);
            frontier.restart(false).unwrap();
            frontier.enqueue("https://cs.uci.edu/old");
        }

        let mut frontier = Frontier::persistent(&path);
        frontier.restart(false).unwrap();
        assert_eq!(frontier.stats(), FrontierStats::default());
        assert_eq!(frontier.seed(["https://cs.uci.edu/new"]), 1);
        assert_eq!(frontier.pending(), vec!["https://cs.uci.edu/new"]);
    }
}
