// src/analysis/analyzer.rs
// =============================================================================
// The content analyzer: shared crawl statistics, written by every worker.
//
// It keeps:
// - the set of recorded canonical URLs (the dedup gate)
// - pages per host
// - words per page, and the longest page seen so far
// - global word frequencies
//
// Concurrency:
// All aggregates live behind ONE mutex, so a page is either fully recorded or
// not recorded at all. The expensive part (tag stripping, tokenizing) runs
// before the lock is taken; the lock only guards the check-and-set of the
// dedup gate plus a handful of map updates.
//
// Lifecycle:
// new() -> record() from many workers -> snapshot() once the workers are done.
// reset() takes &mut self, so it cannot run while workers share the analyzer.
// =============================================================================

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use super::text::{PageWords, Stopwords};
use crate::urls::{canonicalize, host_of};

#[derive(Debug, Clone, Copy)]
struct WordCount {
    count: usize,
    // Order in which the word was first seen, used to break ties
    first_seen: usize,
}

#[derive(Debug, Default)]
struct Aggregates {
    recorded: HashSet<String>,
    page_words: HashMap<String, usize>,
    longest: Option<(String, usize)>,
    subdomains: HashMap<String, usize>,
    words: HashMap<String, WordCount>,
}

impl Aggregates {
    fn add_words(&mut self, url: &str, page: PageWords) {
        self.page_words.insert(url.to_string(), page.total);

        // Strictly greater: on a tie the earlier page keeps the record
        let is_longer = self
            .longest
            .as_ref()
            .map_or(true, |(_, best)| page.total > *best);
        if is_longer {
            self.longest = Some((url.to_string(), page.total));
        }

        for word in page.counted {
            let next_rank = self.words.len();
            self.words
                .entry(word)
                .or_insert(WordCount { count: 0, first_seen: next_rank })
                .count += 1;
        }
    }

    fn top_words(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(&String, &WordCount)> = self.words.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(word, wc)| (word.clone(), wc.count))
            .collect()
    }

    fn subdomain_report(&self, suffix: &str) -> Vec<(String, usize)> {
        let mut hosts: Vec<(String, usize)> = self
            .subdomains
            .iter()
            .filter(|(host, _)| host.ends_with(suffix))
            .map(|(host, count)| (host.clone(), *count))
            .collect();
        hosts.sort();
        hosts
    }
}

// A frozen copy of everything the report needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSnapshot {
    pub unique_pages: usize,
    pub longest_page: Option<(String, usize)>,
    pub top_words: Vec<(String, usize)>,
    pub subdomains: Vec<(String, usize)>,
}

pub struct ContentAnalyzer {
    stopwords: Stopwords,
    monitored_suffix: String,
    inner: Mutex<Aggregates>,
}

impl ContentAnalyzer {
    pub fn new(stopwords: Stopwords, monitored_suffix: impl Into<String>) -> Self {
        Self {
            stopwords,
            monitored_suffix: monitored_suffix.into(),
            inner: Mutex::new(Aggregates::default()),
        }
    }

    // Records a page at most once per canonical URL
    //
    // content is None when the download failed; the page still counts as a
    // unique page but contributes no words.
    //
    // Returns true if this call recorded the page, false if it was a duplicate.
    pub fn record(&self, url: &str, content: Option<&[u8]>) -> bool {
        let canonical = canonicalize(url);
        let words = content
            .map(|bytes| PageWords::analyze(&String::from_utf8_lossy(bytes), &self.stopwords));

        let mut agg = self.inner.lock();
        if !agg.recorded.insert(canonical.clone()) {
            return false;
        }

        if let Some(host) = host_of(&canonical) {
            *agg.subdomains.entry(host).or_default() += 1;
        }
        if let Some(words) = words {
            agg.add_words(&canonical, words);
        }
        true
    }

    pub fn unique_pages(&self) -> usize {
        self.inner.lock().recorded.len()
    }

    // The page with the most words, or (None, 0) when nothing has content
    pub fn longest_page(&self) -> (Option<String>, usize) {
        match &self.inner.lock().longest {
            Some((url, count)) => (Some(url.clone()), *count),
            None => (None, 0),
        }
    }

    // Word count of a single recorded page
    pub fn page_words(&self, url: &str) -> Option<usize> {
        self.inner.lock().page_words.get(&canonicalize(url)).copied()
    }

    // The n most frequent words, most frequent first; ties keep first-seen order
    pub fn top_words(&self, n: usize) -> Vec<(String, usize)> {
        self.inner.lock().top_words(n)
    }

    // Hosts under the monitored suffix with their page counts, sorted by host
    pub fn subdomain_report(&self) -> Vec<(String, usize)> {
        self.inner.lock().subdomain_report(&self.monitored_suffix)
    }

    // Everything the report needs, taken once the workers have stopped
    pub fn snapshot(&self, top_n: usize) -> AnalysisSnapshot {
        let (longest_url, longest_words) = self.longest_page();
        AnalysisSnapshot {
            unique_pages: self.unique_pages(),
            longest_page: longest_url.map(|url| (url, longest_words)),
            top_words: self.top_words(top_n),
            subdomains: self.subdomain_report(),
        }
    }

    pub fn reset(&mut self) {
        *self.inner.get_mut() = Aggregates::default();
    }
}
