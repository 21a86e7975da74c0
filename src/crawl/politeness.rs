// src/crawl/politeness.rs
// =============================================================================
// Per-domain politeness: never hit the same host twice within `delay`.
//
// The table maps host -> the time its most recent request was scheduled for.
// wait_for() does two separate things:
//
// 1. Under the lock (microseconds): read the host's last slot, pick the next
//    free slot (now, or last + delay if that is later), write it back.
// 2. Without the lock: sleep until that slot.
//
// Because the slot is reserved before sleeping, two workers asking for the
// same host at once get slots `delay` apart, and a worker sleeping for one
// host never blocks workers headed for other hosts.
// =============================================================================

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct PolitenessScheduler {
    delay: Option<Duration>,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl PolitenessScheduler {
    // None (or a zero delay) disables throttling entirely
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay: delay.filter(|d| !d.is_zero()),
            last_request: Mutex::new(HashMap::new()),
        }
    }

    // Waits until a request to `domain` is allowed, then returns
    pub async fn wait_for(&self, domain: &str) {
        let Some(slot) = self.reserve(domain) else {
            return;
        };

        let now = Instant::now();
        if slot > now {
            debug!(%domain, wait_ms = (slot - now).as_millis() as u64, "Waiting for politeness delay");
            tokio::time::sleep_until(tokio::time::Instant::from_std(slot)).await;
        }
    }

    // Claims the next request slot for `domain`
    //
    // Returns None when throttling is off or there is no domain to throttle.
    fn reserve(&self, domain: &str) -> Option<Instant> {
        let delay = self.delay?;
        let key = domain.trim().to_ascii_lowercase();
        if key.is_empty() {
            return None;
        }

        let now = Instant::now();
        let mut table = self.last_request.lock();
        let slot = match table.get(&key) {
            // On overflow the host keeps its current slot
            Some(&last) => last.checked_add(delay).map_or(last, |next| next.max(now)),
            None => now,
        };
        table.insert(key, slot);
        Some(slot)
    }

    pub fn reset(&mut self) {
        self.last_request.get_mut().clear();
    }
}
