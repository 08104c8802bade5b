//! Statistics Window Module
//!
//! Tracks request frequency and peak per-window load for the mediator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Returns the current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// == Stats Window ==
/// Append-only log of (request key, timestamp) pairs plus a rolling
/// peak-concurrency counter over a fixed window.
///
/// All methods take `&self`: the log sits behind its own mutex and the
/// counters are atomics, so concurrent recorders never lose increments.
#[derive(Debug)]
pub struct StatsWindow {
    /// Ordered log of keyed requests with epoch-millisecond timestamps
    log: Mutex<Vec<(String, i64)>>,
    /// Requests seen since the window last rolled
    request_count: AtomicU64,
    /// Highest request count observed over any completed window
    peak_request_count: AtomicU64,
    /// Window length
    window: Duration,
}

impl StatsWindow {
    // == Constructor ==
    /// Creates an empty statistics window of the given length.
    pub fn new(window: Duration) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            request_count: AtomicU64::new(0),
            peak_request_count: AtomicU64::new(0),
            window,
        }
    }

    /// Window length this instance was created with.
    pub fn window(&self) -> Duration {
        self.window
    }

    // == Record ==
    /// Appends a keyed request to the log and counts it toward the current
    /// window.
    pub fn record(&self, key: &str) {
        self.log
            .lock()
            .expect("stats log lock poisoned")
            .push((key.to_string(), now_millis()));
        self.request_count.fetch_add(1, Ordering::SeqCst);
    }

    // == Mark Request ==
    /// Counts a request toward the current window without logging a key.
    /// Used by operations that have no meaningful frequency key.
    pub fn mark_request(&self) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
    }

    // == Most Frequent ==
    /// Returns up to `limit` keys sorted by all-time occurrence count,
    /// descending. Ties keep the insertion order of each key's first
    /// occurrence.
    pub fn most_frequent(&self, limit: usize) -> Vec<String> {
        let log = self.log.lock().expect("stats log lock poisoned");
        Self::rank(log.iter(), limit)
    }

    // == Most Frequent Recent ==
    /// Like [`most_frequent`](StatsWindow::most_frequent) but restricted to
    /// requests recorded within the last window.
    pub fn most_frequent_recent(&self, limit: usize) -> Vec<String> {
        let cutoff = now_millis() - self.window.as_millis() as i64;
        let log = self.log.lock().expect("stats log lock poisoned");
        Self::rank(log.iter().filter(|(_, ts)| *ts >= cutoff), limit)
    }

    fn rank<'a>(entries: impl Iterator<Item = &'a (String, i64)>, limit: usize) -> Vec<String> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for (key, _) in entries {
            let count = counts.entry(key.as_str()).or_insert(0);
            if *count == 0 {
                order.push(key.as_str());
            }
            *count += 1;
        }

        // Stable sort keeps first-occurrence order among equal counts.
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(limit);
        order.into_iter().map(str::to_string).collect()
    }

    // == Peak Load ==
    /// Highest per-window request count seen so far, including the window in
    /// progress.
    pub fn peak_load(&self) -> u64 {
        let current = self.request_count.load(Ordering::SeqCst);
        let peak = self.peak_request_count.load(Ordering::SeqCst);
        peak.max(current)
    }

    // == Roll ==
    /// Closes the current window: folds its count into the peak and resets
    /// the counter. Swap-then-max keeps concurrent `record` calls from being
    /// dropped or double counted.
    pub fn roll(&self) {
        let finished = self.request_count.swap(0, Ordering::SeqCst);
        self.peak_request_count.fetch_max(finished, Ordering::SeqCst);
    }

    // == Log Length ==
    /// Number of keyed requests logged since creation.
    pub fn log_len(&self) -> usize {
        self.log.lock().expect("stats log lock poisoned").len()
    }

    /// Test hook: appends a keyed request with an explicit timestamp.
    #[cfg(test)]
    fn record_at(&self, key: &str, ts: i64) {
        self.log
            .lock()
            .expect("stats log lock poisoned")
            .push((key.to_string(), ts));
        self.request_count.fetch_add(1, Ordering::SeqCst);
    }
}
