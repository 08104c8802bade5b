//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with last-touch bookkeeping.

use std::time::Instant;

// == Cache Entry ==
/// A single cache entry: an identified value plus the time it was last
/// touched. Identity is by `id`; two entries with the same id are the same
/// logical item.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Unique identifier for the stored value
    pub id: String,
    /// The stored value
    pub value: T,
    /// Time of last touch (insert, touch, or update)
    pub(crate) last_touch: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry touched "now".
    pub fn new(id: impl Into<String>, value: T) -> Self {
        Self {
            id: id.into(),
            value,
            last_touch: Instant::now(),
        }
    }

    // == Is Stale ==
    /// Checks whether this entry has gone stale, i.e. has not been touched
    /// within `timeout`.
    pub fn is_stale(&self, timeout: std::time::Duration) -> bool {
        self.last_touch.elapsed() > timeout
    }

    // == Refresh ==
    /// Resets the last-touch timestamp to now, delaying expiry.
    pub(crate) fn refresh(&mut self) {
        self.last_touch = Instant::now();
    }

    /// Time of the entry's last touch.
    pub fn last_touch(&self) -> Instant {
        self.last_touch
    }
}
