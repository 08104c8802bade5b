//! Cache Module
//!
//! Provides a bounded, generic cache with idle-timeout expiry and
//! least-recently-touched eviction.

mod entry;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use store::TtlCache;

// == Public Constants ==
/// Default number of entries a cache can hold
pub const DEFAULT_CAPACITY: usize = 32;

/// Default idle timeout in seconds before an entry goes stale
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
