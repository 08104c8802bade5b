//! Request Mediator Module
//!
//! The glue between the dispatcher and the wiki backend: each operation kind
//! consults its own cache, falls back to the backend on a miss, and records a
//! statistics event. The whole check-then-populate sequence for one operation
//! kind runs inside that kind's mutex, so no two concurrent callers ever fetch
//! the same key from the backend twice.

mod path;
pub mod query;

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::WikiBackend;
use crate::cache::{CacheEntry, TtlCache};
use crate::config::Config;
use crate::error::{Result, WikiError};
use crate::stats::StatsWindow;

pub use query::{Combinator, Condition, ConditionField, QueryPlan, Selector};

/// Shared handle to one of the mediator's typed caches.
pub type SharedCache<V> = Arc<Mutex<TtlCache<CachedResult<V>>>>;

// == Cached Result ==
/// A backend result held in a cache: the value plus a per-item access
/// counter, shared across clones so hits recorded on a copy are visible in
/// the cache.
#[derive(Debug, Clone)]
pub struct CachedResult<V> {
    pub value: V,
    access_count: Arc<AtomicU64>,
}

impl<V> CachedResult<V> {
    /// Wraps a freshly fetched value with an access count of 1.
    fn new(value: V) -> Self {
        Self {
            value,
            access_count: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Number of times this item has been served, the initial fetch included.
    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::SeqCst)
    }

    fn record_access(&self) {
        self.access_count.fetch_add(1, Ordering::SeqCst);
    }
}

// == Wiki Mediator ==
/// Executes wiki operations through per-kind caches backed by a
/// [`WikiBackend`], recording request statistics as it goes.
pub struct WikiMediator {
    backend: Arc<dyn WikiBackend>,
    stats: Arc<StatsWindow>,
    search_cache: SharedCache<Vec<String>>,
    page_cache: SharedCache<String>,
    connected_cache: SharedCache<Vec<String>>,
    path_cache: SharedCache<Vec<String>>,
    path_budget: Duration,
}

impl WikiMediator {
    // == Constructor ==
    /// Creates a mediator over the given backend with cache and statistics
    /// parameters taken from the configuration.
    pub fn new(backend: Arc<dyn WikiBackend>, config: &Config) -> Self {
        let capacity = config.cache_capacity;
        let timeout = Duration::from_secs(config.cache_timeout);
        Self {
            backend,
            stats: Arc::new(StatsWindow::new(Duration::from_secs(config.stats_window))),
            search_cache: Arc::new(Mutex::new(TtlCache::new(capacity, timeout))),
            page_cache: Arc::new(Mutex::new(TtlCache::new(capacity, timeout))),
            connected_cache: Arc::new(Mutex::new(TtlCache::new(capacity, timeout))),
            path_cache: Arc::new(Mutex::new(TtlCache::new(capacity, timeout))),
            path_budget: Duration::from_secs(config.path_budget),
        }
    }

    /// Statistics window shared with the roll task.
    pub fn stats(&self) -> Arc<StatsWindow> {
        self.stats.clone()
    }

    /// Cache handles shared with the sweep tasks.
    pub fn search_cache(&self) -> SharedCache<Vec<String>> {
        self.search_cache.clone()
    }

    pub fn page_cache(&self) -> SharedCache<String> {
        self.page_cache.clone()
    }

    pub fn connected_cache(&self) -> SharedCache<Vec<String>> {
        self.connected_cache.clone()
    }

    pub fn path_cache(&self) -> SharedCache<Vec<String>> {
        self.path_cache.clone()
    }

    // == Cache-Aside Core ==
    /// One cache-aside round: hit touches the entry and bumps its counter;
    /// miss awaits `fetch` and populates. The cache mutex is held across the
    /// fetch, which is what serializes concurrent misses of one operation
    /// kind.
    async fn cache_aside<V: Clone>(
        &self,
        cache: &Mutex<TtlCache<CachedResult<V>>>,
        key: &str,
        fetch: impl Future<Output = Result<V>>,
    ) -> Result<V> {
        let mut guard = cache.lock().await;
        match guard.get(key) {
            Ok(entry) => {
                guard.touch(key);
                entry.value.record_access();
                debug!(key, "cache hit");
                Ok(entry.value.value)
            }
            Err(WikiError::NotFound(_)) => {
                debug!(key, "cache miss, fetching from backend");
                let value = fetch.await?;
                guard.put(CacheEntry::new(key, CachedResult::new(value.clone())));
                Ok(value)
            }
            Err(other) => Err(other),
        }
    }

    // == Simple Search ==
    /// Up to `limit` page titles matching a free-text query, sorted
    /// alphabetically.
    pub async fn simple_search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.stats.record(query);
        let backend = self.backend.clone();
        self.cache_aside(&self.search_cache, query, async move {
            let mut titles = backend.search(query, limit).await?;
            titles.sort();
            Ok(titles)
        })
        .await
    }

    // == Get Page ==
    /// The text of the page with the given title; empty if no page matches.
    pub async fn get_page(&self, title: &str) -> Result<String> {
        self.stats.record(title);
        let backend = self.backend.clone();
        self.cache_aside(&self.page_cache, title, async move {
            Ok(backend.page_text(title).await?)
        })
        .await
    }

    // == Get Connected Pages ==
    /// Every page title reachable from `title` by following up to `hops`
    /// links, the starting title included. `hops` of zero yields only the
    /// starting title.
    pub async fn get_connected_pages(&self, title: &str, hops: u32) -> Result<Vec<String>> {
        self.stats.mark_request();
        let key = format!("{title}#{hops}");
        self.cache_aside(&self.connected_cache, &key, self.crawl_connected(title, hops))
            .await
    }

    /// Frontier-at-a-time link traversal with an explicit visited set.
    async fn crawl_connected(&self, title: &str, hops: u32) -> Result<Vec<String>> {
        let mut included = vec![title.to_string()];
        let mut seen: HashSet<String> = included.iter().cloned().collect();
        let mut frontier = vec![title.to_string()];

        for _ in 0..hops {
            let mut next = Vec::new();
            for page in &frontier {
                for link in self.backend.links_on_page(page).await? {
                    if seen.insert(link.clone()) {
                        included.push(link.clone());
                        next.push(link);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Ok(included)
    }

    // == Get Path ==
    /// A shortest chain of page links from `start` to `stop`, both
    /// inclusive. Empty when no path was found within the wall-clock budget.
    pub async fn get_path(&self, start: &str, stop: &str) -> Result<Vec<String>> {
        self.stats.mark_request();
        let key = format!("{start}->{stop}");
        self.cache_aside(&self.path_cache, &key, self.bfs_path(start, stop))
            .await
    }

    // == Zeitgeist ==
    /// The most frequent search/page keys over the whole history, most
    /// frequent first, up to `limit`.
    pub async fn zeitgeist(&self, limit: usize) -> Result<Vec<String>> {
        self.stats.mark_request();
        Ok(self.stats.most_frequent(limit))
    }

    // == Trending ==
    /// Like [`zeitgeist`](WikiMediator::zeitgeist) but restricted to the
    /// current statistics window.
    pub async fn trending(&self, limit: usize) -> Result<Vec<String>> {
        self.stats.mark_request();
        Ok(self.stats.most_frequent_recent(limit))
    }

    // == Peak Load ==
    /// The largest number of requests seen in any statistics window so far,
    /// the window in progress included.
    pub async fn peak_load_30s(&self) -> Result<u64> {
        self.stats.mark_request();
        Ok(self.stats.peak_load())
    }

    // == Execute Query ==
    /// Evaluates a parsed structured query against the backend.
    pub async fn execute_query(&self, plan: &QueryPlan) -> Result<Vec<String>> {
        self.stats.mark_request();
        query::execute(plan, self.backend.as_ref()).await
    }
}
