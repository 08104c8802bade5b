//! Cache Sweep Task
//!
//! Background task that periodically removes stale cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a background task that sweeps a cache at a fixed interval.
///
/// Each cycle sleeps, then takes the cache's own lock to remove every entry
/// whose idle time exceeds the cache timeout, so sweeps never interleave
/// with the mediator's operations on the same cache.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task<T>(cache: Arc<Mutex<TtlCache<T>>>, interval_secs: u64) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
{
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!("starting cache sweep task with interval of {interval_secs} seconds");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = cache.lock().await;
                guard.sweep()
            };

            if removed > 0 {
                info!("sweep removed {removed} stale entries");
            } else {
                debug!("sweep found no stale entries");
            }
        }
    })
}
