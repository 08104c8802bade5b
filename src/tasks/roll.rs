//! Statistics Roll Task
//!
//! Background task that closes the statistics window on a fixed cadence.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::stats::StatsWindow;

/// Spawns a background task that rolls the statistics window every window
/// length: the finished window's request count folds into the peak and the
/// counter resets.
pub fn spawn_roll_task(stats: Arc<StatsWindow>) -> JoinHandle<()> {
    let window = stats.window();

    tokio::spawn(async move {
        info!("starting statistics roll task with window of {:?}", window);

        loop {
            tokio::time::sleep(window).await;
            stats.roll();
            debug!(peak = stats.peak_load(), "statistics window rolled");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_roll_task_folds_count_into_peak() {
        let stats = Arc::new(StatsWindow::new(Duration::from_millis(100)));

        stats.record("a");
        stats.record("b");

        let handle = spawn_roll_task(stats.clone());
        tokio::time::sleep(Duration::from_millis(250)).await;

        // At least one roll has happened; the two requests are in the peak.
        assert_eq!(stats.peak_load(), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_roll_task_can_be_aborted() {
        let stats = Arc::new(StatsWindow::new(Duration::from_secs(30)));

        let handle = spawn_roll_task(stats);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }
}
