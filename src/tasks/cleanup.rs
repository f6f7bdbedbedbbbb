//! TTL Cleanup Task
//!
//! Background housekeeping pass that deletes expired cache records, so
//! records nobody reads again do not linger in the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheRepository;

/// Spawns a background task that periodically evicts expired cache records.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between passes. A failed pass (store unreachable) is logged and retried
/// on the next tick.
///
/// # Arguments
/// * `repo` - Shared repository to evict through
/// * `cleanup_interval_secs` - Interval in seconds between passes
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let repo = Arc::new(CacheRepository::open(store, &config).await?);
/// let cleanup_handle = spawn_cleanup_task(repo.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(repo: Arc<CacheRepository>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match repo.evict_expired(None).await {
                Ok(0) => debug!("TTL cleanup: no expired documents found"),
                Ok(removed) => info!("TTL cleanup: removed {} expired documents", removed),
                Err(e) => warn!(error = %e, "TTL cleanup pass failed"),
            }
        }
    })
}
