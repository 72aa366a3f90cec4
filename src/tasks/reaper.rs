//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries so that
//! entries nobody reads again do not hold memory until evicted.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Default period between sweeps.
pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(1);

// Shorter periods would keep the lock hot for no benefit
const MIN_REAPER_INTERVAL: Duration = Duration::from_millis(10);

/// Where the sweep loop runs.
#[derive(Debug)]
enum Worker {
    /// Task on the caller's Tokio runtime
    Task(JoinHandle<()>),
    /// Dedicated thread driving its own single-threaded runtime
    Thread(thread::JoinHandle<()>),
}

// == Reaper Handle ==
/// Owner of a running reaper.
///
/// Dropping the handle signals the reaper to stop; it exits at its next
/// wake-up without needing to be joined.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    worker: Option<Worker>,
}

impl ReaperHandle {
    // == Stop ==
    /// Signals the reaper to stop. Idempotent.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    // == Is Running ==
    /// Returns true while the sweep loop has not finished.
    pub fn is_running(&self) -> bool {
        match &self.worker {
            Some(Worker::Task(task)) => !task.is_finished(),
            Some(Worker::Thread(handle)) => !handle.is_finished(),
            None => false,
        }
    }

    // == Join ==
    /// Stops the reaper and waits for it to exit.
    pub async fn join(mut self) {
        self.stop();
        match self.worker.take() {
            Some(Worker::Task(task)) => {
                if let Err(err) = task.await {
                    warn!(error = %err, "TTL reaper ended abnormally");
                }
            }
            Some(Worker::Thread(handle)) => {
                let joined = tokio::task::spawn_blocking(move || handle.join()).await;
                if !matches!(joined, Ok(Ok(()))) {
                    warn!("TTL reaper thread ended abnormally");
                }
            }
            None => {}
        }
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts a reaper that purges expired entries every `interval`.
///
/// Each sweep takes the store lock once, removes every expired key through
/// the store's removal path and releases the lock before sleeping again.
///
/// Inside a Tokio runtime the reaper is a task on that runtime. Outside of
/// one it runs on a dedicated `cache-reaper` thread, which does not keep the
/// process alive.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::<String>::new(1000, Duration::from_secs(300))));
/// let reaper = spawn_reaper(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// reaper.join().await;
/// ```
pub fn spawn_reaper<V>(store: Arc<Mutex<CacheStore<V>>>, interval: Duration) -> ReaperHandle
where
    V: Send + 'static,
{
    let interval = interval.max(MIN_REAPER_INTERVAL);
    let (shutdown, shutdown_rx) = watch::channel(false);

    let worker = match Handle::try_current() {
        Ok(runtime) => Some(Worker::Task(
            runtime.spawn(run_sweeps(store, interval, shutdown_rx)),
        )),
        Err(_) => spawn_reaper_thread(store, interval, shutdown_rx),
    };

    ReaperHandle { shutdown, worker }
}

fn spawn_reaper_thread<V>(
    store: Arc<Mutex<CacheStore<V>>>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> Option<Worker>
where
    V: Send + 'static,
{
    let spawned = thread::Builder::new()
        .name("cache-reaper".to_string())
        .spawn(move || {
            match Builder::new_current_thread().enable_time().build() {
                Ok(runtime) => runtime.block_on(run_sweeps(store, interval, shutdown_rx)),
                Err(err) => warn!(error = %err, "failed to build TTL reaper runtime"),
            }
        });

    match spawned {
        Ok(handle) => Some(Worker::Thread(handle)),
        Err(err) => {
            warn!(error = %err, "failed to spawn TTL reaper thread; expiry only on read");
            None
        }
    }
}

async fn run_sweeps<V>(
    store: Arc<Mutex<CacheStore<V>>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Starting TTL reaper"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            // Either a stop request or the handle was dropped
            _ = shutdown_rx.changed() => break,
        }

        let removed = store.lock().purge_expired();

        if removed > 0 {
            info!("TTL reaper: removed {} expired entries", removed);
        } else {
            debug!("TTL reaper: no expired entries found");
        }
    }

    info!("TTL reaper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_store(max_entries: usize) -> Arc<Mutex<CacheStore<String>>> {
        Arc::new(Mutex::new(CacheStore::new(
            max_entries,
            Duration::from_secs(300),
        )))
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let store = shared_store(100);
        store
            .lock()
            .put(
                "expire_soon".to_string(),
                "value".to_string(),
                Some(Duration::from_millis(100)),
            )
            .unwrap();

        let reaper = spawn_reaper(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(400)).await;

        {
            let guard = store.lock();
            assert!(guard.is_empty(), "Expired entry should have been reaped");
            assert_eq!(guard.stats().expired_removals, 1);
            // Reaping is not a lookup
            assert_eq!(guard.stats().total_requests, 0);
        }

        reaper.join().await;
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let store = shared_store(100);
        store
            .lock()
            .put(
                "long_lived".to_string(),
                "value".to_string(),
                Some(Duration::from_secs(3600)),
            )
            .unwrap();

        let reaper = spawn_reaper(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.lock().get("long_lived"), Some("value".to_string()));

        reaper.join().await;
    }

    #[tokio::test]
    async fn test_reaper_stops_on_signal() {
        let reaper = spawn_reaper(shared_store(10), Duration::from_secs(3600));
        assert!(reaper.is_running());

        reaper.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!reaper.is_running(), "Task should be finished after stop");
    }

    #[tokio::test]
    async fn test_reaper_join_returns_promptly() {
        let reaper = spawn_reaper(shared_store(10), Duration::from_secs(3600));

        tokio::time::timeout(Duration::from_secs(1), reaper.join())
            .await
            .expect("join should not wait for the next tick");
    }

    #[tokio::test]
    async fn test_reaper_stops_when_handle_dropped() {
        let store = shared_store(10);
        let reaper = spawn_reaper(store.clone(), Duration::from_secs(3600));

        drop(reaper);
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The task released its clone of the store on exit
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[test]
    fn test_reaper_runs_without_runtime() {
        let store = shared_store(100);
        store
            .lock()
            .put(
                "expire_soon".to_string(),
                "value".to_string(),
                Some(Duration::from_millis(100)),
            )
            .unwrap();

        let reaper = spawn_reaper(store.clone(), Duration::from_millis(50));
        assert!(reaper.is_running());

        std::thread::sleep(Duration::from_millis(400));
        assert!(store.lock().is_empty(), "Expired entry should have been reaped");

        drop(reaper);
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[test]
    fn test_thread_reaper_join() {
        let reaper = spawn_reaper(shared_store(10), Duration::from_secs(3600));
        assert!(matches!(reaper.worker, Some(Worker::Thread(_))));

        tokio_test::block_on(async {
            tokio::time::timeout(Duration::from_secs(1), reaper.join())
                .await
                .expect("join should not wait for the next tick");
        });
    }
}
