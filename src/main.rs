//! Recency Cache demo host
//!
//! Drives a cache through a typical workload and prints the final statistics.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recency_cache::{Cache, CacheConfig};

const WORKERS: usize = 5;
const ITEMS_PER_WORKER: usize = 100;

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the background reaper)
/// 4. Run the workload
/// 5. Print stats and stop the reaper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recency_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, reaper_interval={}s",
        config.max_entries, config.default_ttl, config.reaper_interval
    );

    let cache = Arc::new(Cache::<String>::from_config(&config));

    basic_operations(&cache)?;
    eviction(&cache, config.max_entries)?;
    expiration(&cache).await?;
    concurrent_access(&cache).await?;
    delete_and_clear(&cache)?;

    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    let cache = Arc::try_unwrap(cache)
        .map_err(|_| anyhow::anyhow!("cache still shared at shutdown"))?;
    cache.shutdown().await;
    info!("Demo complete");

    Ok(())
}

fn basic_operations(cache: &Cache<String>) -> anyhow::Result<()> {
    cache.put("config:db_host", "localhost:5432".to_string(), None)?;
    cache.put(
        "config:api_key",
        "abc123".to_string(),
        Some(Duration::from_secs(60)),
    )?;

    ensure!(cache.get("config:db_host").as_deref() == Some("localhost:5432"));
    ensure!(cache.get("config:api_key").as_deref() == Some("abc123"));
    info!("Basic put/get ok");
    Ok(())
}

fn eviction(cache: &Cache<String>, max_entries: usize) -> anyhow::Result<()> {
    let total = max_entries + max_entries / 5;
    for i in 0..total {
        cache.put(format!("data:{i}"), format!("value_{i}"), None)?;
    }

    ensure!(cache.len() <= max_entries, "capacity exceeded");
    if max_entries > 0 {
        ensure!(cache.get("data:0").is_none(), "oldest key survived");
        let newest = format!("data:{}", total - 1);
        ensure!(cache.get(&newest).is_some(), "newest key evicted");
    }
    info!(evictions = cache.stats().evictions, "Eviction ok");
    Ok(())
}

async fn expiration(cache: &Cache<String>) -> anyhow::Result<()> {
    cache.put(
        "temp_data",
        "expires_soon".to_string(),
        Some(Duration::from_millis(500)),
    )?;
    tokio::time::sleep(Duration::from_millis(800)).await;

    ensure!(cache.get("temp_data").is_none(), "entry outlived its TTL");
    info!("Expiration ok");
    Ok(())
}

async fn concurrent_access(cache: &Arc<Cache<String>>) -> anyhow::Result<()> {
    let mut workers = Vec::with_capacity(WORKERS);

    for worker in 0..WORKERS {
        let cache = Arc::clone(cache);
        workers.push(tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            for i in 0..ITEMS_PER_WORKER {
                cache.put(format!("thread_{worker}:item_{i}"), format!("data_{i}"), None)?;
                let _ = cache.get(&format!("thread_{worker}:item_{}", i / 2));
            }
            Ok(())
        }));
    }

    for worker in workers {
        worker.await.context("worker panicked")??;
    }
    info!(size = cache.len(), "Concurrent access ok");
    Ok(())
}

fn delete_and_clear(cache: &Cache<String>) -> anyhow::Result<()> {
    cache.put("temp_key", "delete_me".to_string(), None)?;
    ensure!(cache.delete("temp_key"));
    ensure!(cache.get("temp_key").is_none());

    let before = cache.stats();
    info!(
        hits = before.hits,
        misses = before.misses,
        hit_rate = before.hit_rate,
        "Stats before clear"
    );

    cache.clear();
    ensure!(cache.is_empty());
    info!("Delete and clear ok");
    Ok(())
}
