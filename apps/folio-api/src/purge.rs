use std::{sync::Arc, time::Duration};

use folio_service::cache::QueryCache;

pub const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Removes expired cache rows until the cache is disabled.
pub async fn run_cache_purge(cache: Arc<QueryCache>) {
	loop {
		tokio::time::sleep(CACHE_PURGE_INTERVAL).await;

		if !purge_cache_once(&cache).await {
			tracing::warn!("Query cache disabled. Stopping expired entry cleanup.");

			return;
		}
	}
}

/// Returns `false` once the cache is disabled and nothing further can be purged.
pub async fn purge_cache_once(cache: &QueryCache) -> bool {
	if !cache.is_enabled() {
		return false;
	}

	let purged = cache.purge_expired().await;

	if purged > 0 {
		tracing::info!(count = purged, "Purged expired query cache entries.");
	}

	cache.is_enabled()
}
