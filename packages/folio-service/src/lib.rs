pub mod cache;
pub mod executor;
pub mod externals;
pub mod filter;
pub mod hydrate;
pub mod posts;
pub mod predicate;
pub mod topics;
pub mod videos;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use folio_config::Config;
use folio_storage::db::Db;

use crate::{
	cache::{CacheKey, QueryCache},
	filter::Page,
	hydrate::{HydrationReport, Hydrator},
	predicate::SortKey,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Arguments of a list operation. `where` and `orderBy` stay untyped until decoded per entity.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListRequest {
	#[serde(rename = "where")]
	pub filter: Option<Value>,
	pub order_by: Option<Value>,
	pub take: Option<i64>,
	pub skip: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountRequest {
	#[serde(rename = "where")]
	pub filter: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UniqueRequest {
	#[serde(rename = "where")]
	pub filter: Option<Value>,
}

/// The normalized form of a list request that identifies its cache entry.
#[derive(Serialize)]
pub(crate) struct ListCacheRequest<'a, W> {
	#[serde(rename = "where")]
	pub(crate) filter: &'a W,
	pub(crate) order: &'a [SortKey],
	pub(crate) take: Option<i64>,
	pub(crate) skip: i64,
}
impl<'a, W> ListCacheRequest<'a, W> {
	pub(crate) fn new(filter: &'a W, order: &'a [SortKey], page: Page) -> Self {
		Self { filter, order, take: page.take, skip: page.skip }
	}
}

pub struct FolioService {
	pub cfg: Config,
	pub db: Db,
	pub cache: Arc<QueryCache>,
}
impl FolioService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let cache = Arc::new(QueryCache::from_config(&cfg.cache, db.pool.clone()));

		Self { cfg, db, cache }
	}

	pub fn with_cache(cfg: Config, db: Db, cache: Arc<QueryCache>) -> Self {
		Self { cfg, db, cache }
	}

	pub(crate) fn hydrator(&self) -> Hydrator<'_> {
		Hydrator {
			pool: &self.db.pool,
			media: &self.cfg.media,
			fallback_partner: self.cfg.query.fallback_partner_id,
		}
	}

	pub(crate) async fn root_query<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		bounded(operation, self.cfg.query.root_timeout_ms, fut).await
	}

	pub(crate) async fn count_query<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		bounded(operation, self.cfg.query.count_timeout_ms, fut).await
	}

	pub(crate) async fn hydrate<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = T>,
	{
		bounded(operation, self.cfg.query.hydrate_timeout_ms, async { Ok(fut.await) }).await
	}

	/// Builds the cache key for a request, or `None` when the cache is off or the key cannot be
	/// built. Either way the request runs uncached.
	pub(crate) fn cache_key<T>(&self, kind: &'static str, request: &T) -> Option<CacheKey>
	where
		T: Serialize,
	{
		if !self.cache.is_enabled() {
			return None;
		}

		match CacheKey::for_request(kind, request) {
			Ok(key) => Some(key),
			Err(err) => {
				tracing::warn!(kind, error = %err, "Failed to build cache key. Running uncached.");

				None
			},
		}
	}

	pub(crate) async fn cached<T>(&self, key: Option<&CacheKey>) -> Option<T>
	where
		T: DeserializeOwned,
	{
		self.cache.get(key?).await
	}

	/// Writes a fresh result unless it is empty or some relation came back degraded.
	pub(crate) async fn remember<T>(
		&self,
		key: Option<&CacheKey>,
		value: &[T],
		report: &HydrationReport,
	) where
		T: Serialize,
	{
		let Some(key) = key else {
			return;
		};

		if value.is_empty() {
			return;
		}
		if report.is_degraded() {
			tracing::info!(
				cache_key_prefix = key.prefix(),
				degraded = ?report.degraded.iter().map(|kind| kind.as_str()).collect::<Vec<_>>(),
				"Skipping cache write for a degraded result."
			);

			return;
		}

		self.cache.set(key, &value).await;
	}
}

async fn bounded<T, F>(operation: &'static str, limit_ms: u64, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(Duration::from_millis(limit_ms), fut).await {
		Ok(result) => result,
		Err(_) => {
			tracing::warn!(operation, limit_ms, "Operation timed out.");

			Err(Error::Timeout { operation, elapsed_ms: limit_ms })
		},
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use serde_json::json;

	use crate::{
		Error, ListCacheRequest,
		cache::CacheKey,
		filter::{self, Page, PostWhere},
		predicate::{self, POST_SORT},
	};

	fn posts_key(raw: serde_json::Value) -> CacheKey {
		let mut filter = filter::decode::<PostWhere>(Some(&raw), "$.where")
			.expect("Filter should decode.")
			.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let order = predicate::resolve_order(&POST_SORT, &[]);
		let request = ListCacheRequest::new(&filter, &order, Page::new(Some(3), None));

		CacheKey::for_request("posts", &request).expect("Key should build.")
	}

	#[test]
	fn in_list_order_does_not_change_the_cache_key() {
		let forward = posts_key(json!({ "slug": { "in": ["a", "b"] } }));
		let reversed = posts_key(json!({ "slug": { "in": ["b", "a", "b"] } }));
		let other = posts_key(json!({ "slug": { "in": ["a", "c"] } }));

		assert_eq!(forward.as_str(), reversed.as_str());
		assert_ne!(forward.as_str(), other.as_str());
	}

	#[test]
	fn omitted_state_shares_the_published_cache_key() {
		assert_eq!(
			posts_key(json!({})).as_str(),
			posts_key(json!({ "state": { "equals": "published" } })).as_str()
		);
	}

	#[tokio::test]
	async fn bounded_operations_time_out() {
		let result = super::bounded("posts", 10, async {
			tokio::time::sleep(Duration::from_millis(200)).await;

			Ok(1)
		})
		.await;

		assert!(matches!(result, Err(Error::Timeout { operation: "posts", elapsed_ms: 10 })));
		assert_eq!(super::bounded("posts", 1_000, async { Ok(2) }).await.expect("Should finish."), 2);
	}
}
