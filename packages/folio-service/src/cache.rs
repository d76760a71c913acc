//! Fail-open read-through cache for hydrated results.
//!
//! A [`QueryCache`] is either `Noop` or `Active`. An active handle disables itself for the rest
//! of the process on its first backend error and from then on behaves like `Noop`. Cache
//! failures are logged and never reach the caller.

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::{BoxFuture, Error, Result};

pub const CACHE_SCHEMA_VERSION: i32 = 1;

pub trait CacheBackend
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

	fn set<'a>(
		&'a self,
		key: &'a str,
		payload: &'a Value,
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>>;

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>>;

	/// Drops every expired entry and returns how many were removed.
	fn purge_expired(&self) -> BoxFuture<'_, Result<u64>>;
}

/// Stores entries in the `query_cache` table.
pub struct PgCacheBackend {
	pool: PgPool,
	max_payload_bytes: Option<u64>,
}
impl PgCacheBackend {
	pub fn new(pool: PgPool, max_payload_bytes: Option<u64>) -> Self {
		Self { pool, max_payload_bytes }
	}

	async fn store(&self, key: &str, payload: &Value, ttl: Duration) -> Result<()> {
		let raw = serde_json::to_vec(payload).map_err(|err| Error::Cache {
			message: format!("Failed to encode cache payload: {err}"),
		})?;
		let payload_bytes = raw.len() as u64;

		if let Some(max) = self.max_payload_bytes
			&& payload_bytes > max
		{
			tracing::info!(
				cache_key_prefix = cache_key_prefix(key),
				payload_bytes,
				max_payload_bytes = max,
				"Cache payload exceeds limit. Skipping cache write."
			);

			return Ok(());
		}

		let Ok(payload_bytes) = i32::try_from(payload_bytes) else {
			return Ok(());
		};
		let now = OffsetDateTime::now_utc();

		folio_storage::cache::store_payload(&self.pool, key, payload, payload_bytes, now, now + ttl)
			.await?;

		Ok(())
	}
}

impl CacheBackend for PgCacheBackend {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move {
			let payload =
				folio_storage::cache::fetch_payload(&self.pool, key, OffsetDateTime::now_utc())
					.await?;

			Ok(payload)
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		payload: &'a Value,
		ttl: Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.store(key, payload, ttl))
	}

	fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			folio_storage::cache::delete_payload(&self.pool, key).await?;

			Ok(())
		})
	}

	fn purge_expired(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move {
			let purged =
				folio_storage::cache::purge_expired(&self.pool, OffsetDateTime::now_utc()).await?;

			Ok(purged)
		})
	}
}

pub enum CacheMode {
	Active { backend: Arc<dyn CacheBackend>, disabled: AtomicBool },
	Noop,
}

pub struct QueryCache {
	mode: CacheMode,
	ttl: Duration,
}
impl QueryCache {
	pub fn active(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
		Self { mode: CacheMode::Active { backend, disabled: AtomicBool::new(false) }, ttl }
	}

	pub fn noop() -> Self {
		Self { mode: CacheMode::Noop, ttl: Duration::ZERO }
	}

	pub fn from_config(cfg: &folio_config::Cache, pool: PgPool) -> Self {
		if !cfg.enabled {
			return Self::noop();
		}

		Self::active(
			Arc::new(PgCacheBackend::new(pool, cfg.max_payload_bytes)),
			Duration::from_secs(cfg.ttl_secs),
		)
	}

	pub fn is_enabled(&self) -> bool {
		self.backend().is_some()
	}

	/// Returns the cached value, or `None` on a miss, an undecodable payload, or a disabled cache.
	pub async fn get<T>(&self, key: &CacheKey) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let backend = self.backend()?;
		let payload = match backend.get(key.as_str()).await {
			Ok(Some(payload)) => payload,
			Ok(None) => {
				tracing::info!(cache_key_prefix = key.prefix(), "Cache miss.");

				return None;
			},
			Err(err) => {
				self.trip("get", &err);

				return None;
			},
		};

		match serde_json::from_value(payload) {
			Ok(value) => {
				tracing::info!(cache_key_prefix = key.prefix(), "Cache hit.");

				Some(value)
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					cache_key_prefix = key.prefix(),
					"Cache payload decode failed. Treating as miss."
				);

				None
			},
		}
	}

	pub async fn set<T>(&self, key: &CacheKey, value: &T)
	where
		T: Serialize,
	{
		let Some(backend) = self.backend() else {
			return;
		};
		let payload = match serde_json::to_value(value) {
			Ok(payload) => payload,
			Err(err) => {
				tracing::warn!(
					error = %err,
					cache_key_prefix = key.prefix(),
					"Cache payload encode failed. Skipping cache write."
				);

				return;
			},
		};

		if let Err(err) = backend.set(key.as_str(), &payload, self.ttl).await {
			self.trip("set", &err);
		}
	}

	pub async fn delete(&self, key: &CacheKey) {
		let Some(backend) = self.backend() else {
			return;
		};

		if let Err(err) = backend.delete(key.as_str()).await {
			self.trip("delete", &err);
		}
	}

	/// Returns the number of expired entries removed. A disabled cache purges nothing.
	pub async fn purge_expired(&self) -> u64 {
		let Some(backend) = self.backend() else {
			return 0;
		};

		match backend.purge_expired().await {
			Ok(purged) => purged,
			Err(err) => {
				self.trip("purge_expired", &err);

				0
			},
		}
	}

	fn backend(&self) -> Option<&dyn CacheBackend> {
		match &self.mode {
			CacheMode::Active { backend, disabled } if !disabled.load(Ordering::Acquire) =>
				Some(backend.as_ref()),
			_ => None,
		}
	}

	fn trip(&self, operation: &'static str, err: &Error) {
		if let CacheMode::Active { disabled, .. } = &self.mode
			&& !disabled.swap(true, Ordering::AcqRel)
		{
			tracing::warn!(
				operation,
				error = %err,
				"Cache backend failed. Disabling the cache for this process."
			);
		}
	}
}

/// `<kind>:<blake3 hex>` over the canonical JSON of a normalized request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKey(String);
impl CacheKey {
	pub fn for_request<T>(kind: &'static str, request: &T) -> Result<Self>
	where
		T: Serialize,
	{
		let request = serde_json::to_value(request).map_err(|err| Error::Cache {
			message: format!("Failed to encode cache key payload: {err}"),
		})?;
		let payload = serde_json::json!({
			"kind": kind,
			"schema_version": CACHE_SCHEMA_VERSION,
			"request": request,
		});

		Ok(Self(format!("{kind}:{}", hash_cache_key(&payload)?)))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Short form for logs.
	pub fn prefix(&self) -> &str {
		cache_key_prefix(&self.0)
	}
}

pub fn hash_cache_key(payload: &Value) -> Result<String> {
	let raw = serde_json::to_vec(payload).map_err(|err| Error::Cache {
		message: format!("Failed to encode cache key payload: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

pub fn cache_key_prefix(key: &str) -> &str {
	let hash_start = key.find(':').map(|idx| idx + 1).unwrap_or(0);
	let end = key.len().min(hash_start + 12);

	&key[..end]
}

#[cfg(test)]
mod tests {
	use std::{
		collections::HashMap,
		sync::{
			Arc, Mutex,
			atomic::{AtomicUsize, Ordering},
		},
		time::Duration,
	};

	use serde_json::{Value, json};

	use crate::{
		BoxFuture, Error, Result,
		cache::{CacheBackend, CacheKey, QueryCache},
	};

	#[derive(Default)]
	struct MemoryBackend {
		entries: Mutex<HashMap<String, Value>>,
	}
	impl CacheBackend for MemoryBackend {
		fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
			Box::pin(async move {
				Ok(self.entries.lock().expect("Cache lock poisoned.").get(key).cloned())
			})
		}

		fn set<'a>(
			&'a self,
			key: &'a str,
			payload: &'a Value,
			_ttl: Duration,
		) -> BoxFuture<'a, Result<()>> {
			Box::pin(async move {
				self.entries
					.lock()
					.expect("Cache lock poisoned.")
					.insert(key.to_string(), payload.clone());

				Ok(())
			})
		}

		fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<()>> {
			Box::pin(async move {
				self.entries.lock().expect("Cache lock poisoned.").remove(key);

				Ok(())
			})
		}

		fn purge_expired(&self) -> BoxFuture<'_, Result<u64>> {
			Box::pin(async move { Ok(0) })
		}
	}

	#[derive(Default)]
	struct FailingBackend {
		calls: AtomicUsize,
	}
	impl FailingBackend {
		fn fail(&self) -> Result<()> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Err(Error::Cache { message: "backend unreachable".to_string() })
		}
	}
	impl CacheBackend for FailingBackend {
		fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
			Box::pin(async move { self.fail().map(|_| None) })
		}

		fn set<'a>(
			&'a self,
			_key: &'a str,
			_payload: &'a Value,
			_ttl: Duration,
		) -> BoxFuture<'a, Result<()>> {
			Box::pin(async move { self.fail() })
		}

		fn delete<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<()>> {
			Box::pin(async move { self.fail() })
		}

		fn purge_expired(&self) -> BoxFuture<'_, Result<u64>> {
			Box::pin(async move { self.fail().map(|_| 0) })
		}
	}

	fn key(take: i64) -> CacheKey {
		CacheKey::for_request("posts", &json!({ "take": take })).expect("Key should build.")
	}

	#[test]
	fn keys_are_stable_and_request_sensitive() {
		assert_eq!(key(3), key(3));
		assert_ne!(key(3), key(4));
		assert!(key(3).as_str().starts_with("posts:"));
		assert_eq!(key(3).prefix().len(), "posts:".len() + 12);
		assert_ne!(
			CacheKey::for_request("videos", &json!({ "take": 3 })).expect("Key should build."),
			key(3)
		);
	}

	#[tokio::test]
	async fn active_cache_round_trips_values() {
		let cache = QueryCache::active(Arc::new(MemoryBackend::default()), Duration::from_secs(60));

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);

		cache.set(&key(1), &vec!["a".to_string()]).await;

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, Some(vec!["a".to_string()]));

		cache.delete(&key(1)).await;

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);
	}

	#[tokio::test]
	async fn undecodable_payloads_are_misses() {
		let backend = Arc::new(MemoryBackend::default());
		let cache = QueryCache::active(backend.clone(), Duration::from_secs(60));

		cache.set(&key(1), &json!({ "not": "a list" })).await;

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);
		assert!(cache.is_enabled());
	}

	#[tokio::test]
	async fn first_backend_error_disables_the_cache_permanently() {
		let backend = Arc::new(FailingBackend::default());
		let cache = QueryCache::active(backend.clone(), Duration::from_secs(60));

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);
		assert!(!cache.is_enabled());

		cache.set(&key(1), &vec!["a".to_string()]).await;
		cache.delete(&key(1)).await;

		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);
		assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn noop_cache_never_stores() {
		let cache = QueryCache::noop();

		cache.set(&key(1), &vec!["a".to_string()]).await;

		assert!(!cache.is_enabled());
		assert_eq!(cache.get::<Vec<String>>(&key(1)).await, None);
	}

	#[tokio::test]
	async fn purge_failures_disable_the_cache() {
		let backend = Arc::new(FailingBackend::default());
		let cache = QueryCache::active(backend.clone(), Duration::from_secs(60));

		assert_eq!(cache.purge_expired().await, 0);
		assert!(!cache.is_enabled());
		assert_eq!(cache.purge_expired().await, 0);
		assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
		assert_eq!(QueryCache::noop().purge_expired().await, 0);
	}
}
