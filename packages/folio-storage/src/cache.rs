//! Reads and writes for the `query_cache` table.

use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::Result;

/// Returns the unexpired payload for `key` and records the hit.
pub async fn fetch_payload(pool: &PgPool, key: &str, now: OffsetDateTime) -> Result<Option<Value>> {
	let payload = sqlx::query_scalar::<_, Value>(
		"\
UPDATE query_cache
SET last_accessed_at = $2, hit_count = hit_count + 1
WHERE cache_key = $1 AND expires_at > $2
RETURNING payload",
	)
	.bind(key)
	.bind(now)
	.fetch_optional(pool)
	.await?;

	Ok(payload)
}

pub async fn store_payload(
	pool: &PgPool,
	key: &str,
	payload: &Value,
	payload_bytes: i32,
	now: OffsetDateTime,
	expires_at: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO query_cache (
	cache_key,
	payload,
	payload_bytes,
	created_at,
	last_accessed_at,
	expires_at,
	hit_count
)
VALUES ($1, $2, $3, $4, $4, $5, 0)
ON CONFLICT (cache_key) DO UPDATE
SET
	payload = EXCLUDED.payload,
	payload_bytes = EXCLUDED.payload_bytes,
	created_at = EXCLUDED.created_at,
	last_accessed_at = EXCLUDED.last_accessed_at,
	expires_at = EXCLUDED.expires_at,
	hit_count = 0",
	)
	.bind(key)
	.bind(payload)
	.bind(payload_bytes)
	.bind(now)
	.bind(expires_at)
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn delete_payload(pool: &PgPool, key: &str) -> Result<bool> {
	let result =
		sqlx::query("DELETE FROM query_cache WHERE cache_key = $1").bind(key).execute(pool).await?;

	Ok(result.rows_affected() > 0)
}

pub async fn purge_expired(pool: &PgPool, now: OffsetDateTime) -> Result<u64> {
	let result = sqlx::query("DELETE FROM query_cache WHERE expires_at <= $1")
		.bind(now)
		.execute(pool)
		.await?;

	Ok(result.rows_affected())
}
