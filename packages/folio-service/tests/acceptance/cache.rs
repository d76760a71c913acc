use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Value, json};

use folio_service::{
	BoxFuture, Error, ListRequest, Result,
	cache::{CacheBackend, QueryCache},
};
use folio_testkit::seed::{self, PostSeed};

use super::{build_service, ids, may, test_db};

struct UnreachableBackend {
	calls: AtomicUsize,
}
impl UnreachableBackend {
	fn fail(&self) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Err(Error::Cache { message: "connection refused".to_string() })
	}
}
impl CacheBackend for UnreachableBackend {
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

fn first_page() -> ListRequest {
	ListRequest {
		filter: Some(json!({ "isAdult": { "equals": false } })),
		order_by: Some(json!([{ "publishedDate": "desc" }])),
		take: Some(2),
		skip: None,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn warm_cache_matches_live_results() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping warm_cache_matches_live_results; set FOLIO_PG_DSN to run this test.");
		return;
	};
	let service = build_service(&test_db, true, None).await;
	let pool = &service.db.pool;

	for day in 1..=3 {
		seed::post(pool, &PostSeed::new(i32::from(day), "published", may(day)))
			.await
			.expect("Failed to seed post.");
	}

	let live = service.posts(first_page()).await.expect("List should succeed.");
	let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_cache")
		.fetch_one(pool)
		.await
		.expect("Failed to count cache rows.");

	assert_eq!(stored, 1);

	// A row written after the first read must not show up while the entry is warm.
	seed::post(pool, &PostSeed::new(9, "published", may(9))).await.expect("Failed to seed post.");

	let warm = service.posts(first_page()).await.expect("List should succeed.");

	assert_eq!(
		serde_json::to_value(&live).expect("Posts should serialize."),
		serde_json::to_value(&warm).expect("Posts should serialize.")
	);
	assert!(service.cache.is_enabled());

	let missing = service
		.post(folio_service::UniqueRequest { filter: Some(json!({ "id": 404 })) })
		.await
		.expect("Lookup should succeed.");
	let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_cache")
		.fetch_one(pool)
		.await
		.expect("Failed to count cache rows.");

	assert!(missing.is_none());
	assert_eq!(stored, 1);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn degraded_relations_return_posts_without_caching() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping degraded_relations_return_posts_without_caching; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, true, None).await;
	let pool = &service.db.pool;

	for day in 1..=2 {
		seed::post(pool, &PostSeed::new(i32::from(day), "published", may(day)))
			.await
			.expect("Failed to seed post.");
	}

	seed::section(pool, 7, "news", "active").await.expect("Failed to seed section.");
	seed::tag(pool, 30, "election").await.expect("Failed to seed tag.");
	seed::link(pool, "_Post_sections", 1, 7).await.expect("Failed to link section.");
	seed::link(pool, "_Post_tags", 1, 30).await.expect("Failed to link tag.");
	seed::link(pool, "_Post_tags_algo", 1, 30).await.expect("Failed to link tag.");
	sqlx::query(r#"DROP TABLE "_Post_tags""#)
		.execute(pool)
		.await
		.expect("Failed to drop the tag join table.");

	let posts = service.posts(first_page()).await.expect("List should survive a failed relation.");
	let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_cache")
		.fetch_one(pool)
		.await
		.expect("Failed to count cache rows.");
	let first = posts.iter().find(|post| post.id == "1").expect("Post 1 should be listed.");

	assert_eq!(ids(&posts, |post| &post.id), vec!["2".to_string(), "1".to_string()]);
	assert!(first.tags.is_empty());
	assert_eq!(ids(&first.tags_algo, |tag| &tag.id), vec!["30".to_string()]);
	assert_eq!(ids(&first.sections, |section| &section.id), vec!["7".to_string()]);
	assert_eq!(stored, 0);
	assert!(service.cache.is_enabled());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn cache_faults_fall_back_to_live_queries() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping cache_faults_fall_back_to_live_queries; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let backend = Arc::new(UnreachableBackend { calls: AtomicUsize::new(0) });
	let cache = Arc::new(QueryCache::active(backend.clone(), Duration::from_secs(60)));
	let service = build_service(&test_db, true, Some(cache)).await;
	let pool = &service.db.pool;

	for day in 1..=3 {
		seed::post(pool, &PostSeed::new(i32::from(day), "published", may(day)))
			.await
			.expect("Failed to seed post.");
	}

	let first = service.posts(first_page()).await.expect("List should succeed despite the cache.");
	let second = service.posts(first_page()).await.expect("List should succeed despite the cache.");

	assert_eq!(first.len(), 2);
	assert_eq!(
		serde_json::to_value(&first).expect("Posts should serialize."),
		serde_json::to_value(&second).expect("Posts should serialize.")
	);
	assert!(!service.cache.is_enabled());
	assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
