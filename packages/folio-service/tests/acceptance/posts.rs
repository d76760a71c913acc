use serde_json::json;

use folio_service::{CountRequest, Error, ListRequest, UniqueRequest};
use folio_testkit::seed::{self, PostSeed};

use super::{build_service, ids, may, test_db};

fn list(filter: serde_json::Value, take: Option<i64>) -> ListRequest {
	ListRequest { filter: Some(filter), take, ..Default::default() }
}

fn unique(filter: serde_json::Value) -> UniqueRequest {
	UniqueRequest { filter: Some(filter) }
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn published_page_and_count_agree() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping published_page_and_count_agree; set FOLIO_PG_DSN to run this test.");
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	for day in 1..=5 {
		seed::post(pool, &PostSeed::new(i32::from(day), "published", may(day)))
			.await
			.expect("Failed to seed post.");
	}
	for day in 6..=7 {
		seed::post(pool, &PostSeed::new(i32::from(day), "draft", may(day)))
			.await
			.expect("Failed to seed post.");
	}

	let page = service
		.posts(list(json!({ "state": { "equals": "published" } }), Some(3)))
		.await
		.expect("List should succeed.");

	assert_eq!(ids(&page, |p| &p.id), vec!["5", "4", "3"]);

	let count = service
		.posts_count(CountRequest { filter: Some(json!({ "state": { "equals": "published" } })) })
		.await
		.expect("Count should succeed.");

	assert_eq!(count, 5);

	let implicit = service.posts(list(json!({}), None)).await.expect("List should succeed.");
	let implicit_count =
		service.posts_count(CountRequest::default()).await.expect("Count should succeed.");

	assert_eq!(implicit.len() as i64, implicit_count);
	assert!(implicit.iter().all(|post| post.state == "published"));

	let drafts = service
		.posts_count(CountRequest { filter: Some(json!({ "state": { "equals": "draft" } })) })
		.await
		.expect("Count should succeed.");

	assert_eq!(drafts, 2);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn unique_lookup_handles_absent_and_any_state() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping unique_lookup_handles_absent_and_any_state; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;

	seed::post(&service.db.pool, &PostSeed::new(1, "draft", may(1)))
		.await
		.expect("Failed to seed post.");

	let missing =
		service.post(unique(json!({ "id": "999" }))).await.expect("Lookup should succeed.");

	assert!(missing.is_none());

	let draft = service
		.post(unique(json!({ "slug": "post-1" })))
		.await
		.expect("Lookup should succeed.")
		.expect("Draft post should resolve by slug.");

	assert_eq!(draft.id, "1");

	let by_float = service
		.post(unique(json!({ "id": "1.0e+00" })))
		.await
		.expect("Lookup should succeed.");

	assert_eq!(by_float.map(|post| post.id), Some("1".to_string()));

	let err = service
		.post(unique(json!({ "id": "abc" })))
		.await
		.expect_err("Invalid id should be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn null_references_and_empty_relations_serialize_cleanly() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping null_references_and_empty_relations_serialize_cleanly; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	seed::image(pool, 10, "cover", "png").await.expect("Failed to seed image.");

	let mut with_hero = PostSeed::new(1, "published", may(1));

	with_hero.hero_image = Some(10);

	seed::post(pool, &with_hero).await.expect("Failed to seed post.");
	seed::post(pool, &PostSeed::new(2, "published", may(2))).await.expect("Failed to seed post.");

	let posts = service.posts(ListRequest::default()).await.expect("List should succeed.");
	let bare = serde_json::to_value(&posts[0]).expect("Post should serialize.");

	assert_eq!(bare["id"], "2");
	assert_eq!(bare["heroImage"], serde_json::Value::Null);
	assert_eq!(bare["sections"], json!([]));
	assert_eq!(bare["tags_algo"], json!([]));
	assert_eq!(bare["apiData"], json!([]));
	assert_eq!(bare["publishedDate"], "2024-05-02T08:00:00.000Z");

	let hero = posts[1].hero_image.as_ref().expect("Hero image should resolve.");

	assert_eq!(hero.resized.w480, "https://statics.example.com/images/cover-w480.png");
	assert_eq!(hero.resized_webp.original, "https://statics.example.com/images/cover.webP");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn relateds_and_warnings_follow_both_join_directions() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping relateds_and_warnings_follow_both_join_directions; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	for id in 1..=3 {
		seed::post(pool, &PostSeed::new(id, "published", may(id as u8)))
			.await
			.expect("Failed to seed post.");
	}

	seed::warning(pool, 50, "Graphic content").await.expect("Failed to seed warning.");
	seed::link(pool, "_Post_relateds", 1, 2).await.expect("Failed to link posts.");
	seed::link(pool, "_Post_relateds", 3, 1).await.expect("Failed to link posts.");
	seed::link(pool, "_Post_Warnings", 3, 50).await.expect("Failed to link warning.");

	let post = service
		.post(unique(json!({ "id": 1 })))
		.await
		.expect("Lookup should succeed.")
		.expect("Post should exist.");

	assert_eq!(ids(&post.relateds, |p| &p.id), vec!["2", "3"]);
	assert_eq!(post.relateds_in_input_order, post.relateds);
	assert_eq!(ids(&post.warnings, |w| &w.id), vec!["50"]);

	let second = service
		.post(unique(json!({ "id": 2 })))
		.await
		.expect("Lookup should succeed.")
		.expect("Post should exist.");

	assert_eq!(ids(&second.relateds, |p| &p.id), vec!["1"]);
	assert!(second.warnings.is_empty());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn relation_filters_and_repeat_hydration_are_stable() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping relation_filters_and_repeat_hydration_are_stable; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	for id in 1..=3 {
		seed::post(pool, &PostSeed::new(id, "published", may(id as u8)))
			.await
			.expect("Failed to seed post.");
	}

	seed::section(pool, 7, "news", "active").await.expect("Failed to seed section.");
	seed::category(pool, 8, "politics", "active").await.expect("Failed to seed category.");
	seed::contact(pool, 9, "Reporter").await.expect("Failed to seed contact.");
	seed::link(pool, "_Post_sections", 1, 7).await.expect("Failed to link section.");
	seed::link(pool, "_Post_sections", 2, 7).await.expect("Failed to link section.");
	seed::link(pool, "_Category_posts", 8, 2).await.expect("Failed to link category.");
	seed::link(pool, "_Post_writers", 9, 2).await.expect("Failed to link writer.");

	let request = || {
		list(
			json!({
				"sections": { "some": { "slug": { "equals": "news" } } },
				"categories": { "some": { "slug": { "in": ["politics"] } } }
			}),
			None,
		)
	};
	let first = service.posts(request()).await.expect("List should succeed.");

	assert_eq!(ids(&first, |p| &p.id), vec!["2"]);
	assert_eq!(ids(&first[0].writers, |c| &c.id), vec!["9"]);
	assert_eq!(first[0].writers_in_input_order, first[0].writers);

	let second = service.posts(request()).await.expect("List should succeed.");

	assert_eq!(
		serde_json::to_value(&first).expect("Posts should serialize."),
		serde_json::to_value(&second).expect("Posts should serialize.")
	);

	let err = service
		.posts(list(json!({ "OR": [{ "slug": { "equals": "post-1" } }] }), None))
		.await
		.expect_err("OR should be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
