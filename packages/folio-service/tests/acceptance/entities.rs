use serde_json::json;

use folio_service::{CountRequest, ListRequest, UniqueRequest};
use folio_testkit::seed::{self, ExternalSeed, PostSeed, TopicSeed, VideoSeed};

use super::{FALLBACK_PARTNER_ID, build_service, ids, may, test_db};

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn externals_need_a_publish_date_and_fall_back_to_the_default_partner() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping externals_need_a_publish_date_and_fall_back_to_the_default_partner; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	seed::partner(pool, FALLBACK_PARTNER_ID, "default").await.expect("Failed to seed partner.");
	seed::partner(pool, 8, "wire").await.expect("Failed to seed partner.");

	let mut wired = ExternalSeed::new(1, "published", Some(may(1)));

	wired.partner = Some(8);

	seed::external(pool, &wired).await.expect("Failed to seed external.");
	seed::external(pool, &ExternalSeed::new(2, "published", Some(may(2))))
		.await
		.expect("Failed to seed external.");
	seed::external(pool, &ExternalSeed::new(3, "published", None))
		.await
		.expect("Failed to seed external.");

	let externals = service.externals(ListRequest::default()).await.expect("List should succeed.");
	let count =
		service.externals_count(CountRequest::default()).await.expect("Count should succeed.");

	assert_eq!(ids(&externals, |e| &e.id), vec!["2", "1"]);
	assert_eq!(count, 2);
	assert_eq!(externals[0].partner.as_ref().map(|p| p.slug.as_str()), Some("default"));
	assert_eq!(externals[1].partner.as_ref().map(|p| p.slug.as_str()), Some("wire"));

	let by_partner = service
		.externals(ListRequest {
			filter: Some(json!({ "partner": { "slug": { "equals": "wire" } } })),
			..Default::default()
		})
		.await
		.expect("List should succeed.");

	assert_eq!(ids(&by_partner, |e| &e.id), vec!["1"]);

	let partner = service
		.partner_by_id(&FALLBACK_PARTNER_ID.to_string())
		.await
		.expect("Lookup should succeed.")
		.expect("Partner should exist.");

	assert_eq!(partner.slug, "default");
	assert!(partner.show_on_index);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn topics_order_by_sort_order_and_list_published_member_posts() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping topics_order_by_sort_order_and_list_published_member_posts; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;

	seed::topic(pool, &TopicSeed::new(1, "published", Some(2))).await.expect("Failed to seed topic.");
	seed::topic(pool, &TopicSeed::new(2, "published", None)).await.expect("Failed to seed topic.");
	seed::topic(pool, &TopicSeed::new(3, "published", Some(1))).await.expect("Failed to seed topic.");
	seed::topic(pool, &TopicSeed::new(4, "draft", Some(0))).await.expect("Failed to seed topic.");

	for (id, state, day) in [(10, "published", 1), (11, "published", 3), (12, "draft", 5)] {
		let mut post = PostSeed::new(id, state, may(day));

		post.topic = Some(1);

		seed::post(pool, &post).await.expect("Failed to seed post.");
	}

	let topics = service.topics(ListRequest::default()).await.expect("List should succeed.");

	assert_eq!(ids(&topics, |t| &t.id), vec!["3", "1", "2"]);
	assert_eq!(ids(&topics[1].posts, |p| &p.id), vec!["11", "10"]);
	assert_eq!(topics[1].kind, "list");
	assert!(topics[0].posts.is_empty());

	let by_name = service
		.topic(UniqueRequest { filter: Some(json!({ "name": "Topic 1" })) })
		.await
		.expect("Lookup should succeed.");

	assert_eq!(by_name.map(|t| t.id), Some("1".to_string()));

	let draft = service
		.topic(UniqueRequest { filter: Some(json!({ "id": 4 })) })
		.await
		.expect("Lookup should succeed.");

	assert!(draft.is_none());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FOLIO_PG_DSN to run."]
async fn videos_filter_by_tag_and_derive_sources() {
	let Some(test_db) = test_db().await else {
		eprintln!(
			"Skipping videos_filter_by_tag_and_derive_sources; set FOLIO_PG_DSN to run this test."
		);
		return;
	};
	let service = build_service(&test_db, false, None).await;
	let pool = &service.db.pool;
	let mut uploaded = VideoSeed::new(1, "published", may(1));

	uploaded.file_filename = Some("clip.mp4".to_string());
	uploaded.file_duration = Some("0".to_string());

	seed::video(pool, &uploaded).await.expect("Failed to seed video.");
	seed::video(pool, &VideoSeed::new(2, "published", may(2))).await.expect("Failed to seed video.");
	seed::tag(pool, 5, "shorts").await.expect("Failed to seed tag.");
	seed::link(pool, "_Video_tags", 5, 1).await.expect("Failed to link tag.");
	seed::post(pool, &PostSeed::new(20, "published", may(3))).await.expect("Failed to seed post.");
	seed::post(pool, &PostSeed::new(21, "draft", may(4))).await.expect("Failed to seed post.");
	seed::link(pool, "_Post_related_videos", 20, 1).await.expect("Failed to link post.");
	seed::link(pool, "_Post_related_videos", 21, 1).await.expect("Failed to link post.");

	let tagged = service
		.videos(ListRequest {
			filter: Some(json!({ "tags": { "some": { "id": { "equals": "5" } } } })),
			..Default::default()
		})
		.await
		.expect("List should succeed.");

	assert_eq!(ids(&tagged, |v| &v.id), vec!["1"]);

	let video = &tagged[0];

	assert_eq!(video.video_src, "https://videos.example.com/clip.mp4");
	assert_eq!(video.file_duration, "PT0S");
	assert_eq!(video.video_section, "news");
	assert_eq!(ids(&video.tags, |t| &t.id), vec!["5"]);
	assert_eq!(ids(&video.related_posts, |p| &p.id), vec!["20"]);

	let count = service
		.videos_count(CountRequest { filter: Some(json!({ "isShorts": { "equals": false } })) })
		.await
		.expect("Count should succeed.");

	assert_eq!(count, 2);

	let single = service
		.video(UniqueRequest { filter: Some(json!({ "id": 2 })) })
		.await
		.expect("Lookup should succeed.")
		.expect("Video should exist.");

	assert_eq!(single.video_src, "");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
