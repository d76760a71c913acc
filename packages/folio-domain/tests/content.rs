use serde_json::{Value, json};
use time::macros::datetime;

use folio_domain::content::{External, Post, PostSummary, Topic, Video};

#[test]
fn list_relations_serialize_as_empty_arrays() {
	let value = serde_json::to_value(Post::default()).expect("Failed to serialize post.");

	for field in [
		"sections",
		"categories",
		"writers",
		"photographers",
		"camera_man",
		"designers",
		"engineers",
		"vocals",
		"tags",
		"tags_algo",
		"relateds",
		"warnings",
	] {
		assert_eq!(value[field], json!([]), "Field {field} must be an empty list.");
	}

	let topic = serde_json::to_value(Topic::default()).expect("Failed to serialize topic.");

	assert_eq!(topic["slideshow_images"], json!([]));
	assert_eq!(topic["posts"], json!([]));

	let video = serde_json::to_value(Video::default()).expect("Failed to serialize video.");

	assert_eq!(video["related_posts"], json!([]));
	assert_eq!(video["heroImage"], Value::Null);
}

#[test]
fn timestamps_use_utc_milliseconds() {
	let post = Post {
		id: "7".to_string(),
		published_date: Some(datetime!(2024-05-01 16:30:00.123456 +08:00)),
		..Default::default()
	};
	let value = serde_json::to_value(&post).expect("Failed to serialize post.");

	assert_eq!(value["publishedDate"], json!("2024-05-01T08:30:00.123Z"));
	assert_eq!(value["updatedAt"], Value::Null);
}

#[test]
fn cached_payload_round_trips_to_the_same_entity() {
	let external = External {
		id: "12".to_string(),
		slug: "wire-story".to_string(),
		published_date: Some(datetime!(2024-05-01 08:30:00.250 UTC)),
		relateds: vec![PostSummary { id: "3".to_string(), ..Default::default() }],
		..Default::default()
	};
	let payload = serde_json::to_value(&external).expect("Failed to serialize external.");
	let decoded: External = serde_json::from_value(payload).expect("Failed to decode external.");

	assert_eq!(decoded, external);
}

#[test]
fn missing_fields_decode_to_defaults() {
	let decoded: Post = serde_json::from_value(json!({ "id": "1", "publishedDate": "" }))
		.expect("Failed to decode sparse post.");

	assert_eq!(decoded.id, "1");
	assert!(decoded.sections.is_empty());
	assert!(decoded.published_date.is_none());
}
