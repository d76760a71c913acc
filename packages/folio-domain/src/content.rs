//! Hydrated content graph entities as served to clients and stored in the query cache.
//!
//! Every list relation deserializes to an empty vector when missing so cached payloads and
//! fresh results share one shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFile {
	pub width: i32,
	pub height: i32,
}

/// Named resized variants of one stored image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resized {
	pub original: String,
	pub w480: String,
	pub w800: String,
	pub w1200: String,
	pub w1600: String,
	pub w2400: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Photo {
	pub id: String,
	pub name: String,
	pub topic_keywords: String,
	pub image_file: ImageFile,
	pub resized: Resized,
	pub resized_webp: Resized,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
	pub id: String,
	pub name: String,
	pub slug: String,
	pub state: String,
	pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
	pub id: String,
	pub name: String,
	pub slug: String,
	pub state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
	pub id: String,
	pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
	pub id: String,
	pub name: String,
	pub slug: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Warning {
	pub id: String,
	pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Partner {
	pub id: String,
	pub slug: String,
	pub name: String,
	pub show_on_index: bool,
}

/// A post as it appears nested under another entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostSummary {
	pub id: String,
	pub slug: String,
	pub title: String,
	pub state: String,
	#[serde(with = "crate::time_serde::option")]
	pub published_date: Option<OffsetDateTime>,
	pub hero_image: Option<Photo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoSummary {
	pub id: String,
	pub video_src: String,
	pub hero_image: Option<Photo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSummary {
	pub id: String,
	pub name: String,
	pub slug: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Post {
	pub id: String,
	pub slug: String,
	pub title: String,
	pub subtitle: String,
	pub state: String,
	pub style: String,
	#[serde(with = "crate::time_serde::option")]
	pub published_date: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub updated_at: Option<OffsetDateTime>,
	pub is_member: bool,
	pub is_adult: bool,
	pub sections: Vec<Section>,
	pub sections_in_input_order: Vec<Section>,
	pub categories: Vec<Category>,
	pub categories_in_input_order: Vec<Category>,
	pub writers: Vec<Contact>,
	pub writers_in_input_order: Vec<Contact>,
	pub photographers: Vec<Contact>,
	#[serde(rename = "camera_man")]
	pub camera_man: Vec<Contact>,
	pub designers: Vec<Contact>,
	pub engineers: Vec<Contact>,
	pub vocals: Vec<Contact>,
	#[serde(rename = "extend_byline")]
	pub extend_byline: String,
	pub tags: Vec<Tag>,
	#[serde(rename = "tags_algo")]
	pub tags_algo: Vec<Tag>,
	pub hero_video: Option<VideoSummary>,
	pub hero_image: Option<Photo>,
	pub hero_caption: String,
	pub brief: Option<Value>,
	pub api_data_brief: Value,
	pub api_data: Value,
	pub trimmed_content: Option<Value>,
	pub content: Option<Value>,
	pub relateds: Vec<PostSummary>,
	pub relateds_in_input_order: Vec<PostSummary>,
	pub relateds_one: Option<PostSummary>,
	pub relateds_two: Option<PostSummary>,
	pub relateds_three: Option<PostSummary>,
	pub redirect: String,
	#[serde(rename = "og_title")]
	pub og_title: String,
	#[serde(rename = "og_image")]
	pub og_image: Option<Photo>,
	#[serde(rename = "og_description")]
	pub og_description: String,
	pub hidden_advertised: bool,
	pub is_advertised: bool,
	pub is_featured: bool,
	pub topics: Option<TopicSummary>,
	pub warnings: Vec<Warning>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct External {
	pub id: String,
	pub slug: String,
	pub partner: Option<Partner>,
	pub title: String,
	pub state: String,
	#[serde(with = "crate::time_serde::option")]
	pub published_date: Option<OffsetDateTime>,
	#[serde(rename = "extend_byline")]
	pub extend_byline: String,
	pub thumb: String,
	pub thumb_caption: String,
	pub brief: String,
	pub content: String,
	#[serde(with = "crate::time_serde::option")]
	pub updated_at: Option<OffsetDateTime>,
	pub tags: Vec<Tag>,
	pub sections: Vec<Section>,
	pub categories: Vec<Category>,
	pub relateds: Vec<PostSummary>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Topic {
	pub id: String,
	pub name: String,
	pub slug: String,
	pub sort_order: Option<i32>,
	pub state: String,
	#[serde(with = "crate::time_serde::option")]
	pub published_date: Option<OffsetDateTime>,
	pub brief: Option<Value>,
	pub api_data_brief: Value,
	pub leading: String,
	pub hero_image: Option<Photo>,
	pub hero_url: String,
	pub hero_video: Option<VideoSummary>,
	#[serde(rename = "slideshow_images")]
	pub slideshow_images: Vec<Photo>,
	#[serde(rename = "og_title")]
	pub og_title: String,
	#[serde(rename = "og_description")]
	pub og_description: String,
	#[serde(rename = "og_image")]
	pub og_image: Option<Photo>,
	#[serde(rename = "type")]
	pub kind: String,
	pub tags: Vec<Tag>,
	pub posts: Vec<PostSummary>,
	pub style: String,
	pub is_featured: bool,
	#[serde(rename = "title_style")]
	pub title_style: String,
	pub sections: Vec<Section>,
	pub javascript: String,
	pub dfp: String,
	#[serde(rename = "mobile_dfp")]
	pub mobile_dfp: String,
	#[serde(with = "crate::time_serde::option")]
	pub created_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
	pub id: String,
	pub name: String,
	pub is_shorts: bool,
	pub youtube_url: String,
	pub file_duration: String,
	pub youtube_duration: String,
	pub video_src: String,
	pub content: String,
	pub hero_image: Option<Photo>,
	pub uploader: String,
	pub uploader_email: String,
	pub is_feed: bool,
	pub video_section: String,
	pub state: String,
	#[serde(with = "crate::time_serde::option")]
	pub published_date: Option<OffsetDateTime>,
	pub published_date_string: String,
	pub update_time_stamp: bool,
	pub tags: Vec<Tag>,
	#[serde(rename = "related_posts")]
	pub related_posts: Vec<PostSummary>,
	#[serde(with = "crate::time_serde::option")]
	pub created_at: Option<OffsetDateTime>,
}
