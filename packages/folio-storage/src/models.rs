//! Row shapes read from the CMS tables.
//!
//! Nullable text and flag columns are coalesced in SQL so rows carry plain values. Timestamps are
//! stored without a zone and are UTC by convention.

use serde_json::Value;
use sqlx::FromRow;
use time::PrimitiveDateTime;

/// Root post columns, selected from `"Post" p`.
pub const POST_COLUMNS: &str = r#"p.id,
	COALESCE(p.slug, '') AS slug,
	COALESCE(p.title, '') AS title,
	COALESCE(p.subtitle, '') AS subtitle,
	COALESCE(p.state, '') AS state,
	COALESCE(p.style, '') AS style,
	COALESCE(p."isMember", false) AS is_member,
	COALESCE(p."isAdult", false) AS is_adult,
	p."publishedDate" AS published_date,
	p."updatedAt" AS updated_at,
	COALESCE(p."heroCaption", '') AS hero_caption,
	COALESCE(p.extend_byline, '') AS extend_byline,
	p."heroImage" AS hero_image,
	p."heroVideo" AS hero_video,
	p.brief,
	p."apiDataBrief" AS api_data_brief,
	p."apiData" AS api_data,
	p.content,
	COALESCE(p.redirect, '') AS redirect,
	COALESCE(p.og_title, '') AS og_title,
	COALESCE(p.og_description, '') AS og_description,
	COALESCE(p."hiddenAdvertised", false) AS hidden_advertised,
	COALESCE(p."isAdvertised", false) AS is_advertised,
	COALESCE(p."isFeatured", false) AS is_featured,
	p.topics,
	p.og_image,
	p."relatedsOne" AS relateds_one,
	p."relatedsTwo" AS relateds_two,
	p."relatedsThree" AS relateds_three"#;

/// Root external columns, selected from `"External" e`.
pub const EXTERNAL_COLUMNS: &str = r#"e.id,
	COALESCE(e.slug, '') AS slug,
	COALESCE(e.title, '') AS title,
	COALESCE(e.state, '') AS state,
	e."publishedDate" AS published_date,
	COALESCE(e.extend_byline, '') AS extend_byline,
	COALESCE(e.thumb, '') AS thumb,
	COALESCE(e."thumbCaption", '') AS thumb_caption,
	COALESCE(e.brief, '') AS brief,
	COALESCE(e.content, '') AS content,
	e.partner,
	e."updatedAt" AS updated_at"#;

/// Root topic columns, selected from `"Topic" t`.
pub const TOPIC_COLUMNS: &str = r#"t.id,
	COALESCE(t.name, '') AS name,
	COALESCE(t.slug, '') AS slug,
	t."sortOrder" AS sort_order,
	COALESCE(t.state, '') AS state,
	t."publishedDate" AS published_date,
	t.brief,
	t."apiDataBrief" AS api_data_brief,
	COALESCE(t."leading", '') AS leading,
	t."heroImage" AS hero_image,
	COALESCE(t."heroUrl", '') AS hero_url,
	t."heroVideo" AS hero_video,
	COALESCE(t.og_title, '') AS og_title,
	COALESCE(t.og_description, '') AS og_description,
	t.og_image,
	COALESCE(t."type", 'list') AS kind,
	COALESCE(t.style, '') AS style,
	COALESCE(t."isFeatured", false) AS is_featured,
	COALESCE(t.title_style, 'feature') AS title_style,
	COALESCE(t.javascript, '') AS javascript,
	COALESCE(t.dfp, '') AS dfp,
	COALESCE(t.mobile_dfp, '') AS mobile_dfp,
	t."createdAt" AS created_at"#;

/// Root video columns, selected from `"Video" v`.
pub const VIDEO_COLUMNS: &str = r#"v.id,
	COALESCE(v.name, '') AS name,
	COALESCE(v."isShorts", false) AS is_shorts,
	COALESCE(v."youtubeUrl", '') AS youtube_url,
	COALESCE(v."fileDuration", '') AS file_duration,
	COALESCE(v."youtubeDuration", '') AS youtube_duration,
	COALESCE(v.content, '') AS content,
	v."heroImage" AS hero_image,
	COALESCE(v.uploader, '') AS uploader,
	COALESCE(v."uploaderEmail", '') AS uploader_email,
	COALESCE(v."isFeed", false) AS is_feed,
	COALESCE(v."videoSection", 'news') AS video_section,
	COALESCE(v.state, '') AS state,
	v."publishedDate" AS published_date,
	COALESCE(v."publishedDateString", '') AS published_date_string,
	COALESCE(v."updateTimeStamp", false) AS update_time_stamp,
	v."createdAt" AS created_at,
	v.file_filename,
	v."urlOriginal" AS url_original"#;

#[derive(Debug, FromRow)]
pub struct PostRow {
	pub id: i32,
	pub slug: String,
	pub title: String,
	pub subtitle: String,
	pub state: String,
	pub style: String,
	pub is_member: bool,
	pub is_adult: bool,
	pub published_date: Option<PrimitiveDateTime>,
	pub updated_at: Option<PrimitiveDateTime>,
	pub hero_caption: String,
	pub extend_byline: String,
	pub hero_image: Option<i32>,
	pub hero_video: Option<i32>,
	pub brief: Option<Value>,
	pub api_data_brief: Option<Value>,
	pub api_data: Option<Value>,
	pub content: Option<Value>,
	pub redirect: String,
	pub og_title: String,
	pub og_description: String,
	pub hidden_advertised: bool,
	pub is_advertised: bool,
	pub is_featured: bool,
	pub topics: Option<i32>,
	pub og_image: Option<i32>,
	pub relateds_one: Option<i32>,
	pub relateds_two: Option<i32>,
	pub relateds_three: Option<i32>,
}

#[derive(Debug, FromRow)]
pub struct ExternalRow {
	pub id: i32,
	pub slug: String,
	pub title: String,
	pub state: String,
	pub published_date: Option<PrimitiveDateTime>,
	pub extend_byline: String,
	pub thumb: String,
	pub thumb_caption: String,
	pub brief: String,
	pub content: String,
	pub partner: Option<i32>,
	pub updated_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, FromRow)]
pub struct TopicRow {
	pub id: i32,
	pub name: String,
	pub slug: String,
	pub sort_order: Option<i32>,
	pub state: String,
	pub published_date: Option<PrimitiveDateTime>,
	pub brief: Option<Value>,
	pub api_data_brief: Option<Value>,
	pub leading: String,
	pub hero_image: Option<i32>,
	pub hero_url: String,
	pub hero_video: Option<i32>,
	pub og_title: String,
	pub og_description: String,
	pub og_image: Option<i32>,
	pub kind: String,
	pub style: String,
	pub is_featured: bool,
	pub title_style: String,
	pub javascript: String,
	pub dfp: String,
	pub mobile_dfp: String,
	pub created_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, FromRow)]
pub struct VideoRow {
	pub id: i32,
	pub name: String,
	pub is_shorts: bool,
	pub youtube_url: String,
	pub file_duration: String,
	pub youtube_duration: String,
	pub content: String,
	pub hero_image: Option<i32>,
	pub uploader: String,
	pub uploader_email: String,
	pub is_feed: bool,
	pub video_section: String,
	pub state: String,
	pub published_date: Option<PrimitiveDateTime>,
	pub published_date_string: String,
	pub update_time_stamp: bool,
	pub created_at: Option<PrimitiveDateTime>,
	pub file_filename: Option<String>,
	pub url_original: Option<String>,
}

#[derive(Clone, Debug, FromRow)]
pub struct ImageRow {
	pub id: i32,
	pub name: String,
	pub topic_keywords: String,
	pub file_id: String,
	pub extension: String,
	pub width: Option<i32>,
	pub height: Option<i32>,
}

/// Post fields needed when a post is nested under another entity.
#[derive(Clone, Debug, FromRow)]
pub struct PostRefRow {
	pub id: i32,
	pub slug: String,
	pub title: String,
	pub state: String,
	pub published_date: Option<PrimitiveDateTime>,
	pub hero_image: Option<i32>,
}

#[derive(Clone, Debug, FromRow)]
pub struct VideoRefRow {
	pub id: i32,
	pub file_filename: Option<String>,
	pub url_original: Option<String>,
	pub hero_image: Option<i32>,
}

#[derive(Clone, Debug, FromRow)]
pub struct TopicRefRow {
	pub id: i32,
	pub name: String,
	pub slug: String,
}

#[derive(Clone, Debug, FromRow)]
pub struct PartnerRow {
	pub id: i32,
	pub slug: String,
	pub name: String,
	pub show_on_index: bool,
}

#[derive(Debug, FromRow)]
pub struct SectionLink {
	pub owner_id: i32,
	pub id: i32,
	pub name: String,
	pub slug: String,
	pub state: String,
	pub color: String,
}

#[derive(Debug, FromRow)]
pub struct CategoryLink {
	pub owner_id: i32,
	pub id: i32,
	pub name: String,
	pub slug: String,
	pub state: String,
}

#[derive(Debug, FromRow)]
pub struct ContactLink {
	pub owner_id: i32,
	pub id: i32,
	pub name: String,
}

#[derive(Debug, FromRow)]
pub struct TagLink {
	pub owner_id: i32,
	pub id: i32,
	pub name: String,
	pub slug: String,
}

#[derive(Debug, FromRow)]
pub struct WarningLink {
	pub owner_id: i32,
	pub id: i32,
	pub content: String,
}

#[derive(Debug, FromRow)]
pub struct PostLink {
	pub owner_id: i32,
	#[sqlx(flatten)]
	pub post: PostRefRow,
}

#[derive(Debug, FromRow)]
pub struct ImageLink {
	pub owner_id: i32,
	#[sqlx(flatten)]
	pub image: ImageRow,
}
