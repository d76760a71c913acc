//! Row builders for the content fixture schema. Ids are always explicit so tests can refer to
//! them without reading sequences back.

use serde_json::Value;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::{Error, Result};

#[derive(Clone, Debug, Default)]
pub struct PostSeed {
	pub id: i32,
	pub slug: String,
	pub title: String,
	pub state: String,
	pub is_adult: bool,
	pub is_member: bool,
	pub published_date: Option<PrimitiveDateTime>,
	pub hero_image: Option<i32>,
	pub og_image: Option<i32>,
	pub hero_video: Option<i32>,
	pub topic: Option<i32>,
	pub relateds_one: Option<i32>,
	pub relateds_two: Option<i32>,
	pub relateds_three: Option<i32>,
	pub brief: Option<Value>,
	pub api_data_brief: Option<Value>,
}
impl PostSeed {
	pub fn new(id: i32, state: &str, published_date: PrimitiveDateTime) -> Self {
		Self {
			id,
			slug: format!("post-{id}"),
			title: format!("Post {id}"),
			state: state.to_string(),
			published_date: Some(published_date),
			..Default::default()
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct ExternalSeed {
	pub id: i32,
	pub slug: String,
	pub title: String,
	pub state: String,
	pub published_date: Option<PrimitiveDateTime>,
	pub partner: Option<i32>,
}
impl ExternalSeed {
	pub fn new(id: i32, state: &str, published_date: Option<PrimitiveDateTime>) -> Self {
		Self {
			id,
			slug: format!("external-{id}"),
			title: format!("External {id}"),
			state: state.to_string(),
			published_date,
			partner: None,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct TopicSeed {
	pub id: i32,
	pub name: String,
	pub slug: String,
	pub state: String,
	pub sort_order: Option<i32>,
	pub hero_image: Option<i32>,
	pub hero_video: Option<i32>,
	pub og_image: Option<i32>,
}
impl TopicSeed {
	pub fn new(id: i32, state: &str, sort_order: Option<i32>) -> Self {
		Self {
			id,
			name: format!("Topic {id}"),
			slug: format!("topic-{id}"),
			state: state.to_string(),
			sort_order,
			..Default::default()
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct VideoSeed {
	pub id: i32,
	pub name: String,
	pub state: String,
	pub is_shorts: bool,
	pub video_section: Option<String>,
	pub published_date: Option<PrimitiveDateTime>,
	pub hero_image: Option<i32>,
	pub file_filename: Option<String>,
	pub file_duration: Option<String>,
}
impl VideoSeed {
	pub fn new(id: i32, state: &str, published_date: PrimitiveDateTime) -> Self {
		Self {
			id,
			name: format!("Video {id}"),
			state: state.to_string(),
			published_date: Some(published_date),
			..Default::default()
		}
	}
}

pub async fn image(pool: &PgPool, id: i32, file_id: &str, extension: &str) -> Result<()> {
	sqlx::query(
		r#"INSERT INTO "Image" (id, name, "topicKeywords", "imageFile_id", "imageFile_extension", "imageFile_width", "imageFile_height")
VALUES ($1, $2, '', $3, $4, 1200, 800)"#,
	)
	.bind(id)
	.bind(format!("Image {id}"))
	.bind(file_id)
	.bind(extension)
	.execute(pool)
	.await
	.map_err(|source| Error::Seed { table: "Image", source })?;

	Ok(())
}

pub async fn post(pool: &PgPool, seed: &PostSeed) -> Result<()> {
	sqlx::query(
		r#"INSERT INTO "Post" (
	id, slug, title, state, "isAdult", "isMember", "publishedDate", "updatedAt", "heroImage",
	og_image, "heroVideo", topics, "relatedsOne", "relatedsTwo", "relatedsThree", brief,
	"apiDataBrief"
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#,
	)
	.bind(seed.id)
	.bind(&seed.slug)
	.bind(&seed.title)
	.bind(&seed.state)
	.bind(seed.is_adult)
	.bind(seed.is_member)
	.bind(seed.published_date)
	.bind(seed.hero_image)
	.bind(seed.og_image)
	.bind(seed.hero_video)
	.bind(seed.topic)
	.bind(seed.relateds_one)
	.bind(seed.relateds_two)
	.bind(seed.relateds_three)
	.bind(&seed.brief)
	.bind(&seed.api_data_brief)
	.execute(pool)
	.await
	.map_err(|source| Error::Seed { table: "Post", source })?;

	Ok(())
}

pub async fn external(pool: &PgPool, seed: &ExternalSeed) -> Result<()> {
	sqlx::query(
		r#"INSERT INTO "External" (id, slug, title, state, "publishedDate", "updatedAt", partner)
VALUES ($1, $2, $3, $4, $5, $5, $6)"#,
	)
	.bind(seed.id)
	.bind(&seed.slug)
	.bind(&seed.title)
	.bind(&seed.state)
	.bind(seed.published_date)
	.bind(seed.partner)
	.execute(pool)
	.await
	.map_err(|source| Error::Seed { table: "External", source })?;

	Ok(())
}

pub async fn topic(pool: &PgPool, seed: &TopicSeed) -> Result<()> {
	sqlx::query(
		r#"INSERT INTO "Topic" (id, name, slug, state, "sortOrder", "heroImage", "heroVideo", og_image)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
	)
	.bind(seed.id)
	.bind(&seed.name)
	.bind(&seed.slug)
	.bind(&seed.state)
	.bind(seed.sort_order)
	.bind(seed.hero_image)
	.bind(seed.hero_video)
	.bind(seed.og_image)
	.execute(pool)
	.await
	.map_err(|source| Error::Seed { table: "Topic", source })?;

	Ok(())
}

pub async fn video(pool: &PgPool, seed: &VideoSeed) -> Result<()> {
	sqlx::query(
		r#"INSERT INTO "Video" (
	id, name, state, "isShorts", "videoSection", "publishedDate", "heroImage", file_filename,
	"fileDuration"
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
	)
	.bind(seed.id)
	.bind(&seed.name)
	.bind(&seed.state)
	.bind(seed.is_shorts)
	.bind(&seed.video_section)
	.bind(seed.published_date)
	.bind(seed.hero_image)
	.bind(&seed.file_filename)
	.bind(&seed.file_duration)
	.execute(pool)
	.await
	.map_err(|source| Error::Seed { table: "Video", source })?;

	Ok(())
}

pub async fn section(pool: &PgPool, id: i32, slug: &str, state: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Section" (id, name, slug, state, color) VALUES ($1, $2, $2, $3, '#000')"#)
		.bind(id)
		.bind(slug)
		.bind(state)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Section", source })?;

	Ok(())
}

pub async fn category(pool: &PgPool, id: i32, slug: &str, state: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Category" (id, name, slug, state) VALUES ($1, $2, $2, $3)"#)
		.bind(id)
		.bind(slug)
		.bind(state)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Category", source })?;

	Ok(())
}

pub async fn tag(pool: &PgPool, id: i32, slug: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Tag" (id, name, slug) VALUES ($1, $2, $2)"#)
		.bind(id)
		.bind(slug)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Tag", source })?;

	Ok(())
}

pub async fn contact(pool: &PgPool, id: i32, name: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Contact" (id, name) VALUES ($1, $2)"#)
		.bind(id)
		.bind(name)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Contact", source })?;

	Ok(())
}

pub async fn warning(pool: &PgPool, id: i32, content: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Warning" (id, content) VALUES ($1, $2)"#)
		.bind(id)
		.bind(content)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Warning", source })?;

	Ok(())
}

pub async fn partner(pool: &PgPool, id: i32, slug: &str) -> Result<()> {
	sqlx::query(r#"INSERT INTO "Partner" (id, slug, name, "showOnIndex") VALUES ($1, $2, $2, true)"#)
		.bind(id)
		.bind(slug)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table: "Partner", source })?;

	Ok(())
}

/// Inserts one row into a two-column join table such as `_Post_sections`.
pub async fn link(pool: &PgPool, table: &'static str, a: i32, b: i32) -> Result<()> {
	let sql = format!(r#"INSERT INTO "{table}" ("A", "B") VALUES ($1, $2)"#);

	sqlx::query(&sql)
		.bind(a)
		.bind(b)
		.execute(pool)
		.await
		.map_err(|source| Error::Seed { table, source })?;

	Ok(())
}
