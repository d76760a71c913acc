//! Batched relation reads. Every function takes the full set of owner (or target) ids for a
//! batch and issues exactly one query; an empty id set issues none.
//!
//! Join tables follow the CMS layout: two columns `"A"` and `"B"` holding the ids of the two
//! sides, ordered alphabetically by model name.

use sqlx::{FromRow, PgPool, postgres::PgRow};

use crate::{
	Result,
	models::{
		CategoryLink, ContactLink, ImageLink, ImageRow, PartnerRow, PostLink, PostRefRow,
		SectionLink, TagLink, TopicRefRow, VideoRefRow, WarningLink,
	},
};

const POST_REF_COLUMNS: &str = r#"p.id,
	COALESCE(p.slug, '') AS slug,
	COALESCE(p.title, '') AS title,
	COALESCE(p.state, '') AS state,
	p."publishedDate" AS published_date,
	p."heroImage" AS hero_image"#;
const IMAGE_COLUMNS: &str = r#"i.id,
	COALESCE(i.name, '') AS name,
	COALESCE(i."topicKeywords", '') AS topic_keywords,
	COALESCE(i."imageFile_id", '') AS file_id,
	COALESCE(i."imageFile_extension", '') AS extension,
	i."imageFile_width" AS width,
	i."imageFile_height" AS height"#;
const SECTION_COLUMNS: &str = r#"s.id,
	COALESCE(s.name, '') AS name,
	COALESCE(s.slug, '') AS slug,
	COALESCE(s.state, '') AS state,
	COALESCE(s.color, '') AS color"#;
const CATEGORY_COLUMNS: &str = r#"c.id,
	COALESCE(c.name, '') AS name,
	COALESCE(c.slug, '') AS slug,
	COALESCE(c.state, '') AS state"#;
const TAG_COLUMNS: &str = r#"t.id, COALESCE(t.name, '') AS name, COALESCE(t.slug, '') AS slug"#;

/// Contact roles on a post, each backed by its own join table (`A` = contact, `B` = post).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactRole {
	Writers,
	Photographers,
	CameraMan,
	Designers,
	Engineers,
	Vocals,
}
impl ContactRole {
	pub fn join_table(self) -> &'static str {
		match self {
			Self::Writers => "_Post_writers",
			Self::Photographers => "_Post_photographers",
			Self::CameraMan => "_Post_camera_man",
			Self::Designers => "_Post_designers",
			Self::Engineers => "_Post_engineers",
			Self::Vocals => "_Post_vocals",
		}
	}
}

/// The two independent tag sets on a post (`A` = post, `B` = tag).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostTagSet {
	Editorial,
	Algorithmic,
}
impl PostTagSet {
	pub fn join_table(self) -> &'static str {
		match self {
			Self::Editorial => "_Post_tags",
			Self::Algorithmic => "_Post_tags_algo",
		}
	}
}

pub async fn post_sections(pool: &PgPool, post_ids: &[i32]) -> Result<Vec<SectionLink>> {
	let sql = format!(
		r#"SELECT ps."A" AS owner_id, {SECTION_COLUMNS}
FROM "_Post_sections" ps
JOIN "Section" s ON s.id = ps."B"
WHERE ps."A" = ANY($1)
ORDER BY ps."A", s.id"#
	);

	fetch_for_ids(pool, &sql, post_ids).await
}

pub async fn post_categories(pool: &PgPool, post_ids: &[i32]) -> Result<Vec<CategoryLink>> {
	let sql = format!(
		r#"SELECT cp."B" AS owner_id, {CATEGORY_COLUMNS}
FROM "_Category_posts" cp
JOIN "Category" c ON c.id = cp."A"
WHERE cp."B" = ANY($1)
ORDER BY cp."B", c.id"#
	);

	fetch_for_ids(pool, &sql, post_ids).await
}

pub async fn post_contacts(
	pool: &PgPool,
	role: ContactRole,
	post_ids: &[i32],
) -> Result<Vec<ContactLink>> {
	let sql = format!(
		r#"SELECT j."B" AS owner_id, c.id, COALESCE(c.name, '') AS name
FROM "{table}" j
JOIN "Contact" c ON c.id = j."A"
WHERE j."B" = ANY($1)
ORDER BY j."B", c.id"#,
		table = role.join_table(),
	);

	fetch_for_ids(pool, &sql, post_ids).await
}

pub async fn post_tags(pool: &PgPool, set: PostTagSet, post_ids: &[i32]) -> Result<Vec<TagLink>> {
	let sql = format!(
		r#"SELECT j."A" AS owner_id, {TAG_COLUMNS}
FROM "{table}" j
JOIN "Tag" t ON t.id = j."B"
WHERE j."A" = ANY($1)
ORDER BY j."A", t.id"#,
		table = set.join_table(),
	);

	fetch_for_ids(pool, &sql, post_ids).await
}

/// A post's own warnings plus the warnings attached to any post related to it, in either join
/// direction.
pub async fn post_warnings(pool: &PgPool, post_ids: &[i32]) -> Result<Vec<WarningLink>> {
	let sql = r#"SELECT DISTINCT src.owner_id, w.id, COALESCE(w.content, '') AS content
FROM (
	SELECT pw."A" AS owner_id, pw."B" AS warning_id
	FROM "_Post_Warnings" pw
	WHERE pw."A" = ANY($1)
	UNION
	SELECT r."A" AS owner_id, pw."B" AS warning_id
	FROM "_Post_relateds" r
	JOIN "_Post_Warnings" pw ON pw."A" = r."B"
	WHERE r."A" = ANY($1)
	UNION
	SELECT r."B" AS owner_id, pw."B" AS warning_id
	FROM "_Post_relateds" r
	JOIN "_Post_Warnings" pw ON pw."A" = r."A"
	WHERE r."B" = ANY($1)
) src
JOIN "Warning" w ON w.id = src.warning_id
ORDER BY src.owner_id, w.id"#;

	fetch_for_ids(pool, sql, post_ids).await
}

/// Related posts are a symmetric self relation; both join directions are read.
pub async fn post_relateds(pool: &PgPool, post_ids: &[i32]) -> Result<Vec<PostLink>> {
	let sql = format!(
		r#"SELECT linked.owner_id, {POST_REF_COLUMNS}
FROM (
	SELECT r."A" AS owner_id, r."B" AS post_id FROM "_Post_relateds" r WHERE r."A" = ANY($1)
	UNION
	SELECT r."B" AS owner_id, r."A" AS post_id FROM "_Post_relateds" r WHERE r."B" = ANY($1)
) linked
JOIN "Post" p ON p.id = linked.post_id
ORDER BY linked.owner_id, p.id"#
	);

	fetch_for_ids(pool, &sql, post_ids).await
}

pub async fn posts_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<PostRefRow>> {
	let sql = format!(r#"SELECT {POST_REF_COLUMNS} FROM "Post" p WHERE p.id = ANY($1)"#);

	fetch_for_ids(pool, &sql, ids).await
}

pub async fn images_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<ImageRow>> {
	let sql = format!(r#"SELECT {IMAGE_COLUMNS} FROM "Image" i WHERE i.id = ANY($1)"#);

	fetch_for_ids(pool, &sql, ids).await
}

pub async fn videos_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<VideoRefRow>> {
	let sql = r#"SELECT v.id, v.file_filename, v."urlOriginal" AS url_original, v."heroImage" AS hero_image
FROM "Video" v
WHERE v.id = ANY($1)"#;

	fetch_for_ids(pool, sql, ids).await
}

pub async fn topics_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<TopicRefRow>> {
	let sql = r#"SELECT t.id, COALESCE(t.name, '') AS name, COALESCE(t.slug, '') AS slug
FROM "Topic" t
WHERE t.id = ANY($1)"#;

	fetch_for_ids(pool, sql, ids).await
}

pub async fn partners_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<PartnerRow>> {
	let sql = r#"SELECT pt.id,
	COALESCE(pt.slug, '') AS slug,
	COALESCE(pt.name, '') AS name,
	COALESCE(pt."showOnIndex", false) AS show_on_index
FROM "Partner" pt
WHERE pt.id = ANY($1)"#;

	fetch_for_ids(pool, sql, ids).await
}

pub async fn external_tags(pool: &PgPool, external_ids: &[i32]) -> Result<Vec<TagLink>> {
	let sql = format!(
		r#"SELECT et."A" AS owner_id, {TAG_COLUMNS}
FROM "_External_tags" et
JOIN "Tag" t ON t.id = et."B"
WHERE et."A" = ANY($1)
ORDER BY et."A", t.id"#
	);

	fetch_for_ids(pool, &sql, external_ids).await
}

pub async fn external_sections(pool: &PgPool, external_ids: &[i32]) -> Result<Vec<SectionLink>> {
	let sql = format!(
		r#"SELECT es."A" AS owner_id, {SECTION_COLUMNS}
FROM "_External_sections" es
JOIN "Section" s ON s.id = es."B"
WHERE es."A" = ANY($1)
ORDER BY es."A", s.id"#
	);

	fetch_for_ids(pool, &sql, external_ids).await
}

pub async fn external_categories(
	pool: &PgPool,
	external_ids: &[i32],
) -> Result<Vec<CategoryLink>> {
	let sql = format!(
		r#"SELECT DISTINCT ce."B" AS owner_id, {CATEGORY_COLUMNS}
FROM "_Category_externals" ce
JOIN "Category" c ON c.id = ce."A"
WHERE ce."B" = ANY($1)
ORDER BY ce."B", c.id"#
	);

	fetch_for_ids(pool, &sql, external_ids).await
}

pub async fn external_relateds(pool: &PgPool, external_ids: &[i32]) -> Result<Vec<PostLink>> {
	let sql = format!(
		r#"SELECT er."A" AS owner_id, {POST_REF_COLUMNS}
FROM "_External_relateds" er
JOIN "Post" p ON p.id = er."B"
WHERE er."A" = ANY($1)
ORDER BY er."A", p.id"#
	);

	fetch_for_ids(pool, &sql, external_ids).await
}

pub async fn topic_slideshow_images(pool: &PgPool, topic_ids: &[i32]) -> Result<Vec<ImageLink>> {
	let sql = format!(
		r#"SELECT tsi."A" AS owner_id, {IMAGE_COLUMNS}
FROM "_Topic_slideshow_images" tsi
JOIN "Image" i ON i.id = tsi."B"
WHERE tsi."A" = ANY($1)
ORDER BY tsi."A", tsi."B""#
	);

	fetch_for_ids(pool, &sql, topic_ids).await
}

pub async fn topic_tags(pool: &PgPool, topic_ids: &[i32]) -> Result<Vec<TagLink>> {
	let sql = format!(
		r#"SELECT tt."B" AS owner_id, {TAG_COLUMNS}
FROM "_Tag_topics" tt
JOIN "Tag" t ON t.id = tt."A"
WHERE tt."B" = ANY($1)
ORDER BY tt."B", t.id"#
	);

	fetch_for_ids(pool, &sql, topic_ids).await
}

pub async fn topic_sections(pool: &PgPool, topic_ids: &[i32]) -> Result<Vec<SectionLink>> {
	let sql = format!(
		r#"SELECT st."B" AS owner_id, {SECTION_COLUMNS}
FROM "_Section_topics" st
JOIN "Section" s ON s.id = st."A"
WHERE st."B" = ANY($1)
ORDER BY st."B", s.id"#
	);

	fetch_for_ids(pool, &sql, topic_ids).await
}

/// Published member posts of each topic, newest first.
pub async fn topic_posts(pool: &PgPool, topic_ids: &[i32]) -> Result<Vec<PostLink>> {
	let sql = format!(
		r#"SELECT p.topics AS owner_id, {POST_REF_COLUMNS}
FROM "Post" p
WHERE p.topics = ANY($1) AND p.state = 'published'
ORDER BY p.topics, p."publishedDate" DESC NULLS LAST, p.id DESC"#
	);

	fetch_for_ids(pool, &sql, topic_ids).await
}

pub async fn video_tags(pool: &PgPool, video_ids: &[i32]) -> Result<Vec<TagLink>> {
	let sql = format!(
		r#"SELECT vt."B" AS owner_id, {TAG_COLUMNS}
FROM "_Video_tags" vt
JOIN "Tag" t ON t.id = vt."A"
WHERE vt."B" = ANY($1)
ORDER BY vt."B", t.id"#
	);

	fetch_for_ids(pool, &sql, video_ids).await
}

/// Published posts embedding each video, newest first.
pub async fn video_related_posts(pool: &PgPool, video_ids: &[i32]) -> Result<Vec<PostLink>> {
	let sql = format!(
		r#"SELECT prv."B" AS owner_id, {POST_REF_COLUMNS}
FROM "_Post_related_videos" prv
JOIN "Post" p ON p.id = prv."A"
WHERE prv."B" = ANY($1) AND p.state = 'published'
ORDER BY prv."B", p."publishedDate" DESC NULLS LAST, p.id DESC"#
	);

	fetch_for_ids(pool, &sql, video_ids).await
}

async fn fetch_for_ids<T>(pool: &PgPool, sql: &str, ids: &[i32]) -> Result<Vec<T>>
where
	T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, T>(sql).bind(ids).fetch_all(pool).await?;

	Ok(rows)
}
