//! Root queries: one `SELECT` per list or unique lookup and one `COUNT(*)` per count, sharing the
//! compiled predicate. Rows map to partially populated entities plus the foreign keys the
//! hydrator resolves.

use serde_json::Value;
use sqlx::{FromRow, PgPool, postgres::PgRow};
use time::{OffsetDateTime, PrimitiveDateTime};

use folio_domain::{
	content::{External, Post, Topic, Video},
	media,
};
use folio_storage::models::{
	EXTERNAL_COLUMNS, ExternalRow, POST_COLUMNS, PostRow, TOPIC_COLUMNS, TopicRow, VIDEO_COLUMNS,
	VideoRow,
};

use crate::{
	Result,
	filter::Page,
	predicate::{
		self, EXTERNAL_SORT, POST_SORT, Predicate, SortKey, Sortable, SqlArg, TOPIC_SORT,
		VIDEO_SORT,
	},
};

pub const POSTS: Root = Root { from: r#""Post" p"#, columns: POST_COLUMNS, sort: &POST_SORT };
pub const EXTERNALS: Root =
	Root { from: r#""External" e"#, columns: EXTERNAL_COLUMNS, sort: &EXTERNAL_SORT };
pub const TOPICS: Root = Root { from: r#""Topic" t"#, columns: TOPIC_COLUMNS, sort: &TOPIC_SORT };
pub const VIDEOS: Root = Root { from: r#""Video" v"#, columns: VIDEO_COLUMNS, sort: &VIDEO_SORT };

/// A root table, its selected columns, and its sortable fields.
#[derive(Clone, Copy, Debug)]
pub struct Root {
	pub from: &'static str,
	pub columns: &'static str,
	pub sort: &'static Sortable,
}

/// Foreign keys of a post that resolve to single nested entities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostRefs {
	pub id: i32,
	pub hero_image: Option<i32>,
	pub og_image: Option<i32>,
	pub hero_video: Option<i32>,
	pub topic: Option<i32>,
	pub relateds_one: Option<i32>,
	pub relateds_two: Option<i32>,
	pub relateds_three: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalRefs {
	pub id: i32,
	pub partner: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicRefs {
	pub id: i32,
	pub hero_image: Option<i32>,
	pub og_image: Option<i32>,
	pub hero_video: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoRefs {
	pub id: i32,
	pub hero_image: Option<i32>,
}

pub fn select_sql(
	root: &Root,
	predicate: Predicate,
	order: &[SortKey],
	page: Page,
) -> (String, Vec<SqlArg>) {
	let Predicate { clause, mut args } = predicate;
	let mut sql = format!(
		"SELECT {columns}\nFROM {from}\nWHERE {clause}\nORDER BY {order}",
		columns = root.columns,
		from = root.from,
		order = predicate::order_by_clause(root.sort, order),
	);

	if let Some(take) = page.take {
		args.push(SqlArg::BigInt(take));
		sql.push_str(&format!("\nLIMIT ${}", args.len()));
	}
	if page.skip > 0 {
		args.push(SqlArg::BigInt(page.skip));
		sql.push_str(&format!("\nOFFSET ${}", args.len()));
	}

	(sql, args)
}

pub fn count_sql(root: &Root, predicate: Predicate) -> (String, Vec<SqlArg>) {
	let Predicate { clause, args } = predicate;

	(format!("SELECT COUNT(*)\nFROM {from}\nWHERE {clause}", from = root.from), args)
}

pub async fn fetch_rows<R>(pool: &PgPool, sql: &str, args: Vec<SqlArg>) -> Result<Vec<R>>
where
	R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
	let arguments = predicate::into_arguments(args)?;
	let rows = sqlx::query_as_with::<_, R, _>(sql, arguments).fetch_all(pool).await?;

	Ok(rows)
}

pub async fn fetch_count(pool: &PgPool, sql: &str, args: Vec<SqlArg>) -> Result<i64> {
	let arguments = predicate::into_arguments(args)?;
	let count = sqlx::query_scalar_with::<_, i64, _>(sql, arguments).fetch_one(pool).await?;

	Ok(count)
}

pub fn post_from_row(row: PostRow) -> (Post, PostRefs) {
	let refs = PostRefs {
		id: row.id,
		hero_image: row.hero_image,
		og_image: row.og_image,
		hero_video: row.hero_video,
		topic: row.topics,
		relateds_one: row.relateds_one,
		relateds_two: row.relateds_two,
		relateds_three: row.relateds_three,
	};
	let content = json_object(row.content);
	let post = Post {
		id: row.id.to_string(),
		slug: row.slug,
		title: row.title,
		subtitle: row.subtitle,
		state: row.state,
		style: row.style,
		published_date: wire_time(row.published_date),
		updated_at: wire_time(row.updated_at),
		is_member: row.is_member,
		is_adult: row.is_adult,
		extend_byline: row.extend_byline,
		hero_caption: row.hero_caption,
		brief: json_object(row.brief),
		api_data_brief: json_or_empty_list(row.api_data_brief),
		api_data: json_or_empty_list(row.api_data),
		trimmed_content: content.clone(),
		content,
		redirect: row.redirect,
		og_title: row.og_title,
		og_description: row.og_description,
		hidden_advertised: row.hidden_advertised,
		is_advertised: row.is_advertised,
		is_featured: row.is_featured,
		..Default::default()
	};

	(post, refs)
}

pub fn external_from_row(row: ExternalRow) -> (External, ExternalRefs) {
	let refs = ExternalRefs { id: row.id, partner: row.partner };
	let external = External {
		id: row.id.to_string(),
		slug: row.slug,
		title: row.title,
		state: row.state,
		published_date: wire_time(row.published_date),
		extend_byline: row.extend_byline,
		thumb: row.thumb,
		thumb_caption: row.thumb_caption,
		brief: row.brief,
		content: row.content,
		updated_at: wire_time(row.updated_at),
		..Default::default()
	};

	(external, refs)
}

pub fn topic_from_row(row: TopicRow) -> (Topic, TopicRefs) {
	let refs = TopicRefs {
		id: row.id,
		hero_image: row.hero_image,
		og_image: row.og_image,
		hero_video: row.hero_video,
	};
	let topic = Topic {
		id: row.id.to_string(),
		name: row.name,
		slug: row.slug,
		sort_order: row.sort_order,
		state: row.state,
		published_date: wire_time(row.published_date),
		brief: json_object(row.brief),
		api_data_brief: json_or_empty_list(row.api_data_brief),
		leading: row.leading,
		hero_url: row.hero_url,
		og_title: row.og_title,
		og_description: row.og_description,
		kind: row.kind,
		style: row.style,
		is_featured: row.is_featured,
		title_style: row.title_style,
		javascript: row.javascript,
		dfp: row.dfp,
		mobile_dfp: row.mobile_dfp,
		created_at: wire_time(row.created_at),
		..Default::default()
	};

	(topic, refs)
}

pub fn video_from_row(row: VideoRow, video_host: &str) -> (Video, VideoRefs) {
	let refs = VideoRefs { id: row.id, hero_image: row.hero_image };
	let video = Video {
		id: row.id.to_string(),
		name: row.name,
		is_shorts: row.is_shorts,
		youtube_url: row.youtube_url,
		file_duration: media::duration(&row.file_duration),
		youtube_duration: media::duration(&row.youtube_duration),
		video_src: media::video_src(
			video_host,
			row.file_filename.as_deref(),
			row.url_original.as_deref(),
		),
		content: row.content,
		uploader: row.uploader,
		uploader_email: row.uploader_email,
		is_feed: row.is_feed,
		video_section: row.video_section,
		state: row.state,
		published_date: wire_time(row.published_date),
		published_date_string: row.published_date_string,
		update_time_stamp: row.update_time_stamp,
		created_at: wire_time(row.created_at),
		..Default::default()
	};

	(video, refs)
}

/// Stored timestamps are UTC; the wire carries millisecond precision.
pub fn wire_time(value: Option<PrimitiveDateTime>) -> Option<OffsetDateTime> {
	value.map(|value| {
		let utc = value.assume_utc();
		let millis = utc.millisecond();

		utc.replace_nanosecond(u32::from(millis) * 1_000_000).unwrap_or(utc)
	})
}

/// Rich-text columns are objects or nothing.
fn json_object(value: Option<Value>) -> Option<Value> {
	value.filter(Value::is_object)
}

fn json_or_empty_list(value: Option<Value>) -> Value {
	match value {
		None | Some(Value::Null) => Value::Array(Vec::new()),
		Some(value) => value,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use time::macros::datetime;

	use crate::{
		executor::{self, POSTS, TOPICS},
		filter::Page,
		predicate::{self, Condition, Predicate, SqlArg},
	};

	fn published() -> Predicate {
		Predicate::compile(&[Condition::Eq {
			column: "p.state",
			value: SqlArg::Text("published".to_string()),
		}])
	}

	#[test]
	fn select_appends_limit_and_offset_after_filter_arguments() {
		let order = predicate::resolve_order(POSTS.sort, &[]);
		let (sql, args) = executor::select_sql(&POSTS, published(), &order, Page::new(Some(3), Some(6)));

		assert!(sql.starts_with("SELECT p.id,"));
		assert!(sql.ends_with(
			"FROM \"Post\" p\nWHERE p.state = $1\nORDER BY p.\"publishedDate\" DESC NULLS LAST, p.id DESC\nLIMIT $2\nOFFSET $3"
		));
		assert_eq!(
			args,
			vec![SqlArg::Text("published".to_string()), SqlArg::BigInt(3), SqlArg::BigInt(6)]
		);
	}

	#[test]
	fn unbounded_pages_have_no_limit() {
		let order = predicate::resolve_order(TOPICS.sort, &[]);
		let (sql, args) =
			executor::select_sql(&TOPICS, Predicate::compile(&[]), &order, Page::new(None, None));

		assert!(sql.contains("WHERE TRUE"));
		assert!(!sql.contains("LIMIT"));
		assert!(!sql.contains("OFFSET"));
		assert!(args.is_empty());
	}

	#[test]
	fn count_shares_the_list_predicate() {
		let (sql, args) = executor::count_sql(&POSTS, published());

		assert_eq!(sql, "SELECT COUNT(*)\nFROM \"Post\" p\nWHERE p.state = $1");
		assert_eq!(args, vec![SqlArg::Text("published".to_string())]);
	}

	#[test]
	fn wire_time_truncates_to_milliseconds() {
		let value = executor::wire_time(Some(datetime!(2024-05-01 08:30:15.123_456_789)));

		assert_eq!(value, Some(datetime!(2024-05-01 08:30:15.123 UTC)));
		assert_eq!(executor::wire_time(None), None);
	}

	#[test]
	fn json_columns_normalize() {
		assert_eq!(executor::json_or_empty_list(None), json!([]));
		assert_eq!(executor::json_or_empty_list(Some(json!(null))), json!([]));
		assert_eq!(executor::json_or_empty_list(Some(json!([{ "a": 1 }]))), json!([{ "a": 1 }]));
		assert_eq!(executor::json_object(Some(json!("text"))), None);
		assert_eq!(executor::json_object(Some(json!({ "draft": {} }))), Some(json!({ "draft": {} })));
	}
}
