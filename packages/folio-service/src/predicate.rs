//! Lowering of typed filters into parameterized SQL predicates and resolved sort keys.
//!
//! Conditions render against the root aliases used by the executor: `p` (posts), `e`
//! (externals), `t` (topics), and `v` (videos). Every value is bound as a parameter; no user text
//! is spliced into SQL.

use serde::Serialize;
use sqlx::{Arguments, postgres::PgArguments};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{
	Error, Result,
	filter::{
		BooleanFilter, CategoryWhere, DateTimeFilter, Direction, ExternalUnique, ExternalWhere,
		OneOrMany, OrderRule, PostUnique, PostWhere, SectionWhere, StringFilter, TopicUnique,
		TopicWhere, VideoUnique, VideoWhere,
	},
};

pub const PUBLISHED: &str = "published";

const POST_SECTIONS_SOURCE: &str = r#""_Post_sections" ps JOIN "Section" s ON s.id = ps."B""#;
const POST_CATEGORIES_SOURCE: &str = r#""_Category_posts" cp JOIN "Category" c ON c.id = cp."A""#;
const VIDEO_TAGS_SOURCE: &str = r#""_Video_tags" vt JOIN "Tag" tg ON tg.id = vt."A""#;

pub const POST_SORT: Sortable = Sortable {
	fields: &[
		("publishedDate", r#"p."publishedDate""#),
		("updatedAt", r#"p."updatedAt""#),
		("title", "p.title"),
	],
	default: &[("publishedDate", Direction::Desc)],
	tie_breaker: "p.id",
};
pub const EXTERNAL_SORT: Sortable = Sortable {
	fields: &[("publishedDate", r#"e."publishedDate""#), ("updatedAt", r#"e."updatedAt""#)],
	default: &[("publishedDate", Direction::Desc)],
	tie_breaker: "e.id",
};
pub const TOPIC_SORT: Sortable = Sortable {
	fields: &[
		("sortOrder", r#"t."sortOrder""#),
		("id", "t.id"),
		("createdAt", r#"t."createdAt""#),
		("publishedDate", r#"t."publishedDate""#),
	],
	default: &[("sortOrder", Direction::Asc), ("id", Direction::Desc)],
	tie_breaker: "t.id",
};
pub const VIDEO_SORT: Sortable = Sortable {
	fields: &[("publishedDate", r#"v."publishedDate""#), ("id", "v.id")],
	default: &[("publishedDate", Direction::Desc)],
	tie_breaker: "v.id",
};

/// A bound query parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlArg {
	Text(String),
	TextList(Vec<String>),
	Bool(bool),
	Int(i32),
	BigInt(i64),
	Timestamp(PrimitiveDateTime),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
	Eq { column: &'static str, value: SqlArg },
	AnyOf { column: &'static str, values: Vec<String> },
	IsNotNull { column: &'static str },
	Not(Vec<Condition>),
	/// Correlated `EXISTS` over a join; `correlation` ties the source rows to the root row.
	Exists { source: &'static str, correlation: &'static str, inner: Vec<Condition> },
}
impl Condition {
	fn render(&self, args: &mut Vec<SqlArg>) -> String {
		match self {
			Self::Eq { column, value } => {
				args.push(value.clone());

				format!("{column} = ${}", args.len())
			},
			Self::AnyOf { column, values } => {
				args.push(SqlArg::TextList(values.clone()));

				format!("{column} = ANY(${})", args.len())
			},
			Self::IsNotNull { column } => format!("{column} IS NOT NULL"),
			Self::Not(inner) => format!("NOT COALESCE(({}), false)", render_all(inner, args)),
			Self::Exists { source, correlation, inner } => {
				let mut clause = format!("EXISTS (SELECT 1 FROM {source} WHERE {correlation}");

				for condition in inner {
					clause.push_str(" AND ");
					clause.push_str(&condition.render(args));
				}

				clause.push(')');

				clause
			},
		}
	}
}

/// A rendered `WHERE` body and the arguments its placeholders refer to, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
	pub clause: String,
	pub args: Vec<SqlArg>,
}
impl Predicate {
	pub fn compile(conditions: &[Condition]) -> Self {
		let mut args = Vec::new();
		let clause = render_all(conditions, &mut args);

		Self { clause, args }
	}
}

/// Sortable fields of one root entity: wire field name to qualified column.
#[derive(Clone, Copy, Debug)]
pub struct Sortable {
	pub fields: &'static [(&'static str, &'static str)],
	pub default: &'static [(&'static str, Direction)],
	pub tie_breaker: &'static str,
}
impl Sortable {
	fn column(&self, field: &str) -> Option<(&'static str, &'static str)> {
		self.fields.iter().copied().find(|(name, _)| *name == field)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortKey {
	pub field: &'static str,
	pub direction: Direction,
	#[serde(skip)]
	pub column: &'static str,
}

/// Forces `state = "published"` when the caller left the state unconstrained.
pub fn default_published(state: &mut Option<StringFilter>) {
	if state.as_ref().is_none_or(StringFilter::is_unconstrained) {
		*state = Some(StringFilter::equals(PUBLISHED));
	}
}

pub fn post_conditions(filter: &PostWhere) -> Result<Vec<Condition>> {
	reject_combinators("post", filter.and.as_deref(), filter.or.as_deref(), filter.not.as_ref())?;

	let mut conditions = Vec::new();

	push_string(&mut conditions, "p.slug", filter.slug.as_ref());
	push_string(&mut conditions, "p.state", filter.state.as_ref());
	push_bool(&mut conditions, r#"p."isAdult""#, filter.is_adult.as_ref());
	push_bool(&mut conditions, r#"p."isMember""#, filter.is_member.as_ref());

	if let Some(section) = filter.sections.as_ref().and_then(|f| f.some.as_ref()) {
		conditions.push(Condition::Exists {
			source: POST_SECTIONS_SOURCE,
			correlation: r#"ps."A" = p.id"#,
			inner: section_conditions(section),
		});
	}
	if let Some(category) = filter.categories.as_ref().and_then(|f| f.some.as_ref()) {
		conditions.push(Condition::Exists {
			source: POST_CATEGORIES_SOURCE,
			correlation: r#"cp."B" = p.id"#,
			inner: category_conditions(category)?,
		});
	}

	Ok(conditions)
}

/// Externals without a publish date are never listed or counted.
pub fn external_conditions(filter: &ExternalWhere) -> Vec<Condition> {
	let mut conditions = vec![Condition::IsNotNull { column: r#"e."publishedDate""# }];

	push_string(&mut conditions, "e.slug", filter.slug.as_ref());
	push_string(&mut conditions, "e.state", filter.state.as_ref());
	push_datetime(&mut conditions, r#"e."publishedDate""#, filter.published_date.as_ref());

	if let Some(partner) = filter.partner.as_ref() {
		let mut inner = Vec::new();

		push_string(&mut inner, "pt.slug", partner.slug.as_ref());

		conditions.push(Condition::Exists {
			source: r#""Partner" pt"#,
			correlation: "pt.id = e.partner",
			inner,
		});
	}

	conditions
}

pub fn topic_conditions(filter: &TopicWhere) -> Vec<Condition> {
	let mut conditions = Vec::new();

	push_string(&mut conditions, "t.state", filter.state.as_ref());

	conditions
}

pub fn video_conditions(filter: &VideoWhere) -> Vec<Condition> {
	let mut conditions = Vec::new();

	push_string(&mut conditions, "v.state", filter.state.as_ref());
	push_bool(&mut conditions, r#"v."isShorts""#, filter.is_shorts.as_ref());
	push_string(&mut conditions, r#"v."videoSection""#, filter.video_section.as_ref());
	push_string(&mut conditions, r#"v."youtubeUrl""#, filter.youtube_url.as_ref());

	if let Some(tag) = filter.tags.as_ref().and_then(|f| f.some.as_ref()) {
		let mut inner = Vec::new();

		if let Some(id) = tag.id.as_ref().and_then(|f| f.equals) {
			inner.push(Condition::Eq { column: "tg.id", value: SqlArg::Int(id.0) });
		}

		conditions.push(Condition::Exists {
			source: VIDEO_TAGS_SOURCE,
			correlation: r#"vt."B" = v.id"#,
			inner,
		});
	}

	conditions
}

/// Posts and externals resolve in any state; the caller decides what to show.
pub fn post_unique_conditions(unique: &PostUnique) -> Result<Vec<Condition>> {
	let mut conditions = Vec::new();

	if let Some(id) = unique.id {
		conditions.push(Condition::Eq { column: "p.id", value: SqlArg::Int(id.0) });
	}
	if let Some(slug) = unique.slug.as_ref() {
		conditions.push(Condition::Eq { column: "p.slug", value: SqlArg::Text(slug.clone()) });
	}
	if conditions.is_empty() {
		return Err(Error::invalid("$.where must name an id or slug."));
	}

	Ok(conditions)
}

pub fn external_unique_conditions(unique: &ExternalUnique) -> Result<Vec<Condition>> {
	let Some(id) = unique.id else {
		return Err(Error::invalid("$.where must name an id."));
	};

	Ok(vec![Condition::Eq { column: "e.id", value: SqlArg::Int(id.0) }])
}

pub fn topic_unique_conditions(unique: &TopicUnique) -> Result<Vec<Condition>> {
	let mut conditions = Vec::new();

	if let Some(id) = unique.id {
		conditions.push(Condition::Eq { column: "t.id", value: SqlArg::Int(id.0) });
	}
	if let Some(slug) = unique.slug.as_ref() {
		conditions.push(Condition::Eq { column: "t.slug", value: SqlArg::Text(slug.clone()) });
	}
	if let Some(name) = unique.name.as_ref() {
		conditions.push(Condition::Eq { column: "t.name", value: SqlArg::Text(name.clone()) });
	}
	if conditions.is_empty() {
		return Err(Error::invalid("$.where must name an id, slug, or name."));
	}

	conditions.push(published("t.state"));

	Ok(conditions)
}

pub fn video_unique_conditions(unique: &VideoUnique) -> Result<Vec<Condition>> {
	let Some(id) = unique.id else {
		return Err(Error::invalid("$.where must name an id."));
	};

	Ok(vec![Condition::Eq { column: "v.id", value: SqlArg::Int(id.0) }, published("v.state")])
}

/// Maps requested sort rules onto an entity's sortable columns. Unknown fields are dropped; if
/// nothing survives, the entity's default order applies.
pub fn resolve_order(sortable: &Sortable, rules: &[OrderRule]) -> Vec<SortKey> {
	let keys = rules
		.iter()
		.filter_map(|rule| {
			sortable.column(&rule.field).map(|(field, column)| SortKey {
				field,
				direction: rule.direction,
				column,
			})
		})
		.collect::<Vec<_>>();

	if !keys.is_empty() {
		return keys;
	}

	sortable
		.default
		.iter()
		.filter_map(|(field, direction)| {
			sortable.column(field).map(|(field, column)| SortKey {
				field,
				direction: *direction,
				column,
			})
		})
		.collect()
}

/// Renders `ORDER BY`, with nulls last and a trailing id tie-breaker unless the keys already
/// order by id.
pub fn order_by_clause(sortable: &Sortable, keys: &[SortKey]) -> String {
	let mut parts = keys
		.iter()
		.map(|key| format!("{} {} NULLS LAST", key.column, key.direction.as_sql()))
		.collect::<Vec<_>>();

	if !keys.iter().any(|key| key.column == sortable.tie_breaker) {
		parts.push(format!("{} DESC", sortable.tie_breaker));
	}

	parts.join(", ")
}

pub fn into_arguments(args: Vec<SqlArg>) -> Result<PgArguments> {
	let mut arguments = PgArguments::default();

	for arg in args {
		let added = match arg {
			SqlArg::Text(value) => arguments.add(value),
			SqlArg::TextList(values) => arguments.add(values),
			SqlArg::Bool(value) => arguments.add(value),
			SqlArg::Int(value) => arguments.add(value),
			SqlArg::BigInt(value) => arguments.add(value),
			SqlArg::Timestamp(value) => arguments.add(value),
		};

		added.map_err(|err| Error::Storage { message: format!("Failed to bind argument: {err}") })?;
	}

	Ok(arguments)
}

/// Timestamps are stored without a zone and compared as UTC.
pub fn to_storage_time(value: OffsetDateTime) -> PrimitiveDateTime {
	let utc = value.to_offset(UtcOffset::UTC);

	PrimitiveDateTime::new(utc.date(), utc.time())
}

fn render_all(conditions: &[Condition], args: &mut Vec<SqlArg>) -> String {
	if conditions.is_empty() {
		return "TRUE".to_string();
	}

	conditions.iter().map(|condition| condition.render(args)).collect::<Vec<_>>().join(" AND ")
}

fn published(column: &'static str) -> Condition {
	Condition::Eq { column, value: SqlArg::Text(PUBLISHED.to_string()) }
}

fn string_conditions(column: &'static str, filter: &StringFilter) -> Vec<Condition> {
	let mut conditions = Vec::new();

	if let Some(value) = filter.equals.as_ref() {
		conditions.push(Condition::Eq { column, value: SqlArg::Text(value.clone()) });
	}
	if let Some(values) = filter.any_of.as_ref() {
		conditions.push(Condition::AnyOf { column, values: values.clone() });
	}
	if let Some(inner) = filter.not.as_deref() {
		let inner = string_conditions(column, inner);

		if !inner.is_empty() {
			conditions.push(Condition::Not(inner));
		}
	}

	conditions
}

fn datetime_conditions(column: &'static str, filter: &DateTimeFilter) -> Vec<Condition> {
	let mut conditions = Vec::new();

	if let Some(value) = filter.equals {
		conditions
			.push(Condition::Eq { column, value: SqlArg::Timestamp(to_storage_time(value)) });
	}
	if let Some(inner) = filter.not.as_deref() {
		let inner = datetime_conditions(column, inner);

		if inner.is_empty() {
			conditions.push(Condition::IsNotNull { column });
		} else {
			conditions.push(Condition::Not(inner));
		}
	}

	conditions
}

fn push_string(conditions: &mut Vec<Condition>, column: &'static str, filter: Option<&StringFilter>) {
	if let Some(filter) = filter {
		conditions.extend(string_conditions(column, filter));
	}
}

fn push_bool(conditions: &mut Vec<Condition>, column: &'static str, filter: Option<&BooleanFilter>) {
	if let Some(value) = filter.and_then(|f| f.equals) {
		conditions.push(Condition::Eq { column, value: SqlArg::Bool(value) });
	}
}

fn push_datetime(
	conditions: &mut Vec<Condition>,
	column: &'static str,
	filter: Option<&DateTimeFilter>,
) {
	if let Some(filter) = filter {
		conditions.extend(datetime_conditions(column, filter));
	}
}

fn section_conditions(filter: &SectionWhere) -> Vec<Condition> {
	let mut conditions = Vec::new();

	push_string(&mut conditions, "s.slug", filter.slug.as_ref());
	push_string(&mut conditions, "s.state", filter.state.as_ref());

	conditions
}

fn category_conditions(filter: &CategoryWhere) -> Result<Vec<Condition>> {
	reject_combinators(
		"categories.some",
		filter.and.as_deref(),
		filter.or.as_deref(),
		filter.not.as_ref(),
	)?;

	let mut conditions = Vec::new();

	push_string(&mut conditions, "c.slug", filter.slug.as_ref());
	push_string(&mut conditions, "c.state", filter.state.as_ref());

	Ok(conditions)
}

fn reject_combinators<T>(
	scope: &str,
	and: Option<&[T]>,
	or: Option<&[T]>,
	not: Option<&OneOrMany<T>>,
) -> Result<()> {
	let combinator = if and.is_some_and(|list| !list.is_empty()) {
		Some("AND")
	} else if or.is_some_and(|list| !list.is_empty()) {
		Some("OR")
	} else if not.is_some_and(|not| !not.is_empty()) {
		Some("NOT")
	} else {
		None
	};

	match combinator {
		Some(name) => Err(Error::invalid(format!("{name} is not supported in {scope} filters."))),
		None => Ok(()),
	}
}
