//! Decoding of untyped `where`, `orderBy`, and pagination arguments into typed inputs.
//!
//! Unknown keys are ignored so a richer upstream schema can pass through. A recognized key with
//! the wrong shape is a client error. An absent or `null` filter decodes to `None`, which is
//! distinct from a present filter that matches nothing.

use std::fmt::{Display, Formatter};

use serde::{
	Deserialize, Deserializer, Serialize,
	de::{self, DeserializeOwned},
};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{Error, Result};

pub const MAX_IN_LIST_ITEMS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError {
	path: String,
	message: String,
}
impl Display for FilterParseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.path, self.message)
	}
}

impl From<FilterParseError> for Error {
	fn from(err: FilterParseError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}

/// A store id given as a number or a numeric string, including float and exponent forms such as
/// `1378586.0` or `"1.378586e+06"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(pub i32);
impl<'de> Deserialize<'de> for Id {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Int(i64),
			Float(f64),
			Text(String),
		}

		let parsed = match Raw::deserialize(deserializer)? {
			Raw::Int(value) => i32::try_from(value).ok().filter(|id| *id > 0),
			Raw::Float(value) => id_from_float(value),
			Raw::Text(value) => parse_id(&value),
		};

		parsed.map(Self).ok_or_else(|| de::Error::custom("expected a positive integer id"))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StringFilter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub equals: Option<String>,
	#[serde(rename = "in", deserialize_with = "bounded_list", skip_serializing_if = "Option::is_none")]
	pub any_of: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub not: Option<Box<StringFilter>>,
}
impl StringFilter {
	pub fn equals(value: impl Into<String>) -> Self {
		Self { equals: Some(value.into()), ..Default::default() }
	}

	/// True when the filter places no constraint at any depth.
	pub fn is_unconstrained(&self) -> bool {
		self.equals.is_none()
			&& self.any_of.is_none()
			&& self.not.as_deref().is_none_or(StringFilter::is_unconstrained)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BooleanFilter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub equals: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DateTimeFilter {
	#[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub equals: Option<OffsetDateTime>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub not: Option<Box<DateTimeFilter>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IdFilter {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub equals: Option<Id>,
}

/// `{ some: { ... } }` over a to-many relation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct SomeFilter<T> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub some: Option<T>,
}
impl<T> Default for SomeFilter<T> {
	fn default() -> Self {
		Self { some: None }
	}
}

/// `NOT` accepts a single filter or a list of filters.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	Many(Vec<T>),
	One(Box<T>),
}
impl<T> OneOrMany<T> {
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Many(items) if items.is_empty())
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategoryWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
	#[serde(rename = "AND", skip_serializing_if = "Option::is_none")]
	pub and: Option<Vec<CategoryWhere>>,
	#[serde(rename = "OR", skip_serializing_if = "Option::is_none")]
	pub or: Option<Vec<CategoryWhere>>,
	#[serde(rename = "NOT", skip_serializing_if = "Option::is_none")]
	pub not: Option<OneOrMany<CategoryWhere>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_adult: Option<BooleanFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_member: Option<BooleanFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sections: Option<SomeFilter<SectionWhere>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub categories: Option<SomeFilter<CategoryWhere>>,
	#[serde(rename = "AND", skip_serializing_if = "Option::is_none")]
	pub and: Option<Vec<PostWhere>>,
	#[serde(rename = "OR", skip_serializing_if = "Option::is_none")]
	pub or: Option<Vec<PostWhere>>,
	#[serde(rename = "NOT", skip_serializing_if = "Option::is_none")]
	pub not: Option<OneOrMany<PostWhere>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PartnerWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<StringFilter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub partner: Option<PartnerWhere>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub published_date: Option<DateTimeFilter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TagWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<IdFilter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoWhere {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_shorts: Option<BooleanFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub video_section: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub youtube_url: Option<StringFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tags: Option<SomeFilter<TagWhere>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostUnique {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<Id>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExternalUnique {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<Id>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicUnique {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<Id>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slug: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoUnique {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<Id>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Asc,
	Desc,
}
impl Direction {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

/// One requested sort key, before it is checked against an entity's sortable columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRule {
	pub field: String,
	pub direction: Direction,
}

/// Normalized pagination. `take: None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
	pub take: Option<i64>,
	pub skip: i64,
}
impl Page {
	/// A non-positive `take` means unbounded. A negative `skip` clamps to zero.
	pub fn new(take: Option<i64>, skip: Option<i64>) -> Self {
		Self { take: take.filter(|take| *take > 0), skip: skip.unwrap_or(0).max(0) }
	}

	pub fn single() -> Self {
		Self { take: Some(1), skip: 0 }
	}
}

/// Decodes one argument object. `label` is the JSON path reported on failure.
pub fn decode<T>(raw: Option<&Value>, label: &str) -> Result<Option<T>, FilterParseError>
where
	T: DeserializeOwned,
{
	match raw {
		None | Some(Value::Null) => Ok(None),
		Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
			.map(Some)
			.map_err(|err| FilterParseError { path: label.to_string(), message: err.to_string() }),
		Some(_) => Err(FilterParseError {
			path: label.to_string(),
			message: "expected an object".to_string(),
		}),
	}
}

/// Decodes `orderBy`: a list of `{ field: "asc" | "desc" }` objects, or a single such object.
pub fn decode_order(raw: Option<&Value>) -> Result<Vec<OrderRule>, FilterParseError> {
	let path = "$.orderBy";
	let entries = match raw {
		None | Some(Value::Null) => return Ok(Vec::new()),
		Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
		Some(value @ Value::Object(_)) => vec![value],
		Some(_) => {
			return Err(FilterParseError {
				path: path.to_string(),
				message: "expected a list of objects".to_string(),
			});
		},
	};
	let mut rules = Vec::new();

	for (index, entry) in entries.into_iter().enumerate() {
		let Some(obj) = entry.as_object() else {
			return Err(FilterParseError {
				path: format!("{path}[{index}]"),
				message: "expected an object".to_string(),
			});
		};

		for (field, direction) in obj {
			let direction = match direction {
				Value::Null => continue,
				Value::String(raw) if raw.eq_ignore_ascii_case("asc") => Direction::Asc,
				Value::String(raw) if raw.eq_ignore_ascii_case("desc") => Direction::Desc,
				_ => {
					return Err(FilterParseError {
						path: format!("{path}[{index}].{field}"),
						message: "direction must be \"asc\" or \"desc\"".to_string(),
					});
				},
			};

			rules.push(OrderRule { field: field.clone(), direction });
		}
	}

	Ok(rules)
}

/// Parses `"42"`, `"42.0"`, or `"4.2e+01"` into a positive store id.
pub fn parse_id(raw: &str) -> Option<i32> {
	let raw = raw.trim();

	if let Ok(value) = raw.parse::<i32>() {
		return (value > 0).then_some(value);
	}

	raw.parse::<f64>().ok().and_then(id_from_float)
}

fn id_from_float(value: f64) -> Option<i32> {
	if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > f64::from(i32::MAX) {
		return None;
	}

	Some(value as i32)
}

fn bounded_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
	D: Deserializer<'de>,
{
	let Some(mut items) = Option::<Vec<String>>::deserialize(deserializer)? else {
		return Ok(None);
	};

	if items.len() > MAX_IN_LIST_ITEMS {
		return Err(de::Error::custom(format!(
			"`in` accepts at most {MAX_IN_LIST_ITEMS} values"
		)));
	}

	// `in` is a set. Sorted and deduplicated so equivalent requests share a cache key.
	items.sort_unstable();
	items.dedup();

	Ok(Some(items))
}
