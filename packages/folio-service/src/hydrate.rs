//! Batched relation hydration.
//!
//! Each root batch goes through three steps: collect the owner and referenced ids per relation
//! kind, fetch every kind with one query (first-order kinds concurrently, then images over the
//! union of ids the first round produced), and splice the grouped rows into the entities. The
//! splice is a pure function of its inputs.
//!
//! A failed relation fetch degrades that relation to empty, logs the kind, and is recorded in a
//! [`HydrationReport`]. Root entities are always returned.

mod external;
mod post;
mod topic;
mod video;

pub use external::ExternalRelations;
pub use post::PostRelations;
pub use topic::TopicRelations;
pub use video::VideoRelations;

pub(crate) use external::partner;

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;

use folio_config::Media;
use folio_domain::{
	content::{
		Category, Contact, ImageFile, Photo, PostSummary, Section, Tag, TopicSummary, VideoSummary,
		Warning,
	},
	media,
};
use folio_storage::models::{
	CategoryLink, ContactLink, ImageRow, PostRefRow, SectionLink, TagLink, TopicRefRow,
	VideoRefRow, WarningLink,
};

use crate::executor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
	Sections,
	Categories,
	Writers,
	Photographers,
	CameraMan,
	Designers,
	Engineers,
	Vocals,
	Tags,
	TagsAlgo,
	Warnings,
	Relateds,
	RelatedsSingle,
	HeroVideos,
	Topics,
	Images,
	Partners,
	SlideshowImages,
	TopicPosts,
	RelatedPosts,
}
impl RelationKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sections => "sections",
			Self::Categories => "categories",
			Self::Writers => "writers",
			Self::Photographers => "photographers",
			Self::CameraMan => "camera_man",
			Self::Designers => "designers",
			Self::Engineers => "engineers",
			Self::Vocals => "vocals",
			Self::Tags => "tags",
			Self::TagsAlgo => "tags_algo",
			Self::Warnings => "warnings",
			Self::Relateds => "relateds",
			Self::RelatedsSingle => "relateds_single",
			Self::HeroVideos => "hero_videos",
			Self::Topics => "topics",
			Self::Images => "images",
			Self::Partners => "partners",
			Self::SlideshowImages => "slideshow_images",
			Self::TopicPosts => "topic_posts",
			Self::RelatedPosts => "related_posts",
		}
	}
}

/// Relation kinds that failed while hydrating one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HydrationReport {
	pub degraded: Vec<RelationKind>,
}
impl HydrationReport {
	pub fn is_degraded(&self) -> bool {
		!self.degraded.is_empty()
	}

	/// Unwraps a relation fetch, degrading it to empty on failure.
	pub fn settle<T>(&mut self, kind: RelationKind, result: folio_storage::Result<Vec<T>>) -> Vec<T> {
		match result {
			Ok(rows) => rows,
			Err(err) => {
				tracing::warn!(
					relation = kind.as_str(),
					error = %err,
					"Relation fetch failed. Serving the relation empty."
				);

				self.degraded.push(kind);

				Vec::new()
			},
		}
	}
}

/// Resolves relations for root batches against one pool.
#[derive(Clone, Copy, Debug)]
pub struct Hydrator<'a> {
	pub pool: &'a PgPool,
	pub media: &'a Media,
	pub fallback_partner: Option<i32>,
}

/// Sorted, de-duplicated ids with nulls dropped.
pub(crate) fn id_set(ids: impl IntoIterator<Item = Option<i32>>) -> Vec<i32> {
	ids.into_iter().flatten().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Groups rows by owner id, keeping each owner's rows in fetch order.
pub(crate) fn group<T, U>(rows: Vec<T>, split: impl Fn(T) -> (i32, U)) -> HashMap<i32, Vec<U>> {
	let mut grouped = HashMap::<i32, Vec<U>>::new();

	for row in rows {
		let (owner, value) = split(row);

		grouped.entry(owner).or_default().push(value);
	}

	grouped
}

pub(crate) fn take_group<U>(grouped: &mut HashMap<i32, Vec<U>>, owner: i32) -> Vec<U> {
	grouped.remove(&owner).unwrap_or_default()
}

pub(crate) fn photo(row: &ImageRow, host: &str) -> Photo {
	Photo {
		id: row.id.to_string(),
		name: row.name.clone(),
		topic_keywords: row.topic_keywords.clone(),
		image_file: ImageFile {
			width: row.width.unwrap_or_default(),
			height: row.height.unwrap_or_default(),
		},
		resized: media::resized(host, &row.file_id, &row.extension),
		resized_webp: media::resized_webp(host, &row.file_id),
	}
}

pub(crate) fn photo_index(rows: Vec<ImageRow>, host: &str) -> HashMap<i32, Photo> {
	rows.iter().map(|row| (row.id, photo(row, host))).collect()
}

pub(crate) fn lookup_photo(photos: &HashMap<i32, Photo>, id: Option<i32>) -> Option<Photo> {
	id.and_then(|id| photos.get(&id)).cloned()
}

pub(crate) fn post_summary(row: &PostRefRow, photos: &HashMap<i32, Photo>) -> PostSummary {
	PostSummary {
		id: row.id.to_string(),
		slug: row.slug.clone(),
		title: row.title.clone(),
		state: row.state.clone(),
		published_date: executor::wire_time(row.published_date),
		hero_image: lookup_photo(photos, row.hero_image),
	}
}

pub(crate) fn video_summary(
	row: &VideoRefRow,
	photos: &HashMap<i32, Photo>,
	video_host: &str,
) -> VideoSummary {
	VideoSummary {
		id: row.id.to_string(),
		video_src: media::video_src(
			video_host,
			row.file_filename.as_deref(),
			row.url_original.as_deref(),
		),
		hero_image: lookup_photo(photos, row.hero_image),
	}
}

pub(crate) fn topic_summary(row: &TopicRefRow) -> TopicSummary {
	TopicSummary { id: row.id.to_string(), name: row.name.clone(), slug: row.slug.clone() }
}

pub(crate) fn section(link: SectionLink) -> (i32, Section) {
	(
		link.owner_id,
		Section {
			id: link.id.to_string(),
			name: link.name,
			slug: link.slug,
			state: link.state,
			color: link.color,
		},
	)
}

pub(crate) fn category(link: CategoryLink) -> (i32, Category) {
	(
		link.owner_id,
		Category { id: link.id.to_string(), name: link.name, slug: link.slug, state: link.state },
	)
}

pub(crate) fn contact(link: ContactLink) -> (i32, Contact) {
	(link.owner_id, Contact { id: link.id.to_string(), name: link.name })
}

pub(crate) fn tag(link: TagLink) -> (i32, Tag) {
	(link.owner_id, Tag { id: link.id.to_string(), name: link.name, slug: link.slug })
}

pub(crate) fn warning(link: WarningLink) -> (i32, Warning) {
	(link.owner_id, Warning { id: link.id.to_string(), content: link.content })
}
