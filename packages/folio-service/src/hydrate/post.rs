use std::collections::HashMap;

use folio_domain::content::{Photo, Post};
use folio_storage::{
	models::{
		CategoryLink, ContactLink, PostLink, PostRefRow, SectionLink, TagLink, TopicRefRow,
		VideoRefRow, WarningLink,
	},
	relations::{self, ContactRole, PostTagSet},
};

use crate::{
	executor::PostRefs,
	hydrate::{self, HydrationReport, Hydrator, RelationKind},
};

/// First-order relation rows for one post batch.
#[derive(Debug, Default)]
pub struct PostRelations {
	pub sections: Vec<SectionLink>,
	pub categories: Vec<CategoryLink>,
	pub writers: Vec<ContactLink>,
	pub photographers: Vec<ContactLink>,
	pub camera_man: Vec<ContactLink>,
	pub designers: Vec<ContactLink>,
	pub engineers: Vec<ContactLink>,
	pub vocals: Vec<ContactLink>,
	pub tags: Vec<TagLink>,
	pub tags_algo: Vec<TagLink>,
	pub warnings: Vec<WarningLink>,
	pub relateds: Vec<PostLink>,
	/// Targets of `relatedsOne`, `relatedsTwo`, and `relatedsThree`.
	pub singles: Vec<PostRefRow>,
	pub hero_videos: Vec<VideoRefRow>,
	pub topics: Vec<TopicRefRow>,
}
impl PostRelations {
	/// Image ids referenced by the batch and by its first-order relations.
	fn image_ids(&self, refs: &[PostRefs]) -> Vec<i32> {
		let roots = refs.iter().flat_map(|refs| [refs.hero_image, refs.og_image]);
		let relateds = self.relateds.iter().map(|link| link.post.hero_image);
		let singles = self.singles.iter().map(|post| post.hero_image);
		let videos = self.hero_videos.iter().map(|video| video.hero_image);

		hydrate::id_set(roots.chain(relateds).chain(singles).chain(videos))
	}
}

impl Hydrator<'_> {
	pub async fn posts(&self, roots: Vec<(Post, PostRefs)>, report: &mut HydrationReport) -> Vec<Post> {
		if roots.is_empty() {
			return Vec::new();
		}

		let refs = roots.iter().map(|(_, refs)| refs.clone()).collect::<Vec<_>>();
		let ids = refs.iter().map(|refs| refs.id).collect::<Vec<_>>();
		let single_ids = hydrate::id_set(
			refs.iter().flat_map(|refs| [refs.relateds_one, refs.relateds_two, refs.relateds_three]),
		);
		let video_ids = hydrate::id_set(refs.iter().map(|refs| refs.hero_video));
		let topic_ids = hydrate::id_set(refs.iter().map(|refs| refs.topic));
		let pool = self.pool;
		let (
			sections,
			categories,
			writers,
			photographers,
			camera_man,
			designers,
			engineers,
			vocals,
			tags,
			tags_algo,
			warnings,
			relateds,
			singles,
			hero_videos,
			topics,
		) = tokio::join!(
			relations::post_sections(pool, &ids),
			relations::post_categories(pool, &ids),
			relations::post_contacts(pool, ContactRole::Writers, &ids),
			relations::post_contacts(pool, ContactRole::Photographers, &ids),
			relations::post_contacts(pool, ContactRole::CameraMan, &ids),
			relations::post_contacts(pool, ContactRole::Designers, &ids),
			relations::post_contacts(pool, ContactRole::Engineers, &ids),
			relations::post_contacts(pool, ContactRole::Vocals, &ids),
			relations::post_tags(pool, PostTagSet::Editorial, &ids),
			relations::post_tags(pool, PostTagSet::Algorithmic, &ids),
			relations::post_warnings(pool, &ids),
			relations::post_relateds(pool, &ids),
			relations::posts_by_ids(pool, &single_ids),
			relations::videos_by_ids(pool, &video_ids),
			relations::topics_by_ids(pool, &topic_ids),
		);
		let relations = PostRelations {
			sections: report.settle(RelationKind::Sections, sections),
			categories: report.settle(RelationKind::Categories, categories),
			writers: report.settle(RelationKind::Writers, writers),
			photographers: report.settle(RelationKind::Photographers, photographers),
			camera_man: report.settle(RelationKind::CameraMan, camera_man),
			designers: report.settle(RelationKind::Designers, designers),
			engineers: report.settle(RelationKind::Engineers, engineers),
			vocals: report.settle(RelationKind::Vocals, vocals),
			tags: report.settle(RelationKind::Tags, tags),
			tags_algo: report.settle(RelationKind::TagsAlgo, tags_algo),
			warnings: report.settle(RelationKind::Warnings, warnings),
			relateds: report.settle(RelationKind::Relateds, relateds),
			singles: report.settle(RelationKind::RelatedsSingle, singles),
			hero_videos: report.settle(RelationKind::HeroVideos, hero_videos),
			topics: report.settle(RelationKind::Topics, topics),
		};
		let image_ids = relations.image_ids(&refs);
		let images =
			report.settle(RelationKind::Images, relations::images_by_ids(pool, &image_ids).await);
		let photos = hydrate::photo_index(images, &self.media.statics_host);

		splice(roots, relations, &photos, &self.media.video_host)
	}
}

pub fn splice(
	roots: Vec<(Post, PostRefs)>,
	relations: PostRelations,
	photos: &HashMap<i32, Photo>,
	video_host: &str,
) -> Vec<Post> {
	let mut sections = hydrate::group(relations.sections, hydrate::section);
	let mut categories = hydrate::group(relations.categories, hydrate::category);
	let mut writers = hydrate::group(relations.writers, hydrate::contact);
	let mut photographers = hydrate::group(relations.photographers, hydrate::contact);
	let mut camera_man = hydrate::group(relations.camera_man, hydrate::contact);
	let mut designers = hydrate::group(relations.designers, hydrate::contact);
	let mut engineers = hydrate::group(relations.engineers, hydrate::contact);
	let mut vocals = hydrate::group(relations.vocals, hydrate::contact);
	let mut tags = hydrate::group(relations.tags, hydrate::tag);
	let mut tags_algo = hydrate::group(relations.tags_algo, hydrate::tag);
	let mut warnings = hydrate::group(relations.warnings, hydrate::warning);
	let mut relateds = hydrate::group(relations.relateds, |link| {
		(link.owner_id, hydrate::post_summary(&link.post, photos))
	});
	let singles = relations
		.singles
		.iter()
		.map(|row| (row.id, hydrate::post_summary(row, photos)))
		.collect::<HashMap<_, _>>();
	let videos = relations
		.hero_videos
		.iter()
		.map(|row| (row.id, hydrate::video_summary(row, photos, video_host)))
		.collect::<HashMap<_, _>>();
	let topics = relations
		.topics
		.iter()
		.map(|row| (row.id, hydrate::topic_summary(row)))
		.collect::<HashMap<_, _>>();
	let single = |id: Option<i32>| id.and_then(|id| singles.get(&id)).cloned();

	roots
		.into_iter()
		.map(|(mut post, refs)| {
			let id = refs.id;

			post.sections = hydrate::take_group(&mut sections, id);
			post.sections_in_input_order = post.sections.clone();
			post.categories = hydrate::take_group(&mut categories, id);
			post.categories_in_input_order = post.categories.clone();
			post.writers = hydrate::take_group(&mut writers, id);
			post.writers_in_input_order = post.writers.clone();
			post.photographers = hydrate::take_group(&mut photographers, id);
			post.camera_man = hydrate::take_group(&mut camera_man, id);
			post.designers = hydrate::take_group(&mut designers, id);
			post.engineers = hydrate::take_group(&mut engineers, id);
			post.vocals = hydrate::take_group(&mut vocals, id);
			post.tags = hydrate::take_group(&mut tags, id);
			post.tags_algo = hydrate::take_group(&mut tags_algo, id);
			post.warnings = hydrate::take_group(&mut warnings, id);
			post.relateds = hydrate::take_group(&mut relateds, id);
			post.relateds_in_input_order = post.relateds.clone();
			post.relateds_one = single(refs.relateds_one);
			post.relateds_two = single(refs.relateds_two);
			post.relateds_three = single(refs.relateds_three);
			post.hero_image = hydrate::lookup_photo(photos, refs.hero_image);
			post.og_image = hydrate::lookup_photo(photos, refs.og_image);
			post.hero_video = refs.hero_video.and_then(|id| videos.get(&id)).cloned();
			post.topics = refs.topic.and_then(|id| topics.get(&id)).cloned();

			post
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use folio_domain::content::{Photo, Post};
	use folio_storage::models::{PostLink, PostRefRow, SectionLink, TopicRefRow, VideoRefRow};

	use crate::{
		executor::PostRefs,
		hydrate::post::{self, PostRelations},
	};

	fn root(id: i32, refs: PostRefs) -> (Post, PostRefs) {
		(Post { id: id.to_string(), ..Default::default() }, PostRefs { id, ..refs })
	}

	fn post_ref(id: i32, hero_image: Option<i32>) -> PostRefRow {
		PostRefRow {
			id,
			slug: format!("post-{id}"),
			title: format!("Post {id}"),
			state: "published".to_string(),
			published_date: None,
			hero_image,
		}
	}

	fn photos() -> HashMap<i32, Photo> {
		HashMap::from([(10, Photo { id: "10".to_string(), ..Default::default() })])
	}

	#[test]
	fn unjoined_relations_are_empty_lists() {
		let posts = post::splice(
			vec![root(1, PostRefs::default())],
			PostRelations::default(),
			&HashMap::new(),
			"",
		);
		let value = serde_json::to_value(&posts[0]).expect("Post should serialize.");

		assert_eq!(value["sections"], serde_json::json!([]));
		assert_eq!(value["relateds"], serde_json::json!([]));
		assert_eq!(value["warnings"], serde_json::json!([]));
		assert_eq!(value["heroImage"], serde_json::Value::Null);
	}

	#[test]
	fn relations_land_on_their_owner_in_fetch_order() {
		let relations = PostRelations {
			sections: vec![
				SectionLink {
					owner_id: 2,
					id: 7,
					name: "News".to_string(),
					slug: "news".to_string(),
					state: "active".to_string(),
					color: String::new(),
				},
				SectionLink {
					owner_id: 2,
					id: 9,
					name: "Life".to_string(),
					slug: "life".to_string(),
					state: "active".to_string(),
					color: String::new(),
				},
			],
			relateds: vec![PostLink { owner_id: 1, post: post_ref(2, Some(10)) }],
			..Default::default()
		};
		let posts = post::splice(
			vec![root(1, PostRefs::default()), root(2, PostRefs::default())],
			relations,
			&photos(),
			"",
		);

		assert!(posts[0].sections.is_empty());
		assert_eq!(
			posts[1].sections.iter().map(|s| s.slug.as_str()).collect::<Vec<_>>(),
			vec!["news", "life"]
		);
		assert_eq!(posts[1].sections_in_input_order, posts[1].sections);
		assert_eq!(posts[0].relateds.len(), 1);
		assert_eq!(
			posts[0].relateds[0].hero_image.as_ref().map(|p| p.id.as_str()),
			Some("10")
		);
	}

	#[test]
	fn single_references_resolve_or_stay_absent() {
		let refs = PostRefs {
			hero_image: Some(10),
			og_image: Some(99),
			hero_video: Some(4),
			topic: Some(3),
			relateds_two: Some(2),
			..Default::default()
		};
		let relations = PostRelations {
			singles: vec![post_ref(2, None)],
			hero_videos: vec![VideoRefRow {
				id: 4,
				file_filename: Some("clip.mp4".to_string()),
				url_original: None,
				hero_image: Some(10),
			}],
			topics: vec![TopicRefRow { id: 3, name: "Votes".to_string(), slug: "votes".to_string() }],
			..Default::default()
		};
		let posts =
			post::splice(vec![root(1, refs)], relations, &photos(), "https://videos.example.com");
		let post = &posts[0];

		assert_eq!(post.hero_image.as_ref().map(|p| p.id.as_str()), Some("10"));
		assert_eq!(post.og_image, None);
		assert_eq!(post.relateds_one, None);
		assert_eq!(post.relateds_two.as_ref().map(|p| p.id.as_str()), Some("2"));

		let video = post.hero_video.as_ref().expect("Hero video should resolve.");

		assert_eq!(video.video_src, "https://videos.example.com/clip.mp4");
		assert!(video.hero_image.is_some());
		assert_eq!(post.topics.as_ref().map(|t| t.slug.as_str()), Some("votes"));
	}

	#[test]
	fn null_references_never_reach_the_image_fetch() {
		let relations = PostRelations {
			relateds: vec![PostLink { owner_id: 1, post: post_ref(2, None) }],
			..Default::default()
		};
		let refs = vec![
			PostRefs { id: 1, hero_image: None, og_image: Some(5), ..Default::default() },
			PostRefs { id: 2, hero_image: Some(5), ..Default::default() },
		];

		assert_eq!(relations.image_ids(&refs), vec![5]);
	}
}
