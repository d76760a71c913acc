use std::collections::HashMap;

use folio_domain::content::{Photo, Topic};
use folio_storage::{
	models::{ImageLink, PostLink, SectionLink, TagLink, VideoRefRow},
	relations,
};

use crate::{
	executor::TopicRefs,
	hydrate::{self, HydrationReport, Hydrator, RelationKind},
};

#[derive(Debug, Default)]
pub struct TopicRelations {
	pub slideshow_images: Vec<ImageLink>,
	pub tags: Vec<TagLink>,
	pub sections: Vec<SectionLink>,
	/// Published member posts, newest first per topic.
	pub posts: Vec<PostLink>,
	pub hero_videos: Vec<VideoRefRow>,
}
impl TopicRelations {
	fn image_ids(&self, refs: &[TopicRefs]) -> Vec<i32> {
		let roots = refs.iter().flat_map(|refs| [refs.hero_image, refs.og_image]);
		let posts = self.posts.iter().map(|link| link.post.hero_image);
		let videos = self.hero_videos.iter().map(|video| video.hero_image);

		hydrate::id_set(roots.chain(posts).chain(videos))
	}
}

impl Hydrator<'_> {
	pub async fn topics(
		&self,
		roots: Vec<(Topic, TopicRefs)>,
		report: &mut HydrationReport,
	) -> Vec<Topic> {
		if roots.is_empty() {
			return Vec::new();
		}

		let refs = roots.iter().map(|(_, refs)| refs.clone()).collect::<Vec<_>>();
		let ids = refs.iter().map(|refs| refs.id).collect::<Vec<_>>();
		let video_ids = hydrate::id_set(refs.iter().map(|refs| refs.hero_video));
		let pool = self.pool;
		let (slideshow_images, tags, sections, posts, hero_videos) = tokio::join!(
			relations::topic_slideshow_images(pool, &ids),
			relations::topic_tags(pool, &ids),
			relations::topic_sections(pool, &ids),
			relations::topic_posts(pool, &ids),
			relations::videos_by_ids(pool, &video_ids),
		);
		let relations = TopicRelations {
			slideshow_images: report.settle(RelationKind::SlideshowImages, slideshow_images),
			tags: report.settle(RelationKind::Tags, tags),
			sections: report.settle(RelationKind::Sections, sections),
			posts: report.settle(RelationKind::TopicPosts, posts),
			hero_videos: report.settle(RelationKind::HeroVideos, hero_videos),
		};
		let image_ids = relations.image_ids(&refs);
		let images =
			report.settle(RelationKind::Images, relations::images_by_ids(pool, &image_ids).await);
		let photos = hydrate::photo_index(images, &self.media.statics_host);

		splice(roots, relations, &photos, &self.media.statics_host, &self.media.video_host)
	}
}

pub fn splice(
	roots: Vec<(Topic, TopicRefs)>,
	relations: TopicRelations,
	photos: &HashMap<i32, Photo>,
	statics_host: &str,
	video_host: &str,
) -> Vec<Topic> {
	let mut slideshow_images = hydrate::group(relations.slideshow_images, |link| {
		(link.owner_id, hydrate::photo(&link.image, statics_host))
	});
	let mut tags = hydrate::group(relations.tags, hydrate::tag);
	let mut sections = hydrate::group(relations.sections, hydrate::section);
	let mut posts = hydrate::group(relations.posts, |link| {
		(link.owner_id, hydrate::post_summary(&link.post, photos))
	});
	let videos = relations
		.hero_videos
		.iter()
		.map(|row| (row.id, hydrate::video_summary(row, photos, video_host)))
		.collect::<HashMap<_, _>>();

	roots
		.into_iter()
		.map(|(mut topic, refs)| {
			let id = refs.id;

			topic.slideshow_images = hydrate::take_group(&mut slideshow_images, id);
			topic.tags = hydrate::take_group(&mut tags, id);
			topic.sections = hydrate::take_group(&mut sections, id);
			topic.posts = hydrate::take_group(&mut posts, id);
			topic.hero_image = hydrate::lookup_photo(photos, refs.hero_image);
			topic.og_image = hydrate::lookup_photo(photos, refs.og_image);
			topic.hero_video = refs.hero_video.and_then(|id| videos.get(&id)).cloned();

			topic
		})
		.collect()
}
