use std::collections::HashMap;

use folio_domain::content::{Photo, Video};
use folio_storage::{
	models::{PostLink, TagLink},
	relations,
};

use crate::{
	executor::VideoRefs,
	hydrate::{self, HydrationReport, Hydrator, RelationKind},
};

#[derive(Debug, Default)]
pub struct VideoRelations {
	pub tags: Vec<TagLink>,
	/// Published posts embedding each video, newest first.
	pub related_posts: Vec<PostLink>,
}

impl Hydrator<'_> {
	pub async fn videos(
		&self,
		roots: Vec<(Video, VideoRefs)>,
		report: &mut HydrationReport,
	) -> Vec<Video> {
		if roots.is_empty() {
			return Vec::new();
		}

		let ids = roots.iter().map(|(_, refs)| refs.id).collect::<Vec<_>>();
		let pool = self.pool;
		let (tags, related_posts) = tokio::join!(
			relations::video_tags(pool, &ids),
			relations::video_related_posts(pool, &ids),
		);
		let relations = VideoRelations {
			tags: report.settle(RelationKind::Tags, tags),
			related_posts: report.settle(RelationKind::RelatedPosts, related_posts),
		};
		let image_ids = hydrate::id_set(
			roots
				.iter()
				.map(|(_, refs)| refs.hero_image)
				.chain(relations.related_posts.iter().map(|link| link.post.hero_image)),
		);
		let images =
			report.settle(RelationKind::Images, relations::images_by_ids(pool, &image_ids).await);
		let photos = hydrate::photo_index(images, &self.media.statics_host);

		splice(roots, relations, &photos)
	}
}

pub fn splice(
	roots: Vec<(Video, VideoRefs)>,
	relations: VideoRelations,
	photos: &HashMap<i32, Photo>,
) -> Vec<Video> {
	let mut tags = hydrate::group(relations.tags, hydrate::tag);
	let mut related_posts = hydrate::group(relations.related_posts, |link| {
		(link.owner_id, hydrate::post_summary(&link.post, photos))
	});

	roots
		.into_iter()
		.map(|(mut video, refs)| {
			video.tags = hydrate::take_group(&mut tags, refs.id);
			video.related_posts = hydrate::take_group(&mut related_posts, refs.id);
			video.hero_image = hydrate::lookup_photo(photos, refs.hero_image);

			video
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use folio_domain::content::{Photo, Video};
	use folio_storage::models::TagLink;

	use crate::{
		executor::VideoRefs,
		hydrate::video::{self, VideoRelations},
	};

	#[test]
	fn tags_and_hero_image_splice_per_video() {
		let relations = VideoRelations {
			tags: vec![TagLink {
				owner_id: 2,
				id: 5,
				name: "Shorts".to_string(),
				slug: "shorts".to_string(),
			}],
			..Default::default()
		};
		let photos = HashMap::from([(8, Photo { id: "8".to_string(), ..Default::default() })]);
		let videos = video::splice(
			vec![
				(Video::default(), VideoRefs { id: 1, hero_image: Some(8) }),
				(Video::default(), VideoRefs { id: 2, hero_image: Some(404) }),
			],
			relations,
			&photos,
		);

		assert!(videos[0].tags.is_empty());
		assert_eq!(videos[0].hero_image.as_ref().map(|p| p.id.as_str()), Some("8"));
		assert_eq!(videos[1].tags[0].slug, "shorts");
		assert_eq!(videos[1].hero_image, None);
		assert!(videos[1].related_posts.is_empty());
	}
}
