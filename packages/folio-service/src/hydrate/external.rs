use std::collections::HashMap;

use folio_domain::content::{External, Partner, Photo};
use folio_storage::{
	models::{CategoryLink, PartnerRow, PostLink, SectionLink, TagLink},
	relations,
};

use crate::{
	executor::ExternalRefs,
	hydrate::{self, HydrationReport, Hydrator, RelationKind},
};

#[derive(Debug, Default)]
pub struct ExternalRelations {
	pub tags: Vec<TagLink>,
	pub sections: Vec<SectionLink>,
	pub categories: Vec<CategoryLink>,
	pub relateds: Vec<PostLink>,
	pub partners: Vec<PartnerRow>,
}

impl Hydrator<'_> {
	pub async fn externals(
		&self,
		roots: Vec<(External, ExternalRefs)>,
		report: &mut HydrationReport,
	) -> Vec<External> {
		if roots.is_empty() {
			return Vec::new();
		}

		let ids = roots.iter().map(|(_, refs)| refs.id).collect::<Vec<_>>();
		// The fallback partner rides along in the same batched fetch.
		let partner_ids = hydrate::id_set(
			roots.iter().map(|(_, refs)| refs.partner).chain([self.fallback_partner]),
		);
		let pool = self.pool;
		let (tags, sections, categories, relateds, partners) = tokio::join!(
			relations::external_tags(pool, &ids),
			relations::external_sections(pool, &ids),
			relations::external_categories(pool, &ids),
			relations::external_relateds(pool, &ids),
			relations::partners_by_ids(pool, &partner_ids),
		);
		let relations = ExternalRelations {
			tags: report.settle(RelationKind::Tags, tags),
			sections: report.settle(RelationKind::Sections, sections),
			categories: report.settle(RelationKind::Categories, categories),
			relateds: report.settle(RelationKind::Relateds, relateds),
			partners: report.settle(RelationKind::Partners, partners),
		};
		let image_ids =
			hydrate::id_set(relations.relateds.iter().map(|link| link.post.hero_image));
		let images =
			report.settle(RelationKind::Images, relations::images_by_ids(pool, &image_ids).await);
		let photos = hydrate::photo_index(images, &self.media.statics_host);

		splice(roots, relations, &photos, self.fallback_partner)
	}
}

pub fn splice(
	roots: Vec<(External, ExternalRefs)>,
	relations: ExternalRelations,
	photos: &HashMap<i32, Photo>,
	fallback_partner: Option<i32>,
) -> Vec<External> {
	let mut tags = hydrate::group(relations.tags, hydrate::tag);
	let mut sections = hydrate::group(relations.sections, hydrate::section);
	let mut categories = hydrate::group(relations.categories, hydrate::category);
	let mut relateds = hydrate::group(relations.relateds, |link| {
		(link.owner_id, hydrate::post_summary(&link.post, photos))
	});
	let partners = relations
		.partners
		.into_iter()
		.map(|row| (row.id, partner(row)))
		.collect::<HashMap<_, _>>();

	roots
		.into_iter()
		.map(|(mut external, refs)| {
			let id = refs.id;

			external.tags = hydrate::take_group(&mut tags, id);
			external.sections = hydrate::take_group(&mut sections, id);
			external.categories = hydrate::take_group(&mut categories, id);
			external.relateds = hydrate::take_group(&mut relateds, id);
			external.partner =
				refs.partner.or(fallback_partner).and_then(|id| partners.get(&id)).cloned();

			external
		})
		.collect()
}

pub(crate) fn partner(row: PartnerRow) -> Partner {
	Partner {
		id: row.id.to_string(),
		slug: row.slug,
		name: row.name,
		show_on_index: row.show_on_index,
	}
}
