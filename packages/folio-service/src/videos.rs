use folio_domain::content::Video;
use folio_storage::models::VideoRow;

use crate::{
	CountRequest, Error, FolioService, ListCacheRequest, ListRequest, Result, UniqueRequest,
	executor::{self, VIDEOS},
	filter::{self, Page, VideoUnique, VideoWhere},
	hydrate::HydrationReport,
	predicate::{self, Predicate, VIDEO_SORT},
};

impl FolioService {
	pub async fn videos(&self, req: ListRequest) -> Result<Vec<Video>> {
		let mut filter =
			filter::decode::<VideoWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::video_conditions(&filter);
		let order =
			predicate::resolve_order(&VIDEO_SORT, &filter::decode_order(req.order_by.as_ref())?);
		let page = Page::new(req.take, req.skip);
		let key = self.cache_key("videos", &ListCacheRequest::new(&filter, &order, page));

		if let Some(hit) = self.cached::<Vec<Video>>(key.as_ref()).await {
			return Ok(hit);
		}

		let (sql, args) =
			executor::select_sql(&VIDEOS, Predicate::compile(&conditions), &order, page);
		let rows = self
			.root_query("videos", executor::fetch_rows::<VideoRow>(&self.db.pool, &sql, args))
			.await?;
		let video_host = self.cfg.media.video_host.as_str();
		let roots = rows.into_iter().map(|row| executor::video_from_row(row, video_host)).collect();
		let mut report = HydrationReport::default();
		let videos = self.hydrate("videos", self.hydrator().videos(roots, &mut report)).await?;

		self.remember(key.as_ref(), &videos, &report).await;

		Ok(videos)
	}

	pub async fn videos_count(&self, req: CountRequest) -> Result<i64> {
		let mut filter =
			filter::decode::<VideoWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::video_conditions(&filter);
		let (sql, args) = executor::count_sql(&VIDEOS, Predicate::compile(&conditions));

		self.count_query("videos_count", executor::fetch_count(&self.db.pool, &sql, args)).await
	}

	/// Looks up one published video by id.
	pub async fn video(&self, req: UniqueRequest) -> Result<Option<Video>> {
		let Some(unique) = filter::decode::<VideoUnique>(req.filter.as_ref(), "$.where")? else {
			return Err(Error::invalid("$.where is required."));
		};
		let conditions = predicate::video_unique_conditions(&unique)?;
		let key = self.cache_key("video", &unique);

		if let Some(mut hit) = self.cached::<Vec<Video>>(key.as_ref()).await {
			return Ok(hit.pop());
		}

		let order = predicate::resolve_order(&VIDEO_SORT, &[]);
		let (sql, args) =
			executor::select_sql(&VIDEOS, Predicate::compile(&conditions), &order, Page::single());
		let rows = self
			.root_query("video", executor::fetch_rows::<VideoRow>(&self.db.pool, &sql, args))
			.await?;
		let video_host = self.cfg.media.video_host.as_str();
		let roots = rows.into_iter().map(|row| executor::video_from_row(row, video_host)).collect();
		let mut report = HydrationReport::default();
		let videos = self.hydrate("video", self.hydrator().videos(roots, &mut report)).await?;

		self.remember(key.as_ref(), &videos, &report).await;

		Ok(videos.into_iter().next())
	}
}
