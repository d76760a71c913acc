use folio_domain::content::Post;
use folio_storage::models::PostRow;

use crate::{
	CountRequest, Error, FolioService, ListCacheRequest, ListRequest, Result, UniqueRequest,
	executor::{self, POSTS},
	filter::{self, Page, PostUnique, PostWhere},
	hydrate::HydrationReport,
	predicate::{self, POST_SORT, Predicate},
};

impl FolioService {
	pub async fn posts(&self, req: ListRequest) -> Result<Vec<Post>> {
		let mut filter =
			filter::decode::<PostWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::post_conditions(&filter)?;
		let order = predicate::resolve_order(&POST_SORT, &filter::decode_order(req.order_by.as_ref())?);
		let page = Page::new(req.take, req.skip);
		let key = self.cache_key("posts", &ListCacheRequest::new(&filter, &order, page));

		if let Some(hit) = self.cached::<Vec<Post>>(key.as_ref()).await {
			return Ok(hit);
		}

		let (sql, args) = executor::select_sql(&POSTS, Predicate::compile(&conditions), &order, page);
		let rows = self
			.root_query("posts", executor::fetch_rows::<PostRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::post_from_row).collect();
		let mut report = HydrationReport::default();
		let posts = self.hydrate("posts", self.hydrator().posts(roots, &mut report)).await?;

		self.remember(key.as_ref(), &posts, &report).await;

		Ok(posts)
	}

	pub async fn posts_count(&self, req: CountRequest) -> Result<i64> {
		let mut filter =
			filter::decode::<PostWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::post_conditions(&filter)?;
		let (sql, args) = executor::count_sql(&POSTS, Predicate::compile(&conditions));

		self.count_query("posts_count", executor::fetch_count(&self.db.pool, &sql, args)).await
	}

	/// Looks up one post by id or slug, in any state.
	pub async fn post(&self, req: UniqueRequest) -> Result<Option<Post>> {
		let Some(unique) = filter::decode::<PostUnique>(req.filter.as_ref(), "$.where")? else {
			return Err(Error::invalid("$.where is required."));
		};
		let conditions = predicate::post_unique_conditions(&unique)?;
		let key = self.cache_key("post", &unique);

		if let Some(mut hit) = self.cached::<Vec<Post>>(key.as_ref()).await {
			return Ok(hit.pop());
		}

		let order = predicate::resolve_order(&POST_SORT, &[]);
		let (sql, args) =
			executor::select_sql(&POSTS, Predicate::compile(&conditions), &order, Page::single());
		let rows = self
			.root_query("post", executor::fetch_rows::<PostRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::post_from_row).collect();
		let mut report = HydrationReport::default();
		let posts = self.hydrate("post", self.hydrator().posts(roots, &mut report)).await?;

		self.remember(key.as_ref(), &posts, &report).await;

		Ok(posts.into_iter().next())
	}
}
