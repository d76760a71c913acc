use folio_domain::content::Topic;
use folio_storage::models::TopicRow;

use crate::{
	CountRequest, Error, FolioService, ListCacheRequest, ListRequest, Result, UniqueRequest,
	executor::{self, TOPICS},
	filter::{self, Page, TopicUnique, TopicWhere},
	hydrate::HydrationReport,
	predicate::{self, Predicate, TOPIC_SORT},
};

impl FolioService {
	pub async fn topics(&self, req: ListRequest) -> Result<Vec<Topic>> {
		let mut filter =
			filter::decode::<TopicWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::topic_conditions(&filter);
		let order =
			predicate::resolve_order(&TOPIC_SORT, &filter::decode_order(req.order_by.as_ref())?);
		let page = Page::new(req.take, req.skip);
		let key = self.cache_key("topics", &ListCacheRequest::new(&filter, &order, page));

		if let Some(hit) = self.cached::<Vec<Topic>>(key.as_ref()).await {
			return Ok(hit);
		}

		let (sql, args) =
			executor::select_sql(&TOPICS, Predicate::compile(&conditions), &order, page);
		let rows = self
			.root_query("topics", executor::fetch_rows::<TopicRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::topic_from_row).collect();
		let mut report = HydrationReport::default();
		let topics = self.hydrate("topics", self.hydrator().topics(roots, &mut report)).await?;

		self.remember(key.as_ref(), &topics, &report).await;

		Ok(topics)
	}

	pub async fn topics_count(&self, req: CountRequest) -> Result<i64> {
		let mut filter =
			filter::decode::<TopicWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::topic_conditions(&filter);
		let (sql, args) = executor::count_sql(&TOPICS, Predicate::compile(&conditions));

		self.count_query("topics_count", executor::fetch_count(&self.db.pool, &sql, args)).await
	}

	/// Looks up one published topic by id, slug, or name.
	pub async fn topic(&self, req: UniqueRequest) -> Result<Option<Topic>> {
		let Some(unique) = filter::decode::<TopicUnique>(req.filter.as_ref(), "$.where")? else {
			return Err(Error::invalid("$.where is required."));
		};
		let conditions = predicate::topic_unique_conditions(&unique)?;
		let key = self.cache_key("topic", &unique);

		if let Some(mut hit) = self.cached::<Vec<Topic>>(key.as_ref()).await {
			return Ok(hit.pop());
		}

		let order = predicate::resolve_order(&TOPIC_SORT, &[]);
		let (sql, args) =
			executor::select_sql(&TOPICS, Predicate::compile(&conditions), &order, Page::single());
		let rows = self
			.root_query("topic", executor::fetch_rows::<TopicRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::topic_from_row).collect();
		let mut report = HydrationReport::default();
		let topics = self.hydrate("topic", self.hydrator().topics(roots, &mut report)).await?;

		self.remember(key.as_ref(), &topics, &report).await;

		Ok(topics.into_iter().next())
	}
}
