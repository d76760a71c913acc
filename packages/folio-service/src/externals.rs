use folio_domain::content::{External, Partner};
use folio_storage::{models::ExternalRow, relations};

use crate::{
	CountRequest, Error, FolioService, ListCacheRequest, ListRequest, Result, UniqueRequest,
	executor::{self, EXTERNALS},
	filter::{self, ExternalUnique, ExternalWhere, Page},
	hydrate::HydrationReport,
	predicate::{self, EXTERNAL_SORT, Predicate},
};

impl FolioService {
	pub async fn externals(&self, req: ListRequest) -> Result<Vec<External>> {
		let mut filter =
			filter::decode::<ExternalWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::external_conditions(&filter);
		let order =
			predicate::resolve_order(&EXTERNAL_SORT, &filter::decode_order(req.order_by.as_ref())?);
		let page = Page::new(req.take, req.skip);
		let key = self.cache_key("externals", &ListCacheRequest::new(&filter, &order, page));

		if let Some(hit) = self.cached::<Vec<External>>(key.as_ref()).await {
			return Ok(hit);
		}

		let (sql, args) =
			executor::select_sql(&EXTERNALS, Predicate::compile(&conditions), &order, page);
		let rows = self
			.root_query("externals", executor::fetch_rows::<ExternalRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::external_from_row).collect();
		let mut report = HydrationReport::default();
		let externals =
			self.hydrate("externals", self.hydrator().externals(roots, &mut report)).await?;

		self.remember(key.as_ref(), &externals, &report).await;

		Ok(externals)
	}

	pub async fn externals_count(&self, req: CountRequest) -> Result<i64> {
		let mut filter =
			filter::decode::<ExternalWhere>(req.filter.as_ref(), "$.where")?.unwrap_or_default();

		predicate::default_published(&mut filter.state);

		let conditions = predicate::external_conditions(&filter);
		let (sql, args) = executor::count_sql(&EXTERNALS, Predicate::compile(&conditions));

		self.count_query("externals_count", executor::fetch_count(&self.db.pool, &sql, args)).await
	}

	/// Looks up one external by id, in any state.
	pub async fn external(&self, req: UniqueRequest) -> Result<Option<External>> {
		let Some(unique) = filter::decode::<ExternalUnique>(req.filter.as_ref(), "$.where")? else {
			return Err(Error::invalid("$.where is required."));
		};
		let conditions = predicate::external_unique_conditions(&unique)?;
		let key = self.cache_key("external", &unique);

		if let Some(mut hit) = self.cached::<Vec<External>>(key.as_ref()).await {
			return Ok(hit.pop());
		}

		let order = predicate::resolve_order(&EXTERNAL_SORT, &[]);
		let (sql, args) =
			executor::select_sql(&EXTERNALS, Predicate::compile(&conditions), &order, Page::single());
		let rows = self
			.root_query("external", executor::fetch_rows::<ExternalRow>(&self.db.pool, &sql, args))
			.await?;
		let roots = rows.into_iter().map(executor::external_from_row).collect();
		let mut report = HydrationReport::default();
		let externals =
			self.hydrate("external", self.hydrator().externals(roots, &mut report)).await?;

		self.remember(key.as_ref(), &externals, &report).await;

		Ok(externals.into_iter().next())
	}

	pub async fn partner_by_id(&self, id: &str) -> Result<Option<Partner>> {
		let Some(id) = filter::parse_id(id) else {
			return Err(Error::invalid(format!("Partner id {id:?} is not a valid id.")));
		};
		let rows = self
			.root_query("partner", async {
				Ok(relations::partners_by_ids(&self.db.pool, &[id]).await?)
			})
			.await?;

		Ok(rows.into_iter().next().map(crate::hydrate::partner))
	}
}
