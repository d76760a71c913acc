use std::sync::Arc;

use folio_service::FolioService;
use folio_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FolioService>,
}
impl AppState {
	pub async fn new(config: folio_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(FolioService::new(config, db)))
	}

	/// Builds the state on a lazy pool. Nothing connects until a handler runs a query.
	pub fn lazy(config: folio_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect_lazy(&config.storage.postgres)?;

		Ok(Self::from_service(FolioService::new(config, db)))
	}

	pub fn from_service(service: FolioService) -> Self {
		Self { service: Arc::new(service) }
	}
}
