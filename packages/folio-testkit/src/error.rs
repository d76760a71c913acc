pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("FOLIO_PG_DSN is not a valid Postgres DSN: {0}.")]
	InvalidDsn(sqlx::Error),

	#[error("Failed to {action} the scratch database: {source}.")]
	Scratch { action: &'static str, source: sqlx::Error },

	#[error("Failed to seed {table}: {source}.")]
	Seed { table: &'static str, source: sqlx::Error },

	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
