//! Scratch Postgres databases and CMS fixtures for the folio test suites.

pub mod seed;

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr};

use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const ADMIN_DATABASE: &str = "postgres";
const CONTENT_SCHEMA_SQL: &str = include_str!("../sql/content.sql");

/// A scratch database on the server named by `FOLIO_PG_DSN`. Call [`TestDatabase::cleanup`]
/// at the end of each test to drop it.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn).map_err(Error::InvalidDsn)?;
		let admin_options = base_options.clone().database(ADMIN_DATABASE);
		let name = format!("folio_test_{}", Uuid::new_v4().simple());
		let mut admin = connect(&admin_options).await?;

		admin
			.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|source| Error::Scratch { action: "create", source })?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin_options })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database, disconnecting any pool the test left open.
	pub async fn cleanup(self) -> Result<()> {
		let mut admin = connect(&self.admin_options).await?;

		sqlx::query(
			"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(&self.name)
		.fetch_all(&mut admin)
		.await?;
		admin
			.execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str())
			.await
			.map_err(|source| Error::Scratch { action: "drop", source })?;

		Ok(())
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("FOLIO_PG_DSN").ok()
}

/// Creates the CMS content tables the repository reads from.
pub async fn install_content_schema(pool: &PgPool) -> Result<()> {
	for statement in CONTENT_SCHEMA_SQL.split(';') {
		let statement = statement
			.lines()
			.filter(|line| !line.trim_start().starts_with("--"))
			.collect::<Vec<_>>()
			.join("\n");

		if statement.trim().is_empty() {
			continue;
		}

		sqlx::query(&statement).execute(pool).await?;
	}

	Ok(())
}

async fn connect(admin_options: &PgConnectOptions) -> Result<PgConnection> {
	PgConnection::connect_with(admin_options)
		.await
		.map_err(|source| Error::Scratch { action: "connect to the admin server for", source })
}
