pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Timed out after {elapsed_ms} ms: {operation}")]
	Timeout { operation: &'static str, elapsed_ms: u64 },
	#[error("Cache error: {message}")]
	Cache { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<folio_storage::Error> for Error {
	fn from(err: folio_storage::Error) -> Self {
		match err {
			folio_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
		}
	}
}
