use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use folio_domain::content::{External, Partner, Post, Topic, Video};
use folio_service::{CountRequest, Error, ListRequest, UniqueRequest};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/posts", post(posts))
		.route("/v1/posts/count", post(posts_count))
		.route("/v1/post", post(post_unique))
		.route("/v1/externals", post(externals))
		.route("/v1/externals/count", post(externals_count))
		.route("/v1/external", post(external_unique))
		.route("/v1/topics", post(topics))
		.route("/v1/topics/count", post(topics_count))
		.route("/v1/topic", post(topic_unique))
		.route("/v1/videos", post(videos))
		.route("/v1/videos/count", post(videos_count))
		.route("/v1/video", post(video_unique))
		.route("/v1/partners/{id}", get(partner))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
	pub count: i64,
}

async fn posts(
	State(state): State<AppState>,
	Json(payload): Json<ListRequest>,
) -> Result<Json<Vec<Post>>, ApiError> {
	Ok(Json(state.service.posts(payload).await?))
}

async fn posts_count(
	State(state): State<AppState>,
	Json(payload): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
	let count = state.service.posts_count(payload).await?;
	Ok(Json(CountResponse { count }))
}

async fn post_unique(
	State(state): State<AppState>,
	Json(payload): Json<UniqueRequest>,
) -> Result<Json<Option<Post>>, ApiError> {
	Ok(Json(state.service.post(payload).await?))
}

async fn externals(
	State(state): State<AppState>,
	Json(payload): Json<ListRequest>,
) -> Result<Json<Vec<External>>, ApiError> {
	Ok(Json(state.service.externals(payload).await?))
}

async fn externals_count(
	State(state): State<AppState>,
	Json(payload): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
	let count = state.service.externals_count(payload).await?;
	Ok(Json(CountResponse { count }))
}

async fn external_unique(
	State(state): State<AppState>,
	Json(payload): Json<UniqueRequest>,
) -> Result<Json<Option<External>>, ApiError> {
	Ok(Json(state.service.external(payload).await?))
}

async fn topics(
	State(state): State<AppState>,
	Json(payload): Json<ListRequest>,
) -> Result<Json<Vec<Topic>>, ApiError> {
	Ok(Json(state.service.topics(payload).await?))
}

async fn topics_count(
	State(state): State<AppState>,
	Json(payload): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
	let count = state.service.topics_count(payload).await?;
	Ok(Json(CountResponse { count }))
}

async fn topic_unique(
	State(state): State<AppState>,
	Json(payload): Json<UniqueRequest>,
) -> Result<Json<Option<Topic>>, ApiError> {
	Ok(Json(state.service.topic(payload).await?))
}

async fn videos(
	State(state): State<AppState>,
	Json(payload): Json<ListRequest>,
) -> Result<Json<Vec<Video>>, ApiError> {
	Ok(Json(state.service.videos(payload).await?))
}

async fn videos_count(
	State(state): State<AppState>,
	Json(payload): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
	let count = state.service.videos_count(payload).await?;
	Ok(Json(CountResponse { count }))
}

async fn video_unique(
	State(state): State<AppState>,
	Json(payload): Json<UniqueRequest>,
) -> Result<Json<Option<Video>>, ApiError> {
	Ok(Json(state.service.video(payload).await?))
}

async fn partner(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Option<Partner>>, ApiError> {
	Ok(Json(state.service.partner_by_id(&id).await?))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::Timeout { operation, elapsed_ms } => {
				tracing::warn!(operation, elapsed_ms, "Request timed out.");

				ApiError::new(
					StatusCode::GATEWAY_TIMEOUT,
					"TIMEOUT",
					format!("{operation} timed out."),
				)
			},
			Error::Storage { message } | Error::Cache { message } => {
				tracing::error!(error = %message, "Request failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Internal error.",
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
