use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;
use sift_service::{
	AskRequest, AskResponse, Error as ServiceError, SearchRequest, SearchResponse, Session,
	SessionStore,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/ask", post(ask))
		.route("/v1/teams/{team_id}/session", put(put_session).delete(delete_session))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(state.sessions.as_ref(), payload).await?;

	Ok(Json(response))
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.service.ask(state.sessions.as_ref(), payload).await?;

	Ok(Json(response))
}

async fn put_session(
	State(state): State<AppState>,
	Path(team_id): Path<String>,
	Json(payload): Json<Session>,
) -> Result<StatusCode, ApiError> {
	let team_id = team_id.trim();

	if team_id.is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			"team_id must be non-empty.",
			Some(vec!["$.team_id".to_string()]),
		));
	}

	let session = payload.normalized()?;

	state.sessions.save(team_id, &session).await?;

	tracing::info!(team_id, "Stored team session.");

	Ok(StatusCode::NO_CONTENT)
}

async fn delete_session(
	State(state): State<AppState>,
	Path(team_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	let team_id = team_id.trim();

	if state.sessions.remove(team_id).await? {
		tracing::info!(team_id, "Removed team session.");

		return Ok(StatusCode::NO_CONTENT);
	}

	Err(ServiceError::SessionMissing { team_id: team_id.to_string() }.into())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			ServiceError::SessionMissing { .. } =>
				json_error(StatusCode::NOT_FOUND, "SESSION_MISSING", message, None),
			ServiceError::Transport { .. } =>
				json_error(StatusCode::BAD_GATEWAY, "TRANSPORT_UNAVAILABLE", message, None),
			ServiceError::Provider { .. } =>
				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None),
			ServiceError::SessionStore { .. } => {
				tracing::error!(error = %message, "Session store failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "SESSION_STORE_ERROR", message, None)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
