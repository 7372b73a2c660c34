use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::{
	session,
	state::AppState,
	upstream::{self, Relayed},
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/chat", post(chat))
		.route("/api/eugen/chat", post(chat))
		.route("/api/eugen/chat/reset", post(reset))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Forwards one turn, attaching the session cookie or minting it on first contact.
async fn chat(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ApiError> {
	let payload: Value = serde_json::from_slice(&body)
		.map_err(|err| ApiError::new(format!("Invalid chat request body: {err}.")))?;
	let (session_id, minted) = match session::from_headers(&headers) {
		Some(session_id) => (session_id, false),
		None => (session::mint(), true),
	};
	let prompt = payload
		.pointer("/message/content")
		.filter(|content| !content.is_null())
		.cloned()
		.unwrap_or_else(|| Value::String(String::new()));
	let relayed = state.upstream.chat(&session_id, prompt).await?;

	tracing::debug!(%session_id, minted, status = relayed.status.as_u16(), "Chat forwarded.");

	relay(relayed, &session_id)
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
	let Some(session_id) = session::from_headers(&headers) else {
		return Ok(StatusCode::NO_CONTENT.into_response());
	};
	let relayed = state.upstream.reset(&session_id).await?;

	tracing::debug!(%session_id, status = relayed.status.as_u16(), "Reset forwarded.");

	relay(relayed, &session_id)
}

fn relay(relayed: Relayed, session_id: &str) -> Result<Response, ApiError> {
	let cookie = HeaderValue::from_str(&session::set_cookie(session_id))
		.map_err(|err| ApiError::new(format!("Session id is not a valid cookie value: {err}.")))?;
	let mut response = (relayed.status, Json(relayed.body)).into_response();

	response.headers_mut().insert(header::SET_COOKIE, cookie);

	Ok(response)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

/// Every proxy failure surfaces as a 500 with `{ "error": <message> }`.
#[derive(Debug)]
pub struct ApiError {
	message: String,
}
impl ApiError {
	fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}
impl From<upstream::Error> for ApiError {
	fn from(err: upstream::Error) -> Self {
		Self::new(err.to_string())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		tracing::warn!(error = %self.message, "Proxy request failed.");

		(StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: self.message })).into_response()
	}
}
