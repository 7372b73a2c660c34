//! Outbound calls to the recommendation backend.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};

/// Candidate count requested per turn.
pub const RESULTS_PER_QUERY: u32 = 6;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Backend request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("Backend returned a non-JSON body: {0}")]
	Decode(#[source] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
	session_id: &'a str,
	prompt: Value,
	k: u32,
}

#[derive(Debug, Serialize)]
struct ResetPayload<'a> {
	session_id: &'a str,
}

/// A backend answer, passed back to the browser untouched.
#[derive(Debug)]
pub struct Relayed {
	pub status: StatusCode,
	pub body: Value,
}

#[derive(Debug)]
pub struct Upstream {
	client: Client,
	chat_url: String,
	reset_url: String,
}
impl Upstream {
	pub fn new(cfg: &eugen_config::Backend) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { client, chat_url: cfg.chat_url(), reset_url: cfg.reset_url() })
	}

	/// The backend body must be JSON whatever the status; anything else is an error.
	pub async fn chat(&self, session_id: &str, prompt: Value) -> Result<Relayed> {
		let payload = ChatPayload { session_id, prompt, k: RESULTS_PER_QUERY };
		let response = self.client.post(&self.chat_url).json(&payload).send().await?;
		let status = response.status();
		let bytes = response.bytes().await?;
		let body = serde_json::from_slice(&bytes).map_err(Error::Decode)?;

		Ok(Relayed { status, body })
	}

	/// Lenient about the body: empty or non-JSON relays as `{}`.
	pub async fn reset(&self, session_id: &str) -> Result<Relayed> {
		let response =
			self.client.post(&self.reset_url).json(&ResetPayload { session_id }).send().await?;
		let status = response.status();
		let bytes = response.bytes().await?;
		let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Map::new()));

		Ok(Relayed { status, body })
	}
}
