use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use eugen_domain::ChatMessage;

use crate::{Error, Result};

/// Body POSTed to the chat endpoint.
///
/// `thread` is always empty: conversational memory lives server-side, keyed by the session
/// cookie.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
	pub message: ChatMessage,
	pub thread: Vec<ChatMessage>,
}
impl ChatRequest {
	pub fn new(message: ChatMessage) -> Self {
		Self { message, thread: Vec::new() }
	}
}

pub trait ChatTransport: Send + Sync {
	/// Resolves with the decoded JSON body of a success response. Any non-success status is an
	/// error.
	fn chat(&self, request: &ChatRequest) -> impl Future<Output = Result<Value>> + Send;

	/// Asks the server to drop its memory of the current session.
	fn reset(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Talks to the chat proxy over HTTP. The session cookie set by the proxy lives in the client's
/// cookie store and rides along on every later call.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	client: Client,
	chat_url: String,
	reset_url: String,
}
impl HttpTransport {
	pub fn new(cfg: &eugen_config::Widget) -> Result<Self> {
		let client = Client::builder()
			.cookie_store(true)
			.timeout(Duration::from_millis(cfg.request_timeout_ms))
			.build()?;

		Ok(Self { client, chat_url: cfg.chat_url(), reset_url: cfg.reset_url() })
	}
}
impl ChatTransport for HttpTransport {
	async fn chat(&self, request: &ChatRequest) -> Result<Value> {
		let res = self.client.post(&self.chat_url).json(request).send().await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { status: status.as_u16() });
		}

		Ok(res.json().await?)
	}

	async fn reset(&self) -> Result<()> {
		let res = self.client.post(&self.reset_url).send().await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { status: status.as_u16() });
		}

		Ok(())
	}
}
